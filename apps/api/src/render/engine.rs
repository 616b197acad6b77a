//! HTML→PDF conversion seam.
//!
//! The production engine drives a headless Chrome print-to-PDF; tests swap
//! in a stub so the render pipeline stays browser-free under test.

use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use headless_chrome::{Browser, LaunchOptions};
use tracing::debug;

use crate::errors::AppError;

/// Converts a rendered HTML document into PDF bytes.
#[async_trait]
pub trait PdfEngine: Send + Sync {
    async fn html_to_pdf(&self, html: &str) -> Result<Vec<u8>, AppError>;
}

/// Production engine: loads the HTML into a headless Chrome tab via a data
/// URL and prints it to PDF. The browser call is blocking, so it runs on the
/// blocking thread pool.
pub struct ChromePdfEngine;

#[async_trait]
impl PdfEngine for ChromePdfEngine {
    async fn html_to_pdf(&self, html: &str) -> Result<Vec<u8>, AppError> {
        let html = html.to_string();
        tokio::task::spawn_blocking(move || print_with_chrome(&html))
            .await
            .map_err(|e| AppError::Render(format!("render task failed: {e}")))?
    }
}

fn print_with_chrome(html: &str) -> Result<Vec<u8>, AppError> {
    let options = LaunchOptions::default_builder()
        .headless(true)
        .build()
        .map_err(|e| AppError::Render(format!("browser launch options: {e}")))?;

    let browser =
        Browser::new(options).map_err(|e| AppError::Render(format!("browser launch: {e}")))?;

    let tab = browser
        .new_tab()
        .map_err(|e| AppError::Render(format!("browser tab: {e}")))?;

    let data_url = format!("data:text/html;base64,{}", BASE64.encode(html));
    tab.navigate_to(&data_url)
        .and_then(|t| t.wait_until_navigated())
        .map_err(|e| AppError::Render(format!("navigation: {e}")))?;

    let pdf = tab
        .print_to_pdf(None)
        .map_err(|e| AppError::Render(format!("print to pdf: {e}")))?;

    debug!("Chrome produced a {} byte PDF", pdf.len());
    Ok(pdf)
}
