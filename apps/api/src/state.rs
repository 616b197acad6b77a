use std::sync::Arc;

use sqlx::SqlitePool;

use crate::config::Config;
use crate::llm_client::CompletionClient;
use crate::render::engine::PdfEngine;

/// Shared application state injected into all route handlers via Axum
/// extractors. The AI client and the PDF engine are trait objects so tests
/// run the full submit pipeline without a network or a browser.
#[derive(Clone)]
pub struct AppState {
    pub db: SqlitePool,
    pub llm: Arc<dyn CompletionClient>,
    pub pdf: Arc<dyn PdfEngine>,
    pub config: Config,
}
