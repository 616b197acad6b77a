use std::path::PathBuf;

use anyhow::{Context, Result};

/// Application configuration loaded from environment variables.
/// Fails at startup if required variables are missing.
#[derive(Debug, Clone)]
pub struct Config {
    pub anthropic_api_key: String,
    /// Directory holding the SQLite database and the exported CSV report.
    pub data_dir: PathBuf,
    /// Directory where generated résumé PDFs are written.
    pub output_dir: PathBuf,
    /// The candidate's fixed profile document sent to the model on every call.
    pub profile_pdf: PathBuf,
    pub port: u16,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Ok(Config {
            anthropic_api_key: require_env("ANTHROPIC_API_KEY")?,
            data_dir: env_or("DATA_DIR", "controle_dados").into(),
            output_dir: env_or("OUTPUT_DIR", "curriculos_gerados").into(),
            profile_pdf: env_or("PROFILE_PDF", "linkedin.pdf").into(),
            port: std::env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse::<u16>()
                .context("PORT must be a valid port number")?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
        })
    }

    /// Path of the SQLite database file, kept under `data_dir` so the
    /// submission log persists across runs.
    pub fn database_path(&self) -> PathBuf {
        self.data_dir.join("candidaturas.db")
    }

    /// Fixed path of the CSV report produced by the export action.
    pub fn export_path(&self) -> PathBuf {
        self.data_dir.join("Relatorio_Exportado.csv")
    }
}

fn require_env(key: &str) -> Result<String> {
    std::env::var(key).with_context(|| format!("Required environment variable '{key}' is not set"))
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}
