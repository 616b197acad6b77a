//! Submission record store — a flat log of applications in SQLite.
//!
//! Single-user, single-process: no transactions or locking beyond what the
//! pool provides. The schema is idempotent and backward-readable across
//! runs (same table and columns as previous versions of the tool).

use std::path::Path;

use chrono::Local;
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, SqlitePool};
use tracing::info;

use crate::errors::AppError;

/// Status labels offered by the management panel. `update_status` accepts
/// free text; this list only drives the UI dropdown.
pub const STATUS_OPTIONS: &[&str] = &["Enviado", "Entrevista", "Teste", "Reprovado", "Contratado"];

/// One row of the submission log. `arquivo_path` is either a real PDF path
/// or the literal `"N/A"` for text-only channels.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct SubmissionRecord {
    pub id: i64,
    /// Calendar day of creation, `YYYY-MM-DD`.
    pub data: String,
    pub empresa: String,
    pub cargo: String,
    pub status: String,
    pub arquivo_path: String,
}

/// Daily submission volume, one row per calendar day (bar-chart data).
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct DailyCount {
    pub data: String,
    pub candidaturas: i64,
}

/// Dashboard KPIs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Summary {
    pub total: i64,
    /// Submissions whose status mentions Gupy.
    pub gupy: i64,
    /// Submissions currently at the interview stage.
    pub entrevistas: i64,
}

/// Creates the submission table if absent. Idempotent; safe on every start.
pub async fn ensure_schema(pool: &SqlitePool) -> Result<(), AppError> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS candidaturas (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            data TEXT,
            empresa TEXT,
            cargo TEXT,
            status TEXT,
            arquivo_path TEXT
        )
        "#,
    )
    .execute(pool)
    .await?;
    Ok(())
}

/// Inserts a submission dated today and returns its id. Status must be
/// non-empty: a record without one is unusable in the dashboard.
pub async fn insert(
    pool: &SqlitePool,
    empresa: &str,
    cargo: &str,
    status: &str,
    arquivo_path: &str,
) -> Result<i64, AppError> {
    if status.trim().is_empty() {
        return Err(AppError::Validation(
            "status cannot be empty".to_string(),
        ));
    }

    let today = Local::now().format("%Y-%m-%d").to_string();

    let result = sqlx::query(
        "INSERT INTO candidaturas (data, empresa, cargo, status, arquivo_path) VALUES (?, ?, ?, ?, ?)",
    )
    .bind(&today)
    .bind(empresa)
    .bind(cargo)
    .bind(status)
    .bind(arquivo_path)
    .execute(pool)
    .await?;

    Ok(result.last_insert_rowid())
}

/// All submissions in insertion order. Callers choosing reverse-chronological
/// display do so themselves.
pub async fn list_all(pool: &SqlitePool) -> Result<Vec<SubmissionRecord>, AppError> {
    let rows = sqlx::query_as::<_, SubmissionRecord>("SELECT * FROM candidaturas ORDER BY id")
        .fetch_all(pool)
        .await?;
    Ok(rows)
}

/// Updates a record's status. A zero-row update (absent id) is tolerated.
pub async fn update_status(pool: &SqlitePool, id: i64, status: &str) -> Result<(), AppError> {
    if status.trim().is_empty() {
        return Err(AppError::Validation(
            "status cannot be empty".to_string(),
        ));
    }

    sqlx::query("UPDATE candidaturas SET status = ? WHERE id = ?")
        .bind(status)
        .bind(id)
        .execute(pool)
        .await?;
    Ok(())
}

/// Deletes a record by id. Deleting an absent id is a no-op.
pub async fn delete(pool: &SqlitePool, id: i64) -> Result<(), AppError> {
    sqlx::query("DELETE FROM candidaturas WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(())
}

/// Submissions per calendar day, ascending by date.
pub async fn daily_counts(pool: &SqlitePool) -> Result<Vec<DailyCount>, AppError> {
    let rows = sqlx::query_as::<_, DailyCount>(
        "SELECT data, COUNT(*) AS candidaturas FROM candidaturas GROUP BY data ORDER BY data",
    )
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

/// Dashboard KPI counters.
pub async fn summary(pool: &SqlitePool) -> Result<Summary, AppError> {
    let (total, gupy, entrevistas): (i64, i64, i64) = sqlx::query_as(
        r#"
        SELECT
            COUNT(*),
            COALESCE(SUM(CASE WHEN status LIKE '%Gupy%' THEN 1 ELSE 0 END), 0),
            COALESCE(SUM(CASE WHEN status = 'Entrevista' THEN 1 ELSE 0 END), 0)
        FROM candidaturas
        "#,
    )
    .fetch_one(pool)
    .await?;

    Ok(Summary {
        total,
        gupy,
        entrevistas,
    })
}

/// Writes the full submission log as a CSV report. Whole-file replace: an
/// existing report at `path` is truncated first.
pub async fn export_csv(pool: &SqlitePool, path: &Path) -> Result<(), AppError> {
    let records = list_all(pool).await?;

    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(anyhow::Error::from)?;
    }

    let mut writer = csv::Writer::from_path(path).map_err(anyhow::Error::from)?;
    writer
        .write_record(["id", "data", "empresa", "cargo", "status", "arquivo_path"])
        .map_err(anyhow::Error::from)?;
    for record in &records {
        writer
            .write_record([
                record.id.to_string().as_str(),
                &record.data,
                &record.empresa,
                &record.cargo,
                &record.status,
                &record.arquivo_path,
            ])
            .map_err(anyhow::Error::from)?;
    }
    writer.flush().map_err(anyhow::Error::from)?;

    info!("Exported {} records to {}", records.len(), path.display());
    Ok(())
}
