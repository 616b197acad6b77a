//! Axum route handlers for the application log — the thin orchestration
//! layer over prompt building, the AI call, response cleanup, PDF rendering,
//! and the record store.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::errors::AppError;
use crate::prompts::{self, Channel};
use crate::render;
use crate::sanitize;
use crate::state::AppState;
use crate::store::{self, DailyCount, SubmissionRecord, Summary, STATUS_OPTIONS};

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct SubmitRequest {
    pub empresa: String,
    pub cargo: String,
    pub texto_vaga: String,
    pub canal: Channel,
}

#[derive(Debug, Serialize)]
pub struct SubmitResponse {
    pub id: i64,
    pub status: String,
    /// Gupy channel: the cleaned "Apresente-se" text to copy.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub texto_apresentacao: Option<String>,
    /// E-mail channel: suggested e-mail body from the model reply.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email_corpo: Option<String>,
    /// PDF channels: path of the generated résumé.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub arquivo_path: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct StatusUpdateRequest {
    pub status: String,
}

#[derive(Debug, Serialize)]
pub struct StatsResponse {
    pub summary: Summary,
    pub daily: Vec<DailyCount>,
    /// Labels for the management panel's status dropdown.
    pub status_options: Vec<&'static str>,
}

#[derive(Debug, Serialize)]
pub struct ExportResponse {
    pub path: String,
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// POST /api/v1/applications
///
/// The submit action: validate → AI call with the profile PDF → channel
/// branch → record. No record is written and no file is left behind when any
/// step fails.
pub async fn handle_submit(
    State(state): State<AppState>,
    Json(request): Json<SubmitRequest>,
) -> Result<Json<SubmitResponse>, AppError> {
    if request.empresa.trim().is_empty()
        || request.cargo.trim().is_empty()
        || request.texto_vaga.trim().is_empty()
    {
        return Err(AppError::Validation(
            "empresa, cargo and texto_vaga are all required".to_string(),
        ));
    }

    let document = std::fs::read(&state.config.profile_pdf).map_err(|e| {
        AppError::Llm(format!(
            "cannot read profile PDF {}: {e}",
            state.config.profile_pdf.display()
        ))
    })?;

    let sent_status = request.canal.sent_status();

    let response = match request.canal {
        Channel::Gupy => {
            // The introduction prompt embeds the job description itself.
            let prompt = prompts::build_intro_prompt(&request.texto_vaga, "");
            let reply = state
                .llm
                .complete(&document, prompts::INTRO_SYSTEM, &prompt, "")
                .await
                .map_err(|e| AppError::Llm(e.to_string()))?;

            let texto = sanitize::sanitize(&reply);

            let id = store::insert(&state.db, &request.empresa, &request.cargo, &sent_status, "N/A")
                .await?;

            SubmitResponse {
                id,
                status: sent_status,
                texto_apresentacao: Some(texto),
                email_corpo: None,
                arquivo_path: None,
            }
        }
        Channel::Email | Channel::PdfOnly => {
            let prompt = prompts::build_resume_prompt(request.canal, &request.empresa, &request.cargo);
            let reply = state
                .llm
                .complete(
                    &document,
                    prompts::RESUME_JSON_SYSTEM,
                    &prompt,
                    &request.texto_vaga,
                )
                .await
                .map_err(|e| AppError::Llm(e.to_string()))?;

            let data: render::ResumeData = sanitize::extract_json(&reply)?;

            let email_corpo = if request.canal.wants_email_body() {
                data.email_corpo.clone()
            } else {
                None
            };

            let path = render::render_resume(
                state.pdf.as_ref(),
                &data,
                &request.empresa,
                &state.config.output_dir,
            )
            .await?;
            let arquivo_path = path.to_string_lossy().into_owned();

            let id = store::insert(
                &state.db,
                &request.empresa,
                &request.cargo,
                &sent_status,
                &arquivo_path,
            )
            .await?;

            SubmitResponse {
                id,
                status: sent_status,
                texto_apresentacao: None,
                email_corpo,
                arquivo_path: Some(arquivo_path),
            }
        }
    };

    info!(
        "Submission recorded: id={} empresa={} canal={}",
        response.id,
        request.empresa,
        request.canal.label()
    );

    Ok(Json(response))
}

/// GET /api/v1/applications
pub async fn handle_list(
    State(state): State<AppState>,
) -> Result<Json<Vec<SubmissionRecord>>, AppError> {
    let records = store::list_all(&state.db).await?;
    Ok(Json(records))
}

/// PATCH /api/v1/applications/:id/status
pub async fn handle_update_status(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(request): Json<StatusUpdateRequest>,
) -> Result<StatusCode, AppError> {
    store::update_status(&state.db, id, &request.status).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// DELETE /api/v1/applications/:id
pub async fn handle_delete(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<StatusCode, AppError> {
    store::delete(&state.db, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// GET /api/v1/applications/stats
///
/// KPI counters plus daily submission volume for the dashboard bar chart.
pub async fn handle_stats(State(state): State<AppState>) -> Result<Json<StatsResponse>, AppError> {
    let summary = store::summary(&state.db).await?;
    let daily = store::daily_counts(&state.db).await?;
    Ok(Json(StatsResponse {
        summary,
        daily,
        status_options: STATUS_OPTIONS.to_vec(),
    }))
}

/// POST /api/v1/applications/export
///
/// Writes the full submission log as a CSV report at its fixed path.
pub async fn handle_export(State(state): State<AppState>) -> Result<Json<ExportResponse>, AppError> {
    let path = state.config.export_path();
    store::export_csv(&state.db, &path).await?;
    Ok(Json(ExportResponse {
        path: path.to_string_lossy().into_owned(),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use async_trait::async_trait;
    use sqlx::SqlitePool;

    use crate::config::Config;
    use crate::llm_client::{CompletionClient, LlmError};
    use crate::render::engine::PdfEngine;

    /// Canned-reply client: records nothing, returns a fixed string.
    struct CannedClient {
        reply: String,
    }

    #[async_trait]
    impl CompletionClient for CannedClient {
        async fn complete(
            &self,
            _document: &[u8],
            _system: &str,
            _prompt: &str,
            _job_description: &str,
        ) -> Result<String, LlmError> {
            Ok(self.reply.clone())
        }
    }

    /// Failing client: simulates an upstream API outage.
    struct FailingClient;

    #[async_trait]
    impl CompletionClient for FailingClient {
        async fn complete(
            &self,
            _document: &[u8],
            _system: &str,
            _prompt: &str,
            _job_description: &str,
        ) -> Result<String, LlmError> {
            Err(LlmError::Api {
                status: 500,
                message: "upstream down".to_string(),
            })
        }
    }

    struct FakePdfEngine;

    #[async_trait]
    impl PdfEngine for FakePdfEngine {
        async fn html_to_pdf(&self, html: &str) -> Result<Vec<u8>, AppError> {
            Ok(html.as_bytes().to_vec())
        }
    }

    /// Full state over an in-memory DB, temp dirs, and a stub profile PDF.
    /// Keeps the tempdir alive for the duration of the test.
    async fn test_state(llm: Arc<dyn CompletionClient>) -> (AppState, tempfile::TempDir) {
        let dir = tempfile::tempdir().unwrap();
        let profile_pdf = dir.path().join("linkedin.pdf");
        std::fs::write(&profile_pdf, b"%PDF-1.4 stub").unwrap();

        let config = Config {
            anthropic_api_key: "test-key".to_string(),
            data_dir: dir.path().join("controle_dados"),
            output_dir: dir.path().join("curriculos_gerados"),
            profile_pdf,
            port: 0,
            rust_log: "info".to_string(),
        };

        let db = SqlitePool::connect("sqlite::memory:").await.unwrap();
        store::ensure_schema(&db).await.unwrap();

        let state = AppState {
            db,
            llm,
            pdf: Arc::new(FakePdfEngine),
            config,
        };
        (state, dir)
    }

    const RESUME_REPLY: &str = r#"Claro! Aqui está o JSON:
```json
{
  "nome": "Denis Bolfarini",
  "resumo": "Analista de dados.",
  "habilidades": ["SQL", "Python"],
  "experiencias": [
    { "cargo": "Analista de Dados", "empresa": "Beta", "periodo": "2021-2024", "conquistas": ["KPI +20%"] }
  ],
  "formacao": ["Estatística"],
  "email_corpo": "Prezados, segue meu currículo em anexo."
}
```
Quer que eu ajuste algo?"#;

    fn submit(canal: Channel) -> SubmitRequest {
        SubmitRequest {
            empresa: "Acme".to_string(),
            cargo: "Data Analyst".to_string(),
            texto_vaga: "Vaga de análise de dados com SQL.".to_string(),
            canal,
        }
    }

    #[tokio::test]
    async fn test_pdf_only_submit_writes_record_and_file() {
        let llm = Arc::new(CannedClient {
            reply: RESUME_REPLY.to_string(),
        });
        let (state, _dir) = test_state(llm).await;

        let Json(response) = handle_submit(State(state.clone()), Json(submit(Channel::PdfOnly)))
            .await
            .unwrap();

        assert_eq!(response.status, "Enviado (Currículo (Apenas PDF))");
        assert!(response.email_corpo.is_none());
        let path = response.arquivo_path.unwrap();
        assert!(path.ends_with("CV_Denis_Acme.pdf"));
        assert!(std::fs::metadata(&path).unwrap().len() > 0);

        let records = store::list_all(&state.db).await.unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].status, "Enviado (Currículo (Apenas PDF))");
        assert_eq!(records[0].arquivo_path, path);
    }

    #[tokio::test]
    async fn test_email_submit_returns_email_body() {
        let llm = Arc::new(CannedClient {
            reply: RESUME_REPLY.to_string(),
        });
        let (state, _dir) = test_state(llm).await;

        let Json(response) = handle_submit(State(state), Json(submit(Channel::Email)))
            .await
            .unwrap();

        assert_eq!(response.status, "Enviado (E-mail (PDF + Texto))");
        assert_eq!(
            response.email_corpo.as_deref(),
            Some("Prezados, segue meu currículo em anexo.")
        );
        assert!(response.arquivo_path.is_some());
    }

    #[tokio::test]
    async fn test_gupy_submit_sanitizes_reply_and_skips_pdf() {
        let llm = Arc::new(CannedClient {
            reply: "Olá! Sou o texto gerado.\nTenho cinco anos de experiência com dados.\nQuer ajustes?"
                .to_string(),
        });
        let (state, _dir) = test_state(llm).await;

        let Json(response) = handle_submit(State(state.clone()), Json(submit(Channel::Gupy)))
            .await
            .unwrap();

        assert_eq!(response.status, "Enviado (Gupy (Apresente-se))");
        assert_eq!(
            response.texto_apresentacao.as_deref(),
            Some("Sou o texto gerado.\nTenho cinco anos de experiência com dados.")
        );
        assert!(response.arquivo_path.is_none());

        let records = store::list_all(&state.db).await.unwrap();
        assert_eq!(records[0].arquivo_path, "N/A");
    }

    #[tokio::test]
    async fn test_blank_field_is_rejected_before_any_call() {
        let llm = Arc::new(FailingClient);
        let (state, _dir) = test_state(llm).await;

        let mut request = submit(Channel::Gupy);
        request.empresa = "   ".to_string();

        let err = handle_submit(State(state.clone()), Json(request))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
        // FailingClient would have errored differently had the call happened;
        // either way no record may exist.
        assert!(store::list_all(&state.db).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_ai_failure_writes_no_record() {
        let llm = Arc::new(FailingClient);
        let (state, _dir) = test_state(llm).await;

        let err = handle_submit(State(state.clone()), Json(submit(Channel::PdfOnly)))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Llm(_)));
        assert!(store::list_all(&state.db).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_unparseable_reply_is_malformed_response_without_record() {
        let llm = Arc::new(CannedClient {
            reply: "Desculpe, não consegui gerar o JSON.".to_string(),
        });
        let (state, _dir) = test_state(llm).await;

        let err = handle_submit(State(state.clone()), Json(submit(Channel::PdfOnly)))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::MalformedResponse(_)));
        assert!(store::list_all(&state.db).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_stats_and_export_cover_submissions() {
        let llm = Arc::new(CannedClient {
            reply: RESUME_REPLY.to_string(),
        });
        let (state, _dir) = test_state(llm).await;

        handle_submit(State(state.clone()), Json(submit(Channel::PdfOnly)))
            .await
            .unwrap();

        let Json(stats) = handle_stats(State(state.clone())).await.unwrap();
        assert_eq!(stats.summary.total, 1);
        assert_eq!(stats.daily.len(), 1);
        assert_eq!(stats.daily[0].candidaturas, 1);
        assert!(stats.status_options.contains(&"Entrevista"));

        let Json(export) = handle_export(State(state)).await.unwrap();
        let contents = std::fs::read_to_string(&export.path).unwrap();
        assert!(contents.contains("Acme"));
    }
}
