//! Résumé rendering — maps the model's structured reply onto the fixed
//! SempreIT HTML layout and converts it to a PDF on disk.
//!
//! The HTML step is pure and fully testable; the HTML→PDF step sits behind
//! the [`PdfEngine`] trait so tests never need a browser.

pub mod engine;

use std::io::Write;
use std::path::{Path, PathBuf};

use minijinja::Environment;
use serde::{Deserialize, Serialize};

use crate::errors::AppError;
use crate::prompts::{CANDIDATE_CONTACT, CANDIDATE_FILE_TOKEN, CANDIDATE_NAME};
use engine::PdfEngine;

/// One professional experience block. Field names mirror the JSON keys the
/// prompt demands from the model.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Experience {
    #[serde(default = "default_role")]
    pub cargo: String,
    #[serde(default = "default_company")]
    pub empresa: String,
    #[serde(default = "default_period")]
    pub periodo: String,
    #[serde(default)]
    pub conquistas: Vec<String>,
}

fn default_role() -> String {
    "Cargo".to_string()
}

fn default_company() -> String {
    "Empresa".to_string()
}

fn default_period() -> String {
    "Período".to_string()
}

/// Structured résumé content parsed from the model's JSON reply. Ephemeral:
/// exists only for the duration of one render. Every field is optional on
/// the wire; fixed fallbacks are applied before templating.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ResumeData {
    #[serde(default)]
    pub nome: String,
    #[serde(default)]
    pub contato: String,
    #[serde(default)]
    pub resumo: String,
    #[serde(default)]
    pub habilidades: Vec<String>,
    #[serde(default)]
    pub experiencias: Vec<Experience>,
    #[serde(default)]
    pub formacao: Vec<String>,
    /// Present only when the prompt asked for it (e-mail channel).
    #[serde(default)]
    pub email_corpo: Option<String>,
}

impl ResumeData {
    /// Fills the identity fields with the fixed candidate constants when the
    /// model left them blank.
    fn with_defaults(mut self) -> Self {
        if self.nome.trim().is_empty() {
            self.nome = CANDIDATE_NAME.to_string();
        }
        if self.contato.trim().is_empty() {
            self.contato = CANDIDATE_CONTACT.to_string();
        }
        self
    }
}

/// Fixed A4 layout: header, then four sections in a fixed order. Registered
/// under an `.html` name so minijinja auto-escapes every interpolated field.
const RESUME_TEMPLATE: &str = r#"<html><head><style>
@page { size: A4; margin: 1.2cm; }
body { font-family: Helvetica, Arial, sans-serif; font-size: 9pt; color: #333; line-height: 1.4; }
.header { border-bottom: 2px solid #1a3a5a; padding-bottom: 5px; margin-bottom: 10px; }
h1 { color: #1a3a5a; font-size: 18pt; margin: 0; text-transform: uppercase; font-weight: bold; }
.contato { font-size: 9pt; color: #666; margin-top: 2px; }
.section-title { color: #1a3a5a; font-weight: bold; font-size: 11pt; border-bottom: 1px solid #ddd; text-transform: uppercase; margin-top: 15px; margin-bottom: 5px; }
.exp-item { margin-bottom: 10px; }
.exp-header { font-weight: bold; color: #222; font-size: 10pt; }
li { margin-bottom: 2px; text-align: justify; }
ul { margin-top: 3px; }
</style></head><body>
<div class="header"><h1>{{ nome }}</h1><div class="contato">{{ contato }}</div></div>
<div class="section-title">Resumo Profissional</div>
<p>{{ resumo }}</p>
<div class="section-title">Habilidades Técnicas</div>
<p>{{ habilidades|join(", ") }}</p>
<div class="section-title">Experiência Profissional</div>
{% for exp in experiencias %}<div class="exp-item"><div class="exp-header">{{ exp.cargo }} | {{ exp.empresa }} ({{ exp.periodo }})</div>
<ul>{% for c in exp.conquistas %}<li>{{ c }}</li>{% endfor %}</ul></div>
{% endfor %}<div class="section-title">Formação e Certificações</div>
<ul>{% for f in formacao %}<li>{{ f }}</li>{% endfor %}</ul>
</body></html>"#;

/// Renders the fixed résumé layout to an HTML string. Experience entries and
/// achievement bullets keep their input order; nothing is re-sorted.
pub fn render_html(data: &ResumeData) -> Result<String, AppError> {
    let data = data.clone().with_defaults();

    let mut env = Environment::new();
    env.add_template("resume.html", RESUME_TEMPLATE)
        .map_err(|e| AppError::Render(format!("template error: {e}")))?;

    let template = env
        .get_template("resume.html")
        .map_err(|e| AppError::Render(format!("template error: {e}")))?;

    template
        .render(&data)
        .map_err(|e| AppError::Render(format!("template render failed: {e}")))
}

/// Renders the résumé PDF for `company` into `output_dir` and returns its
/// path. The filename is deterministic (`CV_Denis_<Company>.pdf`, spaces as
/// underscores) and an existing file is silently replaced. The PDF is
/// written to a temp file first so a failed render never leaves a partial
/// file at the final path.
pub async fn render_resume(
    engine: &dyn PdfEngine,
    data: &ResumeData,
    company: &str,
    output_dir: &Path,
) -> Result<PathBuf, AppError> {
    let html = render_html(data)?;
    let pdf = engine.html_to_pdf(&html).await?;

    std::fs::create_dir_all(output_dir)
        .map_err(|e| AppError::Render(format!("cannot create {}: {e}", output_dir.display())))?;

    let filename = format!(
        "CV_{}_{}.pdf",
        CANDIDATE_FILE_TOKEN,
        company.replace(' ', "_")
    );
    let path = output_dir.join(filename);

    let mut tmp = tempfile::NamedTempFile::new_in(output_dir)
        .map_err(|e| AppError::Render(format!("cannot create temp file: {e}")))?;
    tmp.write_all(&pdf)
        .map_err(|e| AppError::Render(format!("cannot write PDF: {e}")))?;
    tmp.persist(&path)
        .map_err(|e| AppError::Render(format!("cannot persist PDF: {e}")))?;

    Ok(path)
}
