//! Prompt construction — pure string assembly, no I/O, never fails.
//!
//! Each submission channel maps to exactly one prompt-building strategy.
//! The channel is an enum, not a label substring match, so the orchestrator
//! cannot drift out of sync with the UI radio options.

use serde::{Deserialize, Serialize};

/// Fixed single-user identity. Baked into the prompt JSON skeleton and used
/// as the renderer fallback when the model omits these fields.
pub const CANDIDATE_NAME: &str = "Denis Bolfarini";
pub const CANDIDATE_CONTACT: &str = "denis.bolfarini@gmail.com | 11948103499 | São Paulo, SP";
/// First-name token used in generated PDF filenames (`CV_<token>_<company>.pdf`).
pub const CANDIDATE_FILE_TOKEN: &str = "Denis";

/// System prompt for the structured résumé channels — enforces JSON-only output.
pub const RESUME_JSON_SYSTEM: &str = "You are a precise, structured assistant. \
    You MUST respond with valid JSON only. \
    Do NOT include any text outside the JSON object. \
    Do NOT use markdown code fences. \
    Do NOT include explanations or apologies.";

/// System prompt for the Gupy introduction channel — plain text, no metadata.
pub const INTRO_SYSTEM: &str = "You are a career coach writing on behalf of the candidate. \
    Respond with the requested text only. \
    Do NOT include greetings, explanations, or follow-up questions.";

/// Default closing instruction for the introduction prompt when the caller
/// supplies a blank one.
const DEFAULT_INTRO_CLOSING: &str = "Escreva um texto de apresentação em primeira pessoa, \
conectando a experiência extraída do PDF aos desafios da vaga. \
Máximo 1500 caracteres, tom persuasivo e profissional.";

/// Submission pathway chosen by the user. Serialized as the exact radio
/// labels the dashboard shows, so request bodies carry the human-facing
/// strings while the code branches on variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Channel {
    #[serde(rename = "Gupy (Apresente-se)")]
    Gupy,
    #[serde(rename = "E-mail (PDF + Texto)")]
    Email,
    #[serde(rename = "Currículo (Apenas PDF)")]
    PdfOnly,
}

impl Channel {
    /// The user-facing label, identical to the serde representation.
    pub fn label(&self) -> &'static str {
        match self {
            Channel::Gupy => "Gupy (Apresente-se)",
            Channel::Email => "E-mail (PDF + Texto)",
            Channel::PdfOnly => "Currículo (Apenas PDF)",
        }
    }

    /// Status recorded in the submission log for this channel.
    pub fn sent_status(&self) -> String {
        format!("Enviado ({})", self.label())
    }

    /// Whether the structured reply must carry an e-mail body alongside the
    /// résumé fields.
    pub fn wants_email_body(&self) -> bool {
        matches!(self, Channel::Email)
    }
}

/// Builds the structured-résumé prompt: recruiter persona, strict JSON
/// schema over the candidate's fields, `email_corpo` key only for the
/// e-mail channel.
///
/// Empty `company`/`role` are allowed and simply yield a less specific
/// prompt; validation happens upstream in the handler.
pub fn build_resume_prompt(channel: Channel, company: &str, role: &str) -> String {
    let mut lines = vec![
        format!(
            "Atue como Especialista em Recrutamento. Analise o PDF e a vaga para {role} na {company}."
        ),
        "Retorne RIGOROSAMENTE um JSON com:".to_string(),
        "{".to_string(),
        format!("  \"nome\": \"{CANDIDATE_NAME}\","),
        format!("  \"contato\": \"{CANDIDATE_CONTACT}\","),
        "  \"resumo\": \"Resumo focado em dados\",".to_string(),
        "  \"habilidades\": [\"item1\", \"item2\"],".to_string(),
        "  \"experiencias\": [".to_string(),
        "    { \"cargo\": \"título\", \"empresa\": \"nome\", \"periodo\": \"datas\", \"conquistas\": [\"ponto1\"] }".to_string(),
        "  ],".to_string(),
        "  \"formacao\": [\"graduação\"],".to_string(),
    ];

    if channel.wants_email_body() {
        lines.push("  \"email_corpo\": \"texto para o e-mail\"".to_string());
    }

    lines.push("}".to_string());
    lines.push("Mantenha os dados reais do PDF e use KPIs.".to_string());

    lines.join("\n")
}

/// Builds the Gupy "Apresente-se" prompt: career-coach persona, first-person
/// presentation text grounded in the attached profile PDF, hard 1500-char
/// cap, no closing questions or CTAs.
pub fn build_intro_prompt(job_description: &str, closing_instruction: &str) -> String {
    let closing = if closing_instruction.trim().is_empty() {
        DEFAULT_INTRO_CLOSING
    } else {
        closing_instruction
    };

    format!(
        "Você é Alia IA, uma especialista em carreira e coach de recolocação profissional. \
Seu tom é encorajador, prático e voltado para destacar o candidato.\n\n\
ATENÇÃO: Analise o PDF do candidato que eu irei fornecer e extraia os principais pontos da \
experiência profissional (responsabilidades, resultados e skills) para que sejam \
relacionados à vaga abaixo.\n\n\
Contexto da vaga (descrição):\n{job_description}\n\n\
Instruções para produção (siga RIGOROSAMENTE):\n\
- Extraia e use informações do PDF fornecido.\n\
- Escreva o texto em primeira pessoa.\n\
- Conecte diretamente a experiência do candidato com os principais desafios/atividades da vaga.\n\
- Seja persuasivo, objetivo e profissional.\n\
- Máximo 1500 caracteres.\n\
- NÃO faça perguntas ao final, nem inclua CTAs ou solicitações de confirmação.\n\n\
RETORNE APENAS O TEXTO DA CARTA DE APRESENTAÇÃO: NÃO inclua saudações da assistente, \
explicações, instruções, metadados, ou qualquer texto adicional. Comece diretamente com o \
texto que deve ser colado no campo 'Apresente-se'.\n\n\
TEXTO A GERAR:\n{closing}\n"
    )
}
