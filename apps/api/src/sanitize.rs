//! Response sanitation — turns a raw model reply into display-ready text.
//!
//! Models routinely wrap the requested payload in greetings, explanations,
//! and follow-up questions despite being told not to. This is a best-effort
//! deterministic filter, not a parser: it is an ordered list of line
//! predicates evaluated top-down and bottom-up, so each rule stays auditable
//! and testable on its own. False positives and negatives are tolerated —
//! the cleaned text is still shown to the user for manual review.

use serde::de::DeserializeOwned;

use crate::errors::AppError;

/// Greeting tokens that mark a line as assistant preamble when they open it
/// (word-boundary match, case-insensitive). English plus the Portuguese
/// equivalents the model produces for pt-BR prompts.
const GREETING_TOKENS: &[&str] = &[
    "hello", "hi", "perfect", "excellent", "certainly", "sure", "right", "i can", "i will",
    "ready", "olá", "oi", "perfeito", "excelente", "claro", "certamente", "com certeza", "pronto",
    "posso", "vou",
];

/// Filler verb fragments that mark a leading line as assistant chatter when
/// they appear anywhere in it.
const FILLER_FRAGMENTS: &[&str] = &["let's", "vamos", "analyz", "analis", "i will", "i can", "help", "ajudar"];

/// Solicitation openers that mark a trailing line as a call-to-action
/// (word-boundary match, case-insensitive).
const SOLICITATION_TOKENS: &[&str] = &[
    "want",
    "would like",
    "can",
    "need",
    "quer",
    "gostaria",
    "precisa",
    "deseja",
    "if you want",
    "if you wish",
    "se você quiser",
    "se quiser",
    "caso queira",
];

/// Cleans a raw model reply for display. Total function, never fails:
/// fenced blocks are removed, leading greeting/filler lines and trailing
/// question/CTA lines are dropped, and the remainder is trimmed.
///
/// Idempotent: once filler is removed, a second pass finds nothing more.
pub fn sanitize(raw: &str) -> String {
    let defenced = remove_fenced_blocks(raw);
    let text = defenced
        .trim()
        .trim_start_matches(['-', '\n'])
        .trim_start();

    let lines: Vec<&str> = text.lines().collect();

    // Top scan: skip blank, greeting, and filler lines. A greeting line that
    // carries payload after its first clause keeps the payload.
    let mut idx = 0;
    let mut first_line_override: Option<String> = None;
    while idx < lines.len() {
        let line = lines[idx].trim();
        if line.is_empty() {
            idx += 1;
            continue;
        }
        if starts_with_any(line, GREETING_TOKENS) {
            if let Some(rest) = greeting_remainder(line) {
                if !starts_with_any(&rest, GREETING_TOKENS) && !contains_filler(&rest) {
                    first_line_override = Some(rest);
                    break;
                }
            }
            idx += 1;
            continue;
        }
        if contains_filler(line) {
            idx += 1;
            continue;
        }
        break;
    }

    let mut retained: Vec<String> = Vec::with_capacity(lines.len().saturating_sub(idx));
    for (offset, line) in lines[idx..].iter().enumerate() {
        if offset == 0 {
            if let Some(ref rest) = first_line_override {
                retained.push(rest.clone());
                continue;
            }
        }
        retained.push((*line).to_string());
    }

    // Bottom scan: drop blank lines, questions, and solicitation lines.
    while let Some(last) = retained.last() {
        let line = last.trim();
        if line.is_empty() || line.ends_with('?') || starts_with_any(line, SOLICITATION_TOKENS) {
            retained.pop();
        } else {
            break;
        }
    }

    retained.join("\n").trim().to_string()
}

/// Removes every substring delimited by a pair of triple-backtick fences.
/// An unmatched opening fence is left in place.
fn remove_fenced_blocks(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut rest = text;
    while let Some(open) = rest.find("```") {
        match rest[open + 3..].find("```") {
            Some(close) => {
                out.push_str(&rest[..open]);
                rest = &rest[open + 3 + close + 3..];
            }
            None => break,
        }
    }
    out.push_str(rest);
    out
}

/// Case-insensitive word-boundary prefix match against a token list.
fn starts_with_any(line: &str, tokens: &[&str]) -> bool {
    let lower = line.to_lowercase();
    tokens.iter().any(|token| {
        lower.starts_with(token)
            && lower[token.len()..]
                .chars()
                .next()
                .map_or(true, |c| !c.is_alphanumeric())
    })
}

fn contains_filler(line: &str) -> bool {
    let lower = line.to_lowercase();
    FILLER_FRAGMENTS.iter().any(|f| lower.contains(f))
}

/// For a line opening with a greeting clause ("Hello! Here is the text."),
/// returns the payload after the clause's terminating punctuation, if any.
fn greeting_remainder(line: &str) -> Option<String> {
    let pos = line.find(['!', '.', ':', ','])?;
    let rest = line[pos + 1..].trim();
    if rest.is_empty() {
        None
    } else {
        Some(rest.to_string())
    }
}

/// Tolerant extraction of a JSON payload embedded in a free-text reply.
///
/// Order: direct parse of the trimmed text, then the contents of the first
/// fenced block. Anything else is a `MalformedResponse` — no chained
/// string-split fallbacks.
pub fn extract_json<T: DeserializeOwned>(raw: &str) -> Result<T, AppError> {
    let trimmed = raw.trim();

    match serde_json::from_str(trimmed) {
        Ok(value) => Ok(value),
        Err(direct_err) => match first_fenced_block(trimmed) {
            Some(inner) => serde_json::from_str(inner.trim())
                .map_err(|e| AppError::MalformedResponse(format!("fenced block: {e}"))),
            None => Err(AppError::MalformedResponse(format!(
                "reply is neither a JSON object nor a fenced JSON block: {direct_err}"
            ))),
        },
    }
}

/// Returns the contents of the first ```-fenced block, with any language tag
/// on the opening fence line stripped.
fn first_fenced_block(text: &str) -> Option<&str> {
    let open = text.find("```")?;
    let after_open = &text[open + 3..];
    let close = after_open.find("```")?;
    let inner = &after_open[..close];
    // Drop a language tag such as `json` on the opening line.
    match inner.split_once('\n') {
        Some((tag, body)) if !tag.trim().is_empty() && !tag.trim().starts_with('{') => Some(body),
        _ => Some(inner),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::Value;

    #[test]
    fn test_empty_input_yields_empty_output() {
        assert_eq!(sanitize(""), "");
        assert_eq!(sanitize("   \n  "), "");
    }

    #[test]
    fn test_clean_input_is_identity_modulo_trimming() {
        assert_eq!(sanitize("Plain answer."), "Plain answer.");
        assert_eq!(sanitize("  Plain answer.\n"), "Plain answer.");
    }

    #[test]
    fn test_fence_only_input_yields_empty_string() {
        assert_eq!(sanitize("```json\n{}\n```"), "");
    }

    #[test]
    fn test_greeting_and_trailing_question_are_dropped() {
        assert_eq!(
            sanitize("Hello! Here is the text.\nWould you like changes?"),
            "Here is the text."
        );
    }

    #[test]
    fn test_portuguese_greeting_and_cta_are_dropped() {
        let raw = "Olá! Vou analisar seu currículo.\nSou engenheiro de dados com 5 anos de experiência.\nQuer que eu ajuste algo?";
        assert_eq!(
            sanitize(raw),
            "Sou engenheiro de dados com 5 anos de experiência."
        );
    }

    #[test]
    fn test_entirely_filler_input_yields_empty_output() {
        let raw = "Hello!\nLet's analyze your resume.\nWould you like me to continue?";
        assert_eq!(sanitize(raw), "");
    }

    #[test]
    fn test_leading_dashes_and_blank_lines_are_stripped() {
        assert_eq!(sanitize("---\n\nTexto final."), "Texto final.");
    }

    #[test]
    fn test_interior_blank_lines_survive() {
        let raw = "Primeiro parágrafo.\n\nSegundo parágrafo.";
        assert_eq!(sanitize(raw), raw);
    }

    #[test]
    fn test_unmatched_fence_is_left_in_place() {
        assert_eq!(sanitize("Texto com ``` solto."), "Texto com ``` solto.");
    }

    #[test]
    fn test_word_boundary_greeting_match_spares_lookalikes() {
        // "Ready" is a greeting token; "Readers" must not match it.
        assert_eq!(sanitize("Readers love dashboards."), "Readers love dashboards.");
    }

    #[test]
    fn test_trailing_solicitation_lines_are_dropped() {
        let raw = "Texto da carta.\nGostaria de mais alguma coisa";
        assert_eq!(sanitize(raw), "Texto da carta.");
    }

    #[test]
    fn test_sanitize_is_idempotent() {
        let samples = [
            "",
            "Plain answer.",
            "```json\n{}\n```",
            "Hello! Here is the text.\nWould you like changes?",
            "Olá! Vou analisar.\nTexto útil.\nQuer ajustes?",
            "---\nTexto final.\n\nPrecisa de algo mais?",
            "Primeiro parágrafo.\n\nSegundo parágrafo.",
        ];
        for sample in samples {
            let once = sanitize(sample);
            assert_eq!(sanitize(&once), once, "not idempotent for {sample:?}");
        }
    }

    #[test]
    fn test_extract_json_parses_bare_object() {
        let value: Value = extract_json("{\"nome\": \"Denis\"}").unwrap();
        assert_eq!(value["nome"], "Denis");
    }

    #[test]
    fn test_extract_json_parses_fenced_object_with_tag() {
        let raw = "Claro! Aqui está:\n```json\n{\"nome\": \"Denis\"}\n```\nQuer mais algo?";
        let value: Value = extract_json(raw).unwrap();
        assert_eq!(value["nome"], "Denis");
    }

    #[test]
    fn test_extract_json_parses_fenced_object_without_tag() {
        let raw = "```\n{\"habilidades\": [\"SQL\"]}\n```";
        let value: Value = extract_json(raw).unwrap();
        assert_eq!(value["habilidades"][0], "SQL");
    }

    #[test]
    fn test_extract_json_rejects_prose() {
        let err = extract_json::<Value>("Não consegui gerar o JSON pedido.").unwrap_err();
        assert!(matches!(err, AppError::MalformedResponse(_)));
    }

    #[test]
    fn test_extract_json_rejects_garbage_inside_fence() {
        let err = extract_json::<Value>("```json\nnot json at all\n```").unwrap_err();
        assert!(matches!(err, AppError::MalformedResponse(_)));
    }
}
