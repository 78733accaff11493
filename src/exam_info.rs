use log::{debug, warn};
use reqwest::blocking::Client;
use reqwest::Url;
use serde::Deserialize;
use std::time::Duration;

pub const GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
const SEARCH_BASE_URL: &str = "https://www.google.com/search";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

pub const NO_EXAM_SELECTED: &str = "Nenhum exame selecionado.";
pub const MISSING_API_KEY: &str =
    "A chave de API do Gemini não foi configurada. Não é possível buscar informações.";
pub const EMPTY_ANSWER: &str = "Não foi possível obter informações sobre este exame.";
pub const LOOKUP_FAILED: &str = "Ocorreu um erro ao buscar informações sobre o exame. Verifique sua chave de API e a conexão com a internet.";

/// Source of a short explanation about an exam.
///
/// Implementations always answer with displayable text; failures are
/// reported through the text itself.
pub trait ExamInfoProvider {
    fn lookup(&self, exam_name: &str) -> String;
}

#[derive(Debug, Clone)]
pub struct GeminiExamInfo {
    client: Client,
    api_key: Option<String>,
    model: String,
    base_url: String,
}

#[derive(Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize)]
struct Candidate {
    content: Option<Content>,
}

#[derive(Deserialize)]
struct Content {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Deserialize)]
struct Part {
    text: Option<String>,
}

impl GenerateContentResponse {
    /// Text of the first candidate, parts concatenated
    fn text(self) -> Option<String> {
        let content = self.candidates.into_iter().next()?.content?;
        let text: String = content.parts.into_iter().filter_map(|part| part.text).collect();
        if text.trim().is_empty() {
            None
        } else {
            Some(text)
        }
    }
}

impl GeminiExamInfo {
    pub fn new(api_key: Option<String>, model: &str) -> Self {
        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .unwrap_or_else(|e| {
                warn!("falling back to the default HTTP client: {e}");
                Client::new()
            });

        GeminiExamInfo {
            client,
            api_key,
            model: model.to_string(),
            base_url: GEMINI_BASE_URL.to_string(),
        }
    }

    pub fn with_base_url(mut self, base_url: &str) -> Self {
        self.base_url = base_url.trim_end_matches('/').to_string();
        self
    }

    pub fn prompt(exam_name: &str) -> String {
        format!(
            "Forneça uma explicação concisa sobre o exame laboratorial \"{exam_name}\", para que serve, e quais são os valores de referência para adultos. A resposta deve ser em português do Brasil. Formate a resposta em markdown. Sempre cite as fontes no final."
        )
    }

    fn generate(&self, api_key: &str, exam_name: &str) -> Result<Option<String>, anyhow::Error> {
        let endpoint_url = format!("{}/models/{}:generateContent", self.base_url, self.model);
        let body = serde_json::json!({
            "contents": [{ "parts": [{ "text": Self::prompt(exam_name) }] }]
        });

        let response = self
            .client
            .post(&endpoint_url)
            .header("x-goog-api-key", api_key)
            .json(&body)
            .send()?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().unwrap_or_default();
            return Err(anyhow::anyhow!(
                "Gemini request failed with {status}: {error_text}"
            ));
        }

        let parsed: GenerateContentResponse = response.json()?;
        Ok(parsed.text())
    }
}

impl ExamInfoProvider for GeminiExamInfo {
    fn lookup(&self, exam_name: &str) -> String {
        let exam_name = exam_name.trim();
        if exam_name.is_empty() {
            return NO_EXAM_SELECTED.to_string();
        }

        let Some(api_key) = self.api_key.as_deref() else {
            return MISSING_API_KEY.to_string();
        };

        debug!("asking {} about '{exam_name}'", self.model);
        match self.generate(api_key, exam_name) {
            Ok(Some(text)) => text,
            Ok(None) => EMPTY_ANSWER.to_string(),
            Err(e) => {
                warn!("exam info lookup for '{exam_name}' failed: {e}");
                LOOKUP_FAILED.to_string()
            }
        }
    }
}

/// Web search link about `exam_name`, query percent-encoded
pub fn search_url(exam_name: &str) -> String {
    let query = format!("exame {exam_name} para que serve e valores de referência");
    match Url::parse_with_params(SEARCH_BASE_URL, &[("q", query.as_str())]) {
        Ok(url) => url.to_string(),
        Err(_) => SEARCH_BASE_URL.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_response_text_joins_parts() {
        let response: GenerateContentResponse = serde_json::from_str(
            r#"{"candidates":[{"content":{"parts":[{"text":"A "},{"text":"B"}]}}]}"#,
        )
        .unwrap();
        assert_eq!(response.text(), Some("A B".to_string()));
    }

    #[test]
    fn test_response_without_text_is_empty() {
        let blocked: GenerateContentResponse =
            serde_json::from_str(r#"{"promptFeedback":{"blockReason":"SAFETY"}}"#).unwrap();
        assert_eq!(blocked.text(), None);

        let blank: GenerateContentResponse =
            serde_json::from_str(r#"{"candidates":[{"content":{"parts":[{"text":"  "}]}}]}"#)
                .unwrap();
        assert_eq!(blank.text(), None);
    }

    #[test]
    fn test_prompt_names_the_exam() {
        let prompt = GeminiExamInfo::prompt("Ferritina");
        assert!(prompt.contains("\"Ferritina\""));
        assert!(prompt.contains("português do Brasil"));
    }
}
