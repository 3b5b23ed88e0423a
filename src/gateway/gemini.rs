//! Google Gemini backend (`generateContent` API).
//!
//! Request: `POST {base}/v1beta/models/{model}:generateContent?key={key}`
//! with `{"contents":[{"parts":[{"text": prompt}]}]}`. The completion is
//! at `candidates[0].content.parts[0].text`; a 2xx response without that
//! path is a protocol error, never silently empty text.

use crate::error::BackendError;
use crate::gateway::{classify_status, classify_transport, LlmBackend};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;

const PROVIDER: &str = "gemini";
const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com";

// ── Wire types ───────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
pub(crate) struct GenerateContentRequest {
    contents: Vec<Content>,
}

#[derive(Debug, Serialize)]
struct Content {
    parts: Vec<Part>,
}

#[derive(Debug, Serialize)]
struct Part {
    text: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Debug, Deserialize)]
struct CandidatePart {
    text: Option<String>,
}

// ── Pure request/response translation ────────────────────────────────────

/// Build the request body for one prompt.
pub(crate) fn build_body(prompt: &str) -> GenerateContentRequest {
    GenerateContentRequest {
        contents: vec![Content {
            parts: vec![Part {
                text: prompt.to_string(),
            }],
        }],
    }
}

/// Pull the completion out of the response envelope.
pub(crate) fn completion_text(response: GenerateContentResponse) -> Option<String> {
    response
        .candidates
        .into_iter()
        .next()?
        .content?
        .parts
        .into_iter()
        .next()?
        .text
}

// ── Backend ──────────────────────────────────────────────────────────────

pub struct GeminiBackend {
    client: reqwest::Client,
    api_key: String,
    model: String,
    base_url: String,
}

impl GeminiBackend {
    pub fn new(
        client: reqwest::Client,
        api_key: String,
        model: String,
        base_url: Option<String>,
    ) -> Self {
        Self {
            client,
            api_key,
            model,
            base_url: base_url.unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
        }
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/v1beta/models/{}:generateContent?key={}",
            self.base_url, self.model, self.api_key
        )
    }
}

#[async_trait]
impl LlmBackend for GeminiBackend {
    fn name(&self) -> &str {
        PROVIDER
    }

    async fn complete(&self, prompt: &str) -> Result<String, BackendError> {
        debug!("Gemini call: model={}, prompt {} chars", self.model, prompt.len());

        let response = self
            .client
            .post(self.endpoint())
            .json(&build_body(prompt))
            .send()
            .await
            .map_err(|e| classify_transport(PROVIDER, e))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(classify_status(PROVIDER, status, &body));
        }

        let envelope: GenerateContentResponse =
            response.json().await.map_err(|e| BackendError::Protocol {
                provider: PROVIDER.to_string(),
                detail: format!("invalid JSON envelope: {e}"),
            })?;

        completion_text(envelope).ok_or_else(|| BackendError::Protocol {
            provider: PROVIDER.to_string(),
            detail: "response carried no candidates[0].content.parts[0].text".to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn body_embeds_prompt_at_published_path() {
        let body = serde_json::to_value(build_body("rank these")).unwrap();
        assert_eq!(body["contents"][0]["parts"][0]["text"], "rank these");
    }

    #[test]
    fn completion_is_read_from_first_candidate() {
        let envelope: GenerateContentResponse = serde_json::from_value(serde_json::json!({
            "candidates": [
                {"content": {"parts": [{"text": "the answer"}]}},
                {"content": {"parts": [{"text": "ignored"}]}}
            ]
        }))
        .unwrap();
        assert_eq!(completion_text(envelope).as_deref(), Some("the answer"));
    }

    #[test]
    fn empty_candidates_is_no_completion() {
        let envelope: GenerateContentResponse =
            serde_json::from_value(serde_json::json!({"candidates": []})).unwrap();
        assert_eq!(completion_text(envelope), None);
    }

    #[test]
    fn missing_parts_is_no_completion() {
        let envelope: GenerateContentResponse = serde_json::from_value(serde_json::json!({
            "candidates": [{"content": {"parts": []}}]
        }))
        .unwrap();
        assert_eq!(completion_text(envelope), None);
    }
}
