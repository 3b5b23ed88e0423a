//! OpenRouter backend (OpenAI-compatible `chat/completions` API).
//!
//! Request: `POST {base}/api/v1/chat/completions` with a bearer token and
//! `{"model":…,"messages":[{"role":"user","content": prompt}]}`. The
//! completion is at `choices[0].message.content`.

use crate::error::BackendError;
use crate::gateway::{classify_status, classify_transport, LlmBackend};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;

const PROVIDER: &str = "openrouter";
const DEFAULT_BASE_URL: &str = "https://openrouter.ai";

// ── Wire types ───────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
pub(crate) struct ChatCompletionRequest {
    model: String,
    messages: Vec<ChatMessage>,
}

#[derive(Debug, Serialize)]
struct ChatMessage {
    role: &'static str,
    content: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ChatCompletionResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: Option<ResponseMessage>,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    content: Option<String>,
}

// ── Pure request/response translation ────────────────────────────────────

/// Build the request body for one prompt.
pub(crate) fn build_body(model: &str, prompt: &str) -> ChatCompletionRequest {
    ChatCompletionRequest {
        model: model.to_string(),
        messages: vec![ChatMessage {
            role: "user",
            content: prompt.to_string(),
        }],
    }
}

/// Pull the completion out of the response envelope.
pub(crate) fn completion_text(response: ChatCompletionResponse) -> Option<String> {
    response.choices.into_iter().next()?.message?.content
}

// ── Backend ──────────────────────────────────────────────────────────────

pub struct OpenRouterBackend {
    client: reqwest::Client,
    api_key: String,
    model: String,
    base_url: String,
}

impl OpenRouterBackend {
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
}

#[async_trait]
impl LlmBackend for OpenRouterBackend {
    fn name(&self) -> &str {
        PROVIDER
    }

    async fn complete(&self, prompt: &str) -> Result<String, BackendError> {
        debug!(
            "OpenRouter call: model={}, prompt {} chars",
            self.model,
            prompt.len()
        );

        let response = self
            .client
            .post(format!("{}/api/v1/chat/completions", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&build_body(&self.model, prompt))
            .send()
            .await
            .map_err(|e| classify_transport(PROVIDER, e))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(classify_status(PROVIDER, status, &body));
        }

        let envelope: ChatCompletionResponse =
            response.json().await.map_err(|e| BackendError::Protocol {
                provider: PROVIDER.to_string(),
                detail: format!("invalid JSON envelope: {e}"),
            })?;

        completion_text(envelope).ok_or_else(|| BackendError::Protocol {
            provider: PROVIDER.to_string(),
            detail: "response carried no choices[0].message.content".to_string(),
        })
    }
}
