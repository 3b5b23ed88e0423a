//! LLM gateway: a uniform "send prompt, get completion" contract over a
//! closed set of providers.
//!
//! Each backend owns exactly three concerns: build the provider-specific
//! request body from the prompt, attach the provider-specific credential,
//! and pull the single completion string out of the provider-specific
//! response envelope. Everything else — mode branching, prompt content,
//! retries (there are none in the core) — lives above this layer.
//!
//! Body construction and envelope parsing are pure functions in each
//! backend module so they can be unit-tested without HTTP.

pub mod gemini;
pub mod openrouter;

use crate::config::{AnalyzerConfig, Provider};
use crate::error::{AnalyzeError, BackendError};
use async_trait::async_trait;
use reqwest::StatusCode;
use std::sync::Arc;
use std::time::Duration;

pub use gemini::GeminiBackend;
pub use openrouter::OpenRouterBackend;

/// A concrete LLM provider integration.
#[async_trait]
pub trait LlmBackend: Send + Sync {
    /// Provider name, for logs and error messages.
    fn name(&self) -> &str;

    /// Send one prompt, return the completion text.
    ///
    /// No retries: transient failures surface as
    /// [`BackendError::Unavailable`] and retry policy is the caller's.
    async fn complete(&self, prompt: &str) -> Result<String, BackendError>;
}

/// Construct the backend named by the configuration.
///
/// Resolved exactly once, at `Analyzer` construction. The credential
/// comes from `config.api_key` or, failing that, the provider's key
/// environment variable; a missing credential fails here with a hint
/// naming the variable, never mid-request.
pub fn resolve_backend(config: &AnalyzerConfig) -> Result<Arc<dyn LlmBackend>, AnalyzeError> {
    let api_key = match &config.api_key {
        Some(key) => key.clone(),
        None => std::env::var(config.provider.key_env_var())
            .ok()
            .filter(|k| !k.is_empty())
            .ok_or_else(|| AnalyzeError::ProviderNotConfigured {
                provider: config.provider.to_string(),
                hint: format!("Set {} or configure api_key.", config.provider.key_env_var()),
            })?,
    };

    let client = http_client(config.api_timeout_secs).map_err(|e| AnalyzeError::Internal(
        format!("Failed to build HTTP client: {e}"),
    ))?;
    let model = config.model_or_default().to_string();

    Ok(match config.provider {
        Provider::Gemini => Arc::new(GeminiBackend::new(
            client,
            api_key,
            model,
            config.base_url.clone(),
        )),
        Provider::OpenRouter => Arc::new(OpenRouterBackend::new(
            client,
            api_key,
            model,
            config.base_url.clone(),
        )),
    })
}

/// Shared HTTP client with the bounded per-call timeout.
fn http_client(timeout_secs: u64) -> Result<reqwest::Client, reqwest::Error> {
    reqwest::Client::builder()
        .timeout(Duration::from_secs(timeout_secs))
        .build()
}

/// Map a non-2xx status onto the gateway taxonomy.
///
/// 401/403 mean the credential was rejected; 408/429 and 5xx mean the
/// provider cannot serve us right now; the remaining 4xx mean our
/// request was malformed for the provider's published shape (a protocol
/// bug on our side, not an outage).
pub(crate) fn classify_status(provider: &str, status: StatusCode, body: &str) -> BackendError {
    let detail = format!("HTTP {status}: {}", truncate(body, 300));
    match status.as_u16() {
        401 | 403 => BackendError::Auth {
            provider: provider.to_string(),
            detail,
        },
        408 | 429 => BackendError::Unavailable {
            provider: provider.to_string(),
            detail,
        },
        400..=499 => BackendError::Protocol {
            provider: provider.to_string(),
            detail,
        },
        _ => BackendError::Unavailable {
            provider: provider.to_string(),
            detail,
        },
    }
}

/// Map a reqwest transport failure (refused connection, timeout, TLS)
/// onto [`BackendError::Unavailable`].
pub(crate) fn classify_transport(provider: &str, err: reqwest::Error) -> BackendError {
    let detail = if err.is_timeout() {
        "request timed out".to_string()
    } else {
        err.to_string()
    };
    BackendError::Unavailable {
        provider: provider.to_string(),
        detail,
    }
}

fn truncate(s: &str, max: usize) -> &str {
    match s.char_indices().nth(max) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}
