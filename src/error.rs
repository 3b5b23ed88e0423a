//! Error types for the resume-analyzer library.
//!
//! Two distinct error types reflect two distinct failure scopes:
//!
//! * [`AnalyzeError`] — failures of an analysis request as a whole
//!   (invalid request fields, extraction failure, backend failure, audit
//!   failure when configured fatal). Returned as `Err(AnalyzeError)` from
//!   [`crate::analyze::Analyzer::analyze`].
//!
//! * [`BackendError`] — the LLM gateway taxonomy. Every backend maps its
//!   provider-specific failures onto exactly three cases so the
//!   orchestrator never has to know which provider is configured:
//!   unreachable/overloaded ([`BackendError::Unavailable`]), rejected
//!   credential ([`BackendError::Auth`]), and unexpected response shape
//!   ([`BackendError::Protocol`]).
//!
//! A backend failure in summary mode is wrapped in
//! [`AnalyzeError::Backend`] together with the filename of the document
//! whose call failed, so a single bad call stays attributable.

use thiserror::Error;

/// All errors returned by an analysis request.
#[derive(Debug, Error)]
pub enum AnalyzeError {
    // ── Request validation ────────────────────────────────────────────────
    /// The request is malformed and was never started.
    #[error("Invalid request: {reason}")]
    Validation { reason: String },

    // ── Extraction ────────────────────────────────────────────────────────
    /// OCR or rasterisation failed for one document; the whole request is
    /// aborted and the failing document is named.
    #[error("Text extraction failed for '{filename}': {detail}")]
    Extraction { filename: String, detail: String },

    // ── LLM backend ───────────────────────────────────────────────────────
    /// An LLM call failed. `document` is set in summary mode, where each
    /// call belongs to exactly one document; `None` in query mode.
    #[error("LLM call failed{}: {}", document_suffix(.document), .source)]
    Backend {
        document: Option<String>,
        #[source]
        source: BackendError,
    },

    // ── Audit ─────────────────────────────────────────────────────────────
    /// The audit append failed and the analyzer is configured to treat
    /// that as fatal. With the default best-effort policy this variant is
    /// never returned; the failure is logged instead.
    #[error("Audit record could not be written: {detail}")]
    AuditWrite { detail: String },

    // ── Config ────────────────────────────────────────────────────────────
    /// The configured provider cannot be constructed (missing credential
    /// etc.). Surfaces at `Analyzer` construction, not per request.
    #[error("LLM provider '{provider}' is not configured.\n{hint}")]
    ProviderNotConfigured { provider: String, hint: String },

    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // ── Catch-all ─────────────────────────────────────────────────────────
    /// Unexpected internal error (panicked blocking task etc.).
    #[error("Internal error: {0}")]
    Internal(String),
}

fn document_suffix(document: &Option<String>) -> String {
    match document {
        Some(f) => format!(" for '{f}'"),
        None => String::new(),
    }
}

/// Failure taxonomy shared by every LLM backend.
#[derive(Debug, Error)]
pub enum BackendError {
    /// The provider could not be reached or did not answer in time
    /// (network error, timeout, HTTP 429/5xx).
    #[error("provider '{provider}' unavailable: {detail}")]
    Unavailable { provider: String, detail: String },

    /// The provider rejected the credential (HTTP 401/403).
    #[error("provider '{provider}' rejected the credential: {detail}")]
    Auth { provider: String, detail: String },

    /// The provider answered 2xx but the response envelope did not carry
    /// a completion where the published API shape says it should.
    #[error("provider '{provider}' returned an unexpected response: {detail}")]
    Protocol { provider: String, detail: String },
}

impl BackendError {
    /// Provider name carried by every variant.
    pub fn provider(&self) -> &str {
        match self {
            BackendError::Unavailable { provider, .. }
            | BackendError::Auth { provider, .. }
            | BackendError::Protocol { provider, .. } => provider,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extraction_names_the_document() {
        let e = AnalyzeError::Extraction {
            filename: "cv_ana.pdf".into(),
            detail: "page 2 rasterisation failed".into(),
        };
        let msg = e.to_string();
        assert!(msg.contains("cv_ana.pdf"), "got: {msg}");
        assert!(msg.contains("page 2"), "got: {msg}");
    }

    #[test]
    fn backend_error_in_summary_mode_names_the_document() {
        let e = AnalyzeError::Backend {
            document: Some("cv_bruno.jpg".into()),
            source: BackendError::Unavailable {
                provider: "gemini".into(),
                detail: "HTTP 503".into(),
            },
        };
        let msg = e.to_string();
        assert!(msg.contains("cv_bruno.jpg"), "got: {msg}");
        assert!(msg.contains("gemini"), "got: {msg}");
    }

    #[test]
    fn backend_error_in_query_mode_has_no_document_suffix() {
        let e = AnalyzeError::Backend {
            document: None,
            source: BackendError::Auth {
                provider: "openrouter".into(),
                detail: "HTTP 401".into(),
            },
        };
        assert!(!e.to_string().contains("for '"));
    }

    #[test]
    fn backend_error_provider_accessor() {
        let e = BackendError::Protocol {
            provider: "gemini".into(),
            detail: "missing candidates".into(),
        };
        assert_eq!(e.provider(), "gemini");
    }
}
