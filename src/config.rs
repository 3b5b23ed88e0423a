//! Configuration types for the analyzer.
//!
//! All behaviour is controlled through [`AnalyzerConfig`], built via its
//! [`AnalyzerConfigBuilder`]. Keeping every knob in one struct makes it
//! trivial to share configs across threads, serialise them for logging,
//! and diff two runs to understand why their outputs differ.
//!
//! Provider, model, and credential are resolved here exactly once — at
//! `Analyzer` construction — never per request. A missing credential
//! therefore fails process startup, not the Nth analysis call.

use crate::error::AnalyzeError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// The closed set of supported LLM providers.
///
/// Adding a provider means adding a variant here plus one backend module
/// under `gateway/`; the orchestrator is untouched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Provider {
    /// Google Gemini `generateContent` API (default).
    #[default]
    Gemini,
    /// OpenRouter OpenAI-compatible `chat/completions` API.
    OpenRouter,
}

impl Provider {
    /// Parse a provider name as found in `LLM_PROVIDER`.
    pub fn parse(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "gemini" => Some(Provider::Gemini),
            "openrouter" => Some(Provider::OpenRouter),
            _ => None,
        }
    }

    /// Model used when the configuration names none.
    pub fn default_model(&self) -> &'static str {
        match self {
            Provider::Gemini => "gemini-2.5-flash",
            Provider::OpenRouter => "anthropic/claude-4.5-haiku",
        }
    }

    /// Environment variable holding this provider's API key.
    pub fn key_env_var(&self) -> &'static str {
        match self {
            Provider::Gemini => "GEMINI_API_KEY",
            Provider::OpenRouter => "OPENROUTER_API_KEY",
        }
    }
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Provider::Gemini => write!(f, "gemini"),
            Provider::OpenRouter => write!(f, "openrouter"),
        }
    }
}

/// Configuration for the analyzer.
///
/// Built via [`AnalyzerConfig::builder()`] or [`AnalyzerConfig::from_env()`].
///
/// # Example
/// ```rust
/// use resume_analyzer::{AnalyzerConfig, Provider};
///
/// let config = AnalyzerConfig::builder()
///     .provider(Provider::Gemini)
///     .api_key("test-key")
///     .dpi(150)
///     .build()
///     .unwrap();
/// ```
#[derive(Debug, Clone)]
pub struct AnalyzerConfig {
    /// Which LLM provider to dispatch completions to. Default: Gemini.
    pub provider: Provider,

    /// Model identifier, e.g. "gemini-2.5-flash". If None, uses the
    /// provider default.
    pub model: Option<String>,

    /// API credential for the selected provider. If None,
    /// `Analyzer::new` reads the provider's key environment variable.
    pub api_key: Option<String>,

    /// Override for the provider's base URL. Intended for tests pointing
    /// at a local stub server; production leaves this None.
    pub base_url: Option<String>,

    /// Per-LLM-call timeout in seconds. Default: 120.
    ///
    /// Ranking prompts embed every resume in the batch, and completion
    /// latency grows with prompt size; 120 s covers large batches while
    /// still bounding a hung connection.
    pub api_timeout_secs: u64,

    /// Rasterisation DPI for PDF pages. Range: 72–400. Default: 150.
    ///
    /// 150 DPI is the sweet spot: text is sharp enough for OCR to read
    /// reliably, while page bitmaps stay small enough that a multi-page
    /// resume does not balloon memory or OCR latency.
    pub dpi: u32,

    /// Maximum rendered page dimension (width or height) in pixels.
    /// Default: 2000.
    ///
    /// A safety cap independent of DPI: an A3 page at 150 DPI already
    /// exceeds 2400 px on the long edge. Either dimension is capped and
    /// the other scaled proportionally so rasterisation memory stays
    /// bounded for arbitrary page sizes.
    pub max_rendered_pixels: u32,

    /// Number of documents extracted concurrently. Default: 4.
    ///
    /// Extraction is OCR-bound; a small bound keeps the blocking pool
    /// and the OCR engine from being swamped by large batches. Output
    /// order is preserved regardless of this value.
    pub extract_concurrency: usize,

    /// Number of concurrent per-document summary calls. Default: 4.
    ///
    /// Summary mode issues one independent LLM call per document; these
    /// are network-bound and safe to overlap. Output order is preserved
    /// regardless of this value.
    pub summary_concurrency: usize,

    /// Treat a failed audit append as a request failure. Default: false.
    ///
    /// By default the audit write is best-effort: a store outage after
    /// the (possibly expensive) LLM calls have succeeded is logged at
    /// `warn` and the result still reaches the caller.
    pub fail_on_audit_error: bool,
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        Self {
            provider: Provider::default(),
            model: None,
            api_key: None,
            base_url: None,
            api_timeout_secs: 120,
            dpi: 150,
            max_rendered_pixels: 2000,
            extract_concurrency: 4,
            summary_concurrency: 4,
            fail_on_audit_error: false,
        }
    }
}

impl AnalyzerConfig {
    /// Create a new builder for `AnalyzerConfig`.
    pub fn builder() -> AnalyzerConfigBuilder {
        AnalyzerConfigBuilder {
            config: Self::default(),
        }
    }

    /// Resolve provider, model, and credential from the environment.
    ///
    /// Reads `LLM_PROVIDER` ("gemini" when unset), then the provider's
    /// model and key variables: `GEMINI_MODEL`/`GEMINI_API_KEY` or
    /// `OPENROUTER_MODEL`/`OPENROUTER_API_KEY`. A missing key is not an
    /// error here — `Analyzer::new` reports it as
    /// [`AnalyzeError::ProviderNotConfigured`] with the variable name.
    pub fn from_env() -> Result<Self, AnalyzeError> {
        let provider = match std::env::var("LLM_PROVIDER") {
            Ok(name) if !name.trim().is_empty() => {
                Provider::parse(&name).ok_or_else(|| {
                    AnalyzeError::InvalidConfig(format!(
                        "Unknown LLM_PROVIDER '{name}' (expected 'gemini' or 'openrouter')"
                    ))
                })?
            }
            _ => Provider::default(),
        };

        let model_var = match provider {
            Provider::Gemini => "GEMINI_MODEL",
            Provider::OpenRouter => "OPENROUTER_MODEL",
        };
        let model = std::env::var(model_var).ok().filter(|m| !m.is_empty());
        let api_key = std::env::var(provider.key_env_var())
            .ok()
            .filter(|k| !k.is_empty());

        Ok(Self {
            provider,
            model,
            api_key,
            ..Self::default()
        })
    }

    /// The model to use: configured value or provider default.
    pub fn model_or_default(&self) -> &str {
        self.model.as_deref().unwrap_or(self.provider.default_model())
    }
}

/// Builder for [`AnalyzerConfig`].
#[derive(Debug)]
pub struct AnalyzerConfigBuilder {
    config: AnalyzerConfig,
}

impl AnalyzerConfigBuilder {
    pub fn provider(mut self, provider: Provider) -> Self {
        self.config.provider = provider;
        self
    }

    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.config.model = Some(model.into());
        self
    }

    pub fn api_key(mut self, key: impl Into<String>) -> Self {
        self.config.api_key = Some(key.into());
        self
    }

    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.config.base_url = Some(url.into());
        self
    }

    pub fn api_timeout_secs(mut self, secs: u64) -> Self {
        self.config.api_timeout_secs = secs.max(1);
        self
    }

    pub fn dpi(mut self, dpi: u32) -> Self {
        self.config.dpi = dpi.clamp(72, 400);
        self
    }

    pub fn max_rendered_pixels(mut self, px: u32) -> Self {
        self.config.max_rendered_pixels = px.max(100);
        self
    }

    pub fn extract_concurrency(mut self, n: usize) -> Self {
        self.config.extract_concurrency = n.max(1);
        self
    }

    pub fn summary_concurrency(mut self, n: usize) -> Self {
        self.config.summary_concurrency = n.max(1);
        self
    }

    pub fn fail_on_audit_error(mut self, v: bool) -> Self {
        self.config.fail_on_audit_error = v;
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<AnalyzerConfig, AnalyzeError> {
        let c = &self.config;
        if c.dpi < 72 || c.dpi > 400 {
            return Err(AnalyzeError::InvalidConfig(format!(
                "DPI must be 72–400, got {}",
                c.dpi
            )));
        }
        if c.extract_concurrency == 0 || c.summary_concurrency == 0 {
            return Err(AnalyzeError::InvalidConfig(
                "Concurrency must be ≥ 1".into(),
            ));
        }
        Ok(self.config)
    }
}
