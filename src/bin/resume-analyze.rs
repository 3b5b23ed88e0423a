//! CLI binary for resume-analyzer.
//!
//! A thin shim over the library crate that maps CLI flags to
//! `AnalyzerConfig`, reads document files, and prints the JSON response.
//!
//! Without a native OCR engine installed this binary uses
//! [`PlainTextOcr`], which treats input bytes as UTF-8 text — enough to
//! drive the full extraction → prompt → backend → audit pipeline against
//! text fixtures during development.

use anyhow::{Context, Result};
use clap::Parser;
use resume_analyzer::{
    AnalysisRequest, Analyzer, AnalyzerConfig, AuditSink, Document, JsonlAuditSink, NullAuditSink,
    PlainTextOcr, Provider,
};
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(
    name = "resume-analyze",
    about = "Analyze a batch of resumes with an LLM backend",
    long_about = "Extracts text from the given resume files and either answers a \
recruiting query over the whole batch (--query) or summarises each file \
independently. Provider credentials come from GEMINI_API_KEY / \
OPENROUTER_API_KEY unless --api-key is given."
)]
struct Cli {
    /// Resume files to analyze (PDF, JPG, PNG)
    #[arg(required = true)]
    files: Vec<PathBuf>,

    /// Recruiting query; omit to get one summary per file
    #[arg(short, long)]
    query: Option<String>,

    /// Request identifier recorded in the audit log
    #[arg(long, default_value = "cli")]
    request_id: String,

    /// User identifier recorded in the audit log
    #[arg(long, default_value = "cli")]
    user_id: String,

    /// LLM provider
    #[arg(long, value_parser = parse_provider)]
    provider: Option<Provider>,

    /// Model identifier (provider default when omitted)
    #[arg(long)]
    model: Option<String>,

    /// API key (falls back to the provider's environment variable)
    #[arg(long, env = "LLM_API_KEY", hide_env_values = true)]
    api_key: Option<String>,

    /// Per-LLM-call timeout in seconds
    #[arg(long, default_value_t = 120)]
    timeout: u64,

    /// Append audit records to this JSONL file
    #[arg(long)]
    audit_log: Option<PathBuf>,

    /// Fail the run if the audit append fails
    #[arg(long)]
    fail_on_audit_error: bool,
}

fn parse_provider(s: &str) -> Result<Provider, String> {
    Provider::parse(s).ok_or_else(|| format!("unknown provider '{s}' (gemini, openrouter)"))
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    // Environment first, flags override.
    let mut config = AnalyzerConfig::from_env()?;
    if let Some(provider) = cli.provider {
        config.provider = provider;
        // A provider switched on the command line must not keep the
        // env-resolved model or key of the previous provider.
        config.model = None;
        config.api_key = std::env::var(provider.key_env_var()).ok().filter(|k| !k.is_empty());
    }
    if let Some(model) = cli.model {
        config.model = Some(model);
    }
    if let Some(key) = cli.api_key {
        config.api_key = Some(key);
    }
    config.api_timeout_secs = cli.timeout.max(1);
    config.fail_on_audit_error = cli.fail_on_audit_error;

    let audit: Arc<dyn AuditSink> = match &cli.audit_log {
        Some(path) => Arc::new(JsonlAuditSink::new(path)),
        None => Arc::new(NullAuditSink),
    };

    let analyzer = Analyzer::new(config, Arc::new(PlainTextOcr), audit)?;

    let mut documents = Vec::with_capacity(cli.files.len());
    for path in &cli.files {
        let bytes = std::fs::read(path)
            .with_context(|| format!("failed to read '{}'", path.display()))?;
        let filename = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        documents.push(Document::new(filename, bytes));
    }

    let request = AnalysisRequest {
        request_id: cli.request_id,
        user_id: cli.user_id,
        documents,
        query: cli.query,
    };

    let result = analyzer.analyze(request).await?;
    println!("{}", serde_json::to_string_pretty(&result)?);
    Ok(())
}
