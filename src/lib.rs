//! # resume-analyzer
//!
//! Batch resume analysis: extract text from scanned resumes (images or
//! PDFs) and either answer a free-text recruiting query jointly over the
//! whole batch, or summarise each document independently — dispatching
//! to a configurable LLM backend and appending one audit record per
//! completed request.
//!
//! ## Pipeline Overview
//!
//! ```text
//! Documents (PDF/JPG/PNG bytes)
//!  │
//!  ├─ 1. Extract   rasterise PDF pages via pdfium (spawn_blocking),
//!  │               OCR every page/image, join texts in reading order
//!  ├─ 2. Branch    query present → one batch ranking prompt
//!  │               query absent  → one summary prompt per document
//!  ├─ 3. Dispatch  gemini / openrouter backend, 120 s bounded calls
//!  ├─ 4. Assemble  QueryResult or per-document summaries, order kept
//!  └─ 5. Audit     one append-only record per completed request
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use resume_analyzer::{
//!     Analyzer, AnalyzerConfig, AnalysisRequest, Document, NullAuditSink, PlainTextOcr,
//! };
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // Provider/model/credential from LLM_PROVIDER, GEMINI_API_KEY, …
//!     let config = AnalyzerConfig::from_env()?;
//!     let analyzer = Analyzer::new(config, Arc::new(PlainTextOcr), Arc::new(NullAuditSink))?;
//!
//!     let request = AnalysisRequest {
//!         request_id: "req-1".into(),
//!         user_id: "recruiter-7".into(),
//!         documents: vec![Document::new("cv_ana.pdf", std::fs::read("cv_ana.pdf")?)],
//!         query: Some("who has Python experience?".into()),
//!     };
//!     let result = analyzer.analyze(request).await?;
//!     println!("{}", serde_json::to_string_pretty(&result)?);
//!     Ok(())
//! }
//! ```
//!
//! ## External capabilities
//!
//! The OCR engine ([`OcrEngine`]) and the audit store ([`AuditSink`])
//! are seams: supply your own implementations. [`PlainTextOcr`] (treats
//! bytes as UTF-8, development only) and [`JsonlAuditSink`] /
//! [`NullAuditSink`] are bundled.
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `resume-analyze` binary (clap + anyhow + tracing-subscriber) |

// ── Modules ──────────────────────────────────────────────────────────────

pub mod analyze;
pub mod audit;
pub mod config;
pub mod error;
pub mod gateway;
pub mod ocr;
pub mod output;
pub mod pipeline;
pub mod prompts;
pub mod request;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use analyze::Analyzer;
pub use audit::{AuditError, AuditSink, JsonlAuditSink, NullAuditSink};
pub use config::{AnalyzerConfig, AnalyzerConfigBuilder, Provider};
pub use error::{AnalyzeError, BackendError};
pub use gateway::LlmBackend;
pub use ocr::{OcrEngine, OcrError, OcrSpan, PlainTextOcr};
pub use output::{AnalysisResult, AuditRecord, DocumentSummary, ExtractedText};
pub use pipeline::raster::{PageRasterizer, PdfiumRasterizer, RasterError};
pub use request::{AnalysisRequest, Document, DocumentKind};
