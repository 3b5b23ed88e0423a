//! The analysis orchestrator.
//!
//! [`Analyzer`] owns the process-wide collaborators — rasteriser, OCR
//! engine, LLM backend, audit sink — all resolved once at construction
//! and shared across concurrent requests. Each [`Analyzer::analyze`]
//! call is a single terminal pass:
//!
//! ```text
//! Received → Extracting → {Querying | Summarizing} → ResultAssembled → Audited → Done
//! ```
//!
//! The mode branch is decided exactly once, from query presence, before
//! any LLM call. Extraction and per-document summary calls may overlap
//! (bounded, `buffered`) but their outputs always retain submission
//! order. There are no retries at any stage; dropping the returned
//! future cancels in-flight HTTP calls, and since the audit append only
//! happens after result assembly, a cancelled request writes no partial
//! record.

use crate::audit::AuditSink;
use crate::config::AnalyzerConfig;
use crate::error::{AnalyzeError, BackendError};
use crate::gateway::{resolve_backend, LlmBackend};
use crate::ocr::OcrEngine;
use crate::output::{AnalysisResult, AuditRecord, DocumentSummary, ExtractedText};
use crate::pipeline::extract::extract_document;
use crate::pipeline::raster::{PageRasterizer, PdfiumRasterizer};
use crate::prompts;
use crate::request::AnalysisRequest;
use chrono::Utc;
use futures::stream::{self, StreamExt, TryStreamExt};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Batch resume analyzer.
///
/// Construct once at process startup, share via `Arc` across requests.
pub struct Analyzer {
    config: AnalyzerConfig,
    rasterizer: Arc<dyn PageRasterizer>,
    ocr: Arc<dyn OcrEngine>,
    backend: Arc<dyn LlmBackend>,
    audit: Arc<dyn AuditSink>,
}

impl Analyzer {
    /// Build an analyzer with the production rasteriser and the backend
    /// named by the configuration.
    ///
    /// The OCR engine and audit sink are external capabilities and must
    /// be supplied by the caller. Fails if the configured provider has
    /// no credential.
    pub fn new(
        config: AnalyzerConfig,
        ocr: Arc<dyn OcrEngine>,
        audit: Arc<dyn AuditSink>,
    ) -> Result<Self, AnalyzeError> {
        let backend = resolve_backend(&config)?;
        let rasterizer = Arc::new(PdfiumRasterizer::new(config.dpi, config.max_rendered_pixels));
        Ok(Self {
            config,
            rasterizer,
            ocr,
            backend,
            audit,
        })
    }

    /// Build an analyzer with every collaborator injected.
    ///
    /// This is the seam for tests (deterministic stubs) and for callers
    /// that need custom middleware around a backend.
    pub fn with_components(
        config: AnalyzerConfig,
        rasterizer: Arc<dyn PageRasterizer>,
        ocr: Arc<dyn OcrEngine>,
        backend: Arc<dyn LlmBackend>,
        audit: Arc<dyn AuditSink>,
    ) -> Self {
        Self {
            config,
            rasterizer,
            ocr,
            backend,
            audit,
        }
    }

    /// Run one analysis request to completion.
    pub async fn analyze(&self, request: AnalysisRequest) -> Result<AnalysisResult, AnalyzeError> {
        // ── Step 1: Validate ─────────────────────────────────────────────
        request.validate()?;
        let query = request.effective_query().map(str::to_string);
        info!(
            "Analysis request {}: {} documents, mode={}",
            request.request_id,
            request.documents.len(),
            if query.is_some() { "query" } else { "summary" }
        );

        // ── Step 2: Extract all documents, submission order preserved ────
        let extracted = self.extract_all(&request).await?;
        debug_assert_eq!(extracted.len(), request.documents.len());

        // ── Step 3: Mode branch, decided once ────────────────────────────
        let result = match &query {
            Some(q) => self.run_query(&extracted, q).await?,
            None => self.run_summaries(&extracted).await?,
        };

        // ── Step 4: Audit append, exactly once, after assembly ───────────
        let record = AuditRecord {
            request_id: request.request_id.clone(),
            user_id: request.user_id.clone(),
            timestamp: Utc::now(),
            query,
            result: result.clone(),
        };
        if let Err(e) = self.audit.append(&record).await {
            if self.config.fail_on_audit_error {
                return Err(AnalyzeError::AuditWrite {
                    detail: e.to_string(),
                });
            }
            warn!(
                "Audit append failed for request {} (best-effort policy, result still returned): {e}",
                request.request_id
            );
        }

        info!("Analysis request {} complete", request.request_id);
        Ok(result)
    }

    /// Extract every document with bounded concurrency.
    ///
    /// `buffered` (not `buffer_unordered`) keeps outputs in submission
    /// order regardless of per-document completion order. The first
    /// extraction failure aborts the request; in-flight extractions are
    /// dropped.
    async fn extract_all(
        &self,
        request: &AnalysisRequest,
    ) -> Result<Vec<ExtractedText>, AnalyzeError> {
        stream::iter(request.documents.iter().map(|doc| {
            let rasterizer = Arc::clone(&self.rasterizer);
            let ocr = Arc::clone(&self.ocr);
            async move { extract_document(rasterizer.as_ref(), ocr.as_ref(), doc).await }
        }))
        .buffered(self.config.extract_concurrency)
        .try_collect()
        .await
    }

    /// Query mode: exactly one backend call over the whole batch.
    async fn run_query(
        &self,
        documents: &[ExtractedText],
        query: &str,
    ) -> Result<AnalysisResult, AnalyzeError> {
        let prompt = prompts::build_query_prompt(documents, query);
        debug!(
            "Query mode: 1 call to '{}' over {} documents",
            self.backend.name(),
            documents.len()
        );

        let answer = self
            .backend
            .complete(&prompt)
            .await
            .map_err(|source| AnalyzeError::Backend {
                document: None,
                source,
            })?;

        Ok(AnalysisResult::Query {
            query: query.to_string(),
            answer,
        })
    }

    /// Summary mode: one independent backend call per document, outputs
    /// in submission order, failures attributable to their document.
    async fn run_summaries(
        &self,
        documents: &[ExtractedText],
    ) -> Result<AnalysisResult, AnalyzeError> {
        debug!(
            "Summary mode: {} calls to '{}'",
            documents.len(),
            self.backend.name()
        );

        let summaries: Vec<DocumentSummary> = stream::iter(documents.iter().map(|doc| {
            let backend = Arc::clone(&self.backend);
            async move {
                let prompt = prompts::build_summary_prompt(doc);
                let summary = backend.complete(&prompt).await.map_err(
                    |source: BackendError| AnalyzeError::Backend {
                        document: Some(doc.filename.clone()),
                        source,
                    },
                )?;
                Ok::<_, AnalyzeError>(DocumentSummary {
                    filename: doc.filename.clone(),
                    summary,
                })
            }
        }))
        .buffered(self.config.summary_concurrency)
        .try_collect()
        .await?;

        Ok(AnalysisResult::Summaries { summaries })
    }
}
