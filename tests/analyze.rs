//! Integration tests for the analysis orchestrator.
//!
//! Every external capability — rasteriser, OCR engine, LLM backend,
//! audit sink — is replaced with a deterministic stub so the tests can
//! assert call counts, ordering, and audit behaviour exactly.

use async_trait::async_trait;
use resume_analyzer::{
    AnalysisRequest, AnalysisResult, Analyzer, AnalyzerConfig, AuditError, AuditRecord, AuditSink,
    BackendError, Document, LlmBackend, OcrEngine, OcrError, OcrSpan, PageRasterizer, RasterError,
};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

// ── Stubs ────────────────────────────────────────────────────────────────

/// Rasteriser stub: every PDF has exactly two pages whose bytes carry a
/// page marker appended to the document bytes.
#[derive(Default)]
struct TwoPageRasterizer {
    calls: AtomicUsize,
}

#[async_trait]
impl PageRasterizer for TwoPageRasterizer {
    async fn rasterize(&self, pdf: &[u8]) -> Result<Vec<Vec<u8>>, RasterError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let mut p1 = pdf.to_vec();
        p1.extend_from_slice(b"/page1");
        let mut p2 = pdf.to_vec();
        p2.extend_from_slice(b"/page2");
        Ok(vec![p1, p2])
    }
}

/// OCR stub: deterministic, echoes the image bytes as one span.
#[derive(Default)]
struct EchoOcr {
    calls: AtomicUsize,
}

#[async_trait]
impl OcrEngine for EchoOcr {
    async fn recognize(&self, image: &[u8]) -> Result<Vec<OcrSpan>, OcrError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(vec![OcrSpan::bare(
            String::from_utf8_lossy(image).into_owned(),
            0.99,
        )])
    }
}

/// Backend stub: records every prompt and answers deterministically.
#[derive(Default)]
struct RecordingBackend {
    prompts: Mutex<Vec<String>>,
    fail_with: Option<fn() -> BackendError>,
}

impl RecordingBackend {
    fn failing(f: fn() -> BackendError) -> Self {
        Self {
            prompts: Mutex::new(vec![]),
            fail_with: Some(f),
        }
    }

    fn calls(&self) -> usize {
        self.prompts.lock().unwrap().len()
    }
}

#[async_trait]
impl LlmBackend for RecordingBackend {
    fn name(&self) -> &str {
        "stub"
    }

    async fn complete(&self, prompt: &str) -> Result<String, BackendError> {
        self.prompts.lock().unwrap().push(prompt.to_string());
        if let Some(f) = self.fail_with {
            return Err(f());
        }
        // Deterministic function of the prompt so idempotence is testable.
        Ok(format!("completion[{} chars]", prompt.len()))
    }
}

/// Audit sink stub: records appended records, optionally failing.
#[derive(Default)]
struct RecordingSink {
    records: Mutex<Vec<AuditRecord>>,
    fail: bool,
}

impl RecordingSink {
    fn failing() -> Self {
        Self {
            records: Mutex::new(vec![]),
            fail: true,
        }
    }

    fn count(&self) -> usize {
        self.records.lock().unwrap().len()
    }
}

#[async_trait]
impl AuditSink for RecordingSink {
    async fn append(&self, record: &AuditRecord) -> Result<(), AuditError> {
        if self.fail {
            return Err(AuditError("store is down".into()));
        }
        self.records.lock().unwrap().push(record.clone());
        Ok(())
    }
}

// ── Harness ──────────────────────────────────────────────────────────────

struct Harness {
    raster: Arc<TwoPageRasterizer>,
    ocr: Arc<EchoOcr>,
    backend: Arc<RecordingBackend>,
    sink: Arc<RecordingSink>,
    analyzer: Analyzer,
}

fn harness_with(backend: RecordingBackend, sink: RecordingSink, fail_on_audit: bool) -> Harness {
    let config = AnalyzerConfig::builder()
        .api_key("test-key")
        .fail_on_audit_error(fail_on_audit)
        .build()
        .unwrap();
    let raster = Arc::new(TwoPageRasterizer::default());
    let ocr = Arc::new(EchoOcr::default());
    let backend = Arc::new(backend);
    let sink = Arc::new(sink);
    let analyzer = Analyzer::with_components(
        config,
        Arc::clone(&raster) as Arc<dyn PageRasterizer>,
        Arc::clone(&ocr) as Arc<dyn OcrEngine>,
        Arc::clone(&backend) as Arc<dyn LlmBackend>,
        Arc::clone(&sink) as Arc<dyn AuditSink>,
    );
    Harness {
        raster,
        ocr,
        backend,
        sink,
        analyzer,
    }
}

fn harness() -> Harness {
    harness_with(RecordingBackend::default(), RecordingSink::default(), false)
}

fn request(documents: Vec<Document>, query: Option<&str>) -> AnalysisRequest {
    AnalysisRequest {
        request_id: "req-1".into(),
        user_id: "recruiter-7".into(),
        documents,
        query: query.map(str::to_string),
    }
}

// ── Scenarios ────────────────────────────────────────────────────────────

#[tokio::test]
async fn summary_mode_one_entry_per_document_in_submission_order() {
    let h = harness();
    let docs = vec![
        Document::new("cv.pdf", b"%PDF".to_vec()),
        Document::new("scan.jpg", b"jpg-bytes".to_vec()),
    ];

    let result = h.analyzer.analyze(request(docs, None)).await.unwrap();

    match result {
        AnalysisResult::Summaries { summaries } => {
            assert_eq!(summaries.len(), 2);
            assert_eq!(summaries[0].filename, "cv.pdf");
            assert_eq!(summaries[1].filename, "scan.jpg");
        }
        other => panic!("expected summaries, got {other:?}"),
    }

    // One backend call per document, PDF rasterised once, three OCR
    // calls total (two PDF pages + one image).
    assert_eq!(h.backend.calls(), 2);
    assert_eq!(h.raster.calls.load(Ordering::SeqCst), 1);
    assert_eq!(h.ocr.calls.load(Ordering::SeqCst), 3);
}

#[tokio::test]
async fn summary_mode_single_document_yields_matching_filename() {
    let h = harness();
    let docs = vec![Document::new("only.jpg", b"ten years of Rust".to_vec())];

    let result = h.analyzer.analyze(request(docs, None)).await.unwrap();

    match result {
        AnalysisResult::Summaries { summaries } => {
            assert_eq!(summaries.len(), 1);
            assert_eq!(summaries[0].filename, "only.jpg");
            assert!(!summaries[0].summary.is_empty());
        }
        other => panic!("expected summaries, got {other:?}"),
    }
}

#[tokio::test]
async fn query_mode_issues_exactly_one_backend_call() {
    let h = harness();
    let docs = vec![
        Document::new("a.jpg", b"knows Python".to_vec()),
        Document::new("b.jpg", b"knows COBOL".to_vec()),
        Document::new("c.jpg", b"knows Rust".to_vec()),
    ];

    let result = h
        .analyzer
        .analyze(request(docs, Some("who has Python experience")))
        .await
        .unwrap();

    assert_eq!(h.backend.calls(), 1);
    match result {
        AnalysisResult::Query { query, answer } => {
            assert_eq!(query, "who has Python experience");
            assert!(!answer.is_empty());
        }
        other => panic!("expected query result, got {other:?}"),
    }

    // The single prompt embeds all three documents and the query.
    let prompts = h.backend.prompts.lock().unwrap();
    assert!(prompts[0].contains("<document filename=\"a.jpg\">"));
    assert!(prompts[0].contains("<document filename=\"b.jpg\">"));
    assert!(prompts[0].contains("<document filename=\"c.jpg\">"));
    assert!(prompts[0].contains("who has Python experience"));

    // One audit record, with the query set.
    assert_eq!(h.sink.count(), 1);
    let records = h.sink.records.lock().unwrap();
    assert_eq!(records[0].request_id, "req-1");
    assert_eq!(records[0].query.as_deref(), Some("who has Python experience"));
}

#[tokio::test]
async fn blank_query_falls_back_to_summary_mode() {
    let h = harness();
    let docs = vec![Document::new("a.jpg", b"x".to_vec())];

    let result = h.analyzer.analyze(request(docs, Some("   "))).await.unwrap();

    assert!(matches!(result, AnalysisResult::Summaries { .. }));
    let records = h.sink.records.lock().unwrap();
    assert_eq!(records[0].query, None);
}

#[tokio::test]
async fn rerunning_the_same_request_is_idempotent() {
    let docs = || {
        vec![
            Document::new("cv.pdf", b"%PDF".to_vec()),
            Document::new("scan.jpg", b"jpg".to_vec()),
        ]
    };

    let first = harness()
        .analyzer
        .analyze(request(docs(), Some("rank by Rust experience")))
        .await
        .unwrap();
    let second = harness()
        .analyzer
        .analyze(request(docs(), Some("rank by Rust experience")))
        .await
        .unwrap();

    assert_eq!(first, second);
}

#[tokio::test]
async fn backend_outage_surfaces_as_unavailable_and_writes_no_audit_record() {
    let h = harness_with(
        RecordingBackend::failing(|| BackendError::Unavailable {
            provider: "stub".into(),
            detail: "HTTP 500".into(),
        }),
        RecordingSink::default(),
        false,
    );
    let docs = vec![Document::new("a.jpg", b"x".to_vec())];

    let err = h
        .analyzer
        .analyze(request(docs, Some("anything")))
        .await
        .unwrap_err();

    assert!(err.to_string().contains("unavailable"), "got: {err}");
    assert_eq!(h.sink.count(), 0);
}

#[tokio::test]
async fn summary_mode_backend_failure_names_the_document() {
    let h = harness_with(
        RecordingBackend::failing(|| BackendError::Unavailable {
            provider: "stub".into(),
            detail: "HTTP 503".into(),
        }),
        RecordingSink::default(),
        false,
    );
    let docs = vec![Document::new("broken.jpg", b"x".to_vec())];

    let err = h.analyzer.analyze(request(docs, None)).await.unwrap_err();

    assert!(err.to_string().contains("broken.jpg"), "got: {err}");
    assert_eq!(h.sink.count(), 0);
}

#[tokio::test]
async fn empty_file_list_is_rejected_before_any_external_call() {
    let h = harness();

    let err = h.analyzer.analyze(request(vec![], Some("q"))).await.unwrap_err();

    assert!(err.to_string().contains("Invalid request"), "got: {err}");
    assert_eq!(h.raster.calls.load(Ordering::SeqCst), 0);
    assert_eq!(h.ocr.calls.load(Ordering::SeqCst), 0);
    assert_eq!(h.backend.calls(), 0);
    assert_eq!(h.sink.count(), 0);
}

#[tokio::test]
async fn audit_failure_is_best_effort_by_default() {
    let h = harness_with(RecordingBackend::default(), RecordingSink::failing(), false);
    let docs = vec![Document::new("a.jpg", b"x".to_vec())];

    // The sink fails, but the result still reaches the caller.
    let result = h.analyzer.analyze(request(docs, None)).await.unwrap();
    assert!(matches!(result, AnalysisResult::Summaries { .. }));
}

#[tokio::test]
async fn audit_failure_is_fatal_when_opted_in() {
    let h = harness_with(RecordingBackend::default(), RecordingSink::failing(), true);
    let docs = vec![Document::new("a.jpg", b"x".to_vec())];

    let err = h.analyzer.analyze(request(docs, None)).await.unwrap_err();
    assert!(err.to_string().contains("Audit record"), "got: {err}");
}

#[tokio::test]
async fn extraction_order_is_preserved_across_a_large_batch() {
    let h = harness();
    let docs: Vec<Document> = (0..16)
        .map(|i| Document::new(format!("cv_{i:02}.jpg"), format!("text {i}").into_bytes()))
        .collect();

    let result = h.analyzer.analyze(request(docs, None)).await.unwrap();

    match result {
        AnalysisResult::Summaries { summaries } => {
            let filenames: Vec<&str> = summaries.iter().map(|s| s.filename.as_str()).collect();
            let expected: Vec<String> = (0..16).map(|i| format!("cv_{i:02}.jpg")).collect();
            assert_eq!(filenames, expected);
        }
        other => panic!("expected summaries, got {other:?}"),
    }
}
