//! OCR engine seam.
//!
//! Character recognition itself is an external capability: the pipeline
//! only needs "image bytes in, recognised spans out". Modelling that as a
//! trait keeps the extraction logic independent of any particular engine
//! and lets tests drive the full pipeline with deterministic stubs.
//!
//! The engine instance is process-wide: constructed once at startup,
//! injected into [`crate::analyze::Analyzer::new`] as an `Arc`, and
//! invoked concurrently by in-flight requests after that. It is never
//! re-initialised per request.

use async_trait::async_trait;

/// One recognised text region.
///
/// `region` is the quadrilateral of the detected text box in pixel
/// coordinates, `confidence` the engine's score in `[0, 1]`. The pipeline
/// consumes only `text`, but engines report all three and the span shape
/// preserves them for callers that care.
#[derive(Debug, Clone, PartialEq)]
pub struct OcrSpan {
    pub region: [(f32, f32); 4],
    pub text: String,
    pub confidence: f32,
}

impl OcrSpan {
    /// A span with no position information, as produced by engines that
    /// do not report layout.
    pub fn bare(text: impl Into<String>, confidence: f32) -> Self {
        Self {
            region: [(0.0, 0.0); 4],
            text: text.into(),
            confidence,
        }
    }
}

/// An optical character recognition engine.
///
/// The returned span order is the engine's own reading order and is
/// authoritative: the extraction layer concatenates span texts exactly as
/// returned, without re-sorting.
#[async_trait]
pub trait OcrEngine: Send + Sync {
    /// Recognise all text regions in one image.
    async fn recognize(&self, image: &[u8]) -> Result<Vec<OcrSpan>, OcrError>;
}

/// Recognition failure for one image.
#[derive(Debug, thiserror::Error)]
#[error("OCR failed: {0}")]
pub struct OcrError(pub String);

/// Development engine: treats the input bytes as UTF-8 text and returns
/// it as a single full-confidence span.
///
/// This is not OCR. It exists so the CLI and examples can exercise the
/// complete pipeline — extraction, prompting, dispatch, audit — on plain
/// text fixtures without a native recognition engine installed.
#[derive(Debug, Default)]
pub struct PlainTextOcr;

#[async_trait]
impl OcrEngine for PlainTextOcr {
    async fn recognize(&self, image: &[u8]) -> Result<Vec<OcrSpan>, OcrError> {
        let text = String::from_utf8_lossy(image).trim().to_string();
        if text.is_empty() {
            return Ok(vec![]);
        }
        Ok(vec![OcrSpan::bare(text, 1.0)])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn plain_text_engine_returns_one_span() {
        let spans = PlainTextOcr.recognize(b"  ten years of Rust  ").await.unwrap();
        assert_eq!(spans.len(), 1);
        assert_eq!(spans[0].text, "ten years of Rust");
        assert_eq!(spans[0].confidence, 1.0);
    }

    #[tokio::test]
    async fn plain_text_engine_empty_input_yields_no_spans() {
        let spans = PlainTextOcr.recognize(b"   ").await.unwrap();
        assert!(spans.is_empty());
    }
}
