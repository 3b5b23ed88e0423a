//! Inbound request types: documents and the analysis request envelope.
//!
//! A [`Document`] owns its raw bytes for exactly one request; it is
//! consumed by extraction and never outlives it. Validation happens once,
//! up front, so a malformed request fails before any OCR or network call
//! is made.

use crate::error::AnalyzeError;

/// How a document's bytes should be interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentKind {
    /// Multi-page PDF; rasterised page by page before OCR.
    Pdf,
    /// Single raster image (JPG/PNG); OCR'd as-is.
    Image,
}

impl DocumentKind {
    /// Classify by filename extension. Everything that is not `.pdf`
    /// (case-insensitive) is treated as an image, matching the upload
    /// contract: callers submit either PDFs or image scans.
    pub fn from_filename(filename: &str) -> Self {
        if filename.to_ascii_lowercase().ends_with(".pdf") {
            DocumentKind::Pdf
        } else {
            DocumentKind::Image
        }
    }
}

/// One uploaded candidate document.
#[derive(Debug, Clone)]
pub struct Document {
    pub filename: String,
    pub bytes: Vec<u8>,
    pub kind: DocumentKind,
}

impl Document {
    /// Create a document, classifying it from the filename.
    pub fn new(filename: impl Into<String>, bytes: Vec<u8>) -> Self {
        let filename = filename.into();
        let kind = DocumentKind::from_filename(&filename);
        Self {
            filename,
            bytes,
            kind,
        }
    }
}

/// A batch analysis request.
///
/// `query` presence is the sole mode switch: `Some` non-blank text means
/// query mode (one ranked answer over the whole batch), otherwise summary
/// mode (one independent summary per document).
#[derive(Debug, Clone)]
pub struct AnalysisRequest {
    pub request_id: String,
    pub user_id: String,
    pub documents: Vec<Document>,
    pub query: Option<String>,
}

impl AnalysisRequest {
    /// The effective query: `None` when absent or blank after trimming,
    /// so a whitespace form field cannot select query mode with an empty
    /// question.
    pub fn effective_query(&self) -> Option<&str> {
        self.query
            .as_deref()
            .map(str::trim)
            .filter(|q| !q.is_empty())
    }

    /// Validate required fields. Runs before any extraction, LLM, or
    /// audit call.
    pub fn validate(&self) -> Result<(), AnalyzeError> {
        if self.request_id.trim().is_empty() {
            return Err(AnalyzeError::Validation {
                reason: "request_id is required".into(),
            });
        }
        if self.user_id.trim().is_empty() {
            return Err(AnalyzeError::Validation {
                reason: "user_id is required".into(),
            });
        }
        if self.documents.is_empty() {
            return Err(AnalyzeError::Validation {
                reason: "at least one document is required".into(),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_from_extension_is_case_insensitive() {
        assert_eq!(DocumentKind::from_filename("cv.pdf"), DocumentKind::Pdf);
        assert_eq!(DocumentKind::from_filename("CV.PDF"), DocumentKind::Pdf);
        assert_eq!(DocumentKind::from_filename("scan.jpg"), DocumentKind::Image);
        assert_eq!(DocumentKind::from_filename("noext"), DocumentKind::Image);
    }

    fn request(documents: Vec<Document>) -> AnalysisRequest {
        AnalysisRequest {
            request_id: "req-1".into(),
            user_id: "user-1".into(),
            documents,
            query: None,
        }
    }

    #[test]
    fn empty_document_list_is_rejected() {
        let err = request(vec![]).validate().unwrap_err();
        assert!(err.to_string().contains("at least one document"));
    }

    #[test]
    fn missing_ids_are_rejected() {
        let mut r = request(vec![Document::new("a.jpg", vec![1])]);
        r.request_id = "  ".into();
        assert!(r.validate().is_err());

        let mut r = request(vec![Document::new("a.jpg", vec![1])]);
        r.user_id = String::new();
        assert!(r.validate().is_err());
    }

    #[test]
    fn blank_query_means_summary_mode() {
        let mut r = request(vec![Document::new("a.jpg", vec![1])]);
        r.query = Some("   ".into());
        assert_eq!(r.effective_query(), None);

        r.query = Some(" who knows Rust? ".into());
        assert_eq!(r.effective_query(), Some("who knows Rust?"));
    }
}
