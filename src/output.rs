//! Output types: extracted text, analysis results, and audit records.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// The text recovered from one document.
///
/// Exactly one per submitted [`crate::request::Document`], in submission
/// order. `text` is the space-joined concatenation of all page/region
/// recognitions in original reading order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractedText {
    pub filename: String,
    pub text: String,
}

/// One summary entry in summary mode.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentSummary {
    pub filename: String,
    pub summary: String,
}

/// The outcome of an analysis request — exactly one variant per request.
///
/// Serialises to the caller-facing response shape:
/// `{"mode":"query","query":…,"answer":…}` or
/// `{"mode":"summaries","summaries":[…]}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum AnalysisResult {
    /// One ranked, justified answer computed jointly over all documents.
    Query { query: String, answer: String },
    /// One independent summary per document, in submission order.
    Summaries { summaries: Vec<DocumentSummary> },
}

/// Append-only audit record, written exactly once per completed request
/// after result assembly. Never mutated or deleted by this system.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditRecord {
    pub request_id: String,
    pub user_id: String,
    pub timestamp: DateTime<Utc>,
    pub query: Option<String>,
    pub result: AnalysisResult,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn query_result_serialises_with_mode_tag() {
        let r = AnalysisResult::Query {
            query: "who knows Python?".into(),
            answer: "1. cv_ana.pdf — …".into(),
        };
        let json = serde_json::to_value(&r).unwrap();
        assert_eq!(json["mode"], "query");
        assert_eq!(json["query"], "who knows Python?");
    }

    #[test]
    fn summaries_result_serialises_entries_in_order() {
        let r = AnalysisResult::Summaries {
            summaries: vec![
                DocumentSummary {
                    filename: "a.pdf".into(),
                    summary: "first".into(),
                },
                DocumentSummary {
                    filename: "b.jpg".into(),
                    summary: "second".into(),
                },
            ],
        };
        let json = serde_json::to_value(&r).unwrap();
        assert_eq!(json["mode"], "summaries");
        assert_eq!(json["summaries"][0]["filename"], "a.pdf");
        assert_eq!(json["summaries"][1]["filename"], "b.jpg");
    }

    #[test]
    fn audit_record_round_trips() {
        let rec = AuditRecord {
            request_id: "req-9".into(),
            user_id: "u-1".into(),
            timestamp: Utc::now(),
            query: None,
            result: AnalysisResult::Summaries { summaries: vec![] },
        };
        let line = serde_json::to_string(&rec).unwrap();
        let back: AuditRecord = serde_json::from_str(&line).unwrap();
        assert_eq!(back.request_id, "req-9");
        assert_eq!(back.result, rec.result);
    }
}
