//! Audit sink: durable append of one record per completed request.
//!
//! The store is an external collaborator; the core only needs "append
//! one document". The trait keeps the orchestrator independent of the
//! concrete store, and the bundled [`JsonlAuditSink`] gives a durable
//! local default: one JSON object per line, append-only, never rewritten.
//!
//! Whether an append failure fails the request is the orchestrator's
//! decision (`fail_on_audit_error`), not the sink's — sinks just report
//! the failure.

use crate::output::AuditRecord;
use async_trait::async_trait;
use std::path::PathBuf;
use tokio::io::AsyncWriteExt;
use tracing::debug;

/// Append-only audit store.
#[async_trait]
pub trait AuditSink: Send + Sync {
    /// Append exactly one record. Must not mutate or delete prior records.
    async fn append(&self, record: &AuditRecord) -> Result<(), AuditError>;
}

/// Audit append failure.
#[derive(Debug, thiserror::Error)]
#[error("audit append failed: {0}")]
pub struct AuditError(pub String);

/// Audit sink writing one JSON line per record to a local file.
///
/// The file is opened in append mode per write, so concurrent requests
/// each append a complete line and a crashed process leaves at most one
/// truncated trailing line, never a corrupted earlier record.
#[derive(Debug, Clone)]
pub struct JsonlAuditSink {
    path: PathBuf,
}

impl JsonlAuditSink {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl AuditSink for JsonlAuditSink {
    async fn append(&self, record: &AuditRecord) -> Result<(), AuditError> {
        let mut line = serde_json::to_string(record)
            .map_err(|e| AuditError(format!("serialise record: {e}")))?;
        line.push('\n');

        let mut file = tokio::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .await
            .map_err(|e| AuditError(format!("open {}: {e}", self.path.display())))?;

        file.write_all(line.as_bytes())
            .await
            .map_err(|e| AuditError(format!("write {}: {e}", self.path.display())))?;
        file.flush()
            .await
            .map_err(|e| AuditError(format!("flush {}: {e}", self.path.display())))?;

        debug!("Audit record appended for request {}", record.request_id);
        Ok(())
    }
}

/// Sink that discards every record. Default for the CLI when no audit
/// log path is given, and useful in tests that do not assert on audit.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullAuditSink;

#[async_trait]
impl AuditSink for NullAuditSink {
    async fn append(&self, _record: &AuditRecord) -> Result<(), AuditError> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::output::AnalysisResult;
    use chrono::Utc;

    fn record(request_id: &str) -> AuditRecord {
        AuditRecord {
            request_id: request_id.into(),
            user_id: "u-1".into(),
            timestamp: Utc::now(),
            query: Some("q".into()),
            result: AnalysisResult::Query {
                query: "q".into(),
                answer: "a".into(),
            },
        }
    }

    #[tokio::test]
    async fn jsonl_sink_appends_one_line_per_record() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("audit.jsonl");
        let sink = JsonlAuditSink::new(&path);

        sink.append(&record("req-1")).await.unwrap();
        sink.append(&record("req-2")).await.unwrap();

        let contents = tokio::fs::read_to_string(&path).await.unwrap();
        let lines: Vec<&str> = contents.lines().collect();
        assert_eq!(lines.len(), 2);

        let first: AuditRecord = serde_json::from_str(lines[0]).unwrap();
        assert_eq!(first.request_id, "req-1");
        let second: AuditRecord = serde_json::from_str(lines[1]).unwrap();
        assert_eq!(second.request_id, "req-2");
    }

    #[tokio::test]
    async fn jsonl_sink_reports_unwritable_path() {
        let sink = JsonlAuditSink::new("/nonexistent-dir/audit.jsonl");
        let err = sink.append(&record("req-1")).await.unwrap_err();
        assert!(err.to_string().contains("audit append failed"));
    }
}
