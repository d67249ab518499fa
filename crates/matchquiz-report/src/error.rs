//! Delivery error types.

use thiserror::Error;

/// Errors that can occur while delivering a game report.
#[derive(Debug, Error)]
pub enum ReportError {
    /// The endpoint answered with an error status.
    #[error("webhook rejected the result (HTTP {status}): {message}")]
    Rejected { status: u16, message: String },

    /// The request timed out.
    #[error("webhook timed out after {0}s")]
    Timeout(u64),

    /// A network error occurred.
    #[error("network error: {0}")]
    Network(String),

    /// Writing the report locally failed.
    #[error("failed to write report: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to serialize report: {0}")]
    Serialize(#[from] serde_json::Error),

    /// Several sinks failed; one message per sink.
    #[error("{} sinks failed: {}", .0.len(), .0.join("; "))]
    Multiple(Vec<String>),
}
