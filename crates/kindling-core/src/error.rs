use thiserror::Error;

/// Failures talking to the upstream item API.
#[derive(Debug, Clone, Error)]
pub enum SourceError {
    /// Transport-level failure: connect, timeout, TLS, mid-body drop.
    #[error("upstream request failed: {0}")]
    Http(String),
    /// Upstream answered with a non-success status.
    #[error("upstream returned status {0}")]
    Status(u16),
    /// The response body could not be decoded into the expected shape.
    #[error("upstream payload could not be decoded: {0}")]
    Decode(String),
    /// The caller abandoned the operation before it completed.
    #[error("upstream request was cancelled")]
    Cancelled,
}

/// Failures surfaced by the aggregation engine.
#[derive(Debug, Clone, Error)]
pub enum AggregateError {
    /// The requested story count violates the `n > 0` precondition.
    #[error("story count must be greater than zero, got {0}")]
    InvalidCount(usize),
    /// The ranked id list could not be resolved. Per-item failures never
    /// surface here; only the foundational id-list fetch is fatal.
    #[error("failed to resolve the ranked id list: {0}")]
    Upstream(SourceError),
    /// The caller abandoned the request.
    #[error("request was cancelled")]
    Cancelled,
}
