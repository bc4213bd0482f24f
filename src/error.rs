use thiserror::Error;

/// Failures raised by the clustering core before any work is done.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CanonError {
    #[error("Similarity threshold {0} is outside the range 0-100")]
    InvalidThreshold(i64),

    #[error("Malformed term record '{value}': {reason}")]
    MalformedTermRecord { value: String, reason: String },
}
