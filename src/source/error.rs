//! Sample source error types and classification

use thiserror::Error;

/// Errors reported by a position sample source
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SourceError {
    /// The user or platform revoked access to location
    #[error("location permission denied")]
    PermissionDenied,
    /// The device could not determine a position
    #[error("position unavailable: {message}")]
    PositionUnavailable { message: String },
    /// No fix was acquired within the watch timeout
    #[error("timed out after {timeout_ms}ms waiting for a fix")]
    Timeout { timeout_ms: u32 },
}

/// Result type for sample source operations
pub type SourceResult<T> = Result<T, SourceError>;

/// How an error affects the running session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorSeverity {
    /// The session cannot continue and must be stopped
    Fatal,
    /// The session keeps running; a later fix may succeed
    Transient,
}

impl SourceError {
    pub fn severity(&self) -> ErrorSeverity {
        match self {
            SourceError::PermissionDenied => ErrorSeverity::Fatal,
            SourceError::PositionUnavailable { .. } => ErrorSeverity::Transient,
            SourceError::Timeout { .. } => ErrorSeverity::Transient,
        }
    }

    pub fn is_fatal(&self) -> bool {
        self.severity() == ErrorSeverity::Fatal
    }
}
