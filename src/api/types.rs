//! Common API types: errors and observer callbacks

use crate::core::TelemetrySnapshot;
use crate::source::SourceError;
use std::sync::Arc;
use thiserror::Error;

/// Result type for engine operations
pub type ApiResult<T> = Result<T, TelemetryError>;

/// Errors surfaced to engine observers
#[derive(Debug, Clone, PartialEq, Error)]
pub enum TelemetryError {
    /// The platform offers no geolocation
    #[error("geolocation is not supported on this platform")]
    UnsupportedPlatform,
    /// Location access was denied or revoked; tracking has been stopped
    #[error("location permission denied; enable it in the platform settings to resume tracking")]
    PermissionDenied,
    /// A fix could not be acquired; tracking continues
    #[error("GPS error: {reason}")]
    TransientFixError { reason: String },
}

impl TelemetryError {
    /// Persistent errors stay visible until the user acts on them
    pub fn is_persistent(&self) -> bool {
        !matches!(self, TelemetryError::TransientFixError { .. })
    }
}

impl From<SourceError> for TelemetryError {
    fn from(error: SourceError) -> Self {
        match error {
            SourceError::PermissionDenied => TelemetryError::PermissionDenied,
            other => TelemetryError::TransientFixError {
                reason: other.to_string(),
            },
        }
    }
}

/// Callback invoked with every emitted snapshot
pub type SnapshotCallback = Arc<dyn Fn(&TelemetrySnapshot) + Send + Sync>;

/// Callback invoked with every surfaced error
pub type ErrorCallback = Arc<dyn Fn(&TelemetryError) + Send + Sync>;

/// Callback registration handle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CallbackHandle(u32);

impl CallbackHandle {
    pub(crate) fn new(id: u32) -> Self {
        CallbackHandle(id)
    }

    pub fn id(&self) -> u32 {
        self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_source_error_mapping() {
        assert_eq!(
            TelemetryError::from(SourceError::PermissionDenied),
            TelemetryError::PermissionDenied
        );

        let transient = TelemetryError::from(SourceError::Timeout { timeout_ms: 10_000 });
        assert!(!transient.is_persistent());
        assert_eq!(
            transient.to_string(),
            "GPS error: timed out after 10000ms waiting for a fix"
        );
    }

    #[test]
    fn test_persistent_errors() {
        assert!(TelemetryError::UnsupportedPlatform.is_persistent());
        assert!(TelemetryError::PermissionDenied.is_persistent());
    }
}
