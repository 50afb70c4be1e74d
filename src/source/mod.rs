//! Platform abstraction for position samples and location permission
//!
//! The engine never polls: sources push fixes and errors into a sink, and
//! the permission subsystem pushes state changes the same way. Every
//! subscription returns an explicit handle that is released on unsubscribe.

pub mod sample_source;
pub mod permission;
pub mod mock;
pub mod error;

pub use sample_source::{SampleSource, SampleSink, SourceEvent, WatchOptions};
pub use permission::{PermissionProvider, PermissionSink};
pub use mock::{MockSampleSource, MockPermissionProvider};
pub use error::{SourceError, SourceResult, ErrorSeverity};

/// Handle identifying one subscription on a source or provider
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionHandle(u32);

impl SubscriptionHandle {
    pub fn new(id: u32) -> Self {
        SubscriptionHandle(id)
    }

    pub fn id(&self) -> u32 {
        self.0
    }
}
