//! Position sample source interface and watch options

use crate::core::Fix;
use crate::source::{SourceError, SourceResult, SubscriptionHandle};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Event pushed by a sample source into its subscriber
#[derive(Debug, Clone, PartialEq)]
pub enum SourceEvent {
    Fix(Fix),
    Error(SourceError),
}

/// Subscriber callback for sample source events
pub type SampleSink = Arc<dyn Fn(SourceEvent) + Send + Sync>;

/// Platform geolocation abstraction.
///
/// Sources push events into the sink handed to [`SampleSource::subscribe`].
/// Implementations must not hold internal locks while invoking a sink, since
/// the subscriber may call [`SampleSource::unsubscribe`] from inside it.
pub trait SampleSource: Send + Sync {
    /// Whether the platform offers geolocation at all
    fn is_available(&self) -> bool;

    /// Start watching the position
    fn subscribe(&self, options: &WatchOptions, sink: SampleSink) -> SourceResult<SubscriptionHandle>;

    /// Stop a previously started watch. Unknown handles are ignored.
    fn unsubscribe(&self, handle: SubscriptionHandle);
}

/// Options passed to the platform when watching the position
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WatchOptions {
    /// Ask the device for its most accurate fix
    pub enable_high_accuracy: bool,
    /// Maximum time to wait for a fix before reporting a timeout (milliseconds)
    pub timeout_ms: u32,
    /// Maximum age of a cached fix the platform may return (milliseconds)
    pub maximum_age_ms: u32,
}

impl Default for WatchOptions {
    fn default() -> Self {
        Self {
            enable_high_accuracy: true,
            timeout_ms: 10_000,
            maximum_age_ms: 0,
        }
    }
}

impl WatchOptions {
    pub fn validate(&self) -> Result<(), String> {
        if self.timeout_ms == 0 {
            return Err("timeout_ms must be greater than zero".to_string());
        }
        Ok(())
    }
}
