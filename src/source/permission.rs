//! Platform permission subsystem interface

use crate::core::PermissionState;
use crate::source::SubscriptionHandle;
use std::sync::Arc;

/// Subscriber callback for permission changes
pub type PermissionSink = Arc<dyn Fn(PermissionState) + Send + Sync>;

/// Access to the platform's location permission state
pub trait PermissionProvider: Send + Sync {
    /// Current permission, or `None` when the platform cannot be queried
    fn query(&self) -> Option<PermissionState>;

    /// Watch for permission changes
    fn subscribe(&self, sink: PermissionSink) -> SubscriptionHandle;

    fn unsubscribe(&self, handle: SubscriptionHandle);
}
