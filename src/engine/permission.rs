//! Permission lifecycle observer

use crate::core::PermissionState;
use crate::engine::TelemetryEngine;
use crate::source::{PermissionProvider, PermissionSink, SubscriptionHandle};
use std::sync::Arc;
use tracing::{debug, info};

/// Mirrors the platform permission into a [`TelemetryEngine`].
///
/// The subscription is released on [`PermissionObserver::detach`] or drop.
pub struct PermissionObserver {
    provider: Arc<dyn PermissionProvider>,
    handle: Option<SubscriptionHandle>,
}

impl PermissionObserver {
    /// Query the current permission and start watching for changes.
    ///
    /// Platforms that cannot be queried report [`PermissionState::Prompt`],
    /// leaving the actual prompt to the first tracking attempt.
    pub fn attach(provider: Arc<dyn PermissionProvider>, engine: &TelemetryEngine) -> Self {
        let initial = provider.query().unwrap_or_else(|| {
            info!("permission query unsupported, assuming prompt");
            PermissionState::Prompt
        });
        engine.set_permission_state(initial);

        let target = engine.clone();
        let sink: PermissionSink = Arc::new(move |permission: PermissionState| target.set_permission_state(permission));
        let handle = provider.subscribe(sink);
        debug!(handle = handle.id(), ?initial, "permission observer attached");

        Self {
            provider,
            handle: Some(handle),
        }
    }

    pub fn is_attached(&self) -> bool {
        self.handle.is_some()
    }

    /// Stop watching permission changes. Safe to call repeatedly.
    pub fn detach(&mut self) {
        if let Some(handle) = self.handle.take() {
            self.provider.unsubscribe(handle);
            debug!(handle = handle.id(), "permission observer detached");
        }
    }
}

impl Drop for PermissionObserver {
    fn drop(&mut self) {
        self.detach();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::types::TelemetryError;
    use crate::core::{Fix, TrackingState};
    use crate::source::{MockPermissionProvider, MockSampleSource};
    use crate::utils::config::EngineConfig;

    fn engine() -> (TelemetryEngine, Arc<MockSampleSource>) {
        let source = Arc::new(MockSampleSource::new());
        (TelemetryEngine::new(source.clone(), EngineConfig::default()), source)
    }

    #[test]
    fn test_initial_state_is_queried() {
        let (engine, _) = engine();
        let provider = Arc::new(MockPermissionProvider::new(PermissionState::Granted));
        let observer = PermissionObserver::attach(provider.clone(), &engine);

        assert!(observer.is_attached());
        assert_eq!(engine.permission_state(), PermissionState::Granted);
        assert_eq!(provider.subscriber_count(), 1);
    }

    #[test]
    fn test_unsupported_query_defaults_to_prompt() {
        let (engine, _) = engine();
        engine.set_permission_state(PermissionState::Granted);
        let _observer = PermissionObserver::attach(Arc::new(MockPermissionProvider::unsupported()), &engine);
        assert_eq!(engine.permission_state(), PermissionState::Prompt);
    }

    #[test]
    fn test_revocation_stops_tracking() {
        let (engine, source) = engine();
        let provider = Arc::new(MockPermissionProvider::new(PermissionState::Granted));
        let _observer = PermissionObserver::attach(provider.clone(), &engine);

        engine.start().unwrap();
        source.push_fix(Fix::new(0.0, 0.0, 0).with_device_speed(12.0));
        assert!(engine.snapshot().speed_kmh > 0.0);

        provider.set_state(PermissionState::Denied);
        assert_eq!(engine.tracking_state(), TrackingState::Idle);
        assert_eq!(engine.snapshot().speed_kmh, 0.0);
        assert_eq!(engine.last_error(), Some(TelemetryError::PermissionDenied));
        assert_eq!(source.subscriber_count(), 0);
    }

    #[test]
    fn test_regrant_is_mirrored() {
        let (engine, _) = engine();
        let provider = Arc::new(MockPermissionProvider::new(PermissionState::Denied));
        let _observer = PermissionObserver::attach(provider.clone(), &engine);
        assert_eq!(engine.permission_state(), PermissionState::Denied);

        provider.set_state(PermissionState::Granted);
        assert_eq!(engine.permission_state(), PermissionState::Granted);
    }

    #[test]
    fn test_detach_releases_subscription() {
        let (engine, _) = engine();
        let provider = Arc::new(MockPermissionProvider::new(PermissionState::Prompt));
        let mut observer = PermissionObserver::attach(provider.clone(), &engine);

        observer.detach();
        observer.detach();
        assert!(!observer.is_attached());
        assert_eq!(provider.subscriber_count(), 0);

        provider.set_state(PermissionState::Granted);
        assert_eq!(engine.permission_state(), PermissionState::Prompt);
    }

    #[test]
    fn test_drop_releases_subscription() {
        let (engine, _) = engine();
        let provider = Arc::new(MockPermissionProvider::new(PermissionState::Prompt));
        {
            let _observer = PermissionObserver::attach(provider.clone(), &engine);
            assert_eq!(provider.subscriber_count(), 1);
        }
        assert_eq!(provider.subscriber_count(), 0);
    }
}
