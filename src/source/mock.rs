//! Mock sample source and permission provider for testing and replay

use crate::core::{Fix, PermissionState};
use crate::source::{
    PermissionProvider, PermissionSink, SampleSink, SampleSource, SourceError, SourceEvent,
    SourceResult, SubscriptionHandle, WatchOptions,
};
use parking_lot::Mutex;
use std::collections::HashMap;

#[derive(Default)]
struct MockSourceState {
    available: bool,
    handle_counter: u32,
    subscribers: HashMap<SubscriptionHandle, SampleSink>,
    last_options: Option<WatchOptions>,
    subscribe_failure: Option<SourceError>,
    subscribe_count: u32,
}

/// In-process sample source driven by the caller.
///
/// Fixes and errors are delivered synchronously to every live subscriber.
pub struct MockSampleSource {
    state: Mutex<MockSourceState>,
}

impl MockSampleSource {
    /// Create an available mock source
    pub fn new() -> Self {
        Self {
            state: Mutex::new(MockSourceState {
                available: true,
                ..Default::default()
            }),
        }
    }

    /// Create a source that reports geolocation as unsupported
    pub fn unavailable() -> Self {
        let source = Self::new();
        source.set_available(false);
        source
    }

    pub fn set_available(&self, available: bool) {
        self.state.lock().available = available;
    }

    /// Make the next `subscribe` call fail with the given error
    pub fn fail_next_subscribe(&self, error: SourceError) {
        self.state.lock().subscribe_failure = Some(error);
    }

    /// Deliver a fix to all subscribers
    pub fn push_fix(&self, fix: Fix) {
        self.dispatch(SourceEvent::Fix(fix));
    }

    /// Deliver an error to all subscribers
    pub fn push_error(&self, error: SourceError) {
        self.dispatch(SourceEvent::Error(error));
    }

    /// Number of live subscriptions
    pub fn subscriber_count(&self) -> usize {
        self.state.lock().subscribers.len()
    }

    /// Total number of successful `subscribe` calls
    pub fn subscribe_count(&self) -> u32 {
        self.state.lock().subscribe_count
    }

    /// Options passed by the most recent subscriber
    pub fn last_watch_options(&self) -> Option<WatchOptions> {
        self.state.lock().last_options.clone()
    }

    fn dispatch(&self, event: SourceEvent) {
        // Sinks run without the lock held so they may unsubscribe
        let sinks: Vec<SampleSink> = self.state.lock().subscribers.values().cloned().collect();
        for sink in sinks {
            sink(event.clone());
        }
    }
}

impl Default for MockSampleSource {
    fn default() -> Self {
        Self::new()
    }
}

impl SampleSource for MockSampleSource {
    fn is_available(&self) -> bool {
        self.state.lock().available
    }

    fn subscribe(&self, options: &WatchOptions, sink: SampleSink) -> SourceResult<SubscriptionHandle> {
        let mut state = self.state.lock();
        if let Some(error) = state.subscribe_failure.take() {
            return Err(error);
        }

        state.handle_counter += 1;
        let handle = SubscriptionHandle::new(state.handle_counter);
        state.subscribers.insert(handle, sink);
        state.last_options = Some(options.clone());
        state.subscribe_count += 1;
        Ok(handle)
    }

    fn unsubscribe(&self, handle: SubscriptionHandle) {
        self.state.lock().subscribers.remove(&handle);
    }
}

#[derive(Default)]
struct MockPermissionState {
    current: Option<PermissionState>,
    handle_counter: u32,
    subscribers: HashMap<SubscriptionHandle, PermissionSink>,
}

/// In-process permission provider driven by the caller
pub struct MockPermissionProvider {
    state: Mutex<MockPermissionState>,
}

impl MockPermissionProvider {
    pub fn new(initial: PermissionState) -> Self {
        Self {
            state: Mutex::new(MockPermissionState {
                current: Some(initial),
                ..Default::default()
            }),
        }
    }

    /// Provider for a platform that cannot be queried
    pub fn unsupported() -> Self {
        Self {
            state: Mutex::new(MockPermissionState::default()),
        }
    }

    /// Change the permission and notify subscribers
    pub fn set_state(&self, permission: PermissionState) {
        let sinks: Vec<PermissionSink> = {
            let mut state = self.state.lock();
            state.current = Some(permission);
            state.subscribers.values().cloned().collect()
        };
        for sink in sinks {
            sink(permission);
        }
    }

    pub fn subscriber_count(&self) -> usize {
        self.state.lock().subscribers.len()
    }
}

impl PermissionProvider for MockPermissionProvider {
    fn query(&self) -> Option<PermissionState> {
        self.state.lock().current
    }

    fn subscribe(&self, sink: PermissionSink) -> SubscriptionHandle {
        let mut state = self.state.lock();
        state.handle_counter += 1;
        let handle = SubscriptionHandle::new(state.handle_counter);
        state.subscribers.insert(handle, sink);
        handle
    }

    fn unsubscribe(&self, handle: SubscriptionHandle) {
        self.state.lock().subscribers.remove(&handle);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    fn recording_sink() -> (SampleSink, Arc<Mutex<Vec<SourceEvent>>>) {
        let events = Arc::new(Mutex::new(Vec::new()));
        let captured = Arc::clone(&events);
        let sink: SampleSink = Arc::new(move |event: SourceEvent| captured.lock().push(event));
        (sink, events)
    }

    #[test]
    fn test_mock_source_creation() {
        let source = MockSampleSource::new();
        assert!(source.is_available());
        assert_eq!(source.subscriber_count(), 0);
        assert!(!MockSampleSource::unavailable().is_available());
    }

    #[test]
    fn test_fix_delivery() {
        let source = MockSampleSource::new();
        let (sink, events) = recording_sink();
        let handle = source.subscribe(&WatchOptions::default(), sink).unwrap();

        source.push_fix(Fix::new(1.0, 2.0, 1000));
        source.push_error(SourceError::Timeout { timeout_ms: 10_000 });
        assert_eq!(events.lock().len(), 2);
        assert_eq!(source.last_watch_options(), Some(WatchOptions::default()));

        source.unsubscribe(handle);
        source.push_fix(Fix::new(1.0, 2.0, 2000));
        assert_eq!(events.lock().len(), 2);
    }

    #[test]
    fn test_subscribe_failure_is_one_shot() {
        let source = MockSampleSource::new();
        source.fail_next_subscribe(SourceError::PermissionDenied);

        let (sink, _) = recording_sink();
        assert_eq!(
            source.subscribe(&WatchOptions::default(), sink.clone()),
            Err(SourceError::PermissionDenied)
        );
        assert!(source.subscribe(&WatchOptions::default(), sink).is_ok());
        assert_eq!(source.subscribe_count(), 1);
    }

    #[test]
    fn test_sink_may_unsubscribe_itself() {
        let source = Arc::new(MockSampleSource::new());
        let handle_slot: Arc<Mutex<Option<SubscriptionHandle>>> = Arc::new(Mutex::new(None));

        let source_ref = Arc::clone(&source);
        let slot = Arc::clone(&handle_slot);
        let sink: SampleSink = Arc::new(move |_: SourceEvent| {
            if let Some(handle) = slot.lock().take() {
                source_ref.unsubscribe(handle);
            }
        });

        let handle = source.subscribe(&WatchOptions::default(), sink).unwrap();
        *handle_slot.lock() = Some(handle);

        source.push_fix(Fix::new(0.0, 0.0, 0));
        assert_eq!(source.subscriber_count(), 0);
    }

    #[test]
    fn test_permission_provider() {
        let provider = MockPermissionProvider::new(PermissionState::Granted);
        assert_eq!(provider.query(), Some(PermissionState::Granted));
        assert_eq!(MockPermissionProvider::unsupported().query(), None);

        let seen = Arc::new(Mutex::new(Vec::<PermissionState>::new()));
        let captured = Arc::clone(&seen);
        let handle = provider.subscribe(Arc::new(move |state: PermissionState| captured.lock().push(state)));

        provider.set_state(PermissionState::Denied);
        assert_eq!(*seen.lock(), vec![PermissionState::Denied]);

        provider.unsubscribe(handle);
        provider.set_state(PermissionState::Granted);
        assert_eq!(seen.lock().len(), 1);
        assert_eq!(provider.subscriber_count(), 0);
    }
}
