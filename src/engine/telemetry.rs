//! Event-driven telemetry engine
//!
//! The engine subscribes to a [`SampleSource`], feeds every fix through a
//! [`TripSession`] and publishes the resulting snapshots and errors to
//! registered observers. It is a cheap cloneable handle; all clones share
//! the same session.

use crate::api::types::{ApiResult, CallbackHandle, ErrorCallback, SnapshotCallback, TelemetryError};
use crate::core::{Fix, PermissionState, TelemetrySnapshot, TrackingState};
use crate::engine::session::{FixOutcome, TripSession};
use crate::source::{SampleSink, SampleSource, SourceError, SourceEvent, SubscriptionHandle, WatchOptions};
use crate::utils::config::EngineConfig;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::{Arc, Weak};
use tracing::{debug, info, warn};

/// State mutated together on every event
struct EngineState {
    session: TripSession,
    permission: PermissionState,
    subscription: Option<SubscriptionHandle>,
    /// Incremented on every start; events from older subscriptions are dropped
    generation: u64,
    last_error: Option<TelemetryError>,
}

/// Work left over after stopping a session under the lock
struct StoppedSession {
    snapshot: Option<TelemetrySnapshot>,
    subscription: Option<SubscriptionHandle>,
}

#[derive(Default)]
struct Observers {
    counter: u32,
    snapshot: HashMap<CallbackHandle, SnapshotCallback>,
    error: HashMap<CallbackHandle, ErrorCallback>,
}

struct Shared {
    source: Arc<dyn SampleSource>,
    watch_options: WatchOptions,
    state: Mutex<EngineState>,
    observers: Mutex<Observers>,
}

/// GPS telemetry engine handle
#[derive(Clone)]
pub struct TelemetryEngine {
    shared: Arc<Shared>,
}

impl TelemetryEngine {
    /// Create an idle engine reading from `source`
    pub fn new(source: Arc<dyn SampleSource>, config: EngineConfig) -> Self {
        let state = EngineState {
            session: TripSession::new(config.reject_out_of_order_fixes),
            permission: PermissionState::Prompt,
            subscription: None,
            generation: 0,
            last_error: None,
        };

        Self {
            shared: Arc::new(Shared {
                source,
                watch_options: config.watch,
                state: Mutex::new(state),
                observers: Mutex::new(Observers::default()),
            }),
        }
    }

    /// Start a new tracking session.
    ///
    /// Valid from any state; restarting while active discards the running
    /// session. Permission is not checked here, callers decide whether a
    /// denied permission should prevent the attempt.
    pub fn start(&self) -> ApiResult<TelemetrySnapshot> {
        let shared = &self.shared;
        if !shared.source.is_available() {
            warn!("geolocation unavailable, tracking not started");
            shared.report_error(TelemetryError::UnsupportedPlatform);
            return Err(TelemetryError::UnsupportedPlatform);
        }

        let (snapshot, generation, previous) = {
            let mut state = shared.state.lock();
            let previous = state.subscription.take();
            state.generation += 1;
            state.last_error = None;
            let snapshot = state.session.start();
            (snapshot, state.generation, previous)
        };

        if let Some(handle) = previous {
            debug!(handle = handle.id(), "releasing previous subscription");
            shared.source.unsubscribe(handle);
        }

        info!(generation, "tracking session started");
        shared.publish_snapshot(&snapshot);

        let weak = Arc::downgrade(shared);
        let sink: SampleSink = Arc::new(move |event: SourceEvent| Shared::deliver(&weak, generation, event));

        match shared.source.subscribe(&shared.watch_options, sink) {
            Ok(handle) => {
                let keep = {
                    let mut state = shared.state.lock();
                    // The session may already have been stopped from inside subscribe
                    if state.generation == generation && state.session.tracking_state().is_active() {
                        state.subscription = Some(handle);
                        true
                    } else {
                        false
                    }
                };
                if !keep {
                    shared.source.unsubscribe(handle);
                }
                Ok(snapshot)
            }
            Err(error) => {
                // Without a subscription no fix can arrive, so the session ends here
                warn!(%error, "failed to watch position");
                let stopped = {
                    let mut state = shared.state.lock();
                    (state.generation == generation).then(|| Shared::stop_locked(&mut state))
                };
                if let Some(stopped) = stopped {
                    shared.finish_stop(stopped);
                }
                let surfaced = TelemetryError::from(error);
                shared.report_error(surfaced.clone());
                Err(surfaced)
            }
        }
    }

    /// Stop tracking. Returns the final snapshot, or `None` if already idle.
    pub fn stop(&self) -> Option<TelemetrySnapshot> {
        self.shared.stop_session()
    }

    /// Feed a fix directly, bypassing the source subscription
    pub fn on_fix(&self, fix: Fix) -> Option<TelemetrySnapshot> {
        let generation = self.shared.state.lock().generation;
        self.shared.handle_fix(generation, fix)
    }

    /// Feed a source error directly, bypassing the source subscription
    pub fn on_source_error(&self, error: SourceError) {
        let generation = self.shared.state.lock().generation;
        self.shared.handle_source_error(generation, error);
    }

    /// Record a permission change reported by the platform.
    ///
    /// A change to `Denied` while tracking stops the session and raises
    /// [`TelemetryError::PermissionDenied`].
    pub fn set_permission_state(&self, permission: PermissionState) {
        let stopped = {
            let mut state = self.shared.state.lock();
            state.permission = permission;
            if permission == PermissionState::Denied && state.session.tracking_state().is_active() {
                Some(Shared::stop_locked(&mut state))
            } else {
                None
            }
        };

        debug!(?permission, "permission state updated");
        if let Some(stopped) = stopped {
            warn!("location permission revoked while tracking");
            self.shared.finish_stop(stopped);
            self.shared.report_error(TelemetryError::PermissionDenied);
        }
    }

    pub fn snapshot(&self) -> TelemetrySnapshot {
        self.shared.state.lock().session.snapshot()
    }

    pub fn tracking_state(&self) -> TrackingState {
        self.shared.state.lock().session.tracking_state()
    }

    pub fn permission_state(&self) -> PermissionState {
        self.shared.state.lock().permission
    }

    /// Most recent surfaced error.
    ///
    /// Transient errors clear on the next accepted fix, persistent ones on the
    /// next start.
    pub fn last_error(&self) -> Option<TelemetryError> {
        self.shared.state.lock().last_error.clone()
    }

    /// Register a snapshot observer
    pub fn on_snapshot_updated<F>(&self, callback: F) -> CallbackHandle
    where
        F: Fn(&TelemetrySnapshot) + Send + Sync + 'static,
    {
        let mut observers = self.shared.observers.lock();
        observers.counter += 1;
        let handle = CallbackHandle::new(observers.counter);
        observers.snapshot.insert(handle, Arc::new(callback));
        handle
    }

    /// Register an error observer
    pub fn on_error<F>(&self, callback: F) -> CallbackHandle
    where
        F: Fn(&TelemetryError) + Send + Sync + 'static,
    {
        let mut observers = self.shared.observers.lock();
        observers.counter += 1;
        let handle = CallbackHandle::new(observers.counter);
        observers.error.insert(handle, Arc::new(callback));
        handle
    }

    /// Unregister an observer. Returns false for unknown handles.
    pub fn remove_callback(&self, handle: CallbackHandle) -> bool {
        let mut observers = self.shared.observers.lock();
        observers.snapshot.remove(&handle).is_some() || observers.error.remove(&handle).is_some()
    }

    /// Number of registered (snapshot, error) observers
    pub fn callback_count(&self) -> (usize, usize) {
        let observers = self.shared.observers.lock();
        (observers.snapshot.len(), observers.error.len())
    }
}

impl Shared {
    fn deliver(weak: &Weak<Shared>, generation: u64, event: SourceEvent) {
        let Some(shared) = weak.upgrade() else {
            return;
        };
        match event {
            SourceEvent::Fix(fix) => {
                shared.handle_fix(generation, fix);
            }
            SourceEvent::Error(error) => shared.handle_source_error(generation, error),
        }
    }

    fn handle_fix(&self, generation: u64, fix: Fix) -> Option<TelemetrySnapshot> {
        let outcome = {
            let mut state = self.state.lock();
            if state.generation != generation {
                return None;
            }
            let outcome = state.session.ingest(fix);
            // Persistent errors stay until the next start
            if matches!(outcome, FixOutcome::Accepted(_))
                && state.last_error.as_ref().is_some_and(|error| !error.is_persistent())
            {
                state.last_error = None;
            }
            outcome
        };

        match outcome {
            FixOutcome::Accepted(snapshot) => {
                debug!(
                    speed_kmh = snapshot.speed_kmh,
                    distance_km = snapshot.total_distance_km,
                    timestamp_ms = fix.timestamp_ms,
                    "fix accepted"
                );
                self.publish_snapshot(&snapshot);
                Some(snapshot)
            }
            FixOutcome::Idle => {
                debug!("fix ignored, tracking idle");
                None
            }
            FixOutcome::OutOfOrder { last_timestamp_ms } => {
                warn!(
                    timestamp_ms = fix.timestamp_ms,
                    last_timestamp_ms, "out-of-order fix dropped"
                );
                None
            }
        }
    }

    fn handle_source_error(&self, generation: u64, error: SourceError) {
        // The generation check and the stop happen under one lock so a
        // concurrent start() cannot be stopped by a stale error
        let stopped = {
            let mut state = self.state.lock();
            if state.generation != generation || !state.session.tracking_state().is_active() {
                debug!(%error, "source error ignored, session not running");
                return;
            }
            error.is_fatal().then(|| Shared::stop_locked(&mut state))
        };

        match stopped {
            Some(stopped) => {
                warn!(%error, "fatal source error, stopping session");
                self.finish_stop(stopped);
            }
            None => warn!(%error, "transient source error"),
        }
        self.report_error(TelemetryError::from(error));
    }

    fn stop_session(&self) -> Option<TelemetrySnapshot> {
        let stopped = Shared::stop_locked(&mut self.state.lock());
        self.finish_stop(stopped)
    }

    /// End the session and detach its subscription while the caller holds the lock
    fn stop_locked(state: &mut EngineState) -> StoppedSession {
        StoppedSession {
            snapshot: state.session.stop(),
            subscription: state.subscription.take(),
        }
    }

    /// Release the subscription and publish, with the lock released
    fn finish_stop(&self, stopped: StoppedSession) -> Option<TelemetrySnapshot> {
        let StoppedSession { snapshot, subscription } = stopped;
        if let Some(handle) = subscription {
            self.source.unsubscribe(handle);
        }

        if let Some(snapshot) = &snapshot {
            info!(distance_km = snapshot.total_distance_km, "tracking session stopped");
            self.publish_snapshot(snapshot);
        }
        snapshot
    }

    fn report_error(&self, error: TelemetryError) {
        self.state.lock().last_error = Some(error.clone());
        let callbacks: Vec<ErrorCallback> = self.observers.lock().error.values().cloned().collect();
        for callback in callbacks {
            callback(&error);
        }
    }

    fn publish_snapshot(&self, snapshot: &TelemetrySnapshot) {
        // Observers run unlocked so they can query the engine
        let callbacks: Vec<SnapshotCallback> = self.observers.lock().snapshot.values().cloned().collect();
        for callback in callbacks {
            callback(snapshot);
        }
    }
}
