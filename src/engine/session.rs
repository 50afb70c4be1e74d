//! Per-session telemetry state machine
//!
//! `TripSession` holds the retained last fix together with the speed and
//! distance counters. It is plain owned state with no I/O; the engine wraps
//! it behind a single lock so a fix updates all fields at once.

use crate::algorithms::haversine_distance_m;
use crate::core::{Fix, TelemetrySnapshot, TrackingState, METERS_PER_KM, MPS_TO_KMH, MS_PER_SECOND};

/// Result of feeding one fix into a session
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FixOutcome {
    /// The fix was processed and produced a new snapshot
    Accepted(TelemetrySnapshot),
    /// No session is running
    Idle,
    /// The fix predates the retained one and rejection is enabled
    OutOfOrder { last_timestamp_ms: i64 },
}

#[derive(Debug, Clone)]
pub struct TripSession {
    tracking: TrackingState,
    last_fix: Option<Fix>,
    speed_kmh: f64,
    total_distance_km: f64,
    reject_out_of_order: bool,
}

impl TripSession {
    pub fn new(reject_out_of_order: bool) -> Self {
        Self {
            tracking: TrackingState::Idle,
            last_fix: None,
            speed_kmh: 0.0,
            total_distance_km: 0.0,
            reject_out_of_order,
        }
    }

    /// Begin a new session, discarding any previous one.
    ///
    /// Restarting an active session is a hard reset.
    pub fn start(&mut self) -> TelemetrySnapshot {
        self.tracking = TrackingState::Active;
        self.last_fix = None;
        self.speed_kmh = 0.0;
        self.total_distance_km = 0.0;
        self.snapshot()
    }

    /// End the session. Returns the final snapshot, or `None` if already idle.
    pub fn stop(&mut self) -> Option<TelemetrySnapshot> {
        if !self.tracking.is_active() {
            return None;
        }
        self.tracking = TrackingState::Idle;
        self.last_fix = None;
        self.speed_kmh = 0.0;
        Some(self.snapshot())
    }

    pub fn ingest(&mut self, fix: Fix) -> FixOutcome {
        if !self.tracking.is_active() {
            return FixOutcome::Idle;
        }

        if let Some(last) = self.last_fix {
            if self.reject_out_of_order && fix.timestamp_ms < last.timestamp_ms {
                return FixOutcome::OutOfOrder {
                    last_timestamp_ms: last.timestamp_ms,
                };
            }
        }

        let step_m = self
            .last_fix
            .map(|last| haversine_distance_m(&last.coordinate, &fix.coordinate));

        match (fix.usable_device_speed(), self.last_fix, step_m) {
            (Some(device_mps), _, _) => self.speed_kmh = device_mps * MPS_TO_KMH,
            (None, Some(last), Some(distance_m)) => {
                let elapsed_s = (fix.timestamp_ms as f64 - last.timestamp_ms as f64) / MS_PER_SECOND;
                // Duplicate or reversed timestamps keep the previous speed
                if elapsed_s > 0.0 {
                    self.speed_kmh = distance_m / elapsed_s * MPS_TO_KMH;
                }
            }
            _ => self.speed_kmh = 0.0,
        }

        if let Some(distance_m) = step_m {
            self.total_distance_km += distance_m / METERS_PER_KM;
        }

        self.last_fix = Some(fix);
        FixOutcome::Accepted(self.snapshot())
    }

    pub fn snapshot(&self) -> TelemetrySnapshot {
        TelemetrySnapshot {
            speed_kmh: self.speed_kmh,
            total_distance_km: self.total_distance_km,
        }
    }

    pub fn tracking_state(&self) -> TrackingState {
        self.tracking
    }

    #[cfg(test)]
    fn last_fix(&self) -> Option<&Fix> {
        self.last_fix.as_ref()
    }
}

impl Default for TripSession {
    fn default() -> Self {
        Self::new(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn accepted(outcome: FixOutcome) -> TelemetrySnapshot {
        match outcome {
            FixOutcome::Accepted(snapshot) => snapshot,
            other => panic!("expected accepted fix, got {:?}", other),
        }
    }

    #[test]
    fn test_fix_ignored_while_idle() {
        let mut session = TripSession::default();
        assert_eq!(session.ingest(Fix::new(0.0, 0.0, 0)), FixOutcome::Idle);
        assert!(session.last_fix().is_none());
    }

    #[test]
    fn test_first_fix_without_device_speed() {
        let mut session = TripSession::default();
        session.start();
        let snapshot = accepted(session.ingest(Fix::new(10.0, 10.0, 1_000)));
        assert_eq!(snapshot, TelemetrySnapshot::zero());
    }

    #[test]
    fn test_fallback_speed_and_distance() {
        let mut session = TripSession::default();
        session.start();
        session.ingest(Fix::new(0.0, 0.0, 0));
        let snapshot = accepted(session.ingest(Fix::new(0.0, 0.001, 10_000)));

        assert!((snapshot.speed_kmh - 40.03).abs() < 0.01, "speed {}", snapshot.speed_kmh);
        assert!((snapshot.total_distance_km - 0.1112).abs() < 0.0001, "distance {}", snapshot.total_distance_km);
    }

    #[test]
    fn test_device_speed_takes_precedence() {
        let mut session = TripSession::default();
        session.start();
        session.ingest(Fix::new(0.0, 0.0, 0));
        let snapshot = accepted(session.ingest(Fix::new(0.0, 0.001, 10_000).with_device_speed(10.0)));

        assert!((snapshot.speed_kmh - 36.0).abs() < 1e-9);
        // Distance still uses the geometric step
        assert!((snapshot.total_distance_km - 0.1112).abs() < 0.0001);
    }

    #[test]
    fn test_zero_device_speed_falls_back_to_geometry() {
        let mut session = TripSession::default();
        session.start();
        session.ingest(Fix::new(0.0, 0.0, 0));
        let snapshot = accepted(session.ingest(Fix::new(0.0, 0.001, 10_000).with_device_speed(0.0)));
        assert!((snapshot.speed_kmh - 40.03).abs() < 0.01);
    }

    #[test]
    fn test_first_fix_with_device_speed() {
        let mut session = TripSession::default();
        session.start();
        let snapshot = accepted(session.ingest(Fix::new(0.0, 0.0, 0).with_device_speed(5.0)));
        assert!((snapshot.speed_kmh - 18.0).abs() < 1e-9);
        assert_eq!(snapshot.total_distance_km, 0.0);
    }

    #[test]
    fn test_zero_time_delta_keeps_previous_speed() {
        let mut session = TripSession::default();
        session.start();
        session.ingest(Fix::new(0.0, 0.0, 0));
        let before = accepted(session.ingest(Fix::new(0.0, 0.001, 10_000)));
        let after = accepted(session.ingest(Fix::new(0.0, 0.002, 10_000)));

        assert_eq!(after.speed_kmh, before.speed_kmh);
        assert!(after.total_distance_km > before.total_distance_km);
        assert!((after.total_distance_km - 0.2224).abs() < 0.0001);
    }

    #[test]
    fn test_out_of_order_fix_processed_by_default() {
        let mut session = TripSession::default();
        session.start();
        session.ingest(Fix::new(0.0, 0.0, 0));
        let before = accepted(session.ingest(Fix::new(0.0, 0.001, 10_000)));
        let after = accepted(session.ingest(Fix::new(0.0, 0.002, 5_000)));

        // Negative delta is masked for speed but distance still accumulates
        assert_eq!(after.speed_kmh, before.speed_kmh);
        assert!(after.total_distance_km > before.total_distance_km);
        assert_eq!(session.last_fix().map(|f| f.timestamp_ms), Some(5_000));
    }

    #[test]
    fn test_out_of_order_fix_rejected_when_enabled() {
        let mut session = TripSession::new(true);
        session.start();
        session.ingest(Fix::new(0.0, 0.0, 10_000));
        let outcome = session.ingest(Fix::new(0.0, 0.001, 5_000));

        assert_eq!(outcome, FixOutcome::OutOfOrder { last_timestamp_ms: 10_000 });
        assert_eq!(session.snapshot().total_distance_km, 0.0);
        assert_eq!(session.last_fix().map(|f| f.timestamp_ms), Some(10_000));
    }

    #[test]
    fn test_stop_keeps_distance_and_zeroes_speed() {
        let mut session = TripSession::default();
        session.start();
        session.ingest(Fix::new(0.0, 0.0, 0));
        session.ingest(Fix::new(0.0, 0.001, 10_000));

        let snapshot = session.stop().unwrap();
        assert_eq!(snapshot.speed_kmh, 0.0);
        assert!((snapshot.total_distance_km - 0.1112).abs() < 0.0001);
        assert!(session.last_fix().is_none());
        assert_eq!(session.tracking_state(), TrackingState::Idle);

        // Second stop is a no-op
        assert_eq!(session.stop(), None);
        assert_eq!(session.snapshot(), snapshot);
    }

    #[test]
    fn test_restart_resets_counters() {
        let mut session = TripSession::default();
        session.start();
        session.ingest(Fix::new(0.0, 0.0, 0).with_device_speed(20.0));
        session.ingest(Fix::new(0.0, 0.01, 10_000).with_device_speed(20.0));

        let snapshot = session.start();
        assert_eq!(snapshot, TelemetrySnapshot::zero());
        assert!(session.last_fix().is_none());
        assert_eq!(session.tracking_state(), TrackingState::Active);

        // The first fix after a restart does not add distance from the old session
        let snapshot = accepted(session.ingest(Fix::new(1.0, 1.0, 20_000)));
        assert_eq!(snapshot.total_distance_km, 0.0);
    }

    #[test]
    fn test_extreme_timestamps_do_not_overflow() {
        let mut session = TripSession::default();
        session.start();
        session.ingest(Fix::new(0.0, 0.0, i64::MIN));
        let snapshot = accepted(session.ingest(Fix::new(0.0, 0.001, 10)));

        // The elapsed time is huge, so the derived speed is effectively zero
        assert!(snapshot.speed_kmh >= 0.0 && snapshot.speed_kmh < 1e-6);
        assert!((snapshot.total_distance_km - 0.1112).abs() < 0.0001);
    }

    proptest! {
        #[test]
        fn prop_distance_is_monotonic(
            steps in prop::collection::vec(
                (-0.01f64..0.01, -0.01f64..0.01, -2_000i64..5_000, prop::option::of(0.0f64..60.0)),
                1..64,
            )
        ) {
            let mut session = TripSession::default();
            session.start();

            let (mut lat, mut lon, mut t) = (45.0, 7.0, 0i64);
            let mut previous = 0.0;
            for (dlat, dlon, dt, speed) in steps {
                lat += dlat;
                lon += dlon;
                t += dt;
                let mut fix = Fix::new(lat, lon, t);
                fix.device_speed_mps = speed;

                if let FixOutcome::Accepted(snapshot) = session.ingest(fix) {
                    prop_assert!(snapshot.total_distance_km >= previous);
                    prop_assert!(snapshot.speed_kmh >= 0.0);
                    previous = snapshot.total_distance_km;
                }
            }
        }
    }
}
