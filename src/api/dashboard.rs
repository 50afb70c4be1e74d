//! Trip computer: engine, permission, fuel and ride history composed for a dashboard

use crate::api::types::ApiResult;
use crate::core::{PermissionState, TelemetrySnapshot, TrackingState};
use crate::engine::{PermissionObserver, TelemetryEngine};
use crate::ledger::{FuelError, FuelLedger, TripLog, TripRecord};
use crate::source::{PermissionProvider, SampleSource};
use crate::utils::config::{ConfigError, TripComputerConfig};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};
use tracing::info;

/// Everything a dashboard shows at one instant
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DashboardReading {
    pub speed_kmh: f64,
    pub distance_km: f64,
    pub remaining_fuel_l: f64,
    pub estimated_range_km: f64,
    pub tracking: TrackingState,
    pub permission: PermissionState,
    /// Message of the last surfaced error, if any
    pub error: Option<String>,
}

/// Which screen the dashboard should present
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    /// Waiting for the user to answer the platform permission prompt
    AwaitingPermission,
    /// Location access denied; tracking cannot run
    PermissionDenied,
    /// Live telemetry
    Dashboard,
}

/// Result of toggling the ride button
#[derive(Debug, Clone, PartialEq)]
pub enum RideToggle {
    Started(TelemetrySnapshot),
    /// The ride stopped; carries the logged trip when it covered any distance
    Stopped(Option<TripRecord>),
}

pub struct TripComputer {
    engine: TelemetryEngine,
    permissions: PermissionObserver,
    fuel: FuelLedger,
    trips: TripLog,
    auto_start_attempted: bool,
}

impl TripComputer {
    /// Build a computer from a configuration, rejecting invalid settings
    pub fn new(
        source: Arc<dyn SampleSource>,
        permissions: Arc<dyn PermissionProvider>,
        config: &TripComputerConfig,
    ) -> Result<Self, ConfigError> {
        config.validate()?;

        let engine = TelemetryEngine::new(source, config.engine.clone());
        let permissions = PermissionObserver::attach(permissions, &engine);

        Ok(Self {
            engine,
            permissions,
            fuel: FuelLedger::new(config.fuel.average_km_per_litre),
            trips: TripLog::new(config.trip_log.capacity),
            auto_start_attempted: false,
        })
    }

    pub fn engine(&self) -> &TelemetryEngine {
        &self.engine
    }

    pub fn trips(&self) -> &TripLog {
        &self.trips
    }

    pub fn fuel(&self) -> &FuelLedger {
        &self.fuel
    }

    /// Try to start tracking once, as soon as permission is not denied.
    ///
    /// Returns `None` when no attempt was made. A denied permission leaves
    /// the attempt pending so a later re-grant can still trigger it.
    pub fn auto_start(&mut self) -> Option<ApiResult<TelemetrySnapshot>> {
        if self.auto_start_attempted
            || self.engine.permission_state() == PermissionState::Denied
            || self.engine.tracking_state().is_active()
        {
            return None;
        }

        self.auto_start_attempted = true;
        Some(self.engine.start())
    }

    pub fn start_ride(&mut self) -> ApiResult<TelemetrySnapshot> {
        self.engine.start()
    }

    /// Stop the ride, logging it when it covered any distance.
    ///
    /// Only a running ride is logged; stopping an idle computer logs nothing.
    pub fn stop_ride(&mut self) -> Option<TripRecord> {
        let snapshot = self.engine.stop()?;
        let record = self.trips.record(snapshot.total_distance_km, now_ms());
        if let Some(trip) = &record {
            info!(id = trip.id, distance_km = trip.distance_km, "ride logged");
        }
        record
    }

    pub fn toggle_ride(&mut self) -> ApiResult<RideToggle> {
        if self.engine.tracking_state().is_active() {
            Ok(RideToggle::Stopped(self.stop_ride()))
        } else {
            self.start_ride().map(RideToggle::Started)
        }
    }

    pub fn add_fuel(&mut self, litres: f64) -> Result<f64, FuelError> {
        let total = self.fuel.add_fuel(litres)?;
        info!(litres, total_l = total, "fuel added");
        Ok(total)
    }

    pub fn reading(&self) -> DashboardReading {
        let snapshot = self.engine.snapshot();
        let distance_km = snapshot.total_distance_km;

        DashboardReading {
            speed_kmh: snapshot.speed_kmh,
            distance_km,
            remaining_fuel_l: self.fuel.remaining_l(distance_km),
            estimated_range_km: self.fuel.estimated_range_km(distance_km),
            tracking: self.engine.tracking_state(),
            permission: self.engine.permission_state(),
            error: self.engine.last_error().map(|e| e.to_string()),
        }
    }

    pub fn screen(&self) -> Screen {
        match (self.engine.permission_state(), self.engine.tracking_state()) {
            (PermissionState::Denied, _) => Screen::PermissionDenied,
            (PermissionState::Prompt, TrackingState::Idle) => Screen::AwaitingPermission,
            _ => Screen::Dashboard,
        }
    }

    /// Stop tracking and release the permission subscription
    pub fn shutdown(&mut self) {
        self.engine.stop();
        self.permissions.detach();
    }
}

fn now_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_millis() as u64)
        .unwrap_or_default()
}
