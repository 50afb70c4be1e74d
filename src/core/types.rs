//! Core data types for the telemetry engine

use serde::{Deserialize, Serialize};

/// Geodetic coordinate in degrees (WGS84 assumed)
///
/// Values are not range-checked; anything numeric is carried through as-is.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinate {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self { latitude, longitude }
    }
}

/// A single GPS position sample
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Fix {
    pub coordinate: Coordinate,
    /// Speed reported by the device, meters per second
    #[serde(default)]
    pub device_speed_mps: Option<f64>,
    /// Monotonic timestamp in milliseconds
    pub timestamp_ms: i64,
}

impl Fix {
    pub fn new(latitude: f64, longitude: f64, timestamp_ms: i64) -> Self {
        Self {
            coordinate: Coordinate::new(latitude, longitude),
            device_speed_mps: None,
            timestamp_ms,
        }
    }

    pub fn with_device_speed(mut self, speed_mps: f64) -> Self {
        self.device_speed_mps = Some(speed_mps);
        self
    }

    /// Device speed, if present and strictly positive
    pub fn usable_device_speed(&self) -> Option<f64> {
        self.device_speed_mps.filter(|speed| *speed > 0.0)
    }
}

/// Externally visible speed and distance values
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct TelemetrySnapshot {
    pub speed_kmh: f64,
    pub total_distance_km: f64,
}

impl TelemetrySnapshot {
    pub fn zero() -> Self {
        Self::default()
    }
}

/// Whether a tracking session is running
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum TrackingState {
    #[default]
    Idle,
    Active,
}

impl TrackingState {
    pub fn is_active(&self) -> bool {
        matches!(self, TrackingState::Active)
    }
}

/// Location permission as reported by the platform
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PermissionState {
    #[default]
    Prompt,
    Granted,
    Denied,
}
