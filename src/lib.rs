//! Motorcycle Trip Computer
//!
//! Turns a live stream of GPS fixes into speed, trip distance, fuel left and
//! range estimates. The telemetry engine prefers device-reported speed and
//! falls back to a great-circle estimate between consecutive fixes.

pub mod core;
pub mod algorithms;
pub mod source;
pub mod engine;
pub mod ledger;
pub mod api;
pub mod utils;

// Re-export commonly used types
pub use crate::core::{Coordinate, Fix, TelemetrySnapshot, TrackingState, PermissionState};
pub use algorithms::haversine_distance_m;
pub use source::{
    SampleSource, SampleSink, SourceEvent, WatchOptions, PermissionProvider, PermissionSink,
    SubscriptionHandle, SourceError, SourceResult, MockSampleSource, MockPermissionProvider,
};
pub use engine::{TelemetryEngine, TripSession, FixOutcome, PermissionObserver};
pub use ledger::{FuelLedger, FuelError, TripLog, TripRecord};
pub use api::{
    ApiResult, TelemetryError, CallbackHandle, TripComputer, DashboardReading, Screen, RideToggle,
    TextFormatter, JsonFormatter, CsvFormatter,
};
pub use utils::{ConfigurationManager, TripComputerConfig, EngineConfig, ConfigError};
