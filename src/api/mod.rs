//! Outward-facing API: errors, observer callbacks, dashboard and formatting

pub mod types;
pub mod dashboard;
pub mod formatting;

pub use types::{ApiResult, TelemetryError, CallbackHandle, SnapshotCallback, ErrorCallback};
pub use dashboard::{TripComputer, DashboardReading, Screen, RideToggle};
pub use formatting::{TextFormatter, JsonFormatter, CsvFormatter};
