//! GPS telemetry engine
//!
//! [`TripSession`] is the synchronous speed/distance state machine.
//! [`TelemetryEngine`] drives it from a sample source subscription and
//! publishes snapshots; [`PermissionObserver`] keeps the engine's
//! permission state in sync with the platform.

pub mod session;
pub mod telemetry;
pub mod permission;

pub use session::{FixOutcome, TripSession};
pub use telemetry::TelemetryEngine;
pub use permission::PermissionObserver;
