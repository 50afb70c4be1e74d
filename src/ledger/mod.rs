//! Fuel and ride bookkeeping over the engine's distance output

pub mod fuel;
pub mod trips;

pub use fuel::{FuelLedger, FuelError};
pub use trips::{TripLog, TripRecord};
