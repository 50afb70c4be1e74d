//! Core types and constants for the trip computer

pub mod types;
pub mod constants;

pub use types::*;
pub use constants::*;
