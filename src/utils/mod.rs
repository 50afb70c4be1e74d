//! Utility modules for configuration

pub mod config;

pub use config::{ConfigurationManager, TripComputerConfig, EngineConfig, FuelConfig, TripLogConfig, LogLevel, ConfigError};
