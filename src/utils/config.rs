use crate::core::{DEFAULT_AVERAGE_KM_PER_LITRE, DEFAULT_TRIP_LOG_CAPACITY};
use crate::source::WatchOptions;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

/// Complete trip computer configuration
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TripComputerConfig {
    /// Telemetry engine settings
    pub engine: EngineConfig,
    /// Fuel economy settings
    pub fuel: FuelConfig,
    /// Ride history settings
    pub trip_log: TripLogConfig,
    /// Log verbosity for the binary
    pub log_level: LogLevel,
}

/// Telemetry engine configuration
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Drop fixes timestamped before the retained fix instead of processing them
    pub reject_out_of_order_fixes: bool,
    /// Options passed to the position source
    pub watch: WatchOptions,
}

/// Fuel economy configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FuelConfig {
    /// Average consumption of the bike (km per litre)
    pub average_km_per_litre: f64,
}

impl Default for FuelConfig {
    fn default() -> Self {
        Self {
            average_km_per_litre: DEFAULT_AVERAGE_KM_PER_LITRE,
        }
    }
}

/// Ride history configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TripLogConfig {
    /// Maximum number of rides kept, newest first
    pub capacity: usize,
}

impl Default for TripLogConfig {
    fn default() -> Self {
        Self {
            capacity: DEFAULT_TRIP_LOG_CAPACITY,
        }
    }
}

/// Logging levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Off,
    Error,
    Warn,
    #[default]
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    /// Directive understood by `tracing_subscriber::EnvFilter`
    pub fn as_filter(&self) -> &'static str {
        match self {
            LogLevel::Off => "off",
            LogLevel::Error => "error",
            LogLevel::Warn => "warn",
            LogLevel::Info => "info",
            LogLevel::Debug => "debug",
            LogLevel::Trace => "trace",
        }
    }
}

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Invalid parameter value
    #[error("invalid {parameter} = {value}: {reason}")]
    InvalidParameter { parameter: String, value: String, reason: String },
    /// Configuration file could not be read or written
    #[error("config file '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    /// JSON serialization/deserialization error
    #[error("config serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),
    /// No file path known for saving
    #[error("no file path set for saving configuration")]
    NoPath,
}

impl TripComputerConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        let kmpl = self.fuel.average_km_per_litre;
        if !kmpl.is_finite() || kmpl <= 0.0 {
            return Err(ConfigError::InvalidParameter {
                parameter: "fuel.average_km_per_litre".to_string(),
                value: kmpl.to_string(),
                reason: "must be a positive number".to_string(),
            });
        }

        if self.trip_log.capacity == 0 {
            return Err(ConfigError::InvalidParameter {
                parameter: "trip_log.capacity".to_string(),
                value: "0".to_string(),
                reason: "must keep at least one trip".to_string(),
            });
        }

        self.engine
            .watch
            .validate()
            .map_err(|reason| ConfigError::InvalidParameter {
                parameter: "engine.watch.timeout_ms".to_string(),
                value: self.engine.watch.timeout_ms.to_string(),
                reason,
            })
    }
}

/// Loads, validates and saves the configuration file
#[derive(Debug, Default)]
pub struct ConfigurationManager {
    config: TripComputerConfig,
    config_file_path: Option<String>,
    is_modified: bool,
}

impl ConfigurationManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Get current configuration
    pub fn config(&self) -> &TripComputerConfig {
        &self.config
    }

    /// Replace the configuration after validating it
    pub fn set_config(&mut self, config: TripComputerConfig) -> Result<(), ConfigError> {
        config.validate()?;
        self.config = config;
        self.is_modified = true;
        Ok(())
    }

    /// Load configuration from a JSON file. Missing fields take defaults.
    pub fn load_from_file<P: AsRef<Path>>(&mut self, path: P) -> Result<(), ConfigError> {
        let path_str = path.as_ref().to_string_lossy().to_string();

        let content = fs::read_to_string(&path).map_err(|source| ConfigError::Io {
            path: path_str.clone(),
            source,
        })?;

        let config: TripComputerConfig = serde_json::from_str(&content)?;
        config.validate()?;

        self.config = config;
        self.config_file_path = Some(path_str);
        self.is_modified = false;
        Ok(())
    }

    /// Save configuration to a JSON file
    pub fn save_to_file<P: AsRef<Path>>(&mut self, path: P) -> Result<(), ConfigError> {
        let path_str = path.as_ref().to_string_lossy().to_string();
        let content = serde_json::to_string_pretty(&self.config)?;

        fs::write(&path, content).map_err(|source| ConfigError::Io {
            path: path_str.clone(),
            source,
        })?;

        self.config_file_path = Some(path_str);
        self.is_modified = false;
        Ok(())
    }

    /// Save to the file the configuration was last loaded from or saved to
    pub fn save(&mut self) -> Result<(), ConfigError> {
        match self.config_file_path.clone() {
            Some(path) => self.save_to_file(path),
            None => Err(ConfigError::NoPath),
        }
    }

    /// Check if configuration has been modified since last save
    pub fn is_modified(&self) -> bool {
        self.is_modified
    }
}
