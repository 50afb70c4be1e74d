//! Dashboard reading output formatting
//!
//! Text output mirrors what the dashboard cards show; the compact form is the
//! single line used by small mirror surfaces. JSON and CSV are for logging
//! replays.

use crate::api::dashboard::DashboardReading;

/// Human-readable text formatter
#[derive(Debug, Clone, Default)]
pub struct TextFormatter {
    /// Use single-line compact format
    pub compact: bool,
}

impl TextFormatter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn compact() -> Self {
        Self { compact: true }
    }

    pub fn format_text(&self, reading: &DashboardReading) -> String {
        if self.compact {
            return format!(
                "{:.0} km/h | Dist: {:.1}km | Fuel: {:.1}L",
                reading.speed_kmh, reading.distance_km, reading.remaining_fuel_l
            );
        }

        let mut output = String::new();
        output.push_str(&format!("Speed:      {:.0} km/h\n", reading.speed_kmh));
        output.push_str(&format!("Distance:   {:.2} km\n", reading.distance_km));
        output.push_str(&format!("Fuel Left:  {:.2} L\n", reading.remaining_fuel_l));
        output.push_str(&format!("Est. Range: {:.0} km\n", reading.estimated_range_km));
        output.push_str(&format!("Tracking:   {:?}\n", reading.tracking));
        if let Some(error) = &reading.error {
            output.push_str(&format!("Error:      {}\n", error));
        }
        output
    }
}

/// JSON formatter for structured output
#[derive(Debug, Clone, Default)]
pub struct JsonFormatter {
    /// Pretty print JSON
    pub pretty: bool,
}

impl JsonFormatter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn pretty() -> Self {
        Self { pretty: true }
    }

    pub fn format_json(&self, reading: &DashboardReading) -> Result<String, serde_json::Error> {
        if self.pretty {
            serde_json::to_string_pretty(reading)
        } else {
            serde_json::to_string(reading)
        }
    }
}

/// CSV formatter for data logging
#[derive(Debug, Clone)]
pub struct CsvFormatter {
    /// Include header row
    pub include_header: bool,
}

impl Default for CsvFormatter {
    fn default() -> Self {
        Self { include_header: true }
    }
}

impl CsvFormatter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn header(&self) -> String {
        "speed_kmh,distance_km,remaining_fuel_l,estimated_range_km,tracking,permission".to_string()
    }

    pub fn format_csv(&self, reading: &DashboardReading) -> String {
        format!(
            "{:.2},{:.4},{:.3},{:.1},{:?},{:?}",
            reading.speed_kmh,
            reading.distance_km,
            reading.remaining_fuel_l,
            reading.estimated_range_km,
            reading.tracking,
            reading.permission
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{PermissionState, TrackingState};

    fn reading() -> DashboardReading {
        DashboardReading {
            speed_kmh: 87.6,
            distance_km: 12.347,
            remaining_fuel_l: 4.6914,
            estimated_range_km: 187.656,
            tracking: TrackingState::Active,
            permission: PermissionState::Granted,
            error: None,
        }
    }

    #[test]
    fn test_text_format() {
        let text = TextFormatter::new().format_text(&reading());
        assert!(text.contains("Speed:      88 km/h"));
        assert!(text.contains("Distance:   12.35 km"));
        assert!(text.contains("Fuel Left:  4.69 L"));
        assert!(text.contains("Est. Range: 188 km"));
        assert!(!text.contains("Error"));
    }

    #[test]
    fn test_text_format_with_error() {
        let mut reading = reading();
        reading.error = Some("GPS error: no fix".to_string());
        let text = TextFormatter::new().format_text(&reading);
        assert!(text.contains("Error:      GPS error: no fix"));
    }

    #[test]
    fn test_compact_format() {
        let text = TextFormatter::compact().format_text(&reading());
        assert_eq!(text, "88 km/h | Dist: 12.3km | Fuel: 4.7L");
    }

    #[test]
    fn test_json_format() {
        let json = JsonFormatter::new().format_json(&reading()).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["speed_kmh"], 87.6);
        assert_eq!(value["tracking"], "Active");
        assert_eq!(value["permission"], "granted");
        assert!(value["error"].is_null());
    }

    #[test]
    fn test_csv_format() {
        let formatter = CsvFormatter::new();
        assert_eq!(formatter.header().split(',').count(), 6);
        assert_eq!(
            formatter.format_csv(&reading()),
            "87.60,12.3470,4.691,187.7,Active,Granted"
        );
    }
}
