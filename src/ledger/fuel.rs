//! Fuel ledger: fuel added versus fuel burned over the trip distance

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum FuelError {
    #[error("fuel amount must be a positive number of litres, got {litres}")]
    InvalidAmount { litres: f64 },
}

/// Running total of fuel put in the tank
#[derive(Debug, Clone, PartialEq)]
pub struct FuelLedger {
    total_fuel_l: f64,
    average_km_per_litre: f64,
}

impl FuelLedger {
    pub fn new(average_km_per_litre: f64) -> Self {
        Self {
            total_fuel_l: 0.0,
            average_km_per_litre,
        }
    }

    /// Add fuel to the ledger, returning the new total
    pub fn add_fuel(&mut self, litres: f64) -> Result<f64, FuelError> {
        if !litres.is_finite() || litres <= 0.0 {
            return Err(FuelError::InvalidAmount { litres });
        }
        self.total_fuel_l += litres;
        Ok(self.total_fuel_l)
    }

    pub fn total_fuel_l(&self) -> f64 {
        self.total_fuel_l
    }

    pub fn average_km_per_litre(&self) -> f64 {
        self.average_km_per_litre
    }

    pub fn consumed_l(&self, distance_km: f64) -> f64 {
        distance_km / self.average_km_per_litre
    }

    /// Fuel left after `distance_km`; negative when more was burned than logged
    pub fn remaining_l(&self, distance_km: f64) -> f64 {
        self.total_fuel_l - self.consumed_l(distance_km)
    }

    /// Distance still reachable on the remaining fuel, never negative
    pub fn estimated_range_km(&self, distance_km: f64) -> f64 {
        let remaining = self.remaining_l(distance_km);
        if remaining > 0.0 {
            remaining * self.average_km_per_litre
        } else {
            0.0
        }
    }
}
