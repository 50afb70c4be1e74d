//! In-memory log of finished rides

use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

/// One finished ride
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TripRecord {
    /// Sequential, unique within the log that issued it
    pub id: u64,
    /// Ride distance rounded to two decimals (km)
    pub distance_km: f64,
    /// Wall-clock end of the ride (milliseconds since epoch)
    pub recorded_at_ms: u64,
}

/// Most recent rides, newest first, bounded by capacity
#[derive(Debug, Clone)]
pub struct TripLog {
    capacity: usize,
    next_id: u64,
    trips: VecDeque<TripRecord>,
}

impl TripLog {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            next_id: 1,
            trips: VecDeque::with_capacity(capacity),
        }
    }

    /// Record a ride. Rides without distance are not logged.
    pub fn record(&mut self, distance_km: f64, recorded_at_ms: u64) -> Option<TripRecord> {
        if distance_km.is_nan() || distance_km <= 0.0 || self.capacity == 0 {
            return None;
        }

        let record = TripRecord {
            id: self.next_id,
            distance_km: (distance_km * 100.0).round() / 100.0,
            recorded_at_ms,
        };
        self.next_id += 1;
        self.trips.push_front(record.clone());
        self.trips.truncate(self.capacity);
        Some(record)
    }

    pub fn trips(&self) -> impl Iterator<Item = &TripRecord> {
        self.trips.iter()
    }

    pub fn latest(&self) -> Option<&TripRecord> {
        self.trips.front()
    }

    pub fn len(&self) -> usize {
        self.trips.len()
    }

    pub fn is_empty(&self) -> bool {
        self.trips.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}
