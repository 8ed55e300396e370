//! Point-in-time shop statistics.

use serde::{Deserialize, Serialize};

/// Snapshot of shop occupancy and cumulative counters.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShopStats {
    /// Waiting-room seats.
    pub capacity: usize,
    /// Number of stations.
    pub station_count: usize,
    /// Customers currently seated in the waiting room.
    pub waiting: usize,
    /// Stations currently bound to a customer.
    pub busy_stations: usize,
    /// Total `arrive` calls accepted for processing.
    pub arrivals: u64,
    /// Customers ever bound to a station.
    pub assigned: u64,
    /// Customers that paid and left.
    pub served: u64,
    /// Customers turned away because stations and seats were full.
    pub drops: u64,
    /// Queued customers sent home when the shop closed.
    pub abandoned: u64,
}

impl ShopStats {
    /// Whether every arrival is accounted for exactly once.
    #[must_use]
    pub const fn is_balanced(&self) -> bool {
        self.arrivals == self.assigned + self.drops + self.waiting as u64 + self.abandoned
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_balanced() {
        assert!(ShopStats::default().is_balanced());
    }

    #[test]
    fn test_unbalanced_detected() {
        let stats = ShopStats {
            arrivals: 3,
            assigned: 1,
            drops: 1,
            ..ShopStats::default()
        };
        assert!(!stats.is_balanced());
    }
}
