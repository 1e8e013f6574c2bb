//! Electric vehicle parameters.

use serde::{Deserialize, Serialize};

/// An electric vehicle template.
///
/// Holds only the immutable parameters. Load, battery level, and elapsed
/// time during a route are derived per feasibility check and never stored
/// here, so one template can be shared by any number of concurrent checks.
///
/// # Examples
///
/// ```
/// use ev_routing::models::Vehicle;
///
/// let v = Vehicle::new(100.0, 100.0, 0.2);
/// assert_eq!(v.capacity(), 100.0);
/// assert!((v.energy_for(50.0) - 10.0).abs() < 1e-10);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Vehicle {
    capacity: f64,
    battery_capacity: f64,
    consumption_rate: f64,
}

impl Vehicle {
    /// Creates a vehicle from its load capacity, battery capacity, and
    /// energy consumed per unit of distance.
    pub fn new(capacity: f64, battery_capacity: f64, consumption_rate: f64) -> Self {
        Self {
            capacity,
            battery_capacity,
            consumption_rate,
        }
    }

    /// Maximum load (mass units).
    pub fn capacity(&self) -> f64 {
        self.capacity
    }

    /// Battery size (energy units). Vehicles leave the depot fully charged.
    pub fn battery_capacity(&self) -> f64 {
        self.battery_capacity
    }

    /// Energy consumed per unit of distance.
    pub fn consumption_rate(&self) -> f64 {
        self.consumption_rate
    }

    /// Energy needed to drive `distance`.
    pub fn energy_for(&self, distance: f64) -> f64 {
        distance * self.consumption_rate
    }
}

impl Default for Vehicle {
    /// The fleet defaults of the reference data set: 100 kg, 100 kWh, 0.2 kWh per unit.
    fn default() -> Self {
        Self::new(100.0, 100.0, 0.2)
    }
}
