//! Validated problem instance.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::customer::{Customer, CustomerId, Depot};
use super::discharge::DischargeConfig;
use super::vehicle::Vehicle;

/// Input rejected when building a [`Problem`].
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ProblemError {
    #[error("customer at position {position} has id {found}, expected {expected}")]
    NonContiguousId {
        position: usize,
        expected: CustomerId,
        found: CustomerId,
    },
    #[error("location {id} has an invalid time window [{ready}, {due}]")]
    InvalidTimeWindow { id: CustomerId, ready: f64, due: f64 },
    #[error("location {0} has non-finite coordinates")]
    NonFiniteCoordinate(CustomerId),
    #[error("customer {id} has invalid demand {demand}")]
    InvalidDemand { id: CustomerId, demand: f64 },
    #[error("customer {id} has invalid service duration {duration}")]
    InvalidServiceDuration { id: CustomerId, duration: f64 },
    #[error("vehicle {index}: {reason}")]
    InvalidVehicle { index: usize, reason: &'static str },
    #[error("peak hours [{start}, {end}] are empty")]
    InvalidPeakHours { start: f64, end: f64 },
}

/// Advisory finding about a problem instance. Never blocks a solve.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Issue {
    /// The whole fleet cannot carry the total demand at once.
    DemandExceedsFleetCapacity { total_demand: f64, total_capacity: f64 },
    /// The window closes before a full service could fit in it.
    WindowShorterThanService {
        customer: CustomerId,
        span: f64,
        service: f64,
    },
    /// No single vehicle can ever carry this customer's demand.
    DemandExceedsEveryVehicle { customer: CustomerId, demand: f64 },
}

impl fmt::Display for Issue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Issue::DemandExceedsFleetCapacity {
                total_demand,
                total_capacity,
            } => write!(
                f,
                "total demand ({total_demand}) exceeds total vehicle capacity ({total_capacity})"
            ),
            Issue::WindowShorterThanService {
                customer,
                span,
                service,
            } => write!(
                f,
                "customer {customer} has a window of {span} but needs {service} of service"
            ),
            Issue::DemandExceedsEveryVehicle { customer, demand } => {
                write!(f, "customer {customer} demand ({demand}) exceeds every vehicle capacity")
            }
        }
    }
}

/// A routing problem: one depot, customers with ids `1..=N` in input order,
/// a fleet, and the discharge incentive settings.
///
/// # Examples
///
/// ```
/// use ev_routing::models::{Customer, Depot, Problem, Vehicle};
///
/// let problem = Problem::new(
///     Depot::new(0.0, 0.0),
///     vec![Customer::new(1, 3.0, 4.0, 10.0, 0.0)],
///     vec![Vehicle::new(50.0, 100.0, 0.1)],
/// )
/// .unwrap();
/// assert_eq!(problem.num_customers(), 1);
/// assert_eq!(problem.customer(1).map(|c| c.demand()), Some(10.0));
/// assert!(problem.customer(2).is_none());
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Problem {
    depot: Depot,
    customers: Vec<Customer>,
    vehicles: Vec<Vehicle>,
    #[serde(default)]
    discharge: DischargeConfig,
}

impl Problem {
    /// Validates and bundles the inputs. Discharge incentives start disabled.
    pub fn new(
        depot: Depot,
        customers: Vec<Customer>,
        vehicles: Vec<Vehicle>,
    ) -> Result<Self, ProblemError> {
        let problem = Self {
            depot,
            customers,
            vehicles,
            discharge: DischargeConfig::default(),
        };
        problem.validate()?;
        Ok(problem)
    }

    /// Replaces the discharge settings.
    pub fn with_discharge(mut self, discharge: DischargeConfig) -> Result<Self, ProblemError> {
        if discharge.enabled
            && !(discharge.peak_start.is_finite()
                && discharge.peak_end.is_finite()
                && discharge.peak_start < discharge.peak_end)
        {
            return Err(ProblemError::InvalidPeakHours {
                start: discharge.peak_start,
                end: discharge.peak_end,
            });
        }
        self.discharge = discharge;
        Ok(self)
    }

    /// Re-runs input validation, e.g. after deserializing.
    pub fn validate(&self) -> Result<(), ProblemError> {
        let (x, y) = self.depot.position();
        if !x.is_finite() || !y.is_finite() {
            return Err(ProblemError::NonFiniteCoordinate(0));
        }
        let tw = self.depot.time_window();
        if !tw.is_valid() {
            return Err(ProblemError::InvalidTimeWindow {
                id: 0,
                ready: tw.ready(),
                due: tw.due(),
            });
        }

        for (position, customer) in self.customers.iter().enumerate() {
            let id = customer.id();
            if id != position + 1 {
                return Err(ProblemError::NonContiguousId {
                    position,
                    expected: position + 1,
                    found: id,
                });
            }
            if !customer.x().is_finite() || !customer.y().is_finite() {
                return Err(ProblemError::NonFiniteCoordinate(id));
            }
            let demand = customer.demand();
            if !demand.is_finite() || demand < 0.0 {
                return Err(ProblemError::InvalidDemand { id, demand });
            }
            let duration = customer.service_duration();
            if !duration.is_finite() || duration < 0.0 {
                return Err(ProblemError::InvalidServiceDuration { id, duration });
            }
            let tw = customer.time_window();
            if !tw.is_valid() {
                return Err(ProblemError::InvalidTimeWindow {
                    id,
                    ready: tw.ready(),
                    due: tw.due(),
                });
            }
        }

        for (index, vehicle) in self.vehicles.iter().enumerate() {
            let reason = if !(vehicle.capacity().is_finite() && vehicle.capacity() > 0.0) {
                Some("capacity must be positive")
            } else if !(vehicle.battery_capacity().is_finite() && vehicle.battery_capacity() > 0.0)
            {
                Some("battery capacity must be positive")
            } else if !(vehicle.consumption_rate().is_finite() && vehicle.consumption_rate() >= 0.0)
            {
                Some("consumption rate must be non-negative")
            } else {
                None
            };
            if let Some(reason) = reason {
                return Err(ProblemError::InvalidVehicle { index, reason });
            }
        }
        Ok(())
    }

    /// The depot.
    pub fn depot(&self) -> &Depot {
        &self.depot
    }

    /// Customers in id order.
    pub fn customers(&self) -> &[Customer] {
        &self.customers
    }

    /// The fleet.
    pub fn vehicles(&self) -> &[Vehicle] {
        &self.vehicles
    }

    /// Discharge incentive settings.
    pub fn discharge(&self) -> &DischargeConfig {
        &self.discharge
    }

    /// Number of customers (excluding the depot).
    pub fn num_customers(&self) -> usize {
        self.customers.len()
    }

    /// Number of vehicles.
    pub fn num_vehicles(&self) -> usize {
        self.vehicles.len()
    }

    /// Looks up a customer by id.
    pub fn customer(&self, id: CustomerId) -> Option<&Customer> {
        id.checked_sub(1).and_then(|i| self.customers.get(i))
    }

    /// All customer ids, ascending.
    pub fn customer_ids(&self) -> impl Iterator<Item = CustomerId> {
        1..=self.customers.len()
    }

    /// Non-fatal findings about this instance.
    pub fn diagnose(&self) -> Vec<Issue> {
        let mut issues = Vec::new();

        let total_demand: f64 = self.customers.iter().map(Customer::demand).sum();
        let total_capacity: f64 = self.vehicles.iter().map(Vehicle::capacity).sum();
        if total_demand > total_capacity {
            issues.push(Issue::DemandExceedsFleetCapacity {
                total_demand,
                total_capacity,
            });
        }

        let max_capacity = self
            .vehicles
            .iter()
            .map(Vehicle::capacity)
            .fold(0.0_f64, f64::max);
        for customer in &self.customers {
            let span = customer.time_window().span();
            if span < customer.service_duration() {
                issues.push(Issue::WindowShorterThanService {
                    customer: customer.id(),
                    span,
                    service: customer.service_duration(),
                });
            }
            if customer.demand() > max_capacity {
                issues.push(Issue::DemandExceedsEveryVehicle {
                    customer: customer.id(),
                    demand: customer.demand(),
                });
            }
        }
        issues
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::TimeWindow;

    fn depot() -> Depot {
        Depot::new(0.0, 0.0)
    }

    #[test]
    fn test_rejects_non_contiguous_ids() {
        let err = Problem::new(
            depot(),
            vec![Customer::new(1, 0.0, 1.0, 1.0, 0.0), Customer::new(3, 0.0, 2.0, 1.0, 0.0)],
            vec![Vehicle::default()],
        )
        .unwrap_err();
        assert_eq!(
            err,
            ProblemError::NonContiguousId {
                position: 1,
                expected: 2,
                found: 3
            }
        );
    }

    #[test]
    fn test_rejects_negative_demand() {
        let err = Problem::new(
            depot(),
            vec![Customer::new(1, 0.0, 1.0, -1.0, 0.0)],
            vec![Vehicle::default()],
        )
        .unwrap_err();
        assert!(matches!(err, ProblemError::InvalidDemand { id: 1, .. }));
    }

    #[test]
    fn test_rejects_bad_vehicle() {
        let err = Problem::new(depot(), vec![], vec![Vehicle::new(0.0, 10.0, 0.1)]).unwrap_err();
        assert!(matches!(err, ProblemError::InvalidVehicle { index: 0, .. }));
    }

    #[test]
    fn test_accepts_degenerate_inputs() {
        let p = Problem::new(depot(), vec![], vec![]).expect("empty problem is valid");
        assert_eq!(p.num_customers(), 0);
        assert_eq!(p.num_vehicles(), 0);
        assert!(p.diagnose().is_empty());
    }

    #[test]
    fn test_rejects_empty_peak() {
        let p = Problem::new(depot(), vec![], vec![Vehicle::default()]).expect("valid");
        let err = p
            .with_discharge(DischargeConfig::peak_hours(20.0, 10.0))
            .unwrap_err();
        assert!(matches!(err, ProblemError::InvalidPeakHours { .. }));
    }

    #[test]
    fn test_diagnose() {
        let tight = TimeWindow::new(0.0, 5.0).expect("valid");
        let p = Problem::new(
            depot(),
            vec![
                Customer::new(1, 1.0, 0.0, 30.0, 10.0).with_time_window(tight),
                Customer::new(2, 2.0, 0.0, 60.0, 0.0),
            ],
            vec![Vehicle::new(50.0, 100.0, 0.1)],
        )
        .expect("valid");
        let issues = p.diagnose();
        assert_eq!(issues.len(), 3);
        assert!(issues.contains(&Issue::DemandExceedsFleetCapacity {
            total_demand: 90.0,
            total_capacity: 50.0
        }));
        assert!(issues.contains(&Issue::WindowShorterThanService {
            customer: 1,
            span: 5.0,
            service: 10.0
        }));
        assert!(issues.contains(&Issue::DemandExceedsEveryVehicle {
            customer: 2,
            demand: 60.0
        }));
        assert!(issues[0].to_string().contains("exceeds"));
    }
}
