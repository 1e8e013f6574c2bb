//! Route replay: feasibility, distance, and discharge-aware cost.

use thiserror::Error;

use crate::distance::DistanceMatrix;
use crate::models::{Customer, CustomerId, Problem, Route, RouteReport, Vehicle, Visit, DEPOT_ID};

use super::fitness::EvaluationError;

/// The first constraint a route breaks during replay.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum Violation {
    #[error("battery exhausted before customer {customer}: needs {required}, has {remaining}")]
    BatteryExhausted {
        customer: CustomerId,
        required: f64,
        remaining: f64,
    },
    #[error("customer {customer} reached at {arrival}, after due time {due}")]
    TimeWindowMissed {
        customer: CustomerId,
        arrival: f64,
        due: f64,
    },
    #[error("load {load} exceeds capacity {capacity} at customer {customer}")]
    CapacityExceeded {
        customer: CustomerId,
        load: f64,
        capacity: f64,
    },
    #[error("battery cannot cover the return leg: needs {required}, has {remaining}")]
    ReturnLegBattery { required: f64, remaining: f64 },
    #[error("customer {0} does not exist")]
    UnknownCustomer(CustomerId),
}

/// A successful replay of a feasible route.
#[derive(Debug, Clone, PartialEq)]
pub struct RouteTrace {
    /// Per-stop timing and state.
    pub visits: Vec<Visit>,
    /// Round-trip distance.
    pub distance: f64,
    /// Energy used for the round trip.
    pub energy: f64,
    /// Total load carried.
    pub load: f64,
    /// Battery left after returning to the depot.
    pub battery_left: f64,
    /// Time the vehicle is back at the depot.
    pub return_time: f64,
}

/// Replays routes against the problem data.
///
/// Every call builds its load, battery, and clock from scratch as locals, so
/// the same evaluator can be shared across threads and repeated checks on
/// the same route always agree.
///
/// # Examples
///
/// ```
/// use ev_routing::models::{Customer, Depot, Problem, Vehicle};
/// use ev_routing::distance::DistanceMatrix;
/// use ev_routing::evaluation::RouteEvaluator;
///
/// let problem = Problem::new(
///     Depot::new(0.0, 0.0),
///     vec![Customer::new(1, 3.0, 4.0, 10.0, 5.0), Customer::new(2, 6.0, 8.0, 20.0, 5.0)],
///     vec![Vehicle::new(100.0, 100.0, 0.1)],
/// )
/// .unwrap();
/// let dm = DistanceMatrix::from_problem(&problem);
/// let evaluator = RouteEvaluator::new(&problem, &dm);
///
/// let vehicle = &problem.vehicles()[0];
/// assert!(evaluator.is_feasible(&[1, 2], vehicle));
/// assert!((evaluator.route_cost(&[1, 2]) - 20.0).abs() < 1e-10);
/// ```
#[derive(Debug, Clone, Copy)]
pub struct RouteEvaluator<'a> {
    problem: &'a Problem,
    distances: &'a DistanceMatrix,
}

impl<'a> RouteEvaluator<'a> {
    /// Creates an evaluator over a problem and its distance matrix.
    pub fn new(problem: &'a Problem, distances: &'a DistanceMatrix) -> Self {
        Self { problem, distances }
    }

    /// The problem being evaluated.
    pub fn problem(&self) -> &'a Problem {
        self.problem
    }

    /// The distance matrix in use.
    pub fn distances(&self) -> &'a DistanceMatrix {
        self.distances
    }

    /// Looks up a customer; the depot and ids past the last customer are unknown.
    fn customer(&self, id: CustomerId) -> Result<&'a Customer, Violation> {
        self.problem.customer(id).ok_or(Violation::UnknownCustomer(id))
    }

    /// Replays `route` on `vehicle`, stopping at the first violation.
    ///
    /// Travel time equals distance (unit speed). The clock starts at the
    /// depot's ready time; early arrivals wait for the window to open. An id
    /// that names no customer fails with [`Violation::UnknownCustomer`].
    pub fn simulate(&self, route: &[CustomerId], vehicle: &Vehicle) -> Result<RouteTrace, Violation> {
        let mut visits = Vec::with_capacity(route.len());
        let mut battery = vehicle.battery_capacity();
        let mut time = self.problem.depot().time_window().ready();
        let mut load = 0.0;
        let mut distance = 0.0;
        let mut prev = DEPOT_ID;

        for &cid in route {
            let customer = self.customer(cid)?;
            let leg = self.distances.get(prev, cid);
            distance += leg;

            let required = vehicle.energy_for(leg);
            if battery - required < 0.0 {
                return Err(Violation::BatteryExhausted {
                    customer: cid,
                    required,
                    remaining: battery,
                });
            }
            battery -= required;

            let arrival = time + leg;
            let tw = customer.time_window();
            if tw.is_violated(arrival) {
                return Err(Violation::TimeWindowMissed {
                    customer: cid,
                    arrival,
                    due: tw.due(),
                });
            }
            let service_start = arrival + tw.waiting_time(arrival);
            time = service_start + customer.service_duration();

            load += customer.demand();
            if load > vehicle.capacity() {
                return Err(Violation::CapacityExceeded {
                    customer: cid,
                    load,
                    capacity: vehicle.capacity(),
                });
            }

            visits.push(Visit {
                customer_id: cid,
                arrival_time: arrival,
                service_start,
                departure_time: time,
                load_after: load,
                battery_after: battery,
            });
            prev = cid;
        }

        let back = self.distances.get(prev, DEPOT_ID);
        let required = vehicle.energy_for(back);
        if battery - required < 0.0 {
            return Err(Violation::ReturnLegBattery {
                required,
                remaining: battery,
            });
        }
        battery -= required;
        distance += back;

        Ok(RouteTrace {
            visits,
            distance,
            energy: vehicle.battery_capacity() - battery,
            load,
            battery_left: battery,
            return_time: time + back,
        })
    }

    /// Returns `true` if `route` satisfies capacity, time windows, and
    /// battery limits, including the return leg. Empty routes are feasible.
    pub fn is_feasible(&self, route: &[CustomerId], vehicle: &Vehicle) -> bool {
        self.simulate(route, vehicle).is_ok()
    }

    /// Round-trip distance: depot, customers in order, depot.
    ///
    /// # Panics
    ///
    /// Panics if an id is beyond the distance matrix.
    pub fn route_distance(&self, route: &[CustomerId]) -> f64 {
        if route.is_empty() {
            return 0.0;
        }
        let mut distance = 0.0;
        let mut prev = DEPOT_ID;
        for &cid in route {
            distance += self.distances.get(prev, cid);
            prev = cid;
        }
        distance + self.distances.get(prev, DEPOT_ID)
    }

    /// Benefit earned by serving customers during peak hours.
    ///
    /// Timing is replayed exactly as in [`simulate`](Self::simulate) but
    /// without stopping at violations. Zero when discharge is disabled.
    /// Replay ends at the first unknown id.
    pub fn discharge_benefit(&self, route: &[CustomerId]) -> f64 {
        let discharge = self.problem.discharge();
        if !discharge.enabled {
            return 0.0;
        }
        let mut time = self.problem.depot().time_window().ready();
        let mut prev = DEPOT_ID;
        let mut overlap = 0.0;
        for &cid in route {
            let Ok(customer) = self.customer(cid) else {
                break;
            };
            let arrival = time + self.distances.get(prev, cid);
            let service_start = arrival + customer.time_window().waiting_time(arrival);
            time = service_start + customer.service_duration();
            overlap += discharge.overlap(service_start, time);
            prev = cid;
        }
        overlap * discharge.benefit_rate
    }

    /// Route cost: round-trip distance minus discharge benefit. May be negative.
    ///
    /// # Panics
    ///
    /// Panics if an id is beyond the distance matrix.
    pub fn route_cost(&self, route: &[CustomerId]) -> f64 {
        self.route_distance(route) - self.discharge_benefit(route)
    }

    /// Summarizes a route for output.
    pub fn report(&self, route: &Route) -> Result<RouteReport, EvaluationError> {
        let vehicle = self
            .problem
            .vehicles()
            .get(route.vehicle())
            .ok_or(EvaluationError::UnknownVehicle(route.vehicle()))?;
        let customers = route.customers();
        let distance = self.route_distance(customers);
        let discharge_benefit = self.discharge_benefit(customers);
        Ok(RouteReport {
            vehicle: route.vehicle(),
            nodes: route.nodes(),
            distance,
            cost: distance - discharge_benefit,
            customers_served: customers.len(),
            load: customers
                .iter()
                .filter_map(|&c| self.problem.customer(c))
                .map(Customer::demand)
                .sum(),
            energy_consumed: vehicle.energy_for(distance),
            discharge_benefit,
            feasible: self.is_feasible(customers, vehicle),
        })
    }
}
