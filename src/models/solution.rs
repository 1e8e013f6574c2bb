//! Solve output handed to report writers and dashboards.

use serde::{Deserialize, Serialize};

use super::customer::CustomerId;

/// Why the generational loop stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Termination {
    /// The configured generation count was reached.
    GenerationLimit,
    /// The best fitness stalled for the configured number of generations.
    NoImprovement,
    /// The caller's time limit expired.
    TimeLimit,
    /// The caller's cancellation token was set.
    Cancelled,
    /// Nothing to optimize: no customers or no vehicles.
    Trivial,
    /// The solve failed internally and the round-robin fallback was returned.
    EmergencyFallback,
}

/// Per-vehicle summary of a route.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RouteReport {
    /// Index of the vehicle in the input fleet.
    pub vehicle: usize,
    /// Node sequence, `0` (depot) first and last.
    pub nodes: Vec<CustomerId>,
    /// Round-trip distance.
    pub distance: f64,
    /// Distance minus discharge benefit.
    pub cost: f64,
    /// Number of customers on the route.
    pub customers_served: usize,
    /// Total demand carried.
    pub load: f64,
    /// Energy spent driving the route.
    pub energy_consumed: f64,
    /// Peak-hour discharge benefit earned.
    pub discharge_benefit: f64,
    /// Whether the route satisfies capacity, time windows, and battery limits.
    pub feasible: bool,
}

/// Result of a solve.
///
/// `success` is `true` exactly when `unserved_customers` is empty. Partial
/// service is a normal outcome, so callers must check both. A `degraded`
/// result comes from the emergency fallback and was never checked for
/// feasibility.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SolveResult {
    /// One report per vehicle with a non-empty route, by vehicle index.
    pub routes: Vec<RouteReport>,
    /// Sum of route costs.
    pub total_cost: f64,
    /// Sum of route distances.
    pub total_distance: f64,
    /// Vehicles with a non-empty route.
    pub vehicles_used: usize,
    /// Customers on some route.
    pub customers_served: usize,
    /// Customers on no route, ascending.
    pub unserved_customers: Vec<CustomerId>,
    /// `unserved_customers.is_empty()`.
    pub success: bool,
    /// Penalized fitness of the returned assignment.
    pub fitness: f64,
    /// Generations evaluated.
    pub generations: usize,
    /// Why the search stopped.
    pub termination: Termination,
    /// Set when the emergency fallback produced this result.
    pub degraded: bool,
}

impl SolveResult {
    /// Number of routes that violate a constraint.
    pub fn infeasible_routes(&self) -> usize {
        self.routes.iter().filter(|r| !r.feasible).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_infeasible_routes() {
        let report = |feasible| RouteReport {
            vehicle: 0,
            nodes: vec![0, 1, 0],
            distance: 2.0,
            cost: 2.0,
            customers_served: 1,
            load: 1.0,
            energy_consumed: 0.2,
            discharge_benefit: 0.0,
            feasible,
        };
        let result = SolveResult {
            routes: vec![report(true), report(false)],
            total_cost: 4.0,
            total_distance: 4.0,
            vehicles_used: 2,
            customers_served: 2,
            unserved_customers: vec![],
            success: true,
            fitness: 1005.0,
            generations: 1,
            termination: Termination::GenerationLimit,
            degraded: false,
        };
        assert_eq!(result.infeasible_routes(), 1);
    }
}
