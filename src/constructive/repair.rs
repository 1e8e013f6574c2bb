//! Repair pass for customers the greedy construction left behind.

use tracing::{debug, warn};

use crate::evaluation::RouteEvaluator;
use crate::models::{Assignment, CustomerId, Route};

/// What happened to one straggler.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Placement {
    /// Inserted at its cheapest feasible position in an existing route.
    Inserted { vehicle: usize, position: usize },
    /// Given a new single-customer route on an idle vehicle.
    Opened { vehicle: usize },
    /// Appended to the first route without a feasibility check and tagged.
    Forced { vehicle: usize },
    /// No placement possible; stays unserved.
    Unplaced,
}

/// Finds the feasible insertion with the smallest cost increase across every
/// route and every position. Returns `(route_index, new_route, increase)`.
pub fn best_insertion(
    evaluator: &RouteEvaluator<'_>,
    assignment: &Assignment,
    customer: CustomerId,
) -> Option<(usize, Route, f64)> {
    let vehicles = evaluator.problem().vehicles();
    let mut best: Option<(usize, Route, f64)> = None;

    for (ri, route) in assignment.routes().iter().enumerate() {
        let Some(vehicle) = vehicles.get(route.vehicle()) else {
            continue;
        };
        let base = evaluator.route_cost(route.customers());
        for pos in 0..=route.len() {
            let candidate = route.with_inserted(pos, customer);
            if !evaluator.is_feasible(candidate.customers(), vehicle) {
                continue;
            }
            let increase = evaluator.route_cost(candidate.customers()) - base;
            if best.as_ref().is_none_or(|b| increase < b.2) {
                best = Some((ri, candidate, increase));
            }
        }
    }
    best
}

/// Places one straggler, falling through the ladder: cheapest feasible
/// insertion, a new route on an idle vehicle that can serve it alone, and,
/// once every vehicle is in use, a forced append to the first route.
pub fn place(
    evaluator: &RouteEvaluator<'_>,
    assignment: &mut Assignment,
    customer: CustomerId,
) -> Placement {
    if let Some((ri, route, _)) = best_insertion(evaluator, assignment, customer) {
        let position = route
            .customers()
            .iter()
            .position(|&c| c == customer)
            .unwrap_or_default();
        let vehicle = route.vehicle();
        assignment.routes_mut()[ri] = route;
        return Placement::Inserted { vehicle, position };
    }

    let vehicles = evaluator.problem().vehicles();
    let idle = assignment.idle_vehicles(vehicles.len());
    if !idle.is_empty() {
        let opened = idle
            .into_iter()
            .find(|&v| evaluator.is_feasible(&[customer], &vehicles[v]));
        return match opened {
            Some(vehicle) => {
                assignment.routes_mut().retain(|r| r.vehicle() != vehicle);
                assignment.routes_mut().push(Route::new(vehicle, vec![customer]));
                Placement::Opened { vehicle }
            }
            None => Placement::Unplaced,
        };
    }

    match assignment.routes_mut().first_mut() {
        Some(first) => {
            first.customers_mut().push(customer);
            let vehicle = first.vehicle();
            assignment.mark_forced(customer);
            Placement::Forced { vehicle }
        }
        None => Placement::Unplaced,
    }
}

/// Runs [`place`] for every straggler in order and returns the outcomes.
pub fn repair(
    evaluator: &RouteEvaluator<'_>,
    assignment: &mut Assignment,
    stragglers: &[CustomerId],
) -> Vec<Placement> {
    let placements: Vec<Placement> = stragglers
        .iter()
        .map(|&customer| {
            let placement = place(evaluator, assignment, customer);
            match placement {
                Placement::Forced { vehicle } => {
                    warn!(customer, vehicle, "no feasible slot left, forcing customer onto first route");
                }
                Placement::Unplaced => debug!(customer, "customer left unserved by repair"),
                _ => debug!(customer, ?placement, "customer repaired"),
            }
            placement
        })
        .collect();
    assignment.normalize();
    placements
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::distance::DistanceMatrix;
    use crate::models::{Customer, Depot, Problem, Vehicle};

    fn fixture(customers: Vec<Customer>, vehicles: Vec<Vehicle>) -> (Problem, DistanceMatrix) {
        let p = Problem::new(Depot::new(0.0, 0.0), customers, vehicles).expect("valid");
        let dm = DistanceMatrix::from_problem(&p);
        (p, dm)
    }

    #[test]
    fn test_cheapest_insertion_position() {
        let (p, dm) = fixture(
            vec![
                Customer::new(1, 1.0, 0.0, 1.0, 0.0),
                Customer::new(2, 3.0, 0.0, 1.0, 0.0),
                Customer::new(3, 2.0, 0.0, 1.0, 0.0),
            ],
            vec![Vehicle::new(10.0, 100.0, 0.1)],
        );
        let eval = RouteEvaluator::new(&p, &dm);
        let mut a = Assignment::from_routes(vec![Route::new(0, vec![1, 2])]);
        let placement = place(&eval, &mut a, 3);
        assert_eq!(placement, Placement::Inserted { vehicle: 0, position: 1 });
        assert_eq!(a.routes()[0].customers(), &[1, 3, 2]);
    }

    #[test]
    fn test_opens_route_on_idle_vehicle() {
        let (p, dm) = fixture(
            vec![Customer::new(1, 1.0, 0.0, 8.0, 0.0), Customer::new(2, -1.0, 0.0, 8.0, 0.0)],
            vec![Vehicle::new(10.0, 100.0, 0.1), Vehicle::new(10.0, 100.0, 0.1)],
        );
        let eval = RouteEvaluator::new(&p, &dm);
        let mut a = Assignment::from_routes(vec![Route::new(0, vec![1])]);
        assert_eq!(place(&eval, &mut a, 2), Placement::Opened { vehicle: 1 });
        assert_eq!(a.route_for_vehicle(1).map(|r| r.customers().to_vec()), Some(vec![2]));
    }

    #[test]
    fn test_forces_when_fleet_exhausted() {
        let (p, dm) = fixture(
            vec![Customer::new(1, 1.0, 0.0, 8.0, 0.0), Customer::new(2, -1.0, 0.0, 8.0, 0.0)],
            vec![Vehicle::new(10.0, 100.0, 0.1)],
        );
        let eval = RouteEvaluator::new(&p, &dm);
        let mut a = Assignment::from_routes(vec![Route::new(0, vec![1])]);
        let placements = repair(&eval, &mut a, &[2]);
        assert_eq!(placements, vec![Placement::Forced { vehicle: 0 }]);
        assert_eq!(a.routes()[0].customers(), &[1, 2]);
        assert_eq!(a.forced(), &[2]);
        let fitness = eval.fitness(&a).expect("scorable");
        assert_eq!(fitness.infeasible_routes, 1);
    }

    #[test]
    fn test_unplaceable_on_idle_vehicle_stays_unserved() {
        let (p, dm) = fixture(
            vec![Customer::new(1, 1.0, 0.0, 10.0, 0.0)],
            vec![Vehicle::new(5.0, 100.0, 0.1)],
        );
        let eval = RouteEvaluator::new(&p, &dm);
        let mut a = Assignment::empty();
        assert_eq!(repair(&eval, &mut a, &[1]), vec![Placement::Unplaced]);
        assert!(a.routes().is_empty());
        assert!(a.forced().is_empty());
    }
}
