//! Greedy nearest-feasible-neighbor construction.
//!
//! # Algorithm
//!
//! Vehicles are filled one after another. Each vehicle's route is extended
//! with the nearest unassigned customer whose tentative route stays feasible
//! (capacity, time windows, battery including the return leg). When no such
//! customer exists the next vehicle starts. Candidates are scanned in the
//! caller's visitation order, which breaks distance ties and, optionally,
//! picks each route's opening customer.
//!
//! # Complexity
//!
//! O(n² · L) where n = number of customers and L = route length replayed per
//! feasibility check. Every unassigned customer is checked at each step;
//! the nearest of the feasible ones is then picked from the distance matrix.

use tracing::debug;

use crate::evaluation::RouteEvaluator;
use crate::models::{Assignment, CustomerId, Route, DEPOT_ID};

use super::repair::repair;

/// How each route picks its first stop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteOpening {
    /// The feasible customer nearest to the depot.
    Nearest,
    /// The first feasible customer in the visitation order.
    VisitOrder,
}

/// Builds routes greedily without placing leftovers.
///
/// Customers not reachable by any vehicle are simply absent from the result.
/// `order` must list each customer id at most once.
///
/// # Examples
///
/// ```
/// use ev_routing::models::{Customer, Depot, Problem, Vehicle};
/// use ev_routing::distance::DistanceMatrix;
/// use ev_routing::evaluation::RouteEvaluator;
/// use ev_routing::constructive::{nearest_feasible, RouteOpening};
///
/// let problem = Problem::new(
///     Depot::new(0.0, 0.0),
///     vec![
///         Customer::new(1, 1.0, 0.0, 10.0, 0.0),
///         Customer::new(2, 2.0, 0.0, 10.0, 0.0),
///         Customer::new(3, 3.0, 0.0, 10.0, 0.0),
///     ],
///     vec![Vehicle::new(30.0, 100.0, 0.1)],
/// )
/// .unwrap();
/// let dm = DistanceMatrix::from_problem(&problem);
/// let evaluator = RouteEvaluator::new(&problem, &dm);
///
/// let assignment = nearest_feasible(&evaluator, &[3, 2, 1], RouteOpening::Nearest);
/// assert_eq!(assignment.routes()[0].customers(), &[1, 2, 3]);
/// ```
pub fn nearest_feasible(
    evaluator: &RouteEvaluator<'_>,
    order: &[CustomerId],
    opening: RouteOpening,
) -> Assignment {
    let problem = evaluator.problem();
    let distances = evaluator.distances();
    let mut assigned = vec![false; problem.num_customers() + 1];
    let mut remaining = order.len();
    let mut routes = Vec::new();

    for (vehicle_idx, vehicle) in problem.vehicles().iter().enumerate() {
        if remaining == 0 {
            break;
        }

        let mut route: Vec<CustomerId> = Vec::new();
        loop {
            let current = route.last().copied().unwrap_or(DEPOT_ID);
            let mut fits = |c: CustomerId| {
                route.push(c);
                let feasible = evaluator.is_feasible(&route, vehicle);
                route.pop();
                feasible
            };

            let next = if current == DEPOT_ID && opening == RouteOpening::VisitOrder {
                order.iter().copied().find(|&c| !assigned[c] && fits(c))
            } else {
                let candidates: Vec<CustomerId> = order
                    .iter()
                    .copied()
                    .filter(|&c| !assigned[c] && fits(c))
                    .collect();
                distances.nearest_neighbor(current, &candidates)
            };

            match next {
                Some(next) => {
                    assigned[next] = true;
                    remaining -= 1;
                    route.push(next);
                }
                None => break,
            }
        }

        if !route.is_empty() {
            debug!(vehicle = vehicle_idx, stops = route.len(), "route built");
            routes.push(Route::new(vehicle_idx, route));
        }
    }

    Assignment::from_routes(routes)
}

/// Builds a complete initial assignment: greedy construction followed by the
/// repair pass for every customer the greedy phase could not place.
///
/// # Examples
///
/// ```
/// use ev_routing::models::{Customer, Depot, Problem, Vehicle};
/// use ev_routing::distance::DistanceMatrix;
/// use ev_routing::evaluation::RouteEvaluator;
/// use ev_routing::constructive::{construct, RouteOpening};
///
/// let problem = Problem::new(
///     Depot::new(0.0, 0.0),
///     vec![Customer::new(1, 1.0, 0.0, 10.0, 0.0), Customer::new(2, -1.0, 0.0, 10.0, 0.0)],
///     vec![Vehicle::new(10.0, 100.0, 0.1), Vehicle::new(10.0, 100.0, 0.1)],
/// )
/// .unwrap();
/// let dm = DistanceMatrix::from_problem(&problem);
/// let evaluator = RouteEvaluator::new(&problem, &dm);
///
/// let assignment = construct(&evaluator, &[1, 2], RouteOpening::Nearest);
/// assert_eq!(assignment.num_served(), 2);
/// assert_eq!(assignment.vehicles_used(), 2);
/// ```
pub fn construct(
    evaluator: &RouteEvaluator<'_>,
    order: &[CustomerId],
    opening: RouteOpening,
) -> Assignment {
    let mut assignment = nearest_feasible(evaluator, order, opening);
    let stragglers: Vec<CustomerId> = order
        .iter()
        .copied()
        .filter(|&c| !assignment.contains(c))
        .collect();
    if !stragglers.is_empty() {
        repair(evaluator, &mut assignment, &stragglers);
    }
    assignment
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::distance::DistanceMatrix;
    use crate::models::{Customer, Depot, Problem, TimeWindow, Vehicle};

    fn eval_fixture(customers: Vec<Customer>, vehicles: Vec<Vehicle>) -> (Problem, DistanceMatrix) {
        let p = Problem::new(Depot::new(0.0, 0.0), customers, vehicles).expect("valid");
        let dm = DistanceMatrix::from_problem(&p);
        (p, dm)
    }

    #[test]
    fn test_single_vehicle_takes_all() {
        let (p, dm) = eval_fixture(
            vec![
                Customer::new(1, 1.0, 0.0, 10.0, 2.0),
                Customer::new(2, 2.0, 0.0, 10.0, 2.0),
                Customer::new(3, 3.0, 0.0, 10.0, 2.0),
            ],
            vec![Vehicle::new(100.0, 100.0, 0.1)],
        );
        let eval = RouteEvaluator::new(&p, &dm);
        let a = nearest_feasible(&eval, &[1, 2, 3], RouteOpening::Nearest);
        assert_eq!(a.routes().len(), 1);
        assert_eq!(a.routes()[0].customers(), &[1, 2, 3]);
    }

    #[test]
    fn test_tight_windows_force_split() {
        // after serving 1 (depart 6), reaching 2 at 8 misses due 2
        let tw = TimeWindow::new(0.0, 2.0).expect("valid");
        let (p, dm) = eval_fixture(
            vec![
                Customer::new(1, 1.0, 0.0, 10.0, 5.0).with_time_window(tw),
                Customer::new(2, -1.0, 0.0, 10.0, 5.0).with_time_window(tw),
            ],
            vec![Vehicle::new(100.0, 100.0, 0.1), Vehicle::new(100.0, 100.0, 0.1)],
        );
        let eval = RouteEvaluator::new(&p, &dm);
        let a = nearest_feasible(&eval, &[1, 2], RouteOpening::Nearest);
        assert_eq!(a.routes().len(), 2);
        assert_eq!(a.num_served(), 2);
    }

    #[test]
    fn test_skips_nearest_infeasible() {
        let (p, dm) = eval_fixture(
            vec![
                Customer::new(1, 5.0, 0.0, 10.0, 0.0),
                Customer::new(2, 1.0, 0.0, 10.0, 0.0)
                    .with_time_window(TimeWindow::new(0.0, 0.5).expect("valid")),
            ],
            vec![Vehicle::new(100.0, 100.0, 0.1)],
        );
        let eval = RouteEvaluator::new(&p, &dm);
        let a = nearest_feasible(&eval, &[1, 2], RouteOpening::Nearest);
        assert_eq!(a.routes()[0].customers(), &[1]);
        assert!(!a.contains(2));
    }

    #[test]
    fn test_battery_limits_route_length() {
        // each out-and-back to x = ±10 costs 2 energy; battery 3 fits one
        let (p, dm) = eval_fixture(
            vec![
                Customer::new(1, 10.0, 0.0, 1.0, 0.0),
                Customer::new(2, -10.0, 0.0, 1.0, 0.0),
            ],
            vec![Vehicle::new(100.0, 3.0, 0.1), Vehicle::new(100.0, 3.0, 0.1)],
        );
        let eval = RouteEvaluator::new(&p, &dm);
        let a = nearest_feasible(&eval, &[1, 2], RouteOpening::Nearest);
        assert_eq!(a.routes().len(), 2);
        assert!(a.routes().iter().all(|r| r.len() == 1));
    }

    #[test]
    fn test_visit_order_opening() {
        let (p, dm) = eval_fixture(
            vec![
                Customer::new(1, 1.0, 0.0, 10.0, 0.0),
                Customer::new(2, 2.0, 0.0, 10.0, 0.0),
                Customer::new(3, 3.0, 0.0, 10.0, 0.0),
            ],
            vec![Vehicle::new(100.0, 100.0, 0.1)],
        );
        let eval = RouteEvaluator::new(&p, &dm);
        let a = nearest_feasible(&eval, &[3, 1, 2], RouteOpening::VisitOrder);
        assert_eq!(a.routes()[0].customers(), &[3, 2, 1]);
    }

    #[test]
    fn test_no_vehicles() {
        let (p, dm) = eval_fixture(vec![Customer::new(1, 1.0, 0.0, 1.0, 0.0)], vec![]);
        let eval = RouteEvaluator::new(&p, &dm);
        let a = construct(&eval, &[1], RouteOpening::Nearest);
        assert!(a.routes().is_empty());
        assert_eq!(a.unserved(1), vec![1]);
    }
}
