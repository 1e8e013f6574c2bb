//! Penalty-augmented fitness of a whole assignment.

use thiserror::Error;

use crate::models::{Assignment, Route};

use super::evaluator::RouteEvaluator;

/// Flat penalty for each infeasible route, on top of its carried demand.
pub const INFEASIBLE_ROUTE_PENALTY: f64 = 1000.0;

/// Penalty for each customer left off every route.
pub const UNSERVED_PENALTY: f64 = 2000.0;

/// An assignment that cannot be scored against its problem.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EvaluationError {
    #[error("route assigned to vehicle {0}, which does not exist")]
    UnknownVehicle(usize),
}

/// Fitness of an assignment, lower is better.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Fitness {
    /// `cost + route_penalty + unserved_penalty`.
    pub value: f64,
    /// Summed cost of the feasible routes.
    pub cost: f64,
    /// Summed penalties of the infeasible routes.
    pub route_penalty: f64,
    /// Penalty for unserved customers.
    pub unserved_penalty: f64,
    /// Routes that broke a constraint or carry a forced placement.
    pub infeasible_routes: usize,
    /// Customers on no route.
    pub unserved: usize,
}

impl Fitness {
    /// Returns `true` if every route is feasible and every customer served.
    pub fn is_clean(&self) -> bool {
        self.infeasible_routes == 0 && self.unserved == 0
    }
}

impl RouteEvaluator<'_> {
    /// Scores an assignment.
    ///
    /// A feasible route contributes its cost. An infeasible route, or one
    /// carrying a forced placement, contributes
    /// [`INFEASIBLE_ROUTE_PENALTY`] plus its total demand. Every unserved
    /// customer adds [`UNSERVED_PENALTY`].
    ///
    /// # Examples
    ///
    /// ```
    /// use ev_routing::models::{Assignment, Customer, Depot, Problem, Route, Vehicle};
    /// use ev_routing::distance::DistanceMatrix;
    /// use ev_routing::evaluation::RouteEvaluator;
    ///
    /// let problem = Problem::new(
    ///     Depot::new(0.0, 0.0),
    ///     vec![Customer::new(1, 3.0, 4.0, 10.0, 0.0), Customer::new(2, -3.0, -4.0, 10.0, 0.0)],
    ///     vec![Vehicle::new(50.0, 100.0, 0.1)],
    /// )
    /// .unwrap();
    /// let dm = DistanceMatrix::from_problem(&problem);
    /// let evaluator = RouteEvaluator::new(&problem, &dm);
    ///
    /// let partial = Assignment::new(vec![Route::new(0, vec![1])], 2, 1).unwrap();
    /// let fitness = evaluator.fitness(&partial).unwrap();
    /// assert!((fitness.value - (10.0 + 2000.0)).abs() < 1e-10);
    /// ```
    pub fn fitness(&self, assignment: &Assignment) -> Result<Fitness, EvaluationError> {
        let vehicles = self.problem().vehicles();
        let mut cost = 0.0;
        let mut route_penalty = 0.0;
        let mut infeasible_routes = 0;

        for route in assignment.routes() {
            let vehicle = vehicles
                .get(route.vehicle())
                .ok_or(EvaluationError::UnknownVehicle(route.vehicle()))?;
            let customers = route.customers();
            if !assignment.has_forced(route) && self.is_feasible(customers, vehicle) {
                cost += self.route_cost(customers);
            } else {
                route_penalty += INFEASIBLE_ROUTE_PENALTY + self.route_demand(route);
                infeasible_routes += 1;
            }
        }

        let unserved = self
            .problem()
            .num_customers()
            .saturating_sub(assignment.num_served());
        let unserved_penalty = UNSERVED_PENALTY * unserved as f64;

        Ok(Fitness {
            value: cost + route_penalty + unserved_penalty,
            cost,
            route_penalty,
            unserved_penalty,
            infeasible_routes,
            unserved,
        })
    }

    /// Total demand on a route.
    pub fn route_demand(&self, route: &Route) -> f64 {
        route
            .customers()
            .iter()
            .filter_map(|&c| self.problem().customer(c))
            .map(|c| c.demand())
            .sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::distance::DistanceMatrix;
    use crate::models::{Customer, Depot, Problem, Vehicle};

    fn setup() -> (Problem, DistanceMatrix) {
        let p = Problem::new(
            Depot::new(0.0, 0.0),
            vec![
                Customer::new(1, 3.0, 4.0, 10.0, 0.0),
                Customer::new(2, -3.0, -4.0, 30.0, 0.0),
                Customer::new(3, 0.0, 5.0, 30.0, 0.0),
            ],
            vec![Vehicle::new(50.0, 100.0, 0.1), Vehicle::new(50.0, 100.0, 0.1)],
        )
        .expect("valid");
        let dm = DistanceMatrix::from_problem(&p);
        (p, dm)
    }

    #[test]
    fn test_empty_assignment_scores_unserved_only() {
        let (p, dm) = setup();
        let eval = RouteEvaluator::new(&p, &dm);
        let f = eval.fitness(&Assignment::empty()).expect("scorable");
        assert_eq!(f.cost, 0.0);
        assert_eq!(f.unserved, 3);
        assert_eq!(f.value, 6000.0);
    }

    #[test]
    fn test_infeasible_route_penalty_includes_demand() {
        let (p, dm) = setup();
        let eval = RouteEvaluator::new(&p, &dm);
        // 10 + 30 + 30 = 70 > 50
        let a = Assignment::new(vec![Route::new(0, vec![1, 2, 3])], 3, 2).expect("valid");
        let f = eval.fitness(&a).expect("scorable");
        assert_eq!(f.infeasible_routes, 1);
        assert_eq!(f.route_penalty, 1070.0);
        assert_eq!(f.cost, 0.0);
        assert_eq!(f.value, 1070.0);
        assert!(!f.is_clean());
    }

    #[test]
    fn test_forced_route_is_penalized_even_if_feasible() {
        let (p, dm) = setup();
        let eval = RouteEvaluator::new(&p, &dm);
        let mut a = Assignment::new(vec![Route::new(0, vec![1]), Route::new(1, vec![2])], 3, 2)
            .expect("valid");
        a.mark_forced(1);
        let f = eval.fitness(&a).expect("scorable");
        assert_eq!(f.infeasible_routes, 1);
        assert_eq!(f.route_penalty, 1010.0);
        assert!((f.cost - 10.0).abs() < 1e-10);
    }

    #[test]
    fn test_unknown_vehicle_is_an_error() {
        let (p, dm) = setup();
        let eval = RouteEvaluator::new(&p, &dm);
        let a = Assignment::from_routes(vec![Route::new(7, vec![1])]);
        assert_eq!(eval.fitness(&a), Err(EvaluationError::UnknownVehicle(7)));
    }

    #[test]
    fn test_clean_assignment() {
        let (p, dm) = setup();
        let eval = RouteEvaluator::new(&p, &dm);
        let a = Assignment::new(vec![Route::new(0, vec![1, 3]), Route::new(1, vec![2])], 3, 2)
            .expect("valid");
        let f = eval.fitness(&a).expect("scorable");
        assert!(f.is_clean());
        assert_eq!(f.value, f.cost);
    }
}
