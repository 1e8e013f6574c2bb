//! Route feasibility checking, cost evaluation, and assignment fitness.

mod evaluator;
mod fitness;

pub use evaluator::{RouteEvaluator, RouteTrace, Violation};
pub use fitness::{EvaluationError, Fitness, INFEASIBLE_ROUTE_PENALTY, UNSERVED_PENALTY};
