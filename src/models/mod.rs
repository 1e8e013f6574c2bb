//! Domain model types for electric vehicle routing.
//!
//! Customers with demands and time windows, a single depot, battery-limited
//! vehicles, routes as ordered customer sequences, candidate assignments, and
//! the validated problem instance that ties them together.

mod assignment;
mod customer;
mod discharge;
mod problem;
mod route;
mod solution;
mod vehicle;

pub use assignment::{Assignment, AssignmentError};
pub use customer::{Customer, CustomerId, Depot, TimeWindow, DEPOT_ID};
pub use discharge::DischargeConfig;
pub use problem::{Issue, Problem, ProblemError};
pub use route::{Route, Visit};
pub use solution::{RouteReport, SolveResult, Termination};
pub use vehicle::Vehicle;
