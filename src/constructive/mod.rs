//! Constructive heuristics for building initial assignments.
//!
//! - [`nearest_feasible`]: greedy nearest-feasible-neighbor, vehicle by vehicle
//! - [`repair`]: cheapest feasible insertion for leftovers, then new routes, then forced placement
//! - [`construct`]: both phases together

mod nearest_feasible;
mod repair;

pub use nearest_feasible::{construct, nearest_feasible, RouteOpening};
pub use repair::{best_insertion, place, repair, Placement};
