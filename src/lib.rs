//! # ev-routing
//!
//! Electric vehicle routing with customer time windows, vehicle load and
//! battery limits, and an optional incentive for serving customers during
//! peak grid hours. Assignments are optimized by a genetic algorithm seeded
//! with a nearest-feasible construction heuristic.
//!
//! ## Modules
//!
//! - [`models`]: domain types (Customer, Depot, Vehicle, Route, Assignment, Problem, SolveResult)
//! - [`distance`]: Euclidean distance matrix
//! - [`evaluation`]: route replay, discharge-aware cost, penalized fitness
//! - [`constructive`]: nearest-feasible construction and straggler repair
//! - [`ga`]: crossover, mutation, and the generational solver
//! - [`parsers`]: Solomon instance reader
//!
//! ## Example
//!
//! ```
//! use ev_routing::models::{Customer, DischargeConfig, Depot, Problem, Vehicle};
//! use ev_routing::ga::{solve, GaConfig};
//!
//! let problem = Problem::new(
//!     Depot::new(0.0, 0.0),
//!     vec![
//!         Customer::new(1, 10.0, 0.0, 5.0, 10.0),
//!         Customer::new(2, 0.0, 10.0, 5.0, 10.0),
//!     ],
//!     vec![Vehicle::new(20.0, 100.0, 0.2)],
//! )
//! .unwrap()
//! .with_discharge(DischargeConfig::default())
//! .unwrap();
//!
//! let result = solve(&problem, &GaConfig::default().with_seed(1));
//! assert!(result.success);
//! assert_eq!(result.vehicles_used, 1);
//! ```

pub mod constructive;
pub mod distance;
pub mod evaluation;
pub mod ga;
pub mod models;
pub mod parsers;
