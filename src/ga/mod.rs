//! Genetic algorithm over route assignments.
//!
//! - [`Solver`]: seeding, parallel evaluation, elitist reproduction, fallbacks
//! - [`GaConfig`]: population, generation, and probability parameters
//! - [`crossover`]: order-preserving route merge
//! - [`Mutation`]: swap, relocate, and segment reversal

mod config;
mod crossover;
mod engine;
mod mutation;

pub use config::GaConfig;
pub use crossover::crossover;
pub use engine::{solve, SolveError, Solver};
pub use mutation::{mutate, Mutation};
