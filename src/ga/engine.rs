//! Generational loop: seeding, parallel evaluation, elitist reproduction.
//!
//! # Algorithm
//!
//! 1. Seed `population_size` assignments with the constructive heuristic,
//!    member 0 from the natural customer order, the rest from shuffled orders.
//! 2. Score every member in parallel and sort ascending by fitness.
//! 3. Record the leader if it strictly beats the best so far.
//! 4. Copy the elite prefix unchanged; fill the rest with children bred
//!    from random elites by crossover (or cloning) and optional mutation.
//! 5. Stop on the generation cap, stalled improvement, the time limit, or
//!    cancellation.
//!
//! The public entry point never fails. Internal errors and panics are
//! answered with a round-robin assignment flagged as degraded. Scoring that
//! assignment is guarded as well.

use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rayon::prelude::*;
use thiserror::Error;
use tracing::{debug, error, info, warn};

use crate::constructive::{construct, RouteOpening};
use crate::distance::DistanceMatrix;
use crate::evaluation::{EvaluationError, Fitness, RouteEvaluator};
use crate::models::{
    Assignment, AssignmentError, CustomerId, Problem, Route, RouteReport, SolveResult, Termination,
};

use super::config::GaConfig;
use super::crossover::crossover;
use super::mutation::mutate;

/// Customers kept in the last-resort single route.
const FALLBACK_ROUTE_LEN: usize = 10;

/// Failure injected by tests into an otherwise healthy solve.
#[cfg(test)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Fault {
    /// The search returns an error.
    Error,
    /// The search panics.
    Panic,
    /// The search and the scoring of the fallback both panic.
    PanicAlways,
}

/// Internal failure of a solve. Never escapes [`Solver::solve`].
#[derive(Debug, Error)]
pub enum SolveError {
    #[error("failed to score assignment: {0}")]
    Evaluation(#[from] EvaluationError),
    #[error("built an invalid assignment: {0}")]
    Assignment(#[from] AssignmentError),
}

/// Genetic-algorithm solver for one problem.
///
/// # Examples
///
/// ```
/// use ev_routing::models::{Customer, Depot, Problem, Vehicle};
/// use ev_routing::ga::{GaConfig, Solver};
///
/// let problem = Problem::new(
///     Depot::new(50.0, 50.0),
///     vec![
///         Customer::new(1, 20.0, 20.0, 10.0, 5.0),
///         Customer::new(2, 80.0, 80.0, 10.0, 5.0),
///         Customer::new(3, 50.0, 10.0, 10.0, 5.0),
///     ],
///     vec![Vehicle::new(50.0, 100.0, 0.1); 2],
/// )
/// .unwrap();
///
/// let config = GaConfig::default()
///     .with_population_size(20)
///     .with_max_generations(30)
///     .with_seed(42);
/// let result = Solver::new(&problem, config).solve();
/// assert!(result.success);
/// assert!(result.unserved_customers.is_empty());
/// ```
pub struct Solver<'a> {
    problem: &'a Problem,
    config: GaConfig,
    cancel: Option<Arc<AtomicBool>>,
    #[cfg(test)]
    fault: Option<Fault>,
}

impl<'a> Solver<'a> {
    /// Creates a solver for `problem`.
    pub fn new(problem: &'a Problem, config: GaConfig) -> Self {
        Self {
            problem,
            config,
            cancel: None,
            #[cfg(test)]
            fault: None,
        }
    }

    /// Installs a cancellation flag, checked once per generation.
    pub fn with_cancellation(mut self, flag: Arc<AtomicBool>) -> Self {
        self.cancel = Some(flag);
        self
    }

    /// The configuration in use.
    pub fn config(&self) -> &GaConfig {
        &self.config
    }

    /// Runs the search and returns the best assignment found.
    ///
    /// Partial service is reported through `success == false` and the
    /// unserved list, never as an error.
    pub fn solve(&self) -> SolveResult {
        self.solve_recording().0
    }

    /// Like [`solve`](Self::solve), also returning the best fitness after
    /// each evaluated generation.
    pub(crate) fn solve_recording(&self) -> (SolveResult, Vec<f64>) {
        let started = Instant::now();
        info!(
            customers = self.problem.num_customers(),
            vehicles = self.problem.num_vehicles(),
            population = self.config.population_size,
            max_generations = self.config.max_generations,
            discharge = self.problem.discharge().enabled,
            "solve started"
        );

        let mut history = Vec::new();
        let outcome = panic::catch_unwind(AssertUnwindSafe(|| self.try_solve(started, &mut history)));
        let result = match outcome {
            Ok(Ok(result)) => result,
            Ok(Err(err)) => {
                error!(%err, "solve failed, returning round-robin fallback");
                self.emergency_fallback()
            }
            Err(_) => {
                error!("solve panicked, returning round-robin fallback");
                self.emergency_fallback()
            }
        };

        info!(
            total_cost = result.total_cost,
            total_distance = result.total_distance,
            served = result.customers_served,
            unserved = result.unserved_customers.len(),
            generations = result.generations,
            termination = ?result.termination,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "solve finished"
        );
        (result, history)
    }

    fn try_solve(&self, started: Instant, history: &mut Vec<f64>) -> Result<SolveResult, SolveError> {
        #[cfg(test)]
        self.inject_fault()?;

        let problem = self.problem;
        for issue in problem.diagnose() {
            warn!(%issue, "problem diagnostic");
        }

        let distances = DistanceMatrix::from_problem(problem);
        let evaluator = RouteEvaluator::new(problem, &distances);
        let n = problem.num_customers();
        let v = problem.num_vehicles();

        if n == 0 || v == 0 {
            if v == 0 && n > 0 {
                warn!(customers = n, "no vehicles, every customer is unserved");
            }
            let empty = Assignment::empty();
            let fitness = evaluator.fitness(&empty)?;
            return Ok(build_result(&evaluator, &empty, fitness.value, 0, Termination::Trivial, false)?);
        }

        let mut rng = match self.config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };

        let mut population = self.seed_population(&evaluator, &mut rng);
        if population.is_empty() {
            warn!("no valid seed assignment, starting from a single all-customer route");
            let all: Vec<CustomerId> = problem.customer_ids().collect();
            population.push(Assignment::new(vec![Route::new(0, all)], n, v)?);
        }

        let mut best: Option<(Assignment, Fitness)> = None;
        let mut stall = 0;
        let mut generations = 0;
        let mut termination = Termination::GenerationLimit;
        let patience = self.config.no_improvement_limit.max(1);

        while generations < self.config.max_generations {
            if self.is_cancelled() {
                termination = Termination::Cancelled;
                break;
            }
            if self.config.time_limit.is_some_and(|limit| started.elapsed() >= limit) {
                termination = Termination::TimeLimit;
                break;
            }

            let mut scored = population
                .into_par_iter()
                .map(|a| evaluator.fitness(&a).map(|f| (a, f)))
                .collect::<Result<Vec<(Assignment, Fitness)>, EvaluationError>>()?;
            scored.sort_by(|a, b| a.1.value.total_cmp(&b.1.value));
            generations += 1;

            let (leader, leader_fitness) = &scored[0];
            if best.as_ref().is_none_or(|(_, f)| leader_fitness.value < f.value) {
                debug!(
                    generation = generations,
                    fitness = leader_fitness.value,
                    infeasible_routes = leader_fitness.infeasible_routes,
                    unserved = leader_fitness.unserved,
                    "new best"
                );
                best = Some((leader.clone(), *leader_fitness));
                stall = 0;
            } else {
                stall += 1;
            }
            if let Some((_, f)) = &best {
                history.push(f.value);
            }

            if stall >= patience {
                termination = Termination::NoImprovement;
                break;
            }
            population = self.next_generation(&scored, &mut rng);
        }

        let (assignment, fitness) = match best {
            Some(best) => best,
            None => {
                warn!(?termination, "no generation evaluated, falling back to the first customers");
                let head: Vec<CustomerId> = problem.customer_ids().take(FALLBACK_ROUTE_LEN).collect();
                let assignment = Assignment::new(vec![Route::new(0, head)], n, v)?;
                let fitness = evaluator.fitness(&assignment)?;
                (assignment, fitness)
            }
        };

        Ok(build_result(&evaluator, &assignment, fitness.value, generations, termination, false)?)
    }

    #[cfg(test)]
    fn inject_fault(&self) -> Result<(), SolveError> {
        match self.fault {
            Some(Fault::Error) => Err(EvaluationError::UnknownVehicle(usize::MAX).into()),
            Some(Fault::Panic | Fault::PanicAlways) => panic!("injected search fault"),
            None => Ok(()),
        }
    }

    #[cfg(test)]
    fn inject_fallback_fault(&self) {
        if self.fault == Some(Fault::PanicAlways) {
            panic!("injected fallback fault");
        }
    }

    fn is_cancelled(&self) -> bool {
        self.cancel
            .as_ref()
            .is_some_and(|flag| flag.load(Ordering::Relaxed))
    }

    /// Builds the initial population. Member 0 uses the natural order and
    /// opens routes at the nearest customer; the others shuffle the order
    /// and open each route at its first feasible customer.
    fn seed_population(&self, evaluator: &RouteEvaluator<'_>, rng: &mut StdRng) -> Vec<Assignment> {
        let n = self.problem.num_customers();
        let v = self.problem.num_vehicles();
        let natural: Vec<CustomerId> = self.problem.customer_ids().collect();

        (0..self.config.population_size.max(1))
            .filter_map(|member| {
                let mut order = natural.clone();
                let opening = if member == 0 {
                    RouteOpening::Nearest
                } else {
                    order.shuffle(rng);
                    RouteOpening::VisitOrder
                };
                let assignment = construct(evaluator, &order, opening);
                match assignment.validate(n, v) {
                    Ok(()) => Some(assignment),
                    Err(err) => {
                        warn!(member, %err, "discarding invalid seed assignment");
                        None
                    }
                }
            })
            .collect()
    }

    fn next_generation(&self, scored: &[(Assignment, Fitness)], rng: &mut StdRng) -> Vec<Assignment> {
        let size = self.config.population_size.max(1);
        let elite = self.config.effective_elite().min(scored.len());
        let crossover_rate = self.config.crossover_rate();
        let mutation_rate = self.config.mutation_rate();

        let mut next: Vec<Assignment> = Vec::with_capacity(size);
        next.extend(scored[..elite].iter().map(|(a, _)| a.clone()));

        while next.len() < size {
            let parent = &scored[rng.random_range(0..elite)].0;
            let mut child = if rng.random_bool(crossover_rate) {
                let other = &scored[rng.random_range(0..elite)].0;
                crossover(parent, other)
            } else {
                parent.clone()
            };
            if rng.random_bool(mutation_rate) {
                child = mutate(&child, self.problem.num_vehicles(), rng).1;
            }
            next.push(child);
        }
        next
    }

    /// Deals customers to vehicles in turn without checking feasibility.
    ///
    /// Scoring the fallback runs under its own panic guard. If it fails too,
    /// the routes are reported with their node sequences only.
    fn emergency_fallback(&self) -> SolveResult {
        let problem = self.problem;
        let v = problem.num_vehicles();
        let mut routes: Vec<Route> = (0..v).map(Route::empty).collect();
        if v > 0 {
            for (i, customer) in problem.customer_ids().enumerate() {
                routes[i % v].customers_mut().push(customer);
            }
        }
        let mut assignment = Assignment::from_routes(routes);
        assignment.normalize();

        let scored = panic::catch_unwind(AssertUnwindSafe(|| -> Result<SolveResult, EvaluationError> {
            #[cfg(test)]
            self.inject_fallback_fault();

            let distances = DistanceMatrix::from_problem(problem);
            let evaluator = RouteEvaluator::new(problem, &distances);
            let fitness = evaluator.fitness(&assignment)?;
            build_result(&evaluator, &assignment, fitness.value, 0, Termination::EmergencyFallback, true)
        }));
        match scored {
            Ok(Ok(result)) => result,
            Ok(Err(err)) => {
                error!(%err, "could not score the fallback, reporting it unscored");
                unscored_result(&assignment, problem.num_customers())
            }
            Err(_) => {
                error!("scoring the fallback panicked, reporting it unscored");
                unscored_result(&assignment, problem.num_customers())
            }
        }
    }
}

fn build_result(
    evaluator: &RouteEvaluator<'_>,
    assignment: &Assignment,
    fitness: f64,
    generations: usize,
    termination: Termination,
    degraded: bool,
) -> Result<SolveResult, EvaluationError> {
    let routes = assignment
        .routes()
        .iter()
        .filter(|r| !r.is_empty())
        .map(|r| evaluator.report(r))
        .collect::<Result<Vec<RouteReport>, EvaluationError>>()?;
    let unserved_customers = assignment.unserved(evaluator.problem().num_customers());

    Ok(SolveResult {
        total_cost: routes.iter().map(|r| r.cost).sum(),
        total_distance: routes.iter().map(|r| r.distance).sum(),
        vehicles_used: routes.len(),
        customers_served: routes.iter().map(|r| r.customers_served).sum(),
        success: unserved_customers.is_empty(),
        unserved_customers,
        routes,
        fitness,
        generations,
        termination,
        degraded,
    })
}

/// A degraded result built from the assignment alone. Metrics are zero,
/// every route is marked infeasible, and fitness is `f64::MAX`.
fn unscored_result(assignment: &Assignment, num_customers: usize) -> SolveResult {
    let routes: Vec<RouteReport> = assignment
        .routes()
        .iter()
        .filter(|r| !r.is_empty())
        .map(|r| RouteReport {
            vehicle: r.vehicle(),
            nodes: r.nodes(),
            distance: 0.0,
            cost: 0.0,
            customers_served: r.len(),
            load: 0.0,
            energy_consumed: 0.0,
            discharge_benefit: 0.0,
            feasible: false,
        })
        .collect();
    let unserved_customers = assignment.unserved(num_customers);

    SolveResult {
        total_cost: 0.0,
        total_distance: 0.0,
        vehicles_used: routes.len(),
        customers_served: routes.iter().map(|r| r.customers_served).sum(),
        success: unserved_customers.is_empty(),
        unserved_customers,
        routes,
        fitness: f64::MAX,
        generations: 0,
        termination: Termination::EmergencyFallback,
        degraded: true,
    }
}

/// Solves `problem` with `config`. Shorthand for
/// `Solver::new(problem, config.clone()).solve()`.
pub fn solve(problem: &Problem, config: &GaConfig) -> SolveResult {
    Solver::new(problem, config.clone()).solve()
}
