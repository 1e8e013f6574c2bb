//! Genetic algorithm configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Parameters of the generational loop.
///
/// # Examples
///
/// ```
/// use ev_routing::ga::GaConfig;
///
/// let config = GaConfig::default()
///     .with_population_size(30)
///     .with_max_generations(100)
///     .with_seed(42);
/// assert_eq!(config.population_size, 30);
/// assert_eq!(config.seed, Some(42));
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GaConfig {
    /// Assignments per generation.
    pub population_size: usize,
    /// Hard cap on evaluated generations.
    pub max_generations: usize,
    /// Best-ranked assignments copied unchanged into the next generation.
    pub elite_size: usize,
    /// Chance that a child comes from crossover instead of cloning.
    pub crossover_probability: f64,
    /// Chance that a child receives one mutation.
    pub mutation_probability: f64,
    /// Generations without strict improvement before stopping early.
    pub no_improvement_limit: usize,
    /// RNG seed; `None` seeds from the OS.
    pub seed: Option<u64>,
    /// Wall-clock budget for the loop.
    pub time_limit: Option<Duration>,
}

impl Default for GaConfig {
    fn default() -> Self {
        Self {
            population_size: 50,
            max_generations: 200,
            elite_size: 10,
            crossover_probability: 0.8,
            mutation_probability: 0.2,
            no_improvement_limit: 50,
            seed: None,
            time_limit: None,
        }
    }
}

impl GaConfig {
    /// Sets the population size.
    pub fn with_population_size(mut self, size: usize) -> Self {
        self.population_size = size;
        self
    }

    /// Sets the generation cap.
    pub fn with_max_generations(mut self, generations: usize) -> Self {
        self.max_generations = generations;
        self
    }

    /// Sets the elite size.
    pub fn with_elite_size(mut self, size: usize) -> Self {
        self.elite_size = size;
        self
    }

    /// Sets the crossover probability.
    pub fn with_crossover_probability(mut self, p: f64) -> Self {
        self.crossover_probability = p;
        self
    }

    /// Sets the mutation probability.
    pub fn with_mutation_probability(mut self, p: f64) -> Self {
        self.mutation_probability = p;
        self
    }

    /// Sets the early-stopping patience.
    pub fn with_no_improvement_limit(mut self, generations: usize) -> Self {
        self.no_improvement_limit = generations;
        self
    }

    /// Fixes the RNG seed for reproducible runs.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Sets a wall-clock budget.
    pub fn with_time_limit(mut self, limit: Duration) -> Self {
        self.time_limit = Some(limit);
        self
    }

    /// Elite size clamped to `[1, population_size]`.
    pub(crate) fn effective_elite(&self) -> usize {
        self.elite_size.clamp(1, self.population_size.max(1))
    }

    pub(crate) fn crossover_rate(&self) -> f64 {
        clamp_probability(self.crossover_probability)
    }

    pub(crate) fn mutation_rate(&self) -> f64 {
        clamp_probability(self.mutation_probability)
    }
}

fn clamp_probability(p: f64) -> f64 {
    if p.is_nan() {
        0.0
    } else {
        p.clamp(0.0, 1.0)
    }
}
