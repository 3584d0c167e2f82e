//! The generational loop shared by every evolver.
//!
//! [`EvolverCore`] carries the state every evolutionary algorithm needs:
//! bounds, generation counters, the fitness function, the population, a
//! private random source and a logging handle. The [`Evolver`] trait runs
//! the loop once against four hooks:
//!
//! ```text
//! initialize → evaluate → save_elite → while !stop { breed → select → save_elite → generation += 1 }
//! ```

use super::fitness::FitnessFunction;
use super::individual::Individual;
use super::population::Population;
use super::random::{create_rng, entropy_rng};
use crate::error::{EvolveError, Result};
use rand::distr::Uniform;
use rand::rngs::StdRng;
use rand_distr::{Distribution, Normal};
use std::fmt;
use tracing::Dispatch;

/// Lifecycle of an evolver.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// No successful `initialize` yet.
    Uninitialized,
    /// Bounds validated and population built.
    Initialized,
    /// Inside the generational loop.
    Evolving,
    /// The stop criterion fired. Population and elite stay queryable.
    Stopped,
}

/// State and services shared by all evolvers.
pub struct EvolverCore<'a> {
    generation: usize,
    max_generation: usize,
    lower_bound: Vec<f64>,
    upper_bound: Vec<f64>,
    fitness_fn: Option<&'a dyn FitnessFunction>,
    population: Option<Population>,
    rng: StdRng,
    verbose: bool,
    phase: Phase,
    dispatch: Dispatch,
}

impl<'a> EvolverCore<'a> {
    /// Creates a core whose random source is seeded from OS entropy.
    pub fn new() -> Self {
        Self::with_rng(entropy_rng())
    }

    /// Creates a core with a deterministic random source.
    pub fn with_seed(seed: u64) -> Self {
        Self::with_rng(create_rng(seed))
    }

    fn with_rng(rng: StdRng) -> Self {
        Self {
            generation: 0,
            max_generation: 100,
            lower_bound: Vec::new(),
            upper_bound: Vec::new(),
            fitness_fn: None,
            population: None,
            rng,
            verbose: false,
            phase: Phase::Uninitialized,
            dispatch: Dispatch::none(),
        }
    }

    /// Routes this core's diagnostics to `dispatch`.
    ///
    /// The default handle discards everything.
    pub fn set_dispatch(&mut self, dispatch: Dispatch) {
        self.dispatch = dispatch;
    }

    pub fn dispatch(&self) -> &Dispatch {
        &self.dispatch
    }

    /// Validates and stores bounds and the fitness function, resetting the
    /// generation counter. Nothing is stored if validation fails.
    pub(crate) fn configure(
        &mut self,
        lower_bound: &[f64],
        upper_bound: &[f64],
        fitness_fn: &'a dyn FitnessFunction,
    ) -> Result<()> {
        validate_bounds(lower_bound, upper_bound)?;
        if let Some(dim) = fitness_fn.dimension() {
            if dim != lower_bound.len() {
                return Err(EvolveError::invalid(format!(
                    "fitness function expects {dim} genes but bounds describe {}",
                    lower_bound.len()
                )));
            }
        }

        self.lower_bound = lower_bound.to_vec();
        self.upper_bound = upper_bound.to_vec();
        self.fitness_fn = Some(fitness_fn);
        self.generation = 0;
        Ok(())
    }

    pub fn generation(&self) -> usize {
        self.generation
    }

    pub fn max_generation(&self) -> usize {
        self.max_generation
    }

    pub fn lower_bound(&self) -> &[f64] {
        &self.lower_bound
    }

    pub fn upper_bound(&self) -> &[f64] {
        &self.upper_bound
    }

    /// Problem dimension, i.e. the length of the bound vectors.
    pub fn dimension(&self) -> usize {
        self.lower_bound.len()
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn verbose(&self) -> bool {
        self.verbose
    }

    /// The attached fitness function.
    pub fn fitness_fn(&self) -> Result<&'a dyn FitnessFunction> {
        self.fitness_fn
            .ok_or_else(|| EvolveError::invalid("no fitness function set"))
    }

    pub fn population(&self) -> Option<&Population> {
        self.population.as_ref()
    }

    pub fn population_mut(&mut self) -> Option<&mut Population> {
        self.population.as_mut()
    }

    /// Attaches `population`, returning the previously attached one.
    pub fn set_population(&mut self, population: Population) -> Option<Population> {
        self.population.replace(population)
    }

    /// Detaches and returns the population.
    pub fn take_population(&mut self) -> Option<Population> {
        self.population.take()
    }

    /// Evaluates `individual` and stores the result as its fitness.
    pub fn evaluate(&self, individual: &mut Individual) -> Result<()> {
        let fitness = self.fitness_fn()?.evaluate(individual)?;
        individual.set_fitness(fitness);
        Ok(())
    }

    /// Evaluates every member of the attached population.
    pub fn evaluate_population(&mut self) -> Result<()> {
        let fitness_fn = self.fitness_fn()?;
        let population = self
            .population
            .as_mut()
            .ok_or_else(|| EvolveError::runtime("empty population"))?;
        if !population.is_filled() {
            return Err(EvolveError::runtime("empty population"));
        }
        for ind in population.iter_mut() {
            let fitness = fitness_fn.evaluate(ind)?;
            ind.set_fitness(fitness);
        }
        Ok(())
    }

    /// Draws from the uniform distribution over `[min, max]`.
    ///
    /// Fails with `InvalidArgument` if `min > max` or the interval width is
    /// not finite.
    pub fn rand_uniform(&mut self, min: f64, max: f64) -> Result<f64> {
        let uniform = Uniform::new_inclusive(min, max).map_err(|e| {
            EvolveError::invalid(format!("uniform distribution over [{min}, {max}]: {e}"))
        })?;
        Ok(uniform.sample(&mut self.rng))
    }

    /// Draws from the normal distribution `N(mean, std²)`.
    pub fn rand_norm(&mut self, mean: f64, std: f64) -> Result<f64> {
        if !std.is_finite() || std < 0.0 {
            return Err(EvolveError::invalid(format!(
                "standard deviation must be finite and non-negative, got {std}"
            )));
        }
        let normal = Normal::new(mean, std)
            .map_err(|e| EvolveError::invalid(format!("normal distribution: {e}")))?;
        Ok(normal.sample(&mut self.rng))
    }

    /// Direct access to the random source for hooks that need other draws.
    pub fn rng_mut(&mut self) -> &mut StdRng {
        &mut self.rng
    }

    fn log_generation(&self) {
        if self.verbose {
            tracing::dispatcher::with_default(&self.dispatch, || {
                tracing::info!(generation = self.generation, "Generation: {}", self.generation);
            });
        }
    }
}

impl Default for EvolverCore<'_> {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for EvolverCore<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EvolverCore")
            .field("generation", &self.generation)
            .field("max_generation", &self.max_generation)
            .field("lower_bound", &self.lower_bound)
            .field("upper_bound", &self.upper_bound)
            .field("has_fitness_fn", &self.fitness_fn.is_some())
            .field("population", &self.population.as_ref().map(Population::len))
            .field("phase", &self.phase)
            .finish_non_exhaustive()
    }
}

/// Checks that bounds are non-empty, equally long and ordered per gene,
/// with a finite width.
pub fn validate_bounds(lower_bound: &[f64], upper_bound: &[f64]) -> Result<()> {
    if lower_bound.len() != upper_bound.len() {
        return Err(EvolveError::invalid(format!(
            "lower and upper bounds must have the same size ({} vs {})",
            lower_bound.len(),
            upper_bound.len()
        )));
    }
    if lower_bound.is_empty() {
        return Err(EvolveError::invalid("bounds must describe at least one gene"));
    }
    for (i, (&lo, &hi)) in lower_bound.iter().zip(upper_bound).enumerate() {
        if !lo.is_finite() || !hi.is_finite() {
            return Err(EvolveError::invalid(format!("bound {i} is not finite")));
        }
        if lo > hi {
            return Err(EvolveError::invalid(format!(
                "lower bound {lo} exceeds upper bound {hi} at gene {i}"
            )));
        }
        if !(hi - lo).is_finite() {
            return Err(EvolveError::invalid(format!(
                "bound width at gene {i} overflows ({lo} to {hi})"
            )));
        }
    }
    Ok(())
}

/// An evolutionary algorithm expressed as hooks over [`EvolverCore`].
///
/// Implementors supply state access and the generation-specific hooks;
/// `initialize`, `evolve` and `evolve_from` are provided and run the same
/// loop for every algorithm. Base validation in `initialize` always runs
/// before [`populate`](Evolver::populate) is called.
pub trait Evolver<'a> {
    fn core(&self) -> &EvolverCore<'a>;

    fn core_mut(&mut self) -> &mut EvolverCore<'a>;

    /// Smallest population this algorithm can work with.
    fn min_population_size(&self) -> usize {
        1
    }

    /// Builds the initial population after bounds have been validated and
    /// stored.
    fn populate(&mut self, population_size: usize) -> Result<()>;

    /// Picks the individuals that form the next generation.
    fn select(&mut self) -> Result<()>;

    /// Produces offspring from the current population.
    fn breed(&mut self) -> Result<()>;

    /// Whether the loop should stop before running another generation.
    fn check_stop_criteria(&self) -> bool;

    /// Records the best individual of the current population.
    fn save_elite(&mut self) -> Result<()>;

    /// Validates arguments, stores bounds and the fitness function, then
    /// builds the initial population.
    fn initialize(
        &mut self,
        population_size: usize,
        lower_bound: &[f64],
        upper_bound: &[f64],
        fitness_fn: &'a dyn FitnessFunction,
    ) -> Result<()> {
        let min = self.min_population_size().max(1);
        if population_size < min {
            return Err(EvolveError::invalid(format!(
                "population size must be at least {min}, got {population_size}"
            )));
        }
        self.core_mut()
            .configure(lower_bound, upper_bound, fitness_fn)?;
        self.populate(population_size)?;
        self.core_mut().phase = Phase::Initialized;
        Ok(())
    }

    /// Runs the generational loop on the attached population until
    /// [`check_stop_criteria`](Evolver::check_stop_criteria) fires.
    ///
    /// The stop criterion is checked before every generation, including
    /// the first, so `max_generation = 0` only evaluates the initial
    /// population and records its elite. A call that continues an earlier
    /// run (generation above 0) does not record the elite again before
    /// breeding.
    fn evolve(&mut self, max_generation: usize, verbose: bool) -> Result<()> {
        {
            let core = self.core_mut();
            core.evaluate_population()?;
            core.max_generation = max_generation;
            core.verbose = verbose;
            core.phase = Phase::Evolving;
        }
        if self.core().generation() == 0 {
            self.save_elite()?;
        }

        while !self.check_stop_criteria() {
            self.core().log_generation();
            self.breed()?;
            self.select()?;
            self.save_elite()?;
            self.core_mut().generation += 1;
        }

        self.core_mut().phase = Phase::Stopped;
        Ok(())
    }

    /// [`initialize`](Evolver::initialize) followed by
    /// [`evolve`](Evolver::evolve).
    fn evolve_from(
        &mut self,
        population_size: usize,
        lower_bound: &[f64],
        upper_bound: &[f64],
        fitness_fn: &'a dyn FitnessFunction,
        max_generation: usize,
        verbose: bool,
    ) -> Result<()> {
        self.initialize(population_size, lower_bound, upper_bound, fitness_fn)?;
        self.evolve(max_generation, verbose)
    }

    /// Attaches a population to evolve, returning the previous one.
    fn set_population(&mut self, population: Population) -> Option<Population> {
        self.core_mut().set_population(population)
    }

    fn population<'s>(&'s self) -> Option<&'s Population>
    where
        'a: 's,
    {
        self.core().population()
    }

    fn generation(&self) -> usize {
        self.core().generation()
    }
}
