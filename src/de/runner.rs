//! One-call DE execution driven by [`DeConfig`].

use super::config::DeConfig;
use super::evolver::DifferentialEvolution;
use crate::ec::{Evolver, FitnessFunction, Individual};
use crate::error::{EvolveError, Result};
use tracing::Dispatch;

/// Result of a DE optimization run.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DeResult {
    /// The best individual found.
    pub best: Individual,

    /// Fitness of `best`.
    pub best_fitness: f64,

    /// Number of generations executed.
    pub generations: usize,

    /// Elite fitness of the initial population, then one entry per
    /// generation.
    pub fitness_history: Vec<f64>,
}

/// Runs Differential Evolution from a configuration.
///
/// # Usage
///
/// ```
/// use u_evolve::de::{DeConfig, DeRunner};
///
/// let sphere = |g: &[f64]| g.iter().map(|x| x * x).sum::<f64>();
/// let config = DeConfig::fast().with_seed(7);
/// let result = DeRunner::run(&sphere, &[-5.0; 3], &[5.0; 3], &config).unwrap();
/// assert_eq!(result.generations, config.max_generations);
/// assert_eq!(result.fitness_history.len(), config.max_generations + 1);
/// ```
pub struct DeRunner;

impl DeRunner {
    /// Runs DE with diagnostics discarded.
    pub fn run(
        objective: &dyn FitnessFunction,
        lower_bound: &[f64],
        upper_bound: &[f64],
        config: &DeConfig,
    ) -> Result<DeResult> {
        Self::run_with_dispatch(objective, lower_bound, upper_bound, config, Dispatch::none())
    }

    /// Runs DE, routing diagnostics to `dispatch`.
    pub fn run_with_dispatch(
        objective: &dyn FitnessFunction,
        lower_bound: &[f64],
        upper_bound: &[f64],
        config: &DeConfig,
        dispatch: Dispatch,
    ) -> Result<DeResult> {
        let mut de = DifferentialEvolution::from_config(config)?.with_dispatch(dispatch);
        de.evolve_from(
            config.population_size,
            lower_bound,
            upper_bound,
            objective,
            config.max_generations,
            config.verbose,
        )?;
        Self::collect(&de)
    }

    fn collect(de: &DifferentialEvolution<'_>) -> Result<DeResult> {
        let best = de
            .elite()
            .cloned()
            .ok_or_else(|| EvolveError::runtime("no elite recorded"))?;
        let best_fitness = best
            .fitness()
            .ok_or_else(|| EvolveError::runtime("elite was never evaluated"))?;
        Ok(DeResult {
            best,
            best_fitness,
            generations: de.generation(),
            fitness_history: de.elite_history().to_vec(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::benchmarks::{Benchmark, Rastrigin, Rosenbrock, Sphere};

    #[test]
    fn test_sphere_convergence() {
        let sphere = Sphere::new(5);
        let config = DeConfig::default()
            .with_population_size(40)
            .with_max_generations(300)
            .with_crossover_prob(0.9)
            .with_diff_weight(0.5)
            .with_seed(42);
        let result =
            DeRunner::run(&sphere, &sphere.lower_bound(), &sphere.upper_bound(), &config).unwrap();
        assert!(
            result.best_fitness < 1e-3,
            "expected fitness < 1e-3 for 5D sphere, got {}",
            result.best_fitness
        );
    }

    #[test]
    fn test_rosenbrock_improves() {
        let rosen = Rosenbrock::new(2);
        let config = DeConfig::balanced().with_seed(1);
        let result =
            DeRunner::run(&rosen, &rosen.lower_bound(), &rosen.upper_bound(), &config).unwrap();
        assert!(result.best_fitness < result.fitness_history[0]);
        assert!(
            result.best_fitness < 1e-2,
            "expected fitness < 1e-2 for 2D Rosenbrock, got {}",
            result.best_fitness
        );
    }

    #[test]
    fn test_rastrigin_history_monotone() {
        let rastrigin = Rastrigin::new(4);
        let config = DeConfig::fast().with_seed(3);
        let result = DeRunner::run(
            &rastrigin,
            &rastrigin.lower_bound(),
            &rastrigin.upper_bound(),
            &config,
        )
        .unwrap();
        assert_eq!(result.fitness_history.len(), 101);
        for w in result.fitness_history.windows(2) {
            assert!(w[1] <= w[0]);
        }
    }

    #[test]
    fn test_invalid_config_rejected() {
        let sphere = Sphere::new(2);
        let config = DeConfig::default().with_population_size(2);
        assert!(matches!(
            DeRunner::run(&sphere, &[-1.0; 2], &[1.0; 2], &config),
            Err(EvolveError::InvalidArgument(_))
        ));
    }

    #[test]
    fn test_bounds_dimension_must_match_objective() {
        let sphere = Sphere::new(3);
        let config = DeConfig::fast().with_seed(1);
        assert!(matches!(
            DeRunner::run(&sphere, &[-1.0; 2], &[1.0; 2], &config),
            Err(EvolveError::InvalidArgument(_))
        ));
    }

    #[test]
    fn test_zero_generations() {
        let sphere = Sphere::new(2);
        let config = DeConfig::fast().with_max_generations(0).with_seed(9);
        let result = DeRunner::run(&sphere, &[-1.0; 2], &[1.0; 2], &config).unwrap();
        assert_eq!(result.generations, 0);
        assert_eq!(result.fitness_history, vec![result.best_fitness]);
    }
}
