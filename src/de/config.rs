//! DE configuration.
//!
//! [`DeConfig`] holds all parameters that control a Differential Evolution
//! run.

use crate::error::{EvolveError, Result};

/// Configuration for Differential Evolution.
///
/// # Defaults
///
/// ```
/// use u_evolve::de::DeConfig;
///
/// let config = DeConfig::default();
/// assert_eq!(config.population_size, 100);
/// assert_eq!(config.max_generations, 500);
/// assert!((config.diff_weight - 0.7).abs() < 1e-12);
/// ```
///
/// # Builder Pattern
///
/// ```
/// use u_evolve::de::DeConfig;
///
/// let config = DeConfig::default()
///     .with_population_size(40)
///     .with_diff_weight(0.5)
///     .with_crossover_prob(0.9)
///     .with_seed(42);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DeConfig {
    /// Number of individuals in the population. At least 3, since every
    /// trial needs three distinct donors.
    pub population_size: usize,

    /// Number of generations to run.
    pub max_generations: usize,

    /// Differential weight `F` scaling the donor difference vector.
    /// Conventional range: 0.0–2.0.
    pub diff_weight: f64,

    /// Crossover probability `CR`: chance that a gene is taken from the
    /// mutation vector rather than the parent (0.0–1.0).
    pub crossover_prob: f64,

    /// Random seed for reproducibility.
    ///
    /// `None` seeds from OS entropy.
    pub seed: Option<u64>,

    /// Emit one informational event per generation.
    pub verbose: bool,
}

/// Valid range for [`DeConfig::diff_weight`].
pub const DIFF_WEIGHT_RANGE: (f64, f64) = (0.0, 2.0);

impl Default for DeConfig {
    fn default() -> Self {
        Self {
            population_size: 100,
            max_generations: 500,
            diff_weight: 0.7,
            crossover_prob: 0.2,
            seed: None,
            verbose: false,
        }
    }
}

impl DeConfig {
    /// Sets the number of individuals.
    pub fn with_population_size(mut self, n: usize) -> Self {
        self.population_size = n;
        self
    }

    /// Sets the generation budget.
    pub fn with_max_generations(mut self, n: usize) -> Self {
        self.max_generations = n;
        self
    }

    /// Sets the differential weight, clamped to `[0, 2]`.
    pub fn with_diff_weight(mut self, f: f64) -> Self {
        self.diff_weight = f.clamp(DIFF_WEIGHT_RANGE.0, DIFF_WEIGHT_RANGE.1);
        self
    }

    /// Sets the crossover probability, clamped to `[0, 1]`.
    pub fn with_crossover_prob(mut self, cr: f64) -> Self {
        self.crossover_prob = cr.clamp(0.0, 1.0);
        self
    }

    /// Sets the seed for a reproducible run.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Sets whether every generation is logged.
    pub fn with_verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    /// Small population and budget for quick checks.
    ///
    /// - Population: 30, Generations: 100
    pub fn fast() -> Self {
        Self {
            population_size: 30,
            max_generations: 100,
            ..Self::default()
        }
    }

    /// - Population: 60, Generations: 300, CR: 0.5
    pub fn balanced() -> Self {
        Self {
            population_size: 60,
            max_generations: 300,
            crossover_prob: 0.5,
            ..Self::default()
        }
    }

    /// Large population and budget for hard landscapes.
    ///
    /// - Population: 150, Generations: 1000, F: 0.6, CR: 0.9
    pub fn quality() -> Self {
        Self {
            population_size: 150,
            max_generations: 1000,
            diff_weight: 0.6,
            crossover_prob: 0.9,
            ..Self::default()
        }
    }

    /// Validates the configuration.
    pub fn validate(&self) -> Result<()> {
        if self.population_size < 3 {
            return Err(EvolveError::invalid("population_size must be at least 3"));
        }
        validate_diff_weight(self.diff_weight)?;
        validate_crossover_prob(self.crossover_prob)
    }
}

pub(crate) fn validate_diff_weight(f: f64) -> Result<()> {
    let (lo, hi) = DIFF_WEIGHT_RANGE;
    if !(lo..=hi).contains(&f) {
        return Err(EvolveError::invalid(format!(
            "diff_weight must be in [{lo}, {hi}], got {f}"
        )));
    }
    Ok(())
}

pub(crate) fn validate_crossover_prob(cr: f64) -> Result<()> {
    if !(0.0..=1.0).contains(&cr) {
        return Err(EvolveError::invalid(format!(
            "crossover_prob must be in [0, 1], got {cr}"
        )));
    }
    Ok(())
}
