//! Standard test objectives for continuous optimization.
//!
//! Each benchmark has a fixed dimension and a conventional search box, and
//! fails with [`EvolveError::InvalidArgument`] when handed an individual of
//! the wrong length. All are minimized at value 0.

use crate::ec::{FitnessFunction, Individual};
use crate::error::{EvolveError, Result};
use std::f64::consts::PI;

/// A [`FitnessFunction`] with a conventional search domain.
pub trait Benchmark: FitnessFunction {
    fn name(&self) -> &'static str;

    /// Number of genes the function expects.
    fn problem_dim(&self) -> usize;

    /// Per-gene `(lower, upper)` domain.
    fn domain(&self) -> (f64, f64);

    fn lower_bound(&self) -> Vec<f64> {
        vec![self.domain().0; self.problem_dim()]
    }

    fn upper_bound(&self) -> Vec<f64> {
        vec![self.domain().1; self.problem_dim()]
    }
}

fn check_len(individual: &Individual, expected: usize) -> Result<&[f64]> {
    if individual.len() != expected {
        return Err(EvolveError::invalid(format!(
            "individual has {} genes, problem dimension is {expected}",
            individual.len()
        )));
    }
    Ok(individual.genes())
}

/// `f(x) = Σ xᵢ²` on `[-5.12, 5.12]ⁿ`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Sphere {
    dim: usize,
}

impl Sphere {
    pub fn new(dim: usize) -> Self {
        Self { dim }
    }
}

impl Default for Sphere {
    fn default() -> Self {
        Self::new(10)
    }
}

impl FitnessFunction for Sphere {
    fn evaluate(&self, individual: &Individual) -> Result<f64> {
        let genes = check_len(individual, self.dim)?;
        Ok(genes.iter().map(|x| x * x).sum())
    }

    fn dimension(&self) -> Option<usize> {
        Some(self.dim)
    }
}

impl Benchmark for Sphere {
    fn name(&self) -> &'static str {
        "sphere"
    }

    fn problem_dim(&self) -> usize {
        self.dim
    }

    fn domain(&self) -> (f64, f64) {
        (-5.12, 5.12)
    }
}

/// `f(x) = Σ [100(xᵢ₊₁ − xᵢ²)² + (1 − xᵢ)²]` on `[-2.048, 2.048]ⁿ`,
/// minimum at `(1, …, 1)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rosenbrock {
    dim: usize,
}

impl Rosenbrock {
    pub fn new(dim: usize) -> Self {
        Self { dim }
    }
}

impl FitnessFunction for Rosenbrock {
    fn evaluate(&self, individual: &Individual) -> Result<f64> {
        let genes = check_len(individual, self.dim)?;
        Ok(genes
            .windows(2)
            .map(|w| 100.0 * (w[1] - w[0] * w[0]).powi(2) + (1.0 - w[0]).powi(2))
            .sum())
    }

    fn dimension(&self) -> Option<usize> {
        Some(self.dim)
    }
}

impl Benchmark for Rosenbrock {
    fn name(&self) -> &'static str {
        "rosenbrock"
    }

    fn problem_dim(&self) -> usize {
        self.dim
    }

    fn domain(&self) -> (f64, f64) {
        (-2.048, 2.048)
    }
}

/// `f(x) = 10n + Σ [xᵢ² − 10 cos(2πxᵢ)]` on `[-5.12, 5.12]ⁿ`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rastrigin {
    dim: usize,
}

impl Rastrigin {
    pub fn new(dim: usize) -> Self {
        Self { dim }
    }
}

impl FitnessFunction for Rastrigin {
    fn evaluate(&self, individual: &Individual) -> Result<f64> {
        let genes = check_len(individual, self.dim)?;
        let sum: f64 = genes
            .iter()
            .map(|x| x * x - 10.0 * (2.0 * PI * x).cos())
            .sum();
        Ok(10.0 * self.dim as f64 + sum)
    }

    fn dimension(&self) -> Option<usize> {
        Some(self.dim)
    }
}

impl Benchmark for Rastrigin {
    fn name(&self) -> &'static str {
        "rastrigin"
    }

    fn problem_dim(&self) -> usize {
        self.dim
    }

    fn domain(&self) -> (f64, f64) {
        (-5.12, 5.12)
    }
}
