//! The objective capability consumed by evolvers.

use super::individual::Individual;
use crate::error::Result;

/// Maps an individual to a scalar fitness. Lower is better.
///
/// Implementations must be pure in the individual's genes. An objective
/// that expects a particular dimensionality reports it through
/// [`dimension`](FitnessFunction::dimension) and fails with
/// [`EvolveError::InvalidArgument`](crate::error::EvolveError::InvalidArgument)
/// on a mismatch.
///
/// Any `Fn(&[f64]) -> f64` closure is a fitness function:
///
/// ```
/// use u_evolve::ec::{FitnessFunction, Individual};
///
/// let abs_sum = |genes: &[f64]| genes.iter().map(|g| g.abs()).sum::<f64>();
/// let ind = Individual::from_genes(vec![-1.0, 2.0]);
/// assert_eq!(abs_sum.evaluate(&ind).unwrap(), 3.0);
/// ```
pub trait FitnessFunction {
    /// Computes the fitness of `individual`.
    fn evaluate(&self, individual: &Individual) -> Result<f64>;

    /// Expected chromosome length, or `None` if any length is accepted.
    fn dimension(&self) -> Option<usize> {
        None
    }
}

impl<F> FitnessFunction for F
where
    F: Fn(&[f64]) -> f64,
{
    fn evaluate(&self, individual: &Individual) -> Result<f64> {
        Ok(self(individual.genes()))
    }
}
