//! Real-coded candidate solutions.

use crate::error::{EvolveError, Result};
use std::fmt;

/// A candidate solution: a fixed-length vector of real-valued genes and
/// the fitness assigned by the last evaluation.
///
/// The chromosome length is fixed at construction. Fitness is `None` until
/// an evaluation pass assigns it. Lower fitness is better.
///
/// # Examples
///
/// ```
/// use u_evolve::ec::Individual;
///
/// let mut ind = Individual::new(3);
/// ind.set(1, 2.5).unwrap();
/// assert_eq!(ind.get(1).unwrap(), 2.5);
/// assert!(ind.fitness().is_none());
/// assert!(ind.get(3).is_err());
/// ```
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Individual {
    chromosome: Vec<f64>,
    fitness: Option<f64>,
}

impl Individual {
    /// Creates an unevaluated individual with `len` genes, all zero.
    pub fn new(len: usize) -> Self {
        Self {
            chromosome: vec![0.0; len],
            fitness: None,
        }
    }

    /// Creates an unevaluated individual from an existing gene vector.
    pub fn from_genes(genes: Vec<f64>) -> Self {
        Self {
            chromosome: genes,
            fitness: None,
        }
    }

    /// Number of genes.
    pub fn len(&self) -> usize {
        self.chromosome.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chromosome.is_empty()
    }

    /// Returns gene `index`.
    pub fn get(&self, index: usize) -> Result<f64> {
        self.chromosome
            .get(index)
            .copied()
            .ok_or(EvolveError::IndexOutOfRange {
                index,
                len: self.chromosome.len(),
            })
    }

    /// Overwrites gene `index`.
    pub fn set(&mut self, index: usize, value: f64) -> Result<()> {
        let len = self.chromosome.len();
        let gene = self
            .chromosome
            .get_mut(index)
            .ok_or(EvolveError::IndexOutOfRange { index, len })?;
        *gene = value;
        Ok(())
    }

    /// Read-only view of the whole chromosome.
    pub fn genes(&self) -> &[f64] {
        &self.chromosome
    }

    /// Fitness from the last evaluation, if any.
    pub fn fitness(&self) -> Option<f64> {
        self.fitness
    }

    pub fn set_fitness(&mut self, fitness: f64) {
        self.fitness = Some(fitness);
    }

    /// Fitness for ranking purposes: unevaluated individuals rank last.
    pub(crate) fn cost(&self) -> f64 {
        self.fitness.unwrap_or(f64::INFINITY)
    }

    /// Returns an independently owned copy with identical genes and fitness.
    ///
    /// Breeding starts every trial from a deep copy of its target so the
    /// trial never aliases parent storage.
    pub fn deep_copy(&self) -> Self {
        self.clone()
    }
}

impl fmt::Display for Individual {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, gene) in self.chromosome.iter().enumerate() {
            if i > 0 {
                f.write_str(" ")?;
            }
            write!(f, "{gene}")?;
        }
        Ok(())
    }
}
