//! Differential Evolution (DE).
//!
//! The classic DE/rand/1/bin scheme over real-valued vectors in a box:
//! each target is challenged by a trial built from three random members
//! (`x_r0 + F·(x_r1 − x_r2)`), mixed with the target by binomial crossover
//! and kept only if strictly better.
//!
//! # Key Types
//!
//! - [`DifferentialEvolution`]: the [`Evolver`](crate::ec::Evolver)
//!   implementation with elite tracking
//! - [`DeConfig`]: parameters, presets and validation
//! - [`DeRunner`] / [`DeResult`]: one-call runs from a config
//!
//! # References
//!
//! - Storn & Price (1997), "Differential Evolution – A Simple and Efficient
//!   Heuristic for Global Optimization over Continuous Spaces"
//! - Price, Storn & Lampinen (2005), *Differential Evolution: A Practical
//!   Approach to Global Optimization*

mod config;
mod evolver;
mod runner;

pub use config::{DeConfig, DIFF_WEIGHT_RANGE};
pub use evolver::DifferentialEvolution;
pub use runner::{DeResult, DeRunner};
