//! Evolutionary computation framework.
//!
//! The building blocks shared by population-based optimizers:
//!
//! - [`Individual`]: a real-valued chromosome with its fitness
//! - [`Population`]: fixed-size slots exclusively owning individuals
//! - [`FitnessFunction`]: the objective, lower is better
//! - [`Evolver`] / [`EvolverCore`]: the generational loop, written once
//!   against the `breed`/`select`/`save_elite`/`check_stop_criteria` hooks
//!
//! # References
//!
//! - Eiben & Smith (2015), *Introduction to Evolutionary Computing*

pub mod evolver;
mod fitness;
mod individual;
mod population;
pub mod random;

pub use evolver::{validate_bounds, Evolver, EvolverCore, Phase};
pub use fitness::FitnessFunction;
pub use individual::Individual;
pub use population::Population;
