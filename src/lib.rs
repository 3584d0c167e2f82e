//! Population-based black-box optimization over real-valued vectors.
//!
//! Provides:
//!
//! - **Evolutionary framework** ([`ec`]): individuals, populations, the
//!   fitness-function contract and an [`Evolver`](ec::Evolver) trait that
//!   runs the generational loop once against pluggable hooks.
//! - **Differential Evolution** ([`de`]): classic DE/rand/1/bin with
//!   steady-state greedy replacement and elite tracking.
//! - **Benchmarks** ([`benchmarks`]): Sphere, Rosenbrock and Rastrigin with
//!   their conventional search domains.
//! - **Array records** ([`matnd`]): a binary format for N-dimensional
//!   numeric arrays, used to persist populations.
//!
//! All optimizers **minimize**. Runs are single-threaded and reproducible
//! given a seed.
//!
//! # Diagnostics
//!
//! Evolvers emit [`tracing`] events through an explicit
//! [`tracing::Dispatch`] handle that discards everything unless one is
//! supplied. The library never installs a global subscriber.

pub mod benchmarks;
pub mod de;
pub mod ec;
pub mod error;
pub mod matnd;

pub use error::{EvolveError, Result};
