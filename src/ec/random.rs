//! Random-number helpers shared by evolvers.

use crate::error::{EvolveError, Result};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Creates a deterministic generator from `seed`.
pub fn create_rng(seed: u64) -> StdRng {
    StdRng::seed_from_u64(seed)
}

/// Creates a generator seeded from operating-system entropy.
pub fn entropy_rng() -> StdRng {
    StdRng::from_os_rng()
}

/// Draws `count` pairwise-distinct integers from `[min, max)`.
///
/// Rejection sampling: each draw is retried until it differs from every
/// value accepted so far. Expected cost grows as `count` approaches the
/// range width, so this is meant for small `count` (DE draws three donors).
///
/// Fails with [`EvolveError::InvalidArgument`] when `count` exceeds the
/// number of integers available in `[min, max)`.
///
/// # Examples
///
/// ```
/// use u_evolve::ec::random::{create_rng, sample_distinct};
///
/// let mut rng = create_rng(7);
/// let picks = sample_distinct(&mut rng, 0, 10, 3).unwrap();
/// assert_eq!(picks.len(), 3);
/// assert!(picks[0] != picks[1] && picks[1] != picks[2] && picks[0] != picks[2]);
/// ```
pub fn sample_distinct<R: Rng>(rng: &mut R, min: usize, max: usize, count: usize) -> Result<Vec<usize>> {
    let width = max.saturating_sub(min);
    if count > width {
        return Err(EvolveError::invalid(format!(
            "cannot draw {count} distinct integers from [{min}, {max})"
        )));
    }

    let mut picked = Vec::with_capacity(count);
    while picked.len() < count {
        let candidate = rng.random_range(min..max);
        if !picked.contains(&candidate) {
            picked.push(candidate);
        }
    }
    Ok(picked)
}
