//! Differential Evolution as an [`Evolver`].

use super::config::{validate_crossover_prob, validate_diff_weight, DeConfig};
use crate::ec::evolver::{Evolver, EvolverCore};
use crate::ec::random::sample_distinct;
use crate::ec::{Individual, Population};
use crate::error::{EvolveError, Result};
use rand::Rng;
use tracing::Dispatch;

/// Classic DE/rand/1/bin with steady-state greedy replacement.
///
/// For every target `x_i` a trial starts as a copy of `x_i`; each gene `j`
/// is replaced by `x_r0[j] + F·(x_r1[j] − x_r2[j])` when `j` is the one
/// guaranteed crossover index or a uniform draw falls below `CR`. The trial
/// replaces `x_i` immediately if it has strictly lower fitness, so later
/// targets in the same generation already see the improvement.
///
/// # Examples
///
/// ```
/// use u_evolve::de::DifferentialEvolution;
/// use u_evolve::ec::Evolver;
///
/// let sphere = |g: &[f64]| g.iter().map(|x| x * x).sum::<f64>();
/// let mut de = DifferentialEvolution::with_seed(42);
/// de.evolve_from(20, &[-5.12; 2], &[5.12; 2], &sphere, 50, false).unwrap();
/// assert!(de.elite().unwrap().fitness().unwrap() < 1.0);
/// ```
#[derive(Debug)]
pub struct DifferentialEvolution<'a> {
    core: EvolverCore<'a>,
    diff_weight: f64,
    crossover_prob: f64,
    elite: Option<Individual>,
    elite_history: Vec<f64>,
}

impl<'a> DifferentialEvolution<'a> {
    /// Creates an evolver with default parameters, seeded from OS entropy.
    pub fn new() -> Self {
        Self::with_core(EvolverCore::new())
    }

    /// Creates an evolver with default parameters and a fixed seed.
    pub fn with_seed(seed: u64) -> Self {
        Self::with_core(EvolverCore::with_seed(seed))
    }

    /// Creates an evolver from a validated [`DeConfig`].
    pub fn from_config(config: &DeConfig) -> Result<Self> {
        config.validate()?;
        let core = match config.seed {
            Some(seed) => EvolverCore::with_seed(seed),
            None => EvolverCore::new(),
        };
        let mut de = Self::with_core(core);
        de.diff_weight = config.diff_weight;
        de.crossover_prob = config.crossover_prob;
        Ok(de)
    }

    fn with_core(core: EvolverCore<'a>) -> Self {
        let defaults = DeConfig::default();
        Self {
            core,
            diff_weight: defaults.diff_weight,
            crossover_prob: defaults.crossover_prob,
            elite: None,
            elite_history: Vec::new(),
        }
    }

    /// Routes diagnostics to `dispatch` instead of discarding them.
    pub fn with_dispatch(mut self, dispatch: Dispatch) -> Self {
        self.core.set_dispatch(dispatch);
        self
    }

    pub fn diff_weight(&self) -> f64 {
        self.diff_weight
    }

    pub fn set_diff_weight(&mut self, f: f64) -> Result<()> {
        validate_diff_weight(f)?;
        self.diff_weight = f;
        Ok(())
    }

    pub fn crossover_prob(&self) -> f64 {
        self.crossover_prob
    }

    pub fn set_crossover_prob(&mut self, cr: f64) -> Result<()> {
        validate_crossover_prob(cr)?;
        self.crossover_prob = cr;
        Ok(())
    }

    /// Best individual recorded by the last `save_elite`.
    pub fn elite(&self) -> Option<&Individual> {
        self.elite.as_ref()
    }

    /// Elite fitness of the initial population followed by one entry per
    /// completed generation.
    pub fn elite_history(&self) -> &[f64] {
        &self.elite_history
    }

    /// Draws `count` distinct integers from `[min, max)` with this
    /// evolver's random source.
    pub fn rand_integer_without_replacement(
        &mut self,
        min: usize,
        max: usize,
        count: usize,
    ) -> Result<Vec<usize>> {
        sample_distinct(self.core.rng_mut(), min, max, count)
    }

    /// Which genes of the next trial come from the mutation vector.
    fn crossover_mask(&mut self, dim: usize) -> Vec<bool> {
        let cr = self.crossover_prob;
        let rng = self.core.rng_mut();
        let forced = rng.random_range(0..dim);
        (0..dim)
            .map(|j| j == forced || rng.random_range(0.0..1.0) < cr)
            .collect()
    }
}

impl Default for DifferentialEvolution<'_> {
    fn default() -> Self {
        Self::new()
    }
}

impl<'a> Evolver<'a> for DifferentialEvolution<'a> {
    fn core(&self) -> &EvolverCore<'a> {
        &self.core
    }

    fn core_mut(&mut self) -> &mut EvolverCore<'a> {
        &mut self.core
    }

    fn min_population_size(&self) -> usize {
        3
    }

    /// Fills the population uniformly inside the box, one draw per gene.
    fn populate(&mut self, population_size: usize) -> Result<()> {
        let dim = self.core.dimension();
        let mut population = Population::new(population_size)?;
        for i in 0..population_size {
            let mut ind = Individual::new(dim);
            for k in 0..dim {
                let lo = self.core.lower_bound()[k];
                let hi = self.core.upper_bound()[k];
                let gene = self.core.rand_uniform(lo, hi)?;
                ind.set(k, gene)?;
            }
            population.set(i, ind)?;
        }
        self.core.set_population(population);
        self.elite = None;
        self.elite_history.clear();
        Ok(())
    }

    /// Selection happens inside [`breed`](Evolver::breed).
    fn select(&mut self) -> Result<()> {
        Ok(())
    }

    fn breed(&mut self) -> Result<()> {
        let (pop_size, dim) = match self.core.population() {
            Some(pop) => match pop.get(0)? {
                Some(first) => (pop.len(), first.len()),
                None => return Err(EvolveError::runtime("empty population")),
            },
            None => return Err(EvolveError::runtime("empty population")),
        };
        if dim == 0 {
            return Err(EvolveError::runtime("individuals have no genes"));
        }

        let f = self.diff_weight;
        for i in 0..pop_size {
            let donors = self.rand_integer_without_replacement(0, pop_size, 3)?;
            let mask = self.crossover_mask(dim);

            let (mut trial, target_cost) = {
                let pop = self
                    .core
                    .population()
                    .ok_or_else(|| EvolveError::runtime("empty population"))?;
                let target = pop.member(i)?;
                let x0 = pop.member(donors[0])?;
                let x1 = pop.member(donors[1])?;
                let x2 = pop.member(donors[2])?;

                let mut trial = target.deep_copy();
                for (j, &mutate) in mask.iter().enumerate() {
                    if mutate {
                        trial.set(j, x0.get(j)? + f * (x1.get(j)? - x2.get(j)?))?;
                    }
                }
                (trial, target.cost())
            };

            self.core.evaluate(&mut trial)?;
            if trial.cost() < target_cost {
                if let Some(pop) = self.core.population_mut() {
                    pop.set(i, trial)?;
                }
            }
        }
        Ok(())
    }

    fn check_stop_criteria(&self) -> bool {
        self.core.generation() >= self.core.max_generation()
    }

    /// Copies the lowest-fitness member; the first one wins ties.
    fn save_elite(&mut self) -> Result<()> {
        let pop = self
            .core
            .population()
            .ok_or_else(|| EvolveError::runtime("empty population"))?;

        let mut best = pop.member(0)?;
        for i in 1..pop.len() {
            let candidate = pop.member(i)?;
            if candidate.cost() < best.cost() {
                best = candidate;
            }
        }

        let elite = best.deep_copy();
        let cost = elite.cost();
        tracing::dispatcher::with_default(self.core.dispatch(), || {
            tracing::debug!(generation = self.core.generation(), elite_fitness = cost, "elite saved");
        });
        self.elite_history.push(cost);
        self.elite = Some(elite);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::benchmarks::Sphere;
    use crate::ec::FitnessFunction;
    use proptest::prelude::*;
    use rand::Rng;

    fn sphere(genes: &[f64]) -> f64 {
        genes.iter().map(|g| g * g).sum()
    }

    #[test]
    fn test_defaults() {
        let de = DifferentialEvolution::with_seed(0);
        assert!((de.diff_weight() - 0.7).abs() < 1e-12);
        assert!((de.crossover_prob() - 0.2).abs() < 1e-12);
        assert!(de.elite().is_none());
        assert!(de.elite_history().is_empty());
    }

    #[test]
    fn test_parameter_setters_validate() {
        let mut de = DifferentialEvolution::with_seed(0);
        assert!(de.set_diff_weight(2.1).is_err());
        assert!(de.set_crossover_prob(1.5).is_err());
        de.set_diff_weight(1.2).unwrap();
        de.set_crossover_prob(0.9).unwrap();
        assert!((de.diff_weight() - 1.2).abs() < 1e-12);
        assert!((de.crossover_prob() - 0.9).abs() < 1e-12);
    }

    #[test]
    fn test_from_config() {
        let config = DeConfig::default()
            .with_diff_weight(0.5)
            .with_crossover_prob(0.8)
            .with_seed(3);
        let de = DifferentialEvolution::from_config(&config).unwrap();
        assert!((de.diff_weight() - 0.5).abs() < 1e-12);
        assert!((de.crossover_prob() - 0.8).abs() < 1e-12);

        let bad = DeConfig::default().with_population_size(1);
        assert!(DifferentialEvolution::from_config(&bad).is_err());
    }

    // ---- Guards ----

    #[test]
    fn test_breed_on_uninitialized_population() {
        let mut de = DifferentialEvolution::with_seed(0);
        assert!(matches!(de.breed(), Err(EvolveError::Runtime(_))));
    }

    #[test]
    fn test_breed_with_unset_first_slot() {
        let mut de = DifferentialEvolution::with_seed(0);
        de.set_population(Population::new(5).unwrap());
        assert!(matches!(de.breed(), Err(EvolveError::Runtime(_))));
    }

    #[test]
    fn test_initialize_rejects_bad_bounds() {
        let f = sphere;
        let mut de = DifferentialEvolution::with_seed(0);
        assert!(matches!(
            de.initialize(10, &[0.0, 0.0], &[1.0], &f),
            Err(EvolveError::InvalidArgument(_))
        ));
        assert!(matches!(
            de.initialize(10, &[0.0, 2.0], &[1.0, 1.0], &f),
            Err(EvolveError::InvalidArgument(_))
        ));
        assert!(de.population().is_none());
    }

    #[test]
    fn test_initialize_requires_three_members() {
        let f = sphere;
        let mut de = DifferentialEvolution::with_seed(0);
        assert!(de.initialize(2, &[0.0], &[1.0], &f).is_err());
        assert!(de.initialize(3, &[0.0], &[1.0], &f).is_ok());
    }

    #[test]
    fn test_initial_population_shape() {
        let f = sphere;
        let mut de = DifferentialEvolution::with_seed(11);
        de.initialize(12, &[-1.0, 0.0, 10.0], &[1.0, 0.5, 10.0], &f)
            .unwrap();
        let pop = de.population().unwrap();
        assert_eq!(pop.len(), 12);
        assert!(pop.is_filled());
        for ind in pop.iter() {
            assert_eq!(ind.len(), 3);
            assert!(ind.fitness().is_none());
            // degenerate interval pins the gene
            assert_eq!(ind.get(2).unwrap(), 10.0);
        }
    }

    #[test]
    fn test_rand_integer_without_replacement() {
        let mut de = DifferentialEvolution::with_seed(9);
        for _ in 0..100 {
            let picks = de.rand_integer_without_replacement(0, 4, 3).unwrap();
            assert_eq!(picks.len(), 3);
            assert!(picks.iter().all(|&p| p < 4));
            assert!(picks[0] != picks[1] && picks[0] != picks[2] && picks[1] != picks[2]);
        }
        assert!(de.rand_integer_without_replacement(0, 2, 3).is_err());
    }

    // ---- Elite tracking ----

    #[test]
    fn test_elite_history_length_and_termination() {
        let f = sphere;
        let mut de = DifferentialEvolution::with_seed(5);
        de.evolve_from(10, &[-2.0; 3], &[2.0; 3], &f, 7, false).unwrap();
        assert_eq!(de.generation(), 7);
        assert!(de.check_stop_criteria());
        assert_eq!(de.elite_history().len(), 8);
    }

    #[test]
    fn test_zero_generations_records_initial_elite() {
        let f = sphere;
        let mut de = DifferentialEvolution::with_seed(5);
        de.evolve_from(10, &[-2.0; 3], &[2.0; 3], &f, 0, false).unwrap();
        assert_eq!(de.generation(), 0);
        let best = de
            .population()
            .unwrap()
            .iter()
            .map(|i| i.fitness().unwrap())
            .fold(f64::INFINITY, f64::min);
        assert_eq!(de.elite().unwrap().fitness(), Some(best));
    }

    #[test]
    fn test_elite_is_member_with_min_fitness() {
        let f = sphere;
        let mut de = DifferentialEvolution::with_seed(21);
        de.evolve_from(15, &[-3.0; 4], &[3.0; 4], &f, 10, false).unwrap();
        let elite = de.elite().unwrap();
        let pop = de.population().unwrap();
        assert!(pop.iter().all(|i| elite.fitness().unwrap() <= i.fitness().unwrap()));
        assert!(pop.iter().any(|i| i == elite));
    }

    #[test]
    fn test_elite_survives_later_generations() {
        let f = sphere;
        let mut de = DifferentialEvolution::with_seed(8);
        de.evolve_from(10, &[-1.0; 2], &[1.0; 2], &f, 1, false).unwrap();
        let snapshot = de.elite().unwrap().clone();
        assert_eq!(de.elite_history().len(), 2);
        de.evolve(20, false).unwrap();
        assert_eq!(de.generation(), 20);
        assert_eq!(de.elite_history().len(), 21);
        assert!(de.elite().unwrap().fitness().unwrap() <= snapshot.fitness().unwrap());
        assert_eq!(snapshot.fitness(), Some(f(snapshot.genes())));
    }

    #[test]
    fn test_elite_fitness_non_increasing() {
        let f = sphere;
        let mut de = DifferentialEvolution::with_seed(42);
        de.evolve_from(20, &[-5.0; 5], &[5.0; 5], &f, 60, false).unwrap();
        for w in de.elite_history().windows(2) {
            assert!(w[1] <= w[0], "elite got worse: {} -> {}", w[0], w[1]);
        }
    }

    #[test]
    fn test_members_never_get_worse() {
        let f = sphere;
        let mut de = DifferentialEvolution::with_seed(4);
        de.initialize(10, &[-1.0; 2], &[1.0; 2], &f).unwrap();
        de.evolve(0, false).unwrap();
        let before: Vec<f64> = de.population().unwrap().iter().map(|i| i.cost()).collect();
        de.breed().unwrap();
        let after: Vec<f64> = de.population().unwrap().iter().map(|i| i.cost()).collect();
        for (b, a) in before.iter().zip(&after) {
            assert!(a <= b);
        }
    }

    #[test]
    fn test_zero_crossover_prob_changes_one_gene() {
        // With CR = 0 only the guaranteed index is mutated, so any accepted
        // trial differs from its parent in exactly one gene.
        let f = sphere;
        let mut de = DifferentialEvolution::with_seed(17);
        de.set_crossover_prob(0.0).unwrap();
        de.initialize(8, &[-4.0; 6], &[4.0; 6], &f).unwrap();
        de.evolve(0, false).unwrap();
        let before: Vec<Individual> = de.population().unwrap().iter().cloned().collect();
        de.breed().unwrap();
        let after: Vec<Individual> = de.population().unwrap().iter().cloned().collect();
        for (b, a) in before.iter().zip(&after) {
            let changed = b
                .genes()
                .iter()
                .zip(a.genes())
                .filter(|(x, y)| x != y)
                .count();
            assert!(changed <= 1, "{changed} genes changed");
        }
    }

    // ---- Reproducibility and convergence ----

    #[test]
    fn test_same_seed_same_history() {
        let f = sphere;
        let run = |seed| {
            let mut de = DifferentialEvolution::with_seed(seed);
            de.evolve_from(20, &[-5.12; 2], &[5.12; 2], &f, 30, false)
                .unwrap();
            de.elite_history().to_vec()
        };
        assert_eq!(run(99), run(99));
        assert_ne!(run(99), run(100));
    }

    #[test]
    fn test_sphere_2d_scenario() {
        let objective = Sphere::new(2);
        let lower = [-5.12; 2];
        let upper = [5.12; 2];
        let mut de = DifferentialEvolution::with_seed(2024);
        de.initialize(20, &lower, &upper, &objective).unwrap();

        let initial_best = de
            .population()
            .unwrap()
            .iter()
            .map(|ind| ind.genes().iter().map(|g| g * g).sum::<f64>())
            .fold(f64::INFINITY, f64::min);

        de.evolve(50, false).unwrap();

        let history = de.elite_history();
        assert_eq!(history.len(), 51);
        assert_eq!(history[0], initial_best);

        let final_best = de.elite().unwrap().fitness().unwrap();
        assert_eq!(final_best, history[50]);
        assert!(final_best <= initial_best);
        assert!(
            final_best < initial_best * 0.1 || final_best < 1e-6,
            "expected convergence: initial {initial_best}, final {final_best}"
        );
        assert_eq!(objective.evaluate(de.elite().unwrap()).unwrap(), final_best);
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(32))]

        #[test]
        fn prop_initial_genes_inside_box(
            seed in any::<u64>(),
            pairs in prop::collection::vec((-50.0f64..50.0, 0.0f64..20.0), 1..6),
            pop_size in 3usize..25,
        ) {
            let lower: Vec<f64> = pairs.iter().map(|(lo, _)| *lo).collect();
            let upper: Vec<f64> = pairs.iter().map(|(lo, w)| lo + w).collect();
            let f = sphere;
            let mut de = DifferentialEvolution::with_seed(seed);
            de.initialize(pop_size, &lower, &upper, &f).unwrap();

            let pop = de.population().unwrap();
            prop_assert_eq!(pop.len(), pop_size);
            for ind in pop.iter() {
                for (k, &g) in ind.genes().iter().enumerate() {
                    prop_assert!(lower[k] <= g && g <= upper[k]);
                }
            }
        }
    }
}
