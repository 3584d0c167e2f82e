//! Runs Differential Evolution on a benchmark function and prints the elite.

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::Dispatch;
use tracing_subscriber::EnvFilter;
use u_evolve::benchmarks::{Benchmark, Rastrigin, Rosenbrock, Sphere};
use u_evolve::de::{DeConfig, DifferentialEvolution};
use u_evolve::ec::{Evolver, Population};
use u_evolve::matnd::MatNd;

const RULE: &str =
    "------------------------------------------------------------------------";

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Function {
    Sphere,
    Rosenbrock,
    Rastrigin,
}

#[derive(Parser)]
#[command(name = "demo-de")]
#[command(about = "Minimize a benchmark function with Differential Evolution")]
#[command(version)]
struct Cli {
    /// Objective to minimize
    #[arg(short, long, value_enum, default_value = "sphere")]
    function: Function,

    /// Problem dimension
    #[arg(short, long, default_value_t = 10)]
    dimension: usize,

    /// Number of individuals
    #[arg(short, long, default_value_t = 100)]
    population_size: usize,

    /// Generation budget
    #[arg(short = 'g', long, default_value_t = 500)]
    max_generations: usize,

    /// Differential weight F
    #[arg(long, default_value_t = 0.7)]
    diff_weight: f64,

    /// Crossover probability CR
    #[arg(long, default_value_t = 0.2)]
    crossover_prob: f64,

    /// Seed for a reproducible run
    #[arg(long)]
    seed: Option<u64>,

    /// Log every generation
    #[arg(short, long)]
    verbose: bool,

    /// Write the final population as a 2-D F64 array record
    #[arg(long)]
    save_population: Option<PathBuf>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "info" } else { "warn" };
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .finish();
    let dispatch = Dispatch::new(subscriber);

    match cli.function {
        Function::Sphere => run(Sphere::new(cli.dimension), &cli, dispatch),
        Function::Rosenbrock => run(Rosenbrock::new(cli.dimension), &cli, dispatch),
        Function::Rastrigin => run(Rastrigin::new(cli.dimension), &cli, dispatch),
    }
}

fn run<B: Benchmark>(objective: B, cli: &Cli, dispatch: Dispatch) -> Result<()> {
    let lower = objective.lower_bound();
    let upper = objective.upper_bound();

    let mut config = DeConfig::default()
        .with_population_size(cli.population_size)
        .with_max_generations(cli.max_generations)
        .with_verbose(cli.verbose);
    config.diff_weight = cli.diff_weight;
    config.crossover_prob = cli.crossover_prob;
    config.seed = cli.seed;

    let mut de = DifferentialEvolution::from_config(&config)
        .context("invalid DE parameters")?
        .with_dispatch(dispatch);

    tracing::dispatcher::with_default(de.core().dispatch(), || {
        tracing::info!(
            function = objective.name(),
            dimension = objective.problem_dim(),
            population = config.population_size,
            generations = config.max_generations,
            "starting differential evolution"
        );
    });

    de.evolve_from(
        config.population_size,
        &lower,
        &upper,
        &objective,
        config.max_generations,
        config.verbose,
    )
    .with_context(|| format!("evolution on {} failed", objective.name()))?;

    let elite = de.elite().context("evolution recorded no elite")?;
    println!("{RULE}");
    println!("Best individual: ");
    println!("{elite}");
    println!("{RULE}");
    match elite.fitness() {
        Some(fitness) => println!("Best fitness: {fitness}"),
        None => println!("Best fitness: <unevaluated>"),
    }
    println!("{RULE}");

    if let Some(path) = &cli.save_population {
        let population = de.population().context("no population to save")?;
        save_population(population, path)
            .with_context(|| format!("failed to write population to {}", path.display()))?;
        println!("Population written to {}", path.display());
    }

    Ok(())
}

fn save_population(population: &Population, path: &Path) -> Result<()> {
    let rows = population.len();
    let cols = population.iter().next().map_or(0, |ind| ind.len());
    let values: Vec<f64> = population
        .iter()
        .flat_map(|ind| ind.genes().iter().copied())
        .collect();
    let mat = MatNd::from_f64(&[rows, cols], &values)?;

    let mut writer = BufWriter::new(File::create(path)?);
    mat.write_to(&mut writer)?;
    writer.flush()?;
    Ok(())
}
