use clap::Parser;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use rayon::prelude::*;
use std::fs::File;
use std::path::{Path, PathBuf};
use std::process;
use std::sync::Mutex;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use commute_sim::city::{load_map, CityGrid};
use commute_sim::simulation::{
    build_report, export_report, generate_summary, run_simulation, SimulationConfig,
    SimulationError, WorkplacePolicy,
};

#[derive(Parser, Debug)]
#[command(name = "commute_sim")]
#[command(about = "Simulate how workplace attendance policies affect commuters' wealth and burnout")]
struct Args {
    /// Path to the JSON run configuration
    #[arg(short, long, default_value = "config/commute.json")]
    config: PathBuf,

    /// Random seed (config seed, then a random seed, if not specified)
    #[arg(short, long)]
    seed: Option<u64>,

    /// Policy to run; repeat for several (default: fixed, free and flex)
    #[arg(short, long = "policy")]
    policies: Vec<WorkplacePolicy>,

    /// MovingAI .map file for walk costs (random walk lengths if not specified)
    #[arg(short, long)]
    map: Option<PathBuf>,

    /// Run log file, truncated on each run
    #[arg(long, default_value = "simulation.log")]
    log_file: PathBuf,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info")]
    log_level: Level,

    /// Directory receiving <policy>/report.json
    #[arg(long, default_value = "results")]
    results_dir: PathBuf,

    /// Skip writing JSON reports
    #[arg(long)]
    no_export: bool,
}

fn init_logging(path: &Path, level: Level) -> Result<(), Box<dyn std::error::Error>> {
    let file = File::create(path)?;
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_ansi(false)
        .with_writer(Mutex::new(file))
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;
    Ok(())
}

fn run(args: &Args) -> Result<(), SimulationError> {
    let config = SimulationConfig::load(&args.config)?;

    let seed = args
        .seed
        .or(config.simulation.seed)
        .unwrap_or_else(rand::random);
    let policies: Vec<WorkplacePolicy> = if args.policies.is_empty() {
        WorkplacePolicy::ALL.to_vec()
    } else {
        args.policies.clone()
    };

    println!("Running commute simulation with seed: {}", seed);
    println!(
        "{} agents, {} ticks, day length {}",
        config.simulation.num_agents, config.simulation.max_ticks, config.simulation.day_length
    );

    let grid: Option<CityGrid> = match &args.map {
        Some(path) => {
            println!("Loading map {}...", path.display());
            let grid = load_map(path)?;
            let (free, blocked) = grid.cell_counts();
            println!(
                "Map {}x{}: {} free cells, {} blocked",
                grid.width(),
                grid.height(),
                free,
                blocked
            );
            Some(grid)
        }
        None => {
            println!("No map given, walk lengths are drawn at random");
            None
        }
    };

    // Every policy is an independent run with its own RNG
    let states = policies
        .par_iter()
        .map(|&policy| run_simulation(&config, policy, grid.as_ref(), seed))
        .collect::<Result<Vec<_>, _>>()?;

    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    for state in &states {
        let report = build_report(state, &mut rng);
        println!("\n{}", generate_summary(&report));

        if !args.no_export {
            match export_report(&report, &args.results_dir) {
                Ok(path) => println!("Report written to {}", path.display()),
                Err(e) => eprintln!("Warning: failed to export {} report: {}", report.policy, e),
            }
        }
    }

    info!("Finished {} policy runs", states.len());
    Ok(())
}

fn main() {
    let args = Args::parse();

    if let Err(e) = init_logging(&args.log_file, args.log_level) {
        eprintln!("Warning: could not open log file {}: {}", args.log_file.display(), e);
    }

    if let Err(e) = run(&args) {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}
