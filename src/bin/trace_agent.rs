//! Debug script to print one agent's needs and choices tick by tick

use clap::Parser;
use commute_sim::city::{load_map, CityGrid, PathCostSource};
use commute_sim::simulation::activity_log::ActivityLog;
use commute_sim::simulation::employees::{DeliberationEngine, Need, TickOutcome};
use commute_sim::simulation::{setup_agents, SimTick, SimulationConfig, WorkplacePolicy};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use std::error::Error;
use std::path::PathBuf;
use std::process;

#[derive(Parser, Debug)]
#[command(name = "trace_agent")]
#[command(about = "Print one agent's needs and choices tick by tick")]
struct Args {
    /// Path to the JSON run configuration
    #[arg(short, long, default_value = "config/commute.json")]
    config: PathBuf,

    /// Policy to run the agent under
    #[arg(short, long, default_value = "fixed")]
    policy: WorkplacePolicy,

    /// Index of the agent to trace
    #[arg(short, long, default_value_t = 0)]
    agent: usize,

    /// Random seed (config seed, then 12345, if not specified)
    #[arg(short, long)]
    seed: Option<u64>,

    /// MovingAI .map file for walk costs (random walk lengths if not specified)
    #[arg(short, long)]
    map: Option<PathBuf>,
}

fn run(args: &Args) -> Result<(), Box<dyn Error>> {
    let config = SimulationConfig::load(&args.config)?;
    let seed = args.seed.or(config.simulation.seed).unwrap_or(12345);

    let grid: Option<CityGrid> = match &args.map {
        Some(path) => Some(load_map(path)?),
        None => None,
    };

    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let mut employees = setup_agents(&config, args.policy, &mut rng)?;
    let agent = args.agent;
    if agent >= employees.len() {
        return Err(format!("agent {} out of range ({} agents)", agent, employees.len()).into());
    }

    if let Some(grid) = &grid {
        let e = &employees[agent];
        grid.check_endpoint(e.home_coord)?;
        grid.check_endpoint(e.workplace_coord)?;
        for row in grid.to_rows() {
            println!("{}", row);
        }
        println!();
    }

    let params = &config.params;
    let day_length = config.simulation.day_length;
    let paths = grid.as_ref().map(|g| g as &dyn PathCostSource);
    let engine = DeliberationEngine::new(params, day_length, paths);
    let mut log = ActivityLog::new();

    {
        let e = &employees[agent];
        println!(
            "{} | home {} {} -> {} {} ({}) | tolerance {} | seed {}",
            e.name, e.home, e.home_coord, e.workplace, e.workplace_coord, args.policy,
            e.social_tolerance, seed
        );
    }
    println!(
        "{:>6} {:>4} {:<10} {:<16} {:>7} {:>6} {:>6} {:>6} {:>6} {:>8}",
        "tick", "tod", "at", "action", "energy", "alone", "social", "money", "esteem", "wealth"
    );

    for t in 0..config.simulation.max_ticks {
        let tick = SimTick(t);
        let mut traced = String::new();

        // Agents share the RNG stream, so step everyone to keep draws aligned
        for (i, e) in employees.iter_mut().enumerate() {
            let outcome = engine.step(e, tick, &mut rng, &mut log)?;
            if i == agent {
                traced = describe(&outcome);
            }
            e.decay_needs(&params.needs);
        }

        let e = &employees[agent];
        println!(
            "{:>6} {:>4} {:<10} {:<16} {:>7.2} {:>6.2} {:>6.2} {:>6.2} {:>6.2} {:>8.3}",
            t,
            tick.time_of_day(day_length),
            e.location.to_string(),
            traced,
            e.needs.level(Need::Energy),
            e.needs.level(Need::AloneTime),
            e.needs.level(Need::Socialization),
            e.needs.level(Need::FinancialSecurity),
            e.needs.level(Need::SelfEsteem),
            e.wealth
        );
    }

    println!("\n{} notable events", log.stats.total_events);
    for entry in log.entries_for(employees[agent].id).iter().rev() {
        println!("  {} [{}] {}", entry.tick, entry.category.label(), entry.message);
    }
    Ok(())
}

fn describe(outcome: &TickOutcome) -> String {
    match outcome {
        TickOutcome::Acted { action, .. } => action.to_string(),
        TickOutcome::BurnedOut { action, kind } => format!("{}!{}", action, kind),
        TickOutcome::Recovering { kind, ticks_remaining } => {
            format!("recover {} {}", kind, ticks_remaining)
        }
        TickOutcome::Idled => "idle".to_string(),
    }
}

fn main() {
    let args = Args::parse();
    if let Err(e) = run(&args) {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}
