//! Ore Dispatch - replay harness
//!
//! Runs the dispatch engine over a recorded scenario and prints the actions
//! chosen for every unit, turn by turn.

use std::path::PathBuf;

use clap::Parser;
use ore_dispatch::core::config::DispatchConfig;
use ore_dispatch::core::error::Result;
use ore_dispatch::dispatch::replay::{replay, Scenario};
use ore_dispatch::dispatch::Dispatcher;

/// Replay a scenario through the dispatch engine
#[derive(Parser, Debug)]
#[command(name = "ore_dispatch")]
#[command(about = "Plan unit actions for every turn of a recorded scenario")]
struct Args {
    /// Scenario file (JSON list of turn snapshots)
    #[arg(long, default_value = "data/scenarios/opening.json")]
    scenario: PathBuf,

    /// Engine configuration (TOML)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Override the exploration seed
    #[arg(long)]
    seed: Option<u64>,

    /// Print each unit's role and activity next to its action
    #[arg(long, default_value_t = false)]
    verbose: bool,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => DispatchConfig::load(path)?,
        None => DispatchConfig::default(),
    };
    if let Some(seed) = args.seed {
        config.seed = seed;
    }

    let scenario = Scenario::load(&args.scenario)?;
    tracing::info!(
        "Replaying '{}' ({} turns) on a {}x{} grid",
        scenario.name,
        scenario.turns.len(),
        config.width,
        config.height
    );

    let mut dispatcher = Dispatcher::new(config)?;
    for plan in replay(&mut dispatcher, &scenario) {
        println!("--- Turn {} | carrier {:?} ---", plan.turn, plan.carrier);
        for decision in &plan.actions {
            if args.verbose {
                println!(
                    "{:>4} {:<12} {:<16} {}",
                    decision.unit.to_string(),
                    format!("{:?}", decision.role),
                    format!("{:?}", decision.activity),
                    decision.action
                );
            } else {
                println!("{}", decision.action);
            }
        }
    }

    let radar = dispatcher.radar();
    tracing::info!(
        "Done: {} radars deployed, {} ore known",
        radar.deployed(),
        dispatcher.knowledge().total_known_ore()
    );

    Ok(())
}
