use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::EnvFilter;

use ecosim::{
    scenario::{Scenario, ScenarioLoader},
    web::{self, WebServerConfig},
    AgentKind, Simulation,
};

#[derive(Debug, Parser)]
#[command(author, version, about = "Predator/prey grid ecosystem")]
struct Cli {
    /// Path to a scenario YAML file (built-in 50x50 meadow when omitted)
    #[arg(long)]
    scenario: Option<PathBuf>,

    /// Override the scenario seed
    #[arg(long)]
    seed: Option<u64>,

    /// Override the time step in seconds
    #[arg(long)]
    dt: Option<f32>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Run headless for a number of ticks (default)
    Run {
        /// Override tick count (uses scenario default when omitted)
        #[arg(long)]
        ticks: Option<u64>,
    },
    /// Serve the simulation over HTTP for an external renderer
    Serve {
        #[arg(long, default_value = "127.0.0.1")]
        host: String,
        #[arg(long, default_value_t = 8080)]
        port: u16,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let mut scenario = match &cli.scenario {
        Some(path) => ScenarioLoader::new(".").load(path)?,
        None => Scenario::default(),
    };
    if let Some(seed) = cli.seed {
        scenario.seed = seed;
    }
    if let Some(dt) = cli.dt {
        scenario.dt_seconds = dt;
    }
    scenario.validate()?;
    init_tracing(&scenario.logging.level);

    match cli.command.unwrap_or(Command::Run { ticks: None }) {
        Command::Run { ticks } => run_headless(scenario, ticks),
        Command::Serve { host, port } => {
            let runtime = tokio::runtime::Runtime::new().context("Failed to start runtime")?;
            runtime.block_on(web::run(WebServerConfig {
                scenario,
                host,
                port,
            }))
        }
    }
}

fn init_tracing(default_level: &str) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}

fn run_headless(scenario: Scenario, ticks: Option<u64>) -> Result<()> {
    let ticks = scenario.ticks(ticks);
    let interval = scenario.logging.census_interval_ticks;
    let mut simulation = Simulation::new(scenario)?;

    simulation.run_with_hook(ticks, |summary, _| {
        if interval > 0 && summary.tick % interval == 0 {
            let census = summary.census;
            info!(
                tick = summary.tick,
                elapsed_s = summary.elapsed,
                prey = census.prey_alive,
                predators = census.predators_alive,
                food = census.food_cells,
                eaten = census.food_eaten,
                "census"
            );
        }
    })?;

    let population = simulation.population();
    info!(
        "Scenario '{}' completed for {} ticks. Prey alive: {}, predators alive: {}",
        simulation.scenario().name,
        ticks,
        population.alive_count(AgentKind::Prey),
        population.alive_count(AgentKind::Predator)
    );
    Ok(())
}
