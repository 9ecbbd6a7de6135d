use anyhow::{bail, Context, Result};
use clap::Parser;
use palace_engine::{EngineConfig, GameRng, HazardRate, Strategy};
use palace_simulator::{run, GameChoice, Plan};
use rand::RngCore;
use std::path::PathBuf;
use std::str::FromStr;
use tracing::{info, Level};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Seed for a reproducible run (overrides the config file).
    #[arg(long)]
    seed: Option<u64>,

    /// Rounds per game (per bet on the wheel).
    #[arg(long, default_value_t = 10_000)]
    rounds: u64,

    #[arg(long, value_enum, default_value_t = GameChoice::All)]
    game: GameChoice,

    /// Win estimator behind blackjack decisions: hazard, normal or population.
    #[arg(long, default_value = "hazard")]
    strategy: Strategy,

    /// Crash cash-out multiplier (defaults to the optimal stop point).
    #[arg(long)]
    cash_out: Option<f64>,

    /// Crash hazard rate (overrides the config file).
    #[arg(long)]
    hazard_rate: Option<f64>,

    /// Decks in the blackjack shoe (overrides the config file).
    #[arg(long)]
    decks: Option<u8>,

    /// Path to a YAML engine configuration.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Print the report as JSON instead of CSV.
    #[arg(long)]
    json: bool,

    #[arg(long, default_value = "info")]
    log_level: String,
}

fn init_tracing(level: Level) {
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .init();
}

fn build_config(args: &Args) -> Result<EngineConfig> {
    let mut config = match &args.config {
        Some(path) => {
            let contents = std::fs::read_to_string(path)
                .with_context(|| format!("Could not read config file {}", path.display()))?;
            serde_yaml::from_str(&contents).context("Could not parse config file")?
        }
        None => EngineConfig::default(),
    };
    if let Some(seed) = args.seed {
        config.seed = Some(seed);
    }
    if let Some(rate) = args.hazard_rate {
        config.hazard_rate = HazardRate::new(rate).context("Invalid hazard_rate")?;
    }
    if let Some(decks) = args.decks {
        config.decks = decks;
    }
    config.validate().context("Invalid engine config")?;
    Ok(config)
}

fn build_plan(args: &Args) -> Result<Plan> {
    if let Some(target) = args.cash_out {
        if !target.is_finite() || target < 1.0 {
            bail!("cash_out must be a multiplier >= 1.0 (got {target})");
        }
    }
    Ok(Plan {
        rounds: args.rounds,
        games: args.game,
        strategy: args.strategy,
        cash_out: args.cash_out,
    })
}

fn main() -> Result<()> {
    let args = Args::parse();
    let level = Level::from_str(&args.log_level).context("Invalid log level")?;
    init_tracing(level);

    let mut config = build_config(&args)?;
    let plan = build_plan(&args)?;
    // Always record the seed so a run can be replayed.
    let seed = config
        .seed
        .unwrap_or_else(|| GameRng::from_entropy().next_u64());
    config.seed = Some(seed);
    info!(
        seed,
        rounds = plan.rounds,
        game = ?plan.games,
        strategy = %plan.strategy,
        "starting simulation"
    );

    let report = run(&config, &plan).context("Simulation failed")?;
    if args.json {
        println!(
            "{}",
            serde_json::to_string_pretty(&report).context("Could not encode report")?
        );
    } else {
        print!("{}", report.to_csv());
    }
    Ok(())
}
