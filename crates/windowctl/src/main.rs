use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{info, warn};
use window_core::util::parse_local_ts;
use window_core::{
    FrequencyGate, FrequencyPolicy, ManualClock, PlacementConfig, PlacementKey, WindowedSeenTracker,
};

mod script;

#[derive(Parser, Debug)]
#[command(name = "windowctl", version, about = "Placement frequency window tool")]
struct Cli {
    #[arg(long, default_value = "./placements.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    Placement {
        #[command(subcommand)]
        command: PlacementCommands,
    },
    /// Print the window bucket a placement falls in at a given time.
    Bucket {
        placement: String,
        #[arg(long)]
        at: String,
    },
    /// Replay a script of timestamped mark/check/show/clear lines.
    Simulate {
        script: PathBuf,
        #[arg(long)]
        json: bool,
    },
}

#[derive(Subcommand, Debug)]
enum PlacementCommands {
    Add {
        placement: String,
        #[command(flatten)]
        policy: PolicyArgs,
    },
    Remove {
        placement: String,
    },
    List,
}

#[derive(Args, Debug)]
#[group(required = true, multiple = false)]
struct PolicyArgs {
    /// Show at most once per fixed window of this many minutes.
    #[arg(long)]
    window_minutes: Option<u32>,
    /// Insert after every N feed items.
    #[arg(long)]
    every: Option<u32>,
}

impl PolicyArgs {
    fn policy(&self) -> Option<FrequencyPolicy> {
        match (self.window_minutes, self.every) {
            (Some(minutes), _) => Some(FrequencyPolicy::TimeWindow { minutes }),
            (None, Some(every)) => Some(FrequencyPolicy::Fixed { every }),
            (None, None) => None,
        }
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match &cli.command {
        Commands::Placement { command } => handle_placement(command, &cli.config),
        Commands::Bucket { placement, at } => handle_bucket(&cli.config, placement, at),
        Commands::Simulate { script, json } => handle_simulate(&cli.config, script, *json),
    }
}

fn handle_placement(command: &PlacementCommands, path: &Path) -> Result<()> {
    let mut config = PlacementConfig::load(path)?;
    match command {
        PlacementCommands::Add { placement, policy } => {
            let policy = policy.policy().context("a frequency policy is required")?;
            if config.upsert(placement.as_str().into(), policy).is_some() {
                info!(%placement, "replacing existing placement");
            }
            config.save(path)?;
            println!("added {placement} ({policy})");
        }
        PlacementCommands::Remove { placement } => {
            if config.remove(&placement.as_str().into()).is_some() {
                config.save(path)?;
                println!("removed {placement}");
            } else {
                warn!(%placement, "placement not found");
            }
        }
        PlacementCommands::List => {
            for (key, policy) in config.iter() {
                println!("{key} {policy}");
            }
        }
    }
    Ok(())
}

fn handle_bucket(path: &Path, placement: &str, at: &str) -> Result<()> {
    let config = PlacementConfig::load(path)?;
    let at = parse_local_ts(at)?;
    let tracker = WindowedSeenTracker::new(config);
    match tracker.compute_bucket_id(&PlacementKey::from(placement), &at) {
        Some(bucket) => println!("{bucket}"),
        None => println!("unlimited"),
    }
    Ok(())
}

fn handle_simulate(path: &Path, script_path: &Path, json: bool) -> Result<()> {
    let config = PlacementConfig::load(path)?;
    let raw = std::fs::read_to_string(script_path)
        .with_context(|| format!("read script {}", script_path.display()))?;
    let steps = script::parse_script(&raw)?;
    let Some(first) = steps.first() else {
        warn!("script has no steps");
        return Ok(());
    };

    let clock = Arc::new(ManualClock::new(first.at));
    let mut gate = FrequencyGate::with_clock(config, clock.clone());
    for outcome in script::run(&mut gate, &clock, &steps) {
        if json {
            println!("{}", serde_json::to_string(&outcome)?);
        } else {
            println!("{}", outcome.to_line());
        }
    }
    Ok(())
}
