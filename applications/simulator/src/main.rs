//! Lumen Sim - scripted playback sessions against the progress-sync controller

use clap::{Parser, Subcommand};
use lumen_core::Platform;
use lumen_playback::PlaybackConfig;
use std::path::{Path, PathBuf};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod runner;
mod scenario;

use runner::Simulation;
use scenario::Scenario;

#[derive(Parser)]
#[command(name = "lumen-sim")]
#[command(about = "Run scripted playback scenarios against the Lumen controller", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Play a scenario file and print controller events as JSON lines
    Run {
        /// Scenario file (JSON)
        scenario: PathBuf,

        /// Configuration file path
        #[arg(short, long, env = "LUMEN_PLAYBACK_CONFIG")]
        config: Option<PathBuf>,

        /// Simulate a constrained (mobile) platform
        #[arg(long)]
        constrained: bool,

        /// Print the whole run as one JSON document instead of event lines
        #[arg(long)]
        summary: bool,
    },
    /// Classify a user agent string
    Platform {
        /// User agent string
        user_agent: String,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing (stderr, so stdout stays machine-readable)
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "lumen_playback=info,lumen_sim=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Run {
            scenario,
            config,
            constrained,
            summary,
        } => {
            run_scenario(&scenario, config, constrained, summary).await?;
        }
        Commands::Platform { user_agent } => {
            let platform = Platform::from_user_agent(&user_agent);
            println!("{}", serde_json::to_string(&platform)?);
        }
    }

    Ok(())
}

async fn run_scenario(
    path: &Path,
    config_path: Option<PathBuf>,
    constrained: bool,
    summary: bool,
) -> anyhow::Result<()> {
    let mut config = PlaybackConfig::load(config_path.as_deref())?;
    if constrained {
        config.constrained_platform = true;
    }

    let scenario = Scenario::load(path)?;
    tracing::info!(
        "Running {} steps for {} ({:?} platform)",
        scenario.steps.len(),
        scenario.media,
        config.platform()
    );

    let result = Simulation::new(config, &scenario).run(&scenario).await;

    if summary {
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else {
        for event in &result.events {
            println!("{}", serde_json::to_string(event)?);
        }
        tracing::info!(
            "Adapter received {} commands, {} progress records stored",
            result.adapter_commands.len(),
            result.stored.len()
        );
    }

    Ok(())
}
