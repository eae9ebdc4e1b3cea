//! Lattice daemon
//!
//! Runs the registries and logs pull request and intent activity until
//! interrupted.
//!
//! Usage:
//!     latticed --config ~/.lattice/config.toml --verbose

use anyhow::Context;
use clap::Parser;
use lattice::{load_config, load_default_config, Lattice};
use lattice_events::{Event, Topic};
use lattice_logging::LogConfig;
use std::path::PathBuf;
use tracing::info;

#[derive(Parser, Debug)]
#[command(name = "latticed", about = "Lattice intent governance daemon")]
struct Args {
    /// Config file (defaults to $LATTICE_HOME/config.toml)
    #[arg(long, env = "LATTICE_CONFIG")]
    config: Option<PathBuf>,

    /// Debug output on stderr
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let config = match &args.config {
        Some(path) => load_config(path)
            .with_context(|| format!("Failed to load config from {}", path.display()))?,
        None => load_default_config().context("Failed to load default config")?,
    };

    lattice_logging::init_logging(LogConfig {
        app_name: "latticed",
        verbose: args.verbose || config.logging.verbose,
        log_dir: config.logging.dir.clone(),
    })
    .context("Failed to initialize logging")?;

    info!("Starting Lattice daemon");
    let lattice = Lattice::start(&config);

    let mut prs = lattice.bus().subscribe(Topic::PullRequests);
    let mut intents = lattice.bus().subscribe(Topic::Intents);

    loop {
        tokio::select! {
            signal = tokio::signal::ctrl_c() => {
                signal.context("Failed to listen for Ctrl-C")?;
                info!("Interrupted, shutting down");
                break;
            }
            Some(event) = prs.recv() => log_event(&event),
            Some(event) = intents.recv() => log_event(&event),
        }
    }

    lattice.shutdown().await;
    Ok(())
}

fn log_event(event: &Event) {
    match event {
        Event::PrRegistered { pr } => {
            info!(pr = %pr.key(), intent_id = ?pr.intent_id, "pull request registered");
        }
        Event::PrUpdated { pr, changes } => {
            let fields: Vec<String> = changes.iter().map(|c| c.field.to_string()).collect();
            info!(pr = %pr.key(), fields = ?fields, "pull request updated");
        }
        Event::IntentTransitioned {
            intent_id,
            from,
            to,
            actor,
        } => {
            info!(%intent_id, %from, %to, actor = ?actor, "intent transitioned");
        }
        Event::ArtifactLinked { link } => {
            info!(intent_id = %link.intent_id, kind = %link.kind, "artifact linked");
        }
    }
}
