use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use qst_core::{Config, QuoteApp, StatusLevel};

#[derive(Parser)]
#[command(name = "qst-syncd", about = "Background sync daemon for qst")]
struct Args {
    /// Path to the configuration file (defaults to $QST_CONFIG or ~/.config/qst/config.toml)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Run a single sync cycle, print its report and exit
    #[arg(long)]
    once: bool,

    /// Verbose logging
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let args = Args::parse();
    init_tracing(args.verbose);

    let config = match &args.config {
        Some(path) => Config::load_from(path)?,
        None => Config::load()?,
    };
    let app = QuoteApp::open(&config).context("Failed to open quote store")?;

    if args.once {
        let report = app.sync_now().await;
        println!("{}", serde_json::to_string(&report)?);
        return Ok(());
    }

    let Some(_scheduler) = app.spawn_scheduler() else {
        warn!("sync is disabled in the config, nothing to do");
        return Ok(());
    };
    info!(
        server = %config.sync.server_url,
        interval = config.sync.interval_seconds,
        "qst-syncd started"
    );

    let mut status = app.status();

    // Main event loop
    loop {
        tokio::select! {
            changed = status.changed() => {
                if changed.is_err() {
                    break;
                }
                if let Some(posted) = status.borrow_and_update().clone() {
                    match posted.level {
                        StatusLevel::Success => info!("{}", posted.message),
                        StatusLevel::Failure => warn!("{}", posted.message),
                    }
                }
            }

            // Handle shutdown signals
            _ = tokio::signal::ctrl_c() => {
                info!("received shutdown signal, stopping qst-syncd");
                break;
            }
        }
    }

    let stats = app.engine().stats();
    info!(
        completed = stats.cycles_completed,
        failed = stats.cycles_failed,
        pushed = stats.quotes_pushed,
        merged = stats.quotes_merged,
        "sync totals"
    );
    Ok(())
}

fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("info,qst_core=debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(filter)
        .init();
}
