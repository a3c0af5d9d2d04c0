mod cli;

use anyhow::{Context, Result};
use clap::Parser;
use cli::{Cli, Commands, ConfigCommands};
use qst_core::{Config, QuoteApp};
use tracing_subscriber::EnvFilter;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    // Parse command line arguments
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    // Config helpers do not need the store
    if let Commands::Config(config_cmd) = &cli.command {
        return match config_cmd {
            ConfigCommands::Schema => cli::commands::config_schema(),
            ConfigCommands::Path => cli::commands::config_path(),
        };
    }

    let config = match &cli.config {
        Some(path) => Config::load_from(path)?,
        None => Config::load()?,
    };
    let app = QuoteApp::open(&config).context("Failed to open quote store")?;

    match &cli.command {
        Commands::List { category } => {
            cli::commands::list_quotes(&app, category.as_deref(), cli.json)?;
        }
        Commands::Filter { category } => {
            cli::commands::set_filter(&app, category, cli.json)?;
        }
        Commands::Categories => {
            cli::commands::list_categories(&app, cli.json)?;
        }
        Commands::Random { category } => {
            cli::commands::random_quote(&app, category.as_deref(), cli.json)?;
        }
        Commands::Add { text, category } => {
            cli::commands::add_quote(&app, text, category, cli.json)?;
        }
        Commands::Pending => {
            cli::commands::list_pending(&app, cli.json)?;
        }
        Commands::Export { out } => {
            cli::commands::export_quotes(&app, out.as_deref(), cli.json).await?;
        }
        Commands::Import { path } => {
            cli::commands::import_quotes(&app, path, cli.json).await?;
        }
        Commands::Sync => {
            cli::commands::sync_once(&app, cli.json).await?;
        }
        Commands::Run => {
            cli::session::run(&app).await?;
        }
        Commands::Config(_) => {}
    }

    Ok(())
}

/// Logs go to stderr so `--json` output on stdout stays parseable
fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("warn,qst_core=debug,qst=debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(filter)
        .init();
}
