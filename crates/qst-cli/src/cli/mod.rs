pub mod commands;
pub mod session;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[clap(name = "qst", about = "Quote collection with periodic remote sync")]
#[clap(version, author)]
pub struct Cli {
    #[clap(subcommand)]
    pub command: Commands,

    /// Output in JSON format
    #[clap(long, global = true)]
    pub json: bool,

    /// Log sync activity to stderr
    #[clap(short, long, global = true)]
    pub verbose: bool,

    /// Use this config file instead of the default location
    #[clap(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// List quotes under the saved filter
    #[clap(name = "ls")]
    List {
        /// Show this category instead, without saving it as the filter
        #[clap(long, short)]
        category: Option<String>,
    },

    /// Save the category filter ("all" clears it) and list
    #[clap(name = "filter")]
    Filter {
        /// Category name or "all"
        category: String,
    },

    /// Show the known categories
    #[clap(name = "categories")]
    Categories,

    /// Show a random quote
    #[clap(name = "random")]
    Random {
        /// Category to draw from (defaults to the first category)
        category: Option<String>,
    },

    /// Add a quote
    #[clap(name = "add")]
    Add {
        /// Quote text
        text: String,
        /// Category of the quote
        #[clap(long, short)]
        category: String,
    },

    /// Show quotes waiting to be pushed to the server
    #[clap(name = "pending")]
    Pending,

    /// Export all quotes as JSON
    #[clap(name = "export")]
    Export {
        /// Output file (defaults to ./quotes.json)
        #[clap(long, short)]
        out: Option<PathBuf>,
    },

    /// Import quotes from a JSON file
    #[clap(name = "import")]
    Import {
        /// JSON file holding an array of quotes
        path: PathBuf,
    },

    /// Run one sync cycle now
    #[clap(name = "sync")]
    Sync,

    /// Interactive session with periodic sync running
    #[clap(name = "run")]
    Run,

    /// Configuration helpers
    #[clap(subcommand, name = "config")]
    Config(ConfigCommands),
}

#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Print the JSON schema of the config file
    Schema,
    /// Print the config file location
    Path,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_add_with_category() {
        let cli = Cli::try_parse_from(["qst", "add", "Stay curious.", "--category", "Life"]).unwrap();
        match cli.command {
            Commands::Add { text, category } => {
                assert_eq!(text, "Stay curious.");
                assert_eq!(category, "Life");
            }
            _ => panic!("expected add"),
        }
    }

    #[test]
    fn add_requires_category() {
        assert!(Cli::try_parse_from(["qst", "add", "text"]).is_err());
    }

    #[test]
    fn global_flags_after_subcommand() {
        let cli = Cli::try_parse_from(["qst", "ls", "--json", "-v"]).unwrap();
        assert!(cli.json);
        assert!(cli.verbose);
        assert!(matches!(cli.command, Commands::List { category: None }));
    }
}
