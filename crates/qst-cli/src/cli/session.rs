//! Interactive session: user commands from stdin interleaved with the
//! scheduled sync and its transient statuses.

use anyhow::Result;
use colored::Colorize;
use std::io::Write;
use std::path::PathBuf;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::debug;

use super::commands;
use qst_core::transfer::EXPORT_FILE_NAME;
use qst_core::{Filter, QuoteApp};

const HELP: &str = "\
Commands:
  add <category> | <text>   add a quote
  filter <category|all>     save the filter and list
  random [category]         show a random quote
  ls                        list quotes under the saved filter
  categories                show the known categories
  export [path]             write all quotes as JSON (default ./quotes.json)
  import <path>             merge quotes from a JSON file
  sync                      run a sync cycle now
  help                      show this help
  quit                      leave the session";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionCommand {
    Add { category: String, text: String },
    Filter(String),
    Random(Option<String>),
    List,
    Categories,
    Export(Option<PathBuf>),
    Import(PathBuf),
    Sync,
    Help,
    Quit,
}

impl SessionCommand {
    /// Parse one input line. Blank lines yield `Ok(None)`.
    pub fn parse(line: &str) -> std::result::Result<Option<Self>, String> {
        let line = line.trim();
        if line.is_empty() {
            return Ok(None);
        }
        let (word, rest) = match line.split_once(char::is_whitespace) {
            Some((word, rest)) => (word, rest.trim()),
            None => (line, ""),
        };
        let arg = (!rest.is_empty()).then(|| rest.to_string());

        let command = match word {
            "add" => {
                let (category, text) = rest
                    .split_once('|')
                    .ok_or_else(|| "usage: add <category> | <text>".to_string())?;
                SessionCommand::Add {
                    category: category.trim().to_string(),
                    text: text.trim().to_string(),
                }
            }
            "filter" => SessionCommand::Filter(arg.ok_or("usage: filter <category|all>")?),
            "random" => SessionCommand::Random(arg),
            "ls" | "list" => SessionCommand::List,
            "categories" => SessionCommand::Categories,
            "export" => SessionCommand::Export(arg.map(PathBuf::from)),
            "import" => SessionCommand::Import(arg.map(PathBuf::from).ok_or("usage: import <path>")?),
            "sync" => SessionCommand::Sync,
            "help" | "?" => SessionCommand::Help,
            "quit" | "exit" | "q" => SessionCommand::Quit,
            other => return Err(format!("unknown command '{other}', try 'help'")),
        };
        Ok(Some(command))
    }
}

/// Run the interactive session until `quit` or end of input.
pub async fn run(app: &QuoteApp) -> Result<()> {
    show_quotes(app)?;
    let scheduler = app.spawn_scheduler();
    if scheduler.is_none() {
        println!("{}", "Periodic sync is disabled in the config.".dimmed());
    }
    let mut status = app.status();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    println!("Type 'help' for commands.");
    prompt();
    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line? else { break };
                match SessionCommand::parse(&line) {
                    Ok(Some(SessionCommand::Quit)) => break,
                    Ok(Some(command)) => {
                        if let Err(e) = execute(app, command).await {
                            debug!(error = ?e, "session command failed");
                            eprintln!("{} {e:#}", "error:".red());
                        }
                    }
                    Ok(None) => {}
                    Err(message) => eprintln!("{} {message}", "error:".red()),
                }
                prompt();
            }
            changed = status.changed() => {
                if changed.is_err() {
                    break;
                }
                let current = status.borrow_and_update().clone();
                match current {
                    Some(posted) => println!("\n[sync] {}", commands::format_status(&posted)),
                    None => println!("\n{}", "[sync] status cleared".dimmed()),
                }
                prompt();
            }
        }
    }
    drop(scheduler);
    Ok(())
}

async fn execute(app: &QuoteApp, command: SessionCommand) -> Result<()> {
    match command {
        SessionCommand::Add { category, text } => commands::add_quote(app, &text, &category, false)?,
        SessionCommand::Filter(category) => {
            app.set_filter(&Filter::parse(&category))?;
            show_quotes(app)?;
        }
        SessionCommand::Random(category) => commands::random_quote(app, category.as_deref(), false)?,
        SessionCommand::List => show_quotes(app)?,
        SessionCommand::Categories => commands::list_categories(app, false)?,
        SessionCommand::Export(path) => {
            let path = path.unwrap_or_else(|| PathBuf::from(EXPORT_FILE_NAME));
            commands::export_quotes(app, Some(&path), false).await?;
        }
        SessionCommand::Import(path) => commands::import_quotes(app, &path, false).await?,
        SessionCommand::Sync => commands::sync_once(app, false).await?,
        SessionCommand::Help => println!("{HELP}"),
        SessionCommand::Quit => {}
    }
    Ok(())
}

/// Last viewed quote (if any) followed by the list under the saved filter
fn show_quotes(app: &QuoteApp) -> Result<()> {
    if let Some(last) = app.last_quote()? {
        println!("Last viewed quote: \"{}\"", last.italic());
    }
    let filter = app.current_filter()?;
    commands::print_quotes(&app.quotes_matching(&filter), &filter);
    Ok(())
}

fn prompt() {
    print!("qst> ");
    let _ = std::io::stdout().flush();
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn add_splits_on_pipe() {
        assert_eq!(
            SessionCommand::parse("add Life | Get busy living.").unwrap(),
            Some(SessionCommand::Add {
                category: "Life".into(),
                text: "Get busy living.".into(),
            })
        );
    }

    #[test]
    fn add_keeps_blank_parts_for_validation() {
        // empty fields are rejected by the collection, not the parser
        assert_eq!(
            SessionCommand::parse("add  | text").unwrap(),
            Some(SessionCommand::Add {
                category: String::new(),
                text: "text".into(),
            })
        );
    }

    #[rstest]
    #[case("ls", SessionCommand::List)]
    #[case("  categories ", SessionCommand::Categories)]
    #[case("filter all", SessionCommand::Filter("all".into()))]
    #[case("filter Deep Thoughts", SessionCommand::Filter("Deep Thoughts".into()))]
    #[case("random", SessionCommand::Random(None))]
    #[case("random Life", SessionCommand::Random(Some("Life".into())))]
    #[case("export", SessionCommand::Export(None))]
    #[case("import ./in.json", SessionCommand::Import(PathBuf::from("./in.json")))]
    #[case("sync", SessionCommand::Sync)]
    #[case("quit", SessionCommand::Quit)]
    fn parses_commands(#[case] line: &str, #[case] expected: SessionCommand) {
        assert_eq!(SessionCommand::parse(line).unwrap(), Some(expected));
    }

    #[rstest]
    #[case("add no pipe here")]
    #[case("filter")]
    #[case("import")]
    #[case("delete 3")]
    fn rejects_bad_input(#[case] line: &str) {
        assert!(SessionCommand::parse(line).is_err());
    }

    #[test]
    fn blank_line_is_ignored() {
        assert_eq!(SessionCommand::parse("   ").unwrap(), None);
    }
}
