use anyhow::{Context, Result};
use colored::{ColoredString, Colorize};
use std::path::{Path, PathBuf};

use qst_core::sync::CycleOutcome;
use qst_core::transfer::EXPORT_FILE_NAME;
use qst_core::{Config, Filter, ImportSummary, Quote, QuoteApp, StatusLevel, SyncReport, SyncStatus};

/// Shown when a random draw finds nothing
pub const NO_QUOTES_MESSAGE: &str = "No quotes in this category.";

/// Handle the 'ls' command
pub fn list_quotes(app: &QuoteApp, category: Option<&str>, json: bool) -> Result<()> {
    let filter = match category {
        Some(category) => Filter::parse(category),
        None => app.current_filter()?,
    };
    let quotes = app.quotes_matching(&filter);

    if json {
        println!("{}", serde_json::to_string(&quotes)?);
        return Ok(());
    }

    print_quotes(&quotes, &filter);
    Ok(())
}

/// Handle the 'filter' command: persist the preference, then list
pub fn set_filter(app: &QuoteApp, category: &str, json: bool) -> Result<()> {
    let filter = Filter::parse(category);
    app.set_filter(&filter)?;
    list_quotes(app, None, json)
}

pub fn list_categories(app: &QuoteApp, json: bool) -> Result<()> {
    let categories = app.categories();

    if json {
        println!("{}", serde_json::to_string(&categories)?);
        return Ok(());
    }

    println!("Categories:");
    for category in categories {
        println!("  {}", category.cyan());
    }
    Ok(())
}

/// Handle the 'random' command. Without a category the first known one is used.
pub fn random_quote(app: &QuoteApp, category: Option<&str>, json: bool) -> Result<()> {
    let category = match category {
        Some(category) => Some(category.to_string()),
        None => app.categories().into_iter().next(),
    };
    let drawn = match category {
        Some(category) => app.draw_random(&category)?,
        None => None,
    };

    if json {
        println!("{}", serde_json::to_string(&drawn)?);
        return Ok(());
    }

    match drawn {
        Some(quote) => println!("{}", format_quote(&quote)),
        None => println!("{}", NO_QUOTES_MESSAGE.yellow()),
    }
    Ok(())
}

pub fn add_quote(app: &QuoteApp, text: &str, category: &str, json: bool) -> Result<()> {
    let quote = app.add_quote(text, category)?;

    if json {
        println!("{}", serde_json::to_string(&quote)?);
        return Ok(());
    }

    println!("{} {}", "Added".green(), format_quote(&quote));
    Ok(())
}

/// Handle the 'pending' command: quotes not yet pushed
pub fn list_pending(app: &QuoteApp, json: bool) -> Result<()> {
    let pending = app.pending();

    if json {
        println!("{}", serde_json::to_string(&pending)?);
        return Ok(());
    }

    if pending.is_empty() {
        println!("Nothing waiting to be pushed.");
        return Ok(());
    }

    println!("Waiting to be pushed:");
    for quote in &pending {
        println!("  {}", format_quote(quote));
    }
    Ok(())
}

pub async fn export_quotes(app: &QuoteApp, out: Option<&Path>, json: bool) -> Result<()> {
    let path = out
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from(EXPORT_FILE_NAME));
    app.export_to(&path)
        .await
        .with_context(|| format!("Failed to export to {}", path.display()))?;

    if json {
        println!("{}", serde_json::json!({ "path": path }));
    } else {
        println!("Exported quotes to {}", path.display().to_string().cyan());
    }
    Ok(())
}

pub async fn import_quotes(app: &QuoteApp, path: &Path, json: bool) -> Result<()> {
    let summary = app.import_file(path).await?;

    if json {
        println!("{}", serde_json::to_string(&summary)?);
    } else {
        println!("{}", format_import(&summary));
    }
    Ok(())
}

/// Handle the 'sync' command: one cycle, then the report
pub async fn sync_once(app: &QuoteApp, json: bool) -> Result<()> {
    let report = app.sync_now().await;

    if json {
        println!("{}", serde_json::to_string(&report)?);
        return Ok(());
    }

    print_report(&report);
    Ok(())
}

pub fn config_schema() -> Result<()> {
    println!("{}", Config::generate_schema()?);
    Ok(())
}

pub fn config_path() -> Result<()> {
    println!("{}", Config::default_path()?.display());
    Ok(())
}

pub fn print_quotes(quotes: &[Quote], filter: &Filter) {
    if quotes.is_empty() {
        match filter {
            Filter::All => println!("No quotes yet. Add one with 'qst add <text> --category <C>'"),
            Filter::Category(c) => println!("No quotes in category {}.", c.cyan()),
        }
        return;
    }

    if let Filter::Category(c) = filter {
        println!("Category {}:", c.cyan());
    }
    for quote in quotes {
        println!("  {}", format_quote(quote));
    }
}

pub fn format_quote(quote: &Quote) -> String {
    let id = format!("#{}", quote.id);
    let id = if quote.is_pending() { id.yellow() } else { id.dimmed() };
    format!("{} \"{}\" ({})", id, quote.text, quote.category.cyan())
}

pub fn format_import(summary: &ImportSummary) -> String {
    format!(
        "Imported {} of {} quotes ({} already present).",
        summary.inserted, summary.total, summary.skipped
    )
}

pub fn print_report(report: &SyncReport) {
    let line = report.summary();
    match &report.outcome {
        CycleOutcome::Success => println!("{}", line.green()),
        CycleOutcome::Failed(error) => println!("{} ({})", line.red(), error),
        CycleOutcome::Skipped => println!("{}", line.yellow()),
    }
    if report.pushed > 0 {
        println!("  pushed {} quote(s)", report.pushed);
    }
    if let Some(id) = report.push_failed {
        println!("  #{id} stays pending until the next cycle");
    }
}

pub fn format_status(status: &SyncStatus) -> ColoredString {
    match status.level {
        StatusLevel::Success => status.message.green(),
        StatusLevel::Failure => status.message.red(),
    }
}
