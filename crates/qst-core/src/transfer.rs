//! JSON export and import of the collection.

use crate::collection::QuoteCollection;
use crate::error::{QuoteError, Result};
use crate::models::Quote;
use serde::Serialize;
use serde_json::Value;
use std::path::Path;
use tracing::info;

/// Default file name for exports
pub const EXPORT_FILE_NAME: &str = "quotes.json";

/// What an import did
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ImportSummary {
    /// Quotes found in the payload
    pub total: usize,
    /// Quotes that were new to the collection
    pub inserted: usize,
    /// Quotes whose id was already present
    pub skipped: usize,
}

/// Pretty-printed JSON array of the given quotes.
pub fn export_json(quotes: &[Quote]) -> Result<String> {
    Ok(serde_json::to_string_pretty(quotes)?)
}

/// Write an export to `path`.
pub async fn write_export(quotes: &[Quote], path: &Path) -> Result<()> {
    let json = export_json(quotes)?;
    tokio::fs::write(path, json)
        .await
        .map_err(|e| QuoteError::storage(path.display().to_string(), e))?;
    info!(count = quotes.len(), path = %path.display(), "exported quotes");
    Ok(())
}

/// Parse an import payload. The whole payload is rejected if it is not a
/// JSON array or if any element is not quote-shaped.
pub fn parse_import(bytes: &[u8]) -> Result<Vec<Quote>> {
    let value: Value = serde_json::from_slice(bytes)
        .map_err(|e| QuoteError::Format(format!("not valid JSON: {e}")))?;
    let Value::Array(items) = value else {
        return Err(QuoteError::Format("expected a JSON array of quotes".into()));
    };

    items
        .into_iter()
        .enumerate()
        .map(|(index, item)| {
            serde_json::from_value::<Quote>(item)
                .map_err(|e| QuoteError::Format(format!("element {index}: {e}")))
        })
        .collect()
}

/// Parse `bytes` and merge them into `collection`.
pub fn import_into(collection: &mut QuoteCollection, bytes: &[u8]) -> Result<ImportSummary> {
    let quotes = parse_import(bytes)?;
    let total = quotes.len();
    let inserted = collection.merge(quotes)?;
    info!(total, inserted, "imported quotes");
    Ok(ImportSummary {
        total,
        inserted,
        skipped: total - inserted,
    })
}

/// Read an import file without blocking the runtime.
pub async fn read_import_file(path: &Path) -> Result<Vec<u8>> {
    tokio::fs::read(path)
        .await
        .map_err(|e| QuoteError::storage(path.display().to_string(), e))
}
