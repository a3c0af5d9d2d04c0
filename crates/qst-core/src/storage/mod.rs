//! String-keyed persistence: a durable file-backed store for the collection
//! and preferences, and an in-memory store for session-scoped values.

use crate::error::Result;

pub mod file;
pub mod memory;
pub mod preferences;

pub use file::FileStore;
pub use memory::MemoryStore;
pub use preferences::Preferences;

/// Durable slot holding the serialized quote collection
pub const QUOTES_KEY: &str = "quotes";
/// Where an unreadable collection payload is moved before reseeding
pub const CORRUPT_QUOTES_KEY: &str = "quotes.corrupt";
/// Durable slot holding the selected category filter
pub const SELECTED_FILTER_KEY: &str = "selectedFilter";
/// Session slot holding the text of the last drawn quote
pub const LAST_QUOTE_KEY: &str = "lastQuote";

/// A get/set store of string values.
///
/// Implementations must be cheap to call from synchronous code; the
/// collection persists through this trait while holding its lock.
pub trait KeyValueStore: Send + Sync {
    /// Reads a value, `None` if the key was never written.
    fn get(&self, key: &str) -> Result<Option<String>>;

    /// Writes a value, replacing any previous one.
    fn set(&self, key: &str, value: &str) -> Result<()>;

    /// Removes a value; removing a missing key is not an error.
    fn remove(&self, key: &str) -> Result<()>;
}
