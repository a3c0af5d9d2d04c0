use serde::{Deserialize, Serialize};
use std::fmt;

/// First id handed out to locally created quotes. Lower ids belong to seed
/// data and to records that came from the remote.
pub const FIRST_LOCAL_ID: u64 = 1000;

/// Where a quote came from and whether the remote has seen it
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "kebab-case")]
pub enum Origin {
    /// Created on this device, create request not yet acknowledged
    LocalUnsynced,
    /// Seed data, or created here and acknowledged by the remote
    LocalSynced,
    /// Pulled from the remote
    Remote,
}

impl Origin {
    /// Origin for records that predate the explicit tag.
    pub fn from_legacy_id(id: u64) -> Self {
        if id >= FIRST_LOCAL_ID {
            Origin::LocalUnsynced
        } else {
            Origin::LocalSynced
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Origin::LocalUnsynced => "local-unsynced",
            Origin::LocalSynced => "local-synced",
            Origin::Remote => "remote",
        }
    }
}

impl fmt::Display for Origin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Represents a single quote in the collection
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
#[serde(from = "StoredQuote")]
pub struct Quote {
    /// Identity key, unique across the collection
    pub id: u64,

    /// The quote itself
    pub text: String,

    /// Free-form category name
    pub category: String,

    /// Sync state of this quote
    pub origin: Origin,
}

/// On-disk shape; `origin` is optional so stores and export files written
/// before the tag existed still load.
#[derive(Deserialize)]
struct StoredQuote {
    id: u64,
    text: String,
    category: String,
    #[serde(default)]
    origin: Option<Origin>,
}

impl From<StoredQuote> for Quote {
    fn from(raw: StoredQuote) -> Self {
        let origin = raw.origin.unwrap_or_else(|| Origin::from_legacy_id(raw.id));
        Self {
            id: raw.id,
            text: raw.text,
            category: raw.category,
            origin,
        }
    }
}

impl Quote {
    pub fn new(id: u64, text: impl Into<String>, category: impl Into<String>, origin: Origin) -> Self {
        Self {
            id,
            text: text.into(),
            category: category.into(),
            origin,
        }
    }

    /// Whether the push phase still has to send this quote
    pub fn is_pending(&self) -> bool {
        self.origin == Origin::LocalUnsynced
    }
}

/// Quotes a fresh installation starts with
pub fn seed_quotes() -> Vec<Quote> {
    vec![
        Quote::new(
            1,
            "The best way to predict the future is to invent it.",
            "Inspiration",
            Origin::LocalSynced,
        ),
        Quote::new(2, "Stay hungry, stay foolish.", "Inspiration", Origin::LocalSynced),
        Quote::new(
            3,
            "Life is what happens when you're busy making other plans.",
            "Life",
            Origin::LocalSynced,
        ),
        Quote::new(4, "Get busy living or get busy dying.", "Life", Origin::LocalSynced),
    ]
}
