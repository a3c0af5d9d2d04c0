//! The in-memory quote collection and its write-through persistence.

use crate::error::{QuoteError, Result};
use crate::models::{seed_quotes, Origin, Quote, FIRST_LOCAL_ID};
use crate::storage::{KeyValueStore, CORRUPT_QUOTES_KEY, QUOTES_KEY};
use parking_lot::Mutex;
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{debug, warn};

/// Collection handle shared by user commands and the sync engine.
/// The lock is only held for synchronous sections, never across an await.
pub type SharedCollection = Arc<Mutex<QuoteCollection>>;

/// Ordered list of quotes, persisted to the store after every mutation
pub struct QuoteCollection {
    quotes: Vec<Quote>,
    store: Arc<dyn KeyValueStore>,
}

impl QuoteCollection {
    /// Load the collection from the store, seeding it on first run.
    ///
    /// A payload that no longer parses is kept under `quotes.corrupt` and the
    /// seed set takes its place.
    pub fn load(store: Arc<dyn KeyValueStore>) -> Result<Self> {
        let quotes = match store.get(QUOTES_KEY)? {
            None => {
                debug!("no stored quotes, starting from seed set");
                None
            }
            Some(raw) => match serde_json::from_str::<Vec<Quote>>(&raw) {
                Ok(quotes) => Some(quotes),
                Err(e) => {
                    warn!("stored quotes are unreadable ({e}), falling back to seed set");
                    store.set(CORRUPT_QUOTES_KEY, &raw)?;
                    None
                }
            },
        };

        match quotes {
            Some(quotes) => {
                let mut collection = Self {
                    quotes: Vec::with_capacity(quotes.len()),
                    store,
                };
                let loaded = quotes.len();
                let kept = collection.append_new(quotes);
                if kept != loaded {
                    warn!("dropped {} stored quotes with duplicate ids", loaded - kept);
                    collection.persist()?;
                }
                Ok(collection)
            }
            None => {
                let collection = Self {
                    quotes: seed_quotes(),
                    store,
                };
                collection.persist()?;
                Ok(collection)
            }
        }
    }

    pub fn into_shared(self) -> SharedCollection {
        Arc::new(Mutex::new(self))
    }

    /// Build a collection around existing quotes without touching the store
    pub fn from_quotes(quotes: Vec<Quote>, store: Arc<dyn KeyValueStore>) -> Self {
        let mut collection = Self {
            quotes: Vec::with_capacity(quotes.len()),
            store,
        };
        collection.append_new(quotes);
        collection
    }

    pub fn quotes(&self) -> &[Quote] {
        &self.quotes
    }

    pub fn len(&self) -> usize {
        self.quotes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.quotes.is_empty()
    }

    /// Identity lookup
    pub fn find(&self, id: u64) -> Option<&Quote> {
        self.quotes.iter().find(|q| q.id == id)
    }

    /// Id the next locally created quote receives
    pub fn next_local_id(&self) -> Result<u64> {
        let max = self.quotes.iter().map(|q| q.id).max().unwrap_or(0);
        max.max(FIRST_LOCAL_ID - 1)
            .checked_add(1)
            .ok_or_else(|| QuoteError::Validation("No local ids left.".to_string()))
    }

    /// Fold in what other processes wrote to the store since this collection
    /// last read it. Stored ids missing here are appended in stored order; for
    /// ids present on both sides a `local-synced` tag wins over
    /// `local-unsynced`. An unreadable payload is left alone. Returns how many
    /// quotes changed.
    pub fn refresh(&mut self) -> Result<usize> {
        let Some(raw) = self.store.get(QUOTES_KEY)? else {
            return Ok(0);
        };
        let stored: Vec<Quote> = match serde_json::from_str(&raw) {
            Ok(stored) => stored,
            Err(e) => {
                warn!("stored quotes are unreadable ({e}), keeping the in-memory copy");
                return Ok(0);
            }
        };

        let mut promoted = 0;
        for quote in &stored {
            if quote.origin != Origin::LocalSynced {
                continue;
            }
            if let Some(local) = self.quotes.iter_mut().find(|q| q.id == quote.id) {
                if local.is_pending() {
                    local.origin = Origin::LocalSynced;
                    promoted += 1;
                }
            }
        }
        let appended = self.append_new(stored);
        if promoted + appended > 0 {
            debug!(appended, promoted, "picked up quotes written elsewhere");
        }
        Ok(promoted + appended)
    }

    /// Add a user-entered quote.
    ///
    /// Text and category are trimmed and must both be non-empty.
    pub fn add(&mut self, text: &str, category: &str) -> Result<Quote> {
        let text = text.trim();
        let category = category.trim();
        if text.is_empty() || category.is_empty() {
            return Err(QuoteError::Validation(
                "Please enter both a quote and a category.".to_string(),
            ));
        }

        self.refresh()?;
        let quote = Quote::new(self.next_local_id()?, text, category, Origin::LocalUnsynced);
        self.quotes.push(quote.clone());
        if let Err(e) = self.persist() {
            self.quotes.pop();
            return Err(e);
        }
        debug!(id = quote.id, category = %quote.category, "added quote");
        Ok(quote)
    }

    /// Insert every candidate whose id is not taken yet. Existing quotes are
    /// never updated. Returns how many were inserted.
    pub fn merge<I>(&mut self, candidates: I) -> Result<usize>
    where
        I: IntoIterator<Item = Quote>,
    {
        self.refresh()?;
        let before = self.quotes.len();
        let inserted = self.append_new(candidates);
        if inserted > 0 {
            if let Err(e) = self.persist() {
                self.quotes.truncate(before);
                return Err(e);
            }
        }
        Ok(inserted)
    }

    /// Distinct categories in order of first appearance
    pub fn distinct_categories(&self) -> Vec<String> {
        let mut seen = HashSet::new();
        self.quotes
            .iter()
            .filter(|q| seen.insert(q.category.as_str()))
            .map(|q| q.category.clone())
            .collect()
    }

    /// Quotes the push phase still has to send, in collection order
    pub fn pending_for_sync(&self) -> Vec<Quote> {
        self.quotes.iter().filter(|q| q.is_pending()).cloned().collect()
    }

    /// Record that the remote accepted a create request for `id`.
    /// Returns false when the quote is gone or was not pending.
    pub fn mark_synced(&mut self, id: u64) -> Result<bool> {
        self.refresh()?;
        let Some(quote) = self.quotes.iter_mut().find(|q| q.id == id) else {
            return Ok(false);
        };
        if !quote.is_pending() {
            return Ok(false);
        }
        quote.origin = Origin::LocalSynced;
        if let Err(e) = self.persist() {
            if let Some(quote) = self.quotes.iter_mut().find(|q| q.id == id) {
                quote.origin = Origin::LocalUnsynced;
            }
            return Err(e);
        }
        Ok(true)
    }

    /// Write the full collection to the store
    pub fn persist(&self) -> Result<()> {
        let json = serde_json::to_string(&self.quotes)?;
        self.store.set(QUOTES_KEY, &json)
    }

    fn append_new<I>(&mut self, candidates: I) -> usize
    where
        I: IntoIterator<Item = Quote>,
    {
        let mut ids: HashSet<u64> = self.quotes.iter().map(|q| q.id).collect();
        let mut inserted = 0;
        for candidate in candidates {
            if ids.insert(candidate.id) {
                self.quotes.push(candidate);
                inserted += 1;
            }
        }
        inserted
    }
}
