//! Application context shared by the CLI session and the sync daemon.

use crate::collection::{QuoteCollection, SharedCollection};
use crate::config::{Config, SyncSettings};
use crate::error::{QuoteError, Result};
use crate::models::Quote;
use crate::remote::{HttpRemote, RemoteSource};
use crate::storage::{FileStore, KeyValueStore, MemoryStore, Preferences};
use crate::sync::{EngineSettings, StatusBoard, SyncEngine, SyncReport, SyncScheduler, SyncStatus};
use crate::transfer::{self, ImportSummary};
use crate::view::{self, Filter};
use rand::Rng;
use std::path::Path;
use std::sync::Arc;
use tokio::sync::watch;
use tracing::debug;

/// Owns the collection, the stores, the status board and the sync engine,
/// and exposes the user intents on top of them.
pub struct QuoteApp {
    collection: SharedCollection,
    prefs: Preferences,
    status: StatusBoard,
    engine: Arc<SyncEngine>,
    settings: SyncSettings,
}

impl QuoteApp {
    pub fn new(
        durable: Arc<dyn KeyValueStore>,
        session: Arc<dyn KeyValueStore>,
        remote: Arc<dyn RemoteSource>,
        settings: SyncSettings,
    ) -> Result<Self> {
        let collection = QuoteCollection::load(Arc::clone(&durable))?.into_shared();
        let status = StatusBoard::new(settings.status_duration());
        let engine = Arc::new(SyncEngine::new(
            Arc::clone(&collection),
            remote,
            status.clone(),
            EngineSettings::from(&settings),
        ));
        Ok(Self {
            collection,
            prefs: Preferences::new(durable, session),
            status,
            engine,
            settings,
        })
    }

    /// File store under the configured data directory, an in-memory
    /// session store and the HTTP remote.
    pub fn open(config: &Config) -> Result<Self> {
        let data_dir = config
            .data_dir()
            .map_err(|e| QuoteError::Config(e.to_string()))?;
        let durable = Arc::new(FileStore::open(data_dir)?);
        debug!(data_dir = %durable.dir().display(), "opened quote store");
        let remote = Arc::new(HttpRemote::from_settings(&config.sync)?);
        Self::new(
            durable,
            Arc::new(MemoryStore::new()),
            remote,
            config.sync.clone(),
        )
    }

    pub fn engine(&self) -> &Arc<SyncEngine> {
        &self.engine
    }

    pub fn settings(&self) -> &SyncSettings {
        &self.settings
    }

    pub fn add_quote(&self, text: &str, category: &str) -> Result<Quote> {
        self.collection.lock().add(text, category)
    }

    /// Persist the filter preference.
    pub fn set_filter(&self, filter: &Filter) -> Result<()> {
        self.prefs.set_selected_filter(filter)
    }

    pub fn current_filter(&self) -> Result<Filter> {
        self.prefs.selected_filter()
    }

    /// Quotes under the saved filter
    pub fn visible_quotes(&self) -> Result<Vec<Quote>> {
        let filter = self.current_filter()?;
        Ok(self.quotes_matching(&filter))
    }

    pub fn quotes_matching(&self, filter: &Filter) -> Vec<Quote> {
        let collection = self.collection.lock();
        view::filter_quotes(collection.quotes(), filter)
            .into_iter()
            .cloned()
            .collect()
    }

    pub fn categories(&self) -> Vec<String> {
        self.collection.lock().distinct_categories()
    }

    pub fn pending(&self) -> Vec<Quote> {
        self.collection.lock().pending_for_sync()
    }

    /// Random quote from `category`, remembered as the session's last quote.
    pub fn draw_random(&self, category: &str) -> Result<Option<Quote>> {
        self.draw_random_with(category, &mut rand::thread_rng())
    }

    pub fn draw_random_with<R: Rng + ?Sized>(
        &self,
        category: &str,
        rng: &mut R,
    ) -> Result<Option<Quote>> {
        let drawn = {
            let collection = self.collection.lock();
            view::random_quote(collection.quotes(), category, rng).cloned()
        };
        if let Some(quote) = &drawn {
            self.prefs.set_last_quote(&quote.text)?;
        }
        Ok(drawn)
    }

    pub fn last_quote(&self) -> Result<Option<String>> {
        self.prefs.last_quote()
    }

    pub fn export_json(&self) -> Result<String> {
        transfer::export_json(self.collection.lock().quotes())
    }

    pub async fn export_to(&self, path: &Path) -> Result<()> {
        let snapshot = self.collection.lock().quotes().to_vec();
        transfer::write_export(&snapshot, path).await
    }

    pub async fn import_file(&self, path: &Path) -> Result<ImportSummary> {
        let bytes = transfer::read_import_file(path).await?;
        self.import_bytes(&bytes)
    }

    pub fn import_bytes(&self, bytes: &[u8]) -> Result<ImportSummary> {
        transfer::import_into(&mut self.collection.lock(), bytes)
    }

    /// One sync cycle right now, subject to the overlap guard.
    pub async fn sync_now(&self) -> SyncReport {
        self.engine.run_cycle().await
    }

    /// Start periodic sync, unless it is disabled in the config.
    pub fn spawn_scheduler(&self) -> Option<SyncScheduler> {
        if !self.settings.enabled {
            debug!("periodic sync disabled");
            return None;
        }
        Some(SyncScheduler::spawn(
            Arc::clone(&self.engine),
            self.settings.interval(),
        ))
    }

    /// Receiver for the transient sync status
    pub fn status(&self) -> watch::Receiver<Option<SyncStatus>> {
        self.status.subscribe()
    }

    pub fn current_status(&self) -> Option<SyncStatus> {
        self.status.current()
    }
}
