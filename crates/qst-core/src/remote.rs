//! Remote data source: the request/response service quotes are pushed to
//! and pulled from.

use crate::config::SyncSettings;
use crate::error::{QuoteError, Result};
use crate::models::{Origin, Quote};
use async_trait::async_trait;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

/// Create request body in the remote's post schema
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteDraft {
    pub title: String,
    pub body: String,
    #[serde(rename = "userId")]
    pub user_id: u64,
}

impl RemoteDraft {
    pub fn from_quote(quote: &Quote) -> Self {
        Self {
            title: quote.text.clone(),
            body: quote.category.clone(),
            user_id: 1,
        }
    }
}

/// A record as listed by the remote. Only the fields the merge uses are
/// kept; the rest of the post is ignored.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RemoteRecord {
    pub id: u64,
    #[serde(default)]
    pub title: String,
}

impl RemoteRecord {
    /// Local shape of a pulled record, tagged with the remote category
    pub fn into_quote(self, category: &str) -> Quote {
        Quote::new(self.id, self.title, category, Origin::Remote)
    }
}

/// The remote service quotes are exchanged with.
///
/// This trait abstracts the network layer so the sync engine can run
/// against HTTP in production and a scripted mock in tests.
#[async_trait]
pub trait RemoteSource: Send + Sync {
    /// Send one create request. The remote's response body is not used.
    async fn create(&self, draft: &RemoteDraft) -> Result<()>;

    /// Fetch at most `limit` recent records.
    async fn list_recent(&self, limit: u32) -> Result<Vec<RemoteRecord>>;
}

/// JSONPlaceholder-style HTTP remote (`/posts`)
pub struct HttpRemote {
    client: reqwest::Client,
    base_url: String,
}

impl HttpRemote {
    pub fn new(base_url: impl Into<String>, timeout: Option<Duration>) -> Result<Self> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder
            .build()
            .map_err(|e| QuoteError::Config(format!("failed to build HTTP client: {e}")))?;
        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    pub fn from_settings(settings: &SyncSettings) -> Result<Self> {
        Self::new(
            settings.server_url.clone(),
            settings.request_timeout_seconds.map(Duration::from_secs),
        )
    }

    fn posts_url(&self) -> String {
        format!("{}/posts", self.base_url)
    }
}

#[async_trait]
impl RemoteSource for HttpRemote {
    async fn create(&self, draft: &RemoteDraft) -> Result<()> {
        self.client
            .post(self.posts_url())
            .json(draft)
            .send()
            .await?
            .error_for_status()?;
        Ok(())
    }

    async fn list_recent(&self, limit: u32) -> Result<Vec<RemoteRecord>> {
        let records = self
            .client
            .get(self.posts_url())
            .query(&[("_limit", limit)])
            .send()
            .await?
            .error_for_status()?
            .json::<Vec<RemoteRecord>>()
            .await?;
        Ok(records)
    }
}

/// A scripted remote for testing.
#[derive(Debug, Default)]
pub struct MockRemote {
    offline: AtomicBool,
    created: Mutex<Vec<RemoteDraft>>,
    records: Mutex<Vec<RemoteRecord>>,
    fail_create_after: Mutex<Option<usize>>,
    list_calls: Mutex<Vec<u32>>,
}

impl MockRemote {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records served by `list_recent`, truncated to the requested limit
    pub fn set_records(&self, records: Vec<RemoteRecord>) {
        *self.records.lock() = records;
    }

    /// Make every call fail with a transport error
    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    /// Accept `count` more create requests, then fail the rest
    pub fn fail_creates_after(&self, count: usize) {
        *self.fail_create_after.lock() = Some(count);
    }

    /// Create requests received so far
    pub fn created(&self) -> Vec<RemoteDraft> {
        self.created.lock().clone()
    }

    /// Limits passed to `list_recent` so far
    pub fn list_calls(&self) -> Vec<u32> {
        self.list_calls.lock().clone()
    }

    fn check_online(&self) -> Result<()> {
        if self.offline.load(Ordering::SeqCst) {
            Err(QuoteError::Transport("remote unreachable".into()))
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl RemoteSource for MockRemote {
    async fn create(&self, draft: &RemoteDraft) -> Result<()> {
        self.check_online()?;
        let mut budget = self.fail_create_after.lock();
        if let Some(remaining) = budget.as_mut() {
            if *remaining == 0 {
                return Err(QuoteError::Transport("remote answered 500".into()));
            }
            *remaining -= 1;
        }
        self.created.lock().push(draft.clone());
        Ok(())
    }

    async fn list_recent(&self, limit: u32) -> Result<Vec<RemoteRecord>> {
        self.check_online()?;
        self.list_calls.lock().push(limit);
        Ok(self
            .records
            .lock()
            .iter()
            .take(limit as usize)
            .cloned()
            .collect())
    }
}
