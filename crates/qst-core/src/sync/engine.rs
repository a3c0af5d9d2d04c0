//! Sync engine state machine.

use super::status::{StatusBoard, SyncStatus};
use crate::collection::SharedCollection;
use crate::config::SyncSettings;
use crate::error::Result;
use crate::remote::{RemoteDraft, RemoteSource};
use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use serde::Serialize;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

/// Phase of the current sync cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SyncPhase {
    /// No cycle running.
    Idle,
    /// Sending locally created quotes.
    Pushing,
    /// Fetching the remote snapshot.
    Pulling,
    /// Merging the snapshot into the collection.
    Merging,
    /// Posting the cycle's status.
    Reporting,
}

impl SyncPhase {
    /// Returns true while a cycle is between start and report.
    pub fn is_active(&self) -> bool {
        !matches!(self, SyncPhase::Idle)
    }
}

/// How a cycle ended.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", content = "error", rename_all = "lowercase")]
pub enum CycleOutcome {
    Success,
    Failed(String),
    /// Another cycle was still in flight.
    Skipped,
}

/// Result of one sync cycle.
#[derive(Debug, Clone, Serialize)]
pub struct SyncReport {
    /// Create requests the remote accepted.
    pub pushed: usize,
    /// Id of the quote whose create request failed, if any.
    pub push_failed: Option<u64>,
    /// Records received from the remote.
    pub pulled: usize,
    /// Records that were new to the collection.
    pub merged: usize,
    pub outcome: CycleOutcome,
    /// Wall time of the cycle.
    #[serde(with = "duration_millis")]
    pub duration: Duration,
}

impl SyncReport {
    fn empty(outcome: CycleOutcome) -> Self {
        Self {
            pushed: 0,
            push_failed: None,
            pulled: 0,
            merged: 0,
            outcome,
            duration: Duration::ZERO,
        }
    }

    pub fn is_success(&self) -> bool {
        self.outcome == CycleOutcome::Success
    }

    /// Human-readable line for the status slot.
    pub fn summary(&self) -> String {
        match &self.outcome {
            CycleOutcome::Success if self.merged > 0 => {
                format!("Server sync: Added {} new quotes.", self.merged)
            }
            CycleOutcome::Success => "Sync completed successfully.".to_string(),
            CycleOutcome::Failed(_) => "Sync failed.".to_string(),
            CycleOutcome::Skipped => "Sync already in progress.".to_string(),
        }
    }
}

/// Statistics about sync operations.
#[derive(Debug, Clone, Default, Serialize)]
pub struct SyncStats {
    pub cycles_completed: u64,
    pub cycles_failed: u64,
    pub cycles_skipped: u64,
    pub quotes_pushed: u64,
    pub quotes_merged: u64,
    pub last_sync: Option<DateTime<Utc>>,
    pub last_error: Option<String>,
}

/// Engine tunables taken from `[sync]` in the config.
#[derive(Debug, Clone)]
pub struct EngineSettings {
    pub pull_limit: u32,
    pub remote_category: String,
}

impl From<&SyncSettings> for EngineSettings {
    fn from(settings: &SyncSettings) -> Self {
        Self {
            pull_limit: settings.pull_limit,
            remote_category: settings.remote_category.clone(),
        }
    }
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self::from(&SyncSettings::default())
    }
}

/// Reconciles the local collection with the remote: push pending quotes,
/// pull a bounded snapshot, merge it local-wins, report.
pub struct SyncEngine {
    collection: SharedCollection,
    remote: Arc<dyn RemoteSource>,
    status: StatusBoard,
    settings: EngineSettings,
    phase: RwLock<SyncPhase>,
    in_progress: AtomicBool,
    stats: RwLock<SyncStats>,
}

/// Releases the in-progress flag however the cycle ends.
struct CycleGuard<'a> {
    engine: &'a SyncEngine,
}

impl Drop for CycleGuard<'_> {
    fn drop(&mut self) {
        self.engine.set_phase(SyncPhase::Idle);
        self.engine.in_progress.store(false, Ordering::SeqCst);
    }
}

impl SyncEngine {
    pub fn new(
        collection: SharedCollection,
        remote: Arc<dyn RemoteSource>,
        status: StatusBoard,
        settings: EngineSettings,
    ) -> Self {
        Self {
            collection,
            remote,
            status,
            settings,
            phase: RwLock::new(SyncPhase::Idle),
            in_progress: AtomicBool::new(false),
            stats: RwLock::new(SyncStats::default()),
        }
    }

    pub fn phase(&self) -> SyncPhase {
        *self.phase.read()
    }

    pub fn stats(&self) -> SyncStats {
        self.stats.read().clone()
    }

    pub fn is_running(&self) -> bool {
        self.in_progress.load(Ordering::SeqCst)
    }

    fn set_phase(&self, phase: SyncPhase) {
        *self.phase.write() = phase;
    }

    /// Run one cycle. Never fails: errors end the cycle early and are
    /// reported through the status board and the returned report.
    pub async fn run_cycle(&self) -> SyncReport {
        if self
            .in_progress
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            debug!("sync cycle still in flight, skipping this one");
            self.stats.write().cycles_skipped += 1;
            return SyncReport::empty(CycleOutcome::Skipped);
        }
        let _guard = CycleGuard { engine: self };

        let start = Instant::now();
        let mut report = SyncReport::empty(CycleOutcome::Success);

        if let Err(e) = self.run_phases(&mut report).await {
            warn!("sync failed: {e}");
            report.outcome = CycleOutcome::Failed(e.to_string());
        }
        report.duration = start.elapsed();

        self.set_phase(SyncPhase::Reporting);
        self.record(&report);
        let status = if report.is_success() {
            SyncStatus::success(report.summary())
        } else {
            SyncStatus::failure(report.summary())
        };
        self.status.post(status);

        report
    }

    async fn run_phases(&self, report: &mut SyncReport) -> Result<()> {
        self.set_phase(SyncPhase::Pushing);
        self.push_pending(report).await?;

        self.set_phase(SyncPhase::Pulling);
        let records = self.remote.list_recent(self.settings.pull_limit).await?;
        report.pulled = records.len();
        debug!(count = records.len(), "pulled remote records");

        self.set_phase(SyncPhase::Merging);
        let category = &self.settings.remote_category;
        let candidates = records.into_iter().map(|r| r.into_quote(category));
        report.merged = self.collection.lock().merge(candidates)?;

        Ok(())
    }

    /// Sends pending quotes one at a time, in collection order. The pending
    /// set is read once, after picking up quotes other processes stored;
    /// quotes added meanwhile wait for the next cycle.
    async fn push_pending(&self, report: &mut SyncReport) -> Result<()> {
        let pending = {
            let mut collection = self.collection.lock();
            collection.refresh()?;
            collection.pending_for_sync()
        };
        if !pending.is_empty() {
            debug!(count = pending.len(), "pushing local quotes");
        }

        for quote in pending {
            let draft = RemoteDraft::from_quote(&quote);
            if let Err(e) = self.remote.create(&draft).await {
                report.push_failed = Some(quote.id);
                return Err(e);
            }
            if let Err(e) = self.collection.lock().mark_synced(quote.id) {
                report.push_failed = Some(quote.id);
                return Err(e);
            }
            report.pushed += 1;
        }
        Ok(())
    }

    fn record(&self, report: &SyncReport) {
        let mut stats = self.stats.write();
        stats.quotes_pushed += report.pushed as u64;
        stats.quotes_merged += report.merged as u64;
        match &report.outcome {
            CycleOutcome::Success => {
                stats.cycles_completed += 1;
                stats.last_sync = Some(Utc::now());
                stats.last_error = None;
                info!(
                    pushed = report.pushed,
                    pulled = report.pulled,
                    merged = report.merged,
                    "sync cycle completed"
                );
            }
            CycleOutcome::Failed(message) => {
                stats.cycles_failed += 1;
                stats.last_error = Some(message.clone());
            }
            CycleOutcome::Skipped => {}
        }
    }
}

mod duration_millis {
    use serde::Serializer;
    use std::time::Duration;

    pub fn serialize<S: Serializer>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(duration.as_millis() as u64)
    }
}
