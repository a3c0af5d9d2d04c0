//! Periodic trigger for sync cycles.

use super::engine::SyncEngine;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tracing::debug;

/// Fires a sync cycle every `period`, first one `period` after spawning.
///
/// Each tick starts its cycle on its own task, so a slow cycle never delays
/// the next tick; the engine skips cycles that would overlap. Dropping the
/// scheduler stops further ticks but lets a running cycle finish.
pub struct SyncScheduler {
    handle: JoinHandle<()>,
    period: Duration,
}

impl SyncScheduler {
    /// Must be called from within a tokio runtime.
    pub fn spawn(engine: Arc<SyncEngine>, period: Duration) -> Self {
        debug!(?period, "starting sync scheduler");
        let handle = tokio::spawn(async move {
            let mut ticker = interval_at(Instant::now() + period, period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
            loop {
                ticker.tick().await;
                let engine = Arc::clone(&engine);
                tokio::spawn(async move {
                    engine.run_cycle().await;
                });
            }
        });
        Self { handle, period }
    }

    pub fn period(&self) -> Duration {
        self.period
    }

    pub fn is_running(&self) -> bool {
        !self.handle.is_finished()
    }
}

impl Drop for SyncScheduler {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collection::QuoteCollection;
    use crate::error::Result;
    use crate::models::seed_quotes;
    use crate::remote::{MockRemote, RemoteDraft, RemoteRecord, RemoteSource};
    use crate::storage::MemoryStore;
    use crate::sync::engine::EngineSettings;
    use crate::sync::status::StatusBoard;
    use async_trait::async_trait;

    fn engine(remote: Arc<dyn RemoteSource>) -> Arc<SyncEngine> {
        let collection =
            QuoteCollection::from_quotes(seed_quotes(), Arc::new(MemoryStore::new())).into_shared();
        Arc::new(SyncEngine::new(
            collection,
            remote,
            StatusBoard::new(Duration::from_secs(3)),
            EngineSettings::default(),
        ))
    }

    /// Remote whose listing takes longer than one scheduler period
    struct SlowRemote {
        delay: Duration,
    }

    #[async_trait]
    impl RemoteSource for SlowRemote {
        async fn create(&self, _draft: &RemoteDraft) -> Result<()> {
            Ok(())
        }

        async fn list_recent(&self, _limit: u32) -> Result<Vec<RemoteRecord>> {
            tokio::time::sleep(self.delay).await;
            Ok(Vec::new())
        }
    }

    #[tokio::test(start_paused = true)]
    async fn first_cycle_waits_one_period() {
        let remote = Arc::new(MockRemote::new());
        let scheduler = SyncScheduler::spawn(engine(remote.clone()), Duration::from_secs(15));
        assert!(scheduler.is_running());

        tokio::time::sleep(Duration::from_secs(14)).await;
        assert!(remote.list_calls().is_empty());

        tokio::time::sleep(Duration::from_secs(2)).await;
        assert_eq!(remote.list_calls().len(), 1);

        tokio::time::sleep(Duration::from_secs(15)).await;
        assert_eq!(remote.list_calls().len(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn overlapping_tick_is_skipped() {
        let engine = engine(Arc::new(SlowRemote {
            delay: Duration::from_secs(20),
        }));
        let _scheduler = SyncScheduler::spawn(Arc::clone(&engine), Duration::from_secs(15));

        // t=15 starts a cycle that lasts until t=35; t=30 finds it running
        tokio::time::sleep(Duration::from_secs(31)).await;
        assert!(engine.is_running());
        assert_eq!(engine.stats().cycles_skipped, 1);

        tokio::time::sleep(Duration::from_secs(5)).await;
        assert!(!engine.is_running());
        assert_eq!(engine.stats().cycles_completed, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn dropping_stops_ticks() {
        let remote = Arc::new(MockRemote::new());
        let scheduler = SyncScheduler::spawn(engine(remote.clone()), Duration::from_secs(15));
        tokio::time::sleep(Duration::from_secs(16)).await;
        assert_eq!(remote.list_calls().len(), 1);

        drop(scheduler);
        tokio::time::sleep(Duration::from_secs(60)).await;
        assert_eq!(remote.list_calls().len(), 1);
    }
}
