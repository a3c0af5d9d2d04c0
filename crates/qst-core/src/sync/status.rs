//! Transient sync status shown to the user.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StatusLevel {
    Success,
    Failure,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SyncStatus {
    pub level: StatusLevel,
    pub message: String,
    pub posted_at: DateTime<Utc>,
}

impl SyncStatus {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            level: StatusLevel::Success,
            message: message.into(),
            posted_at: Utc::now(),
        }
    }

    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            level: StatusLevel::Failure,
            message: message.into(),
            posted_at: Utc::now(),
        }
    }
}

/// Single status slot observed by the presentation layer.
///
/// Every posted status starts its own expiry timer. When a timer fires it
/// clears the slot, even if a newer status replaced the one it belongs to.
#[derive(Clone)]
pub struct StatusBoard {
    tx: Arc<watch::Sender<Option<SyncStatus>>>,
    display_for: Duration,
}

impl StatusBoard {
    pub fn new(display_for: Duration) -> Self {
        let (tx, _rx) = watch::channel(None);
        Self {
            tx: Arc::new(tx),
            display_for,
        }
    }

    /// Status currently on display
    pub fn current(&self) -> Option<SyncStatus> {
        self.tx.borrow().clone()
    }

    /// Receiver notified whenever a status appears or is cleared
    pub fn subscribe(&self) -> watch::Receiver<Option<SyncStatus>> {
        self.tx.subscribe()
    }

    /// Show a status and schedule its expiry.
    ///
    /// Outside a tokio runtime the status stays until the next `clear`.
    pub fn post(&self, status: SyncStatus) {
        debug!(level = ?status.level, message = %status.message, "sync status");
        self.tx.send_replace(Some(status));

        match tokio::runtime::Handle::try_current() {
            Ok(handle) => {
                let tx = Arc::clone(&self.tx);
                let display_for = self.display_for;
                handle.spawn(async move {
                    tokio::time::sleep(display_for).await;
                    tx.send_replace(None);
                });
            }
            Err(_) => debug!("no runtime, status will not expire on its own"),
        }
    }

    pub fn clear(&self) {
        self.tx.send_replace(None);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn status_expires_after_display_time() {
        let board = StatusBoard::new(Duration::from_secs(3));
        board.post(SyncStatus::success("Sync completed successfully."));
        assert!(board.current().is_some());

        tokio::time::sleep(Duration::from_millis(2900)).await;
        assert!(board.current().is_some());

        tokio::time::sleep(Duration::from_millis(200)).await;
        assert!(board.current().is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn older_timer_clears_newer_status() {
        let board = StatusBoard::new(Duration::from_secs(3));
        board.post(SyncStatus::success("first"));

        tokio::time::sleep(Duration::from_secs(2)).await;
        board.post(SyncStatus::failure("second"));
        assert_eq!(board.current().unwrap().message, "second");

        // the first status's timer fires at t=3s and clears the slot
        tokio::time::sleep(Duration::from_millis(1100)).await;
        assert!(board.current().is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn subscribers_see_post_and_clear() {
        let board = StatusBoard::new(Duration::from_secs(3));
        let mut rx = board.subscribe();

        board.post(SyncStatus::failure("Sync failed."));
        rx.changed().await.unwrap();
        assert_eq!(rx.borrow_and_update().as_ref().unwrap().level, StatusLevel::Failure);

        rx.changed().await.unwrap();
        assert!(rx.borrow_and_update().is_none());
    }

    #[test]
    fn post_without_runtime_keeps_status() {
        let board = StatusBoard::new(Duration::from_secs(3));
        board.post(SyncStatus::success("ok"));
        assert!(board.current().is_some());
        board.clear();
        assert!(board.current().is_none());
    }
}
