use crate::session::SessionRegistry;
use smartdoc_storage::Storage;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::interval;

/// Background reaper for stale uploads and idle sessions.
///
/// Session records that point at a reaped file are left alone; looking them up
/// afterwards reports the file as not found.
#[derive(Clone)]
pub struct CleanupService {
    storage: Arc<dyn Storage>,
    sessions: SessionRegistry,
    max_file_age: Duration,
    every: Duration,
}

impl CleanupService {
    pub fn new(
        storage: Arc<dyn Storage>,
        sessions: SessionRegistry,
        max_file_age: Duration,
        every: Duration,
    ) -> Self {
        Self {
            storage,
            sessions,
            max_file_age,
            every,
        }
    }

    /// Start the background cleanup loop. The first run happens immediately.
    /// Returns a JoinHandle for graceful shutdown
    pub fn start(self: Arc<Self>) -> tokio::task::JoinHandle<()> {
        tokio::spawn(async move {
            let mut cleanup_interval = interval(self.every);

            loop {
                cleanup_interval.tick().await;
                tracing::info!("Starting scheduled cleanup of stale uploads");
                self.run_once().await;
            }
        })
    }

    /// One reaper pass. Returns (files removed, sessions removed).
    #[tracing::instrument(skip(self), fields(cleanup.max_file_age_secs = self.max_file_age.as_secs()))]
    pub async fn run_once(&self) -> (usize, usize) {
        let files = match self.storage.purge_older_than(self.max_file_age).await {
            Ok(count) => count,
            Err(e) => {
                tracing::error!(error = %e, "Failed to purge stale uploads");
                0
            }
        };

        let sessions = self.sessions.prune_expired().await;

        tracing::info!(files, sessions, "Cleanup completed");
        (files, sessions)
    }
}
