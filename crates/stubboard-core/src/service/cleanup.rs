//! Periodic hard-delete of soft-deleted rows.

use crate::config::CleanupConfig;
use crate::storage::{BoardStore, MockRuleStore};
use std::sync::Arc;
use tokio::sync::broadcast;
use tracing::{error, info};

/// Sweeps soft-deleted boards and rules out of storage on independent
/// intervals, in the same loop shape as the drain tasks.
pub struct CleanupService {
    boards: Arc<dyn BoardStore>,
    mock_rules: Arc<dyn MockRuleStore>,
    config: CleanupConfig,
}

impl CleanupService {
    pub fn new(
        boards: Arc<dyn BoardStore>,
        mock_rules: Arc<dyn MockRuleStore>,
        config: CleanupConfig,
    ) -> Self {
        Self {
            boards,
            mock_rules,
            config,
        }
    }

    pub fn spawn(self: Arc<Self>, shutdown: &broadcast::Sender<()>) {
        let board_period = std::time::Duration::from_secs(self.config.boards_interval_secs);
        let rule_period = std::time::Duration::from_secs(self.config.mock_rules_interval_secs);

        let cleanup = Arc::clone(&self);
        let mut shutdown_rx = shutdown.subscribe();
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(board_period);
            ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
            loop {
                tokio::select! {
                    _ = ticker.tick() => cleanup.purge_boards().await,
                    _ = shutdown_rx.recv() => break,
                }
            }
        });

        let cleanup = self;
        let mut shutdown_rx = shutdown.subscribe();
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(rule_period);
            ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
            loop {
                tokio::select! {
                    _ = ticker.tick() => cleanup.purge_mock_rules().await,
                    _ = shutdown_rx.recv() => break,
                }
            }
        });
    }

    pub async fn purge_boards(&self) {
        match self.boards.purge_deleted().await {
            Ok(count) if count > 0 => info!(count, "hard deleted soft-deleted boards"),
            Ok(_) => {}
            Err(e) => error!("board cleanup failed: {e}"),
        }
    }

    pub async fn purge_mock_rules(&self) {
        match self.mock_rules.purge_deleted().await {
            Ok(count) if count > 0 => info!(count, "hard deleted soft-deleted mock rules"),
            Ok(_) => {}
            Err(e) => error!("mock rule cleanup failed: {e}"),
        }
    }
}
