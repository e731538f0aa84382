//! Composition root.
//!
//! All shared state (caches, counters, buffers) is explicitly constructed
//! here with configured bounds and owned for the process lifetime; no
//! package-level globals.

use crate::broadcast::Broadcaster;
use crate::cache::{
    BoardCache, MockRuleCache, RateCategory, RateLimiter, RouterCache, WebhookCache,
};
use crate::config::Config;
use crate::domain::{Board, MockExecutionResult, RequestMetadata};
use crate::error::{Error, Result};
use crate::event::{EventConsumer, EventQueue};
use crate::service::{
    BoardService, CleanupService, ExecutionService, MatchingService, MockRuleService,
    WebhookService,
};
use crate::storage::Stores;
use crate::validate::MockRuleValidator;
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::broadcast;
use tracing::info;

pub struct App {
    pub config: Config,
    pub boards: Arc<BoardService>,
    pub rules: Arc<MockRuleService>,
    pub execution: Arc<ExecutionService>,
    pub webhooks: Arc<WebhookService>,
    pub rate_limiter: Arc<RateLimiter>,
    consumer: Arc<EventConsumer>,
    cleanup: Arc<CleanupService>,
    shutdown_tx: broadcast::Sender<()>,
}

impl App {
    pub fn new(config: Config, stores: Stores, broadcaster: Arc<dyn Broadcaster>) -> Self {
        let limits = config.limits.clone();
        let cache_entries = config.caches.max_entries;
        let idle = config.caches.idle_expiry();

        let board_cache = BoardCache::new(cache_entries, idle);
        let rule_cache = MockRuleCache::new(cache_entries, idle);
        let webhook_cache = WebhookCache::new(cache_entries, idle, limits.max_webhooks);
        let router_cache = RouterCache::new(cache_entries, idle);

        let events = Arc::new(EventQueue::new());
        let rate_limiter = Arc::new(RateLimiter::new(&config.rate_limits));

        let boards = Arc::new(BoardService::new(
            limits.clone(),
            stores.boards.clone(),
            board_cache,
            rule_cache.clone(),
            webhook_cache.clone(),
            router_cache.clone(),
        ));
        let rules = Arc::new(MockRuleService::new(
            limits.clone(),
            MockRuleValidator::new(limits.clone()),
            stores.mock_rules.clone(),
            rule_cache.clone(),
            router_cache.clone(),
            Arc::clone(&events),
        ));
        let matching = Arc::new(MatchingService::new(
            limits,
            Arc::clone(&rules),
            router_cache,
        ));
        let execution = Arc::new(ExecutionService::new(
            matching,
            Arc::clone(&rules),
            rule_cache,
            config.execution.clone(),
        ));
        let webhooks = Arc::new(WebhookService::new(
            webhook_cache,
            stores.webhooks.clone(),
            Arc::clone(&events),
            broadcaster,
        ));
        let consumer = Arc::new(EventConsumer::new(
            Arc::clone(&events),
            stores.clone(),
            config.events.clone(),
        ));
        let cleanup = Arc::new(CleanupService::new(
            stores.boards.clone(),
            stores.mock_rules.clone(),
            config.cleanup.clone(),
        ));

        let (shutdown_tx, _) = broadcast::channel(1);

        Self {
            config,
            boards,
            rules,
            execution,
            webhooks,
            rate_limiter,
            consumer,
            cleanup,
            shutdown_tx,
        }
    }

    /// Start the background schedulers (drain tasks and cleanup sweeps).
    pub fn start(&self) {
        Arc::clone(&self.consumer).spawn(&self.shutdown_tx);
        Arc::clone(&self.cleanup).spawn(&self.shutdown_tx);
        info!("background schedulers started");
    }

    /// Stop the background schedulers. Buffered events not yet drained are
    /// lost; caches remain the source of truth for reads.
    pub fn shutdown(&self) {
        let _ = self.shutdown_tx.send(());
        info!("shutdown signal sent");
    }

    /// Rate-gated board creation keyed by caller identity.
    pub async fn create_board(&self, client_ip: &str) -> Result<Board> {
        if !self
            .rate_limiter
            .allow(RateCategory::BoardCreation, client_ip)
            || !self.rate_limiter.allow(RateCategory::General, client_ip)
        {
            return Err(Error::RateLimited);
        }
        self.boards.create_board().await
    }

    /// The full inbound mock request flow: admission check, synchronous
    /// resolution, then fire-and-forget capture processing. The response
    /// never waits on persistence or broadcast.
    pub async fn handle_mock_request(
        &self,
        api_key: &str,
        metadata: RequestMetadata,
    ) -> Result<MockExecutionResult> {
        let caller = metadata.client_ip.as_deref().unwrap_or(api_key);
        if !self
            .rate_limiter
            .allow(RateCategory::MockExecution, caller)
            || !self.rate_limiter.allow(RateCategory::General, caller)
        {
            return Err(Error::RateLimited);
        }

        let board = self.boards.get_board(api_key).await?;

        let started = Instant::now();
        let result = self.execution.execute(&board, &metadata).await;
        let elapsed_ms = started.elapsed().as_millis() as u64;

        let webhooks = Arc::clone(&self.webhooks);
        let board_id = board.id.clone();
        let capture_result = result.clone();
        tokio::spawn(async move {
            webhooks
                .process_capture(&board_id, metadata, &capture_result, elapsed_ms)
                .await;
        });

        Ok(result)
    }

    /// Deterministically flush all pending events, bypassing the schedulers.
    /// Intended for tests and shutdown paths.
    pub async fn flush_events(&self) {
        self.consumer.drain_boards().await;
        self.consumer.drain_mock_rules().await;
        self.consumer.drain_webhooks().await;
    }
}
