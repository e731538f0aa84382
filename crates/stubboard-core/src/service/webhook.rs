//! Capture pipeline: build the record, recycle-or-append, fan out.

use crate::broadcast::Broadcaster;
use crate::cache::WebhookCache;
use crate::domain::{Board, MockExecutionResult, RequestMetadata, Webhook};
use crate::error::Result;
use crate::event::{DomainEvent, EventQueue};
use crate::ids;
use crate::storage::WebhookStore;
use chrono::Utc;
use std::sync::Arc;
use tracing::{debug, error};

pub struct WebhookService {
    cache: WebhookCache,
    store: Arc<dyn WebhookStore>,
    events: Arc<EventQueue>,
    broadcaster: Arc<dyn Broadcaster>,
}

impl WebhookService {
    pub fn new(
        cache: WebhookCache,
        store: Arc<dyn WebhookStore>,
        events: Arc<EventQueue>,
        broadcaster: Arc<dyn Broadcaster>,
    ) -> Self {
        Self {
            cache,
            store,
            events,
            broadcaster,
        }
    }

    /// A board's captures, newest first, re-hydrating the cache from storage
    /// when the entry expired.
    pub async fn list_webhooks(&self, board: &Board) -> Result<Vec<Webhook>> {
        let cached = self.cache.webhooks(&board.id);
        if !cached.is_empty() {
            return Ok(cached);
        }
        self.hydrate(&board.id).await
    }

    /// Off-request-path capture processing. Builds the record, pushes it
    /// through the recycling cache, then forwards the outcome to the event
    /// queue and the live broadcast. Never fails the request path: errors
    /// are logged and swallowed.
    pub async fn process_capture(
        &self,
        board_id: &str,
        metadata: RequestMetadata,
        result: &MockExecutionResult,
        processing_time_ms: u64,
    ) {
        // seed the list first so recycling sees previously persisted rows
        if self.cache.webhooks(board_id).is_empty() {
            debug!(board_id, "initializing webhook cache");
            if let Err(e) = self.hydrate(board_id).await {
                error!(board_id, "failed to hydrate webhook cache: {e}");
            }
        }

        let webhook = Webhook {
            id: ids::generate_id(),
            board_id: board_id.to_string(),
            method: metadata.method,
            path: metadata.path,
            full_url: metadata.full_url,
            query_params: metadata.query_params,
            headers: metadata.headers,
            body: metadata.body,
            content_type: metadata.content_type,
            status_code: result.status_code,
            matched: result.matched(),
            timestamp: Utc::now(),
            processing_time_ms,
        };

        let incoming_id = webhook.id.clone();
        let stored = self.cache.add_webhook(board_id, webhook);

        // equal ids: fresh insert, persist as CREATE; differing ids: an
        // existing row was rewritten in place, persist as UPDATE against it
        if stored.id == incoming_id {
            self.events
                .webhooks()
                .publish(DomainEvent::create(stored.clone()));
        } else {
            self.events
                .webhooks()
                .publish(DomainEvent::update(stored.clone(), stored.id.clone()));
        }
        self.broadcaster.broadcast(board_id, &stored);
    }

    async fn hydrate(&self, board_id: &str) -> Result<Vec<Webhook>> {
        let persisted = self.store.find_by_board_id(board_id).await?;
        if persisted.is_empty() {
            return Ok(Vec::new());
        }
        self.cache.set_webhooks(board_id, persisted);
        Ok(self.cache.webhooks(board_id))
    }
}
