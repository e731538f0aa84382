//! Per-board capture record lists with the recycling eviction policy.

use super::entity::EntityCache;
use crate::domain::Webhook;
use crate::metrics;
use std::time::Duration;

/// Board id -> bounded capture list.
///
/// Once a board's list reaches capacity, the record with the minimum
/// timestamp is overwritten in place, keeping its id. Memory per board is
/// O(capacity) regardless of traffic volume.
#[derive(Clone)]
pub struct WebhookCache {
    inner: EntityCache<Vec<Webhook>>,
    capacity: usize,
}

impl WebhookCache {
    pub fn new(max_entries: u64, idle_expiry: Duration, capacity: usize) -> Self {
        Self {
            inner: EntityCache::new(max_entries, idle_expiry),
            capacity,
        }
    }

    /// Replace the whole list, e.g. when re-hydrating from storage.
    pub fn set_webhooks(&self, board_id: &str, webhooks: Vec<Webhook>) {
        self.inner.put(board_id, webhooks);
    }

    /// Append or recycle, atomically with respect to other callers for the
    /// same board.
    ///
    /// Returns the record as stored: the incoming record on an append, or
    /// the mutated existing record on a recycle. Callers distinguish the two
    /// by comparing ids: equal ids mean a fresh insert (persist as CREATE),
    /// differing ids mean an existing row was rewritten (persist as UPDATE
    /// against the returned id).
    pub fn add_webhook(&self, board_id: &str, webhook: Webhook) -> Webhook {
        let capacity = self.capacity;
        let mut stored: Option<Webhook> = None;
        self.inner.upsert_with(board_id, |webhooks| {
            let mut webhooks = webhooks.unwrap_or_else(|| Vec::with_capacity(capacity));
            if webhooks.len() >= capacity {
                // the list is small enough that a linear scan beats keeping
                // an ordered structure in sync
                let oldest = webhooks
                    .iter_mut()
                    .min_by_key(|w| w.timestamp)
                    .expect("capacity is at least 1");
                let recycled_id = oldest.id.clone();
                *oldest = Webhook {
                    id: recycled_id,
                    ..webhook
                };
                stored = Some(oldest.clone());
                metrics::CAPTURE_RECYCLES_TOTAL.inc();
            } else {
                stored = Some(webhook.clone());
                webhooks.push(webhook);
            }
            webhooks
        });
        stored.expect("upsert closure runs exactly once")
    }

    /// Newest-first snapshot; empty when the board has no cached entry.
    pub fn webhooks(&self, board_id: &str) -> Vec<Webhook> {
        let mut webhooks = self.inner.get(board_id).unwrap_or_default();
        webhooks.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        webhooks
    }

    pub fn invalidate(&self, board_id: &str) {
        self.inner.invalidate(board_id);
    }

    pub fn invalidate_all(&self) {
        self.inner.invalidate_all();
    }
}
