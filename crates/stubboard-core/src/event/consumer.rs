//! Scheduled batch persistence of buffered events.

use super::{DomainEvent, EventKind, EventQueue};
use crate::config::EventConfig;
use crate::metrics;
use crate::storage::Stores;
use std::sync::Arc;
use tokio::sync::broadcast;
use tracing::{error, info, warn};

/// Drains each entity-kind buffer on its own interval and issues batched
/// storage calls, grouped by event kind. A failed batch is logged and
/// dropped; the in-memory caches stay authoritative for reads, so no
/// user-visible behavior changes until a restart.
pub struct EventConsumer {
    queue: Arc<EventQueue>,
    stores: Stores,
    config: EventConfig,
}

/// Events split by kind: entities to create, entities to update, ids to
/// delete. Delete events without an id are ignored.
struct GroupedBatch<T> {
    creates: Vec<T>,
    updates: Vec<T>,
    delete_ids: Vec<String>,
}

fn group_by_kind<T>(events: Vec<DomainEvent<T>>) -> GroupedBatch<T> {
    let mut grouped = GroupedBatch {
        creates: Vec::new(),
        updates: Vec::new(),
        delete_ids: Vec::new(),
    };
    for event in events {
        match event.kind {
            EventKind::Create => grouped.creates.extend(event.entity),
            EventKind::Update => grouped.updates.extend(event.entity),
            EventKind::Delete => grouped.delete_ids.extend(event.entity_id),
        }
    }
    grouped
}

impl EventConsumer {
    pub fn new(queue: Arc<EventQueue>, stores: Stores, config: EventConfig) -> Self {
        Self {
            queue,
            stores,
            config,
        }
    }

    /// Spawn one independent drain loop per entity kind. Each loop exits on
    /// the shutdown signal; events still buffered at that point are lost.
    pub fn spawn(self: Arc<Self>, shutdown: &broadcast::Sender<()>) {
        let intervals = [
            self.config.boards.interval(),
            self.config.mock_rules.interval(),
            self.config.webhooks.interval(),
        ];
        for (idx, period) in intervals.into_iter().enumerate() {
            let consumer = Arc::clone(&self);
            let mut shutdown_rx = shutdown.subscribe();
            tokio::spawn(async move {
                let mut ticker = tokio::time::interval(period);
                ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
                loop {
                    tokio::select! {
                        _ = ticker.tick() => match idx {
                            0 => consumer.drain_boards().await,
                            1 => consumer.drain_mock_rules().await,
                            _ => consumer.drain_webhooks().await,
                        },
                        _ = shutdown_rx.recv() => break,
                    }
                }
            });
        }
    }

    pub async fn drain_boards(&self) {
        let events = self.queue.boards().drain(self.config.boards.batch_size);
        if events.is_empty() {
            return;
        }
        let grouped = group_by_kind(events);
        let result = async {
            if !grouped.creates.is_empty() {
                let count = grouped.creates.len();
                self.stores.boards.batch_insert(grouped.creates).await?;
                record_flush("board", "create", count);
            }
            if !grouped.updates.is_empty() {
                let count = grouped.updates.len();
                self.stores.boards.batch_update(grouped.updates).await?;
                record_flush("board", "update", count);
            }
            if !grouped.delete_ids.is_empty() {
                let count = grouped.delete_ids.len();
                self.stores.boards.batch_delete(grouped.delete_ids).await?;
                record_flush("board", "delete", count);
            }
            crate::error::Result::Ok(())
        }
        .await;

        if let Err(e) = result {
            error!("failed to process board batch: {e}");
            metrics::BATCHES_DROPPED_TOTAL
                .with_label_values(&["board"])
                .inc();
        }
    }

    pub async fn drain_mock_rules(&self) {
        let events = self
            .queue
            .mock_rules()
            .drain(self.config.mock_rules.batch_size);
        if events.is_empty() {
            return;
        }
        let grouped = group_by_kind(events);
        let result = async {
            if !grouped.creates.is_empty() {
                let count = grouped.creates.len();
                self.stores.mock_rules.batch_insert(grouped.creates).await?;
                record_flush("mock_rule", "create", count);
            }
            if !grouped.updates.is_empty() {
                let count = grouped.updates.len();
                self.stores.mock_rules.batch_update(grouped.updates).await?;
                record_flush("mock_rule", "update", count);
            }
            if !grouped.delete_ids.is_empty() {
                let count = grouped.delete_ids.len();
                self.stores
                    .mock_rules
                    .batch_delete(grouped.delete_ids)
                    .await?;
                record_flush("mock_rule", "delete", count);
            }
            crate::error::Result::Ok(())
        }
        .await;

        if let Err(e) = result {
            error!("failed to process mock rule batch: {e}");
            metrics::BATCHES_DROPPED_TOTAL
                .with_label_values(&["mock_rule"])
                .inc();
        }
    }

    pub async fn drain_webhooks(&self) {
        let events = self.queue.webhooks().drain(self.config.webhooks.batch_size);
        if events.is_empty() {
            return;
        }
        let grouped = group_by_kind(events);
        if !grouped.delete_ids.is_empty() {
            warn!("webhook delete events are unsupported and were discarded");
        }
        let result = async {
            if !grouped.creates.is_empty() {
                let count = grouped.creates.len();
                self.stores.webhooks.batch_insert(grouped.creates).await?;
                record_flush("webhook", "create", count);
            }
            if !grouped.updates.is_empty() {
                let count = grouped.updates.len();
                self.stores.webhooks.batch_update(grouped.updates).await?;
                record_flush("webhook", "update", count);
            }
            crate::error::Result::Ok(())
        }
        .await;

        if let Err(e) = result {
            error!("failed to process webhook batch: {e}");
            metrics::BATCHES_DROPPED_TOTAL
                .with_label_values(&["webhook"])
                .inc();
        }
    }
}

fn record_flush(entity: &str, op: &str, count: usize) {
    info!(entity, op, count, "flushed events");
    metrics::EVENTS_FLUSHED_TOTAL
        .with_label_values(&[entity, op])
        .inc_by(count as u64);
}
