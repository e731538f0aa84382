//! In-memory storage backends.
//!
//! Hash maps behind `parking_lot` locks, with soft-delete flags mirroring
//! what a relational/document backend would do. Useful for testing,
//! development and single-instance deployments.

use super::{BoardStore, MockRuleStore, WebhookStore};
use crate::domain::{Board, MockRule, Webhook};
use crate::error::Result;
use async_trait::async_trait;
use parking_lot::RwLock;
use std::collections::HashMap;

struct Row<T> {
    entity: T,
    deleted: bool,
}

impl<T> Row<T> {
    fn live(entity: T) -> Self {
        Self {
            entity,
            deleted: false,
        }
    }
}

#[derive(Default)]
pub struct MemoryBoardStore {
    rows: RwLock<HashMap<String, Row<Board>>>,
}

impl MemoryBoardStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl BoardStore for MemoryBoardStore {
    async fn find_by_id(&self, id: &str) -> Result<Option<Board>> {
        let rows = self.rows.read();
        Ok(rows
            .get(id)
            .filter(|row| !row.deleted)
            .map(|row| row.entity.clone()))
    }

    async fn insert(&self, board: Board) -> Result<()> {
        self.rows.write().insert(board.id.clone(), Row::live(board));
        Ok(())
    }

    async fn batch_insert(&self, boards: Vec<Board>) -> Result<()> {
        let mut rows = self.rows.write();
        for board in boards {
            rows.insert(board.id.clone(), Row::live(board));
        }
        Ok(())
    }

    async fn batch_update(&self, boards: Vec<Board>) -> Result<()> {
        let mut rows = self.rows.write();
        for board in boards {
            if let Some(row) = rows.get_mut(&board.id) {
                row.entity = board;
            }
        }
        Ok(())
    }

    async fn batch_delete(&self, ids: Vec<String>) -> Result<()> {
        let mut rows = self.rows.write();
        for id in ids {
            if let Some(row) = rows.get_mut(&id) {
                row.deleted = true;
            }
        }
        Ok(())
    }

    async fn mark_deleted(&self, id: &str) -> Result<bool> {
        let mut rows = self.rows.write();
        match rows.get_mut(id) {
            Some(row) => {
                row.deleted = true;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn purge_deleted(&self) -> Result<usize> {
        let mut rows = self.rows.write();
        let before = rows.len();
        rows.retain(|_, row| !row.deleted);
        Ok(before - rows.len())
    }

    async fn count(&self) -> Result<u64> {
        Ok(self.rows.read().values().filter(|r| !r.deleted).count() as u64)
    }
}

#[derive(Default)]
pub struct MemoryMockRuleStore {
    rows: RwLock<HashMap<String, Row<MockRule>>>,
}

impl MemoryMockRuleStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl MockRuleStore for MemoryMockRuleStore {
    async fn find_by_board_id(&self, board_id: &str) -> Result<Vec<MockRule>> {
        let rows = self.rows.read();
        Ok(rows
            .values()
            .filter(|row| !row.deleted && row.entity.board_id == board_id)
            .map(|row| row.entity.clone())
            .collect())
    }

    async fn insert(&self, rule: MockRule) -> Result<()> {
        self.rows.write().insert(rule.id.clone(), Row::live(rule));
        Ok(())
    }

    async fn batch_insert(&self, rules: Vec<MockRule>) -> Result<()> {
        let mut rows = self.rows.write();
        for rule in rules {
            rows.insert(rule.id.clone(), Row::live(rule));
        }
        Ok(())
    }

    async fn batch_update(&self, rules: Vec<MockRule>) -> Result<()> {
        let mut rows = self.rows.write();
        for rule in rules {
            if let Some(row) = rows.get_mut(&rule.id) {
                row.entity = rule;
            }
        }
        Ok(())
    }

    async fn batch_delete(&self, ids: Vec<String>) -> Result<()> {
        let mut rows = self.rows.write();
        for id in ids {
            if let Some(row) = rows.get_mut(&id) {
                row.deleted = true;
            }
        }
        Ok(())
    }

    async fn purge_deleted(&self) -> Result<usize> {
        let mut rows = self.rows.write();
        let before = rows.len();
        rows.retain(|_, row| !row.deleted);
        Ok(before - rows.len())
    }

    async fn count(&self) -> Result<u64> {
        Ok(self.rows.read().values().filter(|r| !r.deleted).count() as u64)
    }
}

#[derive(Default)]
pub struct MemoryWebhookStore {
    rows: RwLock<HashMap<String, Webhook>>,
}

impl MemoryWebhookStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl WebhookStore for MemoryWebhookStore {
    async fn find_by_board_id(&self, board_id: &str) -> Result<Vec<Webhook>> {
        let rows = self.rows.read();
        Ok(rows
            .values()
            .filter(|w| w.board_id == board_id)
            .cloned()
            .collect())
    }

    async fn batch_insert(&self, webhooks: Vec<Webhook>) -> Result<()> {
        let mut rows = self.rows.write();
        for webhook in webhooks {
            rows.insert(webhook.id.clone(), webhook);
        }
        Ok(())
    }

    async fn batch_update(&self, webhooks: Vec<Webhook>) -> Result<()> {
        let mut rows = self.rows.write();
        for webhook in webhooks {
            rows.insert(webhook.id.clone(), webhook);
        }
        Ok(())
    }

    async fn count(&self) -> Result<u64> {
        Ok(self.rows.read().len() as u64)
    }
}
