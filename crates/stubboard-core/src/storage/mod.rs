//! Persistence collaborator interfaces.
//!
//! The data plane consumes durable storage through these narrow traits.
//! Outside the initial synchronous board/rule create, all writes arrive as
//! batches from the drain tasks, never row at a time.

mod memory;

pub use memory::{MemoryBoardStore, MemoryMockRuleStore, MemoryWebhookStore};

use crate::domain::{Board, MockRule, Webhook};
use crate::error::Result;
use async_trait::async_trait;
use std::sync::Arc;

#[async_trait]
pub trait BoardStore: Send + Sync {
    /// Fetch a live (non-soft-deleted) board.
    async fn find_by_id(&self, id: &str) -> Result<Option<Board>>;
    async fn insert(&self, board: Board) -> Result<()>;
    async fn batch_insert(&self, boards: Vec<Board>) -> Result<()>;
    async fn batch_update(&self, boards: Vec<Board>) -> Result<()>;
    /// Soft-delete the marked rows.
    async fn batch_delete(&self, ids: Vec<String>) -> Result<()>;
    async fn mark_deleted(&self, id: &str) -> Result<bool>;
    /// Hard-delete previously soft-deleted rows. Returns how many went.
    async fn purge_deleted(&self) -> Result<usize>;
    async fn count(&self) -> Result<u64>;
}

#[async_trait]
pub trait MockRuleStore: Send + Sync {
    /// Live rules for a board, unordered; callers sort.
    async fn find_by_board_id(&self, board_id: &str) -> Result<Vec<MockRule>>;
    async fn insert(&self, rule: MockRule) -> Result<()>;
    async fn batch_insert(&self, rules: Vec<MockRule>) -> Result<()>;
    async fn batch_update(&self, rules: Vec<MockRule>) -> Result<()>;
    async fn batch_delete(&self, ids: Vec<String>) -> Result<()>;
    async fn purge_deleted(&self) -> Result<usize>;
    async fn count(&self) -> Result<u64>;
}

/// Webhooks are append/recycle only; there is no delete surface.
#[async_trait]
pub trait WebhookStore: Send + Sync {
    async fn find_by_board_id(&self, board_id: &str) -> Result<Vec<Webhook>>;
    async fn batch_insert(&self, webhooks: Vec<Webhook>) -> Result<()>;
    async fn batch_update(&self, webhooks: Vec<Webhook>) -> Result<()>;
    async fn count(&self) -> Result<u64>;
}

/// The full set of persistence collaborators handed to the composition root.
#[derive(Clone)]
pub struct Stores {
    pub boards: Arc<dyn BoardStore>,
    pub mock_rules: Arc<dyn MockRuleStore>,
    pub webhooks: Arc<dyn WebhookStore>,
}

impl Stores {
    /// In-memory backends, for tests and single-process deployments without
    /// a durable mirror.
    pub fn in_memory() -> Self {
        Self {
            boards: Arc::new(MemoryBoardStore::new()),
            mock_rules: Arc::new(MemoryMockRuleStore::new()),
            webhooks: Arc::new(MemoryWebhookStore::new()),
        }
    }
}
