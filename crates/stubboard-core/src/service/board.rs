//! Board lifecycle: create, fetch, ownership check, soft delete.

use crate::cache::{BoardCache, MockRuleCache, RouterCache, WebhookCache};
use crate::config::LimitsConfig;
use crate::domain::Board;
use crate::error::{Error, Result};
use crate::ids;
use crate::storage::BoardStore;
use chrono::Utc;
use std::sync::Arc;
use tracing::{debug, info};

pub struct BoardService {
    limits: LimitsConfig,
    store: Arc<dyn BoardStore>,
    board_cache: BoardCache,
    rule_cache: MockRuleCache,
    webhook_cache: WebhookCache,
    router_cache: RouterCache,
}

impl BoardService {
    pub fn new(
        limits: LimitsConfig,
        store: Arc<dyn BoardStore>,
        board_cache: BoardCache,
        rule_cache: MockRuleCache,
        webhook_cache: WebhookCache,
        router_cache: RouterCache,
    ) -> Self {
        Self {
            limits,
            store,
            board_cache,
            rule_cache,
            webhook_cache,
            router_cache,
        }
    }

    /// Create a board with a fresh id and owner token. The row write is
    /// synchronous and also seeds the cache.
    pub async fn create_board(&self) -> Result<Board> {
        if let Some(max_active) = self.limits.max_active_boards {
            if self.board_cache.size() >= max_active {
                return Err(Error::Forbidden(
                    "maximum number of active boards exceeded".to_string(),
                ));
            }
        }

        let board = Board {
            id: ids::generate_board_id(self.limits.board_id_length),
            owner_token: ids::generate_token(self.limits.owner_token_length),
            created_at: Utc::now(),
        };
        self.store.insert(board.clone()).await?;
        self.board_cache.put(&board.id, board.clone());

        info!(board_id = %board.id, "created board");
        Ok(board)
    }

    /// Fetch a live board, re-hydrating the cache from storage on a miss.
    pub async fn get_board(&self, board_id: &str) -> Result<Board> {
        if let Some(board) = self.board_cache.get(board_id) {
            debug!(board_id, "board cache hit");
            return Ok(board);
        }

        debug!(board_id, "board cache miss, falling back to storage");
        let board = self
            .store
            .find_by_id(board_id)
            .await?
            .ok_or_else(|| Error::NotFound(format!("board {board_id}")))?;
        self.board_cache.put(&board.id, board.clone());
        Ok(board)
    }

    /// Fetch the board and require its owner token.
    pub async fn validate_ownership(&self, board_id: &str, owner_token: &str) -> Result<Board> {
        let board = self.get_board(board_id).await?;
        if board.owner_token != owner_token {
            return Err(Error::Unauthorized);
        }
        Ok(board)
    }

    /// Soft delete: every per-board cache entry goes first, then the row is
    /// marked; the cleanup sweep hard-deletes it later.
    pub async fn delete_board(&self, board: &Board) -> Result<()> {
        info!(board_id = %board.id, "soft deleting board");

        self.board_cache.invalidate(&board.id);
        self.rule_cache.invalidate(&board.id);
        self.webhook_cache.invalidate(&board.id);
        self.router_cache.invalidate(&board.id);

        self.store.mark_deleted(&board.id).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryBoardStore;
    use std::time::Duration;

    fn service(limits: LimitsConfig) -> BoardService {
        let ttl = Duration::from_secs(60);
        BoardService::new(
            limits,
            Arc::new(MemoryBoardStore::new()),
            BoardCache::new(100, ttl),
            MockRuleCache::new(100, ttl),
            WebhookCache::new(100, ttl, 10),
            RouterCache::new(100, ttl),
        )
    }

    #[tokio::test]
    async fn test_create_and_get_board() {
        let svc = service(LimitsConfig::default());
        let board = svc.create_board().await.unwrap();
        assert_eq!(board.id.len(), LimitsConfig::default().board_id_length);
        assert_eq!(
            board.owner_token.len(),
            LimitsConfig::default().owner_token_length
        );

        let fetched = svc.get_board(&board.id).await.unwrap();
        assert_eq!(fetched.id, board.id);
    }

    #[tokio::test]
    async fn test_get_board_falls_back_to_storage() {
        let svc = service(LimitsConfig::default());
        let board = svc.create_board().await.unwrap();
        svc.board_cache.invalidate(&board.id);

        let fetched = svc.get_board(&board.id).await.unwrap();
        assert_eq!(fetched.id, board.id);
        // re-populated
        assert!(svc.board_cache.get(&board.id).is_some());
    }

    #[tokio::test]
    async fn test_unknown_board_is_not_found() {
        let svc = service(LimitsConfig::default());
        assert!(matches!(
            svc.get_board("missing").await,
            Err(Error::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_ownership_check() {
        let svc = service(LimitsConfig::default());
        let board = svc.create_board().await.unwrap();

        assert!(svc
            .validate_ownership(&board.id, &board.owner_token)
            .await
            .is_ok());
        assert!(matches!(
            svc.validate_ownership(&board.id, "wrong-token").await,
            Err(Error::Unauthorized)
        ));
    }

    #[tokio::test]
    async fn test_delete_board_invalidates_and_hides() {
        let svc = service(LimitsConfig::default());
        let board = svc.create_board().await.unwrap();
        svc.delete_board(&board).await.unwrap();

        assert!(svc.board_cache.get(&board.id).is_none());
        assert!(matches!(
            svc.get_board(&board.id).await,
            Err(Error::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_max_active_boards_admission() {
        let limits = LimitsConfig {
            max_active_boards: Some(1),
            ..LimitsConfig::default()
        };
        let svc = service(limits);
        svc.create_board().await.unwrap();
        assert!(matches!(
            svc.create_board().await,
            Err(Error::Forbidden(_))
        ));
    }
}
