//! Per-board router resolution.

use crate::cache::RouterCache;
use crate::config::LimitsConfig;
use crate::domain::Board;
use crate::engine::PathRouter;
use crate::service::MockRuleService;
use std::sync::Arc;
use tracing::{debug, error, info, trace};

/// Resolves a request path to a rule id through the board's cached router,
/// building the router from the board's rule list on a miss.
pub struct MatchingService {
    limits: LimitsConfig,
    rules: Arc<MockRuleService>,
    routers: RouterCache,
}

impl MatchingService {
    pub fn new(limits: LimitsConfig, rules: Arc<MockRuleService>, routers: RouterCache) -> Self {
        Self {
            limits,
            rules,
            routers,
        }
    }

    pub async fn match_rule_id(&self, board: &Board, path: &str) -> Option<String> {
        let router = match self.routers.get(&board.id) {
            Some(router) => router,
            None => {
                let router = Arc::new(self.build_router(board).await);
                self.routers.put(&board.id, Arc::clone(&router));
                router
            }
        };

        let rule_id = router.match_path(path);
        match &rule_id {
            Some(id) => trace!(board_id = %board.id, path, rule_id = %id, "path matched"),
            None => debug!(board_id = %board.id, path, "no matching rule"),
        }
        rule_id
    }

    /// Register every rule's path, keeping registration failures per-rule so
    /// one bad pattern never aborts the whole build.
    async fn build_router(&self, board: &Board) -> PathRouter {
        debug!(board_id = %board.id, "building router");

        let router = PathRouter::new(self.limits.max_wildcards, self.limits.max_path_length);
        let rules = self.rules.list_rules(board).await.unwrap_or_default();
        let total = rules.len();
        let mut registered = 0;
        for rule in &rules {
            match router.register(&rule.path, &rule.id) {
                Ok(()) => registered += 1,
                Err(e) => {
                    error!(pattern = %rule.path, rule_id = %rule.id, "failed to register pattern: {e}")
                }
            }
        }

        info!(board_id = %board.id, registered, total, "built router");
        router
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::{MockRuleCache, RouterCache};
    use crate::domain::{MockRule, MockRuleDraft};
    use crate::event::EventQueue;
    use crate::storage::MemoryMockRuleStore;
    use crate::validate::MockRuleValidator;
    use chrono::Utc;
    use std::time::Duration;

    fn board() -> Board {
        Board {
            id: "board-1".to_string(),
            owner_token: "secret".to_string(),
            created_at: Utc::now(),
        }
    }

    fn matching() -> (MatchingService, Arc<MockRuleService>, RouterCache) {
        let limits = LimitsConfig::default();
        let ttl = Duration::from_secs(60);
        let routers = RouterCache::new(100, ttl);
        let rules = Arc::new(MockRuleService::new(
            limits.clone(),
            MockRuleValidator::new(limits.clone()),
            Arc::new(MemoryMockRuleStore::new()),
            MockRuleCache::new(100, ttl),
            routers.clone(),
            Arc::new(EventQueue::new()),
        ));
        (
            MatchingService::new(limits, Arc::clone(&rules), routers.clone()),
            rules,
            routers,
        )
    }

    fn draft(path: &str) -> MockRuleDraft {
        MockRuleDraft {
            method: "GET".to_string(),
            path: path.to_string(),
            headers: None,
            body: None,
            status_code: 200,
            delay_ms: 0,
        }
    }

    #[tokio::test]
    async fn test_match_builds_and_caches_router() {
        let (matching, rules, routers) = matching();
        let rule = rules.create_rule(&board(), draft("/api/test")).await.unwrap();
        // rule creation invalidated whatever was cached
        assert!(routers.get("board-1").is_none());

        let matched = matching.match_rule_id(&board(), "/api/test").await;
        assert_eq!(matched.as_deref(), Some(rule.id.as_str()));
        assert!(routers.get("board-1").is_some());
    }

    #[tokio::test]
    async fn test_no_rules_means_no_match() {
        let (matching, _rules, _routers) = matching();
        assert!(matching.match_rule_id(&board(), "/anything").await.is_none());
    }

    #[tokio::test]
    async fn test_bad_pattern_skipped_without_aborting_build() {
        let (matching, rules, _routers) = matching();
        let good = rules.create_rule(&board(), draft("/api/ok")).await.unwrap();

        // seed a rule whose pattern the router rejects (too many wildcards);
        // it can only arrive through the cache, bypassing the validator
        let bad = MockRule {
            id: "bad".to_string(),
            board_id: "board-1".to_string(),
            method: "GET".to_string(),
            path: "/*/*/*/*".to_string(),
            headers: None,
            body: None,
            status_code: 200,
            delay_ms: 0,
            created_at: Utc::now(),
        };
        rules.rule_cache.add_rule("board-1", bad);

        let matched = matching.match_rule_id(&board(), "/api/ok").await;
        assert_eq!(matched.as_deref(), Some(good.id.as_str()));
        assert!(matching
            .match_rule_id(&board(), "/a/b/c/d")
            .await
            .is_none());
    }
}
