//! Mock rule CRUD with cache-first reads and write-behind update/delete.

use crate::cache::{MockRuleCache, RouterCache};
use crate::config::LimitsConfig;
use crate::domain::{Board, MockRule, MockRuleDraft};
use crate::error::{Error, Result};
use crate::event::{DomainEvent, EventQueue};
use crate::ids;
use crate::storage::MockRuleStore;
use crate::validate::MockRuleValidator;
use chrono::Utc;
use std::sync::Arc;
use tracing::{debug, info};

pub struct MockRuleService {
    limits: LimitsConfig,
    validator: MockRuleValidator,
    store: Arc<dyn MockRuleStore>,
    pub(crate) rule_cache: MockRuleCache,
    router_cache: RouterCache,
    events: Arc<EventQueue>,
}

/// Re-serialize a JSON string in compact form. Validation has already
/// guaranteed the input parses.
fn minify(json: &str) -> String {
    serde_json::from_str::<serde_json::Value>(json)
        .map(|v| v.to_string())
        .unwrap_or_else(|_| json.to_string())
}

impl MockRuleService {
    pub fn new(
        limits: LimitsConfig,
        validator: MockRuleValidator,
        store: Arc<dyn MockRuleStore>,
        rule_cache: MockRuleCache,
        router_cache: RouterCache,
        events: Arc<EventQueue>,
    ) -> Self {
        Self {
            limits,
            validator,
            store,
            rule_cache,
            router_cache,
            events,
        }
    }

    /// Create a rule. The row write is synchronous (it seeds the cache);
    /// the board's router registration is invalidated so the next execution
    /// rebuilds it.
    pub async fn create_rule(&self, board: &Board, draft: MockRuleDraft) -> Result<MockRule> {
        let existing = self.list_rules(board).await?;
        if existing.len() >= self.limits.max_mock_rules {
            return Err(Error::Validation(format!(
                "maximum number of mock rules exceeded, allowed: {}",
                self.limits.max_mock_rules
            )));
        }

        debug!(board_id = %board.id, "creating mock rule");
        self.validator.validate(&draft)?;

        let rule = MockRule {
            id: ids::generate_id(),
            board_id: board.id.clone(),
            method: draft.method.to_uppercase(),
            path: draft.path,
            headers: draft.headers.as_deref().map(minify),
            body: draft.body.as_deref().map(minify),
            status_code: draft.status_code,
            delay_ms: draft.delay_ms,
            created_at: Utc::now(),
        };

        self.store.insert(rule.clone()).await?;
        self.rule_cache.add_rule(&board.id, rule.clone());
        self.router_cache.invalidate(&board.id);

        info!(board_id = %board.id, rule_id = %rule.id, "mock rule added");
        Ok(rule)
    }

    /// Cached rule list for a board, newest first; falls back to storage and
    /// re-seeds the cache on a miss.
    pub async fn list_rules(&self, board: &Board) -> Result<Vec<MockRule>> {
        let cached = self.rule_cache.rules(&board.id);
        if !cached.is_empty() {
            return Ok(cached);
        }

        let persisted = self.store.find_by_board_id(&board.id).await?;
        if persisted.is_empty() {
            return Ok(Vec::new());
        }
        self.rule_cache.set_rules(&board.id, persisted);
        Ok(self.rule_cache.rules(&board.id))
    }

    /// Update a rule in place. The cache and router registration change
    /// immediately; the durable row follows on the next drain tick.
    pub async fn update_rule(
        &self,
        board: &Board,
        rule_id: &str,
        draft: MockRuleDraft,
    ) -> Result<MockRule> {
        debug!(board_id = %board.id, rule_id, "updating mock rule");
        self.validator.validate(&draft)?;

        let rules = self.list_rules(board).await?;
        let existing = rules
            .into_iter()
            .find(|r| r.id == rule_id)
            .ok_or_else(|| Error::NotFound(format!("mock rule {rule_id}")))?;

        let updated = MockRule {
            method: draft.method.to_uppercase(),
            path: draft.path,
            headers: draft.headers.as_deref().map(minify),
            body: draft.body.as_deref().map(minify),
            status_code: draft.status_code,
            delay_ms: draft.delay_ms,
            ..existing
        };

        self.rule_cache.update_rule(&board.id, updated.clone());
        self.router_cache.invalidate(&board.id);
        self.events
            .mock_rules()
            .publish(DomainEvent::update(updated.clone(), rule_id));

        Ok(updated)
    }

    /// Delete a rule. Cache and router react immediately; the durable
    /// delete is batched.
    pub async fn delete_rule(&self, board: &Board, rule_id: &str) -> Result<()> {
        let rules = self.list_rules(board).await?;
        if !rules.iter().any(|r| r.id == rule_id) {
            return Err(Error::NotFound(format!("mock rule {rule_id}")));
        }

        info!(board_id = %board.id, rule_id, "deleting mock rule");
        self.rule_cache.delete_rule(&board.id, rule_id);
        self.router_cache.invalidate(&board.id);
        self.events.mock_rules().publish(DomainEvent::delete(rule_id));
        Ok(())
    }
}
