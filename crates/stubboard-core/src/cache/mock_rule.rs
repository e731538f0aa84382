//! Per-board mock rule lists.

use super::entity::EntityCache;
use crate::domain::MockRule;
use std::time::Duration;

/// Board id -> full ordered rule list. Reads return newest-first by
/// creation timestamp.
#[derive(Clone)]
pub struct MockRuleCache {
    inner: EntityCache<Vec<MockRule>>,
}

impl MockRuleCache {
    pub fn new(max_entries: u64, idle_expiry: Duration) -> Self {
        Self {
            inner: EntityCache::new(max_entries, idle_expiry),
        }
    }

    /// Replace the whole list, e.g. when re-hydrating from storage.
    pub fn set_rules(&self, board_id: &str, rules: Vec<MockRule>) {
        self.inner.put(board_id, rules);
    }

    pub fn add_rule(&self, board_id: &str, rule: MockRule) {
        self.inner.upsert_with(board_id, |rules| {
            let mut rules = rules.unwrap_or_default();
            rules.push(rule);
            rules
        });
    }

    pub fn update_rule(&self, board_id: &str, rule: MockRule) {
        self.inner.upsert_with(board_id, |rules| {
            let mut rules = rules.unwrap_or_default();
            rules.retain(|r| r.id != rule.id);
            rules.push(rule);
            rules
        });
    }

    pub fn delete_rule(&self, board_id: &str, rule_id: &str) {
        self.inner.upsert_with(board_id, |rules| {
            let mut rules = rules.unwrap_or_default();
            rules.retain(|r| r.id != rule_id);
            rules
        });
    }

    /// Newest-first snapshot; empty when the board has no cached entry.
    pub fn rules(&self, board_id: &str) -> Vec<MockRule> {
        let mut rules = self.inner.get(board_id).unwrap_or_default();
        rules.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        rules
    }

    pub fn invalidate(&self, board_id: &str) {
        self.inner.invalidate(board_id);
    }

    pub fn invalidate_all(&self) {
        self.inner.invalidate_all();
    }
}
