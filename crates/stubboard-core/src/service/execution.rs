//! Mock execution orchestration: router -> rule -> response.

use crate::cache::MockRuleCache;
use crate::config::ExecutionConfig;
use crate::domain::{Board, MockExecutionResult, MockRule, RequestMetadata};
use crate::metrics;
use crate::service::{MatchingService, MockRuleService};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, trace, warn};

const CONTENT_TYPE: &str = "Content-Type";
const APPLICATION_JSON: &str = "application/json";

/// Resolves an inbound mock request to a rule (or the default response).
/// A router miss is not an error; the caller always gets a response.
pub struct ExecutionService {
    matching: Arc<MatchingService>,
    rules: Arc<MockRuleService>,
    rule_cache: MockRuleCache,
    config: ExecutionConfig,
}

impl ExecutionService {
    pub fn new(
        matching: Arc<MatchingService>,
        rules: Arc<MockRuleService>,
        rule_cache: MockRuleCache,
        config: ExecutionConfig,
    ) -> Self {
        Self {
            matching,
            rules,
            rule_cache,
            config,
        }
    }

    pub async fn execute(&self, board: &Board, metadata: &RequestMetadata) -> MockExecutionResult {
        let rule = self.find_matching_rule(board, metadata).await;

        let status_code = rule.as_ref().map(|r| r.status_code).unwrap_or(200);
        let body = self.response_body(rule.as_ref());
        let headers = build_headers(rule.as_ref());

        metrics::EXECUTIONS_TOTAL
            .with_label_values(&[if rule.is_some() { "true" } else { "false" }])
            .inc();

        if let Some(delay_ms) = rule.as_ref().map(|r| r.delay_ms).filter(|&d| d > 0) {
            debug!(delay_ms, "applying configured response delay");
            tokio::time::sleep(Duration::from_millis(delay_ms)).await;
        }

        MockExecutionResult {
            rule,
            status_code,
            headers,
            body,
        }
    }

    async fn find_matching_rule(
        &self,
        board: &Board,
        metadata: &RequestMetadata,
    ) -> Option<MockRule> {
        let rule_id = self.matching.match_rule_id(board, &metadata.path).await?;

        // cache first; the router may be ahead of an expired rule-list entry,
        // in which case the list is re-hydrated from storage
        let cached = self.lookup_cached(&board.id, &rule_id, &metadata.method);
        if cached.is_some() {
            trace!(rule_id = %rule_id, "rule cache hit");
            return cached;
        }

        let rules = self.rules.list_rules(board).await.ok()?;
        rules
            .into_iter()
            .find(|r| r.id == rule_id && r.method.eq_ignore_ascii_case(&metadata.method))
    }

    fn lookup_cached(&self, board_id: &str, rule_id: &str, method: &str) -> Option<MockRule> {
        self.rule_cache
            .rules(board_id)
            .into_iter()
            .find(|r| r.id == rule_id && r.method.eq_ignore_ascii_case(method))
    }

    fn response_body(&self, rule: Option<&MockRule>) -> String {
        match rule {
            None => self.config.default_response_body.clone(),
            Some(rule) => match rule.body.as_deref() {
                None | Some("") => "{}".to_string(),
                Some(body) => body.to_string(),
            },
        }
    }
}

fn build_headers(rule: Option<&MockRule>) -> HashMap<String, String> {
    if let Some(serialized) = rule.and_then(|r| r.headers.as_deref()) {
        match serde_json::from_str::<HashMap<String, String>>(serialized) {
            Ok(map) if !map.is_empty() => return map,
            Ok(_) => {}
            Err(e) => warn!("failed to parse rule headers, using default: {e}"),
        }
    }
    HashMap::from([(CONTENT_TYPE.to_string(), APPLICATION_JSON.to_string())])
}
