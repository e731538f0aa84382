//! Domain entities and request/response values shared across the data plane.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A tenant-scoped container for mock rules and captured traffic.
///
/// The `id` is externally shareable (it doubles as the execution api key);
/// the `owner_token` is the capability secret guarding mutations.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Board {
    pub id: String,
    pub owner_token: String,
    pub created_at: DateTime<Utc>,
}

/// A method + path pattern mapped to a canned response.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MockRule {
    pub id: String,
    pub board_id: String,
    pub method: String,
    pub path: String,
    /// JSON object string, e.g. `{"X-Custom":"1"}`. Kept serialized.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub headers: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub body: Option<String>,
    pub status_code: u16,
    pub delay_ms: u64,
    pub created_at: DateTime<Utc>,
}

/// Caller-supplied fields of a mock rule, before ids and timestamps are
/// assigned. Used for both create and update.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MockRuleDraft {
    pub method: String,
    pub path: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub headers: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub body: Option<String>,
    pub status_code: u16,
    #[serde(default)]
    pub delay_ms: u64,
}

/// A capture record of real traffic received against a board's execution
/// endpoint, whether or not a rule fired.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Webhook {
    pub id: String,
    pub board_id: String,
    pub method: String,
    pub path: String,
    pub full_url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub query_params: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub headers: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub body: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content_type: Option<String>,
    pub status_code: u16,
    pub matched: bool,
    pub timestamp: DateTime<Utc>,
    pub processing_time_ms: u64,
}

/// The inbound request as seen by the execution endpoint, stripped of any
/// HTTP-framework types. Built by the (out-of-scope) dispatch layer.
#[derive(Debug, Clone, Default)]
pub struct RequestMetadata {
    pub method: String,
    /// Path below the board's execution mount point, e.g. `/api/test`.
    pub path: String,
    pub full_url: String,
    pub query_params: Option<String>,
    pub headers: Option<String>,
    pub body: Option<String>,
    pub content_type: Option<String>,
    /// Caller identity for rate limiting; falls back to the board key.
    pub client_ip: Option<String>,
}

/// Outcome of resolving a mock request: either a rule fired, or the default
/// response was produced.
#[derive(Debug, Clone)]
pub struct MockExecutionResult {
    pub rule: Option<MockRule>,
    pub status_code: u16,
    pub headers: HashMap<String, String>,
    pub body: String,
}

impl MockExecutionResult {
    pub fn matched(&self) -> bool {
        self.rule.is_some()
    }
}
