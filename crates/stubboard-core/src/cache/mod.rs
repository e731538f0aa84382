//! Bounded, access-expiring caches for the hot path.
//!
//! Every cache keys on board id. Reads never touch durable storage from
//! here; the services layer falls back to the persistence collaborator on a
//! miss and re-populates.

mod entity;
mod mock_rule;
mod rate_limiter;
mod webhook;

pub use entity::EntityCache;
pub use mock_rule::MockRuleCache;
pub use rate_limiter::{RateCategory, RateLimiter};
pub use webhook::WebhookCache;

use crate::domain::Board;
use crate::engine::PathRouter;
use std::sync::Arc;

/// Board id -> board.
pub type BoardCache = EntityCache<Board>;

/// Board id -> that board's compiled wildcard router. Invalidated on every
/// rule mutation and rebuilt lazily on the next execution.
pub type RouterCache = EntityCache<Arc<PathRouter>>;
