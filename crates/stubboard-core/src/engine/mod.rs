//! Wildcard path matching for mock rule resolution.
//!
//! Patterns are pre-parsed into segments at registration time and matched by
//! direct segment comparison, without a regex engine, so lookup latency stays flat
//! under high call volume.

mod pattern;
mod router;

pub use pattern::{count_wildcards, normalize_trailing_slash, PathPattern, WILDCARD};
pub use router::PathRouter;
