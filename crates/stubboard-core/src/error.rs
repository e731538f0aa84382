//! Error taxonomy for the stubboard data plane.

use thiserror::Error;

/// Errors surfaced synchronously on the request path.
///
/// Background persistence failures never appear here; they are caught and
/// logged at the drain boundary (see `event::consumer`).
#[derive(Debug, Error)]
pub enum Error {
    /// Rejected before any cache or router mutation.
    #[error("validation failed: {0}")]
    Validation(String),

    /// Unknown board or mock rule id; no partial state change occurred.
    #[error("not found: {0}")]
    NotFound(String),

    /// Owner token did not match the board's token.
    #[error("invalid owner token")]
    Unauthorized,

    /// Fixed-window limit exhausted; rejected prior to any cache touch.
    #[error("rate limit exceeded")]
    RateLimited,

    /// Admission check refused the operation (e.g. too many active boards).
    #[error("forbidden: {0}")]
    Forbidden(String),

    /// Failure reported by a persistence backend.
    #[error("storage error: {0}")]
    Storage(String),
}

pub type Result<T> = std::result::Result<T, Error>;
