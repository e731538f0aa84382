//! Live-update broadcast collaborator.
//!
//! The transport (SSE or otherwise) lives outside the data plane; this seam
//! only pushes capture records at subscribers, fire-and-forget. Failures are
//! swallowed; a dropped live update never affects the request path.

use crate::domain::Webhook;
use tracing::trace;

pub trait Broadcaster: Send + Sync {
    fn broadcast(&self, board_id: &str, webhook: &Webhook);
}

/// Discards every payload. Default wiring when no live transport is mounted.
pub struct NoopBroadcaster;

impl Broadcaster for NoopBroadcaster {
    fn broadcast(&self, board_id: &str, _webhook: &Webhook) {
        trace!(board_id, "broadcast dropped (no transport)");
    }
}

/// Fans captures out over a tokio broadcast channel; the live transport
/// subscribes on the other end. Send errors (no subscribers) are swallowed.
pub struct ChannelBroadcaster {
    tx: tokio::sync::broadcast::Sender<(String, Webhook)>,
}

impl ChannelBroadcaster {
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = tokio::sync::broadcast::channel(capacity);
        Self { tx }
    }

    pub fn subscribe(&self) -> tokio::sync::broadcast::Receiver<(String, Webhook)> {
        self.tx.subscribe()
    }
}

impl Broadcaster for ChannelBroadcaster {
    fn broadcast(&self, board_id: &str, webhook: &Webhook) {
        let _ = self.tx.send((board_id.to_string(), webhook.clone()));
    }
}
