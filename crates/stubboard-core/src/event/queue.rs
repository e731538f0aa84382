//! Per-entity-kind event buffers behind one publish surface.

use super::buffer::FifoBuffer;
use crate::domain::{Board, MockRule, Webhook};

/// One buffer per entity kind. Boards and mock rules mutate at a normal
/// cadence; the webhook buffer sees a far higher arrival rate, but upstream
/// recycling in the webhook cache already folds repeated rewrites of one
/// slot into single CREATE/UPDATE intents, so plain FIFO-with-drain
/// semantics are sufficient here too.
pub struct EventQueue {
    boards: FifoBuffer<Board>,
    mock_rules: FifoBuffer<MockRule>,
    webhooks: FifoBuffer<Webhook>,
}

impl EventQueue {
    pub fn new() -> Self {
        Self {
            boards: FifoBuffer::new(),
            mock_rules: FifoBuffer::new(),
            webhooks: FifoBuffer::new(),
        }
    }

    pub fn boards(&self) -> &FifoBuffer<Board> {
        &self.boards
    }

    pub fn mock_rules(&self) -> &FifoBuffer<MockRule> {
        &self.mock_rules
    }

    pub fn webhooks(&self) -> &FifoBuffer<Webhook> {
        &self.webhooks
    }
}

impl Default for EventQueue {
    fn default() -> Self {
        Self::new()
    }
}
