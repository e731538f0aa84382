//! Write-behind persistence pipeline.
//!
//! Mutation paths publish persistence intents into per-entity-kind buffers;
//! scheduled drain tasks batch them into the storage collaborator. Draining
//! is the only path that talks to durable storage for these entities; the
//! request path never blocks on it.

mod buffer;
mod consumer;
mod queue;

pub use buffer::FifoBuffer;
pub use consumer::EventConsumer;
pub use queue::EventQueue;

use chrono::{DateTime, Utc};

/// Persistence intent kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    Create,
    Update,
    Delete,
}

/// A pending persistence intent. Ephemeral: lives only inside a buffer
/// until drained, never persisted itself.
#[derive(Debug, Clone)]
pub struct DomainEvent<T> {
    pub kind: EventKind,
    /// Absent for deletes.
    pub entity: Option<T>,
    /// Absent for creates (the entity carries its own id).
    pub entity_id: Option<String>,
    pub timestamp: DateTime<Utc>,
}

impl<T> DomainEvent<T> {
    pub fn create(entity: T) -> Self {
        Self {
            kind: EventKind::Create,
            entity: Some(entity),
            entity_id: None,
            timestamp: Utc::now(),
        }
    }

    pub fn update(entity: T, entity_id: impl Into<String>) -> Self {
        Self {
            kind: EventKind::Update,
            entity: Some(entity),
            entity_id: Some(entity_id.into()),
            timestamp: Utc::now(),
        }
    }

    pub fn delete(entity_id: impl Into<String>) -> Self {
        Self {
            kind: EventKind::Delete,
            entity: None,
            entity_id: Some(entity_id.into()),
            timestamp: Utc::now(),
        }
    }
}
