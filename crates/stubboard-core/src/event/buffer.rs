//! Unbounded FIFO event buffer.

use super::DomainEvent;
use crossbeam::queue::SegQueue;
use tracing::debug;

/// Lock-free FIFO of pending persistence intents for one entity kind.
///
/// Unbounded: if the drain cadence cannot keep up with the publish rate,
/// memory grows; an accepted design limit. The buffer persists across
/// skipped or delayed ticks.
pub struct FifoBuffer<T> {
    queue: SegQueue<DomainEvent<T>>,
}

impl<T> FifoBuffer<T> {
    pub fn new() -> Self {
        Self {
            queue: SegQueue::new(),
        }
    }

    /// Non-blocking enqueue.
    pub fn publish(&self, event: DomainEvent<T>) {
        debug!(kind = ?event.kind, "event buffered");
        self.queue.push(event);
    }

    /// Atomically remove and return up to `max` oldest events, leaving the
    /// rest for the next tick. An event is returned by exactly one drain.
    pub fn drain(&self, max: usize) -> Vec<DomainEvent<T>> {
        let mut batch = Vec::new();
        while batch.len() < max {
            match self.queue.pop() {
                Some(event) => batch.push(event),
                None => break,
            }
        }
        batch
    }

    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }
}

impl<T> Default for FifoBuffer<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_drain_preserves_fifo_order() {
        let buffer = FifoBuffer::new();
        for i in 0..5 {
            buffer.publish(DomainEvent::create(i));
        }
        let batch = buffer.drain(10);
        let values: Vec<_> = batch.into_iter().filter_map(|e| e.entity).collect();
        assert_eq!(values, vec![0, 1, 2, 3, 4]);
    }

    #[test]
    fn test_drain_respects_max() {
        let buffer = FifoBuffer::new();
        for i in 0..10 {
            buffer.publish(DomainEvent::create(i));
        }
        assert_eq!(buffer.drain(3).len(), 3);
        assert_eq!(buffer.len(), 7);
    }

    #[test]
    fn test_drained_events_never_repeat() {
        let buffer = FifoBuffer::new();
        for i in 0..10 {
            buffer.publish(DomainEvent::create(i));
        }
        let first: Vec<_> = buffer.drain(6).into_iter().filter_map(|e| e.entity).collect();
        let second: Vec<_> = buffer.drain(6).into_iter().filter_map(|e| e.entity).collect();
        assert_eq!(first.len(), 6);
        assert_eq!(second.len(), 4);
        assert!(first.iter().all(|v| !second.contains(v)));
    }

    #[test]
    fn test_drain_on_empty_returns_nothing() {
        let buffer: FifoBuffer<u32> = FifoBuffer::new();
        assert!(buffer.drain(5).is_empty());
    }

    #[test]
    fn test_concurrent_publish_drains_everything() {
        use std::sync::Arc;
        use std::thread;

        let buffer = Arc::new(FifoBuffer::new());
        let handles: Vec<_> = (0..8)
            .map(|t| {
                let buffer = Arc::clone(&buffer);
                thread::spawn(move || {
                    for i in 0..100 {
                        buffer.publish(DomainEvent::create(t * 100 + i));
                    }
                })
            })
            .collect();
        for h in handles {
            h.join().unwrap();
        }

        let mut seen = Vec::new();
        loop {
            let batch = buffer.drain(64);
            if batch.is_empty() {
                break;
            }
            seen.extend(batch.into_iter().filter_map(|e| e.entity));
        }
        seen.sort();
        seen.dedup();
        assert_eq!(seen.len(), 800);
    }
}
