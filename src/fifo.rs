//! Single-lane bounded queue with level-sensitive push/pop and a
//! registered valid latch, modelling a SystemC-style hardware FIFO.
use std::collections::VecDeque;

use crate::error::SimError;

#[derive(Debug, Clone)]
pub struct Fifo<T> {
    depth: usize,
    queue: VecDeque<T>,
    /// Rises the cycle after a successful pop, holds while the consumer
    /// keeps requesting and the queue stays non-empty.
    valid: bool,
}

impl<T: Clone> Fifo<T> {
    pub fn new(depth: usize) -> Self {
        assert!(depth > 0, "FIFO depth must be positive");
        Self {
            depth,
            queue: VecDeque::with_capacity(depth),
            valid: false,
        }
    }

    pub fn depth(&self) -> usize {
        self.depth
    }

    pub fn occupancy(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.queue.len() == self.depth
    }

    /// Push a value into the tail of the queue. Overflowing a full FIFO is
    /// a protocol violation, not a silently dropped write.
    pub fn push(&mut self, value: T) -> Result<(), SimError> {
        if self.is_full() {
            return Err(SimError::Protocol(format!(
                "FIFO overflow: depth {} exceeded",
                self.depth
            )));
        }
        self.queue.push_back(value);
        Ok(())
    }

    /// Attempt to pop the head of the queue. `request` models the
    /// consumer's read-enable signal for this cycle; `valid()` reflects
    /// the outcome of the *previous* cycle's request, matching the
    /// one-cycle latency of a registered valid bit.
    pub fn pop(&mut self, request: bool) -> Option<T> {
        let popped = if request {
            self.queue.pop_front()
        } else {
            None
        };
        self.valid = request && popped.is_some();
        popped
    }

    /// Pop without consumer handshaking; returns `None` on underflow
    /// instead of raising an error (the agreed-upon underflow sentinel).
    pub fn try_pop(&mut self) -> Option<T> {
        self.queue.pop_front()
    }

    pub fn valid(&self) -> bool {
        self.valid
    }

    pub fn reset(&mut self) {
        self.queue.clear();
        self.valid = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn push_pop_round_trip() {
        let mut f = Fifo::new(2);
        f.push(1).unwrap();
        f.push(2).unwrap();
        assert!(f.is_full());
        assert_eq!(f.pop(true), Some(1));
        assert!(f.valid());
        assert_eq!(f.pop(true), Some(2));
        assert!(f.is_empty());
        assert_eq!(f.pop(true), None);
        assert!(!f.valid());
    }

    #[test]
    fn overflow_is_protocol_error() {
        let mut f = Fifo::new(1);
        f.push(1).unwrap();
        assert!(matches!(f.push(2), Err(SimError::Protocol(_))));
    }

    #[test]
    fn valid_drops_when_not_requested() {
        let mut f: Fifo<i32> = Fifo::new(1);
        f.push(9).unwrap();
        assert_eq!(f.pop(false), None);
        assert!(!f.valid());
    }
}
