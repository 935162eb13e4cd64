/*!
 * Blocked Queue
 * Bounded FIFO of process indices waiting for I/O service
 */

use crate::core::errors::InvariantViolation;
use crate::core::types::ProcessIndex;
use ringbuf::{traits::*, HeapRb};
use std::fmt;

/// Circular FIFO with capacity equal to the process count.
///
/// Service order is request order. Overflow can only come from a kernel bug,
/// since each process occupies at most one slot.
pub struct BlockedQueue {
    buffer: HeapRb<ProcessIndex>,
    capacity: usize,
}

impl BlockedQueue {
    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            buffer: HeapRb::new(capacity),
            capacity,
        }
    }

    pub fn enqueue(&mut self, index: ProcessIndex) -> Result<(), InvariantViolation> {
        self.buffer
            .try_push(index)
            .map_err(|index| InvariantViolation::QueueOverflow {
                capacity: self.capacity,
                index,
            })
    }

    pub fn dequeue(&mut self) -> Option<ProcessIndex> {
        self.buffer.try_pop()
    }

    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    pub fn len(&self) -> usize {
        self.buffer.occupied_len()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn contains(&self, index: ProcessIndex) -> bool {
        self.buffer.iter().any(|&i| i == index)
    }

    /// Queued indices, oldest first
    pub fn to_vec(&self) -> Vec<ProcessIndex> {
        self.buffer.iter().copied().collect()
    }
}

impl fmt::Debug for BlockedQueue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BlockedQueue")
            .field("queued", &self.to_vec())
            .field("capacity", &self.capacity)
            .finish()
    }
}
