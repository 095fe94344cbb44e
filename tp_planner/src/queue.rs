//! Fixed-capacity segment queue.
//!
//! Ring buffer over an arena allocated once when the queue is bound.
//! Front-to-back order is the commanded execution order (strict FIFO).
//! `pop_back` exists to undo the most recent push when a multi-step add
//! fails partway; `pop_front` is consumption by the executor. Every
//! operation after creation is O(1) and allocation-free.

use static_assertions::const_assert;

use crate::error::TpError;
use crate::segment::Segment;

/// Hard upper bound on queue capacity.
pub const MAX_QUEUE_CAPACITY: usize = 1024;

/// Capacity used by hosts that do not configure one.
pub const DEFAULT_QUEUE_CAPACITY: usize = 32;

const_assert!(DEFAULT_QUEUE_CAPACITY <= MAX_QUEUE_CAPACITY);

/// Ordered collection of segments over a fixed arena.
#[derive(Debug)]
pub struct SegmentQueue {
    arena: Box<[Segment]>,
    /// Arena index of the oldest element.
    start: usize,
    /// Logical length, ≤ capacity.
    len: usize,
}

impl SegmentQueue {
    /// Bind a new queue to a freshly allocated arena.
    ///
    /// The single allocation in this type; everything afterwards
    /// reuses the arena slots.
    pub fn with_capacity(capacity: usize) -> Result<Self, TpError> {
        if capacity == 0 || capacity > MAX_QUEUE_CAPACITY {
            return Err(TpError::InvalidLimit {
                name: "queue_capacity",
                value: capacity as f64,
            });
        }
        Ok(Self {
            arena: vec![Segment::default(); capacity].into_boxed_slice(),
            start: 0,
            len: 0,
        })
    }

    /// Empty the queue without touching the arena.
    #[inline]
    pub fn reset(&mut self) {
        self.start = 0;
        self.len = 0;
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    #[inline]
    pub fn is_full(&self) -> bool {
        self.len == self.arena.len()
    }

    #[inline]
    pub fn capacity(&self) -> usize {
        self.arena.len()
    }

    #[inline]
    fn slot(&self, index: usize) -> usize {
        (self.start + index) % self.arena.len()
    }

    /// Append a segment. Fails on a full queue without mutating state.
    pub fn push_back(&mut self, segment: Segment) -> Result<(), TpError> {
        if self.is_full() {
            return Err(TpError::QueueFull);
        }
        let slot = self.slot(self.len);
        self.arena[slot] = segment;
        self.len += 1;
        Ok(())
    }

    /// Remove and return the most recently pushed segment.
    pub fn pop_back(&mut self) -> Option<Segment> {
        if self.len == 0 {
            return None;
        }
        self.len -= 1;
        Some(self.arena[self.slot(self.len)])
    }

    /// Remove and return the oldest segment.
    pub fn pop_front(&mut self) -> Option<Segment> {
        if self.len == 0 {
            return None;
        }
        let seg = self.arena[self.start];
        self.start = self.slot(1);
        self.len -= 1;
        Some(seg)
    }

    /// Segment at `index` (0 = oldest).
    pub fn item(&self, index: usize) -> Option<&Segment> {
        if index < self.len {
            Some(&self.arena[self.slot(index)])
        } else {
            None
        }
    }

    /// Mutable segment at `index` (0 = oldest).
    pub fn item_mut(&mut self, index: usize) -> Option<&mut Segment> {
        if index < self.len {
            let slot = self.slot(index);
            Some(&mut self.arena[slot])
        } else {
            None
        }
    }

    /// Oldest segment.
    #[inline]
    pub fn front(&self) -> Option<&Segment> {
        self.item(0)
    }

    /// Most recently pushed segment.
    #[inline]
    pub fn last(&self) -> Option<&Segment> {
        self.len.checked_sub(1).and_then(|i| self.item(i))
    }

    /// Most recently pushed segment, mutable.
    #[inline]
    pub fn last_mut(&mut self) -> Option<&mut Segment> {
        self.len.checked_sub(1).and_then(|i| self.item_mut(i))
    }
}

// ─── Tests ──────────────────────────────────────────────────────────
