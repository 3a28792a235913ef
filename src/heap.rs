//! Indexed event heap for the next-reaction method.
//!
//! A binary min-heap holding exactly one scheduled [`Event`] per process,
//! ordered by the event order (time, then descending rate, then index).
//! Alongside the heap sits the inverse index `point`, mapping a process
//! index to the heap slot holding its event, so that "the event for
//! process P" can be found and replaced in O(1) + O(log N) instead of
//! searching the heap.
//!
//! Slots are numbered from 1 (root) so that the children of slot `k`
//! are `2k` and `2k + 1`. Every swap updates `point` for both slots.

use crate::error::{StochError, StochResult};
use crate::event::Event;
use crate::process::ProcIndex;

#[derive(Debug, Clone)]
pub struct IndexedEventHeap {
    /// `slots[k - 1]` is heap slot `k`.
    slots: Vec<Event>,
    /// `point[p]` is the 1-based slot holding process `p`'s event.
    point: Vec<usize>,
}

impl IndexedEventHeap {
    /// Build the heap from one initial event per process.
    ///
    /// Fails if an event names a process outside `0..N`, or if two
    /// events name the same process. N in-range distinct indices cover
    /// every process, so no separate missing-index check is needed.
    pub fn new(mut events: Vec<Event>) -> StochResult<Self> {
        let len = events.len();
        // A sorted array already satisfies the heap property.
        events.sort_unstable();

        let mut point = vec![0usize; len];
        for (i, event) in events.iter().enumerate() {
            let index = event.process;
            let slot = point
                .get_mut(index.raw())
                .ok_or(StochError::IndexOutOfRange { index, len })?;
            if *slot != 0 {
                return Err(StochError::DuplicateIndex(index));
            }
            *slot = i + 1;
        }

        Ok(IndexedEventHeap {
            slots: events,
            point,
        })
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// The earliest scheduled event (the root). `None` only when empty.
    pub fn next_event(&self) -> Option<&Event> {
        self.slots.first()
    }

    /// The event currently scheduled for `process`.
    pub fn find_event(&self, process: ProcIndex) -> Option<&Event> {
        let slot = *self.point.get(process.raw())?;
        Some(self.slot(slot))
    }

    /// Replace the event of `event.process` and restore heap order.
    pub fn update_event(&mut self, event: Event) -> StochResult<()> {
        let index = event.process;
        let slot = *self.point.get(index.raw()).ok_or(StochError::IndexOutOfRange {
            index,
            len: self.point.len(),
        })?;
        self.slots[slot - 1] = event;
        // At most one of the two actually moves anything.
        let slot = self.sink(slot);
        self.swim(slot);
        Ok(())
    }

    /// Events in heap-array order (root first; not sorted).
    pub fn iter(&self) -> impl Iterator<Item = &Event> {
        self.slots.iter()
    }

    /// Full consistency check: heap order at every slot, and `point`
    /// pointing each process at its own event.
    pub fn validate(&self) -> StochResult<()> {
        for k in 2..=self.len() {
            if self.precedes(k, k / 2) {
                return Err(StochError::HeapOrderViolated { slot: k });
            }
        }
        for (p, &slot) in self.point.iter().enumerate() {
            let holds_p = slot >= 1
                && slot <= self.len()
                && self.slot(slot).process.raw() == p;
            if !holds_p {
                return Err(StochError::HeapIndexMismatch {
                    process: ProcIndex::new(p),
                    slot,
                });
            }
        }
        Ok(())
    }

    // ── Internals (1-based slots) ─────────────────────────

    #[inline]
    fn slot(&self, k: usize) -> &Event {
        &self.slots[k - 1]
    }

    #[inline]
    fn precedes(&self, a: usize, b: usize) -> bool {
        self.slot(a) < self.slot(b)
    }

    fn swap(&mut self, a: usize, b: usize) {
        self.slots.swap(a - 1, b - 1);
        self.point[self.slots[a - 1].process.raw()] = a;
        self.point[self.slots[b - 1].process.raw()] = b;
    }

    /// Move slot `k` toward the leaves; returns its final slot.
    fn sink(&mut self, mut k: usize) -> usize {
        let n = self.len();
        while 2 * k <= n {
            let mut child = 2 * k;
            if child < n && self.precedes(child + 1, child) {
                child += 1;
            }
            if !self.precedes(child, k) {
                break;
            }
            self.swap(k, child);
            k = child;
        }
        k
    }

    /// Move slot `k` toward the root; returns its final slot.
    fn swim(&mut self, mut k: usize) -> usize {
        while k > 1 && self.precedes(k, k / 2) {
            self.swap(k, k / 2);
            k /= 2;
        }
        k
    }
}
