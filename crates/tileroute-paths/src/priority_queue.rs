//! Indexed priority queue for search frontiers.
//!
//! Entries are `(key, priority)` pairs kept in a binary heap together with a
//! key-to-slot index, so a key can be re-prioritised in O(log n). The heap is
//! ordered by `(priority, insertion_order)`: among equal priorities the entry
//! pushed first wins (FIFO). Changing the priority of an entry counts as a
//! fresh insertion for tie-breaking purposes.

use std::cmp::Ordering;
use std::collections::HashMap;
use std::hash::Hash;

/// Which end of the priority scale is dequeued first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum QueueOrder {
    /// Smallest priority first.
    #[default]
    Ascending,
    /// Largest priority first.
    Descending,
}

#[derive(Debug, Clone, Copy)]
struct Entry<K> {
    key: K,
    priority: f64,
    /// Monotonically increasing counter used to break ties.
    seq: u64,
}

#[derive(Debug, Clone)]
pub struct PriorityQueue<K> {
    order: QueueOrder,
    heap: Vec<Entry<K>>,
    slots: HashMap<K, usize>,
    seq: u64,
}

impl<K: Copy + Eq + Hash> Default for PriorityQueue<K> {
    fn default() -> Self {
        Self::new(QueueOrder::Ascending)
    }
}

impl<K: Copy + Eq + Hash> PriorityQueue<K> {
    pub fn new(order: QueueOrder) -> Self {
        Self {
            order,
            heap: Vec::new(),
            slots: HashMap::new(),
            seq: 0,
        }
    }

    #[inline]
    pub fn order(&self) -> QueueOrder {
        self.order
    }

    /// Insert `key` with `priority`. Returns false, leaving the queue
    /// untouched, if the key is already queued.
    ///
    /// Priorities must not be NaN.
    pub fn push(&mut self, key: K, priority: f64) -> bool {
        debug_assert!(!priority.is_nan(), "NaN priority");
        if self.slots.contains_key(&key) {
            return false;
        }
        let seq = self.next_seq();
        let slot = self.heap.len();
        self.heap.push(Entry { key, priority, seq });
        self.slots.insert(key, slot);
        self.sift_up(slot);
        true
    }

    /// Remove and return the best entry.
    pub fn pop_best(&mut self) -> Option<(K, f64)> {
        if self.heap.is_empty() {
            return None;
        }
        let last = self.heap.len() - 1;
        self.swap(0, last);
        let entry = self.heap.pop()?;
        self.slots.remove(&entry.key);
        if !self.heap.is_empty() {
            self.sift_down(0);
        }
        Some((entry.key, entry.priority))
    }

    /// The best entry, without removing it.
    pub fn peek_best(&self) -> Option<(K, f64)> {
        self.heap.first().map(|e| (e.key, e.priority))
    }

    /// Move `key` to `priority`. Entries with an unchanged priority keep
    /// their place. Returns false if the key is not queued.
    pub fn change_priority(&mut self, key: K, priority: f64) -> bool {
        debug_assert!(!priority.is_nan(), "NaN priority");
        let Some(&slot) = self.slots.get(&key) else {
            return false;
        };
        if self.heap[slot].priority == priority {
            return true;
        }
        let seq = self.next_seq();
        let entry = &mut self.heap[slot];
        entry.priority = priority;
        entry.seq = seq;
        // The entry can only move in one direction; try both.
        let slot = self.sift_up(slot);
        self.sift_down(slot);
        true
    }

    /// Remove `key` wherever it is. Returns its priority if it was queued.
    pub fn remove(&mut self, key: K) -> Option<f64> {
        let slot = *self.slots.get(&key)?;
        let last = self.heap.len() - 1;
        self.swap(slot, last);
        let entry = self.heap.pop()?;
        self.slots.remove(&entry.key);
        if slot < self.heap.len() {
            let slot = self.sift_up(slot);
            self.sift_down(slot);
        }
        Some(entry.priority)
    }

    /// Current priority of `key`.
    pub fn priority(&self, key: K) -> Option<f64> {
        self.slots.get(&key).map(|&slot| self.heap[slot].priority)
    }

    pub fn contains(&self, key: K) -> bool {
        self.slots.contains_key(&key)
    }

    pub fn clear(&mut self) {
        self.heap.clear();
        self.slots.clear();
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.heap.len()
    }

    // -----------------------------------------------------------------------
    // Heap plumbing
    // -----------------------------------------------------------------------

    fn next_seq(&mut self) -> u64 {
        let seq = self.seq;
        self.seq += 1;
        seq
    }

    /// Whether the entry at slot `a` must be dequeued before the one at `b`.
    fn before(&self, a: usize, b: usize) -> bool {
        let (a, b) = (&self.heap[a], &self.heap[b]);
        let by_priority = match self.order {
            QueueOrder::Ascending => a.priority.total_cmp(&b.priority),
            QueueOrder::Descending => b.priority.total_cmp(&a.priority),
        };
        by_priority.then(a.seq.cmp(&b.seq)) == Ordering::Less
    }

    fn swap(&mut self, a: usize, b: usize) {
        self.heap.swap(a, b);
        self.slots.insert(self.heap[a].key, a);
        self.slots.insert(self.heap[b].key, b);
    }

    fn sift_up(&mut self, mut slot: usize) -> usize {
        while slot > 0 {
            let parent = (slot - 1) / 2;
            if !self.before(slot, parent) {
                break;
            }
            self.swap(slot, parent);
            slot = parent;
        }
        slot
    }

    fn sift_down(&mut self, mut slot: usize) {
        let len = self.heap.len();
        loop {
            let left = 2 * slot + 1;
            let right = left + 1;
            let mut best = slot;
            if left < len && self.before(left, best) {
                best = left;
            }
            if right < len && self.before(right, best) {
                best = right;
            }
            if best == slot {
                return;
            }
            self.swap(slot, best);
            slot = best;
        }
    }
}
