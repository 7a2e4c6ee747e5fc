//! Cancelable delayed actions keyed by owner.

use std::collections::BTreeMap;

/// Proof of one specific scheduling; stale handles cannot cancel newer ones.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskHandle<K> {
    key: K,
    generation: u64,
}

impl<K> TaskHandle<K> {
    pub fn key(&self) -> &K {
        &self.key
    }
}

#[derive(Debug, Clone, Copy)]
struct PendingTask {
    due_at: i64,
    generation: u64,
}

/// Queue of single-shot actions, at most one per key.
///
/// Time is supplied by the caller in epoch milliseconds, so the queue is
/// deterministic under a manual clock.
#[derive(Debug)]
pub struct DeferredQueue<K: Ord + Clone> {
    pending: BTreeMap<K, PendingTask>,
    next_generation: u64,
}

impl<K: Ord + Clone> Default for DeferredQueue<K> {
    fn default() -> Self {
        Self {
            pending: BTreeMap::new(),
            next_generation: 0,
        }
    }
}

impl<K: Ord + Clone> DeferredQueue<K> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Schedules `key` to fire at `due_at`, replacing any pending action for it.
    pub fn schedule(&mut self, key: K, due_at: i64) -> TaskHandle<K> {
        let generation = self.next_generation;
        self.next_generation = self.next_generation.wrapping_add(1);
        self.pending.insert(key.clone(), PendingTask { due_at, generation });
        TaskHandle { key, generation }
    }

    /// Cancels whatever is pending for `key`. Returns whether anything was pending.
    pub fn cancel(&mut self, key: &K) -> bool {
        self.pending.remove(key).is_some()
    }

    /// Cancels the action `handle` refers to, if it has not fired or been replaced.
    pub fn cancel_handle(&mut self, handle: &TaskHandle<K>) -> bool {
        match self.pending.get(&handle.key) {
            Some(task) if task.generation == handle.generation => {
                self.pending.remove(&handle.key);
                true
            }
            _ => false,
        }
    }

    pub fn is_pending(&self, key: &K) -> bool {
        self.pending.contains_key(key)
    }

    pub fn due_at(&self, key: &K) -> Option<i64> {
        self.pending.get(key).map(|task| task.due_at)
    }

    /// Earliest pending due time, for hosts that arm one real timer.
    pub fn next_due(&self) -> Option<i64> {
        self.pending.values().map(|task| task.due_at).min()
    }

    /// Removes and returns every key due at or before `now`, earliest first.
    pub fn fire_due(&mut self, now: i64) -> Vec<K> {
        let mut due: Vec<(i64, K)> = self
            .pending
            .iter()
            .filter(|(_, task)| task.due_at <= now)
            .map(|(key, task)| (task.due_at, key.clone()))
            .collect();
        due.sort_by(|left, right| left.0.cmp(&right.0).then_with(|| left.1.cmp(&right.1)));

        for (_, key) in &due {
            self.pending.remove(key);
        }
        due.into_iter().map(|(_, key)| key).collect()
    }

    pub fn clear(&mut self) {
        self.pending.clear();
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }
}
