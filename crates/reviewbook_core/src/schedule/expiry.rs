//! Per-review edit-window expiry tracking.
//!
//! # Responsibility
//! - Hold the displayed "can edit" flag for every review in the snapshot.
//! - Flip each flag from editable to locked exactly once, when its window closes.
//!
//! # Invariants
//! - A review whose window is already closed gets no deferred action.
//! - Changing a review's inputs (creation time or policy) cancels its pending
//!   action before a new one is scheduled.
//! - Reviews that leave the snapshot have their actions canceled.

use crate::model::restaurant::{RestaurantList, ReviewId};
use crate::policy::edit_window::EditWindowPolicy;
use crate::schedule::deferred::DeferredQueue;
use log::debug;
use std::collections::{BTreeMap, BTreeSet};
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct WindowWatch {
    created_at: i64,
    editable: bool,
}

/// Edit-window flags for the reviews of one snapshot.
#[derive(Debug, Default)]
pub struct EditWindowTracker {
    policy: EditWindowPolicy,
    watches: BTreeMap<ReviewId, WindowWatch>,
    expiries: DeferredQueue<ReviewId>,
}

impl EditWindowTracker {
    pub fn new(policy: EditWindowPolicy) -> Self {
        Self {
            policy,
            watches: BTreeMap::new(),
            expiries: DeferredQueue::new(),
        }
    }

    pub fn policy(&self) -> EditWindowPolicy {
        self.policy
    }

    /// Swaps the policy and re-evaluates every watched review.
    pub fn set_policy(&mut self, policy: EditWindowPolicy, now: i64) {
        if policy == self.policy {
            return;
        }
        self.policy = policy;
        let reviews: Vec<(ReviewId, i64)> = self
            .watches
            .iter()
            .map(|(id, watch)| (*id, watch.created_at))
            .collect();
        for (id, created_at) in reviews {
            self.watch(id, created_at, now);
        }
    }

    /// Aligns watches with `list`: new or changed reviews are (re)evaluated,
    /// vanished reviews are dropped with their pending actions.
    pub fn sync(&mut self, list: &RestaurantList, now: i64) {
        let mut seen = BTreeSet::new();
        for (_, review) in list.reviews() {
            seen.insert(review.id);
            let unchanged = self
                .watches
                .get(&review.id)
                .is_some_and(|watch| watch.created_at == review.created_at);
            if !unchanged {
                self.watch(review.id, review.created_at, now);
            }
        }

        let vanished: Vec<ReviewId> = self
            .watches
            .keys()
            .filter(|id| !seen.contains(*id))
            .copied()
            .collect();
        for id in vanished {
            self.forget(id);
        }
    }

    /// Stops tracking one review and cancels its pending expiry.
    pub fn forget(&mut self, id: ReviewId) {
        self.watches.remove(&id);
        self.expiries.cancel(&id);
    }

    /// Drops every watch and pending expiry.
    pub fn clear(&mut self) {
        self.watches.clear();
        self.expiries.clear();
    }

    /// Displayed flag for `id`; `None` when the review is not tracked.
    pub fn is_editable(&self, id: ReviewId) -> Option<bool> {
        self.watches.get(&id).map(|watch| watch.editable)
    }

    /// Time until `id` locks, measured from `now`.
    pub fn remaining(&self, id: ReviewId, now: i64) -> Option<Duration> {
        let watch = self.watches.get(&id)?;
        if !watch.editable {
            return Some(Duration::ZERO);
        }
        Some(self.policy.remaining(watch.created_at, now))
    }

    pub fn is_scheduled(&self, id: ReviewId) -> bool {
        self.expiries.is_pending(&id)
    }

    pub fn next_due(&self) -> Option<i64> {
        self.expiries.next_due()
    }

    /// Fires due expiries and returns the reviews that just became locked.
    pub fn tick(&mut self, now: i64) -> Vec<ReviewId> {
        let mut locked = Vec::new();
        for id in self.expiries.fire_due(now) {
            if let Some(watch) = self.watches.get_mut(&id) {
                if watch.editable {
                    watch.editable = false;
                    locked.push(id);
                }
            }
        }
        locked
    }

    fn watch(&mut self, id: ReviewId, created_at: i64, now: i64) {
        self.expiries.cancel(&id);
        let editable = self.policy.is_editable(created_at, now);
        if editable {
            let due_at = self.policy.closes_at(created_at);
            self.expiries.schedule(id, due_at);
            debug!(
                "event=edit_window_scheduled module=schedule status=ok review_id={id} due_at={due_at}"
            );
        }
        self.watches.insert(
            id,
            WindowWatch {
                created_at,
                editable,
            },
        );
    }
}
