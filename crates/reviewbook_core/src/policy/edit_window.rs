//! Review edit-window policy.
//!
//! # Responsibility
//! - Decide whether a review may still be edited.
//! - Report how long until the window closes, for one-shot expiry scheduling.
//!
//! # Invariants
//! - Comparison happens at whole-minute granularity: both timestamps are
//!   truncated to minutes before subtracting.
//! - `remaining(..) == Duration::ZERO` exactly when `is_editable(..)` is false.

use std::time::Duration;

/// Default edit window length in minutes.
pub const DEFAULT_TIME_LIMIT_MINUTES: u32 = 5;

const MILLIS_PER_MINUTE: i64 = 60_000;

/// Edit window with a fixed limit in minutes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EditWindowPolicy {
    time_limit_minutes: u32,
}

impl Default for EditWindowPolicy {
    fn default() -> Self {
        Self::new(DEFAULT_TIME_LIMIT_MINUTES)
    }
}

impl EditWindowPolicy {
    pub fn new(time_limit_minutes: u32) -> Self {
        Self { time_limit_minutes }
    }

    pub fn time_limit_minutes(&self) -> u32 {
        self.time_limit_minutes
    }

    pub fn is_editable(&self, created_at: i64, now: i64) -> bool {
        is_editable(created_at, now, self.time_limit_minutes)
    }

    pub fn remaining(&self, created_at: i64, now: i64) -> Duration {
        remaining(created_at, now, self.time_limit_minutes)
    }

    /// First instant, in epoch milliseconds, at which the review is locked.
    pub fn closes_at(&self, created_at: i64) -> i64 {
        closes_at(created_at, self.time_limit_minutes)
    }
}

/// Returns whether a review created at `created_at` is editable at `now`.
///
/// Timestamps are epoch milliseconds. A review stamped in the future is
/// editable.
pub fn is_editable(created_at: i64, now: i64, time_limit_minutes: u32) -> bool {
    minutes_left(created_at, now, time_limit_minutes) > 0
}

/// Returns the time until the edit window closes, or zero when it is closed.
pub fn remaining(created_at: i64, now: i64, time_limit_minutes: u32) -> Duration {
    let left = minutes_left(created_at, now, time_limit_minutes);
    if left <= 0 {
        return Duration::ZERO;
    }
    // left > 0, so the conversion cannot fail.
    let minutes = u64::try_from(left).unwrap_or(u64::MAX);
    Duration::from_secs(minutes.saturating_mul(60))
}

/// Start of the minute bucket `time_limit_minutes` after the creation bucket.
///
/// `is_editable(created_at, now, limit)` holds exactly when
/// `now < closes_at(created_at, limit)`.
pub fn closes_at(created_at: i64, time_limit_minutes: u32) -> i64 {
    whole_minutes(created_at)
        .saturating_add(i64::from(time_limit_minutes))
        .saturating_mul(MILLIS_PER_MINUTE)
}

fn minutes_left(created_at: i64, now: i64, time_limit_minutes: u32) -> i64 {
    let minutes_ago = whole_minutes(now).saturating_sub(whole_minutes(created_at));
    i64::from(time_limit_minutes).saturating_sub(minutes_ago)
}

fn whole_minutes(epoch_ms: i64) -> i64 {
    epoch_ms.div_euclid(MILLIS_PER_MINUTE)
}
