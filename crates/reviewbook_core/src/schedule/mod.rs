//! Single-shot deferred actions driven by the host event loop.
//!
//! # Responsibility
//! - Provide a cancelable "run once at time T" primitive without OS timers.
//! - Track per-review edit-window expiry on top of it.
//!
//! # Invariants
//! - A scheduled action fires at most once.
//! - Canceled or superseded actions never fire.

pub mod deferred;
pub mod expiry;
