//! Transient form/session state.
//!
//! # Invariants
//! - At most one review form and one restaurant form are open at a time.
//! - The review and restaurant slots are independent of each other.

pub mod edit_session;
