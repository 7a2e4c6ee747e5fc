//! Pure snapshot mutations.
//!
//! # Responsibility
//! - Turn one `RestaurantList` snapshot plus user input into the next snapshot.
//!
//! # Invariants
//! - No operation reads or writes persistence.
//! - A failed operation leaves the input snapshot untouched.

pub mod review_store;
