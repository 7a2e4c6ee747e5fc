//! Domain model for restaurants and their reviews.
//!
//! # Responsibility
//! - Define the snapshot shape persisted as one document.
//! - Own field-level validation rules shared by every write path.
//!
//! # Invariants
//! - Every review belongs to exactly one restaurant.
//! - Operations address entities by position; ids are stable labels only.

pub mod restaurant;
