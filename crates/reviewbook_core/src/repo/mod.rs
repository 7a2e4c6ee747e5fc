//! Snapshot persistence boundary.
//!
//! # Responsibility
//! - Define the `PersistenceAdapter` contract the controller is given.
//! - Keep SQL and byte-encoding details out of store/service code.
//!
//! # Invariants
//! - The whole `RestaurantList` is stored as one document under a fixed name.
//! - Read paths reject invalid persisted state instead of masking it.

pub mod snapshot_repo;
