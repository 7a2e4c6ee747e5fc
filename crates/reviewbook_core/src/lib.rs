//! Core domain logic for reviewbook.
//! This crate is the single source of truth for restaurant/review invariants.

pub mod clock;
pub mod config;
pub mod db;
pub mod logging;
pub mod model;
pub mod policy;
pub mod repo;
pub mod schedule;
pub mod service;
pub mod session;
pub mod store;

pub use clock::{Clock, ManualClock, SystemClock};
pub use config::{ConfigError, CoreConfig};
pub use logging::{default_log_level, init_logging, logging_status, LogLevel, LoggingError};
pub use model::restaurant::{
    Restaurant, RestaurantId, RestaurantList, Review, ReviewId, TextField, ValidationError,
};
pub use policy::edit_window::{EditWindowPolicy, DEFAULT_TIME_LIMIT_MINUTES};
pub use repo::snapshot_repo::{
    MemoryPersistence, PersistenceAdapter, RepoError, RepoResult, SqlitePersistence,
    DEFAULT_DOCUMENT_NAME,
};
pub use schedule::deferred::{DeferredQueue, TaskHandle};
pub use schedule::expiry::EditWindowTracker;
pub use service::restaurant_service::{RestaurantService, ServiceError, ServiceResult};
pub use session::edit_session::{
    EditSession, RestaurantFormMode, RestaurantSlot, ReviewFormMode, ReviewSlot,
};
pub use store::review_store::{StoreError, StoreResult};

/// Minimal health-check API for early integration.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
