//! Time-based policies consumed by the session controller.

pub mod edit_window;
