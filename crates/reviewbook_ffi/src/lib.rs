//! Flutter-facing bindings for reviewbook core.

pub mod api;
