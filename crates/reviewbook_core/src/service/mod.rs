//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate session transitions, store mutations and persistence.
//! - Keep UI/FFI layers decoupled from storage details.

pub mod restaurant_service;
