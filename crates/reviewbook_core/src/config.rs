//! Core runtime configuration.
//!
//! # Responsibility
//! - Carry tunables shared by the controller and persistence wiring.
//!
//! # Invariants
//! - A validated config has a positive edit window and a non-blank document name.

use crate::policy::edit_window::{EditWindowPolicy, DEFAULT_TIME_LIMIT_MINUTES};
use crate::repo::snapshot_repo::DEFAULT_DOCUMENT_NAME;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Controller configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoreConfig {
    /// Minutes after creation during which a review stays editable.
    pub edit_time_limit_minutes: u32,
    /// Document key under which the restaurant list is persisted.
    pub document_name: String,
}

impl Default for CoreConfig {
    fn default() -> Self {
        Self {
            edit_time_limit_minutes: DEFAULT_TIME_LIMIT_MINUTES,
            document_name: DEFAULT_DOCUMENT_NAME.to_string(),
        }
    }
}

impl CoreConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.edit_time_limit_minutes == 0 {
            return Err(ConfigError::ZeroEditWindow);
        }
        if self.document_name.trim().is_empty() {
            return Err(ConfigError::BlankDocumentName);
        }
        Ok(())
    }

    pub fn edit_window_policy(&self) -> EditWindowPolicy {
        EditWindowPolicy::new(self.edit_time_limit_minutes)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    ZeroEditWindow,
    BlankDocumentName,
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ZeroEditWindow => write!(f, "edit window must be at least one minute"),
            Self::BlankDocumentName => write!(f, "document name must not be blank"),
        }
    }
}

impl Error for ConfigError {}
