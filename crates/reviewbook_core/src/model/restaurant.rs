//! Restaurant and review records.
//!
//! # Responsibility
//! - Define `Restaurant`, `Review` and the `RestaurantList` snapshot.
//! - Validate user-entered titles and review text.
//!
//! # Invariants
//! - `title` and review `text` hold at least `MIN_TEXT_CHARS` characters.
//! - `Review::created_at` never changes after creation.
//! - Ids are generated once and survive edits and persistence round-trips.

use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

/// Minimum character count for titles and review text.
pub const MIN_TEXT_CHARS: usize = 2;

/// Stable restaurant identifier.
pub type RestaurantId = Uuid;

/// Stable review identifier.
pub type ReviewId = Uuid;

/// User-editable field a validation rule applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TextField {
    Title,
    Review,
}

impl TextField {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Title => "title",
            Self::Review => "review",
        }
    }
}

/// Field validation failure, surfaced inline next to the form input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// Input is empty.
    Required { field: TextField },
    /// Input is shorter than `min_chars`.
    TooShort {
        field: TextField,
        min_chars: usize,
        actual_chars: usize,
    },
}

impl ValidationError {
    pub fn field(&self) -> TextField {
        match self {
            Self::Required { field } | Self::TooShort { field, .. } => *field,
        }
    }
}

impl Display for ValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Required { field } => write!(f, "{} is a required field", field.as_str()),
            Self::TooShort {
                field, min_chars, ..
            } => write!(
                f,
                "{} must be at least {min_chars} characters",
                field.as_str()
            ),
        }
    }
}

impl Error for ValidationError {}

/// Checks one user-entered text value against the shared length rule.
///
/// Length counts Unicode scalar values; input is not trimmed.
pub fn validate_text(field: TextField, value: &str) -> Result<(), ValidationError> {
    let actual_chars = value.chars().count();
    if actual_chars == 0 {
        return Err(ValidationError::Required { field });
    }
    if actual_chars < MIN_TEXT_CHARS {
        return Err(ValidationError::TooShort {
            field,
            min_chars: MIN_TEXT_CHARS,
            actual_chars,
        });
    }
    Ok(())
}

/// One text review attached to a restaurant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Review {
    pub id: ReviewId,
    pub text: String,
    /// Unix epoch milliseconds.
    pub created_at: i64,
}

impl Review {
    /// Creates a review with a generated id.
    pub fn new(text: impl Into<String>, created_at: i64) -> Self {
        Self {
            id: Uuid::new_v4(),
            text: text.into(),
            created_at,
        }
    }

    /// Returns a copy carrying `text`; id and creation time are kept.
    pub fn with_text(&self, text: impl Into<String>) -> Self {
        Self {
            id: self.id,
            text: text.into(),
            created_at: self.created_at,
        }
    }
}

/// Restaurant entry with its reviews in insertion order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Restaurant {
    pub id: RestaurantId,
    pub title: String,
    #[serde(default)]
    pub reviews: Vec<Review>,
}

impl Restaurant {
    /// Creates a restaurant with no reviews and a generated id.
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            title: title.into(),
            reviews: Vec::new(),
        }
    }

    pub fn review(&self, index: usize) -> Option<&Review> {
        self.reviews.get(index)
    }
}

/// Immutable-by-convention snapshot of every restaurant.
///
/// Mutations go through `store::review_store`, which returns a new value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RestaurantList {
    restaurants: Vec<Restaurant>,
}

impl RestaurantList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_restaurants(restaurants: Vec<Restaurant>) -> Self {
        Self { restaurants }
    }

    pub fn restaurants(&self) -> &[Restaurant] {
        &self.restaurants
    }

    pub fn get(&self, index: usize) -> Option<&Restaurant> {
        self.restaurants.get(index)
    }

    pub fn len(&self) -> usize {
        self.restaurants.len()
    }

    pub fn is_empty(&self) -> bool {
        self.restaurants.is_empty()
    }

    /// Finds the current position of a restaurant by stable id.
    pub fn position_of(&self, id: RestaurantId) -> Option<usize> {
        self.restaurants.iter().position(|item| item.id == id)
    }

    /// Iterates over `(restaurant, review)` pairs in display order.
    pub fn reviews(&self) -> impl Iterator<Item = (&Restaurant, &Review)> {
        self.restaurants
            .iter()
            .flat_map(|restaurant| restaurant.reviews.iter().map(move |r| (restaurant, r)))
    }
}
