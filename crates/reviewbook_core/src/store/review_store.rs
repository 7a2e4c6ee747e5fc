//! Restaurant/review list operations.
//!
//! # Responsibility
//! - Add and edit restaurants and reviews on an immutable snapshot.
//! - Enforce text validation before any index lookup.
//!
//! # Invariants
//! - Reviews are append-only; edits replace text and keep `created_at`.
//! - Restaurant edits replace `title` only.
//! - The edit window is not checked here; callers apply `EditWindowPolicy`.

use crate::model::restaurant::{
    validate_text, Restaurant, RestaurantList, Review, TextField, ValidationError,
};
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type StoreResult<T> = Result<T, StoreError>;

/// Store operation failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// Input text failed the length rule.
    Validation(ValidationError),
    /// Restaurant index is outside the snapshot.
    RestaurantIndexOutOfBounds { index: usize, len: usize },
    /// Review index is outside the restaurant's review list.
    ReviewIndexOutOfBounds {
        restaurant_index: usize,
        index: usize,
        len: usize,
    },
}

impl StoreError {
    /// Whether this error signals a session/snapshot desync rather than bad input.
    pub fn is_index_error(&self) -> bool {
        !matches!(self, Self::Validation(_))
    }
}

impl Display for StoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::RestaurantIndexOutOfBounds { index, len } => {
                write!(f, "restaurant index {index} out of bounds (len {len})")
            }
            Self::ReviewIndexOutOfBounds {
                restaurant_index,
                index,
                len,
            } => write!(
                f,
                "review index {index} out of bounds for restaurant {restaurant_index} (len {len})"
            ),
        }
    }
}

impl Error for StoreError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            _ => None,
        }
    }
}

impl From<ValidationError> for StoreError {
    fn from(value: ValidationError) -> Self {
        Self::Validation(value)
    }
}

/// Appends a restaurant with no reviews.
pub fn add_restaurant(list: &RestaurantList, title: &str) -> StoreResult<RestaurantList> {
    validate_text(TextField::Title, title)?;

    let mut restaurants = list.restaurants().to_vec();
    restaurants.push(Restaurant::new(title));
    Ok(RestaurantList::from_restaurants(restaurants))
}

/// Replaces the title of the restaurant at `index`.
pub fn edit_restaurant(
    list: &RestaurantList,
    index: usize,
    title: &str,
) -> StoreResult<RestaurantList> {
    validate_text(TextField::Title, title)?;
    let target = restaurant_at(list, index)?;

    let updated = Restaurant {
        title: title.to_string(),
        ..target.clone()
    };
    Ok(replace_restaurant(list, index, updated))
}

/// Appends a review stamped with `now` to the restaurant at `restaurant_index`.
pub fn add_review(
    list: &RestaurantList,
    restaurant_index: usize,
    text: &str,
    now: i64,
) -> StoreResult<RestaurantList> {
    validate_text(TextField::Review, text)?;
    let target = restaurant_at(list, restaurant_index)?;

    let mut updated = target.clone();
    updated.reviews.push(Review::new(text, now));
    Ok(replace_restaurant(list, restaurant_index, updated))
}

/// Replaces the text of one review, keeping its id and creation time.
pub fn edit_review(
    list: &RestaurantList,
    restaurant_index: usize,
    review_index: usize,
    text: &str,
) -> StoreResult<RestaurantList> {
    validate_text(TextField::Review, text)?;
    let target = restaurant_at(list, restaurant_index)?;
    let review = target
        .review(review_index)
        .ok_or(StoreError::ReviewIndexOutOfBounds {
            restaurant_index,
            index: review_index,
            len: target.reviews.len(),
        })?;

    let mut updated = target.clone();
    updated.reviews[review_index] = review.with_text(text);
    Ok(replace_restaurant(list, restaurant_index, updated))
}

fn restaurant_at(list: &RestaurantList, index: usize) -> StoreResult<&Restaurant> {
    list.get(index)
        .ok_or(StoreError::RestaurantIndexOutOfBounds {
            index,
            len: list.len(),
        })
}

fn replace_restaurant(list: &RestaurantList, index: usize, updated: Restaurant) -> RestaurantList {
    let mut restaurants = list.restaurants().to_vec();
    restaurants[index] = updated;
    RestaurantList::from_restaurants(restaurants)
}
