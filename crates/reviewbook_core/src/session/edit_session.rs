//! Edit-session state machine.
//!
//! # Responsibility
//! - Track which restaurant/review, if any, an open form targets.
//! - Encode add vs. edit mode as tagged variants instead of loose flags.
//!
//! # Invariants
//! - Transitions are pure value changes; no store or persistence access.
//! - The review slot holds a single target system-wide.

/// Review form slot.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ReviewSlot {
    #[default]
    Idle,
    /// New-review form open for restaurant `.0`.
    Adding(usize),
    /// Edit form open for review `review_index` of restaurant `restaurant_index`.
    Editing {
        restaurant_index: usize,
        review_index: usize,
    },
}

impl ReviewSlot {
    pub fn restaurant_index(&self) -> Option<usize> {
        match self {
            Self::Idle => None,
            Self::Adding(index) => Some(*index),
            Self::Editing {
                restaurant_index, ..
            } => Some(*restaurant_index),
        }
    }
}

/// Restaurant form slot.
///
/// `Idle` still accepts a submit as "add": the add form is always on screen.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum RestaurantSlot {
    #[default]
    Idle,
    Adding,
    Editing(usize),
}

/// What a submit of the restaurant form should do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RestaurantFormMode {
    Add,
    Edit(usize),
}

/// What a submit of the review form should do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReviewFormMode {
    Add {
        restaurant_index: usize,
    },
    Edit {
        restaurant_index: usize,
        review_index: usize,
    },
}

/// Current session state for both form slots.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EditSession {
    review: ReviewSlot,
    restaurant: RestaurantSlot,
}

impl EditSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn review_slot(&self) -> ReviewSlot {
        self.review
    }

    pub fn restaurant_slot(&self) -> RestaurantSlot {
        self.restaurant
    }

    pub fn is_idle(&self) -> bool {
        self.review == ReviewSlot::Idle && self.restaurant == RestaurantSlot::Idle
    }

    /// Opens or closes the review form for `restaurant_index`.
    ///
    /// Toggling the restaurant that owns the open form closes it (dropping any
    /// selected review). Toggling another restaurant moves the form there.
    pub fn toggle_add_review(&mut self, restaurant_index: usize) {
        self.review = match self.review {
            ReviewSlot::Idle => ReviewSlot::Adding(restaurant_index),
            current if current.restaurant_index() == Some(restaurant_index) => ReviewSlot::Idle,
            _ => ReviewSlot::Adding(restaurant_index),
        };
    }

    /// Points the review form at an existing review.
    ///
    /// Editability is the caller's concern.
    pub fn select_review_to_edit(&mut self, restaurant_index: usize, review_index: usize) {
        self.review = ReviewSlot::Editing {
            restaurant_index,
            review_index,
        };
    }

    pub fn cancel_review(&mut self) {
        self.review = ReviewSlot::Idle;
    }

    /// Returns the pending review submit, if a review form is open.
    pub fn review_form(&self) -> Option<ReviewFormMode> {
        match self.review {
            ReviewSlot::Idle => None,
            ReviewSlot::Adding(restaurant_index) => Some(ReviewFormMode::Add { restaurant_index }),
            ReviewSlot::Editing {
                restaurant_index,
                review_index,
            } => Some(ReviewFormMode::Edit {
                restaurant_index,
                review_index,
            }),
        }
    }

    pub fn begin_add_restaurant(&mut self) {
        self.restaurant = RestaurantSlot::Adding;
    }

    /// Enters, leaves, or retargets restaurant edit mode.
    pub fn toggle_edit_restaurant(&mut self, restaurant_index: usize) {
        self.restaurant = match self.restaurant {
            RestaurantSlot::Editing(current) if current == restaurant_index => RestaurantSlot::Idle,
            _ => RestaurantSlot::Editing(restaurant_index),
        };
    }

    pub fn cancel_restaurant(&mut self) {
        self.restaurant = RestaurantSlot::Idle;
    }

    /// Returns what submitting the restaurant form would do.
    pub fn restaurant_form(&self) -> RestaurantFormMode {
        match self.restaurant {
            RestaurantSlot::Idle | RestaurantSlot::Adding => RestaurantFormMode::Add,
            RestaurantSlot::Editing(index) => RestaurantFormMode::Edit(index),
        }
    }

    /// Returns both slots to `Idle`.
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

#[cfg(test)]
mod tests {
    use super::{
        EditSession, RestaurantFormMode, RestaurantSlot, ReviewFormMode, ReviewSlot,
    };

    #[test]
    fn toggle_add_review_is_a_pure_toggle() {
        let mut session = EditSession::new();
        session.toggle_add_review(2);
        assert_eq!(session.review_slot(), ReviewSlot::Adding(2));
        session.toggle_add_review(2);
        assert_eq!(session.review_slot(), ReviewSlot::Idle);
        assert!(session.is_idle());
    }

    #[test]
    fn toggle_add_review_on_other_restaurant_moves_form() {
        let mut session = EditSession::new();
        session.toggle_add_review(0);
        session.toggle_add_review(1);
        assert_eq!(session.review_slot(), ReviewSlot::Adding(1));
    }

    #[test]
    fn select_then_toggle_closes_and_drops_selection() {
        let mut session = EditSession::new();
        session.toggle_add_review(0);
        session.select_review_to_edit(0, 3);
        assert_eq!(
            session.review_form(),
            Some(ReviewFormMode::Edit {
                restaurant_index: 0,
                review_index: 3
            })
        );

        session.toggle_add_review(0);
        assert_eq!(session.review_slot(), ReviewSlot::Idle);
        session.toggle_add_review(0);
        assert_eq!(
            session.review_form(),
            Some(ReviewFormMode::Add {
                restaurant_index: 0
            })
        );
    }

    #[test]
    fn toggle_edit_restaurant_enters_leaves_and_switches() {
        let mut session = EditSession::new();
        assert_eq!(session.restaurant_form(), RestaurantFormMode::Add);

        session.toggle_edit_restaurant(1);
        assert_eq!(session.restaurant_slot(), RestaurantSlot::Editing(1));
        session.toggle_edit_restaurant(2);
        assert_eq!(session.restaurant_slot(), RestaurantSlot::Editing(2));
        session.toggle_edit_restaurant(2);
        assert_eq!(session.restaurant_slot(), RestaurantSlot::Idle);
    }

    #[test]
    fn slots_are_independent() {
        let mut session = EditSession::new();
        session.toggle_edit_restaurant(0);
        session.toggle_add_review(1);
        assert_eq!(session.restaurant_slot(), RestaurantSlot::Editing(0));
        assert_eq!(session.review_slot(), ReviewSlot::Adding(1));

        session.cancel_review();
        assert_eq!(session.restaurant_slot(), RestaurantSlot::Editing(0));

        session.begin_add_restaurant();
        assert_eq!(session.restaurant_form(), RestaurantFormMode::Add);
        session.reset();
        assert!(session.is_idle());
    }
}
