//! Restaurant review controller.
//!
//! # Responsibility
//! - Own the current snapshot, the edit session and the edit-window tracker.
//! - Apply user actions one at a time: session transition, store mutation,
//!   persistence, tracker re-sync.
//!
//! # Invariants
//! - The in-memory snapshot is replaced only after persistence succeeds.
//! - Validation failures leave session and snapshot unchanged.
//! - Index failures are logged and reset the session to idle.
//! - A review whose edit window has closed cannot become the edit target.

use crate::clock::Clock;
use crate::config::{ConfigError, CoreConfig};
use crate::model::restaurant::{RestaurantList, ReviewId, ValidationError};
use crate::repo::snapshot_repo::{PersistenceAdapter, RepoError};
use crate::schedule::expiry::EditWindowTracker;
use crate::session::edit_session::{EditSession, RestaurantFormMode, ReviewFormMode};
use crate::store::review_store::{self, StoreError};
use log::{error, info, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::time::Duration;

pub type ServiceResult<T> = Result<T, ServiceError>;

/// Controller-level failure.
#[derive(Debug)]
pub enum ServiceError {
    /// Controller was constructed with an invalid config.
    Config(ConfigError),
    /// Form input rejected; the form stays open.
    Validation(ValidationError),
    /// Session or caller referenced an entity missing from the snapshot.
    IndexOutOfBounds(StoreError),
    /// The review's edit window has closed.
    ReviewLocked {
        restaurant_index: usize,
        review_index: usize,
    },
    /// Review submit without an open review form.
    NoReviewForm,
    /// Storage failed; the previous snapshot is still current.
    Persistence(RepoError),
}

impl Display for ServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Config(err) => write!(f, "invalid config: {err}"),
            Self::Validation(err) => write!(f, "{err}"),
            Self::IndexOutOfBounds(err) => write!(f, "{err}"),
            Self::ReviewLocked {
                restaurant_index,
                review_index,
            } => write!(
                f,
                "review {review_index} of restaurant {restaurant_index} can no longer be edited"
            ),
            Self::NoReviewForm => write!(f, "no review form is open"),
            Self::Persistence(err) => write!(f, "{err}"),
        }
    }
}

impl Error for ServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Config(err) => Some(err),
            Self::Validation(err) => Some(err),
            Self::IndexOutOfBounds(err) => Some(err),
            Self::Persistence(err) => Some(err),
            Self::ReviewLocked { .. } | Self::NoReviewForm => None,
        }
    }
}

impl From<ConfigError> for ServiceError {
    fn from(value: ConfigError) -> Self {
        Self::Config(value)
    }
}

impl From<RepoError> for ServiceError {
    fn from(value: RepoError) -> Self {
        Self::Persistence(value)
    }
}

/// Single-owner controller over one persisted restaurant list.
pub struct RestaurantService<P: PersistenceAdapter, C: Clock> {
    persistence: P,
    clock: C,
    list: RestaurantList,
    session: EditSession,
    tracker: EditWindowTracker,
}

impl<P: PersistenceAdapter, C: Clock> RestaurantService<P, C> {
    /// Restores the stored snapshot (or starts empty) and arms edit windows.
    pub fn open(persistence: P, clock: C, config: &CoreConfig) -> ServiceResult<Self> {
        config.validate()?;
        let list = persistence.load()?.unwrap_or_default();
        let mut tracker = EditWindowTracker::new(config.edit_window_policy());
        tracker.sync(&list, clock.now_ms());
        info!(
            "event=service_open module=service status=ok restaurant_count={} time_limit_minutes={}",
            list.len(),
            config.edit_time_limit_minutes
        );

        Ok(Self {
            persistence,
            clock,
            list,
            session: EditSession::new(),
            tracker,
        })
    }

    pub fn list(&self) -> &RestaurantList {
        &self.list
    }

    pub fn session(&self) -> EditSession {
        self.session
    }

    /// Re-reads persistence, dropping session state and stale expiries.
    pub fn reload(&mut self) -> ServiceResult<()> {
        let list = self.persistence.load()?.unwrap_or_default();
        self.session.reset();
        self.tracker.sync(&list, self.clock.now_ms());
        self.list = list;
        info!(
            "event=service_reload module=service status=ok restaurant_count={}",
            self.list.len()
        );
        Ok(())
    }

    pub fn toggle_add_review(&mut self, restaurant_index: usize) -> ServiceResult<()> {
        if let Err(err) = self.check_restaurant(restaurant_index) {
            return Err(self.store_failure("review_toggle", err));
        }
        self.session.toggle_add_review(restaurant_index);
        Ok(())
    }

    /// Opens the review form in edit mode, if the review's window is still open.
    pub fn select_review_to_edit(
        &mut self,
        restaurant_index: usize,
        review_index: usize,
    ) -> ServiceResult<()> {
        let editable = match self.review_editable(restaurant_index, review_index) {
            Ok(editable) => editable,
            Err(err) => return Err(self.store_failure("review_select", err)),
        };
        if !editable {
            warn!(
                "event=review_select module=service status=rejected error_code=review_locked restaurant_index={restaurant_index} review_index={review_index}"
            );
            return Err(ServiceError::ReviewLocked {
                restaurant_index,
                review_index,
            });
        }

        self.session
            .select_review_to_edit(restaurant_index, review_index);
        Ok(())
    }

    pub fn cancel_review(&mut self) {
        self.session.cancel_review();
    }

    /// Submits the open review form as an add or an edit.
    pub fn submit_review(&mut self, text: &str) -> ServiceResult<()> {
        let mode = self.session.review_form().ok_or(ServiceError::NoReviewForm)?;
        let (event, result) = match mode {
            ReviewFormMode::Add { restaurant_index } => (
                "review_add",
                review_store::add_review(&self.list, restaurant_index, text, self.clock.now_ms()),
            ),
            ReviewFormMode::Edit {
                restaurant_index,
                review_index,
            } => (
                "review_edit",
                review_store::edit_review(&self.list, restaurant_index, review_index, text),
            ),
        };

        let next = result.map_err(|err| self.store_failure(event, err))?;
        self.commit(event, next)?;
        self.session.cancel_review();
        Ok(())
    }

    pub fn begin_add_restaurant(&mut self) {
        self.session.begin_add_restaurant();
    }

    pub fn toggle_edit_restaurant(&mut self, restaurant_index: usize) -> ServiceResult<()> {
        if let Err(err) = self.check_restaurant(restaurant_index) {
            return Err(self.store_failure("restaurant_toggle", err));
        }
        self.session.toggle_edit_restaurant(restaurant_index);
        Ok(())
    }

    pub fn cancel_restaurant(&mut self) {
        self.session.cancel_restaurant();
    }

    /// Submits the restaurant form; an idle form adds a new restaurant.
    pub fn submit_restaurant(&mut self, title: &str) -> ServiceResult<()> {
        let (event, result) = match self.session.restaurant_form() {
            RestaurantFormMode::Add => (
                "restaurant_add",
                review_store::add_restaurant(&self.list, title),
            ),
            RestaurantFormMode::Edit(index) => (
                "restaurant_edit",
                review_store::edit_restaurant(&self.list, index, title),
            ),
        };

        let next = result.map_err(|err| self.store_failure(event, err))?;
        self.commit(event, next)?;
        self.session.cancel_restaurant();
        Ok(())
    }

    /// Displayed edit flag for one review.
    pub fn is_review_editable(
        &self,
        restaurant_index: usize,
        review_index: usize,
    ) -> ServiceResult<bool> {
        self.review_editable(restaurant_index, review_index)
            .map_err(ServiceError::IndexOutOfBounds)
    }

    /// Time until one review locks; zero when already locked.
    pub fn review_remaining(
        &self,
        restaurant_index: usize,
        review_index: usize,
    ) -> ServiceResult<Duration> {
        let (id, created_at) = self
            .review_key(restaurant_index, review_index)
            .map_err(ServiceError::IndexOutOfBounds)?;
        let now = self.clock.now_ms();
        if !self.review_open(id, created_at, now) {
            return Ok(Duration::ZERO);
        }
        Ok(self.tracker.policy().remaining(created_at, now))
    }

    /// Earliest pending expiry, in epoch milliseconds.
    pub fn next_expiry_due(&self) -> Option<i64> {
        self.tracker.next_due()
    }

    /// Fires due expiries; returns the reviews that just became read-only.
    pub fn tick(&mut self) -> Vec<ReviewId> {
        let locked = self.tracker.tick(self.clock.now_ms());
        for id in &locked {
            info!("event=edit_window_closed module=service status=ok review_id={id}");
        }
        locked
    }

    fn commit(&mut self, event: &'static str, next: RestaurantList) -> ServiceResult<()> {
        if let Err(err) = self.persistence.save(&next) {
            error!(
                "event={event} module=service status=error error_code=persist_failed error={err}"
            );
            return Err(err.into());
        }

        self.list = next;
        self.tracker.sync(&self.list, self.clock.now_ms());
        info!(
            "event={event} module=service status=ok restaurant_count={}",
            self.list.len()
        );
        Ok(())
    }

    fn store_failure(&mut self, event: &'static str, err: StoreError) -> ServiceError {
        match err {
            StoreError::Validation(validation) => {
                warn!(
                    "event={event} module=service status=rejected error_code=validation field={}",
                    validation.field().as_str()
                );
                ServiceError::Validation(validation)
            }
            other => {
                error!(
                    "event={event} module=service status=error error_code=index_out_of_bounds error={other}"
                );
                self.session.reset();
                ServiceError::IndexOutOfBounds(other)
            }
        }
    }

    fn check_restaurant(&self, index: usize) -> Result<(), StoreError> {
        if index < self.list.len() {
            return Ok(());
        }
        Err(StoreError::RestaurantIndexOutOfBounds {
            index,
            len: self.list.len(),
        })
    }

    fn review_key(
        &self,
        restaurant_index: usize,
        review_index: usize,
    ) -> Result<(ReviewId, i64), StoreError> {
        self.check_restaurant(restaurant_index)?;
        let restaurant = &self.list.restaurants()[restaurant_index];
        restaurant
            .review(review_index)
            .map(|review| (review.id, review.created_at))
            .ok_or(StoreError::ReviewIndexOutOfBounds {
                restaurant_index,
                index: review_index,
                len: restaurant.reviews.len(),
            })
    }

    fn review_editable(
        &self,
        restaurant_index: usize,
        review_index: usize,
    ) -> Result<bool, StoreError> {
        let (id, created_at) = self.review_key(restaurant_index, review_index)?;
        Ok(self.review_open(id, created_at, self.clock.now_ms()))
    }

    // The tracker flag lags until the next tick; the policy answers for `now`.
    fn review_open(&self, id: ReviewId, created_at: i64, now: i64) -> bool {
        self.tracker.is_editable(id).unwrap_or(true)
            && self.tracker.policy().is_editable(created_at, now)
    }
}
