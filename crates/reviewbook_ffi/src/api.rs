//! FFI use-case API for Flutter-facing calls.
//!
//! # Responsibility
//! - Expose the restaurant controller to Dart via FRB as sync calls.
//! - Translate core errors into stable envelope codes for inline UI messages.
//!
//! # Invariants
//! - Exported functions must not panic across FFI boundary.
//! - One process-wide controller; calls are serialized by a mutex.
//! - The database path is fixed on first controller use.

use log::error;
use reviewbook_core::{
    core_version as core_version_inner, init_logging as init_logging_inner, ping as ping_inner,
    CoreConfig, RestaurantService, RestaurantSlot, ReviewSlot, ServiceError, SqlitePersistence,
    SystemClock,
};
use std::path::PathBuf;
use std::sync::{Mutex, MutexGuard, OnceLock};

const DB_FILE_NAME: &str = "reviewbook.sqlite3";
const DB_PATH_ENV: &str = "REVIEWBOOK_DB_PATH";

type Service = RestaurantService<SqlitePersistence, SystemClock>;

static DB_PATH: OnceLock<PathBuf> = OnceLock::new();
static SERVICE: Mutex<Option<Service>> = Mutex::new(None);

/// Minimal health-check API for FRB smoke integration.
///
/// # FFI contract
/// - Sync call, non-blocking.
/// - Never throws; always returns a UTF-8 string.
#[flutter_rust_bridge::frb(sync)]
pub fn ping() -> String {
    ping_inner().to_owned()
}

/// Expose core crate version through FFI.
#[flutter_rust_bridge::frb(sync)]
pub fn core_version() -> String {
    core_version_inner().to_owned()
}

/// Initializes Rust core logging once per process.
///
/// Input semantics:
/// - `level`: one of `trace|debug|info|warn|error` (case-insensitive).
/// - `log_dir`: absolute directory path where rolling logs are written.
///
/// # FFI contract
/// - Safe to call repeatedly with the same `level + log_dir` (idempotent).
/// - Never panics; returns empty string on success and error message on failure.
#[flutter_rust_bridge::frb(sync)]
pub fn init_logging(level: String, log_dir: String) -> String {
    match init_logging_inner(level.as_str(), log_dir.as_str()) {
        Ok(()) => String::new(),
        Err(err) => err.to_string(),
    }
}

/// Pins the SQLite file used by the controller.
///
/// Returns empty string on success. Fails once a different path is pinned.
#[flutter_rust_bridge::frb(sync)]
pub fn configure_db_path(path: String) -> String {
    let trimmed = path.trim();
    if trimmed.is_empty() {
        return "db path cannot be empty".to_string();
    }
    let requested = PathBuf::from(trimmed);
    let active = DB_PATH.get_or_init(|| requested.clone());
    if *active != requested {
        return format!(
            "db path already set to `{}`; refusing to switch to `{}`",
            active.display(),
            requested.display()
        );
    }
    String::new()
}

/// Outcome envelope for controller actions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionResponse {
    /// Whether the action was applied.
    pub ok: bool,
    /// Stable machine code on failure (`validation`, `index_out_of_bounds`,
    /// `review_locked`, `no_review_form`, `persistence`, `config`, `unavailable`).
    pub error_code: Option<String>,
    /// Human-readable message for inline display.
    pub message: String,
}

impl ActionResponse {
    fn success(message: impl Into<String>) -> Self {
        Self {
            ok: true,
            error_code: None,
            message: message.into(),
        }
    }

    fn failure(code: &str, message: impl Into<String>) -> Self {
        Self {
            ok: false,
            error_code: Some(code.to_string()),
            message: message.into(),
        }
    }
}

/// One review row as rendered by the UI.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReviewView {
    pub review_id: String,
    pub text: String,
    pub created_at: i64,
    /// Whether the "edit" affordance should be shown.
    pub editable: bool,
    /// Milliseconds until `editable` flips to false; zero when locked.
    pub remaining_ms: u64,
}

/// One restaurant card as rendered by the UI.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RestaurantView {
    pub restaurant_id: String,
    pub title: String,
    pub reviews: Vec<ReviewView>,
}

/// Open-form state for both slots.
///
/// `review_restaurant_index` is set when a review form is open;
/// `review_index` additionally when it edits an existing review.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SessionView {
    pub review_restaurant_index: Option<u32>,
    pub review_index: Option<u32>,
    pub editing_restaurant_index: Option<u32>,
}

/// Full screen state envelope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScreenResponse {
    pub ok: bool,
    pub message: String,
    pub restaurants: Vec<RestaurantView>,
    pub session: SessionView,
    /// Epoch ms of the next edit-window expiry; the host arms one timer for it
    /// and calls `review_tick` when it fires.
    pub next_expiry_due_ms: Option<i64>,
}

/// Returns the current list, per-review edit flags and session state.
#[flutter_rust_bridge::frb(sync)]
pub fn screen_state() -> ScreenResponse {
    match with_service(|service| Ok(build_screen(service))) {
        Ok(screen) => screen,
        Err(response) => ScreenResponse {
            ok: false,
            message: response.message,
            restaurants: Vec::new(),
            session: SessionView::default(),
            next_expiry_due_ms: None,
        },
    }
}

/// Submits the restaurant form (add when idle, rename when editing).
#[flutter_rust_bridge::frb(sync)]
pub fn restaurant_submit(title: String) -> ActionResponse {
    run_action("Restaurant saved.", |service| {
        service.submit_restaurant(title.as_str())
    })
}

/// Opens the restaurant form in add mode.
#[flutter_rust_bridge::frb(sync)]
pub fn restaurant_begin_add() -> ActionResponse {
    run_action("Adding restaurant.", |service| {
        service.begin_add_restaurant();
        Ok(())
    })
}

/// Toggles edit mode for one restaurant.
#[flutter_rust_bridge::frb(sync)]
pub fn restaurant_toggle_edit(restaurant_index: u32) -> ActionResponse {
    run_action("Restaurant edit toggled.", |service| {
        service.toggle_edit_restaurant(restaurant_index as usize)
    })
}

#[flutter_rust_bridge::frb(sync)]
pub fn restaurant_cancel() -> ActionResponse {
    run_action("Restaurant form closed.", |service| {
        service.cancel_restaurant();
        Ok(())
    })
}

/// Opens or closes the review form for one restaurant.
#[flutter_rust_bridge::frb(sync)]
pub fn review_toggle_add(restaurant_index: u32) -> ActionResponse {
    run_action("Review form toggled.", |service| {
        service.toggle_add_review(restaurant_index as usize)
    })
}

/// Targets an existing review for editing; fails with `review_locked` once
/// its edit window has closed.
#[flutter_rust_bridge::frb(sync)]
pub fn review_select(restaurant_index: u32, review_index: u32) -> ActionResponse {
    run_action("Editing review.", |service| {
        service.select_review_to_edit(restaurant_index as usize, review_index as usize)
    })
}

#[flutter_rust_bridge::frb(sync)]
pub fn review_cancel() -> ActionResponse {
    run_action("Review form closed.", |service| {
        service.cancel_review();
        Ok(())
    })
}

/// Submits the open review form.
#[flutter_rust_bridge::frb(sync)]
pub fn review_submit(text: String) -> ActionResponse {
    run_action("Review saved.", |service| service.submit_review(text.as_str()))
}

/// Re-reads the stored list and closes both forms.
#[flutter_rust_bridge::frb(sync)]
pub fn screen_reload() -> ActionResponse {
    run_action("List reloaded.", |service| service.reload())
}

/// Fires due edit-window expiries; returns ids of reviews that just locked.
#[flutter_rust_bridge::frb(sync)]
pub fn review_tick() -> Vec<String> {
    with_service(|service| {
        Ok(service
            .tick()
            .into_iter()
            .map(|id| id.to_string())
            .collect())
    })
    .unwrap_or_default()
}

fn run_action(
    success_message: &str,
    action: impl FnOnce(&mut Service) -> Result<(), ServiceError>,
) -> ActionResponse {
    match with_service(|service| action(service).map_err(to_failure)) {
        Ok(()) => ActionResponse::success(success_message),
        Err(response) => response,
    }
}

fn with_service<T>(
    f: impl FnOnce(&mut Service) -> Result<T, ActionResponse>,
) -> Result<T, ActionResponse> {
    let mut guard = lock_service();
    if guard.is_none() {
        *guard = Some(open_service()?);
    }
    match guard.as_mut() {
        Some(service) => f(service),
        None => Err(ActionResponse::failure(
            "unavailable",
            "controller is not available",
        )),
    }
}

fn lock_service() -> MutexGuard<'static, Option<Service>> {
    // Every controller action completes or leaves the prior snapshot intact,
    // so a poisoned guard still holds consistent state.
    SERVICE
        .lock()
        .unwrap_or_else(|poisoned| poisoned.into_inner())
}

fn open_service() -> Result<Service, ActionResponse> {
    let config = CoreConfig::default();
    let db_path = resolve_db_path();
    let persistence = SqlitePersistence::open(&db_path, config.document_name.as_str())
        .map_err(|err| {
            error!("event=ffi_open module=ffi status=error error_code=persistence error={err}");
            ActionResponse::failure("persistence", format!("database open failed: {err}"))
        })?;
    RestaurantService::open(persistence, SystemClock, &config).map_err(to_failure)
}

fn resolve_db_path() -> PathBuf {
    DB_PATH
        .get_or_init(|| {
            if let Ok(raw) = std::env::var(DB_PATH_ENV) {
                let trimmed = raw.trim();
                if !trimmed.is_empty() {
                    return PathBuf::from(trimmed);
                }
            }
            std::env::temp_dir().join(DB_FILE_NAME)
        })
        .clone()
}

fn to_failure(err: ServiceError) -> ActionResponse {
    let code = match &err {
        ServiceError::Config(_) => "config",
        ServiceError::Validation(_) => "validation",
        ServiceError::IndexOutOfBounds(_) => "index_out_of_bounds",
        ServiceError::ReviewLocked { .. } => "review_locked",
        ServiceError::NoReviewForm => "no_review_form",
        ServiceError::Persistence(_) => "persistence",
    };
    ActionResponse::failure(code, err.to_string())
}

fn build_screen(service: &Service) -> ScreenResponse {
    let restaurants = service
        .list()
        .restaurants()
        .iter()
        .enumerate()
        .map(|(restaurant_index, restaurant)| RestaurantView {
            restaurant_id: restaurant.id.to_string(),
            title: restaurant.title.clone(),
            reviews: restaurant
                .reviews
                .iter()
                .enumerate()
                .map(|(review_index, review)| {
                    let editable = service
                        .is_review_editable(restaurant_index, review_index)
                        .unwrap_or(false);
                    let remaining_ms = service
                        .review_remaining(restaurant_index, review_index)
                        .map(|remaining| u64::try_from(remaining.as_millis()).unwrap_or(u64::MAX))
                        .unwrap_or(0);
                    ReviewView {
                        review_id: review.id.to_string(),
                        text: review.text.clone(),
                        created_at: review.created_at,
                        editable,
                        remaining_ms,
                    }
                })
                .collect(),
        })
        .collect();

    ScreenResponse {
        ok: true,
        message: String::new(),
        restaurants,
        session: session_view(service),
        next_expiry_due_ms: service.next_expiry_due(),
    }
}

fn session_view(service: &Service) -> SessionView {
    let session = service.session();
    let to_u32 = |index: usize| u32::try_from(index).ok();
    let (review_restaurant_index, review_index) = match session.review_slot() {
        ReviewSlot::Idle => (None, None),
        ReviewSlot::Adding(restaurant_index) => (to_u32(restaurant_index), None),
        ReviewSlot::Editing {
            restaurant_index,
            review_index,
        } => (to_u32(restaurant_index), to_u32(review_index)),
    };
    let editing_restaurant_index = match session.restaurant_slot() {
        RestaurantSlot::Editing(index) => to_u32(index),
        RestaurantSlot::Idle | RestaurantSlot::Adding => None,
    };

    SessionView {
        review_restaurant_index,
        review_index,
        editing_restaurant_index,
    }
}

#[cfg(test)]
mod tests {
    use super::{
        configure_db_path, core_version, init_logging, ping, restaurant_cancel, restaurant_submit,
        restaurant_toggle_edit, review_cancel, review_select, review_submit, review_tick,
        review_toggle_add, screen_reload, screen_state,
    };
    use reviewbook_core::{
        PersistenceAdapter, Restaurant, RestaurantList, Review, SqlitePersistence,
        DEFAULT_DOCUMENT_NAME,
    };
    use std::sync::{Mutex, MutexGuard, OnceLock};

    static TEST_LOCK: Mutex<()> = Mutex::new(());
    static TEST_DB: OnceLock<String> = OnceLock::new();

    /// Shared-cache in-memory database; it lives as long as the controller's
    /// connection, so nothing is left on disk.
    fn test_db() -> &'static str {
        TEST_DB.get_or_init(|| {
            format!(
                "file:reviewbook-ffi-test-{}?mode=memory&cache=shared",
                std::process::id()
            )
        })
    }

    /// Serializes stateful tests and pins the test database for this run.
    fn setup() -> MutexGuard<'static, ()> {
        let guard = TEST_LOCK
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        let message = configure_db_path(test_db().to_string());
        assert!(message.is_empty(), "{message}");
        review_cancel();
        restaurant_cancel();
        guard
    }

    fn unique_suffix() -> u128 {
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .expect("time went backwards")
            .as_nanos()
    }

    fn index_of(title: &str) -> u32 {
        let screen = screen_state();
        assert!(screen.ok, "{}", screen.message);
        let index = screen
            .restaurants
            .iter()
            .position(|restaurant| restaurant.title == title)
            .expect("restaurant should be listed");
        u32::try_from(index).expect("index fits u32")
    }

    #[test]
    fn ping_returns_pong() {
        assert_eq!(ping(), "pong");
    }

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }

    #[test]
    fn init_logging_rejects_empty_log_dir() {
        let error = init_logging("info".to_string(), String::new());
        assert!(!error.is_empty());
    }

    #[test]
    fn init_logging_rejects_unsupported_level() {
        let error = init_logging("verbose".to_string(), "tmp/logs".to_string());
        assert!(!error.is_empty());
    }

    #[test]
    fn configure_db_path_rejects_empty_value() {
        assert!(!configure_db_path("  ".to_string()).is_empty());
    }

    #[test]
    fn short_title_reports_validation_code() {
        let _guard = setup();
        let response = restaurant_submit("a".to_string());
        assert!(!response.ok);
        assert_eq!(response.error_code.as_deref(), Some("validation"));
    }

    #[test]
    fn review_flow_adds_and_edits_within_window() {
        let _guard = setup();
        let title = format!("Cafe {}", unique_suffix());
        let added = restaurant_submit(title.clone());
        assert!(added.ok, "{}", added.message);
        let restaurant_index = index_of(&title);

        assert!(review_toggle_add(restaurant_index).ok);
        let screen = screen_state();
        assert_eq!(
            screen.session.review_restaurant_index,
            Some(restaurant_index)
        );
        let saved = review_submit("Great coffee".to_string());
        assert!(saved.ok, "{}", saved.message);

        let screen = screen_state();
        let review = &screen.restaurants[restaurant_index as usize].reviews[0];
        assert!(review.editable);
        assert!(review.remaining_ms > 0);
        assert!(screen.next_expiry_due_ms.is_some());
        assert!(review_tick().is_empty());

        assert!(review_select(restaurant_index, 0).ok);
        let edited = review_submit("Good coffee".to_string());
        assert!(edited.ok, "{}", edited.message);
        let screen = screen_state();
        assert_eq!(
            screen.restaurants[restaurant_index as usize].reviews[0].text,
            "Good coffee"
        );
        assert_eq!(screen.session.review_index, None);
    }

    #[test]
    fn expired_review_reports_review_locked_code() {
        let _guard = setup();
        // Opening the controller first keeps the shared database alive.
        assert!(screen_state().ok);

        let title = format!("Diner {}", unique_suffix());
        let seed = SqlitePersistence::open(test_db(), DEFAULT_DOCUMENT_NAME).expect("seed db");
        let mut restaurants = seed
            .load()
            .expect("load stored list")
            .unwrap_or_default()
            .restaurants()
            .to_vec();
        let mut restaurant = Restaurant::new(title.as_str());
        restaurant.reviews.push(Review::new("Stale coffee", 1_000));
        restaurants.push(restaurant);
        seed.save(&RestaurantList::from_restaurants(restaurants))
            .expect("seed save");
        drop(seed);

        let reloaded = screen_reload();
        assert!(reloaded.ok, "{}", reloaded.message);
        let restaurant_index = index_of(&title);
        let screen = screen_state();
        let review = &screen.restaurants[restaurant_index as usize].reviews[0];
        assert!(!review.editable);
        assert_eq!(review.remaining_ms, 0);

        let response = review_select(restaurant_index, 0);
        assert!(!response.ok);
        assert_eq!(response.error_code.as_deref(), Some("review_locked"));
        assert_eq!(screen_state().session.review_index, None);
    }

    #[test]
    fn stale_index_reports_index_code() {
        let _guard = setup();
        let response = restaurant_toggle_edit(u32::MAX);
        assert_eq!(response.error_code.as_deref(), Some("index_out_of_bounds"));

        let response = review_submit("orphan".to_string());
        assert_eq!(response.error_code.as_deref(), Some("no_review_form"));
    }
}
