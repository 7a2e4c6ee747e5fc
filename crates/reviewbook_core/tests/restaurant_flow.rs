use reviewbook_core::{
    CoreConfig, ManualClock, PersistenceAdapter, RestaurantService, RestaurantSlot, ReviewSlot,
    ServiceError, SqlitePersistence, DEFAULT_DOCUMENT_NAME,
};
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

const MINUTE: i64 = 60_000;

fn open_service(
    path: &Path,
    clock: &Arc<ManualClock>,
) -> RestaurantService<SqlitePersistence, Arc<ManualClock>> {
    let persistence = SqlitePersistence::open(path, DEFAULT_DOCUMENT_NAME).unwrap();
    RestaurantService::open(persistence, Arc::clone(clock), &CoreConfig::default()).unwrap()
}

#[test]
fn cafe_scenario_persists_and_locks_after_five_minutes() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("reviewbook.db");
    let clock = Arc::new(ManualClock::new(1_000));

    let mut service = open_service(&path, &clock);
    assert!(service.list().is_empty());

    service.submit_restaurant("Cafe A").unwrap();
    service.toggle_add_review(0).unwrap();
    assert_eq!(service.session().review_slot(), ReviewSlot::Adding(0));
    service.submit_review("Great coffee").unwrap();

    let review = service.list().restaurants()[0].reviews[0].clone();
    assert_eq!(review.text, "Great coffee");
    assert_eq!(review.created_at, 1_000);
    // Minute buckets: created in bucket 0, locked from the start of bucket 5.
    assert_eq!(service.next_expiry_due(), Some(5 * MINUTE));

    clock.advance(Duration::from_secs(6 * 60));
    assert_eq!(service.tick(), vec![review.id]);
    assert!(service.tick().is_empty());
    assert!(matches!(
        service.select_review_to_edit(0, 0),
        Err(ServiceError::ReviewLocked { .. })
    ));
    drop(service);

    let reopened = open_service(&path, &clock);
    assert_eq!(reopened.list().restaurants()[0].reviews[0], review);
    assert!(!reopened.is_review_editable(0, 0).unwrap());
    assert_eq!(reopened.next_expiry_due(), None);
}

#[test]
fn reopening_inside_window_rearms_expiry() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("reviewbook.db");
    let clock = Arc::new(ManualClock::new(0));

    let mut service = open_service(&path, &clock);
    service.submit_restaurant("Cafe A").unwrap();
    service.toggle_add_review(0).unwrap();
    service.submit_review("Great coffee").unwrap();
    drop(service);

    clock.set(2 * MINUTE);
    let mut reopened = open_service(&path, &clock);
    assert!(reopened.is_review_editable(0, 0).unwrap());
    assert_eq!(
        reopened.review_remaining(0, 0).unwrap(),
        Duration::from_secs(3 * 60)
    );
    assert_eq!(reopened.next_expiry_due(), Some(5 * MINUTE));

    reopened.select_review_to_edit(0, 0).unwrap();
    reopened.submit_review("Good coffee").unwrap();
    assert_eq!(reopened.list().restaurants()[0].reviews[0].created_at, 0);
}

#[test]
fn restaurant_and_review_forms_are_independent() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("reviewbook.db");
    let clock = Arc::new(ManualClock::new(0));
    let mut service = open_service(&path, &clock);

    service.submit_restaurant("Cafe A").unwrap();
    service.submit_restaurant("Diner B").unwrap();

    service.toggle_edit_restaurant(0).unwrap();
    service.toggle_add_review(1).unwrap();
    service.submit_review("Nice pancakes").unwrap();
    assert_eq!(
        service.session().restaurant_slot(),
        RestaurantSlot::Editing(0)
    );

    service.toggle_edit_restaurant(1).unwrap();
    service.submit_restaurant("Diner C").unwrap();
    let titles: Vec<&str> = service
        .list()
        .restaurants()
        .iter()
        .map(|restaurant| restaurant.title.as_str())
        .collect();
    assert_eq!(titles, vec!["Cafe A", "Diner C"]);
    assert_eq!(service.list().restaurants()[1].reviews.len(), 1);

    let stored = SqlitePersistence::open(&path, DEFAULT_DOCUMENT_NAME)
        .unwrap()
        .load()
        .unwrap()
        .unwrap();
    assert_eq!(&stored, service.list());
}
