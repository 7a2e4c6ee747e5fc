use reviewbook_core::db::open_db;
use reviewbook_core::repo::snapshot_repo::{encode_snapshot, SNAPSHOT_FORMAT_VERSION};
use reviewbook_core::{
    PersistenceAdapter, RepoError, Restaurant, RestaurantList, Review, SqlitePersistence,
    DEFAULT_DOCUMENT_NAME,
};

fn sample() -> RestaurantList {
    let mut cafe = Restaurant::new("Cafe A");
    cafe.reviews.push(Review::new("Great coffee", 1_000));
    cafe.reviews.push(Review::new("Slow service", 2_000));
    RestaurantList::from_restaurants(vec![cafe, Restaurant::new("Diner B")])
}

#[test]
fn empty_database_loads_none() {
    let repo = SqlitePersistence::open_in_memory(DEFAULT_DOCUMENT_NAME).unwrap();
    assert!(repo.load().unwrap().is_none());
}

#[test]
fn save_then_load_roundtrip_preserves_order_ids_and_timestamps() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("reviewbook.db");
    let list = sample();

    let repo = SqlitePersistence::open(&path, DEFAULT_DOCUMENT_NAME).unwrap();
    repo.save(&list).unwrap();
    drop(repo);

    let reopened = SqlitePersistence::open(&path, DEFAULT_DOCUMENT_NAME).unwrap();
    let loaded = reopened.load().unwrap().unwrap();
    assert_eq!(loaded, list);
    assert_eq!(loaded.restaurants()[0].reviews[1].created_at, 2_000);
}

#[test]
fn save_overwrites_single_document() {
    let repo = SqlitePersistence::open_in_memory(DEFAULT_DOCUMENT_NAME).unwrap();
    repo.save(&sample()).unwrap();
    let replacement = RestaurantList::from_restaurants(vec![Restaurant::new("Only one")]);
    repo.save(&replacement).unwrap();

    assert_eq!(repo.load().unwrap(), Some(replacement));
}

#[test]
fn documents_are_isolated_by_name() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("reviewbook.db");

    let main = SqlitePersistence::open(&path, "restaurants").unwrap();
    let scratch = SqlitePersistence::open(&path, "scratch").unwrap();
    main.save(&sample()).unwrap();

    assert!(scratch.load().unwrap().is_none());
    assert_eq!(scratch.document_name(), "scratch");
}

#[test]
fn corrupt_document_is_reported_not_masked() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("reviewbook.db");

    let conn = open_db(&path).unwrap();
    conn.execute(
        "INSERT INTO documents (name, body, updated_at) VALUES (?1, ?2, 0);",
        rusqlite::params![DEFAULT_DOCUMENT_NAME, b"{broken".to_vec()],
    )
    .unwrap();
    drop(conn);

    let repo = SqlitePersistence::open(&path, DEFAULT_DOCUMENT_NAME).unwrap();
    assert!(matches!(repo.load(), Err(RepoError::InvalidData(_))));
}

#[test]
fn stored_body_is_versioned_json() {
    let body = encode_snapshot(&sample()).unwrap();
    let value: serde_json::Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(value["version"], SNAPSHOT_FORMAT_VERSION);
    assert_eq!(value["restaurants"][1]["title"], "Diner B");
    assert_eq!(value["restaurants"][0]["reviews"][0]["text"], "Great coffee");
}
