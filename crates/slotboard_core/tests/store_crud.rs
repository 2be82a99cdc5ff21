use chrono::{NaiveDate, NaiveTime};
use slotboard_core::{
    MemoryRepository, ScheduleStore, SlotKey, Status, StoreError, SELECTABLE_STATUSES,
};

#[test]
fn empty_store_add_user_then_slot_scenario() {
    let mut store = ScheduleStore::load(MemoryRepository::new());

    store.add_user("Alice").unwrap();
    store.add_slot(slot(2024, 5, 1, 10, 0), None).unwrap();

    let table = store.table();
    assert_eq!(table.slot_count(), 1);
    assert_eq!(table.user_names(), vec!["Alice"]);
    assert_eq!(
        table.status_at(&slot(2024, 5, 1, 10, 0), "Alice"),
        Some(Status::Undecided)
    );
}

#[test]
fn duplicate_slot_aborts_without_state_change() {
    let mut store = ScheduleStore::load(MemoryRepository::new());
    store.add_user("Alice").unwrap();
    store.add_slot(slot(2024, 5, 1, 10, 0), None).unwrap();

    let before = store.table().clone();
    let err = store.add_slot(slot(2024, 5, 1, 10, 0), Some("Bob")).unwrap_err();

    assert!(matches!(err, StoreError::DuplicateSlot(_)));
    assert_eq!(store.table(), &before);
}

#[test]
fn duplicate_user_aborts_without_state_change() {
    let mut store = ScheduleStore::load(MemoryRepository::new());
    store.add_user("Alice").unwrap();

    let before = store.table().clone();
    let err = store.add_user("Alice").unwrap_err();

    assert!(matches!(err, StoreError::DuplicateUser(name) if name == "Alice"));
    assert_eq!(store.table(), &before);
}

#[test]
fn blank_user_name_is_rejected() {
    let mut store = ScheduleStore::load(MemoryRepository::new());
    assert!(matches!(
        store.add_user("   "),
        Err(StoreError::InvalidUserName)
    ));
    assert_eq!(store.table().user_count(), 0);
}

#[test]
fn add_slot_registers_requesting_user() {
    let mut store = ScheduleStore::load(MemoryRepository::new());
    store.add_slot(slot(2024, 5, 1, 10, 0), Some("Bob")).unwrap();

    let table = store.table();
    assert_eq!(table.user_names(), vec!["Bob"]);
    assert_eq!(
        table.status_at(&slot(2024, 5, 1, 10, 0), "Bob"),
        Some(Status::Undecided)
    );
}

#[test]
fn add_slot_does_not_duplicate_known_requesting_user() {
    let mut store = ScheduleStore::load(MemoryRepository::new());
    store.add_user("Bob").unwrap();
    store.add_slot(slot(2024, 5, 1, 10, 0), Some("Bob")).unwrap();
    store.add_slot(slot(2024, 5, 2, 10, 0), Some("Bob")).unwrap();

    assert_eq!(store.table().user_count(), 1);
    assert_eq!(store.table().slot_count(), 2);
}

#[test]
fn invalid_slot_range_is_rejected_before_mutation() {
    let mut store = ScheduleStore::load(MemoryRepository::new());
    let key = SlotKey::with_end(date(2024, 5, 1), time(10, 0), time(9, 0));

    assert!(matches!(store.add_slot(key, None), Err(StoreError::Slot(_))));
    assert!(store.table().is_empty());
}

#[test]
fn every_mutation_persists_the_document() {
    let repo = MemoryRepository::new();
    let handle = repo.clone();
    let mut store = ScheduleStore::load(repo);

    assert!(handle.document().is_none());

    store.add_user("Alice").unwrap();
    assert!(handle.document().is_some());

    handle.clear();
    store.add_slot(slot(2024, 5, 1, 10, 0), None).unwrap();
    assert!(handle.document().is_some());

    let reloaded = ScheduleStore::load(handle);
    assert_eq!(reloaded.table(), store.table());
}

#[test]
fn rejected_mutations_do_not_persist() {
    let repo = MemoryRepository::new();
    let handle = repo.clone();
    let mut store = ScheduleStore::load(repo);
    store.add_user("Alice").unwrap();

    handle.clear();
    store.add_user("Alice").unwrap_err();
    store
        .add_slot(
            SlotKey::with_end(date(2024, 5, 1), time(10, 0), time(9, 0)),
            None,
        )
        .unwrap_err();

    assert!(handle.document().is_none());
}

#[test]
fn load_from_missing_document_is_empty() {
    let store = ScheduleStore::load(MemoryRepository::new());
    assert!(store.table().is_empty());
    assert_eq!(store.table().user_count(), 0);
}

#[test]
fn sort_persists_only_when_order_changes() {
    let repo = MemoryRepository::new();
    let handle = repo.clone();
    let mut store = ScheduleStore::load(repo);
    store.add_slot(slot(2024, 5, 2, 10, 0), None).unwrap();
    store.add_slot(slot(2024, 5, 1, 10, 0), None).unwrap();

    assert!(store.sort_slots().unwrap());
    assert_eq!(
        store.table().slots(),
        &[slot(2024, 5, 1, 10, 0), slot(2024, 5, 2, 10, 0)]
    );

    handle.clear();
    assert!(!store.sort_slots().unwrap());
    assert!(handle.document().is_none());
}

#[test]
fn editor_columns_offer_only_selectable_statuses() {
    let mut store = ScheduleStore::load(MemoryRepository::new());
    store.add_user("Alice").unwrap();
    store.add_user("Bob").unwrap();

    let columns = store.editor_columns();
    assert_eq!(columns.len(), 2);
    assert_eq!(columns[0].label, "Alice");
    for column in &columns {
        assert_eq!(column.options, SELECTABLE_STATUSES.to_vec());
        assert!(!column.options.contains(&Status::Undecided));
    }
}

fn slot(year: i32, month: u32, day: u32, hour: u32, minute: u32) -> SlotKey {
    SlotKey::new(date(year, month, day), time(hour, minute))
}

fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).unwrap()
}

fn time(hour: u32, minute: u32) -> NaiveTime {
    NaiveTime::from_hms_opt(hour, minute, 0).unwrap()
}
