//! Add / remove / flush / refresh / truncate through the public API

use crate::common::*;
use slotdb::testing::{CountingDriver, FailingDriver};
use slotdb::{Error, TableId, NOT_FOUND_SENTINEL};
use std::sync::Arc;

fn people() -> TableId {
    TableId::of::<Person, String>()
}

#[tokio::test]
async fn preloaded_table_is_visible_after_open() {
    let driver = memory();
    driver.replace_table(&people(), raw(&[("a", 0), ("b", 1)]));

    let index = open_people(driver).await;

    assert_eq!(keys_of(&index), vec!["a", "b"]);
    assert_eq!(index.get_index_for_key(&key("a")), Some(0));
    assert_eq!(index.get_index_for_key(&key("b")), Some(1));
    assert!(!index.is_dirty());
}

#[tokio::test]
async fn distinct_keys_get_strictly_increasing_slots() {
    let index = open_people(memory()).await;
    let names: Vec<String> = (0..20).map(|i| format!("person-{}", i)).collect();

    for name in &names {
        index.add_key(name.clone()).await.unwrap();
    }

    let slots: Vec<_> = names
        .iter()
        .map(|n| index.get_index_for_key(n).unwrap())
        .collect();
    assert!(slots.windows(2).all(|w| w[0] < w[1]));
    assert_eq!(index.query().len(), names.len());
}

#[tokio::test]
async fn adding_same_key_twice_is_idempotent() {
    let index = open_people(memory()).await;

    let first = index.add_key(key("alice")).await.unwrap();
    let second = index.add_key(key("alice")).await.unwrap();

    assert_eq!(first, second);
    assert_eq!(index.query().len(), 1);
}

#[tokio::test]
async fn removed_key_is_not_found() {
    let index = open_people(memory()).await;
    index.add_key(key("alice")).await.unwrap();
    index.flush().await.unwrap();

    assert!(index.remove_key(&key("alice")).await);

    assert_eq!(index.get_index_for_key(&key("alice")), None);
    assert_eq!(index.raw_index_for_key(&key("alice")), NOT_FOUND_SENTINEL);
    assert!(index.is_dirty());
}

#[tokio::test]
async fn removing_absent_key_keeps_dirty_state() {
    let index = open_people(memory()).await;

    index.remove_key(&key("ghost")).await;
    assert!(!index.is_dirty());

    index.add_key(key("alice")).await.unwrap();
    index.remove_key(&key("ghost")).await;
    assert!(index.is_dirty());
}

#[tokio::test]
async fn lookups_never_touch_dirty_state() {
    let index = open_people(memory()).await;
    index.add_key(key("alice")).await.unwrap();
    index.flush().await.unwrap();

    index.get_index_for_key(&key("alice"));
    index.get_index_for_key(&key("ghost"));
    index.raw_index_for_key(&key("ghost"));
    index.query();

    assert!(!index.is_dirty());
}

#[tokio::test]
async fn second_flush_without_mutation_does_no_io() {
    let counting = Arc::new(CountingDriver::new(memory()));
    let index = open_people(counting.clone()).await;

    index.add_key(key("alice")).await.unwrap();
    assert!(index.is_dirty());

    index.flush().await.unwrap();
    assert!(!index.is_dirty());
    index.flush().await.unwrap();

    assert_eq!(counting.writes(), 1);
}

#[tokio::test]
async fn refresh_flushes_then_matches_driver() {
    let driver = memory();
    let index = open_people(driver.clone()).await;
    index.add_key(key("a")).await.unwrap();
    index.add_key(key("b")).await.unwrap();
    index.add_key(key("c")).await.unwrap();
    index.remove_key(&key("b")).await;

    index.refresh().await.unwrap();

    let stored = driver.table(&people()).unwrap();
    assert_eq!(stored, raw(&[("a", 0), ("c", 2)]));
    assert_eq!(keys_of(&index), vec!["a", "c"]);
    assert_eq!(index.get_index_for_key(&key("c")), Some(2));
    assert!(!index.is_dirty());
}

#[tokio::test]
async fn truncate_resynchronizes_after_bulk_clear() {
    let driver = memory();
    let index = open_people(driver.clone()).await;
    index.add_key(key("a")).await.unwrap();
    index.flush().await.unwrap();
    index.add_key(key("b")).await.unwrap();

    driver.clear_table(&people());
    index.truncate().await.unwrap();

    assert!(index.is_empty());
    assert!(!index.is_dirty());
    assert_eq!(index.add_key(key("c")).await.unwrap(), 0);
}

#[tokio::test]
async fn write_failure_surfaces_and_keeps_mutations() {
    let failing = Arc::new(FailingDriver::new(memory()));
    let index = open_people(failing.clone()).await;
    index.add_key(key("alice")).await.unwrap();

    failing.set_fail_writes(true);
    let err = index.flush().await.unwrap_err();
    assert!(err.is_write_failure());
    assert!(matches!(err, Error::DriverWrite { ref table, .. } if *table == people()));

    assert!(index.is_dirty());
    assert_eq!(index.get_index_for_key(&key("alice")), Some(0));
}

#[tokio::test]
async fn entries_resolve_current_bodies() {
    let bodies = Bodies::new();
    bodies.put("alice", 30);

    let index = PersonIndex::open(memory(), bodies.resolver()).await.unwrap();
    index.add_key(key("alice")).await.unwrap();
    index.add_key(key("bob")).await.unwrap();

    let alice = index.entry(&key("alice")).unwrap();
    assert_eq!(alice.entity().unwrap().age, 30);
    assert!(index.entry(&key("bob")).unwrap().entity().is_none());

    // Saving a new body re-adds the key, which drops the cached entity
    let held = alice.entity().unwrap();
    bodies.put("alice", 31);
    index.add_key(key("alice")).await.unwrap();
    assert_eq!(held.age, 30);
    assert_eq!(alice.entity().unwrap().age, 31);
}

#[tokio::test]
async fn refresh_never_reissues_a_removed_slot() {
    let driver = memory();
    let index = open_people(driver.clone()).await;
    let a = index.add_key(key("a")).await.unwrap();
    let b = index.add_key(key("b")).await.unwrap();
    index.remove_key(&key("b")).await;

    index.refresh().await.unwrap();
    let c = index.add_key(key("c")).await.unwrap();

    assert_ne!(c, b, "slot of removed key was reassigned");
    assert!(c > b);
    assert_eq!(index.get_index_for_key(&key("a")), Some(a));
}

#[tokio::test]
async fn refresh_keeps_counter_when_another_writer_shrinks_table() {
    let driver = memory();
    let index = open_people(driver.clone()).await;
    for name in ["a", "b", "c"] {
        index.add_key(key(name)).await.unwrap();
    }
    index.flush().await.unwrap();

    driver.replace_table(&people(), raw(&[("a", 0)]));
    index.refresh().await.unwrap();

    assert_eq!(keys_of(&index), vec!["a"]);
    assert_eq!(index.add_key(key("d")).await.unwrap(), 3);
}
