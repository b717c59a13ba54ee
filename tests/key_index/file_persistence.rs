//! Key tables written through the file driver survive reopen

use crate::common::*;
use slotdb::{DriverConfig, Error, FileDriver, KeyIndex, TableId};
use std::fs;
use std::sync::Arc;
use tempfile::TempDir;

#[tokio::test]
async fn flushed_keys_survive_reopen() {
    let (dir, driver) = file_driver();
    {
        let index = open_people(driver).await;
        index.add_key(key("alice")).await.unwrap();
        index.add_key(key("bob")).await.unwrap();
        index.add_key(key("carol")).await.unwrap();
        index.remove_key(&key("bob")).await;
        index.flush().await.unwrap();
    }

    let driver = Arc::new(FileDriver::open(dir.path()).unwrap());
    let index = open_people(driver).await;

    assert_eq!(keys_of(&index), vec!["alice", "carol"]);
    assert_eq!(index.get_index_for_key(&key("carol")), Some(2));
    // Resumes past the highest persisted slot
    assert_eq!(index.next_slot(), 3);
    assert_eq!(index.add_key(key("dave")).await.unwrap(), 3);
}

#[tokio::test]
async fn unflushed_keys_are_lost_on_reopen() {
    let (dir, driver) = file_driver();
    {
        let index = open_people(driver).await;
        index.add_key(key("alice")).await.unwrap();
        index.flush().await.unwrap();
        index.add_key(key("bob")).await.unwrap();
    }

    let driver = Arc::new(FileDriver::open(dir.path()).unwrap());
    let index = open_people(driver).await;
    assert_eq!(keys_of(&index), vec!["alice"]);
}

#[tokio::test]
async fn composite_keys_roundtrip_through_file() {
    let (dir, driver) = file_driver();
    let order = |customer: &str, number| OrderKey {
        customer: customer.to_string(),
        number,
    };
    {
        let index = KeyIndex::<Order, OrderKey>::open(driver, |_: &OrderKey| None)
            .await
            .unwrap();
        index.add_key(order("alice", 1)).await.unwrap();
        index.add_key(order("alice", 2)).await.unwrap();
        index.add_key(order("bob", 1)).await.unwrap();
        index.flush().await.unwrap();
    }

    let driver = Arc::new(FileDriver::open(dir.path()).unwrap());
    let index = KeyIndex::<Order, OrderKey>::open(driver, |_: &OrderKey| None)
        .await
        .unwrap();

    assert_eq!(index.len(), 3);
    assert_eq!(index.get_index_for_key(&order("bob", 1)), Some(2));
    assert!(!index.contains_key(&order("bob", 2)));
}

#[tokio::test]
async fn corrupted_table_fails_open() {
    let (_dir, driver) = file_driver();
    {
        let index = open_people(driver.clone()).await;
        index.add_key(key("alice")).await.unwrap();
        index.flush().await.unwrap();
    }

    let path = driver.table_path(&TableId::of::<Person, String>());
    let mut bytes = fs::read(&path).unwrap();
    let last = bytes.len() - 1;
    bytes[last] ^= 0xFF;
    fs::write(&path, bytes).unwrap();

    let result = PersonIndex::open(driver, resolve_person).await;
    assert!(matches!(result, Err(Error::DriverRead { .. })));
}

#[tokio::test]
async fn delete_then_truncate_empties_index() {
    let (_dir, driver) = file_driver();
    let index = open_people(driver.clone()).await;
    index.add_key(key("alice")).await.unwrap();
    index.flush().await.unwrap();

    assert!(driver.delete_table(index.table_id()).await.unwrap());
    index.truncate().await.unwrap();

    assert!(index.is_empty());
    assert_eq!(index.next_slot(), 0);
}

#[tokio::test]
async fn config_file_selects_keys_directory() {
    init_tracing();
    let dir = TempDir::new().unwrap();
    let config_path = dir.path().join(slotdb::CONFIG_FILE_NAME);
    DriverConfig::write_default_if_missing(&config_path).unwrap();
    assert!(config_path.exists());

    let driver = Arc::new(FileDriver::open(dir.path()).unwrap());
    let index = open_people(driver.clone()).await;
    index.add_key(key("alice")).await.unwrap();
    index.flush().await.unwrap();

    let table_path = driver.table_path(index.table_id());
    assert!(table_path.starts_with(dir.path().join(DriverConfig::default().keys_dir)));
    assert!(table_path.exists());
}

#[tokio::test]
async fn invalid_config_is_rejected() {
    init_tracing();
    let dir = TempDir::new().unwrap();
    fs::write(
        dir.path().join(slotdb::CONFIG_FILE_NAME),
        "durability = \"sometimes\"\n",
    )
    .unwrap();

    let result = FileDriver::open(dir.path());
    assert!(matches!(result, Err(Error::Config(_))));
}
