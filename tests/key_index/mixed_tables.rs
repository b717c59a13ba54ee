//! Several indices of different key types over one driver

use crate::common::*;
use slotdb::testing::FailingDriver;
use slotdb::{flush_all, KeyCollection, KeyIndex, KeyTableDriver};
use std::sync::Arc;

#[tokio::test]
async fn tables_of_one_driver_are_independent() {
    let driver = memory();
    let people = open_people(driver.clone()).await;
    let ages = KeyIndex::<Person, u32>::open(driver.clone(), |_: &u32| None)
        .await
        .unwrap();

    people.add_key(key("alice")).await.unwrap();
    people.add_key(key("bob")).await.unwrap();
    ages.add_key(30).await.unwrap();

    assert_eq!(ages.get_index_for_key(&30), Some(0));
    assert_ne!(people.table_id(), ages.table_id());

    people.flush().await.unwrap();
    ages.flush().await.unwrap();
    assert_eq!(driver.table_count(), 2);
}

#[tokio::test]
async fn flush_all_over_mixed_indices() {
    let driver = memory();
    let people = Arc::new(open_people(driver.clone()).await);
    let orders = Arc::new(
        KeyIndex::<Order, OrderKey>::open(driver.clone(), |_: &OrderKey| None)
            .await
            .unwrap(),
    );

    people.add_key(key("alice")).await.unwrap();
    orders
        .add_key(OrderKey {
            customer: key("alice"),
            number: 7,
        })
        .await
        .unwrap();

    let all: Vec<Arc<dyn KeyCollection>> = vec![people.clone(), orders.clone()];
    assert_eq!(flush_all(&all).await.unwrap(), 2);
    assert!(all.iter().all(|c| !c.is_dirty()));
    assert_eq!(flush_all(&all).await.unwrap(), 0);
}

#[tokio::test]
async fn flush_all_reports_first_failure() {
    let driver = memory();
    let failing = Arc::new(FailingDriver::new(driver.clone()));
    let healthy = Arc::new(open_people(driver.clone()).await);
    let broken = Arc::new(
        KeyIndex::<Person, u32>::open(failing.clone() as Arc<dyn KeyTableDriver>, |_: &u32| None)
            .await
            .unwrap(),
    );

    healthy.add_key(key("alice")).await.unwrap();
    broken.add_key(1).await.unwrap();
    failing.set_fail_writes(true);

    let all: Vec<Arc<dyn KeyCollection>> = vec![healthy.clone(), broken.clone()];
    let err = flush_all(&all).await.unwrap_err();

    assert!(err.is_write_failure());
    assert!(!healthy.is_dirty());
    assert!(broken.is_dirty());
}
