//! Concurrent mutation against one shared index

use crate::common::*;
use slotdb::testing::CountingDriver;
use std::collections::HashSet;
use std::sync::Arc;

#[tokio::test(flavor = "multi_thread", worker_threads = 8)]
async fn concurrent_distinct_adds_lose_nothing() {
    const N: usize = 256;
    let index = Arc::new(open_people(memory()).await);

    let handles: Vec<_> = (0..N)
        .map(|i| {
            let index = Arc::clone(&index);
            tokio::spawn(async move { index.add_key(format!("key-{}", i)).await.unwrap() })
        })
        .collect();

    let mut slots = HashSet::new();
    for handle in handles {
        slots.insert(handle.await.unwrap());
    }

    assert_eq!(slots.len(), N);
    assert_eq!(index.query().len(), N);
    assert_eq!(index.next_slot(), N as u64);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 8)]
async fn concurrent_adds_of_same_key_share_one_slot() {
    let index = Arc::new(open_people(memory()).await);

    let handles: Vec<_> = (0..32)
        .map(|_| {
            let index = Arc::clone(&index);
            tokio::spawn(async move { index.add_key(key("shared")).await.unwrap() })
        })
        .collect();

    let mut slots = HashSet::new();
    for handle in handles {
        slots.insert(handle.await.unwrap());
    }

    assert_eq!(slots.len(), 1);
    assert_eq!(index.len(), 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn flushes_interleaved_with_adds_persist_everything() {
    let driver = memory();
    let counting = Arc::new(CountingDriver::new(driver.clone()));
    let index = Arc::new(open_people(counting.clone()).await);

    let adders: Vec<_> = (0..4)
        .map(|t| {
            let index = Arc::clone(&index);
            tokio::spawn(async move {
                for i in 0..25 {
                    index.add_key(format!("t{}-{}", t, i)).await.unwrap();
                }
            })
        })
        .collect();
    let flusher = {
        let index = Arc::clone(&index);
        tokio::spawn(async move {
            for _ in 0..10 {
                index.flush().await.unwrap();
                tokio::task::yield_now().await;
            }
        })
    };

    for adder in adders {
        adder.await.unwrap();
    }
    flusher.await.unwrap();
    index.flush().await.unwrap();

    assert!(!index.is_dirty());
    let reopened = open_people(driver).await;
    assert_eq!(reopened.len(), 100);
    assert_eq!(reopened.next_slot(), 100);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn readers_run_alongside_writers() {
    let index = Arc::new(open_people(memory()).await);
    index.add_key(key("anchor")).await.unwrap();

    let writer = {
        let index = Arc::clone(&index);
        tokio::spawn(async move {
            for i in 0..200 {
                index.add_key(format!("w-{}", i)).await.unwrap();
                if i % 3 == 0 {
                    index.remove_key(&format!("w-{}", i)).await;
                }
            }
        })
    };

    let reader = {
        let index = Arc::clone(&index);
        tokio::spawn(async move {
            for _ in 0..200 {
                assert_eq!(index.get_index_for_key(&key("anchor")), Some(0));
                let snapshot = index.query();
                assert_eq!(snapshot[0].key(), "anchor");
                tokio::task::yield_now().await;
            }
        })
    };

    writer.await.unwrap();
    reader.await.unwrap();

    assert_eq!(index.len(), 1 + 200 - 67);
}
