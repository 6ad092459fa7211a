// Copyright (c) 2026 Civic News
// SPDX-License-Identifier: MIT
//! End-to-end fetch/cache behavior across separate store openings.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use billsync::{CacheStore, CachedBatchFetcher, DetailSource, NullProgress, WorkItem};

struct Bill {
    id: i64,
    hash: String,
}

impl WorkItem for Bill {
    fn id(&self) -> i64 {
        self.id
    }

    fn fingerprint(&self) -> &str {
        &self.hash
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct Detail {
    id: i64,
}

#[derive(Default)]
struct CountingSource {
    calls: AtomicU64,
}

// Local newtype so the foreign `DetailSource` trait can be implemented for an
// `Arc`-shared source without tripping the orphan rule in this integration-test
// crate (`Arc` is not `#[fundamental]`).
struct ArcSource(Arc<CountingSource>);

#[async_trait]
impl DetailSource for ArcSource {
    type Detail = Detail;

    async fn fetch_detail(&self, id: i64) -> anyhow::Result<Detail> {
        self.0.calls.fetch_add(1, Ordering::SeqCst);
        Ok(Detail { id })
    }
}

fn bills() -> Vec<Bill> {
    vec![
        Bill {
            id: 1,
            hash: "h1".to_string(),
        },
        Bill {
            id: 2,
            hash: "h2".to_string(),
        },
        Bill {
            id: 3,
            hash: "h3".to_string(),
        },
    ]
}

#[tokio::test]
async fn a_second_run_against_the_same_store_fetches_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("cache.db");
    let source = Arc::new(CountingSource::default());

    // first run, empty cache
    {
        let cache = Arc::new(CacheStore::open(&path).unwrap());
        let fetcher = CachedBatchFetcher::new(ArcSource(Arc::clone(&source)), cache, 2);
        let out = fetcher.run(&bills(), &NullProgress).await.unwrap();
        assert_eq!(source.calls.load(Ordering::SeqCst), 3);
        assert!(out.iter().all(|item| !item.cache_hit));
    }

    // fresh store handle over the same file, as a new process would open
    let cache = Arc::new(CacheStore::open(&path).unwrap());
    let fetcher = CachedBatchFetcher::new(ArcSource(Arc::clone(&source)), cache, 2);
    let out = fetcher.run(&bills(), &NullProgress).await.unwrap();

    assert_eq!(source.calls.load(Ordering::SeqCst), 3);
    assert!(out.iter().all(|item| item.cache_hit));
    let ids: Vec<i64> = out.iter().map(|item| item.detail.id).collect();
    assert_eq!(ids, vec![1, 2, 3]);
}

#[tokio::test]
async fn a_new_fingerprint_triggers_exactly_one_new_fetch() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("cache.db");
    let source = Arc::new(CountingSource::default());

    {
        let cache = Arc::new(CacheStore::open(&path).unwrap());
        let fetcher = CachedBatchFetcher::new(ArcSource(Arc::clone(&source)), cache, 20);
        fetcher.run(&bills(), &NullProgress).await.unwrap();
    }

    // bill 2 was amended: its change hash moved, the others are unchanged
    let mut amended = bills();
    amended[1].hash = "h2-v2".to_string();

    let cache = Arc::new(CacheStore::open(&path).unwrap());
    let fetcher = CachedBatchFetcher::new(ArcSource(Arc::clone(&source)), cache, 20);
    let out = fetcher.run(&amended, &NullProgress).await.unwrap();

    assert_eq!(source.calls.load(Ordering::SeqCst), 4);
    assert_eq!(
        out.iter().map(|item| item.cache_hit).collect::<Vec<_>>(),
        vec![true, false, true]
    );
}
