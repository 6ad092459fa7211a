// Copyright (c) 2026 Civic News
// SPDX-License-Identifier: MIT
//! Cached batched detail retrieval
//!
//! Given the ordered master list, retrieves a detail payload for every
//! entry: cached payloads are reused by change fingerprint, everything else
//! is fetched from the remote source in contiguous chunks of bounded size.
//! All fetches within a chunk run concurrently and the whole chunk must
//! complete before the next one starts. Results come back in input order;
//! any fetch failure aborts the run after its chunk has drained.

use std::collections::HashSet;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use futures::future::join_all;
use serde::de::DeserializeOwned;
use serde::Serialize;
use thiserror::Error;
use tracing::debug;

use crate::cache::{CacheError, CacheStore};
use crate::progress::ProgressSink;

/// An entry scheduled for detail retrieval.
///
/// `fingerprint` must change whenever the remote detail record changes;
/// the cache trusts it completely. Uniqueness of `id` is the caller's
/// business, the fetcher only deduplicates fingerprints.
pub trait WorkItem {
    fn id(&self) -> i64;
    fn fingerprint(&self) -> &str;
}

/// Remote source of detail records, one request per item.
#[async_trait]
pub trait DetailSource: Send + Sync {
    type Detail: Serialize + DeserializeOwned + Send;

    async fn fetch_detail(&self, id: i64) -> anyhow::Result<Self::Detail>;
}

/// One resolved work item.
#[derive(Debug)]
pub struct Fetched<D> {
    pub detail: D,
    pub cache_hit: bool,
}

/// Errors raised during a batched fetch run. None of these are retried;
/// they all abort the run.
#[derive(Error, Debug)]
pub enum FetchError {
    #[error(transparent)]
    Cache(#[from] CacheError),

    /// A stored payload no longer parses. Reproducible data corruption,
    /// not a retryable condition.
    #[error("cached payload for fingerprint {fingerprint} is malformed")]
    CacheDecode {
        fingerprint: String,
        #[source]
        source: serde_json::Error,
    },

    /// The remote fetch for one item failed; the error is propagated as-is.
    #[error("detail fetch for {id} failed")]
    Remote {
        id: i64,
        #[source]
        source: anyhow::Error,
    },

    /// A freshly fetched detail could not be serialized for caching.
    #[error("detail for {id} could not be encoded")]
    Encode {
        id: i64,
        #[source]
        source: serde_json::Error,
    },

    /// A fingerprint dispatched earlier in the chunk left no cache entry
    /// behind. Indicates a broken store, not a remote problem.
    #[error("fingerprint {0} missing from cache after fetch")]
    MissingAfterFetch(String),
}

/// Batched fetcher with a persistent fingerprint cache.
pub struct CachedBatchFetcher<S> {
    source: S,
    cache: Arc<CacheStore>,
    chunk_size: usize,
}

impl<S: DetailSource> CachedBatchFetcher<S> {
    pub fn new(source: S, cache: Arc<CacheStore>, chunk_size: usize) -> Self {
        assert!(chunk_size > 0, "chunk size must be at least 1");
        Self {
            source,
            cache,
            chunk_size,
        }
    }

    /// Resolve a detail record for every item, in input order.
    ///
    /// Cache lookups are synchronous; only remote fetches suspend. Within a
    /// chunk, duplicate fingerprints are dispatched once; later occurrences
    /// are resolved from the cache after the chunk barrier and count as
    /// hits. `progress` is notified once per completed item with the
    /// running cache-hit count.
    pub async fn run<I, P>(
        &self,
        items: &[I],
        progress: &P,
    ) -> Result<Vec<Fetched<S::Detail>>, FetchError>
    where
        I: WorkItem + Sync,
        P: ProgressSink,
    {
        progress.begin(items.len() as u64);
        let hits = AtomicU64::new(0);
        let mut resolved: Vec<Option<Fetched<S::Detail>>> =
            (0..items.len()).map(|_| None).collect();

        for (chunk_index, chunk) in items.chunks(self.chunk_size).enumerate() {
            let base = chunk_index * self.chunk_size;
            let mut in_flight: HashSet<&str> = HashSet::new();
            let mut to_fetch: Vec<(usize, &I)> = Vec::new();
            let mut deferred: Vec<usize> = Vec::new();

            for (offset, item) in chunk.iter().enumerate() {
                let fingerprint = item.fingerprint();
                if let Some(payload) = self.cache.get(fingerprint)? {
                    let detail = decode_cached(fingerprint, &payload)?;
                    progress.item_done(hits.fetch_add(1, Ordering::Relaxed) + 1);
                    resolved[base + offset] = Some(Fetched {
                        detail,
                        cache_hit: true,
                    });
                } else if in_flight.contains(fingerprint) {
                    deferred.push(base + offset);
                } else {
                    in_flight.insert(fingerprint);
                    to_fetch.push((base + offset, item));
                }
            }

            debug!(
                "chunk {}: {} to fetch, {} deferred",
                chunk_index,
                to_fetch.len(),
                deferred.len()
            );

            let hits_ref = &hits;
            let fetches = to_fetch.iter().map(|&(index, item)| async move {
                let detail = self
                    .source
                    .fetch_detail(item.id())
                    .await
                    .map_err(|source| FetchError::Remote {
                        id: item.id(),
                        source,
                    })?;
                let payload =
                    serde_json::to_string(&detail).map_err(|source| FetchError::Encode {
                        id: item.id(),
                        source,
                    })?;
                self.cache.insert(item.fingerprint(), &payload)?;
                progress.item_done(hits_ref.load(Ordering::Relaxed));
                Ok::<_, FetchError>((index, detail))
            });

            // join_all lets every in-flight request run to completion; the
            // first error then aborts the run.
            for result in join_all(fetches).await {
                let (index, detail) = result?;
                resolved[index] = Some(Fetched {
                    detail,
                    cache_hit: false,
                });
            }

            for index in deferred {
                let fingerprint = items[index].fingerprint();
                let payload = self
                    .cache
                    .get(fingerprint)?
                    .ok_or_else(|| FetchError::MissingAfterFetch(fingerprint.to_string()))?;
                let detail = decode_cached(fingerprint, &payload)?;
                progress.item_done(hits.fetch_add(1, Ordering::Relaxed) + 1);
                resolved[index] = Some(Fetched {
                    detail,
                    cache_hit: true,
                });
            }
        }

        progress.finish();
        Ok(resolved
            .into_iter()
            .map(|slot| slot.expect("every work item resolved by its chunk"))
            .collect())
    }

    pub fn chunk_size(&self) -> usize {
        self.chunk_size
    }
}

fn decode_cached<D: DeserializeOwned>(fingerprint: &str, payload: &str) -> Result<D, FetchError> {
    serde_json::from_str(payload).map_err(|source| FetchError::CacheDecode {
        fingerprint: fingerprint.to_string(),
        source,
    })
}
