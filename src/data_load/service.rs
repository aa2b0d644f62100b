//! Cached query loading.
//!
//! A cache miss forwards the executor's events to the caller while
//! recording them; the recording is kept only when the stream completes.
//! A cache hit replays the recording from a spawned task, yielding to the
//! runtime between events so replay interleaves like a live stream.

use std::sync::Arc;

use dashmap::DashMap;
use futures::future::join_all;
use tokio::sync::mpsc;
use tokio::time::Instant;
use tracing::{debug, info};

use super::events::{load_result, DataLoadResult, LoadEvent, QueryExecutor, QueryResult};
use super::hash::query_key;
use crate::config::CacheSettings;
use crate::jaql::JaqlQuery;

const CHANNEL_CAPACITY: usize = 64;

#[derive(Debug)]
struct CacheEntry {
    events: Arc<Vec<LoadEvent>>,
    stored_at: Instant,
}

/// Loads query results through an executor, caching completed streams.
pub struct DataLoadService<E> {
    executor: Arc<E>,
    cache: Arc<DashMap<String, CacheEntry>>,
    settings: CacheSettings,
}

impl<E: QueryExecutor> DataLoadService<E> {
    pub fn new(executor: E, settings: CacheSettings) -> Self {
        info!(
            enabled = settings.enabled,
            ttl_seconds = settings.ttl_seconds,
            max_entries = settings.max_entries,
            "data load service started"
        );
        Self {
            executor: Arc::new(executor),
            cache: Arc::new(DashMap::new()),
            settings,
        }
    }

    pub fn executor(&self) -> &E {
        &self.executor
    }

    /// Number of cached results, expired ones included.
    pub fn cached_len(&self) -> usize {
        self.cache.len()
    }

    pub fn clear_cache(&self) {
        self.cache.clear();
        info!("data load cache cleared");
    }

    /// Drop the cached result for `query`. Returns whether one existed.
    pub fn invalidate(&self, query: &JaqlQuery) -> DataLoadResult<bool> {
        let key = query_key(query)?;
        Ok(self.cache.remove(&key).is_some())
    }

    /// Stream the result of `query`.
    pub async fn load(&self, query: &JaqlQuery) -> DataLoadResult<mpsc::Receiver<LoadEvent>> {
        let key = query_key(query)?;

        if self.settings.enabled {
            if let Some(events) = self.cached(&key) {
                debug!(key = %key, events = events.len(), "data load cache hit");
                return Ok(replay(events));
            }
        }

        let upstream = self.executor.execute(query).await?;
        let (tx, rx) = mpsc::channel(CHANNEL_CAPACITY);
        let cache = self.settings.enabled.then(|| Arc::clone(&self.cache));
        let max_entries = self.settings.max_entries;
        tokio::spawn(forward(upstream, tx, key, cache, max_entries));
        Ok(rx)
    }

    /// Load and collect the result of `query`.
    pub async fn load_result(&self, query: &JaqlQuery) -> DataLoadResult<QueryResult> {
        load_result(self.load(query).await?).await
    }

    /// Load several queries concurrently, results in input order.
    pub async fn load_all(&self, queries: &[JaqlQuery]) -> Vec<DataLoadResult<QueryResult>> {
        join_all(queries.iter().map(|q| self.load_result(q))).await
    }

    fn cached(&self, key: &str) -> Option<Arc<Vec<LoadEvent>>> {
        let fresh = {
            let entry = self.cache.get(key)?;
            (entry.stored_at.elapsed() < self.settings.ttl()).then(|| Arc::clone(&entry.events))
        };
        if fresh.is_none() {
            debug!(key = %key, "data load cache entry expired");
            self.cache.remove(key);
        }
        fresh
    }
}

fn replay(events: Arc<Vec<LoadEvent>>) -> mpsc::Receiver<LoadEvent> {
    let (tx, rx) = mpsc::channel(CHANNEL_CAPACITY);
    tokio::spawn(async move {
        for event in events.iter() {
            if tx.send(event.clone()).await.is_err() {
                break;
            }
            tokio::task::yield_now().await;
        }
    });
    rx
}

async fn forward(
    mut upstream: mpsc::Receiver<LoadEvent>,
    tx: mpsc::Sender<LoadEvent>,
    key: String,
    cache: Option<Arc<DashMap<String, CacheEntry>>>,
    max_entries: usize,
) {
    let mut recorded = Vec::new();
    let mut terminated = false;
    while let Some(event) = upstream.recv().await {
        let terminal = event.is_terminal();
        if cache.is_some() {
            recorded.push(event.clone());
        }
        // Keep draining when the caller is gone so the result can still be cached
        let _ = tx.send(event).await;
        if terminal {
            terminated = true;
            break;
        }
    }

    if !terminated {
        let _ = tx
            .send(LoadEvent::Failed("executor closed the stream".to_string()))
            .await;
        return;
    }

    let Some(cache) = cache else { return };
    if recorded.last() != Some(&LoadEvent::Completed) {
        debug!(key = %key, "failed stream not cached");
        return;
    }
    if cache.len() >= max_entries {
        evict_oldest(&cache);
    }
    cache.insert(
        key,
        CacheEntry {
            events: Arc::new(recorded),
            stored_at: Instant::now(),
        },
    );
}

fn evict_oldest(cache: &DashMap<String, CacheEntry>) {
    let oldest = cache
        .iter()
        .min_by_key(|entry| entry.value().stored_at)
        .map(|entry| entry.key().clone());
    if let Some(key) = oldest {
        debug!(key = %key, "evicting oldest cached result");
        cache.remove(&key);
    }
}
