//! Revalidation cache for content queries.
//!
//! Every page render re-runs its queries, so identical queries arriving
//! within the refresh interval are answered from memory instead of going
//! back to the store.
//!
//! # Cache keys
//!
//! Keys are content-addressed: the SHA-256 of the rendered query string and
//! its bound parameters. Two [`Query`] values that would send the same
//! request share an entry regardless of how they were built.
//!
//! # Staleness
//!
//! Entries live for the configured refresh interval (30 seconds by default)
//! and are then fetched again on next use. Concurrent misses for the same key
//! share one fetch. A fetch with [`FetchOptions::fresh`] skips the cache in
//! both directions.

use crate::client::ClientError;
use crate::query::Query;
use crate::source::{ContentSource, FetchOptions};
use moka::future::Cache;
use serde_json::Value;
use sha2::{Digest, Sha256};
use std::time::Duration;
use tracing::debug;

const MAX_ENTRIES: u64 = 1_000;

/// A [`ContentSource`] that remembers results for a fixed interval.
pub struct CachedSource<S> {
    inner: S,
    cache: Cache<String, Value>,
}

impl<S: ContentSource> CachedSource<S> {
    pub fn new(inner: S, ttl: Duration) -> Self {
        let cache = Cache::builder()
            .max_capacity(MAX_ENTRIES)
            .time_to_live(ttl)
            .build();
        Self { inner, cache }
    }

    pub fn inner(&self) -> &S {
        &self.inner
    }

    /// Number of live entries. Pending housekeeping may lag slightly.
    pub fn entry_count(&self) -> u64 {
        self.cache.entry_count()
    }

    /// Drop every cached result.
    pub fn invalidate_all(&self) {
        self.cache.invalidate_all();
    }
}

impl<S: ContentSource> ContentSource for CachedSource<S> {
    async fn fetch(&self, query: &Query, options: FetchOptions) -> Result<Value, ClientError> {
        if options.revalidate.is_none() {
            return self.inner.fetch(query, options).await;
        }

        let key = query_key(query);
        if let Some(hit) = self.cache.get(&key).await {
            debug!(query = query.name(), "Cache hit");
            return Ok(hit);
        }

        debug!(query = query.name(), "Cache miss");
        self.cache
            .try_get_with(key, self.inner.fetch(query, options))
            .await
            .map_err(ClientError::Cached)
    }
}

/// SHA-256 of the query string and its parameters, as a hex string.
pub fn query_key(query: &Query) -> String {
    let mut hasher = Sha256::new();
    hasher.update(query.to_groq().as_bytes());
    hasher.update(b"\x00");
    for (name, value) in query.params() {
        hasher.update(name.as_bytes());
        hasher.update(b"=");
        hasher.update(value.to_string().as_bytes());
        hasher.update(b"\x00");
    }
    format!("{:x}", hasher.finalize())
}
