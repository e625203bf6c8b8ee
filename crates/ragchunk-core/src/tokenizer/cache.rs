//! Read-through token count cache
//!
//! Counts are deterministic, so concurrent workers may race to fill the same
//! entry without coordination: both compute the same value.

use dashmap::DashMap;
use sha2::{Digest, Sha256};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use super::TokenCounter;
use crate::error::Result;

/// Token counter wrapper that memoises `count_tokens` by `(model, text)` hash
pub struct CachedCounter {
    inner: Arc<dyn TokenCounter>,
    counts: DashMap<[u8; 32], usize>,
    capacity: usize,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl CachedCounter {
    /// Wrap a counter with a cache holding at most `capacity` entries
    pub fn new(inner: Arc<dyn TokenCounter>, capacity: usize) -> Self {
        Self {
            inner,
            counts: DashMap::new(),
            capacity: capacity.max(1),
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
        }
    }

    /// Number of cached counts
    pub fn len(&self) -> usize {
        self.counts.len()
    }

    /// True when nothing is cached
    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    /// (hits, misses) since creation
    pub fn stats(&self) -> (u64, u64) {
        (self.hits.load(Ordering::Relaxed), self.misses.load(Ordering::Relaxed))
    }

    fn key(&self, text: &str) -> [u8; 32] {
        let mut hasher = Sha256::new();
        hasher.update(self.inner.name().as_bytes());
        hasher.update([0u8]);
        hasher.update(text.as_bytes());

        let mut key = [0u8; 32];
        key.copy_from_slice(&hasher.finalize());
        key
    }
}

impl TokenCounter for CachedCounter {
    fn name(&self) -> &str {
        self.inner.name()
    }

    fn count_tokens(&self, text: &str) -> Result<usize> {
        let key = self.key(text);

        if let Some(count) = self.counts.get(&key) {
            self.hits.fetch_add(1, Ordering::Relaxed);
            return Ok(*count);
        }

        self.misses.fetch_add(1, Ordering::Relaxed);
        let count = self.inner.count_tokens(text)?;

        // Full: start over rather than track recency
        if self.counts.len() >= self.capacity {
            tracing::debug!("Token count cache for '{}' full, clearing", self.inner.name());
            self.counts.clear();
        }
        self.counts.insert(key, count);

        Ok(count)
    }

    fn supports_offsets(&self) -> bool {
        self.inner.supports_offsets()
    }

    fn token_offsets(&self, text: &str) -> Result<Option<Vec<usize>>> {
        self.inner.token_offsets(text)
    }
}
