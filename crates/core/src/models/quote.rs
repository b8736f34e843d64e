use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A resolved quote and when it was fetched.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct QuoteEntry {
    pub price: f64,
    pub fetched_at: DateTime<Utc>,
}

/// Entry counts of a [`QuoteCache`] at a point in time.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheStatus {
    pub total: usize,
    pub fresh: usize,
    pub expired: usize,
}

/// In-memory cache of current quotes, keyed by uppercase ticker.
///
/// Entries older than the TTL are treated as misses and can be pruned.
#[derive(Debug, Clone)]
pub struct QuoteCache {
    entries: HashMap<String, QuoteEntry>,
    ttl: Duration,
}

impl QuoteCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            entries: HashMap::new(),
            ttl,
        }
    }

    /// Get a cached price if it is still fresh at `now`.
    pub fn get_fresh(&self, ticker: &str, now: DateTime<Utc>) -> Option<f64> {
        self.entries
            .get(&ticker.to_uppercase())
            .filter(|e| now - e.fetched_at < self.ttl)
            .map(|e| e.price)
    }

    /// Insert or replace the quote for a ticker.
    pub fn insert(&mut self, ticker: &str, price: f64, fetched_at: DateTime<Utc>) {
        self.entries
            .insert(ticker.to_uppercase(), QuoteEntry { price, fetched_at });
    }

    /// Drop the quote for a ticker. Returns whether one was cached.
    pub fn invalidate(&mut self, ticker: &str) -> bool {
        self.entries.remove(&ticker.to_uppercase()).is_some()
    }

    /// Remove every entry that is stale at `now`.
    /// Returns the number of entries removed.
    pub fn prune_expired(&mut self, now: DateTime<Utc>) -> usize {
        let before = self.entries.len();
        let ttl = self.ttl;
        self.entries.retain(|_, e| now - e.fetched_at < ttl);
        before - self.entries.len()
    }

    pub fn status(&self, now: DateTime<Utc>) -> CacheStatus {
        let fresh = self
            .entries
            .values()
            .filter(|e| now - e.fetched_at < self.ttl)
            .count();
        CacheStatus {
            total: self.entries.len(),
            fresh,
            expired: self.entries.len() - fresh,
        }
    }

    /// Tickers currently cached (fresh or not), sorted.
    pub fn tickers(&self) -> Vec<String> {
        let mut tickers: Vec<String> = self.entries.keys().cloned().collect();
        tickers.sort();
        tickers
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

impl Default for QuoteCache {
    fn default() -> Self {
        Self::new(Duration::minutes(30))
    }
}
