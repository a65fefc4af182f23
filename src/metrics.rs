//! Lookup metrics and observability.
//!
//! Counts cache hits/misses, provider calls and failures, and lookups that
//! ended with the "not found" record. Each engine owns its own instance.

use serde::Serialize;
use std::sync::atomic::{AtomicUsize, Ordering};

#[derive(Debug, Default)]
pub struct LookupMetrics {
    /// Lookups answered from the cache
    cache_hits: AtomicUsize,

    /// Lookups that had to go to the provider chain
    cache_misses: AtomicUsize,

    /// Individual provider attempts
    provider_calls: AtomicUsize,

    /// Provider attempts that failed (any reason)
    provider_failures: AtomicUsize,

    /// Lookups where every provider failed
    not_found: AtomicUsize,
}

impl LookupMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_cache_hit(&self) {
        self.cache_hits.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_cache_miss(&self) {
        self.cache_misses.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_provider_call(&self) {
        self.provider_calls.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_provider_failure(&self) {
        self.provider_failures.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_not_found(&self) {
        self.not_found.fetch_add(1, Ordering::Relaxed);
    }

    pub fn cache_hits(&self) -> usize {
        self.cache_hits.load(Ordering::Relaxed)
    }

    pub fn cache_misses(&self) -> usize {
        self.cache_misses.load(Ordering::Relaxed)
    }

    pub fn provider_calls(&self) -> usize {
        self.provider_calls.load(Ordering::Relaxed)
    }

    pub fn provider_failures(&self) -> usize {
        self.provider_failures.load(Ordering::Relaxed)
    }

    pub fn not_found(&self) -> usize {
        self.not_found.load(Ordering::Relaxed)
    }

    /// Snapshot of all counters plus derived rates
    pub fn report(&self) -> MetricsReport {
        let hits = self.cache_hits();
        let misses = self.cache_misses();
        let total_lookups = hits + misses;
        let cache_hit_rate = if total_lookups > 0 {
            (hits as f64 / total_lookups as f64) * 100.0
        } else {
            0.0
        };

        let calls = self.provider_calls();
        let failures = self.provider_failures();
        let provider_success_rate = if calls > 0 {
            (calls.saturating_sub(failures) as f64 / calls as f64) * 100.0
        } else {
            0.0
        };

        MetricsReport {
            cache_hits: hits,
            cache_misses: misses,
            cache_hit_rate,
            provider_calls: calls,
            provider_failures: failures,
            provider_success_rate,
            not_found: self.not_found(),
        }
    }

    pub fn reset(&self) {
        self.cache_hits.store(0, Ordering::Relaxed);
        self.cache_misses.store(0, Ordering::Relaxed);
        self.provider_calls.store(0, Ordering::Relaxed);
        self.provider_failures.store(0, Ordering::Relaxed);
        self.not_found.store(0, Ordering::Relaxed);
    }
}

/// Point-in-time lookup statistics
#[derive(Debug, Clone, Serialize)]
pub struct MetricsReport {
    pub cache_hits: usize,
    pub cache_misses: usize,

    /// Cache hit rate as a percentage (0-100)
    pub cache_hit_rate: f64,

    pub provider_calls: usize,
    pub provider_failures: usize,

    /// Provider success rate as a percentage (0-100)
    pub provider_success_rate: f64,

    pub not_found: usize,
}
