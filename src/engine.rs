//! Public entry point: normalize, consult the cache, fall back to the chain.

use crate::cache::ResultCache;
use crate::chain::ProviderChain;
use crate::config::Config;
use crate::metrics::LookupMetrics;
use crate::providers::{build_http_client, build_providers};
use crate::record::{CanonicalRecord, LookupKey};
use anyhow::Result;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Resolves words to [`CanonicalRecord`]s.
///
/// Safe to share across tasks behind an `Arc`; concurrent lookups of
/// different words never wait on each other's network calls.
pub struct ResolutionEngine {
    chain: ProviderChain,
    cache: Arc<ResultCache>,
    metrics: Arc<LookupMetrics>,
}

impl ResolutionEngine {
    pub fn new(chain: ProviderChain, cache: Arc<ResultCache>) -> Self {
        let metrics = chain.metrics();
        Self {
            chain,
            cache,
            metrics,
        }
    }

    /// Build the configured provider chain with a fresh cache
    pub fn from_config(config: &Config) -> Result<Self> {
        let client = build_http_client(config)?;
        let providers = build_providers(config, &client);
        if providers.is_empty() {
            warn!("No translation providers configured, every lookup will be not found");
        }

        let chain = ProviderChain::new(providers, config.provider_timeout);
        info!(
            "Provider chain: [{}] (timeout {:?}, cache TTL {:?})",
            chain.provider_ids().join(", "),
            config.provider_timeout,
            config.cache_ttl
        );

        Ok(Self::new(chain, Arc::new(ResultCache::new(config.cache_ttl))))
    }

    /// Resolve raw user input.
    ///
    /// Never fails: when nothing can translate the word the result is the
    /// "not found" record (`source == "none"`). Only real results are cached,
    /// and each store first sweeps out entries past their TTL.
    pub async fn resolve_word(&self, raw_input: &str) -> CanonicalRecord {
        let Some(key) = LookupKey::normalize(raw_input) else {
            debug!("Empty lookup input, skipping providers");
            return CanonicalRecord::not_found("");
        };

        if let Some(cached) = self.cache.get(&key) {
            debug!("Cache hit for '{}'", key);
            self.metrics.record_cache_hit();
            return cached;
        }

        debug!("Cache miss for '{}'", key);
        self.metrics.record_cache_miss();

        let record = self.chain.resolve(&key).await;
        if record.is_found() {
            self.cache.purge_expired();
            self.cache.put(key, record.clone());
        }

        record
    }

    pub fn cache(&self) -> &ResultCache {
        &self.cache
    }

    pub fn metrics(&self) -> &LookupMetrics {
        &self.metrics
    }

    pub fn provider_ids(&self) -> Vec<&'static str> {
        self.chain.provider_ids()
    }
}
