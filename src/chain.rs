//! Fixed-order fallback over translation providers.
//!
//! Providers are tried strictly in the configured order. The first one that
//! returns a valid record wins and the rest are never called. Every kind of
//! provider failure, including a timeout or a panic, is logged and skipped;
//! only total exhaustion produces the "not found" record.

use crate::metrics::LookupMetrics;
use crate::providers::{ProviderError, TranslationProvider};
use crate::record::{CanonicalRecord, LookupKey};
use futures::FutureExt;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, info, warn};

pub struct ProviderChain {
    providers: Vec<Arc<dyn TranslationProvider>>,
    call_timeout: Duration,
    metrics: Arc<LookupMetrics>,
}

impl ProviderChain {
    /// Create a chain over `providers`, highest priority first.
    ///
    /// Each provider call is cut off after `call_timeout`, so a lookup takes at
    /// most `providers.len() * call_timeout`.
    pub fn new(providers: Vec<Arc<dyn TranslationProvider>>, call_timeout: Duration) -> Self {
        Self::with_metrics(providers, call_timeout, Arc::new(LookupMetrics::new()))
    }

    pub fn with_metrics(
        providers: Vec<Arc<dyn TranslationProvider>>,
        call_timeout: Duration,
        metrics: Arc<LookupMetrics>,
    ) -> Self {
        Self {
            providers,
            call_timeout,
            metrics,
        }
    }

    /// Provider ids in the order they are tried
    pub fn provider_ids(&self) -> Vec<&'static str> {
        self.providers.iter().map(|p| p.id()).collect()
    }

    pub fn metrics(&self) -> Arc<LookupMetrics> {
        self.metrics.clone()
    }

    /// Resolve `key` with the first provider that succeeds
    pub async fn resolve(&self, key: &LookupKey) -> CanonicalRecord {
        let total = self.providers.len();

        for (index, provider) in self.providers.iter().enumerate() {
            let position = index + 1;
            debug!("[{}/{}] Trying {} for '{}'", position, total, provider.id(), key);
            self.metrics.record_provider_call();

            match self.attempt(provider.as_ref(), key).await {
                Ok(record) => {
                    info!(
                        "[{}/{}] ✓ {} resolved '{}' ({} senses)",
                        position,
                        total,
                        provider.id(),
                        key,
                        record.senses.len()
                    );
                    return record;
                }
                Err(e) => {
                    self.metrics.record_provider_failure();
                    if matches!(e, ProviderError::InvalidRecord(_)) {
                        error!(
                            "[{}/{}] ✗ {} broke the record contract for '{}': {}",
                            position,
                            total,
                            provider.id(),
                            key,
                            e
                        );
                    } else if e.is_timeout() {
                        warn!(
                            "[{}/{}] ✗ {} timed out for '{}'",
                            position,
                            total,
                            provider.id(),
                            key
                        );
                    } else {
                        warn!(
                            "[{}/{}] ✗ {} failed for '{}': {}",
                            position,
                            total,
                            provider.id(),
                            key,
                            e
                        );
                    }
                }
            }
        }

        info!("No provider could translate '{}' ({} tried)", key, total);
        self.metrics.record_not_found();
        CanonicalRecord::not_found(key.as_str())
    }

    /// One bounded call to one provider, with its output validated
    async fn attempt(
        &self,
        provider: &dyn TranslationProvider,
        key: &LookupKey,
    ) -> Result<CanonicalRecord, ProviderError> {
        let call = AssertUnwindSafe(provider.resolve(key)).catch_unwind();

        let record = match tokio::time::timeout(self.call_timeout, call).await {
            Err(_) => return Err(ProviderError::Timeout(self.call_timeout)),
            Ok(Err(_)) => return Err(ProviderError::Panicked),
            Ok(Ok(result)) => result?,
        };

        record.validate(key)?;
        Ok(record)
    }
}
