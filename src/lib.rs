pub mod cache;
pub mod chain;
pub mod config;
pub mod engine;
pub mod metrics;
pub mod providers;
pub mod record;

#[cfg(test)]
mod test_support;

pub use cache::ResultCache;
pub use chain::ProviderChain;
pub use config::Config;
pub use engine::ResolutionEngine;
pub use record::{CanonicalRecord, Example, LookupKey, Sense};
