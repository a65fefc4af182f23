//! Provider adapters: one per external lookup service.
//!
//! Every adapter turns one HTTP response into a [`CanonicalRecord`] or a
//! [`ProviderError`]. Response parsing stays inside the adapter; the chain only
//! ever sees the canonical shape.

mod google;
mod mymemory;
mod oxford;
mod yandex;

pub use google::GoogleProvider;
pub use mymemory::MyMemoryProvider;
pub use oxford::OxfordProvider;
pub use yandex::YandexProvider;

use crate::config::Config;
use crate::record::{CanonicalRecord, LookupKey, RecordViolation};
use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tracing::warn;

/// A single external translation source.
///
/// Implementations make exactly one outbound request per call and never retry.
/// A response that yields zero senses must be reported as
/// [`ProviderError::NoSenses`], never as an empty success.
#[async_trait]
pub trait TranslationProvider: Send + Sync {
    /// Short identifier used in logs and configuration (e.g. "yandex")
    fn id(&self) -> &'static str;

    /// Look up an already-normalized word
    async fn resolve(&self, key: &LookupKey) -> Result<CanonicalRecord, ProviderError>;
}

/// Reasons a single provider call did not produce a record
#[derive(Error, Debug)]
pub enum ProviderError {
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Invalid request URL: {0}")]
    InvalidUrl(String),

    #[error("Timed out after {0:?}")]
    Timeout(Duration),

    #[error("Unexpected HTTP status {status}: {body}")]
    Status {
        status: reqwest::StatusCode,
        body: String,
    },

    #[error("Malformed response: {0}")]
    Malformed(String),

    #[error("No senses extracted")]
    NoSenses,

    #[error("Provider panicked")]
    Panicked,

    #[error("Invalid record: {0}")]
    InvalidRecord(#[from] RecordViolation),
}

impl ProviderError {
    /// Whether the failure was the call running out of time
    pub fn is_timeout(&self) -> bool {
        match self {
            Self::Timeout(_) => true,
            Self::Network(e) => e.is_timeout(),
            _ => false,
        }
    }
}

/// The built-in providers, addressable from configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProviderKind {
    Yandex,
    Oxford,
    Google,
    MyMemory,
}

impl ProviderKind {
    /// Default priority order, most authoritative first
    pub const DEFAULT_ORDER: [ProviderKind; 4] = [
        ProviderKind::Yandex,
        ProviderKind::Oxford,
        ProviderKind::Google,
        ProviderKind::MyMemory,
    ];

    pub fn id(&self) -> &'static str {
        match self {
            ProviderKind::Yandex => "yandex",
            ProviderKind::Oxford => "oxford",
            ProviderKind::Google => "google",
            ProviderKind::MyMemory => "mymemory",
        }
    }
}

impl fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

#[derive(Error, Debug, PartialEq, Eq)]
#[error("Unknown provider '{0}' (expected one of: yandex, oxford, google, mymemory)")]
pub struct UnknownProvider(pub String);

impl FromStr for ProviderKind {
    type Err = UnknownProvider;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "yandex" => Ok(ProviderKind::Yandex),
            "oxford" => Ok(ProviderKind::Oxford),
            "google" => Ok(ProviderKind::Google),
            "mymemory" => Ok(ProviderKind::MyMemory),
            other => Err(UnknownProvider(other.to_string())),
        }
    }
}

/// Build the HTTP client shared by all adapters
pub fn build_http_client(config: &Config) -> Result<reqwest::Client> {
    reqwest::Client::builder()
        .timeout(config.provider_timeout)
        .user_agent(config.user_agent.as_str())
        .build()
        .context("Failed to build HTTP client for providers")
}

/// Instantiate the configured providers in priority order.
///
/// Yandex is left out when no API key is configured.
pub fn build_providers(
    config: &Config,
    client: &reqwest::Client,
) -> Vec<Arc<dyn TranslationProvider>> {
    let mut providers: Vec<Arc<dyn TranslationProvider>> = Vec::new();

    for kind in &config.provider_order {
        match kind {
            ProviderKind::Yandex => match &config.yandex_api_key {
                Some(key) => providers.push(Arc::new(YandexProvider::new(
                    client.clone(),
                    &config.yandex_api_url,
                    key,
                    &config.source_lang,
                    &config.target_lang,
                ))),
                None => warn!("YANDEX_API_KEY not set, leaving yandex out of the provider chain"),
            },
            ProviderKind::Oxford => providers.push(Arc::new(OxfordProvider::new(
                client.clone(),
                &config.oxford_base_url,
            ))),
            ProviderKind::Google => providers.push(Arc::new(GoogleProvider::new(
                client.clone(),
                &config.google_translate_url,
                &config.source_lang,
                &config.target_lang,
            ))),
            ProviderKind::MyMemory => providers.push(Arc::new(MyMemoryProvider::new(
                client.clone(),
                &config.mymemory_api_url,
                &config.source_lang,
                &config.target_lang,
            ))),
        }
    }

    providers
}

/// How much of a failed response body is kept in [`ProviderError::Status`]
const ERROR_BODY_MAX_CHARS: usize = 200;

/// Send a request and return the body of a successful response
async fn fetch_body(request: reqwest::RequestBuilder) -> Result<String, ProviderError> {
    let response = request.send().await?;

    if !response.status().is_success() {
        let status = response.status();
        let body = response
            .text()
            .await
            .map(|text| text.chars().take(ERROR_BODY_MAX_CHARS).collect())
            .unwrap_or_else(|e| format!("<failed to read body: {}>", e));
        return Err(ProviderError::Status { status, body });
    }

    Ok(response.text().await?)
}

fn parse_json<T: DeserializeOwned>(body: &str) -> Result<T, ProviderError> {
    serde_json::from_str(body).map_err(|e| ProviderError::Malformed(e.to_string()))
}
