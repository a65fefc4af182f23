use crate::providers::ProviderKind;
use anyhow::{Context, Result};
use std::time::Duration;

pub const DEFAULT_CACHE_TTL_SECS: u64 = 3600;
pub const DEFAULT_PROVIDER_TIMEOUT_SECS: u64 = 10;
pub const DEFAULT_USER_AGENT: &str =
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36";

#[derive(Debug, Clone)]
pub struct Config {
    // Chain
    pub provider_order: Vec<ProviderKind>,
    pub provider_timeout: Duration,

    // Cache
    pub cache_ttl: Duration,

    // Language pair
    pub source_lang: String,
    pub target_lang: String,

    // Yandex
    pub yandex_api_key: Option<String>,
    pub yandex_api_url: String,

    // Oxford
    pub oxford_base_url: String,

    // Google
    pub google_translate_url: String,

    // MyMemory
    pub mymemory_api_url: String,

    // HTTP
    pub user_agent: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            provider_order: ProviderKind::DEFAULT_ORDER.to_vec(),
            provider_timeout: Duration::from_secs(DEFAULT_PROVIDER_TIMEOUT_SECS),
            cache_ttl: Duration::from_secs(DEFAULT_CACHE_TTL_SECS),
            source_lang: "en".to_string(),
            target_lang: "ru".to_string(),
            yandex_api_key: None,
            yandex_api_url: "https://dictionary.yandex.net/api/v1/dicservice.json/lookup"
                .to_string(),
            oxford_base_url: "https://www.oxfordlearnersdictionaries.com".to_string(),
            google_translate_url: "https://translate.googleapis.com/translate_a/single"
                .to_string(),
            mymemory_api_url: "https://api.mymemory.translated.net/get".to_string(),
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self> {
        let defaults = Self::default();

        let provider_order = match std::env::var("TRANSLATOR_PRIORITY") {
            Ok(value) => parse_provider_order(&value)?,
            Err(_) => defaults.provider_order,
        };

        let cache_ttl_secs = std::env::var("CACHE_TTL_SECS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(DEFAULT_CACHE_TTL_SECS);
        if cache_ttl_secs == 0 {
            anyhow::bail!("CACHE_TTL_SECS must be greater than zero");
        }

        let provider_timeout_secs = std::env::var("PROVIDER_TIMEOUT_SECS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(DEFAULT_PROVIDER_TIMEOUT_SECS);
        if provider_timeout_secs == 0 {
            anyhow::bail!("PROVIDER_TIMEOUT_SECS must be greater than zero");
        }

        Ok(Self {
            provider_order,
            provider_timeout: Duration::from_secs(provider_timeout_secs),
            cache_ttl: Duration::from_secs(cache_ttl_secs),

            source_lang: std::env::var("SOURCE_LANG").unwrap_or(defaults.source_lang),
            target_lang: std::env::var("TARGET_LANG").unwrap_or(defaults.target_lang),

            // Credentials stay adapter-local; an empty key counts as unset
            yandex_api_key: std::env::var("YANDEX_API_KEY")
                .ok()
                .filter(|k| !k.trim().is_empty()),
            yandex_api_url: std::env::var("YANDEX_API_URL").unwrap_or(defaults.yandex_api_url),

            oxford_base_url: std::env::var("OXFORD_BASE_URL")
                .unwrap_or(defaults.oxford_base_url),

            google_translate_url: std::env::var("GOOGLE_TRANSLATE_URL")
                .unwrap_or(defaults.google_translate_url),

            mymemory_api_url: std::env::var("MYMEMORY_API_URL")
                .unwrap_or(defaults.mymemory_api_url),

            user_agent: std::env::var("HTTP_USER_AGENT").unwrap_or(defaults.user_agent),
        })
    }
}

/// Parse a comma-separated provider list, keeping the first occurrence of each
pub fn parse_provider_order(value: &str) -> Result<Vec<ProviderKind>> {
    let mut order = Vec::new();

    for item in value.split(',').map(str::trim).filter(|s| !s.is_empty()) {
        let kind: ProviderKind = item
            .parse()
            .with_context(|| format!("Invalid TRANSLATOR_PRIORITY entry '{}'", item))?;
        if !order.contains(&kind) {
            order.push(kind);
        }
    }

    if order.is_empty() {
        anyhow::bail!("TRANSLATOR_PRIORITY must name at least one provider");
    }

    Ok(order)
}
