use super::{fetch_body, parse_json, ProviderError, TranslationProvider};
use crate::record::{shape_senses, CanonicalRecord, LookupKey, Sense, UNSPECIFIED_POS};
use async_trait::async_trait;
use serde_json::Value;

pub const SOURCE_NAME: &str = "Google Translate";

/// Free Google Translate endpoint (`client=gtx`)
pub struct GoogleProvider {
    client: reqwest::Client,
    api_url: String,
    source_lang: String,
    target_lang: String,
}

impl GoogleProvider {
    pub fn new(client: reqwest::Client, api_url: &str, source_lang: &str, target_lang: &str) -> Self {
        Self {
            client,
            api_url: api_url.to_string(),
            source_lang: source_lang.to_string(),
            target_lang: target_lang.to_string(),
        }
    }
}

#[async_trait]
impl TranslationProvider for GoogleProvider {
    fn id(&self) -> &'static str {
        "google"
    }

    async fn resolve(&self, key: &LookupKey) -> Result<CanonicalRecord, ProviderError> {
        let request = self.client.get(&self.api_url).query(&[
            ("client", "gtx"),
            ("sl", self.source_lang.as_str()),
            ("tl", self.target_lang.as_str()),
            ("dt", "t"),
            ("q", key.as_str()),
        ]);

        let body = fetch_body(request).await?;
        let data: Value = parse_json(&body)?;

        to_record(key, &data)
    }
}

/// The response is a nested array; the translation sits at `[0][0][0]`
fn to_record(key: &LookupKey, data: &Value) -> Result<CanonicalRecord, ProviderError> {
    if !data.is_array() {
        return Err(ProviderError::Malformed(
            "expected a top-level JSON array".to_string(),
        ));
    }

    let translation = data
        .get(0)
        .and_then(|v| v.get(0))
        .and_then(|v| v.get(0))
        .and_then(Value::as_str)
        .unwrap_or_default();

    let senses = shape_senses(vec![Sense {
        part_of_speech: UNSPECIFIED_POS.to_string(),
        meanings: vec![translation.to_string()],
    }]);
    if senses.is_empty() {
        return Err(ProviderError::NoSenses);
    }

    Ok(CanonicalRecord {
        word: key.to_string(),
        source: SOURCE_NAME.to_string(),
        transcription: String::new(),
        senses,
        examples: Vec::new(),
        error: None,
    })
}
