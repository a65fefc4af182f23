use super::{fetch_body, parse_json, ProviderError, TranslationProvider};
use crate::record::{shape_senses, CanonicalRecord, LookupKey, Sense, UNSPECIFIED_POS};
use async_trait::async_trait;
use serde::Deserialize;

pub const SOURCE_NAME: &str = "MyMemory";

#[derive(Debug, Deserialize)]
struct GetResponse {
    #[serde(rename = "responseData")]
    response_data: Option<ResponseData>,
}

#[derive(Debug, Deserialize)]
struct ResponseData {
    #[serde(rename = "translatedText", default)]
    translated_text: Option<String>,
}

/// MyMemory translation memory API
pub struct MyMemoryProvider {
    client: reqwest::Client,
    api_url: String,
    langpair: String,
}

impl MyMemoryProvider {
    pub fn new(client: reqwest::Client, api_url: &str, source_lang: &str, target_lang: &str) -> Self {
        Self {
            client,
            api_url: api_url.to_string(),
            langpair: format!("{}|{}", source_lang, target_lang),
        }
    }
}

#[async_trait]
impl TranslationProvider for MyMemoryProvider {
    fn id(&self) -> &'static str {
        "mymemory"
    }

    async fn resolve(&self, key: &LookupKey) -> Result<CanonicalRecord, ProviderError> {
        let request = self
            .client
            .get(&self.api_url)
            .query(&[("q", key.as_str()), ("langpair", self.langpair.as_str())]);

        let body = fetch_body(request).await?;
        let response: GetResponse = parse_json(&body)?;

        to_record(key, response)
    }
}

fn to_record(key: &LookupKey, response: GetResponse) -> Result<CanonicalRecord, ProviderError> {
    // An untranslated echo of the query is not a translation
    let translated = response
        .response_data
        .and_then(|d| d.translated_text)
        .filter(|t| t != key.as_str())
        .unwrap_or_default();

    let senses = shape_senses(vec![Sense {
        part_of_speech: UNSPECIFIED_POS.to_string(),
        meanings: vec![translated],
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
