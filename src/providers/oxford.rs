use super::{fetch_body, ProviderError, TranslationProvider};
use crate::record::{
    part_of_speech_label, shape_examples, shape_senses, CanonicalRecord, Example, LookupKey,
    Sense,
};
use async_trait::async_trait;
use regex::Regex;
use std::sync::OnceLock;

pub const SOURCE_NAME: &str = "Oxford Dictionary";

/// Part of speech assumed when the page does not show one
const DEFAULT_POS: &str = "сущ.";

const MAX_DEFINITIONS: usize = 3;
const MAX_DEFINITION_CHARS: usize = 100;
const MAX_EXAMPLES: usize = 3;
const MAX_EXAMPLE_CHARS: usize = 200;

struct PagePatterns {
    phonetic: Regex,
    pos: Regex,
    definition: Regex,
    example: Regex,
}

fn patterns() -> &'static PagePatterns {
    static PATTERNS: OnceLock<PagePatterns> = OnceLock::new();
    PATTERNS.get_or_init(|| PagePatterns {
        phonetic: Regex::new(r#"phonetic">/(.*?)/"#).expect("valid phonetic regex"),
        pos: Regex::new(r#"pos">(.*?)<"#).expect("valid pos regex"),
        definition: Regex::new(r#"def">(.*?)<"#).expect("valid definition regex"),
        example: Regex::new(r#"x">(.*?)<"#).expect("valid example regex"),
    })
}

/// Oxford Learner's Dictionaries word page (HTML, English definitions only)
pub struct OxfordProvider {
    client: reqwest::Client,
    base_url: String,
}

impl OxfordProvider {
    pub fn new(client: reqwest::Client, base_url: &str) -> Self {
        Self {
            client,
            base_url: base_url.to_string(),
        }
    }

    fn word_url(&self, key: &LookupKey) -> Result<reqwest::Url, ProviderError> {
        let mut url = reqwest::Url::parse(&self.base_url)
            .map_err(|e| ProviderError::InvalidUrl(format!("{}: {}", self.base_url, e)))?;
        url.path_segments_mut()
            .map_err(|_| ProviderError::InvalidUrl(self.base_url.clone()))?
            .pop_if_empty()
            .extend(["definition", "english", key.as_str()]);
        Ok(url)
    }
}

#[async_trait]
impl TranslationProvider for OxfordProvider {
    fn id(&self) -> &'static str {
        "oxford"
    }

    async fn resolve(&self, key: &LookupKey) -> Result<CanonicalRecord, ProviderError> {
        let url = self.word_url(key)?;
        let html = fetch_body(self.client.get(url)).await?;

        parse_page(key, &html)
    }
}

fn first_capture<'a>(re: &Regex, html: &'a str) -> Option<&'a str> {
    re.captures(html)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str())
}

fn parse_page(key: &LookupKey, html: &str) -> Result<CanonicalRecord, ProviderError> {
    let patterns = patterns();

    let transcription = first_capture(&patterns.phonetic, html)
        .unwrap_or_default()
        .to_string();

    let part_of_speech = match first_capture(&patterns.pos, html) {
        Some(pos) if !pos.trim().is_empty() => part_of_speech_label(pos),
        _ => DEFAULT_POS.to_string(),
    };

    let meanings: Vec<String> = patterns
        .definition
        .captures_iter(html)
        .filter_map(|c| c.get(1))
        .take(MAX_DEFINITIONS)
        .map(|m| m.as_str())
        .filter(|text| !text.is_empty() && text.chars().count() < MAX_DEFINITION_CHARS)
        .map(|text| text.trim().to_string())
        .collect();

    let senses = shape_senses(vec![Sense {
        part_of_speech,
        meanings,
    }]);
    if senses.is_empty() {
        return Err(ProviderError::NoSenses);
    }

    // The dictionary is monolingual, so examples carry no translation
    let examples: Vec<Example> = patterns
        .example
        .captures_iter(html)
        .filter_map(|c| c.get(1))
        .take(MAX_EXAMPLES)
        .map(|m| m.as_str())
        .filter(|text| !text.is_empty() && text.chars().count() < MAX_EXAMPLE_CHARS)
        .map(|text| Example {
            source_language_text: text.trim().to_string(),
            target_language_text: String::new(),
        })
        .collect();

    Ok(CanonicalRecord {
        word: key.to_string(),
        source: SOURCE_NAME.to_string(),
        transcription,
        senses,
        examples: shape_examples(examples),
        error: None,
    })
}
