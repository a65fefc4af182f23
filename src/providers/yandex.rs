use super::{fetch_body, parse_json, ProviderError, TranslationProvider};
use crate::record::{
    part_of_speech_label, shape_examples, shape_senses, CanonicalRecord, Example, LookupKey,
    Sense,
};
use async_trait::async_trait;
use serde::Deserialize;

pub const SOURCE_NAME: &str = "Яндекс Переводчик";

/// Only the first few definitions/translations/examples feed the example list
const EXAMPLE_DEFINITIONS: usize = 2;
const EXAMPLE_TRANSLATIONS: usize = 2;
const EXAMPLES_PER_TRANSLATION: usize = 2;

#[derive(Debug, Deserialize)]
struct LookupResponse {
    #[serde(default)]
    def: Vec<Definition>,
}

#[derive(Debug, Deserialize)]
struct Definition {
    #[serde(default)]
    pos: String,
    #[serde(default)]
    ts: Option<String>,
    #[serde(default)]
    tr: Vec<Translation>,
}

#[derive(Debug, Deserialize)]
struct Translation {
    #[serde(default)]
    text: String,
    #[serde(default)]
    syn: Vec<Text>,
    #[serde(default)]
    ex: Vec<UsageExample>,
}

#[derive(Debug, Deserialize)]
struct Text {
    #[serde(default)]
    text: String,
}

#[derive(Debug, Deserialize)]
struct UsageExample {
    #[serde(default)]
    text: String,
    #[serde(default)]
    tr: Vec<Text>,
}

/// Yandex Dictionary lookup API
pub struct YandexProvider {
    client: reqwest::Client,
    api_url: String,
    api_key: String,
    lang: String,
    ui: String,
}

impl YandexProvider {
    pub fn new(
        client: reqwest::Client,
        api_url: &str,
        api_key: &str,
        source_lang: &str,
        target_lang: &str,
    ) -> Self {
        Self {
            client,
            api_url: api_url.to_string(),
            api_key: api_key.to_string(),
            lang: format!("{}-{}", source_lang, target_lang),
            ui: target_lang.to_string(),
        }
    }
}

#[async_trait]
impl TranslationProvider for YandexProvider {
    fn id(&self) -> &'static str {
        "yandex"
    }

    async fn resolve(&self, key: &LookupKey) -> Result<CanonicalRecord, ProviderError> {
        let request = self.client.get(&self.api_url).query(&[
            ("key", self.api_key.as_str()),
            ("lang", self.lang.as_str()),
            ("text", key.as_str()),
            ("ui", self.ui.as_str()),
        ]);

        let body = fetch_body(request).await?;
        let lookup: LookupResponse = parse_json(&body)?;

        to_record(key, lookup)
    }
}

fn to_record(key: &LookupKey, lookup: LookupResponse) -> Result<CanonicalRecord, ProviderError> {
    // One sense per translation: its text followed by its synonyms
    let senses: Vec<Sense> = lookup
        .def
        .iter()
        .flat_map(|definition| {
            let pos = part_of_speech_label(&definition.pos);
            definition.tr.iter().map(move |tr| Sense {
                part_of_speech: pos.clone(),
                meanings: std::iter::once(tr.text.clone())
                    .chain(tr.syn.iter().map(|s| s.text.clone()))
                    .collect(),
            })
        })
        .collect();

    let senses = shape_senses(senses);
    if senses.is_empty() {
        return Err(ProviderError::NoSenses);
    }

    let examples: Vec<Example> = lookup
        .def
        .iter()
        .take(EXAMPLE_DEFINITIONS)
        .flat_map(|d| d.tr.iter().take(EXAMPLE_TRANSLATIONS))
        .flat_map(|tr| tr.ex.iter().take(EXAMPLES_PER_TRANSLATION))
        .filter_map(|ex| {
            let translated = ex.tr.first()?;
            if ex.text.is_empty() {
                return None;
            }
            Some(Example {
                source_language_text: ex.text.clone(),
                target_language_text: translated.text.clone(),
            })
        })
        .collect();

    let transcription = lookup
        .def
        .first()
        .and_then(|d| d.ts.clone())
        .unwrap_or_default();

    Ok(CanonicalRecord {
        word: key.to_string(),
        source: SOURCE_NAME.to_string(),
        transcription,
        senses,
        examples: shape_examples(examples),
        error: None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::{
        matchers::{method, path, query_param},
        Mock, MockServer, ResponseTemplate,
    };

    const RUN_RESPONSE: &str = r#"{
        "head": {},
        "def": [
            {
                "text": "run",
                "pos": "verb",
                "ts": "rʌn",
                "tr": [
                    {
                        "text": "бежать",
                        "pos": "verb",
                        "syn": [{"text": "бегать"}, {"text": "бежать"}, {"text": "работать"}],
                        "ex": [
                            {"text": "run fast", "tr": [{"text": "быстро бежать"}]},
                            {"text": "run away", "tr": [{"text": "убежать"}]},
                            {"text": "run home", "tr": [{"text": "бежать домой"}]}
                        ]
                    },
                    {
                        "text": "управлять",
                        "pos": "verb",
                        "ex": [{"text": "run a company", "tr": []}]
                    }
                ]
            },
            {
                "text": "run",
                "pos": "noun",
                "tr": [{"text": "бег", "pos": "noun"}]
            }
        ]
    }"#;

    fn key(word: &str) -> LookupKey {
        LookupKey::normalize(word).unwrap()
    }

    fn provider(server: &MockServer) -> YandexProvider {
        YandexProvider::new(
            reqwest::Client::new(),
            &format!("{}/lookup", server.uri()),
            "test-key",
            "en",
            "ru",
        )
    }

    #[test]
    fn test_to_record_builds_senses_with_synonyms() {
        let lookup: LookupResponse = serde_json::from_str(RUN_RESPONSE).unwrap();
        let record = to_record(&key("run"), lookup).unwrap();

        assert_eq!(record.source, SOURCE_NAME);
        assert_eq!(record.word, "run");
        assert_eq!(record.transcription, "rʌn");
        assert_eq!(record.senses.len(), 3);
        assert_eq!(record.senses[0].part_of_speech, "глаг.");
        assert_eq!(record.senses[0].meanings, vec!["бежать", "бегать", "работать"]);
        assert_eq!(record.senses[1].meanings, vec!["управлять"]);
        assert_eq!(record.senses[2].part_of_speech, "сущ.");
    }

    #[test]
    fn test_to_record_examples_take_two_per_translation() {
        let lookup: LookupResponse = serde_json::from_str(RUN_RESPONSE).unwrap();
        let record = to_record(&key("run"), lookup).unwrap();

        // Third example is beyond the per-translation limit, the one without
        // a translation is skipped
        assert_eq!(record.examples.len(), 2);
        assert_eq!(record.examples[0].source_language_text, "run fast");
        assert_eq!(record.examples[0].target_language_text, "быстро бежать");
        assert_eq!(record.examples[1].source_language_text, "run away");
    }

    #[test]
    fn test_to_record_caps_senses_and_meanings() {
        // 12 translations with 8 meanings each, some repeated
        let translations: Vec<serde_json::Value> = (0..12)
            .map(|i| {
                let syn: Vec<serde_json::Value> = ["b", "a", "c", "d", "c", "e", "f"]
                    .iter()
                    .map(|s| serde_json::json!({ "text": format!("{}{}", s, i) }))
                    .collect();
                serde_json::json!({ "text": format!("a{}", i), "syn": syn })
            })
            .collect();
        let lookup: LookupResponse = serde_json::from_value(serde_json::json!({
            "def": [{ "pos": "verb", "tr": translations }]
        }))
        .unwrap();

        let record = to_record(&key("run"), lookup).unwrap();

        assert_eq!(record.senses.len(), 10);
        for (i, sense) in record.senses.iter().enumerate() {
            let expected: Vec<String> = ["a", "b", "c", "d", "e"]
                .iter()
                .map(|s| format!("{}{}", s, i))
                .collect();
            assert_eq!(sense.meanings, expected);
        }
        assert_eq!(record.validate(&key("run")), Ok(()));
    }

    #[test]
    fn test_to_record_empty_definitions_is_no_senses() {
        let lookup: LookupResponse = serde_json::from_str(r#"{"head": {}, "def": []}"#).unwrap();
        assert!(matches!(
            to_record(&key("qwzx"), lookup),
            Err(ProviderError::NoSenses)
        ));
    }

    #[tokio::test]
    async fn test_resolve_sends_expected_query() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/lookup"))
            .and(query_param("key", "test-key"))
            .and(query_param("lang", "en-ru"))
            .and(query_param("text", "run"))
            .and(query_param("ui", "ru"))
            .respond_with(ResponseTemplate::new(200).set_body_string(RUN_RESPONSE))
            .expect(1)
            .mount(&server)
            .await;

        let record = provider(&server).resolve(&key("run")).await.unwrap();

        assert_eq!(record.senses[0].meanings[0], "бежать");
    }

    #[tokio::test]
    async fn test_resolve_non_success_status() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/lookup"))
            .respond_with(ResponseTemplate::new(403).set_body_string("invalid key"))
            .mount(&server)
            .await;

        let err = provider(&server).resolve(&key("run")).await.unwrap_err();

        match err {
            ProviderError::Status { status, body } => {
                assert_eq!(status.as_u16(), 403);
                assert_eq!(body, "invalid key");
            }
            other => panic!("expected status error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_resolve_malformed_body() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/lookup"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
            .mount(&server)
            .await;

        let err = provider(&server).resolve(&key("run")).await.unwrap_err();

        assert!(matches!(err, ProviderError::Malformed(_)));
    }
}
