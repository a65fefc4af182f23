//! Canonical translation record and the field-shaping rules every provider shares.
//!
//! Whatever provider answers a lookup, the caller always receives the same
//! [`CanonicalRecord`] shape. `senses` and `examples` are plain vectors, so
//! they are always present (possibly empty) and formatting code never has to
//! branch on missing fields.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Source identifier of the synthetic "not found" record
pub const NOT_FOUND_SOURCE: &str = "none";

/// Informational message carried by the "not found" record
pub const NOT_FOUND_ERROR: &str = "no translation found";

/// Maximum number of senses in a record
pub const MAX_SENSES: usize = 10;

/// Maximum number of meanings kept per sense
pub const MAX_MEANINGS_PER_SENSE: usize = 5;

/// Maximum number of usage examples in a record
pub const MAX_EXAMPLES: usize = 5;

/// Label used when a provider does not report a part of speech
pub const UNSPECIFIED_POS: &str = "осн.";

/// Maximum length (in characters) of [`CanonicalRecord::translation_summary`]
pub const SUMMARY_MAX_CHARS: usize = 500;

/// Normalized lookup query: trimmed and lowercased.
///
/// Used as the cache key and as the word sent to every provider, so both
/// always agree on what was asked.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct LookupKey(String);

impl LookupKey {
    /// Normalize raw user input. Returns `None` when nothing is left after trimming.
    pub fn normalize(raw: &str) -> Option<Self> {
        let word = raw.trim().to_lowercase();
        if word.is_empty() {
            None
        } else {
            Some(Self(word))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for LookupKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// One part-of-speech grouping of meanings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sense {
    #[serde(rename = "partOfSpeech")]
    pub part_of_speech: String,
    pub meanings: Vec<String>,
}

/// A usage example in the source language with its translation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Example {
    pub source_language_text: String,
    pub target_language_text: String,
}

/// Provider-agnostic translation result
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CanonicalRecord {
    pub word: String,
    pub source: String,
    #[serde(default)]
    pub transcription: String,
    #[serde(default)]
    pub senses: Vec<Sense>,
    #[serde(default)]
    pub examples: Vec<Example>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Ways an adapter's output can break the record contract
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RecordViolation {
    #[error("record has an empty source")]
    EmptySource,

    #[error("record claims the reserved \"none\" source")]
    ReservedSource,

    #[error("record word '{actual}' does not match lookup '{expected}'")]
    WordMismatch { expected: String, actual: String },

    #[error("record has no senses")]
    NoSenses,

    #[error("sense {index} has no meanings")]
    EmptySense { index: usize },

    #[error("record has too many senses ({0})")]
    TooManySenses(usize),

    #[error("sense {index} has too many meanings ({count})")]
    TooManyMeanings { index: usize, count: usize },

    #[error("sense {index} repeats meaning '{meaning}'")]
    DuplicateMeaning { index: usize, meaning: String },

    #[error("record has too many examples ({0})")]
    TooManyExamples(usize),

    #[error("successful record carries an error field")]
    UnexpectedError,
}

impl CanonicalRecord {
    /// Build the synthetic record returned when no provider could resolve `word`
    pub fn not_found(word: &str) -> Self {
        Self {
            word: word.to_string(),
            source: NOT_FOUND_SOURCE.to_string(),
            transcription: String::new(),
            senses: Vec::new(),
            examples: Vec::new(),
            error: Some(NOT_FOUND_ERROR.to_string()),
        }
    }

    /// Whether this record came from a real provider
    pub fn is_found(&self) -> bool {
        self.source != NOT_FOUND_SOURCE
    }

    /// Check a provider's output against the record contract
    pub fn validate(&self, key: &LookupKey) -> Result<(), RecordViolation> {
        if self.source.is_empty() {
            return Err(RecordViolation::EmptySource);
        }
        if self.source == NOT_FOUND_SOURCE {
            return Err(RecordViolation::ReservedSource);
        }
        if self.word != key.as_str() {
            return Err(RecordViolation::WordMismatch {
                expected: key.to_string(),
                actual: self.word.clone(),
            });
        }
        if self.error.is_some() {
            return Err(RecordViolation::UnexpectedError);
        }
        if self.senses.is_empty() {
            return Err(RecordViolation::NoSenses);
        }
        if self.senses.len() > MAX_SENSES {
            return Err(RecordViolation::TooManySenses(self.senses.len()));
        }
        for (index, sense) in self.senses.iter().enumerate() {
            if sense.meanings.is_empty() {
                return Err(RecordViolation::EmptySense { index });
            }
            if sense.meanings.len() > MAX_MEANINGS_PER_SENSE {
                return Err(RecordViolation::TooManyMeanings {
                    index,
                    count: sense.meanings.len(),
                });
            }
            for (i, meaning) in sense.meanings.iter().enumerate() {
                if sense.meanings[..i].contains(meaning) {
                    return Err(RecordViolation::DuplicateMeaning {
                        index,
                        meaning: meaning.clone(),
                    });
                }
            }
        }
        if self.examples.len() > MAX_EXAMPLES {
            return Err(RecordViolation::TooManyExamples(self.examples.len()));
        }
        Ok(())
    }

    /// Compact one-line form: `"pos: m1, m2; pos: m1"`.
    ///
    /// Only the first two meanings of each sense are shown. Falls back to the
    /// word itself when there are no senses, and is cut at
    /// [`SUMMARY_MAX_CHARS`] characters.
    pub fn translation_summary(&self) -> String {
        let parts: Vec<String> = self
            .senses
            .iter()
            .filter(|s| !s.meanings.is_empty())
            .map(|s| {
                let shown: Vec<&str> = s.meanings.iter().take(2).map(String::as_str).collect();
                format!("{}: {}", s.part_of_speech, shown.join(", "))
            })
            .collect();

        let summary = if parts.is_empty() {
            self.word.clone()
        } else {
            parts.join("; ")
        };

        summary.chars().take(SUMMARY_MAX_CHARS).collect()
    }
}

/// Map an English part-of-speech label to its short form.
///
/// Lookup is case-insensitive; unknown labels are returned unchanged.
pub fn part_of_speech_label(label: &str) -> String {
    let short = match label.trim().to_lowercase().as_str() {
        "noun" => "сущ.",
        "verb" => "глаг.",
        "adjective" => "прил.",
        "adverb" => "нар.",
        "pronoun" => "мест.",
        "preposition" => "предл.",
        "conjunction" => "союз",
        "interjection" => "межд.",
        "" | "unspecified" => UNSPECIFIED_POS,
        _ => return label.to_string(),
    };
    short.to_string()
}

/// Drop empty strings and exact duplicates (first occurrence wins), then cap
pub fn shape_meanings<I>(meanings: I) -> Vec<String>
where
    I: IntoIterator<Item = String>,
{
    let mut shaped: Vec<String> = Vec::new();
    for meaning in meanings {
        if meaning.is_empty() || shaped.contains(&meaning) {
            continue;
        }
        shaped.push(meaning);
        if shaped.len() == MAX_MEANINGS_PER_SENSE {
            break;
        }
    }
    shaped
}

/// Shape every sense's meanings, drop senses left empty, cap the sense count
pub fn shape_senses(senses: Vec<Sense>) -> Vec<Sense> {
    senses
        .into_iter()
        .filter_map(|sense| {
            let meanings = shape_meanings(sense.meanings);
            if meanings.is_empty() {
                None
            } else {
                Some(Sense {
                    part_of_speech: sense.part_of_speech,
                    meanings,
                })
            }
        })
        .take(MAX_SENSES)
        .collect()
}

pub fn shape_examples(mut examples: Vec<Example>) -> Vec<Example> {
    examples.truncate(MAX_EXAMPLES);
    examples
}
