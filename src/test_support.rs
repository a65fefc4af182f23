//! Scripted providers for exercising the chain and engine without a network.

use crate::providers::{ProviderError, TranslationProvider};
use crate::record::{CanonicalRecord, LookupKey, Sense};
use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

#[derive(Debug, Clone)]
pub enum Behavior {
    /// Return a record with this many senses
    Succeed(usize),
    /// Return a declared failure
    Fail,
    /// Panic inside the call
    Panic,
    /// Sleep far beyond any test timeout
    Hang,
    /// Return a record that breaks the output contract (no senses)
    Invalid,
    /// Succeed on the first call, fail on every later one
    SucceedOnce,
    /// Sleep, then succeed with a meaning naming the call number
    Slow(Duration),
}

/// Shared, ordered log of which providers were called
pub type CallLog = Arc<Mutex<Vec<&'static str>>>;

pub struct ScriptedProvider {
    id: &'static str,
    behavior: Behavior,
    calls: AtomicUsize,
    log: CallLog,
}

impl ScriptedProvider {
    pub fn new(id: &'static str, behavior: Behavior, log: &CallLog) -> Arc<Self> {
        Arc::new(Self {
            id,
            behavior,
            calls: AtomicUsize::new(0),
            log: log.clone(),
        })
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

pub fn new_log() -> CallLog {
    Arc::new(Mutex::new(Vec::new()))
}

pub fn logged(log: &CallLog) -> Vec<&'static str> {
    log.lock().unwrap().clone()
}

pub fn record_with_senses(word: &str, source: &str, count: usize) -> CanonicalRecord {
    CanonicalRecord {
        word: word.to_string(),
        source: source.to_string(),
        transcription: String::new(),
        senses: (0..count)
            .map(|i| Sense {
                part_of_speech: "глаг.".to_string(),
                meanings: vec![format!("{}-{}", source, i)],
            })
            .collect(),
        examples: Vec::new(),
        error: None,
    }
}

#[async_trait]
impl TranslationProvider for ScriptedProvider {
    fn id(&self) -> &'static str {
        self.id
    }

    async fn resolve(&self, key: &LookupKey) -> Result<CanonicalRecord, ProviderError> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
        self.log.lock().unwrap().push(self.id);

        match &self.behavior {
            Behavior::Succeed(count) => Ok(record_with_senses(key.as_str(), self.id, *count)),
            Behavior::Fail => Err(ProviderError::NoSenses),
            Behavior::Panic => panic!("scripted provider '{}' panicked", self.id),
            Behavior::Hang => {
                tokio::time::sleep(Duration::from_secs(60)).await;
                Err(ProviderError::NoSenses)
            }
            Behavior::Invalid => Ok(record_with_senses(key.as_str(), self.id, 0)),
            Behavior::SucceedOnce if call == 1 => Ok(record_with_senses(key.as_str(), self.id, 1)),
            Behavior::SucceedOnce => Err(ProviderError::NoSenses),
            Behavior::Slow(delay) => {
                tokio::time::sleep(*delay).await;
                let mut record = record_with_senses(key.as_str(), self.id, 1);
                record.senses[0].meanings = vec![format!("call{}", call)];
                Ok(record)
            }
        }
    }
}
