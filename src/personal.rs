//! Personal word records learned from committed input.
//!
//! The engine talks to the store through [`PersonalWordStore`] so the durable
//! backend stays out of the core. [`MemoryWordStore`] is the bundled
//! implementation; hosts with a database wrap it or implement the trait
//! directly.

use std::collections::HashMap;
use std::fs;
use std::path::Path;
use std::sync::Mutex;
use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};

use crate::error::EngineError;

const MAGIC: &[u8; 4] = b"WHPW";
const VERSION: u8 = 1;

/// A word learned from the user, with usage frequency and recency.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersonalWord {
    pub word: String,
    pub frequency: u32,
    /// Epoch seconds of the most recent commit.
    pub last_used: u64,
}

/// Abstract store of personal words, keyed by lowercase word (unique).
/// Records are created, incremented, and read; the core never deletes.
pub trait PersonalWordStore: Send + Sync {
    fn get(&self, word: &str) -> Result<Option<PersonalWord>, EngineError>;
    /// Create a record with frequency 1. No-op if the word already exists.
    fn insert(&self, word: &str) -> Result<(), EngineError>;
    /// Increment frequency and refresh the last-used timestamp.
    fn increment(&self, word: &str, timestamp: u64) -> Result<(), EngineError>;
}

pub(crate) fn now_epoch() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs()
}

/// In-memory `PersonalWordStore` with snapshot persistence (WHPW format).
#[derive(Default)]
pub struct MemoryWordStore {
    words: Mutex<HashMap<String, PersonalWord>>,
}

/// Flat serialization format for bincode.
#[derive(Serialize, Deserialize)]
struct StoreData {
    words: Vec<PersonalWord>,
}

impl MemoryWordStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, HashMap<String, PersonalWord>>, EngineError> {
        self.words
            .lock()
            .map_err(|e| EngineError::Store(e.to_string()))
    }

    /// Serialize to bytes (WHPW format).
    pub fn to_bytes(&self) -> Result<Vec<u8>, EngineError> {
        let words = self.lock()?.values().cloned().collect();
        let body = bincode::serialize(&StoreData { words }).map_err(EngineError::Serialize)?;
        let mut buf = Vec::with_capacity(5 + body.len());
        buf.extend_from_slice(MAGIC);
        buf.push(VERSION);
        buf.extend_from_slice(&body);
        Ok(buf)
    }

    /// Deserialize from bytes (WHPW format).
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, EngineError> {
        if bytes.len() < 5 {
            return Err(EngineError::InvalidHeader);
        }
        if &bytes[0..4] != MAGIC {
            return Err(EngineError::InvalidMagic);
        }
        if bytes[4] != VERSION {
            return Err(EngineError::UnsupportedVersion(bytes[4]));
        }
        let data: StoreData =
            bincode::deserialize(&bytes[5..]).map_err(EngineError::Deserialize)?;
        let words = data
            .words
            .into_iter()
            .map(|w| (w.word.clone(), w))
            .collect();
        Ok(Self {
            words: Mutex::new(words),
        })
    }

    /// Atomic write: write to .tmp then rename.
    pub fn save(&self, path: &Path) -> Result<(), EngineError> {
        let bytes = self.to_bytes()?;
        let tmp = path.with_extension("tmp");
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&tmp, &bytes)?;
        fs::rename(&tmp, path)?;
        Ok(())
    }

    /// Open from file, returning an empty store if the file doesn't exist.
    pub fn open(path: &Path) -> Result<Self, EngineError> {
        match fs::read(path) {
            Ok(bytes) => Self::from_bytes(&bytes),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Self::new()),
            Err(e) => Err(e.into()),
        }
    }
}

impl PersonalWordStore for MemoryWordStore {
    fn get(&self, word: &str) -> Result<Option<PersonalWord>, EngineError> {
        Ok(self.lock()?.get(word).cloned())
    }

    fn insert(&self, word: &str) -> Result<(), EngineError> {
        let mut words = self.lock()?;
        words.entry(word.to_string()).or_insert_with(|| PersonalWord {
            word: word.to_string(),
            frequency: 1,
            last_used: now_epoch(),
        });
        Ok(())
    }

    fn increment(&self, word: &str, timestamp: u64) -> Result<(), EngineError> {
        let mut words = self.lock()?;
        if let Some(entry) = words.get_mut(word) {
            entry.frequency += 1;
            entry.last_used = timestamp;
        }
        Ok(())
    }
}
