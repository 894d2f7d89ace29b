//! Statistical next-word prediction from observed (previous → next) pairs,
//! with optional delegation to a pluggable external predictor.

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::engine::WordSuggestion;
use crate::error::EngineError;

const MAGIC: &[u8; 4] = b"WHBG";
const VERSION: u8 = 1;

/// Capability interface for an external next-word predictor (e.g. an
/// on-device ML model). A missing or failing model reports unavailable or
/// returns an empty list; it never errors into the suggestion flow.
pub trait ExternalPredictor: Send + Sync {
    fn is_available(&self) -> bool;
    fn predict(&self, previous_word: &str, limit: usize) -> Vec<WordSuggestion>;
}

/// Bigram frequency table: previous word → (next word → count).
/// All keys are stored lowercase.
#[derive(Default)]
pub struct BigramModel {
    counts: HashMap<String, HashMap<String, u32>>,
    predictor: Option<Box<dyn ExternalPredictor>>,
}

/// Flat serialization format for bincode.
#[derive(Serialize, Deserialize)]
struct BigramData {
    records: Vec<BigramRecord>,
}

#[derive(Serialize, Deserialize)]
struct BigramRecord {
    prev: String,
    next: String,
    count: u32,
}

impl BigramModel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Attach an external predictor consulted before the statistical table.
    pub fn with_predictor(predictor: Box<dyn ExternalPredictor>) -> Self {
        Self {
            counts: HashMap::new(),
            predictor: Some(predictor),
        }
    }

    /// Record that `next` followed `prev` in committed input.
    pub fn record(&mut self, prev: &str, next: &str) {
        let prev = prev.to_lowercase();
        let next = next.to_lowercase();
        *self.counts.entry(prev).or_default().entry(next).or_insert(0) += 1;
    }

    /// Top `limit` next-word predictions after `previous_word`.
    ///
    /// An available external predictor wins when it returns anything;
    /// otherwise each candidate is scored `count / total_count_for_prev` and
    /// ordered by raw count descending. Unknown `previous_word` → empty.
    pub fn predict(&self, previous_word: &str, limit: usize) -> Vec<WordSuggestion> {
        if let Some(predictor) = &self.predictor {
            if predictor.is_available() {
                let predictions = predictor.predict(previous_word, limit);
                if !predictions.is_empty() {
                    debug!(count = predictions.len(), "external predictor hit");
                    return predictions;
                }
            }
        }

        let prev = previous_word.to_lowercase();
        let Some(next_counts) = self.counts.get(&prev) else {
            return Vec::new();
        };
        let total: u32 = next_counts.values().sum();

        let mut entries: Vec<(&String, u32)> =
            next_counts.iter().map(|(w, &c)| (w, c)).collect();
        entries.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));
        entries
            .into_iter()
            .take(limit)
            .map(|(word, count)| WordSuggestion {
                word: word.clone(),
                score: count as f32 / total as f32,
                is_autocorrect: false,
            })
            .collect()
    }

    /// Replace the entire table from bulk data. Entries for keys absent from
    /// `data` are discarded.
    pub fn load(&mut self, data: HashMap<String, HashMap<String, u32>>) {
        self.counts = data;
    }

    /// Bulk import from JSON of the shape `{"prev": {"next": count}}`
    /// (the format emitted by the bigram training script).
    pub fn load_json(&mut self, json: &str) -> Result<(), EngineError> {
        let data: HashMap<String, HashMap<String, u32>> =
            serde_json::from_str(json).map_err(|e| EngineError::Parse(e.to_string()))?;
        self.load(data);
        Ok(())
    }

    /// Serialize to bytes (WHBG format).
    pub fn to_bytes(&self) -> Result<Vec<u8>, EngineError> {
        let mut records = Vec::new();
        for (prev, nexts) in &self.counts {
            for (next, &count) in nexts {
                records.push(BigramRecord {
                    prev: prev.clone(),
                    next: next.clone(),
                    count,
                });
            }
        }
        let body =
            bincode::serialize(&BigramData { records }).map_err(EngineError::Serialize)?;
        let mut buf = Vec::with_capacity(5 + body.len());
        buf.extend_from_slice(MAGIC);
        buf.push(VERSION);
        buf.extend_from_slice(&body);
        Ok(buf)
    }

    /// Deserialize from bytes (WHBG format). The restored model carries no
    /// external predictor; attach one separately if needed.
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
        let data: BigramData =
            bincode::deserialize(&bytes[5..]).map_err(EngineError::Deserialize)?;

        let mut counts: HashMap<String, HashMap<String, u32>> = HashMap::new();
        for rec in data.records {
            counts.entry(rec.prev).or_default().insert(rec.next, rec.count);
        }
        Ok(Self {
            counts,
            predictor: None,
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

    /// Open from file, returning an empty model if the file doesn't exist.
    pub fn open(path: &Path) -> Result<Self, EngineError> {
        match fs::read(path) {
            Ok(bytes) => Self::from_bytes(&bytes),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Self::new()),
            Err(e) => Err(e.into()),
        }
    }
}
