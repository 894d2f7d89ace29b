//! The suggestion engine: merges exact matches, personal words, prefix
//! completions, fuzzy corrections, and bigram predictions into one ranked
//! list.
//!
//! The pipeline is a pure read over already-loaded state. Dictionary loading
//! is resolved up front via `ensure_loaded`, and the dictionary snapshot is
//! scanned with no locks held, so a request is safe to cancel at any point.

use std::collections::HashSet;
use std::sync::{Arc, RwLock};

use tracing::{debug, debug_span, warn};

use crate::bigram::BigramModel;
use crate::config::EngineConfig;
use crate::dictionary::{DictionaryIndex, DictionarySource};
use crate::edit_distance::{distance, max_allowed_distance};
use crate::error::EngineError;
use crate::personal::{now_epoch, MemoryWordStore, PersonalWordStore};

/// A ranked suggestion. Within one result list words are unique and sorted
/// by score descending.
#[derive(Debug, Clone, PartialEq)]
pub struct WordSuggestion {
    pub word: String,
    pub score: f32,
    /// Confident enough to replace the typed text automatically, versus
    /// offered only for manual selection.
    pub is_autocorrect: bool,
}

pub struct SuggestionEngine {
    dictionaries: DictionaryIndex,
    bigrams: RwLock<BigramModel>,
    personal: Arc<dyn PersonalWordStore>,
    config: EngineConfig,
}

impl SuggestionEngine {
    /// Engine with an in-memory personal store, an empty bigram model, and
    /// default configuration.
    pub fn new(source: Box<dyn DictionarySource>) -> Self {
        Self::with_parts(
            source,
            Arc::new(MemoryWordStore::new()),
            BigramModel::new(),
            EngineConfig::default(),
        )
    }

    pub fn with_parts(
        source: Box<dyn DictionarySource>,
        personal: Arc<dyn PersonalWordStore>,
        bigrams: BigramModel,
        config: EngineConfig,
    ) -> Self {
        Self {
            dictionaries: DictionaryIndex::new(source),
            bigrams: RwLock::new(bigrams),
            personal,
            config,
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Ranked suggestions for the word currently being typed.
    ///
    /// An empty `word` defers to bigram prediction on `previous_word` alone
    /// (or nothing when that is also empty); the pipeline itself never sees
    /// empty input.
    pub fn suggestions(
        &self,
        word: &str,
        previous_word: &str,
        language: &str,
    ) -> Vec<WordSuggestion> {
        if word.is_empty() {
            if previous_word.is_empty() {
                return Vec::new();
            }
            return self.bigram_suggestions(previous_word, language);
        }
        self.pipeline(word, previous_word, language)
    }

    fn pipeline(&self, word: &str, previous_word: &str, language: &str) -> Vec<WordSuggestion> {
        let _span = debug_span!("suggestions", word, language).entered();

        let dict = self.dictionaries.ensure_loaded(language);
        let lower = word.to_lowercase();
        let char_len = lower.chars().count();
        let weights = &self.config.scoring;
        let limits = &self.config.limits;

        let mut acc: Vec<WordSuggestion> = Vec::new();

        // 1. Exact dictionary match
        if let Some(freq) = dict.frequency(&lower) {
            acc.push(WordSuggestion {
                word: lower.clone(),
                score: weights.exact_base + freq as f32,
                is_autocorrect: false,
            });
        }

        // 2. Personal word
        match self.personal.get(&lower) {
            Ok(Some(personal)) => acc.push(WordSuggestion {
                word: personal.word,
                score: weights.personal_base + personal.frequency as f32,
                is_autocorrect: false,
            }),
            Ok(None) => {}
            Err(e) => warn!(error = %e, "personal store lookup failed"),
        }

        // 3. Prefix completions
        if char_len >= 2 {
            let completions = dict
                .trie()
                .words_with_prefix(&lower, limits.prefix_fetch)
                .into_iter()
                .filter(|(candidate, _)| candidate != &lower)
                .take(limits.prefix_keep);
            for (candidate, freq) in completions {
                if acc.iter().any(|s| s.word == candidate) {
                    continue;
                }
                acc.push(WordSuggestion {
                    word: candidate,
                    score: weights.prefix_base + freq as f32 * weights.frequency_weight,
                    is_autocorrect: false,
                });
            }
        }

        // 4. Fuzzy corrections
        let max_dist = max_allowed_distance(char_len);
        if max_dist > 0 {
            struct Correction {
                word: String,
                dist: usize,
                score: f32,
            }

            let mut corrections: Vec<Correction> = Vec::new();
            for (candidate, freq) in dict.entries() {
                // Length difference lower-bounds the edit distance; skip the
                // DP table for candidates that cannot be within budget.
                if char_len.abs_diff(candidate.chars().count()) > max_dist {
                    continue;
                }
                let dist = distance(&lower, candidate);
                if !(1..=max_dist).contains(&dist) {
                    continue;
                }
                corrections.push(Correction {
                    word: candidate.to_string(),
                    dist,
                    score: (max_dist - dist + 1) as f32 * weights.edit_multiplier
                        + freq as f32 * weights.frequency_weight,
                });
            }
            corrections.sort_by(|a, b| {
                b.score
                    .partial_cmp(&a.score)
                    .unwrap_or(std::cmp::Ordering::Equal)
                    .then_with(|| a.word.cmp(&b.word))
            });
            corrections.truncate(limits.fuzzy_keep);
            for c in corrections {
                acc.push(WordSuggestion {
                    word: c.word,
                    score: c.score,
                    // Single-edit corrections are confident enough to
                    // auto-apply, but only past 3 characters.
                    is_autocorrect: c.dist == 1 && char_len > 3,
                });
            }
        }

        // 5. Bigram predictions
        if !previous_word.is_empty() {
            let predictions = match self.bigrams.read() {
                Ok(model) => model.predict(previous_word, limits.max_results),
                Err(_) => Vec::new(),
            };
            for prediction in predictions {
                if acc.iter().any(|s| s.word == prediction.word) {
                    continue;
                }
                acc.push(WordSuggestion {
                    score: prediction.score * weights.bigram_multiplier,
                    ..prediction
                });
            }
        }

        // Merge: first occurrence wins (earlier stages take priority on tie),
        // stable sort keeps that priority among equal scores.
        let mut seen = HashSet::new();
        acc.retain(|s| seen.insert(s.word.clone()));
        acc.sort_by(|a, b| {
            b.score
                .partial_cmp(&a.score)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        acc.truncate(limits.max_results);

        debug!(count = acc.len());
        acc
    }

    /// Pure next-word predictions after `previous_word` (no current word).
    pub fn bigram_suggestions(&self, previous_word: &str, language: &str) -> Vec<WordSuggestion> {
        self.dictionaries.ensure_loaded(language);
        match self.bigrams.read() {
            Ok(model) => model.predict(previous_word, self.config.limits.max_results),
            Err(_) => Vec::new(),
        }
    }

    /// Record a committed word into the personal store. Single characters
    /// are ignored; they carry no signal worth learning.
    pub fn learn_word(&self, word: &str) -> Result<(), EngineError> {
        let lower = word.to_lowercase();
        if lower.chars().count() < 2 {
            return Ok(());
        }
        match self.personal.get(&lower)? {
            Some(_) => self.personal.increment(&lower, now_epoch()),
            None => self.personal.insert(&lower),
        }
    }

    /// Record an observed (previous → next) word transition.
    pub fn record_bigram(&self, previous_word: &str, next_word: &str) {
        if let Ok(mut model) = self.bigrams.write() {
            model.record(previous_word, next_word);
        }
    }

    /// Replace the whole bigram table from bulk data (e.g. a restored model).
    pub fn load_bigrams(
        &self,
        data: std::collections::HashMap<String, std::collections::HashMap<String, u32>>,
    ) {
        if let Ok(mut model) = self.bigrams.write() {
            model.load(data);
        }
    }

    /// True if the word is an exact entry in any loaded language.
    pub fn is_valid_word(&self, word: &str) -> bool {
        self.dictionaries.is_valid_word(word)
    }

    /// Load a language's dictionary ahead of time (idempotent).
    pub fn preload(&self, language: &str) {
        self.dictionaries.ensure_loaded(language);
    }
}
