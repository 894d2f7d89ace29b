//! wordhint — the suggestion-ranking core of an on-device typing assistant.
//!
//! Given the word currently being typed (possibly misspelled), the previous
//! committed word, and per-user/per-language frequency data, the engine
//! produces a small ranked list of candidates, one of which may be flagged
//! as an autocorrect replacement. Five signals feed the ranking: exact
//! dictionary matches, personal-word hits, trie prefix completions, bounded
//! Damerau-Levenshtein corrections, and bigram next-word predictions.
//!
//! The host IME drives the engine through [`SuggestionWorker`], which
//! debounces per-keystroke requests and silently cancels stale ones, or
//! calls [`SuggestionEngine`] directly for synchronous use.

pub mod bigram;
pub mod config;
pub mod dictionary;
pub mod edit_distance;
pub mod engine;
pub mod error;
pub mod personal;
pub mod trace_init;
pub mod trie;
pub mod worker;

pub use bigram::{BigramModel, ExternalPredictor};
pub use config::{EngineConfig, Limits, ScoringWeights};
pub use dictionary::{DictionaryIndex, DictionarySource, JsonDictionarySource, LanguageDict};
pub use engine::{SuggestionEngine, WordSuggestion};
pub use error::EngineError;
pub use personal::{MemoryWordStore, PersonalWord, PersonalWordStore};
pub use trie::Trie;
pub use worker::{SuggestionResult, SuggestionWorker};
