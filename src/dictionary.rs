//! Per-language dictionary aggregates: a static word→frequency table plus a
//! prefix index built from it, loaded lazily and cached for the process
//! lifetime.

use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;
use std::sync::{Arc, RwLock};

use tracing::{debug, warn};

use crate::error::EngineError;
use crate::trie::Trie;

/// Supplies raw per-language dictionaries to [`DictionaryIndex`]. Any
/// key-value source qualifies; the backing format is the source's concern.
pub trait DictionarySource: Send + Sync {
    fn load(&self, language: &str) -> Result<HashMap<String, u32>, EngineError>;
}

/// Reads `dictionary_{lang}.json` files (a JSON object of word → frequency)
/// from a directory.
pub struct JsonDictionarySource {
    dir: PathBuf,
}

impl JsonDictionarySource {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }
}

impl DictionarySource for JsonDictionarySource {
    fn load(&self, language: &str) -> Result<HashMap<String, u32>, EngineError> {
        let path = self.dir.join(format!("dictionary_{language}.json"));
        let json = fs::read_to_string(&path)?;
        serde_json::from_str(&json).map_err(|e| EngineError::Parse(e.to_string()))
    }
}

/// Immutable per-language dictionary snapshot: the raw frequency table and
/// the prefix index built from it. Handed out as an `Arc` so scoring runs
/// with no locks held.
pub struct LanguageDict {
    words: HashMap<String, u32>,
    trie: Trie,
}

impl LanguageDict {
    fn from_words(words: HashMap<String, u32>) -> Self {
        let mut trie = Trie::new();
        for (word, &freq) in &words {
            trie.insert(word, freq);
        }
        Self { words, trie }
    }

    fn empty() -> Self {
        Self {
            words: HashMap::new(),
            trie: Trie::new(),
        }
    }

    pub fn frequency(&self, word: &str) -> Option<u32> {
        self.words.get(word).copied()
    }

    pub fn contains(&self, word: &str) -> bool {
        self.words.contains_key(word)
    }

    /// Iterate all (word, frequency) entries. Used by the fuzzy-correction
    /// scan after its length pre-filter.
    pub fn entries(&self) -> impl Iterator<Item = (&str, u32)> {
        self.words.iter().map(|(w, &f)| (w.as_str(), f))
    }

    pub fn trie(&self) -> &Trie {
        &self.trie
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }
}

/// Lazily loaded, per-language dictionary cache. Loaded languages accumulate
/// for the process lifetime and are never evicted.
pub struct DictionaryIndex {
    source: Box<dyn DictionarySource>,
    languages: RwLock<HashMap<String, Arc<LanguageDict>>>,
}

impl DictionaryIndex {
    pub fn new(source: Box<dyn DictionarySource>) -> Self {
        Self {
            source,
            languages: RwLock::new(HashMap::new()),
        }
    }

    /// Load `language` if not already resident and return its snapshot.
    ///
    /// Idempotent and at-most-once under concurrency: the check and the load
    /// both happen under the write lock, so racing callers block until the
    /// first one has populated the cache. A failing source degrades to an
    /// empty dictionary rather than propagating — a missing asset must not
    /// break the suggestion flow — and the empty result is cached so the
    /// source is still only consulted once.
    pub fn ensure_loaded(&self, language: &str) -> Arc<LanguageDict> {
        if let Ok(languages) = self.languages.read() {
            if let Some(dict) = languages.get(language) {
                return Arc::clone(dict);
            }
        }

        let mut languages = match self.languages.write() {
            Ok(guard) => guard,
            // Poisoned lock: fall back to an uncached empty dict rather
            // than panic inside the suggestion flow.
            Err(_) => return Arc::new(LanguageDict::empty()),
        };
        if let Some(dict) = languages.get(language) {
            return Arc::clone(dict);
        }

        let dict = match self.source.load(language) {
            Ok(words) => {
                debug!(language, entries = words.len(), "dictionary loaded");
                Arc::new(LanguageDict::from_words(words))
            }
            Err(e) => {
                warn!(language, error = %e, "dictionary load failed, using empty");
                Arc::new(LanguageDict::empty())
            }
        };
        languages.insert(language.to_string(), Arc::clone(&dict));
        dict
    }

    /// True if the lowercased word is an exact entry in ANY loaded language.
    /// Loaded languages accumulate, so a word valid in one active layout is
    /// not flagged while typing in another.
    pub fn is_valid_word(&self, word: &str) -> bool {
        let lower = word.to_lowercase();
        match self.languages.read() {
            Ok(languages) => languages.values().any(|dict| dict.contains(&lower)),
            Err(_) => false,
        }
    }

    /// Language codes currently resident.
    pub fn loaded_languages(&self) -> Vec<String> {
        match self.languages.read() {
            Ok(languages) => languages.keys().cloned().collect(),
            Err(_) => Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Source that counts loads and serves fixed tables per language.
    struct CountingSource {
        loads: Arc<AtomicUsize>,
        tables: HashMap<String, HashMap<String, u32>>,
    }

    impl CountingSource {
        fn new(tables: Vec<(&str, Vec<(&str, u32)>)>) -> Self {
            let tables = tables
                .into_iter()
                .map(|(lang, words)| {
                    (
                        lang.to_string(),
                        words
                            .into_iter()
                            .map(|(w, f)| (w.to_string(), f))
                            .collect(),
                    )
                })
                .collect();
            Self {
                loads: Arc::new(AtomicUsize::new(0)),
                tables,
            }
        }

        fn load_counter(&self) -> Arc<AtomicUsize> {
            Arc::clone(&self.loads)
        }
    }

    impl DictionarySource for CountingSource {
        fn load(&self, language: &str) -> Result<HashMap<String, u32>, EngineError> {
            self.loads.fetch_add(1, Ordering::SeqCst);
            self.tables
                .get(language)
                .cloned()
                .ok_or_else(|| EngineError::Store(format!("no dictionary for {language}")))
        }
    }

    #[test]
    fn test_ensure_loaded_builds_table_and_trie() {
        let source = CountingSource::new(vec![("en", vec![("hello", 50), ("help", 30)])]);
        let index = DictionaryIndex::new(Box::new(source));
        let dict = index.ensure_loaded("en");
        assert_eq!(dict.len(), 2);
        assert_eq!(dict.frequency("hello"), Some(50));
        assert!(dict.trie().contains("help"));
    }

    #[test]
    fn test_ensure_loaded_is_idempotent() {
        let source = CountingSource::new(vec![("en", vec![("hello", 50)])]);
        let loads = source.load_counter();
        let index = DictionaryIndex::new(Box::new(source));

        let first = index.ensure_loaded("en");
        let second = index.ensure_loaded("en");
        assert!(Arc::ptr_eq(&first, &second));
        // Single underlying load despite two calls
        assert_eq!(loads.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_concurrent_ensure_loaded_loads_once() {
        let source = CountingSource::new(vec![("en", vec![("hello", 50)])]);
        let loads = source.load_counter();
        let index = Arc::new(DictionaryIndex::new(Box::new(source)));

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let index = Arc::clone(&index);
                std::thread::spawn(move || {
                    let dict = index.ensure_loaded("en");
                    assert_eq!(dict.len(), 1);
                })
            })
            .collect();
        for h in handles {
            h.join().unwrap();
        }

        assert_eq!(loads.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_failed_load_degrades_to_empty_and_caches() {
        let source = CountingSource::new(vec![]);
        let loads = source.load_counter();
        let index = DictionaryIndex::new(Box::new(source));

        let dict = index.ensure_loaded("xx");
        assert!(dict.is_empty());
        // Second call must not retry the source
        let dict2 = index.ensure_loaded("xx");
        assert!(dict2.is_empty());
        assert_eq!(loads.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_is_valid_word_cross_language() {
        let source = CountingSource::new(vec![
            ("en", vec![("hello", 50)]),
            ("de", vec![("hallo", 40)]),
        ]);
        let index = DictionaryIndex::new(Box::new(source));
        index.ensure_loaded("en");
        assert!(index.is_valid_word("hello"));
        assert!(index.is_valid_word("HELLO"));
        assert!(!index.is_valid_word("hallo"));

        index.ensure_loaded("de");
        assert!(index.is_valid_word("hallo"));
        assert!(index.is_valid_word("hello"));
        assert!(!index.is_valid_word("bonjour"));
    }

    #[test]
    fn test_loaded_languages() {
        let source = CountingSource::new(vec![("en", vec![("hello", 50)])]);
        let index = DictionaryIndex::new(Box::new(source));
        assert!(index.loaded_languages().is_empty());
        index.ensure_loaded("en");
        assert_eq!(index.loaded_languages(), vec!["en".to_string()]);
    }

    #[test]
    fn test_json_source_reads_asset() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("dictionary_en.json"),
            r#"{"hello": 50, "world": 20}"#,
        )
        .unwrap();

        let source = JsonDictionarySource::new(dir.path());
        let words = source.load("en").unwrap();
        assert_eq!(words.get("hello"), Some(&50));
        assert_eq!(words.len(), 2);
    }

    #[test]
    fn test_json_source_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let source = JsonDictionarySource::new(dir.path());
        assert!(matches!(source.load("en"), Err(EngineError::Io(_))));
    }

    #[test]
    fn test_json_source_malformed_file() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("dictionary_en.json"), "not json").unwrap();
        let source = JsonDictionarySource::new(dir.path());
        assert!(matches!(source.load("en"), Err(EngineError::Parse(_))));
    }
}
