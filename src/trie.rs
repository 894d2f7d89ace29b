//! Frequency-annotated prefix tree used for completion lookup.
//!
//! Nodes live in a flat arena indexed by `usize`; children reference their
//! parent's arena slot rather than owning boxed pointers. Prefix enumeration
//! builds each result string by value along the path, so concurrent readers
//! never share traversal state.

use std::collections::HashMap;

#[derive(Debug, Default)]
struct Node {
    children: HashMap<char, usize>,
    terminal: bool,
    frequency: u32,
}

/// In-memory prefix tree mapping words to frequency counts.
#[derive(Debug)]
pub struct Trie {
    nodes: Vec<Node>,
}

impl Default for Trie {
    fn default() -> Self {
        Self::new()
    }
}

impl Trie {
    pub fn new() -> Self {
        Self {
            nodes: vec![Node::default()],
        }
    }

    /// Insert `word` with `frequency`, creating one node per character.
    /// Re-inserting an existing word keeps the higher frequency.
    pub fn insert(&mut self, word: &str, frequency: u32) {
        let mut idx = 0;
        for ch in word.chars() {
            idx = match self.nodes[idx].children.get(&ch) {
                Some(&child) => child,
                None => {
                    let child = self.nodes.len();
                    self.nodes.push(Node::default());
                    self.nodes[idx].children.insert(ch, child);
                    child
                }
            };
        }
        let node = &mut self.nodes[idx];
        node.terminal = true;
        if frequency > node.frequency {
            node.frequency = frequency;
        }
    }

    /// Exact-match membership. A word that exists only as a prefix of longer
    /// words is not contained.
    pub fn contains(&self, word: &str) -> bool {
        self.find(word).is_some_and(|idx| self.nodes[idx].terminal)
    }

    /// Stored frequency of `word`, or 0 for absent or non-terminal paths.
    pub fn frequency_of(&self, word: &str) -> u32 {
        match self.find(word) {
            Some(idx) if self.nodes[idx].terminal => self.nodes[idx].frequency,
            _ => 0,
        }
    }

    /// All complete words under `prefix`, sorted by frequency descending
    /// (ties lexicographic), truncated to `limit`. The prefix itself is
    /// included when it is a complete word; an empty prefix enumerates the
    /// whole trie. Returns an empty vec when the prefix path does not exist.
    pub fn words_with_prefix(&self, prefix: &str, limit: usize) -> Vec<(String, u32)> {
        let Some(start) = self.find(prefix) else {
            return Vec::new();
        };
        let mut results = Vec::new();
        self.collect(start, prefix.to_string(), &mut results);
        results.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        results.truncate(limit);
        results
    }

    fn find(&self, path: &str) -> Option<usize> {
        let mut idx = 0;
        for ch in path.chars() {
            idx = *self.nodes[idx].children.get(&ch)?;
        }
        Some(idx)
    }

    fn collect(&self, idx: usize, word: String, results: &mut Vec<(String, u32)>) {
        let node = &self.nodes[idx];
        if node.terminal {
            results.push((word.clone(), node.frequency));
        }
        for (&ch, &child) in &node.children {
            let mut next = word.clone();
            next.push(ch);
            self.collect(child, next, results);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_trie() -> Trie {
        let mut trie = Trie::new();
        trie.insert("hello", 10);
        trie.insert("help", 30);
        trie.insert("helm", 20);
        trie.insert("world", 5);
        trie
    }

    #[test]
    fn test_contains_exact_only() {
        let trie = sample_trie();
        assert!(trie.contains("hello"));
        assert!(trie.contains("help"));
        // "hell" is a prefix of inserted words but was never inserted itself
        assert!(!trie.contains("hell"));
        assert!(!trie.contains("helios"));
        assert!(!trie.contains(""));
    }

    #[test]
    fn test_frequency_of() {
        let trie = sample_trie();
        assert_eq!(trie.frequency_of("hello"), 10);
        assert_eq!(trie.frequency_of("hell"), 0); // non-terminal path
        assert_eq!(trie.frequency_of("missing"), 0);
    }

    #[test]
    fn test_insert_keeps_max_frequency() {
        let mut trie = Trie::new();
        trie.insert("x", 20);
        trie.insert("x", 5);
        assert_eq!(trie.frequency_of("x"), 20);
        trie.insert("x", 40);
        assert_eq!(trie.frequency_of("x"), 40);
    }

    #[test]
    fn test_words_with_prefix_ordering() {
        let trie = sample_trie();
        let results = trie.words_with_prefix("hel", 2);
        assert_eq!(
            results,
            vec![("help".to_string(), 30), ("helm".to_string(), 20)]
        );
    }

    #[test]
    fn test_words_with_prefix_includes_prefix_itself() {
        let mut trie = Trie::new();
        trie.insert("can", 50);
        trie.insert("candle", 10);
        let results = trie.words_with_prefix("can", 10);
        assert_eq!(
            results,
            vec![("can".to_string(), 50), ("candle".to_string(), 10)]
        );
    }

    #[test]
    fn test_words_with_prefix_missing_path() {
        let trie = sample_trie();
        assert!(trie.words_with_prefix("xyz", 10).is_empty());
    }

    #[test]
    fn test_empty_prefix_enumerates_everything() {
        let trie = sample_trie();
        let results = trie.words_with_prefix("", 10);
        assert_eq!(results.len(), 4);
        assert_eq!(results[0], ("help".to_string(), 30));
        assert_eq!(results[3], ("world".to_string(), 5));
    }

    #[test]
    fn test_frequency_tie_is_lexicographic() {
        let mut trie = Trie::new();
        trie.insert("beta", 7);
        trie.insert("alpha", 7);
        let results = trie.words_with_prefix("", 10);
        assert_eq!(results[0].0, "alpha");
        assert_eq!(results[1].0, "beta");
    }

    #[test]
    fn test_unicode_words() {
        let mut trie = Trie::new();
        trie.insert("über", 12);
        trie.insert("übrig", 3);
        assert!(trie.contains("über"));
        let results = trie.words_with_prefix("üb", 10);
        assert_eq!(results[0], ("über".to_string(), 12));
        assert_eq!(results[1], ("übrig".to_string(), 3));
    }
}
