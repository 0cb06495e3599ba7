//! Lexical resources loaded once at startup and shared read-only.

use std::{
    collections::{BTreeMap, HashMap, HashSet},
    fs,
    path::Path,
};

use anyhow::{Context, Result};

/// Flat word lists and the multi-word proper-noun phrase table.
///
/// Loaded eagerly so a missing or unreadable file fails at startup
/// instead of on first use; shared by `Arc` across concurrent calls.
#[derive(Debug, Clone)]
pub struct Lexicon {
    nouns: HashSet<String>,
    verbs: HashSet<String>,
    stopwords: HashSet<String>,
    /// Phrase word count -> lowercase phrase -> canonical-cased phrase.
    proper_nouns: BTreeMap<usize, HashMap<String, String>>,
}

impl Lexicon {
    /// Loads `nouns.txt`, `verbs.txt`, `stopwords.txt`, and
    /// `proper-nouns.txt` from the given data directory.
    pub fn load(dir: impl AsRef<Path>) -> Result<Self> {
        let dir = dir.as_ref();
        Ok(Self {
            nouns: load_word_set(&dir.join("nouns.txt"))?,
            verbs: load_word_set(&dir.join("verbs.txt"))?,
            stopwords: load_word_set(&dir.join("stopwords.txt"))?,
            proper_nouns: load_proper_nouns(&dir.join("proper-nouns.txt"))?,
        })
    }

    /// Builds a lexicon from in-memory parts. [`Lexicon::load`] is the
    /// usual entry; this suits embedded or synthetic resources.
    #[must_use]
    pub fn from_parts(
        nouns: HashSet<String>,
        verbs: HashSet<String>,
        stopwords: HashSet<String>,
        proper_nouns: &[(&str, &str)],
    ) -> Self {
        let mut table: BTreeMap<usize, HashMap<String, String>> = BTreeMap::new();
        for (lowercase, canonical) in proper_nouns {
            let word_count = lowercase.split(' ').count();
            table
                .entry(word_count)
                .or_default()
                .insert((*lowercase).to_string(), (*canonical).to_string());
        }
        Self {
            nouns,
            verbs,
            stopwords,
            proper_nouns: table,
        }
    }

    /// Whether the word is a known noun.
    #[must_use]
    pub fn is_noun(&self, word: &str) -> bool {
        self.nouns.contains(word)
    }

    /// Whether the word is a known verb.
    #[must_use]
    pub fn is_verb(&self, word: &str) -> bool {
        self.verbs.contains(word)
    }

    /// Whether the word is a stopword.
    #[must_use]
    pub fn is_stopword(&self, word: &str) -> bool {
        self.stopwords.contains(word)
    }

    /// Canonical casing for a lowercase phrase of the given word count.
    #[must_use]
    pub fn canonical_phrase(&self, word_count: usize, lowercase: &str) -> Option<&str> {
        self.proper_nouns
            .get(&word_count)
            .and_then(|phrases| phrases.get(lowercase))
            .map(String::as_str)
    }

    /// Phrase lengths present in the table, longest first. Matching
    /// attempts longest n-grams first so multi-word proper nouns win
    /// over their single-word prefixes.
    pub fn phrase_lengths(&self) -> impl Iterator<Item = usize> + '_ {
        self.proper_nouns.keys().rev().copied()
    }
}

fn load_word_set(path: &Path) -> Result<HashSet<String>> {
    let content =
        fs::read_to_string(path).with_context(|| format!("reading word list {}", path.display()))?;
    Ok(content
        .lines()
        .map(|line| line.trim().to_lowercase())
        .filter(|line| !line.is_empty())
        .collect())
}

fn load_proper_nouns(path: &Path) -> Result<BTreeMap<usize, HashMap<String, String>>> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("reading proper-noun table {}", path.display()))?;
    let mut table: BTreeMap<usize, HashMap<String, String>> = BTreeMap::new();
    for line in content.lines() {
        let canonical = line.trim();
        if canonical.is_empty() {
            continue;
        }
        let word_count = canonical.split(' ').count();
        table
            .entry(word_count)
            .or_default()
            .insert(canonical.to_lowercase(), canonical.to_string());
    }
    Ok(table)
}
