//! Text cleanup applied before tokenization and after generation.

use regex::Regex;

use crate::extractive::ScoredSentence;

/// Cleans raw scraped text ahead of tokenization.
///
/// Tabs and line breaks become spaces, `-`/`;` become spaces, runs of
/// `!` or `?` collapse to a single character, and repeated whitespace
/// collapses to one space.
#[must_use]
pub fn clean_input(text: &str) -> String {
    let cleaned = Regex::new(r"[\t\r\n]").unwrap().replace_all(text, " ");
    let cleaned = Regex::new(r"[-;]").unwrap().replace_all(&cleaned, " ");
    let cleaned = Regex::new(r"!{2,}").unwrap().replace_all(&cleaned, "!");
    let cleaned = Regex::new(r"\?{2,}").unwrap().replace_all(&cleaned, "?");
    Regex::new(r"\s+")
        .unwrap()
        .replace_all(&cleaned, " ")
        .into_owned()
}

/// Normalizes generated text: capitalizes each sentence and repairs the
/// trailing `" ."` artifact the decoder tends to emit.
#[must_use]
pub fn normalize_output(text: &str) -> String {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return String::new();
    }
    let sentences: Vec<String> = split_after_terminators(trimmed)
        .into_iter()
        .map(|sentence| {
            let s = sentence.trim();
            if s.is_empty() {
                return String::new();
            }
            let mut fixed = capitalize_first(s);
            if let Some(stripped) = fixed.strip_suffix(" .") {
                fixed = format!("{stripped}.");
            }
            fixed
        })
        .filter(|s| !s.is_empty())
        .collect();
    sentences.join(" ")
}

/// Word-overlap similarity between two sentences, measured over the
/// shorter sentence's word count.
#[must_use]
pub fn sentence_similarity(first: &str, second: &str) -> f64 {
    let first_words: Vec<&str> = first.split(' ').collect();
    let second_words: Vec<&str> = second.split(' ').collect();
    let shorter = first_words.len().min(second_words.len());
    if shorter == 0 {
        return 0.0;
    }
    let second_set: std::collections::HashSet<&str> = second_words.iter().copied().collect();
    let mut seen = std::collections::HashSet::new();
    let overlap = first_words
        .iter()
        .filter(|w| second_set.contains(*w) && seen.insert(**w))
        .count();
    #[allow(clippy::cast_precision_loss)]
    {
        overlap as f64 / shorter as f64
    }
}

/// Optional similarity-deduplication stage for generated sentences.
///
/// Disabled by default; the decoder occasionally restates the same fact
/// in two near-identical sentences and this stage collapses them.
#[derive(Debug, Clone, Copy)]
pub struct DedupPolicy {
    /// Overlap ratio at or above which two sentences collide.
    pub similarity_threshold: f64,
    /// Sentences scoring below this are removed outright.
    pub min_score: f64,
}

impl Default for DedupPolicy {
    fn default() -> Self {
        Self {
            similarity_threshold: 0.33,
            min_score: 0.5,
        }
    }
}

impl DedupPolicy {
    /// Removes low-scoring and pairwise-similar sentences, keeping the
    /// longer sentence on collision. If every sentence is removed, the
    /// single highest-scoring sentence survives.
    #[must_use]
    pub fn apply(&self, scored: &[ScoredSentence]) -> Vec<String> {
        if scored.len() < 2 {
            return scored.iter().map(|s| s.text.clone()).collect();
        }
        let mut removed = vec![false; scored.len()];
        for (i, sentence) in scored.iter().enumerate() {
            if sentence.score < self.min_score {
                removed[i] = true;
            }
        }
        for i in 0..scored.len() {
            for j in (i + 1)..scored.len() {
                let similarity = sentence_similarity(&scored[i].text, &scored[j].text);
                if similarity >= self.similarity_threshold {
                    // Keep the longer sentence.
                    if scored[i].text.len() < scored[j].text.len() {
                        removed[i] = true;
                    } else {
                        removed[j] = true;
                    }
                }
            }
        }
        if removed.iter().all(|r| *r) {
            return scored
                .iter()
                .max_by(|a, b| a.score.total_cmp(&b.score))
                .map(|best| vec![best.text.clone()])
                .unwrap_or_default();
        }
        scored
            .iter()
            .zip(&removed)
            .filter(|(_, removed)| !**removed)
            .map(|(s, _)| s.text.clone())
            .collect()
    }
}

/// Splits text into sentences after `.`/`!`/`?` followed by a space.
fn split_after_terminators(text: &str) -> Vec<String> {
    let mut sentences = Vec::new();
    let mut current = String::new();
    let mut chars = text.chars().peekable();
    while let Some(c) = chars.next() {
        current.push(c);
        if matches!(c, '.' | '!' | '?') && chars.peek() == Some(&' ') {
            chars.next();
            sentences.push(std::mem::take(&mut current));
        }
    }
    if !current.is_empty() {
        sentences.push(current);
    }
    sentences
}

fn capitalize_first(sentence: &str) -> String {
    let mut chars = sentence.chars();
    chars.next().map_or_else(String::new, |first| {
        first.to_uppercase().chain(chars).collect()
    })
}
