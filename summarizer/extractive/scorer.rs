//! Multi-feature linguistic sentence scoring.

use serde::{Deserialize, Serialize};

use super::lexicon::Lexicon;

/// Acceptable content-word ratio band.
pub const CONTENT_LOW: f64 = 0.4;
/// Upper bound of the content-word ratio band.
pub const CONTENT_HIGH: f64 = 0.8;
/// Ideal content-word ratio.
pub const CONTENT_IDEAL: f64 = (CONTENT_HIGH + CONTENT_LOW) / 2.0;

/// Acceptable stopword ratio band.
pub const STOPWORD_LOW: f64 = 0.2;
/// Upper bound of the stopword ratio band.
pub const STOPWORD_HIGH: f64 = 0.8;
/// Ideal stopword ratio.
pub const STOPWORD_IDEAL: f64 = (STOPWORD_HIGH + STOPWORD_LOW) / 2.0;

/// Sentences shorter than this many words score zero.
pub const WORDCOUNT_LOW: usize = 5;

/// A sentence with its original position and linguistic score.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoredSentence {
    /// Zero-based position in the source sentence list.
    pub position: usize,
    /// Sentence text, with matched proper nouns in canonical casing.
    pub text: String,
    /// Signed score; not clamped to `[0, 1]`.
    pub score: f64,
}

impl ScoredSentence {
    /// A zero-scored sentence passed through unmodified.
    #[must_use]
    pub fn passthrough(position: usize, text: impl Into<String>) -> Self {
        Self {
            position,
            text: text.into(),
            score: 0.0,
        }
    }
}

/// Scores every sentence in original order.
#[must_use]
pub fn score_sentences(sentences: &[String], lexicon: &Lexicon) -> Vec<ScoredSentence> {
    sentences
        .iter()
        .enumerate()
        .map(|(position, sentence)| score_sentence(position, sentence, lexicon))
        .collect()
}

/// Scores a single sentence against the lexical resources.
///
/// Degenerate sentences (fewer than [`WORDCOUNT_LOW`] words on a raw
/// single-space split, or an immediately repeated word, compared
/// case-insensitively) score zero and pass through unchanged.
#[must_use]
pub fn score_sentence(position: usize, sentence: &str, lexicon: &Lexicon) -> ScoredSentence {
    let raw: Vec<&str> = sentence.split(' ').collect();
    if raw.len() < WORDCOUNT_LOW {
        return ScoredSentence::passthrough(position, sentence);
    }
    if raw
        .windows(2)
        .any(|pair| pair[0].to_lowercase() == pair[1].to_lowercase())
    {
        return ScoredSentence::passthrough(position, sentence);
    }

    let mut words: Vec<Option<String>> = raw.iter().map(|w| Some((*w).to_string())).collect();
    let matched_starts = substitute_proper_nouns(&mut words, lexicon);
    let proper_nouns = matched_starts.len();

    let mut nouns = 0usize;
    let mut verbs = 0usize;
    let mut stopwords = 0usize;
    let mut kept: Vec<&str> = Vec::with_capacity(words.len());
    for (index, slot) in words.iter().enumerate() {
        let Some(word) = slot.as_deref() else {
            // Voided by a phrase match; skipped for further counting.
            continue;
        };
        if word.is_empty() {
            continue;
        }
        // Words consumed by a phrase match were already counted.
        if !matched_starts.contains(&index) {
            if lexicon.is_noun(word) {
                nouns += 1;
            } else if lexicon.is_verb(word) {
                verbs += 1;
            }
            if lexicon.is_stopword(word) {
                stopwords += 1;
            }
        }
        kept.push(word);
    }

    // Ratio denominators use the non-empty word count; the raw split
    // length above only gates minimum length.
    let word_total = raw.iter().filter(|w| !w.is_empty()).count();
    if word_total == 0 {
        return ScoredSentence::passthrough(position, sentence);
    }
    #[allow(clippy::cast_precision_loss)]
    let content_ratio = (proper_nouns + nouns + verbs) as f64 / word_total as f64;
    #[allow(clippy::cast_precision_loss)]
    let stopword_ratio = stopwords as f64 / word_total as f64;

    let content_score = 1.0 - (content_ratio - CONTENT_IDEAL).abs() / CONTENT_IDEAL;
    let stopword_score = 1.0 - (stopword_ratio - STOPWORD_IDEAL).abs() / STOPWORD_IDEAL;

    ScoredSentence {
        position,
        text: kept.join(" "),
        score: (content_score + stopword_score) / 2.0,
    }
}

/// Rewrites proper-noun phrases to canonical casing in place, voiding
/// consumed trailing words, and returns the start positions of matched
/// windows. Longest n-grams are attempted first at every position.
pub fn substitute_proper_nouns(words: &mut [Option<String>], lexicon: &Lexicon) -> Vec<usize> {
    let mut matched = Vec::new();
    for start in 0..words.len() {
        if words[start].is_none() {
            continue;
        }
        for length in lexicon.phrase_lengths() {
            if start + length > words.len() {
                continue;
            }
            let Some(window) = collect_window(&words[start..start + length]) else {
                continue;
            };
            let phrase = window.join(" ").to_lowercase();
            if let Some(canonical) = lexicon.canonical_phrase(length, &phrase) {
                words[start] = Some(canonical.to_string());
                for slot in words.iter_mut().take(start + length).skip(start + 1) {
                    *slot = None;
                }
                matched.push(start);
                break;
            }
        }
    }
    matched
}

fn collect_window(slots: &[Option<String>]) -> Option<Vec<&str>> {
    slots
        .iter()
        .map(|slot| slot.as_deref())
        .collect::<Option<Vec<&str>>>()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    fn lexicon() -> Lexicon {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("nouns.txt"), "cat\ncache\ncompiler\n").unwrap();
        fs::write(dir.path().join("verbs.txt"), "sat\nships\n").unwrap();
        fs::write(dir.path().join("stopwords.txt"), "the\nis\ndown\ngreat\n").unwrap();
        fs::write(
            dir.path().join("proper-nouns.txt"),
            "dotnet\nVisual Studio Code\n",
        )
        .unwrap();
        Lexicon::load(dir.path()).unwrap()
    }

    #[test]
    fn short_sentence_scores_zero() {
        let scored = score_sentence(0, "Go read it", &lexicon());
        assert!((scored.score - 0.0).abs() < f64::EPSILON);
        assert_eq!(scored.text, "Go read it");
    }

    #[test]
    fn adjacent_repetition_scores_zero() {
        let scored = score_sentence(0, "The the cat sat down", &lexicon());
        assert!((scored.score - 0.0).abs() < f64::EPSILON);
        assert_eq!(scored.text, "The the cat sat down");
    }

    #[test]
    fn repetition_guard_ignores_case() {
        let scored = score_sentence(0, "Really REALLY fast cache updates", &lexicon());
        assert!((scored.score - 0.0).abs() < f64::EPSILON);
        assert_eq!(scored.text, "Really REALLY fast cache updates");
    }

    #[test]
    fn proper_noun_window_is_rewritten_and_counted() {
        let lexicon = Lexicon::from_parts(
            std::collections::HashSet::new(),
            std::collections::HashSet::new(),
            std::collections::HashSet::new(),
            &[("dotnet", ".NET")],
        );
        let mut words: Vec<Option<String>> = "dotnet is great today"
            .split(' ')
            .map(|w| Some(w.to_string()))
            .collect();
        let matched = substitute_proper_nouns(&mut words, &lexicon);
        assert_eq!(matched, vec![0]);
        assert_eq!(words[0].as_deref(), Some(".NET"));
    }

    #[test]
    fn multi_word_phrase_voids_trailing_words() {
        let lexicon = lexicon();
        let mut words: Vec<Option<String>> = "visual studio code ships today"
            .split(' ')
            .map(|w| Some(w.to_string()))
            .collect();
        let matched = substitute_proper_nouns(&mut words, &lexicon);
        assert_eq!(matched, vec![0]);
        assert_eq!(words[0].as_deref(), Some("Visual Studio Code"));
        assert_eq!(words[1], None);
        assert_eq!(words[2], None);
        assert_eq!(words[3].as_deref(), Some("ships"));
    }

    #[test]
    fn ratios_drive_the_score() {
        // 5 words: content = cat(noun) + sat(verb) = 2/5, stopwords =
        // the + down = 2/5. content_score = 1 - 0.2/0.6, stopword_score
        // = 1 - 0.1/0.5.
        let scored = score_sentence(0, "the cat sat right down", &lexicon());
        let expected = ((1.0 - 0.2 / 0.6) + (1.0 - 0.1 / 0.5)) / 2.0;
        assert!((scored.score - expected).abs() < 1e-9);
    }

    #[test]
    fn phrase_sentence_scores_with_canonical_text() {
        let scored = score_sentence(0, "visual studio code ships the compiler", &lexicon());
        assert_eq!(scored.text, "Visual Studio Code ships the compiler");
        assert!(scored.score > 0.0);
    }

    #[test]
    fn score_sentences_preserves_order() {
        let sentences = vec!["One two".to_string(), "Three four".to_string()];
        let scored = score_sentences(&sentences, &lexicon());
        assert_eq!(scored[0].position, 0);
        assert_eq!(scored[1].position, 1);
    }
}
