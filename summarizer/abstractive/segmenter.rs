//! Sentence-aligned segmentation of text exceeding the token budget.

use std::collections::VecDeque;

use crate::model::{CodecError, TokenCodec};

/// An ordered run of whole sentences within the token budget.
#[derive(Debug, Clone)]
pub struct Segment {
    /// Sentences joined with `". "`.
    pub text: String,
    /// Combined token count of the sentences.
    pub token_count: usize,
}

/// Segmentation output, surfacing dropped content instead of losing it
/// silently.
#[derive(Debug, Clone)]
pub struct SegmentReport {
    /// Produced segments, each within the token budget.
    pub segments: Vec<Segment>,
    /// Sentences discarded because they did not start with an uppercase
    /// letter (scraping fragments, code remnants).
    pub dropped_fragments: usize,
    /// Sentences discarded because they alone exceeded the budget.
    pub dropped_oversized: usize,
}

/// Greedy sentence packer producing budget-sized segments.
#[derive(Debug, Clone, Copy)]
pub struct TokenBudgetSegmenter {
    token_budget: usize,
}

impl TokenBudgetSegmenter {
    /// Creates a segmenter for the given token budget.
    #[must_use]
    pub const fn new(token_budget: usize) -> Self {
        Self { token_budget }
    }

    /// Splits text on `". "` and packs consecutive sentences into
    /// segments whose combined token count stays under the budget.
    pub fn segment(
        &self,
        text: &str,
        codec: &dyn TokenCodec,
    ) -> Result<SegmentReport, CodecError> {
        let mut sentences: VecDeque<&str> = text.split(". ").collect();
        let mut report = SegmentReport {
            segments: Vec::new(),
            dropped_fragments: 0,
            dropped_oversized: 0,
        };

        while !sentences.is_empty() {
            let mut segment_sentences: Vec<&str> = Vec::new();
            let mut segment_tokens = 0usize;
            while let Some(&sentence) = sentences.front() {
                if !starts_capitalized(sentence) {
                    sentences.pop_front();
                    report.dropped_fragments += 1;
                    continue;
                }
                let sentence_tokens = codec.count(sentence)?;
                if sentence_tokens > self.token_budget {
                    sentences.pop_front();
                    report.dropped_oversized += 1;
                } else if segment_tokens + sentence_tokens < self.token_budget {
                    segment_sentences.push(sentence);
                    segment_tokens += sentence_tokens;
                    sentences.pop_front();
                } else if segment_sentences.is_empty() {
                    // An exactly-budget sentence can never pack with the
                    // strict bound above; dropping it keeps termination.
                    sentences.pop_front();
                    report.dropped_oversized += 1;
                } else {
                    break;
                }
            }
            if !segment_sentences.is_empty() {
                report.segments.push(Segment {
                    text: segment_sentences.join(". "),
                    token_count: segment_tokens,
                });
            }
        }
        Ok(report)
    }
}

impl Default for TokenBudgetSegmenter {
    fn default() -> Self {
        Self::new(super::TOKEN_BUDGET)
    }
}

/// Whether the first letter in the sentence is uppercase. Sentences with
/// no letters at all count as fragments.
fn starts_capitalized(sentence: &str) -> bool {
    sentence
        .trim_start()
        .chars()
        .find(|c| c.is_alphabetic())
        .is_some_and(char::is_uppercase)
}
