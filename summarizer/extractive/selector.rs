//! Position-stratified greedy sentence selection under a token budget.

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

use crate::model::{CodecError, TokenCodec};

use super::scorer::ScoredSentence;

/// Result of a stratified selection pass.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Extraction {
    /// Selected sentences in original order, joined with `". "`.
    pub text: String,
    /// Combined token count of the selected sentences.
    pub token_count: usize,
    /// Selected sentences in original order.
    pub sentences: Vec<ScoredSentence>,
}

/// Selects high-scoring sentences spread across the whole document.
///
/// The sentence list is partitioned into four contiguous positional
/// quartiles; each quartile is ranked by score and the selector
/// round-robins across them, popping each quartile's best remaining
/// sentence while the cumulative token count stays within budget.
///
/// Selection stops outright as soon as any one quartile runs dry, so
/// documents shorter than four sentences select nothing.
#[derive(Debug, Clone, Copy)]
pub struct StratifiedSelector {
    token_budget: usize,
}

impl StratifiedSelector {
    /// Creates a selector for the given token budget.
    #[must_use]
    pub const fn new(token_budget: usize) -> Self {
        Self { token_budget }
    }

    /// Runs selection over scored sentences in their original order.
    pub fn select(
        &self,
        scored: &[ScoredSentence],
        codec: &dyn TokenCodec,
    ) -> Result<Extraction, CodecError> {
        let quartile_len = scored.len() / 4;
        let mut quartiles = [
            ranked_slice(scored, 0, quartile_len),
            ranked_slice(scored, quartile_len, quartile_len),
            ranked_slice(scored, quartile_len * 2, quartile_len),
            ranked_slice(scored, quartile_len * 3, scored.len().saturating_sub(quartile_len * 3)),
        ];

        let mut token_count = 0usize;
        let mut selected: Vec<ScoredSentence> = Vec::new();
        'selection: while token_count < self.token_budget {
            for quartile in &mut quartiles {
                if !self.try_add_best(quartile, &mut selected, &mut token_count, codec)? {
                    break 'selection;
                }
            }
        }

        selected.sort_by_key(|sentence| sentence.position);
        let text = selected
            .iter()
            .map(|sentence| sentence.text.as_str())
            .collect::<Vec<_>>()
            .join(". ");
        Ok(Extraction {
            text,
            token_count,
            sentences: selected,
        })
    }

    /// Pops the quartile's best remaining sentence into the selection if
    /// it fits the budget. Returns false when the quartile is empty or
    /// the sentence does not fit.
    fn try_add_best(
        &self,
        quartile: &mut VecDeque<ScoredSentence>,
        selected: &mut Vec<ScoredSentence>,
        token_count: &mut usize,
        codec: &dyn TokenCodec,
    ) -> Result<bool, CodecError> {
        let Some(best) = quartile.front() else {
            return Ok(false);
        };
        let sentence_tokens = codec.count(&best.text)?;
        if *token_count + sentence_tokens > self.token_budget {
            return Ok(false);
        }
        *token_count += sentence_tokens;
        if let Some(best) = quartile.pop_front() {
            selected.push(best);
        }
        Ok(true)
    }
}

impl Default for StratifiedSelector {
    fn default() -> Self {
        Self::new(crate::abstractive::TOKEN_BUDGET)
    }
}

/// Copies a positional slice and ranks it descending by score.
fn ranked_slice(scored: &[ScoredSentence], start: usize, count: usize) -> VecDeque<ScoredSentence> {
    let end = (start + count).min(scored.len());
    let mut slice: Vec<ScoredSentence> = scored
        .get(start..end)
        .map(<[ScoredSentence]>::to_vec)
        .unwrap_or_default();
    slice.sort_by(|a, b| b.score.total_cmp(&a.score));
    slice.into()
}
