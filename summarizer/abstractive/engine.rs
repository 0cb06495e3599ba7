//! Recursive summarization over the token-budget segmenter and decoder.

use std::sync::Arc;

use serde_json::json;
use shared_logging::LogLevel;
use thiserror::Error;

use crate::model::{CodecError, ModelError, SequenceModel, TokenCodec};
use crate::normalize::{clean_input, normalize_output};
use crate::telemetry::SummarizerTelemetry;

use super::{AutoregressiveDecoder, TokenBudgetSegmenter, TOKEN_BUDGET};

/// Upper bound on segment-and-resummarize passes before the input is
/// truncated to the budget instead.
pub const MAX_REDUCTION_PASSES: usize = 3;

/// Errors produced by the summarization engine.
#[derive(Debug, Error)]
pub enum SummarizeError {
    /// The caller asked for a zero-length summary.
    #[error("max_new_tokens must be at least 1")]
    InvalidMaxTokens,
    /// Tokenizer failure.
    #[error(transparent)]
    Codec(#[from] CodecError),
    /// Inference failure.
    #[error(transparent)]
    Model(#[from] ModelError),
}

/// Bounded-length abstractive summarizer.
///
/// Inputs within the token budget go through a single encode/decode
/// round. Over-budget inputs are segmented into budget-sized sentence
/// runs, each segment is summarized recursively, and the joined result
/// is retried, up to [`MAX_REDUCTION_PASSES`] times before falling back
/// to token-level truncation.
pub struct RecursiveSummarizer<M: SequenceModel> {
    codec: Arc<dyn TokenCodec>,
    model: Arc<M>,
    segmenter: TokenBudgetSegmenter,
    decoder: AutoregressiveDecoder,
    telemetry: Option<SummarizerTelemetry>,
    max_reduction_passes: usize,
    token_budget: usize,
}

impl<M: SequenceModel> RecursiveSummarizer<M> {
    /// Creates a summarizer over the given tokenizer and model.
    #[must_use]
    pub fn new(codec: Arc<dyn TokenCodec>, model: Arc<M>) -> Self {
        Self {
            codec,
            model,
            segmenter: TokenBudgetSegmenter::default(),
            decoder: AutoregressiveDecoder::default(),
            telemetry: None,
            max_reduction_passes: MAX_REDUCTION_PASSES,
            token_budget: TOKEN_BUDGET,
        }
    }

    /// Replaces the generation loop's selection policy.
    #[must_use]
    pub fn with_decoder(mut self, decoder: AutoregressiveDecoder) -> Self {
        self.decoder = decoder;
        self
    }

    /// Overrides the token budget. Segmentation follows the same budget.
    #[must_use]
    pub fn with_token_budget(mut self, token_budget: usize) -> Self {
        self.token_budget = token_budget;
        self.segmenter = TokenBudgetSegmenter::new(token_budget);
        self
    }

    /// Attaches a telemetry handle.
    #[must_use]
    pub fn with_telemetry(mut self, telemetry: SummarizerTelemetry) -> Self {
        self.telemetry = Some(telemetry);
        self
    }

    /// Summarizes an article in at most `max_new_tokens` generated
    /// tokens. The title is folded into the task prompt.
    pub fn summarize(
        &self,
        title: &str,
        body: &str,
        max_new_tokens: usize,
    ) -> Result<String, SummarizeError> {
        if max_new_tokens == 0 {
            return Err(SummarizeError::InvalidMaxTokens);
        }
        // Clean before the budget check so whitespace and punctuation
        // noise alone never forces a reduction pass.
        let mut text = clean_input(body);
        let mut pass = 0usize;
        while self.codec.count(&text)? > self.token_budget {
            if pass >= self.max_reduction_passes {
                text = self.truncate_to_budget(&text)?;
                if let Some(tel) = &self.telemetry {
                    let _ = tel.log(
                        LogLevel::Warn,
                        "summarizer.reduce.truncated",
                        json!({ "passes": pass }),
                    );
                }
                break;
            }
            text = self.reduce_once(title, &text, max_new_tokens, pass)?;
            pass += 1;
        }
        let prompt = format!("summarize: Title: {title}, Text: {text}");
        self.generate(&prompt, max_new_tokens)
    }

    /// One segmentation pass: each budget-sized segment goes through a
    /// nested [`Self::summarize`] call under the same title, and the
    /// partial summaries are rejoined.
    fn reduce_once(
        &self,
        title: &str,
        text: &str,
        max_new_tokens: usize,
        pass: usize,
    ) -> Result<String, SummarizeError> {
        let report = self.segmenter.segment(text, self.codec.as_ref())?;
        if let Some(tel) = &self.telemetry {
            if report.dropped_fragments > 0 || report.dropped_oversized > 0 {
                let _ = tel.log(
                    LogLevel::Warn,
                    "summarizer.segment.dropped",
                    json!({
                        "fragments": report.dropped_fragments,
                        "oversized": report.dropped_oversized,
                    }),
                );
            }
        }
        let mut partials = Vec::with_capacity(report.segments.len());
        for segment in &report.segments {
            // Segments are under the budget, so the nested call runs a
            // single direct round.
            partials.push(self.summarize(title, &segment.text, max_new_tokens)?);
        }
        let reduced = clean_input(&partials.join(". "));
        if let Some(tel) = &self.telemetry {
            let _ = tel.log(
                LogLevel::Info,
                "summarizer.reduce.pass",
                json!({
                    "pass": pass + 1,
                    "segments": report.segments.len(),
                    "tokens": self.codec.count(&reduced)?,
                }),
            );
        }
        Ok(reduced)
    }

    /// Encode, drop tokens past the budget, decode back to text.
    fn truncate_to_budget(&self, text: &str) -> Result<String, SummarizeError> {
        let mut ids = self.codec.encode(text, false)?;
        ids.truncate(self.token_budget);
        Ok(self.codec.decode(&ids, true)?)
    }

    /// Single encode/decode round over an in-budget prompt.
    fn generate(&self, prompt: &str, max_new_tokens: usize) -> Result<String, SummarizeError> {
        let input_ids = self.codec.encode(prompt, true)?;
        let states = self.model.encode_pass(&input_ids)?;
        let output_ids = self
            .decoder
            .generate(self.model.as_ref(), &states, max_new_tokens)?;
        let raw = self.codec.decode(&output_ids, true)?;
        Ok(normalize_output(&raw))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::testing::{FakeCodec, FakeModel};

    fn scripted(words: &[&str], codec: &FakeCodec) -> Vec<u32> {
        words.iter().map(|w| codec.intern(w)).collect()
    }

    #[test]
    fn zero_token_requests_are_rejected() {
        let codec = Arc::new(FakeCodec::new());
        let model = Arc::new(FakeModel::scripted(vec![5]));
        let summarizer = RecursiveSummarizer::new(codec, model);
        assert!(matches!(
            summarizer.summarize("Title", "Body text here", 0),
            Err(SummarizeError::InvalidMaxTokens)
        ));
    }

    #[test]
    fn in_budget_input_runs_a_single_encode_pass() {
        let codec = Arc::new(FakeCodec::new());
        let script = scripted(&["short", "summary."], &codec);
        let model = Arc::new(FakeModel::scripted(script));
        let summarizer =
            RecursiveSummarizer::new(codec, model.clone()).with_token_budget(64);
        let summary = summarizer
            .summarize("Rust", "A short body well under the budget", 16)
            .unwrap();
        assert_eq!(model.encode_passes(), 1);
        assert_eq!(summary, "Short summary.");
    }

    #[test]
    fn over_budget_input_is_segmented_then_resummarized() {
        let codec = Arc::new(FakeCodec::new());
        let script = scripted(&["tiny."], &codec);
        let model = Arc::new(FakeModel::scripted(script));
        // Budget 12, body of four 5-word sentences: two segments of two
        // sentences each, then one final pass over the joined partials.
        let body = (0..4)
            .map(|i| format!("Sentence number {i} is here"))
            .collect::<Vec<_>>()
            .join(". ");
        let summarizer =
            RecursiveSummarizer::new(codec, model.clone()).with_token_budget(12);
        let summary = summarizer.summarize("News", &body, 16).unwrap();
        assert_eq!(model.encode_passes(), 3);
        assert_eq!(summary, "Tiny.");
    }

    #[test]
    fn nested_rounds_carry_the_title_prompt() {
        let codec = Arc::new(FakeCodec::new());
        let script = scripted(&["brief."], &codec);
        let model = Arc::new(FakeModel::scripted(script));
        let body = (0..4)
            .map(|i| format!("Sentence number {i} is here"))
            .collect::<Vec<_>>()
            .join(". ");
        let summarizer =
            RecursiveSummarizer::new(codec.clone(), model.clone()).with_token_budget(12);
        summarizer.summarize("Outage", &body, 16).unwrap();
        let inputs = model.encoded_inputs();
        assert_eq!(inputs.len(), 3);
        for ids in inputs {
            let prompt = codec.decode(&ids, false).unwrap();
            assert!(prompt.starts_with("summarize: Title: Outage, Text:"));
        }
    }

    #[test]
    fn noise_is_cleaned_before_the_budget_check() {
        let codec = Arc::new(FakeCodec::new());
        let script = scripted(&["fine."], &codec);
        let model = Arc::new(FakeModel::scripted(script));
        // Raw split sees nine tokens; cleaning strips the semicolons to
        // five, so no reduction pass runs.
        let body = "Alpha ; beta ; gamma ; delta ; epsilon";
        let summarizer =
            RecursiveSummarizer::new(codec, model.clone()).with_token_budget(8);
        let summary = summarizer.summarize("Noise", body, 16).unwrap();
        assert_eq!(model.encode_passes(), 1);
        assert_eq!(summary, "Fine.");
    }

    #[test]
    fn output_respects_the_token_cap() {
        let codec = Arc::new(FakeCodec::new());
        let script = scripted(
            &["one", "two", "three", "four", "five", "six", "seven"],
            &codec,
        );
        let model = Arc::new(FakeModel::scripted(script));
        let summarizer =
            RecursiveSummarizer::new(codec.clone(), model).with_token_budget(64);
        let summary = summarizer.summarize("Cap", "Body well inside budget", 3).unwrap();
        assert!(codec.count(&summary).unwrap() <= 3);
    }

    #[test]
    fn reduction_falls_back_to_truncation() {
        let codec = Arc::new(FakeCodec::new());
        // The scripted output alone exceeds the budget, so every
        // reduction pass produces over-budget text again.
        let words: Vec<String> = (0..12).map(|i| format!("w{i}")).collect();
        let refs: Vec<&str> = words.iter().map(String::as_str).collect();
        let script = scripted(&refs, &codec);
        let model = Arc::new(FakeModel::scripted(script));
        let body = (0..6)
            .map(|i| format!("Sentence number {i} is right here"))
            .collect::<Vec<_>>()
            .join(". ");
        let summarizer =
            RecursiveSummarizer::new(codec, model.clone()).with_token_budget(16);
        let summary = summarizer.summarize("Loop", &body, 32).unwrap();
        // Three passes of three segments each, then truncation and one
        // final generation round.
        assert!(!summary.is_empty());
        assert_eq!(model.encode_passes(), 10);
    }
}
