//! Recursive abstractive summarization under a fixed token budget.

/// Step-wise generation loop and next-token selection policy.
pub mod decoder;
/// Recursive summarization engine.
pub mod engine;
/// Sentence-aligned segmentation of over-budget text.
pub mod segmenter;

pub use decoder::{AutoregressiveDecoder, DecodingStrategy};
pub use engine::{RecursiveSummarizer, SummarizeError};
pub use segmenter::{Segment, SegmentReport, TokenBudgetSegmenter};

/// Start-of-sequence sentinel id (T5 starts decoding from `<pad>`).
pub const PAD_TOKEN_ID: u32 = 0;
/// End-of-sequence sentinel id (`</s>`).
pub const EOS_TOKEN_ID: u32 = 1;
/// Maximum subword-token count the inference engine accepts per call.
pub const TOKEN_BUDGET: usize = 512;
