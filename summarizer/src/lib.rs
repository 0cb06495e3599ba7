#![deny(
    clippy::all,
    clippy::pedantic,
    clippy::nursery,
    missing_docs,
    rust_2018_idioms
)]

//! Bounded-length abstractive summarization pipeline for scraped articles,
//! plus an extractive sentence scorer and budget-constrained selector.

/// Recursive summarization engine, token-budget segmenter, and decoder.
#[path = "../abstractive/main.rs"]
pub mod abstractive;

/// Concurrent multi-article summarization controller.
#[path = "../batch.rs"]
pub mod batch;

/// Console command ingestion.
#[path = "../consolecmdreciever.rs"]
pub mod console;

/// Sentence scoring, lexical resources, and stratified selection.
#[path = "../extractive/main.rs"]
pub mod extractive;

/// Tokenizer and sequence-model seams with their candle/tokenizers backends.
#[path = "../model/main.rs"]
pub mod model;

/// Input cleaning and generated-text normalization.
#[path = "../normalize.rs"]
pub mod normalize;

/// Runtime entrypoints and orchestration helpers.
#[path = "../main.rs"]
pub mod orchestration_entry;

/// Telemetry helpers.
#[path = "../telemetry.rs"]
pub mod telemetry;

pub use abstractive::{
    AutoregressiveDecoder, DecodingStrategy, RecursiveSummarizer, SegmentReport, SummarizeError,
    TokenBudgetSegmenter, EOS_TOKEN_ID, PAD_TOKEN_ID, TOKEN_BUDGET,
};
pub use batch::{BatchSummarizer, GistRequest, GistResponse};
pub use console::ConsoleCommand;
pub use extractive::{score_sentences, Lexicon, ScoredSentence, StratifiedSelector};
pub use model::{CodecError, ModelError, SequenceModel, SubwordCodec, T5Session, TokenCodec};
pub use normalize::{clean_input, normalize_output, sentence_similarity, DedupPolicy};
pub use orchestration_entry::{RuntimePaths, SummarizerRuntime};
pub use telemetry::{SummarizerTelemetry, SummarizerTelemetryBuilder};
