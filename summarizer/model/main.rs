//! Seams for the subword tokenizer and the pretrained sequence model.

/// Subword tokenizer backend over a HuggingFace tokenizer file.
pub mod codec;
/// Candle-backed T5 encoder/decoder session.
pub mod session;
/// Collaborator traits and error types.
pub mod traits;

pub use codec::SubwordCodec;
pub use session::T5Session;
pub use traits::{CodecError, ModelError, SequenceModel, TokenCodec};

#[cfg(test)]
pub(crate) mod testing;
