//! Contracts the pipeline holds against its external collaborators.

use thiserror::Error;

/// Errors emitted by the subword tokenizer seam.
#[derive(Debug, Error)]
pub enum CodecError {
    /// Tokenizer file could not be loaded.
    #[error("tokenizer load error: {0}")]
    Load(String),
    /// Encoding or decoding a text failed.
    #[error("tokenization error: {0}")]
    Tokenize(String),
}

/// Errors emitted by the sequence-model seam.
#[derive(Debug, Error)]
pub enum ModelError {
    /// Filesystem I/O error while loading model assets.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    /// Model configuration could not be parsed.
    #[error("model config error: {0}")]
    Config(#[from] serde_json::Error),
    /// Tensor computation failed inside the engine.
    #[error("inference error: {0}")]
    Inference(#[from] candle_core::Error),
    /// The engine produced a tensor of unexpected shape.
    #[error("malformed logits tensor: {0}")]
    Shape(String),
}

/// Ordered subword token ids for a text, and back.
pub trait TokenCodec: Send + Sync {
    /// Encodes text into ordered token ids. Chunked encodings are
    /// concatenated into a single sequence.
    fn encode(&self, text: &str, add_special_tokens: bool) -> Result<Vec<u32>, CodecError>;

    /// Decodes token ids back into text.
    fn decode(&self, ids: &[u32], skip_special_tokens: bool) -> Result<String, CodecError>;

    /// Token count of a text as the inference engine would see it.
    fn count(&self, text: &str) -> Result<usize, CodecError> {
        Ok(self.encode(text, true)?.len())
    }
}

/// Two-stage access to a pretrained encoder/decoder sequence model.
pub trait SequenceModel: Send + Sync {
    /// Opaque encoder output consumed by every decode step.
    type States;

    /// Runs the encoder over the full input sequence.
    fn encode_pass(&self, input_ids: &[u32]) -> Result<Self::States, ModelError>;

    /// Runs one decoder step over the current decoder sequence and
    /// returns the logits row for the last position.
    fn decode_step(&self, decoder_ids: &[u32], states: &Self::States)
        -> Result<Vec<f32>, ModelError>;
}
