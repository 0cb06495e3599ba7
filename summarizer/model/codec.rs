//! Subword tokenizer backed by a HuggingFace `tokenizer.json` file.

use std::path::Path;

use tokenizers::Tokenizer;

use super::traits::{CodecError, TokenCodec};

/// Pretrained subword tokenizer shared read-only across calls.
pub struct SubwordCodec {
    inner: Tokenizer,
}

impl SubwordCodec {
    /// Loads the tokenizer from a `tokenizer.json` file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, CodecError> {
        let inner = Tokenizer::from_file(path.as_ref())
            .map_err(|err| CodecError::Load(err.to_string()))?;
        Ok(Self { inner })
    }
}

impl TokenCodec for SubwordCodec {
    fn encode(&self, text: &str, add_special_tokens: bool) -> Result<Vec<u32>, CodecError> {
        let encoding = self
            .inner
            .encode(text, add_special_tokens)
            .map_err(|err| CodecError::Tokenize(err.to_string()))?;
        let mut ids: Vec<u32> = encoding.get_ids().to_vec();
        // Long inputs may overflow into extra chunks; callers expect one
        // contiguous id sequence.
        for chunk in encoding.get_overflowing() {
            ids.extend_from_slice(chunk.get_ids());
        }
        Ok(ids)
    }

    fn decode(&self, ids: &[u32], skip_special_tokens: bool) -> Result<String, CodecError> {
        self.inner
            .decode(ids, skip_special_tokens)
            .map_err(|err| CodecError::Tokenize(err.to_string()))
    }
}
