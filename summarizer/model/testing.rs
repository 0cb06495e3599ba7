//! Shared test doubles for the tokenizer and sequence-model seams.

use std::collections::HashMap;

use parking_lot::Mutex;

use super::traits::{CodecError, ModelError, SequenceModel, TokenCodec};

/// Word-level codec: one whitespace word is one token, ids are interned
/// starting after the sentinel range.
pub struct FakeCodec {
    words_to_ids: Mutex<HashMap<String, u32>>,
    ids_to_words: Mutex<HashMap<u32, String>>,
}

impl FakeCodec {
    pub fn new() -> Self {
        Self {
            words_to_ids: Mutex::new(HashMap::new()),
            ids_to_words: Mutex::new(HashMap::new()),
        }
    }

    pub fn intern(&self, word: &str) -> u32 {
        let mut forward = self.words_to_ids.lock();
        if let Some(&id) = forward.get(word) {
            return id;
        }
        let id = u32::try_from(forward.len()).unwrap() + 2;
        forward.insert(word.to_string(), id);
        self.ids_to_words.lock().insert(id, word.to_string());
        id
    }
}

impl TokenCodec for FakeCodec {
    fn encode(&self, text: &str, _add_special_tokens: bool) -> Result<Vec<u32>, CodecError> {
        Ok(text.split_whitespace().map(|w| self.intern(w)).collect())
    }

    fn decode(&self, ids: &[u32], skip_special_tokens: bool) -> Result<String, CodecError> {
        let words = self.ids_to_words.lock();
        let decoded: Vec<String> = ids
            .iter()
            .filter(|id| !(skip_special_tokens && **id < 2))
            .map(|id| words.get(id).cloned().unwrap_or_else(|| "<unk>".into()))
            .collect();
        Ok(decoded.join(" "))
    }
}

/// Model that replays a scripted token sequence regardless of input.
/// Step `n` yields a logits row whose argmax is `script[n]`; once the
/// script is exhausted it yields the end-of-sequence id.
pub struct FakeModel {
    script: Vec<u32>,
    vocab_size: usize,
    inputs: Mutex<Vec<Vec<u32>>>,
}

impl FakeModel {
    pub fn scripted(script: Vec<u32>) -> Self {
        let vocab_size = script.iter().max().copied().unwrap_or(1) as usize + 2;
        Self {
            script,
            vocab_size,
            inputs: Mutex::new(Vec::new()),
        }
    }

    /// Number of encode passes run so far.
    pub fn encode_passes(&self) -> usize {
        self.inputs.lock().len()
    }

    /// Input id sequences seen by the encoder, in call order.
    pub fn encoded_inputs(&self) -> Vec<Vec<u32>> {
        self.inputs.lock().clone()
    }
}

impl SequenceModel for FakeModel {
    type States = ();

    fn encode_pass(&self, input_ids: &[u32]) -> Result<Self::States, ModelError> {
        self.inputs.lock().push(input_ids.to_vec());
        Ok(())
    }

    fn decode_step(
        &self,
        decoder_ids: &[u32],
        _states: &Self::States,
    ) -> Result<Vec<f32>, ModelError> {
        let step = decoder_ids.len() - 1;
        let chosen = self.script.get(step).copied().unwrap_or(1);
        let mut row = vec![0.0f32; self.vocab_size];
        row[chosen as usize] = 5.0;
        Ok(row)
    }
}
