//! Step-wise autoregressive generation against the sequence model.

use rand::{seq::SliceRandom, Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use crate::model::{ModelError, SequenceModel};

use super::{EOS_TOKEN_ID, PAD_TOKEN_ID};

/// Logit floor below which near-tied candidates are not considered.
pub const TOKEN_SCORE_FLOOR: f32 = -1.0;

/// Next-token selection policy.
///
/// Keeps an ordered bucket of the `top_k` highest-scoring candidate ids;
/// bucket entries scoring below `score_floor` collapse onto the top
/// candidate, the bucket is shuffled, and its first entry wins. With the
/// default `top_k` of 1 this is deterministic greedy argmax; larger
/// values sample uniformly among near-tied candidates.
#[derive(Debug, Clone, Copy)]
pub struct DecodingStrategy {
    /// Bucket size for near-tied candidates.
    pub top_k: usize,
    /// Minimum logit for a non-top candidate to stay in the bucket.
    pub score_floor: f32,
}

impl Default for DecodingStrategy {
    fn default() -> Self {
        Self {
            top_k: 1,
            score_floor: TOKEN_SCORE_FLOOR,
        }
    }
}

impl DecodingStrategy {
    /// Selects the next token id from a logits row.
    pub fn select<R: Rng>(&self, logits: &[f32], rng: &mut R) -> u32 {
        let bucket = self.top_k.max(1);
        let mut scores = vec![f32::NEG_INFINITY; bucket];
        let mut ids = vec![0u32; bucket];
        for (id, &score) in logits.iter().enumerate() {
            for slot in 0..bucket {
                if score > scores[slot] {
                    scores[slot..].rotate_right(1);
                    ids[slot..].rotate_right(1);
                    scores[slot] = score;
                    #[allow(clippy::cast_possible_truncation)]
                    {
                        ids[slot] = id as u32;
                    }
                    break;
                }
            }
        }
        for slot in 1..bucket {
            if scores[slot] < self.score_floor {
                ids[slot] = ids[0];
            }
        }
        ids.shuffle(rng);
        ids[0]
    }
}

/// Drives the step-wise generation loop to an end-of-sequence token or
/// the step cap, whichever comes first.
#[derive(Debug, Clone, Copy, Default)]
pub struct AutoregressiveDecoder {
    strategy: DecodingStrategy,
}

impl AutoregressiveDecoder {
    /// Creates a decoder with the given selection strategy.
    #[must_use]
    pub const fn new(strategy: DecodingStrategy) -> Self {
        Self { strategy }
    }

    /// Generates up to `max_new_tokens` ids, consulting only the last
    /// logits row each step. The returned ids exclude the start
    /// sentinel.
    pub fn generate<M: SequenceModel>(
        &self,
        model: &M,
        states: &M::States,
        max_new_tokens: usize,
    ) -> Result<Vec<u32>, ModelError> {
        let mut rng = ChaCha8Rng::from_entropy();
        self.generate_with_rng(model, states, max_new_tokens, &mut rng)
    }

    /// As [`Self::generate`], with a caller-supplied rng for
    /// reproducible tie-breaking.
    pub fn generate_with_rng<M: SequenceModel, R: Rng>(
        &self,
        model: &M,
        states: &M::States,
        max_new_tokens: usize,
        rng: &mut R,
    ) -> Result<Vec<u32>, ModelError> {
        let mut ids = vec![PAD_TOKEN_ID];
        for _ in 0..max_new_tokens {
            let row = model.decode_step(&ids, states)?;
            let next = self.strategy.select(&row, rng);
            ids.push(next);
            if next == EOS_TOKEN_ID {
                break;
            }
        }
        ids.remove(0);
        Ok(ids)
    }
}
