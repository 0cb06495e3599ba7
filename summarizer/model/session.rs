//! Candle-backed T5 encoder/decoder session.

use std::{fs, path::Path};

use candle_core::{DType, Device, Tensor};
use candle_nn::VarBuilder;
use candle_transformers::models::t5::{self, T5ForConditionalGeneration};
use parking_lot::Mutex;

use super::traits::{ModelError, SequenceModel};

/// Pretrained T5 session loaded once at startup and shared across calls.
///
/// The candle model keeps a mutable KV cache, so invocations are
/// serialized behind a mutex; the cache is cleared before every pass so
/// each call consults the full decoder sequence it is handed.
pub struct T5Session {
    model: Mutex<T5ForConditionalGeneration>,
    device: Device,
}

impl T5Session {
    /// Loads model weights (safetensors) and configuration from a model
    /// directory containing `model.safetensors` and `config.json`.
    pub fn load(model_dir: impl AsRef<Path>) -> Result<Self, ModelError> {
        let model_dir = model_dir.as_ref();
        let config: t5::Config =
            serde_json::from_str(&fs::read_to_string(model_dir.join("config.json"))?)?;
        let device = Self::pick_device();
        let vb = unsafe {
            VarBuilder::from_mmaped_safetensors(
                &[model_dir.join("model.safetensors")],
                DType::F32,
                &device,
            )?
        };
        let model = T5ForConditionalGeneration::load(vb, &config)?;
        Ok(Self {
            model: Mutex::new(model),
            device,
        })
    }

    fn pick_device() -> Device {
        #[cfg(target_os = "macos")]
        {
            Device::new_metal(0).unwrap_or(Device::Cpu)
        }
        #[cfg(not(target_os = "macos"))]
        {
            Device::Cpu
        }
    }
}

impl SequenceModel for T5Session {
    type States = Tensor;

    fn encode_pass(&self, input_ids: &[u32]) -> Result<Self::States, ModelError> {
        let input = Tensor::new(input_ids, &self.device)?.unsqueeze(0)?;
        let mut model = self.model.lock();
        model.clear_kv_cache();
        Ok(model.encode(&input)?)
    }

    fn decode_step(
        &self,
        decoder_ids: &[u32],
        states: &Self::States,
    ) -> Result<Vec<f32>, ModelError> {
        let decoder_input = Tensor::new(decoder_ids, &self.device)?.unsqueeze(0)?;
        let mut model = self.model.lock();
        model.clear_kv_cache();
        let logits = model.decode(&decoder_input, states)?.squeeze(0)?;
        let row = match logits.rank() {
            1 => logits,
            // Some exports emit one row per decoder position; only the
            // last position is consulted.
            2 => logits.get(logits.dim(0)? - 1)?,
            rank => return Err(ModelError::Shape(format!("unexpected logits rank {rank}"))),
        };
        Ok(row.to_dtype(DType::F32)?.to_vec1::<f32>()?)
    }
}
