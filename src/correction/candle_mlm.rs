//! BERT-style masked LM backend using candle.
//!
//! Resolves `config.json`, `tokenizer.json` and `model.safetensors` either from
//! a local directory or from the HuggingFace Hub (downloaded on first use, then
//! served from the hub cache).

use crate::correction::backend::{Encoding, Logits, MaskedBatch, ScoringBackend, TokenBatch};
use crate::error::{Result, VoxfixError};

use candle_core::{Device, Tensor};
use candle_nn::VarBuilder;
use candle_transformers::models::bert::{BertForMaskedLM, Config as BertConfig, DTYPE};
use hf_hub::api::sync::Api;
use std::path::{Path, PathBuf};
use tokenizers::Tokenizer;

const CONFIG_FILENAME: &str = "config.json";
const TOKENIZER_FILENAME: &str = "tokenizer.json";
const WEIGHTS_FILENAME: &str = "model.safetensors";

/// Masked LM backed by `BertForMaskedLM` on the CPU.
pub struct CandleMaskedLm {
    model: BertForMaskedLM,
    tokenizer: Tokenizer,
    device: Device,
    mask_id: u32,
    pad_id: u32,
    model_name: String,
}

struct ModelFiles {
    config: PathBuf,
    tokenizer: PathBuf,
    weights: PathBuf,
}

fn unavailable(context: &str, e: impl std::fmt::Display) -> VoxfixError {
    VoxfixError::BackendUnavailable {
        message: format!("{context}: {e}"),
    }
}

fn inference(context: &'static str) -> impl FnOnce(candle_core::Error) -> VoxfixError {
    move |e| VoxfixError::Inference {
        message: format!("{context}: {e}"),
    }
}

fn resolve_files(model: &str) -> Result<ModelFiles> {
    let local = Path::new(model);
    if local.is_dir() {
        tracing::info!(path = %local.display(), "loading masked LM from local directory");
        return Ok(ModelFiles {
            config: local.join(CONFIG_FILENAME),
            tokenizer: local.join(TOKENIZER_FILENAME),
            weights: local.join(WEIGHTS_FILENAME),
        });
    }

    tracing::info!(repo = model, "resolving masked LM from HuggingFace Hub");
    let api = Api::new().map_err(|e| unavailable("HF Hub API init", e))?;
    let repo = api.model(model.to_string());
    let fetch = |name: &str| {
        repo.get(name)
            .map_err(|e| unavailable(&format!("Download {name} from {model}"), e))
    };
    Ok(ModelFiles {
        config: fetch(CONFIG_FILENAME)?,
        tokenizer: fetch(TOKENIZER_FILENAME)?,
        weights: fetch(WEIGHTS_FILENAME)?,
    })
}

impl CandleMaskedLm {
    /// Load model, config and tokenizer for `model` (hub repo id or directory).
    ///
    /// Every failure here is reported as [`VoxfixError::BackendUnavailable`].
    pub fn load(model: &str) -> Result<Self> {
        let device = Device::Cpu;
        let files = resolve_files(model)?;

        let config_bytes = std::fs::read(&files.config)
            .map_err(|e| unavailable(&format!("Read config {}", files.config.display()), e))?;
        let config: BertConfig =
            serde_json::from_slice(&config_bytes).map_err(|e| unavailable("Parse BERT config", e))?;

        // SAFETY: the weights file is only read, and the hub cache is not
        // modified while the process runs.
        let vb = unsafe {
            VarBuilder::from_mmaped_safetensors(&[files.weights.as_path()], DTYPE, &device)
        }
        .map_err(|e| unavailable(&format!("Map weights {}", files.weights.display()), e))?;
        let model_impl =
            BertForMaskedLM::load(vb, &config).map_err(|e| unavailable("Init BERT model", e))?;

        let tokenizer = Tokenizer::from_file(&files.tokenizer).map_err(|e| {
            unavailable(&format!("Load tokenizer {}", files.tokenizer.display()), e)
        })?;
        let mask_id = tokenizer
            .token_to_id("[MASK]")
            .ok_or_else(|| unavailable("Tokenizer", "no [MASK] token"))?;
        let pad_id = tokenizer.token_to_id("[PAD]").unwrap_or(0);

        tracing::info!(model, mask_id, pad_id, "masked LM ready");
        Ok(Self {
            model: model_impl,
            tokenizer,
            device,
            mask_id,
            pad_id,
            model_name: model.to_string(),
        })
    }

    fn run(&self, batch: &TokenBatch) -> Result<Tensor> {
        let shape = (batch.rows, batch.seq_len);
        let input_ids = Tensor::from_vec(batch.input_ids.clone(), shape, &self.device)
            .map_err(inference("Create input tensor"))?;
        let attention_mask = Tensor::from_vec(batch.attention_mask.clone(), shape, &self.device)
            .map_err(inference("Create attention mask"))?;
        let token_type_ids = input_ids
            .zeros_like()
            .map_err(inference("Create token type ids"))?;

        self.model
            .forward(&input_ids, &token_type_ids, Some(&attention_mask))
            .map_err(inference("Forward pass"))
    }
}

impl ScoringBackend for CandleMaskedLm {
    fn tokenize(&self, text: &str, max_length: usize) -> Result<Encoding> {
        let encoded = self
            .tokenizer
            .encode(text, true)
            .map_err(|e| VoxfixError::Tokenization {
                message: e.to_string(),
            })?;

        let mut ids = encoded.get_ids().to_vec();
        if ids.len() > max_length {
            // Keep the closing boundary token.
            let last = ids.last().copied().unwrap_or(self.pad_id);
            ids.truncate(max_length.saturating_sub(1));
            ids.push(last);
        }

        let mut attention_mask = vec![1; ids.len()];
        ids.resize(max_length, self.pad_id);
        attention_mask.resize(max_length, 0);
        Ok(Encoding {
            ids,
            attention_mask,
        })
    }

    fn forward(&self, batch: &TokenBatch) -> Result<Logits> {
        let logits = self.run(batch)?;
        let (rows, seq_len, vocab) = logits.dims3().map_err(inference("Logits shape"))?;
        let data = logits
            .flatten_all()
            .and_then(|t| t.to_vec1::<f32>())
            .map_err(inference("Read logits"))?;
        Logits::new(rows, seq_len, vocab, data)
    }

    fn masked_logits(&self, batch: &MaskedBatch) -> Result<Vec<Vec<f32>>> {
        let logits = self.run(&batch.tokens)?;
        let rows = batch
            .positions
            .iter()
            .enumerate()
            .map(|(row, &pos)| logits.get(row).and_then(|r| r.get(pos)))
            .collect::<candle_core::Result<Vec<Tensor>>>()
            .map_err(inference("Gather masked positions"))?;
        Tensor::stack(&rows, 0)
            .and_then(|t| t.to_vec2::<f32>())
            .map_err(inference("Read masked logits"))
    }

    fn mask_token_id(&self) -> u32 {
        self.mask_id
    }

    fn name(&self) -> &str {
        &self.model_name
    }
}
