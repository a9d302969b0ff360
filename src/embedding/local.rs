//! Local ONNX Runtime embedding provider.
//!
//! Runs all-MiniLM-L6-v2 via `ort`: tokenization, batched inference, token
//! pooling (mean or CLS), and L2 normalization. Model files live in the
//! configured cache directory and are fetched with `tweet-embed model
//! download`.

use std::str::FromStr;
use std::sync::Mutex;

use anyhow::{Context, Result};
use ort::session::builder::SessionBuilder;
use ort::session::Session;
use ort::value::Tensor;
use tokenizers::Tokenizer;

use super::{EmbeddingProvider, EMBEDDING_DIM};
use crate::config::EmbeddingConfig;

/// Maximum sequence length for all-MiniLM-L6-v2 (trained at 256).
const MAX_SEQ_LEN: usize = 256;

/// How token embeddings are collapsed into one sentence vector.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pooling {
    /// Attention-masked mean over all tokens (MiniLM convention).
    Mean,
    /// First token only.
    Cls,
}

impl FromStr for Pooling {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "mean" => Ok(Self::Mean),
            "cls" => Ok(Self::Cls),
            other => anyhow::bail!("unknown pooling strategy: {other} (supported: mean, cls)"),
        }
    }
}

/// Local ONNX-based embedding provider.
pub struct LocalEmbeddingProvider {
    session: Mutex<Session>,
    tokenizer: Tokenizer,
    pooling: Pooling,
}

// Safety: Tokenizer is Send+Sync; Session is only touched under the Mutex.
unsafe impl Send for LocalEmbeddingProvider {}
unsafe impl Sync for LocalEmbeddingProvider {}

impl LocalEmbeddingProvider {
    pub fn new(config: &EmbeddingConfig) -> Result<Self> {
        let pooling = config.pooling.parse::<Pooling>()?;

        let cache_dir = crate::config::expand_tilde(&config.cache_dir);
        let model_path = cache_dir.join("model.onnx");
        let tokenizer_path = cache_dir.join("tokenizer.json");

        anyhow::ensure!(
            model_path.exists(),
            "ONNX model not found at {}. Run `tweet-embed model download` first.",
            model_path.display()
        );
        anyhow::ensure!(
            tokenizer_path.exists(),
            "Tokenizer not found at {}. Run `tweet-embed model download` first.",
            tokenizer_path.display()
        );

        let builder = Session::builder()?
            .with_optimization_level(ort::session::builder::GraphOptimizationLevel::Level3)?
            .with_intra_threads(4)?;
        let builder = select_device(builder, &config.device)?;
        let session = builder
            .commit_from_file(&model_path)
            .context("failed to load ONNX model")?;

        tracing::info!(
            model = %config.model,
            path = %model_path.display(),
            device = %config.device,
            pooling = ?pooling,
            "ONNX model loaded"
        );

        let mut tokenizer = Tokenizer::from_file(&tokenizer_path)
            .map_err(|e| anyhow::anyhow!("failed to load tokenizer: {e}"))?;

        tokenizer
            .with_truncation(Some(tokenizers::TruncationParams {
                max_length: MAX_SEQ_LEN,
                ..Default::default()
            }))
            .map_err(|e| anyhow::anyhow!("failed to set truncation: {e}"))?;

        tokenizer.with_padding(Some(tokenizers::PaddingParams {
            strategy: tokenizers::PaddingStrategy::BatchLongest,
            ..Default::default()
        }));

        Ok(Self {
            session: Mutex::new(session),
            tokenizer,
            pooling,
        })
    }
}

/// Apply the configured device policy to the session builder.
///
/// A "cuda" request on a build without the `cuda` feature is not fatal:
/// the provider logs a warning and stays on CPU.
fn select_device(builder: SessionBuilder, device: &str) -> Result<SessionBuilder> {
    match device {
        "cpu" => Ok(builder),
        "cuda" => enable_cuda(builder),
        other => anyhow::bail!("unknown device: {other} (supported: cpu, cuda)"),
    }
}

#[cfg(feature = "cuda")]
fn enable_cuda(builder: SessionBuilder) -> Result<SessionBuilder> {
    let ep = ort::execution_providers::CUDAExecutionProvider::default().build();
    Ok(builder.with_execution_providers([ep])?)
}

#[cfg(not(feature = "cuda"))]
fn enable_cuda(builder: SessionBuilder) -> Result<SessionBuilder> {
    tracing::warn!(
        "device = \"cuda\" requested but this binary was built without the \
         `cuda` feature, falling back to CPU"
    );
    Ok(builder)
}

impl EmbeddingProvider for LocalEmbeddingProvider {
    fn embed(&self, text: &str) -> Result<Vec<f32>> {
        let results = self.embed_batch(&[text])?;
        Ok(results.into_iter().next().expect("batch had one input"))
    }

    fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>> {
        if texts.is_empty() {
            return Ok(vec![]);
        }

        let encodings = self
            .tokenizer
            .encode_batch(texts.to_vec(), true)
            .map_err(|e| anyhow::anyhow!("tokenization failed: {e}"))?;

        let batch_size = encodings.len();
        let seq_len = encodings[0].get_ids().len();

        // Flat i64 tensors, one row per input.
        let mut input_ids = Vec::with_capacity(batch_size * seq_len);
        let mut attention_mask = Vec::with_capacity(batch_size * seq_len);
        for encoding in &encodings {
            input_ids.extend(encoding.get_ids().iter().map(|&id| id as i64));
            attention_mask.extend(encoding.get_attention_mask().iter().map(|&m| m as i64));
        }

        let shape = vec![batch_size as i64, seq_len as i64];
        let input_ids_tensor =
            Tensor::from_array((shape.clone(), input_ids.into_boxed_slice()))?;
        let attention_mask_tensor =
            Tensor::from_array((shape.clone(), attention_mask.clone().into_boxed_slice()))?;
        // token_type_ids: all zeros (single sentence, no segment B)
        let token_type_ids = vec![0i64; batch_size * seq_len];
        let token_type_ids_tensor =
            Tensor::from_array((shape, token_type_ids.into_boxed_slice()))?;

        let mut session = self
            .session
            .lock()
            .map_err(|e| anyhow::anyhow!("session lock poisoned: {e}"))?;

        let outputs = session.run(ort::inputs! {
            "input_ids" => input_ids_tensor,
            "attention_mask" => attention_mask_tensor,
            "token_type_ids" => token_type_ids_tensor,
        })?;

        // Token embeddings, shape [batch, seq, 384]. The output name varies
        // by ONNX export; try common names, fall back to index 0.
        let token_emb_value = outputs
            .get("token_embeddings")
            .or_else(|| outputs.get("last_hidden_state"))
            .unwrap_or_else(|| &outputs[0]);

        let (out_shape, data) = token_emb_value
            .try_extract_tensor::<f32>()
            .context("failed to extract token embeddings tensor")?;

        let dims: &[i64] = &out_shape;
        anyhow::ensure!(
            dims.len() == 3 && dims[2] == EMBEDDING_DIM as i64,
            "unexpected token embeddings shape: {dims:?}, expected [batch, seq, {EMBEDDING_DIM}]"
        );
        let hidden_dim = dims[2] as usize;
        let actual_seq_len = dims[1] as usize;

        let mut results = Vec::with_capacity(batch_size);
        for b in 0..batch_size {
            let pooled = match self.pooling {
                Pooling::Mean => mean_pool(
                    data,
                    &attention_mask[b * seq_len..(b + 1) * seq_len],
                    b,
                    actual_seq_len,
                    hidden_dim,
                ),
                Pooling::Cls => {
                    let offset = b * actual_seq_len * hidden_dim;
                    data[offset..offset + hidden_dim].to_vec()
                }
            };
            results.push(l2_normalize(&pooled));
        }

        Ok(results)
    }
}

/// Attention-masked mean over the token axis for batch item `b`.
fn mean_pool(
    data: &[f32],
    mask: &[i64],
    b: usize,
    seq_len: usize,
    hidden_dim: usize,
) -> Vec<f32> {
    let mut sum = vec![0.0f32; hidden_dim];
    let mut count = 0.0f32;

    for (s, &m) in mask.iter().enumerate().take(seq_len) {
        if m > 0 {
            let offset = (b * seq_len + s) * hidden_dim;
            for (acc, &x) in sum.iter_mut().zip(&data[offset..offset + hidden_dim]) {
                *acc += x;
            }
            count += 1.0;
        }
    }

    if count > 0.0 {
        for x in &mut sum {
            *x /= count;
        }
    }
    sum
}

/// L2-normalize a vector. Returns the input unchanged if its norm is zero.
fn l2_normalize(v: &[f32]) -> Vec<f32> {
    let norm: f32 = v.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm > 0.0 {
        v.iter().map(|x| x / norm).collect()
    } else {
        v.to_vec()
    }
}
