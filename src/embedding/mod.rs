//! Text-to-vector embedding.
//!
//! [`EmbeddingProvider`] is the seam between the pipeline and whatever model
//! backs it. The only built-in implementation is
//! [`local::LocalEmbeddingProvider`], which runs all-MiniLM-L6-v2 through
//! ONNX Runtime. A provider is constructed once at startup via
//! [`create_provider`] and passed by reference into the encoder; nothing in
//! this crate holds model state globally.

pub mod local;

use anyhow::Result;

use crate::config::EmbeddingConfig;
use crate::error::PipelineError;

/// Dimensionality of the vectors produced (all-MiniLM-L6-v2).
pub const EMBEDDING_DIM: usize = 384;

/// Trait for embedding text into fixed-length vectors.
///
/// All methods are synchronous and called sequentially by the encoder;
/// implementations must still be `Send + Sync` so a provider can be shared
/// across threads if a caller wants to.
pub trait EmbeddingProvider: Send + Sync {
    /// Embed a single text string into a vector.
    fn embed(&self, text: &str) -> Result<Vec<f32>>;

    /// Embed a batch of text strings. Implementations may override for
    /// batched inference; the default embeds one at a time.
    fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>> {
        texts.iter().map(|t| self.embed(t)).collect()
    }

    /// Number of dimensions this provider produces.
    fn dimensions(&self) -> usize {
        EMBEDDING_DIM
    }
}

/// Create an embedding provider from config.
///
/// Currently only `"local"` is supported. Initialization failures (missing
/// weights or tokenizer, bad pooling/device setting, session build errors)
/// surface as [`PipelineError::ModelLoad`].
pub fn create_provider(
    config: &EmbeddingConfig,
) -> Result<Box<dyn EmbeddingProvider>, PipelineError> {
    match config.provider.as_str() {
        "local" => {
            let provider =
                local::LocalEmbeddingProvider::new(config).map_err(PipelineError::ModelLoad)?;
            Ok(Box::new(provider))
        }
        other => Err(PipelineError::ModelLoad(anyhow::anyhow!(
            "unknown embedding provider: {other}. Supported: local"
        ))),
    }
}
