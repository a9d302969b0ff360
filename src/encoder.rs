//! Batched embedding of formatted strings and `.npy` persistence.
//!
//! [`Encoder`] partitions its input into contiguous batches, invokes the
//! provider once per batch in order, and assembles one `[rows, dims]` matrix
//! where row *i* always corresponds to input string *i*. An empty input
//! string is never sent to the model; its row is left as an all-zero
//! placeholder so the row correspondence holds unconditionally.

use std::num::NonZeroUsize;
use std::path::Path;

use anyhow::anyhow;
use ndarray::Array2;
use tracing::{debug, warn};

use crate::embedding::EmbeddingProvider;
use crate::error::PipelineError;

/// Batched encoder over a borrowed embedding provider.
///
/// The provider is constructed once at startup and passed in by reference;
/// the encoder itself holds no model state.
pub struct Encoder<'a> {
    provider: &'a dyn EmbeddingProvider,
    batch_size: NonZeroUsize,
}

impl<'a> Encoder<'a> {
    pub fn new(provider: &'a dyn EmbeddingProvider, batch_size: NonZeroUsize) -> Self {
        Self {
            provider,
            batch_size,
        }
    }

    /// Encode all strings into a `[strings.len(), dims]` matrix.
    pub fn encode(&self, strings: &[String]) -> Result<Array2<f32>, PipelineError> {
        self.encode_with(strings, |_| {})
    }

    /// Like [`Self::encode`], invoking `on_batch(rows)` after each batch
    /// completes. Used by the CLI to drive a progress bar.
    pub fn encode_with(
        &self,
        strings: &[String],
        mut on_batch: impl FnMut(usize),
    ) -> Result<Array2<f32>, PipelineError> {
        let dim = self.provider.dimensions();
        let mut matrix = Array2::<f32>::zeros((strings.len(), dim));

        for (chunk_index, chunk) in strings.chunks(self.batch_size.get()).enumerate() {
            let base = chunk_index * self.batch_size.get();

            // Split out empty strings; their rows stay zero.
            let mut batch = Vec::with_capacity(chunk.len());
            let mut rows = Vec::with_capacity(chunk.len());
            for (offset, s) in chunk.iter().enumerate() {
                if s.is_empty() {
                    warn!(row = base + offset, "empty input string, writing zero placeholder vector");
                } else {
                    batch.push(s.as_str());
                    rows.push(base + offset);
                }
            }

            let vectors = self
                .provider
                .embed_batch(&batch)
                .map_err(PipelineError::Encoding)?;
            if vectors.len() != batch.len() {
                return Err(PipelineError::Encoding(anyhow!(
                    "provider returned {} vectors for a batch of {}",
                    vectors.len(),
                    batch.len()
                )));
            }

            for (row, vector) in rows.into_iter().zip(vectors) {
                if vector.len() != dim {
                    return Err(PipelineError::Encoding(anyhow!(
                        "provider returned {} dims, expected {dim}",
                        vector.len()
                    )));
                }
                matrix.row_mut(row).assign(&ndarray::aview1(&vector));
            }

            debug!(batch = chunk_index, rows = chunk.len(), "batch encoded");
            on_batch(chunk.len());
        }

        Ok(matrix)
    }
}

/// Write the matrix to `path` as a `.npy` file.
///
/// The parent directory is created if absent, and the write goes through a
/// temp file plus rename so a failed run never leaves a partial artifact.
/// An existing file at `path` is overwritten.
pub fn write_matrix(matrix: &Array2<f32>, path: &Path) -> Result<(), PipelineError> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }

    let tmp_path = path.with_extension("npy.tmp");
    ndarray_npy::write_npy(&tmp_path, matrix)
        .map_err(|e| PipelineError::Io(std::io::Error::other(e)))?;
    std::fs::rename(&tmp_path, path)?;
    Ok(())
}
