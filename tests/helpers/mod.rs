#![allow(dead_code)]

use std::path::{Path, PathBuf};
use std::sync::Mutex;

use anyhow::Result;
use tweet_embed::embedding::EmbeddingProvider;

pub const STUB_DIMS: usize = 8;

/// Deterministic, content-sensitive embedding stub. Distinct strings map to
/// distinct vectors; the same string always maps to the same vector.
pub struct StubProvider;

impl EmbeddingProvider for StubProvider {
    fn embed(&self, text: &str) -> Result<Vec<f32>> {
        let mut v = vec![0.0f32; STUB_DIMS];
        for (i, b) in text.bytes().enumerate() {
            v[i % STUB_DIMS] += b as f32;
        }
        v[STUB_DIMS - 1] += text.len() as f32;
        Ok(v)
    }

    fn dimensions(&self) -> usize {
        STUB_DIMS
    }
}

/// Stub that records the size of every batch it receives.
pub struct RecordingProvider {
    pub batch_sizes: Mutex<Vec<usize>>,
}

impl RecordingProvider {
    pub fn new() -> Self {
        Self {
            batch_sizes: Mutex::new(Vec::new()),
        }
    }
}

impl EmbeddingProvider for RecordingProvider {
    fn embed(&self, text: &str) -> Result<Vec<f32>> {
        StubProvider.embed(text)
    }

    fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>> {
        self.batch_sizes.lock().unwrap().push(texts.len());
        texts.iter().map(|t| self.embed(t)).collect()
    }

    fn dimensions(&self) -> usize {
        STUB_DIMS
    }
}

/// Write a CSV file into `dir` and return its path.
pub fn write_csv(dir: &Path, name: &str, contents: &str) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, contents).unwrap();
    path
}
