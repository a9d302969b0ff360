//! Batch embedding pipeline for tweet-like CSV datasets.
//!
//! Reads a CSV of records (`id`, `keyword`, `location`, `text`), formats each
//! row into one canonical string, embeds every string with a local
//! all-MiniLM-L6-v2 model via ONNX Runtime, and writes the ordered embedding
//! matrix to a `.npy` file for downstream similarity search or classification.
//!
//! The pipeline is a single pass: row order in the input file is the row
//! order of the output matrix, and either the full matrix is written or
//! nothing is.
//!
//! # Modules
//!
//! - [`config`] — Configuration loading from TOML files and environment variables
//! - [`dataset`] — CSV loading, schema validation, and canonical row formatting
//! - [`embedding`] — The provider trait and the local ONNX Runtime implementation
//! - [`encoder`] — Batched embedding and `.npy` persistence
//! - [`error`] — The pipeline error taxonomy

pub mod config;
pub mod dataset;
pub mod embedding;
pub mod encoder;
pub mod error;
