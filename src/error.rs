//! Pipeline error taxonomy.
//!
//! There is no local recovery anywhere in the pipeline: every variant
//! propagates up to `main`, which prints a diagnostic to stderr and exits
//! non-zero. Bad CLI invocations never reach this type — clap handles them.

use thiserror::Error;

/// An error that aborts a pipeline run.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// The input CSV is malformed: missing required columns, an unparsable
    /// row, or a row with an empty `text` field.
    #[error("invalid input data: {0}")]
    DataFormat(String),

    /// The embedding model could not be initialized (missing weights or
    /// tokenizer, session build failure, bad provider/device config).
    #[error("failed to load embedding model: {0}")]
    ModelLoad(#[source] anyhow::Error),

    /// A batch inference call failed mid-run.
    #[error("embedding inference failed: {0}")]
    Encoding(#[source] anyhow::Error),

    /// Filesystem failure reading input or writing the output matrix.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
