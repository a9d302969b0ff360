//! The `encode` command: tweet CSV in, `.npy` embedding matrix out.

use std::num::NonZeroUsize;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use indicatif::{ProgressBar, ProgressStyle};
use tracing::info;

use crate::config::PipelineConfig;
use crate::dataset;
use crate::embedding;
use crate::encoder::{self, Encoder};

/// Run the full pipeline: load, validate, format, embed, persist.
///
/// `output` and `batch_size` override their config counterparts when given.
pub fn run(
    config: &PipelineConfig,
    csv_path: &Path,
    output: Option<PathBuf>,
    batch_size: Option<usize>,
) -> Result<()> {
    let batch_size = batch_size.unwrap_or(config.encoder.batch_size);
    let batch_size =
        NonZeroUsize::new(batch_size).context("batch size must be a positive integer")?;
    let output = output.unwrap_or_else(|| PathBuf::from(&config.encoder.output_path));

    // All input validation happens before the model is touched.
    let records = dataset::load_records(csv_path)?;
    info!(rows = records.len(), path = %csv_path.display(), "input records loaded");
    let strings = dataset::format_all(&records);

    let provider = embedding::create_provider(&config.embedding)?;
    let encoder = Encoder::new(provider.as_ref(), batch_size);

    let pb = ProgressBar::new(strings.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("  {bar:40.cyan/blue} {pos}/{len} rows ({eta})")
            .expect("valid template")
            .progress_chars("##-"),
    );
    let matrix = encoder.encode_with(&strings, |rows| pb.inc(rows as u64))?;
    pb.finish_and_clear();

    encoder::write_matrix(&matrix, &output)?;

    println!("Encoding complete.");
    println!(
        "Encoded {} rows ({} dims) to {}",
        matrix.nrows(),
        matrix.ncols(),
        output.display()
    );
    Ok(())
}
