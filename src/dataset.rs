//! CSV input loading and canonical row formatting.
//!
//! A [`Record`] is one tweet-like input row. [`format_record`] maps it into
//! the fixed template string the embedding model consumes; absent optional
//! fields render as the literal placeholder `N/A`. Row order in the file is
//! preserved end to end — it is the invariant the output matrix is keyed on.

use std::path::Path;

use serde::Deserialize;

use crate::error::PipelineError;

/// Placeholder rendered for absent `keyword`/`location` fields.
const MISSING_FIELD: &str = "N/A";

/// Columns every input file must carry (any column order is accepted).
const REQUIRED_COLUMNS: [&str; 4] = ["id", "keyword", "location", "text"];

/// One input row. `keyword` and `location` may be empty in the CSV, which
/// the csv crate deserializes as `None`.
#[derive(Debug, Clone, Deserialize)]
pub struct Record {
    pub id: i64,
    pub keyword: Option<String>,
    pub location: Option<String>,
    pub text: String,
}

/// Load all records from a CSV file, preserving file order.
///
/// The header row is validated up front: a single [`PipelineError::DataFormat`]
/// lists every missing required column, rather than failing row by row. A row
/// whose `text` field is empty is fatal. Zero data rows is valid.
pub fn load_records(path: &Path) -> Result<Vec<Record>, PipelineError> {
    let mut reader = csv::Reader::from_path(path).map_err(|e| {
        PipelineError::DataFormat(format!("cannot read {}: {e}", path.display()))
    })?;

    let headers = reader
        .headers()
        .map_err(|e| PipelineError::DataFormat(format!("cannot read header row: {e}")))?;

    let missing: Vec<&str> = REQUIRED_COLUMNS
        .iter()
        .filter(|col| !headers.iter().any(|h| h == **col))
        .copied()
        .collect();
    if !missing.is_empty() {
        return Err(PipelineError::DataFormat(format!(
            "missing required column(s): {}",
            missing.join(", ")
        )));
    }

    let mut records = Vec::new();
    for (i, row) in reader.deserialize::<Record>().enumerate() {
        let record =
            row.map_err(|e| PipelineError::DataFormat(format!("row {}: {e}", i + 1)))?;
        if record.text.is_empty() {
            return Err(PipelineError::DataFormat(format!(
                "row {}: text must not be empty",
                i + 1
            )));
        }
        records.push(record);
    }

    Ok(records)
}

/// Format one record into the canonical embedding input string.
pub fn format_record(record: &Record) -> String {
    format!(
        "Tweet ID: {}, Keyword: {}, Location: {}, Text: {}.",
        record.id,
        record.keyword.as_deref().unwrap_or(MISSING_FIELD),
        record.location.as_deref().unwrap_or(MISSING_FIELD),
        record.text,
    )
}

/// Format every record, one string per row, in input order.
pub fn format_all(records: &[Record]) -> Vec<String> {
    records.iter().map(format_record).collect()
}
