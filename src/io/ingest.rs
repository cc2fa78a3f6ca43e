//! CSV ingest of a standard-curve table.
//!
//! The file needs a header row with `cq` and `sq` columns (any case, any
//! order; other columns are ignored). Design goals:
//! - **Strict schema** for the two required columns (clear errors + exit code 2)
//! - **Host coercion semantics**: a blank or non-numeric cell becomes a missing
//!   value and is reported, so validation rejects the table instead of silently
//!   dropping the row
//! - **Separation of concerns**: no fitting logic here

use std::fs::File;
use std::io::Read;
use std::path::Path;

use csv::StringRecord;
use tracing::{info, warn};

use crate::domain::{Column, StandardCurveDataset, StandardCurvePoint};
use crate::error::{AppError, EXIT_INPUT};

/// A cell that could not be coerced to a number.
#[derive(Debug, Clone, PartialEq)]
pub struct CellNote {
    /// 1-based line in the file (header is line 1).
    pub line: usize,
    pub column: Column,
    pub raw: String,
}

/// Ingest output: the table as entered plus the cells that were coerced to missing.
#[derive(Debug, Clone)]
pub struct IngestedDataset {
    pub dataset: StandardCurveDataset,
    pub notes: Vec<CellNote>,
}

/// Load a standards table from a CSV file.
pub fn load_dataset_csv(path: &Path) -> Result<IngestedDataset, AppError> {
    let file = File::open(path).map_err(|e| {
        AppError::new(
            EXIT_INPUT,
            format!("Failed to open CSV '{}': {e}", path.display()),
        )
    })?;
    let ingested = read_dataset_csv(file)?;
    info!(
        path = %path.display(),
        rows = ingested.dataset.len(),
        missing_cells = ingested.notes.len(),
        "loaded standard curve table"
    );
    Ok(ingested)
}

/// Read a standards table from any CSV source.
pub fn read_dataset_csv<R: Read>(source: R) -> Result<IngestedDataset, AppError> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(source);

    let headers = reader
        .headers()
        .map_err(|e| AppError::new(EXIT_INPUT, format!("Failed to read CSV headers: {e}")))?
        .clone();

    let cq_idx = find_column(&headers, Column::Cq)?;
    let sq_idx = find_column(&headers, Column::Sq)?;

    let mut dataset = StandardCurveDataset::default();
    let mut notes = Vec::new();

    for (idx, result) in reader.records().enumerate() {
        // records() starts after the header on line 2.
        let line = idx + 2;
        let record = result
            .map_err(|e| AppError::new(EXIT_INPUT, format!("CSV parse error on line {line}: {e}")))?;

        if record.iter().all(|cell| cell.is_empty()) {
            continue;
        }

        let cq = coerce(&record, cq_idx, line, Column::Cq, &mut notes);
        let sq = coerce(&record, sq_idx, line, Column::Sq, &mut notes);
        dataset.push(StandardCurvePoint::new(cq, sq));
    }

    Ok(IngestedDataset { dataset, notes })
}

fn find_column(headers: &StringRecord, column: Column) -> Result<usize, AppError> {
    headers
        .iter()
        .position(|h| h.parse::<Column>().ok() == Some(column))
        .ok_or_else(|| {
            AppError::new(
                EXIT_INPUT,
                format!("CSV is missing required column '{}'", column.label().to_lowercase()),
            )
        })
}

fn coerce(record: &StringRecord, idx: usize, line: usize, column: Column, notes: &mut Vec<CellNote>) -> f64 {
    let raw = record.get(idx).unwrap_or("");
    match raw.parse::<f64>() {
        Ok(v) => v,
        Err(_) => {
            warn!(line, %column, raw, "cell is not a number; treating as missing");
            notes.push(CellNote {
                line,
                column,
                raw: raw.to_string(),
            });
            f64::NAN
        }
    }
}
