//! Export per-standard results to CSV.
//!
//! The export is meant to be easy to consume in spreadsheets or downstream scripts.

use std::fs::File;
use std::io::Write;
use std::path::Path;

use tracing::info;

use crate::domain::PointResidual;
use crate::error::{AppError, EXIT_INPUT};

/// Write per-standard results to a CSV file.
pub fn write_results_csv(path: &Path, residuals: &[PointResidual]) -> Result<(), AppError> {
    let file = File::create(path).map_err(|e| {
        AppError::new(
            EXIT_INPUT,
            format!("Failed to create export CSV '{}': {e}", path.display()),
        )
    })?;
    write_results(file, residuals)?;
    info!(path = %path.display(), rows = residuals.len(), "wrote per-standard results");
    Ok(())
}

/// Write per-standard results as CSV to any sink.
///
/// Columns: `row,cq,sq,log10_sq,cq_fit,residual`.
pub fn write_results<W: Write>(sink: W, residuals: &[PointResidual]) -> Result<(), AppError> {
    let mut writer = csv::Writer::from_writer(sink);
    for r in residuals {
        writer
            .serialize(r)
            .map_err(|e| AppError::new(EXIT_INPUT, format!("Failed to write export CSV row: {e}")))?;
    }
    writer
        .flush()
        .map_err(|e| AppError::new(EXIT_INPUT, format!("Failed to flush export CSV: {e}")))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn header_and_rows_follow_field_order() {
        let rows = [PointResidual {
            row: 1,
            cq: 22.9,
            sq: 1e-5,
            log10_sq: -5.0,
            cq_fit: 23.33,
            residual: -0.43,
        }];
        let mut buf = Vec::new();
        write_results(&mut buf, &rows).unwrap();
        let txt = String::from_utf8(buf).unwrap();
        let mut lines = txt.lines();
        assert_eq!(lines.next(), Some("row,cq,sq,log10_sq,cq_fit,residual"));
        let values: Vec<f64> = lines
            .next()
            .unwrap()
            .split(',')
            .map(|v| v.parse().unwrap())
            .collect();
        assert_eq!(values, vec![1.0, 22.9, 1e-5, -5.0, 23.33, -0.43]);
    }
}
