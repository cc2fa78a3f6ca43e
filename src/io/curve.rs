//! Read/write curve JSON files.
//!
//! Curve JSON is the "portable" representation of a fitted standard curve:
//! - the standards it was fitted on
//! - slope, intercept, R², efficiency and warnings
//!
//! The schema is defined by `domain::CurveFile`.

use std::fs::File;
use std::path::Path;

use tracing::info;

use crate::domain::{CurveFile, FittedCurve, StandardCurveDataset};
use crate::error::{AppError, EXIT_INPUT};

/// Write a curve JSON file.
pub fn write_curve_json(path: &Path, dataset: &StandardCurveDataset, curve: &FittedCurve) -> Result<(), AppError> {
    let file = File::create(path).map_err(|e| {
        AppError::new(
            EXIT_INPUT,
            format!("Failed to create curve JSON '{}': {e}", path.display()),
        )
    })?;

    let doc = CurveFile {
        tool: "qpcr".to_string(),
        points: dataset.clone(),
        curve: curve.clone(),
    };

    serde_json::to_writer_pretty(file, &doc)
        .map_err(|e| AppError::new(EXIT_INPUT, format!("Failed to write curve JSON: {e}")))?;

    info!(path = %path.display(), "wrote curve JSON");
    Ok(())
}

/// Read a curve JSON file.
pub fn read_curve_json(path: &Path) -> Result<CurveFile, AppError> {
    let file = File::open(path).map_err(|e| {
        AppError::new(
            EXIT_INPUT,
            format!("Failed to open curve JSON '{}': {e}", path.display()),
        )
    })?;
    let curve: CurveFile = serde_json::from_reader(file)
        .map_err(|e| AppError::new(EXIT_INPUT, format!("Invalid curve JSON: {e}")))?;

    if curve.points.len() != curve.curve.n_points() {
        return Err(AppError::new(
            EXIT_INPUT,
            format!(
                "Invalid curve JSON: {} points but {} log10(SQ) values",
                curve.points.len(),
                curve.curve.n_points()
            ),
        ));
    }
    Ok(curve)
}
