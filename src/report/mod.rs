//! Reporting utilities: residuals, machine-readable reports and formatted
//! terminal output.

use serde::Serialize;

use crate::app::pipeline::AnalysisOutput;
use crate::domain::{FittedCurve, PointResidual, StandardCurveDataset, TiterInputs, TiterResult};
use crate::error::AnalysisError;
use crate::models::cq_at;

pub mod format;

pub use format::*;

/// Compute fitted Cq values and residuals for each standard.
pub fn compute_residuals(
    dataset: &StandardCurveDataset,
    curve: &FittedCurve,
) -> Result<Vec<PointResidual>, AnalysisError> {
    if dataset.len() != curve.n_points() {
        return Err(AnalysisError::invalid_data(format!(
            "curve was fitted on {} standards but the table has {}",
            curve.n_points(),
            dataset.len()
        )));
    }

    let mut out = Vec::with_capacity(dataset.len());
    for (idx, (p, &log10_sq)) in dataset.points().iter().zip(&curve.log_sq_values).enumerate() {
        let cq_fit = cq_at(curve, log10_sq);
        if !cq_fit.is_finite() {
            return Err(AnalysisError::undefined_prediction(
                "non-finite fitted Cq during residual computation",
            ));
        }
        out.push(PointResidual {
            row: idx + 1,
            cq: p.cq,
            sq: p.sq,
            log10_sq,
            cq_fit,
            residual: p.cq - cq_fit,
        });
    }
    Ok(out)
}

/// JSON shape of `qpcr fit --json`.
#[derive(Debug, Clone, Serialize)]
pub struct FitReport<'a> {
    pub points: &'a StandardCurveDataset,
    pub curve: &'a FittedCurve,
    pub residuals: &'a [PointResidual],
}

/// JSON shape of `qpcr predict --json` and `qpcr titer --json`.
#[derive(Debug, Clone, Serialize)]
pub struct QuantityReport {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unknown_cq: Option<f64>,
    pub predicted_sq: f64,
    #[serde(flatten, skip_serializing_if = "Option::is_none")]
    pub titer: Option<TiterFields>,
}

#[derive(Debug, Clone, Serialize)]
pub struct TiterFields {
    pub genome_length_bp: f64,
    pub dilution_factor: f64,
    pub titer: f64,
    pub unit: &'static str,
}

/// JSON shape of a full analysis (`qpcr analyze --json`).
#[derive(Debug, Clone, Serialize)]
pub struct AnalysisReport<'a> {
    pub points: &'a StandardCurveDataset,
    pub inputs: &'a TiterInputs,
    pub curve: Option<&'a FittedCurve>,
    pub predicted_sq: Option<f64>,
    pub titer: Option<&'a TiterResult>,
    pub titer_unit: &'static str,
    /// One message per failed stage.
    pub errors: Vec<String>,
}

impl<'a> AnalysisReport<'a> {
    pub fn new(dataset: &'a StandardCurveDataset, inputs: &'a TiterInputs, output: &'a AnalysisOutput) -> Self {
        let errors = [
            output.fit.as_ref().err(),
            output.predicted_sq.as_ref().err(),
            output.titer.as_ref().err(),
        ]
        .into_iter()
        .flatten()
        .map(ToString::to_string)
        .collect();

        Self {
            points: dataset,
            inputs,
            curve: output.fit.as_ref().ok(),
            predicted_sq: output.predicted_sq.as_ref().ok().copied(),
            titer: output.titer.as_ref().ok(),
            titer_unit: crate::titer::TITER_UNIT,
            errors,
        }
    }
}
