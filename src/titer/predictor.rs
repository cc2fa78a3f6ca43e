//! Starting-quantity prediction and titer conversion.
//!
//! The fitted line is inverted to turn an unknown sample's Cq into a starting
//! quantity, which is then converted to genomic copies per mL:
//!
//! ```text
//! titer = SQ * 1e-9 * N_A * dilution / (genome_bp * 650)
//! ```

use tracing::debug;

use crate::domain::{FittedCurve, TiterInputs, TiterResult};
use crate::error::AnalysisError;
use crate::models::log_sq_at;

/// Converts the assumed SQ unit (nanomolar scale) to moles.
pub const SQ_TO_MOLES: f64 = 1e-9;
/// Avogadro's number (molecules per mole).
pub const AVOGADRO: f64 = 6.022e23;
/// Average molar mass of one base pair (g/mol).
pub const GRAMS_PER_MOLE_PER_BP: f64 = 650.0;

/// Unit label of `compute_titer` results.
pub const TITER_UNIT: &str = "genomic copies/mL";

/// Predict the starting quantity of a sample with Cq `unknown_cq`.
///
/// Extrapolation beyond the standards is allowed.
pub fn predict_sq(curve: &FittedCurve, unknown_cq: f64) -> Result<f64, AnalysisError> {
    if !unknown_cq.is_finite() {
        return Err(AnalysisError::InvalidParameter {
            name: "unknown_cq",
            value: unknown_cq,
        });
    }
    if !curve.slope.is_finite() || curve.slope == 0.0 {
        return Err(AnalysisError::undefined_prediction(format!(
            "curve slope is {}, so log10(SQ) cannot be solved for",
            curve.slope
        )));
    }
    if !curve.intercept.is_finite() {
        return Err(AnalysisError::undefined_prediction("curve intercept is not finite"));
    }

    let log_sq = log_sq_at(curve, unknown_cq);
    let sq = 10f64.powf(log_sq);
    if !(sq.is_finite() && sq > 0.0) {
        return Err(AnalysisError::undefined_prediction(format!(
            "Cq {unknown_cq} maps to log10(SQ) = {log_sq:.3}, outside the representable range"
        )));
    }

    debug!(unknown_cq, log_sq, sq, "predicted starting quantity");
    Ok(sq)
}

/// Convert a starting quantity to genomic copies per mL.
pub fn compute_titer(
    predicted_sq: f64,
    genome_length_bp: f64,
    dilution_factor: f64,
) -> Result<f64, AnalysisError> {
    let predicted_sq = positive("predicted_sq", predicted_sq)?;
    let genome_length_bp = positive("genome_length_bp", genome_length_bp)?;
    let dilution_factor = positive("dilution_factor", dilution_factor)?;

    let titer = (predicted_sq * SQ_TO_MOLES * AVOGADRO * dilution_factor)
        / (genome_length_bp * GRAMS_PER_MOLE_PER_BP);
    if !(titer.is_finite() && titer > 0.0) {
        return Err(AnalysisError::undefined_prediction(format!(
            "titer {titer} is not a positive finite number"
        )));
    }
    Ok(titer)
}

/// Runs prediction and conversion on top of the most recent fit.
#[derive(Debug, Clone, Copy, Default)]
pub struct TiterPredictor;

impl TiterPredictor {
    /// Predict SQ for `inputs.unknown_cq` using the outcome of the last fit.
    ///
    /// A failed fit is reported as an undefined prediction.
    pub fn predict(
        &self,
        fit: Result<&FittedCurve, &AnalysisError>,
        inputs: &TiterInputs,
    ) -> Result<f64, AnalysisError> {
        let curve = fit.map_err(|e| {
            AnalysisError::undefined_prediction(format!("no valid standard curve ({e})"))
        })?;
        let unknown_cq = require("unknown_cq", inputs.unknown_cq)?;
        predict_sq(curve, unknown_cq)
    }

    /// Predict SQ and convert it to a titer.
    pub fn evaluate(
        &self,
        fit: Result<&FittedCurve, &AnalysisError>,
        inputs: &TiterInputs,
    ) -> Result<TiterResult, AnalysisError> {
        let predicted_sq = self.predict(fit, inputs)?;
        self.convert(predicted_sq, inputs)
    }

    /// Convert an already predicted SQ using the genome length and dilution in `inputs`.
    pub fn convert(&self, predicted_sq: f64, inputs: &TiterInputs) -> Result<TiterResult, AnalysisError> {
        let genome_length_bp = require("genome_length_bp", inputs.genome_length_bp)?;
        let dilution_factor = require("dilution_factor", inputs.dilution_factor)?;
        let titer = compute_titer(predicted_sq, genome_length_bp, dilution_factor)?;
        Ok(TiterResult {
            predicted_sq,
            titer,
        })
    }
}

/// Unwrap a host-supplied scalar.
pub fn require(name: &'static str, value: Option<f64>) -> Result<f64, AnalysisError> {
    value.ok_or(AnalysisError::MissingInput { name })
}

fn positive(name: &'static str, value: f64) -> Result<f64, AnalysisError> {
    if value.is_finite() && value > 0.0 {
        Ok(value)
    } else {
        Err(AnalysisError::InvalidParameter { name, value })
    }
}
