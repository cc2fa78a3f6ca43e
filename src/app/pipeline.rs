//! Shared analysis pipeline used by every CLI subcommand and by `Session`.
//!
//! Keeping this in one place avoids duplicating the core workflow:
//! dataset -> validate/fit -> predict SQ -> titer
//!
//! Each stage's outcome is kept separately so a host can show the results that
//! did succeed next to guidance for the ones that did not.

use tracing::debug;

use crate::domain::{FittedCurve, StandardCurveDataset, TiterInputs, TiterResult};
use crate::error::AnalysisError;
use crate::fit::CurveFitter;
use crate::titer::TiterPredictor;

/// All computed outputs of one recompute pass.
#[derive(Debug, Clone, PartialEq)]
pub struct AnalysisOutput {
    pub fit: Result<FittedCurve, AnalysisError>,
    pub predicted_sq: Result<f64, AnalysisError>,
    pub titer: Result<TiterResult, AnalysisError>,
}

impl AnalysisOutput {
    /// First failure across the stages, if any.
    pub fn first_error(&self) -> Option<&AnalysisError> {
        self.fit
            .as_ref()
            .err()
            .or_else(|| self.predicted_sq.as_ref().err())
            .or_else(|| self.titer.as_ref().err())
    }
}

/// Run fit, prediction and titer conversion from scratch.
pub fn run_analysis(
    dataset: &StandardCurveDataset,
    inputs: &TiterInputs,
    fitter: &CurveFitter,
) -> AnalysisOutput {
    let fit = fitter.fit(dataset);
    let predictor = TiterPredictor;
    let predicted_sq = predictor.predict(fit.as_ref(), inputs);
    let titer = predicted_sq
        .clone()
        .and_then(|sq| predictor.convert(sq, inputs));

    debug!(
        fit_ok = fit.is_ok(),
        prediction_ok = predicted_sq.is_ok(),
        titer_ok = titer.is_ok(),
        "analysis recomputed"
    );

    AnalysisOutput {
        fit,
        predicted_sq,
        titer,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seed_analysis_succeeds_end_to_end() {
        let out = run_analysis(
            &StandardCurveDataset::seed(),
            &TiterInputs::seed(),
            &CurveFitter::default(),
        );
        assert!(out.first_error().is_none());
        let titer = out.titer.unwrap();
        assert_eq!(titer.predicted_sq, out.predicted_sq.unwrap());
        assert!(titer.titer > 0.0);
    }

    #[test]
    fn missing_genome_length_keeps_prediction() {
        let inputs = TiterInputs {
            genome_length_bp: None,
            ..TiterInputs::seed()
        };
        let out = run_analysis(&StandardCurveDataset::seed(), &inputs, &CurveFitter::default());
        assert!(out.predicted_sq.is_ok());
        assert_eq!(
            out.titer.unwrap_err(),
            AnalysisError::MissingInput { name: "genome_length_bp" }
        );
    }
}
