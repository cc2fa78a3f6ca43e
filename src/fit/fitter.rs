//! Standard-curve fitting.
//!
//! Given a dataset of `(Cq, SQ)` standards we:
//! - validate it as a whole (no partial fits over a subset of rows)
//! - regress Cq on `log10(SQ)` by ordinary least squares
//! - derive efficiency and attach warning-level quality checks

use tracing::{debug, warn};

use crate::domain::{AcceptanceCriteria, FitWarning, FittedCurve, StandardCurveDataset};
use crate::error::AnalysisError;
use crate::math::simple_linear_regression;
use crate::models::efficiency_from_slope;

/// Fewest standards that determine a line.
pub const MIN_POINTS: usize = 2;

/// Turns a standard-curve dataset into a `FittedCurve`.
#[derive(Debug, Clone, Copy, Default)]
pub struct CurveFitter {
    criteria: AcceptanceCriteria,
}

impl CurveFitter {
    pub fn new(criteria: AcceptanceCriteria) -> Self {
        Self { criteria }
    }

    pub fn criteria(&self) -> &AcceptanceCriteria {
        &self.criteria
    }

    /// Check the structural and value invariants of `dataset`.
    ///
    /// Returns the dataset unchanged on success.
    pub fn validate<'a>(
        &self,
        dataset: &'a StandardCurveDataset,
    ) -> Result<&'a StandardCurveDataset, AnalysisError> {
        validate(dataset)
    }

    /// Validate and fit `dataset`.
    pub fn fit(&self, dataset: &StandardCurveDataset) -> Result<FittedCurve, AnalysisError> {
        fit_with(dataset, &self.criteria)
    }
}

/// Check that `dataset` can be fitted: at least two rows, every value finite,
/// every SQ strictly positive.
pub fn validate(dataset: &StandardCurveDataset) -> Result<&StandardCurveDataset, AnalysisError> {
    if dataset.len() < MIN_POINTS {
        return Err(AnalysisError::invalid_data(format!(
            "at least {MIN_POINTS} standards are required, got {}",
            dataset.len()
        )));
    }

    for (idx, p) in dataset.points().iter().enumerate() {
        let row = idx + 1;
        if !p.cq.is_finite() {
            return Err(AnalysisError::invalid_data(format!(
                "row {row}: Cq is missing or not a finite number"
            )));
        }
        if !p.sq.is_finite() {
            return Err(AnalysisError::invalid_data(format!(
                "row {row}: SQ is missing or not a finite number"
            )));
        }
        if p.sq <= 0.0 {
            return Err(AnalysisError::invalid_data(format!(
                "row {row}: SQ must be greater than 0, got {}",
                p.sq
            )));
        }
    }

    debug!(n_points = dataset.len(), "standard curve dataset validated");
    Ok(dataset)
}

/// Fit with the default acceptance criteria.
pub fn fit(dataset: &StandardCurveDataset) -> Result<FittedCurve, AnalysisError> {
    fit_with(dataset, &AcceptanceCriteria::default())
}

/// Fit `dataset` and check the result against `criteria`.
pub fn fit_with(
    dataset: &StandardCurveDataset,
    criteria: &AcceptanceCriteria,
) -> Result<FittedCurve, AnalysisError> {
    validate(dataset)?;

    let log_sq_values: Vec<f64> = dataset.points().iter().map(|p| p.sq.log10()).collect();
    let cq: Vec<f64> = dataset.points().iter().map(|p| p.cq).collect();

    let Some(line) = simple_linear_regression(&log_sq_values, &cq) else {
        return Err(AnalysisError::DegenerateFit {
            reason: "all log10(SQ) values are equal, so the slope is undefined".to_string(),
        });
    };

    if !(line.slope.is_finite() && line.intercept.is_finite() && line.r_squared.is_finite()) {
        return Err(AnalysisError::DegenerateFit {
            reason: "regression produced non-finite coefficients".to_string(),
        });
    }

    let efficiency = Some(efficiency_from_slope(line.slope)).filter(|e| e.is_finite());
    let warnings = quality_warnings(line.slope, efficiency, line.r_squared, criteria);
    for w in &warnings {
        warn!(%w, "standard curve quality");
    }

    debug!(
        slope = line.slope,
        intercept = line.intercept,
        r_squared = line.r_squared,
        efficiency,
        "standard curve fitted"
    );

    Ok(FittedCurve {
        slope: line.slope,
        intercept: line.intercept,
        r_squared: line.r_squared,
        efficiency,
        log_sq_values,
        warnings,
    })
}

fn quality_warnings(
    slope: f64,
    efficiency: Option<f64>,
    r_squared: f64,
    criteria: &AcceptanceCriteria,
) -> Vec<FitWarning> {
    let mut out = Vec::new();

    // With a non-negative slope the efficiency band check is meaningless; one
    // warning is enough.
    if slope >= 0.0 {
        out.push(FitWarning::NonNegativeSlope { slope });
    } else {
        match efficiency {
            None => out.push(FitWarning::EfficiencyUndefined { slope }),
            Some(efficiency)
                if !(criteria.efficiency_min..=criteria.efficiency_max).contains(&efficiency) =>
            {
                out.push(FitWarning::EfficiencyOutOfRange {
                    efficiency,
                    min: criteria.efficiency_min,
                    max: criteria.efficiency_max,
                });
            }
            Some(_) => {}
        }
    }

    if r_squared < criteria.min_r_squared {
        out.push(FitWarning::LowRSquared {
            r_squared,
            min: criteria.min_r_squared,
        });
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::StandardCurvePoint;

    fn dataset(pairs: &[(f64, f64)]) -> StandardCurveDataset {
        pairs
            .iter()
            .map(|&(cq, sq)| StandardCurvePoint::new(cq, sq))
            .collect()
    }

    #[test]
    fn fit_recovers_ideal_dilution_series() {
        // Ten-fold dilutions with a perfect -3.32 slope.
        let pairs: Vec<(f64, f64)> = (0..5)
            .map(|i| {
                let log_sq = -(i as f64);
                (30.0 - 3.32 * log_sq, 10f64.powf(log_sq))
            })
            .collect();
        let curve = fit(&dataset(&pairs)).unwrap();
        assert!((curve.slope + 3.32).abs() < 1e-9);
        assert!((curve.intercept - 30.0).abs() < 1e-9);
        assert!((curve.r_squared - 1.0).abs() < 1e-12);
        assert!((curve.efficiency.unwrap() - 1.0007).abs() < 1e-3);
        assert!(curve.warnings.is_empty());
    }

    #[test]
    fn log_sq_values_follow_dataset_order() {
        let curve = fit(&dataset(&[(20.0, 1.0), (25.0, 0.01), (23.0, 0.1)])).unwrap();
        assert_eq!(curve.log_sq_values.len(), 3);
        assert!((curve.log_sq_values[0] - 0.0).abs() < 1e-15);
        assert!((curve.log_sq_values[1] + 2.0).abs() < 1e-15);
        assert!((curve.log_sq_values[2] + 1.0).abs() < 1e-15);
    }

    #[test]
    fn validate_rejects_single_point() {
        let err = validate(&dataset(&[(20.0, 1.0)])).unwrap_err();
        assert!(matches!(err, AnalysisError::InvalidData { .. }));
    }

    #[test]
    fn validate_rejects_non_positive_sq() {
        let err = validate(&dataset(&[(20.0, 1.0), (25.0, 0.0)])).unwrap_err();
        assert!(err.to_string().contains("row 2"));
        let err = validate(&dataset(&[(20.0, -1.0), (25.0, 0.1)])).unwrap_err();
        assert!(err.to_string().contains("row 1"));
    }

    #[test]
    fn validate_rejects_missing_values() {
        let err = validate(&dataset(&[(f64::NAN, 1.0), (25.0, 0.1)])).unwrap_err();
        assert!(err.to_string().contains("Cq"));
        let err = validate(&dataset(&[(20.0, 1.0), (25.0, f64::INFINITY)])).unwrap_err();
        assert!(err.to_string().contains("SQ"));
    }

    #[test]
    fn identical_quantities_are_degenerate() {
        let err = fit(&dataset(&[(20.0, 0.1), (21.0, 0.1), (22.0, 0.1)])).unwrap_err();
        assert!(matches!(err, AnalysisError::DegenerateFit { .. }));
    }

    #[test]
    fn positive_slope_is_a_warning_not_an_error() {
        let curve = fit(&dataset(&[(20.0, 0.01), (25.0, 1.0)])).unwrap();
        assert!(curve.slope > 0.0);
        assert!(curve.efficiency.is_some_and(f64::is_finite));
        assert!(matches!(curve.warnings[0], FitWarning::NonNegativeSlope { .. }));
    }

    #[test]
    fn criteria_control_efficiency_warning() {
        // Slope -3.8 is roughly 83% efficient.
        let ds = dataset(&[(30.0, 1e-3), (26.2, 1e-2), (22.4, 1e-1)]);
        assert!(matches!(
            fit(&ds).unwrap().warnings.as_slice(),
            [FitWarning::EfficiencyOutOfRange { .. }]
        ));

        let loose = CurveFitter::new(AcceptanceCriteria {
            efficiency_min: 0.8,
            efficiency_max: 1.3,
            min_r_squared: 0.9,
        });
        assert!(loose.fit(&ds).unwrap().warnings.is_empty());
    }

    #[test]
    fn nearly_flat_slope_has_no_efficiency() {
        // Slope -0.001 puts 10^(-1/slope) far beyond f64::MAX.
        let curve = fit(&dataset(&[(20.001, 1.0), (20.0, 10.0)])).unwrap();
        assert!(curve.slope < 0.0);
        assert_eq!(curve.efficiency, None);
        assert!(matches!(
            curve.warnings[0],
            FitWarning::EfficiencyUndefined { .. }
        ));
    }
}
