//! Evaluation of the standard-curve line.
//!
//! The fitted model is `Cq = slope * log10(SQ) + intercept`. Reports, plots and
//! the titer predictor need two primitive operations on it:
//! - forward: expected Cq for a given `log10(SQ)`
//! - inverse: `log10(SQ)` for a given Cq

use crate::domain::FittedCurve;

/// Expected Cq at `log_sq`.
pub fn cq_at(curve: &FittedCurve, log_sq: f64) -> f64 {
    curve.slope * log_sq + curve.intercept
}

/// `log10(SQ)` that the curve maps to `cq`.
///
/// Non-finite when the slope is zero; callers that need a usable value check
/// the slope first.
pub fn log_sq_at(curve: &FittedCurve, cq: f64) -> f64 {
    (cq - curve.intercept) / curve.slope
}

/// Amplification efficiency implied by a slope, as a fraction.
///
/// A slope of zero gives `-1` (no amplification) rather than a non-finite value.
pub fn efficiency_from_slope(slope: f64) -> f64 {
    // Adding +0.0 folds -0.0 into +0.0 so a flat line never yields +inf.
    10f64.powf(-1.0 / (slope + 0.0)) - 1.0
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line(slope: f64, intercept: f64) -> FittedCurve {
        FittedCurve {
            slope,
            intercept,
            r_squared: 1.0,
            efficiency: Some(efficiency_from_slope(slope)),
            log_sq_values: vec![],
            warnings: vec![],
        }
    }

    #[test]
    fn forward_and_inverse_agree() {
        let curve = line(-3.32, 35.0);
        let cq = cq_at(&curve, -2.5);
        assert!((log_sq_at(&curve, cq) + 2.5).abs() < 1e-12);
    }

    #[test]
    fn ideal_slope_is_full_efficiency() {
        // -1/log10(2) doubles every cycle.
        let slope = -1.0 / 2f64.log10();
        assert!((efficiency_from_slope(slope) - 1.0).abs() < 1e-12);
    }

    #[test]
    fn flat_slope_efficiency_is_finite() {
        assert_eq!(efficiency_from_slope(0.0), -1.0);
        assert_eq!(efficiency_from_slope(-0.0), -1.0);
    }
}
