//! Single-predictor ordinary least squares.
//!
//! Standard curves are a straight line in `(log10 SQ, Cq)` space, so we only ever
//! need the closed form:
//!
//! ```text
//! slope     = Sxy / Sxx
//! intercept = mean(y) - slope * mean(x)
//! R²        = Sxy² / (Sxx * Syy)
//! ```
//!
//! where `Sxy`, `Sxx`, `Syy` are centred sums of products.

use nalgebra::DVector;

/// Coefficients and goodness of fit of `y = intercept + slope * x`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LinearFit {
    pub slope: f64,
    pub intercept: f64,
    pub r_squared: f64,
}

/// Fit `y` on `x`.
///
/// Returns `None` when the slices differ in length, hold fewer than two
/// values, or `x` has zero variance.
pub fn simple_linear_regression(x: &[f64], y: &[f64]) -> Option<LinearFit> {
    if x.len() != y.len() || x.len() < 2 {
        return None;
    }
    // Identical predictors leave the slope undefined even when rounding in the
    // mean would make Sxx a tiny non-zero number.
    if x.iter().all(|&v| v == x[0]) {
        return None;
    }

    let x = DVector::from_column_slice(x);
    let y = DVector::from_column_slice(y);

    let x_mean = x.mean();
    let y_mean = y.mean();
    let dx = x.add_scalar(-x_mean);
    let dy = y.add_scalar(-y_mean);

    let sxx = dx.dot(&dx);
    let sxy = dx.dot(&dy);
    let syy = dy.dot(&dy);

    if !(sxx.is_finite() && sxx > 0.0) {
        return None;
    }

    let slope = sxy / sxx;
    let intercept = y_mean - slope * x_mean;

    // A constant response lies exactly on the (flat) fitted line.
    let r_squared = if syy > 0.0 {
        ((sxy * sxy) / (sxx * syy)).clamp(0.0, 1.0)
    } else {
        1.0
    };

    Some(LinearFit {
        slope,
        intercept,
        r_squared,
    })
}
