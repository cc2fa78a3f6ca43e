//! Formatted terminal output.
//!
//! We keep formatting code in one place so:
//! - the math/fitting code stays clean and testable
//! - output changes are localized (important for snapshot-style tests)

use crate::app::pipeline::AnalysisOutput;
use crate::domain::{FittedCurve, PointResidual, StandardCurveDataset, TiterInputs, TiterResult};
use crate::error::AnalysisError;
use crate::titer::TITER_UNIT;

/// Scientific notation with four significant digits, e.g. `3.137e-3`.
pub fn fmt_sci(v: f64) -> String {
    format!("{v:.3e}")
}

/// Regression equation as shown under a standard-curve plot.
pub fn format_equation(curve: &FittedCurve) -> String {
    let sign = if curve.intercept < 0.0 { '-' } else { '+' };
    format!(
        "Cq = {:.4} * log10(SQ) {sign} {:.4}",
        curve.slope,
        curve.intercept.abs()
    )
}

/// Fit diagnostics block: equation, R², efficiency and warnings.
pub fn format_fit_summary(curve: &FittedCurve) -> String {
    let mut out = String::new();

    out.push_str("=== qpcr - Standard Curve ===\n");
    out.push_str(&format!("Standards: n={}\n", curve.n_points()));
    out.push_str(&format!("{}\n", format_equation(curve)));
    out.push_str(&format!("Slope: {:.4}\n", curve.slope));
    out.push_str(&format!("Intercept: {:.4}\n", curve.intercept));
    out.push_str(&format!("R²: {:.4}\n", curve.r_squared));
    match curve.efficiency {
        Some(e) => out.push_str(&format!("Efficiency: {:.2}%\n", e * 100.0)),
        None => out.push_str("Efficiency: undefined\n"),
    }

    for w in &curve.warnings {
        out.push_str(&format!("warning: {w}\n"));
    }

    out
}

/// Per-standard residual table.
pub fn format_residuals(rows: &[PointResidual]) -> String {
    let mut out = String::new();
    out.push_str(
        format!(
            "{:>4} {:>8} {:>12} {:>9} {:>8} {:>9}\n",
            "row", "cq", "sq", "log10_sq", "cq_fit", "residual"
        )
        .trim_end(),
    );
    out.push('\n');
    out.push_str(
        format!(
            "{:-<4} {:-<8} {:-<12} {:-<9} {:-<8} {:-<9}\n",
            "", "", "", "", "", ""
        )
        .trim_end(),
    );
    out.push('\n');

    for r in rows {
        out.push_str(
            format!(
                "{:>4} {:>8.3} {:>12} {:>9.4} {:>8.3} {:>9.4}\n",
                r.row,
                r.cq,
                fmt_sci(r.sq),
                r.log10_sq,
                r.cq_fit,
                r.residual
            )
            .trim_end(),
        );
        out.push('\n');
    }

    out
}

pub fn format_prediction(unknown_cq: f64, predicted_sq: f64) -> String {
    format!("Predicted SQ (Cq {unknown_cq:.2}): {}", fmt_sci(predicted_sq))
}

pub fn format_titer(result: &TiterResult) -> String {
    format!("Titer: {} {TITER_UNIT}", fmt_sci(result.titer))
}

/// What the user should do about a failed stage.
pub fn guidance(err: &AnalysisError) -> String {
    let hint = match err {
        AnalysisError::InvalidData { .. } => {
            "Enter at least two standards with numeric Cq values and SQ values greater than 0."
        }
        AnalysisError::DegenerateFit { .. } => "Use standards that span at least two different quantities.",
        AnalysisError::UndefinedPrediction { .. } => {
            "A starting quantity cannot be predicted until the standard curve is valid."
        }
        AnalysisError::MissingInput { .. } => "Enter a value for every input.",
        AnalysisError::InvalidParameter { .. } => "Inputs must be finite numbers greater than 0.",
    };
    format!("{err}\n  {hint}")
}

/// Full report of one analysis pass.
///
/// Each stage prints either its result or guidance, never a stale value.
pub fn format_analysis(
    dataset: &StandardCurveDataset,
    inputs: &TiterInputs,
    output: &AnalysisOutput,
) -> String {
    let mut out = String::new();

    match &output.fit {
        Ok(curve) => {
            out.push_str(&format_fit_summary(curve));
            out.push('\n');
            match crate::report::compute_residuals(dataset, curve) {
                Ok(rows) => out.push_str(&format_residuals(&rows)),
                Err(e) => out.push_str(&format!("{}\n", guidance(&e))),
            }
        }
        Err(e) => out.push_str(&format!("Standard curve: {}\n", guidance(e))),
    }
    out.push('\n');

    match (&output.predicted_sq, inputs.unknown_cq) {
        (Ok(sq), Some(cq)) => out.push_str(&format_prediction(cq, *sq)),
        (Err(e), _) => out.push_str(&format!("Predicted SQ: {}", guidance(e))),
        // A prediction cannot succeed without an unknown Cq.
        (Ok(sq), None) => out.push_str(&format!("Predicted SQ: {}", fmt_sci(*sq))),
    }
    out.push('\n');

    match &output.titer {
        Ok(t) => out.push_str(&format_titer(t)),
        Err(e) => out.push_str(&format!("Titer: {}", guidance(e))),
    }
    out.push('\n');

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn curve() -> FittedCurve {
        FittedCurve {
            slope: -3.3219,
            intercept: 35.0,
            r_squared: 0.99876,
            efficiency: Some(1.0),
            log_sq_values: vec![0.0, -1.0],
            warnings: vec![],
        }
    }

    #[test]
    fn fmt_sci_uses_exponent_notation() {
        assert_eq!(fmt_sci(0.003137068949), "3.137e-3");
        assert_eq!(fmt_sci(561_491_841.49), "5.615e8");
    }

    #[test]
    fn equation_handles_negative_intercept() {
        let mut c = curve();
        assert_eq!(format_equation(&c), "Cq = -3.3219 * log10(SQ) + 35.0000");
        c.intercept = -2.5;
        assert_eq!(format_equation(&c), "Cq = -3.3219 * log10(SQ) - 2.5000");
    }

    #[test]
    fn fit_summary_lists_metrics() {
        let txt = format_fit_summary(&curve());
        assert!(txt.contains("Standards: n=2\n"));
        assert!(txt.contains("R²: 0.9988\n"));
        assert!(txt.contains("Efficiency: 100.00%\n"));
        assert!(!txt.contains("warning"));
    }

    #[test]
    fn fit_summary_marks_undefined_efficiency() {
        let mut c = curve();
        c.efficiency = None;
        assert!(format_fit_summary(&c).contains("Efficiency: undefined\n"));
    }

    #[test]
    fn titer_line_carries_unit() {
        let t = TiterResult {
            predicted_sq: 0.05,
            titer: 5.6149e8,
        };
        assert_eq!(format_titer(&t), "Titer: 5.615e8 genomic copies/mL");
    }

    #[test]
    fn guidance_names_the_error() {
        let txt = guidance(&AnalysisError::InvalidParameter {
            name: "genome_length_bp",
            value: 0.0,
        });
        assert!(txt.starts_with("Invalid parameter: genome_length_bp = 0"));
    }
}
