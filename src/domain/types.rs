//! Shared domain types.
//!
//! These types are intentionally kept lightweight and serializable so they can be:
//!
//! - edited in-memory by the host (cell by cell)
//! - exported to JSON/CSV
//! - reloaded later for plotting

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::AnalysisError;

/// Unknown-sample Cq used when the host has not set one.
pub const DEFAULT_UNKNOWN_CQ: f64 = 20.0;
/// Genome length (bp) used when the host has not set one.
pub const DEFAULT_GENOME_LENGTH_BP: f64 = 33_000.0;
/// Dilution factor used when the host has not set one.
pub const DEFAULT_DILUTION_FACTOR: f64 = 400.0;

/// Seed standard curve as `(cq, sq)` pairs.
pub const SEED_POINTS: [(f64, f64); 4] = [(22.9, 1e-5), (20.51, 1e-2), (17.8, 0.1), (16.1, 1.0)];

/// One editable column of the standard-curve table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Column {
    Cq,
    Sq,
}

impl Column {
    pub fn label(self) -> &'static str {
        match self {
            Column::Cq => "Cq",
            Column::Sq => "SQ",
        }
    }
}

impl fmt::Display for Column {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Column {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "cq" => Ok(Column::Cq),
            "sq" => Ok(Column::Sq),
            other => Err(format!("unknown column '{other}' (expected cq or sq)")),
        }
    }
}

/// A single standard: measured Cq at a known starting quantity.
///
/// A missing or non-numeric cell is stored as NaN so that the next validation
/// rejects the dataset.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StandardCurvePoint {
    pub cq: f64,
    pub sq: f64,
}

impl StandardCurvePoint {
    pub fn new(cq: f64, sq: f64) -> Self {
        Self { cq, sq }
    }

    pub fn get(&self, column: Column) -> f64 {
        match column {
            Column::Cq => self.cq,
            Column::Sq => self.sq,
        }
    }
}

/// Ordered, host-owned table of standards.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StandardCurveDataset {
    points: Vec<StandardCurvePoint>,
}

impl StandardCurveDataset {
    pub fn new(points: Vec<StandardCurvePoint>) -> Self {
        Self { points }
    }

    /// The four-point reference dilution series.
    pub fn seed() -> Self {
        SEED_POINTS
            .iter()
            .map(|&(cq, sq)| StandardCurvePoint::new(cq, sq))
            .collect()
    }

    pub fn points(&self) -> &[StandardCurvePoint] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn push(&mut self, point: StandardCurvePoint) {
        self.points.push(point);
    }

    /// Remove the point at `row` (0-based) and return it.
    pub fn remove_row(&mut self, row: usize) -> Result<StandardCurvePoint, AnalysisError> {
        self.check_row(row)?;
        Ok(self.points.remove(row))
    }

    /// Overwrite one cell. `row` is 0-based.
    pub fn set_cell(&mut self, row: usize, column: Column, value: f64) -> Result<(), AnalysisError> {
        self.check_row(row)?;
        let point = &mut self.points[row];
        match column {
            Column::Cq => point.cq = value,
            Column::Sq => point.sq = value,
        }
        Ok(())
    }

    /// Overwrite one cell from user-entered text.
    ///
    /// Text that does not parse as a number is stored as a missing value.
    pub fn set_cell_text(&mut self, row: usize, column: Column, text: &str) -> Result<(), AnalysisError> {
        self.check_row(row)?;
        let value = match text.trim().parse::<f64>() {
            Ok(v) => v,
            Err(_) => {
                warn!(row = row + 1, %column, text, "non-numeric cell stored as missing");
                f64::NAN
            }
        };
        self.set_cell(row, column, value)
    }

    fn check_row(&self, row: usize) -> Result<(), AnalysisError> {
        if row < self.points.len() {
            Ok(())
        } else {
            Err(AnalysisError::invalid_data(format!(
                "row {} is out of range (dataset has {} rows)",
                row + 1,
                self.points.len()
            )))
        }
    }
}

impl FromIterator<StandardCurvePoint> for StandardCurveDataset {
    fn from_iter<I: IntoIterator<Item = StandardCurvePoint>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

/// Quality thresholds a standard curve is checked against.
///
/// Violations are reported as warnings, never as errors.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AcceptanceCriteria {
    /// Lowest acceptable efficiency (fraction, 0.9 = 90%).
    pub efficiency_min: f64,
    /// Highest acceptable efficiency (fraction).
    pub efficiency_max: f64,
    /// Lowest acceptable coefficient of determination.
    pub min_r_squared: f64,
}

impl Default for AcceptanceCriteria {
    fn default() -> Self {
        Self {
            efficiency_min: 0.9,
            efficiency_max: 1.1,
            min_r_squared: 0.98,
        }
    }
}

/// Warning-level conditions on an otherwise computable fit.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FitWarning {
    /// Cq does not decrease with quantity, so efficiency has no physical meaning.
    NonNegativeSlope { slope: f64 },
    EfficiencyOutOfRange { efficiency: f64, min: f64, max: f64 },
    /// The slope is negative but too flat for a finite efficiency.
    EfficiencyUndefined { slope: f64 },
    LowRSquared { r_squared: f64, min: f64 },
}

impl fmt::Display for FitWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            FitWarning::NonNegativeSlope { slope } => write!(
                f,
                "slope {slope:.4} is not negative; efficiency is not interpretable"
            ),
            FitWarning::EfficiencyOutOfRange { efficiency, min, max } => write!(
                f,
                "efficiency {:.1}% is outside the acceptable range {:.1}%..{:.1}%",
                efficiency * 100.0,
                min * 100.0,
                max * 100.0
            ),
            FitWarning::EfficiencyUndefined { slope } => write!(
                f,
                "slope {slope:.4} is too flat for a finite efficiency"
            ),
            FitWarning::LowRSquared { r_squared, min } => {
                write!(f, "R² {r_squared:.4} is below {min:.4}")
            }
        }
    }
}

/// Result of one standard-curve fit. Never mutated; replaced on every refit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FittedCurve {
    pub slope: f64,
    pub intercept: f64,
    pub r_squared: f64,
    /// Amplification efficiency as a fraction (1.0 = 100%).
    ///
    /// `None` when the slope is so close to zero that `10^(-1/slope)` overflows.
    pub efficiency: Option<f64>,
    /// `log10(sq)` for each dataset row, in dataset order.
    pub log_sq_values: Vec<f64>,
    #[serde(default)]
    pub warnings: Vec<FitWarning>,
}

impl FittedCurve {
    pub fn n_points(&self) -> usize {
        self.log_sq_values.len()
    }
}

/// Scalar inputs of the titer calculation.
///
/// `None` means the host has cleared the field.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct TiterInputs {
    pub unknown_cq: Option<f64>,
    pub genome_length_bp: Option<f64>,
    pub dilution_factor: Option<f64>,
}

impl TiterInputs {
    pub fn new(unknown_cq: f64, genome_length_bp: f64, dilution_factor: f64) -> Self {
        Self {
            unknown_cq: Some(unknown_cq),
            genome_length_bp: Some(genome_length_bp),
            dilution_factor: Some(dilution_factor),
        }
    }

    pub fn seed() -> Self {
        Self::new(DEFAULT_UNKNOWN_CQ, DEFAULT_GENOME_LENGTH_BP, DEFAULT_DILUTION_FACTOR)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TiterResult {
    pub predicted_sq: f64,
    /// Genomic copies per mL.
    pub titer: f64,
}

/// Per-standard fitted value and residual (used for reports and exports).
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PointResidual {
    /// 1-based table row.
    pub row: usize,
    pub cq: f64,
    pub sq: f64,
    pub log10_sq: f64,
    pub cq_fit: f64,
    pub residual: f64,
}

/// A saved curve file (JSON).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CurveFile {
    pub tool: String,
    pub points: StandardCurveDataset,
    pub curve: FittedCurve,
}

/// A full run's configuration as understood by the CLI host.
///
/// This is derived from CLI flags (plus defaults).
#[derive(Debug, Clone)]
pub struct RunConfig {
    pub criteria: AcceptanceCriteria,
    pub json: bool,
    pub plot: bool,
    pub plot_width: usize,
    pub plot_height: usize,
    pub export_results: Option<PathBuf>,
    pub export_curve: Option<PathBuf>,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            criteria: AcceptanceCriteria::default(),
            json: false,
            plot: false,
            plot_width: 60,
            plot_height: 20,
            export_results: None,
            export_curve: None,
        }
    }
}
