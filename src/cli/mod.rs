//! Command-line parsing for the qPCR standard-curve tool.
//!
//! The goal of this module is to keep **argument parsing** and **command dispatch**
//! separate from the fitting/titer math.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::domain::{
    AcceptanceCriteria, Column, DEFAULT_DILUTION_FACTOR, DEFAULT_GENOME_LENGTH_BP, DEFAULT_UNKNOWN_CQ,
    StandardCurvePoint,
};

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(
    name = "qpcr",
    version,
    about = "qPCR standard curve fitting, starting-quantity prediction and virus titer"
)]
pub struct Cli {
    /// Print machine-readable JSON instead of text.
    #[arg(long, global = true)]
    pub json: bool,

    /// Log debug details to stderr (RUST_LOG overrides).
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Fit the standard curve and print slope, intercept, R² and efficiency.
    Fit(FitArgs),
    /// Predict the starting quantity of an unknown sample from its Cq.
    Predict(PredictArgs),
    /// Convert a starting quantity (given, or predicted from a Cq) to a titer.
    Titer(TiterArgs),
    /// Run fit, prediction and titer together, optionally editing table cells first.
    Analyze(AnalyzeArgs),
    /// Plot a previously exported curve JSON.
    Plot(PlotArgs),
}

/// Where the standards come from and how the fit is judged.
#[derive(Debug, Args, Clone)]
pub struct CurveArgs {
    /// CSV file with `cq` and `sq` columns (defaults to the built-in dilution series).
    #[arg(long, value_name = "CSV", conflicts_with = "points")]
    pub data: Option<PathBuf>,

    /// A standard as `CQ,SQ`; repeat for each standard.
    #[arg(long = "point", value_name = "CQ,SQ", value_parser = parse_point)]
    pub points: Vec<StandardCurvePoint>,

    /// Lowest acceptable efficiency in percent.
    #[arg(long, default_value_t = 90.0)]
    pub min_efficiency: f64,

    /// Highest acceptable efficiency in percent.
    #[arg(long, default_value_t = 110.0)]
    pub max_efficiency: f64,

    /// Lowest acceptable R².
    #[arg(long, default_value_t = 0.98)]
    pub min_r_squared: f64,
}

impl CurveArgs {
    pub fn criteria(&self) -> AcceptanceCriteria {
        AcceptanceCriteria {
            efficiency_min: self.min_efficiency / 100.0,
            efficiency_max: self.max_efficiency / 100.0,
            min_r_squared: self.min_r_squared,
        }
    }
}

/// Terminal plot options.
#[derive(Debug, Args, Clone)]
pub struct PlotOptions {
    /// Render an ASCII plot of the standards and fitted line.
    #[arg(long)]
    pub plot: bool,

    /// Plot width (columns).
    #[arg(long, default_value_t = 60)]
    pub width: usize,

    /// Plot height (rows).
    #[arg(long, default_value_t = 20)]
    pub height: usize,
}

#[derive(Debug, Args, Clone)]
pub struct FitArgs {
    #[command(flatten)]
    pub curve: CurveArgs,

    #[command(flatten)]
    pub plot: PlotOptions,

    /// Export per-standard results to CSV.
    #[arg(long)]
    pub export: Option<PathBuf>,

    /// Export the fitted curve to JSON.
    #[arg(long = "export-curve")]
    pub export_curve: Option<PathBuf>,
}

#[derive(Debug, Args, Clone)]
pub struct PredictArgs {
    #[command(flatten)]
    pub curve: CurveArgs,

    /// Cq of the unknown sample.
    #[arg(long, env = "QPCR_UNKNOWN_CQ", allow_hyphen_values = true)]
    pub cq: Option<f64>,
}

#[derive(Debug, Args, Clone)]
pub struct TiterArgs {
    #[command(flatten)]
    pub curve: CurveArgs,

    /// Cq of the unknown sample (SQ is predicted from the standard curve).
    #[arg(long, env = "QPCR_UNKNOWN_CQ", allow_hyphen_values = true)]
    pub cq: Option<f64>,

    /// Starting quantity to convert directly, skipping the standard curve.
    ///
    /// Takes precedence over `--cq`, which may come from the environment.
    #[arg(long, allow_hyphen_values = true)]
    pub sq: Option<f64>,

    /// Genome length in base pairs.
    #[arg(long, env = "QPCR_GENOME_LENGTH", allow_hyphen_values = true)]
    pub genome_length: Option<f64>,

    /// Dilution factor of the measured sample.
    #[arg(long, env = "QPCR_DILUTION_FACTOR", allow_hyphen_values = true)]
    pub dilution: Option<f64>,
}

#[derive(Debug, Args, Clone)]
pub struct AnalyzeArgs {
    #[command(flatten)]
    pub curve: CurveArgs,

    #[command(flatten)]
    pub plot: PlotOptions,

    /// Cq of the unknown sample.
    #[arg(long, env = "QPCR_UNKNOWN_CQ", default_value_t = DEFAULT_UNKNOWN_CQ, allow_hyphen_values = true)]
    pub cq: f64,

    /// Genome length in base pairs.
    #[arg(long, env = "QPCR_GENOME_LENGTH", default_value_t = DEFAULT_GENOME_LENGTH_BP, allow_hyphen_values = true)]
    pub genome_length: f64,

    /// Dilution factor of the measured sample.
    #[arg(long, env = "QPCR_DILUTION_FACTOR", default_value_t = DEFAULT_DILUTION_FACTOR, allow_hyphen_values = true)]
    pub dilution: f64,

    /// Edit one table cell before analysing, as `ROW,COLUMN,VALUE` (1-based row,
    /// column `cq` or `sq`); repeat for several edits.
    #[arg(long = "edit", value_name = "ROW,COLUMN,VALUE", value_parser = parse_edit)]
    pub edits: Vec<CellEdit>,
}

/// Options for plotting a saved curve.
#[derive(Debug, Args, Clone)]
pub struct PlotArgs {
    /// Curve JSON file produced by `qpcr fit --export-curve`.
    #[arg(long, value_name = "JSON")]
    pub curve: PathBuf,

    /// Plot width (columns).
    #[arg(long, default_value_t = 60)]
    pub width: usize,

    /// Plot height (rows).
    #[arg(long, default_value_t = 20)]
    pub height: usize,
}

/// One host-side cell edit.
#[derive(Debug, Clone, PartialEq)]
pub struct CellEdit {
    /// 0-based row.
    pub row: usize,
    pub column: Column,
    /// Raw text as entered; coerced like a table cell.
    pub text: String,
}

fn parse_point(s: &str) -> Result<StandardCurvePoint, String> {
    let (cq, sq) = s
        .split_once(',')
        .ok_or_else(|| format!("expected CQ,SQ, got '{s}'"))?;
    let cq: f64 = cq.trim().parse().map_err(|e| format!("invalid Cq '{cq}': {e}"))?;
    let sq: f64 = sq.trim().parse().map_err(|e| format!("invalid SQ '{sq}': {e}"))?;
    Ok(StandardCurvePoint::new(cq, sq))
}

fn parse_edit(s: &str) -> Result<CellEdit, String> {
    let mut parts = s.splitn(3, ',');
    let (Some(row), Some(column), Some(text)) = (parts.next(), parts.next(), parts.next()) else {
        return Err(format!("expected ROW,COLUMN,VALUE, got '{s}'"));
    };
    let row: usize = row.trim().parse().map_err(|e| format!("invalid row '{row}': {e}"))?;
    if row == 0 {
        return Err("rows are numbered from 1".to_string());
    }
    Ok(CellEdit {
        row: row - 1,
        column: column.parse()?,
        text: text.to_string(),
    })
}
