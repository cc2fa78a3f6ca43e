//! Top-level application orchestration.
//!
//! `src/main.rs` is intentionally tiny; this module is the "real main" that:
//! - loads `.env` and parses CLI arguments
//! - sets up logging
//! - builds the standards table (seed, CSV or `--point`s)
//! - runs the requested stage(s) of the analysis
//! - prints reports/plots and writes optional exports

use clap::Parser;
use serde::Serialize;
use tracing::debug;

use crate::app::pipeline::AnalysisOutput;
use crate::app::session::Session;
use crate::cli::{AnalyzeArgs, Command, CurveArgs, FitArgs, PlotArgs, PredictArgs, TiterArgs};
use crate::domain::{RunConfig, StandardCurveDataset, TiterInputs};
use crate::error::{AppError, EXIT_INPUT};
use crate::fit::CurveFitter;
use crate::plot::PlotMarker;
use crate::report::{AnalysisReport, FitReport, QuantityReport, TiterFields};
use crate::titer::{TITER_UNIT, compute_titer, predict_sq, require};

pub mod pipeline;
pub mod session;

/// Entry point for the `qpcr` binary.
pub fn run() -> Result<(), AppError> {
    // Missing .env is the common case.
    dotenvy::dotenv().ok();

    // `qpcr` with no subcommand (or only flags) runs `qpcr analyze`.
    let argv = rewrite_args(std::env::args().collect());
    let cli = crate::cli::Cli::parse_from(argv);
    init_tracing(cli.verbose);

    match cli.command {
        Command::Fit(args) => handle_fit(args, cli.json),
        Command::Predict(args) => handle_predict(args, cli.json),
        Command::Titer(args) => handle_titer(args, cli.json),
        Command::Analyze(args) => handle_analyze(args, cli.json),
        Command::Plot(args) => handle_plot(args),
    }
}

fn init_tracing(verbose: bool) {
    let level = if verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::WARN
    };
    // A second init (e.g. in tests) keeps the first subscriber.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env().add_directive(level.into()))
        .with_writer(std::io::stderr)
        .try_init();
}

fn handle_fit(args: FitArgs, json: bool) -> Result<(), AppError> {
    let config = run_config_from_fit_args(&args, json);
    let dataset = load_dataset(&args.curve)?;
    let curve = CurveFitter::new(config.criteria).fit(&dataset)?;
    let residuals = crate::report::compute_residuals(&dataset, &curve)?;

    if config.json {
        print_json(&FitReport {
            points: &dataset,
            curve: &curve,
            residuals: &residuals,
        })?;
    } else {
        println!("{}", crate::report::format_fit_summary(&curve));
        println!("{}", crate::report::format_residuals(&residuals));
    }

    if config.plot && !config.json {
        let plot = crate::plot::render_ascii_plot(&dataset, &curve, None, config.plot_width, config.plot_height);
        println!("{plot}");
    }

    // Optional exports.
    if let Some(path) = &config.export_results {
        crate::io::export::write_results_csv(path, &residuals)?;
    }
    if let Some(path) = &config.export_curve {
        crate::io::curve::write_curve_json(path, &dataset, &curve)?;
    }

    Ok(())
}

fn handle_predict(args: PredictArgs, json: bool) -> Result<(), AppError> {
    let unknown_cq = require("unknown_cq", args.cq)?;
    let dataset = load_dataset(&args.curve)?;
    let curve = CurveFitter::new(args.curve.criteria()).fit(&dataset)?;
    let predicted_sq = predict_sq(&curve, unknown_cq)?;

    if json {
        print_json(&QuantityReport {
            unknown_cq: Some(unknown_cq),
            predicted_sq,
            titer: None,
        })?;
    } else {
        println!("{}", crate::report::format_prediction(unknown_cq, predicted_sq));
    }
    Ok(())
}

fn handle_titer(args: TiterArgs, json: bool) -> Result<(), AppError> {
    // With `--sq` the standard curve is not needed at all.
    let (unknown_cq, predicted_sq) = match args.sq {
        Some(sq) => {
            if let Some(cq) = args.cq {
                debug!(cq, sq, "--sq given; ignoring unknown Cq");
            }
            (None, sq)
        }
        None => {
            let unknown_cq = require("unknown_cq", args.cq)?;
            let dataset = load_dataset(&args.curve)?;
            let curve = CurveFitter::new(args.curve.criteria()).fit(&dataset)?;
            (Some(unknown_cq), predict_sq(&curve, unknown_cq)?)
        }
    };
    let genome_length_bp = require("genome_length_bp", args.genome_length)?;
    let dilution_factor = require("dilution_factor", args.dilution)?;
    let titer = compute_titer(predicted_sq, genome_length_bp, dilution_factor)?;

    if json {
        print_json(&QuantityReport {
            unknown_cq,
            predicted_sq,
            titer: Some(TiterFields {
                genome_length_bp,
                dilution_factor,
                titer,
                unit: TITER_UNIT,
            }),
        })?;
    } else {
        if let Some(cq) = unknown_cq {
            println!("{}", crate::report::format_prediction(cq, predicted_sq));
        }
        println!(
            "{}",
            crate::report::format_titer(&crate::domain::TiterResult {
                predicted_sq,
                titer
            })
        );
    }
    Ok(())
}

fn handle_analyze(args: AnalyzeArgs, json: bool) -> Result<(), AppError> {
    let config = run_config_from_analyze_args(&args, json);
    let dataset = load_dataset(&args.curve)?;
    let inputs = TiterInputs::new(args.cq, args.genome_length, args.dilution);

    let mut session = Session::new(dataset, inputs, config.criteria);
    for edit in &args.edits {
        session.edit_cell_text(edit.row, edit.column, &edit.text)?;
    }
    debug!(revision = session.revision(), "session ready");

    let output = session.output();
    if config.json {
        print_json(&AnalysisReport::new(session.dataset(), session.inputs(), output))?;
    } else {
        println!(
            "{}",
            crate::report::format_analysis(session.dataset(), session.inputs(), output)
        );
        if config.plot {
            print_session_plot(&session, output, &config);
        }
    }

    match output.first_error() {
        Some(err) => Err(err.clone().into()),
        None => Ok(()),
    }
}

fn print_session_plot(session: &Session, output: &AnalysisOutput, config: &RunConfig) {
    let Ok(curve) = &output.fit else {
        return;
    };
    let marker = match (&output.predicted_sq, session.inputs().unknown_cq) {
        (Ok(sq), Some(cq)) => Some(PlotMarker {
            log10_sq: sq.log10(),
            cq,
        }),
        _ => None,
    };
    let plot = crate::plot::render_ascii_plot(
        session.dataset(),
        curve,
        marker,
        config.plot_width,
        config.plot_height,
    );
    println!("{plot}");
}

fn handle_plot(args: PlotArgs) -> Result<(), AppError> {
    let curve = crate::io::curve::read_curve_json(&args.curve)?;
    let plot = crate::plot::render_ascii_plot_from_curve_file(&curve, args.width, args.height);

    println!("{}", crate::report::format_equation(&curve.curve));
    println!("{plot}");
    Ok(())
}

/// Standards from `--point`s, a CSV file, or the built-in series, in that order.
pub fn load_dataset(args: &CurveArgs) -> Result<StandardCurveDataset, AppError> {
    if !args.points.is_empty() {
        return Ok(args.points.iter().copied().collect());
    }
    match &args.data {
        Some(path) => Ok(crate::io::ingest::load_dataset_csv(path)?.dataset),
        None => Ok(StandardCurveDataset::seed()),
    }
}

pub fn run_config_from_fit_args(args: &FitArgs, json: bool) -> RunConfig {
    RunConfig {
        criteria: args.curve.criteria(),
        json,
        plot: args.plot.plot,
        plot_width: args.plot.width,
        plot_height: args.plot.height,
        export_results: args.export.clone(),
        export_curve: args.export_curve.clone(),
    }
}

pub fn run_config_from_analyze_args(args: &AnalyzeArgs, json: bool) -> RunConfig {
    RunConfig {
        criteria: args.curve.criteria(),
        json,
        plot: args.plot.plot,
        plot_width: args.plot.width,
        plot_height: args.plot.height,
        ..RunConfig::default()
    }
}

fn print_json<T: Serialize>(value: &T) -> Result<(), AppError> {
    let txt = serde_json::to_string_pretty(value)
        .map_err(|e| AppError::new(EXIT_INPUT, format!("Failed to serialize JSON output: {e}")))?;
    println!("{txt}");
    Ok(())
}

/// Rewrite argv so `qpcr` defaults to `qpcr analyze`.
///
/// Rules:
/// - `qpcr`                        -> `qpcr analyze`
/// - `qpcr --data x.csv ...`       -> `qpcr analyze --data x.csv ...`
/// - `qpcr --help/--version/-h`    -> unchanged (show top-level help/version)
fn rewrite_args(mut argv: Vec<String>) -> Vec<String> {
    let Some(arg1) = argv.get(1).cloned() else {
        argv.push("analyze".to_string());
        return argv;
    };

    let is_top_level_help_or_version = matches!(
        arg1.as_str(),
        "-h" | "--help" | "-V" | "--version" | "help"
    );
    if is_top_level_help_or_version {
        return argv;
    }

    let is_subcommand = matches!(
        arg1.as_str(),
        "fit" | "predict" | "titer" | "analyze" | "plot"
    );
    if is_subcommand {
        return argv;
    }

    // If the first token is a flag, treat it as "analyze flags".
    if arg1.starts_with('-') {
        argv.insert(1, "analyze".to_string());
        return argv;
    }

    // Otherwise, leave as-is.
    argv
}

#[cfg(test)]
mod tests {
    use super::*;

    fn argv(args: &[&str]) -> Vec<String> {
        args.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn bare_invocation_runs_analyze() {
        assert_eq!(rewrite_args(argv(&["qpcr"])), argv(&["qpcr", "analyze"]));
        assert_eq!(
            rewrite_args(argv(&["qpcr", "--cq", "21"])),
            argv(&["qpcr", "analyze", "--cq", "21"])
        );
    }

    #[test]
    fn subcommands_and_help_are_untouched() {
        for args in [&["qpcr", "fit"][..], &["qpcr", "--help"], &["qpcr", "-V"]] {
            assert_eq!(rewrite_args(argv(args)), argv(args));
        }
    }

    #[test]
    fn load_dataset_prefers_points_then_seed() {
        let cli = crate::cli::Cli::try_parse_from(["qpcr", "fit", "--point", "20,1", "--point", "23.3,0.1"]).unwrap();
        let Command::Fit(args) = cli.command else {
            panic!("expected fit");
        };
        assert_eq!(load_dataset(&args.curve).unwrap().len(), 2);

        let cli = crate::cli::Cli::try_parse_from(["qpcr", "fit"]).unwrap();
        let Command::Fit(args) = cli.command else {
            panic!("expected fit");
        };
        assert_eq!(load_dataset(&args.curve).unwrap(), StandardCurveDataset::seed());
    }
}
