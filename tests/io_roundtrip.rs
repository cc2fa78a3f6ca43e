//! File-level checks: CSV ingest, curve JSON and results export.

use std::fs;

use qpcr_titer::domain::{Column, StandardCurveDataset, StandardCurvePoint};
use qpcr_titer::fit::fit;
use qpcr_titer::io::{load_dataset_csv, read_curve_json, write_curve_json, write_results_csv};
use qpcr_titer::plot::render_ascii_plot_from_curve_file;
use qpcr_titer::report::compute_residuals;

#[test]
fn curve_json_survives_a_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("curve.json");
    let ds = StandardCurveDataset::seed();
    let curve = fit(&ds).unwrap();

    write_curve_json(&path, &ds, &curve).unwrap();
    let back = read_curve_json(&path).unwrap();

    assert_eq!(back.tool, "qpcr");
    assert_eq!(back.points, ds);
    assert_eq!(back.curve.warnings, curve.warnings);
    assert!((back.curve.slope - curve.slope).abs() < 1e-12);
}

#[test]
fn curve_json_keeps_an_undefined_efficiency() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("flat.json");
    let ds: StandardCurveDataset = [StandardCurvePoint::new(20.001, 1.0), StandardCurvePoint::new(20.0, 10.0)]
        .into_iter()
        .collect();
    let curve = fit(&ds).unwrap();
    assert_eq!(curve.efficiency, None);

    write_curve_json(&path, &ds, &curve).unwrap();
    let back = read_curve_json(&path).unwrap();
    assert_eq!(back.curve.efficiency, None);
    assert_eq!(back.curve.warnings, curve.warnings);
    assert!(!render_ascii_plot_from_curve_file(&back, 20, 8).is_empty());
}

#[test]
fn curve_json_with_mismatched_points_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("curve.json");
    let ds = StandardCurveDataset::seed();
    let curve = fit(&ds).unwrap();
    let mut fewer = ds.clone();
    fewer.remove_row(0).unwrap();

    write_curve_json(&path, &fewer, &curve).unwrap();
    assert!(read_curve_json(&path).is_err());
}

#[test]
fn csv_ingest_marks_bad_cells() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("standards.csv");
    fs::write(&path, "well,SQ,Cq\nA1,1e-5,22.9\nA2,n/a,20.51\nA3,0.1,17.8\n").unwrap();

    let ingested = load_dataset_csv(&path).unwrap();
    assert_eq!(ingested.dataset.len(), 3);
    assert_eq!(ingested.notes.len(), 1);
    assert_eq!(ingested.notes[0].column, Column::Sq);
    assert!(ingested.dataset.points()[1].sq.is_nan());
    assert!(fit(&ingested.dataset).is_err());
}

#[test]
fn missing_csv_is_an_input_error() {
    let dir = tempfile::tempdir().unwrap();
    let err = load_dataset_csv(&dir.path().join("absent.csv")).unwrap_err();
    assert_eq!(err.exit_code(), qpcr_titer::error::EXIT_INPUT);
}

#[test]
fn results_csv_has_one_row_per_standard() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("results.csv");
    let ds = StandardCurveDataset::seed();
    let residuals = compute_residuals(&ds, &fit(&ds).unwrap()).unwrap();

    write_results_csv(&path, &residuals).unwrap();
    let text = fs::read_to_string(&path).unwrap();
    let mut lines = text.lines();
    assert_eq!(lines.next(), Some("row,cq,sq,log10_sq,cq_fit,residual"));
    assert_eq!(lines.count(), 4);
}
