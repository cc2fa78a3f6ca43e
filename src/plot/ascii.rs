//! ASCII plotting for terminal output.
//!
//! This is intentionally "dumb" (fixed-size grid), optimized for:
//! - quick visual sanity checks of a standard curve in a terminal
//! - deterministic output (helpful for golden tests)
//!
//! Plot elements:
//! - standards: `o`
//! - fitted line: `-`
//! - optional unknown sample: `X`

use crate::domain::{CurveFile, FittedCurve, StandardCurveDataset};
use crate::models::cq_at;

/// An unknown sample placed on the curve at `(log10_sq, cq)`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlotMarker {
    pub log10_sq: f64,
    pub cq: f64,
}

/// Render standards and the fitted line, with an optional unknown marker.
pub fn render_ascii_plot(
    dataset: &StandardCurveDataset,
    curve: &FittedCurve,
    unknown: Option<PlotMarker>,
    width: usize,
    height: usize,
) -> String {
    let points: Vec<(f64, f64)> = curve
        .log_sq_values
        .iter()
        .zip(dataset.points())
        .map(|(&x, p)| (x, p.cq))
        .collect();

    let (x_min, x_max) = x_range(&points, unknown).unwrap_or((-1.0, 1.0));
    let line = vec![(x_min, cq_at(curve, x_min)), (x_max, cq_at(curve, x_max))];
    render_plot(&points, &line, unknown, x_min, x_max, width, height)
}

/// Render a plot from a saved curve JSON file.
pub fn render_ascii_plot_from_curve_file(curve: &CurveFile, width: usize, height: usize) -> String {
    render_ascii_plot(&curve.points, &curve.curve, None, width, height)
}

fn render_plot(
    points: &[(f64, f64)],
    line: &[(f64, f64)],
    unknown: Option<PlotMarker>,
    x_min: f64,
    x_max: f64,
    width: usize,
    height: usize,
) -> String {
    let width = width.max(10);
    let height = height.max(5);

    let (y_min, y_max) = y_range(points, line, unknown).unwrap_or((0.0, 1.0));
    let (y_min, y_max) = pad_range(y_min, y_max, 0.05);

    let mut grid = vec![vec![' '; width]; height];

    // Draw the line first so points can overlay.
    draw_polyline(&mut grid, line, x_min, x_max, y_min, y_max);

    for &(x, y) in points {
        let col = map_x(x, x_min, x_max, width);
        let row = map_y(y, y_min, y_max, height);
        grid[row][col] = 'o';
    }

    if let Some(m) = unknown {
        let col = map_x(m.log10_sq, x_min, x_max, width);
        let row = map_y(m.cq, y_min, y_max, height);
        grid[row][col] = 'X';
    }

    let mut out = String::new();
    out.push_str(&format!(
        "Plot: log10(SQ)=[{x_min:.3}, {x_max:.3}] | Cq=[{y_min:.2}, {y_max:.2}]\n"
    ));

    for row in grid {
        out.push_str(row.into_iter().collect::<String>().trim_end());
        out.push('\n');
    }

    out
}

fn x_range(points: &[(f64, f64)], unknown: Option<PlotMarker>) -> Option<(f64, f64)> {
    let xs = points
        .iter()
        .map(|&(x, _)| x)
        .chain(unknown.map(|m| m.log10_sq));
    min_max(xs)
}

fn y_range(
    points: &[(f64, f64)],
    line: &[(f64, f64)],
    unknown: Option<PlotMarker>,
) -> Option<(f64, f64)> {
    let ys = points
        .iter()
        .chain(line)
        .map(|&(_, y)| y)
        .chain(unknown.map(|m| m.cq));
    min_max(ys)
}

fn min_max(values: impl Iterator<Item = f64>) -> Option<(f64, f64)> {
    let mut min_v = f64::INFINITY;
    let mut max_v = f64::NEG_INFINITY;
    for v in values.filter(|v| v.is_finite()) {
        min_v = min_v.min(v);
        max_v = max_v.max(v);
    }
    if min_v.is_finite() && max_v.is_finite() && max_v > min_v {
        Some((min_v, max_v))
    } else {
        None
    }
}

fn pad_range(min: f64, max: f64, frac: f64) -> (f64, f64) {
    let span = (max - min).abs();
    let pad = (span * frac).max(1e-12);
    (min - pad, max + pad)
}

fn map_x(x: f64, x_min: f64, x_max: f64, width: usize) -> usize {
    let width = width.max(2);
    let u = ((x - x_min) / (x_max - x_min)).clamp(0.0, 1.0);
    (u * (width as f64 - 1.0)).round() as usize
}

fn map_y(y: f64, y_min: f64, y_max: f64, height: usize) -> usize {
    let height = height.max(2);
    let u = ((y - y_min) / (y_max - y_min)).clamp(0.0, 1.0);
    // y=top is max -> row 0
    (height as f64 - 1.0 - (u * (height as f64 - 1.0))).round() as usize
}

fn draw_polyline(grid: &mut [Vec<char>], line: &[(f64, f64)], x_min: f64, x_max: f64, y_min: f64, y_max: f64) {
    let height = grid.len();
    let width = grid[0].len();

    let mut prev = None;
    for &(x, y) in line {
        if !y.is_finite() {
            prev = None;
            continue;
        }
        let col = map_x(x, x_min, x_max, width);
        let row = map_y(y, y_min, y_max, height);
        if let Some((c0, r0)) = prev {
            draw_line(grid, c0, r0, col, row, '-');
        } else {
            grid[row][col] = '-';
        }
        prev = Some((col, row));
    }
}

/// Integer line drawing (Bresenham-ish).
fn draw_line(grid: &mut [Vec<char>], x0: usize, y0: usize, x1: usize, y1: usize, ch: char) {
    let mut x0 = x0 as isize;
    let mut y0 = y0 as isize;
    let x1 = x1 as isize;
    let y1 = y1 as isize;

    let dx = (x1 - x0).abs();
    let sx = if x0 < x1 { 1 } else { -1 };
    let dy = -(y1 - y0).abs();
    let sy = if y0 < y1 { 1 } else { -1 };
    let mut err = dx + dy;

    loop {
        if y0 >= 0
            && (y0 as usize) < grid.len()
            && x0 >= 0
            && (x0 as usize) < grid[0].len()
            && grid[y0 as usize][x0 as usize] == ' '
        {
            grid[y0 as usize][x0 as usize] = ch;
        }

        if x0 == x1 && y0 == y1 {
            break;
        }
        let e2 = 2 * err;
        if e2 >= dy {
            err += dy;
            x0 += sx;
        }
        if e2 <= dx {
            err += dx;
            y0 += sy;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::StandardCurvePoint;

    #[test]
    fn plot_golden_snapshot_small() {
        // Two standards exactly on Cq = -1 * log10(SQ) + 20.
        let dataset: StandardCurveDataset = [
            StandardCurvePoint::new(21.0, 0.1),
            StandardCurvePoint::new(20.0, 1.0),
        ]
        .into_iter()
        .collect();
        let curve = FittedCurve {
            slope: -1.0,
            intercept: 20.0,
            r_squared: 1.0,
            efficiency: Some(9.0),
            log_sq_values: vec![-1.0, 0.0],
            warnings: vec![],
        };

        let txt = render_ascii_plot(&dataset, &curve, None, 10, 5);
        let expected = concat!(
            "Plot: log10(SQ)=[-1.000, 0.000] | Cq=[19.95, 21.05]\n",
            "o-\n",
            "  --\n",
            "    --\n",
            "      --\n",
            "        -o\n",
        );
        assert_eq!(txt, expected);
    }

    #[test]
    fn unknown_marker_is_drawn() {
        let dataset = StandardCurveDataset::seed();
        let curve = crate::fit::fit(&dataset).unwrap();
        let marker = PlotMarker {
            log10_sq: crate::models::log_sq_at(&curve, 20.0),
            cq: 20.0,
        };
        let txt = render_ascii_plot(&dataset, &curve, Some(marker), 40, 12);
        let body: String = txt.lines().skip(1).collect();
        assert_eq!(body.matches('X').count(), 1);
        assert_eq!(body.matches('o').count(), 4);
    }
}
