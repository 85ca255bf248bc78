//! Character-grid canvas with linear axes.

use std::fmt::Write as _;

/// Width reserved for y-axis tick labels.
const Y_LABEL_WIDTH: usize = 10;

/// Fixed-size character grid mapped onto `[x_min, x_max] × [y_min, y_max]`.
#[derive(Debug, Clone)]
pub struct Canvas {
    width: usize,
    height: usize,
    x_range: (f64, f64),
    y_range: (f64, f64),
    cells: Vec<char>,
}

impl Canvas {
    /// Blank canvas. Degenerate ranges are widened so every value maps.
    #[must_use]
    pub fn new(width: usize, height: usize, x_range: (f64, f64), y_range: (f64, f64)) -> Self {
        let width = width.max(2);
        let height = height.max(2);
        Self {
            width,
            height,
            x_range: widen(x_range),
            y_range: widen(y_range),
            cells: vec![' '; width * height],
        }
    }

    /// Canvas sized to hold every `(x, y)` pair.
    #[must_use]
    pub fn fitted(width: usize, height: usize, xs: &[f64], ys: &[f64]) -> Self {
        Self::new(width, height, data_range(xs), data_range(ys))
    }

    /// Grid column for `x`, if inside the x range.
    fn col(&self, x: f64) -> Option<usize> {
        let (lo, hi) = self.x_range;
        if !x.is_finite() || x < lo || x > hi {
            return None;
        }
        let t = (x - lo) / (hi - lo);
        Some(((t * (self.width - 1) as f64).round() as usize).min(self.width - 1))
    }

    /// Grid row for `y` (row 0 is the top), if inside the y range.
    fn row(&self, y: f64) -> Option<usize> {
        let (lo, hi) = self.y_range;
        if !y.is_finite() || y < lo || y > hi {
            return None;
        }
        let t = (hi - y) / (hi - lo);
        Some(((t * (self.height - 1) as f64).round() as usize).min(self.height - 1))
    }

    /// Marks the cell holding `(x, y)`. Points outside the ranges are dropped.
    pub fn point(&mut self, x: f64, y: f64, mark: char) {
        if let (Some(c), Some(r)) = (self.col(x), self.row(y)) {
            self.cells[r * self.width + c] = mark;
        }
    }

    /// Marks cells along the segment without overwriting existing marks.
    pub fn line(&mut self, from: (f64, f64), to: (f64, f64), mark: char) {
        let steps = self.width * 2;
        for s in 0..=steps {
            let t = s as f64 / steps as f64;
            let x = from.0 + t * (to.0 - from.0);
            let y = from.1 + t * (to.1 - from.1);
            if let (Some(c), Some(r)) = (self.col(x), self.row(y)) {
                let cell = &mut self.cells[r * self.width + c];
                if *cell == ' ' {
                    *cell = mark;
                }
            }
        }
    }

    /// Horizontal rule at `y` on blank cells.
    pub fn hline(&mut self, y: f64, mark: char) {
        let (lo, hi) = self.x_range;
        self.line((lo, y), (hi, y), mark);
    }

    /// Character at grid position, for tests and callers composing layers.
    #[must_use]
    pub fn cell(&self, row: usize, col: usize) -> char {
        self.cells[row * self.width + col]
    }

    /// Grid dimensions `(width, height)`.
    #[must_use]
    pub fn size(&self) -> (usize, usize) {
        (self.width, self.height)
    }

    /// Renders the grid with a left axis, bottom axis and labels.
    #[must_use]
    pub fn render(&self, x_label: &str, y_label: &str) -> String {
        let mut out = String::new();
        let (y_lo, y_hi) = self.y_range;
        let _ = writeln!(out, "{y_label:>w$}", w = Y_LABEL_WIDTH);
        for r in 0..self.height {
            let tick = if r == 0 {
                format_tick(y_hi)
            } else if r == self.height - 1 {
                format_tick(y_lo)
            } else if r == (self.height - 1) / 2 {
                format_tick((y_lo + y_hi) / 2.0)
            } else {
                String::new()
            };
            let row: String = self.cells[r * self.width..(r + 1) * self.width].iter().collect();
            let _ = writeln!(out, "{tick:>w$} │{row}", w = Y_LABEL_WIDTH - 1);
        }
        let _ = writeln!(out, "{:>w$} └{}", "", "─".repeat(self.width), w = Y_LABEL_WIDTH - 1);

        let (x_lo, x_hi) = self.x_range;
        let left = format_tick(x_lo);
        let right = format_tick(x_hi);
        let gap = (self.width + 1).saturating_sub(left.len() + right.len());
        let _ = writeln!(
            out,
            "{:>w$}{left}{}{right}",
            "",
            " ".repeat(gap),
            w = Y_LABEL_WIDTH
        );
        let _ = write!(out, "{:>w$}{x_label:^width$}", "", w = Y_LABEL_WIDTH, width = self.width);
        out
    }
}

/// Finite min/max of `values`, or `(0, 1)` if none are finite.
#[must_use]
pub fn data_range(values: &[f64]) -> (f64, f64) {
    let (lo, hi) = values
        .iter()
        .filter(|v| v.is_finite())
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| {
            (lo.min(v), hi.max(v))
        });
    if lo > hi {
        (0.0, 1.0)
    } else {
        (lo, hi)
    }
}

fn widen((lo, hi): (f64, f64)) -> (f64, f64) {
    if !(lo.is_finite() && hi.is_finite()) {
        return (0.0, 1.0);
    }
    if hi > lo {
        (lo, hi)
    } else {
        let pad = if lo == 0.0 { 1.0 } else { lo.abs() * 0.1 };
        (lo - pad, lo + pad)
    }
}

fn format_tick(v: f64) -> String {
    if v != 0.0 && (v.abs() >= 1e5 || v.abs() < 1e-2) {
        format!("{v:.2e}")
    } else {
        format!("{v:.2}")
    }
}
