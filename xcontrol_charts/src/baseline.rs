// Copyright 2025 the Xcontrol Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Streamgraph baseline.
//!
//! A stream layout stacks every series on top of an invisible baseline series chosen so that
//! the stack "wiggles" as little as possible (weighted wiggle minimization, Byron and
//! Wattenberg, "Stacked Graphs: Geometry & Aesthetics", 2008).

extern crate alloc;

use alloc::string::String;
use alloc::vec::Vec;

use xcontrol_transforms::SeriesPoint;

use crate::series::SeriesType;
use crate::series_option::{
    AreaStyle, DataItem, LineStyle, SeriesKind, SeriesOption, StackStrategy, TooltipToggle,
};

/// Stack key shared by the baseline and the observation series it supports.
pub const BASELINE_STACK: &str = "obs";

fn y_at(series: &[SeriesPoint], i: usize) -> f64 {
    series.get(i).and_then(|p| p.y).unwrap_or(0.0)
}

fn delta_at(series: &[SeriesPoint], i: usize) -> f64 {
    if i > 0 {
        y_at(series, i) - y_at(series, i - 1)
    } else {
        y_at(series, i)
    }
}

/// Computes the baseline under a stream of `series`.
///
/// All series are sampled at the x positions of the first one; missing values read as zero.
/// The output has one point per x position of the first series, with its x values.
///
/// The weight of series `j` at x index `i` is half its own delta plus the deltas of series
/// `1..j-1` (exclusive), so the first series never contributes to a later series' weight. A
/// column summing to zero divides by zero and yields a non-finite value.
pub fn compute_baseline<S: AsRef<[SeriesPoint]>>(series: &[S]) -> Vec<SeriesPoint> {
    let Some(first) = series.first().map(AsRef::as_ref) else {
        return Vec::new();
    };
    let mut out = Vec::with_capacity(first.len());
    let mut acc = 0.0;
    for (i, point) in first.iter().enumerate() {
        let mut sum = 0.0;
        let mut weighted = 0.0;
        for (j, s) in series.iter().enumerate() {
            let s = s.as_ref();
            let delta = delta_at(s, i);
            let mut delta_prev = 0.0;
            for below in series.iter().take(j.saturating_sub(1)).skip(1) {
                delta_prev += delta_at(below.as_ref(), i);
            }
            let y = y_at(s, i);
            weighted += (0.5 * delta + delta_prev) * y;
            sum += y;
        }
        let raw = -weighted / sum;
        acc = if i == 0 { raw } else { acc + raw };
        out.push(SeriesPoint::new(point.x.clone(), Some(acc)));
    }
    out
}

/// Builds the invisible baseline series for a stream layout.
pub fn baseline_series<S: AsRef<[SeriesPoint]>>(series: &[S], shape: SeriesType) -> SeriesOption {
    let data = compute_baseline(series).iter().map(DataItem::from).collect();
    SeriesOption {
        kind: SeriesKind::Line,
        name: Some(String::from("baseline")),
        data,
        stack: Some(String::from(BASELINE_STACK)),
        stack_strategy: Some(StackStrategy::All),
        line_style: Some(LineStyle::default().with_opacity(0.0)),
        area_style: Some(AreaStyle { opacity: 0.0 }),
        tooltip: Some(TooltipToggle { show: false }),
        silent: Some(true),
        show_symbol: Some(false),
        step: shape.step(),
        smooth: Some(shape == SeriesType::Smooth),
        ..SeriesOption::default()
    }
}

#[cfg(test)]
mod tests {
    extern crate std;

    use alloc::vec;

    use super::*;
    use crate::series_option::Step;

    fn series(ys: &[Option<f64>]) -> Vec<SeriesPoint> {
        ys.iter()
            .enumerate()
            .map(|(i, y)| SeriesPoint::new(i as f64, *y))
            .collect()
    }

    fn assert_close(got: &[SeriesPoint], want: &[f64]) {
        assert_eq!(got.len(), want.len(), "length mismatch");
        for (p, w) in got.iter().zip(want) {
            let y = p.y.unwrap();
            assert!((y - w).abs() < 1e-12, "{y} != {w}");
        }
    }

    #[test]
    fn hand_computed_table() {
        let input = vec![
            series(&[Some(1.0), Some(2.0), Some(3.0)]),
            series(&[Some(2.0), Some(2.0), Some(2.0)]),
            series(&[Some(3.0), Some(1.0), Some(4.0)]),
            series(&[Some(1.0), Some(1.0), Some(2.0)]),
        ];
        // i = 0: deltas [1, 2, 3, 1]; only the fourth series picks up the second's delta.
        //   weighted = 0.5 + 2 + 4.5 + (0.5 + 2) * 1 = 9.5, sum = 7
        // i = 1: deltas [1, 0, -2, 0]; weighted = 1 - 1 = 0, sum = 6
        // i = 2: deltas [1, 0, 3, 1]; weighted = 1.5 + 6 + 1 = 8.5, sum = 11
        let b0 = -9.5 / 7.0;
        let b1 = b0 + (-0.0 / 6.0);
        let b2 = b1 + (-8.5 / 11.0);
        assert_close(&compute_baseline(&input), &[b0, b1, b2]);
    }

    #[test]
    fn output_follows_first_series_domain() {
        let input = vec![
            series(&[Some(1.0), None, Some(3.0), Some(4.0)]),
            series(&[Some(1.0), Some(1.0)]),
        ];
        let out = compute_baseline(&input);
        assert_eq!(out.len(), 4);
        for (i, p) in out.iter().enumerate() {
            assert_eq!(p.x, input[0][i].x);
        }
    }

    #[test]
    fn zero_columns_are_not_guarded() {
        let input = vec![series(&[Some(0.0), Some(1.0)]), series(&[None, Some(1.0)])];
        let out = compute_baseline(&input);
        assert!(out[0].y.unwrap().is_nan());
        assert!(out[1].y.unwrap().is_nan());

        let one = vec![series(&[Some(0.0), Some(-1.0)]), series(&[Some(0.0), Some(1.0)])];
        let out = compute_baseline(&one);
        assert!(out[1].y.unwrap().is_nan());
    }

    #[test]
    fn empty_input() {
        let none: Vec<Vec<SeriesPoint>> = Vec::new();
        assert!(compute_baseline(&none).is_empty());
        assert!(compute_baseline(&[Vec::<SeriesPoint>::new()]).is_empty());
    }

    #[test]
    fn baseline_descriptor() {
        let input = vec![series(&[Some(1.0), Some(2.0)])];
        let s = baseline_series(&input, SeriesType::End);
        assert_eq!(s.name.as_deref(), Some("baseline"));
        assert_eq!(s.stack.as_deref(), Some(BASELINE_STACK));
        assert_eq!(s.stack_strategy, Some(StackStrategy::All));
        assert_eq!(s.step, Some(Step::End));
        assert_eq!(s.smooth, Some(false));
        assert_eq!(s.silent, Some(true));
        assert_eq!(s.show_symbol, Some(false));
        assert_eq!(s.data.len(), 2);

        let smooth = baseline_series(&input, SeriesType::Smooth);
        assert_eq!(smooth.step, None);
        assert_eq!(smooth.smooth, Some(true));
    }
}
