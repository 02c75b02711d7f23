// Copyright 2025 the Xcontrol Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Value labels of derived series.

extern crate alloc;

use alloc::string::String;
use alloc::vec::Vec;

use crate::format::{SharedFormatter, number_to_string};

/// `-(2^53 - 1)`: the floor used when a point has no label threshold.
pub const MIN_SAFE_INTEGER: f64 = -9_007_199_254_740_991.0;

/// Formats the value label of each point of one series.
///
/// Built once per series at derivation time; [`LabelFormatter::format`] is evaluated per point.
#[derive(Clone, Debug, Default)]
pub struct LabelFormatter {
    formatter: Option<SharedFormatter>,
    stacked: bool,
    expand: bool,
    only_total: bool,
    legend_selected: bool,
    total_stacked_values: Vec<f64>,
    show_value_indexes: Vec<Option<usize>>,
    threshold_values: Vec<f64>,
}

impl LabelFormatter {
    /// Creates a label formatter for an unstacked, legend-selected series.
    pub fn new(formatter: Option<SharedFormatter>) -> Self {
        Self {
            formatter,
            legend_selected: true,
            ..Self::default()
        }
    }

    /// Sets the stacking state; `expand` means values are shares of 1.
    pub fn with_stacking(mut self, stacked: bool, expand: bool) -> Self {
        self.stacked = stacked;
        self.expand = expand;
        self
    }

    /// Shows only the stack totals (on the designated series of each x).
    pub fn with_only_total(mut self, only_total: bool) -> Self {
        self.only_total = only_total;
        self
    }

    /// Sets whether the series is selected in the legend.
    pub fn with_legend_selected(mut self, selected: bool) -> Self {
        self.legend_selected = selected;
        self
    }

    /// Sets the per-x stack totals, the series index holding each total, and the per-x
    /// label thresholds.
    pub fn with_totals(
        mut self,
        total_stacked_values: Vec<f64>,
        show_value_indexes: Vec<Option<usize>>,
        threshold_values: Vec<f64>,
    ) -> Self {
        self.total_stacked_values = total_stacked_values;
        self.show_value_indexes = show_value_indexes;
        self.threshold_values = threshold_values;
        self
    }

    /// Formats the label of the point at `data_index` of the series at `series_index`.
    pub fn format(&self, value: f64, data_index: usize, series_index: usize) -> String {
        let Some(formatter) = &self.formatter else {
            return number_to_string(value);
        };
        if !self.stacked && self.legend_selected {
            return formatter.format(value);
        }
        if !self.only_total {
            let threshold = self
                .threshold_values
                .get(data_index)
                .copied()
                .filter(|t| *t != 0.0 && !t.is_nan())
                .unwrap_or(MIN_SAFE_INTEGER);
            return if value >= threshold {
                formatter.format(value)
            } else {
                String::new()
            };
        }
        if self.show_value_indexes.get(data_index).copied().flatten() == Some(series_index) {
            let total = if self.expand {
                1.0
            } else {
                self.total_stacked_values
                    .get(data_index)
                    .copied()
                    .unwrap_or(f64::NAN)
            };
            return formatter.format(total);
        }
        String::new()
    }
}

#[cfg(test)]
mod tests {
    extern crate std;

    use alloc::vec;

    use super::*;
    use crate::format::get_number_formatter;

    fn fixed() -> Option<SharedFormatter> {
        Some(get_number_formatter(Some(".1f")))
    }

    #[test]
    fn raw_value_without_formatter() {
        assert_eq!(LabelFormatter::new(None).format(2.5, 0, 0), "2.5");
        assert_eq!(LabelFormatter::new(None).format(1e21, 0, 0), "1e+21");
    }

    #[test]
    fn unstacked_selected_series_formats_value() {
        let label = LabelFormatter::new(fixed());
        assert_eq!(label.format(3.0, 7, 1), "3.0");
    }

    #[test]
    fn stacked_values_below_threshold_are_hidden() {
        let label = LabelFormatter::new(fixed())
            .with_stacking(true, false)
            .with_totals(vec![10.0, 20.0], vec![Some(1), Some(0)], vec![4.0, 0.0]);
        assert_eq!(label.format(3.0, 0, 0), "");
        assert_eq!(label.format(4.0, 0, 0), "4.0");
        // A zero threshold compares against the safe-integer floor.
        assert_eq!(label.format(-5.0, 1, 0), "-5.0");
        // No threshold for the index at all.
        assert_eq!(label.format(1.0, 9, 0), "1.0");
    }

    #[test]
    fn deselected_legend_entries_use_thresholds() {
        let label = LabelFormatter::new(fixed())
            .with_legend_selected(false)
            .with_totals(vec![], vec![], vec![5.0]);
        assert_eq!(label.format(3.0, 0, 0), "");
    }

    #[test]
    fn totals_only_on_the_holding_series() {
        let label = LabelFormatter::new(fixed())
            .with_stacking(true, false)
            .with_only_total(true)
            .with_totals(vec![10.0, 20.0], vec![Some(1), None], vec![]);
        assert_eq!(label.format(3.0, 0, 1), "10.0");
        assert_eq!(label.format(3.0, 0, 0), "");
        assert_eq!(label.format(3.0, 1, 0), "");

        let expand = label.with_stacking(true, true);
        assert_eq!(expand.format(0.3, 0, 1), "1.0");
    }
}
