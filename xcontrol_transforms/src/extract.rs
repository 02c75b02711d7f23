// Copyright 2025 the Xcontrol Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Reshaping query results into named series.

extern crate alloc;

use alloc::collections::BTreeMap;
use alloc::format;
use alloc::string::String;
use alloc::vec::Vec;

use hashbrown::HashMap;

use crate::forecast::{ForecastRole, extract_forecast_series_context};
use crate::query::DTTM_ALIAS;
use crate::record::{DataRecord, RecordFrame};
use crate::value::DataValue;

/// One `(x, y)` observation of a series.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SeriesPoint {
    /// X value (category, number or epoch milliseconds).
    pub x: DataValue,
    /// Y value; `None` for a missing observation.
    pub y: Option<f64>,
}

impl SeriesPoint {
    /// Creates a point.
    pub fn new(x: impl Into<DataValue>, y: Option<f64>) -> Self {
        Self { x: x.into(), y }
    }
}

/// A named series extracted from a result column.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct RawSeries {
    /// Series id (the column label).
    pub id: String,
    /// Display name.
    pub name: String,
    /// Points in row order.
    pub data: Vec<SeriesPoint>,
}

/// Options for [`extract_series`].
#[derive(Clone, Debug, PartialEq)]
pub struct ExtractSeriesOptions {
    /// Value substituted for a missing cell that has a defined neighbor.
    pub fill_neighbor_value: Option<f64>,
    /// X-axis column label.
    pub x_axis: String,
    /// Columns that were queried for bookkeeping and must not become series.
    pub extra_metric_labels: Vec<String>,
    /// Drop points with a missing x or y.
    pub remove_nulls: bool,
}

impl Default for ExtractSeriesOptions {
    fn default() -> Self {
        Self {
            fill_neighbor_value: None,
            x_axis: String::from(DTTM_ALIAS),
            extra_metric_labels: Vec::new(),
            remove_nulls: false,
        }
    }
}

/// Output of [`extract_series`].
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ExtractedSeries {
    /// One series per value column, in column order.
    pub series: Vec<RawSeries>,
    /// Smallest strictly positive y across all series (log axes start there).
    pub min_positive_value: Option<f64>,
}

/// Turns every non-x column of `frame` into a series.
pub fn extract_series(frame: &RecordFrame, opts: &ExtractSeriesOptions) -> ExtractedSeries {
    let mut min_positive_value: Option<f64> = None;
    let rows = &frame.rows;
    let series = frame
        .columns
        .iter()
        .filter(|key| **key != opts.x_axis && !opts.extra_metric_labels.contains(key))
        .map(|key| {
            let cell = |idx: usize| rows.get(idx).and_then(|row| row.get(key));
            let defined = |idx: Option<usize>| {
                idx.and_then(|i| cell(i))
                    .is_some_and(DataValue::is_defined)
            };
            let data = rows
                .iter()
                .enumerate()
                .filter_map(|(idx, row)| {
                    let raw = row.get(key).unwrap_or(&DataValue::Null);
                    let mut y = raw.coerce_f64();
                    if !raw.is_defined()
                        && (defined(idx.checked_sub(1)) || defined(Some(idx + 1)))
                        && let Some(fill) = opts.fill_neighbor_value
                    {
                        y = Some(fill);
                    }
                    if let Some(v) = y
                        && v > 0.0
                    {
                        min_positive_value = Some(min_positive_value.map_or(v, |m| m.min(v)));
                    }
                    let x = row.get(&opts.x_axis).cloned().unwrap_or_default();
                    if opts.remove_nulls && (!x.is_defined() || y.is_none()) {
                        return None;
                    }
                    Some(SeriesPoint { x, y })
                })
                .collect();
            RawSeries {
                id: key.clone(),
                name: key.clone(),
                data,
            }
        })
        .collect::<Vec<_>>();
    tracing::debug!(
        series = series.len(),
        rows = rows.len(),
        x_axis = %opts.x_axis,
        "extracted series"
    );
    ExtractedSeries {
        series,
        min_positive_value,
    }
}

/// Rebases forecast bounds and applies verbose names.
///
/// Upper bounds become `upper - lower` so the band stacks on top of the lower bound. Column
/// labels are renamed through `verbose_map` by their base name, keeping the forecast suffix;
/// the implicit time column is never renamed.
pub fn rebase_forecast_datum(
    frame: &RecordFrame,
    verbose_map: &BTreeMap<String, String>,
) -> RecordFrame {
    let rename = |key: &str| -> String {
        let ctx = extract_forecast_series_context(key);
        match verbose_map.get(ctx.name) {
            Some(verbose) if key != DTTM_ALIAS => format!("{verbose}{}", ctx.role.suffix()),
            _ => String::from(key),
        }
    };
    let columns = frame.columns.iter().map(|c| rename(c)).collect();
    let rows = frame
        .rows
        .iter()
        .map(|row| {
            row.iter()
                .map(|(key, value)| {
                    let ctx = extract_forecast_series_context(key);
                    let mut value = value.clone();
                    if ctx.role == ForecastRole::Upper {
                        let lower_key = format!("{}{}", ctx.name, ForecastRole::Lower.suffix());
                        if let (Some(upper), Some(lower)) = (
                            value.as_f64(),
                            row.get(&lower_key).and_then(DataValue::as_f64),
                        ) {
                            value = DataValue::Number(upper - lower);
                        }
                    }
                    (rename(key), value)
                })
                .collect::<DataRecord>()
        })
        .collect();
    RecordFrame::new(columns, rows)
}

/// Picks, per x index, the series that carries stacked value labels.
///
/// Without stacking every series labels itself and the result is empty. In show-all mode the
/// last series with a non-null value wins. In only-totals mode the last strictly positive
/// series wins; a non-null value also claims an index that is unclaimed or held by series 0.
pub fn extract_show_value_indexes(
    series: &[RawSeries],
    stack: bool,
    only_total: bool,
    legend_state: Option<&HashMap<String, bool>>,
) -> Vec<Option<usize>> {
    let mut indexes: Vec<Option<usize>> = Vec::new();
    if !stack {
        return indexes;
    }
    for (series_index, entry) in series.iter().enumerate() {
        if legend_state.is_some_and(|state| !state.get(&entry.name).copied().unwrap_or(false)) {
            continue;
        }
        for (data_index, point) in entry.data.iter().enumerate() {
            if indexes.len() <= data_index {
                indexes.resize(data_index + 1, None);
            }
            let slot = &mut indexes[data_index];
            if !only_total {
                if point.y.is_some() {
                    *slot = Some(series_index);
                }
                continue;
            }
            if point.y.is_some_and(|v| v > 0.0) {
                *slot = Some(series_index);
            }
            if matches!(*slot, None | Some(0)) && point.y.is_some() {
                *slot = Some(series_index);
            }
        }
    }
    indexes
}

/// Per-row stacked totals and label thresholds.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct DataTotals {
    /// Sum of all non-x columns per row (missing/non-numeric read as 0).
    pub total_stacked_values: Vec<f64>,
    /// `percentage_threshold / 100 * total` per row.
    pub threshold_values: Vec<f64>,
}

/// Computes stacked totals per row; empty unless stacking.
///
/// With a legend state, only selected columns count.
pub fn extract_data_total_values(
    frame: &RecordFrame,
    stack: bool,
    percentage_threshold: f64,
    x_axis: &str,
    legend_state: Option<&HashMap<String, bool>>,
) -> DataTotals {
    let mut totals = DataTotals::default();
    if !stack {
        return totals;
    }
    for row in &frame.rows {
        let total: f64 = row
            .iter()
            .filter(|(key, _)| key.as_str() != x_axis)
            .filter(|(key, _)| {
                legend_state.is_none_or(|state| state.get(key.as_str()).copied().unwrap_or(false))
            })
            .map(|(_, value)| value.as_f64().unwrap_or(0.0))
            .sum();
        totals.total_stacked_values.push(total);
        totals
            .threshold_values
            .push(percentage_threshold / 100.0 * total);
    }
    totals
}

/// Strips time-comparison suffixes (`__<offset>`) so shifted series share a color key.
pub fn get_original_series(series_name: &str, time_compare: &[String]) -> String {
    let mut result = String::from(series_name);
    for compare in time_compare {
        result = result.replacen(&format!("__{compare}"), "", 1);
    }
    result
}

/// Returns the time offset a series belongs to, so each offset stacks separately, or
/// `default_id` when the series is not time-shifted.
pub fn get_time_compare_stack_id(default_id: &str, time_compare: &[String], name: &str) -> String {
    time_compare
        .iter()
        .find(|value| name.contains(&format!("{value},")) || name.contains(&format!("__{value}")))
        .cloned()
        .unwrap_or_else(|| String::from(default_id))
}
