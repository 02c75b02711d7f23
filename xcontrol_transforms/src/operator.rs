// Copyright 2025 the Xcontrol Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Post-processing operator IR and the rules that derive operators from form data.
//!
//! Operators describe pandas-style reshaping the server applies to a query result before
//! returning it. Each `*_operator` function inspects the form data and the query object it is
//! attached to, and returns `None` when the operator does not apply.

extern crate alloc;

use alloc::collections::BTreeMap;
use alloc::string::String;
use alloc::vec::Vec;

use serde::{Deserialize, Serialize};

use crate::query::{
    DTTM_ALIAS, QueryFormData, QueryObject, get_x_axis_label, is_time_comparison,
    metric_offsets_map,
};

/// How a time-shifted metric is compared with the original.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ComparisonType {
    /// Show shifted values as-is.
    Values,
    /// `original - shifted`.
    Difference,
    /// `original / shifted - 1`.
    Percentage,
    /// `original / shifted`.
    Ratio,
}

/// Rolling-window mode.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RollingType {
    /// No rolling window.
    #[default]
    #[serde(rename = "None")]
    Off,
    /// Cumulative sum.
    #[serde(rename = "cumsum")]
    Cumsum,
    /// Rolling sum.
    #[serde(rename = "sum")]
    Sum,
    /// Rolling mean.
    #[serde(rename = "mean")]
    Mean,
    /// Rolling standard deviation.
    #[serde(rename = "std")]
    Std,
}

/// An aggregate applied to a pivoted value column.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Aggregate {
    /// Aggregate name (e.g. `mean`).
    pub operator: String,
}

impl Aggregate {
    fn mean() -> Self {
        Self {
            operator: String::from("mean"),
        }
    }
}

/// Options of a pivot operator.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PivotOptions {
    /// Index columns (the x axis).
    pub index: Vec<String>,
    /// Columns whose values become column levels.
    pub columns: Vec<String>,
    /// Value column -> aggregate.
    pub aggregates: BTreeMap<String, Aggregate>,
    /// Whether columns that end up entirely empty are dropped.
    pub drop_missing_columns: bool,
}

/// Options of a cumulative operator.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CumOptions {
    /// Cumulative function (`sum`).
    pub operator: String,
    /// Source column -> output column.
    pub columns: BTreeMap<String, String>,
}

/// Options of a rolling-window operator.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RollingOptions {
    /// Window function.
    pub rolling_type: RollingType,
    /// Window size in rows.
    pub window: i64,
    /// Minimum observations required for a value.
    pub min_periods: i64,
    /// Source column -> output column.
    pub columns: BTreeMap<String, String>,
}

/// Options of a time-comparison operator.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompareOptions {
    /// Original metric columns.
    pub source_columns: Vec<String>,
    /// Time-shifted metric columns, aligned with `source_columns`.
    pub compare_columns: Vec<String>,
    /// Comparison function.
    pub compare_type: ComparisonType,
    /// Whether the inputs are dropped from the output.
    pub drop_original_columns: bool,
}

/// Options of a resample operator.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ResampleOptions {
    /// Fill method (`asfreq`, `ffill`, ...).
    pub method: String,
    /// Resample rule (`1D`, `1W`, ...).
    pub rule: String,
    /// Value used for newly created rows.
    pub fill_value: Option<f64>,
}

/// Options of a rename operator.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RenameOptions {
    /// Column -> new name; `None` drops the level label.
    pub columns: BTreeMap<String, Option<String>>,
    /// Column index level to rename.
    pub level: u32,
    /// Whether to rename in place.
    pub inplace: bool,
}

/// Options of a sort operator.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortOptions {
    /// Sort by the index instead of a column.
    #[serde(default, skip_serializing_if = "core::ops::Not::not")]
    pub is_sort_index: bool,
    /// Column to sort by.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub by: Option<String>,
    /// Sort direction.
    pub ascending: bool,
}

/// A single post-processing step.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "operation", content = "options", rename_all = "snake_case")]
pub enum PostProcessingRule {
    /// Pivot long rows into one column per (metric, series) pair.
    Pivot(PivotOptions),
    /// Cumulative function over metric columns.
    Cum(CumOptions),
    /// Rolling-window function over metric columns.
    Rolling(RollingOptions),
    /// Compare time-shifted metrics with the originals.
    Compare(CompareOptions),
    /// Resample the time index.
    Resample(ResampleOptions),
    /// Rename column labels.
    Rename(RenameOptions),
    /// Sort rows.
    Sort(SortOptions),
    /// Flatten a multi-level column index into plain labels.
    Flatten,
}

impl PostProcessingRule {
    /// Returns the operation name as serialized.
    pub fn operation(&self) -> &'static str {
        match self {
            Self::Pivot(_) => "pivot",
            Self::Cum(_) => "cum",
            Self::Rolling(_) => "rolling",
            Self::Compare(_) => "compare",
            Self::Resample(_) => "resample",
            Self::Rename(_) => "rename",
            Self::Sort(_) => "sort",
            Self::Flatten => "flatten",
        }
    }
}

fn series_column_labels(query: &QueryObject) -> Vec<String> {
    let columns = if query.series_columns.is_empty() {
        &query.columns
    } else {
        &query.series_columns
    };
    columns.iter().map(|c| c.label()).collect()
}

fn metric_labels(query: &QueryObject) -> Vec<String> {
    query.metrics.iter().map(|m| m.label()).collect()
}

/// Pivots metrics against the x axis when there is an x axis (or a timeseries query) and at
/// least one metric.
pub fn pivot_operator(form: &QueryFormData, query: &QueryObject) -> Option<PostProcessingRule> {
    let metrics = metric_labels(query);
    let x_label = get_x_axis_label(form);
    if (x_label.is_none() && !query.is_timeseries) || metrics.is_empty() {
        return None;
    }
    let index = alloc::vec![x_label.unwrap_or_else(|| String::from(DTTM_ALIAS))];
    let columns = series_column_labels(query)
        .into_iter()
        .filter(|c| !index.contains(c))
        .collect();
    Some(PostProcessingRule::Pivot(PivotOptions {
        index,
        columns,
        aggregates: metrics
            .into_iter()
            .map(|m| (m, Aggregate::mean()))
            .collect(),
        drop_missing_columns: !form.show_empty_columns,
    }))
}

/// Pivot variant used when time comparison is active: aggregates both the original and the
/// time-shifted metric columns.
pub fn time_compare_pivot_operator(
    form: &QueryFormData,
    query: &QueryObject,
) -> Option<PostProcessingRule> {
    let x_label = get_x_axis_label(form)?;
    if !is_time_comparison(form, query) {
        return None;
    }
    let offsets = metric_offsets_map(form, query);
    let aggregates = offsets
        .iter()
        .map(|(_, metric)| metric)
        .chain(offsets.iter().map(|(shifted, _)| shifted))
        .map(|label| (label.clone(), Aggregate::mean()))
        .collect();
    Some(PostProcessingRule::Pivot(PivotOptions {
        index: alloc::vec![x_label],
        columns: series_column_labels(query),
        aggregates,
        drop_missing_columns: !form.show_empty_columns,
    }))
}

/// Cumulative or rolling window over the metric columns, per `rolling_type`.
pub fn rolling_window_operator(
    form: &QueryFormData,
    query: &QueryObject,
) -> Option<PostProcessingRule> {
    let columns: Vec<String> = if is_time_comparison(form, query) {
        let offsets = metric_offsets_map(form, query);
        offsets
            .iter()
            .map(|(_, metric)| metric.clone())
            .chain(offsets.iter().map(|(shifted, _)| shifted.clone()))
            .collect()
    } else {
        metric_labels(query)
    };
    let columns: BTreeMap<String, String> = columns.into_iter().map(|c| (c.clone(), c)).collect();

    match form.rolling_type {
        RollingType::Off => None,
        RollingType::Cumsum => Some(PostProcessingRule::Cum(CumOptions {
            operator: String::from("sum"),
            columns,
        })),
        rolling_type @ (RollingType::Sum | RollingType::Mean | RollingType::Std) => {
            Some(PostProcessingRule::Rolling(RollingOptions {
                rolling_type,
                window: ensure_int(form.rolling_periods.as_ref(), 1),
                min_periods: ensure_int(form.min_periods.as_ref(), 0),
                columns,
            }))
        }
    }
}

#[allow(
    clippy::cast_possible_truncation,
    reason = "window sizes are small integers; `as` saturates out-of-range values"
)]
fn ensure_int(value: Option<&crate::DataValue>, default: i64) -> i64 {
    value
        .and_then(crate::DataValue::coerce_f64)
        .map_or(default, |v| v as i64)
}

/// Compares time-shifted metrics with the originals, unless the comparison shows raw values.
pub fn time_compare_operator(
    form: &QueryFormData,
    query: &QueryObject,
) -> Option<PostProcessingRule> {
    let compare_type = form.comparison_type?;
    if compare_type == ComparisonType::Values || !is_time_comparison(form, query) {
        return None;
    }
    let offsets = metric_offsets_map(form, query);
    Some(PostProcessingRule::Compare(CompareOptions {
        source_columns: offsets.iter().map(|(_, m)| m.clone()).collect(),
        compare_columns: offsets.iter().map(|(s, _)| s.clone()).collect(),
        compare_type,
        drop_original_columns: true,
    }))
}

/// Resamples the time index; `zerofill` becomes `asfreq` with a zero fill value.
pub fn resample_operator(form: &QueryFormData, _query: &QueryObject) -> Option<PostProcessingRule> {
    let method = form.resample_method.as_deref().filter(|m| !m.is_empty())?;
    let rule = form.resample_rule.as_deref().filter(|r| !r.is_empty())?;
    let zero_fill = method == "zerofill";
    Some(PostProcessingRule::Resample(ResampleOptions {
        method: String::from(if zero_fill { "asfreq" } else { method }),
        rule: String::from(rule),
        fill_value: zero_fill.then_some(0.0),
    }))
}

/// Drops the metric level of column labels when a single metric is split by series columns.
///
/// Only applies with an x axis, `truncate_metric` set, and no derived time comparison.
pub fn rename_operator(form: &QueryFormData, query: &QueryObject) -> Option<PostProcessingRule> {
    let time_comparison = is_time_comparison(form, query);
    let derived_comparison = time_comparison
        && matches!(
            form.comparison_type,
            Some(ComparisonType::Difference | ComparisonType::Ratio | ComparisonType::Percentage)
        );
    let has_x = get_x_axis_label(form).is_some() || query.is_timeseries;
    if query.metrics.len() != 1
        || series_column_labels(query).is_empty()
        || !has_x
        || derived_comparison
        || form.truncate_metric != Some(true)
    {
        return None;
    }

    let mut columns = BTreeMap::new();
    if time_comparison && form.comparison_type == Some(ComparisonType::Values) {
        for (shifted, _) in metric_offsets_map(form, query) {
            let offset = form
                .time_compare
                .iter()
                .find(|offset| shifted.contains(offset.as_str()))
                .cloned();
            columns.insert(shifted, offset);
        }
    }
    columns.insert(query.metrics[0].label(), None);
    Some(PostProcessingRule::Rename(RenameOptions {
        columns,
        level: 0,
        inplace: true,
    }))
}

/// Sorts by the x axis or a metric when an explicit x-axis sort is configured and there is no
/// groupby.
pub fn sort_operator(form: &QueryFormData, _query: &QueryObject) -> Option<PostProcessingRule> {
    let sort_by = form.x_axis_sort.as_deref()?;
    let ascending = form.x_axis_sort_asc?;
    if !form.groupby.is_empty() {
        return None;
    }
    let x_label = get_x_axis_label(form);
    if x_label.as_deref() == Some(sort_by) {
        return Some(PostProcessingRule::Sort(SortOptions {
            is_sort_index: true,
            by: None,
            ascending,
        }));
    }
    if form.metrics.iter().any(|m| m.label() == sort_by) {
        return Some(PostProcessingRule::Sort(SortOptions {
            is_sort_index: false,
            by: Some(String::from(sort_by)),
            ascending,
        }));
    }
    None
}

/// Flattens multi-level column labels; always applies.
pub fn flatten_operator(_form: &QueryFormData, _query: &QueryObject) -> Option<PostProcessingRule> {
    Some(PostProcessingRule::Flatten)
}

#[cfg(test)]
mod tests {
    extern crate std;

    use alloc::vec;

    use super::*;
    use crate::{DataValue, QueryFormColumn, QueryFormMetric};

    fn form() -> QueryFormData {
        QueryFormData {
            x_axis: Some(QueryFormColumn::from("ds")),
            metrics: vec![QueryFormMetric::Saved("sales".into())],
            groupby: vec![QueryFormColumn::from("region")],
            ..QueryFormData::default()
        }
    }

    fn query(form: &QueryFormData) -> QueryObject {
        QueryObject {
            metrics: form.metrics.clone(),
            columns: vec![QueryFormColumn::from("ds"), QueryFormColumn::from("region")],
            series_columns: form.groupby.clone(),
            ..QueryObject::default()
        }
    }

    #[test]
    fn pivot_uses_x_axis_index_and_series_columns() {
        let fd = form();
        let Some(PostProcessingRule::Pivot(options)) = pivot_operator(&fd, &query(&fd)) else {
            panic!("expected pivot");
        };
        assert_eq!(options.index, ["ds"]);
        assert_eq!(options.columns, ["region"]);
        assert_eq!(options.aggregates["sales"].operator, "mean");
        assert!(options.drop_missing_columns);
    }

    #[test]
    fn pivot_needs_metrics() {
        let fd = form();
        let mut q = query(&fd);
        q.metrics.clear();
        assert!(pivot_operator(&fd, &q).is_none());
    }

    #[test]
    fn rolling_rules_follow_rolling_type() {
        let mut fd = form();
        let q = query(&fd);
        assert!(rolling_window_operator(&fd, &q).is_none());

        fd.rolling_type = RollingType::Cumsum;
        assert!(matches!(
            rolling_window_operator(&fd, &q),
            Some(PostProcessingRule::Cum(_))
        ));

        fd.rolling_type = RollingType::Mean;
        fd.rolling_periods = Some(DataValue::from("7"));
        let Some(PostProcessingRule::Rolling(options)) = rolling_window_operator(&fd, &q) else {
            panic!("expected rolling");
        };
        assert_eq!(options.window, 7);
        assert_eq!(options.min_periods, 0);
        assert_eq!(options.columns["sales"], "sales");
    }

    #[test]
    fn time_comparison_drives_compare_and_pivot() {
        let mut fd = form();
        fd.time_compare = vec!["1 year ago".into()];
        fd.comparison_type = Some(ComparisonType::Difference);
        let q = query(&fd);

        let Some(PostProcessingRule::Compare(options)) = time_compare_operator(&fd, &q) else {
            panic!("expected compare");
        };
        assert_eq!(options.source_columns, ["sales"]);
        assert_eq!(options.compare_columns, ["sales__1 year ago"]);

        let Some(PostProcessingRule::Pivot(pivot)) = time_compare_pivot_operator(&fd, &q) else {
            panic!("expected pivot");
        };
        assert!(pivot.aggregates.contains_key("sales__1 year ago"));

        fd.comparison_type = Some(ComparisonType::Values);
        assert!(time_compare_operator(&fd, &q).is_none());
    }

    #[test]
    fn zerofill_resamples_with_asfreq() {
        let mut fd = form();
        fd.resample_method = Some("zerofill".into());
        assert!(resample_operator(&fd, &query(&fd)).is_none());
        fd.resample_rule = Some("1D".into());
        let Some(PostProcessingRule::Resample(options)) = resample_operator(&fd, &query(&fd))
        else {
            panic!("expected resample");
        };
        assert_eq!(options.method, "asfreq");
        assert_eq!(options.fill_value, Some(0.0));
    }

    #[test]
    fn rename_only_for_a_single_metric() {
        let fd = form();
        let q = query(&fd);
        let Some(PostProcessingRule::Rename(options)) = rename_operator(&fd, &q) else {
            panic!("expected rename");
        };
        assert_eq!(options.columns["sales"], None);

        let mut q2 = q.clone();
        q2.metrics.push(QueryFormMetric::Saved("CL".into()));
        assert!(rename_operator(&fd, &q2).is_none());
    }

    #[test]
    fn sort_by_index_or_metric() {
        let mut fd = form();
        fd.groupby.clear();
        fd.x_axis_sort = Some("ds".into());
        fd.x_axis_sort_asc = Some(false);
        let q = query(&fd);
        assert_eq!(
            sort_operator(&fd, &q),
            Some(PostProcessingRule::Sort(SortOptions {
                is_sort_index: true,
                by: None,
                ascending: false,
            }))
        );
        fd.x_axis_sort = Some("sales".into());
        assert!(matches!(
            sort_operator(&fd, &q),
            Some(PostProcessingRule::Sort(SortOptions { by: Some(_), .. }))
        ));
        fd.x_axis_sort = Some("other".into());
        assert!(sort_operator(&fd, &q).is_none());
    }

    #[test]
    fn operators_serialize_adjacently_tagged() {
        let json = serde_json::to_value(PostProcessingRule::Flatten).unwrap();
        assert_eq!(json, serde_json::json!({"operation": "flatten"}));
        let json = serde_json::to_value(PostProcessingRule::Rolling(RollingOptions {
            rolling_type: RollingType::Sum,
            window: 3,
            min_periods: 1,
            columns: BTreeMap::new(),
        }))
        .unwrap();
        assert_eq!(json["operation"], "rolling");
        assert_eq!(json["options"]["rolling_type"], "sum");
    }
}
