// Copyright 2025 the Xcontrol Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Builds the chart-data query of an Xcontrol chart.

extern crate alloc;

use alloc::vec;
use alloc::vec::Vec;

use xcontrol_charts::control_limit_metrics;
use xcontrol_transforms::{
    Pipeline, QueryContext, QueryFormData, QueryObject, build_query_context,
    extract_extra_metrics, flatten_operator, get_x_axis_column, is_time_comparison,
    is_x_axis_set, normalize_order_by, pivot_operator, rename_operator, resample_operator,
    rolling_window_operator, sort_operator, time_compare_operator, time_compare_pivot_operator,
};

use crate::EchartsXcontrolFormData;

/// Builds the query context for `form`.
///
/// The single query selects the chart metrics plus the bookkeeping metrics (the series-limit
/// metric when needed, then the seven control limits), groups by the x axis and the
/// dimensions, and asks the server to pivot the result into one column per series.
pub fn build_query(form: &EchartsXcontrolFormData) -> QueryContext {
    build_query_context(&form.query, |base| vec![xcontrol_query(&form.query, base)])
}

fn xcontrol_query(form: &QueryFormData, base: QueryObject) -> QueryObject {
    let mut metrics = base.metrics.clone();
    metrics.extend(extract_extra_metrics(form));
    metrics.extend(control_limit_metrics());

    let mut columns: Vec<_> = get_x_axis_column(form).into_iter().collect();
    columns.extend(form.groupby.iter().cloned());

    let mut query = QueryObject {
        metrics,
        columns,
        series_columns: form.groupby.clone(),
        is_timeseries: !is_x_axis_set(form),
        ..base
    };
    tracing::debug!(?query, "xcontrol query object");

    let time_comparison = is_time_comparison(form, &query);
    let pivot = if time_comparison {
        time_compare_pivot_operator(form, &query)
    } else {
        pivot_operator(form, &query)
    };
    let mut pipeline = Pipeline::new();
    pipeline
        .push_opt(pivot)
        .push_opt(rolling_window_operator(form, &query))
        .push_opt(time_compare_operator(form, &query))
        .push_opt(resample_operator(form, &query))
        .push_opt(rename_operator(form, &query))
        .push_opt(sort_operator(form, &query))
        .push_opt(flatten_operator(form, &query));

    query.time_offsets = if time_comparison {
        form.time_compare.clone()
    } else {
        Vec::new()
    };
    query.post_processing = pipeline.into_rules();
    tracing::debug!(post_processing = ?query.post_processing, "xcontrol post-processing");

    let query = normalize_order_by(query);
    tracing::debug!(orderby = ?query.orderby, "xcontrol normalized order");
    query
}

#[cfg(test)]
mod tests {
    extern crate std;

    use alloc::string::String;

    use serde_json::json;
    use xcontrol_charts::ControlLimitRole;
    use xcontrol_transforms::{ColumnType, PostProcessingRule, QueryFormColumn, QueryFormMetric};

    use super::*;

    fn form(json: serde_json::Value) -> EchartsXcontrolFormData {
        serde_json::from_value(json).unwrap()
    }

    fn operations(query: &QueryObject) -> Vec<&'static str> {
        query
            .post_processing
            .iter()
            .map(PostProcessingRule::operation)
            .collect()
    }

    #[test]
    fn control_limits_follow_the_chart_metrics() {
        let ctx = build_query(&form(json!({
            "datasource": "12__table",
            "x_axis": "ds",
            "time_grain_sqla": "P1D",
            "metrics": ["sum__value"],
            "groupby": ["line"],
        })));
        assert_eq!(ctx.queries.len(), 1, "one query per chart");
        let query = &ctx.queries[0];
        let labels: Vec<String> = query.metrics.iter().map(QueryFormMetric::label).collect();
        assert_eq!(
            labels,
            ["sum__value", "UCL", "UCLA", "UCLB", "LCL", "LCLA", "LCLB", "CL"],
        );
        assert!(
            labels[1..]
                .iter()
                .all(|l| ControlLimitRole::from_series_id(l).is_some()),
            "every extra metric is a control limit",
        );
    }

    #[test]
    fn x_axis_becomes_the_base_axis_column() {
        let ctx = build_query(&form(json!({
            "x_axis": "ds",
            "time_grain_sqla": "P1W",
            "metrics": ["count"],
            "groupby": ["plant", "line"],
        })));
        let query = &ctx.queries[0];
        assert!(!query.is_timeseries);
        let QueryFormColumn::Adhoc(axis) = &query.columns[0] else {
            panic!("x axis should be an adhoc column: {:?}", query.columns[0]);
        };
        assert_eq!(axis.column_type, Some(ColumnType::BaseAxis));
        assert_eq!(axis.time_grain.as_deref(), Some("P1W"));
        assert_eq!(&query.columns[1..], &[QueryFormColumn::from("plant"), "line".into()]);
        assert_eq!(query.series_columns, [QueryFormColumn::from("plant"), "line".into()]);
    }

    #[test]
    fn no_x_axis_is_a_timeseries_query() {
        let ctx = build_query(&form(json!({
            "granularity_sqla": "ds",
            "metrics": ["count"],
            "groupby": ["line"],
        })));
        let query = &ctx.queries[0];
        assert!(query.is_timeseries);
        assert_eq!(query.columns, [QueryFormColumn::from("line")]);
    }

    #[test]
    fn post_processing_chain_drops_absent_operators() {
        let ctx = build_query(&form(json!({
            "x_axis": "ds",
            "metrics": ["count"],
        })));
        let query = &ctx.queries[0];
        assert_eq!(operations(query), ["pivot", "flatten"]);
        assert!(query.time_offsets.is_empty());
    }

    #[test]
    fn rolling_and_resample_join_the_chain() {
        let ctx = build_query(&form(json!({
            "x_axis": "ds",
            "metrics": ["count"],
            "rolling_type": "mean",
            "rolling_periods": 7,
            "resample_rule": "1D",
            "resample_method": "zerofill",
        })));
        assert_eq!(
            operations(&ctx.queries[0]),
            ["pivot", "rolling", "resample", "flatten"],
        );
    }

    #[test]
    fn time_comparison_sets_offsets() {
        let ctx = build_query(&form(json!({
            "x_axis": "ds",
            "metrics": ["count"],
            "time_compare": ["1 week ago"],
            "comparison_type": "values",
        })));
        let query = &ctx.queries[0];
        assert_eq!(query.time_offsets, ["1 week ago"]);
        assert_eq!(operations(query)[0], "pivot");
        let PostProcessingRule::Pivot(pivot) = &query.post_processing[0] else {
            panic!("first rule should pivot");
        };
        assert!(
            pivot
                .aggregates
                .iter()
                .any(|(label, _)| label == "count__1 week ago"),
            "shifted metrics are aggregated: {:?}",
            pivot.aggregates,
        );
    }

    #[test]
    fn order_defaults_to_the_first_metric() {
        let ctx = build_query(&form(json!({
            "x_axis": "ds",
            "metrics": ["count"],
            "order_desc": true,
        })));
        let query = &ctx.queries[0];
        assert_eq!(query.orderby, [(QueryFormMetric::Saved("count".into()), false)]);
        assert_eq!(query.order_desc, None);
    }

    #[test]
    fn series_limit_metric_is_queried_and_orders() {
        let ctx = build_query(&form(json!({
            "x_axis": "ds",
            "metrics": ["count"],
            "timeseries_limit_metric": "sum__value",
            "order_desc": false,
        })));
        let query = &ctx.queries[0];
        assert_eq!(query.metrics[1], QueryFormMetric::Saved("sum__value".into()));
        assert_eq!(query.metrics.len(), 9);
        assert_eq!(
            query.orderby,
            [(QueryFormMetric::Saved("sum__value".into()), true)],
        );
    }

    #[test]
    fn context_carries_the_datasource() {
        let ctx = build_query(&form(json!({"datasource": "12__table", "force": true})));
        assert_eq!(ctx.datasource.id, Some(12));
        assert_eq!(ctx.datasource.kind, "table");
        assert!(ctx.force);
        assert_eq!(ctx.result_type, "full");
    }
}
