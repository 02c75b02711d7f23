// Copyright 2025 the Xcontrol Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Form data, query objects and query contexts for the chart-data API.

extern crate alloc;

use alloc::string::String;
use alloc::vec::Vec;

use serde::{Deserialize, Deserializer, Serialize};

use crate::metric::{AdhocColumn, ColumnType, ExpressionType, QueryFormColumn, QueryFormMetric};
use crate::operator::{ComparisonType, PostProcessingRule, RollingType};
use crate::value::DataValue;

/// Column label of the implicit time column of timeseries queries.
pub const DTTM_ALIAS: &str = "__timestamp";

/// Separator between a metric label and a time offset in shifted column names.
const TIME_COMPARISON_SEPARATOR: &str = "__";

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Which SQL clause an adhoc filter belongs to.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FilterClause {
    /// Row-level filter.
    #[default]
    #[serde(rename = "WHERE")]
    Where,
    /// Post-aggregation filter.
    #[serde(rename = "HAVING")]
    Having,
}

/// A filter as edited in the filter control.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdhocFilter {
    /// Simple (column/operator/value) or free-form SQL.
    #[serde(default)]
    pub expression_type: ExpressionType,
    /// Target clause.
    #[serde(default)]
    pub clause: FilterClause,
    /// Filtered column, for simple filters.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subject: Option<String>,
    /// Operator (`==`, `IN`, `IS NULL`, ...), for simple filters.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub operator: Option<String>,
    /// Comparison value(s), for simple filters.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comparator: Option<serde_json::Value>,
    /// SQL text, for SQL filters.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sql_expression: Option<String>,
}

/// A simple filter in a query object.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct QueryFilter {
    /// Column.
    pub col: String,
    /// Operator.
    pub op: String,
    /// Value, absent for unary operators.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub val: Option<serde_json::Value>,
}

/// Free-form query clauses.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct QueryExtras {
    /// Time grain of the temporal x axis.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time_grain_sqla: Option<String>,
    /// SQL `WHERE` fragments, each parenthesized and joined with `AND`.
    #[serde(rename = "where", skip_serializing_if = "Option::is_none")]
    pub where_clause: Option<String>,
    /// SQL `HAVING` fragments, each parenthesized and joined with `AND`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub having: Option<String>,
}

/// The query-relevant part of chart form data.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct QueryFormData {
    /// Datasource key (`<id>__<type>`).
    pub datasource: String,
    /// Visualization type.
    pub viz_type: String,
    /// Saved chart id.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub slice_id: Option<i64>,
    /// X-axis column.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub x_axis: Option<QueryFormColumn>,
    /// Time grain applied to a temporal x axis.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time_grain_sqla: Option<String>,
    /// Legacy temporal column.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub granularity_sqla: Option<String>,
    /// Time range expression.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time_range: Option<String>,
    /// Metrics.
    #[serde(deserialize_with = "null_as_default")]
    pub metrics: Vec<QueryFormMetric>,
    /// Dimensions splitting series.
    #[serde(deserialize_with = "null_as_default")]
    pub groupby: Vec<QueryFormColumn>,
    /// Filters.
    #[serde(deserialize_with = "null_as_default")]
    pub adhoc_filters: Vec<AdhocFilter>,
    /// Row limit.
    pub row_limit: u64,
    /// Series limit.
    #[serde(alias = "series_limit", skip_serializing_if = "Option::is_none")]
    pub limit: Option<u64>,
    /// Metric ordering the series limit.
    #[serde(alias = "series_limit_metric", skip_serializing_if = "Option::is_none")]
    pub timeseries_limit_metric: Option<QueryFormMetric>,
    /// Sort descending.
    pub order_desc: bool,
    /// Time offsets to compare against (`1 year ago`, ...).
    #[serde(deserialize_with = "null_as_default")]
    pub time_compare: Vec<String>,
    /// Time comparison mode.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comparison_type: Option<ComparisonType>,
    /// Rolling window mode.
    #[serde(deserialize_with = "null_as_default")]
    pub rolling_type: RollingType,
    /// Rolling window size.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rolling_periods: Option<DataValue>,
    /// Rolling window minimum periods.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_periods: Option<DataValue>,
    /// Resample rule.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resample_rule: Option<String>,
    /// Resample method (`zerofill` is sugar for `asfreq` + 0).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resample_method: Option<String>,
    /// Drop the metric level from series names when there is a single metric.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub truncate_metric: Option<bool>,
    /// Keep series that are entirely empty after pivoting.
    pub show_empty_columns: bool,
    /// Column or metric to sort the x axis by.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub x_axis_sort: Option<String>,
    /// X-axis sort direction.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub x_axis_sort_asc: Option<bool>,
    /// Bypass the server cache.
    pub force: bool,
}

impl Default for QueryFormData {
    fn default() -> Self {
        Self {
            datasource: String::new(),
            viz_type: String::from("echarts_xcontrol"),
            slice_id: None,
            x_axis: None,
            time_grain_sqla: None,
            granularity_sqla: None,
            time_range: None,
            metrics: Vec::new(),
            groupby: Vec::new(),
            adhoc_filters: Vec::new(),
            row_limit: 10_000,
            limit: None,
            timeseries_limit_metric: None,
            order_desc: true,
            time_compare: Vec::new(),
            comparison_type: None,
            rolling_type: RollingType::Off,
            rolling_periods: None,
            min_periods: None,
            resample_rule: None,
            resample_method: None,
            truncate_metric: Some(true),
            show_empty_columns: false,
            x_axis_sort: None,
            x_axis_sort_asc: None,
            force: false,
        }
    }
}

/// A single query of a query context.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct QueryObject {
    /// Time range expression.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time_range: Option<String>,
    /// Legacy temporal column.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub granularity: Option<String>,
    /// Free-form clauses.
    pub extras: QueryExtras,
    /// Simple filters.
    pub filters: Vec<QueryFilter>,
    /// Selected columns (x axis first, then dimensions).
    pub columns: Vec<QueryFormColumn>,
    /// Selected metrics.
    pub metrics: Vec<QueryFormMetric>,
    /// `[metric, ascending]` clauses.
    pub orderby: Vec<(QueryFormMetric, bool)>,
    /// Row limit.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub row_limit: Option<u64>,
    /// Dimensions splitting series.
    pub series_columns: Vec<QueryFormColumn>,
    /// Series limit.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub series_limit: Option<u64>,
    /// Metric ordering the series limit.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub series_limit_metric: Option<QueryFormMetric>,
    /// Sort descending.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub order_desc: Option<bool>,
    /// Legacy timeseries query (no explicit x axis).
    #[serde(skip_serializing_if = "core::ops::Not::not")]
    pub is_timeseries: bool,
    /// Time offsets queried for comparison.
    pub time_offsets: Vec<String>,
    /// Post-processing chain.
    pub post_processing: Vec<PostProcessingRule>,
}

/// Datasource identity, parsed from `<id>__<type>`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatasourceKey {
    /// Numeric id; `None` when the key does not start with an integer.
    pub id: Option<i64>,
    /// Datasource type (`table` or `query`).
    #[serde(rename = "type")]
    pub kind: String,
}

impl DatasourceKey {
    /// Parses a datasource key. Unknown types read as `table`.
    pub fn parse(key: &str) -> Self {
        let (id, kind) = key.split_once("__").unwrap_or((key, ""));
        Self {
            id: id.trim().parse().ok(),
            kind: String::from(if kind == "query" { "query" } else { "table" }),
        }
    }
}

/// A chart-data request: the datasource, the queries, and the form data they came from.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct QueryContext {
    /// Datasource.
    pub datasource: DatasourceKey,
    /// Bypass the server cache.
    pub force: bool,
    /// Queries.
    pub queries: Vec<QueryObject>,
    /// The form data.
    pub form_data: QueryFormData,
    /// Result format.
    pub result_format: String,
    /// Result type.
    pub result_type: String,
}

/// Returns `true` when the form data names an x-axis column.
pub fn is_x_axis_set(form: &QueryFormData) -> bool {
    match &form.x_axis {
        Some(QueryFormColumn::Physical(name)) => !name.is_empty(),
        Some(QueryFormColumn::Adhoc(_)) => true,
        None => false,
    }
}

/// Returns the x axis as a `BASE_AXIS` column carrying the time grain.
pub fn get_x_axis_column(form: &QueryFormData) -> Option<QueryFormColumn> {
    if !is_x_axis_set(form) {
        return None;
    }
    let column = match form.x_axis.as_ref()? {
        QueryFormColumn::Physical(name) => AdhocColumn {
            label: Some(name.clone()),
            sql_expression: name.clone(),
            expression_type: Some(ExpressionType::Sql),
            column_type: Some(ColumnType::BaseAxis),
            time_grain: form.time_grain_sqla.clone(),
        },
        QueryFormColumn::Adhoc(column) => AdhocColumn {
            column_type: Some(ColumnType::BaseAxis),
            time_grain: form.time_grain_sqla.clone(),
            ..column.clone()
        },
    };
    Some(QueryFormColumn::Adhoc(column))
}

/// Returns the label of the x-axis column.
pub fn get_x_axis_label(form: &QueryFormData) -> Option<String> {
    is_x_axis_set(form)
        .then(|| form.x_axis.as_ref().map(QueryFormColumn::label))
        .flatten()
}

/// Pairs each `<metric>__<offset>` column with its source metric, metric-major.
pub fn metric_offsets_map(form: &QueryFormData, query: &QueryObject) -> Vec<(String, String)> {
    let mut out = Vec::new();
    for metric in &query.metrics {
        let label = metric.label();
        for offset in &form.time_compare {
            out.push((
                alloc::format!("{label}{TIME_COMPARISON_SEPARATOR}{offset}"),
                label.clone(),
            ));
        }
    }
    out
}

/// Returns `true` when a comparison type is selected and there is something to compare.
pub fn is_time_comparison(form: &QueryFormData, query: &QueryObject) -> bool {
    form.comparison_type.is_some() && !metric_offsets_map(form, query).is_empty()
}

/// Returns metrics that must be queried in addition to the selected ones.
///
/// The series-limit metric is needed for sorting when there is no groupby and it is not
/// already selected.
pub fn extract_extra_metrics(form: &QueryFormData) -> Vec<QueryFormMetric> {
    let mut extra = Vec::new();
    if let Some(limit_metric) = &form.timeseries_limit_metric
        && form.groupby.is_empty()
        && !form.metrics.contains(limit_metric)
    {
        extra.push(limit_metric.clone());
    }
    extra
}

fn process_filters(filters: &[AdhocFilter]) -> (Vec<QueryFilter>, Option<String>, Option<String>) {
    let mut simple = Vec::new();
    let mut where_parts = Vec::new();
    let mut having_parts = Vec::new();
    for filter in filters {
        match filter.expression_type {
            ExpressionType::Simple => {
                if filter.clause != FilterClause::Where {
                    continue;
                }
                let (Some(col), Some(op)) = (&filter.subject, &filter.operator) else {
                    continue;
                };
                simple.push(QueryFilter {
                    col: col.clone(),
                    op: op.clone(),
                    val: filter.comparator.clone(),
                });
            }
            ExpressionType::Sql => {
                let Some(sql) = filter.sql_expression.as_deref().map(str::trim) else {
                    continue;
                };
                let part = alloc::format!("({sql})");
                match filter.clause {
                    FilterClause::Where => where_parts.push(part),
                    FilterClause::Having => having_parts.push(part),
                }
            }
        }
    }
    let join = |parts: Vec<String>| (!parts.is_empty()).then(|| parts.join(" AND "));
    (simple, join(where_parts), join(having_parts))
}

/// Builds the base query object shared by all queries of a chart.
pub fn build_query_object(form: &QueryFormData) -> QueryObject {
    let (filters, where_clause, having) = process_filters(&form.adhoc_filters);
    QueryObject {
        time_range: form.time_range.clone(),
        granularity: form.granularity_sqla.clone(),
        extras: QueryExtras {
            time_grain_sqla: form.time_grain_sqla.clone(),
            where_clause,
            having,
        },
        filters,
        columns: form.groupby.clone(),
        metrics: form.metrics.clone(),
        orderby: Vec::new(),
        row_limit: Some(form.row_limit),
        series_columns: Vec::new(),
        series_limit: form.limit,
        series_limit_metric: form.timeseries_limit_metric.clone(),
        order_desc: Some(form.order_desc),
        is_timeseries: false,
        time_offsets: Vec::new(),
        post_processing: Vec::new(),
    }
}

/// Ensures a query has a usable `orderby`.
///
/// An existing clause is kept. Otherwise the query is ordered by the series-limit metric, or
/// else by its first metric; `order_desc` and the series-limit metric are folded into the
/// clause and cleared.
pub fn normalize_order_by(mut query: QueryObject) -> QueryObject {
    if !query.orderby.is_empty() {
        return query;
    }
    let ascending = !query.order_desc.take().unwrap_or(false);
    if let Some(metric) = query.series_limit_metric.take() {
        query.orderby.push((metric, ascending));
    } else if let Some(metric) = query.metrics.first().cloned() {
        query.orderby.push((metric, ascending));
    }
    query
}

/// Wraps queries built from `form` into a query context.
pub fn build_query_context(
    form: &QueryFormData,
    build: impl FnOnce(QueryObject) -> Vec<QueryObject>,
) -> QueryContext {
    QueryContext {
        datasource: DatasourceKey::parse(&form.datasource),
        force: form.force,
        queries: build(build_query_object(form)),
        form_data: form.clone(),
        result_format: String::from("json"),
        result_type: String::from("full"),
    }
}

#[cfg(test)]
mod tests {
    extern crate std;

    use alloc::vec;

    use super::*;

    #[test]
    fn form_data_defaults_and_nulls() {
        let fd: QueryFormData = serde_json::from_str(
            r#"{"datasource": "3__table", "metrics": null, "rolling_type": null, "x_axis": "ds"}"#,
        )
        .unwrap();
        assert!(fd.metrics.is_empty());
        assert_eq!(fd.rolling_type, RollingType::Off);
        assert_eq!(fd.row_limit, 10_000);
        assert!(fd.order_desc);
        assert_eq!(fd.truncate_metric, Some(true));
        assert!(is_x_axis_set(&fd));
        assert_eq!(get_x_axis_label(&fd).as_deref(), Some("ds"));
    }

    #[test]
    fn x_axis_column_is_base_axis_with_grain() {
        let fd = QueryFormData {
            x_axis: Some("ds".into()),
            time_grain_sqla: Some("P1D".into()),
            ..QueryFormData::default()
        };
        let Some(QueryFormColumn::Adhoc(column)) = get_x_axis_column(&fd) else {
            panic!("expected adhoc column");
        };
        assert_eq!(column.column_type, Some(ColumnType::BaseAxis));
        assert_eq!(column.time_grain.as_deref(), Some("P1D"));
        assert_eq!(column.sql_expression, "ds");

        let unset = QueryFormData {
            x_axis: Some("".into()),
            ..QueryFormData::default()
        };
        assert!(get_x_axis_column(&unset).is_none());
    }

    #[test]
    fn datasource_keys_parse() {
        assert_eq!(
            DatasourceKey::parse("12__table"),
            DatasourceKey {
                id: Some(12),
                kind: "table".into()
            }
        );
        assert_eq!(DatasourceKey::parse("4__query").kind, "query");
        assert_eq!(DatasourceKey::parse("oops").id, None);
    }

    #[test]
    fn filters_split_by_kind_and_clause() {
        let fd: QueryFormData = serde_json::from_str(
            r#"{"adhoc_filters": [
                {"expressionType": "SIMPLE", "clause": "WHERE", "subject": "region", "operator": "==", "comparator": "EU"},
                {"expressionType": "SQL", "clause": "WHERE", "sqlExpression": "a > 1"},
                {"expressionType": "SQL", "clause": "WHERE", "sqlExpression": "b < 2"},
                {"expressionType": "SQL", "clause": "HAVING", "sqlExpression": "SUM(c) > 0"}
            ]}"#,
        )
        .unwrap();
        let query = build_query_object(&fd);
        assert_eq!(query.filters.len(), 1);
        assert_eq!(query.filters[0].col, "region");
        assert_eq!(query.extras.where_clause.as_deref(), Some("(a > 1) AND (b < 2)"));
        assert_eq!(query.extras.having.as_deref(), Some("(SUM(c) > 0)"));
    }

    #[test]
    fn order_by_falls_back_to_limit_metric_then_first_metric() {
        let mut query = QueryObject {
            metrics: vec![QueryFormMetric::Saved("a".into())],
            order_desc: Some(true),
            ..QueryObject::default()
        };
        let normalized = normalize_order_by(query.clone());
        assert_eq!(
            normalized.orderby,
            vec![(QueryFormMetric::Saved("a".into()), false)]
        );
        assert_eq!(normalized.order_desc, None);

        query.series_limit_metric = Some(QueryFormMetric::Saved("b".into()));
        query.order_desc = Some(false);
        let normalized = normalize_order_by(query);
        assert_eq!(
            normalized.orderby,
            vec![(QueryFormMetric::Saved("b".into()), true)]
        );
        assert_eq!(normalized.series_limit_metric, None);
    }

    #[test]
    fn extra_metrics_only_without_groupby() {
        let mut fd = QueryFormData {
            metrics: vec![QueryFormMetric::Saved("a".into())],
            timeseries_limit_metric: Some(QueryFormMetric::Saved("b".into())),
            ..QueryFormData::default()
        };
        assert_eq!(extract_extra_metrics(&fd).len(), 1);
        fd.groupby.push("region".into());
        assert!(extract_extra_metrics(&fd).is_empty());
        fd.groupby.clear();
        fd.metrics.push(QueryFormMetric::Saved("b".into()));
        assert!(extract_extra_metrics(&fd).is_empty());
    }

    #[test]
    fn time_offsets_pair_with_metrics() {
        let fd = QueryFormData {
            time_compare: vec!["1 week ago".into(), "1 year ago".into()],
            comparison_type: Some(ComparisonType::Values),
            ..QueryFormData::default()
        };
        let query = QueryObject {
            metrics: vec![QueryFormMetric::Saved("m".into())],
            ..QueryObject::default()
        };
        let map = metric_offsets_map(&fd, &query);
        assert_eq!(map[0], ("m__1 week ago".into(), "m".into()));
        assert_eq!(map[1].0, "m__1 year ago");
        assert!(is_time_comparison(&fd, &query));
        assert!(!is_time_comparison(&fd, &QueryObject::default()));
    }

    #[test]
    fn query_context_wraps_queries() {
        let fd = QueryFormData {
            datasource: "7__table".into(),
            ..QueryFormData::default()
        };
        let context = build_query_context(&fd, |q| vec![q.clone(), q]);
        assert_eq!(context.queries.len(), 2);
        let json = serde_json::to_value(&context).unwrap();
        assert_eq!(json["datasource"]["id"], 7);
        assert_eq!(json["datasource"]["type"], "table");
        assert_eq!(json["result_type"], "full");
    }
}
