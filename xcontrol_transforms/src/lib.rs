// Copyright 2025 the Xcontrol Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Query IR and data-side transforms for Xcontrol charts.
//!
//! This crate provides:
//! - a small query IR (metrics, columns, post-processing operators, query objects/contexts)
//!   that serializes to the chart-data API payload, and
//! - the client-side reshaping of query results into named series (forecast rebasing,
//!   series extraction, stacked totals).
//!
//! Nothing here executes SQL or post-processing; operators are descriptions for the server.

#![no_std]

extern crate alloc;
#[cfg(feature = "std")]
extern crate std;

mod extract;
mod forecast;
mod metric;
mod operator;
mod pipeline;
mod query;
mod record;
mod value;

pub use extract::{
    DataTotals, ExtractSeriesOptions, ExtractedSeries, RawSeries, SeriesPoint,
    extract_data_total_values, extract_series, extract_show_value_indexes, get_original_series,
    get_time_compare_stack_id, rebase_forecast_datum,
};
pub use forecast::{
    ForecastRole, ForecastRoles, ForecastSeriesContext, extract_forecast_series_context,
    extract_forecast_series_contexts,
};
pub use metric::{
    AdhocColumn, AdhocMetric, ColumnRef, ColumnType, ExpressionType, QueryFormColumn,
    QueryFormMetric,
};
pub use operator::{
    Aggregate, CompareOptions, ComparisonType, CumOptions, PivotOptions, PostProcessingRule,
    RenameOptions, ResampleOptions, RollingOptions, RollingType, SortOptions, flatten_operator,
    pivot_operator, rename_operator, resample_operator, rolling_window_operator, sort_operator,
    time_compare_operator, time_compare_pivot_operator,
};
pub use pipeline::Pipeline;
pub use query::{
    AdhocFilter, DTTM_ALIAS, DatasourceKey, FilterClause, QueryContext, QueryExtras, QueryFilter,
    QueryFormData, QueryObject, build_query_context, build_query_object, extract_extra_metrics,
    get_x_axis_column, get_x_axis_label, is_time_comparison, is_x_axis_set, metric_offsets_map,
    normalize_order_by,
};
pub use record::{
    AnnotationResult, DataRecord, GenericDataType, QueryResult, RecordAnnotations, RecordFrame,
    TimeseriesAnnotationPoint, TimeseriesAnnotationSeries,
};
pub use value::DataValue;
