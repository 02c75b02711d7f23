// Copyright 2025 the Xcontrol Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Chart-side building blocks for Xcontrol (statistical process control) charts.
//!
//! This crate turns extracted series into descriptors for an `ECharts`-style chart library:
//! - **Series derivation**: plot kind, stack keys, styles, symbols and value labels per series,
//!   including the fixed styling of the reserved control-limit series (`UCL`, `LCL`, `CL`, ...)
//!   and alarm markers for points outside the control band.
//! - **Streamgraph baseline**: the wiggle-minimizing baseline a stream layout stacks on.
//! - **Annotations**: formula, interval, event and timeseries layers.
//! - **Formatting**: d3-style number formats, currencies and time formats.
//! - **Layout helpers**: grid padding, legend placement, axis types and bounds.
//! - **Tooltips**: forecast-aware tooltip rows rendered to markup.
//!
//! Rendering is out of scope; descriptors serialize to the chart library's option JSON.

#![no_std]

extern crate alloc;
#[cfg(feature = "std")]
extern crate std;

mod annotation;
mod baseline;
mod color;
mod control_limit;
#[cfg(not(feature = "std"))]
mod float;
mod format;
mod formula;
mod label;
mod layout;
mod series;
mod series_option;
mod symbol;
mod theme;
mod time;
mod tooltip;

pub use annotation::{
    Annotation, AnnotationData, AnnotationLayer, AnnotationOpacity, AnnotationSourceType,
    AnnotationType, eval_formula, extract_annotation_labels, extract_record_annotations,
    format_annotation_label, parse_annotation_opacity, transform_event_annotation,
    transform_formula_annotation, transform_interval_annotation, transform_timeseries_annotation,
};
pub use baseline::{BASELINE_STACK, baseline_series, compute_baseline};
pub use color::{CategoricalColorScale, ColorScale, CssColor, SUPERSET_COLORS};
pub use control_limit::{
    ControlLimitGroup, ControlLimitRole, ControlLimitStyle, control_limit_metrics,
};
pub use format::{
    Currency, CurrencyFormatter, FormatError, NumberFormat, NumberFormatter,
    OverMaxHiddenFormatter, PERCENT_0_POINT, PERCENT_2_POINT, SMART_NUMBER, SMART_NUMBER_SIGNED,
    SharedFormatter, SymbolPosition, ValueFormatter, build_custom_formatters,
    get_custom_formatter, get_number_formatter, get_percent_formatter, get_series_formatter,
    get_y_axis_formatter,
};
pub use formula::{Formula, FormulaError, MAX_FORMULA_DEPTH};
pub use label::{LabelFormatter, MIN_SAFE_INTEGER};
pub use layout::{
    AxisBound, AxisType, LegendOption, LegendOrientation, LegendSelector, LegendType, Orient,
    PaddingOptions, SelectorLabel, TitlePosition, deserialize_axis_bounds, get_axis_type,
    get_chart_padding, get_legend_props, get_min_and_max_from_bounds, get_padding,
    parse_axis_bound, time_grain_to_timestamp, timeseries_constants,
};
pub use series::{
    OPACITY_NON_TRANSPARENT, OPACITY_SEMI_TRANSPARENT, OPACITY_TRANSPARENT, SeriesType,
    StackMode, TransformSeriesOptions, transform_series,
};
pub use series_option::{
    AreaStyle, DataItem, Emphasis, FontWeight, ItemStyle, LabelOption, LabelPosition, LineStyle,
    LineType, LineWidth, MarkAnchor, MarkArea, MarkLine, SeriesKind, SeriesOption, StackStrategy,
    Step, TooltipToggle, VerticalAlign, dedup_series,
};
pub use symbol::{ALARM_MARKER, IN_CONTROL_MARKER, Symbol, SymbolRule};
pub use theme::Theme;
pub use time::{
    SMART_DATE, SMART_DATE_VERBOSE, TimeFormatter, XValueFormatter, get_time_formatter,
    get_tooltip_time_formatter, get_x_axis_formatter,
};
pub use tooltip::{
    ForecastValue, TooltipFormatter, TooltipParam, escape_html,
    extract_forecast_values_from_tooltip_params, format_forecast_tooltip_series, tooltip_html,
};
