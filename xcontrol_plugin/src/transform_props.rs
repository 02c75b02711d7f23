// Copyright 2025 the Xcontrol Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Assembles the chart option of an Xcontrol chart from query results.

extern crate alloc;

use alloc::collections::BTreeMap;
use alloc::format;
use alloc::string::String;
use alloc::sync::Arc;
use alloc::vec::Vec;

use hashbrown::HashMap;
use serde::Deserialize;
use xcontrol_charts::{
    AnnotationType, AxisBound, AxisType, BASELINE_STACK, CategoricalColorScale, ColorScale,
    Currency, CurrencyFormatter, OverMaxHiddenFormatter, PERCENT_0_POINT, PaddingOptions,
    SeriesOption, SeriesType, SharedFormatter, StackMode, Theme, TitlePosition,
    TooltipFormatter, TransformSeriesOptions, XValueFormatter, baseline_series,
    build_custom_formatters, dedup_series, extract_annotation_labels, get_axis_type,
    get_legend_props, get_min_and_max_from_bounds, get_number_formatter, get_padding,
    get_series_formatter, get_tooltip_time_formatter, get_x_axis_formatter,
    get_y_axis_formatter, time_grain_to_timestamp, transform_event_annotation,
    transform_formula_annotation, transform_interval_annotation, transform_series,
    transform_timeseries_annotation,
};
use xcontrol_transforms::{
    DTTM_ALIAS, ExtractSeriesOptions, ForecastRole, GenericDataType, QueryFormColumn,
    QueryResult, RawSeries, RecordFrame, SeriesPoint, extract_data_total_values,
    extract_extra_metrics, extract_forecast_series_context, extract_forecast_series_contexts,
    extract_series, extract_show_value_indexes, get_original_series, get_x_axis_label,
    rebase_forecast_datum,
};

use crate::option::{
    AxisFormatter, AxisLabel, AxisOption, DataZoom, EchartsOption, Grid, NameLocation, Show,
    Toolbox, TooltipOption, TooltipTrigger,
};
use crate::{ContributionMode, EchartsXcontrolFormData, FormDataError};

/// Appended to every stack key so stacks never collide with another chart's on a dashboard.
pub const STACK_ID_SUFFIX: &str = "\na";

/// Display metadata of the queried dataset.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DatasourceMeta {
    /// Column or metric name -> verbose name.
    pub verbose_map: BTreeMap<String, String>,
    /// Metric name -> currency.
    pub currency_formats: BTreeMap<String, Currency>,
    /// Metric name -> d3 format.
    pub column_formats: BTreeMap<String, String>,
}

/// Cross-filter state of the chart.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FilterState {
    /// Series selected by a cross filter; others are dimmed.
    pub selected_values: Option<Vec<String>>,
}

/// Everything chart assembly reads.
#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ChartProps {
    /// Chart width in pixels.
    pub width: f64,
    /// Chart height in pixels.
    pub height: f64,
    /// Form data.
    pub form_data: EchartsXcontrolFormData,
    /// Query results; the first carries the chart data and annotation data.
    pub queries_data: Vec<QueryResult>,
    /// Dataset metadata.
    pub datasource: DatasourceMeta,
    /// Cross-filter state.
    pub filter_state: FilterState,
    /// Host theme.
    #[serde(skip)]
    pub theme: Theme,
    /// Rendered inside a context menu drill view: no tooltips.
    pub in_context_menu: bool,
    /// Clicking a series emits a cross filter.
    pub emit_cross_filters: bool,
    /// Series name -> selected in the legend.
    pub legend_state: Option<BTreeMap<String, bool>>,
}

impl Default for ChartProps {
    fn default() -> Self {
        Self {
            width: 800.0,
            height: 600.0,
            form_data: EchartsXcontrolFormData::default(),
            queries_data: Vec::new(),
            datasource: DatasourceMeta::default(),
            filter_state: FilterState::default(),
            theme: Theme::default(),
            in_context_menu: false,
            emit_cross_filters: false,
            legend_state: None,
        }
    }
}

impl ChartProps {
    /// Parses chart props from JSON. The theme is not part of the payload.
    pub fn from_json(json: &str) -> Result<Self, FormDataError> {
        serde_json::from_str(json).map_err(|err| FormDataError::json("chart props", &err))
    }

    /// Sets the theme.
    pub fn with_theme(mut self, theme: Theme) -> Self {
        self.theme = theme;
        self
    }
}

/// The x axis as seen by interactions.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct XAxisDescriptor {
    /// Column label of the x values (verbose when available).
    pub label: String,
    /// Axis kind.
    pub axis_type: AxisType,
}

/// Output of [`transform_props`].
#[derive(Clone, Debug)]
pub struct XcontrolChartProps {
    /// The form data the chart was built from.
    pub form_data: EchartsXcontrolFormData,
    /// Chart width in pixels.
    pub width: f64,
    /// Chart height in pixels.
    pub height: f64,
    /// The chart option.
    pub echart_options: EchartsOption,
    /// Clicking a series emits a cross filter.
    pub emit_cross_filters: bool,
    /// Series name -> label parts.
    pub label_map: BTreeMap<String, Vec<String>>,
    /// Dimensions.
    pub groupby: Vec<QueryFormColumn>,
    /// Number of extracted series.
    pub series_breakdown: usize,
    /// Cross-filter selection.
    pub selected_values: Vec<String>,
    /// Formats x values for cross-filter labels.
    pub x_value_formatter: XValueFormatter,
    /// The x axis.
    pub x_axis: XAxisDescriptor,
    /// Column -> generic data type.
    pub coltype_mapping: BTreeMap<String, GenericDataType>,
    /// Tooltip markup builder; pass the focused series per call.
    pub tooltip: TooltipFormatter,
}

/// Builds the chart option with the default categorical palette.
pub fn transform_props(props: &ChartProps) -> XcontrolChartProps {
    transform_props_with_colors(props, &CategoricalColorScale::default())
}

/// Builds the chart option, coloring series with `colors`.
pub fn transform_props_with_colors(
    props: &ChartProps,
    colors: &dyn ColorScale,
) -> XcontrolChartProps {
    let form = &props.form_data;
    let query_form = &form.query;
    let empty = QueryResult::default();
    let result = props.queries_data.first().unwrap_or(&empty);
    tracing::debug!(rows = result.data.len(), columns = ?result.colnames, "xcontrol query result");

    let verbose_map = &props.datasource.verbose_map;
    let label_map = &result.label_map;
    let data = &result.data;
    let annotation_data = &result.annotation_data;
    let coltype_mapping = result.coltype_mapping();
    let stacked = form.stack.is_stacked();
    let contribution = form.is_contribution();
    let legend_state: Option<HashMap<String, bool>> = props
        .legend_state
        .as_ref()
        .map(|state| state.iter().map(|(k, v)| (k.clone(), *v)).collect());

    let mut x_axis_label =
        get_x_axis_label(query_form).unwrap_or_else(|| String::from(DTTM_ALIAS));
    if query_form
        .x_axis
        .as_ref()
        .is_some_and(QueryFormColumn::is_physical)
        && let Some(verbose) = verbose_map.get(&x_axis_label)
    {
        x_axis_label = verbose.clone();
    }

    let rebased = rebase_forecast_datum(&RecordFrame::from_result(result), verbose_map);
    let extra_metric_labels = extract_extra_metrics(query_form)
        .iter()
        .map(|m| m.label())
        .collect();
    let raw_series = extract_series(
        &rebased,
        &ExtractSeriesOptions {
            fill_neighbor_value: stacked.then_some(0.0),
            x_axis: x_axis_label.clone(),
            extra_metric_labels,
            remove_nulls: false,
        },
    )
    .series;
    tracing::debug!(series = raw_series.len(), "xcontrol raw series");

    let x_axis_data_type = coltype_mapping.get(&x_axis_label).copied().or_else(|| {
        query_form
            .x_axis
            .as_ref()
            .and_then(|column| coltype_mapping.get(&column.label()).copied())
    });
    let x_axis_type = get_axis_type(stacked, form.x_axis_force_categorical, x_axis_data_type);
    let is_temporal = x_axis_data_type == Some(GenericDataType::Temporal);
    let is_bar = form.series_type == SeriesType::Bar;

    let metrics = &query_form.metrics;
    let formatter: SharedFormatter = if contribution {
        get_number_formatter(Some(PERCENT_0_POINT))
    } else if let Some(currency) = form.currency() {
        Arc::new(CurrencyFormatter::new(
            currency.clone(),
            Some(form.y_axis_format.as_str()),
        ))
    } else {
        get_number_formatter(Some(form.y_axis_format.as_str()))
    };
    let custom_formatters = build_custom_formatters(
        metrics,
        &props.datasource.currency_formats,
        &props.datasource.column_formats,
        &form.y_axis_format,
        form.currency(),
    );

    let show_value_indexes =
        extract_show_value_indexes(&raw_series, stacked, form.only_total, legend_state.as_ref());
    let totals = extract_data_total_values(
        &rebased,
        stacked,
        form.percentage_threshold,
        &x_axis_label,
        legend_state.as_ref(),
    );

    let mut series = annotation_series(props, result, &x_axis_label, x_axis_type, colors);
    let annotation_count = series.len();

    let [x_axis_min, x_axis_max] = form.x_axis_bounds;
    let [mut y_axis_min, mut y_axis_max] = form.y_axis_bounds;

    let inverted: BTreeMap<String, String> = verbose_map
        .iter()
        .map(|(name, verbose)| (verbose.clone(), name.clone()))
        .collect();
    let mut opts = TransformSeriesOptions {
        area: form.area,
        selected_values: props.filter_state.selected_values.clone(),
        series_contexts: extract_forecast_series_contexts(
            raw_series.iter().map(|s| s.name.as_str()),
        ),
        marker_enabled: form.marker_enabled,
        marker_size: Some(form.marker_size),
        area_opacity: form.opacity,
        series_type: form.series_type,
        stack: form.stack,
        stack_id_suffix: Some(String::from(STACK_ID_SUFFIX)),
        y_axis_index: form.y_axis_index,
        xcontrol_show_custom: form.xcontrol_show_custom,
        show_value: form.show_value,
        only_total: form.only_total,
        legend_state: legend_state.clone(),
        total_stacked_values: totals.total_stacked_values,
        show_value_indexes,
        threshold_values: totals.threshold_values,
        rich_tooltip: form.rich_tooltip,
        slice_id: query_form.slice_id,
        query_index: 0,
        time_compare: query_form.time_compare.clone(),
        ..TransformSeriesOptions::default()
    };
    for (index, entry) in raw_series.iter().enumerate() {
        let series_name = inverted.get(&entry.name).unwrap_or(&entry.name);
        let color_key = get_original_series(series_name, &query_form.time_compare);
        let metric_key = label_map
            .get(series_name)
            .and_then(|parts| parts.first())
            .map(String::as_str);
        let series_formatter = get_series_formatter(
            &custom_formatters,
            &formatter,
            metrics,
            metric_key,
            contribution,
        );
        let series_formatter: SharedFormatter = if is_bar {
            Arc::new(OverMaxHiddenFormatter::new(y_axis_max, series_formatter))
        } else {
            series_formatter
        };
        opts.formatter = Some(series_formatter);
        if let Some(mut option) = transform_series(entry, colors, &color_key, &opts, data) {
            option.materialize(index);
            series.push(option);
        }
    }

    if form.stack == StackMode::Stream {
        series.insert(
            annotation_count,
            stream_baseline(&raw_series, form.series_type),
        );
    }
    dedup_series(&mut series);

    if form.contribution_mode == Some(ContributionMode::Row) && stacked {
        y_axis_min.get_or_insert(0.0);
        y_axis_max.get_or_insert(1.0);
    }

    let x_value_formatter = if is_temporal {
        XValueFormatter::Time(get_tooltip_time_formatter(
            form.tooltip_time_format.as_deref(),
        ))
    } else {
        XValueFormatter::Plain
    };
    let x_axis_formatter = is_temporal
        .then(|| get_x_axis_formatter(form.x_axis_time_format.as_deref()))
        .flatten()
        .map_or(AxisFormatter::Auto, AxisFormatter::Time);

    let padding = get_padding(&PaddingOptions {
        show_legend: form.show_legend,
        legend_orientation: form.legend_orientation,
        legend_margin: form.legend_margin,
        y_axis_title: !form.y_axis_title.is_empty(),
        zoomable: form.zoomable,
        x_axis_title: !form.x_axis_title.is_empty(),
        y_axis_title_position: Some(form.y_axis_title_position),
        y_axis_title_margin: form.y_axis_title_margin,
        x_axis_title_margin: form.x_axis_title_margin,
        is_horizontal: false,
    });

    let (x_min, x_max) = get_min_and_max_from_bounds(
        x_axis_type,
        form.truncate_x_axis,
        x_axis_min,
        x_axis_max,
        is_bar,
    );
    let min_interval = match (x_axis_type, query_form.time_grain_sqla.as_deref()) {
        (AxisType::Time, Some(grain)) => time_grain_to_timestamp(grain),
        _ => Some(0.0),
    };
    let x_axis = AxisOption {
        axis_type: x_axis_type,
        name: form.x_axis_title.clone(),
        name_gap: form.x_axis_title_margin,
        name_location: NameLocation::Middle,
        axis_label: AxisLabel {
            rotate: Some(form.x_axis_label_rotation),
            formatter: x_axis_formatter,
        },
        minor_tick: Show::new(form.minor_ticks),
        min_interval,
        min: x_min,
        max: x_max,
        ..AxisOption::default()
    };
    let y_axis = AxisOption {
        axis_type: if form.log_axis {
            AxisType::Log
        } else {
            AxisType::Value
        },
        name: form.y_axis_title.clone(),
        name_gap: form.y_axis_title_margin,
        name_location: if form.y_axis_title_position == TitlePosition::Left {
            NameLocation::Middle
        } else {
            NameLocation::End
        },
        axis_label: AxisLabel {
            rotate: None,
            formatter: AxisFormatter::Number(get_y_axis_formatter(
                metrics,
                contribution,
                &custom_formatters,
                Arc::clone(&formatter),
                Some(form.y_axis_format.as_str()),
            )),
        },
        minor_tick: Show::new(form.minor_ticks),
        minor_split_line: Some(Show::new(form.minor_split_line)),
        min: y_axis_min.map(AxisBound::Value),
        max: y_axis_max.map(AxisBound::Value),
        scale: Some(form.truncate_y_axis),
        align_ticks: Some(true),
        ..AxisOption::default()
    };

    let mut legend = get_legend_props(
        form.legend_type,
        form.legend_orientation,
        form.show_legend,
        &props.theme,
        form.zoomable,
    );
    legend.data = raw_series
        .iter()
        .filter(|s| extract_forecast_series_context(&s.name).role == ForecastRole::Observation)
        .map(|s| s.name.clone())
        .chain(extract_annotation_labels(&form.annotation_layers, annotation_data))
        .collect();

    let echart_options = EchartsOption {
        use_utc: true,
        grid: Grid::from_padding(padding),
        x_axis,
        y_axis: alloc::vec![y_axis],
        tooltip: TooltipOption::new(
            !props.in_context_menu,
            if form.rich_tooltip {
                TooltipTrigger::Axis
            } else {
                TooltipTrigger::Item
            },
        ),
        legend,
        series,
        toolbox: Toolbox::zoom(form.zoomable),
        data_zoom: if form.zoomable {
            alloc::vec![DataZoom::slider()]
        } else {
            Vec::new()
        },
    };

    let tooltip = TooltipFormatter {
        rich: form.rich_tooltip,
        sort_by_metric: form.tooltip_sort_by_metric,
        groupby_empty: query_form.groupby.is_empty(),
        inverted_verbose_map: inverted,
        label_map: label_map.clone(),
        custom_formatters,
        formatter,
        metrics: metrics.clone(),
        force_percent: contribution,
        x_formatter: x_value_formatter.clone(),
    };

    XcontrolChartProps {
        form_data: form.clone(),
        width: props.width,
        height: props.height,
        echart_options,
        emit_cross_filters: props.emit_cross_filters,
        label_map: label_map.clone(),
        groupby: query_form.groupby.clone(),
        series_breakdown: raw_series.len(),
        selected_values: props.filter_state.selected_values.clone().unwrap_or_default(),
        x_value_formatter,
        x_axis: XAxisDescriptor {
            label: x_axis_label,
            axis_type: x_axis_type,
        },
        coltype_mapping,
        tooltip,
    }
}

/// Series of the shown annotation layers, in layer order.
fn annotation_series(
    props: &ChartProps,
    result: &QueryResult,
    x_axis_label: &str,
    x_axis_type: AxisType,
    colors: &dyn ColorScale,
) -> Vec<SeriesOption> {
    let form = &props.form_data;
    let slice_id = form.query.slice_id;
    let mut series = Vec::new();
    for layer in form.annotation_layers.iter().filter(|layer| layer.show) {
        match layer.annotation_type {
            AnnotationType::Formula => series.extend(transform_formula_annotation(
                layer,
                &result.data,
                x_axis_label,
                x_axis_type,
                colors,
                slice_id,
            )),
            AnnotationType::Interval => series.extend(transform_interval_annotation(
                layer,
                &result.annotation_data,
                colors,
                &props.theme,
                slice_id,
            )),
            AnnotationType::Event => series.extend(transform_event_annotation(
                layer,
                &result.annotation_data,
                colors,
                &props.theme,
                slice_id,
            )),
            AnnotationType::Timeseries => series.extend(transform_timeseries_annotation(
                layer,
                form.marker_size,
                &result.annotation_data,
                colors,
                slice_id,
            )),
        }
    }
    series
}

/// The baseline a stream layout stacks the observation series on.
fn stream_baseline(raw_series: &[RawSeries], shape: SeriesType) -> SeriesOption {
    let observations: Vec<&[SeriesPoint]> = raw_series
        .iter()
        .filter(|s| extract_forecast_series_context(&s.name).role == ForecastRole::Observation)
        .map(|s| s.data.as_slice())
        .collect();
    let mut baseline = baseline_series(&observations, shape);
    baseline.stack = Some(format!("{BASELINE_STACK}{STACK_ID_SUFFIX}"));
    baseline
}
