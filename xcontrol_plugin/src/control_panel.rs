// Copyright 2025 the Xcontrol Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The Xcontrol control panel and its form data overrides.

extern crate alloc;

use alloc::string::{String, ToString};
use alloc::vec;
use alloc::vec::Vec;

use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::{Value, json};
use xcontrol_charts::SMART_NUMBER;
use xcontrol_transforms::{QueryFormColumn, QueryFormMetric};

use crate::controls::{
    ControlConfig, ControlItem, ControlPanelSection, ControlSetRow, ControlValues,
    advanced_analytics_section, annotations_section, legend_rows, minor_ticks, rich_tooltip_rows,
    title_section, truncate_x_axis_control, x_axis_bounds, x_axis_label_rotation,
};

/// Sections of a chart's control panel, top to bottom.
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ControlPanelConfig {
    /// Sections.
    pub control_panel_sections: Vec<ControlPanelSection>,
}

impl ControlPanelConfig {
    /// Iterates over every item of every section.
    pub fn items(&self) -> impl Iterator<Item = &ControlItem> {
        self.control_panel_sections
            .iter()
            .flat_map(ControlPanelSection::items)
    }

    /// Finds the control stored under `name`.
    pub fn find(&self, name: &str) -> Option<&ControlItem> {
        self.items().find(|item| item.name() == Some(name))
    }

    /// Returns the defaults of every control that sets one, keyed by control name.
    pub fn defaults(&self) -> ControlValues {
        self.items()
            .filter_map(|item| Some((String::from(item.name()?), item.default_value()?.clone())))
            .collect()
    }

    /// Returns the names of the controls shown for `values`.
    pub fn visible_controls<'a>(&'a self, values: &ControlValues) -> Vec<&'a str> {
        self.items()
            .filter(|item| item.is_visible(values))
            .filter_map(ControlItem::name)
            .collect()
    }
}

/// Query controls, with every control name suffixed by `suffix`.
pub fn query_section(label: &str, suffix: &str) -> ControlPanelSection {
    let rows: Vec<ControlSetRow> = vec![
        vec![ControlItem::shared("metrics")],
        vec![ControlItem::shared("groupby")],
        vec![ControlItem::shared("adhoc_filters")],
        vec![ControlItem::shared("limit")],
        vec![ControlItem::shared("timeseries_limit_metric")],
        vec![ControlItem::custom(
            "order_desc",
            ControlConfig::checkbox("Sort Descending", true)
                .with_description("Whether to sort descending or ascending"),
        )],
        vec![ControlItem::custom(
            "row_limit",
            ControlConfig::select(
                "Row limit",
                json!(10_000),
                [10, 50, 100, 250, 500, 1_000, 5_000, 10_000, 50_000].map(|n| (n, "")),
            )
            .with_free_form()
            .with_int(),
        )],
        vec![ControlItem::custom(
            "truncate_metric",
            ControlConfig::checkbox("Truncate Metric", true)
                .with_description("Whether to truncate metrics"),
        )],
    ];
    let rows = rows
        .into_iter()
        .map(|row| row.into_iter().map(|item| label_choices(item.with_suffix(suffix))).collect())
        .collect();
    ControlPanelSection::new(label, true, rows)
}

/// Choices left without a label show their value.
fn label_choices(mut item: ControlItem) -> ControlItem {
    if let ControlItem::Custom { config, .. } = &mut item {
        for (value, text) in &mut config.choices {
            if text.is_empty() {
                *text = value.to_string();
            }
        }
    }
    item
}

/// Series styling rows, with every control name suffixed by `suffix`.
pub fn customize_rows(label: &str, suffix: &str) -> Vec<ControlSetRow> {
    let rows: Vec<ControlSetRow> = vec![
        vec![ControlItem::header(label)],
        vec![ControlItem::custom(
            "seriesType",
            ControlConfig::select(
                "Series Style",
                json!("line"),
                [
                    ("line", "Line"),
                    ("scatter", "Scatter"),
                    ("smooth", "Smooth Line"),
                    ("bar", "Bar"),
                    ("start", "Step - start"),
                    ("middle", "Step - middle"),
                    ("end", "Step - end"),
                ],
            )
            .with_render_trigger()
            .with_description("Series chart type (line, bar etc)"),
        )],
        vec![ControlItem::custom(
            "stack",
            ControlConfig::select(
                "Stacked Style",
                Value::Null,
                [
                    (Value::Null, "None"),
                    (json!("Stack"), "Stack"),
                    (json!("Stream"), "Stream"),
                    (json!("Expand"), "Expand"),
                ],
            )
            .with_render_trigger()
            .with_description("Stack series on top of each other"),
        )],
        vec![ControlItem::custom(
            "area",
            ControlConfig::checkbox("Area chart", false)
                .with_render_trigger()
                .with_description(
                    "Draw area under curves. Only applicable for line types.",
                ),
        )],
        vec![ControlItem::custom(
            "show_value",
            ControlConfig::checkbox("Show Values", false)
                .with_render_trigger()
                .with_description(
                    "Whether to display the numerical values within the cells",
                ),
        )],
        vec![ControlItem::custom(
            "opacity",
            ControlConfig::slider("Opacity", 0.2, 0.0, 1.0)
                .with_step(0.1)
                .with_render_trigger()
                .with_description("Opacity of area chart."),
        )],
        vec![ControlItem::custom(
            "markerEnabled",
            ControlConfig::checkbox("Marker", false)
                .with_render_trigger()
                .with_description("Draw a marker on data points. Only applicable for line types."),
        )],
        vec![ControlItem::custom(
            "markerSize",
            ControlConfig::slider("Marker size", 6.0, 0.0, 100.0)
                .with_render_trigger()
                .with_description("Size of marker. Also applies to forecast observations."),
        )],
    ];
    rows.into_iter()
        .map(|row| row.into_iter().map(|item| item.with_suffix(suffix)).collect())
        .collect()
}

fn chart_options_section() -> ControlPanelSection {
    let mut rows = vec![vec![ControlItem::shared("color_scheme")]];
    rows.extend(customize_rows("Series", ""));
    rows.extend([
        vec![ControlItem::custom(
            "zoomable",
            ControlConfig::checkbox("Data Zoom", false)
                .with_render_trigger()
                .with_description("Enable data zooming controls"),
        )],
        vec![minor_ticks()],
    ]);
    rows.extend(legend_rows());
    rows.extend([
        vec![ControlItem::header("X Axis")],
        vec![ControlItem::shared("x_axis_time_format").with_default(json!(
            xcontrol_charts::SMART_DATE
        ))],
        vec![x_axis_label_rotation()],
    ]);
    rows.extend(rich_tooltip_rows());
    rows.extend([
        vec![ControlItem::header("Y Axis")],
        vec![ControlItem::custom(
            "minorSplitLine",
            ControlConfig::checkbox("Minor Split Line", false)
                .with_render_trigger()
                .with_description("Draw split lines for minor y-axis ticks"),
        )],
        vec![truncate_x_axis_control()],
        vec![x_axis_bounds()],
        vec![ControlItem::custom(
            "truncateYAxis",
            ControlConfig::checkbox("Truncate Y Axis", false)
                .with_render_trigger()
                .with_description(
                    "Truncate Y Axis. Can be overridden by specifying a min or max bound.",
                ),
        )],
        vec![ControlItem::custom(
            "y_axis_bounds",
            ControlConfig::bounds("Y Axis Bounds")
                .with_render_trigger()
                .with_description(
                    "Bounds for the Y-axis. When left empty, the bounds are dynamically \
                     defined based on the min/max of the data.",
                )
                .with_visibility(|values| {
                    values
                        .get("truncateYAxis")
                        .and_then(Value::as_bool)
                        .unwrap_or(false)
                }),
        )],
        vec![
            ControlItem::shared("y_axis_format")
                .with_label("Y Axis Format")
                .with_default(json!(SMART_NUMBER)),
        ],
        vec![ControlItem::shared("currency_format")],
        vec![ControlItem::custom(
            "logAxis",
            ControlConfig::checkbox("Logarithmic y-axis", false)
                .with_render_trigger()
                .with_description("Logarithmic y-axis"),
        )],
        vec![ControlItem::header("Control limits")],
        vec![ControlItem::custom(
            "xcontrolShowCustom",
            ControlConfig::checkbox("Control limit styling", true)
                .with_render_trigger()
                .with_description(
                    "Draw control limits as dashed reference lines and mark observations \
                     outside them",
                ),
        )],
    ]);
    ControlPanelSection::new("Chart Options", true, rows)
}

/// The Xcontrol control panel.
pub fn control_panel() -> ControlPanelConfig {
    ControlPanelConfig {
        control_panel_sections: vec![
            ControlPanelSection::new(
                "Query fields",
                true,
                vec![
                    vec![ControlItem::shared("x_axis")],
                    vec![ControlItem::shared("time_grain_sqla")],
                ],
            ),
            query_section("Query", ""),
            advanced_analytics_section("Advanced analytics Query"),
            annotations_section(),
            title_section(),
            chart_options_section(),
        ],
    }
}

/// Column and metric selections carried over when switching chart types.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct StandardizedControls {
    /// Standardized dimensions.
    pub columns: Vec<QueryFormColumn>,
    /// Standardized metrics.
    pub metrics: Vec<QueryFormMetric>,
}

/// Reads a form data entry holding one value, a list or nothing.
fn read_list<T: DeserializeOwned>(form: &ControlValues, key: &str) -> Vec<T> {
    match form.get(key) {
        None | Some(Value::Null) => Vec::new(),
        Some(Value::Array(values)) => values
            .iter()
            .filter_map(|value| serde_json::from_value(value.clone()).ok())
            .collect(),
        Some(value) => serde_json::from_value(value.clone()).into_iter().collect(),
    }
}

/// Moves the standardized selections into `groupby` and `metrics`.
///
/// Selections already used by the secondary query (`groupby_b`, `metrics_b`) stay in
/// `controls`; everything else is consumed.
pub fn form_data_overrides(
    mut form: ControlValues,
    controls: &mut StandardizedControls,
) -> ControlValues {
    let groupby_b: Vec<QueryFormColumn> = read_list(&form, "groupby_b");
    let (groupby, kept): (Vec<_>, Vec<_>) = controls
        .columns
        .drain(..)
        .partition(|column| !groupby_b.contains(column));
    controls.columns = kept;

    let metrics_b: Vec<QueryFormMetric> = read_list(&form, "metrics_b");
    let (metrics, kept): (Vec<_>, Vec<_>) = controls
        .metrics
        .drain(..)
        .partition(|metric| !metrics_b.contains(metric));
    controls.metrics = kept;

    tracing::debug!(
        groupby = groupby.len(),
        metrics = metrics.len(),
        "applying standardized controls"
    );
    form.insert(String::from("groupby"), json!(groupby));
    form.insert(String::from("metrics"), json!(metrics));
    form
}
