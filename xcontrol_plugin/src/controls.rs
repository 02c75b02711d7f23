// Copyright 2025 the Xcontrol Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Control panel schema types and the control groups shared with other time-series charts.
//!
//! The schema is data only: a host renders the widgets named by [`ControlType`] and stores
//! their values in form data under the control name.

extern crate alloc;

use alloc::string::{String, ToString};
use alloc::vec;
use alloc::vec::Vec;

use serde::Serialize;
use serde_json::{Map, Value, json};

/// Current form data values, keyed by control name.
pub type ControlValues = Map<String, Value>;

/// Decides from the current values whether a control is shown.
pub type Visibility = fn(&ControlValues) -> bool;

/// Widget kind of a custom control.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
pub enum ControlType {
    /// A boolean checkbox.
    CheckboxControl,
    /// A single or multi select.
    SelectControl,
    /// A numeric slider.
    SliderControl,
    /// A `[min, max]` pair of optional numbers.
    BoundsControl,
    /// A free text input.
    TextControl,
}

/// Configuration of a custom control.
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ControlConfig {
    /// Widget kind.
    #[serde(rename = "type")]
    pub control_type: ControlType,
    /// Label.
    pub label: String,
    /// Default value stored in form data.
    pub default: Value,
    /// Help text.
    #[serde(skip_serializing_if = "String::is_empty")]
    pub description: String,
    /// Select choices as `(value, label)`.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub choices: Vec<(Value, String)>,
    /// Accept values outside the choices.
    #[serde(skip_serializing_if = "core::ops::Not::not")]
    pub free_form: bool,
    /// Allow several values.
    #[serde(skip_serializing_if = "core::ops::Not::not")]
    pub multi: bool,
    /// The value must parse as an integer.
    #[serde(skip_serializing_if = "core::ops::Not::not")]
    pub is_int: bool,
    /// Slider minimum.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min: Option<f64>,
    /// Slider maximum.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max: Option<f64>,
    /// Slider step.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub step: Option<f64>,
    /// Changing the value re-renders without re-querying.
    pub render_trigger: bool,
    /// Shown only when this returns `true`.
    #[serde(skip)]
    pub visibility: Option<Visibility>,
}

impl ControlConfig {
    /// Creates a control of `control_type`.
    pub fn new(control_type: ControlType, label: impl Into<String>, default: Value) -> Self {
        Self {
            control_type,
            label: label.into(),
            default,
            description: String::new(),
            choices: Vec::new(),
            free_form: false,
            multi: false,
            is_int: false,
            min: None,
            max: None,
            step: None,
            render_trigger: false,
            visibility: None,
        }
    }

    /// Creates a checkbox.
    pub fn checkbox(label: impl Into<String>, default: bool) -> Self {
        Self::new(ControlType::CheckboxControl, label, Value::Bool(default))
    }

    /// Creates a select over `choices`.
    pub fn select<V: Into<Value>>(
        label: impl Into<String>,
        default: Value,
        choices: impl IntoIterator<Item = (V, &'static str)>,
    ) -> Self {
        let mut control = Self::new(ControlType::SelectControl, label, default);
        control.choices = choices
            .into_iter()
            .map(|(value, label)| (value.into(), String::from(label)))
            .collect();
        control
    }

    /// Creates a slider over `[min, max]`.
    pub fn slider(label: impl Into<String>, default: f64, min: f64, max: f64) -> Self {
        let mut control = Self::new(ControlType::SliderControl, label, json!(default));
        control.min = Some(min);
        control.max = Some(max);
        control
    }

    /// Creates a text input.
    pub fn text(label: impl Into<String>, default: Value) -> Self {
        Self::new(ControlType::TextControl, label, default)
    }

    /// Creates a bounds input defaulting to unset bounds.
    pub fn bounds(label: impl Into<String>) -> Self {
        Self::new(ControlType::BoundsControl, label, json!([null, null]))
    }

    /// Sets the help text.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Re-renders on change without re-querying.
    pub fn with_render_trigger(mut self) -> Self {
        self.render_trigger = true;
        self
    }

    /// Sets the slider step.
    pub fn with_step(mut self, step: f64) -> Self {
        self.step = Some(step);
        self
    }

    /// Accepts values outside the choices.
    pub fn with_free_form(mut self) -> Self {
        self.free_form = true;
        self
    }

    /// Allows several values.
    pub fn with_multi(mut self) -> Self {
        self.multi = true;
        self
    }

    /// Requires an integer.
    pub fn with_int(mut self) -> Self {
        self.is_int = true;
        self
    }

    /// Shows the control only when `visibility` holds.
    pub fn with_visibility(mut self, visibility: Visibility) -> Self {
        self.visibility = Some(visibility);
        self
    }

    /// Returns `true` when the control is shown for `values`.
    pub fn is_visible(&self, values: &ControlValues) -> bool {
        self.visibility.is_none_or(|visible| visible(values))
    }
}

/// One entry of a control row.
#[derive(Clone, Debug, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum ControlItem {
    /// A sub-section header.
    Header {
        /// Header text.
        label: String,
    },
    /// A control provided by the host, stored under `name`.
    Shared {
        /// Form data key.
        name: String,
        /// Host control the configuration comes from.
        shared: String,
        /// Label override.
        #[serde(skip_serializing_if = "Option::is_none")]
        label: Option<String>,
        /// Default override.
        #[serde(skip_serializing_if = "Option::is_none")]
        default: Option<Value>,
    },
    /// A control configured here.
    Custom {
        /// Form data key.
        name: String,
        /// Configuration.
        config: ControlConfig,
    },
}

impl ControlItem {
    /// A header.
    pub fn header(label: impl Into<String>) -> Self {
        Self::Header {
            label: label.into(),
        }
    }

    /// A host control stored under its own name.
    pub fn shared(name: &str) -> Self {
        Self::shared_as(name, name)
    }

    /// A host control stored under `name`.
    pub fn shared_as(name: impl Into<String>, shared: &str) -> Self {
        Self::Shared {
            name: name.into(),
            shared: String::from(shared),
            label: None,
            default: None,
        }
    }

    /// A custom control.
    pub fn custom(name: impl Into<String>, config: ControlConfig) -> Self {
        Self::Custom {
            name: name.into(),
            config,
        }
    }

    /// Overrides the label of a host control.
    pub fn with_label(mut self, text: impl Into<String>) -> Self {
        if let Self::Shared { label, .. } = &mut self {
            *label = Some(text.into());
        }
        self
    }

    /// Overrides the default of a host control.
    pub fn with_default(mut self, value: Value) -> Self {
        if let Self::Shared { default, .. } = &mut self {
            *default = Some(value);
        }
        self
    }

    /// Returns the form data key, or `None` for headers.
    pub fn name(&self) -> Option<&str> {
        match self {
            Self::Header { .. } => None,
            Self::Shared { name, .. } | Self::Custom { name, .. } => Some(name),
        }
    }

    /// Returns the default this item stores, if it sets one.
    pub fn default_value(&self) -> Option<&Value> {
        match self {
            Self::Header { .. } => None,
            Self::Shared { default, .. } => default.as_ref(),
            Self::Custom { config, .. } => Some(&config.default),
        }
    }

    /// Returns `true` when the item is shown for `values`.
    pub fn is_visible(&self, values: &ControlValues) -> bool {
        match self {
            Self::Custom { config, .. } => config.is_visible(values),
            _ => true,
        }
    }

    /// Appends `suffix` to the form data key.
    pub fn with_suffix(mut self, suffix: &str) -> Self {
        if let Self::Shared { name, .. } | Self::Custom { name, .. } = &mut self {
            name.push_str(suffix);
        }
        self
    }
}

/// A row of controls laid out side by side.
pub type ControlSetRow = Vec<ControlItem>;

/// A collapsible group of control rows.
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ControlPanelSection {
    /// Section title.
    pub label: String,
    /// Open by default.
    pub expanded: bool,
    /// Help text.
    #[serde(skip_serializing_if = "String::is_empty")]
    pub description: String,
    /// Rows, top to bottom.
    pub control_set_rows: Vec<ControlSetRow>,
}

impl ControlPanelSection {
    /// Creates a section.
    pub fn new(label: impl Into<String>, expanded: bool, rows: Vec<ControlSetRow>) -> Self {
        Self {
            label: label.into(),
            expanded,
            description: String::new(),
            control_set_rows: rows,
        }
    }

    /// Sets the help text.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Iterates over the items of all rows.
    pub fn items(&self) -> impl Iterator<Item = &ControlItem> {
        self.control_set_rows.iter().flatten()
    }
}

fn is_true(values: &ControlValues, key: &str, default: bool) -> bool {
    values.get(key).and_then(Value::as_bool).unwrap_or(default)
}

fn show_legend(values: &ControlValues) -> bool {
    is_true(values, "show_legend", true)
}

fn rich_tooltip(values: &ControlValues) -> bool {
    is_true(values, "rich_tooltip", true)
}

fn truncate_x_axis(values: &ControlValues) -> bool {
    is_true(values, "truncateXAxis", true)
}

fn rolling_window(values: &ControlValues) -> bool {
    matches!(
        values.get("rolling_type").and_then(Value::as_str),
        Some("mean" | "sum" | "std")
    )
}

/// Legend rows: visibility, kind, orientation and margin.
pub fn legend_rows() -> Vec<ControlSetRow> {
    vec![
        vec![ControlItem::header("Legend")],
        vec![ControlItem::custom(
            "show_legend",
            ControlConfig::checkbox("Show legend", true)
                .with_render_trigger()
                .with_description("Whether to display a legend for the chart"),
        )],
        vec![ControlItem::custom(
            "legendType",
            ControlConfig::select(
                "Type",
                json!("scroll"),
                [("scroll", "Scroll"), ("plain", "Plain")],
            )
            .with_render_trigger()
            .with_description("Legend type")
            .with_visibility(show_legend),
        )],
        vec![ControlItem::custom(
            "legendOrientation",
            ControlConfig::select(
                "Orientation",
                json!("top"),
                [
                    ("top", "Top"),
                    ("bottom", "Bottom"),
                    ("left", "Left"),
                    ("right", "Right"),
                ],
            )
            .with_render_trigger()
            .with_description("Legend Orientation")
            .with_visibility(show_legend),
        )],
        vec![ControlItem::custom(
            "legendMargin",
            ControlConfig::text("Margin", Value::Null)
                .with_int()
                .with_render_trigger()
                .with_description("Additional padding for legend.")
                .with_visibility(show_legend),
        )],
    ]
}

/// Tooltip rows: rich tooltip, sort by metric and the tooltip time format.
pub fn rich_tooltip_rows() -> Vec<ControlSetRow> {
    vec![
        vec![ControlItem::header("Tooltip")],
        vec![ControlItem::custom(
            "rich_tooltip",
            ControlConfig::checkbox("Rich tooltip", true)
                .with_render_trigger()
                .with_description(
                    "Shows a list of all series available at that point in time",
                ),
        )],
        vec![ControlItem::custom(
            "tooltipSortByMetric",
            ControlConfig::checkbox("Tooltip sort by metric", false)
                .with_render_trigger()
                .with_description(
                    "Whether to sort tooltip by the selected metric in descending order.",
                )
                .with_visibility(rich_tooltip),
        )],
        vec![
            ControlItem::shared_as("tooltipTimeFormat", "x_axis_time_format")
                .with_label("Tooltip time format")
                .with_default(json!(xcontrol_charts::SMART_DATE)),
        ],
    ]
}

/// The minor ticks checkbox.
pub fn minor_ticks() -> ControlItem {
    ControlItem::custom(
        "minorTicks",
        ControlConfig::checkbox("Minor ticks", false)
            .with_render_trigger()
            .with_description("Show minor ticks on axes."),
    )
}

/// The x label rotation select.
pub fn x_axis_label_rotation() -> ControlItem {
    ControlItem::custom(
        "xAxisLabelRotation",
        ControlConfig::select(
            "Rotate x axis label",
            json!(0),
            [(0, "0°"), (45, "45°"), (90, "90°")],
        )
        .with_free_form()
        .with_render_trigger()
        .with_description("Input field supports custom rotation. e.g. 30 for 30°"),
    )
}

/// The truncate x axis checkbox.
pub fn truncate_x_axis_control() -> ControlItem {
    ControlItem::custom(
        "truncateXAxis",
        ControlConfig::checkbox("Truncate X Axis", true)
            .with_render_trigger()
            .with_description(
                "Truncate X Axis. Can be overridden by specifying a min or max bound. \
                 Only applicable for numerical X axis.",
            ),
    )
}

/// The x axis bounds input, shown while truncating.
pub fn x_axis_bounds() -> ControlItem {
    ControlItem::custom(
        "x_axis_bounds",
        ControlConfig::bounds("X Axis Bounds")
            .with_render_trigger()
            .with_description(
                "Bounds for numerical X axis. Not applicable for temporal or categorical axes. \
                 When left empty, the bounds are dynamically defined based on the min/max of \
                 the data.",
            )
            .with_visibility(truncate_x_axis),
    )
}

/// Rolling window, time comparison and resampling controls.
pub fn advanced_analytics_section(label: impl Into<String>) -> ControlPanelSection {
    let offsets = [
        "1 day ago",
        "1 week ago",
        "28 days ago",
        "30 days ago",
        "52 weeks ago",
        "1 year ago",
        "104 weeks ago",
        "2 years ago",
        "156 weeks ago",
        "3 years ago",
    ];
    ControlPanelSection::new(
        label,
        false,
        vec![
            vec![ControlItem::header("Rolling window")],
            vec![ControlItem::custom(
                "rolling_type",
                ControlConfig::select(
                    "Rolling function",
                    Value::Null,
                    [
                        (Value::Null, "None"),
                        (json!("mean"), "mean"),
                        (json!("sum"), "sum"),
                        (json!("std"), "std"),
                        (json!("cumsum"), "cumsum"),
                    ],
                )
                .with_description(
                    "Defines a rolling window function to apply, works along with the \
                     [Periods] text box",
                ),
            )],
            vec![ControlItem::custom(
                "rolling_periods",
                ControlConfig::text("Periods", Value::Null)
                    .with_int()
                    .with_description(
                        "Defines the size of the rolling window function, relative to the \
                         time granularity selected",
                    )
                    .with_visibility(rolling_window),
            )],
            vec![ControlItem::custom(
                "min_periods",
                ControlConfig::text("Min periods", Value::Null)
                    .with_int()
                    .with_description(
                        "The minimum number of rolling periods required to show a value",
                    )
                    .with_visibility(rolling_window),
            )],
            vec![ControlItem::header("Time comparison")],
            vec![ControlItem::custom(
                "time_compare",
                ControlConfig::select("Time shift", json!([]), offsets.map(|o| (o, o)))
                    .with_multi()
                    .with_free_form()
                    .with_description(
                        "Overlay one or more timeseries from a relative time period.",
                    ),
            )],
            vec![ControlItem::custom(
                "comparison_type",
                ControlConfig::select(
                    "Calculation type",
                    json!("values"),
                    [
                        ("values", "Actual values"),
                        ("difference", "Difference"),
                        ("percentage", "Percentage change"),
                        ("ratio", "Ratio"),
                    ],
                )
                .with_description(
                    "How to display time shifts: as individual lines; as the difference \
                     between the main time series and each time shift; as the percentage \
                     change; or as the ratio between series and time shifts.",
                ),
            )],
            vec![ControlItem::header("Resample")],
            vec![ControlItem::custom(
                "resample_rule",
                ControlConfig::select(
                    "Rule",
                    Value::Null,
                    [
                        ("1T", "1 minutely frequency"),
                        ("1H", "1 hourly frequency"),
                        ("1D", "1 calendar day frequency"),
                        ("7D", "7 calendar day frequency"),
                        ("1MS", "1 month start frequency"),
                        ("1M", "1 month end frequency"),
                        ("1AS", "1 year start frequency"),
                        ("1A", "1 year end frequency"),
                    ],
                )
                .with_free_form()
                .with_description("Pandas resample rule"),
            )],
            vec![ControlItem::custom(
                "resample_method",
                ControlConfig::select(
                    "Fill method",
                    Value::Null,
                    [
                        ("asfreq", "Null imputation"),
                        ("zerofill", "Zero imputation"),
                        ("linear", "Linear interpolation"),
                        ("ffill", "Forward values"),
                        ("bfill", "Backward values"),
                        ("median", "Median values"),
                        ("mean", "Mean values"),
                        ("sum", "Sum values"),
                    ],
                )
                .with_free_form()
                .with_description("Pandas resample method"),
            )],
        ],
    )
    .with_description(
        "This section contains options that allow for advanced analytical post processing \
         of query results",
    )
}

/// The annotation layers section.
pub fn annotations_section() -> ControlPanelSection {
    ControlPanelSection::new(
        "Annotations and Layers",
        false,
        vec![vec![ControlItem::shared("annotation_layers")]],
    )
}

/// Axis title controls.
pub fn title_section() -> ControlPanelSection {
    let margins = [0, 15, 30, 50, 75, 90, 100, 125, 150, 200].map(|m| (m, ""));
    let margin = |name: &str, label: &str| {
        let mut config = ControlConfig::select(String::from(label), json!(0), margins)
            .with_free_form()
            .with_render_trigger();
        for (value, text) in &mut config.choices {
            *text = value.to_string();
        }
        ControlItem::custom(name, config)
    };
    ControlPanelSection::new(
        "Chart Title",
        false,
        vec![
            vec![ControlItem::header("X Axis")],
            vec![ControlItem::custom(
                "x_axis_title",
                ControlConfig::text("X Axis Title", json!("")).with_render_trigger(),
            )],
            vec![margin("x_axis_title_margin", "X AXIS TITLE BOTTOM MARGIN")],
            vec![ControlItem::header("Y Axis")],
            vec![ControlItem::custom(
                "y_axis_title",
                ControlConfig::text("Y Axis Title", json!("")).with_render_trigger(),
            )],
            vec![margin("y_axis_title_margin", "Y AXIS TITLE MARGIN")],
            vec![ControlItem::custom(
                "y_axis_title_position",
                ControlConfig::select(
                    "Y AXIS TITLE POSITION",
                    json!("Top"),
                    [("Left", "Left"), ("Top", "Top")],
                )
                .with_render_trigger(),
            )],
        ],
    )
}
