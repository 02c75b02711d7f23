// Copyright 2025 the Xcontrol Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The chart option tree handed to the chart library.
//!
//! Everything serializes to the library's option JSON except formatters, which the host calls
//! directly (see [`AxisFormatter`]).

extern crate alloc;

use alloc::string::String;
use alloc::vec::Vec;

use kurbo::Insets;
use serde::Serialize;
use xcontrol_charts::{
    AxisBound, AxisType, LegendOption, SeriesOption, SharedFormatter, TimeFormatter,
    timeseries_constants as tc,
};

/// A `{ show }` toggle.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct Show {
    /// Whether the element is drawn.
    pub show: bool,
}

impl Show {
    /// Creates a toggle.
    pub const fn new(show: bool) -> Self {
        Self { show }
    }
}

/// Plot area placement.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Grid {
    /// Grow the padding so axis labels fit.
    pub contain_label: bool,
    /// Top padding.
    pub top: f64,
    /// Right padding.
    pub right: f64,
    /// Bottom padding.
    pub bottom: f64,
    /// Left padding.
    pub left: f64,
}

impl Grid {
    /// Places the plot area inside `padding` (`x0` left, `y0` top, `x1` right, `y1` bottom).
    pub fn from_padding(padding: Insets) -> Self {
        Self {
            contain_label: true,
            top: padding.y0,
            right: padding.x1,
            bottom: padding.y1,
            left: padding.x0,
        }
    }
}

/// Where an axis title sits along the axis.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NameLocation {
    /// Centered along the axis.
    #[default]
    Middle,
    /// Past the end of the axis.
    End,
}

/// Formats axis tick labels.
#[derive(Clone, Debug, Default)]
pub enum AxisFormatter {
    /// Let the chart library label ticks.
    #[default]
    Auto,
    /// Epoch-millisecond ticks.
    Time(TimeFormatter),
    /// Numeric ticks.
    Number(SharedFormatter),
}

impl AxisFormatter {
    /// Formats a tick value, or returns `None` for [`AxisFormatter::Auto`].
    pub fn format(&self, value: f64) -> Option<String> {
        match self {
            Self::Auto => None,
            Self::Time(formatter) => Some(formatter.format(value)),
            Self::Number(formatter) => Some(formatter.format(value)),
        }
    }
}

/// Tick label settings.
#[derive(Clone, Debug, Default, Serialize)]
pub struct AxisLabel {
    /// Label rotation in degrees.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rotate: Option<f64>,
    /// Tick formatter, called by the host.
    #[serde(skip)]
    pub formatter: AxisFormatter,
}

/// One chart axis.
#[derive(Clone, Debug, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AxisOption {
    /// Axis kind.
    #[serde(rename = "type")]
    pub axis_type: AxisType,
    /// Axis title.
    pub name: String,
    /// Gap between axis and title.
    pub name_gap: f64,
    /// Title placement.
    pub name_location: NameLocation,
    /// Tick labels.
    pub axis_label: AxisLabel,
    /// Minor ticks.
    pub minor_tick: Show,
    /// Split lines at minor ticks.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub minor_split_line: Option<Show>,
    /// Minimum tick interval.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_interval: Option<f64>,
    /// Lower extent.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min: Option<AxisBound>,
    /// Upper extent.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max: Option<AxisBound>,
    /// Fit the axis to the data instead of including zero.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scale: Option<bool>,
    /// Align ticks with the first y axis.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub align_ticks: Option<bool>,
}

/// What hovering triggers the tooltip on.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TooltipTrigger {
    /// Every series at the hovered x.
    #[default]
    Axis,
    /// The hovered point only.
    Item,
}

/// Tooltip settings; the markup comes from [`xcontrol_charts::TooltipFormatter`].
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TooltipOption {
    /// Whether tooltips are shown.
    pub show: bool,
    /// Trigger mode.
    pub trigger: TooltipTrigger,
    /// Attach the tooltip to the document body so it can overflow the chart.
    pub append_to_body: bool,
    /// Border color.
    pub border_color: String,
}

impl TooltipOption {
    /// Creates the default tooltip with the given visibility and trigger.
    pub fn new(show: bool, trigger: TooltipTrigger) -> Self {
        Self {
            show,
            trigger,
            append_to_body: true,
            border_color: String::from("transparent"),
        }
    }
}

/// Titles of the zoom toolbox buttons.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ZoomTitle {
    /// Zoom button.
    pub zoom: String,
    /// Restore button.
    pub back: String,
}

/// Box-zoom tool.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolboxDataZoom {
    /// Zoom the y axis too.
    pub y_axis_index: bool,
    /// Button titles.
    pub title: ZoomTitle,
}

/// Toolbox tools.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolboxFeature {
    /// Box zoom.
    pub data_zoom: ToolboxDataZoom,
}

/// The toolbox in the top-right corner.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Toolbox {
    /// Whether the toolbox is shown.
    pub show: bool,
    /// Top offset.
    pub top: f64,
    /// Right offset.
    pub right: f64,
    /// Tools.
    pub feature: ToolboxFeature,
}

impl Toolbox {
    /// Creates the zoom toolbox.
    pub fn zoom(show: bool) -> Self {
        Self {
            show,
            top: tc::TOOLBOX_TOP,
            right: tc::TOOLBOX_RIGHT,
            feature: ToolboxFeature {
                data_zoom: ToolboxDataZoom {
                    y_axis_index: false,
                    title: ZoomTitle {
                        zoom: String::from("zoom area"),
                        back: String::from("restore zoom"),
                    },
                },
            },
        }
    }
}

/// A data zoom slider below the plot.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct DataZoom {
    /// Zoom component kind.
    #[serde(rename = "type")]
    pub zoom_type: String,
    /// Initial start, in percent.
    pub start: f64,
    /// Initial end, in percent.
    pub end: f64,
    /// Bottom offset.
    pub bottom: f64,
}

impl DataZoom {
    /// Creates the full-range slider.
    pub fn slider() -> Self {
        Self {
            zoom_type: String::from("slider"),
            start: tc::DATA_ZOOM_START,
            end: tc::DATA_ZOOM_END,
            bottom: tc::ZOOM_BOTTOM,
        }
    }
}

/// The root option of an Xcontrol chart.
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EchartsOption {
    /// Interpret timestamps as UTC.
    #[serde(rename = "useUTC")]
    pub use_utc: bool,
    /// Plot area.
    pub grid: Grid,
    /// X axis.
    pub x_axis: AxisOption,
    /// Y axes.
    pub y_axis: Vec<AxisOption>,
    /// Tooltip.
    pub tooltip: TooltipOption,
    /// Legend.
    pub legend: LegendOption,
    /// Annotation series, then data series.
    pub series: Vec<SeriesOption>,
    /// Toolbox.
    pub toolbox: Toolbox,
    /// Zoom sliders.
    pub data_zoom: Vec<DataZoom>,
}

impl EchartsOption {
    /// Serializes the option tree to JSON.
    pub fn to_json(&self) -> serde_json::Value {
        // The tree holds only strings, finite numbers and string-keyed maps.
        serde_json::to_value(self).unwrap_or(serde_json::Value::Null)
    }
}
