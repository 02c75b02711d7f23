// Copyright 2025 the Xcontrol Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Grid padding, legend placement and axis helpers.
//!
//! The chart library lays out the plot itself; this module only computes the inputs it needs:
//! - grid padding around the plot, reserving room for axis titles, the legend and the zoom
//!   slider,
//! - legend orientation and anchoring,
//! - the x axis type and the bounds handed to each axis.

extern crate alloc;

use alloc::string::String;
use alloc::vec::Vec;

use kurbo::Insets;
use serde::{Deserialize, Deserializer, Serialize};
use xcontrol_transforms::GenericDataType;

use crate::color::CssColor;
use crate::theme::Theme;

/// Fixed offsets of the timeseries chart layout, in pixels.
pub mod timeseries_constants {
    /// Base top padding of the grid.
    pub const GRID_OFFSET_TOP: f64 = 20.0;
    /// Base bottom padding of the grid.
    pub const GRID_OFFSET_BOTTOM: f64 = 20.0;
    /// Bottom padding of the grid when the zoom slider is shown.
    pub const GRID_OFFSET_BOTTOM_ZOOMABLE: f64 = 80.0;
    /// Base left padding of the grid.
    pub const GRID_OFFSET_LEFT: f64 = 20.0;
    /// Base right padding of the grid.
    pub const GRID_OFFSET_RIGHT: f64 = 20.0;
    /// Extra top padding for a y axis title.
    pub const Y_AXIS_LABEL_TOP_OFFSET: f64 = 20.0;
    /// Legend top offset when on the right and the toolbox is shown.
    pub const LEGEND_RIGHT_TOP_OFFSET: f64 = 30.0;
    /// Legend right offset when on top and the toolbox is shown.
    pub const LEGEND_TOP_RIGHT_OFFSET: f64 = 55.0;
    /// Toolbox top offset.
    pub const TOOLBOX_TOP: f64 = 0.0;
    /// Toolbox right offset.
    pub const TOOLBOX_RIGHT: f64 = 5.0;
    /// Zoom slider start, in percent.
    pub const DATA_ZOOM_START: f64 = 0.0;
    /// Zoom slider end, in percent.
    pub const DATA_ZOOM_END: f64 = 100.0;
    /// Zoom slider bottom offset.
    pub const ZOOM_BOTTOM: f64 = 30.0;
}

use timeseries_constants as tc;

/// Where the legend sits relative to the plot.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LegendOrientation {
    /// Above the plot.
    #[default]
    Top,
    /// Below the plot.
    Bottom,
    /// Left of the plot.
    Left,
    /// Right of the plot.
    Right,
}

impl LegendOrientation {
    /// Padding reserved for a visible legend on its side.
    pub const fn default_margin(self) -> f64 {
        match self {
            Self::Top => 20.0,
            Self::Bottom => 30.0,
            Self::Left | Self::Right => 160.0,
        }
    }

    /// Returns `true` for legends laid out in a row.
    pub const fn is_horizontal(self) -> bool {
        matches!(self, Self::Top | Self::Bottom)
    }
}

/// Legend rendering mode.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LegendType {
    /// Scrollable legend.
    #[default]
    Scroll,
    /// Plain legend, wrapping when needed.
    Plain,
}

/// Where the y axis title is drawn.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TitlePosition {
    /// Rotated, left of the axis.
    #[default]
    Left,
    /// Above the axis.
    Top,
}

/// Inputs of [`get_padding`].
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct PaddingOptions {
    /// Whether the legend is shown.
    pub show_legend: bool,
    /// Legend side.
    pub legend_orientation: LegendOrientation,
    /// Explicit legend margin; `None` uses the side's default.
    pub legend_margin: Option<f64>,
    /// A y axis title is set.
    pub y_axis_title: bool,
    /// The zoom slider is shown.
    pub zoomable: bool,
    /// An x axis title is set.
    pub x_axis_title: bool,
    /// Y axis title position.
    pub y_axis_title_position: Option<TitlePosition>,
    /// Gap between the y axis and its title.
    pub y_axis_title_margin: f64,
    /// Gap between the x axis and its title.
    pub x_axis_title_margin: f64,
    /// Bars run horizontally.
    pub is_horizontal: bool,
}

/// Computes the grid padding around the plot.
///
/// `x0`/`y0`/`x1`/`y1` of the result are the left/top/right/bottom paddings.
pub fn get_padding(opts: &PaddingOptions) -> Insets {
    let top = tc::GRID_OFFSET_TOP
        + match opts.y_axis_title_position {
            Some(TitlePosition::Top) => opts.y_axis_title_margin,
            _ if opts.y_axis_title => tc::Y_AXIS_LABEL_TOP_OFFSET,
            _ => 0.0,
        };
    let x_axis_offset = if opts.x_axis_title {
        opts.x_axis_title_margin
    } else {
        0.0
    };
    let bottom = if opts.zoomable && !opts.is_horizontal {
        tc::GRID_OFFSET_BOTTOM_ZOOMABLE
    } else {
        tc::GRID_OFFSET_BOTTOM
    } + x_axis_offset;
    let left = tc::GRID_OFFSET_LEFT
        + if opts.y_axis_title_position == Some(TitlePosition::Left) {
            opts.y_axis_title_margin
        } else {
            0.0
        };
    let right = if opts.show_legend && opts.legend_orientation == LegendOrientation::Right {
        0.0
    } else {
        tc::GRID_OFFSET_RIGHT
    };
    get_chart_padding(
        opts.show_legend,
        opts.legend_orientation,
        opts.legend_margin,
        Insets::new(left, top, right, bottom),
    )
}

/// Adds the legend margin to `padding` on the legend's side.
pub fn get_chart_padding(
    show: bool,
    orientation: LegendOrientation,
    margin: Option<f64>,
    padding: Insets,
) -> Insets {
    let margin = if show {
        margin.unwrap_or(orientation.default_margin())
    } else {
        0.0
    };
    let mut out = padding;
    match orientation {
        LegendOrientation::Left => out.x0 += margin,
        LegendOrientation::Top => out.y0 += margin,
        LegendOrientation::Right => out.x1 += margin,
        LegendOrientation::Bottom => out.y1 += margin,
    }
    out
}

/// Legend selector button labels.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LegendSelector {
    /// Select every entry.
    All,
    /// Invert the selection.
    Inverse,
}

/// Text style of the legend selector buttons.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SelectorLabel {
    /// Font stack.
    pub font_family: String,
    /// Font size in pixels.
    pub font_size: f64,
    /// Text color.
    pub color: CssColor,
    /// Border color.
    pub border_color: CssColor,
}

/// Layout direction of the legend entries.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Orient {
    /// Entries in a row.
    Horizontal,
    /// Entries in a column.
    Vertical,
}

/// The legend component of a chart option.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LegendOption {
    /// Entry direction.
    pub orient: Orient,
    /// Whether the legend is shown.
    pub show: bool,
    /// Legend mode.
    #[serde(rename = "type")]
    pub legend_type: LegendType,
    /// Selector buttons.
    pub selector: [LegendSelector; 2],
    /// Selector button style.
    pub selector_label: SelectorLabel,
    /// Left anchor.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub left: Option<f64>,
    /// Right anchor.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub right: Option<f64>,
    /// Top anchor.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub top: Option<f64>,
    /// Bottom anchor.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bottom: Option<f64>,
    /// Entry names, in order.
    pub data: Vec<String>,
}

/// Builds the legend placement for `orientation`.
///
/// When `zoomable`, the legend is moved clear of the toolbox in the top-right corner.
pub fn get_legend_props(
    legend_type: LegendType,
    orientation: LegendOrientation,
    show: bool,
    theme: &Theme,
    zoomable: bool,
) -> LegendOption {
    let mut legend = LegendOption {
        orient: if orientation.is_horizontal() {
            Orient::Horizontal
        } else {
            Orient::Vertical
        },
        show,
        legend_type,
        selector: [LegendSelector::All, LegendSelector::Inverse],
        selector_label: SelectorLabel {
            font_family: theme.font_family.clone(),
            font_size: theme.font_size_s,
            color: CssColor(theme.grayscale_base),
            border_color: CssColor(theme.grayscale_base),
        },
        left: None,
        right: None,
        top: None,
        bottom: None,
        data: Vec::new(),
    };
    let toolbox_offset = |offset: f64| if zoomable { offset } else { 0.0 };
    match orientation {
        LegendOrientation::Left => legend.left = Some(0.0),
        LegendOrientation::Right => {
            legend.right = Some(0.0);
            legend.top = Some(toolbox_offset(tc::LEGEND_RIGHT_TOP_OFFSET));
        }
        LegendOrientation::Bottom => legend.bottom = Some(0.0),
        LegendOrientation::Top => {
            legend.top = Some(0.0);
            legend.right = Some(toolbox_offset(tc::LEGEND_TOP_RIGHT_OFFSET));
        }
    }
    legend
}

/// Type of a chart axis.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AxisType {
    /// Discrete categories.
    #[default]
    Category,
    /// Continuous numbers.
    Value,
    /// Epoch-millisecond timestamps.
    Time,
    /// Logarithmic numbers.
    Log,
}

/// Picks the x axis type from the stacking state and the x column's data type.
///
/// Stacked numeric x values are treated as categories so stacks line up per x.
pub fn get_axis_type(
    stacked: bool,
    force_categorical: bool,
    data_type: Option<GenericDataType>,
) -> AxisType {
    if force_categorical {
        return AxisType::Category;
    }
    match data_type {
        Some(GenericDataType::Temporal) => AxisType::Time,
        Some(GenericDataType::Numeric) if !stacked => AxisType::Value,
        _ => AxisType::Category,
    }
}

/// An axis extent: a fixed number or the data extent.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum AxisBound {
    /// A fixed value.
    Value(f64),
    /// The smallest data value.
    DataMin,
    /// The largest data value.
    DataMax,
}

impl Serialize for AxisBound {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Value(v) => serializer.serialize_f64(*v),
            Self::DataMin => serializer.serialize_str("dataMin"),
            Self::DataMax => serializer.serialize_str("dataMax"),
        }
    }
}

/// Returns the `(min, max)` of a truncated value axis.
///
/// Only value axes are truncated. Unset bounds fall back to the data extent, except for bars,
/// which keep their zero baseline.
pub fn get_min_and_max_from_bounds(
    axis_type: AxisType,
    truncate: bool,
    min: Option<f64>,
    max: Option<f64>,
    is_bar: bool,
) -> (Option<AxisBound>, Option<AxisBound>) {
    if axis_type != AxisType::Value || !truncate {
        return (None, None);
    }
    let fallback = |bound: AxisBound| (!is_bar).then_some(bound);
    (
        min.map(AxisBound::Value).or_else(|| fallback(AxisBound::DataMin)),
        max.map(AxisBound::Value).or_else(|| fallback(AxisBound::DataMax)),
    )
}

#[derive(Deserialize)]
#[serde(untagged)]
enum BoundRepr {
    Number(f64),
    Text(String),
    Null(()),
}

/// Leniently parses one axis bound: numbers and numeric strings pass; empty strings, nulls and
/// anything else are unset.
pub fn parse_axis_bound(text: &str) -> Option<f64> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return None;
    }
    trimmed.parse::<f64>().ok().filter(|v| !v.is_nan())
}

/// Deserializes a `[min, max]` bound pair leniently (see [`parse_axis_bound`]).
///
/// Missing or null pairs and short arrays deserialize to unset bounds.
pub fn deserialize_axis_bounds<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<[Option<f64>; 2], D::Error> {
    let raw: Option<Vec<BoundRepr>> = Option::deserialize(deserializer)?;
    let mut out = [None, None];
    for (slot, bound) in out.iter_mut().zip(raw.unwrap_or_default()) {
        *slot = match bound {
            BoundRepr::Number(v) => Some(v).filter(|v| !v.is_nan()),
            BoundRepr::Text(text) => parse_axis_bound(&text),
            BoundRepr::Null(()) => None,
        };
    }
    Ok(out)
}

/// Returns the minimum x axis interval for a time grain, in milliseconds.
///
/// Months and years are approximated with 30-day months.
pub fn time_grain_to_timestamp(grain: &str) -> Option<f64> {
    const HOUR: f64 = 3_600_000.0;
    const DAY: f64 = HOUR * 24.0;
    Some(match grain {
        "PT1H" => HOUR,
        "P1D" => DAY,
        "P1M" => DAY * 30.0,
        "P3M" => DAY * 30.0 * 3.0,
        "P1Y" => DAY * 30.0 * 12.0,
        _ => return None,
    })
}

#[cfg(test)]
mod tests {
    extern crate std;

    use super::*;

    #[test]
    fn padding_reserves_legend_and_titles() {
        let p = get_padding(&PaddingOptions {
            show_legend: true,
            legend_orientation: LegendOrientation::Top,
            ..PaddingOptions::default()
        });
        assert_eq!(p, Insets::new(20.0, 40.0, 20.0, 20.0));

        let p = get_padding(&PaddingOptions {
            show_legend: true,
            legend_orientation: LegendOrientation::Right,
            zoomable: true,
            x_axis_title: true,
            x_axis_title_margin: 15.0,
            y_axis_title: true,
            y_axis_title_position: Some(TitlePosition::Left),
            y_axis_title_margin: 30.0,
            ..PaddingOptions::default()
        });
        assert_eq!(p, Insets::new(50.0, 40.0, 160.0, 95.0));

        let p = get_padding(&PaddingOptions {
            show_legend: false,
            legend_orientation: LegendOrientation::Right,
            y_axis_title_position: Some(TitlePosition::Top),
            y_axis_title_margin: 12.0,
            zoomable: true,
            is_horizontal: true,
            ..PaddingOptions::default()
        });
        assert_eq!(p, Insets::new(20.0, 32.0, 20.0, 20.0));
    }

    #[test]
    fn explicit_legend_margin() {
        let p = get_chart_padding(true, LegendOrientation::Bottom, Some(7.0), Insets::ZERO);
        assert_eq!(p, Insets::new(0.0, 0.0, 0.0, 7.0));
    }

    #[test]
    fn legend_moves_clear_of_toolbox() {
        let theme = Theme::default();
        let top = get_legend_props(
            LegendType::Scroll,
            LegendOrientation::Top,
            true,
            &theme,
            true,
        );
        assert_eq!(top.orient, Orient::Horizontal);
        assert_eq!((top.top, top.right), (Some(0.0), Some(55.0)));

        let right = get_legend_props(
            LegendType::Plain,
            LegendOrientation::Right,
            true,
            &theme,
            false,
        );
        assert_eq!(right.orient, Orient::Vertical);
        assert_eq!((right.top, right.right), (Some(0.0), Some(0.0)));
        assert_eq!(
            serde_json::to_value(&right).unwrap()["selector"],
            serde_json::json!(["all", "inverse"])
        );
    }

    #[test]
    fn axis_types() {
        assert_eq!(get_axis_type(false, true, Some(GenericDataType::Temporal)), AxisType::Category);
        assert_eq!(get_axis_type(true, false, Some(GenericDataType::Temporal)), AxisType::Time);
        assert_eq!(get_axis_type(false, false, Some(GenericDataType::Numeric)), AxisType::Value);
        assert_eq!(get_axis_type(true, false, Some(GenericDataType::Numeric)), AxisType::Category);
        assert_eq!(get_axis_type(false, false, None), AxisType::Category);
    }

    #[test]
    fn truncated_bounds() {
        assert_eq!(
            get_min_and_max_from_bounds(AxisType::Value, true, Some(1.0), None, false),
            (Some(AxisBound::Value(1.0)), Some(AxisBound::DataMax))
        );
        assert_eq!(
            get_min_and_max_from_bounds(AxisType::Value, true, None, None, true),
            (None, None)
        );
        assert_eq!(
            get_min_and_max_from_bounds(AxisType::Time, true, Some(1.0), None, false),
            (None, None)
        );
    }

    #[test]
    fn lenient_bounds() {
        #[derive(Deserialize)]
        struct Form {
            #[serde(deserialize_with = "deserialize_axis_bounds", default)]
            bounds: [Option<f64>; 2],
        }
        let parse = |json: &str| serde_json::from_str::<Form>(json).unwrap().bounds;
        assert_eq!(parse(r#"{"bounds": [1, "2.5"]}"#), [Some(1.0), Some(2.5)]);
        assert_eq!(parse(r#"{"bounds": ["", "abc"]}"#), [None, None]);
        assert_eq!(parse(r#"{"bounds": [null, 3]}"#), [None, Some(3.0)]);
        assert_eq!(parse(r#"{"bounds": null}"#), [None, None]);
        assert_eq!(parse("{}"), [None, None]);
    }

    #[test]
    fn time_grains() {
        assert_eq!(time_grain_to_timestamp("P1D"), Some(86_400_000.0));
        assert_eq!(time_grain_to_timestamp("PT1M"), None);
    }
}
