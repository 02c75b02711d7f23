// Copyright 2025 the Xcontrol Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Series descriptors consumed by the chart library.
//!
//! [`SeriesOption`] serializes to the chart library's series JSON. Per-point behavior (value
//! labels and control-band symbols) is held as Rust values and baked into the data items by
//! [`SeriesOption::materialize`] once the final series order is known.

extern crate alloc;

use alloc::boxed::Box;
use alloc::format;
use alloc::string::String;
use alloc::vec::Vec;

use hashbrown::HashMap;
use peniko::Color;
use serde::ser::{SerializeMap, SerializeTuple};
use serde::{Deserialize, Serialize, Serializer};
use xcontrol_transforms::{DataValue, SeriesPoint};

use crate::color::CssColor;
use crate::label::LabelFormatter;
use crate::symbol::{Symbol, SymbolRule};

/// Plot kind of a series.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SeriesKind {
    /// A line (optionally filled as an area).
    #[default]
    Line,
    /// Bars.
    Bar,
    /// Unconnected points.
    Scatter,
}

/// How values of one stack are accumulated.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StackStrategy {
    /// Every value stacks, regardless of sign.
    All,
    /// Positive and negative values stack separately.
    Samesign,
}

/// Stroke dash pattern.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum LineType {
    /// Continuous stroke.
    #[default]
    Solid,
    /// Dashed stroke.
    #[serde(alias = "longDashed")]
    Dashed,
    /// Dotted stroke.
    Dotted,
}

/// Step interpolation of a line.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Step {
    /// Step at the start of each interval.
    Start,
    /// Step in the middle of each interval.
    Middle,
    /// Step at the end of each interval.
    End,
}

/// Label placement.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum LabelPosition {
    /// Above the point.
    Top,
    /// Right of the point.
    Right,
    /// Inside a mark area, at its top.
    InsideTop,
    /// Along a mark line, at its end.
    InsideEndTop,
}

/// Vertical text alignment.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum VerticalAlign {
    /// Align to the top.
    Top,
}

/// Font weight.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FontWeight {
    /// Bold text.
    Bold,
}

/// A stroke width: pixels, or one step bolder than the current width.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum LineWidth {
    /// Width in pixels.
    Px(f64),
    /// The chart library's "bolder" emphasis width.
    Bolder,
}

impl Serialize for LineWidth {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Px(w) => serializer.serialize_f64(*w),
            Self::Bolder => serializer.serialize_str("bolder"),
        }
    }
}

/// Stroke styling.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct LineStyle {
    /// Color.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<CssColor>,
    /// Opacity in `0..=1`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub opacity: Option<f64>,
    /// Dash pattern.
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub line_type: Option<LineType>,
    /// Stroke width.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub width: Option<LineWidth>,
    /// Style on hover.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub emphasis: Option<Box<Self>>,
}

impl LineStyle {
    /// Sets the stroke color.
    pub fn with_color(mut self, color: Color) -> Self {
        self.color = Some(CssColor(color));
        self
    }

    /// Sets the stroke opacity.
    pub fn with_opacity(mut self, opacity: f64) -> Self {
        self.opacity = Some(opacity);
        self
    }

    /// Sets the dash pattern.
    pub fn with_type(mut self, line_type: LineType) -> Self {
        self.line_type = Some(line_type);
        self
    }

    /// Sets the width in pixels.
    pub fn with_width(mut self, width: f64) -> Self {
        self.width = Some(LineWidth::Px(width));
        self
    }

    /// Returns `self` with every field set in `over` replaced by `over`'s value.
    pub fn merged(mut self, over: &Self) -> Self {
        if over.color.is_some() {
            self.color = over.color;
        }
        if over.opacity.is_some() {
            self.opacity = over.opacity;
        }
        if over.line_type.is_some() {
            self.line_type = over.line_type;
        }
        if over.width.is_some() {
            self.width = over.width;
        }
        if over.emphasis.is_some() {
            self.emphasis.clone_from(&over.emphasis);
        }
        self
    }
}

/// Fill/marker styling of points and bars.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct ItemStyle {
    /// Color.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<CssColor>,
    /// Opacity in `0..=1`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub opacity: Option<f64>,
    /// Style on hover.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub emphasis: Option<Box<Self>>,
}

/// Area fill styling.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct AreaStyle {
    /// Fill opacity.
    pub opacity: f64,
}

/// Styling applied on hover.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Emphasis {
    /// Stroke on hover.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub line_style: Option<LineStyle>,
    /// Points on hover.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub item_style: Option<ItemStyle>,
}

/// Label options of a series or a marker.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LabelOption {
    /// Whether the label is shown.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub show: Option<bool>,
    /// Placement.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub position: Option<LabelPosition>,
    /// Color.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<CssColor>,
    /// Vertical alignment.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vertical_align: Option<VerticalAlign>,
    /// Font weight.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub font_weight: Option<FontWeight>,
    /// Background color.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub background_color: Option<CssColor>,
    /// A label template (`{b}` is the data item name).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub formatter: Option<String>,
    /// Label on hover.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub emphasis: Option<Box<Self>>,
}

/// Show/hide switch for a series tooltip.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct TooltipToggle {
    /// Whether the tooltip shows for this series.
    pub show: bool,
}

/// A marker anchor on the x axis.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MarkAnchor {
    /// Label of the marker.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// X position.
    pub x_axis: DataValue,
}

/// A shaded x interval.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MarkArea {
    /// Whether the marker ignores pointer events.
    pub silent: bool,
    /// Fill style.
    pub item_style: ItemStyle,
    /// Marker label.
    pub label: LabelOption,
    /// `[start, end]` pairs.
    pub data: Vec<[MarkAnchor; 2]>,
}

/// Vertical lines at x positions.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MarkLine {
    /// Whether the marker ignores pointer events.
    pub silent: bool,
    /// End symbols.
    pub symbol: Symbol,
    /// Stroke style.
    pub line_style: LineStyle,
    /// Marker label.
    pub label: LabelOption,
    /// One anchor per line.
    pub data: Vec<MarkAnchor>,
}

/// One data point of a series.
///
/// Serializes as `[x, y]`, or as an object when a per-point symbol or label text is set.
#[derive(Clone, Debug, PartialEq)]
pub struct DataItem {
    /// X value.
    pub x: DataValue,
    /// Y value; `None` is a gap.
    pub y: Option<f64>,
    /// Per-point symbol.
    pub symbol: Option<Symbol>,
    /// Per-point label text.
    pub label: Option<String>,
}

impl DataItem {
    /// Creates a plain point.
    pub fn new(x: impl Into<DataValue>, y: Option<f64>) -> Self {
        Self {
            x: x.into(),
            y,
            symbol: None,
            label: None,
        }
    }
}

impl From<&SeriesPoint> for DataItem {
    fn from(p: &SeriesPoint) -> Self {
        Self::new(p.x.clone(), p.y)
    }
}

struct Pair<'a>(&'a DataValue, Option<f64>);

impl Serialize for Pair<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut t = serializer.serialize_tuple(2)?;
        t.serialize_element(self.0)?;
        t.serialize_element(&self.1)?;
        t.end()
    }
}

#[derive(Serialize)]
struct ItemLabel<'a> {
    formatter: &'a str,
}

impl Serialize for DataItem {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let pair = Pair(&self.x, self.y);
        if self.symbol.is_none() && self.label.is_none() {
            return pair.serialize(serializer);
        }
        let mut map = serializer.serialize_map(None)?;
        map.serialize_entry("value", &pair)?;
        if let Some(symbol) = &self.symbol {
            map.serialize_entry("symbol", symbol)?;
        }
        if let Some(label) = &self.label {
            map.serialize_entry("label", &ItemLabel { formatter: label })?;
        }
        map.end()
    }
}

/// A rendering descriptor for one chart series.
#[derive(Clone, Debug, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SeriesOption {
    /// Plot kind.
    #[serde(rename = "type")]
    pub kind: SeriesKind,
    /// Stable identity (deduplicated).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Legend name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Points.
    pub data: Vec<DataItem>,
    /// Draw lines across gaps.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub connect_nulls: Option<bool>,
    /// Index of the query the series came from.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub query_index: Option<usize>,
    /// Y axis the series is plotted against.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub y_axis_index: Option<usize>,
    /// Point and bar style.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub item_style: Option<ItemStyle>,
    /// Stroke style.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub line_style: Option<LineStyle>,
    /// Area fill, when filled.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub area_style: Option<AreaStyle>,
    /// Smooth interpolation.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub smooth: Option<bool>,
    /// Emit events when the line itself is clicked.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub trigger_line_event: Option<bool>,
    /// Step interpolation.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub step: Option<Step>,
    /// Stack key; `None` disables stacking.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stack: Option<String>,
    /// How stacked values accumulate.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stack_strategy: Option<StackStrategy>,
    /// Hover styling.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub emphasis: Option<Emphasis>,
    /// Whether point symbols are drawn.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub show_symbol: Option<bool>,
    /// Series-wide symbol.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub symbol: Option<Symbol>,
    /// Symbol size in pixels.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub symbol_size: Option<f64>,
    /// Value labels.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<LabelOption>,
    /// Tooltip switch.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tooltip: Option<TooltipToggle>,
    /// Ignore pointer events.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub silent: Option<bool>,
    /// Animate updates.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub animation: Option<bool>,
    /// Shaded intervals.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mark_area: Option<MarkArea>,
    /// Vertical marker lines.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mark_line: Option<MarkLine>,
    /// Value-label formatting, applied by [`SeriesOption::materialize`].
    #[serde(skip)]
    pub formatter: Option<LabelFormatter>,
    /// Per-point symbol selection, applied by [`SeriesOption::materialize`].
    #[serde(skip)]
    pub symbol_rule: Option<SymbolRule>,
}

impl SeriesOption {
    /// Bakes the symbol rule and label formatter into the data items.
    ///
    /// `series_index` is the index of this series among the derived (non-annotation) series,
    /// which is what stack-total holders are keyed by.
    pub fn materialize(&mut self, series_index: usize) {
        if let Some(rule) = self.symbol_rule {
            match rule.uniform() {
                Some(symbol) => self.symbol = Some(symbol),
                None => {
                    for item in &mut self.data {
                        item.symbol = Some(rule.symbol(item.y));
                    }
                }
            }
        }
        let shows_labels = self.label.as_ref().is_some_and(|l| l.show == Some(true));
        if shows_labels && let Some(formatter) = &self.formatter {
            for (i, item) in self.data.iter_mut().enumerate() {
                if let Some(y) = item.y {
                    item.label = Some(formatter.format(y, i, series_index));
                }
            }
        }
    }
}

/// Makes series ids unique by suffixing repeats with ` (n)`.
pub fn dedup_series(series: &mut [SeriesOption]) {
    let mut seen: HashMap<String, usize> = HashMap::new();
    for s in series {
        let Some(id) = &mut s.id else {
            continue;
        };
        let count = seen.entry(id.clone()).or_insert(0);
        if *count > 0 {
            *id = format!("{id} ({count})");
        }
        *count += 1;
    }
}

#[cfg(test)]
mod tests {
    extern crate std;

    use alloc::vec;

    use peniko::color::palette::css;
    use serde_json::json;

    use super::*;
    use crate::format::get_number_formatter;

    #[test]
    fn plain_items_are_pairs() {
        let items = vec![DataItem::new(1.0, Some(2.0)), DataItem::new("a", None)];
        assert_eq!(serde_json::to_value(&items).unwrap(), json!([[1.0, 2.0], ["a", null]]));
    }

    #[test]
    fn decorated_items_are_objects() {
        let mut item = DataItem::new(1.0, Some(2.0));
        item.symbol = Some(Symbol::None);
        item.label = Some("2.0".into());
        assert_eq!(
            serde_json::to_value(&item).unwrap(),
            json!({"value": [1.0, 2.0], "symbol": "none", "label": {"formatter": "2.0"}})
        );
    }

    #[test]
    fn line_style_merge_prefers_override() {
        let base = LineStyle::default()
            .with_color(css::RED)
            .with_type(LineType::Dashed)
            .with_width(1.0);
        let merged = base.merged(&LineStyle::default().with_width(3.0).with_opacity(0.5));
        assert_eq!(merged.color, Some(CssColor(css::RED)));
        assert_eq!(merged.width, Some(LineWidth::Px(3.0)));
        assert_eq!(merged.opacity, Some(0.5));
        assert_eq!(
            serde_json::to_value(&merged).unwrap(),
            json!({"color": "#ff0000", "opacity": 0.5, "type": "dashed", "width": 3.0})
        );
    }

    #[test]
    fn long_dashed_reads_as_dashed() {
        let t: LineType = serde_json::from_str("\"longDashed\"").unwrap();
        assert_eq!(t, LineType::Dashed);
    }

    #[test]
    fn materialize_applies_rules() {
        let mut s = SeriesOption {
            data: vec![DataItem::new(0.0, Some(12.0)), DataItem::new(1.0, Some(5.0))],
            label: Some(LabelOption {
                show: Some(true),
                ..LabelOption::default()
            }),
            formatter: Some(LabelFormatter::new(Some(get_number_formatter(Some(".0f"))))),
            symbol_rule: Some(SymbolRule::ControlBand {
                ucl: Some(10.0),
                lcl: Some(0.0),
            }),
            ..SeriesOption::default()
        };
        s.materialize(0);
        assert_eq!(s.data[0].symbol, Some(Symbol::Alarm));
        assert_eq!(s.data[1].symbol, Some(Symbol::InControl));
        assert_eq!(s.data[0].label.as_deref(), Some("12"));
        assert_eq!(s.symbol, None);

        let mut hidden = SeriesOption {
            symbol_rule: Some(SymbolRule::Hidden),
            ..SeriesOption::default()
        };
        hidden.materialize(0);
        assert_eq!(hidden.symbol, Some(Symbol::None));
    }

    #[test]
    fn dedup_suffixes_repeats() {
        let mut series: Vec<SeriesOption> = ["a", "b", "a", "a"]
            .into_iter()
            .map(|id| SeriesOption {
                id: Some(id.into()),
                ..SeriesOption::default()
            })
            .collect();
        series.push(SeriesOption::default());
        dedup_series(&mut series);
        let ids: Vec<_> = series.iter().map(|s| s.id.as_deref()).collect();
        assert_eq!(ids, [Some("a"), Some("b"), Some("a (1)"), Some("a (2)"), None]);
    }
}
