// Copyright 2025 the Xcontrol Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Deriving series descriptors from raw series.
//!
//! [`transform_series`] turns one extracted series plus the chart options into a
//! [`SeriesOption`]: plot kind, stack key, styles, symbol and label behavior. Forecast bands
//! that cannot be drawn under the current stacking are suppressed.

extern crate alloc;

use alloc::string::String;
use alloc::vec::Vec;

use hashbrown::HashMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use xcontrol_transforms::{
    DataRecord, ForecastRole, ForecastRoles, RawSeries, extract_forecast_series_context,
    get_time_compare_stack_id,
};

use crate::baseline::BASELINE_STACK;
use crate::color::{ColorScale, CssColor};
use crate::control_limit::ControlLimitRole;
use crate::format::SharedFormatter;
use crate::label::LabelFormatter;
use crate::series_option::{
    AreaStyle, DataItem, Emphasis, ItemStyle, LabelOption, LabelPosition, LineStyle, LineWidth,
    SeriesKind, SeriesOption, StackStrategy, Step,
};
use crate::symbol::SymbolRule;

/// Opacity of hidden strokes.
pub const OPACITY_TRANSPARENT: f64 = 0.0;
/// Opacity of series excluded by a cross-filter selection.
pub const OPACITY_SEMI_TRANSPARENT: f64 = 0.3;
/// Opacity of everything else.
pub const OPACITY_NON_TRANSPARENT: f64 = 1.0;

/// Requested series shape.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SeriesType {
    /// Straight line segments.
    #[default]
    Line,
    /// Points only.
    Scatter,
    /// Smoothed line.
    Smooth,
    /// Bars.
    Bar,
    /// Step line, stepping at the start.
    Start,
    /// Step line, stepping in the middle.
    Middle,
    /// Step line, stepping at the end.
    End,
}

impl SeriesType {
    /// Returns the step interpolation for step shapes.
    pub const fn step(self) -> Option<Step> {
        match self {
            Self::Start => Some(Step::Start),
            Self::Middle => Some(Step::Middle),
            Self::End => Some(Step::End),
            _ => None,
        }
    }
}

/// Stacking mode.
///
/// Form data stores this as `null`, a boolean (older charts) or one of `"Stack"`, `"Expand"`,
/// `"Stream"`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum StackMode {
    /// No stacking.
    #[default]
    Off,
    /// Plain stacking.
    Stack,
    /// Stacking normalized to 100%.
    Expand,
    /// Streamgraph stacking around a computed baseline.
    Stream,
}

impl StackMode {
    /// Returns `true` unless stacking is off.
    pub const fn is_stacked(self) -> bool {
        !matches!(self, Self::Off)
    }

    fn name(self) -> Option<&'static str> {
        match self {
            Self::Off => None,
            Self::Stack => Some("Stack"),
            Self::Expand => Some("Expand"),
            Self::Stream => Some("Stream"),
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum StackRepr {
    Flag(bool),
    Name(Option<String>),
}

impl<'de> Deserialize<'de> for StackMode {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Ok(match StackRepr::deserialize(deserializer)? {
            StackRepr::Flag(true) => Self::Stack,
            StackRepr::Flag(false) | StackRepr::Name(None) => Self::Off,
            StackRepr::Name(Some(name)) => match name.as_str() {
                "Stack" => Self::Stack,
                "Expand" => Self::Expand,
                "Stream" => Self::Stream,
                "" => Self::Off,
                other => {
                    return Err(serde::de::Error::unknown_variant(
                        other,
                        &["Stack", "Expand", "Stream"],
                    ));
                }
            },
        })
    }
}

impl Serialize for StackMode {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.name().serialize(serializer)
    }
}

/// Options for [`transform_series`].
#[derive(Clone, Debug)]
pub struct TransformSeriesOptions {
    /// Fill the area under lines.
    pub area: bool,
    /// Connect lines across missing values.
    pub connect_nulls: bool,
    /// Cross-filter selection; series not in it are dimmed.
    pub selected_values: Option<Vec<String>>,
    /// Forecast roles present per base series name.
    pub series_contexts: HashMap<String, ForecastRoles>,
    /// Draw markers on lines.
    pub marker_enabled: bool,
    /// Marker size in pixels.
    pub marker_size: Option<f64>,
    /// Multiplier of the area fill opacity.
    pub area_opacity: f64,
    /// Requested shape.
    pub series_type: SeriesType,
    /// Stacking mode.
    pub stack: StackMode,
    /// Appended to every assigned stack key.
    pub stack_id_suffix: Option<String>,
    /// Y axis index.
    pub y_axis_index: usize,
    /// Apply the fixed control-limit styling and alarm markers.
    pub xcontrol_show_custom: bool,
    /// Show value labels.
    pub show_value: bool,
    /// With stacking, label only the stack totals.
    pub only_total: bool,
    /// Legend selection per series name.
    pub legend_state: Option<HashMap<String, bool>>,
    /// Value formatter for labels.
    pub formatter: Option<SharedFormatter>,
    /// Stack total per x index.
    pub total_stacked_values: Vec<f64>,
    /// Series index holding the total label per x index.
    pub show_value_indexes: Vec<Option<usize>>,
    /// Label threshold per x index.
    pub threshold_values: Vec<f64>,
    /// Tooltip triggers on the whole axis rather than single items.
    pub rich_tooltip: bool,
    /// Chart id, keeping colors of equally named series apart across charts.
    pub slice_id: Option<i64>,
    /// Bars/lines run horizontally.
    pub is_horizontal: bool,
    /// Explicit line style, winning over computed styles for the keys it sets.
    pub line_style: Option<LineStyle>,
    /// Index of the query the series came from.
    pub query_index: usize,
    /// Time-comparison offsets.
    pub time_compare: Vec<String>,
}

impl Default for TransformSeriesOptions {
    fn default() -> Self {
        Self {
            area: false,
            connect_nulls: false,
            selected_values: None,
            series_contexts: HashMap::new(),
            marker_enabled: false,
            marker_size: None,
            area_opacity: 1.0,
            series_type: SeriesType::Line,
            stack: StackMode::Off,
            stack_id_suffix: None,
            y_axis_index: 0,
            xcontrol_show_custom: false,
            show_value: false,
            only_total: false,
            legend_state: None,
            formatter: None,
            total_stacked_values: Vec::new(),
            show_value_indexes: Vec::new(),
            threshold_values: Vec::new(),
            rich_tooltip: false,
            slice_id: None,
            is_horizontal: false,
            line_style: None,
            query_index: 0,
            time_compare: Vec::new(),
        }
    }
}

fn symbol_rule(
    series: &RawSeries,
    opts: &TransformSeriesOptions,
    data: &[DataRecord],
) -> SymbolRule {
    if !opts.xcontrol_show_custom {
        return SymbolRule::Default;
    }
    let Some(first) = data.first() else {
        return SymbolRule::Default;
    };
    if ControlLimitRole::from_series_id(&series.id).is_some() {
        return SymbolRule::Hidden;
    }
    let limit = |role: ControlLimitRole| first.get(role.id()).and_then(|v| v.coerce_f64());
    SymbolRule::ControlBand {
        ucl: limit(ControlLimitRole::Ucl),
        lcl: limit(ControlLimitRole::Lcl),
    }
}

/// Derives the descriptor of one series.
///
/// `color_key` is the color-scale key (the series name without time-comparison suffixes);
/// `data` are the result rows, whose first row carries the control limits.
///
/// Returns `None` for a forecast confidence band when stacking or area fill is on.
pub fn transform_series(
    series: &RawSeries,
    colors: &dyn ColorScale,
    color_key: &str,
    opts: &TransformSeriesOptions,
    data: &[DataRecord],
) -> Option<SeriesOption> {
    let name = series.name.as_str();
    let has_forecast = opts
        .series_contexts
        .get(name)
        .is_some_and(|roles| roles.iter().any(|r| r.is_forecast()));
    let forecast = extract_forecast_series_context(name);
    let is_band = forecast.role.is_confidence_band();
    let is_observation = forecast.role == ForecastRole::Observation;
    let stacked = opts.stack.is_stacked();

    if (stacked || opts.area) && is_band {
        return None;
    }

    let is_filtered = opts
        .selected_values
        .as_ref()
        .is_some_and(|selected| !selected.iter().any(|v| v == name));
    let opacity = if is_filtered {
        OPACITY_SEMI_TRANSPARENT
    } else {
        OPACITY_NON_TRANSPARENT
    };

    let mut stack = match forecast.role {
        ForecastRole::Lower | ForecastRole::Upper => Some(String::from(forecast.name)),
        ForecastRole::Observation if stacked => Some(get_time_compare_stack_id(
            BASELINE_STACK,
            &opts.time_compare,
            name,
        )),
        ForecastRole::Trend if stacked => Some(get_time_compare_stack_id(
            ForecastRole::Trend.suffix(),
            &opts.time_compare,
            name,
        )),
        _ => None,
    };
    if let (Some(id), Some(suffix)) = (&mut stack, &opts.stack_id_suffix)
        && !id.is_empty()
    {
        id.push_str(suffix);
    }

    let kind = if is_band {
        SeriesKind::Line
    } else if opts.series_type == SeriesType::Scatter || (has_forecast && is_observation) {
        SeriesKind::Scatter
    } else if opts.series_type == SeriesType::Bar {
        SeriesKind::Bar
    } else {
        SeriesKind::Line
    };

    let mut item_style = ItemStyle {
        color: Some(CssColor(colors.color(color_key, opts.slice_id))),
        opacity: Some(opacity),
        emphasis: None,
    };
    let mut item_emphasis = None;
    let mut show_symbol = false;
    let mut control_line = LineStyle::default();
    let mut show_label = opts.show_value;
    let reserved = opts
        .xcontrol_show_custom
        .then(|| ControlLimitRole::from_series_id(&series.id))
        .flatten();
    if let Some(role) = reserved.filter(|_| !is_band) {
        let style = role.style();
        control_line = style.line_style();
        show_label &= style.show_label;
    } else if !is_band {
        if kind == SeriesKind::Scatter || (has_forecast && is_observation) {
            show_symbol = true;
        } else if kind == SeriesKind::Line && opts.show_value {
            show_symbol = true;
        } else if kind == SeriesKind::Line && !opts.rich_tooltip && !opts.marker_enabled {
            // Invisible symbols keep points clickable for item-triggered cross-filtering.
            show_symbol = true;
            item_style.opacity = Some(OPACITY_TRANSPARENT);
            item_emphasis = Some(ItemStyle {
                opacity: Some(OPACITY_NON_TRANSPARENT),
                ..ItemStyle::default()
            });
        } else if opts.marker_enabled {
            show_symbol = true;
        }
    }

    let line_opacity = if is_band || (opts.stack == StackMode::Stream && opts.area) {
        OPACITY_TRANSPARENT
    } else {
        opacity
    };
    let line_style = control_line.merged(
        &opts
            .line_style
            .clone()
            .unwrap_or_default()
            .with_opacity(line_opacity),
    );

    let area_style = (opts.area || forecast.role == ForecastRole::Upper).then(|| AreaStyle {
        opacity: opacity * opts.area_opacity,
    });

    let legend_selected = opts
        .legend_state
        .as_ref()
        .is_none_or(|state| state.get(forecast.name).copied().unwrap_or(false));
    let formatter = LabelFormatter::new(opts.formatter.clone())
        .with_stacking(stacked, opts.stack == StackMode::Expand)
        .with_only_total(opts.only_total)
        .with_legend_selected(legend_selected)
        .with_totals(
            opts.total_stacked_values.clone(),
            opts.show_value_indexes.clone(),
            opts.threshold_values.clone(),
        );

    Some(SeriesOption {
        kind,
        id: Some(series.id.clone()),
        name: Some(String::from(forecast.name)),
        data: series.data.iter().map(DataItem::from).collect(),
        connect_nulls: Some(opts.connect_nulls),
        query_index: Some(opts.query_index),
        y_axis_index: Some(opts.y_axis_index),
        item_style: Some(item_style),
        line_style: Some(line_style),
        area_style,
        smooth: Some(opts.series_type == SeriesType::Smooth),
        trigger_line_event: Some(true),
        step: opts.series_type.step(),
        stack,
        stack_strategy: Some(if is_band || opts.stack == StackMode::Stream {
            StackStrategy::All
        } else {
            StackStrategy::Samesign
        }),
        emphasis: Some(Emphasis {
            line_style: Some(LineStyle {
                width: Some(LineWidth::Bolder),
                ..LineStyle::default()
            }),
            item_style: item_emphasis,
        }),
        show_symbol: Some(show_symbol),
        symbol: None,
        symbol_size: opts.marker_size,
        label: Some(LabelOption {
            show: Some(show_label),
            position: Some(if opts.is_horizontal {
                LabelPosition::Right
            } else {
                LabelPosition::Top
            }),
            ..LabelOption::default()
        }),
        formatter: Some(formatter),
        symbol_rule: Some(symbol_rule(series, opts, data)),
        ..SeriesOption::default()
    })
}

#[cfg(test)]
mod tests {
    extern crate std;

    use super::*;

    #[test]
    fn stack_mode_accepts_legacy_booleans() {
        let modes: Vec<StackMode> =
            serde_json::from_str(r#"[true, false, null, "Stack", "Expand", "Stream", ""]"#)
                .unwrap();
        assert_eq!(
            modes,
            [
                StackMode::Stack,
                StackMode::Off,
                StackMode::Off,
                StackMode::Stack,
                StackMode::Expand,
                StackMode::Stream,
                StackMode::Off,
            ]
        );
        assert!(serde_json::from_str::<StackMode>(r#""Sideways""#).is_err());
        assert_eq!(serde_json::to_string(&StackMode::Expand).unwrap(), r#""Expand""#);
        assert_eq!(serde_json::to_string(&StackMode::Off).unwrap(), "null");
    }

    #[test]
    fn step_shapes() {
        assert_eq!(SeriesType::Start.step(), Some(Step::Start));
        assert_eq!(SeriesType::Smooth.step(), None);
        let t: SeriesType = serde_json::from_str(r#""middle""#).unwrap();
        assert_eq!(t, SeriesType::Middle);
    }
}
