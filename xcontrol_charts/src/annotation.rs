// Copyright 2025 the Xcontrol Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Annotation layers.
//!
//! Each shown layer becomes one or more extra series drawn before the data series:
//! - formula layers: a smooth line evaluating an expression at every x of the result,
//! - interval layers: shaded x ranges (mark areas) from annotation records,
//! - event layers: vertical marker lines from annotation records,
//! - timeseries layers: one line per series of another chart's result.

extern crate alloc;

use alloc::boxed::Box;
use alloc::collections::BTreeMap;
use alloc::format;
use alloc::string::String;
use alloc::vec;
use alloc::vec::Vec;

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use xcontrol_transforms::{AnnotationResult, DataRecord, DataValue};

use crate::color::{ColorScale, CssColor};
use crate::formula::Formula;
use crate::layout::AxisType;
use crate::series_option::{
    DataItem, FontWeight, ItemStyle, LabelOption, LabelPosition, LineStyle, LineType,
    LineWidth, MarkAnchor, MarkArea, MarkLine, SeriesKind, SeriesOption, VerticalAlign,
};
use crate::symbol::Symbol;
use crate::theme::Theme;

/// Kind of an annotation layer.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AnnotationType {
    /// A line from an expression in `x`.
    #[default]
    Formula,
    /// Shaded x ranges.
    Interval,
    /// Vertical marker lines.
    Event,
    /// Lines from another chart's result.
    #[serde(rename = "TIME_SERIES")]
    Timeseries,
}

/// Where annotation records come from.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AnnotationSourceType {
    /// Native annotation layers, with fixed column names.
    #[default]
    #[serde(rename = "NATIVE")]
    Native,
    /// A table chart; column names come from the layer.
    #[serde(rename = "table")]
    Table,
    /// A line chart.
    #[serde(rename = "line")]
    Line,
    /// Any other source.
    #[serde(other)]
    Other,
}

/// Opacity preset of an annotation layer.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AnnotationOpacity {
    /// Fully opaque.
    #[default]
    #[serde(rename = "")]
    Default,
    /// 0.2
    #[serde(rename = "opacityLow")]
    Low,
    /// 0.5
    #[serde(rename = "opacityMedium")]
    Medium,
    /// 0.8
    #[serde(rename = "opacityHigh")]
    High,
}

/// Returns the opacity of a preset.
pub fn parse_annotation_opacity(opacity: AnnotationOpacity) -> f64 {
    match opacity {
        AnnotationOpacity::Low => 0.2,
        AnnotationOpacity::Medium => 0.5,
        AnnotationOpacity::High => 0.8,
        AnnotationOpacity::Default => 1.0,
    }
}

/// One configured annotation layer.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AnnotationLayer {
    /// Layer name; also the key of its annotation data and its legend entry.
    pub name: String,
    /// Kind of layer.
    pub annotation_type: AnnotationType,
    /// Record source.
    pub source_type: AnnotationSourceType,
    /// Formula text, or the id of the source chart/layer.
    pub value: Option<serde_json::Value>,
    /// Whether the layer is drawn.
    pub show: bool,
    /// Show labels without hovering.
    pub show_label: bool,
    /// Fixed color; `None` uses the color scale.
    pub color: Option<String>,
    /// Opacity preset.
    pub opacity: AnnotationOpacity,
    /// Dash pattern.
    pub style: Option<LineType>,
    /// Stroke width.
    pub width: Option<f64>,
    /// Draw markers on timeseries lines.
    pub show_markers: bool,
    /// Hide timeseries lines (markers only).
    pub hide_line: bool,
    /// Record column holding the annotation start.
    pub time_column: Option<String>,
    /// Record column holding the interval end.
    pub interval_end_column: Option<String>,
    /// Record column holding the title.
    pub title_column: Option<String>,
    /// Record columns joined into the description.
    pub description_columns: Vec<String>,
}

impl AnnotationLayer {
    /// Returns the formula text of a formula layer.
    pub fn formula(&self) -> Option<&str> {
        self.value.as_ref().and_then(serde_json::Value::as_str)
    }
}

/// One annotation read from record data.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Annotation {
    /// Start of the annotation.
    pub time: DataValue,
    /// End of an interval annotation.
    pub interval_end: DataValue,
    /// Title text.
    pub title: Option<String>,
    /// Description texts.
    pub descriptions: Vec<Option<String>>,
}

/// Annotation data keyed by layer name.
pub type AnnotationData = BTreeMap<String, AnnotationResult>;

fn text(value: Option<&DataValue>) -> Option<String> {
    match value? {
        DataValue::Null => None,
        DataValue::String(s) => Some(s.clone()),
        other => Some(format!("{other}")),
    }
}

/// Reads the annotations of an interval or event layer.
///
/// Table layers name their columns; native layers use `start_dttm`, `end_dttm`,
/// `short_descr` and `long_descr`. Layers without record data yield nothing.
pub fn extract_record_annotations(
    layer: &AnnotationLayer,
    data: &AnnotationData,
) -> Vec<Annotation> {
    let Some(AnnotationResult::Records(result)) = data.get(&layer.name) else {
        tracing::warn!(layer = %layer.name, "annotation layer has no record data; rerun the query");
        return Vec::new();
    };
    let native = [String::from("long_descr")];
    let (time, end, title, descriptions): (&str, &str, &str, &[String]) =
        if layer.source_type == AnnotationSourceType::Table {
            (
                layer.time_column.as_deref().unwrap_or_default(),
                layer.interval_end_column.as_deref().unwrap_or_default(),
                layer.title_column.as_deref().unwrap_or_default(),
                &layer.description_columns,
            )
        } else {
            ("start_dttm", "end_dttm", "short_descr", &native)
        };
    result
        .records
        .iter()
        .map(|record: &DataRecord| Annotation {
            time: record.get(time).cloned().unwrap_or_default(),
            interval_end: record.get(end).cloned().unwrap_or_default(),
            title: text(record.get(title)),
            descriptions: descriptions.iter().map(|c| text(record.get(c))).collect(),
        })
        .collect()
}

/// Builds an annotation label: `name - title`, then a blank line and the non-empty
/// descriptions, one per line.
pub fn format_annotation_label(
    name: Option<&str>,
    title: Option<&str>,
    descriptions: &[Option<String>],
) -> String {
    let titles: Vec<&str> = [name, title]
        .into_iter()
        .flatten()
        .filter(|s| !s.is_empty())
        .collect();
    let descriptions: Vec<&str> = descriptions
        .iter()
        .filter_map(|d| d.as_deref())
        .filter(|d| !d.is_empty())
        .collect();
    let mut labels = Vec::new();
    if !titles.is_empty() {
        labels.push(titles.join(" - "));
    }
    if !descriptions.is_empty() {
        labels.push(descriptions.join("\n"));
    }
    labels.join("\n\n")
}

/// Returns the legend entries contributed by shown layers: formula names, then timeseries
/// keys.
pub fn extract_annotation_labels(layers: &[AnnotationLayer], data: &AnnotationData) -> Vec<String> {
    let shown = |kind: AnnotationType| {
        layers
            .iter()
            .filter(move |l| l.show && l.annotation_type == kind)
    };
    let formulas = shown(AnnotationType::Formula).map(|l| l.name.clone());
    let timeseries = shown(AnnotationType::Timeseries).flat_map(|l| match data.get(&l.name) {
        Some(AnnotationResult::Timeseries(series)) => {
            series.iter().map(|s| s.key.clone()).collect::<Vec<_>>()
        }
        _ => Vec::new(),
    });
    formulas.chain(timeseries).collect()
}

fn layer_color(layer: &AnnotationLayer, colors: &dyn ColorScale, slice_id: Option<i64>) -> CssColor {
    layer
        .color
        .as_deref()
        .filter(|c| !c.is_empty())
        .and_then(|c| peniko::color::parse_color(c).ok())
        .map(|c| CssColor(c.to_alpha_color()))
        .unwrap_or_else(|| CssColor(colors.color(&layer.name, slice_id)))
}

/// Converts an x value of a time axis to epoch milliseconds.
fn time_millis(value: &DataValue) -> Option<f64> {
    match value {
        DataValue::Number(v) => Some(*v),
        DataValue::String(s) => {
            if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
                return Some(dt.timestamp_millis() as f64);
            }
            let naive = NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f")
                .or_else(|_| NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S%.f"))
                .ok()
                .or_else(|| {
                    NaiveDate::parse_from_str(s, "%Y-%m-%d")
                        .ok()
                        .and_then(|d| d.and_hms_opt(0, 0, 0))
                })?;
            Some(naive.and_utc().timestamp_millis() as f64)
        }
        _ => None,
    }
}

/// Evaluates a formula layer at each x of `data`.
///
/// On time axes x is epoch milliseconds. Rows without a numeric x are skipped.
pub fn eval_formula(
    formula: &Formula,
    data: &[DataRecord],
    x_axis_col: &str,
    x_axis_type: AxisType,
) -> Vec<DataItem> {
    data.iter()
        .filter_map(|row| {
            let x = row.get(x_axis_col)?;
            let x_num = if x_axis_type == AxisType::Time {
                time_millis(x)?
            } else {
                x.coerce_f64()?
            };
            let y = formula.eval(x_num);
            Some(DataItem::new(x_num, y.is_finite().then_some(y)))
        })
        .collect()
}

/// Builds the line of a formula layer.
///
/// Returns `None` (with a warning) when the formula does not parse.
pub fn transform_formula_annotation(
    layer: &AnnotationLayer,
    data: &[DataRecord],
    x_axis_col: &str,
    x_axis_type: AxisType,
    colors: &dyn ColorScale,
    slice_id: Option<i64>,
) -> Option<SeriesOption> {
    let formula = match Formula::parse(layer.formula().unwrap_or_default()) {
        Ok(formula) => formula,
        Err(error) => {
            tracing::warn!(layer = %layer.name, %error, "skipping formula annotation");
            return None;
        }
    };
    Some(SeriesOption {
        kind: SeriesKind::Line,
        id: Some(layer.name.clone()),
        name: Some(layer.name.clone()),
        item_style: Some(ItemStyle {
            color: Some(layer_color(layer, colors, slice_id)),
            ..ItemStyle::default()
        }),
        line_style: Some(LineStyle {
            opacity: Some(parse_annotation_opacity(layer.opacity)),
            line_type: layer.style,
            width: layer.width.map(LineWidth::Px),
            ..LineStyle::default()
        }),
        smooth: Some(true),
        data: eval_formula(&formula, data, x_axis_col, x_axis_type),
        symbol_size: Some(0.0),
        ..SeriesOption::default()
    })
}

fn interval_label(theme: &Theme, show: bool) -> LabelOption {
    let emphasis = LabelOption {
        show: (!show).then_some(true),
        position: Some(LabelPosition::InsideTop),
        vertical_align: Some(VerticalAlign::Top),
        font_weight: (!show).then_some(FontWeight::Bold),
        background_color: Some(CssColor(theme.grayscale_light5)),
        ..LabelOption::default()
    };
    LabelOption {
        show: Some(show),
        color: Some(CssColor(theme.grayscale_dark2)),
        position: show.then_some(LabelPosition::InsideTop),
        vertical_align: show.then_some(VerticalAlign::Top),
        font_weight: show.then_some(FontWeight::Bold),
        emphasis: Some(Box::new(emphasis)),
        ..LabelOption::default()
    }
}

fn event_label(theme: &Theme, show: bool) -> LabelOption {
    // `{b}` renders the data item name, which holds the annotation label.
    let name = || Some(String::from("{b}"));
    let emphasis = LabelOption {
        show: (!show).then_some(true),
        font_weight: (!show).then_some(FontWeight::Bold),
        background_color: Some(CssColor(theme.grayscale_light5)),
        formatter: if show { None } else { name() },
        ..LabelOption::default()
    };
    LabelOption {
        show: Some(show),
        color: Some(CssColor(theme.grayscale_dark2)),
        position: Some(LabelPosition::InsideEndTop),
        font_weight: show.then_some(FontWeight::Bold),
        formatter: if show { name() } else { None },
        emphasis: Some(Box::new(emphasis)),
        ..LabelOption::default()
    }
}

/// Builds one mark-area series per annotation of an interval layer.
pub fn transform_interval_annotation(
    layer: &AnnotationLayer,
    data: &AnnotationData,
    colors: &dyn ColorScale,
    theme: &Theme,
    slice_id: Option<i64>,
) -> Vec<SeriesOption> {
    let opacity = match layer.opacity {
        AnnotationOpacity::Default => AnnotationOpacity::Medium,
        other => other,
    };
    extract_record_annotations(layer, data)
        .into_iter()
        .map(|annotation| {
            let label = format_annotation_label(
                Some(&layer.name),
                annotation.title.as_deref(),
                &annotation.descriptions,
            );
            SeriesOption {
                kind: SeriesKind::Line,
                id: Some(format!("Interval - {label}")),
                animation: Some(false),
                mark_area: Some(MarkArea {
                    silent: false,
                    item_style: ItemStyle {
                        color: Some(layer_color(layer, colors, slice_id)),
                        opacity: Some(parse_annotation_opacity(opacity)),
                        emphasis: Some(Box::new(ItemStyle {
                            opacity: Some(0.8),
                            ..ItemStyle::default()
                        })),
                    },
                    label: interval_label(theme, layer.show_label),
                    data: vec![[
                        MarkAnchor {
                            name: Some(label),
                            x_axis: annotation.time,
                        },
                        MarkAnchor {
                            name: None,
                            x_axis: annotation.interval_end,
                        },
                    ]],
                }),
                ..SeriesOption::default()
            }
        })
        .collect()
}

/// Builds one mark-line series per annotation of an event layer.
pub fn transform_event_annotation(
    layer: &AnnotationLayer,
    data: &AnnotationData,
    colors: &dyn ColorScale,
    theme: &Theme,
    slice_id: Option<i64>,
) -> Vec<SeriesOption> {
    extract_record_annotations(layer, data)
        .into_iter()
        .map(|annotation| {
            let label = format_annotation_label(
                Some(&layer.name),
                annotation.title.as_deref(),
                &annotation.descriptions,
            );
            let line_style = LineStyle {
                width: layer.width.map(LineWidth::Px),
                line_type: layer.style,
                color: Some(layer_color(layer, colors, slice_id)),
                opacity: Some(parse_annotation_opacity(layer.opacity)),
                emphasis: Some(Box::new(LineStyle {
                    width: layer.width.map(|w| LineWidth::Px(w + 1.0)),
                    opacity: Some(1.0),
                    ..LineStyle::default()
                })),
            };
            SeriesOption {
                kind: SeriesKind::Line,
                id: Some(format!("Event - {label}")),
                animation: Some(false),
                mark_line: Some(MarkLine {
                    silent: false,
                    symbol: Symbol::None,
                    line_style,
                    label: event_label(theme, layer.show_label),
                    data: vec![MarkAnchor {
                        name: Some(label),
                        x_axis: annotation.time,
                    }],
                }),
                ..SeriesOption::default()
            }
        })
        .collect()
}

/// Builds one line per series of a timeseries layer's data.
pub fn transform_timeseries_annotation(
    layer: &AnnotationLayer,
    marker_size: f64,
    data: &AnnotationData,
    colors: &dyn ColorScale,
    slice_id: Option<i64>,
) -> Vec<SeriesOption> {
    let Some(AnnotationResult::Timeseries(result)) = data.get(&layer.name) else {
        return Vec::new();
    };
    result
        .iter()
        .map(|annotation| SeriesOption {
            kind: SeriesKind::Line,
            id: Some(annotation.key.clone()),
            name: Some(annotation.key.clone()),
            data: annotation
                .values
                .iter()
                .map(|p| DataItem::new(p.x.clone(), p.y))
                .collect(),
            symbol_size: Some(if layer.show_markers { marker_size } else { 0.0 }),
            line_style: Some(LineStyle {
                opacity: Some(parse_annotation_opacity(layer.opacity)),
                line_type: layer.style,
                width: if layer.hide_line {
                    Some(LineWidth::Px(0.0))
                } else {
                    layer.width.map(LineWidth::Px)
                },
                color: Some(layer_color(layer, colors, slice_id)),
                emphasis: None,
            }),
            ..SeriesOption::default()
        })
        .collect()
}

#[cfg(test)]
mod tests {
    extern crate std;

    use serde_json::json;
    use xcontrol_transforms::{RecordAnnotations, TimeseriesAnnotationPoint, TimeseriesAnnotationSeries};

    use super::*;
    use crate::color::CategoricalColorScale;

    fn records(rows: serde_json::Value) -> AnnotationResult {
        AnnotationResult::Records(RecordAnnotations {
            columns: Vec::new(),
            records: serde_json::from_value(rows).unwrap(),
        })
    }

    fn layer(json: serde_json::Value) -> AnnotationLayer {
        serde_json::from_value(json).unwrap()
    }

    #[test]
    fn opacity_presets() {
        let parse = |s: &str| parse_annotation_opacity(serde_json::from_value(json!(s)).unwrap());
        assert_eq!(parse("opacityLow"), 0.2);
        assert_eq!(parse("opacityMedium"), 0.5);
        assert_eq!(parse("opacityHigh"), 0.8);
        assert_eq!(parse(""), 1.0);
    }

    #[test]
    fn labels_join_titles_and_descriptions() {
        let d = |s: &str| Some(String::from(s));
        assert_eq!(
            format_annotation_label(Some("Deploys"), Some("v2"), &[d("fast"), None, d(""), d("safe")]),
            "Deploys - v2\n\nfast\nsafe"
        );
        assert_eq!(format_annotation_label(None, Some("v2"), &[]), "v2");
        assert_eq!(format_annotation_label(None, None, &[d("x")]), "x");
        assert_eq!(format_annotation_label(Some(""), None, &[]), "");
    }

    #[test]
    fn native_and_table_columns() {
        let mut data = AnnotationData::new();
        data.insert(
            "native".into(),
            records(json!([{"start_dttm": 1, "end_dttm": 2, "short_descr": "t", "long_descr": "d"}])),
        );
        data.insert(
            "table".into(),
            records(json!([{"ts": 5, "title": "deploy", "note": "n"}])),
        );
        let native = extract_record_annotations(&layer(json!({"name": "native"})), &data);
        assert_eq!(native.len(), 1);
        assert_eq!(native[0].time, DataValue::Number(1.0));
        assert_eq!(native[0].interval_end, DataValue::Number(2.0));
        assert_eq!(native[0].title.as_deref(), Some("t"));
        assert_eq!(native[0].descriptions, [Some(String::from("d"))]);

        let table = extract_record_annotations(
            &layer(json!({
                "name": "table",
                "sourceType": "table",
                "timeColumn": "ts",
                "titleColumn": "title",
                "descriptionColumns": ["note", "missing"],
            })),
            &data,
        );
        assert_eq!(table[0].time, DataValue::Number(5.0));
        assert_eq!(table[0].interval_end, DataValue::Null);
        assert_eq!(table[0].descriptions, [Some(String::from("n")), None]);

        assert!(extract_record_annotations(&layer(json!({"name": "absent"})), &data).is_empty());
    }

    #[test]
    fn formula_layer_evaluates_over_rows() {
        let rows: Vec<DataRecord> =
            serde_json::from_value(json!([{"ts": 0}, {"ts": 2}, {"ts": null}])).unwrap();
        let l = layer(json!({
            "name": "trend",
            "annotationType": "FORMULA",
            "value": "y = 2x + 1",
            "opacity": "opacityLow",
            "style": "dashed",
            "width": 2,
            "show": true,
        }));
        let colors = CategoricalColorScale::default();
        let s = transform_formula_annotation(&l, &rows, "ts", AxisType::Value, &colors, None)
            .unwrap();
        assert_eq!(s.id.as_deref(), Some("trend"));
        assert_eq!(s.smooth, Some(true));
        assert_eq!(s.symbol_size, Some(0.0));
        let ys: Vec<_> = s.data.iter().map(|d| d.y).collect();
        assert_eq!(ys, [Some(1.0), Some(5.0)]);
        let line = s.line_style.unwrap();
        assert_eq!(line.opacity, Some(0.2));
        assert_eq!(line.line_type, Some(LineType::Dashed));

        let bad = layer(json!({"name": "bad", "value": "2 *"}));
        assert!(transform_formula_annotation(&bad, &rows, "ts", AxisType::Value, &colors, None).is_none());

        let nested = format!("{}x{}", "(".repeat(100_000), ")".repeat(100_000));
        let deep = layer(json!({"name": "deep", "value": nested}));
        assert!(transform_formula_annotation(&deep, &rows, "ts", AxisType::Value, &colors, None).is_none());
    }

    #[test]
    fn formula_on_time_axis_reads_dates() {
        let rows: Vec<DataRecord> =
            serde_json::from_value(json!([{"ts": "1970-01-02"}, {"ts": 1000}])).unwrap();
        let f = Formula::parse("x / 1000").unwrap();
        let items = eval_formula(&f, &rows, "ts", AxisType::Time);
        assert_eq!(items[0].y, Some(86_400.0));
        assert_eq!(items[1].y, Some(1.0));
    }

    #[test]
    fn interval_and_event_series() {
        let mut data = AnnotationData::new();
        data.insert(
            "Releases".into(),
            records(json!([{"start_dttm": 10, "end_dttm": 20, "short_descr": "v1"}])),
        );
        let theme = Theme::default();
        let colors = CategoricalColorScale::default();
        let interval = layer(json!({"name": "Releases", "annotationType": "INTERVAL", "color": "#00ff00"}));
        let series = transform_interval_annotation(&interval, &data, &colors, &theme, None);
        assert_eq!(series.len(), 1);
        assert_eq!(series[0].id.as_deref(), Some("Interval - Releases - v1"));
        let area = series[0].mark_area.as_ref().unwrap();
        assert_eq!(area.item_style.opacity, Some(0.5));
        assert_eq!(
            serde_json::to_value(&area.item_style.color).unwrap(),
            json!("#00ff00")
        );
        assert_eq!(area.data[0][1].x_axis, DataValue::Number(20.0));
        assert_eq!(area.label.show, Some(false));

        let event = layer(json!({
            "name": "Releases",
            "annotationType": "EVENT",
            "showLabel": true,
            "width": 2,
        }));
        let series = transform_event_annotation(&event, &data, &colors, &theme, None);
        assert_eq!(series[0].id.as_deref(), Some("Event - Releases - v1"));
        let line = series[0].mark_line.as_ref().unwrap();
        assert_eq!(line.symbol, Symbol::None);
        assert_eq!(line.label.formatter.as_deref(), Some("{b}"));
        assert_eq!(line.label.position, Some(LabelPosition::InsideEndTop));
        assert_eq!(
            line.line_style.emphasis.as_ref().unwrap().width,
            Some(LineWidth::Px(3.0))
        );
    }

    #[test]
    fn timeseries_layers_and_legend_labels() {
        let mut data = AnnotationData::new();
        data.insert(
            "Other chart".into(),
            AnnotationResult::Timeseries(vec![TimeseriesAnnotationSeries {
                key: "revenue".into(),
                values: vec![TimeseriesAnnotationPoint {
                    x: DataValue::Number(1.0),
                    y: Some(2.0),
                }],
            }]),
        );
        let ts = layer(json!({
            "name": "Other chart",
            "annotationType": "TIME_SERIES",
            "show": true,
            "hideLine": true,
            "showMarkers": true,
        }));
        let colors = CategoricalColorScale::default();
        let series = transform_timeseries_annotation(&ts, 6.0, &data, &colors, None);
        assert_eq!(series.len(), 1);
        assert_eq!(series[0].name.as_deref(), Some("revenue"));
        assert_eq!(series[0].symbol_size, Some(6.0));
        assert_eq!(series[0].line_style.as_ref().unwrap().width, Some(LineWidth::Px(0.0)));

        let formula = layer(json!({"name": "f", "annotationType": "FORMULA", "show": true}));
        let hidden = layer(json!({"name": "g", "annotationType": "FORMULA", "show": false}));
        assert_eq!(
            extract_annotation_labels(&[ts, formula, hidden], &data),
            ["f", "revenue"]
        );
    }
}
