// Copyright 2025 the Xcontrol Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

extern crate std;

use alloc::string::{String, ToString};
use alloc::vec::Vec;

use serde_json::{Value, json};
use xcontrol_charts::{
    AxisBound, AxisType, LineType, Symbol, TooltipParam, escape_html,
};
use xcontrol_transforms::DataValue;

use crate::{
    ChartProps, NameLocation, TooltipTrigger, XcontrolChartProps, transform_props,
};

// 2024-03-05T00:00:00Z and the following day.
const DAY_1: f64 = 1_709_596_800_000.0;
const DAY_2: f64 = DAY_1 + 86_400_000.0;

const LIMITS: [&str; 7] = ["UCL", "UCLA", "UCLB", "LCL", "LCLA", "LCLB", "CL"];

fn row(ds: f64, defects: f64) -> Value {
    json!({
        "ds": ds,
        "defects": defects,
        "UCL": 10.0,
        "UCLA": 8.0,
        "UCLB": 7.0,
        "LCL": 1.0,
        "LCLA": 2.0,
        "LCLB": 3.0,
        "CL": 5.0,
    })
}

fn props(form_data: Value) -> ChartProps {
    let mut form = json!({
        "datasource": "1__table",
        "viz_type": "xcontrol",
        "x_axis": "ds",
        "time_grain_sqla": "P1D",
        "metrics": ["defects"],
    });
    if let (Value::Object(form), Value::Object(extra)) = (&mut form, form_data) {
        form.extend(extra);
    }
    let mut colnames = Vec::from(["ds", "defects"]);
    colnames.extend(LIMITS);
    let mut coltypes = Vec::from([2, 0]);
    coltypes.extend([0; 7]);
    let payload = json!({
        "width": 640,
        "height": 480,
        "formData": form,
        "queriesData": [{
            "colnames": colnames,
            "coltypes": coltypes,
            "data": [row(DAY_1, 12.0), row(DAY_2, 6.0)],
        }],
    });
    ChartProps::from_json(&payload.to_string()).unwrap()
}

fn names(chart: &XcontrolChartProps) -> Vec<&str> {
    chart
        .echart_options
        .series
        .iter()
        .map(|s| s.name.as_deref().unwrap_or_default())
        .collect()
}

#[test]
fn every_result_column_but_the_axis_is_a_series() {
    let chart = transform_props(&props(json!({})));
    let mut expected = Vec::from(["defects"]);
    expected.extend(LIMITS);
    assert_eq!(names(&chart), expected);
    assert_eq!(chart.series_breakdown, 8);
    assert_eq!(chart.echart_options.legend.data, expected);
    assert_eq!(chart.width, 640.0);
}

#[test]
fn control_limits_are_dashed_and_observations_flag_alarms() {
    let chart = transform_props(&props(json!({})));
    let series = &chart.echart_options.series;

    let observations = &series[0];
    let symbols: Vec<_> = observations.data.iter().map(|d| d.symbol).collect();
    assert_eq!(symbols, [Some(Symbol::Alarm), Some(Symbol::InControl)]);

    for limit in &series[1..] {
        let line = limit.line_style.as_ref().unwrap();
        assert_eq!(line.line_type, Some(LineType::Dashed), "{:?}", limit.name);
        assert_eq!(limit.symbol, Some(Symbol::None), "{:?}", limit.name);
        assert_eq!(limit.show_symbol, Some(false), "{:?}", limit.name);
    }
}

#[test]
fn styling_can_be_switched_off() {
    let chart = transform_props(&props(json!({"xcontrolShowCustom": false})));
    let observations = &chart.echart_options.series[0];
    assert_eq!(observations.symbol, Some(Symbol::EmptyCircle));
    assert!(observations.data.iter().all(|d| d.symbol.is_none()));
    let ucl = &chart.echart_options.series[1];
    assert_ne!(
        ucl.line_style.as_ref().and_then(|l| l.line_type),
        Some(LineType::Dashed),
    );
}

#[test]
fn annotations_come_before_data_series() {
    let chart = transform_props(&props(json!({
        "annotation_layers": [
            {"name": "target", "annotationType": "FORMULA", "value": "8", "show": true},
            {"name": "hidden", "annotationType": "FORMULA", "value": "2", "show": false},
        ],
    })));
    let names = names(&chart);
    assert_eq!(names[0], "target");
    assert_eq!(names[1], "defects");
    assert!(!names.contains(&"hidden"));
    assert_eq!(chart.echart_options.legend.data.last().map(String::as_str), Some("target"));
    let target = &chart.echart_options.series[0];
    assert!(target.data.iter().all(|d| d.y == Some(8.0)));
}

#[test]
fn stream_layout_stacks_on_a_baseline() {
    let chart = transform_props(&props(json!({
        "stack": "Stream",
        "annotation_layers": [
            {"name": "target", "annotationType": "FORMULA", "value": "8", "show": true},
        ],
    })));
    let series = &chart.echart_options.series;
    assert_eq!(series[0].name.as_deref(), Some("target"));
    let baseline = &series[1];
    assert_eq!(baseline.name.as_deref(), Some("baseline"));
    assert_eq!(baseline.stack.as_deref(), Some("obs\na"));
    assert_eq!(baseline.data.len(), 2);
    assert_eq!(series[2].stack.as_deref(), Some("obs\na"));
    assert!(!chart.echart_options.legend.data.contains(&String::from("baseline")));
}

#[test]
fn plain_stacking_has_no_baseline() {
    let chart = transform_props(&props(json!({"stack": "Stack"})));
    assert!(!names(&chart).contains(&"baseline"));
}

#[test]
fn row_contribution_with_stacking_spans_unit_interval() {
    let chart = transform_props(&props(json!({
        "contributionMode": "row",
        "stack": "Stack",
    })));
    let y_axis = &chart.echart_options.y_axis[0];
    assert_eq!(y_axis.min, Some(AxisBound::Value(0.0)));
    assert_eq!(y_axis.max, Some(AxisBound::Value(1.0)));

    let unstacked = transform_props(&props(json!({"contributionMode": "row"})));
    assert_eq!(unstacked.echart_options.y_axis[0].min, None);
}

#[test]
fn temporal_axis_uses_the_time_grain_interval() {
    let chart = transform_props(&props(json!({})));
    let x_axis = &chart.echart_options.x_axis;
    assert_eq!(x_axis.axis_type, AxisType::Time);
    assert_eq!(x_axis.min_interval, Some(86_400_000.0));
    assert_eq!(chart.x_axis.label, "ds");
    assert_eq!(chart.x_axis.axis_type, AxisType::Time);

    let categorical = transform_props(&props(json!({"xAxisForceCategorical": true})));
    assert_eq!(categorical.echart_options.x_axis.axis_type, AxisType::Category);
    assert_eq!(categorical.echart_options.x_axis.min_interval, Some(0.0));
}

#[test]
fn y_axis_options_follow_form_data() {
    let chart = transform_props(&props(json!({
        "logAxis": true,
        "y_axis_title": "Defects",
        "y_axis_title_position": "Left",
        "y_axis_bounds": [null, "20"],
        "truncateYAxis": true,
    })));
    let y_axis = &chart.echart_options.y_axis[0];
    assert_eq!(y_axis.axis_type, AxisType::Log);
    assert_eq!(y_axis.name, "Defects");
    assert_eq!(y_axis.name_location, NameLocation::Middle);
    assert_eq!(y_axis.max, Some(AxisBound::Value(20.0)));
    assert_eq!(y_axis.scale, Some(true));
}

#[test]
fn tooltip_and_zoom_settings() {
    let chart = transform_props(&props(json!({"zoomable": true, "rich_tooltip": false})));
    let options = &chart.echart_options;
    assert_eq!(options.tooltip.trigger, TooltipTrigger::Item);
    assert!(options.tooltip.show);
    assert!(options.toolbox.show);
    assert_eq!(options.data_zoom.len(), 1);

    let mut hidden = props(json!({}));
    hidden.in_context_menu = true;
    let chart = transform_props(&hidden);
    assert!(!chart.echart_options.tooltip.show);
    assert!(chart.echart_options.data_zoom.is_empty());
}

#[test]
fn tooltip_lists_hovered_series_with_total() {
    let chart = transform_props(&props(json!({})));
    let param = |id: &str, y: f64| TooltipParam {
        marker: String::new(),
        series_id: String::from(id),
        x: DataValue::Number(DAY_1),
        y: Some(y),
    };
    let html = chart
        .tooltip
        .format(&[param("defects", 12.0), param("UCL", 10.0)], Some("defects"));
    assert!(html.contains(&escape_html("defects")), "{html}");
    assert!(html.contains("UCL"), "{html}");
    assert!(html.contains("Total"), "{html}");
    assert!(html.contains("font-weight: 700;"), "{html}");
}

#[test]
fn empty_results_give_an_empty_chart() {
    let chart = transform_props(&ChartProps::default());
    assert!(chart.echart_options.series.is_empty());
    assert!(chart.echart_options.legend.data.is_empty());
    assert_eq!(chart.x_axis.label, "__timestamp");
    assert_eq!(chart.series_breakdown, 0);
}

#[test]
fn option_tree_serializes() {
    let chart = transform_props(&props(json!({})));
    let json = chart.echart_options.to_json();
    assert_eq!(json["useUTC"], json!(true));
    assert_eq!(json["series"].as_array().map(Vec::len), Some(8));
    assert_eq!(json["xAxis"]["type"], json!("time"));
}

#[test]
fn malformed_chart_props_are_rejected() {
    let err = ChartProps::from_json("{\"width\": ").unwrap_err();
    assert!(err.to_string().starts_with("invalid chart props"), "{err}");
}
