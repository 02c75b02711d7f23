// Copyright 2025 the Xcontrol Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Xcontrol demos: the query, option tree and tooltip of a few chart configurations.
//!
//! Set `RUST_LOG=debug` to see the plugin's own tracing.

use serde_json::{Value, json};
use tracing_subscriber::EnvFilter;
use xcontrol_charts::TooltipParam;
use xcontrol_plugin::{
    ChartProps, EchartsXcontrolFormData, build_query, control_panel, transform_props,
};
use xcontrol_transforms::DataValue;

const DAY: f64 = 86_400_000.0;
// 2024-03-04T00:00:00Z, a Monday.
const START: f64 = 1_709_510_400_000.0;

const DEFECTS: [f64; 7] = [4.0, 6.0, 5.0, 11.0, 5.0, 3.0, 0.5];

fn sample_rows() -> Vec<Value> {
    DEFECTS
        .iter()
        .enumerate()
        .map(|(day, defects)| {
            json!({
                "ds": START + day as f64 * DAY,
                "defects": defects,
                "UCL": 10.0,
                "UCLA": 8.5,
                "UCLB": 7.0,
                "LCL": 1.0,
                "LCLA": 2.5,
                "LCLB": 4.0,
                "CL": 5.5,
            })
        })
        .collect()
}

fn form_data(overrides: Value) -> Value {
    let mut form = json!({
        "datasource": "7__table",
        "viz_type": "xcontrol",
        "slice_id": 42,
        "x_axis": "ds",
        "time_grain_sqla": "P1D",
        "metrics": ["defects"],
        "annotation_layers": [{
            "name": "target",
            "annotationType": "FORMULA",
            "value": "5",
            "show": true,
            "style": "dotted",
        }],
    });
    if let (Value::Object(form), Value::Object(extra)) = (&mut form, overrides) {
        form.extend(extra);
    }
    form
}

struct Section {
    title: &'static str,
    body: Value,
}

fn chart_section(title: &'static str, overrides: Value) -> Section {
    let form = form_data(overrides);
    let parsed = EchartsXcontrolFormData::from_json(&form.to_string())
        .expect("sample form data parses");
    let query = build_query(&parsed);

    let payload = json!({
        "width": 800,
        "height": 400,
        "formData": form,
        "queriesData": [{
            "colnames": ["ds", "defects", "UCL", "UCLA", "UCLB", "LCL", "LCLA", "LCLB", "CL"],
            "coltypes": [2, 0, 0, 0, 0, 0, 0, 0, 0],
            "data": sample_rows(),
        }],
    });
    let props = ChartProps::from_json(&payload.to_string()).expect("sample chart props parse");
    let chart = transform_props(&props);

    let hovered: Vec<TooltipParam> = chart
        .echart_options
        .series
        .iter()
        .filter_map(|series| {
            let id = series.id.clone()?;
            let point = series.data.get(3)?;
            Some(TooltipParam {
                marker: String::new(),
                series_id: id,
                x: DataValue::Number(START + 3.0 * DAY),
                y: point.y,
            })
        })
        .collect();
    let tooltip = chart.tooltip.format(&hovered, Some("defects"));

    tracing::info!(
        title,
        series = chart.echart_options.series.len(),
        metrics = query.queries[0].metrics.len(),
        "built chart"
    );
    Section {
        title,
        body: json!({
            "query": query,
            "option": chart.echart_options.to_json(),
            "tooltip": tooltip,
        }),
    }
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let sections = [
        chart_section("control chart", json!({})),
        chart_section("stream", json!({"stack": "Stream", "area": true})),
        chart_section(
            "row contribution",
            json!({"stack": "Stack", "contributionMode": "row", "seriesType": "bar"}),
        ),
        chart_section(
            "plain styling",
            json!({"xcontrolShowCustom": false, "markerEnabled": true, "zoomable": true}),
        ),
        Section {
            title: "control panel",
            body: serde_json::to_value(control_panel()).expect("control panel serializes"),
        },
    ];

    let report: serde_json::Map<String, Value> = sections
        .into_iter()
        .map(|section| (String::from(section.title), section.body))
        .collect();
    let text = serde_json::to_string_pretty(&report).expect("report serializes");
    std::fs::write("xcontrol_demo.json", text).expect("write xcontrol_demo.json");
    println!("wrote xcontrol_demo.json");
}
