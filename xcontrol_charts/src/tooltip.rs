// Copyright 2025 the Xcontrol Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Tooltip content.
//!
//! Hovered points are grouped by base series name so a forecast shows as one row:
//! `observation, ŷ = trend (lower, upper)`. With a rich (axis-triggered) tooltip and no
//! forecast, each row also gets its share of the total and a `Total` row closes the table.

extern crate alloc;

use alloc::collections::BTreeMap;
use alloc::format;
use alloc::string::String;
use alloc::vec;
use alloc::vec::Vec;

use xcontrol_transforms::{DataValue, ForecastRole, QueryFormMetric, extract_forecast_series_context};

use crate::format::{
    PERCENT_2_POINT, SharedFormatter, get_percent_formatter, get_series_formatter,
};
use crate::time::XValueFormatter;

const TRUNCATION_STYLE: &str = "overflow: hidden; text-overflow: ellipsis; white-space: nowrap;";

/// One hovered point, as reported by the chart library.
#[derive(Clone, Debug, PartialEq)]
pub struct TooltipParam {
    /// Colored dot markup for the series.
    pub marker: String,
    /// Id of the hovered series.
    pub series_id: String,
    /// X value.
    pub x: DataValue,
    /// Y value.
    pub y: Option<f64>,
}

/// The values of one base series at the hovered x.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ForecastValue {
    /// Marker markup of the first hovered member.
    pub marker: String,
    /// Observed value.
    pub observation: Option<f64>,
    /// Forecast trend.
    pub forecast_trend: Option<f64>,
    /// Lower confidence bound.
    pub forecast_lower: Option<f64>,
    /// Upper bound, stored as the band height above the lower bound.
    pub forecast_upper: Option<f64>,
}

impl ForecastValue {
    // Zero forecast values count as absent, as in the chart library's tooltips.
    fn has_forecast(&self) -> bool {
        let set = |v: Option<f64>| v.is_some_and(|v| v != 0.0 && !v.is_nan());
        set(self.forecast_trend) || set(self.forecast_lower) || set(self.forecast_upper)
    }
}

/// Groups hovered points by base series name, in first-seen order.
///
/// Points without a numeric value are skipped.
pub fn extract_forecast_values_from_tooltip_params(
    params: &[TooltipParam],
) -> Vec<(String, ForecastValue)> {
    let mut out: Vec<(String, ForecastValue)> = Vec::new();
    for param in params {
        let Some(y) = param.y.filter(|y| !y.is_nan()) else {
            continue;
        };
        let context = extract_forecast_series_context(&param.series_id);
        let index = match out.iter().position(|(name, _)| name == context.name) {
            Some(index) => index,
            None => {
                out.push((
                    String::from(context.name),
                    ForecastValue {
                        marker: param.marker.clone(),
                        ..ForecastValue::default()
                    },
                ));
                out.len() - 1
            }
        };
        let value = &mut out[index].1;
        let slot = match context.role {
            ForecastRole::Observation => &mut value.observation,
            ForecastRole::Trend => &mut value.forecast_trend,
            ForecastRole::Lower => &mut value.forecast_lower,
            ForecastRole::Upper => &mut value.forecast_upper,
        };
        *slot = Some(y);
    }
    out
}

/// Escapes text for inclusion in tooltip markup.
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// Formats one tooltip row: `[marker + name, "obs, ŷ = trend (lower, upper)"]`.
pub fn format_forecast_tooltip_series(
    series_name: &str,
    value: &ForecastValue,
    formatter: &SharedFormatter,
) -> Vec<String> {
    let name = format!("{}{}", value.marker, escape_html(series_name));
    let mut text = value
        .observation
        .map(|v| formatter.format(v))
        .unwrap_or_default();
    if value.has_forecast() {
        if !text.is_empty() {
            text.push_str(", ");
        }
        if let Some(trend) = value.forecast_trend.filter(|t| *t != 0.0) {
            text.push_str(&format!("ŷ = {}", formatter.format(trend)));
        }
        if let (Some(lower), Some(upper)) = (value.forecast_lower, value.forecast_upper)
            && lower != 0.0
            && upper != 0.0
        {
            text.push_str(&format!(
                " ({}, {})",
                formatter.format(lower),
                formatter.format(lower + upper)
            ));
        }
    }
    vec![name, text]
}

/// Renders tooltip rows as an HTML table under an optional bold title.
///
/// The row at `focused_row` is bold; the others are slightly faded.
pub fn tooltip_html(rows: &[Vec<String>], title: Option<&str>, focused_row: Option<usize>) -> String {
    let mut html = String::from("<div>");
    if let Some(title) = title.filter(|t| !t.is_empty()) {
        html.push_str(&format!(
            r#"<span style="font-weight: 700;{TRUNCATION_STYLE}">{}</span>"#,
            escape_html(title)
        ));
    }
    html.push_str("<table>");
    if rows.is_empty() {
        html.push_str("<tr><td>No data</td></tr>");
    }
    for (i, row) in rows.iter().enumerate() {
        let row_style = if Some(i) == focused_row {
            "font-weight: 700;"
        } else {
            "opacity: 0.8;"
        };
        html.push_str(&format!(r#"<tr style="{row_style}">"#));
        for cell in row {
            html.push_str(&format!(
                r#"<td style="text-align: left; padding-left: 0px; max-width: 200px; {TRUNCATION_STYLE}">{cell}</td>"#
            ));
        }
        html.push_str("</tr>");
    }
    html.push_str("</table></div>");
    html
}

/// Builds tooltip markup for hovered points.
///
/// Holds everything the tooltip needs from chart assembly; the focused series is passed per
/// call.
#[derive(Clone, Debug)]
pub struct TooltipFormatter {
    /// Axis-triggered tooltip listing every series at the hovered x.
    pub rich: bool,
    /// Sort rows by value, largest first.
    pub sort_by_metric: bool,
    /// The chart has no dimensions, so series names are metric names.
    pub groupby_empty: bool,
    /// Verbose name -> metric name.
    pub inverted_verbose_map: BTreeMap<String, String>,
    /// Series name -> label parts (metric first).
    pub label_map: BTreeMap<String, Vec<String>>,
    /// Per-metric formatters.
    pub custom_formatters: BTreeMap<String, SharedFormatter>,
    /// Fallback value formatter.
    pub formatter: SharedFormatter,
    /// Chart metrics.
    pub metrics: Vec<QueryFormMetric>,
    /// Contribution mode: values are shares.
    pub force_percent: bool,
    /// Formats the hovered x into the title.
    pub x_formatter: XValueFormatter,
}

impl TooltipFormatter {
    /// Renders the tooltip for `params`, bolding the row of the `focused` series.
    pub fn format(&self, params: &[TooltipParam], focused: Option<&str>) -> String {
        let title = params.first().map(|p| self.x_formatter.format(&p.x));
        let mut params: Vec<&TooltipParam> = params.iter().collect();
        if self.rich && self.sort_by_metric {
            let key = |p: &TooltipParam| p.y.unwrap_or(f64::NEG_INFINITY);
            params.sort_by(|a, b| key(b).total_cmp(&key(a)));
        }
        let owned: Vec<TooltipParam> = params.into_iter().cloned().collect();
        let values = extract_forecast_values_from_tooltip_params(&owned);

        let is_forecast = values.iter().any(|(_, v)| v.has_forecast());
        let total: f64 = values.iter().filter_map(|(_, v)| v.observation).sum();
        let show_total = self.rich && !is_forecast;
        let percent = get_percent_formatter(Some(PERCENT_2_POINT));

        let mut rows = Vec::with_capacity(values.len() + 1);
        for (key, value) in &values {
            let formatter_key = if self.groupby_empty {
                self.inverted_verbose_map.get(key).map(String::as_str)
            } else {
                self.label_map
                    .get(key)
                    .and_then(|parts| parts.first())
                    .map(String::as_str)
            };
            let formatter = get_series_formatter(
                &self.custom_formatters,
                &self.formatter,
                &self.metrics,
                formatter_key,
                self.force_percent,
            );
            let mut row = format_forecast_tooltip_series(key, value, &formatter);
            if show_total && let Some(observation) = value.observation {
                let denominator = if total == 0.0 { 1.0 } else { total };
                row.push(percent.format(observation / denominator));
            }
            rows.push(row);
        }
        if show_total {
            rows.push(vec![
                String::from("Total"),
                self.formatter.format(total),
                percent.format(1.0),
            ]);
        }
        let focused_row = focused.and_then(|f| values.iter().position(|(key, _)| key == f));
        tooltip_html(&rows, title.as_deref(), focused_row)
    }
}

#[cfg(test)]
mod tests {
    extern crate std;

    use alloc::sync::Arc;

    use super::*;
    use crate::format::{NumberFormatter, get_number_formatter};

    fn param(id: &str, y: Option<f64>) -> TooltipParam {
        TooltipParam {
            marker: String::from("*"),
            series_id: String::from(id),
            x: DataValue::Number(0.0),
            y,
        }
    }

    fn formatter() -> TooltipFormatter {
        TooltipFormatter {
            rich: true,
            sort_by_metric: false,
            groupby_empty: true,
            inverted_verbose_map: BTreeMap::new(),
            label_map: BTreeMap::new(),
            custom_formatters: BTreeMap::new(),
            formatter: get_number_formatter(Some(".1f")),
            metrics: Vec::new(),
            force_percent: false,
            x_formatter: XValueFormatter::Plain,
        }
    }

    #[test]
    fn groups_forecast_members() {
        let values = extract_forecast_values_from_tooltip_params(&[
            param("sales", Some(10.0)),
            param("sales__yhat", Some(12.0)),
            param("sales__yhat_lower", Some(8.0)),
            param("sales__yhat_upper", Some(6.0)),
            param("cost", None),
        ]);
        assert_eq!(values.len(), 1);
        let (name, v) = &values[0];
        assert_eq!(name, "sales");
        assert_eq!(v.observation, Some(10.0));
        assert_eq!(v.forecast_upper, Some(6.0));

        let f: SharedFormatter = Arc::new(NumberFormatter::parse(".0f").unwrap());
        let row = format_forecast_tooltip_series("sales", v, &f);
        assert_eq!(row, ["*sales", "10, ŷ = 12 (8, 14)"]);
    }

    #[test]
    fn zero_trend_reads_as_absent() {
        let f = get_number_formatter(Some(".0f"));
        let v = ForecastValue {
            observation: Some(3.0),
            forecast_trend: Some(0.0),
            ..ForecastValue::default()
        };
        assert_eq!(format_forecast_tooltip_series("a", &v, &f)[1], "3");
        let v = ForecastValue {
            forecast_trend: Some(4.0),
            ..ForecastValue::default()
        };
        assert_eq!(format_forecast_tooltip_series("a", &v, &f)[1], "ŷ = 4");
    }

    #[test]
    fn rich_tooltip_adds_shares_and_total() {
        let html = formatter().format(&[param("a", Some(1.0)), param("b", Some(3.0))], Some("b"));
        assert!(html.contains(">25.00%<"), "{html}");
        assert!(html.contains(">Total<"), "{html}");
        assert!(html.contains(">4.0<"), "{html}");
        assert!(html.contains(r#"<tr style="font-weight: 700;"><td style="text-align: left; padding-left: 0px; max-width: 200px; overflow: hidden; text-overflow: ellipsis; white-space: nowrap;">*b"#), "{html}");
    }

    #[test]
    fn forecast_hides_total() {
        let html = formatter().format(
            &[param("a", Some(1.0)), param("a__yhat", Some(2.0))],
            None,
        );
        assert!(!html.contains("Total"), "{html}");
        assert!(html.contains("1.0, ŷ = 2.0"), "{html}");
    }

    #[test]
    fn sorted_rows_and_escaping() {
        let tooltip = TooltipFormatter {
            sort_by_metric: true,
            ..formatter()
        };
        let html = tooltip.format(&[param("<a>", Some(1.0)), param("b", Some(3.0))], None);
        let b = html.find("*b").unwrap();
        let a = html.find("*&lt;a&gt;").unwrap();
        assert!(b < a, "{html}");
    }

    #[test]
    fn empty_tooltip() {
        let html = tooltip_html(&[], Some("x"), None);
        assert!(html.contains("No data"), "{html}");
        assert!(html.contains(">x</span>"), "{html}");
    }
}
