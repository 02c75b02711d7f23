// Copyright 2025 the Xcontrol Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Chart form data: the query part plus the display controls of an Xcontrol chart.

extern crate alloc;

use alloc::string::{String, ToString};
use alloc::vec::Vec;

use serde::{Deserialize, Deserializer, Serialize};
use thiserror::Error;
use xcontrol_charts::{
    AnnotationLayer, Currency, LegendOrientation, LegendType, SMART_DATE, SMART_NUMBER,
    SeriesType, StackMode, TitlePosition, deserialize_axis_bounds,
};
use xcontrol_transforms::QueryFormData;

/// Errors raised while reading chart inputs.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum FormDataError {
    /// The JSON payload does not describe the expected shape.
    #[error("invalid {what}: {message}")]
    Json {
        /// Which payload failed (`form data`, `chart props`).
        what: &'static str,
        /// Parser message, with line and column.
        message: String,
    },
}

impl FormDataError {
    pub(crate) fn json(what: &'static str, err: &serde_json::Error) -> Self {
        Self::Json {
            what,
            message: err.to_string(),
        }
    }
}

/// How series values are normalized before plotting.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContributionMode {
    /// Each value divided by its row total.
    Row,
    /// Each value divided by its column total.
    Column,
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

#[derive(Deserialize)]
#[serde(untagged)]
enum NumberRepr {
    Number(f64),
    Text(String),
    Null(()),
}

impl NumberRepr {
    fn value(self) -> Option<f64> {
        match self {
            Self::Number(v) => Some(v).filter(|v| v.is_finite()),
            Self::Text(text) => text.trim().parse::<f64>().ok().filter(|v| v.is_finite()),
            Self::Null(()) => None,
        }
    }
}

/// Margins are stored as numbers or as the text of a number; anything else reads as 0.
fn lenient_margin<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f64, D::Error> {
    Ok(Option::<NumberRepr>::deserialize(deserializer)?
        .and_then(NumberRepr::value)
        .unwrap_or(0.0))
}

fn lenient_optional<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<f64>, D::Error> {
    Ok(Option::<NumberRepr>::deserialize(deserializer)?.and_then(NumberRepr::value))
}

/// Form data of an Xcontrol chart.
///
/// Keys are the control names of the chart's control panel, which mix snake and camel case;
/// the other spelling is accepted as an alias. Missing keys take the chart defaults.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EchartsXcontrolFormData {
    /// The query-relevant part.
    #[serde(flatten)]
    pub query: QueryFormData,
    /// Annotation layers drawn over the chart.
    #[serde(
        rename = "annotation_layers",
        alias = "annotationLayers",
        deserialize_with = "null_as_default"
    )]
    pub annotation_layers: Vec<AnnotationLayer>,
    /// Categorical color scheme name.
    #[serde(
        rename = "color_scheme",
        alias = "colorScheme",
        skip_serializing_if = "Option::is_none"
    )]
    pub color_scheme: Option<String>,
    /// Contribution normalization.
    #[serde(
        rename = "contributionMode",
        alias = "contribution_mode",
        skip_serializing_if = "Option::is_none"
    )]
    pub contribution_mode: Option<ContributionMode>,
    /// Fill the area under lines.
    pub area: bool,
    /// Draw markers on line points.
    #[serde(rename = "markerEnabled", alias = "marker_enabled")]
    pub marker_enabled: bool,
    /// Marker size.
    #[serde(rename = "markerSize", alias = "marker_size")]
    pub marker_size: f64,
    /// Area fill opacity.
    pub opacity: f64,
    /// Series shape.
    #[serde(rename = "seriesType", alias = "series_type")]
    pub series_type: SeriesType,
    /// Show value labels.
    #[serde(rename = "show_value", alias = "showValue")]
    pub show_value: bool,
    /// With stacking, label only the stack totals.
    #[serde(rename = "only_total", alias = "onlyTotal")]
    pub only_total: bool,
    /// Hide stacked labels below this percentage of the stack total.
    #[serde(
        rename = "percentage_threshold",
        alias = "percentageThreshold",
        deserialize_with = "lenient_margin"
    )]
    pub percentage_threshold: f64,
    /// Stacking mode.
    pub stack: StackMode,
    /// Y axis the series attach to.
    #[serde(rename = "yAxisIndex", alias = "y_axis_index")]
    pub y_axis_index: usize,
    /// Apply the fixed control-limit styling and alarm markers.
    #[serde(rename = "xcontrolShowCustom", alias = "xcontrol_show_custom")]
    pub xcontrol_show_custom: bool,
    /// Show the legend.
    #[serde(rename = "show_legend", alias = "showLegend")]
    pub show_legend: bool,
    /// Legend kind.
    #[serde(rename = "legendType", alias = "legend_type")]
    pub legend_type: LegendType,
    /// Legend placement.
    #[serde(rename = "legendOrientation", alias = "legend_orientation")]
    pub legend_orientation: LegendOrientation,
    /// Space reserved for the legend; unset uses the placement's default.
    #[serde(
        rename = "legendMargin",
        alias = "legend_margin",
        deserialize_with = "lenient_optional",
        skip_serializing_if = "Option::is_none"
    )]
    pub legend_margin: Option<f64>,
    /// Logarithmic y axis.
    #[serde(rename = "logAxis", alias = "log_axis")]
    pub log_axis: bool,
    /// Split lines for minor y ticks.
    #[serde(rename = "minorSplitLine", alias = "minor_split_line")]
    pub minor_split_line: bool,
    /// Minor ticks on both axes.
    #[serde(rename = "minorTicks", alias = "minor_ticks")]
    pub minor_ticks: bool,
    /// Fit a numeric x axis to the data.
    #[serde(rename = "truncateXAxis", alias = "truncate_x_axis")]
    pub truncate_x_axis: bool,
    /// Fit the y axis to the data instead of starting at zero.
    #[serde(rename = "truncateYAxis", alias = "truncate_y_axis")]
    pub truncate_y_axis: bool,
    /// X axis `[min, max]`.
    #[serde(
        rename = "x_axis_bounds",
        alias = "xAxisBounds",
        deserialize_with = "deserialize_axis_bounds"
    )]
    pub x_axis_bounds: [Option<f64>; 2],
    /// Y axis `[min, max]`.
    #[serde(
        rename = "y_axis_bounds",
        alias = "yAxisBounds",
        deserialize_with = "deserialize_axis_bounds"
    )]
    pub y_axis_bounds: [Option<f64>; 2],
    /// d3 number format of y values.
    #[serde(rename = "y_axis_format", alias = "yAxisFormat")]
    pub y_axis_format: String,
    /// Currency of y values.
    #[serde(
        rename = "currency_format",
        alias = "currencyFormat",
        skip_serializing_if = "Option::is_none"
    )]
    pub currency_format: Option<Currency>,
    /// Time format of x axis labels.
    #[serde(
        rename = "x_axis_time_format",
        alias = "xAxisTimeFormat",
        skip_serializing_if = "Option::is_none"
    )]
    pub x_axis_time_format: Option<String>,
    /// Time format of the tooltip title.
    #[serde(
        rename = "tooltipTimeFormat",
        alias = "tooltip_time_format",
        skip_serializing_if = "Option::is_none"
    )]
    pub tooltip_time_format: Option<String>,
    /// Data zoom controls.
    pub zoomable: bool,
    /// Axis-triggered tooltip listing every series.
    #[serde(rename = "rich_tooltip", alias = "richTooltip")]
    pub rich_tooltip: bool,
    /// Sort tooltip rows by value.
    #[serde(rename = "tooltipSortByMetric", alias = "tooltip_sort_by_metric")]
    pub tooltip_sort_by_metric: bool,
    /// X label rotation in degrees.
    #[serde(rename = "xAxisLabelRotation", alias = "x_axis_label_rotation")]
    pub x_axis_label_rotation: f64,
    /// Treat the x axis as categories whatever its type.
    #[serde(rename = "xAxisForceCategorical", alias = "x_axis_force_categorical")]
    pub x_axis_force_categorical: bool,
    /// X axis title.
    #[serde(rename = "x_axis_title", alias = "xAxisTitle", deserialize_with = "null_as_default")]
    pub x_axis_title: String,
    /// Gap between the x axis and its title.
    #[serde(
        rename = "x_axis_title_margin",
        alias = "xAxisTitleMargin",
        deserialize_with = "lenient_margin"
    )]
    pub x_axis_title_margin: f64,
    /// Y axis title.
    #[serde(rename = "y_axis_title", alias = "yAxisTitle", deserialize_with = "null_as_default")]
    pub y_axis_title: String,
    /// Gap between the y axis and its title.
    #[serde(
        rename = "y_axis_title_margin",
        alias = "yAxisTitleMargin",
        deserialize_with = "lenient_margin"
    )]
    pub y_axis_title_margin: f64,
    /// Y axis title placement.
    #[serde(rename = "y_axis_title_position", alias = "yAxisTitlePosition")]
    pub y_axis_title_position: TitlePosition,
}

impl Default for EchartsXcontrolFormData {
    fn default() -> Self {
        Self {
            query: QueryFormData::default(),
            annotation_layers: Vec::new(),
            color_scheme: None,
            contribution_mode: None,
            area: false,
            marker_enabled: false,
            marker_size: 6.0,
            opacity: 0.2,
            series_type: SeriesType::Line,
            show_value: false,
            only_total: false,
            percentage_threshold: 0.0,
            stack: StackMode::Off,
            y_axis_index: 0,
            xcontrol_show_custom: true,
            show_legend: true,
            legend_type: LegendType::Scroll,
            legend_orientation: LegendOrientation::Top,
            legend_margin: None,
            log_axis: false,
            minor_split_line: false,
            minor_ticks: false,
            truncate_x_axis: true,
            truncate_y_axis: false,
            x_axis_bounds: [None, None],
            y_axis_bounds: [None, None],
            y_axis_format: String::from(SMART_NUMBER),
            currency_format: None,
            x_axis_time_format: Some(String::from(SMART_DATE)),
            tooltip_time_format: Some(String::from(SMART_DATE)),
            zoomable: false,
            rich_tooltip: true,
            tooltip_sort_by_metric: false,
            x_axis_label_rotation: 0.0,
            x_axis_force_categorical: false,
            x_axis_title: String::new(),
            x_axis_title_margin: 0.0,
            y_axis_title: String::new(),
            y_axis_title_margin: 0.0,
            y_axis_title_position: TitlePosition::Top,
        }
    }
}

impl EchartsXcontrolFormData {
    /// Parses form data from JSON.
    pub fn from_json(json: &str) -> Result<Self, FormDataError> {
        serde_json::from_str(json).map_err(|err| FormDataError::json("form data", &err))
    }

    /// Returns `true` when values are normalized to contributions.
    pub fn is_contribution(&self) -> bool {
        self.contribution_mode.is_some()
    }

    /// Returns the chart currency, if one with a symbol is set.
    pub fn currency(&self) -> Option<&Currency> {
        self.currency_format
            .as_ref()
            .filter(|currency| !currency.symbol.is_empty())
    }
}

#[cfg(test)]
mod tests {
    extern crate std;

    use xcontrol_transforms::QueryFormColumn;

    use super::*;

    #[test]
    fn empty_form_data_takes_chart_defaults() {
        let fd = EchartsXcontrolFormData::from_json("{}").unwrap();
        assert_eq!(fd, EchartsXcontrolFormData::default());
        assert!(fd.xcontrol_show_custom);
        assert!(fd.rich_tooltip);
        assert_eq!(fd.marker_size, 6.0);
        assert_eq!(fd.opacity, 0.2);
        assert_eq!(fd.query.row_limit, 10_000);
        assert_eq!(fd.y_axis_format, SMART_NUMBER);
    }

    #[test]
    fn mixed_key_spellings_are_accepted() {
        let fd = EchartsXcontrolFormData::from_json(
            r#"{
                "datasource": "7__table",
                "x_axis": "ds",
                "metrics": ["count"],
                "seriesType": "bar",
                "markerEnabled": true,
                "showLegend": false,
                "legendOrientation": "right",
                "xcontrolShowCustom": false,
                "stack": "Stream",
                "contributionMode": "row",
                "yAxisIndex": 1
            }"#,
        )
        .unwrap();
        assert_eq!(fd.query.datasource, "7__table");
        assert_eq!(fd.query.x_axis, Some(QueryFormColumn::from("ds")));
        assert_eq!(fd.series_type, SeriesType::Bar);
        assert!(fd.marker_enabled);
        assert!(!fd.show_legend);
        assert_eq!(fd.legend_orientation, LegendOrientation::Right);
        assert!(!fd.xcontrol_show_custom);
        assert_eq!(fd.stack, StackMode::Stream);
        assert_eq!(fd.contribution_mode, Some(ContributionMode::Row));
        assert!(fd.is_contribution());
        assert_eq!(fd.y_axis_index, 1);
    }

    #[test]
    fn bounds_and_margins_are_lenient() {
        let fd = EchartsXcontrolFormData::from_json(
            r#"{
                "y_axis_bounds": ["", "12.5"],
                "xAxisBounds": [null, 3],
                "x_axis_title_margin": "30",
                "y_axis_title_margin": "wide",
                "legendMargin": null,
                "x_axis_title": null
            }"#,
        )
        .unwrap();
        assert_eq!(fd.y_axis_bounds, [None, Some(12.5)]);
        assert_eq!(fd.x_axis_bounds, [None, Some(3.0)]);
        assert_eq!(fd.x_axis_title_margin, 30.0);
        assert_eq!(fd.y_axis_title_margin, 0.0);
        assert_eq!(fd.legend_margin, None);
        assert_eq!(fd.x_axis_title, "");
    }

    #[test]
    fn boolean_stack_from_older_charts() {
        let fd = EchartsXcontrolFormData::from_json(r#"{"stack": true}"#).unwrap();
        assert_eq!(fd.stack, StackMode::Stack);
        let fd = EchartsXcontrolFormData::from_json(r#"{"stack": null}"#).unwrap();
        assert_eq!(fd.stack, StackMode::Off);
    }

    #[test]
    fn currency_needs_a_symbol() {
        let fd = EchartsXcontrolFormData::from_json(
            r#"{"currency_format": {"symbol": "", "symbolPosition": "prefix"}}"#,
        )
        .unwrap();
        assert!(fd.currency().is_none());
        let fd = EchartsXcontrolFormData::from_json(
            r#"{"currency_format": {"symbol": "EUR", "symbolPosition": "suffix"}}"#,
        )
        .unwrap();
        assert_eq!(fd.currency().map(|c| c.symbol.as_str()), Some("EUR"));
    }

    #[test]
    fn malformed_json_reports_the_payload() {
        let err = EchartsXcontrolFormData::from_json(r#"{"markerSize": "big"}"#).unwrap_err();
        let FormDataError::Json { what, .. } = err;
        assert_eq!(what, "form data");
    }
}
