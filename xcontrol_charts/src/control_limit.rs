// Copyright 2025 the Xcontrol Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Statistical process-control reference lines.
//!
//! A control chart carries seven reference series next to the observed metrics: the center
//! line (`CL`), the upper/lower control limits at three standard deviations (`UCL`, `LCL`) and
//! the warning zones at two and one standard deviations (`UCLA`, `UCLB`, `LCLA`, `LCLB`).
//! They are queried as fixed metrics over the `CL` and `STDDEV` dataset columns and drawn as
//! thin dashed lines.

use peniko::Color;
use peniko::color::palette::css;
use xcontrol_transforms::QueryFormMetric;

use crate::series_option::{LineStyle, LineType};

/// One of the reserved control-limit series.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ControlLimitRole {
    /// Center line.
    CenterLine,
    /// Upper control limit (+3 sigma).
    Ucl,
    /// Lower control limit (-3 sigma, floored at zero).
    Lcl,
    /// Upper warning limit A (+2 sigma).
    UclA,
    /// Upper warning limit B (+1 sigma).
    UclB,
    /// Lower warning limit A (-2 sigma).
    LclA,
    /// Lower warning limit B (-1 sigma).
    LclB,
}

/// Visual group of a control-limit role.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ControlLimitGroup {
    /// The center line.
    Center,
    /// `UCL` / `LCL`.
    Primary,
    /// The A/B warning limits.
    Secondary,
}

/// Fixed styling of a control-limit line.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ControlLimitStyle {
    /// Line color.
    pub color: Color,
    /// Dash pattern.
    pub line_type: LineType,
    /// Stroke width in pixels.
    pub width: f64,
    /// Whether value labels may be shown.
    pub show_label: bool,
}

impl ControlLimitStyle {
    /// Returns the line style for this record.
    pub fn line_style(&self) -> LineStyle {
        LineStyle::default()
            .with_color(self.color)
            .with_type(self.line_type)
            .with_width(self.width)
    }
}

impl ControlLimitRole {
    /// All roles, in the order their metrics are queried.
    pub const ALL: [Self; 7] = [
        Self::Ucl,
        Self::UclA,
        Self::UclB,
        Self::Lcl,
        Self::LclA,
        Self::LclB,
        Self::CenterLine,
    ];

    /// Returns the role for a series id, if it is reserved.
    pub fn from_series_id(id: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|role| role.id() == id)
    }

    /// Returns the series id (and metric label) of this role.
    pub const fn id(self) -> &'static str {
        match self {
            Self::CenterLine => "CL",
            Self::Ucl => "UCL",
            Self::Lcl => "LCL",
            Self::UclA => "UCLA",
            Self::UclB => "UCLB",
            Self::LclA => "LCLA",
            Self::LclB => "LCLB",
        }
    }

    /// Returns the visual group.
    pub const fn group(self) -> ControlLimitGroup {
        match self {
            Self::CenterLine => ControlLimitGroup::Center,
            Self::Ucl | Self::Lcl => ControlLimitGroup::Primary,
            Self::UclA | Self::UclB | Self::LclA | Self::LclB => ControlLimitGroup::Secondary,
        }
    }

    /// Returns the fixed style of this role.
    pub fn style(self) -> ControlLimitStyle {
        let color = match self.group() {
            ControlLimitGroup::Center => css::BLUE,
            ControlLimitGroup::Primary => css::RED,
            ControlLimitGroup::Secondary => css::BLACK,
        };
        ControlLimitStyle {
            color,
            line_type: LineType::Dashed,
            width: 1.0,
            show_label: false,
        }
    }

    /// Returns the query metric producing this role's column.
    pub fn metric(self) -> QueryFormMetric {
        let sql = match self {
            Self::CenterLine => return QueryFormMetric::simple("CL", "CL", "MIN"),
            Self::Ucl => r#"MIN("CL"+"STDDEV"*3)"#,
            Self::UclA => r#"MIN("CL"+"STDDEV"*2)"#,
            Self::UclB => r#"MIN("CL"+"STDDEV")"#,
            Self::Lcl => {
                r#"MIN(case when ("CL"-"STDDEV"*3)>0 then ("CL"-"STDDEV"*3) else (0) end)"#
            }
            Self::LclA => {
                r#"MIN(case when ("CL"-"STDDEV"*3)>0 then ("CL"-"STDDEV"*2) else ("CL"/3) end)"#
            }
            Self::LclB => {
                r#"MIN(case when ("CL"-"STDDEV"*3)>0 then ("CL"-"STDDEV") else ("CL"*2/3) end)"#
            }
        };
        QueryFormMetric::sql(self.id(), sql)
    }
}

/// Returns the metrics for all control-limit roles, in query order.
pub fn control_limit_metrics() -> impl Iterator<Item = QueryFormMetric> {
    ControlLimitRole::ALL.into_iter().map(ControlLimitRole::metric)
}

#[cfg(test)]
mod tests {
    extern crate std;

    use alloc::vec::Vec;

    use super::*;

    #[test]
    fn ids_round_trip_and_others_are_not_reserved() {
        for role in ControlLimitRole::ALL {
            assert_eq!(ControlLimitRole::from_series_id(role.id()), Some(role));
        }
        assert_eq!(ControlLimitRole::from_series_id("cl"), None);
        assert_eq!(ControlLimitRole::from_series_id("sales"), None);
    }

    #[test]
    fn styles_follow_groups() {
        assert_eq!(ControlLimitRole::CenterLine.style().color, css::BLUE);
        assert_eq!(ControlLimitRole::Lcl.style().color, css::RED);
        assert_eq!(ControlLimitRole::UclB.style().color, css::BLACK);
        for role in ControlLimitRole::ALL {
            let style = role.style();
            assert_eq!(style.line_type, LineType::Dashed);
            assert_eq!(style.width, 1.0);
            assert!(!style.show_label);
        }
    }

    #[test]
    fn metrics_are_labelled_by_role() {
        let labels: Vec<_> = control_limit_metrics().map(|m| m.label()).collect();
        assert_eq!(labels, ["UCL", "UCLA", "UCLB", "LCL", "LCLA", "LCLB", "CL"]);
        let json = serde_json::to_value(ControlLimitRole::Ucl.metric()).unwrap();
        assert_eq!(json["expressionType"], "SQL");
        assert_eq!(json["sqlExpression"], "MIN(\"CL\"+\"STDDEV\"*3)");
        let json = serde_json::to_value(ControlLimitRole::CenterLine.metric()).unwrap();
        assert_eq!(json["column"]["column_name"], "CL");
        assert_eq!(json["aggregate"], "MIN");
    }
}
