// Copyright 2025 the Xcontrol Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The Xcontrol chart plugin: statistical process control charts for a BI dashboard.
//!
//! An Xcontrol chart plots observations over time together with their control limits
//! (`UCL`, `LCL`, `CL` and the A/B zone limits), highlighting observations that fall outside
//! the control band. This crate wires the pieces a dashboard host needs:
//! - [`EchartsXcontrolFormData`]: the chart's stored settings.
//! - [`build_query`]: the chart-data query, including the control-limit metrics.
//! - [`transform_props`]: query results to a complete chart option tree.
//! - [`control_panel`]: the settings UI schema.
//!
//! ```
//! use xcontrol_plugin::{ChartProps, EchartsXcontrolFormData, build_query, transform_props};
//!
//! let form = EchartsXcontrolFormData::from_json(
//!     r#"{"datasource": "1__table", "x_axis": "ds", "metrics": ["value"]}"#,
//! )
//! .unwrap();
//! let context = build_query(&form);
//! assert_eq!(context.queries.len(), 1);
//!
//! let props = ChartProps {
//!     form_data: form,
//!     ..ChartProps::default()
//! };
//! let chart = transform_props(&props);
//! assert!(chart.echart_options.series.is_empty());
//! ```

#![no_std]

extern crate alloc;
#[cfg(feature = "std")]
extern crate std;

mod build_query;
mod control_panel;
mod controls;
mod form_data;
mod option;
mod transform_props;
#[cfg(test)]
mod transform_props_tests;

pub use build_query::build_query;
pub use control_panel::{
    ControlPanelConfig, StandardizedControls, control_panel, customize_rows,
    form_data_overrides, query_section,
};
pub use controls::{
    ControlConfig, ControlItem, ControlPanelSection, ControlSetRow, ControlType, ControlValues,
    Visibility, advanced_analytics_section, annotations_section, legend_rows, minor_ticks,
    rich_tooltip_rows, title_section, truncate_x_axis_control, x_axis_bounds,
    x_axis_label_rotation,
};
pub use form_data::{ContributionMode, EchartsXcontrolFormData, FormDataError};
pub use option::{
    AxisFormatter, AxisLabel, AxisOption, DataZoom, EchartsOption, Grid, NameLocation, Show,
    Toolbox, ToolboxDataZoom, ToolboxFeature, TooltipOption, TooltipTrigger, ZoomTitle,
};
pub use transform_props::{
    ChartProps, DatasourceMeta, FilterState, STACK_ID_SUFFIX, XAxisDescriptor,
    XcontrolChartProps, transform_props, transform_props_with_colors,
};
