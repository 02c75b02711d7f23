// Copyright 2025 the Xcontrol Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Metric and column references as they appear in form data and query objects.

extern crate alloc;

use alloc::format;
use alloc::string::String;

use serde::{Deserialize, Serialize};

/// How an adhoc metric or column is expressed.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ExpressionType {
    /// A column + aggregate pair.
    #[default]
    #[serde(rename = "SIMPLE")]
    Simple,
    /// A free-form SQL expression.
    #[serde(rename = "SQL")]
    Sql,
}

/// A reference to a physical column inside an adhoc metric.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ColumnRef {
    /// Physical column name.
    pub column_name: String,
}

/// A metric defined inline rather than saved on the dataset.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdhocMetric {
    /// Expression kind.
    pub expression_type: ExpressionType,
    /// Aggregated column, for [`ExpressionType::Simple`].
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub column: Option<ColumnRef>,
    /// Aggregate function, for [`ExpressionType::Simple`].
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub aggregate: Option<String>,
    /// SQL text, for [`ExpressionType::Sql`].
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sql_expression: Option<String>,
    /// Display label.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    /// Whether `label` was set by the user.
    #[serde(default)]
    pub has_custom_label: bool,
    /// Client-side identity of the metric.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub option_name: Option<String>,
}

/// A metric: either the name of a saved metric or an adhoc definition.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum QueryFormMetric {
    /// A saved metric, referenced by name.
    Saved(String),
    /// An inline metric definition.
    Adhoc(AdhocMetric),
}

impl QueryFormMetric {
    /// A SQL-expression metric with a custom label.
    pub fn sql(label: impl Into<String>, sql_expression: impl Into<String>) -> Self {
        Self::Adhoc(AdhocMetric {
            expression_type: ExpressionType::Sql,
            sql_expression: Some(sql_expression.into()),
            label: Some(label.into()),
            has_custom_label: true,
            ..AdhocMetric::default()
        })
    }

    /// A column + aggregate metric with a custom label.
    pub fn simple(
        label: impl Into<String>,
        column: impl Into<String>,
        aggregate: impl Into<String>,
    ) -> Self {
        Self::Adhoc(AdhocMetric {
            expression_type: ExpressionType::Simple,
            column: Some(ColumnRef {
                column_name: column.into(),
            }),
            aggregate: Some(aggregate.into()),
            label: Some(label.into()),
            has_custom_label: true,
            ..AdhocMetric::default()
        })
    }

    /// Returns the label under which this metric shows up in results.
    ///
    /// A non-empty label wins; otherwise simple metrics read `AGG(column)` and SQL metrics use
    /// their expression text.
    pub fn label(&self) -> String {
        match self {
            Self::Saved(name) => name.clone(),
            Self::Adhoc(metric) => {
                if let Some(label) = metric.label.as_ref().filter(|l| !l.is_empty()) {
                    return label.clone();
                }
                match metric.expression_type {
                    ExpressionType::Simple => {
                        let column = metric
                            .column
                            .as_ref()
                            .map(|c| c.column_name.as_str())
                            .unwrap_or_default();
                        let aggregate = metric.aggregate.as_deref().unwrap_or_default();
                        format!("{aggregate}({column})")
                    }
                    ExpressionType::Sql => metric.sql_expression.clone().unwrap_or_default(),
                }
            }
        }
    }
}

/// The role of an adhoc column within a query.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ColumnType {
    /// The column drives the x axis.
    BaseAxis,
    /// The column splits series.
    Series,
}

/// A column defined by a SQL expression.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdhocColumn {
    /// Display label.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    /// SQL text.
    pub sql_expression: String,
    /// Expression kind (always SQL for columns).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expression_type: Option<ExpressionType>,
    /// Column role.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub column_type: Option<ColumnType>,
    /// Time grain applied to a temporal base axis.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time_grain: Option<String>,
}

/// A column: either a physical column name or an adhoc SQL column.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum QueryFormColumn {
    /// A physical column.
    Physical(String),
    /// An adhoc column.
    Adhoc(AdhocColumn),
}

impl QueryFormColumn {
    /// Returns the label under which this column shows up in results.
    pub fn label(&self) -> String {
        match self {
            Self::Physical(name) => name.clone(),
            Self::Adhoc(column) => column
                .label
                .clone()
                .filter(|l| !l.is_empty())
                .unwrap_or_else(|| column.sql_expression.clone()),
        }
    }

    /// Returns `true` for a physical column reference.
    pub fn is_physical(&self) -> bool {
        matches!(self, Self::Physical(_))
    }
}

impl From<&str> for QueryFormColumn {
    fn from(value: &str) -> Self {
        Self::Physical(value.into())
    }
}
