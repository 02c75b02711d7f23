// Copyright 2025 the Xcontrol Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Query result payloads and an ordered row frame over them.

extern crate alloc;

use alloc::collections::BTreeMap;
use alloc::string::String;
use alloc::vec::Vec;

use serde::{Deserialize, Serialize};

use crate::value::DataValue;

/// One result row, keyed by column label.
pub type DataRecord = BTreeMap<String, DataValue>;

/// Generic column data type reported alongside query results.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum GenericDataType {
    /// Numeric column.
    Numeric,
    /// String column.
    #[default]
    String,
    /// Temporal column (epoch milliseconds in results).
    Temporal,
    /// Boolean column.
    Boolean,
}

impl TryFrom<u8> for GenericDataType {
    type Error = &'static str;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Self::Numeric),
            1 => Ok(Self::String),
            2 => Ok(Self::Temporal),
            3 => Ok(Self::Boolean),
            _ => Err("unknown generic data type"),
        }
    }
}

impl From<GenericDataType> for u8 {
    fn from(value: GenericDataType) -> Self {
        match value {
            GenericDataType::Numeric => 0,
            GenericDataType::String => 1,
            GenericDataType::Temporal => 2,
            GenericDataType::Boolean => 3,
        }
    }
}

/// A single point of a timeseries annotation.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TimeseriesAnnotationPoint {
    /// X value.
    pub x: DataValue,
    /// Y value.
    pub y: Option<f64>,
}

/// One named line of a timeseries annotation layer.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TimeseriesAnnotationSeries {
    /// Series key, also used as legend label.
    pub key: String,
    /// Points in x order.
    pub values: Vec<TimeseriesAnnotationPoint>,
}

/// Tabular annotation records (used by event and interval layers).
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct RecordAnnotations {
    /// Column names of the records.
    #[serde(default)]
    pub columns: Vec<String>,
    /// Annotation rows.
    #[serde(default)]
    pub records: Vec<DataRecord>,
}

/// Annotation data for a single annotation layer.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AnnotationResult {
    /// Lines from a timeseries annotation source.
    Timeseries(Vec<TimeseriesAnnotationSeries>),
    /// Rows from a native or table annotation source.
    Records(RecordAnnotations),
}

/// A chart-data response for one query.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct QueryResult {
    /// Column labels in result order.
    pub colnames: Vec<String>,
    /// Column data types, aligned to `colnames`.
    pub coltypes: Vec<GenericDataType>,
    /// Result rows.
    pub data: Vec<DataRecord>,
    /// Flattened column label -> original label parts (metric first).
    pub label_map: BTreeMap<String, Vec<String>>,
    /// Annotation data keyed by annotation layer name.
    pub annotation_data: BTreeMap<String, AnnotationResult>,
}

impl QueryResult {
    /// Returns a column label -> data type mapping.
    pub fn coltype_mapping(&self) -> BTreeMap<String, GenericDataType> {
        self.colnames
            .iter()
            .cloned()
            .zip(self.coltypes.iter().copied())
            .collect()
    }
}

/// Result rows with an explicit column order.
///
/// Rows are stored as maps, so the column order (which drives series order) is tracked
/// separately. Columns are taken from `colnames` when present, otherwise from the keys of the
/// first row.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct RecordFrame {
    /// Column labels in display order.
    pub columns: Vec<String>,
    /// Rows keyed by column label.
    pub rows: Vec<DataRecord>,
}

static NULL: DataValue = DataValue::Null;

impl RecordFrame {
    /// Creates a frame from explicit columns and rows.
    pub fn new(columns: Vec<String>, rows: Vec<DataRecord>) -> Self {
        Self { columns, rows }
    }

    /// Builds a frame from a query result.
    pub fn from_result(result: &QueryResult) -> Self {
        let columns = if result.colnames.is_empty() {
            result
                .data
                .first()
                .map(|row| row.keys().cloned().collect())
                .unwrap_or_default()
        } else {
            result.colnames.clone()
        };
        Self {
            columns,
            rows: result.data.clone(),
        }
    }

    /// Returns the number of rows.
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Returns `true` if the frame has no rows.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Returns the cell at `row`/`col`, or a null cell if either is missing.
    pub fn value(&self, row: usize, col: &str) -> &DataValue {
        self.rows
            .get(row)
            .and_then(|r| r.get(col))
            .unwrap_or(&NULL)
    }

    /// Returns the first row, if any.
    pub fn first_row(&self) -> Option<&DataRecord> {
        self.rows.first()
    }
}
