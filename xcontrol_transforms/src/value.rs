// Copyright 2025 the Xcontrol Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Cell values carried by query results.

extern crate alloc;

use alloc::string::String;
use core::fmt;

use serde::{Deserialize, Serialize};

/// A single cell of a query result row.
///
/// Query results are loosely typed JSON: numbers (including epoch-millisecond timestamps),
/// strings, booleans and nulls all show up in the same column positions.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DataValue {
    /// A missing value.
    #[default]
    Null,
    /// A boolean cell.
    Bool(bool),
    /// A numeric cell (timestamps are epoch milliseconds).
    Number(f64),
    /// A string cell.
    String(String),
}

impl DataValue {
    /// Returns the numeric payload, if this is a number.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Number(v) => Some(*v),
            _ => None,
        }
    }

    /// Returns the string payload, if this is a string.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    /// Returns `true` unless this is [`DataValue::Null`].
    pub fn is_defined(&self) -> bool {
        !matches!(self, Self::Null)
    }

    /// Leniently coerces this value into a finite number.
    ///
    /// Numbers pass through, numeric strings are parsed, booleans map to `0`/`1`. Nulls,
    /// unparseable strings and non-finite results yield `None`.
    pub fn coerce_f64(&self) -> Option<f64> {
        let v = match self {
            Self::Null => return None,
            Self::Bool(b) => f64::from(u8::from(*b)),
            Self::Number(v) => *v,
            Self::String(s) => s.trim().parse::<f64>().ok()?,
        };
        v.is_finite().then_some(v)
    }
}

impl From<f64> for DataValue {
    fn from(value: f64) -> Self {
        Self::Number(value)
    }
}

impl From<&str> for DataValue {
    fn from(value: &str) -> Self {
        Self::String(value.into())
    }
}

impl From<String> for DataValue {
    fn from(value: String) -> Self {
        Self::String(value)
    }
}

impl From<Option<f64>> for DataValue {
    fn from(value: Option<f64>) -> Self {
        value.map_or(Self::Null, Self::Number)
    }
}

impl fmt::Display for DataValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => f.write_str("null"),
            Self::Bool(b) => write!(f, "{b}"),
            Self::Number(v) => write!(f, "{v}"),
            Self::String(s) => f.write_str(s),
        }
    }
}
