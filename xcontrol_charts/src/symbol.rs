// Copyright 2025 the Xcontrol Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Point symbols, including the control-limit alarm markers.

use serde::{Serialize, Serializer};

/// Marker for points outside the control limits (a filled red disc).
pub const ALARM_MARKER: &str = "image://data:image/svg+xml;charset=utf-8,\
%3Csvg xmlns=%22http://www.w3.org/2000/svg%22 width=%2232%22 height=%2232%22%3E\
%3Ccircle cx=%2216%22 cy=%2216%22 r=%2212%22 fill=%22%23ff0000%22/%3E%3C/svg%3E";

/// Marker for points within the control limits (a filled black disc).
pub const IN_CONTROL_MARKER: &str = "image://data:image/svg+xml;charset=utf-8,\
%3Csvg xmlns=%22http://www.w3.org/2000/svg%22 width=%2232%22 height=%2232%22%3E\
%3Ccircle cx=%2216%22 cy=%2216%22 r=%2210%22 fill=%22%23000000%22/%3E%3C/svg%3E";

/// A point symbol.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Symbol {
    /// The chart library's hollow circle.
    #[default]
    EmptyCircle,
    /// No symbol.
    None,
    /// A point outside the control limits.
    Alarm,
    /// A point inside the control limits.
    InControl,
}

impl Symbol {
    /// Returns the chart-library symbol name or image URI.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::EmptyCircle => "emptyCircle",
            Self::None => "none",
            Self::Alarm => ALARM_MARKER,
            Self::InControl => IN_CONTROL_MARKER,
        }
    }
}

impl Serialize for Symbol {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

/// Chooses the symbol of each point of a series.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub enum SymbolRule {
    /// Every point uses [`Symbol::EmptyCircle`].
    #[default]
    Default,
    /// Reserved control-limit lines: no symbols at all.
    Hidden,
    /// Points are checked against the control band read from the first result row.
    ControlBand {
        /// Upper control limit.
        ucl: Option<f64>,
        /// Lower control limit.
        lcl: Option<f64>,
    },
}

impl SymbolRule {
    /// Returns the symbol for a point value.
    ///
    /// Missing or non-finite inputs resolve to the default symbol.
    pub fn symbol(&self, value: Option<f64>) -> Symbol {
        match *self {
            Self::Default => Symbol::EmptyCircle,
            Self::Hidden => Symbol::None,
            Self::ControlBand { ucl, lcl } => {
                let finite = |v: Option<f64>| v.filter(|v| v.is_finite());
                match (finite(value), finite(ucl), finite(lcl)) {
                    (Some(v), Some(ucl), Some(lcl)) if v > ucl || v < lcl => Symbol::Alarm,
                    (Some(_), Some(_), Some(_)) => Symbol::InControl,
                    _ => Symbol::EmptyCircle,
                }
            }
        }
    }

    /// Returns the symbol every point shares, if the rule does not depend on values.
    pub fn uniform(&self) -> Option<Symbol> {
        match self {
            Self::Default => Some(Symbol::EmptyCircle),
            Self::Hidden => Some(Symbol::None),
            Self::ControlBand { .. } => None,
        }
    }
}
