// Copyright 2025 the Xcontrol Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Time formatting for axis labels and tooltips.
//!
//! Timestamps are epoch milliseconds, always rendered in UTC. Patterns use d3 time directives;
//! they are translated to `chrono` strftime items once, when the formatter is built.

extern crate alloc;

use alloc::format;
use alloc::string::{String, ToString};

use chrono::format::{Item, StrftimeItems};
use chrono::{DateTime, Datelike, Timelike, Utc, Weekday};
use xcontrol_transforms::DataValue;

use crate::format::FormatError;

/// Name of the multi-granularity date format.
pub const SMART_DATE: &str = "smart_date";
/// Name of the verbose multi-granularity date format used in tooltips.
pub const SMART_DATE_VERBOSE: &str = "smart_date_verbose";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Granularity {
    Millisecond,
    Second,
    Minute,
    Hour,
    Day,
    Week,
    Month,
    Year,
}

impl Granularity {
    fn of(t: &DateTime<Utc>) -> Self {
        if t.timestamp_subsec_millis() != 0 {
            Self::Millisecond
        } else if t.second() != 0 {
            Self::Second
        } else if t.minute() != 0 {
            Self::Minute
        } else if t.hour() != 0 {
            Self::Hour
        } else if t.day() != 1 {
            if t.weekday() == Weekday::Sun {
                Self::Week
            } else {
                Self::Day
            }
        } else if t.month() != 1 {
            Self::Month
        } else {
            Self::Year
        }
    }

    fn smart_pattern(self) -> &'static str {
        match self {
            Self::Millisecond => ".%3f",
            Self::Second => ":%Ss",
            Self::Minute => "%I:%M",
            Self::Hour => "%I %p",
            Self::Day => "%a %d",
            Self::Week => "%b %d",
            Self::Month => "%B",
            Self::Year => "%Y",
        }
    }

    fn verbose_pattern(self) -> &'static str {
        match self {
            Self::Millisecond => ".%3f",
            Self::Second => "%a %b %d, %H:%M:%S",
            Self::Minute | Self::Hour => "%a %b %d, %H:%M",
            Self::Day | Self::Week | Self::Month => "%a %b %-d",
            Self::Year => "%Y",
        }
    }
}

/// Translates d3 time directives into `chrono` strftime syntax.
fn translate_d3(pattern: &str) -> String {
    let mut out = String::with_capacity(pattern.len());
    let mut chars = pattern.chars();
    while let Some(c) = chars.next() {
        if c != '%' {
            out.push(c);
            continue;
        }
        out.push('%');
        let mut next = chars.next();
        if let Some(pad @ ('-' | '_' | '0')) = next {
            out.push(pad);
            next = chars.next();
        }
        match next {
            Some('L') => out.push_str("3f"),
            Some('f') => out.push_str("6f"),
            Some(other) => out.push(other),
            None => {}
        }
    }
    out
}

/// Formats epoch-millisecond timestamps.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TimeFormatter {
    /// Picks the coarsest granularity that still distinguishes the timestamp.
    Smart,
    /// Like [`TimeFormatter::Smart`] with full dates, for tooltips.
    SmartVerbose,
    /// A fixed pattern, stored in `chrono` syntax.
    Pattern(String),
}

impl TimeFormatter {
    /// Parses a named format or a d3 time pattern.
    pub fn parse(spec: &str) -> Result<Self, FormatError> {
        match spec {
            SMART_DATE => Ok(Self::Smart),
            SMART_DATE_VERBOSE => Ok(Self::SmartVerbose),
            _ => {
                let pattern = translate_d3(spec);
                if StrftimeItems::new(&pattern).any(|item| matches!(item, Item::Error)) {
                    return Err(FormatError::InvalidTimeFormat(String::from(spec)));
                }
                Ok(Self::Pattern(pattern))
            }
        }
    }

    /// Formats `millis` (epoch milliseconds, UTC).
    pub fn format(&self, millis: f64) -> String {
        let Some(t) = to_datetime(millis) else {
            return String::from("Invalid Date");
        };
        let pattern = match self {
            Self::Smart => Granularity::of(&t).smart_pattern(),
            Self::SmartVerbose => Granularity::of(&t).verbose_pattern(),
            Self::Pattern(p) => p.as_str(),
        };
        t.format_with_items(StrftimeItems::new(pattern)).to_string()
    }
}

#[allow(
    clippy::cast_possible_truncation,
    reason = "non-finite values are rejected and chrono range-checks the rest"
)]
fn to_datetime(millis: f64) -> Option<DateTime<Utc>> {
    if !millis.is_finite() {
        return None;
    }
    DateTime::from_timestamp_millis(millis as i64)
}

/// Returns a time formatter; unset or invalid specs use the smart format.
pub fn get_time_formatter(spec: Option<&str>) -> TimeFormatter {
    match spec.filter(|s| !s.is_empty()) {
        None => TimeFormatter::Smart,
        Some(spec) => TimeFormatter::parse(spec).unwrap_or_else(|err| {
            tracing::warn!(%err, "falling back to {SMART_DATE}");
            TimeFormatter::Smart
        }),
    }
}

/// Returns the tooltip time formatter; the smart format becomes its verbose variant.
pub fn get_tooltip_time_formatter(spec: Option<&str>) -> TimeFormatter {
    match spec {
        None | Some("" | SMART_DATE) => TimeFormatter::SmartVerbose,
        Some(spec) => get_time_formatter(Some(spec)),
    }
}

/// Returns the x-axis label formatter, or `None` to let the chart library pick labels.
pub fn get_x_axis_formatter(spec: Option<&str>) -> Option<TimeFormatter> {
    match spec {
        None | Some("" | SMART_DATE) => None,
        Some(spec) => Some(get_time_formatter(Some(spec))),
    }
}

/// Formats x values for tooltips and cross-filter labels.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum XValueFormatter {
    /// Temporal x axis.
    Time(TimeFormatter),
    /// Any other x axis: values print as-is.
    Plain,
}

impl XValueFormatter {
    /// Formats an x value.
    pub fn format(&self, value: &DataValue) -> String {
        match (self, value) {
            (Self::Time(t), DataValue::Number(ms)) => t.format(*ms),
            (Self::Time(t), DataValue::String(s)) => match s.parse::<f64>() {
                Ok(ms) => t.format(ms),
                Err(_) => s.clone(),
            },
            _ => format!("{value}"),
        }
    }
}
