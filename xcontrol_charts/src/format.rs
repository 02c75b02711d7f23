// Copyright 2025 the Xcontrol Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Number formatting.
//!
//! Formats follow the d3-format mini-language, restricted to what chart controls offer:
//! `[sign][$][,][.precision][~][type]` with types `f d % s e r g` (or none), plus the named
//! `SMART_NUMBER` / `SMART_NUMBER_SIGNED` formats.

extern crate alloc;

use alloc::collections::BTreeMap;
use alloc::format;
use alloc::string::String;
use alloc::sync::Arc;
use core::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use xcontrol_transforms::QueryFormMetric;

#[cfg(not(feature = "std"))]
use crate::float::FloatExt;

/// Name of the adaptive number format.
pub const SMART_NUMBER: &str = "SMART_NUMBER";
/// Name of the adaptive number format that prefixes positive values with `+`.
pub const SMART_NUMBER_SIGNED: &str = "SMART_NUMBER_SIGNED";
/// Percentage with two decimals.
pub const PERCENT_2_POINT: &str = ",.2%";
/// Whole percentage.
pub const PERCENT_0_POINT: &str = ",.0%";

const SI_PREFIXES: [&str; 17] = [
    "y", "z", "a", "f", "p", "n", "µ", "m", "", "k", "M", "G", "T", "P", "E", "Z", "Y",
];

/// Errors produced while parsing format specifiers.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum FormatError {
    /// The number format specifier is not understood.
    #[error("invalid number format `{0}`")]
    InvalidNumberFormat(String),
    /// The time format contains an unknown directive.
    #[error("invalid time format `{0}`")]
    InvalidTimeFormat(String),
}

/// Formats numbers for labels, axes and tooltips.
pub trait ValueFormatter: fmt::Debug {
    /// Formats `value`.
    fn format(&self, value: f64) -> String;

    /// Returns the currency this formatter renders, if any.
    fn currency(&self) -> Option<&Currency> {
        None
    }
}

/// A shared, type-erased formatter.
pub type SharedFormatter = Arc<dyn ValueFormatter>;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
enum Sign {
    #[default]
    Minus,
    Plus,
    Space,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
enum FormatType {
    #[default]
    Default,
    Fixed,
    Decimal,
    Percent,
    Si,
    Exponent,
    Rounded,
    General,
}

/// A parsed d3-style number format.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct NumberFormat {
    sign: Sign,
    currency: bool,
    comma: bool,
    precision: Option<usize>,
    trim: bool,
    kind: FormatType,
}

impl NumberFormat {
    /// Parses a format specifier such as `,.2f`, `.3~s` or `+,.1%`.
    pub fn parse(spec: &str) -> Result<Self, FormatError> {
        let err = || FormatError::InvalidNumberFormat(String::from(spec));
        let mut chars = spec.chars().peekable();
        let mut out = Self::default();

        out.sign = match chars.next_if(|c| matches!(c, '+' | '-' | ' ')) {
            Some('+') => Sign::Plus,
            Some(' ') => Sign::Space,
            _ => Sign::Minus,
        };
        out.currency = chars.next_if_eq(&'$').is_some();
        out.comma = chars.next_if_eq(&',').is_some();
        if chars.next_if_eq(&'.').is_some() {
            let mut digits = String::new();
            while let Some(d) = chars.next_if(char::is_ascii_digit) {
                digits.push(d);
            }
            out.precision = Some(digits.parse().map_err(|_| err())?);
        }
        out.trim = chars.next_if_eq(&'~').is_some();
        if let Some(c) = chars.next() {
            out.kind = match c {
                'f' => FormatType::Fixed,
                'd' => FormatType::Decimal,
                '%' => FormatType::Percent,
                's' => FormatType::Si,
                'e' => FormatType::Exponent,
                'r' => FormatType::Rounded,
                'g' => FormatType::General,
                _ => return Err(err()),
            };
        }
        if chars.next().is_some() {
            return Err(err());
        }
        Ok(out)
    }

    fn resolved(&self) -> (FormatType, usize, bool) {
        let (kind, precision, trim) = match self.kind {
            FormatType::Default => (FormatType::General, self.precision.or(Some(12)), true),
            kind => (kind, self.precision, self.trim),
        };
        let precision = match (kind, precision) {
            (_, None) => 6,
            (FormatType::General | FormatType::Rounded | FormatType::Si, Some(p)) => p.clamp(1, 21),
            (_, Some(p)) => p.min(20),
        };
        (kind, precision, trim)
    }

    /// Formats `value`.
    pub fn format(&self, value: f64) -> String {
        let (kind, precision, trim) = self.resolved();
        let mut negative = value < 0.0 || (value == 0.0 && value.is_sign_negative());
        let abs = value.abs();
        let mut si_exponent = 0;

        let mut body = if value.is_nan() {
            String::from("NaN")
        } else if value.is_infinite() {
            String::from("Infinity")
        } else {
            match kind {
                FormatType::Fixed => format!("{abs:.precision$}"),
                FormatType::Decimal => format!("{:.0}", round_half_up(abs)),
                FormatType::Percent => format!("{:.precision$}", abs * 100.0),
                FormatType::Exponent => to_exponential(abs, precision),
                FormatType::Rounded => format_rounded(abs, precision),
                FormatType::Si => {
                    let (s, e) = format_prefix_auto(abs, precision);
                    si_exponent = e;
                    s
                }
                FormatType::General | FormatType::Default => to_precision(abs, precision),
            }
        };
        if trim {
            body = trim_insignificant(&body);
        }
        if negative && body.parse::<f64>().is_ok_and(|v| v == 0.0) && self.sign != Sign::Plus {
            negative = false;
        }

        let mut out = String::from(match (negative, self.sign) {
            (true, _) => "-",
            (false, Sign::Plus) => "+",
            (false, Sign::Space) => " ",
            (false, Sign::Minus) => "",
        });
        if self.currency {
            out.push('$');
        }
        if self.comma {
            let split = body.find(|c: char| !c.is_ascii_digit()).unwrap_or(body.len());
            out.push_str(&group_thousands(&body[..split]));
            out.push_str(&body[split..]);
        } else {
            out.push_str(&body);
        }
        if kind == FormatType::Si {
            out.push_str(SI_PREFIXES[(8 + si_exponent / 3) as usize]);
        }
        if kind == FormatType::Percent {
            out.push('%');
        }
        out
    }
}

fn round_half_up(v: f64) -> f64 {
    (v + 0.5).floor()
}

/// Splits `x` (non-negative) into significant digits and a decimal exponent, rounded to `p`
/// significant digits (`0` means as many as needed).
fn decimal_parts(x: f64, p: usize) -> (String, i32) {
    let s = if p == 0 {
        format!("{x:e}")
    } else {
        format!("{x:.prec$e}", prec = p - 1)
    };
    let (mantissa, exponent) = s.split_once('e').unwrap_or((s.as_str(), "0"));
    let digits = mantissa.chars().filter(char::is_ascii_digit).collect();
    (digits, exponent.parse().unwrap_or(0))
}

fn zeros(n: i32) -> String {
    "0".repeat(usize::try_from(n).unwrap_or(0))
}

fn to_exponential(x: f64, p: usize) -> String {
    let s = format!("{x:.p$e}");
    match s.split_once('e') {
        Some((m, e)) if e.starts_with('-') => format!("{m}e{e}"),
        Some((m, e)) => format!("{m}e+{e}"),
        None => s,
    }
}

/// Shortest round-trip text of `value`, switching to exponent notation (`1e+21`, `1e-7`)
/// outside `1e-7..1e21`.
pub(crate) fn number_to_string(value: f64) -> String {
    if value == 0.0 {
        return String::from("0");
    }
    if !value.is_finite() {
        return String::from(if value.is_nan() {
            "NaN"
        } else if value > 0.0 {
            "Infinity"
        } else {
            "-Infinity"
        });
    }
    let shortest = format!("{value:e}");
    let Some((mantissa, exponent)) = shortest.split_once('e') else {
        return shortest;
    };
    match exponent.parse::<i32>() {
        Ok(e) if (-7..21).contains(&e) => format!("{value}"),
        _ if exponent.starts_with('-') => format!("{mantissa}e{exponent}"),
        _ => format!("{mantissa}e+{exponent}"),
    }
}

fn to_precision(x: f64, p: usize) -> String {
    let (_, e) = decimal_parts(x, p);
    let p_i = i32::try_from(p).unwrap_or(i32::MAX);
    if e < -6 || e >= p_i {
        to_exponential(x, p - 1)
    } else {
        let decimals = usize::try_from(p_i - 1 - e).unwrap_or(0);
        format!("{x:.decimals$}")
    }
}

#[allow(
    clippy::cast_possible_truncation,
    reason = "coefficients hold at most 17 significant digits"
)]
fn format_rounded(x: f64, p: usize) -> String {
    let (coefficient, exponent) = decimal_parts(x, p);
    let len = coefficient.len() as i32;
    if exponent < 0 {
        format!("0.{}{coefficient}", zeros(-exponent - 1))
    } else if len > exponent + 1 {
        let (int, frac) = coefficient.split_at((exponent + 1) as usize);
        format!("{int}.{frac}")
    } else {
        format!("{coefficient}{}", zeros(exponent - len + 1))
    }
}

#[allow(
    clippy::cast_possible_truncation,
    reason = "coefficients hold at most 17 significant digits"
)]
fn format_prefix_auto(x: f64, p: usize) -> (String, i32) {
    let (coefficient, exponent) = decimal_parts(x, p);
    let prefix_exponent = exponent.div_euclid(3).clamp(-8, 8) * 3;
    let i = exponent - prefix_exponent + 1;
    let n = coefficient.len() as i32;
    let s = if i == n {
        coefficient
    } else if i > n {
        format!("{coefficient}{}", zeros(i - n))
    } else if i > 0 {
        let (int, frac) = coefficient.split_at(i as usize);
        format!("{int}.{frac}")
    } else {
        let p = usize::try_from(i32::try_from(p).unwrap_or(0) + i - 1).unwrap_or(0);
        format!("0.{}{}", zeros(-i), decimal_parts(x, p).0)
    };
    (s, prefix_exponent)
}

/// Removes insignificant trailing zeros of the fractional part (`1.2000k` -> `1.2k`).
fn trim_insignificant(s: &str) -> String {
    let Some(dot) = s.find('.') else {
        return String::from(s);
    };
    let after = &s[dot + 1..];
    let frac_len = after.find(|c: char| !c.is_ascii_digit()).unwrap_or(after.len());
    let frac = after[..frac_len].trim_end_matches('0');
    let mut out = String::from(&s[..dot]);
    if !frac.is_empty() {
        out.push('.');
        out.push_str(frac);
    }
    out.push_str(&after[frac_len..]);
    out
}

fn group_thousands(digits: &str) -> String {
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}

/// A number formatter: either a d3-style pattern or the adaptive smart format.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum NumberFormatter {
    /// Adaptive precision with SI suffixes for large and tiny values.
    Smart {
        /// Prefix positive values with `+`.
        signed: bool,
    },
    /// A fixed d3-style pattern.
    Pattern(NumberFormat),
}

impl NumberFormatter {
    /// Parses a named format or a d3-style specifier.
    pub fn parse(spec: &str) -> Result<Self, FormatError> {
        match spec {
            SMART_NUMBER => Ok(Self::Smart { signed: false }),
            SMART_NUMBER_SIGNED => Ok(Self::Smart { signed: true }),
            _ => NumberFormat::parse(spec).map(Self::Pattern),
        }
    }
}

fn smart_format(value: f64) -> String {
    let si = |v: f64| NumberFormat::parse(".3~s").map(|f| f.format(v)).unwrap_or_default();
    let fixed = |spec: &str, v: f64| NumberFormat::parse(spec).map(|f| f.format(v)).unwrap_or_default();
    if value == 0.0 {
        return String::from("0");
    }
    let abs = value.abs();
    if abs >= 1000.0 {
        si(value).replace('G', "B")
    } else if abs >= 1.0 {
        fixed(".2~f", value)
    } else if abs >= 0.001 {
        fixed(".4~f", value)
    } else if abs > 0.000_001 {
        format!("{}µ", si(value * 1_000_000.0))
    } else {
        si(value)
    }
}

impl ValueFormatter for NumberFormatter {
    fn format(&self, value: f64) -> String {
        match self {
            Self::Smart { signed } => {
                let out = smart_format(value);
                if *signed && value > 0.0 {
                    format!("+{out}")
                } else {
                    out
                }
            }
            Self::Pattern(pattern) => pattern.format(value),
        }
    }
}

/// Returns a formatter for `spec`, falling back to the smart format when the specifier does
/// not parse.
pub fn get_number_formatter(spec: Option<&str>) -> SharedFormatter {
    let spec = spec.filter(|s| !s.is_empty()).unwrap_or(SMART_NUMBER);
    match NumberFormatter::parse(spec) {
        Ok(formatter) => Arc::new(formatter),
        Err(err) => {
            tracing::warn!(%err, "falling back to {SMART_NUMBER}");
            Arc::new(NumberFormatter::Smart { signed: false })
        }
    }
}

/// Returns a percentage formatter; unset or smart formats read as two-decimal percentages.
pub fn get_percent_formatter(spec: Option<&str>) -> SharedFormatter {
    match spec {
        None | Some("" | SMART_NUMBER) => get_number_formatter(Some(PERCENT_2_POINT)),
        Some(spec) => get_number_formatter(Some(spec)),
    }
}

/// Where a currency symbol goes.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SymbolPosition {
    /// Before the number.
    #[default]
    Prefix,
    /// After the number.
    Suffix,
}

/// A currency display setting.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Currency {
    /// ISO 4217 code (`USD`, `EUR`, ...).
    pub symbol: String,
    /// Symbol placement.
    pub symbol_position: SymbolPosition,
}

impl Currency {
    /// Returns the display symbol for the ISO code, or the code itself when unknown.
    pub fn display_symbol(&self) -> &str {
        match self.symbol.as_str() {
            "USD" => "$",
            "EUR" => "€",
            "GBP" => "£",
            "JPY" | "CNY" => "¥",
            "INR" => "₹",
            "KRW" => "₩",
            "RUB" => "₽",
            "ILS" => "₪",
            "BRL" => "R$",
            "CAD" => "CA$",
            "AUD" => "A$",
            other => other,
        }
    }
}

/// Formats numbers with a currency symbol.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CurrencyFormatter {
    currency: Currency,
    number: NumberFormatter,
}

impl CurrencyFormatter {
    /// Creates a currency formatter; an unparseable `d3_format` falls back to the smart format.
    pub fn new(currency: Currency, d3_format: Option<&str>) -> Self {
        let spec = d3_format.filter(|s| !s.is_empty()).unwrap_or(SMART_NUMBER);
        let number = NumberFormatter::parse(spec).unwrap_or_else(|err| {
            tracing::warn!(%err, "falling back to {SMART_NUMBER}");
            NumberFormatter::Smart { signed: false }
        });
        Self { currency, number }
    }
}

impl ValueFormatter for CurrencyFormatter {
    fn format(&self, value: f64) -> String {
        let number = self.number.format(value);
        if self.currency.symbol.is_empty() {
            return number;
        }
        let symbol = self.currency.display_symbol();
        match self.currency.symbol_position {
            SymbolPosition::Prefix => format!("{symbol} {number}"),
            SymbolPosition::Suffix => format!("{number} {symbol}"),
        }
    }

    fn currency(&self) -> Option<&Currency> {
        Some(&self.currency)
    }
}

/// Hides values above `max` (bar labels that would be clipped by the axis).
#[derive(Debug)]
pub struct OverMaxHiddenFormatter {
    max: Option<f64>,
    inner: SharedFormatter,
}

impl OverMaxHiddenFormatter {
    /// Wraps `inner`; with no `max`, values are never hidden.
    pub fn new(max: Option<f64>, inner: SharedFormatter) -> Self {
        Self { max, inner }
    }
}

impl ValueFormatter for OverMaxHiddenFormatter {
    fn format(&self, value: f64) -> String {
        if self.max.is_some_and(|max| value > max) {
            return String::new();
        }
        let out = self.inner.format(value);
        if out.is_empty() { number_to_string(value) } else { out }
    }

    fn currency(&self) -> Option<&Currency> {
        self.inner.currency()
    }
}

/// Builds per-metric formatters for saved metrics.
///
/// A column format saved on the dataset overrides `d3_format`; a chart-level currency wins over
/// a currency saved on the dataset.
pub fn build_custom_formatters(
    metrics: &[QueryFormMetric],
    currency_formats: &BTreeMap<String, Currency>,
    column_formats: &BTreeMap<String, String>,
    d3_format: &str,
    currency: Option<&Currency>,
) -> BTreeMap<String, SharedFormatter> {
    let mut out: BTreeMap<String, SharedFormatter> = BTreeMap::new();
    for metric in metrics {
        let QueryFormMetric::Saved(name) = metric else {
            continue;
        };
        let format = column_formats
            .get(name)
            .map_or(d3_format, String::as_str);
        let currency = currency
            .filter(|c| !c.symbol.is_empty())
            .or_else(|| currency_formats.get(name).filter(|c| !c.symbol.is_empty()));
        let formatter: SharedFormatter = match currency {
            Some(currency) => Arc::new(CurrencyFormatter::new(currency.clone(), Some(format))),
            None => get_number_formatter(Some(format)),
        };
        out.insert(name.clone(), formatter);
    }
    out
}

/// Picks a custom formatter: the only metric's when there is a single saved metric, else the
/// one for `key`.
pub fn get_custom_formatter(
    custom: &BTreeMap<String, SharedFormatter>,
    metrics: &[QueryFormMetric],
    key: Option<&str>,
) -> Option<SharedFormatter> {
    if let [QueryFormMetric::Saved(name)] = metrics {
        return custom.get(name).cloned();
    }
    key.and_then(|k| custom.get(k)).cloned()
}

/// Picks the formatter of one series or tooltip row.
///
/// `key` is the metric the series belongs to; contribution mode always formats whole
/// percentages.
pub fn get_series_formatter(
    custom: &BTreeMap<String, SharedFormatter>,
    default: &SharedFormatter,
    metrics: &[QueryFormMetric],
    key: Option<&str>,
    force_percent: bool,
) -> SharedFormatter {
    if force_percent {
        return get_number_formatter(Some(PERCENT_0_POINT));
    }
    get_custom_formatter(custom, metrics, key).unwrap_or_else(|| Arc::clone(default))
}

/// Picks the y-axis formatter.
///
/// Contribution mode forces percentages. When every metric is saved and shares one currency
/// formatter, that formatter labels the axis; otherwise `default` does.
pub fn get_y_axis_formatter(
    metrics: &[QueryFormMetric],
    force_percent: bool,
    custom: &BTreeMap<String, SharedFormatter>,
    default: SharedFormatter,
    format: Option<&str>,
) -> SharedFormatter {
    if force_percent {
        return get_percent_formatter(format);
    }
    let saved: Option<alloc::vec::Vec<&SharedFormatter>> = metrics
        .iter()
        .map(|m| match m {
            QueryFormMetric::Saved(name) => custom.get(name),
            QueryFormMetric::Adhoc(_) => None,
        })
        .collect();
    if let Some(formatters) = saved
        && let Some(first) = formatters.first()
        && let Some(symbol) = first.currency().map(|c| &c.symbol)
        && formatters
            .iter()
            .all(|f| f.currency().is_some_and(|c| &c.symbol == symbol))
    {
        return Arc::clone(first);
    }
    default
}

#[cfg(test)]
mod tests {
    extern crate std;

    use alloc::vec;

    use super::*;

    fn fmt(spec: &str, v: f64) -> String {
        NumberFormatter::parse(spec).unwrap().format(v)
    }

    #[test]
    fn plain_number_text() {
        assert_eq!(number_to_string(2.5), "2.5");
        assert_eq!(number_to_string(-0.0), "0");
        assert_eq!(number_to_string(1e20), "100000000000000000000");
        assert_eq!(number_to_string(1e21), "1e+21");
        assert_eq!(number_to_string(-1.5e22), "-1.5e+22");
        assert_eq!(number_to_string(0.000_001), "0.000001");
        assert_eq!(number_to_string(1.5e-7), "1.5e-7");
        assert_eq!(number_to_string(f64::NAN), "NaN");
        assert_eq!(number_to_string(f64::NEG_INFINITY), "-Infinity");
    }

    #[test]
    fn fixed_and_grouping() {
        assert_eq!(fmt(",.2f", 1234567.891), "1,234,567.89");
        assert_eq!(fmt(".1f", -0.04), "0.0");
        assert_eq!(fmt(",d", 1234.6), "1,235");
        assert_eq!(fmt("+,", 1500.0), "+1,500");
        assert_eq!(fmt("$,.2f", -3.5), "-$3.50");
    }

    #[test]
    fn percentages() {
        assert_eq!(fmt(",.0%", 0.256), "26%");
        assert_eq!(fmt(".2%", 0.5), "50.00%");
        assert_eq!(fmt(",.1~%", 0.5), "50%");
    }

    #[test]
    fn si_and_rounded() {
        assert_eq!(fmt(".3s", 1234.0), "1.23k");
        assert_eq!(fmt(".3~s", 1_500_000.0), "1.5M");
        assert_eq!(fmt(".3s", 0.0012), "1.20m");
        assert_eq!(fmt(".4r", 3.14159), "3.142");
        assert_eq!(fmt(".2r", 12345.0), "12000");
        assert_eq!(fmt(".1e", 12345.0), "1.2e+4");
    }

    #[test]
    fn default_type_trims() {
        assert_eq!(fmt("", 0.1), "0.1");
        assert_eq!(fmt("", 42.0), "42");
    }

    #[test]
    fn smart_number() {
        let smart = NumberFormatter::Smart { signed: false };
        assert_eq!(smart.format(0.0), "0");
        assert_eq!(smart.format(1234.0), "1.23k");
        assert_eq!(smart.format(2.5e9), "2.5B");
        assert_eq!(smart.format(12.345), "12.35");
        assert_eq!(smart.format(0.012345), "0.0123");
        assert_eq!(smart.format(0.00005), "50µ");
        let signed = NumberFormatter::Smart { signed: true };
        assert_eq!(signed.format(3.0), "+3");
        assert_eq!(signed.format(-3.0), "-3");
    }

    #[test]
    fn invalid_specs_are_errors() {
        assert!(NumberFormat::parse(".2q").is_err());
        assert!(NumberFormat::parse("DURATION").is_err());
        assert!(NumberFormat::parse(".f").is_err());
        assert_eq!(get_number_formatter(Some("nope")).format(1234.0), "1.23k");
    }

    #[test]
    fn currency_positions() {
        let usd = Currency {
            symbol: "USD".into(),
            symbol_position: SymbolPosition::Prefix,
        };
        let eur = Currency {
            symbol: "EUR".into(),
            symbol_position: SymbolPosition::Suffix,
        };
        assert_eq!(CurrencyFormatter::new(usd, Some(",.2f")).format(12.0), "$ 12.00");
        assert_eq!(CurrencyFormatter::new(eur, None).format(1500.0), "1.5k €");
    }

    #[test]
    fn over_max_values_are_hidden() {
        let inner = get_number_formatter(Some(",d"));
        let hidden = OverMaxHiddenFormatter::new(Some(10.0), inner.clone());
        assert_eq!(hidden.format(11.0), "");
        assert_eq!(hidden.format(10.0), "10");
        let never = OverMaxHiddenFormatter::new(None, inner);
        assert_eq!(never.format(1e6), "1,000,000");
    }

    #[test]
    fn custom_formatters_follow_saved_metrics() {
        let metrics = vec![
            QueryFormMetric::Saved("revenue".into()),
            QueryFormMetric::sql("x", "1"),
        ];
        let mut currencies = BTreeMap::new();
        currencies.insert(
            String::from("revenue"),
            Currency {
                symbol: "USD".into(),
                symbol_position: SymbolPosition::Prefix,
            },
        );
        let custom =
            build_custom_formatters(&metrics, &currencies, &BTreeMap::new(), ",.1f", None);
        assert_eq!(custom.len(), 1);
        assert_eq!(custom["revenue"].format(2.0), "$ 2.0");

        assert!(get_custom_formatter(&custom, &metrics, None).is_none());
        assert!(get_custom_formatter(&custom, &metrics, Some("revenue")).is_some());
        assert!(get_custom_formatter(&custom, &metrics[..1], None).is_some());

        let default = get_number_formatter(None);
        let axis = get_y_axis_formatter(&metrics[..1], false, &custom, default.clone(), None);
        assert!(axis.currency().is_some());
        let axis = get_y_axis_formatter(&metrics, false, &custom, default, None);
        assert!(axis.currency().is_none());
    }
}
