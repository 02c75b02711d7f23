// Copyright 2025 the Xcontrol Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Forecast role decoding for series names.
//!
//! Forecast post-processing emits extra columns next to each observation, named with a fixed
//! suffix: `<name>__yhat` (trend), `<name>__yhat_lower` and `<name>__yhat_upper` (confidence
//! band). Names are decoded once here; everything downstream works with [`ForecastRole`].

extern crate alloc;

use alloc::string::String;

use hashbrown::HashMap;
use smallvec::SmallVec;

/// The forecast role of a series, decoded from its name.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum ForecastRole {
    /// A plain (observed) series.
    #[default]
    Observation,
    /// The forecast trend line (`__yhat`).
    Trend,
    /// The lower confidence bound (`__yhat_lower`).
    Lower,
    /// The upper confidence bound (`__yhat_upper`).
    Upper,
}

impl ForecastRole {
    /// Returns the series-name suffix encoding this role.
    pub const fn suffix(self) -> &'static str {
        match self {
            Self::Observation => "",
            Self::Trend => "__yhat",
            Self::Lower => "__yhat_lower",
            Self::Upper => "__yhat_upper",
        }
    }

    /// Returns `true` for the upper/lower bounds of a forecast interval.
    pub const fn is_confidence_band(self) -> bool {
        matches!(self, Self::Lower | Self::Upper)
    }

    /// Returns `true` for any role produced by forecasting.
    pub const fn is_forecast(self) -> bool {
        !matches!(self, Self::Observation)
    }
}

/// A decoded series name: the base name and its forecast role.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ForecastSeriesContext<'a> {
    /// The name without any forecast suffix.
    pub name: &'a str,
    /// The decoded role.
    pub role: ForecastRole,
}

/// Decodes the forecast role of a series name.
///
/// A suffix only counts when it follows a non-empty base name.
pub fn extract_forecast_series_context(name: &str) -> ForecastSeriesContext<'_> {
    for role in [ForecastRole::Lower, ForecastRole::Upper, ForecastRole::Trend] {
        if let Some(base) = name.strip_suffix(role.suffix())
            && !base.is_empty()
        {
            return ForecastSeriesContext { name: base, role };
        }
    }
    ForecastSeriesContext {
        name,
        role: ForecastRole::Observation,
    }
}

/// The roles seen for one base name.
pub type ForecastRoles = SmallVec<[ForecastRole; 4]>;

/// Groups series names by base name, collecting the forecast roles present for each.
pub fn extract_forecast_series_contexts<'a>(
    names: impl IntoIterator<Item = &'a str>,
) -> HashMap<String, ForecastRoles> {
    let mut out: HashMap<String, ForecastRoles> = HashMap::new();
    for name in names {
        let context = extract_forecast_series_context(name);
        out.entry(String::from(context.name))
            .or_default()
            .push(context.role);
    }
    out
}

#[cfg(test)]
mod tests {
    extern crate std;

    use super::*;

    #[test]
    fn suffixes_decode_to_roles() {
        let cases = [
            ("sales", "sales", ForecastRole::Observation),
            ("sales__yhat", "sales", ForecastRole::Trend),
            ("sales__yhat_lower", "sales", ForecastRole::Lower),
            ("sales__yhat_upper", "sales", ForecastRole::Upper),
        ];
        for (input, name, role) in cases {
            let ctx = extract_forecast_series_context(input);
            assert_eq!(ctx.name, name, "name of {input}");
            assert_eq!(ctx.role, role, "role of {input}");
        }
    }

    #[test]
    fn bare_suffix_is_an_observation() {
        let ctx = extract_forecast_series_context("__yhat");
        assert_eq!(ctx.role, ForecastRole::Observation);
        assert_eq!(ctx.name, "__yhat");
    }

    #[test]
    fn contexts_group_by_base_name() {
        let contexts =
            extract_forecast_series_contexts(["a", "a__yhat", "a__yhat_upper", "b"].into_iter());
        assert_eq!(
            contexts["a"].as_slice(),
            &[
                ForecastRole::Observation,
                ForecastRole::Trend,
                ForecastRole::Upper
            ]
        );
        assert_eq!(contexts["b"].as_slice(), &[ForecastRole::Observation]);
    }
}
