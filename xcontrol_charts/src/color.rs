// Copyright 2025 the Xcontrol Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Series colors.

extern crate alloc;

use alloc::format;
use alloc::string::String;
use core::cell::RefCell;

use hashbrown::HashMap;
use peniko::Color;
use serde::{Serialize, Serializer};

/// Assigns colors to series keys.
///
/// `group` separates otherwise identically named series (for example the same metric in two
/// charts of a dashboard) so they can receive distinct colors.
pub trait ColorScale {
    /// Returns the color for `key` within `group`.
    fn color(&self, key: &str, group: Option<i64>) -> Color;
}

/// The default categorical palette.
pub const SUPERSET_COLORS: [Color; 20] = [
    Color::from_rgb8(0x1f, 0xa8, 0xc9),
    Color::from_rgb8(0x45, 0x4e, 0x7c),
    Color::from_rgb8(0x5a, 0xc1, 0x89),
    Color::from_rgb8(0xff, 0x7f, 0x44),
    Color::from_rgb8(0x66, 0x66, 0x66),
    Color::from_rgb8(0xe0, 0x43, 0x55),
    Color::from_rgb8(0xfc, 0xc7, 0x00),
    Color::from_rgb8(0xa8, 0x68, 0xb7),
    Color::from_rgb8(0x3c, 0xcc, 0xcb),
    Color::from_rgb8(0xa3, 0x8f, 0x79),
    Color::from_rgb8(0x8f, 0xd3, 0xe4),
    Color::from_rgb8(0xa1, 0xa6, 0xbd),
    Color::from_rgb8(0xac, 0xe1, 0xc4),
    Color::from_rgb8(0xfe, 0xc0, 0xa1),
    Color::from_rgb8(0xb2, 0xb2, 0xb2),
    Color::from_rgb8(0xef, 0xa1, 0xaa),
    Color::from_rgb8(0xfd, 0xe3, 0x80),
    Color::from_rgb8(0xd3, 0xb3, 0xda),
    Color::from_rgb8(0x9e, 0xe5, 0xe5),
    Color::from_rgb8(0xd1, 0xc6, 0xbc),
];

/// An ordinal color scale: keys get palette colors in first-seen order, cycling when the
/// palette runs out.
///
/// Assignments are remembered, so repeated lookups of a key are stable for the lifetime of the
/// scale.
#[derive(Debug)]
pub struct CategoricalColorScale {
    palette: &'static [Color],
    assigned: RefCell<HashMap<(String, Option<i64>), usize>>,
}

impl CategoricalColorScale {
    /// Creates a scale over `palette`.
    pub fn new(palette: &'static [Color]) -> Self {
        Self {
            palette,
            assigned: RefCell::new(HashMap::new()),
        }
    }
}

impl Default for CategoricalColorScale {
    fn default() -> Self {
        Self::new(&SUPERSET_COLORS)
    }
}

impl ColorScale for CategoricalColorScale {
    fn color(&self, key: &str, group: Option<i64>) -> Color {
        if self.palette.is_empty() {
            return Color::BLACK;
        }
        let mut assigned = self.assigned.borrow_mut();
        let next = assigned.len();
        let index = *assigned.entry((String::from(key), group)).or_insert(next);
        self.palette[index % self.palette.len()]
    }
}

/// A color serialized as a CSS color string (`#rrggbb`, or `rgba(...)` when translucent).
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CssColor(pub Color);

impl CssColor {
    /// Returns the CSS text of this color.
    pub fn to_css(self) -> String {
        let rgba = self.0.to_rgba8();
        if rgba.a == 255 {
            format!("#{:02x}{:02x}{:02x}", rgba.r, rgba.g, rgba.b)
        } else {
            let alpha = f64::from(rgba.a) / 255.0;
            format!("rgba({},{},{},{alpha:.3})", rgba.r, rgba.g, rgba.b)
        }
    }
}

impl From<Color> for CssColor {
    fn from(value: Color) -> Self {
        Self(value)
    }
}

impl Serialize for CssColor {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_css())
    }
}
