// Copyright 2025 the Xcontrol Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Host theme values used by chart options.

extern crate alloc;

use alloc::string::String;

use peniko::Color;

/// The subset of the host theme that chart options read.
#[derive(Clone, Debug, PartialEq)]
pub struct Theme {
    /// Neutral mid gray (legend selector text and borders).
    pub grayscale_base: Color,
    /// Dark text color (annotation labels).
    pub grayscale_dark2: Color,
    /// Lightest background color (emphasized annotation labels).
    pub grayscale_light5: Color,
    /// Sans-serif font stack.
    pub font_family: String,
    /// Small font size in pixels.
    pub font_size_s: f64,
}

impl Default for Theme {
    fn default() -> Self {
        Self {
            grayscale_base: Color::from_rgb8(0x66, 0x66, 0x66),
            grayscale_dark2: Color::from_rgb8(0x00, 0x00, 0x00),
            grayscale_light5: Color::from_rgb8(0xff, 0xff, 0xff),
            font_family: String::from("'Inter', Helvetica, Arial"),
            font_size_s: 12.0,
        }
    }
}
