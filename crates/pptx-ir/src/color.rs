// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! An sRGB color with an optional note of its original color space.

/// The color space a `Color` was declared in, kept only for diagnostics;
/// all colors are normalized to sRGB at parse time.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SourceColorSpace {
    Srgb,
    LinearRgb,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    /// Alpha in `[0, 1]`.
    pub a: f64,
    pub source: Option<SourceColorSpace>,
}

impl Color {
    pub const BLACK: Color = Color { r: 0, g: 0, b: 0, a: 1.0, source: None };

    pub fn new_rgb(r: u8, g: u8, b: u8) -> Self {
        Color { r, g, b, a: 1.0, source: None }
    }

    pub fn with_alpha(mut self, a: f64) -> Self {
        self.a = a.clamp(0.0, 1.0);
        self
    }

    /// `rrggbb` hex string, as used by DrawingML's `<a:srgbClr val="rrggbb"/>`.
    pub fn to_hex(&self) -> String {
        format!("{:02X}{:02X}{:02X}", self.r, self.g, self.b)
    }
}
