// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Parser-level options (not the conversion-wide `svg2pptx::Config`,
//! which wraps this plus policy/font/package settings).

/// Options controlling how the SVG DOM is turned into IR.
#[derive(Clone, Debug)]
pub struct Options {
    /// Used to resolve physical length units (`in`, `cm`, `mm`, `pt`) to
    /// pixels before the fractional-EMU engine converts pixels to EMU.
    pub dpi: f64,
    /// Root `font-size` in px, used to resolve `em`/`ex` on elements with
    /// no ancestor `font-size`.
    pub font_size: f64,
    /// Slide dimensions in EMU, the target of the root viewport matrix.
    pub slide_width_emu: f64,
    pub slide_height_emu: f64,
    /// Safety cap matching the teacher's own `ElementsLimitReached`
    /// guard against pathological documents.
    pub max_elements: usize,
}

impl Default for Options {
    fn default() -> Self {
        Options {
            dpi: 96.0,
            font_size: 16.0,
            slide_width_emu: 9_144_000.0,
            slide_height_emu: 6_858_000.0,
            max_elements: 1_000_000,
        }
    }
}
