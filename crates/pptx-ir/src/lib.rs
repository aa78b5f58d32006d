// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

/*!
`pptx-ir` holds the geometry primitives, the fractional-EMU unit engine,
the CTM stack and viewport resolver, and the intermediate representation
(IR) scene graph used by `pptx-parser` and by the `svg2pptx` mappers.

No type in this crate stores an SVG `transform`: the parser bakes every
transform into slide-frame coordinates before constructing IR (spec.md
§3.2, §9 — "Memory ownership of matrices and IR").
*/

#![forbid(unsafe_code)]
#![warn(missing_debug_implementations)]
#![allow(clippy::too_many_arguments)]

mod color;
mod coord_space;
mod error;
mod geom;
mod ir;
mod transform;
mod units;
pub mod viewport;

pub use crate::color::{Color, SourceColorSpace};
pub use crate::coord_space::CoordSpace;
pub use crate::error::Error;
pub use crate::geom::{Decomposed, Matrix, Point, Rect};
pub use crate::ir::{
    clamp_opacity, sort_stops, ChannelSelector, ClipPath, DefsTable, FillRule, FilterChain, FilterInput,
    FilterPrimitive, FontStyle, FontVariant, GradientStop, ImageSource, Ir, LineCap, LineJoin, Paint,
    PathSegment, RefId, Scene, SpreadMethod, Stroke, TextRunSpan, CompositeOperator, MorphologyOperator,
};
pub use crate::transform::parse_transform;
pub use crate::units::{
    to_emu_int, to_fractional_emu, to_fractional_emu_batch, to_user_units, Axis, EmuContext, Unit,
    BATCH_THRESHOLD, EMU_PER_INCH, EMU_PER_POINT, EMU_PER_PX_96DPI, MAX_VALID_EMU,
};
pub use crate::viewport::{resolve_viewport, Align, AspectRatio, MeetOrSlice, ViewBox};

/// A precision quantum for coordinate rounding, applied before EMU
/// rounding in mappers that need intermediate snapping (e.g. `custGeom`
/// path coordinates normalized into the 21600-unit space).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PrecisionMode {
    Standard,
    Subpixel,
    High,
    Ultra,
}

impl PrecisionMode {
    /// The rounding quantum scale factor (spec.md §3.1).
    pub fn scale(self) -> f64 {
        match self {
            PrecisionMode::Standard => 1.0,
            PrecisionMode::Subpixel => 100.0,
            PrecisionMode::High => 1000.0,
            PrecisionMode::Ultra => 10_000.0,
        }
    }

    /// Rounds `value` to this precision's quantum.
    pub fn quantize(self, value: f64) -> f64 {
        let s = self.scale();
        (value * s).round() / s
    }
}

impl Default for PrecisionMode {
    fn default() -> Self {
        PrecisionMode::Standard
    }
}
