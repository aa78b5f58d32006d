// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! The intermediate representation (spec.md §3).
//!
//! Every IR element carries pre-transformed (baked) coordinates in the
//! slide frame; no variant stores a transform. IR values are immutable
//! once constructed and may be shared by reference across mappers
//! without copying (spec.md §3.3, §9).

use std::collections::HashMap;
use std::rc::Rc;

use crate::{Color, Matrix, Point, Rect};

/// A stable identifier into a scene's named tables
/// (gradients/patterns/clip-paths/filter-chains), assigned at parse time.
pub type RefId = Rc<str>;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FillRule {
    NonZero,
    EvenOdd,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LineCap {
    Butt,
    Round,
    Square,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LineJoin {
    Miter,
    Round,
    Bevel,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SpreadMethod {
    Pad,
    Reflect,
    Repeat,
}

#[derive(Clone, Debug, PartialEq)]
pub struct GradientStop {
    /// Clamped to `[0, 1]` at construction time.
    pub offset: f64,
    pub color: Color,
    /// Clamped to `[0, 1]` at construction time.
    pub opacity: f64,
}

impl GradientStop {
    pub fn new(offset: f64, color: Color, opacity: f64) -> Self {
        GradientStop { offset: offset.clamp(0.0, 1.0), color, opacity: opacity.clamp(0.0, 1.0) }
    }
}

/// Sorts stops by offset; duplicate offsets are preserved as-is (they
/// create a hard color boundary in the renderer, per spec.md §3.2).
pub fn sort_stops(stops: &mut Vec<GradientStop>) {
    stops.sort_by(|a, b| a.offset.partial_cmp(&b.offset).unwrap_or(std::cmp::Ordering::Equal));
}

#[derive(Clone, Debug, PartialEq)]
pub enum Paint {
    Solid(Color),
    LinearGradient { stops: Vec<GradientStop>, p0: Point, p1: Point, spread: SpreadMethod },
    RadialGradient { stops: Vec<GradientStop>, center: Point, focal: Point, radius: f64, spread: SpreadMethod },
    Pattern { ref_id: RefId, bbox: Rect },
    None,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Stroke {
    pub paint: Paint,
    pub width: f64,
    pub dash: Vec<f64>,
    pub dash_offset: f64,
    pub cap: LineCap,
    pub join: LineJoin,
    pub miter_limit: f64,
}

impl Default for Stroke {
    fn default() -> Self {
        Stroke {
            paint: Paint::None,
            width: 1.0,
            dash: Vec::new(),
            dash_offset: 0.0,
            cap: LineCap::Butt,
            join: LineJoin::Miter,
            miter_limit: 4.0,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum PathSegment {
    MoveTo { x: f64, y: f64 },
    LineTo { x: f64, y: f64 },
    CubicTo { x1: f64, y1: f64, x2: f64, y2: f64, x: f64, y: f64 },
    Close,
}

/// Clamps `opacity` into `[0, 1]`; out-of-range values are clamped at
/// parse time and the caller is expected to have already recorded a
/// warning (spec.md §3.2).
pub fn clamp_opacity(opacity: f64) -> f64 {
    opacity.clamp(0.0, 1.0)
}

#[derive(Clone, Debug, PartialEq)]
pub enum FontStyle {
    Normal,
    Italic,
    Oblique,
}

#[derive(Clone, Debug, PartialEq)]
pub struct FontVariant {
    pub family: String,
    pub weight: u16,
    pub style: FontStyle,
}

#[derive(Clone, Debug, PartialEq)]
pub struct TextRunSpan {
    pub text: String,
    pub font: FontVariant,
    pub size_pt: f64,
    pub fill: Paint,
    pub bold: bool,
    pub italic: bool,
}

#[derive(Clone, Debug, PartialEq)]
pub enum ImageSource {
    EmbeddedBytes { mime: String, data: Rc<[u8]> },
    DataUri(String),
}

/// One scene element. No variant stores a transform: every coordinate
/// field is already expressed in the slide frame.
#[derive(Clone, Debug, PartialEq)]
pub enum Ir {
    Circle { center: Point, radius: f64, paint: Paint, stroke: Option<Stroke>, opacity: f64 },
    Ellipse { center: Point, rx: f64, ry: f64, paint: Paint, stroke: Option<Stroke>, opacity: f64 },
    Rectangle { bounds: Rect, corner_radius: f64, paint: Paint, stroke: Option<Stroke>, opacity: f64 },
    PathShape { segments: Vec<PathSegment>, paint: Paint, stroke: Option<Stroke>, opacity: f64, fill_rule: FillRule },
    TextRun { position: Point, runs: Vec<TextRunSpan>, bbox: Rect },
    Group { children: Vec<Ir>, clip_ref: Option<RefId>, filter_ref: Option<RefId>, opacity: f64 },
    Image { bounds: Rect, source: ImageSource, preserve_aspect: bool },
}

impl Ir {
    pub fn opacity(&self) -> f64 {
        match self {
            Ir::Circle { opacity, .. }
            | Ir::Ellipse { opacity, .. }
            | Ir::Rectangle { opacity, .. }
            | Ir::PathShape { opacity, .. }
            | Ir::Group { opacity, .. } => *opacity,
            Ir::TextRun { .. } | Ir::Image { .. } => 1.0,
        }
    }
}

// --- Filters (spec.md §3.2, §4.8) -----------------------------------------

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FilterInput {
    SourceGraphic,
    SourceAlpha,
    /// A named prior result in the same chain.
    Named(usize), // index into FilterChain::results interner, see parser
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CompositeOperator {
    Over,
    In,
    Out,
    Atop,
    Xor,
    Arithmetic,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MorphologyOperator {
    Erode,
    Dilate,
}

/// `feDisplacementMap`'s `xChannelSelector`/`yChannelSelector`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ChannelSelector {
    R,
    G,
    B,
    A,
}

#[derive(Clone, Debug, PartialEq)]
pub enum FilterPrimitive {
    GaussianBlur { input: FilterInput, std_deviation: f64 },
    Offset { input: FilterInput, dx: f64, dy: f64 },
    /// A full 5x4 color matrix; `feColorMatrix` `type=matrix/saturate/hueRotate/luminanceToAlpha`
    /// are all pre-normalized into this 20-coefficient form at parse time.
    ColorMatrix { input: FilterInput, matrix: [f64; 20] },
    Composite { input: FilterInput, input2: FilterInput, operator: CompositeOperator, k: [f64; 4] },
    Merge { inputs: Vec<FilterInput> },
    Morphology { input: FilterInput, operator: MorphologyOperator, radius_x: f64, radius_y: f64 },
    Turbulence { base_frequency_x: f64, base_frequency_y: f64, num_octaves: u32, seed: i32, fractal_noise: bool },
    DropShadow { input: FilterInput, dx: f64, dy: f64, std_deviation: f64, color: Color },
    Flood { color: Color },
    Image { href: String },
    /// No native DrawingML equivalent; kept as a marker so the Policy
    /// Engine can still see it in the chain and force `Raster` rather
    /// than silently dropping it (spec.md line 199, conformance Scenario E).
    DisplacementMap {
        input: FilterInput,
        input2: FilterInput,
        scale: f64,
        x_channel_selector: ChannelSelector,
        y_channel_selector: ChannelSelector,
    },
}

#[derive(Clone, Debug, PartialEq)]
pub struct FilterChain {
    pub primitives: Vec<FilterPrimitive>,
}

#[derive(Clone, Debug, PartialEq)]
pub enum ClipPath {
    Shapes { shapes: Vec<Ir>, rule: FillRule },
    Ref(RefId),
}

/// Named definitions a scene's IR shapes refer to by [`RefId`]
/// (spec.md §3.3: "owned by the IR scene in a named table").
#[derive(Default, Debug, Clone)]
pub struct DefsTable {
    pub clip_paths: HashMap<String, ClipPath>,
    pub filters: HashMap<String, FilterChain>,
    /// Pattern tile content, already baked into the pattern's own local
    /// frame; referenced by `Paint::Pattern::ref_id`.
    pub patterns: HashMap<String, Vec<Ir>>,
}

#[derive(Debug, Clone, Default)]
pub struct Scene {
    /// Root elements, in paint (document) order.
    pub elements: Vec<Ir>,
    pub defs: DefsTable,
    /// Root viewport matrix, kept for diagnostics/testing only — it has
    /// already been baked into every element's coordinates.
    pub viewport: Matrix,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gradient_stops_sort_and_clamp() {
        let mut stops = vec![
            GradientStop::new(0.8, Color::BLACK, 1.0),
            GradientStop::new(-0.2, Color::BLACK, 2.0),
            GradientStop::new(0.1, Color::BLACK, 1.0),
        ];
        sort_stops(&mut stops);
        assert_eq!(stops[0].offset, 0.0);
        assert_eq!(stops[1].offset, 0.1);
        assert_eq!(stops[2].opacity, 1.0);
    }

    #[test]
    fn opacity_clamps() {
        assert_eq!(clamp_opacity(1.5), 1.0);
        assert_eq!(clamp_opacity(-0.5), 0.0);
    }
}
