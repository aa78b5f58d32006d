// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! The Font Service (spec.md §4.10): resolves a requested family/weight/
//! style to a concrete font file, embeds it into the package, and — when
//! the missing-font policy demands it — outlines text into paths so the
//! presentation never depends on a font PowerPoint doesn't have.
//!
//! Resolution mirrors the teacher's `usvg::text::fontdb` bridge: a
//! `fontdb::Query` built from family/weight/style, falling back to a
//! generic family and finally to the configured [`FontMissingPolicy`].

use std::collections::HashMap;

use pptx_ir::{FontStyle, PathSegment};
use rustybuzz::ttf_parser;

use crate::config::{Config, FontMissingPolicy};
use crate::error::Error;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct FontHandle {
    pub id: fontdb::ID,
    pub units_per_em: u16,
}

/// What the mapper should do with a text run once the Font Service has
/// looked at it (spec.md §4.10's missing-font decision table).
pub enum FontAction {
    /// Reference the font by name in `<a:rPr>`; the handle is used to
    /// decide whether to also embed the font file.
    Reference(FontHandle),
    /// The family could not be resolved and the policy demands the run
    /// be rendered as vector outlines instead.
    Outline(FontHandle),
}

pub struct FontService {
    db: fontdb::Database,
    missing: FontMissingPolicy,
}

impl FontService {
    /// Builds the service's font database: system fonts (when the
    /// `system-fonts` feature is enabled) plus any directories listed in
    /// `config.font_sources`.
    pub fn new(config: &Config) -> Self {
        let mut db = fontdb::Database::new();
        #[cfg(feature = "system-fonts")]
        db.load_system_fonts();
        for source in &config.font_sources {
            db.load_fonts_dir(source);
        }
        FontService { db, missing: config.font_missing.clone() }
    }

    fn query(&self, family: &str, weight: u16, style: FontStyle) -> Option<fontdb::ID> {
        let families = [fontdb::Family::Name(family), fontdb::Family::SansSerif];
        let style = match style {
            FontStyle::Normal => fontdb::Style::Normal,
            FontStyle::Italic => fontdb::Style::Italic,
            FontStyle::Oblique => fontdb::Style::Oblique,
        };
        let query = fontdb::Query { families: &families, weight: fontdb::Weight(weight), stretch: fontdb::Stretch::Normal, style };
        self.db.query(&query)
    }

    fn handle_for(&self, id: fontdb::ID) -> Option<FontHandle> {
        self.db.with_face_data(id, |data, face_index| {
            let face = ttf_parser::Face::parse(data, face_index).ok()?;
            Some(FontHandle { id, units_per_em: face.units_per_em() })
        })?
    }

    /// Resolves a run's font, applying the configured missing-font
    /// policy when the exact family can't be found.
    pub fn decide(&self, family: &str, weight: u16, style: FontStyle) -> Result<FontAction, Error> {
        if let Some(id) = self.query(family, weight, style).and_then(|id| self.handle_for(id)) {
            return Ok(FontAction::Reference(id));
        }

        match &self.missing {
            FontMissingPolicy::Error => Err(Error::FontNotFound(family.to_string())),
            FontMissingPolicy::FallbackFamily(fallback) => {
                log::warn!("font '{}' not found, falling back to '{}'", family, fallback);
                self.query(fallback, weight, style)
                    .and_then(|id| self.handle_for(id))
                    .map(FontAction::Reference)
                    .ok_or_else(|| Error::FontNotFound(fallback.clone()))
            }
            FontMissingPolicy::Outline => {
                log::warn!("font '{}' not found, text will be outlined", family);
                self.query("sans-serif", weight, style)
                    .and_then(|id| self.handle_for(id))
                    .map(FontAction::Outline)
                    .ok_or_else(|| Error::FontNotFound(family.to_string()))
            }
        }
    }

    /// The font's own primary family name, as recorded in its `name`
    /// table — used for `<a:latin typeface="…">` instead of the
    /// (possibly generic, e.g. `sans-serif`) family the run asked for.
    pub fn family_name(&self, handle: FontHandle) -> Option<String> {
        self.db.face(handle.id).and_then(|info| info.families.first().map(|(name, _)| name.clone()))
    }

    /// Returns the raw font program for embedding. Whole-font embedding,
    /// not true glyph subsetting — no subsetting crate is in the
    /// dependency stack, so the full face is embedded and PowerPoint's
    /// own renderer picks the glyphs it needs.
    pub fn embed_bytes(&self, handle: FontHandle) -> Option<Vec<u8>> {
        self.db.with_face_data(handle.id, |data, _| data.to_vec())
    }

    /// Shapes `text` with the font behind `handle` and returns one glyph
    /// outline (in font units, y-up) per shaped glyph, with its pen
    /// advance. Used for [`FontAction::Outline`].
    pub fn outline_text(&self, handle: FontHandle, text: &str) -> Option<Vec<GlyphOutline>> {
        self.db.with_face_data(handle.id, |data, face_index| {
            let face = ttf_parser::Face::parse(data, face_index).ok()?;
            let rb_face = rustybuzz::Face::from_face(face.clone())?;
            let mut buffer = rustybuzz::UnicodeBuffer::new();
            buffer.push_str(text);
            buffer.guess_segment_properties();
            let glyphs = rustybuzz::shape(&rb_face, &[], buffer);

            let mut pen_x = 0.0f64;
            let mut outlines = Vec::with_capacity(glyphs.len());
            for (info, pos) in glyphs.glyph_infos().iter().zip(glyphs.glyph_positions()) {
                let glyph_id = ttf_parser::GlyphId(info.glyph_id as u16);
                let mut builder = SegmentBuilder::default();
                face.outline_glyph(glyph_id, &mut builder);
                outlines.push(GlyphOutline { segments: builder.segments, advance_x: pos.x_advance as f64, offset_x: pen_x });
                pen_x += pos.x_advance as f64;
            }
            Some(outlines)
        })?
    }
}

pub struct GlyphOutline {
    pub segments: Vec<PathSegment>,
    pub advance_x: f64,
    pub offset_x: f64,
}

#[derive(Default)]
struct SegmentBuilder {
    segments: Vec<PathSegment>,
}

impl ttf_parser::OutlineBuilder for SegmentBuilder {
    fn move_to(&mut self, x: f32, y: f32) {
        self.segments.push(PathSegment::MoveTo { x: x as f64, y: y as f64 });
    }
    fn line_to(&mut self, x: f32, y: f32) {
        self.segments.push(PathSegment::LineTo { x: x as f64, y: y as f64 });
    }
    fn quad_to(&mut self, x1: f32, y1: f32, x: f32, y: f32) {
        // Promote the quadratic to a cubic at construction-time precision,
        // matching the parser's own quad-to-cubic rule (spec.md §4.4).
        let (x1, y1, x, y) = (x1 as f64, y1 as f64, x as f64, y as f64);
        let last = self.segments.last().and_then(|s| match s {
            PathSegment::MoveTo { x, y } | PathSegment::LineTo { x, y } => Some((*x, *y)),
            PathSegment::CubicTo { x, y, .. } => Some((*x, *y)),
            PathSegment::Close => None,
        });
        let (x0, y0) = last.unwrap_or((0.0, 0.0));
        let cx1 = x0 + 2.0 / 3.0 * (x1 - x0);
        let cy1 = y0 + 2.0 / 3.0 * (y1 - y0);
        let cx2 = x + 2.0 / 3.0 * (x1 - x);
        let cy2 = y + 2.0 / 3.0 * (y1 - y);
        self.segments.push(PathSegment::CubicTo { x1: cx1, y1: cy1, x2: cx2, y2: cy2, x, y });
    }
    fn curve_to(&mut self, x1: f32, y1: f32, x2: f32, y2: f32, x: f32, y: f32) {
        self.segments.push(PathSegment::CubicTo {
            x1: x1 as f64,
            y1: y1 as f64,
            x2: x2 as f64,
            y2: y2 as f64,
            x: x as f64,
            y: y as f64,
        });
    }
    fn close(&mut self) {
        self.segments.push(PathSegment::Close);
    }
}

/// Content-hash-keyed cache so the same embedded font is only written to
/// the package once even if many runs reference it (spec.md §4.11).
#[derive(Default)]
pub struct FontCache {
    seen: HashMap<fontdb::ID, String>,
}

impl FontCache {
    pub fn new() -> Self {
        FontCache::default()
    }

    /// Returns the relationship id previously assigned to this font, if
    /// any; the caller registers it with the package on a miss.
    pub fn get(&self, id: fontdb::ID) -> Option<&str> {
        self.seen.get(&id).map(|s| s.as_str())
    }

    pub fn insert(&mut self, id: fontdb::ID, relationship_id: String) {
        self.seen.insert(id, relationship_id);
    }
}
