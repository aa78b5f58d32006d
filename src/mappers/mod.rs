// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! The mapper tier (spec.md §4.7): turns IR elements into DrawingML XML
//! fragments, in IR order, threading shared state (shape ids, the Font
//! Service, the Media Registry) through [`MapperCtx`].

pub mod gradient;
pub mod group;
pub mod image;
pub mod paint;
pub mod path;
pub mod shapes;
pub mod text;

use pptx_ir::{DefsTable, Ir};

use crate::config::Config;
use crate::dml::ShapeIds;
use crate::fonts::{FontCache, FontHandle, FontService};
use crate::package::media::{MediaKind, MediaPart, MediaRegistry};

/// Mutable state threaded through one slide's mapping pass: shape id
/// allocation, the Font Service plus its embed cache, the Media Registry,
/// and the accumulated relationship ids the Package Writer needs for this
/// slide's `.rels` file.
pub struct MapperCtx<'a> {
    pub config: &'a Config,
    pub fonts: &'a FontService,
    pub font_cache: &'a mut FontCache,
    pub media: &'a mut MediaRegistry,
    pub embedded_fonts: &'a mut Vec<(String, MediaPart)>,
    /// `(relationship id, part path relative to "ppt/")` for every media
    /// part this slide references, handed to `SlideContent` afterward.
    pub media_rel_ids: &'a mut Vec<(String, String)>,
    pub defs: &'a DefsTable,
    pub ids: &'a mut ShapeIds,
    pub px_per_emu: f64,
}

impl<'a> MapperCtx<'a> {
    /// Embeds `handle`'s font program into the package on first
    /// reference (spec.md §4.10, §4.11); a no-op on a cache hit.
    pub fn register_font(&mut self, handle: FontHandle, typeface: &str) {
        if self.font_cache.get(handle.id).is_some() {
            return;
        }
        let Some(bytes) = self.fonts.embed_bytes(handle) else {
            log::warn!("font '{typeface}' has no embeddable program; referenced by name only");
            return;
        };
        let part = self.media.register(MediaKind::Font, "application/x-font-ttf", bytes.into());
        self.font_cache.insert(handle.id, part.relationship_id.clone());
        self.embedded_fonts.push((typeface.to_string(), part));
    }
}

/// Maps one IR element to its DrawingML fragment, allocating shape ids as
/// needed (spec.md §4.7: "mapper output order inside a slide equals IR
/// order").
pub fn map_element(ir: &Ir, ctx: &mut MapperCtx) -> String {
    match ir {
        Ir::Circle { center, radius, paint, stroke, opacity } => {
            let paint = paint::merge_for_speed(paint, ctx.config);
            shapes::map_circle(ctx.ids.next(), *center, *radius, &paint, stroke, *opacity)
        }
        Ir::Ellipse { center, rx, ry, paint, stroke, opacity } => {
            let paint = paint::merge_for_speed(paint, ctx.config);
            shapes::map_ellipse(ctx.ids.next(), *center, *rx, *ry, &paint, stroke, *opacity)
        }
        Ir::Rectangle { bounds, corner_radius, paint, stroke, opacity } => {
            let paint = paint::merge_for_speed(paint, ctx.config);
            shapes::map_rectangle(ctx.ids.next(), bounds, *corner_radius, &paint, stroke, *opacity)
        }
        Ir::PathShape { segments, paint, stroke, opacity, .. } => {
            let paint = paint::merge_for_speed(paint, ctx.config);
            path::map_path(ctx.ids.next(), segments, &paint, stroke, *opacity)
        }
        Ir::TextRun { position, runs, bbox } => {
            let id = ctx.ids.next();
            text::map_text(id, *position, runs, bbox, ctx)
        }
        Ir::Image { bounds, source, .. } => {
            let id = ctx.ids.next();
            let (xml, rel) = image::map_image(id, bounds, source, ctx.media);
            if let Some(rel) = rel {
                ctx.media_rel_ids.push(rel);
            }
            xml
        }
        Ir::Group { children, clip_ref, filter_ref, opacity } => {
            group::map_group(children, clip_ref.as_deref(), filter_ref.as_deref(), *opacity, ctx)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pptx_ir::{Color, Paint, Point};

    fn ctx<'a>(
        config: &'a Config,
        fonts: &'a FontService,
        font_cache: &'a mut FontCache,
        media: &'a mut MediaRegistry,
        embedded_fonts: &'a mut Vec<(String, MediaPart)>,
        media_rel_ids: &'a mut Vec<(String, String)>,
        defs: &'a DefsTable,
        ids: &'a mut ShapeIds,
    ) -> MapperCtx<'a> {
        MapperCtx { config, fonts, font_cache, media, embedded_fonts, media_rel_ids, defs, ids, px_per_emu: 1.0 }
    }

    #[test]
    fn circle_dispatches_to_shapes_mapper() {
        let config = Config::default();
        let fonts = FontService::new(&config);
        let mut font_cache = FontCache::new();
        let mut media = MediaRegistry::new();
        let mut embedded_fonts = Vec::new();
        let mut media_rel_ids = Vec::new();
        let defs = DefsTable::default();
        let mut ids = ShapeIds::new();
        let mut c = ctx(&config, &fonts, &mut font_cache, &mut media, &mut embedded_fonts, &mut media_rel_ids, &defs, &mut ids);

        let ir = Ir::Circle { center: Point::new(5.0, 5.0), radius: 5.0, paint: Paint::Solid(Color::BLACK), stroke: None, opacity: 1.0 };
        let xml = map_element(&ir, &mut c);
        assert!(xml.contains(r#"prst="ellipse""#));
    }
}
