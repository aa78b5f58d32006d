// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! The group mapper (spec.md §4.7, §4.8, §4.9): recurses into a
//! `<p:grpSp>` natively when neither its clip nor its filter forces
//! rasterization, otherwise delegates to the Clipping Adapter and Filter
//! Pipeline, falling back to a single `<p:pic>` in place of the whole
//! group when either tier lands on a raster or EMF outcome.

use pptx_ir::{ClipPath, Ir, Point, Rect};

use super::MapperCtx;
use crate::clip::{self, ClipOutcome};
use crate::dml::emu;
use crate::filters::{self, FilterOutcome};
use crate::package::media::MediaKind;
use crate::raster::scale_child_opacity;

/// Maps a group (spec.md §4.7). `clip_ref`/`filter_ref` name entries in
/// the scene's `DefsTable`; a reference that doesn't resolve degrades to
/// "children emitted unclipped/unfiltered" rather than failing the slide.
pub fn map_group(children: &[Ir], clip_ref: Option<&str>, filter_ref: Option<&str>, opacity: f64, ctx: &mut MapperCtx) -> String {
    let Some(filter_id) = filter_ref else {
        return apply_clip(children, clip_ref, opacity, ctx, None);
    };

    let Some(chain) = ctx.defs.filters.get(filter_id).cloned() else {
        log::warn!("filter reference '{filter_id}' did not resolve; children emitted unfiltered");
        return apply_clip(children, clip_ref, opacity, ctx, None);
    };

    match filters::apply(children, &chain, ctx.config, ctx.px_per_emu) {
        FilterOutcome::Native(effect_xml) => apply_clip(children, clip_ref, opacity, ctx, Some(effect_xml)),
        FilterOutcome::Vector(bytes, bounds) => embed_part(bytes, MediaKind::Emf, "image/x-emf", &bounds, ctx),
        FilterOutcome::Raster(bytes, bounds) => embed_part(bytes, MediaKind::Image, "image/png", &bounds, ctx),
        FilterOutcome::None => apply_clip(children, clip_ref, opacity, ctx, None),
    }
}

fn apply_clip(children: &[Ir], clip_ref: Option<&str>, opacity: f64, ctx: &mut MapperCtx, effect_xml: Option<String>) -> String {
    let Some(id) = clip_ref else {
        return emit_group(children, opacity, ctx, effect_xml);
    };

    let clip_path = ClipPath::Ref(id.into());
    match clip::apply(children, &clip_path, ctx.defs, ctx.config, ctx.px_per_emu) {
        ClipOutcome::NativeRect(rect) => {
            let clamped: Vec<Ir> = children.iter().map(|c| clamp_child(c, &rect)).collect();
            emit_group(&clamped, opacity, ctx, effect_xml)
        }
        ClipOutcome::Rasterized(bytes, bounds) => embed_part(bytes, MediaKind::Image, "image/png", &bounds, ctx),
        ClipOutcome::None => emit_group(children, opacity, ctx, effect_xml),
    }
}

/// Re-bounds a simple shape to its intersection with a native rect clip
/// (spec.md §4.9's `NativeRect` outcome). `PathShape`/`TextRun`/`Image`/
/// nested `Group` children have no single bounding rectangle that can
/// stand in for an exact clip, so they're passed through unclipped.
fn clamp_child(ir: &Ir, rect: &Rect) -> Ir {
    match ir {
        Ir::Rectangle { bounds, corner_radius, paint, stroke, opacity } => Ir::Rectangle {
            bounds: clip::clamp_to_rect(bounds, rect),
            corner_radius: *corner_radius,
            paint: paint.clone(),
            stroke: stroke.clone(),
            opacity: *opacity,
        },
        Ir::Circle { center, radius, paint, stroke, opacity } => {
            clamp_round(Rect::new(center.x - radius, center.y - radius, radius * 2.0, radius * 2.0), rect, paint, stroke, *opacity)
        }
        Ir::Ellipse { center, rx, ry, paint, stroke, opacity } => {
            clamp_round(Rect::new(center.x - rx, center.y - ry, rx * 2.0, ry * 2.0), rect, paint, stroke, *opacity)
        }
        other => {
            log::warn!("clip applied to a shape kind that can't be exactly re-bounded; left unclipped");
            other.clone()
        }
    }
}

fn clamp_round(bounds: Rect, rect: &Rect, paint: &pptx_ir::Paint, stroke: &Option<pptx_ir::Stroke>, opacity: f64) -> Ir {
    let clamped = clip::clamp_to_rect(&bounds, rect);
    Ir::Ellipse {
        center: Point::new(clamped.x + clamped.width / 2.0, clamped.y + clamped.height / 2.0),
        rx: clamped.width / 2.0,
        ry: clamped.height / 2.0,
        paint: paint.clone(),
        stroke: stroke.clone(),
        opacity,
    }
}

fn emit_group(children: &[Ir], opacity: f64, ctx: &mut MapperCtx, effect_xml: Option<String>) -> String {
    let mut body = String::new();
    for child in children {
        let mut child = child.clone();
        scale_child_opacity(&mut child, opacity);
        body.push_str(&super::map_element(&child, ctx));
    }

    let id = ctx.ids.next();
    let grp_pr = format!("<p:grpSpPr>{}{}</p:grpSpPr>", group_xfrm(children), effect_xml.unwrap_or_default());
    format!(r#"<p:grpSp><p:nvGrpSpPr><p:cNvPr id="{id}" name=""/><p:cNvGrpSpPr/><p:nvPr/></p:nvGrpSpPr>{grp_pr}{body}</p:grpSp>"#)
}

/// An identity child-space transform sized to the group's content bounds;
/// DrawingML's `<p:grpSpPr>` requires an `<a:xfrm>` even when the group
/// applies no transform of its own (IR coordinates are already baked into
/// the slide frame, spec.md §3).
fn group_xfrm(children: &[Ir]) -> String {
    let b = clip::union_bounds(children);
    let (x, y, cx, cy) = (emu(b.x), emu(b.y), emu(b.width.max(1.0)), emu(b.height.max(1.0)));
    format!(r#"<a:xfrm><a:off x="{x}" y="{y}"/><a:ext cx="{cx}" cy="{cy}"/><a:chOff x="{x}" y="{y}"/><a:chExt cx="{cx}" cy="{cy}"/></a:xfrm>"#)
}

fn embed_part(bytes: Vec<u8>, kind: MediaKind, content_type: &str, bounds: &Rect, ctx: &mut MapperCtx) -> String {
    let part = ctx.media.register(kind, content_type, bytes.into());
    let target = part.part_path.trim_start_matches("ppt/").to_string();
    ctx.media_rel_ids.push((part.relationship_id.clone(), target));

    let id = ctx.ids.next();
    format!(
        r#"<p:pic><p:nvPicPr><p:cNvPr id="{id}" name=""/><p:cNvPicPr/><p:nvPr/></p:nvPicPr><p:blipFill><a:blip r:embed="{}"/><a:stretch><a:fillRect/></a:stretch></p:blipFill><p:spPr><a:xfrm><a:off x="{}" y="{}"/><a:ext cx="{}" cy="{}"/></a:xfrm><a:prstGeom prst="rect"><a:avLst/></a:prstGeom></p:spPr></p:pic>"#,
        part.relationship_id,
        emu(bounds.x),
        emu(bounds.y),
        emu(bounds.width.max(1.0)),
        emu(bounds.height.max(1.0))
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::dml::ShapeIds;
    use crate::fonts::{FontCache, FontService};
    use crate::package::media::MediaRegistry;
    use pptx_ir::{Color, DefsTable, Paint};

    fn rect(bounds: Rect) -> Ir {
        Ir::Rectangle { bounds, corner_radius: 0.0, paint: Paint::Solid(Color::BLACK), stroke: None, opacity: 1.0 }
    }

    #[test]
    fn unclipped_unfiltered_group_emits_grp_sp() {
        let config = Config::default();
        let fonts = FontService::new(&config);
        let mut font_cache = FontCache::new();
        let mut media = MediaRegistry::new();
        let mut embedded_fonts = Vec::new();
        let mut media_rel_ids = Vec::new();
        let defs = DefsTable::default();
        let mut ids = ShapeIds::new();
        let mut ctx = MapperCtx {
            config: &config,
            fonts: &fonts,
            font_cache: &mut font_cache,
            media: &mut media,
            embedded_fonts: &mut embedded_fonts,
            media_rel_ids: &mut media_rel_ids,
            defs: &defs,
            ids: &mut ids,
            px_per_emu: 1.0,
        };

        let children = vec![rect(Rect::new(0.0, 0.0, 10.0, 10.0))];
        let xml = map_group(&children, None, None, 1.0, &mut ctx);
        assert!(xml.contains("<p:grpSp>"));
        assert!(xml.contains(r#"prst="rect""#));
    }
}
