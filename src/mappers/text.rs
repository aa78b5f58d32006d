// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! The text mapper (spec.md §4.7, §4.10): one `<a:p>` of `<a:r>` runs per
//! `Ir::TextRun`, backed by the Font Service for resolution and, when the
//! missing-font policy demands it, outline-to-path conversion.

use pptx_ir::{Paint, PathSegment, Point, Rect, TextRunSpan};

use super::paint::fill_xml;
use super::path::map_path;
use crate::dml::emu;
use crate::fonts::{FontAction, FontHandle, FontService};

use super::MapperCtx;

const EMU_PER_PT: f64 = 12_700.0;

fn run_xml(run: &TextRunSpan, typeface: &str) -> String {
    let sz = (run.size_pt * 100.0).round() as i64;
    let b = if run.bold { r#" b="1""# } else { "" };
    let i = if run.italic { r#" i="1""# } else { "" };
    format!(
        r#"<a:r><a:rPr lang="en-US" sz="{sz}"{b}{i}>{}<a:latin typeface="{typeface}"/></a:rPr><a:t>{}</a:t></a:r>"#,
        fill_xml(&run.fill),
        escape_xml(&run.text)
    )
}

fn escape_xml(text: &str) -> String {
    text.replace('&', "&amp;").replace('<', "&lt;").replace('>', "&gt;")
}

/// Builds one run's glyph outlines into slide-frame path segments, for
/// the `FontAction::Outline` path (spec.md §4.10).
fn outline_segments(run: &TextRunSpan, baseline: Point, handle: FontHandle, fonts: &FontService) -> Option<Vec<PathSegment>> {
    let glyphs = fonts.outline_text(handle, &run.text)?;
    let scale = (run.size_pt * EMU_PER_PT) / handle.units_per_em as f64;
    let mut out = Vec::new();
    for g in &glyphs {
        let xform = |x: f64, y: f64| (baseline.x + (g.offset_x + x) * scale, baseline.y - y * scale);
        for seg in &g.segments {
            out.push(match *seg {
                PathSegment::MoveTo { x, y } => {
                    let (x, y) = xform(x, y);
                    PathSegment::MoveTo { x, y }
                }
                PathSegment::LineTo { x, y } => {
                    let (x, y) = xform(x, y);
                    PathSegment::LineTo { x, y }
                }
                PathSegment::CubicTo { x1, y1, x2, y2, x, y } => {
                    let (x1, y1) = xform(x1, y1);
                    let (x2, y2) = xform(x2, y2);
                    let (x, y) = xform(x, y);
                    PathSegment::CubicTo { x1, y1, x2, y2, x, y }
                }
                PathSegment::Close => PathSegment::Close,
            });
        }
    }
    Some(out)
}

/// Maps a text run (spec.md §4.7). Runs whose font resolves normally are
/// emitted as native `<a:r>` text; runs whose font is missing and whose
/// `font_missing` policy is `Outline` are emitted as outlined
/// `PathShape`s instead, one per run, alongside the remaining native runs
/// in the same `<p:sp>`/`<p:grpSp>` (bundled here as a flat concatenation
/// since the IR carries no nested grouping for a single `<text>`).
pub fn map_text(id: u32, position: Point, runs: &[TextRunSpan], bbox: &Rect, ctx: &mut MapperCtx) -> String {
    let mut native_runs = String::new();
    let mut outlined_shapes = String::new();

    for run in runs {
        let action = ctx.fonts.decide(&run.font.family, run.font.weight, run.font.style.clone());
        match action {
            Ok(FontAction::Reference(handle)) => {
                let typeface = ctx.fonts.family_name(handle).unwrap_or_else(|| run.font.family.clone());
                ctx.register_font(handle, &typeface);
                native_runs.push_str(&run_xml(run, &typeface));
            }
            Ok(FontAction::Outline(handle)) => {
                if let Some(segments) = outline_segments(run, position, handle, ctx.fonts) {
                    let shape_id = ctx.ids.next();
                    outlined_shapes.push_str(&map_path(shape_id, &segments, &run.fill, &None, 1.0));
                }
            }
            Err(e) => {
                log::warn!("text run dropped: {e}");
            }
        }
    }

    if native_runs.is_empty() && outlined_shapes.is_empty() {
        return String::new();
    }

    let sp = if native_runs.is_empty() {
        String::new()
    } else {
        format!(
            r#"<p:sp><p:nvSpPr><p:cNvPr id="{id}" name=""/><p:cNvSpPr txBox="1"/><p:nvPr/></p:nvSpPr><p:spPr><a:xfrm><a:off x="{}" y="{}"/><a:ext cx="{}" cy="{}"/></a:xfrm><a:prstGeom prst="rect"><a:avLst/></a:prstGeom>{}</p:spPr><p:txBody><a:bodyPr wrap="none"><a:noAutofit/></a:bodyPr><a:lstStyle/><a:p>{native_runs}</a:p></p:txBody></p:sp>"#,
            emu(bbox.x),
            emu(bbox.y),
            emu(bbox.width.max(1.0)),
            emu(bbox.height.max(1.0)),
            fill_xml(&Paint::None)
        )
    };

    format!("{sp}{outlined_shapes}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn escapes_ampersand_and_angle_brackets() {
        assert_eq!(escape_xml("A & B <tag>"), "A &amp; B &lt;tag&gt;");
    }
}
