// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! The path mapper (spec.md §4.7, §4.5): `<a:custGeom>` with a
//! `<a:pathLst>`. IR coordinates live in the slide's EMU frame; DrawingML
//! custom geometry wants its own local 0-21600 coordinate system plus an
//! `<a:xfrm>` offset/extent that places and scales it back.

use pptx_ir::{PathSegment, Paint, Rect, Stroke};

use super::paint::{apply_opacity, fill_xml, stroke_xml};
use crate::dml::emu;
use pptx_ir::to_emu_int;

const LOCAL_SIZE: f64 = 21600.0;

pub(crate) fn bbox(segments: &[PathSegment]) -> Rect {
    let mut min_x = f64::MAX;
    let mut min_y = f64::MAX;
    let mut max_x = f64::MIN;
    let mut max_y = f64::MIN;
    let mut touch = |x: f64, y: f64| {
        min_x = min_x.min(x);
        min_y = min_y.min(y);
        max_x = max_x.max(x);
        max_y = max_y.max(y);
    };
    for seg in segments {
        match *seg {
            PathSegment::MoveTo { x, y } | PathSegment::LineTo { x, y } => touch(x, y),
            PathSegment::CubicTo { x1, y1, x2, y2, x, y } => {
                touch(x1, y1);
                touch(x2, y2);
                touch(x, y);
            }
            PathSegment::Close => {}
        }
    }
    if min_x > max_x {
        return Rect::new(0.0, 0.0, 0.0, 0.0);
    }
    Rect::new(min_x, min_y, max_x - min_x, max_y - min_y)
}

/// Rescales a path's segments from the slide EMU frame into the
/// `0..LOCAL_SIZE` local coordinate system `<a:custGeom>` expects.
fn to_local(segments: &[PathSegment], bounds: &Rect) -> Vec<PathSegment> {
    let sx = if bounds.width > 0.0 { LOCAL_SIZE / bounds.width } else { 0.0 };
    let sy = if bounds.height > 0.0 { LOCAL_SIZE / bounds.height } else { 0.0 };
    let map = |x: f64, y: f64| ((x - bounds.x) * sx, (y - bounds.y) * sy);
    segments
        .iter()
        .map(|seg| match *seg {
            PathSegment::MoveTo { x, y } => {
                let (x, y) = map(x, y);
                PathSegment::MoveTo { x, y }
            }
            PathSegment::LineTo { x, y } => {
                let (x, y) = map(x, y);
                PathSegment::LineTo { x, y }
            }
            PathSegment::CubicTo { x1, y1, x2, y2, x, y } => {
                let (x1, y1) = map(x1, y1);
                let (x2, y2) = map(x2, y2);
                let (x, y) = map(x, y);
                PathSegment::CubicTo { x1, y1, x2, y2, x, y }
            }
            PathSegment::Close => PathSegment::Close,
        })
        .collect()
}

fn segments_xml(segments: &[PathSegment]) -> String {
    let mut out = String::new();
    let mut open = false;
    for seg in segments {
        match *seg {
            PathSegment::MoveTo { x, y } => {
                if open {
                    out.push_str("</a:path>");
                }
                out.push_str(&format!(
                    r#"<a:path w="{}" h="{}"><a:moveTo><a:pt x="{}" y="{}"/></a:moveTo>"#,
                    LOCAL_SIZE as i64,
                    LOCAL_SIZE as i64,
                    to_emu_int(x),
                    to_emu_int(y)
                ));
                open = true;
            }
            PathSegment::LineTo { x, y } => {
                out.push_str(&format!(r#"<a:lnTo><a:pt x="{}" y="{}"/></a:lnTo>"#, to_emu_int(x), to_emu_int(y)));
            }
            PathSegment::CubicTo { x1, y1, x2, y2, x, y } => {
                out.push_str(&format!(
                    r#"<a:cubicBezTo><a:pt x="{}" y="{}"/><a:pt x="{}" y="{}"/><a:pt x="{}" y="{}"/></a:cubicBezTo>"#,
                    to_emu_int(x1),
                    to_emu_int(y1),
                    to_emu_int(x2),
                    to_emu_int(y2),
                    to_emu_int(x),
                    to_emu_int(y)
                ));
            }
            PathSegment::Close => out.push_str("<a:close/>"),
        }
    }
    if open {
        out.push_str("</a:path>");
    }
    out
}

/// Maps a path shape to `<p:sp>` with `<a:custGeom>` geometry (spec.md §4.7).
pub fn map_path(
    id: u32,
    segments: &[PathSegment],
    paint: &Paint,
    stroke: &Option<Stroke>,
    opacity: f64,
) -> String {
    let bounds = bbox(segments);
    let local = to_local(segments, &bounds);
    let paint = apply_opacity(paint, opacity);
    let stroke = stroke.as_ref().map(|s| Stroke { paint: apply_opacity(&s.paint, opacity), ..s.clone() });

    format!(
        r#"<p:sp><p:nvSpPr><p:cNvPr id="{id}" name=""/><p:cNvSpPr/><p:nvPr/></p:nvSpPr><p:spPr><a:xfrm><a:off x="{}" y="{}"/><a:ext cx="{}" cy="{}"/></a:xfrm><a:custGeom><a:avLst/><a:gdLst/><a:ahLst/><a:cxnLst/><a:rect l="0" t="0" r="0" b="0"/><a:pathLst>{}</a:pathLst></a:custGeom>{}{}</p:spPr></p:sp>"#,
        emu(bounds.x),
        emu(bounds.y),
        emu(bounds.width.max(1.0)),
        emu(bounds.height.max(1.0)),
        segments_xml(&local),
        fill_xml(&paint),
        stroke_xml(&stroke, 1.0)
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use pptx_ir::Color;

    fn triangle() -> Vec<PathSegment> {
        vec![
            PathSegment::MoveTo { x: 0.0, y: 0.0 },
            PathSegment::LineTo { x: 10.0, y: 0.0 },
            PathSegment::LineTo { x: 5.0, y: 10.0 },
            PathSegment::Close,
        ]
    }

    #[test]
    fn maps_to_cust_geom_with_local_coordinates() {
        let xml = map_path(2, &triangle(), &Paint::Solid(Color::BLACK), &None, 1.0);
        assert!(xml.contains("custGeom"));
        assert!(xml.contains(r#"<a:pt x="21600" y="0"/>"#));
        assert!(xml.contains("<a:close/>"));
    }

    #[test]
    fn xfrm_reflects_bounding_box() {
        let xml = map_path(2, &triangle(), &Paint::Solid(Color::BLACK), &None, 1.0);
        assert!(xml.contains(r#"<a:off x="0" y="0"/>"#));
    }
}
