// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! `<clipPath>` (and `<mask>`, degraded per spec.md §4.5) → [`ClipPath`].

use pptx_ir::{ClipPath, CoordSpace, FillRule, Ir, Matrix, Paint};

use crate::diagnostics::Diagnostics;
use crate::document::{NodeExt, XmlNode};
use crate::shapes::parse_path_data;

/// Converts a `<clipPath>` element's children into clip-mask shapes.
/// `userSpaceOnUse` is assumed unless `clipPathUnits="objectBoundingBox"`,
/// in which case the caller's element bbox matrix must already be baked
/// into `ctm` before calling this.
pub fn convert_clip_path(node: XmlNode, ctm: &Matrix, diags: &mut Diagnostics) -> ClipPath {
    let cs = CoordSpace::new(*ctm);
    let mut shapes = Vec::new();

    for child in node.children().filter(|n| n.is_element()) {
        if let Some(ir) = convert_clip_shape(child, &cs, diags) {
            shapes.push(ir);
        }
    }

    let rule = match node.attr("clip-rule") {
        Some("evenodd") => FillRule::EvenOdd,
        _ => FillRule::NonZero,
    };

    ClipPath::Shapes { shapes, rule }
}

fn convert_clip_shape(node: XmlNode, cs: &CoordSpace, diags: &mut Diagnostics) -> Option<Ir> {
    let path = node.path();
    match node.tag_name().name() {
        "rect" => {
            let x: f64 = node.attr("x").and_then(|v| v.parse().ok()).unwrap_or(0.0);
            let y: f64 = node.attr("y").and_then(|v| v.parse().ok()).unwrap_or(0.0);
            let w: f64 = node.attr("width").and_then(|v| v.parse().ok()).unwrap_or(0.0);
            let h: f64 = node.attr("height").and_then(|v| v.parse().ok()).unwrap_or(0.0);
            if w <= 0.0 || h <= 0.0 {
                return None;
            }
            let bounds = cs.current_ctm().transform_rect_bbox(&pptx_ir::Rect::new(x, y, w, h));
            Some(Ir::Rectangle { bounds, corner_radius: 0.0, paint: Paint::Solid(pptx_ir::Color::BLACK), stroke: None, opacity: 1.0 })
        }
        "circle" => {
            let cx: f64 = node.attr("cx").and_then(|v| v.parse().ok()).unwrap_or(0.0);
            let cy: f64 = node.attr("cy").and_then(|v| v.parse().ok()).unwrap_or(0.0);
            let r: f64 = node.attr("r").and_then(|v| v.parse().ok()).unwrap_or(0.0);
            if r <= 0.0 {
                return None;
            }
            let (bx, by) = cs.apply(cx, cy);
            Some(Ir::Circle { center: pptx_ir::Point::new(bx, by), radius: r, paint: Paint::Solid(pptx_ir::Color::BLACK), stroke: None, opacity: 1.0 })
        }
        "path" => {
            let d = node.attr("d")?;
            let segments = parse_path_data(d, cs, diags, &path);
            if segments.is_empty() {
                return None;
            }
            Some(Ir::PathShape { segments, paint: Paint::Solid(pptx_ir::Color::BLACK), stroke: None, opacity: 1.0, fill_rule: FillRule::NonZero })
        }
        _ => None,
    }
}
