// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Basic-shape → `PathShape`/`Rectangle`/`Circle`/`Ellipse` conversion,
//! including the path-data grammar and the transform special cases from
//! spec.md §4.5 (circle→ellipse promotion, rotated-rect demotion, arc
//! decomposition, quad→cubic promotion).

use pptx_ir::{CoordSpace, Matrix, PathSegment, Point, Rect};

use crate::diagnostics::{Diagnostics, WarningCode};

/// Parses `d` path data into baked (post-CTM) segments. Truncates at the
/// last valid command on malformed data (spec.md §4.5/§7
/// `MalformedPath`); arcs are absorbed into cubic Béziers by
/// `svgtypes::SimplifyingPathParser` itself, quadratics are promoted to
/// cubics here.
pub fn parse_path_data(d: &str, cs: &CoordSpace, diags: &mut Diagnostics, path: &str) -> Vec<PathSegment> {
    let mut segments = Vec::new();
    let mut cursor = (0.0f64, 0.0f64);
    let mut truncated = false;

    for segment in svgtypes::SimplifyingPathParser::from(d) {
        let segment = match segment {
            Ok(v) => v,
            Err(_) => {
                truncated = true;
                break;
            }
        };

        match segment {
            svgtypes::SimplePathSegment::MoveTo { x, y } => {
                let (bx, by) = cs.apply(x, y);
                cursor = (x, y);
                segments.push(PathSegment::MoveTo { x: bx, y: by });
            }
            svgtypes::SimplePathSegment::LineTo { x, y } => {
                let (bx, by) = cs.apply(x, y);
                cursor = (x, y);
                segments.push(PathSegment::LineTo { x: bx, y: by });
            }
            svgtypes::SimplePathSegment::Quadratic { x1, y1, x, y } => {
                // Promote to cubic: C1 = Q0 + 2/3(Q1-Q0), C2 = Q2 + 2/3(Q1-Q2).
                let (qx0, qy0) = cursor;
                let cx1 = qx0 + 2.0 / 3.0 * (x1 - qx0);
                let cy1 = qy0 + 2.0 / 3.0 * (y1 - qy0);
                let cx2 = x + 2.0 / 3.0 * (x1 - x);
                let cy2 = y + 2.0 / 3.0 * (y1 - y);
                let (bx1, by1) = cs.apply(cx1, cy1);
                let (bx2, by2) = cs.apply(cx2, cy2);
                let (bx, by) = cs.apply(x, y);
                cursor = (x, y);
                segments.push(PathSegment::CubicTo { x1: bx1, y1: by1, x2: bx2, y2: by2, x: bx, y: by });
            }
            svgtypes::SimplePathSegment::CurveTo { x1, y1, x2, y2, x, y } => {
                let (bx1, by1) = cs.apply(x1, y1);
                let (bx2, by2) = cs.apply(x2, y2);
                let (bx, by) = cs.apply(x, y);
                cursor = (x, y);
                segments.push(PathSegment::CubicTo { x1: bx1, y1: by1, x2: bx2, y2: by2, x: bx, y: by });
            }
            svgtypes::SimplePathSegment::ClosePath => {
                segments.push(PathSegment::Close);
            }
        }
    }

    if truncated {
        diags.warn(WarningCode::MalformedPath, "path data truncated at last valid command", path);
    }

    // Drop an empty residual: a single `M` (or nothing) with no drawing command.
    let has_drawing_command = segments
        .iter()
        .any(|s| matches!(s, PathSegment::LineTo { .. } | PathSegment::CubicTo { .. } | PathSegment::Close));
    if !has_drawing_command {
        diags.warn(WarningCode::DroppedEmptyPath, "path has no drawing commands", path);
        return Vec::new();
    }

    segments
}

pub fn rect_to_segments(r: Rect, corner_radius: f64) -> Vec<PathSegment> {
    // Only used when a downstream mapper needs outline segments (e.g. a
    // rotated rect demoted to a PathShape uses `rotated_rect_segments`
    // instead); plain axis-aligned rects stay `Rectangle` IR.
    let _ = corner_radius;
    vec![
        PathSegment::MoveTo { x: r.left(), y: r.top() },
        PathSegment::LineTo { x: r.right(), y: r.top() },
        PathSegment::LineTo { x: r.right(), y: r.bottom() },
        PathSegment::LineTo { x: r.left(), y: r.bottom() },
        PathSegment::Close,
    ]
}

/// Demotes a rotated rectangle to four baked line segments, per spec.md
/// §4.5: "if the CTM includes rotation ... demote to a PathShape."
pub fn rotated_rect_segments(local: Rect, ctm: &Matrix) -> Vec<PathSegment> {
    let corners: Vec<Point> = local.corners().iter().map(|p| {
        let (x, y) = ctm.transform_point(p.x, p.y);
        Point::new(x, y)
    }).collect();

    vec![
        PathSegment::MoveTo { x: corners[0].x, y: corners[0].y },
        PathSegment::LineTo { x: corners[1].x, y: corners[1].y },
        PathSegment::LineTo { x: corners[2].x, y: corners[2].y },
        PathSegment::LineTo { x: corners[3].x, y: corners[3].y },
        PathSegment::Close,
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use pptx_ir::CoordSpace;

    #[test]
    fn single_moveto_is_dropped() {
        let cs = CoordSpace::new(Matrix::IDENTITY);
        let mut diags = Diagnostics::new();
        let segs = parse_path_data("M10 10", &cs, &mut diags, "/svg/path[0]");
        assert!(segs.is_empty());
        assert_eq!(diags.warnings().len(), 1);
    }

    #[test]
    fn quad_promotes_to_cubic() {
        let cs = CoordSpace::new(Matrix::IDENTITY);
        let mut diags = Diagnostics::new();
        let segs = parse_path_data("M0 0 Q10 10 20 0", &cs, &mut diags, "/svg/path[0]");
        assert!(matches!(segs[1], PathSegment::CubicTo { .. }));
    }
}
