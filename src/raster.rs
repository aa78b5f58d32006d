// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! The offscreen rasterizer backing the Raster fallback tier for groups,
//! filters and clips (spec.md §4.6, §4.8, §4.9). Mirrors the teacher's
//! `resvg` render module: `tiny_skia::Pixmap` plus one `render_*`
//! function per IR shape kind, walked recursively for groups.

use pptx_ir::{FillRule, Ir, Paint, PathSegment, Stroke};
use tiny_skia::{FillRule as SkFillRule, Paint as SkPaint, Path, PathBuilder, Pixmap, Stroke as SkStroke, Transform};

/// Renders `elements` into a pixmap sized to `bounds` at `px_per_emu`,
/// returning encoded PNG bytes. Used both for "rasterize this group" and
/// for the Raster fallback tier of filters/clips.
pub fn rasterize(elements: &[Ir], bounds: pptx_ir::Rect, px_per_emu: f64) -> Option<Vec<u8>> {
    render_to_pixmap(elements, bounds, px_per_emu)?.encode_png().ok()
}

/// Same rendering as [`rasterize`] but returns the pixmap itself instead
/// of encoded PNG bytes, so the clip adapter can composite a mask onto it
/// before encoding (spec.md §4.9's raster tier; mirrors the teacher's own
/// `clip::apply`, which also renders into a scratch pixmap before masking).
pub fn render_to_pixmap(elements: &[Ir], bounds: pptx_ir::Rect, px_per_emu: f64) -> Option<Pixmap> {
    let width = (bounds.width * px_per_emu).ceil().max(1.0) as u32;
    let height = (bounds.height * px_per_emu).ceil().max(1.0) as u32;
    let mut pixmap = Pixmap::new(width, height)?;
    let transform = Transform::from_translate(-bounds.x as f32, -bounds.y as f32)
        .post_scale(px_per_emu as f32, px_per_emu as f32);

    for ir in elements {
        render_ir(ir, transform, &mut pixmap.as_mut());
    }

    Some(pixmap)
}

fn render_ir(ir: &Ir, transform: Transform, pixmap: &mut tiny_skia::PixmapMut) {
    match ir {
        Ir::Circle { center, radius, paint, stroke, opacity } => {
            if let Some(path) = circle_path(center.x, center.y, *radius) {
                fill_and_stroke(&path, paint, stroke, *opacity, transform, pixmap);
            }
        }
        Ir::Ellipse { center, rx, ry, paint, stroke, opacity } => {
            if let Some(path) = ellipse_path(center.x, center.y, *rx, *ry) {
                fill_and_stroke(&path, paint, stroke, *opacity, transform, pixmap);
            }
        }
        Ir::Rectangle { bounds, corner_radius, paint, stroke, opacity } => {
            if let Some(path) = rect_path(bounds, *corner_radius) {
                fill_and_stroke(&path, paint, stroke, *opacity, transform, pixmap);
            }
        }
        Ir::PathShape { segments, paint, stroke, opacity, fill_rule } => {
            if let Some(path) = path_from_segments(segments) {
                fill_and_stroke_rule(&path, paint, stroke, *opacity, *fill_rule, transform, pixmap);
            }
        }
        Ir::Group { children, opacity, .. } => {
            // Opacity groups are approximated by applying the group's
            // opacity to each child's own paint; a true isolated layer
            // would need an intermediate pixmap, which the teacher's own
            // renderer uses `push_layer`/`pop_layer` for (out of scope
            // here — see DESIGN.md).
            for child in children {
                let mut child = child.clone();
                scale_child_opacity(&mut child, *opacity);
                render_ir(&child, transform, pixmap);
            }
        }
        Ir::TextRun { bbox, .. } => {
            // Outlining text requires the Font Service; the raster path
            // approximates with a neutral placeholder box so layout is
            // still visible (spec.md §4.10's Outline policy handles the
            // non-raster case properly).
            if let Some(path) = rect_path(bbox, 0.0) {
                let mut paint = SkPaint::default();
                paint.set_color_rgba8(128, 128, 128, 64);
                pixmap.fill_path(&path, &paint, SkFillRule::Winding, transform, None);
            }
        }
        Ir::Image { .. } => {
            // Re-decoding arbitrary embedded image formats for raster
            // compositing needs an image codec this crate doesn't carry;
            // images keep their own `<p:pic>` part instead of being
            // flattened here (see DESIGN.md).
        }
    }
}

/// Multiplies `ir`'s own opacity by `factor`; used both when flattening a
/// `Group`'s opacity into its children here and by the group mapper doing
/// the same for a `<p:grpSp>`'s children (DrawingML has no single-alpha
/// group container, spec.md §4.7).
pub(crate) fn scale_child_opacity(ir: &mut Ir, factor: f64) {
    match ir {
        Ir::Circle { opacity, .. }
        | Ir::Ellipse { opacity, .. }
        | Ir::Rectangle { opacity, .. }
        | Ir::PathShape { opacity, .. }
        | Ir::Group { opacity, .. } => *opacity *= factor,
        Ir::TextRun { .. } | Ir::Image { .. } => {}
    }
}

fn circle_path(cx: f64, cy: f64, r: f64) -> Option<Path> {
    ellipse_path(cx, cy, r, r)
}

fn ellipse_path(cx: f64, cy: f64, rx: f64, ry: f64) -> Option<Path> {
    let mut pb = PathBuilder::new();
    // Four-Bezier-arc approximation, kappa = 0.5522847498.
    const K: f64 = 0.5522847498307936;
    let (cx, cy, rx, ry) = (cx as f32, cy as f32, rx as f32, ry as f32);
    let (kx, ky) = ((rx as f64 * K) as f32, (ry as f64 * K) as f32);
    pb.move_to(cx + rx, cy);
    pb.cubic_to(cx + rx, cy + ky, cx + kx, cy + ry, cx, cy + ry);
    pb.cubic_to(cx - kx, cy + ry, cx - rx, cy + ky, cx - rx, cy);
    pb.cubic_to(cx - rx, cy - ky, cx - kx, cy - ry, cx, cy - ry);
    pb.cubic_to(cx + kx, cy - ry, cx + rx, cy - ky, cx + rx, cy);
    pb.close();
    pb.finish()
}

fn rect_path(bounds: &pptx_ir::Rect, corner_radius: f64) -> Option<Path> {
    let mut pb = PathBuilder::new();
    if corner_radius <= 0.0 {
        pb.push_rect(tiny_skia::Rect::from_xywh(bounds.x as f32, bounds.y as f32, bounds.width as f32, bounds.height as f32)?);
    } else {
        let r = corner_radius.min(bounds.width / 2.0).min(bounds.height / 2.0) as f32;
        let (x, y, w, h) = (bounds.x as f32, bounds.y as f32, bounds.width as f32, bounds.height as f32);
        pb.move_to(x + r, y);
        pb.line_to(x + w - r, y);
        pb.quad_to(x + w, y, x + w, y + r);
        pb.line_to(x + w, y + h - r);
        pb.quad_to(x + w, y + h, x + w - r, y + h);
        pb.line_to(x + r, y + h);
        pb.quad_to(x, y + h, x, y + h - r);
        pb.line_to(x, y + r);
        pb.quad_to(x, y, x + r, y);
        pb.close();
    }
    pb.finish()
}

fn path_from_segments(segments: &[PathSegment]) -> Option<Path> {
    let mut pb = PathBuilder::new();
    for seg in segments {
        match *seg {
            PathSegment::MoveTo { x, y } => pb.move_to(x as f32, y as f32),
            PathSegment::LineTo { x, y } => pb.line_to(x as f32, y as f32),
            PathSegment::CubicTo { x1, y1, x2, y2, x, y } => {
                pb.cubic_to(x1 as f32, y1 as f32, x2 as f32, y2 as f32, x as f32, y as f32)
            }
            PathSegment::Close => pb.close(),
        }
    }
    pb.finish()
}

fn sk_paint(paint: &Paint, opacity: f64) -> Option<SkPaint<'static>> {
    let mut sk = SkPaint::default();
    sk.anti_alias = true;
    match paint {
        Paint::Solid(color) => {
            let a = (color.a * opacity).clamp(0.0, 1.0);
            sk.set_color_rgba8(color.r, color.g, color.b, (a * 255.0).round() as u8);
        }
        Paint::LinearGradient { stops, p0, p1, spread } => {
            let sk_stops: Vec<_> = stops
                .iter()
                .map(|s| {
                    tiny_skia::GradientStop::new(
                        s.offset as f32,
                        tiny_skia::Color::from_rgba8(s.color.r, s.color.g, s.color.b, ((s.color.a * s.opacity * opacity).clamp(0.0, 1.0) * 255.0) as u8),
                    )
                })
                .collect();
            sk.shader = tiny_skia::LinearGradient::new(
                tiny_skia::Point::from_xy(p0.x as f32, p0.y as f32),
                tiny_skia::Point::from_xy(p1.x as f32, p1.y as f32),
                sk_stops,
                sk_spread(*spread),
                Transform::identity(),
            )?;
        }
        Paint::RadialGradient { stops, center, focal, radius, spread } => {
            let sk_stops: Vec<_> = stops
                .iter()
                .map(|s| {
                    tiny_skia::GradientStop::new(
                        s.offset as f32,
                        tiny_skia::Color::from_rgba8(s.color.r, s.color.g, s.color.b, ((s.color.a * s.opacity * opacity).clamp(0.0, 1.0) * 255.0) as u8),
                    )
                })
                .collect();
            sk.shader = tiny_skia::RadialGradient::new(
                tiny_skia::Point::from_xy(focal.x as f32, focal.y as f32),
                tiny_skia::Point::from_xy(center.x as f32, center.y as f32),
                *radius as f32,
                sk_stops,
                sk_spread(*spread),
                Transform::identity(),
            )?;
        }
        Paint::Pattern { .. } => {
            // Arbitrary tile content needs its own render pass; approximate
            // with a mid-gray fill rather than drop the shape entirely.
            sk.set_color_rgba8(160, 160, 160, (opacity * 255.0) as u8);
        }
        Paint::None => return None,
    }
    Some(sk)
}

fn sk_spread(spread: pptx_ir::SpreadMethod) -> tiny_skia::SpreadMode {
    match spread {
        pptx_ir::SpreadMethod::Pad => tiny_skia::SpreadMode::Pad,
        pptx_ir::SpreadMethod::Reflect => tiny_skia::SpreadMode::Reflect,
        pptx_ir::SpreadMethod::Repeat => tiny_skia::SpreadMode::Repeat,
    }
}

fn fill_and_stroke(path: &Path, paint: &Paint, stroke: &Option<Stroke>, opacity: f64, transform: Transform, pixmap: &mut tiny_skia::PixmapMut) {
    fill_and_stroke_rule(path, paint, stroke, opacity, FillRule::NonZero, transform, pixmap);
}

fn fill_and_stroke_rule(
    path: &Path,
    paint: &Paint,
    stroke: &Option<Stroke>,
    opacity: f64,
    rule: FillRule,
    transform: Transform,
    pixmap: &mut tiny_skia::PixmapMut,
) {
    if let Some(sk) = sk_paint(paint, opacity) {
        let rule = match rule {
            FillRule::NonZero => SkFillRule::Winding,
            FillRule::EvenOdd => SkFillRule::EvenOdd,
        };
        pixmap.fill_path(path, &sk, rule, transform, None);
    }
    if let Some(stroke) = stroke {
        if let Some(sk) = sk_paint(&stroke.paint, opacity) {
            let sk_stroke = SkStroke { width: stroke.width as f32, miter_limit: stroke.miter_limit as f32, ..Default::default() };
            pixmap.stroke_path(path, &sk, &sk_stroke, transform, None);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pptx_ir::{Color, Rect};

    #[test]
    fn rasterizes_a_solid_rectangle() {
        let rect = Ir::Rectangle {
            bounds: Rect::new(0.0, 0.0, 10.0, 10.0),
            corner_radius: 0.0,
            paint: Paint::Solid(Color::BLACK),
            stroke: None,
            opacity: 1.0,
        };
        let png = rasterize(&[rect], Rect::new(0.0, 0.0, 10.0, 10.0), 1.0);
        assert!(png.is_some());
        assert!(!png.unwrap().is_empty());
    }
}
