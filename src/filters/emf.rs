// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! The EMF (Enhanced Metafile) vector-fallback writer (spec.md §4.8 step
//! 4): a minimal, from-scratch [MS-EMF] encoder covering exactly the
//! record types this crate needs — header, solid brush, rectangle/
//! ellipse/polygon fills, and EOF. Curves are flattened to polylines;
//! there's no vector curve record simple enough to round-trip a cubic
//! Bezier losslessly in EMF, so `EMR_POLYGON` is used uniformly for
//! `PathShape` children.
//!
//! Record layouts follow [MS-EMF] 2.2/2.3 directly (struct field order
//! and sizes); this isn't adapted from any example in the pack, since
//! none of them write EMF — see DESIGN.md.

use pptx_ir::{Ir, PathSegment, Rect};

const EMR_HEADER: u32 = 1;
const EMR_POLYGON: u32 = 3;
const EMR_ELLIPSE: u32 = 42;
const EMR_RECTANGLE: u32 = 43;
const EMR_EOF: u32 = 14;
const EMR_SELECTOBJECT: u32 = 37;
const EMR_CREATEBRUSHINDIRECT: u32 = 39;
const EMR_DELETEOBJECT: u32 = 40;

const BS_SOLID: u32 = 0;
const MM_PER_EMU: f64 = 1.0 / 360_000.0; // EMU -> .01mm (the frame's unit)

fn u32le(out: &mut Vec<u8>, v: u32) {
    out.extend_from_slice(&v.to_le_bytes());
}
fn i32le(out: &mut Vec<u8>, v: i32) {
    out.extend_from_slice(&v.to_le_bytes());
}
fn u16le(out: &mut Vec<u8>, v: u16) {
    out.extend_from_slice(&v.to_le_bytes());
}

fn colorref(color: &pptx_ir::Color) -> [u8; 4] {
    [color.r, color.g, color.b, 0]
}

/// Flattens a cubic Bezier into `STEPS` line segments via the standard
/// parametric subdivision; EMF has no cubic-curve record simple enough
/// to reuse our own `PathSegment` representation directly.
fn flatten_cubic(p0: (f64, f64), p1: (f64, f64), p2: (f64, f64), p3: (f64, f64), out: &mut Vec<(f64, f64)>) {
    const STEPS: usize = 12;
    for i in 1..=STEPS {
        let t = i as f64 / STEPS as f64;
        let mt = 1.0 - t;
        let x = mt * mt * mt * p0.0 + 3.0 * mt * mt * t * p1.0 + 3.0 * mt * t * t * p2.0 + t * t * t * p3.0;
        let y = mt * mt * mt * p0.1 + 3.0 * mt * mt * t * p1.1 + 3.0 * mt * t * t * p2.1 + t * t * t * p3.1;
        out.push((x, y));
    }
}

fn flatten_path(segments: &[PathSegment]) -> Vec<(f64, f64)> {
    let mut points = Vec::new();
    let mut cursor = (0.0, 0.0);
    for seg in segments {
        match *seg {
            PathSegment::MoveTo { x, y } | PathSegment::LineTo { x, y } => {
                points.push((x, y));
                cursor = (x, y);
            }
            PathSegment::CubicTo { x1, y1, x2, y2, x, y } => {
                flatten_cubic(cursor, (x1, y1), (x2, y2), (x, y), &mut points);
                cursor = (x, y);
            }
            PathSegment::Close => {}
        }
    }
    points
}

fn fill_color(ir: &Ir) -> pptx_ir::Color {
    let paint = match ir {
        Ir::Circle { paint, .. } | Ir::Ellipse { paint, .. } | Ir::Rectangle { paint, .. } | Ir::PathShape { paint, .. } => paint,
        _ => &pptx_ir::Paint::None,
    };
    match paint {
        pptx_ir::Paint::Solid(c) => *c,
        _ => pptx_ir::Color::new_rgb(128, 128, 128), // gradients/patterns have no flat EMF analogue
    }
}

fn select_brush(body: &mut Vec<u8>, color: &pptx_ir::Color) -> u32 {
    const HANDLE: u32 = 1;
    // EMR_CREATEBRUSHINDIRECT
    u32le(body, EMR_CREATEBRUSHINDIRECT);
    u32le(body, 24);
    u32le(body, HANDLE);
    u32le(body, BS_SOLID);
    body.extend_from_slice(&colorref(color));
    u32le(body, 0); // lbHatch

    // EMR_SELECTOBJECT
    u32le(body, EMR_SELECTOBJECT);
    u32le(body, 12);
    u32le(body, HANDLE);

    2 // records emitted
}

fn delete_brush(body: &mut Vec<u8>) -> u32 {
    u32le(body, EMR_DELETEOBJECT);
    u32le(body, 12);
    u32le(body, 1);
    1
}

fn emit_rect_box(body: &mut Vec<u8>, kind: u32, to_dev: &dyn Fn(f64, f64) -> (i32, i32), bounds: pptx_ir::Rect) {
    let (l, t) = to_dev(bounds.left(), bounds.top());
    let (r, b) = to_dev(bounds.right(), bounds.bottom());
    u32le(body, kind);
    u32le(body, 24);
    i32le(body, l);
    i32le(body, t);
    i32le(body, r);
    i32le(body, b);
}

fn emit_polygon(body: &mut Vec<u8>, to_dev: &dyn Fn(f64, f64) -> (i32, i32), points: &[(f64, f64)]) {
    if points.len() < 2 {
        return;
    }
    let device: Vec<(i32, i32)> = points.iter().map(|&(x, y)| to_dev(x, y)).collect();
    let (mut min_x, mut min_y, mut max_x, mut max_y) = (i32::MAX, i32::MAX, i32::MIN, i32::MIN);
    for &(x, y) in &device {
        min_x = min_x.min(x);
        min_y = min_y.min(y);
        max_x = max_x.max(x);
        max_y = max_y.max(y);
    }
    u32le(body, EMR_POLYGON);
    u32le(body, (8 + 16 + 4 + device.len() * 8) as u32);
    i32le(body, min_x);
    i32le(body, min_y);
    i32le(body, max_x);
    i32le(body, max_y);
    u32le(body, device.len() as u32);
    for (x, y) in device {
        i32le(body, x);
        i32le(body, y);
    }
}

/// One shape's records; returns how many `EMR_*` records it appended.
fn emit_shape(ir: &Ir, to_dev: &dyn Fn(f64, f64) -> (i32, i32), body: &mut Vec<u8>) -> u32 {
    let mut count = select_brush(body, &fill_color(ir));
    count += match ir {
        Ir::Rectangle { bounds, .. } => {
            emit_rect_box(body, EMR_RECTANGLE, to_dev, *bounds);
            1
        }
        Ir::Circle { center, radius, .. } => {
            emit_rect_box(body, EMR_ELLIPSE, to_dev, Rect::new(center.x - radius, center.y - radius, radius * 2.0, radius * 2.0));
            1
        }
        Ir::Ellipse { center, rx, ry, .. } => {
            emit_rect_box(body, EMR_ELLIPSE, to_dev, Rect::new(center.x - rx, center.y - ry, rx * 2.0, ry * 2.0));
            1
        }
        Ir::PathShape { segments, .. } => {
            let points = flatten_path(segments);
            emit_polygon(body, to_dev, &points);
            1
        }
        _ => 0, // groups/text/images have no single EMF fill primitive; skipped
    };
    count += delete_brush(body);
    count
}

fn push_eof(body: &mut Vec<u8>) {
    u32le(body, EMR_EOF);
    u32le(body, 20);
    u32le(body, 0); // nPalEntries
    u32le(body, 16); // offPalEntries
    u32le(body, 20); // SizeLast
}

fn header(width_px: i32, height_px: i32, frame_cx_01mm: i32, frame_cy_01mm: i32, total_bytes: u32, record_count: u32) -> Vec<u8> {
    let mut h = Vec::with_capacity(88);
    u32le(&mut h, EMR_HEADER);
    u32le(&mut h, 88);
    // rclBounds (device units)
    i32le(&mut h, 0);
    i32le(&mut h, 0);
    i32le(&mut h, width_px);
    i32le(&mut h, height_px);
    // rclFrame (.01mm)
    i32le(&mut h, 0);
    i32le(&mut h, 0);
    i32le(&mut h, frame_cx_01mm);
    i32le(&mut h, frame_cy_01mm);
    h.extend_from_slice(b" EMF"); // dSignature 0x464D4520, little-endian == " EMF"
    u32le(&mut h, 0x0001_0000); // nVersion
    u32le(&mut h, total_bytes);
    u32le(&mut h, record_count);
    u16le(&mut h, 2); // nHandles: slot 0 reserved + our one brush handle
    u16le(&mut h, 0); // sReserved
    u32le(&mut h, 0); // nDescription
    u32le(&mut h, 0); // offDescription
    u32le(&mut h, 0); // nPalEntries
    i32le(&mut h, width_px);
    i32le(&mut h, height_px); // szlDevice
    i32le(&mut h, frame_cx_01mm / 100);
    i32le(&mut h, frame_cy_01mm / 100); // szlMillimeters
    h
}

/// Writes `shapes` (already in the slide's EMU frame) into a standalone
/// EMF byte stream sized to `bounds`. Returns `None` when there's
/// nothing fillable to draw (e.g. all children are text/images/groups).
pub fn write_emf(shapes: &[Ir], bounds: &Rect) -> Option<Vec<u8>> {
    if shapes.is_empty() {
        return None;
    }

    let to_dev = move |x: f64, y: f64| -> (i32, i32) { ((x - bounds.x).round() as i32, (y - bounds.y).round() as i32) };

    let mut body = Vec::new();
    let mut record_count = 1u32; // the header itself counts as a record
    let mut drew_anything = false;
    for shape in shapes {
        let before = body.len();
        let added = emit_shape(shape, &to_dev, &mut body);
        if added > 0 && body.len() > before {
            drew_anything = true;
        }
        record_count += added;
    }
    if !drew_anything {
        return None;
    }

    push_eof(&mut body);
    record_count += 1;

    let width_px = bounds.width.max(1.0).round() as i32;
    let height_px = bounds.height.max(1.0).round() as i32;
    let frame_cx = ((bounds.width.max(1.0)) * MM_PER_EMU * 100.0).round().max(1.0) as i32;
    let frame_cy = ((bounds.height.max(1.0)) * MM_PER_EMU * 100.0).round().max(1.0) as i32;

    let mut out = header(width_px, height_px, frame_cx, frame_cy, (88 + body.len()) as u32, record_count);
    out.extend_from_slice(&body);
    Some(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pptx_ir::{Color, Paint};

    #[test]
    fn writes_a_valid_header_for_a_single_rect() {
        let rect = Ir::Rectangle { bounds: Rect::new(0.0, 0.0, 100.0, 50.0), corner_radius: 0.0, paint: Paint::Solid(Color::BLACK), stroke: None, opacity: 1.0 };
        let bytes = write_emf(&[rect], &Rect::new(0.0, 0.0, 100.0, 50.0)).unwrap();
        assert_eq!(&bytes[0..4], &EMR_HEADER.to_le_bytes());
        assert_eq!(&bytes[40..44], b" EMF");
        let total_len = u32::from_le_bytes(bytes[32..36].try_into().unwrap());
        assert_eq!(total_len as usize, bytes.len());
    }

    #[test]
    fn empty_shape_list_yields_none() {
        assert!(write_emf(&[], &Rect::new(0.0, 0.0, 10.0, 10.0)).is_none());
    }
}
