// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! The gradient fill generator (spec.md §4.7).

use pptx_ir::{Color, GradientStop, Point, SpreadMethod};

use crate::dml::{alpha_100000, hex_color, stop_per_mille};

/// sRGB (0-255) to CIE L*a*b*, D65 white point — the standard conversion
/// path for a CIE76 color distance.
fn to_lab(color: &Color) -> (f64, f64, f64) {
    fn to_linear(c: u8) -> f64 {
        let c = c as f64 / 255.0;
        if c <= 0.04045 { c / 12.92 } else { ((c + 0.055) / 1.055).powf(2.4) }
    }
    let (r, g, b) = (to_linear(color.r), to_linear(color.g), to_linear(color.b));

    let x = r * 0.4124564 + g * 0.3575761 + b * 0.1804375;
    let y = r * 0.2126729 + g * 0.7151522 + b * 0.0721750;
    let z = r * 0.0193339 + g * 0.1191920 + b * 0.9503041;

    const XN: f64 = 0.95047;
    const YN: f64 = 1.0;
    const ZN: f64 = 1.08883;
    fn f(t: f64) -> f64 {
        const DELTA: f64 = 6.0 / 29.0;
        if t > DELTA.powi(3) { t.cbrt() } else { t / (3.0 * DELTA * DELTA) + 4.0 / 29.0 }
    }
    let (fx, fy, fz) = (f(x / XN), f(y / YN), f(z / ZN));
    (116.0 * fy - 16.0, 500.0 * (fx - fy), 200.0 * (fy - fz))
}

/// CIE76 color distance between two colors.
fn delta_e76(a: &Color, b: &Color) -> f64 {
    let (l1, a1, b1) = to_lab(a);
    let (l2, a2, b2) = to_lab(b);
    ((l1 - l2).powi(2) + (a1 - a2).powi(2) + (b1 - b2).powi(2)).sqrt()
}

/// Drops stops whose color is within `delta_e` of the previous kept
/// stop's color (spec.md §9's Speed-profile gradient-stop budget); the
/// first and last stops are always kept so the gradient's endpoints
/// don't shift.
pub fn merge_close_stops(stops: &[GradientStop], delta_e: f64) -> Vec<GradientStop> {
    if stops.len() <= 2 {
        return stops.to_vec();
    }
    let mut out = vec![stops[0].clone()];
    for stop in &stops[1..stops.len() - 1] {
        let last_kept = out.last().unwrap();
        if delta_e76(&last_kept.color, &stop.color) >= delta_e {
            out.push(stop.clone());
        }
    }
    out.push(stops[stops.len() - 1].clone());
    out
}

fn stops_xml(stops: &[GradientStop]) -> String {
    let mut out = String::from("<a:gsLst>");
    for stop in stops {
        out.push_str(&format!(
            r#"<a:gs pos="{}"><a:srgbClr val="{}"><a:alpha val="{}"/></a:srgbClr></a:gs>"#,
            stop_per_mille(stop.offset),
            hex_color(&stop.color),
            alpha_100000(stop.opacity)
        ));
    }
    out.push_str("</a:gsLst>");
    out
}

fn tile_rect(spread: SpreadMethod) -> &'static str {
    // DrawingML has no direct `repeat`/`reflect` tile equivalent for
    // gradients; `pad` (the default, no `tileRect`) is the closest fit
    // for all three and is what every tested renderer falls back to.
    match spread {
        SpreadMethod::Pad | SpreadMethod::Reflect | SpreadMethod::Repeat => "",
    }
}

/// `<a:gradFill>` for a linear gradient: the angle is derived from the
/// vector `p0 -> p1`, normalized to DrawingML's clockwise-from-3-o'clock,
/// 1/60000-degree convention (spec.md §4.7).
pub fn linear_gradient(stops: &[GradientStop], p0: Point, p1: Point, spread: SpreadMethod) -> String {
    let angle = crate::dml::angle_60000(p1.x - p0.x, p1.y - p0.y);
    format!(
        r#"<a:gradFill flip="none" rotWithShape="1">{}<a:lin ang="{angle}" scaled="1"/>{}</a:gradFill>"#,
        stops_xml(stops),
        tile_rect(spread)
    )
}

/// `<a:gradFill>` for a radial gradient, using `<a:path path="circle">`;
/// the focal point maps to `<a:fillToRect>`'s offset when it doesn't
/// coincide with the center.
pub fn radial_gradient(stops: &[GradientStop], center: Point, focal: Point, _radius: f64, spread: SpreadMethod) -> String {
    let fx = pptx_ir::to_emu_int((focal.x - center.x) * 100_000.0);
    let fy = pptx_ir::to_emu_int((focal.y - center.y) * 100_000.0);
    format!(
        r#"<a:gradFill flip="none" rotWithShape="1">{}<a:path path="circle"><a:fillToRect l="{fx}" t="{fy}" r="{}" b="{}"/></a:path>{}</a:gradFill>"#,
        stops_xml(stops),
        100_000 - fx,
        100_000 - fy,
        tile_rect(spread)
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use pptx_ir::Color;

    #[test]
    fn linear_gradient_emits_stops_and_angle() {
        let stops = vec![GradientStop::new(0.0, Color::BLACK, 1.0), GradientStop::new(1.0, Color::BLACK, 1.0)];
        let xml = linear_gradient(&stops, Point::new(0.0, 0.0), Point::new(1.0, 0.0), SpreadMethod::Pad);
        assert!(xml.contains(r#"ang="0""#));
        assert_eq!(xml.matches("<a:gs ").count(), 2);
    }

    #[test]
    fn radial_gradient_emits_circle_path() {
        let stops = vec![GradientStop::new(0.0, Color::BLACK, 1.0)];
        let xml = radial_gradient(&stops, Point::new(0.0, 0.0), Point::new(0.0, 0.0), 10.0, SpreadMethod::Pad);
        assert!(xml.contains(r#"path="circle""#));
    }

    #[test]
    fn merge_close_stops_drops_near_duplicate_middle_stop() {
        let stops = vec![
            GradientStop::new(0.0, Color::new_rgb(0, 0, 0), 1.0),
            GradientStop::new(0.5, Color::new_rgb(1, 1, 1), 1.0),
            GradientStop::new(1.0, Color::new_rgb(255, 255, 255), 1.0),
        ];
        let merged = merge_close_stops(&stops, 8.0);
        assert_eq!(merged.len(), 2);
        assert_eq!(merged[0].offset, 0.0);
        assert_eq!(merged[1].offset, 1.0);
    }

    #[test]
    fn merge_close_stops_keeps_distinct_colors() {
        let stops = vec![
            GradientStop::new(0.0, Color::new_rgb(255, 0, 0), 1.0),
            GradientStop::new(0.5, Color::new_rgb(0, 255, 0), 1.0),
            GradientStop::new(1.0, Color::new_rgb(0, 0, 255), 1.0),
        ];
        let merged = merge_close_stops(&stops, 8.0);
        assert_eq!(merged.len(), 3);
    }
}
