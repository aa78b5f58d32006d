// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Shared fill/stroke emission for the shape and path mappers
//! (spec.md §4.7).

use pptx_ir::{GradientStop, LineCap, LineJoin, Paint, Stroke};

use super::gradient;
use crate::config::{Config, OutputTarget};
use crate::dml::{alpha_100000, hex_color};

/// Merges near-duplicate adjacent gradient stops under the `Speed`
/// profile (spec.md §9's open question on the Speed profile's
/// gradient-stop budget, `Config::gradient_merge_delta_e`); every other
/// profile and every non-gradient paint passes through unchanged.
pub fn merge_for_speed(paint: &Paint, config: &Config) -> Paint {
    if config.output_target != OutputTarget::Speed {
        return paint.clone();
    }
    match paint {
        Paint::LinearGradient { stops, p0, p1, spread } => Paint::LinearGradient {
            stops: gradient::merge_close_stops(stops, config.gradient_merge_delta_e),
            p0: *p0,
            p1: *p1,
            spread: *spread,
        },
        Paint::RadialGradient { stops, center, focal, radius, spread } => Paint::RadialGradient {
            stops: gradient::merge_close_stops(stops, config.gradient_merge_delta_e),
            center: *center,
            focal: *focal,
            radius: *radius,
            spread: *spread,
        },
        other => other.clone(),
    }
}

/// Folds an element's own `opacity` into its paint's alpha, since
/// DrawingML has no separate shape-opacity attribute on `<p:spPr>`
/// (spec.md §4.7: opacity is carried on the paint all the way to XML).
pub fn apply_opacity(paint: &Paint, opacity: f64) -> Paint {
    if opacity >= 1.0 {
        return paint.clone();
    }
    match paint {
        Paint::Solid(color) => Paint::Solid(color.with_alpha(color.a * opacity)),
        Paint::LinearGradient { stops, p0, p1, spread } => {
            Paint::LinearGradient { stops: scale_stops(stops, opacity), p0: *p0, p1: *p1, spread: *spread }
        }
        Paint::RadialGradient { stops, center, focal, radius, spread } => Paint::RadialGradient {
            stops: scale_stops(stops, opacity),
            center: *center,
            focal: *focal,
            radius: *radius,
            spread: *spread,
        },
        Paint::Pattern { .. } | Paint::None => paint.clone(),
    }
}

fn scale_stops(stops: &[GradientStop], opacity: f64) -> Vec<GradientStop> {
    stops.iter().map(|s| GradientStop::new(s.offset, s.color, s.opacity * opacity)).collect()
}

/// `<a:solidFill>`/`<a:gradFill>`/nothing for `Paint::None`. Pattern
/// paints degrade to a solid fill of their first stop-like color is not
/// representable without a rasterized tile (spec.md §4.9's raster tier
/// handles that case instead); here a neutral gray stands in so the
/// shape is still visible if a mapper reaches this path unexpectedly.
pub fn fill_xml(paint: &Paint) -> String {
    match paint {
        Paint::None => String::new(),
        Paint::Solid(color) => format!(
            r#"<a:solidFill><a:srgbClr val="{}"><a:alpha val="{}"/></a:srgbClr></a:solidFill>"#,
            hex_color(color),
            alpha_100000(color.a)
        ),
        Paint::LinearGradient { stops, p0, p1, spread } => gradient::linear_gradient(stops, *p0, *p1, *spread),
        Paint::RadialGradient { stops, center, focal, radius, spread } => {
            gradient::radial_gradient(stops, *center, *focal, *radius, *spread)
        }
        Paint::Pattern { .. } => r#"<a:solidFill><a:srgbClr val="A0A0A0"/></a:solidFill>"#.to_string(),
    }
}

fn cap_attr(cap: LineCap) -> &'static str {
    match cap {
        LineCap::Butt => "flat",
        LineCap::Round => "rnd",
        LineCap::Square => "sq",
    }
}

fn join_xml(join: LineJoin, miter_limit: f64) -> String {
    match join {
        LineJoin::Miter => format!(r#"<a:miter lim="{}"/>"#, (miter_limit * 1000.0).round() as i64),
        LineJoin::Round => "<a:round/>".to_string(),
        LineJoin::Bevel => "<a:bevel/>".to_string(),
    }
}

fn dash_xml(dash: &[f64]) -> String {
    if dash.is_empty() {
        return String::new();
    }
    // DrawingML has no arbitrary custom-dash primitive comparable to
    // SVG's `stroke-dasharray`; `dash` (preset) is the closest widely
    // supported approximation.
    let _ = dash;
    r#"<a:prstDash val="dash"/>"#.to_string()
}

/// `<a:ln>` for a stroke, or nothing when there's no stroke / it's
/// `Paint::None`.
pub fn stroke_xml(stroke: &Option<Stroke>, emu_per_unit: f64) -> String {
    let Some(stroke) = stroke else { return String::new() };
    if matches!(stroke.paint, Paint::None) {
        return String::new();
    }
    let width_emu = (stroke.width * emu_per_unit).round() as i64;
    format!(
        r#"<a:ln w="{width_emu}" cap="{}">{}{}{}</a:ln>"#,
        cap_attr(stroke.cap),
        fill_xml(&stroke.paint),
        dash_xml(&stroke.dash),
        join_xml(stroke.join, stroke.miter_limit)
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use pptx_ir::Color;

    #[test]
    fn none_paint_is_empty() {
        assert_eq!(fill_xml(&Paint::None), "");
    }

    #[test]
    fn solid_paint_emits_srgb_and_alpha() {
        let xml = fill_xml(&Paint::Solid(Color::new_rgb(255, 0, 0)));
        assert!(xml.contains("FF0000"));
        assert!(xml.contains("100000"));
    }

    #[test]
    fn stroke_none_is_empty() {
        assert_eq!(stroke_xml(&None, 1.0), "");
    }
}
