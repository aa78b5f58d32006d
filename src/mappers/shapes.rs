// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Circle/Ellipse/Rectangle mappers (spec.md §4.7): all three reduce to
//! `<a:prstGeom>` plus an `<a:xfrm>` derived from the bounding rect.

use pptx_ir::{Paint, Point, Rect, Stroke};

use super::paint::{apply_opacity, fill_xml, stroke_xml};
use crate::dml::emu;

fn xfrm(bounds: &Rect) -> String {
    format!(
        r#"<a:xfrm><a:off x="{}" y="{}"/><a:ext cx="{}" cy="{}"/></a:xfrm>"#,
        emu(bounds.x),
        emu(bounds.y),
        emu(bounds.width.max(1.0)),
        emu(bounds.height.max(1.0))
    )
}

fn sp_pr(bounds: &Rect, prst: &str, adj: &str, paint: &Paint, stroke: &Option<Stroke>) -> String {
    format!(
        r#"<p:spPr>{}<a:prstGeom prst="{prst}"><a:avLst>{adj}</a:avLst></a:prstGeom>{}{}</p:spPr>"#,
        xfrm(bounds),
        fill_xml(paint),
        stroke_xml(stroke, 1.0)
    )
}

fn sp_shell(id: u32, name: &str, body_pr: &str) -> (String, String) {
    let nv = format!(
        r#"<p:nvSpPr><p:cNvPr id="{id}" name="{name}"/><p:cNvSpPr/><p:nvPr/></p:nvSpPr>"#
    );
    (nv, body_pr.to_string())
}

pub fn map_circle(id: u32, center: Point, radius: f64, paint: &Paint, stroke: &Option<Stroke>, opacity: f64) -> String {
    let bounds = Rect::new(center.x - radius, center.y - radius, radius * 2.0, radius * 2.0);
    map_ellipse_like(id, &bounds, paint, stroke, opacity)
}

pub fn map_ellipse(id: u32, center: Point, rx: f64, ry: f64, paint: &Paint, stroke: &Option<Stroke>, opacity: f64) -> String {
    let bounds = Rect::new(center.x - rx, center.y - ry, rx * 2.0, ry * 2.0);
    map_ellipse_like(id, &bounds, paint, stroke, opacity)
}

fn map_ellipse_like(id: u32, bounds: &Rect, paint: &Paint, stroke: &Option<Stroke>, opacity: f64) -> String {
    let paint = apply_opacity(paint, opacity);
    let stroke = apply_opacity_to_stroke(stroke, opacity);
    let (nv, body) = sp_shell(id, "", &sp_pr(bounds, "ellipse", "", &paint, &stroke));
    format!("<p:sp>{nv}{body}</p:sp>")
}

pub fn map_rectangle(id: u32, bounds: &Rect, corner_radius: f64, paint: &Paint, stroke: &Option<Stroke>, opacity: f64) -> String {
    let (prst, adj) = if corner_radius > 0.0 {
        let shortest = bounds.width.min(bounds.height).max(1.0);
        let fraction = (corner_radius / (shortest / 2.0)).clamp(0.0, 1.0);
        ("roundRect", format!(r#"<a:gd name="adj" fmla="val {}"/>"#, (fraction * 50_000.0).round() as i64))
    } else {
        ("rect", String::new())
    };
    let paint = apply_opacity(paint, opacity);
    let stroke = apply_opacity_to_stroke(stroke, opacity);
    let (nv, body) = sp_shell(id, "", &sp_pr(bounds, prst, &adj, &paint, &stroke));
    format!("<p:sp>{nv}{body}</p:sp>")
}

fn apply_opacity_to_stroke(stroke: &Option<Stroke>, opacity: f64) -> Option<Stroke> {
    stroke.as_ref().map(|s| Stroke { paint: apply_opacity(&s.paint, opacity), ..s.clone() })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pptx_ir::Color;

    #[test]
    fn circle_emits_ellipse_preset() {
        let xml = map_circle(2, Point::new(10.0, 10.0), 5.0, &Paint::Solid(Color::BLACK), &None, 1.0);
        assert!(xml.contains(r#"prst="ellipse""#));
        assert!(xml.contains(r#"cx="10""#));
    }

    #[test]
    fn rounded_rect_uses_round_rect_preset() {
        let bounds = Rect::new(0.0, 0.0, 100.0, 50.0);
        let xml = map_rectangle(2, &bounds, 10.0, &Paint::Solid(Color::BLACK), &None, 1.0);
        assert!(xml.contains(r#"prst="roundRect""#));
    }

    #[test]
    fn flat_rect_uses_rect_preset() {
        let bounds = Rect::new(0.0, 0.0, 100.0, 50.0);
        let xml = map_rectangle(2, &bounds, 0.0, &Paint::Solid(Color::BLACK), &None, 1.0);
        assert!(xml.contains(r#"prst="rect""#));
    }

    #[test]
    fn shape_opacity_folds_into_fill_alpha() {
        let bounds = Rect::new(0.0, 0.0, 100.0, 50.0);
        let xml = map_rectangle(2, &bounds, 0.0, &Paint::Solid(Color::BLACK), &None, 0.5);
        assert!(xml.contains(r#"<a:alpha val="50000"/>"#));
        assert!(!xml.contains("extLst"));
    }
}
