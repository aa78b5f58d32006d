// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! `linearGradient`/`radialGradient`/`pattern` → [`Paint`] (spec.md §3.2).

use std::collections::HashMap;
use std::str::FromStr;

use pptx_ir::{Color, GradientStop, Paint, Point, SpreadMethod};

use crate::document::{NodeExt, XmlNode};

fn parse_color(value: &str) -> Option<Color> {
    let c = svgtypes::Color::from_str(value.trim()).ok()?;
    Some(Color::new_rgb(c.red, c.green, c.blue).with_alpha(c.alpha as f64 / 255.0))
}

/// Reads `stop-color`/`stop-opacity` from a `<stop>` element, honoring an
/// inline `style=""` override the same way presentation attributes do.
fn convert_stop(node: XmlNode) -> GradientStop {
    let offset = node
        .attr("offset")
        .and_then(|v| svgtypes::Length::from_str(v).ok())
        .map(|l| if l.unit == svgtypes::LengthUnit::Percent { l.number / 100.0 } else { l.number })
        .unwrap_or(0.0);

    let style = node.attr("style").map(parse_inline_style).unwrap_or_default();

    let color_str = style.get("stop-color").map(|s| s.as_str()).or_else(|| node.attr("stop-color"));
    let color = color_str.and_then(parse_color).unwrap_or(Color::BLACK);

    let opacity_str = style.get("stop-opacity").map(|s| s.as_str()).or_else(|| node.attr("stop-opacity"));
    let opacity = opacity_str.and_then(|v| v.trim().parse::<f64>().ok()).unwrap_or(1.0);

    GradientStop::new(offset, color, opacity)
}

fn parse_inline_style(value: &str) -> HashMap<String, String> {
    let mut out = HashMap::new();
    for decl in simplecss::DeclarationTokenizer::from(value) {
        out.insert(decl.name.to_string(), decl.value.to_string());
    }
    out
}

fn collect_stops(node: XmlNode) -> Vec<GradientStop> {
    let mut stops: Vec<GradientStop> = node
        .children()
        .filter(|n| n.is_svg_element("stop"))
        .map(convert_stop)
        .collect();
    pptx_ir::sort_stops(&mut stops);
    stops
}

/// Resolves a gradient/pattern referenced by `xlink:href`/`href`,
/// following the chain up to a depth cap to guard against cycles
/// (mirrors the teacher's `href_iter`).
fn follow_href<'a, 'input>(node: XmlNode<'a, 'input>, id_map: &HashMap<String, XmlNode<'a, 'input>>) -> Option<XmlNode<'a, 'input>> {
    let mut cur = node;
    for _ in 0..32 {
        match cur.href() {
            Some(href) => {
                let id = href.trim_start_matches('#');
                match id_map.get(id) {
                    Some(&next) => cur = next,
                    None => return Some(cur),
                }
            }
            None => return Some(cur),
        }
    }
    None
}

fn spread_method(node: XmlNode) -> SpreadMethod {
    match node.attr("spreadMethod") {
        Some("reflect") => SpreadMethod::Reflect,
        Some("repeat") => SpreadMethod::Repeat,
        _ => SpreadMethod::Pad,
    }
}

fn number_or_percent(node: XmlNode, name: &str, default: f64, base: f64) -> f64 {
    match node.attr(name).and_then(|v| svgtypes::Length::from_str(v).ok()) {
        Some(l) if l.unit == svgtypes::LengthUnit::Percent => l.number / 100.0 * base,
        Some(l) => l.number,
        None => default,
    }
}

/// Converts a gradient element (resolving `xlink:href` stop inheritance)
/// into a `Paint`. Object-bounding-box gradients are resolved against
/// `bbox` (already in the slide frame, since IR carries no transform).
pub fn convert_gradient(
    node: XmlNode,
    id_map: &HashMap<String, XmlNode>,
    bbox: pptx_ir::Rect,
) -> Option<Paint> {
    let stop_source = follow_href(node, id_map).unwrap_or(node);
    let mut stops = collect_stops(stop_source);
    if stops.is_empty() {
        return None;
    }
    if stops.len() == 1 {
        return Some(Paint::Solid(stops[0].color.with_alpha(stops[0].opacity)));
    }

    let object_bbox = node.attr("gradientUnits") != Some("userSpaceOnUse");
    let (base_x, base_y, base_w, base_h) = if object_bbox {
        (bbox.x, bbox.y, bbox.width, bbox.height)
    } else {
        (0.0, 0.0, 1.0, 1.0)
    };

    match node.tag_name().name() {
        "linearGradient" => {
            let x1 = base_x + number_or_percent(node, "x1", 0.0, base_w);
            let y1 = base_y + number_or_percent(node, "y1", 0.0, base_h);
            let x2 = base_x + number_or_percent(node, "x2", if object_bbox { base_w } else { base_w }, base_w);
            let y2 = base_y + number_or_percent(node, "y2", 0.0, base_h);
            Some(Paint::LinearGradient {
                stops,
                p0: Point::new(x1, y1),
                p1: Point::new(x2, y2),
                spread: spread_method(node),
            })
        }
        "radialGradient" => {
            let cx = base_x + number_or_percent(node, "cx", base_w / 2.0, base_w);
            let cy = base_y + number_or_percent(node, "cy", base_h / 2.0, base_h);
            let r = number_or_percent(node, "r", base_w.min(base_h) / 2.0, base_w.min(base_h));
            if r <= 0.0 {
                stops.sort_by(|a, b| a.offset.partial_cmp(&b.offset).unwrap());
                let last = stops.last().unwrap();
                return Some(Paint::Solid(last.color.with_alpha(last.opacity)));
            }
            let fx = base_x + number_or_percent(node, "fx", cx - base_x, base_w);
            let fy = base_y + number_or_percent(node, "fy", cy - base_y, base_h);
            Some(Paint::RadialGradient {
                stops,
                center: Point::new(cx, cy),
                focal: Point::new(fx, fy),
                radius: r,
                spread: spread_method(node),
            })
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_stop_becomes_solid() {
        let xml = "<linearGradient xmlns=\"http://www.w3.org/2000/svg\"><stop offset=\"0\" stop-color=\"#ff0000\"/></linearGradient>";
        let doc = roxmltree::Document::parse(xml).unwrap();
        let node = doc.root_element();
        let id_map = HashMap::new();
        let paint = convert_gradient(node, &id_map, pptx_ir::Rect::new(0.0, 0.0, 10.0, 10.0)).unwrap();
        assert!(matches!(paint, Paint::Solid(_)));
    }
}
