// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! `<text>`/`<tspan>` → [`Ir::TextRun`] (spec.md §3.2).
//!
//! Font matching and subsetting belong to the Font Service at mapping
//! time; this module only resolves the *requested* family/weight/style
//! and the run's string content, normalizing `xml:space` the way the
//! teacher's `usvg-parser/src/text/mod.rs` does.

use std::str::FromStr;

use pptx_ir::{Color, CoordSpace, FontStyle, FontVariant, Ir, Paint, Point, Rect, TextRunSpan};

use crate::diagnostics::{Diagnostics, WarningCode};
use crate::document::{NodeExt, XmlNode};

fn xml_space_preserve(node: XmlNode) -> bool {
    let mut cur = Some(node);
    while let Some(n) = cur {
        if let Some(v) = n.attribute(("http://www.w3.org/XML/1998/namespace", "space")) {
            return v == "preserve";
        }
        cur = n.parent_element();
    }
    false
}

/// Collapses interior whitespace runs to a single space and trims the
/// ends, unless `xml:space="preserve"` is in effect (spec.md §6.2).
fn normalize_whitespace(text: &str, preserve: bool) -> String {
    if preserve {
        return text.replace('\n', " ").replace('\t', " ");
    }
    let mut out = String::with_capacity(text.len());
    let mut last_was_space = true; // trims the leading edge
    for c in text.chars() {
        let is_space = c.is_whitespace();
        if is_space {
            if !last_was_space {
                out.push(' ');
            }
        } else {
            out.push(c);
        }
        last_was_space = is_space;
    }
    if out.ends_with(' ') {
        out.pop();
    }
    out
}

fn font_variant(node: XmlNode) -> FontVariant {
    let family = inherited_attr(node, "font-family").unwrap_or_else(|| "sans-serif".to_string());
    let weight = match inherited_attr(node, "font-weight").as_deref() {
        Some("bold") => 700,
        Some("normal") | None => 400,
        Some(n) => n.parse().unwrap_or(400),
    };
    let style = match inherited_attr(node, "font-style").as_deref() {
        Some("italic") => FontStyle::Italic,
        Some("oblique") => FontStyle::Oblique,
        _ => FontStyle::Normal,
    };
    FontVariant { family, weight, style }
}

fn inherited_attr(node: XmlNode, name: &str) -> Option<String> {
    let mut cur = Some(node);
    while let Some(n) = cur {
        if let Some(v) = n.attribute(name) {
            return Some(v.to_string());
        }
        cur = n.parent_element();
    }
    None
}

fn font_size_pt(node: XmlNode, dpi: f64, root_font_size_px: f64) -> f64 {
    let px = inherited_attr(node, "font-size")
        .and_then(|v| v.trim().trim_end_matches("px").parse::<f64>().ok())
        .unwrap_or(root_font_size_px);
    px * 72.0 / dpi
}

fn fill_paint(node: XmlNode) -> Paint {
    match inherited_attr(node, "fill").as_deref() {
        Some("none") => Paint::None,
        Some(v) => svgtypes::Color::from_str(v).ok().map(|c| Paint::Solid(Color::new_rgb(c.red, c.green, c.blue))).unwrap_or(Paint::Solid(Color::BLACK)),
        None => Paint::Solid(Color::BLACK),
    }
}

/// Converts a `<text>` element (and its `<tspan>` children) into one
/// `Ir::TextRun`. Each run's position is the baked `x`/`y` of the
/// `<text>` element itself; spec.md scopes per-`tspan` repositioning out
/// (see `SPEC_FULL.md` non-goals) so nested `tspan` coordinates are
/// ignored and only their text/style are read.
pub fn convert_text(node: XmlNode, cs: &CoordSpace, dpi: f64, root_font_size_px: f64, diags: &mut Diagnostics) -> Option<Ir> {
    let path = node.path();
    let preserve = xml_space_preserve(node);

    let mut runs = Vec::new();
    collect_runs(node, preserve, dpi, root_font_size_px, &mut runs);

    if runs.is_empty() || runs.iter().all(|r| r.text.is_empty()) {
        diags.warn(WarningCode::DroppedEmptyText, "text element has no content", path);
        return None;
    }

    let x: f64 = node.attr("x").and_then(|v| v.parse().ok()).unwrap_or(0.0);
    let y: f64 = node.attr("y").and_then(|v| v.parse().ok()).unwrap_or(0.0);
    let (bx, by) = cs.apply(x, y);
    let position = Point::new(bx, by);

    // Conservative bbox: one line, width estimated at 0.6em per char, a
    // common fallback for renderers without shaping available at parse
    // time (the Font Service refines this once a face is resolved).
    let total_chars: f64 = runs.iter().map(|r| r.text.chars().count() as f64).sum();
    let max_size_pt = runs.iter().map(|r| r.size_pt).fold(0.0_f64, f64::max);
    let width_px = total_chars * max_size_pt * (dpi / 72.0) * 0.6;
    let height_px = max_size_pt * (dpi / 72.0) * 1.2;
    let bbox_local = Rect::new(x, y - max_size_pt * (dpi / 72.0), width_px, height_px);
    let bbox = cs.current_ctm().transform_rect_bbox(&bbox_local);

    Some(Ir::TextRun { position, runs, bbox })
}

fn collect_runs(node: XmlNode, preserve: bool, dpi: f64, root_font_size_px: f64, out: &mut Vec<TextRunSpan>) {
    for child in node.children() {
        if child.is_text() {
            if let Some(text) = child.text() {
                let text = normalize_whitespace(text, preserve);
                if !text.is_empty() {
                    let font = font_variant(node);
                    let bold = font.weight >= 700;
                    let italic = matches!(font.style, FontStyle::Italic | FontStyle::Oblique);
                    out.push(TextRunSpan {
                        text,
                        font,
                        size_pt: font_size_pt(node, dpi, root_font_size_px),
                        fill: fill_paint(node),
                        bold,
                        italic,
                    });
                }
            }
        } else if child.is_svg_element("tspan") {
            let child_preserve = child.attribute(("http://www.w3.org/XML/1998/namespace", "space")).map(|v| v == "preserve").unwrap_or(preserve);
            collect_runs(child, child_preserve, dpi, root_font_size_px, out);
        }
        // textPath is out of scope (spec.md Non-goals: text-on-path).
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pptx_ir::Matrix;

    #[test]
    fn collapses_interior_whitespace() {
        assert_eq!(normalize_whitespace("  hello   world  ", false), "hello world");
    }

    #[test]
    fn preserve_keeps_whitespace() {
        assert_eq!(normalize_whitespace("  hello   world  ", true), "  hello   world  ");
    }

    #[test]
    fn simple_text_produces_one_run() {
        let xml = r#"<text xmlns="http://www.w3.org/2000/svg" x="10" y="20" font-size="12">Hello</text>"#;
        let doc = roxmltree::Document::parse(xml).unwrap();
        let cs = CoordSpace::new(Matrix::IDENTITY);
        let mut diags = Diagnostics::new();
        let ir = convert_text(doc.root_element(), &cs, 96.0, 16.0, &mut diags).unwrap();
        match ir {
            Ir::TextRun { runs, position, .. } => {
                assert_eq!(runs.len(), 1);
                assert_eq!(runs[0].text, "Hello");
                assert_eq!(position, Point::new(10.0, 20.0));
            }
            _ => panic!("expected TextRun"),
        }
    }

    #[test]
    fn empty_text_is_dropped() {
        let xml = r#"<text xmlns="http://www.w3.org/2000/svg" x="0" y="0"></text>"#;
        let doc = roxmltree::Document::parse(xml).unwrap();
        let cs = CoordSpace::new(Matrix::IDENTITY);
        let mut diags = Diagnostics::new();
        assert!(convert_text(doc.root_element(), &cs, 96.0, 16.0, &mut diags).is_none());
        assert_eq!(diags.warnings().len(), 1);
    }
}
