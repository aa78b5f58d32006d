// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! `<filter>` primitive recognition (spec.md §3.2, §4.8).
//!
//! Inputs are resolved by `result` name against a table of primitives
//! already converted earlier in document order; since a primitive can
//! only reference a `result` defined by an *earlier* sibling (or
//! `SourceGraphic`/`SourceAlpha`), the representation is structurally
//! acyclic — the `CyclicReference` case in spec.md §4.8 would require a
//! forward reference, which this resolution rejects by falling back to
//! `SourceGraphic` with a warning.

use std::collections::HashMap;
use std::str::FromStr;

use pptx_ir::{ChannelSelector, Color, CompositeOperator, FilterChain, FilterInput, FilterPrimitive, MorphologyOperator};

use crate::diagnostics::{Diagnostics, WarningCode};
use crate::document::{NodeExt, XmlNode};

fn resolve_input(name: Option<&str>, results: &HashMap<String, usize>, is_first: bool) -> FilterInput {
    match name {
        Some("SourceGraphic") | None if is_first => FilterInput::SourceGraphic,
        Some("SourceAlpha") => FilterInput::SourceAlpha,
        Some("SourceGraphic") => FilterInput::SourceGraphic,
        Some(n) => results.get(n).map(|&i| FilterInput::Named(i)).unwrap_or(FilterInput::SourceGraphic),
        None => FilterInput::SourceGraphic, // implicit: previous primitive's result, approximated as SourceGraphic when absent
    }
}

fn num_attr(node: XmlNode, name: &str, default: f64) -> f64 {
    node.attr(name).and_then(|v| v.trim().parse().ok()).unwrap_or(default)
}

/// Converts a `<filter>` element's primitive children into a
/// [`FilterChain`]. Unknown primitives are skipped with a warning and do
/// not fail the chain (spec.md §7 `FilterUnsupported`).
pub fn convert_filter(node: XmlNode, diags: &mut Diagnostics) -> FilterChain {
    let mut primitives = Vec::new();
    let mut results: HashMap<String, usize> = HashMap::new();
    let path = node.path();

    for (i, child) in node.children().filter(|n| n.is_element()).enumerate() {
        let is_first = i == 0;
        let input = resolve_input(child.attr("in"), &results, is_first);
        let tag = child.tag_name().name();

        let primitive = match tag {
            "feGaussianBlur" => Some(FilterPrimitive::GaussianBlur {
                input,
                std_deviation: num_attr(child, "stdDeviation", 0.0),
            }),
            "feOffset" => Some(FilterPrimitive::Offset {
                input,
                dx: num_attr(child, "dx", 0.0),
                dy: num_attr(child, "dy", 0.0),
            }),
            "feColorMatrix" => Some(FilterPrimitive::ColorMatrix { input, matrix: parse_color_matrix(child) }),
            "feComposite" => {
                let input2 = resolve_input(child.attr("in2"), &results, false);
                let operator = match child.attr("operator") {
                    Some("in") => CompositeOperator::In,
                    Some("out") => CompositeOperator::Out,
                    Some("atop") => CompositeOperator::Atop,
                    Some("xor") => CompositeOperator::Xor,
                    Some("arithmetic") => CompositeOperator::Arithmetic,
                    _ => CompositeOperator::Over,
                };
                let k = [
                    num_attr(child, "k1", 0.0),
                    num_attr(child, "k2", 0.0),
                    num_attr(child, "k3", 0.0),
                    num_attr(child, "k4", 0.0),
                ];
                Some(FilterPrimitive::Composite { input, input2, operator, k })
            }
            "feMerge" => {
                let inputs = child
                    .children()
                    .filter(|n| n.is_svg_element("feMergeNode"))
                    .map(|n| resolve_input(n.attr("in"), &results, false))
                    .collect();
                Some(FilterPrimitive::Merge { inputs })
            }
            "feMorphology" => {
                let operator = if child.attr("operator") == Some("dilate") {
                    MorphologyOperator::Dilate
                } else {
                    MorphologyOperator::Erode
                };
                let (rx, ry) = parse_radius_pair(child.attr("radius").unwrap_or("0"));
                Some(FilterPrimitive::Morphology { input, operator, radius_x: rx, radius_y: ry })
            }
            "feTurbulence" => Some(FilterPrimitive::Turbulence {
                base_frequency_x: parse_radius_pair(child.attr("baseFrequency").unwrap_or("0")).0,
                base_frequency_y: parse_radius_pair(child.attr("baseFrequency").unwrap_or("0")).1,
                num_octaves: child.attr("numOctaves").and_then(|v| v.parse().ok()).unwrap_or(1),
                seed: child.attr("seed").and_then(|v| v.parse().ok()).unwrap_or(0),
                fractal_noise: child.attr("type") == Some("fractalNoise"),
            }),
            "feDropShadow" => Some(FilterPrimitive::DropShadow {
                input,
                dx: num_attr(child, "dx", 2.0),
                dy: num_attr(child, "dy", 2.0),
                std_deviation: num_attr(child, "stdDeviation", 2.0),
                color: child.attr("flood-color").and_then(|v| svgtypes::Color::from_str(v).ok())
                    .map(|c| Color::new_rgb(c.red, c.green, c.blue))
                    .unwrap_or(Color::BLACK),
            }),
            "feFlood" => Some(FilterPrimitive::Flood {
                color: child.attr("flood-color").and_then(|v| svgtypes::Color::from_str(v).ok())
                    .map(|c| Color::new_rgb(c.red, c.green, c.blue))
                    .unwrap_or(Color::BLACK),
            }),
            "feImage" => Some(FilterPrimitive::Image { href: child.href().unwrap_or("").to_string() }),
            "feDisplacementMap" => {
                let input2 = resolve_input(child.attr("in2"), &results, false);
                Some(FilterPrimitive::DisplacementMap {
                    input,
                    input2,
                    scale: num_attr(child, "scale", 0.0),
                    x_channel_selector: parse_channel_selector(child.attr("xChannelSelector")),
                    y_channel_selector: parse_channel_selector(child.attr("yChannelSelector")),
                })
            }
            _ => {
                diags.warn(WarningCode::FilterUnsupported, format!("unknown filter primitive <{}>, treated as no-op", tag), path.clone());
                None
            }
        };

        if let Some(p) = primitive {
            let idx = primitives.len();
            primitives.push(p);
            if let Some(result) = child.attr("result") {
                results.insert(result.to_string(), idx);
            }
        }
    }

    FilterChain { primitives }
}

fn parse_color_matrix(node: XmlNode) -> [f64; 20] {
    const IDENTITY: [f64; 20] = [
        1.0, 0.0, 0.0, 0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 0.0, 0.0, 1.0, 0.0,
    ];
    match node.attr("type").unwrap_or("matrix") {
        "matrix" => {
            let values = node.attr("values").unwrap_or("");
            let nums: Vec<f64> = values.split_whitespace().filter_map(|v| v.parse().ok()).collect();
            if nums.len() == 20 {
                let mut out = [0.0; 20];
                out.copy_from_slice(&nums);
                out
            } else {
                IDENTITY
            }
        }
        "saturate" => {
            let s: f64 = node.attr("values").and_then(|v| v.trim().parse().ok()).unwrap_or(1.0);
            [
                0.213 + 0.787 * s, 0.715 - 0.715 * s, 0.072 - 0.072 * s, 0.0, 0.0,
                0.213 - 0.213 * s, 0.715 + 0.285 * s, 0.072 - 0.072 * s, 0.0, 0.0,
                0.213 - 0.213 * s, 0.715 - 0.715 * s, 0.072 + 0.928 * s, 0.0, 0.0,
                0.0, 0.0, 0.0, 1.0, 0.0,
            ]
        }
        "luminanceToAlpha" => [
            0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.2126, 0.7152, 0.0722,
            0.0, 0.0,
        ],
        _ => IDENTITY, // hueRotate folded into matrix form at authoring time is uncommon; fall back to identity.
    }
}

fn parse_channel_selector(value: Option<&str>) -> ChannelSelector {
    match value {
        Some("R") => ChannelSelector::R,
        Some("G") => ChannelSelector::G,
        Some("B") => ChannelSelector::B,
        Some("A") => ChannelSelector::A,
        _ => ChannelSelector::A,
    }
}

fn parse_radius_pair(value: &str) -> (f64, f64) {
    let mut it = value.split_whitespace().filter_map(|v| v.parse::<f64>().ok());
    let x = it.next().unwrap_or(0.0);
    let y = it.next().unwrap_or(x);
    (x, y)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recognizes_blur_chain() {
        let xml = r#"<filter xmlns="http://www.w3.org/2000/svg"><feGaussianBlur stdDeviation="3"/></filter>"#;
        let doc = roxmltree::Document::parse(xml).unwrap();
        let mut diags = Diagnostics::new();
        let chain = convert_filter(doc.root_element(), &mut diags);
        assert_eq!(chain.primitives.len(), 1);
        assert!(matches!(chain.primitives[0], FilterPrimitive::GaussianBlur { .. }));
    }

    #[test]
    fn recognizes_displacement_map() {
        let xml = r#"<filter xmlns="http://www.w3.org/2000/svg"><feDisplacementMap in="SourceGraphic" in2="SourceGraphic" scale="20" xChannelSelector="R" yChannelSelector="G"/></filter>"#;
        let doc = roxmltree::Document::parse(xml).unwrap();
        let mut diags = Diagnostics::new();
        let chain = convert_filter(doc.root_element(), &mut diags);
        assert_eq!(chain.primitives.len(), 1);
        assert!(matches!(chain.primitives[0], FilterPrimitive::DisplacementMap { .. }));
    }

    #[test]
    fn unknown_primitive_warns_and_is_skipped() {
        let xml = r#"<filter xmlns="http://www.w3.org/2000/svg"><feUnknownThing/></filter>"#;
        let doc = roxmltree::Document::parse(xml).unwrap();
        let mut diags = Diagnostics::new();
        let chain = convert_filter(doc.root_element(), &mut diags);
        assert!(chain.primitives.is_empty());
        assert_eq!(diags.warnings().len(), 1);
    }
}
