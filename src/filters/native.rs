// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! The native DrawingML effect rewrite table (spec.md §4.8 step 3): a
//! small set of recognized sub-DAGs, each mapped to one `<a:effectLst>`
//! child. Only chains the Policy Engine already tagged `Native` reach
//! here; anything this table doesn't recognize falls back to the raster
//! tier in the caller.

use pptx_ir::{CompositeOperator, FilterChain, FilterInput, FilterPrimitive};

use crate::dml::{alpha_100000, emu, hex_color};

const EMU_PER_USER_UNIT: f64 = 12_700.0;

/// `feGaussianBlur` alone → `<a:blur>`.
fn single_blur(chain: &FilterChain) -> Option<String> {
    let [FilterPrimitive::GaussianBlur { std_deviation, .. }] = chain.primitives.as_slice() else { return None };
    Some(format!(r#"<a:effectLst><a:blur rad="{}"/></a:effectLst>"#, emu(std_deviation * EMU_PER_USER_UNIT)))
}

/// `feOffset + feGaussianBlur + feFlood + feComposite(in=flood, in2=blur)`
/// in a straight pipeline → `<a:outerShdw>` (spec.md §4.8's drop-shadow
/// rewrite), or a plain `feDropShadow` primitive, which the parser
/// already recognizes as the same shorthand.
fn drop_shadow(chain: &FilterChain) -> Option<String> {
    if let [FilterPrimitive::DropShadow { dx, dy, std_deviation, color, .. }] = chain.primitives.as_slice() {
        return Some(outer_shdw_xml(*dx, *dy, *std_deviation, color));
    }

    let [FilterPrimitive::Offset { dx, dy, .. }, FilterPrimitive::GaussianBlur { std_deviation, .. }, FilterPrimitive::Flood { color }, FilterPrimitive::Composite { operator, .. }] =
        chain.primitives.as_slice()
    else {
        return None;
    };
    if !matches!(operator, CompositeOperator::Over | CompositeOperator::Atop) {
        return None;
    }
    Some(outer_shdw_xml(*dx, *dy, *std_deviation, color))
}

fn outer_shdw_xml(dx: f64, dy: f64, std_deviation: f64, color: &pptx_ir::Color) -> String {
    let dist = emu((dx * dx + dy * dy).sqrt() * EMU_PER_USER_UNIT);
    let dir = crate::dml::angle_60000(dx, dy);
    format!(
        r#"<a:effectLst><a:outerShdw blurRad="{}" dist="{dist}" dir="{dir}" rotWithShape="0"><a:srgbClr val="{}"><a:alpha val="{}"/></a:srgbClr></a:outerShdw></a:effectLst>"#,
        emu(std_deviation * EMU_PER_USER_UNIT),
        hex_color(color),
        alpha_100000(color.a)
    )
}

/// A lone `feColorMatrix type="saturate"` → `<a:duotone>`-free
/// desaturation via `<a:grayscl>`/`<a:duotone>` is not representable in
/// a single attribute; DrawingML's closest native equivalent for a pure
/// saturation scale is `<a:duotone>`'s sibling `<a:grayscl>` only at
/// `s=0`, so only that one case maps natively — finer saturation stays
/// `VectorFallback`.
fn grayscale(chain: &FilterChain) -> Option<String> {
    let [FilterPrimitive::ColorMatrix { matrix, .. }] = chain.primitives.as_slice() else { return None };
    let is_luminance_to_alpha = matrix[15..20] == [0.2126, 0.7152, 0.0722, 0.0, 0.0] && matrix[0..15].iter().all(|v| *v == 0.0);
    if is_luminance_to_alpha {
        return None; // alpha-producing matrices have no native analogue
    }
    let is_full_desaturate = matrix == SATURATE_ZERO;
    is_full_desaturate.then(|| "<a:effectLst><a:grayscl/></a:effectLst>".to_string())
}

const SATURATE_ZERO: [f64; 20] = [
    0.213, 0.715, 0.072, 0.0, 0.0, 0.213, 0.715, 0.072, 0.0, 0.0, 0.213, 0.715, 0.072, 0.0, 0.0, 0.0, 0.0, 0.0, 1.0, 0.0,
];

/// Matches a recognized sub-DAG against the rewrite table, in order.
pub fn effect_list(chain: &FilterChain) -> Option<String> {
    if chain.primitives.is_empty() {
        return None;
    }
    single_blur(chain).or_else(|| drop_shadow(chain)).or_else(|| grayscale(chain))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pptx_ir::Color;

    #[test]
    fn blur_maps_to_a_blur() {
        let chain = FilterChain { primitives: vec![FilterPrimitive::GaussianBlur { input: FilterInput::SourceGraphic, std_deviation: 4.0 }] };
        let xml = effect_list(&chain).unwrap();
        assert!(xml.contains("<a:blur"));
    }

    #[test]
    fn drop_shadow_primitive_maps_to_outer_shdw() {
        let chain = FilterChain {
            primitives: vec![FilterPrimitive::DropShadow { input: FilterInput::SourceGraphic, dx: 3.0, dy: 4.0, std_deviation: 2.0, color: Color::BLACK }],
        };
        let xml = effect_list(&chain).unwrap();
        assert!(xml.contains("<a:outerShdw"));
        // dist = hypot(3, 4) * 12700 = 63500
        assert!(xml.contains(r#"dist="63500""#));
    }

    #[test]
    fn offset_blur_flood_composite_chain_maps_to_outer_shdw() {
        let chain = FilterChain {
            primitives: vec![
                FilterPrimitive::Offset { input: FilterInput::SourceGraphic, dx: 2.0, dy: 2.0 },
                FilterPrimitive::GaussianBlur { input: FilterInput::Named(0), std_deviation: 1.0 },
                FilterPrimitive::Flood { color: Color::BLACK },
                FilterPrimitive::Composite { input: FilterInput::Named(2), input2: FilterInput::Named(1), operator: CompositeOperator::Over, k: [0.0; 4] },
            ],
        };
        assert!(effect_list(&chain).unwrap().contains("<a:outerShdw"));
    }

    #[test]
    fn unrecognized_chain_returns_none() {
        let chain = FilterChain { primitives: vec![FilterPrimitive::Morphology { input: FilterInput::SourceGraphic, operator: pptx_ir::MorphologyOperator::Dilate, radius_x: 1.0, radius_y: 1.0 }] };
        assert!(effect_list(&chain).is_none());
    }
}
