// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! The Filter Pipeline (spec.md §4.8): a `FilterChain` is already a DAG
//! keyed by result name (built by the parser, spec.md §3.2); here it's
//! policy-tagged and turned into either a native DrawingML effect list,
//! an EMF vector fallback, or a rasterized bitmap.

pub mod emf;
pub mod native;

use pptx_ir::{FilterChain, Ir, Rect};

use crate::config::Config;
use crate::policy::{self, Strategy};
use crate::raster;

/// What the group mapper should splice into the element for a filter.
pub enum FilterOutcome {
    /// An `<a:effectLst>` fragment to place inside the element's `<p:spPr>`.
    Native(String),
    /// An EMF part's bytes plus the bounds it covers; the caller embeds
    /// it and references it from a `<p:pic>` in place of the element.
    Vector(Vec<u8>, Rect),
    /// A rasterized PNG plus the bounds it covers, same shape as `Vector`.
    Raster(Vec<u8>, Rect),
    /// The chain had a circular reference (spec.md §4.8's fatal case);
    /// the element is emitted unfiltered.
    None,
}

/// Applies a filter chain to a group's rendered children (spec.md §4.8).
pub fn apply(children: &[Ir], chain: &FilterChain, config: &Config, px_per_emu: f64) -> FilterOutcome {
    if has_circular_reference(chain) {
        log::warn!("filter chain has a circular result reference; element emitted unfiltered");
        return FilterOutcome::None;
    }

    match policy::decide_filter(chain, config) {
        Strategy::Native => match native::effect_list(chain) {
            Some(xml) => FilterOutcome::Native(xml),
            None => raster_fallback(children, config, px_per_emu),
        },
        Strategy::VectorFallback => {
            let bounds = crate::clip::union_bounds(children);
            match emf::write_emf(children, &bounds) {
                Some(bytes) => FilterOutcome::Vector(bytes, bounds),
                None => raster_fallback(children, config, px_per_emu),
            }
        }
        Strategy::Raster => raster_fallback(children, config, px_per_emu),
    }
}

fn raster_fallback(children: &[Ir], _config: &Config, px_per_emu: f64) -> FilterOutcome {
    let bounds = crate::clip::union_bounds(children);
    match raster::rasterize(children, bounds, px_per_emu) {
        Some(bytes) => FilterOutcome::Raster(bytes, bounds),
        None => FilterOutcome::None,
    }
}

/// A named `result` may only be referenced by a primitive declared after
/// it (spec.md §4.8's acyclic-by-construction rule); `Named(idx)` with
/// `idx >= position` would require a forward reference, which is the
/// circular case this chain type structurally can't otherwise express.
fn has_circular_reference(chain: &FilterChain) -> bool {
    use pptx_ir::{FilterInput, FilterPrimitive};
    for (i, p) in chain.primitives.iter().enumerate() {
        let inputs: Vec<FilterInput> = match p {
            FilterPrimitive::GaussianBlur { input, .. }
            | FilterPrimitive::Offset { input, .. }
            | FilterPrimitive::ColorMatrix { input, .. }
            | FilterPrimitive::Morphology { input, .. }
            | FilterPrimitive::DropShadow { input, .. } => vec![*input],
            FilterPrimitive::Composite { input, input2, .. } => vec![*input, *input2],
            FilterPrimitive::DisplacementMap { input, input2, .. } => vec![*input, *input2],
            FilterPrimitive::Merge { inputs } => inputs.clone(),
            FilterPrimitive::Turbulence { .. } | FilterPrimitive::Flood { .. } | FilterPrimitive::Image { .. } => vec![],
        };
        for input in inputs {
            if let FilterInput::Named(idx) = input {
                if idx >= i {
                    return true;
                }
            }
        }
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;
    use pptx_ir::{Color, FilterInput, FilterPrimitive, Paint, Rect as R};

    fn blur_chain() -> FilterChain {
        FilterChain { primitives: vec![FilterPrimitive::GaussianBlur { input: FilterInput::SourceGraphic, std_deviation: 2.0 }] }
    }

    fn rect() -> Ir {
        Ir::Rectangle { bounds: R::new(0.0, 0.0, 10.0, 10.0), corner_radius: 0.0, paint: Paint::Solid(Color::BLACK), stroke: None, opacity: 1.0 }
    }

    #[test]
    fn native_blur_produces_effect_list() {
        let config = Config::default();
        match apply(&[rect()], &blur_chain(), &config, 1.0) {
            FilterOutcome::Native(xml) => assert!(xml.contains("a:blur")),
            _ => panic!("expected native outcome"),
        }
    }

    #[test]
    fn forward_reference_is_circular() {
        let chain = FilterChain { primitives: vec![FilterPrimitive::Offset { input: FilterInput::Named(0), dx: 1.0, dy: 1.0 }] };
        let config = Config::default();
        assert!(matches!(apply(&[rect()], &chain, &config, 1.0), FilterOutcome::None));
    }
}
