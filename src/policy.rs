// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! The Policy Engine (spec.md §4.6): picks a rendering strategy per
//! element/subsystem. Decisions are monotone within a profile — the
//! same input always escalates in the same direction, never oscillates.

use pptx_ir::{ClipPath, FilterChain, FilterInput, FilterPrimitive};

use crate::config::{Config, OutputTarget};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Strategy {
    Native,
    VectorFallback,
    Raster,
}

/// Per-profile knobs that aren't already exposed as user overrides
/// (spec.md §4.6's profile table).
struct ProfileTuning {
    gradient_stop_limit: usize,
    filter_complexity_limit: usize,
    clip_segment_limit: usize,
}

fn tuning(config: &Config) -> ProfileTuning {
    let base = &config.thresholds;
    match config.output_target {
        OutputTarget::Speed => ProfileTuning {
            gradient_stop_limit: base.max_gradient_stops.min(6),
            filter_complexity_limit: base.max_filter_complexity.min(4),
            clip_segment_limit: base.max_clip_segments.min(32),
        },
        OutputTarget::Balanced => ProfileTuning {
            gradient_stop_limit: base.max_gradient_stops,
            filter_complexity_limit: base.max_filter_complexity,
            clip_segment_limit: base.max_clip_segments,
        },
        OutputTarget::Quality => ProfileTuning {
            gradient_stop_limit: base.max_gradient_stops * 2,
            filter_complexity_limit: base.max_filter_complexity + 2,
            clip_segment_limit: base.max_clip_segments * 2,
        },
        OutputTarget::Compatibility => ProfileTuning {
            gradient_stop_limit: base.max_gradient_stops.min(4),
            filter_complexity_limit: 1,
            clip_segment_limit: base.max_clip_segments.min(16),
        },
    }
}

const NATIVE_PRIMITIVES: &[&str] = &["GaussianBlur", "Offset", "DropShadow", "Flood", "Composite"];

fn primitive_name(p: &FilterPrimitive) -> &'static str {
    match p {
        FilterPrimitive::GaussianBlur { .. } => "GaussianBlur",
        FilterPrimitive::Offset { .. } => "Offset",
        FilterPrimitive::ColorMatrix { .. } => "ColorMatrix",
        FilterPrimitive::Composite { .. } => "Composite",
        FilterPrimitive::Merge { .. } => "Merge",
        FilterPrimitive::Morphology { .. } => "Morphology",
        FilterPrimitive::Turbulence { .. } => "Turbulence",
        FilterPrimitive::DropShadow { .. } => "DropShadow",
        FilterPrimitive::Flood { .. } => "Flood",
        FilterPrimitive::Image { .. } => "Image",
        FilterPrimitive::DisplacementMap { .. } => "DisplacementMap",
    }
}

/// True when the chain is a straight pipeline: each primitive (after the
/// first) consumes only the immediately preceding result, never an
/// arbitrary named one (spec.md §4.6: "no named-input fan-out").
fn is_straight_pipeline(chain: &FilterChain) -> bool {
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
            match input {
                FilterInput::SourceGraphic | FilterInput::SourceAlpha => {}
                FilterInput::Named(idx) if i > 0 && idx == i - 1 => {}
                FilterInput::Named(_) => return false,
            }
        }
    }
    true
}

fn has_no_vector_equivalent(chain: &FilterChain) -> bool {
    chain
        .primitives
        .iter()
        .any(|p| matches!(p, FilterPrimitive::Turbulence { .. } | FilterPrimitive::DisplacementMap { .. }))
}

/// Decides a filter chain's strategy (spec.md §4.6).
pub fn decide_filter(chain: &FilterChain, config: &Config) -> Strategy {
    let t = tuning(config);
    let all_native = chain.primitives.iter().all(|p| NATIVE_PRIMITIVES.contains(&primitive_name(p)));

    if all_native && is_straight_pipeline(chain) && chain.primitives.len() <= t.filter_complexity_limit {
        return Strategy::Native;
    }
    if has_no_vector_equivalent(chain) {
        return Strategy::Raster;
    }
    match config.output_target {
        OutputTarget::Compatibility => Strategy::VectorFallback,
        _ => Strategy::VectorFallback,
    }
}

/// Decides a gradient's strategy by stop count (spec.md §4.6).
pub fn decide_gradient(stop_count: usize, config: &Config) -> Strategy {
    let t = tuning(config);
    if stop_count <= t.gradient_stop_limit {
        Strategy::Native
    } else {
        Strategy::VectorFallback
    }
}

/// Decides a clip-path's strategy (spec.md §4.9).
pub fn decide_clip(clip: &ClipPath, config: &Config) -> Strategy {
    let t = tuning(config);
    match clip {
        ClipPath::Shapes { shapes, .. } => {
            if shapes.len() == 1 && is_axis_aligned_rect(&shapes[0]) {
                Strategy::Native
            } else if segment_count(shapes) <= t.clip_segment_limit {
                Strategy::VectorFallback
            } else {
                Strategy::Raster
            }
        }
        ClipPath::Ref(_) => Strategy::VectorFallback,
    }
}

fn is_axis_aligned_rect(ir: &pptx_ir::Ir) -> bool {
    matches!(ir, pptx_ir::Ir::Rectangle { corner_radius, .. } if *corner_radius == 0.0)
}

fn segment_count(shapes: &[pptx_ir::Ir]) -> usize {
    shapes
        .iter()
        .map(|s| match s {
            pptx_ir::Ir::PathShape { segments, .. } => segments.len(),
            _ => 4,
        })
        .sum()
}

/// Multi-page split decision (spec.md §4.6): whether the root content's
/// bounding box exceeds the configured slide-size multiplier.
pub fn should_split_pages(content_height_emu: f64, slide_height_emu: f64, multiplier: f64) -> bool {
    content_height_emu > slide_height_emu * multiplier
}

#[cfg(test)]
mod tests {
    use super::*;
    use pptx_ir::Color;

    #[test]
    fn simple_blur_is_native() {
        let chain = FilterChain { primitives: vec![FilterPrimitive::GaussianBlur { input: FilterInput::SourceGraphic, std_deviation: 2.0 }] };
        let config = Config::default();
        assert_eq!(decide_filter(&chain, &config), Strategy::Native);
    }

    #[test]
    fn turbulence_forces_raster() {
        let chain = FilterChain {
            primitives: vec![FilterPrimitive::Turbulence { base_frequency_x: 0.1, base_frequency_y: 0.1, num_octaves: 2, seed: 0, fractal_noise: true }],
        };
        let config = Config::default();
        assert_eq!(decide_filter(&chain, &config), Strategy::Raster);
    }

    #[test]
    fn displacement_map_forces_raster_even_without_turbulence() {
        let chain = FilterChain {
            primitives: vec![
                FilterPrimitive::GaussianBlur { input: FilterInput::SourceGraphic, std_deviation: 2.0 },
                FilterPrimitive::DisplacementMap {
                    input: FilterInput::SourceGraphic,
                    input2: FilterInput::SourceGraphic,
                    scale: 10.0,
                    x_channel_selector: pptx_ir::ChannelSelector::R,
                    y_channel_selector: pptx_ir::ChannelSelector::G,
                },
            ],
        };
        let config = Config::default();
        assert_eq!(decide_filter(&chain, &config), Strategy::Raster);
    }

    #[test]
    fn fan_out_forces_vector_fallback() {
        let chain = FilterChain {
            primitives: vec![
                FilterPrimitive::Offset { input: FilterInput::SourceGraphic, dx: 1.0, dy: 1.0 },
                FilterPrimitive::Offset { input: FilterInput::SourceGraphic, dx: 2.0, dy: 2.0 },
                FilterPrimitive::Merge { inputs: vec![FilterInput::Named(0), FilterInput::Named(1)] },
            ],
        };
        let config = Config::default();
        assert_eq!(decide_filter(&chain, &config), Strategy::VectorFallback);
    }

    #[test]
    fn gradient_over_limit_falls_back() {
        let config = Config::default();
        assert_eq!(decide_gradient(20, &config), Strategy::VectorFallback);
    }

    #[test]
    fn single_rect_clip_is_native() {
        let shapes = vec![pptx_ir::Ir::Rectangle {
            bounds: pptx_ir::Rect::new(0.0, 0.0, 10.0, 10.0),
            corner_radius: 0.0,
            paint: pptx_ir::Paint::Solid(Color::BLACK),
            stroke: None,
            opacity: 1.0,
        }];
        let clip = ClipPath::Shapes { shapes, rule: pptx_ir::FillRule::NonZero };
        let config = Config::default();
        assert_eq!(decide_clip(&clip, &config), Strategy::Native);
    }
}
