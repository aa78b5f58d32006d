// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! The core's public configuration surface (spec.md §6.3).

use pptx_ir::PrecisionMode;

/// Which rendering-fidelity profile the Policy Engine should target.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OutputTarget {
    Speed,
    Balanced,
    Quality,
    Compatibility,
}

impl Default for OutputTarget {
    fn default() -> Self {
        OutputTarget::Balanced
    }
}

/// Missing-font handling (spec.md §4.10, §7).
#[derive(Clone, Debug, PartialEq)]
pub enum FontMissingPolicy {
    Error,
    FallbackFamily(String),
    Outline,
}

impl Default for FontMissingPolicy {
    fn default() -> Self {
        FontMissingPolicy::FallbackFamily("Arial".to_string())
    }
}

/// Numeric overrides for Policy Engine thresholds (spec.md §4.6, §6.3).
#[derive(Clone, Copy, Debug)]
pub struct PolicyThresholds {
    pub max_filter_complexity: usize,
    pub max_gradient_stops: usize,
    pub max_clip_segments: usize,
}

impl Default for PolicyThresholds {
    fn default() -> Self {
        PolicyThresholds { max_filter_complexity: 8, max_gradient_stops: 10, max_clip_segments: 64 }
    }
}

/// Configuration accepted by [`crate::convert`] (spec.md §6.3). Every
/// field has a documented default; callers typically start from
/// [`Config::default`] and override only what they need.
#[derive(Clone, Debug)]
pub struct Config {
    pub output_target: OutputTarget,
    pub precision_mode: PrecisionMode,
    /// Slide dimensions in EMU; default is letter-landscape
    /// (10in × 7.5in = 9,144,000 × 6,858,000 EMU).
    pub slide_dimensions_emu: (f64, f64),
    pub default_dpi: f64,
    pub font_missing: FontMissingPolicy,
    pub thresholds: PolicyThresholds,
    /// Directories and/or a fetcher handle the Font Service consults
    /// before falling back to system fonts (spec.md §4.10, §6.4).
    pub font_sources: Vec<String>,
    /// Fixes ZIP timestamps and relationship-id assignment so identical
    /// inputs produce byte-identical output (spec.md §4.11, §6.3).
    pub deterministic: bool,
    /// CIE76 ΔE threshold below which adjacent gradient stops are merged
    /// into one, applied only under `OutputTarget::Speed` (spec.md §9's
    /// open question on the Speed profile's gradient-stop budget).
    pub gradient_merge_delta_e: f64,
    /// Pixels-per-inch used to size the raster fallback tier's offscreen
    /// pixmap (spec.md §4.9's Open Question on raster-fallback resolution).
    pub raster_dpi: f64,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            output_target: OutputTarget::default(),
            precision_mode: PrecisionMode::default(),
            slide_dimensions_emu: (9_144_000.0, 6_858_000.0),
            default_dpi: 96.0,
            font_missing: FontMissingPolicy::default(),
            thresholds: PolicyThresholds::default(),
            font_sources: Vec::new(),
            deterministic: false,
            gradient_merge_delta_e: 8.0,
            raster_dpi: 96.0,
        }
    }
}
