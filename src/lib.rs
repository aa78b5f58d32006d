// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

/*!
Converts SVG documents into native-vector PresentationML (PPTX)
presentations: parses SVG into the [`pptx_ir`] scene graph via
[`pptx_parser`], runs every element through the Policy Engine
(`policy`), maps the result to DrawingML XML (`mappers`, `filters`,
`clip`, `raster`), and assembles the OOXML ZIP (`package`).

Mirrors the shape of the teacher's `resvg` crate: a thin top-level
`convert` entry point over a tree of focused modules, each owning one
pipeline stage.
*/

#![forbid(unsafe_code)]
#![warn(missing_debug_implementations)]

pub mod clip;
pub mod config;
pub mod dml;
pub mod error;
pub mod filters;
pub mod fonts;
pub mod mappers;
pub mod package;
pub mod policy;
pub mod raster;

use std::time::Instant;

pub use config::Config;
pub use error::Error;

use dml::ShapeIds;
use fonts::{FontCache, FontService};
use mappers::MapperCtx;
use package::media::MediaRegistry;
use package::{Package, SlideContent};
use pptx_parser::{Options, Warning, WarningCode};

/// One EMU-space slide is 914,400 EMU per inch; the raster tier's pixmap
/// resolution is derived from `Config::raster_dpi` against that constant
/// rather than hardcoded (spec.md §4.9's Open Question).
const EMU_PER_INCH: f64 = 914_400.0;

/// A single recoverable diagnostic surfaced to the caller (spec.md §7):
/// parser-level warnings and policy escalations both land here.
#[derive(Debug, Clone)]
pub struct Diagnostic {
    pub code: WarningCode,
    pub message: String,
    pub element_path: String,
}

impl From<Warning> for Diagnostic {
    fn from(w: Warning) -> Self {
        Diagnostic { code: w.code, message: w.message, element_path: w.element_path }
    }
}

/// Aggregate counters over one conversion run (spec.md §6.3's
/// `metrics{}`).
#[derive(Debug, Default, Clone)]
pub struct Metrics {
    pub element_count: usize,
    pub slide_count: usize,
    pub warning_count: usize,
    pub elapsed_ms: u64,
}

/// The result of a successful [`convert`] call.
#[derive(Debug)]
pub struct ConversionResult {
    pub pptx_bytes: Vec<u8>,
    /// Recoverable diagnostics; does not include anything that aborted
    /// the conversion (those surface as `Err` instead, spec.md §7).
    pub warnings: Vec<Diagnostic>,
    pub metrics: Metrics,
    /// Always empty today: every currently-detected failure mode is
    /// fatal and returned as `Err`. Kept on the result type to match the
    /// documented surface (spec.md §6.3) for callers that batch multiple
    /// conversions and want a uniform per-item outcome shape.
    pub errors: Vec<Diagnostic>,
}

/// Converts `svg_bytes` into a PresentationML package (spec.md §6.3).
///
/// Pure with respect to its inputs given the same `config` and font
/// sources; relationship ids and ZIP timestamps only repeat across runs
/// when `config.deterministic` is set.
pub fn convert(svg_bytes: &[u8], config: &Config) -> Result<ConversionResult, Error> {
    let start = Instant::now();

    let options = Options {
        dpi: config.default_dpi,
        font_size: 16.0,
        slide_width_emu: config.slide_dimensions_emu.0,
        slide_height_emu: config.slide_dimensions_emu.1,
        max_elements: 1_000_000,
    };
    let parsed = pptx_parser::from_data(svg_bytes, &options)?;
    let mut warnings: Vec<Diagnostic> = parsed.warnings.into_iter().map(Diagnostic::from).collect();

    let content_bounds = clip::union_bounds(&parsed.scene.elements);
    if policy::should_split_pages(content_bounds.height, config.slide_dimensions_emu.1, 1.5) {
        // Multi-page repagination (re-bucketing elements by y-range and
        // re-offsetting their coordinates per page) isn't implemented;
        // oversized content is still emitted on one slide, clipped by
        // the slide frame, with a warning so the caller can see it.
        warnings.push(Diagnostic {
            code: WarningCode::OutOfRange,
            message: "content height exceeds the configured slide size; multi-page splitting is not yet implemented".to_string(),
            element_path: "/svg".to_string(),
        });
    }

    let fonts = FontService::new(config);
    let mut font_cache = FontCache::new();
    let mut media = MediaRegistry::new();
    let mut embedded_fonts = Vec::new();
    let mut media_rel_ids = Vec::new();
    let mut ids = ShapeIds::new();
    let px_per_emu = config.raster_dpi / EMU_PER_INCH;

    let mut shape_tree_xml = String::new();
    {
        let mut ctx = MapperCtx {
            config,
            fonts: &fonts,
            font_cache: &mut font_cache,
            media: &mut media,
            embedded_fonts: &mut embedded_fonts,
            media_rel_ids: &mut media_rel_ids,
            defs: &parsed.scene.defs,
            ids: &mut ids,
            px_per_emu,
        };
        for element in &parsed.scene.elements {
            shape_tree_xml.push_str(&mappers::map_element(element, &mut ctx));
        }
    }

    let slide = SlideContent { shape_tree_xml, media_relationship_ids: media_rel_ids };
    let package = Package {
        slides: vec![slide],
        media,
        slide_width_emu: config.slide_dimensions_emu.0.round() as i64,
        slide_height_emu: config.slide_dimensions_emu.1.round() as i64,
        deterministic: config.deterministic,
        embedded_fonts,
    };
    let pptx_bytes = package.write()?;

    Ok(ConversionResult {
        metrics: Metrics {
            element_count: parsed.scene.elements.len(),
            slide_count: 1,
            warning_count: warnings.len(),
            elapsed_ms: start.elapsed().as_millis() as u64,
        },
        pptx_bytes,
        warnings,
        errors: Vec::new(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_svg_yields_a_single_empty_slide() {
        let svg = r#"<svg xmlns="http://www.w3.org/2000/svg" viewBox="0 0 10 10"></svg>"#;
        let result = convert(svg.as_bytes(), &Config::default()).unwrap();
        assert_eq!(result.metrics.slide_count, 1);
        assert_eq!(result.metrics.element_count, 0);
        assert!(!result.pptx_bytes.is_empty());
    }

    #[test]
    fn a_rect_round_trips_into_pptx_bytes() {
        let svg = r#"<svg xmlns="http://www.w3.org/2000/svg" viewBox="0 0 10 10"><rect width="5" height="5" fill="#ff0000"/></svg>"#;
        let result = convert(svg.as_bytes(), &Config::default()).unwrap();
        assert_eq!(result.metrics.element_count, 1);
        assert!(result.pptx_bytes.starts_with(b"PK"));
    }

    #[test]
    fn malformed_svg_is_a_fatal_error() {
        let err = convert(b"<not-svg/>", &Config::default()).unwrap_err();
        assert!(matches!(err, Error::Parse(_)));
    }
}
