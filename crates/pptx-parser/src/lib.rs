// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

/*!
An SVG parser that bakes coordinate transforms and produces the
`svg2pptx` intermediate representation ([`pptx_ir::Scene`]).

Mirrors the teacher's `usvg-parser` crate: a thin typed layer over
`roxmltree`, a CSS cascade via `simplecss`, and one conversion function
per element kind, all feeding [`pptx_ir`] types. Unlike `usvg-parser`,
every coordinate is baked against the CTM at parse time (spec.md §3.2,
§9) rather than carried forward as a `Transform` on each node.
*/

#![forbid(unsafe_code)]
#![warn(missing_debug_implementations)]

mod clippath;
mod converter;
mod diagnostics;
mod document;
mod error;
mod filter;
mod options;
mod paint_server;
mod shapes;
mod style;
mod text;
mod use_node;

use std::io::Read;

pub use crate::diagnostics::{Diagnostics, Warning, WarningCode};
pub use crate::error::Error;
pub use crate::options::Options;

/// The result of a successful parse: the scene graph plus any
/// recoverable warnings collected along the way (spec.md §6.3).
#[derive(Debug)]
pub struct ParseResult {
    pub scene: pptx_ir::Scene,
    pub warnings: Vec<Warning>,
}

/// Parses raw SVG (or gzip-compressed SVGZ) bytes into a [`ParseResult`].
///
/// Mirrors the teacher's `Tree::from_data`: magic-byte sniffs gzip,
/// decompresses through `flate2`, then delegates to [`from_str`].
pub fn from_data(data: &[u8], options: &Options) -> Result<ParseResult, Error> {
    if data.starts_with(&[0x1f, 0x8b]) {
        let mut decoder = flate2::read::GzDecoder::new(data);
        let mut decompressed = String::new();
        decoder.read_to_string(&mut decompressed).map_err(|_| Error::MalformedGZip)?;
        from_str(&decompressed, options)
    } else {
        let text = std::str::from_utf8(data).map_err(|_| Error::NotAnUtf8Str)?;
        from_str(text, options)
    }
}

/// Parses an SVG document already decoded to a UTF-8 string.
pub fn from_str(text: &str, options: &Options) -> Result<ParseResult, Error> {
    let doc = roxmltree::Document::parse(text)?;
    from_xmltree(&doc, options)
}

/// Parses an already-built `roxmltree::Document`, the entry point the
/// teacher's `TreeParsing` trait calls `from_xmltree` (spec.md §6.3).
pub fn from_xmltree(doc: &roxmltree::Document, options: &Options) -> Result<ParseResult, Error> {
    let mut diags = Diagnostics::new();
    let scene = converter::convert_document(doc, options, &mut diags)?;
    Ok(ParseResult { scene, warnings: diags.into_warnings() })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_minimal_document() {
        let svg = r#"<svg xmlns="http://www.w3.org/2000/svg" viewBox="0 0 10 10"><rect width="5" height="5"/></svg>"#;
        let result = from_data(svg.as_bytes(), &Options::default()).unwrap();
        assert_eq!(result.scene.elements.len(), 1);
    }

    #[test]
    fn non_svg_root_is_rejected() {
        let xml = r#"<not-svg/>"#;
        let err = from_data(xml.as_bytes(), &Options::default()).unwrap_err();
        assert!(matches!(err, Error::NotAnSvg));
    }

    #[test]
    fn invalid_utf8_is_rejected() {
        let bytes = [0xff, 0xfe, 0xfd];
        let err = from_data(&bytes, &Options::default()).unwrap_err();
        assert!(matches!(err, Error::NotAnUtf8Str));
    }
}
