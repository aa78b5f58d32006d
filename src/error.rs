// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Fatal conversion errors (spec.md §7). Element-level recoverable
//! conditions never surface here; they accumulate in
//! `ConversionResult.warnings` instead.

#[derive(Debug)]
pub enum Error {
    Parse(pptx_parser::Error),
    /// The Font Service was configured with `font_missing = Error` and a
    /// required family could not be resolved.
    FontNotFound(String),
    /// An I/O or ZIP structural failure while assembling the PPTX.
    PackageWrite(String),
    /// The conversion exceeded its configured wall-time budget.
    Timeout,
}

impl From<pptx_parser::Error> for Error {
    fn from(e: pptx_parser::Error) -> Self {
        Error::Parse(e)
    }
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            Error::Parse(e) => write!(f, "SVG parsing failed: {}", e),
            Error::FontNotFound(family) => write!(f, "font not found and font_missing policy is Error: {}", family),
            Error::PackageWrite(msg) => write!(f, "failed to assemble PPTX package: {}", msg),
            Error::Timeout => write!(f, "conversion exceeded its time budget"),
        }
    }
}

impl std::error::Error for Error {}
