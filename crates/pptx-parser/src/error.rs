// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Fatal parser errors (spec.md §7). Recoverable conditions never reach
//! here — they go through [`crate::diagnostics::Diagnostics`] instead.

#[derive(Debug)]
pub enum Error {
    /// Only UTF-8 content is supported.
    NotAnUtf8Str,
    /// Compressed SVG must use the GZip algorithm.
    MalformedGZip,
    /// More than `Options::max_elements` elements in the document.
    ElementsLimitReached,
    /// The root element is missing, or is not `<svg>`.
    NotAnSvg,
    /// The XML itself failed to parse.
    ParsingFailed(roxmltree::Error),
    /// A `<use>` reference chain contains a cycle; carries a description
    /// of the offending chain (spec.md §9: "fatal ParseError with the
    /// offending chain reported").
    CyclicReference(String),
}

impl From<roxmltree::Error> for Error {
    fn from(e: roxmltree::Error) -> Self {
        Error::ParsingFailed(e)
    }
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            Error::NotAnUtf8Str => write!(f, "provided data is not valid UTF-8"),
            Error::MalformedGZip => write!(f, "provided data has malformed GZip content"),
            Error::ElementsLimitReached => write!(f, "the maximum number of SVG elements was reached"),
            Error::NotAnSvg => write!(f, "document root is not an <svg> element"),
            Error::ParsingFailed(e) => write!(f, "SVG parsing failed: {}", e),
            Error::CyclicReference(chain) => write!(f, "cyclic <use> reference chain: {}", chain),
        }
    }
}

impl std::error::Error for Error {}
