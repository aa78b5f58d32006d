// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Parses the SVG `transform` attribute grammar into a [`Matrix`].
//!
//! The grammar itself (`translate`, `scale`, `rotate`, `skewX`/`skewY`,
//! `matrix`, and lists thereof) is parsed by `svgtypes`, the same crate
//! the teacher uses for every other length/transform/color grammar; this
//! module only adapts the result into our own `Matrix` type.

use crate::Matrix;

/// Parses a `transform` attribute value into a composed [`Matrix`].
///
/// Returns `None` on malformed input; callers implement spec.md §4.5's
/// and §7's `MalformedTransform` recovery (inherit the parent CTM, warn)
/// around this function rather than inside it.
pub fn parse_transform(value: &str) -> Option<Matrix> {
    let ts = svgtypes::Transform::from_str(value).ok()?;
    let m = Matrix::new(ts.a, ts.b, ts.c, ts.d, ts.e, ts.f);
    if m.a.is_finite() && m.b.is_finite() && m.c.is_finite() && m.d.is_finite() && m.e.is_finite() && m.f.is_finite() {
        Some(m)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_translate() {
        let m = parse_transform("translate(5,10)").unwrap();
        assert_eq!(m.transform_point(10.0, 20.0), (15.0, 30.0));
    }

    #[test]
    fn parses_scale_pair() {
        let m = parse_transform("scale(2,1)").unwrap();
        assert_eq!(m.transform_point(50.0, 50.0), (100.0, 50.0));
    }

    #[test]
    fn parses_combined_list() {
        let m = parse_transform("translate(10,20) scale(2)").unwrap();
        assert_eq!(m.transform_point(5.0, 10.0), (20.0, 40.0));
    }

    #[test]
    fn rejects_malformed_input() {
        assert!(parse_transform("not-a-transform(").is_none());
    }
}
