// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Computes the root (and nested-`<svg>`) viewport matrix from
//! `viewBox` + `preserveAspectRatio` + the target slide size.

use crate::Matrix;

/// `preserveAspectRatio` alignment, mirroring `svgtypes::Align`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Align {
    None,
    XMinYMin,
    XMidYMin,
    XMaxYMin,
    XMinYMid,
    XMidYMid,
    XMaxYMid,
    XMinYMax,
    XMidYMax,
    XMaxYMax,
}

impl Default for Align {
    fn default() -> Self {
        Align::XMidYMid
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MeetOrSlice {
    Meet,
    Slice,
}

impl Default for MeetOrSlice {
    fn default() -> Self {
        MeetOrSlice::Meet
    }
}

#[derive(Clone, Copy, Debug, Default)]
pub struct AspectRatio {
    pub align: Align,
    pub meet_or_slice: MeetOrSlice,
}

/// A `viewBox="min_x min_y vb_w vb_h"` value.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ViewBox {
    pub min_x: f64,
    pub min_y: f64,
    pub width: f64,
    pub height: f64,
}

/// Resolves the matrix that maps viewBox user-units to slide EMU
/// coordinates, per spec.md §4.4.
///
/// `vb_w == 0` or `vb_h == 0` is a degenerate document: the caller
/// should emit a warning and this function returns the identity matrix
/// (the root content occupies the origin, untransformed).
pub fn resolve_viewport(view_box: ViewBox, aspect: AspectRatio, slide_w_emu: f64, slide_h_emu: f64) -> Matrix {
    if view_box.width == 0.0 || view_box.height == 0.0 {
        return Matrix::IDENTITY;
    }

    let scale_x = slide_w_emu / view_box.width;
    let scale_y = slide_h_emu / view_box.height;

    let (sx, sy) = match aspect.meet_or_slice {
        _ if aspect.align == Align::None => (scale_x, scale_y),
        MeetOrSlice::Meet => {
            let s = scale_x.min(scale_y);
            (s, s)
        }
        MeetOrSlice::Slice => {
            let s = scale_x.max(scale_y);
            (s, s)
        }
    };

    let content_w = view_box.width * sx;
    let content_h = view_box.height * sy;
    let extra_x = slide_w_emu - content_w;
    let extra_y = slide_h_emu - content_h;

    let (align_x, align_y) = match aspect.align {
        Align::None => (0.0, 0.0),
        Align::XMinYMin => (0.0, 0.0),
        Align::XMidYMin => (extra_x / 2.0, 0.0),
        Align::XMaxYMin => (extra_x, 0.0),
        Align::XMinYMid => (0.0, extra_y / 2.0),
        Align::XMidYMid => (extra_x / 2.0, extra_y / 2.0),
        Align::XMaxYMid => (extra_x, extra_y / 2.0),
        Align::XMinYMax => (0.0, extra_y),
        Align::XMidYMax => (extra_x / 2.0, extra_y),
        Align::XMaxYMax => (extra_x, extra_y),
    };

    // translate(-min_x, -min_y), then scale, then translate by alignment offset,
    // composed right-to-left: align ∘ scale ∘ (-min_x,-min_y)
    Matrix::translate(align_x, align_y)
        .compose(&Matrix::scale(sx, sy))
        .compose(&Matrix::translate(-view_box.min_x, -view_box.min_y))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scenario_a_viewport_matrix() {
        let vb = ViewBox { min_x: 0.0, min_y: 0.0, width: 100.0, height: 100.0 };
        let m = resolve_viewport(vb, AspectRatio::default(), 9_144_000.0, 6_858_000.0);
        // scale = min(91440, 68580) = 68580; offset_x = (9144000 - 100*68580)/2 = 1143000
        let (x, _y) = m.transform_point(15.0, 30.0);
        assert!((x - 2_171_700.0).abs() < 1e-6, "x={}", x);
    }

    #[test]
    fn degenerate_viewbox_is_identity() {
        let vb = ViewBox { min_x: 0.0, min_y: 0.0, width: 0.0, height: 0.0 };
        let m = resolve_viewport(vb, AspectRatio::default(), 9_144_000.0, 6_858_000.0);
        assert_eq!(m, Matrix::IDENTITY);
    }

    #[test]
    fn none_alignment_uses_non_uniform_scale() {
        let vb = ViewBox { min_x: 0.0, min_y: 0.0, width: 100.0, height: 50.0 };
        let aspect = AspectRatio { align: Align::None, meet_or_slice: MeetOrSlice::Meet };
        let m = resolve_viewport(vb, aspect, 1000.0, 1000.0);
        assert_eq!(m.transform_point(100.0, 50.0), (1000.0, 1000.0));
    }
}
