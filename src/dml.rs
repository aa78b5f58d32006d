// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Numeric conventions shared by every mapper (spec.md §4.7, §6.1):
//! EMU integers, 1/60000-degree angles, 0-100000 alpha, per-mille
//! gradient stop positions.

use pptx_ir::Color;

/// Converts a fractional EMU value (already produced by the unit
/// engine) into the integer form DrawingML XML requires: half-to-even,
/// per spec.md §3.4.
pub fn emu(value: f64) -> i64 {
    pptx_ir::to_emu_int(value)
}

/// DrawingML angle: 0 at 3 o'clock, clockwise, in 1/60000 degree units.
pub fn angle_60000(dx: f64, dy: f64) -> i64 {
    let degrees = dy.atan2(dx).to_degrees();
    let normalized = ((degrees % 360.0) + 360.0) % 360.0;
    (normalized * 60_000.0).round() as i64
}

/// DrawingML alpha: 100000 = opaque.
pub fn alpha_100000(opacity: f64) -> i64 {
    (opacity.clamp(0.0, 1.0) * 100_000.0).round() as i64
}

/// Gradient stop position, per-mille (0-100000).
pub fn stop_per_mille(offset: f64) -> i64 {
    (offset.clamp(0.0, 1.0) * 100_000.0).round() as i64
}

/// `RRGGBB` without the `#`, as DrawingML's `<a:srgbClr val="…">` wants it.
pub fn hex_color(color: &Color) -> String {
    color.to_hex()
}

/// Monotonic shape id allocator, scoped to one slide (spec.md §4.7:
/// "mapper output order inside a slide equals IR order" — ids follow
/// the same order so they're stable across runs).
#[derive(Default)]
pub struct ShapeIds {
    next: u32,
}

impl ShapeIds {
    pub fn new() -> Self {
        ShapeIds { next: 2 } // id 1 is reserved for the slide's root group
    }

    pub fn next(&mut self) -> u32 {
        let id = self.next;
        self.next += 1;
        id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn angle_zero_is_three_oclock() {
        assert_eq!(angle_60000(1.0, 0.0), 0);
    }

    #[test]
    fn angle_ninety_is_six_oclock_clockwise() {
        // SVG's y axis points down, so (0, 1) is "downward" == 90 clockwise.
        assert_eq!(angle_60000(0.0, 1.0), 90 * 60_000);
    }

    #[test]
    fn alpha_round_trips_opaque() {
        assert_eq!(alpha_100000(1.0), 100_000);
        assert_eq!(alpha_100000(0.0), 0);
    }

    #[test]
    fn shape_ids_start_at_two_and_increment() {
        let mut ids = ShapeIds::new();
        assert_eq!(ids.next(), 2);
        assert_eq!(ids.next(), 3);
    }
}
