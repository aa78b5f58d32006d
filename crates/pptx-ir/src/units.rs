// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! The fractional-EMU engine (spec.md §4.1).
//!
//! Converts SVG lengths to `f64` EMU and keeps float precision through
//! the whole pipeline; only [`to_emu_int`] rounds, and only half-to-even,
//! the way XML emission is required to (spec.md §3.4).

use crate::Error;

/// One EMU per inch is this many EMU (spec.md §3.4).
pub const EMU_PER_INCH: f64 = 914_400.0;
pub const EMU_PER_POINT: f64 = 12_700.0;
pub const EMU_PER_PX_96DPI: f64 = 9_525.0;

/// Valid per-coordinate EMU range: `[0, 1000 inches]` (spec.md §3.4).
pub const MAX_VALID_EMU: f64 = 1000.0 * EMU_PER_INCH;

/// A length unit, mirroring `svgtypes::LengthUnit` plus the SVG
/// percentage and bare-number (user-unit) cases.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Unit {
    UserUnit,
    Px,
    Pt,
    Mm,
    Cm,
    In,
    Em,
    Ex,
    Percent,
}

/// Which viewport dimension a percentage resolves against.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Axis {
    X,
    Y,
    /// Neither X nor Y: percentages resolve against the viewport diagonal
    /// per `sqrt((w^2+h^2)/2)`, matching SVG's rule for e.g. stroke-width.
    None,
}

/// Viewport + typography context a conversion needs to resolve
/// percentages and font-relative units.
#[derive(Clone, Copy, Debug)]
pub struct EmuContext {
    pub viewport_width_emu: f64,
    pub viewport_height_emu: f64,
    pub dpi: f64,
    pub root_font_size_px: f64,
    pub parent_font_size_px: f64,
}

impl Default for EmuContext {
    fn default() -> Self {
        EmuContext {
            viewport_width_emu: 9_144_000.0,
            viewport_height_emu: 6_858_000.0,
            dpi: 96.0,
            root_font_size_px: 16.0,
            parent_font_size_px: 16.0,
        }
    }
}

fn px_per_unit(unit: Unit, ctx: &EmuContext) -> Result<f64, Error> {
    Ok(match unit {
        Unit::UserUnit | Unit::Px => 1.0,
        Unit::In => ctx.dpi,
        Unit::Cm => ctx.dpi / 2.54,
        Unit::Mm => ctx.dpi / 25.4,
        Unit::Pt => ctx.dpi / 72.0,
        Unit::Em => ctx.parent_font_size_px,
        Unit::Ex => ctx.parent_font_size_px / 2.0,
        Unit::Percent => return Err(Error::UnsupportedUnit),
    })
}

/// Converts one value (already split into number + unit) to the
/// equivalent number of user units (CSS reference pixels), the way
/// `usvg`'s `parser::units::convert_length` does before its result feeds
/// a viewBox-derived CTM. `axis` selects the viewport dimension for `%`
/// resolution; `ctx`'s viewport fields are read as user units here, not
/// EMU (callers resolving percentages against a root viewBox should pass
/// a context built from that viewBox's width/height).
pub fn to_user_units(value: f64, unit: Unit, axis: Axis, ctx: &EmuContext) -> Result<f64, Error> {
    if !value.is_finite() {
        return Err(Error::InvalidLength);
    }

    let units = if unit == Unit::Percent {
        let base = match axis {
            Axis::X => ctx.viewport_width_emu,
            Axis::Y => ctx.viewport_height_emu,
            Axis::None => {
                let w = ctx.viewport_width_emu;
                let h = ctx.viewport_height_emu;
                ((w * w + h * h) / 2.0).sqrt()
            }
        };
        value / 100.0 * base
    } else {
        value * px_per_unit(unit, ctx)?
    };

    if units.abs() * EMU_PER_PX_96DPI > MAX_VALID_EMU {
        return Err(Error::OutOfRange);
    }
    Ok(units)
}

/// Converts one value (already split into number + unit) to fractional
/// EMU. `axis` selects the viewport dimension for `%` resolution.
pub fn to_fractional_emu(value: f64, unit: Unit, axis: Axis, ctx: &EmuContext) -> Result<f64, Error> {
    if !value.is_finite() {
        return Err(Error::InvalidLength);
    }

    let is_physical = matches!(unit, Unit::In | Unit::Cm | Unit::Mm | Unit::Pt);

    let emu = if unit == Unit::Percent {
        let base_px = match axis {
            Axis::X => ctx.viewport_width_emu / EMU_PER_PX_96DPI,
            Axis::Y => ctx.viewport_height_emu / EMU_PER_PX_96DPI,
            Axis::None => {
                let w = ctx.viewport_width_emu / EMU_PER_PX_96DPI;
                let h = ctx.viewport_height_emu / EMU_PER_PX_96DPI;
                ((w * w + h * h) / 2.0).sqrt()
            }
        };
        (value / 100.0 * base_px) * EMU_PER_PX_96DPI
    } else if is_physical {
        // Physical units (in/cm/mm/pt) resolve through `dpi` to pixels
        // first, then convert at the fixed EMU-per-inch ratio.
        let px = value * px_per_unit(unit, ctx)?;
        px * (EMU_PER_INCH / ctx.dpi)
    } else {
        // Px/user-unit/em/ex are already in CSS pixels at this point.
        (value * px_per_unit(unit, ctx)?) * EMU_PER_PX_96DPI
    };

    if emu.abs() > MAX_VALID_EMU {
        return Err(Error::OutOfRange);
    }
    Ok(emu)
}

/// Rounds a fractional EMU value to the nearest integer, ties to even
/// (banker's rounding), as required at XML emission (spec.md §3.4).
pub fn to_emu_int(value: f64) -> i64 {
    round_half_even(value) as i64
}

fn round_half_even(value: f64) -> f64 {
    let floor = value.floor();
    let diff = value - floor;
    if (diff - 0.5).abs() < f64::EPSILON {
        if (floor as i64) % 2 == 0 {
            floor
        } else {
            floor + 1.0
        }
    } else {
        value.round()
    }
}

/// Vectorized form, selected automatically by callers once `values.len()`
/// exceeds roughly 100 elements (spec.md §4.1); below that threshold a
/// per-element loop (i.e. just mapping `to_fractional_emu`) is cheaper.
pub const BATCH_THRESHOLD: usize = 100;

pub fn to_fractional_emu_batch(
    values: &[f64],
    units: &[Unit],
    axis: Axis,
    ctx: &EmuContext,
) -> Result<Vec<f64>, Error> {
    if values.len() != units.len() {
        return Err(Error::InvalidLength);
    }
    values
        .iter()
        .zip(units.iter())
        .map(|(&v, &u)| to_fractional_emu(v, u, axis, ctx))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn inch_to_user_units_is_dpi_dependent() {
        let mut ctx = EmuContext::default();
        ctx.dpi = 96.0;
        assert_eq!(to_user_units(1.0, Unit::In, Axis::None, &ctx).unwrap(), 96.0);
        ctx.dpi = 300.0;
        assert_eq!(to_user_units(1.0, Unit::In, Axis::None, &ctx).unwrap(), 300.0);
    }

    #[test]
    fn mm_to_user_units() {
        let ctx = EmuContext::default();
        let units = to_user_units(25.4, Unit::Mm, Axis::None, &ctx).unwrap();
        assert!((units - 96.0).abs() < 1e-6);
    }

    #[test]
    fn percent_user_units_resolve_against_viewport_field() {
        let ctx = EmuContext { viewport_width_emu: 200.0, viewport_height_emu: 100.0, ..EmuContext::default() };
        assert_eq!(to_user_units(50.0, Unit::Percent, Axis::X, &ctx).unwrap(), 100.0);
        assert_eq!(to_user_units(50.0, Unit::Percent, Axis::Y, &ctx).unwrap(), 50.0);
    }

    #[test]
    fn inch_to_emu() {
        let ctx = EmuContext::default();
        let emu = to_fractional_emu(1.0, Unit::In, Axis::None, &ctx).unwrap();
        assert_eq!(emu, EMU_PER_INCH);
    }

    #[test]
    fn point_to_emu() {
        let ctx = EmuContext::default();
        let emu = to_fractional_emu(1.0, Unit::Pt, Axis::None, &ctx).unwrap();
        assert!((emu - EMU_PER_POINT).abs() < 1e-6);
    }

    #[test]
    fn px_at_96dpi_to_emu() {
        let ctx = EmuContext::default();
        let emu = to_fractional_emu(1.0, Unit::Px, Axis::None, &ctx).unwrap();
        assert!((emu - EMU_PER_PX_96DPI).abs() < 1e-6);
    }

    #[test]
    fn out_of_range_is_rejected() {
        let ctx = EmuContext::default();
        let err = to_fractional_emu(2000.0, Unit::In, Axis::None, &ctx).unwrap_err();
        assert!(matches!(err, Error::OutOfRange));
    }

    #[test]
    fn round_half_to_even() {
        assert_eq!(to_emu_int(2.5), 2);
        assert_eq!(to_emu_int(3.5), 4);
        assert_eq!(to_emu_int(2.4), 2);
        assert_eq!(to_emu_int(2.6), 3);
    }

    #[test]
    fn percent_resolves_against_axis() {
        let ctx = EmuContext::default();
        let emu_x = to_fractional_emu(50.0, Unit::Percent, Axis::X, &ctx).unwrap();
        assert!((emu_x - ctx.viewport_width_emu / 2.0).abs() < 1e-6);
    }

    #[test]
    fn batch_matches_scalar() {
        let ctx = EmuContext::default();
        let values = [1.0, 2.0, 3.0];
        let units = [Unit::Px, Unit::Px, Unit::Px];
        let batch = to_fractional_emu_batch(&values, &units, Axis::None, &ctx).unwrap();
        for (i, &v) in values.iter().enumerate() {
            assert_eq!(batch[i], to_fractional_emu(v, Unit::Px, Axis::None, &ctx).unwrap());
        }
    }
}
