// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Recoverable-error bookkeeping, implementing the `Logger.warn(code,
//! message, element_path)` collaborator interface from spec.md §6.4.

/// A machine-readable warning code, one per recoverable error kind in
/// spec.md §7.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum WarningCode {
    InvalidLength,
    UnsupportedUnit,
    OutOfRange,
    MalformedTransform,
    MalformedPath,
    UnknownElement,
    FontNotFound,
    FilterUnsupported,
    ClipTooComplex,
    DegenerateViewport,
    DroppedEmptyPath,
    DroppedEmptyText,
    ClampedOpacity,
    PolicyEscalated,
}

#[derive(Clone, Debug)]
pub struct Warning {
    pub code: WarningCode,
    pub message: String,
    /// A simplified XPath-like locator, e.g. `/svg/g[2]/rect[0]`.
    pub element_path: String,
}

/// Collects warnings for `ConversionResult.warnings` and mirrors each
/// one to the `log` crate, matching the teacher's `log::warn!` usage
/// throughout `usvg-parser` and `resvg`.
#[derive(Default, Debug)]
pub struct Diagnostics {
    warnings: Vec<Warning>,
}

impl Diagnostics {
    pub fn new() -> Self {
        Diagnostics::default()
    }

    pub fn warn(&mut self, code: WarningCode, message: impl Into<String>, element_path: impl Into<String>) {
        let message = message.into();
        let element_path = element_path.into();
        log::warn!("{:?} at {}: {}", code, element_path, message);
        self.warnings.push(Warning { code, message, element_path });
    }

    pub fn into_warnings(self) -> Vec<Warning> {
        self.warnings
    }

    pub fn warnings(&self) -> &[Warning] {
        &self.warnings
    }
}
