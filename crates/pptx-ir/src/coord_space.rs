// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! The CTM stack the parser pushes/pops while walking the SVG DOM.

use crate::{Error, Matrix};

/// A non-empty LIFO stack of composed transforms, with the viewport
/// matrix at the bottom (spec.md §4.3).
///
/// Single-threaded, scoped to one parser traversal; owned by the parser
/// and dropped when the traversal ends.
#[derive(Debug, Clone)]
pub struct CoordSpace {
    stack: Vec<Matrix>,
}

impl CoordSpace {
    /// Creates a new stack seeded with the root viewport matrix.
    pub fn new(viewport: Matrix) -> Self {
        CoordSpace { stack: vec![viewport] }
    }

    /// Composes `current · m` and pushes the result. Never fails.
    pub fn push(&mut self, m: Matrix) {
        let current = *self.current();
        self.stack.push(current.compose(&m));
    }

    /// Removes the top matrix. Fails with [`Error::CoordSpaceUnderflow`]
    /// if only the viewport matrix remains.
    pub fn pop(&mut self) -> Result<(), Error> {
        if self.stack.len() <= 1 {
            return Err(Error::CoordSpaceUnderflow);
        }
        self.stack.pop();
        Ok(())
    }

    /// Transforms a point using the current top matrix. Always succeeds.
    #[inline]
    pub fn apply(&self, x: f64, y: f64) -> (f64, f64) {
        self.current().transform_point(x, y)
    }

    /// Transforms a vector (ignoring translation) using the current CTM,
    /// for relative path commands (spec.md §4.5).
    #[inline]
    pub fn apply_vector(&self, x: f64, y: f64) -> (f64, f64) {
        self.current().transform_vector(x, y)
    }

    #[inline]
    pub fn current_ctm(&self) -> Matrix {
        *self.current()
    }

    #[inline]
    fn current(&self) -> &Matrix {
        self.stack.last().expect("CoordSpace stack is never empty")
    }

    pub fn depth(&self) -> usize {
        self.stack.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pop_below_viewport_underflows() {
        let mut cs = CoordSpace::new(Matrix::IDENTITY);
        assert!(matches!(cs.pop(), Err(Error::CoordSpaceUnderflow)));
    }

    #[test]
    fn push_pop_restores_parent_ctm() {
        let mut cs = CoordSpace::new(Matrix::translate(1.0, 1.0));
        let before = cs.current_ctm();
        cs.push(Matrix::scale(2.0, 2.0));
        assert_ne!(cs.current_ctm(), before);
        cs.pop().unwrap();
        assert_eq!(cs.current_ctm(), before);
    }

    #[test]
    fn apply_uses_composed_ctm() {
        let mut cs = CoordSpace::new(Matrix::translate(10.0, 20.0));
        cs.push(Matrix::scale(2.0, 2.0));
        assert_eq!(cs.apply(5.0, 10.0), (20.0, 40.0));
    }
}
