//! Conversion between multi-dimensional coordinates and linear storage offsets.
//!
//! Dimension 0 varies fastest: stride₀ = 1 and strideₖ = strideₖ₋₁ × dimₖ₋₁.

use crate::error::{Result, TensorError};
use crate::shape::Shape;

/// Maps `coords` to a linear offset in `shape`.
///
/// # Errors
/// `RankMismatch` if `coords.len() != shape.rank()`, `OutOfRange` if any
/// coordinate is not smaller than its axis size.
pub fn coords_to_linear(shape: &Shape, coords: &[usize]) -> Result<usize> {
    let dims = shape.dims();
    if coords.len() != dims.len() {
        return Err(TensorError::RankMismatch {
            expected: dims.len(),
            got: coords.len(),
        });
    }

    let mut offset = 0;
    let mut stride = 1;
    for (axis, (&c, &d)) in coords.iter().zip(dims).enumerate() {
        if c >= d {
            return Err(TensorError::coordinate(axis, c, d));
        }
        offset += c * stride;
        stride *= d;
    }
    Ok(offset)
}

/// Maps a linear offset back to its coordinates in `shape`.
///
/// # Errors
/// `OutOfRange` if `offset >= shape.size()`.
pub fn linear_to_coords(shape: &Shape, offset: usize) -> Result<Vec<usize>> {
    let mut coords = vec![0; shape.rank()];
    linear_to_coords_into(shape, offset, &mut coords)?;
    Ok(coords)
}

/// Like [`linear_to_coords`], writing into a caller-provided buffer.
///
/// # Errors
/// `OutOfRange` if `offset >= shape.size()`, `RankMismatch` if `out` does not
/// have one slot per axis.
pub fn linear_to_coords_into(shape: &Shape, offset: usize, out: &mut [usize]) -> Result<()> {
    if out.len() != shape.rank() {
        return Err(TensorError::RankMismatch {
            expected: shape.rank(),
            got: out.len(),
        });
    }
    if offset >= shape.size() {
        return Err(TensorError::linear(offset, shape.size()));
    }
    decompose(shape.dims(), offset, |axis, c| out[axis] = c);
    Ok(())
}

/// Calls `visit(axis, coord)` for every axis of the coordinate at `offset`.
///
/// `offset` must already be known to lie inside `dims`.
pub(crate) fn decompose(dims: &[usize], offset: usize, mut visit: impl FnMut(usize, usize)) {
    let Some(&first) = dims.first() else {
        return;
    };
    visit(0, offset % first);

    let mut mem_offset = first;
    for (axis, &d) in dims.iter().enumerate().skip(1) {
        visit(axis, (offset % (mem_offset * d)) / mem_offset);
        mem_offset *= d;
    }
}

/// Steps `coords` to the next coordinate in linear order.
///
/// Returns `false` once every coordinate has been visited, leaving `coords`
/// wrapped back to all zeros.
pub fn advance(coords: &mut [usize], dims: &[usize]) -> bool {
    for (c, &d) in coords.iter_mut().zip(dims) {
        *c += 1;
        if *c < d {
            return true;
        }
        *c = 0;
    }
    false
}

/// Iterates every coordinate of a shape in linear-offset order.
#[derive(Debug, Clone)]
pub struct CoordIter {
    dims: Vec<usize>,
    next: Option<Vec<usize>>,
}

impl CoordIter {
    pub fn new(shape: &Shape) -> Self {
        CoordIter {
            dims: shape.dims().to_vec(),
            next: Some(vec![0; shape.rank()]),
        }
    }
}

impl Iterator for CoordIter {
    type Item = Vec<usize>;

    fn next(&mut self) -> Option<Vec<usize>> {
        let current = self.next.take()?;
        let mut following = current.clone();
        if advance(&mut following, &self.dims) {
            self.next = Some(following);
        }
        Some(current)
    }
}
