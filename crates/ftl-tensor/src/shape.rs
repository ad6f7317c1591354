use std::fmt;
use std::hash::{Hash, Hasher};

use crate::error::{Result, TensorError};

/// How a shape's sizes were supplied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShapeKind {
    /// Sizes known up front and committed permanently.
    Fixed,
    /// Sizes supplied at runtime; may differ per instance.
    Dynamic,
}

#[derive(Debug, Clone)]
enum Dims {
    Fixed(Box<[usize]>),
    Dynamic(Vec<usize>),
}

impl Dims {
    fn as_slice(&self) -> &[usize] {
        match self {
            Dims::Fixed(d) => d,
            Dims::Dynamic(d) => d,
        }
    }
}

/// The ordered axis sizes of a tensor.
///
/// A shape never changes after construction. `size` is cached and always
/// equals the product of the axis sizes (1 for a rank-0 scalar shape).
///
/// Equality compares sizes only: a fixed and a dynamic shape with the same
/// sizes are equal.
#[derive(Debug, Clone)]
pub struct Shape {
    dims: Dims,
    size: usize,
}

impl Shape {
    /// Create a fixed shape from sizes known at the call site.
    pub fn fixed<const R: usize>(dims: [usize; R]) -> Result<Self> {
        let size = checked_size(&dims)?;
        Ok(Shape {
            dims: Dims::Fixed(Box::new(dims)),
            size,
        })
    }

    /// Create a dynamic shape from a runtime-provided size list.
    pub fn dynamic(dims: impl Into<Vec<usize>>) -> Result<Self> {
        let dims = dims.into();
        let size = checked_size(&dims)?;
        Ok(Shape {
            dims: Dims::Dynamic(dims),
            size,
        })
    }

    /// The rank-0 shape holding a single element.
    pub fn scalar() -> Self {
        Shape {
            dims: Dims::Fixed(Box::new([])),
            size: 1,
        }
    }

    /// Same sizes, re-tagged with `kind`.
    pub(crate) fn with_kind(&self, kind: ShapeKind) -> Self {
        let dims = match kind {
            ShapeKind::Fixed => Dims::Fixed(self.dims().into()),
            ShapeKind::Dynamic => Dims::Dynamic(self.dims().to_vec()),
        };
        Shape {
            dims,
            size: self.size,
        }
    }

    pub fn kind(&self) -> ShapeKind {
        match self.dims {
            Dims::Fixed(_) => ShapeKind::Fixed,
            Dims::Dynamic(_) => ShapeKind::Dynamic,
        }
    }

    /// Number of axes.
    pub fn rank(&self) -> usize {
        self.dims().len()
    }

    /// Total number of elements.
    pub fn size(&self) -> usize {
        self.size
    }

    pub fn dims(&self) -> &[usize] {
        self.dims.as_slice()
    }

    /// Returns the size of axis `d`.
    pub fn dim(&self, d: usize) -> Result<usize> {
        self.dims()
            .get(d)
            .copied()
            .ok_or_else(|| TensorError::axis(d, self.rank()))
    }

    /// Strides with dimension 0 varying fastest.
    ///
    /// For a shape [d0, d1, d2], the strides are [1, d0, d0*d1].
    pub fn strides(&self) -> Vec<usize> {
        let mut strides = Vec::with_capacity(self.rank());
        let mut stride = 1;
        for &d in self.dims() {
            strides.push(stride);
            stride *= d;
        }
        strides
    }
}

/// Element count of `dims`, rejecting empty axes and counts past `usize::MAX`.
fn checked_size(dims: &[usize]) -> Result<usize> {
    if let Some(axis) = dims.iter().position(|&d| d == 0) {
        return Err(TensorError::EmptyAxis { axis });
    }
    dims.iter()
        .try_fold(1usize, |acc, &d| acc.checked_mul(d))
        .ok_or_else(|| TensorError::SizeOverflow {
            dims: dims.to_vec(),
        })
}

impl PartialEq for Shape {
    fn eq(&self, other: &Self) -> bool {
        self.dims() == other.dims()
    }
}

impl Eq for Shape {}

impl Hash for Shape {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.dims().hash(state);
    }
}

impl fmt::Display for Shape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[")?;
        for (i, d) in self.dims().iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}", d)?;
        }
        write!(f, "]")
    }
}

impl TryFrom<Vec<usize>> for Shape {
    type Error = TensorError;

    fn try_from(dims: Vec<usize>) -> Result<Self> {
        Shape::dynamic(dims)
    }
}

impl TryFrom<&[usize]> for Shape {
    type Error = TensorError;

    fn try_from(dims: &[usize]) -> Result<Self> {
        Shape::dynamic(dims)
    }
}
