use std::fmt;

use thiserror::Error;

use crate::label::Label;

/// What an out-of-range index was checked against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RangeTarget {
    /// A coordinate along the given axis.
    Coordinate { axis: usize },
    /// An axis index checked against the rank.
    Axis,
    /// A linear storage offset checked against the element count.
    Linear,
}

impl fmt::Display for RangeTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RangeTarget::Coordinate { axis } => write!(f, "coordinate of axis {}", axis),
            RangeTarget::Axis => write!(f, "axis index"),
            RangeTarget::Linear => write!(f, "linear offset"),
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum TensorError {
    #[error("rank mismatch: expected {expected} indices, got {got}")]
    RankMismatch { expected: usize, got: usize },
    #[error("out of range: {target} is {index} but the bound is {bound} (indices are 0-based)")]
    OutOfRange {
        target: RangeTarget,
        index: usize,
        bound: usize,
    },
    #[error("shape mismatch in {op}: expected {expected:?}, got {got:?}")]
    ShapeMismatch {
        op: &'static str,
        expected: Vec<usize>,
        got: Vec<usize>,
    },
    #[error(
        "dimension size mismatch for label '{label}': axis {lhs_axis} has size {lhs_size}, \
         axis {rhs_axis} has size {rhs_size}"
    )]
    DimensionSizeMismatch {
        label: Label,
        lhs_axis: usize,
        lhs_size: usize,
        rhs_axis: usize,
        rhs_size: usize,
    },
    #[error("duplicate label '{label}' on axes {first} and {second}")]
    DuplicateLabel {
        label: Label,
        first: usize,
        second: usize,
    },
    #[error("axis {axis} has size 0; every axis must hold at least one element")]
    EmptyAxis { axis: usize },
    #[error("shape {dims:?} holds more elements than fit in usize")]
    SizeOverflow { dims: Vec<usize> },
    #[error("invalid range for {op}: bounds cannot be sampled uniformly")]
    InvalidRange { op: &'static str },
    #[error("config error: {0}")]
    Config(String),
    #[error("thread pool error: {0}")]
    ThreadPool(String),
}

impl TensorError {
    pub(crate) fn coordinate(axis: usize, index: usize, bound: usize) -> Self {
        TensorError::OutOfRange {
            target: RangeTarget::Coordinate { axis },
            index,
            bound,
        }
    }

    pub(crate) fn axis(index: usize, rank: usize) -> Self {
        TensorError::OutOfRange {
            target: RangeTarget::Axis,
            index,
            bound: rank,
        }
    }

    pub(crate) fn linear(index: usize, size: usize) -> Self {
        TensorError::OutOfRange {
            target: RangeTarget::Linear,
            index,
            bound: size,
        }
    }
}

pub type Result<T> = std::result::Result<T, TensorError>;
