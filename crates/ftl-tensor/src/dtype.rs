use std::fmt;
use std::ops::{Add, Mul, Sub};

use half::f16;
use num_traits::{Float, Zero};

/// Element types a tensor can hold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DType {
    /// 16-bit floating point (IEEE 754 half-precision, via the `half` crate).
    F16,
    /// 32-bit floating point.
    F32,
    /// 64-bit floating point.
    F64,
    /// 32-bit signed integer.
    I32,
    /// 64-bit signed integer.
    I64,
}

impl DType {
    /// Returns the size in bytes of a single element.
    pub fn size_in_bytes(&self) -> usize {
        match self {
            DType::F16 => 2,
            DType::F32 | DType::I32 => 4,
            DType::F64 | DType::I64 => 8,
        }
    }

    /// Returns true for the floating point types.
    pub fn is_float(&self) -> bool {
        matches!(self, DType::F16 | DType::F32 | DType::F64)
    }
}

impl fmt::Display for DType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DType::F16 => write!(f, "f16"),
            DType::F32 => write!(f, "f32"),
            DType::F64 => write!(f, "f64"),
            DType::I32 => write!(f, "i32"),
            DType::I64 => write!(f, "i64"),
        }
    }
}

/// A scalar that can be stored in a [`crate::Tensor`] and combined by
/// expressions.
///
/// `Zero` supplies the default value of freshly allocated storage and the
/// starting point of contraction sums.
pub trait Element:
    Copy
    + Send
    + Sync
    + fmt::Debug
    + PartialEq
    + Zero
    + Add<Output = Self>
    + Sub<Output = Self>
    + Mul<Output = Self>
    + 'static
{
    /// The runtime tag for this element type.
    const DTYPE: DType;

    /// Whether values can be drawn uniformly from `[low, high]`.
    ///
    /// Float bounds must be finite and their width must stay finite once
    /// scaled by the sampler.
    fn is_sampleable_range(low: Self, high: Self) -> bool;
}

fn float_range<F: Float>(low: F, high: F) -> bool {
    low.is_finite()
        && high.is_finite()
        && low <= high
        && ((high - low) / (F::one() - F::epsilon())).is_finite()
}

macro_rules! impl_float_element {
    ($($ty:ty => $dtype:ident),* $(,)?) => {
        $(
            impl Element for $ty {
                const DTYPE: DType = DType::$dtype;

                fn is_sampleable_range(low: Self, high: Self) -> bool {
                    float_range(low, high)
                }
            }
        )*
    };
}

macro_rules! impl_int_element {
    ($($ty:ty => $dtype:ident),* $(,)?) => {
        $(
            impl Element for $ty {
                const DTYPE: DType = DType::$dtype;

                fn is_sampleable_range(low: Self, high: Self) -> bool {
                    low <= high
                }
            }
        )*
    };
}

impl_float_element! {
    f16 => F16,
    f32 => F32,
    f64 => F64,
}

impl_int_element! {
    i32 => I32,
    i64 => I64,
}
