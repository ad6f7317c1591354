use crate::dtype::{DType, Element};
use crate::error::{Result, TensorError};

/// Contiguous element buffer owned by a tensor.
///
/// The length is fixed when the storage is created; there is no resize.
#[derive(Debug, Clone, PartialEq)]
pub struct Storage<T> {
    data: Box<[T]>,
}

impl<T: Element> Storage<T> {
    /// Create zero-filled storage holding `n` elements.
    pub fn zeros(n: usize) -> Self {
        Storage {
            data: vec![T::zero(); n].into_boxed_slice(),
        }
    }

    /// Take ownership of an existing buffer.
    pub fn from_vec(data: Vec<T>) -> Self {
        Storage {
            data: data.into_boxed_slice(),
        }
    }

    /// Number of elements in this storage.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Returns true if the storage contains no elements.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Reads element `i`.
    ///
    /// # Errors
    /// Returns `OutOfRange` if `i >= len()`.
    pub fn get(&self, i: usize) -> Result<T> {
        self.data
            .get(i)
            .copied()
            .ok_or_else(|| TensorError::linear(i, self.data.len()))
    }

    /// Overwrites element `i`.
    ///
    /// # Errors
    /// Returns `OutOfRange` if `i >= len()`.
    pub fn set(&mut self, i: usize, value: T) -> Result<()> {
        let len = self.data.len();
        let slot = self
            .data
            .get_mut(i)
            .ok_or_else(|| TensorError::linear(i, len))?;
        *slot = value;
        Ok(())
    }

    pub fn as_slice(&self) -> &[T] {
        &self.data
    }

    pub fn as_mut_slice(&mut self) -> &mut [T] {
        &mut self.data
    }

    pub fn dtype(&self) -> DType {
        T::DTYPE
    }
}
