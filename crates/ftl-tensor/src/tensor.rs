use rand::distributions::uniform::SampleUniform;
use rand::distributions::{Distribution, Uniform};
use rand::Rng;

use crate::config::EvalConfig;
use crate::dtype::{DType, Element};
use crate::error::{Result, TensorError};
use crate::expr::Expr;
use crate::index;
use crate::label::{Label, LabeledView};
use crate::materialize::{self, Materializer};
use crate::shape::{Shape, ShapeKind};
use crate::storage::Storage;

/// A dense tensor: a shape plus the storage it owns.
///
/// Elements are laid out with dimension 0 varying fastest. The shape is fixed
/// at construction; only element values can change afterwards, and only
/// through the accessors.
#[derive(Debug, Clone, PartialEq)]
pub struct Tensor<T> {
    shape: Shape,
    storage: Storage<T>,
}

impl<T: Element> Tensor<T> {
    /// Create a zero-filled tensor with the given shape.
    pub fn new(shape: Shape) -> Self {
        let storage = Storage::zeros(shape.size());
        Tensor { shape, storage }
    }

    /// Create a tensor from a shape and its elements in linear order.
    ///
    /// # Errors
    /// `ShapeMismatch` if `data.len() != shape.size()`.
    pub fn from_data(shape: Shape, data: Vec<T>) -> Result<Self> {
        if data.len() != shape.size() {
            return Err(TensorError::ShapeMismatch {
                op: "from_data",
                expected: vec![shape.size()],
                got: vec![data.len()],
            });
        }
        Ok(Tensor {
            shape,
            storage: Storage::from_vec(data),
        })
    }

    /// Evaluate `expr` into a new tensor with the default [`EvalConfig`].
    pub fn from_expression(expr: Expr<'_, T>) -> Self {
        materialize::materialize_default(&expr)
    }

    /// Evaluate `expr` into a new tensor using `backend`.
    pub fn from_expression_with(expr: Expr<'_, T>, backend: &dyn Materializer<T>) -> Result<Self> {
        materialize::materialize_with(&expr, backend)
    }

    /// Evaluate `expr` into a new tensor, picking the backend from `config`.
    pub fn from_expression_config(expr: Expr<'_, T>, config: &EvalConfig) -> Result<Self> {
        materialize::materialize(&expr, config)
    }

    /// Wrap storage the materializer already filled.
    pub(crate) fn from_parts(shape: Shape, storage: Storage<T>) -> Self {
        debug_assert_eq!(shape.size(), storage.len());
        Tensor { shape, storage }
    }

    pub fn shape(&self) -> &Shape {
        &self.shape
    }

    pub fn kind(&self) -> ShapeKind {
        self.shape.kind()
    }

    /// Number of axes.
    pub fn rank(&self) -> usize {
        self.shape.rank()
    }

    /// Total number of elements.
    pub fn size(&self) -> usize {
        self.shape.size()
    }

    /// Size of axis `d`.
    ///
    /// # Errors
    /// `OutOfRange` if `d >= rank()`.
    pub fn dim_size(&self, d: usize) -> Result<usize> {
        self.shape.dim(d)
    }

    pub fn dtype(&self) -> DType {
        T::DTYPE
    }

    /// All elements in linear order.
    pub fn data(&self) -> &[T] {
        self.storage.as_slice()
    }

    /// Reads the element at linear offset `i`.
    pub fn get_linear(&self, i: usize) -> Result<T> {
        self.storage.get(i)
    }

    /// Writes the element at linear offset `i`.
    pub fn set_linear(&mut self, i: usize, value: T) -> Result<()> {
        self.storage.set(i, value)
    }

    /// Reads the element at `coords`.
    ///
    /// # Errors
    /// `RankMismatch` for the wrong number of coordinates, `OutOfRange` for a
    /// coordinate past its axis.
    pub fn get(&self, coords: &[usize]) -> Result<T> {
        let offset = index::coords_to_linear(&self.shape, coords)?;
        self.storage.get(offset)
    }

    /// Writes the element at `coords`. Fails like [`Tensor::get`].
    pub fn set(&mut self, coords: &[usize], value: T) -> Result<()> {
        let offset = index::coords_to_linear(&self.shape, coords)?;
        self.storage.set(offset, value)
    }

    /// Attach one label per axis, for use in a contraction.
    pub fn labeled<L: Into<Label>>(
        &self,
        labels: impl IntoIterator<Item = L>,
    ) -> Result<LabeledView<'_, T>> {
        LabeledView::new(self, labels)
    }

    /// View this tensor as the leaf of an expression.
    pub fn expr(&self) -> Expr<'_, T> {
        Expr::leaf(self)
    }
}

impl<T: Element + SampleUniform> Tensor<T> {
    /// Create a tensor with elements drawn uniformly from `[low, high]`.
    ///
    /// # Errors
    /// `InvalidRange` as for [`Tensor::fill_uniform`].
    pub fn random_uniform(shape: Shape, low: T, high: T) -> Result<Self> {
        let mut t = Tensor::new(shape);
        t.fill_uniform(low, high, &mut rand::thread_rng())?;
        Ok(t)
    }

    /// Overwrite every element with a draw from `[low, high]`.
    ///
    /// # Errors
    /// `InvalidRange` if `low > high`, a float bound is NaN or infinite, or
    /// the float range is wider than the sampler can represent.
    pub fn fill_uniform<R: Rng + ?Sized>(&mut self, low: T, high: T, rng: &mut R) -> Result<()> {
        if !T::is_sampleable_range(low, high) {
            return Err(TensorError::InvalidRange { op: "fill_uniform" });
        }
        let dist = Uniform::new_inclusive(low, high);
        for slot in self.storage.as_mut_slice() {
            *slot = dist.sample(rng);
        }
        Ok(())
    }
}

impl<'a, T: Element> From<Expr<'a, T>> for Tensor<T> {
    fn from(expr: Expr<'a, T>) -> Self {
        Tensor::from_expression(expr)
    }
}
