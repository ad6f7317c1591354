//! Lazy tensor expressions.
//!
//! An [`Expr`] borrows its operand tensors and never copies element data.
//! Shapes are checked when a node is built, so a finished expression always
//! evaluates without error. Converting it into a [`Tensor`] runs the
//! materializer.

use std::ops::{Add, Mul, Sub};

use crate::contract::Contraction;
use crate::dtype::Element;
use crate::error::{Result, TensorError};
use crate::index;
use crate::label::{Label, LabeledView};
use crate::shape::Shape;
use crate::tensor::Tensor;

/// The node kinds of an expression graph.
#[derive(Debug, Clone)]
pub enum Node<'a, T> {
    /// A borrowed tensor.
    Leaf(&'a Tensor<T>),
    /// Element-wise sum of two equally shaped operands.
    Add(Box<Expr<'a, T>>, Box<Expr<'a, T>>),
    /// Element-wise difference of two equally shaped operands.
    Sub(Box<Expr<'a, T>>, Box<Expr<'a, T>>),
    /// Labeled-axis contraction of two tensors.
    Contract(Box<Contraction<'a, T>>),
}

/// A lazily evaluated tensor expression together with its result shape.
#[derive(Debug, Clone)]
pub struct Expr<'a, T> {
    shape: Shape,
    node: Node<'a, T>,
}

impl<'a, T: Element> Expr<'a, T> {
    /// An expression that reads `tensor` directly.
    pub fn leaf(tensor: &'a Tensor<T>) -> Self {
        Expr {
            shape: tensor.shape().clone(),
            node: Node::Leaf(tensor),
        }
    }

    /// The shape of the tensor this expression evaluates to.
    pub fn shape(&self) -> &Shape {
        &self.shape
    }

    pub fn rank(&self) -> usize {
        self.shape.rank()
    }

    pub fn size(&self) -> usize {
        self.shape.size()
    }

    pub fn node(&self) -> &Node<'a, T> {
        &self.node
    }

    /// Labels of the result axes when the root node is a contraction.
    pub fn result_labels(&self) -> Option<&[Label]> {
        match &self.node {
            Node::Contract(c) => Some(c.result_labels()),
            _ => None,
        }
    }

    /// Evaluate the element at `coords` without materializing the rest.
    ///
    /// # Errors
    /// `RankMismatch` or `OutOfRange` as for [`Tensor::get`].
    pub fn get(&self, coords: &[usize]) -> Result<T> {
        let offset = index::coords_to_linear(&self.shape, coords)?;
        Ok(self.value_at(offset))
    }

    /// Evaluate the element at linear offset `i`.
    ///
    /// # Errors
    /// `OutOfRange` if `i >= size()`.
    pub fn get_linear(&self, i: usize) -> Result<T> {
        if i >= self.shape.size() {
            return Err(TensorError::linear(i, self.shape.size()));
        }
        Ok(self.value_at(i))
    }

    /// Evaluate the element at a linear offset known to be in range.
    ///
    /// Add and Sub operands share the result shape, so the same offset
    /// addresses corresponding elements on both sides.
    pub(crate) fn value_at(&self, i: usize) -> T {
        match &self.node {
            Node::Leaf(t) => t.data()[i],
            Node::Add(lhs, rhs) => lhs.value_at(i) + rhs.value_at(i),
            Node::Sub(lhs, rhs) => lhs.value_at(i) - rhs.value_at(i),
            Node::Contract(c) => c.value_at(i),
        }
    }
}

impl<'a, T: Element> From<&'a Tensor<T>> for Expr<'a, T> {
    fn from(tensor: &'a Tensor<T>) -> Self {
        Expr::leaf(tensor)
    }
}

fn elementwise<'a, T: Element>(
    op: &'static str,
    lhs: Expr<'a, T>,
    rhs: Expr<'a, T>,
    node: fn(Box<Expr<'a, T>>, Box<Expr<'a, T>>) -> Node<'a, T>,
) -> Result<Expr<'a, T>> {
    if lhs.shape != rhs.shape {
        tracing::warn!(op, lhs = %lhs.shape, rhs = %rhs.shape, "operand shapes differ");
        return Err(TensorError::ShapeMismatch {
            op,
            expected: lhs.shape.dims().to_vec(),
            got: rhs.shape.dims().to_vec(),
        });
    }
    tracing::debug!(op, shape = %lhs.shape, "built element-wise expression");
    Ok(Expr {
        shape: lhs.shape.clone(),
        node: node(Box::new(lhs), Box::new(rhs)),
    })
}

/// Lazy element-wise `lhs + rhs`.
///
/// # Errors
/// `ShapeMismatch` if the operands differ in rank or in any axis size.
pub fn add<'a, T: Element>(
    lhs: impl Into<Expr<'a, T>>,
    rhs: impl Into<Expr<'a, T>>,
) -> Result<Expr<'a, T>> {
    elementwise("add", lhs.into(), rhs.into(), Node::Add)
}

/// Lazy element-wise `lhs - rhs`.
///
/// # Errors
/// `ShapeMismatch` if the operands differ in rank or in any axis size.
pub fn sub<'a, T: Element>(
    lhs: impl Into<Expr<'a, T>>,
    rhs: impl Into<Expr<'a, T>>,
) -> Result<Expr<'a, T>> {
    elementwise("sub", lhs.into(), rhs.into(), Node::Sub)
}

/// Lazy contraction over the labels `lhs` and `rhs` share.
///
/// # Errors
/// `DimensionSizeMismatch` if a shared label names axes of different sizes.
/// Repeated labels are rejected earlier, when the view is labeled.
pub fn contract<'a, T: Element>(
    lhs: LabeledView<'a, T>,
    rhs: LabeledView<'a, T>,
) -> Result<Expr<'a, T>> {
    let contraction = Contraction::new(lhs, rhs)?;
    tracing::debug!(
        shape = %contraction.shape(),
        reduction = contraction.reduction_len(),
        "built contraction expression"
    );
    Ok(Expr {
        shape: contraction.shape().clone(),
        node: Node::Contract(Box::new(contraction)),
    })
}

// Operator sugar. Every combination of tensor reference and expression
// yields `Result<Expr>` since the shape check can fail.
macro_rules! impl_binary_op {
    ($trait:ident, $method:ident, $func:ident) => {
        impl<'a, T: Element> $trait<&'a Tensor<T>> for &'a Tensor<T> {
            type Output = Result<Expr<'a, T>>;
            fn $method(self, rhs: &'a Tensor<T>) -> Self::Output {
                $func(self, rhs)
            }
        }

        impl<'a, T: Element> $trait<&'a Tensor<T>> for Expr<'a, T> {
            type Output = Result<Expr<'a, T>>;
            fn $method(self, rhs: &'a Tensor<T>) -> Self::Output {
                $func(self, rhs)
            }
        }

        impl<'a, T: Element> $trait<Expr<'a, T>> for &'a Tensor<T> {
            type Output = Result<Expr<'a, T>>;
            fn $method(self, rhs: Expr<'a, T>) -> Self::Output {
                $func(self, rhs)
            }
        }

        impl<'a, T: Element> $trait<Expr<'a, T>> for Expr<'a, T> {
            type Output = Result<Expr<'a, T>>;
            fn $method(self, rhs: Expr<'a, T>) -> Self::Output {
                $func(self, rhs)
            }
        }
    };
}

impl_binary_op!(Add, add, add);
impl_binary_op!(Sub, sub, sub);

impl<'a, T: Element> Mul<LabeledView<'a, T>> for LabeledView<'a, T> {
    type Output = Result<Expr<'a, T>>;

    fn mul(self, rhs: LabeledView<'a, T>) -> Self::Output {
        contract(self, rhs)
    }
}
