//! `ftl-tensor` - Shape-checked tensors with lazy expressions.
//!
//! This crate provides:
//! - A `Tensor` type owning a fixed- or dynamic-shape element buffer
//! - Coordinate <-> linear offset mapping (dimension 0 varies fastest)
//! - Lazy element-wise addition and subtraction expressions
//! - Labeled-axis contraction (Einstein summation) between two tensors
//! - Serial and rayon-backed materializers that evaluate expressions
//!
//! ```
//! use ftl_tensor::{contract, Shape, Tensor};
//!
//! let a = Tensor::from_data(Shape::fixed([3, 2])?, vec![1, 2, 3, 4, 5, 6])?;
//! let b = Tensor::from_data(Shape::fixed([2, 3])?, vec![7, 8, 9, 10, 11, 12])?;
//! let c = Tensor::from_expression(contract(a.labeled(["i", "j"])?, b.labeled(["j", "k"])?)?);
//! assert_eq!(c.data(), &[39, 54, 69, 49, 68, 87, 59, 82, 105]);
//! # Ok::<(), ftl_tensor::TensorError>(())
//! ```

pub mod backend;
pub mod config;
pub mod contract;
pub mod cpu;
pub mod dtype;
pub mod error;
pub mod expr;
pub mod index;
pub mod label;
pub mod materialize;
pub mod shape;
pub mod storage;
pub mod tensor;

// Re-export primary types at the crate root for convenience.
pub use backend::Materializer;
pub use config::EvalConfig;
pub use contract::Contraction;
#[cfg(feature = "rayon")]
pub use cpu::ParallelMaterializer;
pub use cpu::SerialMaterializer;
pub use dtype::{DType, Element};
pub use error::{RangeTarget, Result, TensorError};
pub use expr::{add, contract, sub, Expr, Node};
pub use index::{coords_to_linear, linear_to_coords, CoordIter};
pub use label::{label, Label, LabeledView};
pub use materialize::{materialize, materialize_with};
pub use shape::{Shape, ShapeKind};
pub use storage::Storage;
pub use tensor::Tensor;
