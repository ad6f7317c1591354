use std::fmt::Debug;

use crate::dtype::Element;
use crate::error::{Result, TensorError};
use crate::expr::Expr;

/// Trait for pluggable materializers (serial CPU, rayon, ...).
///
/// A materializer evaluates every element of an expression into an output
/// buffer the caller allocated. Evaluation only reads the operand tensors, so
/// elements may be computed in any order or concurrently.
pub trait Materializer<T: Element>: Send + Sync + Debug {
    /// Returns the name of this materializer (e.g., "cpu", "cpu-parallel").
    fn name(&self) -> &str;

    /// Writes element `i` of `expr` into `out[i]` for every linear offset.
    ///
    /// # Errors
    /// `ShapeMismatch` if `out.len() != expr.size()`.
    fn fill(&self, expr: &Expr<'_, T>, out: &mut [T]) -> Result<()>;
}

pub(crate) fn check_output_len<T: Element>(expr: &Expr<'_, T>, out: &[T]) -> Result<()> {
    if out.len() != expr.size() {
        return Err(TensorError::ShapeMismatch {
            op: "fill",
            expected: vec![expr.size()],
            got: vec![out.len()],
        });
    }
    Ok(())
}
