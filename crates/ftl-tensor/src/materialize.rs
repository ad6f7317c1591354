//! Evaluation of expression graphs into concrete tensors.
//!
//! The result shape is read from the root of the expression (computed when
//! each node was built), a zeroed tensor of that shape is allocated, and the
//! chosen [`Materializer`] writes every element. Operands are only read.

use crate::config::EvalConfig;
use crate::cpu::SerialMaterializer;
#[cfg(feature = "rayon")]
use crate::cpu::ParallelMaterializer;
use crate::dtype::Element;
use crate::error::Result;
use crate::expr::Expr;
use crate::storage::Storage;
use crate::tensor::Tensor;

pub use crate::backend::Materializer;

/// Evaluate `expr`, choosing the materializer from `config`.
///
/// With `num_threads` set, every call starts and joins a dedicated rayon
/// pool. Callers that evaluate repeatedly should build one
/// [`ParallelMaterializer`](crate::ParallelMaterializer) with
/// `from_config` and pass it to [`materialize_with`].
///
/// # Errors
/// `Config` for invalid settings, `ThreadPool` if a dedicated pool cannot be
/// started.
pub fn materialize<T: Element>(expr: &Expr<'_, T>, config: &EvalConfig) -> Result<Tensor<T>> {
    config.validate()?;

    #[cfg(feature = "rayon")]
    if config.parallel {
        let backend = ParallelMaterializer::from_config(config)?;
        return materialize_with(expr, &backend);
    }

    materialize_with(expr, &SerialMaterializer)
}

/// Evaluate `expr` with an explicit materializer.
pub fn materialize_with<T: Element>(
    expr: &Expr<'_, T>,
    backend: &dyn Materializer<T>,
) -> Result<Tensor<T>> {
    let shape = expr.shape().clone();
    let mut storage = Storage::zeros(shape.size());

    tracing::debug!(
        backend = backend.name(),
        shape = %shape,
        elements = shape.size(),
        "materializing expression"
    );
    backend.fill(expr, storage.as_mut_slice())?;

    Ok(Tensor::from_parts(shape, storage))
}

/// Evaluate `expr` with the default settings.
///
/// The default configuration has no dedicated pool and the output is sized
/// from the expression, so nothing here can fail.
pub(crate) fn materialize_default<T: Element>(expr: &Expr<'_, T>) -> Tensor<T> {
    let shape = expr.shape().clone();
    let mut storage = Storage::zeros(shape.size());

    tracing::debug!(shape = %shape, elements = shape.size(), "materializing expression");

    #[cfg(feature = "rayon")]
    ParallelMaterializer::new().fill_unchecked(expr, storage.as_mut_slice());
    #[cfg(not(feature = "rayon"))]
    crate::cpu::fill_serial(expr, storage.as_mut_slice());

    Tensor::from_parts(shape, storage)
}
