#[cfg(feature = "rayon")]
pub mod parallel;

use crate::backend::{check_output_len, Materializer};
use crate::dtype::Element;
use crate::error::Result;
use crate::expr::Expr;

#[cfg(feature = "rayon")]
pub use parallel::ParallelMaterializer;

/// Single-threaded materializer.
///
/// Walks the output in linear order and evaluates the expression at each
/// offset. Intended as the reference implementation and fallback.
#[derive(Debug, Clone, Copy)]
pub struct SerialMaterializer;

impl SerialMaterializer {
    pub fn new() -> Self {
        SerialMaterializer
    }
}

impl Default for SerialMaterializer {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Element> Materializer<T> for SerialMaterializer {
    fn name(&self) -> &str {
        "cpu"
    }

    fn fill(&self, expr: &Expr<'_, T>, out: &mut [T]) -> Result<()> {
        check_output_len(expr, out)?;
        fill_serial(expr, out);
        Ok(())
    }
}

/// `out` must hold exactly `expr.size()` elements.
pub(crate) fn fill_serial<T: Element>(expr: &Expr<'_, T>, out: &mut [T]) {
    for (i, slot) in out.iter_mut().enumerate() {
        *slot = expr.value_at(i);
    }
}
