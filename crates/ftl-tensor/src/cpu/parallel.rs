use rayon::prelude::*;
use rayon::{ThreadPool, ThreadPoolBuilder};

use crate::backend::{check_output_len, Materializer};
use crate::config::EvalConfig;
use crate::cpu::fill_serial;
use crate::dtype::Element;
use crate::error::{Result, TensorError};
use crate::expr::Expr;

/// Materializer that evaluates output chunks on rayon workers.
///
/// Output elements are independent reads of the same operands, so chunks are
/// filled concurrently without locking. Results below the threshold are
/// evaluated serially.
#[derive(Debug)]
pub struct ParallelMaterializer {
    threshold: usize,
    chunk_size: usize,
    pool: Option<ThreadPool>,
}

impl ParallelMaterializer {
    /// Default settings on rayon's global pool.
    pub fn new() -> Self {
        let config = EvalConfig::default();
        ParallelMaterializer {
            threshold: config.parallel_threshold,
            chunk_size: config.chunk_size,
            pool: None,
        }
    }

    /// Build from `config`, creating a dedicated pool when `num_threads` is set.
    pub fn from_config(config: &EvalConfig) -> Result<Self> {
        config.validate()?;
        let pool = match config.num_threads {
            Some(n) => Some(
                ThreadPoolBuilder::new()
                    .num_threads(n)
                    .thread_name(|i| format!("ftl-eval-{i}"))
                    .build()
                    .map_err(|e| TensorError::ThreadPool(e.to_string()))?,
            ),
            None => None,
        };
        Ok(ParallelMaterializer {
            threshold: config.parallel_threshold,
            chunk_size: config.chunk_size,
            pool,
        })
    }

    /// Number of workers that will evaluate large results.
    pub fn num_threads(&self) -> usize {
        match &self.pool {
            Some(pool) => pool.current_num_threads(),
            None => rayon::current_num_threads(),
        }
    }

    /// `out` must hold exactly `expr.size()` elements.
    pub(crate) fn fill_unchecked<T: Element>(&self, expr: &Expr<'_, T>, out: &mut [T]) {
        if out.len() < self.threshold {
            fill_serial(expr, out);
            return;
        }

        let chunk_size = self.chunk_size;
        match &self.pool {
            Some(pool) => pool.install(|| fill_chunks(expr, out, chunk_size)),
            None => fill_chunks(expr, out, chunk_size),
        }
    }
}

fn fill_chunks<T: Element>(expr: &Expr<'_, T>, out: &mut [T], chunk_size: usize) {
    out.par_chunks_mut(chunk_size)
        .enumerate()
        .for_each(|(chunk, block)| {
            let start = chunk * chunk_size;
            for (j, slot) in block.iter_mut().enumerate() {
                *slot = expr.value_at(start + j);
            }
        });
}

impl Default for ParallelMaterializer {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Element> Materializer<T> for ParallelMaterializer {
    fn name(&self) -> &str {
        "cpu-parallel"
    }

    fn fill(&self, expr: &Expr<'_, T>, out: &mut [T]) -> Result<()> {
        check_output_len(expr, out)?;
        self.fill_unchecked(expr, out);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cpu::SerialMaterializer;
    use crate::expr::{add, contract};
    use crate::shape::Shape;
    use crate::tensor::Tensor;

    fn config(threads: Option<usize>) -> EvalConfig {
        EvalConfig {
            parallel_threshold: 0,
            chunk_size: 7,
            num_threads: threads,
            ..Default::default()
        }
    }

    fn ramp(dims: &[usize]) -> Tensor<i64> {
        let shape = Shape::dynamic(dims).unwrap();
        let data = (0..shape.size() as i64).collect();
        Tensor::from_data(shape, data).unwrap()
    }

    #[test]
    fn test_matches_serial_for_contraction() {
        let a = ramp(&[6, 5, 4]);
        let b = ramp(&[5, 9]);
        let e = contract(a.labeled(["i", "j", "k"]).unwrap(), b.labeled(["j", "l"]).unwrap())
            .unwrap();

        let mut serial = vec![0; e.size()];
        SerialMaterializer.fill(&e, &mut serial).unwrap();

        let mut parallel = vec![0; e.size()];
        ParallelMaterializer::from_config(&config(Some(3)))
            .unwrap()
            .fill(&e, &mut parallel)
            .unwrap();

        assert_eq!(serial, parallel);
    }

    #[test]
    fn test_global_pool_elementwise() {
        let a = ramp(&[10, 10]);
        let e = add(&a, &a).unwrap();
        let backend = ParallelMaterializer::from_config(&config(None)).unwrap();
        let mut out = vec![0; 100];
        backend.fill(&e, &mut out).unwrap();
        assert!(out.iter().enumerate().all(|(i, &v)| v == 2 * i as i64));
    }

    #[test]
    fn test_dedicated_pool_size() {
        let backend = ParallelMaterializer::from_config(&config(Some(2))).unwrap();
        assert_eq!(backend.num_threads(), 2);
        assert_eq!(Materializer::<f32>::name(&backend), "cpu-parallel");
    }

    #[test]
    fn test_rejects_invalid_config() {
        let bad = EvalConfig {
            chunk_size: 0,
            ..Default::default()
        };
        assert!(ParallelMaterializer::from_config(&bad).is_err());
    }
}
