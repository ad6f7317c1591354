//! Labeled-axis contraction (Einstein summation over two operands).
//!
//! Labels present on both operands are reduced: the paired axes are summed
//! away. The remaining (free) axes form the result, the left operand's free
//! axes first and the right operand's after, each in their original order.

use std::collections::HashMap;

use crate::dtype::Element;
use crate::error::{Result, TensorError};
use crate::index;
use crate::label::{Label, LabeledView};
use crate::shape::Shape;

/// Result axis: its size and how far one step along it moves in each operand.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct FreeAxis {
    size: usize,
    lhs_stride: usize,
    rhs_stride: usize,
}

/// A summed-away pair of axes.
#[derive(Debug, Clone, PartialEq, Eq)]
struct ReducedAxis {
    label: Label,
    lhs_axis: usize,
    rhs_axis: usize,
    size: usize,
}

/// A validated contraction of two labeled views, ready to evaluate.
#[derive(Debug, Clone)]
pub struct Contraction<'a, T> {
    lhs: LabeledView<'a, T>,
    rhs: LabeledView<'a, T>,
    free: Vec<FreeAxis>,
    reduced: Vec<ReducedAxis>,
    reduced_dims: Vec<usize>,
    reduced_lhs_strides: Vec<usize>,
    reduced_rhs_strides: Vec<usize>,
    labels: Vec<Label>,
    shape: Shape,
}

impl<'a, T: Element> Contraction<'a, T> {
    /// Classify the labels of `lhs` and `rhs` and build the evaluation plan.
    ///
    /// # Errors
    /// `DimensionSizeMismatch` if a shared label names axes of different sizes.
    /// Repeated labels never reach here: [`LabeledView::new`] rejects them.
    pub fn new(lhs: LabeledView<'a, T>, rhs: LabeledView<'a, T>) -> Result<Self> {
        let (free, reduced, labels) = classify(&lhs, &rhs)?;
        let lhs_strides = lhs.tensor().shape().strides();
        let rhs_strides = rhs.tensor().shape().strides();

        let shape = Shape::dynamic(free.iter().map(|f| f.size).collect::<Vec<_>>())?;
        let reduced_dims = reduced.iter().map(|r| r.size).collect();
        let reduced_lhs_strides = reduced.iter().map(|r| lhs_strides[r.lhs_axis]).collect();
        let reduced_rhs_strides = reduced.iter().map(|r| rhs_strides[r.rhs_axis]).collect();

        tracing::trace!(
            result = %shape,
            reduced = reduced.len(),
            free = free.len(),
            "planned contraction"
        );

        Ok(Contraction {
            lhs,
            rhs,
            free,
            reduced,
            reduced_dims,
            reduced_lhs_strides,
            reduced_rhs_strides,
            labels,
            shape,
        })
    }

    pub fn shape(&self) -> &Shape {
        &self.shape
    }

    pub fn lhs(&self) -> &LabeledView<'a, T> {
        &self.lhs
    }

    pub fn rhs(&self) -> &LabeledView<'a, T> {
        &self.rhs
    }

    /// Labels of the result axes: free left labels, then free right labels.
    pub fn result_labels(&self) -> &[Label] {
        &self.labels
    }

    /// Reduced labels with their (left axis, right axis) pairing.
    pub fn reduced_axes(&self) -> impl Iterator<Item = (&Label, usize, usize)> + '_ {
        self.reduced
            .iter()
            .map(|r| (&r.label, r.lhs_axis, r.rhs_axis))
    }

    /// Number of products summed for each result element.
    pub fn reduction_len(&self) -> usize {
        self.reduced_dims.iter().product()
    }

    /// Value of the result element at linear offset `offset`.
    ///
    /// `offset` must be smaller than `shape().size()`.
    pub(crate) fn value_at(&self, offset: usize) -> T {
        let lhs = self.lhs.tensor().data();
        let rhs = self.rhs.tensor().data();

        let mut lhs_base = 0;
        let mut rhs_base = 0;
        index::decompose(self.shape.dims(), offset, |axis, c| {
            let axis = &self.free[axis];
            lhs_base += c * axis.lhs_stride;
            rhs_base += c * axis.rhs_stride;
        });

        if self.reduced.is_empty() {
            return lhs[lhs_base] * rhs[rhs_base];
        }

        let mut counter = vec![0; self.reduced.len()];
        let mut sum = T::zero();
        loop {
            let mut lhs_offset = lhs_base;
            let mut rhs_offset = rhs_base;
            for (k, &c) in counter.iter().enumerate() {
                lhs_offset += c * self.reduced_lhs_strides[k];
                rhs_offset += c * self.reduced_rhs_strides[k];
            }
            sum = sum + lhs[lhs_offset] * rhs[rhs_offset];

            if !index::advance(&mut counter, &self.reduced_dims) {
                return sum;
            }
        }
    }
}

/// Second pass: split the axes of both operands into free and reduced sets.
fn classify<T: Element>(
    lhs: &LabeledView<'_, T>,
    rhs: &LabeledView<'_, T>,
) -> Result<(Vec<FreeAxis>, Vec<ReducedAxis>, Vec<Label>)> {
    let lhs_axes = axis_map(lhs.labels());
    let rhs_axes = axis_map(rhs.labels());

    let lhs_dims = lhs.tensor().shape().dims();
    let rhs_dims = rhs.tensor().shape().dims();
    let lhs_strides = lhs.tensor().shape().strides();
    let rhs_strides = rhs.tensor().shape().strides();

    let mut free = Vec::new();
    let mut reduced = Vec::new();
    let mut labels = Vec::new();

    for (lhs_axis, label) in lhs.labels().iter().enumerate() {
        match rhs_axes.get(label) {
            Some(&rhs_axis) => {
                let (lhs_size, rhs_size) = (lhs_dims[lhs_axis], rhs_dims[rhs_axis]);
                if lhs_size != rhs_size {
                    tracing::warn!(%label, lhs_size, rhs_size, "contracted axes differ in size");
                    return Err(TensorError::DimensionSizeMismatch {
                        label: label.clone(),
                        lhs_axis,
                        lhs_size,
                        rhs_axis,
                        rhs_size,
                    });
                }
                reduced.push(ReducedAxis {
                    label: label.clone(),
                    lhs_axis,
                    rhs_axis,
                    size: lhs_size,
                });
            }
            None => {
                free.push(FreeAxis {
                    size: lhs_dims[lhs_axis],
                    lhs_stride: lhs_strides[lhs_axis],
                    rhs_stride: 0,
                });
                labels.push(label.clone());
            }
        }
    }

    for (rhs_axis, label) in rhs.labels().iter().enumerate() {
        if !lhs_axes.contains_key(label) {
            free.push(FreeAxis {
                size: rhs_dims[rhs_axis],
                lhs_stride: 0,
                rhs_stride: rhs_strides[rhs_axis],
            });
            labels.push(label.clone());
        }
    }

    Ok((free, reduced, labels))
}

/// First pass: label -> axis for one operand. Labels are unique per view.
fn axis_map(labels: &[Label]) -> HashMap<&Label, usize> {
    labels
        .iter()
        .enumerate()
        .map(|(axis, label)| (label, axis))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tensor::Tensor;

    fn tensor(dims: &[usize], data: Vec<i64>) -> Tensor<i64> {
        Tensor::from_data(Shape::dynamic(dims).unwrap(), data).unwrap()
    }

    #[test]
    fn test_classification() {
        let a = Tensor::<f32>::new(Shape::dynamic(vec![2, 3, 4]).unwrap());
        let b = Tensor::<f32>::new(Shape::dynamic(vec![3, 2, 5, 6]).unwrap());
        let c = Contraction::new(
            a.labeled(["j", "i", "k"]).unwrap(),
            b.labeled(["i", "j", "l", "m"]).unwrap(),
        )
        .unwrap();

        let reduced: Vec<_> = c.reduced_axes().map(|(l, x, y)| (l.to_string(), x, y)).collect();
        assert_eq!(reduced, vec![("j".to_string(), 0, 1), ("i".to_string(), 1, 0)]);
        assert_eq!(c.shape().dims(), &[4, 5, 6]);
        assert_eq!(
            c.result_labels(),
            &[Label::from("k"), Label::from("l"), Label::from("m")]
        );
        assert_eq!(c.reduction_len(), 6);
    }

    #[test]
    fn test_axis_map_pairs_labels_with_axes() {
        let labels = [Label::from("k"), Label::from("i"), Label::from("j")];
        let axes = axis_map(&labels);
        assert_eq!(axes.len(), 3);
        assert_eq!(axes[&Label::from("i")], 1);
        assert_eq!(axes[&Label::from("j")], 2);
    }

    #[test]
    fn test_repeated_label_stops_at_view() {
        let a = Tensor::<f32>::new(Shape::dynamic(vec![2, 2]).unwrap());
        assert!(matches!(
            a.labeled(["i", "i"]),
            Err(TensorError::DuplicateLabel { first: 0, second: 1, .. })
        ));
    }

    #[test]
    fn test_dimension_size_mismatch() {
        let a = Tensor::<f32>::new(Shape::dynamic(vec![3, 2]).unwrap());
        let b = Tensor::<f32>::new(Shape::dynamic(vec![3, 3]).unwrap());
        let err = Contraction::new(a.labeled(["i", "j"]).unwrap(), b.labeled(["j", "k"]).unwrap())
            .unwrap_err();
        assert_eq!(
            err,
            TensorError::DimensionSizeMismatch {
                label: Label::from("j"),
                lhs_axis: 1,
                lhs_size: 2,
                rhs_axis: 0,
                rhs_size: 3,
            }
        );
    }

    #[test]
    fn test_matrix_product_values() {
        let a = tensor(&[3, 2], vec![1, 2, 3, 4, 5, 6]);
        let b = tensor(&[2, 3], vec![7, 8, 9, 10, 11, 12]);
        let c = Contraction::new(a.labeled(["i", "j"]).unwrap(), b.labeled(["j", "k"]).unwrap())
            .unwrap();
        let values: Vec<_> = (0..c.shape().size()).map(|i| c.value_at(i)).collect();
        assert_eq!(values, vec![39, 54, 69, 49, 68, 87, 59, 82, 105]);
    }

    #[test]
    fn test_outer_product_without_shared_labels() {
        let a = tensor(&[2], vec![1, 2]);
        let b = tensor(&[3], vec![10, 20, 30]);
        let c = Contraction::new(a.labeled(["i"]).unwrap(), b.labeled(["j"]).unwrap()).unwrap();
        assert_eq!(c.shape().dims(), &[2, 3]);
        assert_eq!(c.reduction_len(), 1);
        let values: Vec<_> = (0..6).map(|i| c.value_at(i)).collect();
        assert_eq!(values, vec![10, 20, 20, 40, 30, 60]);
    }

    #[test]
    fn test_full_contraction_is_scalar() {
        let a = tensor(&[2, 2], vec![1, 2, 3, 4]);
        let b = tensor(&[2, 2], vec![5, 6, 7, 8]);
        let c = Contraction::new(a.labeled(["i", "j"]).unwrap(), b.labeled(["i", "j"]).unwrap())
            .unwrap();
        assert_eq!(c.shape().rank(), 0);
        assert_eq!(c.shape().size(), 1);
        assert_eq!(c.value_at(0), 5 + 12 + 21 + 32);
    }
}
