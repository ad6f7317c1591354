use std::borrow::Cow;
use std::collections::HashMap;
use std::fmt;

use crate::dtype::Element;
use crate::error::{Result, TensorError};
use crate::tensor::Tensor;

/// Symbolic tag for one axis of a contraction operand.
///
/// Labels are opaque: two axes are paired by a contraction exactly when their
/// labels compare equal.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Label(Cow<'static, str>);

impl Label {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&'static str> for Label {
    fn from(s: &'static str) -> Self {
        Label(Cow::Borrowed(s))
    }
}

impl From<String> for Label {
    fn from(s: String) -> Self {
        Label(Cow::Owned(s))
    }
}

impl From<char> for Label {
    fn from(c: char) -> Self {
        Label(Cow::Owned(c.to_string()))
    }
}

/// A borrowed tensor with one label per axis.
///
/// Holds no element data of its own. The label list always has exactly one
/// entry per axis and never repeats a label.
#[derive(Debug, Clone)]
pub struct LabeledView<'a, T> {
    tensor: &'a Tensor<T>,
    labels: Vec<Label>,
}

impl<'a, T: Element> LabeledView<'a, T> {
    /// Attach `labels` to the axes of `tensor`, in axis order.
    ///
    /// # Errors
    /// `RankMismatch` if the label count differs from the tensor rank,
    /// `DuplicateLabel` if any label appears twice.
    pub fn new<L: Into<Label>>(
        tensor: &'a Tensor<T>,
        labels: impl IntoIterator<Item = L>,
    ) -> Result<Self> {
        let labels: Vec<Label> = labels.into_iter().map(Into::into).collect();
        if labels.len() != tensor.rank() {
            return Err(TensorError::RankMismatch {
                expected: tensor.rank(),
                got: labels.len(),
            });
        }

        let mut seen: HashMap<&Label, usize> = HashMap::with_capacity(labels.len());
        for (axis, label) in labels.iter().enumerate() {
            if let Some(&first) = seen.get(label) {
                tracing::warn!(%label, first, second = axis, "rejecting repeated axis label");
                return Err(TensorError::DuplicateLabel {
                    label: label.clone(),
                    first,
                    second: axis,
                });
            }
            seen.insert(label, axis);
        }

        Ok(LabeledView { tensor, labels })
    }

    pub fn tensor(&self) -> &'a Tensor<T> {
        self.tensor
    }

    pub fn labels(&self) -> &[Label] {
        &self.labels
    }

    /// Axis carrying `label`, if any.
    pub fn axis_of(&self, label: &Label) -> Option<usize> {
        self.labels.iter().position(|l| l == label)
    }
}

/// Attach one label per axis of `tensor`. See [`LabeledView::new`].
pub fn label<'a, T: Element, L: Into<Label>>(
    tensor: &'a Tensor<T>,
    labels: impl IntoIterator<Item = L>,
) -> Result<LabeledView<'a, T>> {
    LabeledView::new(tensor, labels)
}
