//! Normalization of whatever the runtime hands back into the canonical
//! `[1, C, A]` prediction tensor the decoder consumes.

use ndarray::{Array, Array3, Axis, IxDyn};
use crate::common::InspectError;

/// Canonical decoder input: batch × channels × anchors.
pub type PredictionTensor = Array3<f32>;

/// Output of a single backend call, as returned by the runtime.
#[derive(Debug, Clone)]
pub enum RawOutput {
    /// A bare n-dimensional array.
    Array(Array<f32, IxDyn>),
    /// Named outputs; the detection head is `output0` or the first entry.
    Keyed(Vec<(String, Array<f32, IxDyn>)>),
    /// Flat buffer plus its reported dimensions.
    Flat { shape: Vec<usize>, data: Vec<f32> },
}

const PRIMARY_OUTPUT: &str = "output0";

impl RawOutput {
    pub fn shape(&self) -> Vec<usize> {
        match self {
            RawOutput::Array(a) => a.shape().to_vec(),
            RawOutput::Keyed(entries) => entries.first().map(|(_, a)| a.shape().to_vec()).unwrap_or_default(),
            RawOutput::Flat { shape, .. } => shape.clone(),
        }
    }

    /// Coerces the output into `[1, channels, anchors]`.
    ///
    /// Accepted layouts: `[1, C, A]`, `[C, A]`, `[1, A, C]`, `[A, C]` and a
    /// flat buffer of exactly `C * A` values.
    pub fn normalize(self, channels: usize, anchors: usize) -> Result<PredictionTensor, InspectError> {
        let expected = [1, channels, anchors];
        let array = match self {
            RawOutput::Array(a) => a,
            RawOutput::Keyed(entries) => select_primary(entries).ok_or_else(|| InspectError::shape(&expected, &[]))?,
            RawOutput::Flat { shape, data } => {
                let got = if shape.is_empty() { vec![data.len()] } else { shape };
                Array::from_shape_vec(IxDyn(&got), data)
                    .or_else(|e| {
                        log::debug!("Flat output does not match reported shape {:?}: {}", got, e);
                        Err(InspectError::shape(&expected, &got))
                    })?
            }
        };

        let got = array.shape().to_vec();
        let squeezed = match got.as_slice() {
            [1, c, a] if *c == channels && *a == anchors => array,
            [c, a] if *c == channels && *a == anchors => array.insert_axis(Axis(0)),
            [1, a, c] if *c == channels && *a == anchors => array.permuted_axes(IxDyn(&[0, 2, 1])),
            [a, c] if *c == channels && *a == anchors => array.reversed_axes().insert_axis(Axis(0)),
            [n] if *n == channels * anchors => array
                .into_shape_with_order(IxDyn(&expected))
                .map_err(|_| InspectError::shape(&expected, &got))?,
            _ => return Err(InspectError::shape(&expected, &got)),
        };

        squeezed
            .as_standard_layout()
            .into_owned()
            .into_dimensionality::<ndarray::Ix3>()
            .map_err(|_| InspectError::shape(&expected, &got))
    }
}

fn select_primary(mut entries: Vec<(String, Array<f32, IxDyn>)>) -> Option<Array<f32, IxDyn>> {
    match entries.iter().position(|(name, _)| name == PRIMARY_OUTPUT) {
        Some(i) => Some(entries.swap_remove(i).1),
        None if !entries.is_empty() => Some(entries.swap_remove(0).1),
        None => None,
    }
}
