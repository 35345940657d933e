use ndarray::{Array, IxDyn};
use crate::common::InspectError;

/// Model input tensor, wrapper over [`Array<f32, IxDyn>`].
#[derive(Debug, Clone, Default)]
pub struct X(pub Array<f32, IxDyn>);

impl From<Array<f32, IxDyn>> for X {
    fn from(x: Array<f32, IxDyn>) -> Self {
        Self(x)
    }
}

impl std::ops::Deref for X {
    type Target = Array<f32, IxDyn>;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl X {
    pub fn from_shape_vec(shape: &[usize], xs: Vec<f32>) -> Result<Self, InspectError> {
        let got = xs.len();
        let array = Array::from_shape_vec(shape, xs).map_err(|_| InspectError::shape(shape, &[got]))?;
        Ok(Self::from(array))
    }

    pub fn into_inner(self) -> Array<f32, IxDyn> {
        self.0
    }
}
