use std::time::Duration;
use thiserror::Error;

/// Errors raised by the detection pipeline and the annotation engine.
#[derive(Debug, Error)]
pub enum InspectError {
    #[error("Model failed to load: {0}")]
    ModelLoad(String),

    #[error("Inference runtime not available after waiting {0:?}")]
    RuntimeUnavailable(Duration),

    #[error("Unexpected inference output shape: expected {expected:?}, got {got:?}")]
    InferenceShape { expected: Vec<usize>, got: Vec<usize> },

    #[error("Inference runtime error: {0}")]
    Runtime(String),

    #[error("Non-max suppression failed: {0}")]
    Suppression(String),

    #[error("Model is not loaded or has been disposed")]
    NotReady,

    #[error("An inference cycle is already running on this model")]
    CycleInFlight,

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl InspectError {
    pub fn shape(expected: &[usize], got: &[usize]) -> Self {
        Self::InferenceShape {
            expected: expected.to_vec(),
            got: got.to_vec(),
        }
    }
}
