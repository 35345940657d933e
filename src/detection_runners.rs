pub mod inference_process;
pub mod model_loader;
pub mod ort_detector;

pub use model_loader::*;
pub use ort_detector::*;
