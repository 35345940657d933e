mod ort_engine;
mod part_detector;
pub mod image_ops;
pub mod input_wrapper;
pub mod nms;
pub mod raw_output;

pub use ort_engine::*;
pub use part_detector::*;
