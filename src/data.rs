mod engine_options;
mod send_channels;
mod time_calc;

pub use engine_options::EngineOptions;
pub use send_channels::CycleChannels;
pub use time_calc::TimeCalc;

pub use crate::detection_runners::ort_detector::input_wrapper::X;
pub use crate::detection_runners::ort_detector::raw_output::{PredictionTensor, RawOutput};

pub(crate) const CROSS_MARK: &str = "❌";
