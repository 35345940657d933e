mod utils;
pub mod annotation;
pub mod capture_session;
pub mod common;
pub mod data;
pub mod detection_processing;
pub mod detection_runners;
pub mod part_validation;

use std::time::Instant;
use image::RgbImage;
use crate::common::{InspectError, InspectionFrame, ModelConfig};
use crate::detection_runners::inference_process::InferenceProcess;
use crate::detection_runners::{load_model, ModelBackend, OrtEngine, PartDetector};
use crate::part_validation::ValidationResult;

pub type Result<T, E = InspectError> = std::result::Result<T, E>;

/// Loads the ONNX model described by `model_details` and warms it up with
/// one blank frame.
pub async fn init_detector(model_details: &ModelConfig) -> anyhow::Result<PartDetector<OrtEngine>> {
    init_detector_with::<OrtEngine>(model_details).await
}

pub async fn init_detector_with<B: ModelBackend>(model_details: &ModelConfig) -> anyhow::Result<PartDetector<B>> {
    model_details.validate()?;
    let options = model_details.engine_options()?;

    log::info!("Initializing detector with ({}) execution provider", model_details.inference_device);
    let handle = load_model::<B>(&options).await?;
    let mut detector = PartDetector::new(handle, model_details);

    let size = model_details.input_size;
    detector.run(&InspectionFrame::from(RgbImage::new(size, size)))?;
    Ok(detector)
}

/// One detection cycle on a single frame, validated against `position`.
pub fn run_detection<B: ModelBackend>(detector: &mut PartDetector<B>, frame: &InspectionFrame, position: &str) -> anyhow::Result<ValidationResult> {
    let now = Instant::now();

    let profile = detector.profile();
    let detections = detector.forward(frame, profile)?;

    log::debug!("Processing time: {:?}", now.elapsed());

    Ok(part_validation::validate(position, detections))
}
