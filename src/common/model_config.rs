use std::path::Path;
use std::time::Duration;
use serde::{Deserialize, Serialize};
use crate::common::{car_part_names, InferenceDevice, InspectError};
use crate::data::EngineOptions;
use crate::detection_processing::DecodeParams;
use crate::detection_runners::ort_detector::nms::SuppressionParams;
use crate::utils;

/// File-level configuration of the capture-side detector. Every field has a
/// default so a partial JSON document is enough.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelConfig {
    pub weights_path: String,
    pub ort_lib_path: String,
    pub labels_path: Option<String>,
    pub inference_device: InferenceDevice,
    pub input_size: u32,
    pub output_channels: usize,
    pub anchors: usize,
    pub conf_threshold: f32,
    pub iou_threshold: f32,
    pub max_detections: usize,
    pub nms_score_threshold: f32,
    pub runtime_wait_ms: u64,
    pub inference_interval_ms: u64,
    pub profile: bool,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            weights_path: String::new(),
            ort_lib_path: String::new(),
            labels_path: None,
            inference_device: InferenceDevice::CPU,
            input_size: 640,
            output_channels: 59,
            anchors: 8400,
            conf_threshold: 0.30,
            iou_threshold: 0.45,
            max_detections: 20,
            nms_score_threshold: 0.30,
            runtime_wait_ms: 10_000,
            inference_interval_ms: 1_500,
            profile: false,
        }
    }
}

impl ModelConfig {
    pub fn new(weights_path: &str, ort_lib_path: &str, inference_device: InferenceDevice) -> Self {
        Self {
            weights_path: weights_path.to_string(),
            ort_lib_path: ort_lib_path.to_string(),
            inference_device,
            ..Default::default()
        }
    }

    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self, InspectError> {
        let text = std::fs::read_to_string(path)?;
        let config: ModelConfig = serde_json::from_str(&text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), InspectError> {
        if self.input_size == 0 {
            return Err(InspectError::Config("input_size must be positive".into()));
        }
        if !(0.0..1.0).contains(&self.conf_threshold) {
            return Err(InspectError::Config(format!("conf_threshold {} outside [0, 1)", self.conf_threshold)));
        }
        if !(0.0..=1.0).contains(&self.iou_threshold) {
            return Err(InspectError::Config(format!("iou_threshold {} outside [0, 1]", self.iou_threshold)));
        }
        if self.max_detections == 0 {
            return Err(InspectError::Config("max_detections must be positive".into()));
        }
        Ok(())
    }

    /// Class names from the labels file, or the built-in car-part vocabulary.
    pub fn labels(&self) -> Result<Vec<String>, InspectError> {
        match &self.labels_path {
            Some(path) => {
                let names = utils::file_to_vec(path)?;
                if names.is_empty() {
                    return Err(InspectError::Config(format!("Labels file {path} is empty")));
                }
                Ok(names)
            }
            None => Ok(car_part_names()),
        }
    }

    pub fn engine_options(&self) -> Result<EngineOptions, InspectError> {
        Ok(EngineOptions::new()
            .with_model(&self.weights_path)
            .with_ort_lib_path(&self.ort_lib_path)
            .with_device(self.inference_device)
            .with_input_size(self.input_size)
            .with_output_dims(self.output_channels, self.anchors)
            .with_name_list(self.labels()?)
            .with_runtime_wait(Duration::from_millis(self.runtime_wait_ms))
            .with_profile(self.profile))
    }

    pub fn decode_params(&self) -> DecodeParams {
        DecodeParams {
            input_size: self.input_size as f32,
            conf_threshold: self.conf_threshold,
        }
    }

    pub fn suppression_params(&self) -> SuppressionParams {
        SuppressionParams {
            iou_threshold: self.iou_threshold,
            max_output: self.max_detections,
            score_threshold: self.nms_score_threshold,
        }
    }

    pub fn inference_interval(&self) -> Duration {
        Duration::from_millis(self.inference_interval_ms)
    }
}

impl std::fmt::Display for ModelConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Weights File Path: {}\n\
        Labels Path: {}\n\
        OnnxRuntime Lib Path: {}\n\
        Inference Device: {}\n\
        Model Input Resolution: {}x{}\n\
        Detection Threshold: {}",
               self.weights_path,
               self.labels_path.as_deref().unwrap_or("<built-in>"),
               self.ort_lib_path,
               self.inference_device,
               self.input_size, self.input_size, self.conf_threshold)
    }
}
