//! Options for building the model backend.

use std::path::PathBuf;
use std::time::Duration;
use crate::common::{car_part_names, InferenceDevice};

#[derive(Debug, Clone)]
pub struct EngineOptions {
    pub model_path: PathBuf,
    pub ort_lib_path: Option<String>,
    pub device: InferenceDevice,
    pub input_size: u32,
    pub output_channels: usize,
    pub anchors: usize,
    pub names: Vec<String>,
    pub intra_threads: Option<usize>,
    pub runtime_wait: Duration,
    pub profile: bool,

    // trt related
    pub trt_fp16_enable: bool,
    pub trt_engine_cache_enable: bool,
}

impl Default for EngineOptions {
    fn default() -> Self {
        Self {
            model_path: PathBuf::new(),
            ort_lib_path: None,
            device: InferenceDevice::CPU,
            input_size: 640,
            output_channels: 59,
            anchors: 8400,
            names: car_part_names(),
            intra_threads: None,
            runtime_wait: Duration::from_secs(10),
            profile: false,

            trt_fp16_enable: false,
            trt_engine_cache_enable: true,
        }
    }
}

impl EngineOptions {
    pub fn new() -> Self {
        Default::default()
    }

    pub fn with_model<P: Into<PathBuf>>(mut self, model_path: P) -> Self {
        self.model_path = model_path.into();
        self
    }

    pub fn with_ort_lib_path(mut self, ort_lib_path: &str) -> Self {
        self.ort_lib_path = if ort_lib_path.is_empty() { None } else { Some(ort_lib_path.to_string()) };
        self
    }

    pub fn with_device(mut self, device: InferenceDevice) -> Self {
        self.device = device;
        self
    }

    pub fn with_input_size(mut self, size: u32) -> Self {
        self.input_size = size;
        self
    }

    /// Expected `[1, C, A]` output: `C` rows per anchor and `A` anchors.
    pub fn with_output_dims(mut self, channels: usize, anchors: usize) -> Self {
        self.output_channels = channels;
        self.anchors = anchors;
        self
    }

    pub fn with_names(mut self, names: &[&str]) -> Self {
        self.names = names.iter().map(|x| x.to_string()).collect::<Vec<String>>();
        self
    }

    pub fn with_name_list(mut self, names: Vec<String>) -> Self {
        self.names = names;
        self
    }

    pub fn with_intra_threads(mut self, n: usize) -> Self {
        self.intra_threads = Some(n);
        self
    }

    pub fn with_runtime_wait(mut self, wait: Duration) -> Self {
        self.runtime_wait = wait;
        self
    }

    pub fn with_profile(mut self, profile: bool) -> Self {
        self.profile = profile;
        self
    }

    pub fn with_trt_fp16(mut self, x: bool) -> Self {
        self.trt_fp16_enable = x;
        self
    }
}
