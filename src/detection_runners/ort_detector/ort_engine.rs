//! ONNX Runtime backend for the part detector.

use std::path::Path;
use half::f16;
use ndarray::{Array, IxDyn};
use ort::{
    execution_providers::{ExecutionProvider,
                          CPUExecutionProvider,
                          CUDAExecutionProvider,
                          TensorRTExecutionProvider},
    session::builder::{GraphOptimizationLevel, SessionBuilder},
    session::{Session, SessionInputValue},
    value::{DynValue, Value},
};
use regex::Regex;
use crate::common::{InferenceDevice, InspectError};
use crate::data::{EngineOptions, CROSS_MARK, X};
use crate::detection_runners::model_loader::ModelBackend;
use crate::detection_runners::ort_detector::raw_output::RawOutput;

#[derive(Debug)]
pub struct OrtEngine {
    session: Session,
    device: InferenceDevice,
    input_name: String,
    output_names: Vec<String>,
}

fn load_err<E: std::fmt::Display>(e: E) -> InspectError {
    InspectError::ModelLoad(e.to_string())
}

fn runtime_err<E: std::fmt::Display>(e: E) -> InspectError {
    InspectError::Runtime(e.to_string())
}

impl ModelBackend for OrtEngine {
    fn runtime_available(options: &EngineOptions) -> bool {
        match &options.ort_lib_path {
            Some(path) => Path::new(path).exists() && ort::init_from(path).commit().is_ok(),
            None => ort::init().commit().is_ok(),
        }
    }

    fn from_bytes(bytes: &[u8], options: &EngineOptions) -> Result<Self, InspectError> {
        let mut builder = Session::builder().map_err(load_err)?;

        let mut device = options.device;
        match device {
            InferenceDevice::TensorRT(device_id) => {
                Self::build_trt(&mut builder, device_id, options).unwrap_or_else(|err| {
                    log::warn!("{err}, Using cpu");
                    device = InferenceDevice::CPU;
                })
            }
            InferenceDevice::CUDA(device_id) => {
                Self::build_cuda(&mut builder, device_id).unwrap_or_else(|err| {
                    log::warn!("{err}, Using cpu");
                    device = InferenceDevice::CPU;
                })
            }
            InferenceDevice::CPU => {
                Self::build_cpu(&mut builder)?;
            }
        }

        let mut builder = builder
            .with_optimization_level(GraphOptimizationLevel::Level3)
            .map_err(load_err)?;
        if let Some(n) = options.intra_threads {
            builder = builder.with_intra_threads(n).map_err(load_err)?;
        }
        let session = builder.commit_from_memory(bytes).map_err(load_err)?;

        let input_name = session
            .inputs
            .first()
            .map(|i| i.name.clone())
            .ok_or_else(|| InspectError::ModelLoad("Model declares no inputs".into()))?;
        let output_names: Vec<String> = session.outputs.iter().map(|o| o.name.clone()).collect();
        if output_names.is_empty() {
            return Err(InspectError::ModelLoad("Model declares no outputs".into()));
        }

        log::info!(
            "Backend: ONNXRuntime | Device: {} | Input: {} | Outputs: {:?}",
            device, input_name, output_names
        );

        Ok(Self {
            session,
            device,
            input_name,
            output_names,
        })
    }

    fn run(&mut self, input: &X) -> Result<RawOutput, InspectError> {
        let value = Value::from_array(input.0.clone()).map_err(runtime_err)?;
        let xs_ = vec![SessionInputValue::from(value.into_dyn())];

        let outputs = self
            .session
            .run(&xs_[..])
            .map_err(|e| InspectError::Runtime(format!("Inference failed on {}: {e}", self.input_name)))?;

        let mut ys = Vec::with_capacity(self.output_names.len());
        for name in self.output_names.iter() {
            let y = Self::tensor_postprocess(&outputs[name.as_str()])?;
            ys.push((name.clone(), y));
        }

        Ok(match ys.len() {
            1 => RawOutput::Array(ys.remove(0).1),
            _ => RawOutput::Keyed(ys),
        })
    }

    fn class_names(&self) -> Option<Vec<String>> {
        // String format: `{0: 'back_bumper', 1: 'back_door', ..., 22: 'wheel'}`
        self.try_fetch("names").map(|names| parse_names(&names))
    }
}

impl OrtEngine {
    fn build_trt(builder: &mut SessionBuilder, device_id: usize, options: &EngineOptions) -> Result<(), InspectError> {
        let trt = TensorRTExecutionProvider::default()
            .with_device_id(device_id as i32)
            .with_fp16(options.trt_fp16_enable)
            .with_engine_cache(options.trt_engine_cache_enable)
            .with_engine_cache_path("trt-cache");
        if trt.is_available().map_err(load_err)? {
            match trt.register(builder) {
                Ok(_) => { }
                Err(err) => { return Err(load_err(format!("{CROSS_MARK} TensorRT initialization failed: {:?}", err))) }
            }
            log::info!("Initial model serialization with TensorRT may take some time...");
            Ok(())
        } else {
            Err(load_err(format!("{CROSS_MARK} TensorRT execution provider not available")))
        }
    }

    fn build_cuda(builder: &mut SessionBuilder, device_id: usize) -> Result<(), InspectError> {
        let ep = CUDAExecutionProvider::default()
            .with_device_id(device_id as i32);
        if ep.is_available().map_err(load_err)? {
            match ep.register(builder) {
                Ok(_) => { }
                Err(err) => { return Err(load_err(format!("{CROSS_MARK} CUDA initialization failed: {:?}", err))) }
            }
            Ok(())
        } else {
            Err(load_err(format!("{CROSS_MARK} CUDA execution provider not available")))
        }
    }

    fn build_cpu(builder: &mut SessionBuilder) -> Result<(), InspectError> {
        let ep = CPUExecutionProvider::default();
        match ep.register(builder) {
            Ok(_) => Ok(()),
            Err(err) => Err(load_err(format!("{CROSS_MARK} CPU initialization failed: {:?}", err))),
        }
    }

    // Quantized exports may emit f16 heads; everything is widened to f32 here.
    fn tensor_postprocess(x: &DynValue) -> Result<Array<f32, IxDyn>, InspectError> {
        if let Ok(view) = x.try_extract_tensor::<f32>() {
            return Ok(view.into_owned());
        }
        match x.try_extract_tensor::<f16>() {
            Ok(view) => Ok(view.mapv(f16::to_f32)),
            Err(err) => Err(runtime_err(err)),
        }
    }

    pub fn try_fetch(&self, key: &str) -> Option<String> {
        match self.session.metadata() {
            Err(_) => None,
            Ok(metadata) => metadata.custom(key).unwrap_or_default(),
        }
    }

    pub fn device(&self) -> &InferenceDevice {
        &self.device
    }

    pub fn session(&self) -> &Session {
        &self.session
    }
}

/// Extracts quoted class names from the metadata dictionary string.
pub fn parse_names(names: &str) -> Vec<String> {
    let re = match Regex::new(r#"(['"])([-()\w '"]+)(['"])"#) {
        Ok(re) => re,
        Err(_) => return Vec::new(),
    };
    re.captures_iter(names)
        .map(|x| x.extract())
        .map(|(_, [_, name, _])| name.to_string())
        .collect()
}
