use std::fmt;
use std::str::FromStr;
use serde::{Deserialize, Serialize};

/// Execution provider the ONNX Runtime session is built for.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum InferenceDevice {
    #[default] CPU,
    CUDA(usize),
    TensorRT(usize),
}

impl InferenceDevice {
    pub fn str(&self) -> &'static str {
        match self {
            InferenceDevice::CPU => "CPU",
            InferenceDevice::CUDA(_) => "CUDA",
            InferenceDevice::TensorRT(_) => "TensorRT",
        }
    }

    pub fn device_id(&self) -> usize {
        match self {
            InferenceDevice::CPU => 0,
            InferenceDevice::CUDA(id) | InferenceDevice::TensorRT(id) => *id,
        }
    }
}

// Accepts "cpu", "cuda", "cuda:1", "tensorrt:0" in any case.
impl FromStr for InferenceDevice {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.trim().to_lowercase();
        let (name, id) = match lower.split_once(':') {
            Some((name, id)) => {
                let id = id.parse::<usize>().map_err(|_| format!("Invalid device id in '{s}'"))?;
                (name.to_string(), id)
            }
            None => (lower, 0),
        };
        match name.as_str() {
            "cpu" => Ok(InferenceDevice::CPU),
            "cuda" => Ok(InferenceDevice::CUDA(id)),
            "tensorrt" | "trt" => Ok(InferenceDevice::TensorRT(id)),
            _ => Err(format!("Unknown inference device '{s}'")),
        }
    }
}

impl TryFrom<String> for InferenceDevice {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<InferenceDevice> for String {
    fn from(device: InferenceDevice) -> Self {
        device.to_string()
    }
}

impl fmt::Display for InferenceDevice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InferenceDevice::CPU => write!(f, "cpu"),
            InferenceDevice::CUDA(id) => write!(f, "cuda:{id}"),
            InferenceDevice::TensorRT(id) => write!(f, "tensorrt:{id}"),
        }
    }
}
