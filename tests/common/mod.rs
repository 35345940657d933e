#![allow(dead_code)]

use std::path::{Path, PathBuf};
use std::time::Duration;
use ndarray::{Array3, IxDyn};
use serde::{Deserialize, Serialize};
use inspect_detect::common::{InspectError, ModelConfig, CAR_PARTS};
use inspect_detect::data::{EngineOptions, RawOutput, X};
use inspect_detect::detection_runners::ModelBackend;

pub const CHANNELS: usize = 59;
pub const ANCHORS: usize = 8400;
pub const HOOD: usize = 16;

/// One anchor column the stub model lights up.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StubHit {
    pub anchor: usize,
    pub class: usize,
    pub score: f32,
    pub cxcywh: [f32; 4],
}

/// Contents of a stub "model file".
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StubModel {
    pub hits: Vec<StubHit>,
    #[serde(default)]
    pub transposed: bool,
    #[serde(default)]
    pub delay_ms: u64,
    #[serde(default)]
    pub panics: bool,
}

/// Prediction tensor `[1, C, A]` with the given hits set.
pub fn prediction(hits: &[StubHit]) -> Array3<f32> {
    let mut out = Array3::<f32>::zeros((1, CHANNELS, ANCHORS));
    for hit in hits {
        for (row, v) in hit.cxcywh.iter().enumerate() {
            out[[0, row, hit.anchor]] = *v;
        }
        out[[0, 4 + hit.class, hit.anchor]] = hit.score;
    }
    out
}

pub fn hood_hit() -> StubHit {
    StubHit {
        anchor: 1234,
        class: HOOD,
        score: 0.81,
        cxcywh: [320., 320., 200., 150.],
    }
}

/// Backend that replays the hits described in the model file.
#[derive(Debug)]
pub struct StubBackend {
    output: RawOutput,
    delay: Duration,
    panics: bool,
}

impl ModelBackend for StubBackend {
    fn runtime_available(_options: &EngineOptions) -> bool {
        true
    }

    fn from_bytes(bytes: &[u8], _options: &EngineOptions) -> Result<Self, InspectError> {
        let model: StubModel = serde_json::from_slice(bytes)
            .map_err(|e| InspectError::ModelLoad(e.to_string()))?;
        let tensor = prediction(&model.hits);
        let output = if model.transposed {
            let t = tensor.permuted_axes([0, 2, 1]).as_standard_layout().into_owned();
            RawOutput::Array(t.into_dyn())
        } else {
            RawOutput::Keyed(vec![("output0".to_string(), tensor.into_dyn())])
        };
        Ok(Self {
            output,
            delay: Duration::from_millis(model.delay_ms),
            panics: model.panics,
        })
    }

    fn run(&mut self, input: &X) -> Result<RawOutput, InspectError> {
        assert_eq!(input.shape(), &[1, 640, 640, 3]);
        if self.panics {
            panic!("stub model crashed");
        }
        if !self.delay.is_zero() {
            std::thread::sleep(self.delay);
        }
        Ok(self.output.clone())
    }
}

/// Backend whose runtime never comes up.
#[derive(Debug)]
pub struct UnavailableBackend;

impl ModelBackend for UnavailableBackend {
    fn runtime_available(_options: &EngineOptions) -> bool {
        false
    }

    fn from_bytes(_bytes: &[u8], _options: &EngineOptions) -> Result<Self, InspectError> {
        Ok(Self)
    }

    fn run(&mut self, _input: &X) -> Result<RawOutput, InspectError> {
        Ok(RawOutput::Array(ndarray::ArrayD::zeros(IxDyn(&[1, CHANNELS, ANCHORS]))))
    }
}

pub fn write_model(dir: &Path, name: &str, model: &StubModel) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, serde_json::to_vec(model).unwrap()).unwrap();
    path
}

pub fn config_for(path: &Path) -> ModelConfig {
    ModelConfig {
        weights_path: path.to_string_lossy().to_string(),
        runtime_wait_ms: 300,
        inference_interval_ms: 50,
        ..Default::default()
    }
}

pub fn options_for(path: &Path) -> EngineOptions {
    EngineOptions::new()
        .with_model(path)
        .with_names(&CAR_PARTS)
        .with_runtime_wait(Duration::from_millis(300))
}
