use std::sync::Arc;
use std::time::Instant;
use crate::common::{Detection, InspectError, InspectionFrame, ModelConfig};
use crate::data::{TimeCalc, X};
use crate::detection_processing::{self, DecodeParams};
use crate::detection_runners::inference_process::InferenceProcess;
use crate::detection_runners::model_loader::{ModelBackend, ModelHandle};
use crate::detection_runners::ort_detector::image_ops;
use crate::detection_runners::ort_detector::nms::{self, SuppressionParams};
use crate::detection_runners::ort_detector::raw_output::PredictionTensor;
use crate::detection_runners::ort_detector::OrtEngine;

/// Car-part detector: preprocess → infer → decode → suppress, over a shared
/// model handle.
#[derive(Debug)]
pub struct PartDetector<B: ModelBackend = OrtEngine> {
    handle: Arc<ModelHandle<B>>,
    decode: DecodeParams,
    suppression: SuppressionParams,
    profile: bool,
    pub infer_time: TimeCalc,
}

impl<B: ModelBackend> PartDetector<B> {
    pub fn new(handle: Arc<ModelHandle<B>>, config: &ModelConfig) -> Self {
        Self {
            handle,
            decode: config.decode_params(),
            suppression: config.suppression_params(),
            profile: config.profile,
            infer_time: TimeCalc::default(),
        }
    }

    pub fn with_params(handle: Arc<ModelHandle<B>>, decode: DecodeParams, suppression: SuppressionParams) -> Self {
        Self {
            handle,
            decode,
            suppression,
            profile: false,
            infer_time: TimeCalc::default(),
        }
    }

    pub fn handle(&self) -> &Arc<ModelHandle<B>> {
        &self.handle
    }

    pub fn is_ready(&self) -> bool {
        self.handle.is_ready()
    }

    pub fn names(&self) -> &[String] {
        self.handle.names()
    }

    pub fn profile(&self) -> bool {
        self.profile
    }

    /// Runs one full cycle on a frame, recording stage timings.
    pub fn detect(&mut self, frame: &InspectionFrame) -> Result<Vec<Detection>, InspectError> {
        let t_pre = Instant::now();
        let x = self.preprocess(frame)?;
        self.infer_time.add_or_push(0, t_pre.elapsed());

        let t_exe = Instant::now();
        let ys = self.inference(x)?;
        self.infer_time.add_or_push(1, t_exe.elapsed());

        let t_post = Instant::now();
        let detections = self.postprocess(ys, frame)?;
        self.infer_time.add_or_push(2, t_post.elapsed());
        self.infer_time.finish_run();

        if self.profile {
            log::info!(
                "> Preprocess: {:?} | Inference: {:?} | Postprocess: {:?} | Avg cycle: {:?}",
                self.infer_time.avg_i(0), self.infer_time.avg_i(1), self.infer_time.avg_i(2), self.infer_time.avg()
            );
        }

        Ok(detections)
    }
}

impl<B: ModelBackend> InferenceProcess for PartDetector<B> {
    type Input = InspectionFrame;
    type Output = Vec<Detection>;

    fn preprocess(&self, input: &InspectionFrame) -> Result<X, InspectError> {
        image_ops::preprocess(input, self.handle.input_size())
    }

    fn inference(&mut self, x: X) -> Result<PredictionTensor, InspectError> {
        self.handle.infer(&x)
    }

    fn postprocess(&self, ys: PredictionTensor, input: &InspectionFrame) -> Result<Vec<Detection>, InspectError> {
        let (img_width, img_height) = input.dimensions();
        let candidates = detection_processing::decode_predictions(
            ys.view(),
            self.handle.names(),
            &self.decode,
            img_width as f32,
            img_height as f32,
        )?;
        log::trace!("Decoded {} candidate detections", candidates.len());

        let kept = nms::suppress(candidates, &self.suppression);
        if log::log_enabled!(log::Level::Debug) {
            kept.iter().for_each(Detection::print_detection);
        }
        Ok(kept)
    }
}
