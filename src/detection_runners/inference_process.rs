use std::time::Instant;
use crate::common::InspectError;
use crate::data::X;
use crate::detection_runners::ort_detector::raw_output::PredictionTensor;
use crate::utils;

pub trait InferenceProcess {
    type Input;
    type Output;

    /// Pre-process the input frame into a model tensor.
    fn preprocess(&self, input: &Self::Input) -> Result<X, InspectError>;

    /// Executes the model on the preprocessed data.
    fn inference(&mut self, x: X) -> Result<PredictionTensor, InspectError>;

    /// Post-process the model's output.
    fn postprocess(&self, ys: PredictionTensor, input: &Self::Input) -> Result<Self::Output, InspectError>;

    /// Executes the full pipeline.
    fn run(&mut self, input: &Self::Input) -> Result<Self::Output, InspectError> {
        let x = self.preprocess(input)?;
        let ys = self.inference(x)?;
        self.postprocess(ys, input)
    }

    /// Executes the full pipeline, tracing each stage.
    fn forward(&mut self, input: &Self::Input, profile: bool) -> Result<Self::Output, InspectError> {
        let detect_time = Instant::now();
        let mut _detect_elapsed = detect_time.elapsed();

        let x = self.preprocess(input)?;
        _detect_elapsed = utils::trace(profile, "TIME", "Preprocessing input", detect_time, _detect_elapsed);

        let ys = self.inference(x)?;
        _detect_elapsed = utils::trace(profile, "TIME", "Inference", detect_time, _detect_elapsed);

        let out = self.postprocess(ys, input)?;
        utils::trace(profile, "TIME", "Postprocessing", detect_time, _detect_elapsed);

        Ok(out)
    }
}
