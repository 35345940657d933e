use serde::{Deserialize, Serialize};
use crate::common::PartBox;
use crate::detection_runners::ort_detector::nms::Nms;

/// One car part found in a frame during a single inference cycle.
#[derive(Default, Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Detection {
    pub label: String,
    pub label_index: usize,
    pub confidence: f32,
    /// Original-image pixel coordinates, top-left origin.
    #[serde(rename = "box")]
    pub bbox: PartBox,
    /// Relative to the square model input, in `[0, 1]`.
    #[serde(rename = "boxNormalized")]
    pub bbox_normalized: PartBox,
}

impl Nms for Detection {
    fn iou(&self, other: &Self) -> f32 {
        self.bbox.iou(&other.bbox)
    }

    fn confidence(&self) -> f32 {
        self.confidence
    }

    fn is_finite(&self) -> bool {
        self.confidence.is_finite() && self.bbox.is_finite()
    }
}

impl Detection {
    pub fn new(label_index: usize, label: &str, confidence: f32) -> Self {
        Self {
            label: label.to_string(),
            label_index,
            confidence,
            ..Default::default()
        }
    }

    /// Sets the normalized box and derives the pixel box from the original
    /// image dimensions.
    ///
    /// # Arguments
    ///
    /// * `normalized` - Box relative to the model input, `[0, 1]` on both axes.
    /// * `img_width` - Width of the original frame in pixels.
    /// * `img_height` - Height of the original frame in pixels.
    pub fn with_normalized_box(mut self, normalized: PartBox, img_width: f32, img_height: f32) -> Self {
        self.bbox_normalized = normalized;
        self.bbox = normalized.scaled(img_width, img_height);
        self
    }

    pub fn print_detection(&self) {
        log::debug!(
            "Detection: {} ({}) {:.2} at {:?}",
            self.label, self.label_index, self.confidence, self.bbox
        );
    }
}
