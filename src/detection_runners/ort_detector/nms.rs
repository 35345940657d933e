use crate::common::{Detection, InspectError};

pub trait Nms {
    /// Computes the intersection over union (IoU) between this box and another.
    fn iou(&self, other: &Self) -> f32;

    /// Returns the confidence score of the box.
    fn confidence(&self) -> f32;

    fn is_finite(&self) -> bool;
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SuppressionParams {
    pub iou_threshold: f32,
    pub max_output: usize,
    /// Duplicates the decoder's confidence threshold; both are kept.
    pub score_threshold: f32,
}

impl Default for SuppressionParams {
    fn default() -> Self {
        Self {
            iou_threshold: 0.45,
            max_output: 20,
            score_threshold: 0.30,
        }
    }
}

/// Greedy non-max suppression.
///
/// Boxes are stably sorted by confidence, so equal scores keep their input
/// order and the earlier one wins. A box is dropped when its IoU with any
/// already kept box exceeds `iou_threshold`. At most `max_output` boxes are
/// kept, in descending confidence order.
pub fn non_max_suppression<T: Nms + Clone>(boxes: &[T], params: &SuppressionParams) -> Result<Vec<T>, InspectError> {
    if let Some(i) = boxes.iter().position(|b| !b.is_finite()) {
        return Err(InspectError::Suppression(format!("box {i} has a non-finite score or coordinate")));
    }

    let mut order: Vec<&T> = boxes
        .iter()
        .filter(|b| b.confidence() > params.score_threshold)
        .collect();
    order.sort_by(|b1, b2| b2.confidence().total_cmp(&b1.confidence()));

    let mut kept: Vec<T> = Vec::with_capacity(params.max_output.min(order.len()));
    for candidate in order {
        if kept.len() >= params.max_output {
            break;
        }
        let drop = kept.iter().any(|k| k.iou(candidate) > params.iou_threshold);
        if !drop {
            kept.push(candidate.clone());
        }
    }

    Ok(kept)
}

/// Runs suppression over decoded detections. On failure the unsuppressed list
/// is returned as-is.
pub fn suppress(detections: Vec<Detection>, params: &SuppressionParams) -> Vec<Detection> {
    match non_max_suppression(&detections, params) {
        Ok(kept) => kept,
        Err(err) => {
            log::warn!("{err}; returning {} unsuppressed detections", detections.len());
            detections
        }
    }
}
