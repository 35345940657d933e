use ndarray::{ArrayView3, Axis};
use rayon::prelude::*;
use crate::common::{Detection, InspectError, PartBox};

/// Rows 0..4 of every anchor column hold `(cx, cy, w, h)`.
const BOX_ROWS: usize = 4;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DecodeParams {
    /// Side of the square model input, `S`.
    pub input_size: f32,
    /// Anchors whose best class score is at or below this are dropped.
    pub conf_threshold: f32,
}

impl Default for DecodeParams {
    fn default() -> Self {
        Self {
            input_size: 640.,
            conf_threshold: 0.30,
        }
    }
}

/// Turns a `[1, C, A]` prediction tensor into candidate detections in
/// original-image pixel coordinates.
///
/// Every anchor column is scanned. Output order follows anchor index, not
/// confidence; ties between class scores resolve to the lowest class index.
pub fn decode_predictions(output: ArrayView3<f32>, names: &[String], params: &DecodeParams,
                          img_width: f32, img_height: f32) -> Result<Vec<Detection>, InspectError> {
    let nc = names.len();
    let shape = output.shape();
    if shape[0] < 1 || shape[1] < BOX_ROWS + nc {
        return Err(InspectError::shape(&[1, BOX_ROWS + nc, shape[2]], shape));
    }

    let preds = output.index_axis(Axis(0), 0);
    let (slice_bboxes, rest) = preds.split_at(Axis(0), BOX_ROWS);
    let (slice_clss, _) = rest.split_at(Axis(0), nc);
    let anchors = preds.len_of(Axis(1));
    let size = params.input_size;

    let detections = (0..anchors)
        .into_par_iter()
        .filter_map(|a| {
            let mut class_id = 0;
            let mut confidence = f32::NEG_INFINITY;
            for (c, &score) in slice_clss.column(a).iter().enumerate() {
                if score > confidence {
                    class_id = c;
                    confidence = score;
                }
            }

            // filtering low scores
            if !(confidence > params.conf_threshold) {
                return None;
            }

            let bbox = slice_bboxes.column(a);
            let (cx, cy, w, h) = (bbox[0], bbox[1], bbox[2], bbox[3]);
            let normalized = PartBox::from_cxcywh(cx / size, cy / size, w / size, h / size);

            Some(Detection::new(class_id, &names[class_id], confidence)
                .with_normalized_box(normalized, img_width, img_height))
        })
        .collect::<Vec<_>>();

    Ok(detections)
}
