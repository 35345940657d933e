use serde::{Deserialize, Serialize};

/// Axis-aligned box stored as top-left corner plus size.
#[derive(Default, Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PartBox {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl PartBox {
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self { x, y, width, height }
    }

    /// Builds a box from centre `(cx, cy)` and size, the layout the detection head emits.
    pub fn from_cxcywh(cx: f32, cy: f32, w: f32, h: f32) -> Self {
        Self::new(cx - w / 2., cy - h / 2., w, h)
    }

    /// Returns the maximum x-coordinate of the bounding box.
    pub fn x_max(&self) -> f32 {
        self.x + self.width
    }

    /// Returns the maximum y-coordinate of the bounding box.
    pub fn y_max(&self) -> f32 {
        self.y + self.height
    }

    /// Corner form `(y1, x1, y2, x2)` used by the suppression filter.
    pub fn to_y1x1y2x2(&self) -> [f32; 4] {
        [self.y, self.x, self.y_max(), self.x_max()]
    }

    pub fn iou(&self, other: &PartBox) -> f32 {
        corner_iou(self.to_y1x1y2x2(), other.to_y1x1y2x2())
    }

    /// Rescales the box per axis, e.g. from normalized to pixel space.
    pub fn scaled(&self, sx: f32, sy: f32) -> Self {
        Self::new(self.x * sx, self.y * sy, self.width * sx, self.height * sy)
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.width.is_finite() && self.height.is_finite()
    }
}

/// IoU of two boxes in `(y1, x1, y2, x2)` form. Corners may arrive flipped,
/// so each pair is reordered first. Degenerate boxes have an IoU of zero.
pub fn corner_iou(a: [f32; 4], b: [f32; 4]) -> f32 {
    let (ay1, ay2) = (a[0].min(a[2]), a[0].max(a[2]));
    let (ax1, ax2) = (a[1].min(a[3]), a[1].max(a[3]));
    let (by1, by2) = (b[0].min(b[2]), b[0].max(b[2]));
    let (bx1, bx2) = (b[1].min(b[3]), b[1].max(b[3]));

    let area_a = (ay2 - ay1) * (ax2 - ax1);
    let area_b = (by2 - by1) * (bx2 - bx1);
    if area_a <= 0. || area_b <= 0. {
        return 0.;
    }

    let inter_h = (ay2.min(by2) - ay1.max(by1)).max(0.);
    let inter_w = (ax2.min(bx2) - ax1.max(bx1)).max(0.);
    let inter = inter_h * inter_w;
    inter / (area_a + area_b - inter)
}
