use serde::{Deserialize, Serialize};
use uuid::Uuid;
use crate::annotation::shape::{Point, Shape};

pub const DEFAULT_COLOR: &str = "#ff0000";
pub const DEFAULT_LINE_WIDTH: f64 = 3.0;

fn default_color() -> String {
    DEFAULT_COLOR.to_string()
}

fn default_line_width() -> f64 {
    DEFAULT_LINE_WIDTH
}

/// An annotation still being drawn. Has no id until committed.
#[derive(Debug, Clone, PartialEq)]
pub struct DraftAnnotation {
    pub shape: Shape,
    pub color: String,
    pub line_width: f64,
}

impl DraftAnnotation {
    pub fn new(shape: Shape, color: &str, line_width: f64) -> Self {
        Self {
            shape,
            color: color.to_string(),
            line_width,
        }
    }

    /// Applies one pointer-move of the gesture started at `origin`.
    pub fn update(&mut self, origin: Point, current: Point) {
        match &mut self.shape {
            Shape::Rectangle { x, y, width, height } => {
                *x = origin.x;
                *y = origin.y;
                *width = current.x - origin.x;
                *height = current.y - origin.y;
            }
            Shape::Circle { x, y, radius } => {
                *x = origin.x;
                *y = origin.y;
                *radius = origin.distance_to(&current);
            }
            Shape::Arrow { x2, y2, .. } => {
                *x2 = current.x;
                *y2 = current.y;
            }
            Shape::Text { x, y, .. } => {
                *x = current.x;
                *y = current.y;
            }
            Shape::Freehand { points } => points.push(current),
        }
    }

    /// Finalizes the draft with a fresh id. Drafts with no visible extent
    /// (a click without a drag, empty text) yield `None`.
    pub fn commit(self) -> Option<CommittedAnnotation> {
        if !self.shape.has_extent() {
            return None;
        }
        Some(CommittedAnnotation {
            id: Uuid::new_v4().to_string(),
            shape: self.shape.normalized(),
            color: self.color,
            line_width: self.line_width,
        })
    }
}

/// A finalized annotation. Never edited in place: drags replace it with a
/// translated copy carrying the same id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommittedAnnotation {
    #[serde(default)]
    pub id: String,
    #[serde(flatten)]
    pub shape: Shape,
    #[serde(default = "default_color")]
    pub color: String,
    #[serde(rename = "lineWidth", default = "default_line_width")]
    pub line_width: f64,
}

impl CommittedAnnotation {
    pub fn new(shape: Shape, color: &str, line_width: f64) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            shape,
            color: color.to_string(),
            line_width,
        }
    }

    pub fn translated(&self, dx: f64, dy: f64) -> Self {
        Self {
            id: self.id.clone(),
            shape: self.shape.translated(dx, dy),
            color: self.color.clone(),
            line_width: self.line_width,
        }
    }

    pub fn reference_point(&self) -> Point {
        self.shape.reference_point()
    }

    pub fn hit_test(&self, p: &Point) -> bool {
        self.shape.hit_test(p)
    }
}
