use serde::{Deserialize, Serialize};

/// Hit tolerance in image pixels for strokes and rectangle edges.
pub const HIT_TOLERANCE: f64 = 5.0;
const TEXT_MIN_HIT_RADIUS: f64 = 30.0;

/// A point in original-image pixel space.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn distance_to(&self, other: &Point) -> f64 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        (dx * dx + dy * dy).sqrt()
    }

    pub fn offset(&self, dx: f64, dy: f64) -> Self {
        Self::new(self.x + dx, self.y + dy)
    }

    pub fn delta_to(&self, other: &Point) -> (f64, f64) {
        (other.x - self.x, other.y - self.y)
    }
}

/// Geometry of one annotation. Serialized with a `type` tag so that the
/// persisted record reads `{"type": "rectangle", "x": .., ...}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Shape {
    Rectangle {
        x: f64,
        y: f64,
        width: f64,
        height: f64,
    },
    Circle {
        x: f64,
        y: f64,
        radius: f64,
    },
    Arrow {
        x1: f64,
        y1: f64,
        x2: f64,
        y2: f64,
    },
    Text {
        x: f64,
        y: f64,
        text: String,
        #[serde(rename = "fontSize")]
        font_size: f64,
    },
    #[serde(alias = "path")]
    Freehand {
        points: Vec<Point>,
    },
}

impl Shape {
    pub fn kind(&self) -> &'static str {
        match self {
            Shape::Rectangle { .. } => "rectangle",
            Shape::Circle { .. } => "circle",
            Shape::Arrow { .. } => "arrow",
            Shape::Text { .. } => "text",
            Shape::Freehand { .. } => "freehand",
        }
    }

    /// Anchor used for drag offsets: rectangle corner, circle centre, arrow
    /// start, text anchor, first freehand point.
    pub fn reference_point(&self) -> Point {
        match self {
            Shape::Rectangle { x, y, .. }
            | Shape::Circle { x, y, .. }
            | Shape::Text { x, y, .. } => Point::new(*x, *y),
            Shape::Arrow { x1, y1, .. } => Point::new(*x1, *y1),
            Shape::Freehand { points } => points.first().copied().unwrap_or_default(),
        }
    }

    /// A copy moved by `(dx, dy)`; every coordinate field shifts, sizes do not.
    pub fn translated(&self, dx: f64, dy: f64) -> Shape {
        match self {
            Shape::Rectangle { x, y, width, height } => Shape::Rectangle {
                x: x + dx,
                y: y + dy,
                width: *width,
                height: *height,
            },
            Shape::Circle { x, y, radius } => Shape::Circle {
                x: x + dx,
                y: y + dy,
                radius: *radius,
            },
            Shape::Arrow { x1, y1, x2, y2 } => Shape::Arrow {
                x1: x1 + dx,
                y1: y1 + dy,
                x2: x2 + dx,
                y2: y2 + dy,
            },
            Shape::Text { x, y, text, font_size } => Shape::Text {
                x: x + dx,
                y: y + dy,
                text: text.clone(),
                font_size: *font_size,
            },
            Shape::Freehand { points } => Shape::Freehand {
                points: points.iter().map(|p| p.offset(dx, dy)).collect(),
            },
        }
    }

    /// Whether the gesture produced something visible.
    pub fn has_extent(&self) -> bool {
        match self {
            Shape::Rectangle { width, height, .. } => width.abs() > 0.0 && height.abs() > 0.0,
            Shape::Circle { radius, .. } => *radius > 0.0,
            Shape::Arrow { x1, y1, x2, y2 } => x1 != x2 || y1 != y2,
            Shape::Text { text, .. } => !text.trim().is_empty(),
            Shape::Freehand { points } => points.len() >= 2,
        }
    }

    /// Rectangles drawn right-to-left or bottom-to-top keep their top-left
    /// corner and positive size.
    pub fn normalized(self) -> Shape {
        match self {
            Shape::Rectangle { x, y, width, height } => Shape::Rectangle {
                x: x.min(x + width),
                y: y.min(y + height),
                width: width.abs(),
                height: height.abs(),
            },
            other => other,
        }
    }

    pub fn hit_test(&self, p: &Point) -> bool {
        match self {
            Shape::Rectangle { x, y, width, height } => {
                let (x0, x1) = (x.min(x + width), x.max(x + width));
                let (y0, y1) = (y.min(y + height), y.max(y + height));
                p.x >= x0 - HIT_TOLERANCE
                    && p.x <= x1 + HIT_TOLERANCE
                    && p.y >= y0 - HIT_TOLERANCE
                    && p.y <= y1 + HIT_TOLERANCE
            }
            Shape::Circle { x, y, radius } => p.distance_to(&Point::new(*x, *y)) <= *radius,
            Shape::Arrow { x1, y1, x2, y2 } => {
                segment_distance(p, &Point::new(*x1, *y1), &Point::new(*x2, *y2)) <= HIT_TOLERANCE
            }
            Shape::Text { x, y, font_size, .. } => {
                let radius = TEXT_MIN_HIT_RADIUS.max(1.5 * font_size);
                p.distance_to(&Point::new(*x, *y)) <= radius
            }
            Shape::Freehand { points } => points.iter().any(|q| q.distance_to(p) <= HIT_TOLERANCE),
        }
    }
}

/// Distance from `p` to the segment `a`–`b`, with the projection clamped to
/// the segment.
pub fn segment_distance(p: &Point, a: &Point, b: &Point) -> f64 {
    let (dx, dy) = a.delta_to(b);
    let len_sq = dx * dx + dy * dy;
    if len_sq == 0.0 {
        return p.distance_to(a);
    }
    let t = (((p.x - a.x) * dx + (p.y - a.y) * dy) / len_sq).clamp(0.0, 1.0);
    p.distance_to(&Point::new(a.x + t * dx, a.y + t * dy))
}
