//! Pointer-driven editing state for one review image.

use crate::annotation::drawing::{CommittedAnnotation, DraftAnnotation, DEFAULT_COLOR, DEFAULT_LINE_WIDTH};
use crate::annotation::persistence;
use crate::annotation::shape::{Point, Shape};
use crate::annotation::view_transform::{CanvasRect, ViewTransform};
use crate::common::InspectError;

pub const MIN_ZOOM: f64 = 0.5;
pub const MAX_ZOOM: f64 = 5.0;
pub const ZOOM_STEP: f64 = 1.2;
const DEFAULT_FONT_SIZE: f64 = 24.0;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Tool {
    #[default]
    None,
    Rectangle,
    Circle,
    Arrow,
    Text,
    Freehand,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub enum Gesture {
    #[default]
    Idle,
    Drawing {
        draft: DraftAnnotation,
        origin: Point,
    },
    Dragging {
        id: String,
        /// Pointer position minus the shape's reference point, fixed at drag start.
        grab: (f64, f64),
    },
    Panning {
        last_screen: Point,
    },
}

/// Outcome of a pointer-down, mostly for the caller's cursor feedback.
#[derive(Debug, Clone, PartialEq)]
pub enum PointerAction {
    Drawing,
    Dragging(String),
    Panning,
    Ignored,
}

#[derive(Debug, Clone)]
pub struct AnnotationCanvas {
    canvas: CanvasRect,
    image_width: u32,
    image_height: u32,
    zoom: f64,
    offset: Point,
    tool: Tool,
    color: String,
    line_width: f64,
    font_size: f64,
    text: String,
    drawings: Vec<CommittedAnnotation>,
    gesture: Gesture,
}

impl AnnotationCanvas {
    pub fn new(canvas: CanvasRect, image_width: u32, image_height: u32) -> Self {
        Self {
            canvas,
            image_width,
            image_height,
            zoom: 1.0,
            offset: Point::default(),
            tool: Tool::None,
            color: DEFAULT_COLOR.to_string(),
            line_width: DEFAULT_LINE_WIDTH,
            font_size: DEFAULT_FONT_SIZE,
            text: String::new(),
            drawings: Vec::new(),
            gesture: Gesture::Idle,
        }
    }

    pub fn view(&self) -> ViewTransform {
        ViewTransform::new(self.canvas, self.image_width, self.image_height, self.zoom, self.offset)
    }

    pub fn set_canvas_rect(&mut self, canvas: CanvasRect) {
        self.canvas = canvas;
    }

    pub fn tool(&self) -> Tool {
        self.tool
    }

    /// Switching tools abandons any gesture in progress.
    pub fn set_tool(&mut self, tool: Tool) {
        self.tool = tool;
        self.gesture = Gesture::Idle;
    }

    pub fn set_color(&mut self, color: &str) {
        self.color = color.to_string();
    }

    pub fn set_line_width(&mut self, line_width: f64) {
        self.line_width = line_width.max(1.0);
    }

    pub fn set_font_size(&mut self, font_size: f64) {
        self.font_size = font_size.max(1.0);
    }

    /// Text placed by the next text-tool gesture.
    pub fn set_text(&mut self, text: &str) {
        self.text = text.to_string();
    }

    pub fn gesture(&self) -> &Gesture {
        &self.gesture
    }

    pub fn drawings(&self) -> &[CommittedAnnotation] {
        &self.drawings
    }

    pub fn draft(&self) -> Option<&DraftAnnotation> {
        match &self.gesture {
            Gesture::Drawing { draft, .. } => Some(draft),
            _ => None,
        }
    }

    pub fn get(&self, id: &str) -> Option<&CommittedAnnotation> {
        self.drawings.iter().find(|d| d.id == id)
    }

    pub fn push(&mut self, annotation: CommittedAnnotation) {
        self.drawings.push(annotation);
    }

    /// Topmost (most recently created) annotation under an image-space point.
    pub fn hit_test(&self, p: &Point) -> Option<&CommittedAnnotation> {
        self.drawings.iter().rev().find(|d| d.hit_test(p))
    }

    pub fn pointer_down(&mut self, screen: Point) -> PointerAction {
        let p = self.view().to_image_space(screen);

        if self.tool == Tool::None {
            if let Some(hit) = self.hit_test(&p) {
                let reference = hit.reference_point();
                let id = hit.id.clone();
                self.gesture = Gesture::Dragging {
                    id: id.clone(),
                    grab: (p.x - reference.x, p.y - reference.y),
                };
                return PointerAction::Dragging(id);
            }
            self.gesture = Gesture::Panning { last_screen: screen };
            return PointerAction::Panning;
        }

        let shape = match self.tool {
            Tool::Rectangle => Shape::Rectangle { x: p.x, y: p.y, width: 0.0, height: 0.0 },
            Tool::Circle => Shape::Circle { x: p.x, y: p.y, radius: 0.0 },
            Tool::Arrow => Shape::Arrow { x1: p.x, y1: p.y, x2: p.x, y2: p.y },
            Tool::Text => Shape::Text {
                x: p.x,
                y: p.y,
                text: self.text.clone(),
                font_size: self.font_size,
            },
            Tool::Freehand => Shape::Freehand { points: vec![p] },
            Tool::None => return PointerAction::Ignored,
        };
        self.gesture = Gesture::Drawing {
            draft: DraftAnnotation::new(shape, &self.color, self.line_width),
            origin: p,
        };
        PointerAction::Drawing
    }

    pub fn pointer_move(&mut self, screen: Point) {
        let view = self.view();
        match &mut self.gesture {
            Gesture::Idle => {}
            Gesture::Drawing { draft, origin } => {
                draft.update(*origin, view.to_image_space(screen));
            }
            Gesture::Dragging { id, grab } => {
                let p = view.to_image_space(screen);
                if let Some(slot) = self.drawings.iter_mut().find(|d| d.id == *id) {
                    let reference = slot.reference_point();
                    let dx = p.x - grab.0 - reference.x;
                    let dy = p.y - grab.1 - reference.y;
                    *slot = slot.translated(dx, dy);
                }
            }
            Gesture::Panning { last_screen } => {
                self.offset = self.offset.offset(screen.x - last_screen.x, screen.y - last_screen.y);
                *last_screen = screen;
            }
        }
    }

    /// Ends the gesture. A finished draft is committed and its id returned;
    /// the tool stays selected for the next gesture.
    pub fn pointer_up(&mut self, screen: Point) -> Option<String> {
        if !matches!(self.gesture, Gesture::Idle) {
            self.pointer_move(screen);
        }
        match std::mem::take(&mut self.gesture) {
            Gesture::Drawing { draft, .. } => {
                let committed = draft.commit()?;
                let id = committed.id.clone();
                log::debug!("Committed {} annotation {}", committed.shape.kind(), id);
                self.drawings.push(committed);
                Some(id)
            }
            _ => None,
        }
    }

    pub fn delete(&mut self, id: &str) -> Option<CommittedAnnotation> {
        let index = self.drawings.iter().position(|d| d.id == id)?;
        if matches!(&self.gesture, Gesture::Dragging { id: dragged, .. } if dragged == id) {
            self.gesture = Gesture::Idle;
        }
        Some(self.drawings.remove(index))
    }

    pub fn clear_all(&mut self) {
        self.drawings.clear();
        self.gesture = Gesture::Idle;
    }

    /// Removes the most recently committed annotation.
    pub fn undo(&mut self) -> Option<CommittedAnnotation> {
        let last = self.drawings.pop()?;
        self.gesture = Gesture::Idle;
        Some(last)
    }

    pub fn zoom(&self) -> f64 {
        self.zoom
    }

    pub fn offset(&self) -> Point {
        self.offset
    }

    pub fn set_zoom(&mut self, zoom: f64) {
        self.zoom = zoom.clamp(MIN_ZOOM, MAX_ZOOM);
    }

    pub fn zoom_in(&mut self) {
        self.set_zoom(self.zoom * ZOOM_STEP);
    }

    pub fn zoom_out(&mut self) {
        self.set_zoom(self.zoom / ZOOM_STEP);
    }

    pub fn reset_view(&mut self) {
        self.zoom = 1.0;
        self.offset = Point::default();
    }

    /// Zooms by `factor` keeping the image point under `screen` in place.
    pub fn zoom_at(&mut self, screen: Point, factor: f64) {
        let view = self.view();
        let anchor = view.to_image_space(screen);
        let zoom = (self.zoom * factor).clamp(MIN_ZOOM, MAX_ZOOM);
        self.offset = view.offset_pinning(anchor, screen, zoom);
        self.zoom = zoom;
    }

    /// Replaces the annotation list from a persisted envelope. Malformed
    /// input leaves the canvas empty.
    pub fn load_drawings(&mut self, json: &str) {
        self.drawings = persistence::load_or_empty(json);
        self.gesture = Gesture::Idle;
    }

    pub fn drawings_json(&self) -> Result<String, InspectError> {
        persistence::to_json(&self.drawings)
    }
}
