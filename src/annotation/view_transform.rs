use crate::annotation::shape::Point;

/// On-screen rectangle of the canvas element, in display pixels.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct CanvasRect {
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
}

impl CanvasRect {
    pub fn new(left: f64, top: f64, width: f64, height: f64) -> Self {
        Self { left, top, width, height }
    }

    pub fn contains(&self, p: &Point) -> bool {
        p.x >= self.left && p.x <= self.left + self.width && p.y >= self.top && p.y <= self.top + self.height
    }
}

/// Aspect-fit placement of the image inside the canvas: one uniform scale
/// and a centring pad on the axis with spare room.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Fit {
    pub scale: f64,
    pub pad_x: f64,
    pub pad_y: f64,
}

/// Screen ↔ image mapping for one render:
/// `screen = canvas.origin + offset + zoom * (pad + image * scale)`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewTransform {
    pub canvas: CanvasRect,
    pub image_width: f64,
    pub image_height: f64,
    pub zoom: f64,
    pub offset: Point,
}

impl ViewTransform {
    pub fn new(canvas: CanvasRect, image_width: u32, image_height: u32, zoom: f64, offset: Point) -> Self {
        Self {
            canvas,
            image_width: image_width as f64,
            image_height: image_height as f64,
            zoom,
            offset,
        }
    }

    pub fn fit(&self) -> Fit {
        if self.image_width <= 0.0 || self.image_height <= 0.0 || self.canvas.width <= 0.0 || self.canvas.height <= 0.0 {
            return Fit { scale: 1.0, pad_x: 0.0, pad_y: 0.0 };
        }
        let scale = (self.canvas.width / self.image_width).min(self.canvas.height / self.image_height);
        Fit {
            scale,
            pad_x: (self.canvas.width - self.image_width * scale) / 2.0,
            pad_y: (self.canvas.height - self.image_height * scale) / 2.0,
        }
    }

    fn zoom(&self) -> f64 {
        if self.zoom > 0.0 { self.zoom } else { 1.0 }
    }

    pub fn to_image_space(&self, screen: Point) -> Point {
        let fit = self.fit();
        let zoom = self.zoom();
        Point::new(
            ((screen.x - self.canvas.left - self.offset.x) / zoom - fit.pad_x) / fit.scale,
            ((screen.y - self.canvas.top - self.offset.y) / zoom - fit.pad_y) / fit.scale,
        )
    }

    pub fn to_screen_space(&self, image: Point) -> Point {
        let fit = self.fit();
        let zoom = self.zoom();
        Point::new(
            self.canvas.left + self.offset.x + zoom * (fit.pad_x + image.x * fit.scale),
            self.canvas.top + self.offset.y + zoom * (fit.pad_y + image.y * fit.scale),
        )
    }

    /// Offset that keeps `image` under `screen` at the given zoom.
    pub fn offset_pinning(&self, image: Point, screen: Point, zoom: f64) -> Point {
        let fit = self.fit();
        Point::new(
            screen.x - self.canvas.left - zoom * (fit.pad_x + image.x * fit.scale),
            screen.y - self.canvas.top - zoom * (fit.pad_y + image.y * fit.scale),
        )
    }
}
