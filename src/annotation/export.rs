//! Flattens committed annotations onto the original frame.

use std::path::Path;
use ab_glyph::{FontArc, PxScale};
use image::codecs::jpeg::JpegEncoder;
use image::{Rgb, RgbImage};
use imageproc::drawing::{draw_filled_circle_mut, draw_hollow_circle_mut, draw_text_mut};
use crate::annotation::colour::parse_colour;
use crate::annotation::drawing::CommittedAnnotation;
use crate::annotation::shape::{Point, Shape};
use crate::common::InspectError;

pub const JPEG_QUALITY: u8 = 95;
const FALLBACK_COLOUR: Rgb<u8> = Rgb([255, 0, 0]);
const ARROW_HEAD_ANGLE: f64 = std::f64::consts::PI / 6.0;

/// Renders annotations at the frame's natural resolution. Text needs a
/// font; without one, text annotations are skipped.
#[derive(Debug, Clone, Default)]
pub struct RasterExporter {
    font: Option<FontArc>,
}

impl RasterExporter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_font(mut self, font: FontArc) -> Self {
        self.font = Some(font);
        self
    }

    pub fn with_font_bytes(self, bytes: Vec<u8>) -> Result<Self, InspectError> {
        let font = FontArc::try_from_vec(bytes)
            .map_err(|e| InspectError::Config(format!("Invalid font: {e}")))?;
        Ok(self.with_font(font))
    }

    pub fn render(&self, frame: &RgbImage, drawings: &[CommittedAnnotation]) -> RgbImage {
        let mut img = frame.clone();
        for drawing in drawings {
            self.draw(&mut img, drawing);
        }
        img
    }

    pub fn export_jpeg(&self, frame: &RgbImage, drawings: &[CommittedAnnotation]) -> Result<Vec<u8>, InspectError> {
        let img = self.render(frame, drawings);
        let mut bytes = Vec::new();
        let encoder = JpegEncoder::new_with_quality(&mut bytes, JPEG_QUALITY);
        img.write_with_encoder(encoder)?;
        Ok(bytes)
    }

    pub fn export_to_path<P: AsRef<Path>>(&self, frame: &RgbImage, drawings: &[CommittedAnnotation], path: P) -> Result<(), InspectError> {
        let bytes = self.export_jpeg(frame, drawings)?;
        std::fs::write(path, bytes)?;
        Ok(())
    }

    fn draw(&self, img: &mut RgbImage, drawing: &CommittedAnnotation) {
        let colour = parse_colour(&drawing.color).unwrap_or_else(|| {
            log::warn!("Unknown colour '{}', using red", drawing.color);
            FALLBACK_COLOUR
        });
        let (w, h) = img.dimensions();
        let thickness = drawing.line_width.clamp(1.0, f64::from(w.max(h)).max(1.0));

        match &drawing.shape {
            Shape::Rectangle { x, y, width, height } => {
                let (x0, y0) = (*x, *y);
                let (x1, y1) = (x + width, y + height);
                let corners = [
                    Point::new(x0, y0),
                    Point::new(x1, y0),
                    Point::new(x1, y1),
                    Point::new(x0, y1),
                    Point::new(x0, y0),
                ];
                stroke_path(img, &corners, thickness, colour);
            }
            Shape::Circle { x, y, radius } => {
                let (near, far) = ring_reach(img, Point::new(*x, *y));
                let half = (thickness / 2.0).floor();
                if !radius.is_finite() || radius + half < near || radius - half > far {
                    return;
                }
                let center = (x.round() as i32, y.round() as i32);
                let half = half as i32;
                let r = radius.round() as i32;
                for dr in -half..=half {
                    if r + dr > 0 {
                        draw_hollow_circle_mut(img, center, r + dr, colour);
                    }
                }
            }
            Shape::Arrow { x1, y1, x2, y2 } => {
                let start = Point::new(*x1, *y1);
                let end = Point::new(*x2, *y2);
                stroke_segment(img, start, end, thickness, colour);

                let head = (3.0 * thickness).max(10.0);
                let angle = (y2 - y1).atan2(x2 - x1);
                for side in [-ARROW_HEAD_ANGLE, ARROW_HEAD_ANGLE] {
                    let tip = Point::new(
                        x2 - head * (angle + side).cos(),
                        y2 - head * (angle + side).sin(),
                    );
                    stroke_segment(img, end, tip, thickness, colour);
                }
            }
            Shape::Text { x, y, text, font_size } => match &self.font {
                Some(font) => {
                    // Anchor is the baseline, imageproc draws from the top.
                    let top = (y - font_size).round() as i32;
                    draw_text_mut(img, colour, x.round() as i32, top, PxScale::from(*font_size as f32), font, text);
                }
                None => log::warn!("No font configured, skipping text annotation {}", drawing.id),
            },
            Shape::Freehand { points } => stroke_path(img, points, thickness, colour),
        }
    }
}

fn stroke_path(img: &mut RgbImage, points: &[Point], thickness: f64, colour: Rgb<u8>) {
    for pair in points.windows(2) {
        stroke_segment(img, pair[0], pair[1], thickness, colour);
    }
}

// Round-capped stroke: stamps a disc every pixel along the part of the
// segment that can touch the frame.
fn stroke_segment(img: &mut RgbImage, a: Point, b: Point, thickness: f64, colour: Rgb<u8>) {
    let radius = ((thickness / 2.0).round() as i32).max(0);
    let (w, h) = img.dimensions();
    let margin = f64::from(radius) + 1.0;
    let bounds = (
        Point::new(-margin, -margin),
        Point::new(f64::from(w) + margin, f64::from(h) + margin),
    );
    let Some((a, b)) = clip_segment(a, b, bounds.0, bounds.1) else {
        return;
    };
    let steps = a.distance_to(&b).ceil().max(1.0) as usize;
    for i in 0..=steps {
        let t = i as f64 / steps as f64;
        let x = a.x + (b.x - a.x) * t;
        let y = a.y + (b.y - a.y) * t;
        draw_filled_circle_mut(img, (x.round() as i32, y.round() as i32), radius, colour);
    }
}

/// Liang-Barsky clip of `a..b` to the box `min..max`. `None` when the
/// segment misses the box or has a non-finite end.
fn clip_segment(a: Point, b: Point, min: Point, max: Point) -> Option<(Point, Point)> {
    if ![a.x, a.y, b.x, b.y].iter().all(|v| v.is_finite()) {
        return None;
    }
    let (dx, dy) = (b.x - a.x, b.y - a.y);
    let (mut t0, mut t1) = (0.0_f64, 1.0_f64);
    for (p, q) in [(-dx, a.x - min.x), (dx, max.x - a.x), (-dy, a.y - min.y), (dy, max.y - a.y)] {
        if p == 0.0 {
            if q < 0.0 {
                return None;
            }
            continue;
        }
        let r = q / p;
        if p < 0.0 {
            if r > t1 {
                return None;
            }
            t0 = t0.max(r);
        } else {
            if r < t0 {
                return None;
            }
            t1 = t1.min(r);
        }
    }
    Some((
        Point::new(a.x + t0 * dx, a.y + t0 * dy),
        Point::new(a.x + t1 * dx, a.y + t1 * dy),
    ))
}

// Distances from `center` to the nearest and farthest pixel of the frame.
fn ring_reach(img: &RgbImage, center: Point) -> (f64, f64) {
    let (w, h) = img.dimensions();
    let (w, h) = (f64::from(w), f64::from(h));
    let near = Point::new(center.x.clamp(0.0, w), center.y.clamp(0.0, h)).distance_to(&center);
    let far = [(0.0, 0.0), (w, 0.0), (0.0, h), (w, h)]
        .iter()
        .map(|&(x, y)| Point::new(x, y).distance_to(&center))
        .fold(0.0, f64::max);
    (near, far)
}
