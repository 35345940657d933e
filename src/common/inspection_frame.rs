use std::path::Path;
use image::{DynamicImage, GrayImage, RgbImage, RgbaImage};
use crate::common::InspectError;

/// A single still taken from the capture surface (camera preview or an
/// uploaded photo), kept as packed RGB.
#[derive(Debug, Clone, Default)]
pub struct InspectionFrame {
    pub image: RgbImage,
}

impl std::ops::Deref for InspectionFrame {
    type Target = RgbImage;

    fn deref(&self) -> &Self::Target {
        &self.image
    }
}

impl From<DynamicImage> for InspectionFrame {
    fn from(image: DynamicImage) -> Self {
        Self { image: image.to_rgb8() }
    }
}

impl From<RgbImage> for InspectionFrame {
    fn from(image: RgbImage) -> Self {
        Self { image }
    }
}

impl From<RgbaImage> for InspectionFrame {
    fn from(image: RgbaImage) -> Self {
        Self { image: DynamicImage::from(image).to_rgb8() }
    }
}

impl From<GrayImage> for InspectionFrame {
    fn from(image: GrayImage) -> Self {
        Self { image: DynamicImage::from(image).to_rgb8() }
    }
}

impl From<InspectionFrame> for RgbImage {
    fn from(frame: InspectionFrame) -> Self {
        frame.image
    }
}

impl InspectionFrame {
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, InspectError> {
        Ok(Self::from(image::open(path)?))
    }

    /// Wraps a raw RGBA pixel buffer as read back from a canvas or video surface.
    pub fn from_rgba_bytes(width: u32, height: u32, pixels: Vec<u8>) -> Result<Self, InspectError> {
        let expected = width as usize * height as usize * 4;
        if pixels.len() != expected {
            return Err(InspectError::shape(&[expected], &[pixels.len()]));
        }
        let rgba = RgbaImage::from_raw(width, height, pixels)
            .ok_or_else(|| InspectError::shape(&[expected], &[0]))?;
        Ok(Self::from(rgba))
    }

    pub fn dimensions(&self) -> (u32, u32) {
        self.image.dimensions()
    }

    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }

    pub fn into_rgb8(self) -> RgbImage {
        self.image
    }
}
