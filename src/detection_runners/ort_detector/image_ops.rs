//! Frame → model-input tensor conversion.

use fast_image_resize::{
    images::Image as FirImage,
    pixels::PixelType,
    FilterType, ResizeAlg, ResizeOptions, Resizer,
};
use image::imageops::FilterType as ImageFilter;
use image::RgbImage;
use ndarray::Array;
use crate::common::{InspectError, InspectionFrame};
use crate::detection_runners::input_wrapper::X;

/// Converts a frame into a `[1, size, size, 3]` NHWC tensor with values in
/// `[0.0, 1.0]`, using a bilinear resize.
pub fn preprocess(frame: &InspectionFrame, size: u32) -> Result<X, InspectError> {
    if frame.width() == 0 || frame.height() == 0 || size == 0 {
        return Err(InspectError::shape(
            &[size as usize, size as usize, 3],
            &[frame.height() as usize, frame.width() as usize, 3],
        ));
    }

    let resized = match resize_bilinear(&frame.image, size) {
        Ok(buf) => buf,
        Err(err) => {
            log::warn!("Failed to use `fast_image_resize` ({err}). Falling back.");
            image::imageops::resize(&frame.image, size, size, ImageFilter::Triangle).into_raw()
        }
    };

    nhwc_normalize(resized, size)
}

fn resize_bilinear(img: &RgbImage, size: u32) -> anyhow::Result<Vec<u8>> {
    let (width, height) = img.dimensions();
    if width == size && height == size {
        return Ok(img.as_raw().clone());
    }

    let src = FirImage::from_vec_u8(width, height, img.as_raw().clone(), PixelType::U8x3)?;
    let mut dst = FirImage::new(size, size, PixelType::U8x3);
    let options = ResizeOptions::new().resize_alg(ResizeAlg::Convolution(FilterType::Bilinear));
    Resizer::new().resize(&src, &mut dst, &options)?;
    Ok(dst.into_vec())
}

fn nhwc_normalize(buf: Vec<u8>, size: u32) -> Result<X, InspectError> {
    let side = size as usize;
    if buf.len() != side * side * 3 {
        return Err(InspectError::shape(&[side * side * 3], &[buf.len()]));
    }

    let float_data: Vec<f32> = buf.into_iter().map(|v| v as f32 / 255.0).collect();
    let array = Array::from_shape_vec((1, side, side, 3), float_data)
        .map_err(|_| InspectError::shape(&[1, side, side, 3], &[]))?
        .into_dyn();

    Ok(X::from(array))
}
