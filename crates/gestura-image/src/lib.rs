//! Frame utilities for the gestura pipeline.
//!
//! Frames are `Tensor<u8>` in HWC layout `[height, width, 3]` (RGB). This
//! crate wraps the `image` crate for MJPEG decoding, resizing and JPEG
//! encoding, and provides a clipping [`Canvas`] for overlays.

pub mod draw;
pub mod error;

pub use draw::{Canvas, Rgb};
pub use error::ImageError;

use gestura_base::{Tensor, Vec2};
use image::{ImageEncoder, RgbImage, imageops::FilterType};

/// Returns `(width, height)` of an RGB frame, rejecting any other layout.
pub fn frame_size(frame: &Tensor<u8>) -> Result<Vec2<usize>, ImageError> {
    match frame.shape.as_slice() {
        [height, width, 3] => Ok(Vec2::new(*width, *height)),
        shape => Err(ImageError::Layout(format!(
            "expected [H, W, 3] frame, got {:?}",
            shape
        ))),
    }
}

fn to_rgb_image(frame: &Tensor<u8>) -> Result<RgbImage, ImageError> {
    let size = frame_size(frame)?;
    RgbImage::from_raw(size.x as u32, size.y as u32, frame.data.clone())
        .ok_or_else(|| ImageError::Layout("frame buffer smaller than its shape".to_string()))
}

fn from_rgb_image(image: RgbImage) -> Result<Tensor<u8>, ImageError> {
    let (width, height) = image.dimensions();
    Ok(Tensor::new(
        vec![height as usize, width as usize, 3],
        image.into_raw(),
    )?)
}

/// Decodes any supported image (MJPEG frames in practice) into an RGB frame.
///
/// Grayscale, alpha and high bit depth sources are converted to 8-bit RGB.
pub fn decode_rgb(data: &[u8]) -> Result<Tensor<u8>, ImageError> {
    let decoded = image::load_from_memory(data)?;
    from_rgb_image(decoded.to_rgb8())
}

// BT.601 YUV-to-RGB conversion for a single pixel (fixed-point, shift 8)
fn yuv_to_rgb(y: u8, u: u8, v: u8) -> [u8; 3] {
    let y = y as i32;
    let u = u as i32 - 128;
    let v = v as i32 - 128;
    [
        (y + ((359 * v) >> 8)).clamp(0, 255) as u8,
        (y - ((88 * u + 183 * v) >> 8)).clamp(0, 255) as u8,
        (y + ((454 * u) >> 8)).clamp(0, 255) as u8,
    ]
}

/// Converts a packed YUYV 4:2:2 buffer of the given size into an RGB frame.
pub fn yuyv_to_rgb(size: Vec2<usize>, data: &[u8]) -> Result<Tensor<u8>, ImageError> {
    if data.len() != size.area() * 2 {
        return Err(ImageError::Decode(format!(
            "YUYV buffer of {} bytes does not match {}x{}",
            data.len(),
            size.x,
            size.y
        )));
    }
    let mut rgb = Vec::with_capacity(size.area() * 3);
    for chunk in data.chunks_exact(4) {
        rgb.extend_from_slice(&yuv_to_rgb(chunk[0], chunk[1], chunk[3]));
        rgb.extend_from_slice(&yuv_to_rgb(chunk[2], chunk[1], chunk[3]));
    }
    Ok(Tensor::new(vec![size.y, size.x, 3], rgb)?)
}

/// Resizes an RGB frame to exactly `size` (width, height), ignoring aspect ratio.
pub fn resize(frame: &Tensor<u8>, size: Vec2<usize>) -> Result<Tensor<u8>, ImageError> {
    if frame_size(frame)? == size {
        return Ok(frame.clone());
    }
    let source = to_rgb_image(frame)?;
    let resized = image::imageops::resize(&source, size.x as u32, size.y as u32, FilterType::Triangle);
    from_rgb_image(resized)
}

/// Encodes an RGB frame as a baseline JPEG.
///
/// `quality` ranges from 1 to 100, higher is better.
pub fn encode_jpeg(frame: &Tensor<u8>, quality: u8) -> Result<Vec<u8>, ImageError> {
    let size = frame_size(frame)?;
    let mut buffer = Vec::new();
    image::codecs::jpeg::JpegEncoder::new_with_quality(&mut buffer, quality)
        .write_image(
            &frame.data,
            size.x as u32,
            size.y as u32,
            image::ExtendedColorType::Rgb8,
        )
        .map_err(|e| ImageError::Encode(e.to_string()))?;
    Ok(buffer)
}
