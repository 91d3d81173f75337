//! Frame to JPEG data URI

use super::models::VideoFrame;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use image::codecs::jpeg::JpegEncoder;
use image::imageops::{self, FilterType};
use image::{DynamicImage, ExtendedColorType, RgbaImage};

const DATA_URI_PREFIX: &str = "data:image/jpeg;base64,";

#[derive(Debug, thiserror::Error)]
pub enum EncodeError {
    #[error("Invalid frame: {0}")]
    InvalidFrame(String),

    #[error("JPEG encoding failed: {0}")]
    Jpeg(#[from] image::ImageError),
}

/// Draw `frame` onto a raster of `resolution` and encode it as a JPEG data URI
pub fn encode_frame(
    frame: &VideoFrame,
    resolution: (u32, u32),
    quality: u8,
) -> Result<String, EncodeError> {
    let (width, height) = resolution;
    if width == 0 || height == 0 {
        return Err(EncodeError::InvalidFrame(format!(
            "zero-sized raster {}x{}",
            width, height
        )));
    }

    let mut raster = RgbaImage::from_raw(frame.width, frame.height, frame.rgba.clone())
        .ok_or_else(|| {
            EncodeError::InvalidFrame(format!(
                "{} bytes do not fill {}x{} RGBA",
                frame.rgba.len(),
                frame.width,
                frame.height
            ))
        })?;

    if raster.dimensions() != resolution {
        raster = imageops::resize(&raster, width, height, FilterType::Triangle);
    }

    let rgb = DynamicImage::ImageRgba8(raster).to_rgb8();
    let mut jpeg = Vec::new();
    JpegEncoder::new_with_quality(&mut jpeg, quality.clamp(1, 100)).encode(
        rgb.as_raw(),
        width,
        height,
        ExtendedColorType::Rgb8,
    )?;

    Ok(format!("{}{}", DATA_URI_PREFIX, STANDARD.encode(&jpeg)))
}

/// Decode the JPEG bytes back out of a data URI produced by [`encode_frame`]
pub fn decode_data_uri(uri: &str) -> Option<Vec<u8>> {
    let payload = uri.strip_prefix(DATA_URI_PREFIX)?;
    STANDARD.decode(payload).ok()
}
