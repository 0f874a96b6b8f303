use crate::error::Result;
use image::codecs::png::PngEncoder;
use image::error::{ImageError, ParameterError, ParameterErrorKind};
use image::{ExtendedColorType, ImageEncoder, RgbaImage};
use std::path::Path;

/// The encoder asserts on the buffer length, so check it up front.
fn check_len(width: u32, height: u32, buffer: &[u8]) -> Result<()> {
    let expected = width as u64 * height as u64 * 4;
    if buffer.len() as u64 != expected {
        return Err(ImageError::Parameter(ParameterError::from_kind(
            ParameterErrorKind::DimensionMismatch,
        ))
        .into());
    }
    Ok(())
}

/// Encodes a raw RGBA8 buffer as PNG bytes.
pub fn encode_png(width: u32, height: u32, buffer: &[u8]) -> Result<Vec<u8>> {
    check_len(width, height, buffer)?;
    let mut bytes = Vec::new();
    let encoder = PngEncoder::new(&mut bytes);
    encoder.write_image(buffer, width, height, ExtendedColorType::Rgba8)?;
    Ok(bytes)
}

pub fn encode_image(image: &RgbaImage) -> Result<Vec<u8>> {
    encode_png(image.width(), image.height(), image.as_raw())
}

/// Writes a raw RGBA8 buffer to `path` as a PNG file.
pub fn save(path: impl AsRef<Path>, width: u32, height: u32, buffer: &[u8]) -> Result<()> {
    check_len(width, height, buffer)?;
    let output = std::fs::File::create(path)?;
    let encoder = PngEncoder::new(output);
    encoder.write_image(buffer, width, height, ExtendedColorType::Rgba8)?;
    Ok(())
}
