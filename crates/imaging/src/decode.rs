//! Decoding PNG/JPEG files into a [`PixelBuffer`].

use std::path::Path;

use huelab_core::error::ColorError;
use huelab_core::pixel::PixelBuffer;
use image::DynamicImage;

fn into_buffer(img: DynamicImage) -> Result<PixelBuffer, ColorError> {
    let rgba = img.into_rgba8();
    let (w, h) = rgba.dimensions();
    let width = usize::try_from(w).map_err(|_| ColorError::InvalidDimensions)?;
    let height = usize::try_from(h).map_err(|_| ColorError::InvalidDimensions)?;
    PixelBuffer::new(width, height, rgba.into_raw())
}

/// Reads an image file, converting any supported color type to RGBA8.
///
/// Returns `ColorError::Io` if the file cannot be read or decoded.
pub fn load_image(path: &Path) -> Result<PixelBuffer, ColorError> {
    let img = image::open(path).map_err(|e| ColorError::Io(format!("{}: {e}", path.display())))?;
    tracing::debug!(
        path = %path.display(),
        width = img.width(),
        height = img.height(),
        "decoded image"
    );
    into_buffer(img)
}

/// Decodes an in-memory PNG or JPEG.
pub fn decode_image(bytes: &[u8]) -> Result<PixelBuffer, ColorError> {
    let img = image::load_from_memory(bytes).map_err(|e| ColorError::Io(e.to_string()))?;
    into_buffer(img)
}
