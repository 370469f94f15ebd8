//! Encoding a [`PixelBuffer`] to disk.
//!
//! Feature-gated behind `codecs` (default on), like decoding. The output
//! format follows the file extension; JPEG drops alpha.

use std::path::Path;

use huelab_core::error::ColorError;
use huelab_core::pixel::PixelBuffer;
use image::{DynamicImage, ImageFormat, RgbaImage};

fn to_rgba_image(buffer: &PixelBuffer) -> Result<RgbaImage, ColorError> {
    let w = u32::try_from(buffer.width()).map_err(|_| ColorError::InvalidDimensions)?;
    let h = u32::try_from(buffer.height()).map_err(|_| ColorError::InvalidDimensions)?;
    RgbaImage::from_raw(w, h, buffer.data().to_vec())
        .ok_or_else(|| ColorError::Io("RGBA buffer size mismatch".into()))
}

/// Writes `buffer` as a PNG, regardless of the path's extension.
pub fn write_png(buffer: &PixelBuffer, path: &Path) -> Result<(), ColorError> {
    to_rgba_image(buffer)?
        .save_with_format(path, ImageFormat::Png)
        .map_err(|e| ColorError::Io(e.to_string()))
}

/// Writes `buffer` in the format implied by the extension of `path`
/// (`.png`, `.jpg`, `.jpeg`).
pub fn write_image(buffer: &PixelBuffer, path: &Path) -> Result<(), ColorError> {
    let format = ImageFormat::from_path(path).map_err(|e| ColorError::Io(e.to_string()))?;
    let img = to_rgba_image(buffer)?;
    let result = match format {
        ImageFormat::Jpeg => DynamicImage::ImageRgba8(img)
            .into_rgb8()
            .save_with_format(path, format),
        ImageFormat::Png => img.save_with_format(path, format),
        other => {
            return Err(ColorError::Io(format!(
                "unsupported output format {other:?} for {}",
                path.display()
            )))
        }
    };
    result.map_err(|e| ColorError::Io(e.to_string()))?;
    tracing::debug!(path = %path.display(), ?format, "wrote image");
    Ok(())
}
