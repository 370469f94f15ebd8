//! Row-major RGBA8 pixel buffer supplied by the host's image layer.
//!
//! Engine operations only read from a [`PixelBuffer`]; operations that
//! produce an image return a new one.

use std::ops::Range;

use crate::color::Rgb;
use crate::error::ColorError;

/// A `width * height` RGBA image, 4 bytes per pixel, row-major.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PixelBuffer {
    width: usize,
    height: usize,
    data: Vec<u8>,
}

impl PixelBuffer {
    /// Wraps raw RGBA bytes.
    ///
    /// Returns `ColorError::InvalidDimensions` if either dimension is zero or
    /// the byte count overflows, and `ColorError::BufferSize` if
    /// `data.len() != width * height * 4`.
    pub fn new(width: usize, height: usize, data: Vec<u8>) -> Result<Self, ColorError> {
        let expected = byte_len(width, height)?;
        if data.len() != expected {
            return Err(ColorError::BufferSize {
                expected,
                got: data.len(),
            });
        }
        Ok(Self {
            width,
            height,
            data,
        })
    }

    /// A buffer filled with one opaque color.
    pub fn filled(width: usize, height: usize, color: Rgb) -> Result<Self, ColorError> {
        let len = byte_len(width, height)?;
        let data = [color.r, color.g, color.b, 255]
            .into_iter()
            .cycle()
            .take(len)
            .collect();
        Ok(Self {
            width,
            height,
            data,
        })
    }

    /// Builds an opaque buffer from one color per pixel, row-major.
    pub fn from_colors(width: usize, height: usize, colors: &[Rgb]) -> Result<Self, ColorError> {
        let data: Vec<u8> = colors
            .iter()
            .flat_map(|c| [c.r, c.g, c.b, 255])
            .collect();
        Self::new(width, height, data)
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn pixel_count(&self) -> usize {
        self.width * self.height
    }

    /// Read-only access to the raw RGBA bytes.
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Mutable access to the raw RGBA bytes. The length cannot change.
    pub fn data_mut(&mut self) -> &mut [u8] {
        &mut self.data
    }

    /// RGBA at `(x, y)`, or `None` outside the image.
    pub fn pixel(&self, x: usize, y: usize) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let i = (y * self.width + x) * 4;
        Some([
            self.data[i],
            self.data[i + 1],
            self.data[i + 2],
            self.data[i + 3],
        ])
    }

    /// Iterates all pixels as `[r, g, b, a]` in row-major order.
    pub fn pixels(&self) -> impl Iterator<Item = [u8; 4]> + '_ {
        self.data
            .chunks_exact(4)
            .map(|p| [p[0], p[1], p[2], p[3]])
    }

    /// The RGBA bytes of rows `rows.start..rows.end`.
    pub fn rows(&self, rows: Range<usize>) -> &[u8] {
        let start = rows.start.min(self.height) * self.width * 4;
        let end = rows.end.min(self.height) * self.width * 4;
        &self.data[start..end.max(start)]
    }

    /// Splits the image into consecutive row ranges of at most
    /// `rows_per_chunk` rows, so long-running work can yield between chunks.
    /// A chunk size of zero is treated as one.
    pub fn row_chunks(&self, rows_per_chunk: usize) -> impl Iterator<Item = Range<usize>> {
        let step = rows_per_chunk.max(1);
        let height = self.height;
        (0..height)
            .step_by(step)
            .map(move |start| start..(start + step).min(height))
    }
}

fn byte_len(width: usize, height: usize) -> Result<usize, ColorError> {
    if width == 0 || height == 0 {
        return Err(ColorError::InvalidDimensions);
    }
    width
        .checked_mul(height)
        .and_then(|n| n.checked_mul(4))
        .ok_or(ColorError::InvalidDimensions)
}
