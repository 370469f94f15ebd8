//! Gradient mapping: recolor every pixel by its luminance.
//!
//! Each pixel's luminance selects a color from a [`Gradient`], which is
//! then composited onto the original pixel with a [`BlendMode`] and mixed
//! back by `intensity`. Alpha is copied through untouched.
//!
//! A black-to-white gradient turns the image into a gray luminance ramp. In
//! HSL mode each gray is `lum * 255`; in LAB mode the gray keeps the source
//! pixel's L*, which is not linear in 8-bit sRGB.

use std::ops::Range;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::blend::{blend, BlendMode};
use crate::cancel::CancelFlag;
use crate::color::Rgb;
use crate::error::ColorError;
use crate::gradient::{color_for_luminance, compute_luminance, Gradient};
use crate::params::Params;
use crate::pixel::PixelBuffer;

/// Settings for [`apply_gradient_map`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GradientMapOptions {
    /// Mix of the blended result over the original, in [0, 1].
    pub intensity: f64,
    pub blend_mode: BlendMode,
    /// Measure luminance and interpolate in LAB rather than HSL.
    pub use_lab: bool,
}

impl Default for GradientMapOptions {
    fn default() -> Self {
        Self {
            intensity: 1.0,
            blend_mode: BlendMode::Normal,
            use_lab: true,
        }
    }
}

impl GradientMapOptions {
    /// Reads `intensity`, `blend_mode`, and `use_lab` from a JSON object,
    /// defaulting any that are absent.
    pub fn from_json(value: &Value) -> Result<Self, ColorError> {
        let p = Params::new(value)?;
        let d = Self::default();
        Ok(Self {
            intensity: p.f64_in("intensity", d.intensity, 0.0..=1.0)?,
            blend_mode: p.parsed("blend_mode", d.blend_mode)?,
            use_lab: p.bool("use_lab", d.use_lab)?,
        })
    }

    /// Rejects an `intensity` outside [0, 1] (or NaN).
    ///
    /// The mapping functions themselves clamp, so this is for settings
    /// assembled outside [`GradientMapOptions::from_json`].
    pub fn validate(&self) -> Result<(), ColorError> {
        if (0.0..=1.0).contains(&self.intensity) {
            Ok(())
        } else {
            Err(ColorError::range("intensity", self.intensity))
        }
    }
}

/// Maps the whole image and returns a new buffer of the same size.
pub fn apply_gradient_map(
    image: &PixelBuffer,
    gradient: &Gradient,
    options: &GradientMapOptions,
) -> PixelBuffer {
    let mut output = image.clone();
    map_rows(image, gradient, options, 0..image.height(), output.data_mut());
    output
}

/// Maps rows `rows` of `image` into the matching rows of `output`, which
/// must be a full-size RGBA buffer (`image.data().len()` bytes). Rows
/// outside the range are left as they are. Rows past the image end are
/// ignored.
pub fn apply_gradient_map_rows(
    image: &PixelBuffer,
    gradient: &Gradient,
    options: &GradientMapOptions,
    rows: Range<usize>,
    output: &mut [u8],
) -> Result<(), ColorError> {
    if output.len() != image.data().len() {
        return Err(ColorError::BufferSize {
            expected: image.data().len(),
            got: output.len(),
        });
    }
    map_rows(image, gradient, options, rows, output);
    Ok(())
}

fn map_rows(
    image: &PixelBuffer,
    gradient: &Gradient,
    options: &GradientMapOptions,
    rows: Range<usize>,
    output: &mut [u8],
) {
    let start = rows.start.min(image.height());
    let end = rows.end.min(image.height()).max(start);
    let stride = image.width() * 4;
    let src = image.rows(start..end);
    let dst = &mut output[start * stride..end * stride];

    for (s, d) in src.chunks_exact(4).zip(dst.chunks_exact_mut(4)) {
        let original = Rgb::new(s[0], s[1], s[2]);
        let lum = compute_luminance(original, options.use_lab);
        let mapped = color_for_luminance(gradient, lum, options.use_lab);
        let out = blend(original, mapped, options.blend_mode, options.intensity);
        d[0] = out.r;
        d[1] = out.g;
        d[2] = out.b;
        d[3] = s[3];
    }
}

/// An in-progress gradient map that advances a few rows at a time, so a
/// host can report progress or stop between chunks.
#[derive(Debug)]
pub struct GradientMapJob<'a> {
    source: &'a PixelBuffer,
    gradient: &'a Gradient,
    options: GradientMapOptions,
    output: PixelBuffer,
    next_row: usize,
}

impl<'a> GradientMapJob<'a> {
    pub fn new(
        source: &'a PixelBuffer,
        gradient: &'a Gradient,
        options: GradientMapOptions,
    ) -> Self {
        Self {
            source,
            gradient,
            options,
            output: source.clone(),
            next_row: 0,
        }
    }

    /// Maps up to `rows` more rows (at least one). Returns `true` once the
    /// whole image is done.
    pub fn step(&mut self, rows: usize) -> bool {
        let end = (self.next_row + rows.max(1)).min(self.source.height());
        map_rows(
            self.source,
            self.gradient,
            &self.options,
            self.next_row..end,
            self.output.data_mut(),
        );
        self.next_row = end;
        self.is_done()
    }

    pub fn is_done(&self) -> bool {
        self.next_row >= self.source.height()
    }

    /// Fraction of rows mapped, in [0, 1].
    pub fn progress(&self) -> f64 {
        self.next_row as f64 / self.source.height() as f64
    }

    /// The output so far. Unmapped rows still hold the source pixels.
    pub fn finish(self) -> PixelBuffer {
        self.output
    }

    /// Steps to completion in chunks of `rows_per_chunk`, checking `cancel`
    /// before each chunk.
    pub fn run(
        mut self,
        rows_per_chunk: usize,
        cancel: Option<&CancelFlag>,
    ) -> Result<PixelBuffer, ColorError> {
        while !self.is_done() {
            if cancel.is_some_and(CancelFlag::is_cancelled) {
                tracing::debug!(progress = self.progress(), "gradient map cancelled");
                return Err(ColorError::Cancelled);
            }
            self.step(rows_per_chunk);
        }
        Ok(self.output)
    }
}
