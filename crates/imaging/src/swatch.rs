//! Preview images for palettes and gradients.
//!
//! Always available (no feature gate): these only build a [`PixelBuffer`],
//! and the `codecs` snapshot path encodes it.

use huelab_core::cluster::ClusterAssignment;
use huelab_core::color::Rgb;
use huelab_core::error::ColorError;
use huelab_core::gradient::{color_for_luminance, Gradient};
use huelab_core::pixel::PixelBuffer;

/// Equal-width vertical bands, one per color, left to right.
pub fn palette_strip(colors: &[Rgb], width: usize, height: usize) -> Result<PixelBuffer, ColorError> {
    if colors.is_empty() {
        return Err(ColorError::InvalidDimensions);
    }
    let row: Vec<Rgb> = (0..width)
        .map(|x| colors[(x * colors.len() / width.max(1)).min(colors.len() - 1)])
        .collect();
    strip_from_row(&row, width, height)
}

/// Bands sized by each cluster's percentage, so the strip reads as the
/// image's color proportions. The last band absorbs rounding.
pub fn proportional_strip(
    clusters: &[ClusterAssignment],
    width: usize,
    height: usize,
) -> Result<PixelBuffer, ColorError> {
    let total: f64 = clusters.iter().map(|c| c.percentage).sum();
    if clusters.is_empty() || total <= 0.0 {
        return Err(ColorError::EmptySample);
    }
    let mut row = Vec::with_capacity(width);
    let mut edge = 0.0;
    for cluster in clusters {
        edge += cluster.percentage / total * width as f64;
        let end = (edge.round() as usize).min(width);
        while row.len() < end {
            row.push(cluster.color);
        }
    }
    let last = clusters[clusters.len() - 1].color;
    row.resize(width, last);
    strip_from_row(&row, width, height)
}

/// A horizontal ramp sampling `gradient` from 0 at the left edge to 1 at
/// the right edge.
pub fn gradient_strip(
    gradient: &Gradient,
    use_lab: bool,
    width: usize,
    height: usize,
) -> Result<PixelBuffer, ColorError> {
    let span = width.saturating_sub(1).max(1) as f64;
    let row: Vec<Rgb> = (0..width)
        .map(|x| color_for_luminance(gradient, x as f64 / span, use_lab))
        .collect();
    strip_from_row(&row, width, height)
}

fn strip_from_row(row: &[Rgb], width: usize, height: usize) -> Result<PixelBuffer, ColorError> {
    let mut colors = Vec::with_capacity(width.saturating_mul(height));
    for _ in 0..height {
        colors.extend_from_slice(row);
    }
    PixelBuffer::from_colors(width, height, &colors)
}
