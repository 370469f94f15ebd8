//! WCAG 2.x contrast: relative luminance, contrast ratio, pass/fail
//! classification, a per-region contrast heatmap, and accessible color
//! suggestions.
//!
//! Luminance and ratios are computed in sRGB exactly as WCAG defines them.
//! Suggested replacements are searched along CIE LAB lightness so the hue
//! and chroma of the original color survive the adjustment.

use std::ops::Range;

use serde::{Deserialize, Serialize};

use crate::cancel::CancelFlag;
use crate::color::{lab_to_rgb, Lab, Rgb};
use crate::error::ColorError;
use crate::pixel::PixelBuffer;

/// Minimum ratio for normal-size text at level AA.
pub const AA_NORMAL: f64 = 4.5;
/// Minimum ratio for large text at level AA.
pub const AA_LARGE: f64 = 3.0;
/// Minimum ratio for normal-size text at level AAA.
pub const AAA_NORMAL: f64 = 7.0;
/// Minimum ratio for large text at level AAA.
pub const AAA_LARGE: f64 = 4.5;

/// WCAG pass/fail flags for a contrast ratio.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ContrastResult {
    pub ratio: f64,
    pub aa_normal: bool,
    pub aa_large: bool,
    pub aaa_normal: bool,
    pub aaa_large: bool,
}

/// WCAG gamma expansion of one 8-bit channel.
fn wcag_linear(channel: u8) -> f64 {
    let c = f64::from(channel) / 255.0;
    if c <= 0.03928 {
        c / 12.92
    } else {
        ((c + 0.055) / 1.055).powf(2.4)
    }
}

/// Relative luminance per WCAG 2.x, in [0, 1].
pub fn relative_luminance(c: Rgb) -> f64 {
    0.2126 * wcag_linear(c.r) + 0.7152 * wcag_linear(c.g) + 0.0722 * wcag_linear(c.b)
}

/// `(L_lighter + 0.05) / (L_darker + 0.05)`, in [1, 21] regardless of
/// argument order.
pub fn contrast_ratio(fg: Rgb, bg: Rgb) -> f64 {
    ratio_from_luminance(relative_luminance(fg), relative_luminance(bg))
}

fn ratio_from_luminance(a: f64, b: f64) -> f64 {
    let (lighter, darker) = if a >= b { (a, b) } else { (b, a) };
    (lighter + 0.05) / (darker + 0.05)
}

/// Classifies a ratio against the AA/AAA thresholds. NaN ratios fail
/// every level.
pub fn classify(ratio: f64) -> ContrastResult {
    ContrastResult {
        ratio,
        aa_normal: ratio >= AA_NORMAL,
        aa_large: ratio >= AA_LARGE,
        aaa_normal: ratio >= AAA_NORMAL,
        aaa_large: ratio >= AAA_LARGE,
    }
}

// -- Heatmap --

/// Readability bucket of one heatmap cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HeatLevel {
    /// Below AA for normal text (< 4.5).
    Low,
    /// Passes AA, fails AAA (4.5 ..< 7).
    Medium,
    /// Passes AAA (>= 7).
    High,
}

impl HeatLevel {
    pub fn from_ratio(ratio: f64) -> Self {
        if ratio >= AAA_NORMAL {
            HeatLevel::High
        } else if ratio >= AA_NORMAL {
            HeatLevel::Medium
        } else {
            HeatLevel::Low
        }
    }
}

/// Mean color of a cell's visible pixels and how `text_color` reads on it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CellReading {
    pub mean: Rgb,
    pub ratio: f64,
    pub level: HeatLevel,
}

/// One cell of a [`Heatmap`]. Edge cells may be smaller than the grid size.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HeatCell {
    pub x: usize,
    pub y: usize,
    pub width: usize,
    pub height: usize,
    /// Mean alpha of the cell, in [0, 1].
    pub coverage: f64,
    /// `None` when every pixel in the cell is fully transparent.
    pub reading: Option<CellReading>,
}

impl HeatCell {
    pub fn level(&self) -> Option<HeatLevel> {
        self.reading.map(|r| r.level)
    }
}

/// Grid of [`HeatCell`]s in row-major order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Heatmap {
    pub columns: usize,
    pub rows: usize,
    pub grid_size: usize,
    pub cells: Vec<HeatCell>,
}

impl Heatmap {
    pub fn cell(&self, column: usize, row: usize) -> Option<&HeatCell> {
        if column >= self.columns || row >= self.rows {
            return None;
        }
        self.cells.get(row * self.columns + column)
    }

    /// Share (0–100) of the rated cells at each level, as
    /// `(low, medium, high)`. Fully transparent cells are not counted.
    pub fn level_shares(&self) -> (f64, f64, f64) {
        let rated = self.cells.iter().filter(|c| c.reading.is_some()).count();
        let total = rated.max(1) as f64;
        let count = |level: HeatLevel| {
            self.cells.iter().filter(|c| c.level() == Some(level)).count() as f64
        };
        (
            count(HeatLevel::Low) / total * 100.0,
            count(HeatLevel::Medium) / total * 100.0,
            count(HeatLevel::High) / total * 100.0,
        )
    }
}

/// Partitions the image into `grid_size`-pixel cells and rates how readable
/// `text_color` would be on each cell's mean color.
///
/// The mean is weighted by alpha. Returns `ColorError::Range` if
/// `grid_size` is zero.
pub fn contrast_heatmap(
    image: &PixelBuffer,
    text_color: Rgb,
    grid_size: usize,
) -> Result<Heatmap, ColorError> {
    let mut job = HeatmapJob::new(image, text_color, grid_size)?;
    job.step(job.rows);
    Ok(job.finish())
}

/// The cells of grid rows `grid_rows` only, in row-major order. Rows past
/// the last grid row are ignored.
pub fn contrast_heatmap_rows(
    image: &PixelBuffer,
    text_color: Rgb,
    grid_size: usize,
    grid_rows: Range<usize>,
) -> Result<Vec<HeatCell>, ColorError> {
    let layout = GridLayout::new(image, grid_size)?;
    let mut cells = Vec::new();
    layout.rate_rows(image, relative_luminance(text_color), grid_rows, &mut cells);
    Ok(cells)
}

#[derive(Debug, Clone, Copy)]
struct GridLayout {
    grid_size: usize,
    columns: usize,
    rows: usize,
}

impl GridLayout {
    fn new(image: &PixelBuffer, grid_size: usize) -> Result<Self, ColorError> {
        if grid_size == 0 {
            return Err(ColorError::range("grid_size", grid_size));
        }
        Ok(Self {
            grid_size,
            columns: image.width().div_ceil(grid_size),
            rows: image.height().div_ceil(grid_size),
        })
    }

    fn rate_rows(
        &self,
        image: &PixelBuffer,
        text_luminance: f64,
        grid_rows: Range<usize>,
        out: &mut Vec<HeatCell>,
    ) {
        let start = grid_rows.start.min(self.rows);
        let end = grid_rows.end.min(self.rows).max(start);
        for row in start..end {
            for column in 0..self.columns {
                let x = column * self.grid_size;
                let y = row * self.grid_size;
                let width = self.grid_size.min(image.width() - x);
                let height = self.grid_size.min(image.height() - y);
                out.push(rate_cell(image, text_luminance, x, y, width, height));
            }
        }
    }
}

fn rate_cell(
    image: &PixelBuffer,
    text_luminance: f64,
    x: usize,
    y: usize,
    width: usize,
    height: usize,
) -> HeatCell {
    let stride = image.width() * 4;
    let data = image.data();
    let mut sum = [0u64; 3];
    let mut alpha = 0u64;
    for row in y..y + height {
        let start = row * stride + x * 4;
        for px in data[start..start + width * 4].chunks_exact(4) {
            let a = u64::from(px[3]);
            sum[0] += u64::from(px[0]) * a;
            sum[1] += u64::from(px[1]) * a;
            sum[2] += u64::from(px[2]) * a;
            alpha += a;
        }
    }

    let reading = (alpha > 0).then(|| {
        let w = alpha as f64;
        let mean =
            Rgb::from_f64_clamped(sum[0] as f64 / w, sum[1] as f64 / w, sum[2] as f64 / w);
        let ratio = ratio_from_luminance(text_luminance, relative_luminance(mean));
        CellReading {
            mean,
            ratio,
            level: HeatLevel::from_ratio(ratio),
        }
    });
    HeatCell {
        x,
        y,
        width,
        height,
        coverage: alpha as f64 / (255.0 * (width * height).max(1) as f64),
        reading,
    }
}

/// A heatmap built a few grid rows at a time, mirroring
/// [`GradientMapJob`](crate::gradient_map::GradientMapJob).
#[derive(Debug)]
pub struct HeatmapJob<'a> {
    image: &'a PixelBuffer,
    text_luminance: f64,
    layout: GridLayout,
    rows: usize,
    cells: Vec<HeatCell>,
    next_row: usize,
}

impl<'a> HeatmapJob<'a> {
    /// Returns `ColorError::Range` if `grid_size` is zero.
    pub fn new(
        image: &'a PixelBuffer,
        text_color: Rgb,
        grid_size: usize,
    ) -> Result<Self, ColorError> {
        let layout = GridLayout::new(image, grid_size)?;
        Ok(Self {
            image,
            text_luminance: relative_luminance(text_color),
            layout,
            rows: layout.rows,
            cells: Vec::with_capacity(layout.columns * layout.rows),
            next_row: 0,
        })
    }

    /// Rates up to `grid_rows` more grid rows (at least one). Returns `true`
    /// once every row is done.
    pub fn step(&mut self, grid_rows: usize) -> bool {
        let end = (self.next_row + grid_rows.max(1)).min(self.rows);
        self.layout.rate_rows(
            self.image,
            self.text_luminance,
            self.next_row..end,
            &mut self.cells,
        );
        self.next_row = end;
        self.is_done()
    }

    pub fn is_done(&self) -> bool {
        self.next_row >= self.rows
    }

    /// Fraction of grid rows rated, in [0, 1].
    pub fn progress(&self) -> f64 {
        if self.rows == 0 {
            return 1.0;
        }
        self.next_row as f64 / self.rows as f64
    }

    /// The heatmap so far. Only rows already stepped have cells.
    pub fn finish(self) -> Heatmap {
        Heatmap {
            columns: self.layout.columns,
            rows: self.next_row,
            grid_size: self.layout.grid_size,
            cells: self.cells,
        }
    }

    /// Steps to completion `grid_rows_per_chunk` rows at a time, checking
    /// `cancel` before each chunk.
    pub fn run(
        mut self,
        grid_rows_per_chunk: usize,
        cancel: Option<&CancelFlag>,
    ) -> Result<Heatmap, ColorError> {
        while !self.is_done() {
            if cancel.is_some_and(CancelFlag::is_cancelled) {
                tracing::debug!(progress = self.progress(), "heatmap cancelled");
                return Err(ColorError::Cancelled);
            }
            self.step(grid_rows_per_chunk);
        }
        Ok(self.finish())
    }
}

// -- Suggestions --

/// Black or white, whichever contrasts more with `bg`.
pub fn readable_foreground(bg: Rgb) -> Rgb {
    if contrast_ratio(Rgb::BLACK, bg) >= contrast_ratio(Rgb::WHITE, bg) {
        Rgb::BLACK
    } else {
        Rgb::WHITE
    }
}

/// Adjusts `fg`'s LAB lightness until it reaches `min_ratio` against `bg`.
///
/// Both directions (darker and lighter) are binary-searched; the passing
/// candidate closest to the original lightness wins. If neither direction
/// can reach the target, falls back to [`readable_foreground`].
pub fn suggest_accessible_color(fg: Rgb, bg: Rgb, min_ratio: f64) -> Rgb {
    if contrast_ratio(fg, bg) >= min_ratio {
        return fg;
    }
    let lab = fg.to_lab();
    let darker = search_lightness(lab, bg, min_ratio, 0.0);
    let lighter = search_lightness(lab, bg, min_ratio, 100.0);

    match (darker, lighter) {
        (Some((d_rgb, d_l)), Some((l_rgb, l_l))) => {
            if (lab.l - d_l).abs() <= (l_l - lab.l).abs() {
                d_rgb
            } else {
                l_rgb
            }
        }
        (Some((rgb, _)), None) | (None, Some((rgb, _))) => rgb,
        (None, None) => readable_foreground(bg),
    }
}

/// Searches lightness between the original and `bound` for the passing
/// value nearest the original. Returns the color and its lightness.
fn search_lightness(lab: Lab, bg: Rgb, min_ratio: f64, bound: f64) -> Option<(Rgb, f64)> {
    let at = |l: f64| lab_to_rgb(Lab { l, ..lab });
    let extreme = at(bound);
    if contrast_ratio(extreme, bg) < min_ratio {
        return None;
    }

    // `near` always fails, `far` always passes.
    let mut near = lab.l;
    let mut far = bound;
    let mut best = (extreme, bound);
    for _ in 0..32 {
        let mid = (near + far) * 0.5;
        let candidate = at(mid);
        if contrast_ratio(candidate, bg) >= min_ratio {
            best = (candidate, mid);
            far = mid;
        } else {
            near = mid;
        }
    }
    Some(best)
}
