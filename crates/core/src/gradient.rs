//! Gradient stops, luminance, and luminance-to-color lookup.
//!
//! A [`Gradient`] is at least one [`GradientStop`] ordered by position.
//! Interpolation happens either in CIE LAB (linear per channel,
//! perceptually even) or in HSL with shortest-arc hue interpolation, so a
//! ramp from 350° to 10° passes through red rather than around the wheel.

use serde::{Deserialize, Serialize};

use crate::color::{hsl_to_rgb, lab_to_rgb, normalize_hue, Hsl, Lab, Rgb};
use crate::error::ColorError;
use crate::parse::parse_color;

/// An anchor point of a gradient. `position` is in [0, 1].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GradientStop {
    pub position: f64,
    pub color: Rgb,
}

impl GradientStop {
    pub fn new(position: f64, color: Rgb) -> Self {
        Self { position, color }
    }
}

/// Ordered stops with positions clamped into [0, 1].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<GradientStop>", into = "Vec<GradientStop>")]
pub struct Gradient {
    stops: Vec<GradientStop>,
}

impl Gradient {
    /// Builds a gradient. Out-of-range positions are clamped, NaN becomes 0,
    /// and stops are stable-sorted so duplicates keep their given order.
    ///
    /// Returns `ColorError::InvalidGradient` for an empty stop list.
    pub fn new(mut stops: Vec<GradientStop>) -> Result<Self, ColorError> {
        if stops.is_empty() {
            return Err(ColorError::InvalidGradient(
                "gradient requires at least 1 stop".to_string(),
            ));
        }
        for stop in &mut stops {
            stop.position = if stop.position.is_nan() {
                0.0
            } else {
                stop.position.clamp(0.0, 1.0)
            };
        }
        stops.sort_by(|a, b| a.position.total_cmp(&b.position));
        Ok(Self { stops })
    }

    /// Evenly spaced stops from `colors`.
    pub fn from_colors(colors: &[Rgb]) -> Result<Self, ColorError> {
        let last = colors.len().saturating_sub(1).max(1) as f64;
        Self::new(
            colors
                .iter()
                .enumerate()
                .map(|(i, &c)| GradientStop::new(i as f64 / last, c))
                .collect(),
        )
    }

    /// Parses a CSS-like stop list: `"#000 0%, #f80 40%, #fff"`.
    ///
    /// Each comma-separated entry is a color optionally followed by a
    /// position (`40%` or `0.4`). Entries without a position are spaced
    /// evenly by index. Commas inside `rgb(...)`/`hsl(...)` are respected.
    pub fn parse(list: &str) -> Result<Self, ColorError> {
        let entries = split_top_level(list);
        let count = entries.len();
        if count == 0 || entries.iter().all(|e| e.trim().is_empty()) {
            return Err(ColorError::InvalidGradient(format!("no stops in '{list}'")));
        }
        let last = count.saturating_sub(1).max(1) as f64;
        let stops = entries
            .iter()
            .enumerate()
            .map(|(i, entry)| parse_stop(entry, i as f64 / last))
            .collect::<Result<Vec<_>, _>>()?;
        Self::new(stops)
    }

    /// A built-in preset by name. See [`GradientPreset::all`].
    pub fn preset(name: &str) -> Option<Self> {
        GradientPreset::all()
            .iter()
            .find(|p| p.name == name)
            .map(GradientPreset::gradient)
    }

    pub fn stops(&self) -> &[GradientStop] {
        &self.stops
    }

    pub fn first(&self) -> GradientStop {
        self.stops[0]
    }

    pub fn last(&self) -> GradientStop {
        self.stops[self.stops.len() - 1]
    }

    /// Samples the gradient at `t` in [0, 1]. Same as
    /// [`color_for_luminance`] with `t` as the luminance.
    pub fn sample(&self, t: f64, use_lab: bool) -> Rgb {
        color_for_luminance(self, t, use_lab)
    }
}

impl TryFrom<Vec<GradientStop>> for Gradient {
    type Error = ColorError;

    fn try_from(stops: Vec<GradientStop>) -> Result<Self, Self::Error> {
        Gradient::new(stops)
    }
}

impl From<Gradient> for Vec<GradientStop> {
    fn from(g: Gradient) -> Self {
        g.stops
    }
}

fn split_top_level(list: &str) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut depth = 0usize;
    let mut start = 0;
    for (i, ch) in list.char_indices() {
        match ch {
            '(' => depth += 1,
            ')' => depth = depth.saturating_sub(1),
            ',' if depth == 0 => {
                parts.push(&list[start..i]);
                start = i + 1;
            }
            _ => {}
        }
    }
    parts.push(&list[start..]);
    parts
}

fn parse_stop(entry: &str, default_position: f64) -> Result<GradientStop, ColorError> {
    let entry = entry.trim();
    // The position, if any, follows the last space outside parentheses.
    let split = entry
        .rfind(|c: char| c.is_whitespace())
        .filter(|&i| !entry[i..].contains(')'));
    if let Some(i) = split {
        let (color_part, pos_part) = entry.split_at(i);
        let pos_part = pos_part.trim();
        let position = match pos_part.strip_suffix('%') {
            Some(pct) => pct.parse::<f64>().map(|p| p / 100.0),
            None => pos_part.parse::<f64>(),
        };
        if let Ok(position) = position {
            let color = parse_color(color_part)?.to_rgb();
            return Ok(GradientStop::new(position, color));
        }
    }
    Ok(GradientStop::new(default_position, parse_color(entry)?.to_rgb()))
}

/// Perceived lightness of `c` in [0, 1]: LAB L / 100 when `use_lab`,
/// otherwise HSL L / 100.
pub fn compute_luminance(c: Rgb, use_lab: bool) -> f64 {
    let l = if use_lab { c.to_lab().l } else { c.to_hsl().l };
    (l / 100.0).clamp(0.0, 1.0)
}

/// Resolves the gradient color at `luminance`.
///
/// At or beyond the first/last stop the stop color is returned unchanged.
/// Between stops, interpolates in LAB (`use_lab`) or HSL along the shorter
/// hue arc. NaN luminance is treated as 0.
pub fn color_for_luminance(gradient: &Gradient, luminance: f64, use_lab: bool) -> Rgb {
    let lum = if luminance.is_nan() { 0.0 } else { luminance };
    let stops = gradient.stops();
    let first = gradient.first();
    let last = gradient.last();
    if lum <= first.position {
        return first.color;
    }
    if lum >= last.position {
        return last.color;
    }

    // first.position < lum < last.position, so a later stop exists.
    let upper = stops
        .iter()
        .position(|s| s.position > lum)
        .unwrap_or(stops.len() - 1);
    let s0 = stops[upper - 1];
    let s1 = stops[upper];
    let t = (lum - s0.position) / (s1.position - s0.position);
    if t <= 0.0 {
        return s0.color;
    }

    if use_lab {
        lerp_lab(s0.color.to_lab(), s1.color.to_lab(), t)
    } else {
        lerp_hsl(s0.color.to_hsl(), s1.color.to_hsl(), t)
    }
}

fn lerp(a: f64, b: f64, t: f64) -> f64 {
    a + t * (b - a)
}

fn lerp_lab(a: Lab, b: Lab, t: f64) -> Rgb {
    lab_to_rgb(Lab {
        l: lerp(a.l, b.l, t),
        a: lerp(a.a, b.a, t),
        b: lerp(a.b, b.b, t),
    })
}

fn lerp_hsl(a: Hsl, b: Hsl, t: f64) -> Rgb {
    // An achromatic endpoint has no meaningful hue; borrow the other's.
    let (h0, h1) = match (a.s == 0.0, b.s == 0.0) {
        (true, false) => (b.h, b.h),
        (false, true) => (a.h, a.h),
        _ => (a.h, b.h),
    };
    hsl_to_rgb(Hsl {
        h: interpolate_hue(h0, h1, t),
        s: lerp(a.s, b.s, t),
        l: lerp(a.l, b.l, t),
    })
}

/// Interpolates hue along the shorter arc, handling wraparound at 360.
pub fn interpolate_hue(h0: f64, h1: f64, t: f64) -> f64 {
    let delta = match h1 - h0 {
        d if d > 180.0 => d - 360.0,
        d if d < -180.0 => d + 360.0,
        d => d,
    };
    normalize_hue(h0 + t * delta)
}

/// A named stop list shipped as plain data.
#[derive(Debug, Clone, Copy)]
pub struct GradientPreset {
    pub name: &'static str,
    stops: &'static [(f64, u32)],
}

impl GradientPreset {
    pub fn all() -> &'static [GradientPreset] {
        PRESETS
    }

    pub fn names() -> Vec<&'static str> {
        PRESETS.iter().map(|p| p.name).collect()
    }

    pub fn gradient(&self) -> Gradient {
        Gradient {
            stops: self
                .stops
                .iter()
                .map(|&(position, hex)| {
                    GradientStop::new(
                        position,
                        Rgb::new((hex >> 16) as u8, (hex >> 8) as u8, hex as u8),
                    )
                })
                .collect(),
        }
    }
}

const PRESETS: &[GradientPreset] = &[
    GradientPreset {
        name: "grayscale",
        stops: &[(0.0, 0x000000), (1.0, 0xffffff)],
    },
    GradientPreset {
        name: "sepia",
        stops: &[(0.0, 0x2b1d0e), (0.5, 0x8c6b45), (1.0, 0xf4e8d0)],
    },
    GradientPreset {
        name: "duotone-blue",
        stops: &[(0.0, 0x0b1d51), (1.0, 0x7fdbff)],
    },
    GradientPreset {
        name: "sunset",
        stops: &[(0.0, 0x2d0b3a), (0.35, 0xb3245b), (0.7, 0xf26b38), (1.0, 0xffd56b)],
    },
    GradientPreset {
        name: "ocean",
        stops: &[(0.0, 0x001f3f), (0.4, 0x005f73), (0.7, 0x0a9396), (1.0, 0x94d2bd)],
    },
    GradientPreset {
        name: "fire",
        stops: &[(0.0, 0x1a0000), (0.3, 0x800000), (0.6, 0xff4500), (1.0, 0xffd700)],
    },
    GradientPreset {
        name: "vapor",
        stops: &[(0.0, 0x7b2d8e), (0.5, 0xff9ebb), (1.0, 0xa0e7e5)],
    },
    GradientPreset {
        name: "neon",
        stops: &[(0.0, 0x120458), (0.5, 0xff00ff), (1.0, 0x00ffff)],
    },
];
