//! Color harmonies derived by rotating hue (or stepping lightness) in HSL.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::color::{hsl_to_rgb, normalize_hue, Hsl, Rgb};
use crate::error::ColorError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum HarmonyMode {
    Complementary,
    Analogous,
    Triadic,
    SplitComplementary,
    Tetradic,
    Monochromatic,
}

impl HarmonyMode {
    pub const ALL: [HarmonyMode; 6] = [
        HarmonyMode::Complementary,
        HarmonyMode::Analogous,
        HarmonyMode::Triadic,
        HarmonyMode::SplitComplementary,
        HarmonyMode::Tetradic,
        HarmonyMode::Monochromatic,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            HarmonyMode::Complementary => "complementary",
            HarmonyMode::Analogous => "analogous",
            HarmonyMode::Triadic => "triadic",
            HarmonyMode::SplitComplementary => "split-complementary",
            HarmonyMode::Tetradic => "tetradic",
            HarmonyMode::Monochromatic => "monochromatic",
        }
    }

    /// Hue offsets in degrees from the base, excluding the base itself.
    fn hue_offsets(self) -> &'static [f64] {
        match self {
            HarmonyMode::Complementary => &[180.0],
            HarmonyMode::Analogous => &[-30.0, 30.0],
            HarmonyMode::Triadic => &[120.0, 240.0],
            HarmonyMode::SplitComplementary => &[150.0, 210.0],
            HarmonyMode::Tetradic => &[90.0, 180.0, 270.0],
            HarmonyMode::Monochromatic => &[],
        }
    }
}

impl fmt::Display for HarmonyMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for HarmonyMode {
    type Err = ColorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase().replace('_', "-");
        HarmonyMode::ALL
            .into_iter()
            .find(|m| m.as_str() == wanted)
            .ok_or_else(|| ColorError::Parse(format!("unknown harmony mode '{s}'")))
    }
}

/// Lightness offsets for the monochromatic ramp, in percentage points.
const MONOCHROME_STEPS: [f64; 4] = [-30.0, -15.0, 15.0, 30.0];
const MONOCHROME_MIN_L: f64 = 5.0;
const MONOCHROME_MAX_L: f64 = 95.0;

/// Derives a harmony from `base`. The base color is always first and is
/// returned unchanged; the rest keep its saturation and lightness (or, for
/// monochromatic, its hue and saturation).
pub fn harmony(base: Rgb, mode: HarmonyMode) -> Vec<Rgb> {
    let hsl = base.to_hsl();
    let mut colors = vec![base];
    if mode == HarmonyMode::Monochromatic {
        colors.extend(MONOCHROME_STEPS.iter().map(|step| {
            let l = (hsl.l + step).clamp(MONOCHROME_MIN_L, MONOCHROME_MAX_L);
            hsl_to_rgb(Hsl { l, ..hsl })
        }));
    } else {
        colors.extend(mode.hue_offsets().iter().map(|offset| {
            hsl_to_rgb(Hsl {
                h: normalize_hue(hsl.h + offset),
                ..hsl
            })
        }));
    }
    colors
}
