//! Compositing of a gradient-mapped color onto the original pixel.
//!
//! Formulas follow the W3C Compositing and Blending Level 1 definitions.
//! The original pixel is the backdrop and the gradient color is the source.
//! All math runs on unit-range channels.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::color::Rgb;
use crate::error::ColorError;

/// How the mapped color combines with the original pixel.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum BlendMode {
    #[default]
    Normal,
    Multiply,
    Screen,
    Overlay,
    SoftLight,
    /// Source hue and saturation with backdrop luminosity.
    Color,
    /// Backdrop hue and saturation with source luminosity.
    Luminosity,
}

impl BlendMode {
    pub const ALL: [BlendMode; 7] = [
        BlendMode::Normal,
        BlendMode::Multiply,
        BlendMode::Screen,
        BlendMode::Overlay,
        BlendMode::SoftLight,
        BlendMode::Color,
        BlendMode::Luminosity,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            BlendMode::Normal => "normal",
            BlendMode::Multiply => "multiply",
            BlendMode::Screen => "screen",
            BlendMode::Overlay => "overlay",
            BlendMode::SoftLight => "soft-light",
            BlendMode::Color => "color",
            BlendMode::Luminosity => "luminosity",
        }
    }
}

impl fmt::Display for BlendMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BlendMode {
    type Err = ColorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase().replace('_', "-");
        BlendMode::ALL
            .into_iter()
            .find(|m| m.as_str() == wanted)
            .ok_or_else(|| ColorError::Parse(format!("unknown blend mode '{s}'")))
    }
}

type Unit3 = [f64; 3];

fn to_unit(c: Rgb) -> Unit3 {
    [
        f64::from(c.r) / 255.0,
        f64::from(c.g) / 255.0,
        f64::from(c.b) / 255.0,
    ]
}

/// Blends `source` over `backdrop` with `mode`, then mixes the result back
/// toward the backdrop by `intensity` (clamped to [0, 1]).
///
/// Intensity 0 returns the backdrop; intensity 1 returns the pure blend.
pub fn blend(backdrop: Rgb, source: Rgb, mode: BlendMode, intensity: f64) -> Rgb {
    let t = if intensity.is_nan() {
        0.0
    } else {
        intensity.clamp(0.0, 1.0)
    };
    let cb = to_unit(backdrop);
    let cs = to_unit(source);
    let mixed = blend_unit(cb, cs, mode);
    let out: Unit3 = std::array::from_fn(|i| cb[i] * (1.0 - t) + mixed[i] * t);
    Rgb::from_f64_clamped(out[0] * 255.0, out[1] * 255.0, out[2] * 255.0)
}

fn blend_unit(cb: Unit3, cs: Unit3, mode: BlendMode) -> Unit3 {
    match mode {
        BlendMode::Normal => cs,
        BlendMode::Multiply => separable(cb, cs, |b, s| b * s),
        BlendMode::Screen => separable(cb, cs, screen),
        BlendMode::Overlay => separable(cb, cs, |b, s| hard_light(s, b)),
        BlendMode::SoftLight => separable(cb, cs, soft_light),
        BlendMode::Color => set_lum(cs, lum(cb)),
        BlendMode::Luminosity => set_lum(cb, lum(cs)),
    }
}

fn separable(cb: Unit3, cs: Unit3, f: impl Fn(f64, f64) -> f64) -> Unit3 {
    std::array::from_fn(|i| f(cb[i], cs[i]))
}

fn screen(b: f64, s: f64) -> f64 {
    b + s - b * s
}

// Overlay is hard-light with the operands swapped.
fn hard_light(b: f64, s: f64) -> f64 {
    if s <= 0.5 {
        b * 2.0 * s
    } else {
        screen(b, 2.0 * s - 1.0)
    }
}

fn soft_light(b: f64, s: f64) -> f64 {
    if s <= 0.5 {
        b - (1.0 - 2.0 * s) * b * (1.0 - b)
    } else {
        let d = if b <= 0.25 {
            ((16.0 * b - 12.0) * b + 4.0) * b
        } else {
            b.sqrt()
        };
        b + (2.0 * s - 1.0) * (d - b)
    }
}

fn lum(c: Unit3) -> f64 {
    0.3 * c[0] + 0.59 * c[1] + 0.11 * c[2]
}

fn clip_color(c: Unit3) -> Unit3 {
    let l = lum(c);
    let n = c[0].min(c[1]).min(c[2]);
    let x = c[0].max(c[1]).max(c[2]);
    let mut out = c;
    if n < 0.0 && l - n > 0.0 {
        out = out.map(|v| l + (v - l) * l / (l - n));
    }
    if x > 1.0 && x - l > 0.0 {
        out = out.map(|v| l + (v - l) * (1.0 - l) / (x - l));
    }
    out
}

fn set_lum(c: Unit3, l: f64) -> Unit3 {
    let d = l - lum(c);
    clip_color(c.map(|v| v + d))
}

#[cfg(test)]
mod tests {
    use super::*;

    const BACK: Rgb = Rgb::new(200, 100, 50);
    const SRC: Rgb = Rgb::new(30, 160, 220);

    #[test]
    fn parses_names_case_insensitively() {
        assert_eq!("soft-light".parse::<BlendMode>().unwrap(), BlendMode::SoftLight);
        assert_eq!("Soft_Light".parse::<BlendMode>().unwrap(), BlendMode::SoftLight);
        assert_eq!(" MULTIPLY ".parse::<BlendMode>().unwrap(), BlendMode::Multiply);
        assert!("dodge".parse::<BlendMode>().is_err());
    }

    #[test]
    fn display_round_trips_through_from_str() {
        for mode in BlendMode::ALL {
            assert_eq!(mode.to_string().parse::<BlendMode>().unwrap(), mode);
        }
    }

    #[test]
    fn serde_uses_kebab_case() {
        let json = serde_json::to_string(&BlendMode::SoftLight).unwrap();
        assert_eq!(json, "\"soft-light\"");
        let mode: BlendMode = serde_json::from_str("\"luminosity\"").unwrap();
        assert_eq!(mode, BlendMode::Luminosity);
    }

    #[test]
    fn default_is_normal() {
        assert_eq!(BlendMode::default(), BlendMode::Normal);
    }

    #[test]
    fn normal_full_intensity_is_source() {
        assert_eq!(blend(BACK, SRC, BlendMode::Normal, 1.0), SRC);
    }

    #[test]
    fn zero_intensity_is_backdrop_for_every_mode() {
        for mode in BlendMode::ALL {
            assert_eq!(blend(BACK, SRC, mode, 0.0), BACK, "{mode}");
        }
        assert_eq!(blend(BACK, SRC, BlendMode::Screen, f64::NAN), BACK);
    }

    #[test]
    fn half_intensity_normal_is_midpoint() {
        let out = blend(Rgb::BLACK, Rgb::new(200, 100, 0), BlendMode::Normal, 0.5);
        assert_eq!(out, Rgb::new(100, 50, 0));
    }

    #[test]
    fn multiply_with_white_is_identity() {
        assert_eq!(blend(BACK, Rgb::WHITE, BlendMode::Multiply, 1.0), BACK);
        assert_eq!(blend(BACK, Rgb::BLACK, BlendMode::Multiply, 1.0), Rgb::BLACK);
    }

    #[test]
    fn screen_with_black_is_identity() {
        assert_eq!(blend(BACK, Rgb::BLACK, BlendMode::Screen, 1.0), BACK);
        assert_eq!(blend(BACK, Rgb::WHITE, BlendMode::Screen, 1.0), Rgb::WHITE);
    }

    #[test]
    fn overlay_keeps_black_and_white_backdrops() {
        assert_eq!(blend(Rgb::BLACK, SRC, BlendMode::Overlay, 1.0), Rgb::BLACK);
        assert_eq!(blend(Rgb::WHITE, SRC, BlendMode::Overlay, 1.0), Rgb::WHITE);
    }

    #[test]
    fn soft_light_mid_gray_source_is_identity() {
        // 0.5 is not exactly representable as u8/255, so allow a unit of drift.
        let out = blend(BACK, Rgb::new(128, 128, 128), BlendMode::SoftLight, 1.0);
        assert!(out.r.abs_diff(BACK.r) <= 1 && out.g.abs_diff(BACK.g) <= 1);
        assert!(out.b.abs_diff(BACK.b) <= 1);
    }

    #[test]
    fn luminosity_onto_gray_backdrop_takes_source_lum() {
        let gray = Rgb::new(128, 128, 128);
        let out = blend(gray, Rgb::WHITE, BlendMode::Luminosity, 1.0);
        assert_eq!(out, Rgb::WHITE);
        let out = blend(gray, Rgb::BLACK, BlendMode::Luminosity, 1.0);
        assert_eq!(out, Rgb::BLACK);
    }

    #[test]
    fn color_mode_of_gray_source_desaturates() {
        let out = blend(BACK, Rgb::new(90, 90, 90), BlendMode::Color, 1.0);
        assert!(out.r.abs_diff(out.g) <= 1 && out.g.abs_diff(out.b) <= 1, "{out}");
    }

    #[test]
    fn color_mode_preserves_backdrop_lum() {
        let out = blend(BACK, SRC, BlendMode::Color, 1.0);
        let l_back = lum(to_unit(BACK));
        let l_out = lum(to_unit(out));
        assert!((l_back - l_out).abs() < 0.01, "{l_back} vs {l_out}");
    }

    mod proptests {
        use super::*;
        use proptest::prelude::*;

        fn rgb() -> impl Strategy<Value = Rgb> {
            any::<(u8, u8, u8)>().prop_map(|(r, g, b)| Rgb::new(r, g, b))
        }

        proptest! {
            #[test]
            fn blend_never_panics(b in rgb(), s in rgb(), i in -1.0_f64..2.0, m in 0_usize..7) {
                let _ = blend(b, s, BlendMode::ALL[m], i);
            }

            #[test]
            fn clip_color_stays_in_gamut(r in -0.5_f64..1.5, g in -0.5_f64..1.5, b in -0.5_f64..1.5) {
                let l = lum([r, g, b]);
                prop_assume!((0.0..=1.0).contains(&l));
                let c = clip_color([r, g, b]);
                for v in c {
                    prop_assert!((-1e-9..=1.0 + 1e-9).contains(&v), "{v}");
                }
            }
        }
    }
}
