//! Color types and conversion functions for the huelab engine.
//!
//! Provides the 8-bit [`Rgb`] type that every tool exchanges, plus the
//! float spaces used for math: [`Hsl`], [`LinearRgb`], [`Xyz`], CIE [`Lab`]
//! and its polar form [`Lch`]. All conversions are pure functions. Uses
//! `f64` throughout for precision.
//!
//! The LAB path follows the conventional sRGB/D65 pipeline:
//! gamma expansion (threshold 0.04045), the standard RGB→XYZ matrix, and the
//! CIE cube-root compression with its linear segment below ε = 0.008856.
//! Every perceptual distance in the engine sits on top of these constants.

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::ColorError;

/// sRGB color with 8-bit integer channels.
///
/// Serializes as a lowercase hex string `"#rrggbb"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

/// Hue in degrees [0, 360), saturation and lightness in percent [0, 100].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Hsl {
    pub h: f64,
    pub s: f64,
    pub l: f64,
}

/// Linear RGB color (gamma-decoded), components in [0, 1].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LinearRgb {
    pub r: f64,
    pub g: f64,
    pub b: f64,
}

/// CIE 1931 XYZ relative to D65, with Y = 1 for reference white.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Xyz {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

/// CIE L*a*b* (D65). L in [0, 100], a/b roughly in [-128, 127].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Lab {
    pub l: f64,
    pub a: f64,
    pub b: f64,
}

/// CIE LCh(ab), the cylindrical form of [`Lab`]. Hue in degrees [0, 360).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Lch {
    pub l: f64,
    pub c: f64,
    pub h: f64,
}

/// A color in any of the representations the tools accept or display.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Color {
    Rgb(Rgb),
    Hsl(Hsl),
    Lab(Lab),
    Lch(Lch),
}

/// D65 reference white in XYZ (Y normalized to 1).
pub const D65_WHITE: Xyz = Xyz {
    x: 0.95047,
    y: 1.0,
    z: 1.08883,
};

/// CIE ε: boundary between the cube-root and linear segments of f(t).
const LAB_EPSILON: f64 = 0.008856;
/// CIE κ: slope of the linear segment, scaled so L* is continuous.
const LAB_KAPPA: f64 = 903.3;

impl Rgb {
    pub const BLACK: Rgb = Rgb::new(0, 0, 0);
    pub const WHITE: Rgb = Rgb::new(255, 255, 255);

    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Builds a color from float channels on the 0–255 scale, rounding and
    /// clamping each one. NaN maps to 0.
    pub fn from_f64_clamped(r: f64, g: f64, b: f64) -> Self {
        Self {
            r: clamp_channel(r),
            g: clamp_channel(g),
            b: clamp_channel(b),
        }
    }

    /// Parses a hex color: `#rgb`, `#rrggbb`, with or without `#`.
    pub fn from_hex(hex: &str) -> Result<Rgb, ColorError> {
        hex_to_rgb(hex)
    }

    /// Lowercase `#rrggbb`.
    pub fn to_hex(self) -> String {
        rgb_to_hex(self)
    }

    /// CSS functional notation, e.g. `rgb(52, 152, 219)`.
    pub fn to_css(self) -> String {
        format!("rgb({}, {}, {})", self.r, self.g, self.b)
    }

    pub fn to_hsl(self) -> Hsl {
        rgb_to_hsl(self)
    }

    pub fn to_lab(self) -> Lab {
        rgb_to_lab(self)
    }

    pub fn to_lch(self) -> Lch {
        lab_to_lch(rgb_to_lab(self))
    }

    /// Channels as an `[r, g, b]` array.
    pub fn channels(self) -> [u8; 3] {
        [self.r, self.g, self.b]
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

impl Serialize for Rgb {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for Rgb {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Rgb::from_hex(&s).map_err(serde::de::Error::custom)
    }
}

impl Hsl {
    /// Creates an HSL value, wrapping hue into [0, 360) and clamping
    /// saturation/lightness into [0, 100]. NaN components become 0.
    pub fn new(h: f64, s: f64, l: f64) -> Self {
        Self {
            h: normalize_hue(finite_or_zero(h)),
            s: finite_or_zero(s).clamp(0.0, 100.0),
            l: finite_or_zero(l).clamp(0.0, 100.0),
        }
    }

    /// Integer-rounded components, as shown in the UI and CSS output.
    /// A hue that rounds up to 360 wraps to 0.
    pub fn rounded(self) -> Hsl {
        let h = self.h.round();
        Hsl {
            h: if h >= 360.0 { 0.0 } else { h },
            s: self.s.round(),
            l: self.l.round(),
        }
    }

    /// CSS functional notation, e.g. `hsl(204, 70%, 53%)`.
    pub fn to_css(self) -> String {
        let r = self.rounded();
        format!("hsl({}, {}%, {}%)", r.h, r.s, r.l)
    }

    pub fn to_rgb(self) -> Rgb {
        hsl_to_rgb(self)
    }
}

impl Color {
    pub fn to_rgb(self) -> Rgb {
        match self {
            Color::Rgb(c) => c,
            Color::Hsl(c) => hsl_to_rgb(c),
            Color::Lab(c) => lab_to_rgb(c),
            Color::Lch(c) => lab_to_rgb(lch_to_lab(c)),
        }
    }

    pub fn to_hsl(self) -> Hsl {
        match self {
            Color::Hsl(c) => c,
            other => rgb_to_hsl(other.to_rgb()),
        }
    }

    /// LAB without an 8-bit round trip when the source is already LAB/LCH.
    pub fn to_lab(self) -> Lab {
        match self {
            Color::Lab(c) => c,
            Color::Lch(c) => lch_to_lab(c),
            other => rgb_to_lab(other.to_rgb()),
        }
    }

    pub fn to_lch(self) -> Lch {
        match self {
            Color::Lch(c) => c,
            other => lab_to_lch(other.to_lab()),
        }
    }

    pub fn to_hex(self) -> String {
        rgb_to_hex(self.to_rgb())
    }
}

impl From<Rgb> for Color {
    fn from(c: Rgb) -> Self {
        Color::Rgb(c)
    }
}

impl From<Hsl> for Color {
    fn from(c: Hsl) -> Self {
        Color::Hsl(c)
    }
}

impl From<Lab> for Color {
    fn from(c: Lab) -> Self {
        Color::Lab(c)
    }
}

impl From<Lch> for Color {
    fn from(c: Lch) -> Self {
        Color::Lch(c)
    }
}

/// Rounds a 0–255 float to a channel, clamping out-of-range values.
/// NaN maps to 0.
pub fn clamp_channel(v: f64) -> u8 {
    if v.is_nan() {
        return 0;
    }
    v.round().clamp(0.0, 255.0) as u8
}

fn finite_or_zero(v: f64) -> f64 {
    if v.is_finite() {
        v
    } else {
        0.0
    }
}

/// Normalizes a hue angle to [0, 360).
pub fn normalize_hue(h: f64) -> f64 {
    let h = h.rem_euclid(360.0);
    // rem_euclid can return exactly 360.0 for tiny negative inputs.
    if h >= 360.0 {
        0.0
    } else {
        h
    }
}

// -- Hex --

/// Formats a color as lowercase `#rrggbb`.
pub fn rgb_to_hex(c: Rgb) -> String {
    format!("#{:02x}{:02x}{:02x}", c.r, c.g, c.b)
}

/// Parses `#rgb` / `#rrggbb` (leading `#` optional, case-insensitive,
/// surrounding whitespace ignored).
pub fn hex_to_rgb(hex: &str) -> Result<Rgb, ColorError> {
    let trimmed = hex.trim();
    let digits = trimmed.strip_prefix('#').unwrap_or(trimmed);
    if !digits.bytes().all(|b| b.is_ascii_hexdigit()) {
        return Err(ColorError::Parse(format!("invalid hex digits in '{hex}'")));
    }
    let parse = |s: &str| {
        u8::from_str_radix(s, 16).map_err(|e| ColorError::Parse(format!("'{hex}': {e}")))
    };
    match digits.len() {
        3 => {
            let r = parse(&digits[0..1])?;
            let g = parse(&digits[1..2])?;
            let b = parse(&digits[2..3])?;
            Ok(Rgb::new(r * 17, g * 17, b * 17))
        }
        6 => Ok(Rgb::new(
            parse(&digits[0..2])?,
            parse(&digits[2..4])?,
            parse(&digits[4..6])?,
        )),
        n => Err(ColorError::Parse(format!(
            "expected 3 or 6 hex digits in '{hex}', got {n}"
        ))),
    }
}

// -- HSL --

/// Converts to HSL with the standard max/min formulas. Achromatic colors
/// get hue 0 and saturation 0.
pub fn rgb_to_hsl(c: Rgb) -> Hsl {
    let r = f64::from(c.r) / 255.0;
    let g = f64::from(c.g) / 255.0;
    let b = f64::from(c.b) / 255.0;
    let max = r.max(g).max(b);
    let min = r.min(g).min(b);
    let l = (max + min) / 2.0;

    if max == min {
        return Hsl {
            h: 0.0,
            s: 0.0,
            l: l * 100.0,
        };
    }

    let d = max - min;
    let s = if l > 0.5 {
        d / (2.0 - max - min)
    } else {
        d / (max + min)
    };
    let h = if max == r {
        (g - b) / d + if g < b { 6.0 } else { 0.0 }
    } else if max == g {
        (b - r) / d + 2.0
    } else {
        (r - g) / d + 4.0
    };

    Hsl {
        h: normalize_hue(h * 60.0),
        s: s * 100.0,
        l: l * 100.0,
    }
}

/// Converts HSL back to 8-bit RGB. Inputs are sanitized the same way as
/// [`Hsl::new`].
pub fn hsl_to_rgb(c: Hsl) -> Rgb {
    let c = Hsl::new(c.h, c.s, c.l);
    let h = c.h / 360.0;
    let s = c.s / 100.0;
    let l = c.l / 100.0;

    if s == 0.0 {
        let v = l * 255.0;
        return Rgb::from_f64_clamped(v, v, v);
    }

    let q = if l < 0.5 { l * (1.0 + s) } else { l + s - l * s };
    let p = 2.0 * l - q;
    Rgb::from_f64_clamped(
        hue_to_channel(p, q, h + 1.0 / 3.0) * 255.0,
        hue_to_channel(p, q, h) * 255.0,
        hue_to_channel(p, q, h - 1.0 / 3.0) * 255.0,
    )
}

fn hue_to_channel(p: f64, q: f64, t: f64) -> f64 {
    let t = t.rem_euclid(1.0);
    if t < 1.0 / 6.0 {
        p + (q - p) * 6.0 * t
    } else if t < 0.5 {
        q
    } else if t < 2.0 / 3.0 {
        p + (q - p) * (2.0 / 3.0 - t) * 6.0
    } else {
        p
    }
}

// -- Linear RGB / XYZ --

/// Applies inverse sRGB gamma to a single component in [0, 1].
fn srgb_component_to_linear(c: f64) -> f64 {
    if c <= 0.04045 {
        c / 12.92
    } else {
        ((c + 0.055) / 1.055).powf(2.4)
    }
}

/// Applies sRGB gamma to a single linear component.
fn linear_component_to_srgb(c: f64) -> f64 {
    if c <= 0.0031308 {
        c * 12.92
    } else {
        1.055 * c.powf(1.0 / 2.4) - 0.055
    }
}

/// Gamma-expands an 8-bit color to linear RGB.
pub fn rgb_to_linear(c: Rgb) -> LinearRgb {
    LinearRgb {
        r: srgb_component_to_linear(f64::from(c.r) / 255.0),
        g: srgb_component_to_linear(f64::from(c.g) / 255.0),
        b: srgb_component_to_linear(f64::from(c.b) / 255.0),
    }
}

/// Gamma-compresses linear RGB and quantizes to 8 bits with clamping.
pub fn linear_to_rgb(c: LinearRgb) -> Rgb {
    Rgb::from_f64_clamped(
        linear_component_to_srgb(c.r) * 255.0,
        linear_component_to_srgb(c.g) * 255.0,
        linear_component_to_srgb(c.b) * 255.0,
    )
}

/// Linear sRGB to XYZ using the standard D65 matrix.
pub fn linear_to_xyz(c: LinearRgb) -> Xyz {
    Xyz {
        x: 0.4124564 * c.r + 0.3575761 * c.g + 0.1804375 * c.b,
        y: 0.2126729 * c.r + 0.7151522 * c.g + 0.0721750 * c.b,
        z: 0.0193339 * c.r + 0.1191920 * c.g + 0.9503041 * c.b,
    }
}

/// XYZ to linear sRGB using the inverse D65 matrix. Output may fall
/// outside [0, 1] for out-of-gamut colors.
pub fn xyz_to_linear(c: Xyz) -> LinearRgb {
    LinearRgb {
        r: 3.2404542 * c.x - 1.5371385 * c.y - 0.4985314 * c.z,
        g: -0.9692660 * c.x + 1.8760108 * c.y + 0.0415560 * c.z,
        b: 0.0556434 * c.x - 0.2040259 * c.y + 1.0572252 * c.z,
    }
}

// -- LAB / LCH --

fn lab_f(t: f64) -> f64 {
    if t > LAB_EPSILON {
        t.cbrt()
    } else {
        (LAB_KAPPA * t + 16.0) / 116.0
    }
}

fn lab_f_inv(f: f64) -> f64 {
    let cubed = f * f * f;
    if cubed > LAB_EPSILON {
        cubed
    } else {
        (116.0 * f - 16.0) / LAB_KAPPA
    }
}

/// XYZ (D65) to CIE LAB.
pub fn xyz_to_lab(c: Xyz) -> Lab {
    let fx = lab_f(c.x / D65_WHITE.x);
    let fy = lab_f(c.y / D65_WHITE.y);
    let fz = lab_f(c.z / D65_WHITE.z);
    Lab {
        l: 116.0 * fy - 16.0,
        a: 500.0 * (fx - fy),
        b: 200.0 * (fy - fz),
    }
}

/// CIE LAB to XYZ (D65).
pub fn lab_to_xyz(c: Lab) -> Xyz {
    let fy = (c.l + 16.0) / 116.0;
    let fx = fy + c.a / 500.0;
    let fz = fy - c.b / 200.0;
    Xyz {
        x: lab_f_inv(fx) * D65_WHITE.x,
        y: lab_f_inv(fy) * D65_WHITE.y,
        z: lab_f_inv(fz) * D65_WHITE.z,
    }
}

/// Convenience: sRGB → linear → XYZ → LAB.
pub fn rgb_to_lab(c: Rgb) -> Lab {
    xyz_to_lab(linear_to_xyz(rgb_to_linear(c)))
}

/// Convenience: LAB → XYZ → linear → sRGB, clamped to the 8-bit gamut.
pub fn lab_to_rgb(c: Lab) -> Rgb {
    linear_to_rgb(xyz_to_linear(lab_to_xyz(c)))
}

/// LAB to LCh. Hue is 0 when chroma is below 1e-10 to avoid the
/// indeterminate `atan2(0, 0)`.
pub fn lab_to_lch(c: Lab) -> Lch {
    let chroma = (c.a * c.a + c.b * c.b).sqrt();
    let h = if chroma < 1e-10 {
        0.0
    } else {
        normalize_hue(c.b.atan2(c.a).to_degrees())
    };
    Lch {
        l: c.l,
        c: chroma,
        h,
    }
}

/// LCh to LAB.
pub fn lch_to_lab(c: Lch) -> Lab {
    let h_rad = c.h.to_radians();
    Lab {
        l: c.l,
        a: c.c * h_rad.cos(),
        b: c.c * h_rad.sin(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPSILON: f64 = 1e-6;

    fn approx_eq(a: f64, b: f64, eps: f64) -> bool {
        (a - b).abs() < eps
    }

    fn channel_drift(a: Rgb, b: Rgb) -> u8 {
        a.r.abs_diff(b.r).max(a.g.abs_diff(b.g)).max(a.b.abs_diff(b.b))
    }

    // -- Hex --

    #[test]
    fn hex_parses_six_digits_with_hash() {
        assert_eq!(hex_to_rgb("#ff8000").unwrap(), Rgb::new(255, 128, 0));
    }

    #[test]
    fn hex_parses_without_hash_and_uppercase() {
        assert_eq!(hex_to_rgb("3498DB").unwrap(), Rgb::new(0x34, 0x98, 0xdb));
    }

    #[test]
    fn hex_expands_shorthand() {
        assert_eq!(hex_to_rgb("#f0a").unwrap(), Rgb::new(255, 0, 170));
    }

    #[test]
    fn hex_tolerates_surrounding_whitespace() {
        assert_eq!(hex_to_rgb("  #000000 ").unwrap(), Rgb::BLACK);
    }

    #[test]
    fn hex_rejects_malformed_input() {
        assert!(hex_to_rgb("").is_err());
        assert!(hex_to_rgb("#").is_err());
        assert!(hex_to_rgb("#gggggg").is_err());
        assert!(hex_to_rgb("#ffff").is_err());
        assert!(hex_to_rgb("#ff00ff00").is_err());
        assert!(hex_to_rgb("+12345").is_err());
    }

    #[test]
    fn to_hex_is_lowercase() {
        assert_eq!(rgb_to_hex(Rgb::new(0xAB, 0xCD, 0xEF)), "#abcdef");
    }

    #[test]
    fn hex_round_trip_covers_the_24_bit_space() {
        for r in (0..=255u8).step_by(3) {
            for g in (0..=255u8).step_by(3) {
                for b in (0..=255u8).step_by(3) {
                    let c = Rgb::new(r, g, b);
                    assert_eq!(hex_to_rgb(&rgb_to_hex(c)).unwrap(), c);
                }
            }
        }
        for v in 0..=255u8 {
            for c in [Rgb::new(v, 0, 255), Rgb::new(255, v, 0), Rgb::new(0, 255, v)] {
                assert_eq!(hex_to_rgb(&rgb_to_hex(c)).unwrap(), c);
            }
        }
    }

    #[test]
    fn display_matches_to_hex() {
        let c = Rgb::new(0x34, 0x98, 0xdb);
        assert_eq!(c.to_string(), c.to_hex());
    }

    // -- Clamping --

    #[test]
    fn from_f64_clamped_clamps_and_rounds() {
        assert_eq!(
            Rgb::from_f64_clamped(-20.0, 300.0, 127.5),
            Rgb::new(0, 255, 128)
        );
    }

    #[test]
    fn from_f64_clamped_maps_nan_to_zero() {
        assert_eq!(Rgb::from_f64_clamped(f64::NAN, 10.0, 10.0), Rgb::new(0, 10, 10));
    }

    // -- HSL --

    #[test]
    fn hsl_of_primaries() {
        let red = rgb_to_hsl(Rgb::new(255, 0, 0));
        assert!(approx_eq(red.h, 0.0, EPSILON));
        assert!(approx_eq(red.s, 100.0, EPSILON));
        assert!(approx_eq(red.l, 50.0, EPSILON));

        let green = rgb_to_hsl(Rgb::new(0, 255, 0));
        assert!(approx_eq(green.h, 120.0, EPSILON));

        let blue = rgb_to_hsl(Rgb::new(0, 0, 255));
        assert!(approx_eq(blue.h, 240.0, EPSILON));
    }

    #[test]
    fn hsl_of_gray_is_achromatic() {
        let gray = rgb_to_hsl(Rgb::new(128, 128, 128));
        assert_eq!(gray.h, 0.0);
        assert_eq!(gray.s, 0.0);
        assert!(approx_eq(gray.l, 50.196, 1e-3));
    }

    #[test]
    fn hsl_known_color_rounds_as_displayed() {
        let hsl = rgb_to_hsl(Rgb::new(0x34, 0x98, 0xdb)).rounded();
        assert_eq!((hsl.h, hsl.s, hsl.l), (204.0, 70.0, 53.0));
        assert_eq!(
            rgb_to_hsl(Rgb::new(0x34, 0x98, 0xdb)).to_css(),
            "hsl(204, 70%, 53%)"
        );
    }

    #[test]
    fn hsl_to_rgb_sanitizes_inputs() {
        let wrapped = hsl_to_rgb(Hsl {
            h: 480.0,
            s: 100.0,
            l: 50.0,
        });
        assert_eq!(wrapped, Rgb::new(0, 255, 0));

        let clamped = hsl_to_rgb(Hsl {
            h: f64::NAN,
            s: -10.0,
            l: 140.0,
        });
        assert_eq!(clamped, Rgb::WHITE);
    }

    #[test]
    fn hsl_round_trip_within_one_per_channel() {
        for r in (0..=255u8).step_by(5) {
            for g in (0..=255u8).step_by(5) {
                for b in (0..=255u8).step_by(5) {
                    let c = Rgb::new(r, g, b);
                    let back = hsl_to_rgb(rgb_to_hsl(c));
                    assert!(channel_drift(c, back) <= 1, "{c} -> {back}");
                }
            }
        }
    }

    #[test]
    fn rounded_hue_never_reaches_360() {
        let hsl = Hsl {
            h: 359.7,
            s: 50.0,
            l: 50.0,
        };
        assert_eq!(hsl.rounded().h, 0.0);
    }

    // -- LAB --

    #[test]
    fn white_in_lab_has_l_100_and_zero_ab() {
        let lab = rgb_to_lab(Rgb::WHITE);
        assert!(approx_eq(lab.l, 100.0, 1e-3), "L: {}", lab.l);
        assert!(approx_eq(lab.a, 0.0, 1e-2), "a: {}", lab.a);
        assert!(approx_eq(lab.b, 0.0, 1e-2), "b: {}", lab.b);
    }

    #[test]
    fn black_in_lab_is_zero() {
        let lab = rgb_to_lab(Rgb::BLACK);
        assert!(approx_eq(lab.l, 0.0, EPSILON));
        assert!(approx_eq(lab.a, 0.0, EPSILON));
        assert!(approx_eq(lab.b, 0.0, EPSILON));
    }

    #[test]
    fn lab_of_reference_colors() {
        // Reference values from the standard sRGB/D65 pipeline.
        let red = rgb_to_lab(Rgb::new(255, 0, 0));
        assert!(approx_eq(red.l, 53.24, 0.01), "L: {}", red.l);
        assert!(approx_eq(red.a, 80.09, 0.01), "a: {}", red.a);
        assert!(approx_eq(red.b, 67.20, 0.01), "b: {}", red.b);

        let blue = rgb_to_lab(Rgb::new(0, 0, 255));
        assert!(approx_eq(blue.l, 32.30, 0.01), "L: {}", blue.l);
        assert!(approx_eq(blue.a, 79.19, 0.01), "a: {}", blue.a);
        assert!(approx_eq(blue.b, -107.86, 0.01), "b: {}", blue.b);
    }

    #[test]
    fn gamma_boundary_at_0_04045() {
        let lin = srgb_component_to_linear(0.04045);
        assert!(approx_eq(lin, 0.04045 / 12.92, 1e-12));
        let above = srgb_component_to_linear(0.04046);
        assert!(approx_eq(above, ((0.04046 + 0.055) / 1.055_f64).powf(2.4), 1e-12));
    }

    #[test]
    fn lab_linear_segment_below_epsilon() {
        // Very dark colors exercise the linear branch of f(t).
        let lab = rgb_to_lab(Rgb::new(1, 1, 1));
        assert!(lab.l > 0.0 && lab.l < 1.0, "L: {}", lab.l);
        assert_eq!(lab_to_rgb(lab), Rgb::new(1, 1, 1));
    }

    #[test]
    fn lab_to_rgb_clamps_out_of_gamut() {
        let rgb = lab_to_rgb(Lab {
            l: 90.0,
            a: -120.0,
            b: 120.0,
        });
        assert_eq!(rgb.r, 0);
        assert_eq!(rgb.g, 255);
    }

    #[test]
    fn lab_round_trip_is_exact_for_sampled_colors() {
        for r in (0..=255u8).step_by(15) {
            for g in (0..=255u8).step_by(15) {
                for b in (0..=255u8).step_by(15) {
                    let c = Rgb::new(r, g, b);
                    assert_eq!(lab_to_rgb(rgb_to_lab(c)), c);
                }
            }
        }
    }

    // -- LCH --

    #[test]
    fn lch_nan_guard_zero_chroma_sets_hue_to_zero() {
        let lch = lab_to_lch(Lab {
            l: 50.0,
            a: 0.0,
            b: 0.0,
        });
        assert_eq!(lch.h, 0.0);
        assert!(!lch.h.is_nan());
    }

    #[test]
    fn lch_hue_is_normalized() {
        let lch = lab_to_lch(Lab {
            l: 50.0,
            a: 10.0,
            b: -10.0,
        });
        assert!(approx_eq(lch.h, 315.0, EPSILON), "h: {}", lch.h);
    }

    #[test]
    fn lch_lab_round_trip() {
        let original = Lch {
            l: 60.0,
            c: 40.0,
            h: 250.0,
        };
        let back = lab_to_lch(lch_to_lab(original));
        assert!(approx_eq(back.l, original.l, EPSILON));
        assert!(approx_eq(back.c, original.c, EPSILON));
        assert!(approx_eq(back.h, original.h, EPSILON));
    }

    // -- Color enum --

    #[test]
    fn color_enum_converts_between_representations() {
        let c = Color::Rgb(Rgb::new(0x34, 0x98, 0xdb));
        assert_eq!(Color::Hsl(c.to_hsl()).to_rgb(), c.to_rgb());
        assert_eq!(Color::Lab(c.to_lab()).to_rgb(), c.to_rgb());
        assert_eq!(Color::Lch(c.to_lch()).to_rgb(), c.to_rgb());
        assert_eq!(c.to_hex(), "#3498db");
    }

    // -- Serde --

    #[test]
    fn rgb_serializes_as_hex_string() {
        let json = serde_json::to_string(&Rgb::new(255, 0, 0)).unwrap();
        assert_eq!(json, "\"#ff0000\"");
    }

    #[test]
    fn rgb_deserializes_from_hex_string() {
        let c: Rgb = serde_json::from_str("\"#0F0\"").unwrap();
        assert_eq!(c, Rgb::new(0, 255, 0));
    }

    #[test]
    fn rgb_deserialize_rejects_invalid_hex() {
        let result: Result<Rgb, _> = serde_json::from_str("\"not-a-color\"");
        assert!(result.is_err());
    }

    #[test]
    fn css_output() {
        assert_eq!(Rgb::new(1, 2, 3).to_css(), "rgb(1, 2, 3)");
    }

    mod proptests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn hex_round_trip_is_exact(r: u8, g: u8, b: u8) {
                let c = Rgb::new(r, g, b);
                prop_assert_eq!(hex_to_rgb(&rgb_to_hex(c)).unwrap(), c);
            }

            #[test]
            fn hsl_round_trip_within_one(r: u8, g: u8, b: u8) {
                let c = Rgb::new(r, g, b);
                let back = hsl_to_rgb(rgb_to_hsl(c));
                prop_assert!(channel_drift(c, back) <= 1, "{} -> {}", c, back);
            }

            #[test]
            fn hsl_components_stay_in_range(r: u8, g: u8, b: u8) {
                let hsl = rgb_to_hsl(Rgb::new(r, g, b));
                prop_assert!((0.0..360.0).contains(&hsl.h), "h: {}", hsl.h);
                prop_assert!((0.0..=100.0 + 1e-9).contains(&hsl.s), "s: {}", hsl.s);
                prop_assert!((0.0..=100.0 + 1e-9).contains(&hsl.l), "l: {}", hsl.l);
            }

            #[test]
            fn lab_round_trip_within_one(r: u8, g: u8, b: u8) {
                let c = Rgb::new(r, g, b);
                let back = lab_to_rgb(rgb_to_lab(c));
                prop_assert!(channel_drift(c, back) <= 1, "{} -> {}", c, back);
            }

            #[test]
            fn lch_hue_is_never_nan(
                l in 0.0_f64..=100.0,
                a in -128.0_f64..=127.0,
                b in -128.0_f64..=127.0,
            ) {
                let lch = lab_to_lch(Lab { l, a, b });
                prop_assert!(!lch.h.is_nan());
                prop_assert!(lch.h >= 0.0 && lch.h < 360.0, "h: {}", lch.h);
            }

            #[test]
            fn lab_to_rgb_never_panics(
                l in -50.0_f64..=150.0,
                a in -200.0_f64..=200.0,
                b in -200.0_f64..=200.0,
            ) {
                let _ = lab_to_rgb(Lab { l, a, b });
            }
        }
    }
}
