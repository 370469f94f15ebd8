//! Color string parsing.
//!
//! Accepted shapes, case-insensitive, with whitespace allowed around
//! separators:
//!
//! - `#rgb`, `#rrggbb` (leading `#` optional)
//! - `rgb(r, g, b)` / `rgba(r, g, b, a)`
//! - `hsl(h, s%, l%)` / `hsla(h, s%, l%, a)`
//!
//! Structurally invalid strings are a [`ColorError::Parse`]. Numbers that
//! parse but fall outside their valid range are clamped.

use crate::color::{clamp_channel, hex_to_rgb, Color, Hsl, Rgb};
use crate::error::ColorError;

/// Parses a color string into a [`Color`], discarding any alpha component.
pub fn parse_color(input: &str) -> Result<Color, ColorError> {
    parse_color_with_alpha(input).map(|(color, _)| color)
}

/// Parses a color string into a [`Color`] and its alpha in [0, 1].
///
/// Hex and three-argument forms report alpha 1.0.
pub fn parse_color_with_alpha(input: &str) -> Result<(Color, f64), ColorError> {
    let lowered = input.trim().to_ascii_lowercase();
    if lowered.is_empty() {
        return Err(ColorError::Parse("empty color string".into()));
    }

    if let Some((name, args)) = split_function(&lowered) {
        let args: Vec<&str> = args.split(',').map(str::trim).collect();
        return match (name, args.len()) {
            ("rgb", 3) => Ok((Color::Rgb(parse_rgb_args(&args)?), 1.0)),
            ("rgba", 4) => Ok((Color::Rgb(parse_rgb_args(&args)?), parse_alpha(args[3])?)),
            ("hsl", 3) => Ok((Color::Hsl(parse_hsl_args(&args)?), 1.0)),
            ("hsla", 4) => Ok((Color::Hsl(parse_hsl_args(&args)?), parse_alpha(args[3])?)),
            ("rgb" | "rgba" | "hsl" | "hsla", n) => Err(ColorError::Parse(format!(
                "{name}() takes {} arguments, got {n} in '{input}'",
                if name.ends_with('a') { 4 } else { 3 }
            ))),
            _ => Err(ColorError::Parse(format!(
                "unknown color function '{name}' in '{input}'"
            ))),
        };
    }

    hex_to_rgb(&lowered)
        .map(|rgb| (Color::Rgb(rgb), 1.0))
        .map_err(|_| ColorError::Parse(format!("unrecognized color '{input}'")))
}

/// Splits `name(args)` into its parts. Returns `None` when the string is not
/// function-shaped.
fn split_function(s: &str) -> Option<(&str, &str)> {
    let open = s.find('(')?;
    let inner = s[open + 1..].strip_suffix(')')?;
    let name = s[..open].trim_end();
    if name.is_empty() || !name.bytes().all(|b| b.is_ascii_alphabetic()) {
        return None;
    }
    Some((name, inner))
}

fn parse_number(token: &str) -> Result<f64, ColorError> {
    token
        .trim()
        .parse::<f64>()
        .map_err(|_| ColorError::Parse(format!("invalid number '{token}'")))
}

fn parse_rgb_args(args: &[&str]) -> Result<Rgb, ColorError> {
    let r = parse_number(args[0])?;
    let g = parse_number(args[1])?;
    let b = parse_number(args[2])?;
    if [r, g, b].iter().any(|v| !(0.0..=255.0).contains(v)) {
        tracing::debug!(r, g, b, "clamping out-of-range rgb() channels");
    }
    Ok(Rgb::new(clamp_channel(r), clamp_channel(g), clamp_channel(b)))
}

fn parse_hsl_args(args: &[&str]) -> Result<Hsl, ColorError> {
    let h = parse_number(args[0].strip_suffix("deg").unwrap_or(args[0]))?;
    let s = parse_number(args[1].strip_suffix('%').unwrap_or(args[1]))?;
    let l = parse_number(args[2].strip_suffix('%').unwrap_or(args[2]))?;
    if [s, l].iter().any(|v| !(0.0..=100.0).contains(v)) {
        tracing::debug!(s, l, "clamping out-of-range hsl() components");
    }
    Ok(Hsl::new(h, s, l))
}

/// Alpha as a unit fraction (`0.5`) or a percentage (`50%`), clamped to
/// [0, 1]. NaN becomes 0.
fn parse_alpha(token: &str) -> Result<f64, ColorError> {
    let value = match token.strip_suffix('%') {
        Some(pct) => parse_number(pct)? / 100.0,
        None => parse_number(token)?,
    };
    if value.is_nan() {
        return Ok(0.0);
    }
    Ok(value.clamp(0.0, 1.0))
}
