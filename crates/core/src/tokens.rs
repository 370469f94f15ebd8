//! Design tokens derived from a single primary color.
//!
//! [`DesignTokens`] is plain serde data; the CSS and Tailwind exports are
//! string formatting over the same fields.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::color::{hsl_to_rgb, Hsl, Rgb};
use crate::contrast::readable_foreground;

/// Lightness (HSL %) of each shade in the primary scale.
const SCALE_LIGHTNESS: [(u16, f64); 10] = [
    (50, 96.0),
    (100, 91.0),
    (200, 82.0),
    (300, 71.0),
    (400, 60.0),
    (500, 50.0),
    (600, 42.0),
    (700, 34.0),
    (800, 26.0),
    (900, 18.0),
];

const HOVER_DARKEN: f64 = 8.0;
const ACTIVE_DARKEN: f64 = 16.0;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PrimaryTokens {
    pub base: Rgb,
    pub hover: Rgb,
    pub active: Rgb,
    pub foreground: Rgb,
    /// Shades keyed 50..900, lightest first.
    pub scale: BTreeMap<u16, Rgb>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BackgroundTokens {
    pub base: Rgb,
    pub surface: Rgb,
    pub border: Rgb,
    pub foreground: Rgb,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SemanticTokens {
    pub success: Rgb,
    pub warning: Rgb,
    pub error: Rgb,
    pub info: Rgb,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DesignTokens {
    pub primary: PrimaryTokens,
    pub background: BackgroundTokens,
    pub semantic: SemanticTokens,
}

fn with_lightness(hsl: Hsl, l: f64) -> Rgb {
    hsl_to_rgb(Hsl::new(hsl.h, hsl.s, l))
}

fn tinted(hsl: Hsl, s: f64, l: f64) -> Rgb {
    hsl_to_rgb(Hsl::new(hsl.h, s.min(hsl.s), l))
}

impl DesignTokens {
    pub fn from_primary(primary: Rgb) -> Self {
        let hsl = primary.to_hsl();
        let scale = SCALE_LIGHTNESS
            .iter()
            .map(|&(shade, l)| (shade, with_lightness(hsl, l)))
            .collect();

        Self {
            primary: PrimaryTokens {
                base: primary,
                hover: with_lightness(hsl, hsl.l - HOVER_DARKEN),
                active: with_lightness(hsl, hsl.l - ACTIVE_DARKEN),
                foreground: readable_foreground(primary),
                scale,
            },
            background: BackgroundTokens {
                base: tinted(hsl, 20.0, 98.0),
                surface: tinted(hsl, 16.0, 95.0),
                border: tinted(hsl, 12.0, 85.0),
                foreground: tinted(hsl, 25.0, 12.0),
            },
            semantic: SemanticTokens {
                success: Rgb::new(0x16, 0xa3, 0x4a),
                warning: Rgb::new(0xd9, 0x77, 0x06),
                error: Rgb::new(0xdc, 0x26, 0x26),
                info: Rgb::new(0x25, 0x63, 0xeb),
            },
        }
    }

    /// `(name, color)` pairs in export order, names in kebab-case.
    fn flat(&self) -> Vec<(String, Rgb)> {
        let p = &self.primary;
        let mut out = vec![
            ("primary".to_string(), p.base),
            ("primary-hover".to_string(), p.hover),
            ("primary-active".to_string(), p.active),
            ("primary-foreground".to_string(), p.foreground),
        ];
        out.extend(
            p.scale
                .iter()
                .map(|(shade, &c)| (format!("primary-{shade}"), c)),
        );
        let b = &self.background;
        let s = &self.semantic;
        out.extend([
            ("background".to_string(), b.base),
            ("surface".to_string(), b.surface),
            ("border".to_string(), b.border),
            ("foreground".to_string(), b.foreground),
            ("success".to_string(), s.success),
            ("warning".to_string(), s.warning),
            ("error".to_string(), s.error),
            ("info".to_string(), s.info),
        ]);
        out
    }

    /// A `:root` block of `--color-*` custom properties.
    pub fn to_css_variables(&self) -> String {
        let mut lines = vec![":root {".to_string()];
        lines.extend(
            self.flat()
                .into_iter()
                .map(|(name, c)| format!("  --color-{name}: {c};")),
        );
        lines.push("}".to_string());
        lines.join("\n") + "\n"
    }

    /// A `tailwind.config.js` extending `theme.colors`.
    pub fn to_tailwind_config(&self) -> String {
        let p = &self.primary;
        let b = &self.background;
        let s = &self.semantic;
        let mut lines = vec![
            "/** @type {import('tailwindcss').Config} */".to_string(),
            "module.exports = {".to_string(),
            "  theme: {".to_string(),
            "    extend: {".to_string(),
            "      colors: {".to_string(),
            "        primary: {".to_string(),
            format!("          DEFAULT: '{}',", p.base),
            format!("          hover: '{}',", p.hover),
            format!("          active: '{}',", p.active),
            format!("          foreground: '{}',", p.foreground),
        ];
        lines.extend(
            p.scale
                .iter()
                .map(|(shade, c)| format!("          {shade}: '{c}',")),
        );
        lines.push("        },".to_string());
        for (name, c) in [
            ("background", b.base),
            ("surface", b.surface),
            ("border", b.border),
            ("foreground", b.foreground),
            ("success", s.success),
            ("warning", s.warning),
            ("error", s.error),
            ("info", s.info),
        ] {
            lines.push(format!("        {name}: '{c}',"));
        }
        lines.extend(
            ["      },", "    },", "  },", "};"]
                .into_iter()
                .map(String::from),
        );
        lines.join("\n") + "\n"
    }
}
