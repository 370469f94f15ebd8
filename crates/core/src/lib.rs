#![deny(unsafe_code)]
//! Core color science for the huelab toolkit.
//!
//! Conversion between hex/RGB/HSL/XYZ/LAB/LCh, CIEDE2000 distance and color
//! naming, WCAG contrast and contrast heatmaps, k-means dominant-color
//! extraction with brand roles, gradient mapping with blend modes, and
//! palette/token derivation. Everything here is synchronous and pure; image
//! decoding lives in `huelab-imaging`.

pub mod blend;
pub mod brand;
pub mod cache;
pub mod cancel;
pub mod cluster;
pub mod color;
pub mod contrast;
pub mod distance;
pub mod error;
pub mod gradient;
pub mod gradient_map;
pub mod harmony;
pub mod naming;
pub mod params;
pub mod parse;
pub mod pixel;
pub mod prng;
pub mod rules;
pub mod tokens;

pub use blend::BlendMode;
pub use brand::{assign_brand_roles, assign_extraction_roles, bucketize_brand_palette};
pub use cache::{ExtractionCache, ExtractionKey};
pub use cancel::CancelFlag;
pub use cluster::{
    extract_dominant_colors, BrandRole, ClusterAssignment, ConvergenceWarning, Extraction,
    KMeansConfig,
};
pub use color::{Color, Hsl, Lab, Lch, LinearRgb, Rgb, Xyz};
pub use contrast::{
    contrast_heatmap, contrast_heatmap_rows, contrast_ratio, CellReading, ContrastResult, HeatCell,
    HeatLevel, Heatmap, HeatmapJob,
};
pub use distance::{delta_e_2000, delta_e_76};
pub use error::ColorError;
pub use gradient::{Gradient, GradientPreset, GradientStop};
pub use gradient_map::{
    apply_gradient_map, apply_gradient_map_rows, GradientMapJob, GradientMapOptions,
};
pub use harmony::{harmony, HarmonyMode};
pub use naming::{algorithmic_color_naming, find_closest_color_names, ColorDictionary};
pub use parse::{parse_color, parse_color_with_alpha};
pub use pixel::PixelBuffer;
pub use prng::{RandomSource, Xorshift64};
pub use tokens::DesignTokens;
