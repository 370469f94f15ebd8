#![deny(unsafe_code)]
//! Image I/O and previews for huelab.
//!
//! Sits between `huelab-core`, which only sees RGBA [`PixelBuffer`]s, and
//! the CLI. Decoding and encoding use the `image` crate behind the default
//! `codecs` feature; swatch rendering is always available.
//!
//! [`PixelBuffer`]: huelab_core::pixel::PixelBuffer

pub mod swatch;

#[cfg(feature = "codecs")]
pub mod decode;
#[cfg(feature = "codecs")]
pub mod snapshot;

pub use swatch::{gradient_strip, palette_strip, proportional_strip};

#[cfg(feature = "codecs")]
pub use decode::{decode_image, load_image};
#[cfg(feature = "codecs")]
pub use snapshot::{write_image, write_png};
