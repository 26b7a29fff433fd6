//! Decoding source photos into RGB rasters.
//!
//! | Format | Decoder |
//! |---|---|
//! | JPEG, PNG, WebP | `image` crate (pure Rust decoders) |
//!
//! Print sources are routinely larger than the `image` crate's default
//! allocation limit (an AI-upscaled 4x output easily passes 1 GB), so
//! decoding runs without limits.

use image::{ImageError, ImageFormat, ImageReader, RgbImage};
use std::path::Path;

/// Extensions accepted as print sources, with the format each maps to.
const PHOTO_CANDIDATES: &[(&str, ImageFormat)] = &[
    ("webp", ImageFormat::WebP),
    ("jpg", ImageFormat::Jpeg),
    ("jpeg", ImageFormat::Jpeg),
    ("png", ImageFormat::Png),
];

/// Returns the accepted source extensions (lowercase, without the dot).
pub fn supported_input_extensions() -> impl Iterator<Item = &'static str> {
    PHOTO_CANDIDATES.iter().map(|(ext, _)| *ext)
}

/// Whether `path` has one of the accepted source extensions (case-insensitive).
pub fn is_supported_input(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| supported_input_extensions().any(|s| e.eq_ignore_ascii_case(s)))
}

/// Load and decode an image from disk as 8-bit RGB.
///
/// Alpha is dropped and any embedded color profile is ignored: the print
/// master always gets a freshly generated sRGB profile.
pub fn load_rgb(path: &Path) -> Result<RgbImage, ImageError> {
    let mut reader = ImageReader::open(path)?.with_guessed_format()?;
    reader.no_limits();
    Ok(reader.decode()?.into_rgb8())
}
