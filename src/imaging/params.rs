//! Parameter types for image operations.
//!
//! These structs describe *what* to do, not *how* to do it. They are the
//! interface between the [`config`](crate::config) layer (which decides the
//! print policy) and the [`operations`](super::operations) /
//! [`export`](super::export) modules (which do the pixel and encoding work).
//!
//! ## Types
//!
//! - [`Quality`]: lossy encoding quality (1-100, default 92). Clamped on construction.
//! - [`Sharpening`]: unsharp-mask parameters (radius, percent, threshold).
//! - [`Resolution`]: print resolution in dots per inch, written to the TIFF tags.

use serde::{Deserialize, Serialize};

/// Quality setting for lossy image encoding (1-100).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Quality(pub u8);

impl Quality {
    pub fn new(value: u32) -> Self {
        Self(value.clamp(1, 100) as u8)
    }

    pub fn value(self) -> u8 {
        self.0
    }
}

impl Default for Quality {
    fn default() -> Self {
        Self(92)
    }
}

/// Unsharp-mask parameters.
///
/// - `radius`: Standard deviation of the Gaussian blur, in pixels
/// - `percent`: Strength of the sharpening (100 = add the full difference back once)
/// - `threshold`: Minimum per-channel difference (0-255) before a pixel is sharpened
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Sharpening {
    pub radius: f32,
    pub percent: u32,
    pub threshold: u8,
}

impl Sharpening {
    /// Conservative print sharpening applied after the final resize.
    pub fn print() -> Self {
        Self {
            radius: 2.0,
            percent: 140,
            threshold: 3,
        }
    }

    /// Sharpening amount as a multiplier of the blur difference.
    pub fn amount(self) -> f32 {
        self.percent as f32 / 100.0
    }
}

impl Default for Sharpening {
    fn default() -> Self {
        Self::print()
    }
}

/// Print resolution, identical on both axes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Resolution {
    pub dpi: u32,
}

impl Resolution {
    pub fn new(dpi: u32) -> Self {
        Self { dpi }
    }
}
