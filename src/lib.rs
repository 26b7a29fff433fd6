//! # print-prep
//!
//! Prepares a single photograph for large-format print. The reference policy
//! is a 600 x 1200 mm print at 360 DPI: 8504 x 17008 pixels.
//!
//! # Pipeline
//!
//! ```text
//! 1. Select    input/           →  newest .webp/.jpg/.jpeg/.png (or --input)
//! 2. Crop      source raster    →  exactly 1:2, centered
//! 3. Upscale   cropped raster   →  Real-ESRGAN 4x (optional, best effort)
//! 4. Finish    any raster       →  8504 x 17008, Lanczos3 + unsharp mask
//! 5. Export    finished raster  →  LZW TIFF (360 DPI, sRGB ICC) + JPEG preview
//! ```
//!
//! Every stage takes the raster by value and returns a new one, so there is
//! no shared state and nothing survives between runs.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`config`] | `print-prep.toml` loading, merging over stock defaults, validation |
//! | [`input`] | Choosing and decoding the source photo |
//! | [`imaging`] | Crop math, resampling, sharpening, TIFF/JPEG/PNG encoding |
//! | [`upscale`] | `Upscaler` trait and the Real-ESRGAN subprocess adapter |
//! | [`pipeline`] | Runs the stages in order and reports a [`pipeline::RunSummary`] |
//! | [`output`] | CLI formatting of the run summary |
//! | [`logger`] | `tracing` subscriber setup |
//!
//! # Design Decisions
//!
//! ## Crop Before Upscaling
//!
//! The 1:2 crop happens first so the upscaler never spends time on pixels
//! that are thrown away. A source too narrow for a 1:2 crop is left alone
//! with a warning and the final resize stretches it.
//!
//! ## Upscaling Never Fails a Run
//!
//! The AI step is an enhancement. A missing binary, a crash, or an unreadable
//! result is logged and the cropped photo is resized directly instead.
//!
//! ## Fresh sRGB Profile
//!
//! The TIFF always embeds an sRGB profile generated with `lcms2`, regardless
//! of what the source carried, so print shops see one consistent color space.

pub mod config;
pub mod imaging;
pub mod input;
pub mod logger;
pub mod output;
pub mod pipeline;
pub mod upscale;

#[cfg(test)]
pub(crate) mod test_helpers;
