//! Image processing, pure Rust except for the ICC profile.
//!
//! | Operation | Crate / function |
//! |---|---|
//! | **Decode** | `image::ImageReader` (JPEG, PNG, WebP) |
//! | **Aspect crop** | `image::imageops::crop_imm` |
//! | **Resize** | `image::imageops::resize` (Lanczos3) |
//! | **Sharpen** | `image::imageops::blur` + thresholded unsharp mask |
//! | **Print TIFF** | `tiff` encoder (LZW, DPI tags, ICC tag) |
//! | **sRGB profile** | `lcms2` |
//! | **Preview** | `image::codecs::jpeg` |
//!
//! The module is split into:
//! - **Calculations**: Pure functions for crop and size math (unit testable)
//! - **Parameters**: Data structures describing image operations
//! - **Decode**: Loading source photos as RGB8
//! - **Operations**: Raster transforms (crop, resample, sharpen)
//! - **Export**: Encoders for the print master, preview, and scratch PNGs

mod calculations;
mod decode;
pub mod export;
pub mod operations;
mod params;

pub use calculations::{
    AspectCrop, CropWindow, MM_PER_INCH, mm_to_pixels, plan_aspect_crop, preview_dimensions,
};
pub use decode::{is_supported_input, load_rgb, supported_input_extensions};
pub use export::{
    ExportError, ExportPlan, export, srgb_icc_profile, write_lossless_png, write_preview_jpeg,
    write_print_tiff,
};
pub use operations::{finish, normalize_aspect, resample, unsharp_mask};
pub use params::{Quality, Resolution, Sharpening};
