//! Pure calculation functions for print geometry.
//!
//! All functions here are pure and testable without any I/O or images.

/// Millimetres per inch, used to turn a physical print size into pixels.
pub const MM_PER_INCH: f64 = 25.4;

/// A rectangular crop region inside a raster, in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CropWindow {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

/// Outcome of planning the 1:2 (width:height) aspect crop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AspectCrop {
    /// Already exactly 1:2.
    Unchanged,
    /// Crop to this window.
    Crop(CropWindow),
    /// Too narrow even for a height crop; reaching 1:2 would need upscaling.
    Infeasible,
}

/// Plan a center crop to exactly 1:2 (width:height).
///
/// The target width is `height / 2` (floor). Wider sources lose columns,
/// narrower sources lose rows (target height `width * 2`). Offsets use floor
/// division, so an odd excess leaves the extra pixel on the right/bottom.
///
/// # Examples
/// ```
/// # use print_prep::imaging::{AspectCrop, CropWindow, plan_aspect_crop};
/// // 5000x8000 is too wide: keep the middle 4000 columns
/// assert_eq!(
///     plan_aspect_crop(5000, 8000),
///     AspectCrop::Crop(CropWindow { x: 500, y: 0, width: 4000, height: 8000 })
/// );
/// assert_eq!(plan_aspect_crop(4000, 8000), AspectCrop::Unchanged);
/// ```
pub fn plan_aspect_crop(width: u32, height: u32) -> AspectCrop {
    let target_w = height / 2;

    if width == target_w {
        return AspectCrop::Unchanged;
    }

    // A one-pixel-tall source would need a zero-width crop
    if target_w == 0 {
        return AspectCrop::Infeasible;
    }

    if width > target_w {
        return AspectCrop::Crop(CropWindow {
            x: (width - target_w) / 2,
            y: 0,
            width: target_w,
            height,
        });
    }

    // Too narrow: crop height instead
    let target_h = u64::from(width) * 2;
    if target_h > u64::from(height) {
        return AspectCrop::Infeasible;
    }
    let target_h = target_h as u32;

    AspectCrop::Crop(CropWindow {
        x: 0,
        y: (height - target_h) / 2,
        width,
        height: target_h,
    })
}

/// Convert a physical length in millimetres to pixels at `dpi`, rounded.
///
/// ```
/// # use print_prep::imaging::mm_to_pixels;
/// assert_eq!(mm_to_pixels(600.0, 360), 8504);
/// assert_eq!(mm_to_pixels(1200.0, 360), 17008);
/// ```
pub fn mm_to_pixels(mm: f64, dpi: u32) -> u32 {
    (mm / MM_PER_INCH * f64::from(dpi)).round() as u32
}

/// Preview dimensions: the target divided by `divisor` on both axes, never below 1px.
pub fn preview_dimensions(target: (u32, u32), divisor: u32) -> (u32, u32) {
    let divisor = divisor.max(1);
    ((target.0 / divisor).max(1), (target.1 / divisor).max(1))
}
