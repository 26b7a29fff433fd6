//! High-level raster operations.
//!
//! These functions combine the pure [`calculations`](super::calculations)
//! with pixel work from the `image` crate. Every operation takes its raster
//! by value and hands back the result, so a stage either returns the same
//! buffer untouched or replaces it; nothing is shared between stages.

use super::calculations::{AspectCrop, plan_aspect_crop};
use super::params::Sharpening;
use image::RgbImage;
use image::imageops::{self, FilterType};
use tracing::{debug, warn};

/// Resampling kernel used for the final resize and the preview.
pub const RESAMPLE_FILTER: FilterType = FilterType::Lanczos3;

/// Crop a raster to exactly 1:2 (width:height) around its center.
///
/// An already-1:2 raster is returned as-is without copying. A raster too
/// narrow to reach 1:2 by cropping is also returned as-is, with a warning:
/// the finish stage will stretch it slightly.
pub fn normalize_aspect(raster: RgbImage) -> RgbImage {
    let (width, height) = raster.dimensions();

    match plan_aspect_crop(width, height) {
        AspectCrop::Unchanged => {
            debug!("{width}x{height} is already 1:2");
            raster
        }
        AspectCrop::Crop(window) => {
            debug!(
                "Cropping {width}x{height} to {}x{} at ({}, {})",
                window.width, window.height, window.x, window.y
            );
            imageops::crop_imm(&raster, window.x, window.y, window.width, window.height)
                .to_image()
        }
        AspectCrop::Infeasible => {
            warn!(
                "{width}x{height} is too narrow to crop to 1:2; keeping it unchanged \
                 (the final resize will distort the aspect ratio)"
            );
            raster
        }
    }
}

/// Resample to exactly `width` x `height` with Lanczos3, ignoring the source aspect.
pub fn resample(raster: &RgbImage, width: u32, height: u32) -> RgbImage {
    imageops::resize(raster, width, height, RESAMPLE_FILTER)
}

/// Sharpen in place with an unsharp mask.
///
/// The blurred copy is subtracted from the original per channel. Differences
/// below `threshold` leave the pixel alone so flat regions (and their noise)
/// are not amplified; larger ones are scaled by `percent / 100`, added back
/// and clipped to 0-255.
pub fn unsharp_mask(raster: &mut RgbImage, sharpening: Sharpening) {
    let blurred = imageops::blur(raster, sharpening.radius);
    let amount = sharpening.amount();
    let threshold = i32::from(sharpening.threshold);

    for (pixel, soft) in raster.pixels_mut().zip(blurred.pixels()) {
        for (value, blur) in pixel.0.iter_mut().zip(soft.0) {
            let diff = i32::from(*value) - i32::from(blur);
            if diff.abs() >= threshold {
                let sharpened = f32::from(*value) + diff as f32 * amount;
                *value = sharpened.round().clamp(0.0, 255.0) as u8;
            }
        }
    }
}

/// Resize to the exact print target, then apply print sharpening.
///
/// Works for both directions: a cropped-only raster is usually upscaled, an
/// AI-upscaled one is usually downscaled. The source raster is dropped once
/// the resampled copy exists.
pub fn finish(raster: RgbImage, target: (u32, u32), sharpening: Sharpening) -> RgbImage {
    let (src_w, src_h) = raster.dimensions();
    debug!(
        "Resampling {src_w}x{src_h} to {}x{} (Lanczos3)",
        target.0, target.1
    );
    let mut resized = resample(&raster, target.0, target.1);
    drop(raster);

    debug!(
        "Sharpening: radius {}, {}%, threshold {}",
        sharpening.radius, sharpening.percent, sharpening.threshold
    );
    unsharp_mask(&mut resized, sharpening);
    resized
}
