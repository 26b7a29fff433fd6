//! Color-managed export: print TIFF, JPEG preview, lossless intermediates.
//!
//! ## Crate mapping
//!
//! | Artifact | Crate / function |
//! |---|---|
//! | sRGB ICC profile | `lcms2::Profile::new_srgb().icc()` |
//! | Print TIFF (LZW, DPI, ICC tag) | `tiff::encoder::TiffEncoder` |
//! | JPEG preview (optimized Huffman) | `jpeg_encoder::Encoder` |
//! | PNG intermediate | `image::codecs::png::PngEncoder` (fast, unfiltered) |
//!
//! The `image` crate's TIFF encoder cannot write resolution or ICC tags, so
//! the print master goes through the `tiff` crate directly.

use super::operations::resample;
use super::params::{Quality, Resolution};
use image::codecs::png::{CompressionType, FilterType as PngFilter, PngEncoder};
use image::{ExtendedColorType, ImageEncoder, RgbImage};
use std::borrow::Cow;
use std::fs::File;
use std::io::BufWriter;
use jpeg_encoder::{ColorType as JpegColor, Encoder as JpegEncoder};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tiff::encoder::{Compression, Rational, TiffEncoder, TiffValue, colortype};
use tiff::tags::{ResolutionUnit, Tag, Type as TiffType};
use tracing::debug;

/// TIFF tag 34675 (InterColorProfile).
pub const TAG_ICC_PROFILE: Tag = Tag::Unknown(34675);

#[derive(Error, Debug)]
pub enum ExportError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Image encoding failed: {0}")]
    Image(#[from] image::ImageError),
    #[error("JPEG encoding failed: {0}")]
    Jpeg(#[from] jpeg_encoder::EncodingError),
    #[error("Preview {width}x{height} exceeds the JPEG limit of 65535 pixels per side")]
    PreviewTooLarge { width: u32, height: u32 },
    #[error("TIFF encoding failed: {0}")]
    Tiff(#[from] tiff::TiffError),
    #[error("ICC profile generation failed: {0}")]
    Icc(#[from] lcms2::Error),
}

/// Generate the standard sRGB ICC profile.
///
/// Built fresh every run; profiles embedded in the input are never reused.
pub fn srgb_icc_profile() -> Result<Vec<u8>, ExportError> {
    Ok(lcms2::Profile::new_srgb().icc()?)
}

/// ICC bytes written with the TIFF `UNDEFINED` field type.
struct UndefinedBytes<'a>(&'a [u8]);

impl TiffValue for UndefinedBytes<'_> {
    const BYTE_LEN: u8 = 1;
    const FIELD_TYPE: TiffType = TiffType::UNDEFINED;

    fn count(&self) -> usize {
        self.0.len()
    }

    fn data(&self) -> Cow<'_, [u8]> {
        Cow::Borrowed(self.0)
    }
}

/// Write an RGB8 print master: LZW-compressed, `resolution` DPI on both
/// axes, with `icc` embedded.
pub fn write_print_tiff(
    raster: &RgbImage,
    path: &Path,
    resolution: Resolution,
    icc: &[u8],
) -> Result<(), ExportError> {
    let (width, height) = raster.dimensions();
    debug!(
        "Encoding TIFF {width}x{height} at {} DPI: {}",
        resolution.dpi,
        path.display()
    );

    let file = File::create(path)?;
    let mut encoder = TiffEncoder::new(BufWriter::new(file))?.with_compression(Compression::Lzw);
    let mut page = encoder.new_image::<colortype::RGB8>(width, height)?;

    page.resolution_unit(ResolutionUnit::Inch);
    page.x_resolution(Rational {
        n: resolution.dpi,
        d: 1,
    });
    page.y_resolution(Rational {
        n: resolution.dpi,
        d: 1,
    });
    page.encoder()
        .write_tag(TAG_ICC_PROFILE, UndefinedBytes(icc))?;

    page.write_data(raster.as_raw())?;
    Ok(())
}

/// Write a JPEG preview of `raster`, resampled to `size` with the print kernel.
///
/// Huffman tables are optimized for the image, so the file is smaller than a
/// baseline encode at the same quality with identical pixels.
pub fn write_preview_jpeg(
    raster: &RgbImage,
    path: &Path,
    size: (u32, u32),
    quality: Quality,
) -> Result<(), ExportError> {
    let too_large = || ExportError::PreviewTooLarge {
        width: size.0,
        height: size.1,
    };
    let width = u16::try_from(size.0).map_err(|_| too_large())?;
    let height = u16::try_from(size.1).map_err(|_| too_large())?;

    debug!(
        "Encoding preview {width}x{height} (quality {}): {}",
        quality.value(),
        path.display()
    );
    let preview = resample(raster, size.0, size.1);
    let mut encoder = JpegEncoder::new_file(path, quality.value())?;
    encoder.set_optimized_huffman_tables(true);
    encoder.encode(preview.as_raw(), width, height, JpegColor::Rgb)?;
    Ok(())
}

/// Write `raster` as a fast, unfiltered (lossless) PNG for scratch files.
pub fn write_lossless_png(raster: &RgbImage, path: &Path) -> Result<(), ExportError> {
    let (width, height) = raster.dimensions();
    let writer = BufWriter::new(File::create(path)?);
    PngEncoder::new_with_quality(writer, CompressionType::Fast, PngFilter::NoFilter).write_image(
        raster.as_raw(),
        width,
        height,
        ExtendedColorType::Rgb8,
    )?;
    Ok(())
}

/// Where and how to write the two export artifacts.
#[derive(Debug, Clone, PartialEq)]
pub struct ExportPlan {
    pub tiff_path: PathBuf,
    pub preview_path: PathBuf,
    pub resolution: Resolution,
    pub preview_size: (u32, u32),
    pub preview_quality: Quality,
}

/// Encode the finished raster as the print TIFF and then the preview.
///
/// Consumes the raster: nothing happens to it after export.
pub fn export(raster: RgbImage, plan: &ExportPlan) -> Result<(), ExportError> {
    let icc = srgb_icc_profile()?;
    write_print_tiff(&raster, &plan.tiff_path, plan.resolution, &icc)?;
    write_preview_jpeg(
        &raster,
        &plan.preview_path,
        plan.preview_size,
        plan.preview_quality,
    )?;
    Ok(())
}
