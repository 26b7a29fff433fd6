//! The print-prep pipeline: one photo in, one print master and preview out.
//!
//! ```text
//! input ──► normalize_aspect ──► try_upscale (optional) ──► finish ──► export
//!           1:2 center crop      Real-ESRGAN subprocess     Lanczos3 +  TIFF + JPEG
//!                                                           unsharp
//! ```
//!
//! Each stage consumes the previous raster. When the upscaler succeeds the
//! cropped raster is dropped before the final resize, so at most two
//! full-resolution rasters are alive at any point.

use crate::config::PrintConfig;
use crate::imaging::{self, ExportError, ExportPlan};
use crate::input::{InputError, InputSource, load_source};
use crate::upscale::{Upscaler, try_upscale};
use serde::Serialize;
use std::fs;
use std::path::PathBuf;
use thiserror::Error;
use tracing::info;

#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Input(#[from] InputError),
    #[error("Export failed: {0}")]
    Export(#[from] ExportError),
}

/// Pixel size of a raster.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Size {
    pub width: u32,
    pub height: u32,
}

impl From<(u32, u32)> for Size {
    fn from((width, height): (u32, u32)) -> Self {
        Self { width, height }
    }
}

/// What one run did, for the CLI summary or `--json`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunSummary {
    pub input_path: PathBuf,
    pub input_size: Size,
    pub cropped_size: Size,
    pub used_ai: bool,
    pub tiff_path: PathBuf,
    pub final_size: Size,
    pub dpi: u32,
    pub preview_path: PathBuf,
    pub preview_size: Size,
}

/// Run the whole pipeline for the photo chosen by `input`.
///
/// Work and output directories are created first. Upscaler problems are
/// logged and skipped; input and export problems end the run.
pub fn run(
    config: &PrintConfig,
    input: &dyn InputSource,
    upscaler: Option<&dyn Upscaler>,
) -> Result<RunSummary, PipelineError> {
    fs::create_dir_all(&config.paths.work_dir)?;
    fs::create_dir_all(&config.paths.output_dir)?;

    let source = load_source(input)?;
    let input_size = Size::from(source.raster.dimensions());
    info!(
        "Input: {} ({}x{})",
        source.path.display(),
        input_size.width,
        input_size.height
    );

    let cropped = imaging::normalize_aspect(source.raster);
    let cropped_size = Size::from(cropped.dimensions());
    info!("Cropped to {}x{}", cropped_size.width, cropped_size.height);

    let (working, used_ai) = match try_upscale(upscaler, &cropped) {
        Some(upscaled) => {
            drop(cropped);
            (upscaled, true)
        }
        None => (cropped, false),
    };

    let target = config.target_pixels();
    info!("Resizing to {}x{} and sharpening", target.0, target.1);
    let finished = imaging::finish(working, target, config.sharpening);

    let plan = ExportPlan {
        tiff_path: config.tiff_path(&source.base_name),
        preview_path: config.preview_path(),
        resolution: config.resolution(),
        preview_size: config.preview_pixels(),
        preview_quality: config.preview_quality(),
    };
    info!("Writing {}", plan.tiff_path.display());
    imaging::export(finished, &plan)?;

    Ok(RunSummary {
        input_path: source.path,
        input_size,
        cropped_size,
        used_ai,
        tiff_path: plan.tiff_path,
        final_size: Size::from(target),
        dpi: plan.resolution.dpi,
        preview_path: plan.preview_path,
        preview_size: Size::from(plan.preview_size),
    })
}
