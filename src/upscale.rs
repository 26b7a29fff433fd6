//! Optional AI upscaling through an external Real-ESRGAN executable.
//!
//! The [`Upscaler`] trait is the seam between the pipeline and the tool.
//! [`RealEsrgan`] is the production implementation: it hands the cropped
//! raster to `realesrgan-ncnn-vulkan` through PNG files in the work
//! directory and reads the result back.
//!
//! Upscaling is best effort. [`try_upscale`] turns every failure into a
//! warning and `None`, and the pipeline carries on with the cropped raster.

use crate::config::PrintConfig;
use crate::imaging::{ExportError, load_rgb, write_lossless_png};
use image::RgbImage;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::process::{Command, ExitStatus};
use thiserror::Error;
use tracing::{debug, info, warn};

/// Scratch file handed to the tool.
pub const INPUT_FILENAME: &str = "input_cropped.png";
/// Scratch file the tool writes.
pub const OUTPUT_FILENAME: &str = "upscaled.png";

#[derive(Error, Debug)]
pub enum UpscaleError {
    #[error("Upscaler not found or not executable: {0}")]
    NotExecutable(PathBuf),
    #[error("Failed to start {path}: {source}")]
    Spawn {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("Upscaler exited unsuccessfully ({0})")]
    Failed(ExitStatus),
    #[error("Upscaler produced no output at {0}")]
    MissingOutput(PathBuf),
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
    #[error("Failed to write upscaler input: {0}")]
    Encode(#[from] ExportError),
    #[error("Failed to decode upscaler output: {0}")]
    Decode(#[from] image::ImageError),
}

/// Something that can enlarge a raster.
pub trait Upscaler {
    /// Short name for log messages.
    fn name(&self) -> &str;

    /// Return an enlarged copy of `raster`.
    fn upscale(&self, raster: &RgbImage) -> Result<RgbImage, UpscaleError>;
}

/// Real-ESRGAN ncnn-vulkan, driven as a subprocess.
#[derive(Debug, Clone, PartialEq)]
pub struct RealEsrgan {
    pub bin: PathBuf,
    pub work_dir: PathBuf,
    pub model: String,
    pub scale: u32,
    pub tile: u32,
    pub threads: String,
}

impl RealEsrgan {
    /// Build from the resolved config. `None` when no executable is configured.
    pub fn from_config(config: &PrintConfig) -> Option<Self> {
        let upscaler = &config.upscaler;
        let bin = upscaler.bin.clone()?;
        Some(Self {
            bin,
            work_dir: config.paths.work_dir.clone(),
            model: upscaler.model.clone(),
            scale: upscaler.scale,
            tile: upscaler.tile,
            threads: upscaler.threads.clone(),
        })
    }

    pub fn input_path(&self) -> PathBuf {
        self.work_dir.join(INPUT_FILENAME)
    }

    pub fn output_path(&self) -> PathBuf {
        self.work_dir.join(OUTPUT_FILENAME)
    }

    /// Command-line arguments for one run, in the tool's expected order.
    pub fn command_args(&self, input: &Path, output: &Path) -> Vec<String> {
        vec![
            "-i".to_string(),
            input.display().to_string(),
            "-o".to_string(),
            output.display().to_string(),
            "-n".to_string(),
            self.model.clone(),
            "-s".to_string(),
            self.scale.to_string(),
            "-t".to_string(),
            self.tile.to_string(),
            "-j".to_string(),
            self.threads.clone(),
            "-f".to_string(),
            "png".to_string(),
        ]
    }
}

impl Upscaler for RealEsrgan {
    fn name(&self) -> &str {
        "Real-ESRGAN"
    }

    fn upscale(&self, raster: &RgbImage) -> Result<RgbImage, UpscaleError> {
        if !is_executable(&self.bin) {
            return Err(UpscaleError::NotExecutable(self.bin.clone()));
        }

        fs::create_dir_all(&self.work_dir)?;
        let input = self.input_path();
        let output = self.output_path();

        write_lossless_png(raster, &input)?;
        match fs::remove_file(&output) {
            Ok(()) => debug!("Removed stale {}", output.display()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {}
            Err(e) => return Err(e.into()),
        }

        let args = self.command_args(&input, &output);
        info!("Running {} {}", self.bin.display(), args.join(" "));
        // The tool's own progress goes to stderr alongside our logs, keeping
        // stdout for the summary.
        let status = Command::new(&self.bin)
            .args(&args)
            .stdout(io::stderr())
            .status()
            .map_err(|source| UpscaleError::Spawn {
                path: self.bin.clone(),
                source,
            })?;
        if !status.success() {
            return Err(UpscaleError::Failed(status));
        }

        if !output.is_file() {
            return Err(UpscaleError::MissingOutput(output));
        }
        Ok(load_rgb(&output)?)
    }
}

/// Whether `path` is a regular file the current user could execute.
pub fn is_executable(path: &Path) -> bool {
    let Ok(metadata) = fs::metadata(path) else {
        return false;
    };
    if !metadata.is_file() {
        return false;
    }
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        metadata.permissions().mode() & 0o111 != 0
    }
    #[cfg(not(unix))]
    {
        true
    }
}

/// Upscale if a tool is available, returning `None` on any failure.
///
/// `Some` means the returned raster came from the tool.
pub fn try_upscale(upscaler: Option<&dyn Upscaler>, raster: &RgbImage) -> Option<RgbImage> {
    let Some(upscaler) = upscaler else {
        info!("No upscaler configured, skipping AI upscale");
        return None;
    };

    let (width, height) = raster.dimensions();
    info!("Upscaling {width}x{height} with {}", upscaler.name());
    match upscaler.upscale(raster) {
        Ok(upscaled) => {
            info!(
                "{} produced {}x{}",
                upscaler.name(),
                upscaled.width(),
                upscaled.height()
            );
            Some(upscaled)
        }
        Err(UpscaleError::NotExecutable(path)) => {
            warn!(
                "Upscaler {} not found or not executable, skipping AI upscale",
                path.display()
            );
            None
        }
        Err(e) => {
            warn!("{} failed, continuing without AI upscale: {e}", upscaler.name());
            None
        }
    }
}
