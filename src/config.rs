//! Print configuration module.
//!
//! Handles loading, validating, and merging `print-prep.toml`. Stock defaults
//! reproduce the reference print policy; a user config file overrides any
//! subset of them. The resolved [`PrintConfig`] is immutable once built and is
//! passed explicitly into [`pipeline::run`](crate::pipeline::run).
//!
//! ## Configuration Options
//!
//! ```toml
//! # All options are optional - defaults shown below
//!
//! [print]
//! width_mm = 600.0          # Physical print width
//! height_mm = 1200.0        # Physical print height (must be 2x width)
//! dpi = 360                 # Written to the TIFF resolution tags
//!
//! [sharpening]
//! radius = 2.0              # Gaussian sigma in pixels
//! percent = 140             # Unsharp-mask strength
//! threshold = 3             # Minimum channel difference to sharpen
//!
//! [upscaler]
//! # bin = "/opt/realesrgan/realesrgan-ncnn-vulkan"   # or REALESRGAN_BIN
//! model = "realesrgan-x4plus"
//! scale = 4
//! tile = 256
//! threads = "1:2:2"         # load:proc:save
//!
//! [preview]
//! divisor = 4               # Preview = print pixels / divisor
//! quality = 92              # JPEG quality (1-100)
//! filename = "preview.jpg"
//!
//! [paths]
//! input_dir = "input"
//! work_dir = "work"
//! output_dir = "output"
//! ```
//!
//! Unknown keys are rejected to catch typos early.

use crate::imaging::{Quality, Resolution, Sharpening, mm_to_pixels, preview_dimensions};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Config file looked up in the working directory when `--config` is not given.
pub const DEFAULT_CONFIG_FILE: &str = "print-prep.toml";

/// Environment variable holding the Real-ESRGAN executable path.
pub const UPSCALER_ENV: &str = "REALESRGAN_BIN";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("TOML serialize error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),
    #[error("Config file not found: {0}")]
    NotFound(PathBuf),
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// Print configuration loaded from `print-prep.toml`.
///
/// All fields have defaults matching the reference policy
/// (600 x 1200 mm at 360 DPI). Unknown keys are rejected.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PrintConfig {
    /// Physical print size and resolution.
    pub print: PrintSize,
    /// Unsharp mask applied after the final resize.
    pub sharpening: Sharpening,
    /// External AI upscaler settings.
    pub upscaler: UpscalerConfig,
    /// JPEG preview settings.
    pub preview: PreviewConfig,
    /// Input, scratch, and output directories.
    pub paths: PathsConfig,
}

/// Physical print size. The width:height ratio must be exactly 1:2.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PrintSize {
    pub width_mm: f64,
    pub height_mm: f64,
    pub dpi: u32,
}

impl Default for PrintSize {
    fn default() -> Self {
        Self {
            width_mm: 600.0,
            height_mm: 1200.0,
            dpi: 360,
        }
    }
}

/// Real-ESRGAN (ncnn-vulkan) invocation settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct UpscalerConfig {
    /// Path to the executable. `None` disables AI upscaling.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bin: Option<PathBuf>,
    /// Model name passed with `-n`.
    pub model: String,
    /// Integer upscale factor passed with `-s`.
    pub scale: u32,
    /// Tile size passed with `-t`.
    pub tile: u32,
    /// Thread partition `load:proc:save` passed with `-j`.
    pub threads: String,
}

impl Default for UpscalerConfig {
    fn default() -> Self {
        Self {
            bin: None,
            model: "realesrgan-x4plus".to_string(),
            scale: 4,
            tile: 256,
            threads: "1:2:2".to_string(),
        }
    }
}

impl UpscalerConfig {
    /// Let an environment value (e.g. `$REALESRGAN_BIN`) override `bin`.
    ///
    /// Blank values are treated as unset and leave the config file's choice alone.
    pub fn apply_env(&mut self, value: Option<String>) {
        if let Some(path) = value.map(|v| v.trim().to_string()).filter(|v| !v.is_empty()) {
            self.bin = Some(PathBuf::from(path));
        }
    }
}

/// JPEG preview settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PreviewConfig {
    /// Preview pixels = print pixels / divisor, on both axes.
    pub divisor: u32,
    /// JPEG quality (1 = worst, 100 = best).
    pub quality: u32,
    /// File name inside the output directory.
    pub filename: String,
}

impl Default for PreviewConfig {
    fn default() -> Self {
        Self {
            divisor: 4,
            quality: 92,
            filename: "preview.jpg".to_string(),
        }
    }
}

/// Working directories, created on demand.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PathsConfig {
    pub input_dir: PathBuf,
    pub work_dir: PathBuf,
    pub output_dir: PathBuf,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            input_dir: PathBuf::from("input"),
            work_dir: PathBuf::from("work"),
            output_dir: PathBuf::from("output"),
        }
    }
}

impl PrintConfig {
    /// Validate config values are within acceptable ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let print = &self.print;
        if !(print.width_mm > 0.0 && print.height_mm > 0.0) {
            return Err(ConfigError::Validation(
                "print.width_mm and print.height_mm must be positive".into(),
            ));
        }
        if (print.width_mm * 2.0 - print.height_mm).abs() > 1e-9 {
            return Err(ConfigError::Validation(format!(
                "print size must be 1:2 (width:height), got {}x{} mm",
                print.width_mm, print.height_mm
            )));
        }
        if print.dpi == 0 {
            return Err(ConfigError::Validation("print.dpi must be non-zero".into()));
        }
        let (w, h) = self.target_pixels();
        if w == 0 || h == 0 {
            return Err(ConfigError::Validation(format!(
                "print size {}x{} mm at {} DPI is smaller than one pixel",
                print.width_mm, print.height_mm, print.dpi
            )));
        }
        if !(self.sharpening.radius > 0.0) {
            return Err(ConfigError::Validation(
                "sharpening.radius must be positive".into(),
            ));
        }
        if self.preview.quality == 0 || self.preview.quality > 100 {
            return Err(ConfigError::Validation(
                "preview.quality must be 1-100".into(),
            ));
        }
        if self.preview.divisor == 0 {
            return Err(ConfigError::Validation(
                "preview.divisor must be at least 1".into(),
            ));
        }
        if self.preview.filename.trim().is_empty() {
            return Err(ConfigError::Validation(
                "preview.filename must not be empty".into(),
            ));
        }
        if self.upscaler.model.trim().is_empty() || self.upscaler.threads.trim().is_empty() {
            return Err(ConfigError::Validation(
                "upscaler.model and upscaler.threads must not be empty".into(),
            ));
        }
        if self.upscaler.scale == 0 || self.upscaler.tile == 0 {
            return Err(ConfigError::Validation(
                "upscaler.scale and upscaler.tile must be non-zero".into(),
            ));
        }
        Ok(())
    }

    /// Exact print target in pixels: `round(mm / 25.4 * dpi)` per axis.
    pub fn target_pixels(&self) -> (u32, u32) {
        (
            mm_to_pixels(self.print.width_mm, self.print.dpi),
            mm_to_pixels(self.print.height_mm, self.print.dpi),
        )
    }

    /// Preview size in pixels.
    pub fn preview_pixels(&self) -> (u32, u32) {
        preview_dimensions(self.target_pixels(), self.preview.divisor)
    }

    pub fn resolution(&self) -> Resolution {
        Resolution::new(self.print.dpi)
    }

    pub fn preview_quality(&self) -> Quality {
        Quality::new(self.preview.quality)
    }

    /// Print master file name: `{stem}_{W}x{H}mm_{DPI}dpi.tiff`.
    pub fn tiff_filename(&self, stem: &str) -> String {
        format!(
            "{stem}_{}x{}mm_{}dpi.tiff",
            self.print.width_mm, self.print.height_mm, self.print.dpi
        )
    }

    pub fn tiff_path(&self, stem: &str) -> PathBuf {
        self.paths.output_dir.join(self.tiff_filename(stem))
    }

    pub fn preview_path(&self) -> PathBuf {
        self.paths.output_dir.join(&self.preview.filename)
    }
}

// =============================================================================
// Config loading, merging, and validation
// =============================================================================

/// Returns the stock default config as a `toml::Value::Table`.
///
/// This is the canonical representation of all default values, used as the
/// base layer for merging user overrides on top.
pub fn stock_defaults_value() -> Result<toml::Value, ConfigError> {
    Ok(toml::Value::try_from(PrintConfig::default())?)
}

/// Lay a user `print-prep.toml` over the stock defaults.
///
/// Sections such as `[print]` or `[upscaler]` merge key by key, so a file that
/// only sets `dpi` keeps the stock millimetres. Any other value in `overlay`
/// replaces the one in `base` outright.
pub fn merge_toml(base: toml::Value, overlay: toml::Value) -> toml::Value {
    match (base, overlay) {
        (toml::Value::Table(mut defaults), toml::Value::Table(user)) => {
            for (key, value) in user {
                let merged = match defaults.remove(&key) {
                    Some(stock) => merge_toml(stock, value),
                    None => value,
                };
                defaults.insert(key, merged);
            }
            toml::Value::Table(defaults)
        }
        (_, replacement) => replacement,
    }
}

/// Load a config file as a raw TOML value.
///
/// Returns `Ok(None)` if the file does not exist.
/// Returns `Err` if the file exists but contains invalid TOML.
pub fn load_raw_config(path: &Path) -> Result<Option<toml::Value>, ConfigError> {
    if !path.exists() {
        return Ok(None);
    }
    let content = fs::read_to_string(path)?;
    let value: toml::Value = toml::from_str(&content)?;
    Ok(Some(value))
}

/// Merge an optional overlay onto a base value, then deserialize and validate.
pub fn resolve_config(
    base: toml::Value,
    overlay: Option<toml::Value>,
) -> Result<PrintConfig, ConfigError> {
    let merged = match overlay {
        Some(ov) => merge_toml(base, ov),
        None => base,
    };
    let config: PrintConfig = merged.try_into()?;
    config.validate()?;
    Ok(config)
}

/// Load config from `path`, falling back to stock defaults when it is absent.
///
/// Merges user values on top of stock defaults, rejects unknown keys,
/// and validates the result.
pub fn load_config(path: &Path) -> Result<PrintConfig, ConfigError> {
    let base = stock_defaults_value()?;
    let overlay = load_raw_config(path)?;
    resolve_config(base, overlay)
}

/// Like [`load_config`], but a missing file is an error.
///
/// Used for an explicitly requested `--config` path.
pub fn load_config_file(path: &Path) -> Result<PrintConfig, ConfigError> {
    if !path.exists() {
        return Err(ConfigError::NotFound(path.to_path_buf()));
    }
    load_config(path)
}

/// Returns a fully-commented stock `print-prep.toml` with all keys and explanations.
///
/// Used by the `gen-config` CLI command.
pub fn stock_config_toml() -> &'static str {
    r##"# print-prep configuration
# ========================
# All settings are optional. Remove or comment out any you don't need.
# Values shown below are the defaults (600 x 1200 mm at 360 DPI).
# Unknown keys will cause an error.

# ---------------------------------------------------------------------------
# Print target
# ---------------------------------------------------------------------------
[print]
# Physical size in millimetres. Sources are center-cropped to 1:2, so the
# height must be exactly twice the width.
width_mm = 600.0
height_mm = 1200.0

# Resolution written to the TIFF. Pixels per axis = mm / 25.4 * dpi.
dpi = 360

# ---------------------------------------------------------------------------
# Sharpening (unsharp mask after the final resize)
# ---------------------------------------------------------------------------
[sharpening]
# Gaussian blur sigma in pixels.
radius = 2.0
# Strength: 100 adds the blur difference back once.
percent = 140
# Channel differences below this are left alone (keeps flat areas quiet).
threshold = 3

# ---------------------------------------------------------------------------
# AI upscaler (Real-ESRGAN ncnn-vulkan)
# ---------------------------------------------------------------------------
[upscaler]
# Executable path. REALESRGAN_BIN overrides this. When unset or missing,
# the cropped image is resized directly.
# bin = "/opt/realesrgan/realesrgan-ncnn-vulkan"
model = "realesrgan-x4plus"
scale = 4
tile = 256
# Thread partition as load:proc:save.
threads = "1:2:2"

# ---------------------------------------------------------------------------
# JPEG preview
# ---------------------------------------------------------------------------
[preview]
# Preview pixels = print pixels / divisor.
divisor = 4
# JPEG quality (1 = worst, 100 = best).
quality = 92
filename = "preview.jpg"

# ---------------------------------------------------------------------------
# Directories (created when missing)
# ---------------------------------------------------------------------------
[paths]
# The most recently modified .jpg/.jpeg/.png/.webp here is used.
input_dir = "input"
# Scratch files for the upscaler.
work_dir = "work"
# Print TIFF and preview.
output_dir = "output"
"##
}
