//! Source photo selection.
//!
//! An [`InputSource`] decides *which* file to print; [`load_source`] decodes it
//! and derives the base name used for the output file. Two strategies exist:
//!
//! - [`LatestInDirectory`]: the most recently modified `.webp`, `.jpg`,
//!   `.jpeg` or `.png` in a directory (the default, `input/`)
//! - [`NamedFile`]: an explicit path from `--input`

use crate::imaging::{is_supported_input, load_rgb};
use image::RgbImage;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::SystemTime;
use thiserror::Error;
use tracing::debug;

#[derive(Error, Debug)]
pub enum InputError {
    #[error("Input directory not found: {0}")]
    DirectoryNotFound(PathBuf),
    #[error("No .webp, .jpg, .jpeg or .png file found in {0}")]
    NoEligibleInput(PathBuf),
    #[error("Input file not found: {0}")]
    FileNotFound(PathBuf),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to decode {path}: {source}")]
    Decode {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },
}

/// Strategy for choosing the photo to print.
pub trait InputSource {
    /// Resolve the path of the photo to load.
    fn locate(&self) -> Result<PathBuf, InputError>;
}

/// Picks the newest supported photo in a directory.
#[derive(Debug, Clone)]
pub struct LatestInDirectory {
    pub dir: PathBuf,
}

impl LatestInDirectory {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }
}

impl InputSource for LatestInDirectory {
    fn locate(&self) -> Result<PathBuf, InputError> {
        if !self.dir.is_dir() {
            return Err(InputError::DirectoryNotFound(self.dir.clone()));
        }

        let mut newest: Option<(SystemTime, PathBuf)> = None;
        for entry in fs::read_dir(&self.dir)? {
            let entry = entry?;
            let path = entry.path();
            if !path.is_file() || !is_supported_input(&path) {
                continue;
            }
            let modified = entry.metadata()?.modified()?;
            debug!("Candidate {} ({modified:?})", path.display());
            // Equal mtimes fall back to the path so the choice is stable
            let candidate = (modified, path);
            if newest.as_ref().is_none_or(|best| candidate > *best) {
                newest = Some(candidate);
            }
        }

        newest
            .map(|(_, path)| path)
            .ok_or_else(|| InputError::NoEligibleInput(self.dir.clone()))
    }
}

/// An explicitly named photo.
#[derive(Debug, Clone)]
pub struct NamedFile {
    pub path: PathBuf,
}

impl NamedFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl InputSource for NamedFile {
    fn locate(&self) -> Result<PathBuf, InputError> {
        if self.path.is_file() {
            Ok(self.path.clone())
        } else {
            Err(InputError::FileNotFound(self.path.clone()))
        }
    }
}

/// A decoded source photo.
#[derive(Debug)]
pub struct SourceImage {
    pub path: PathBuf,
    /// File stem, used to name the print master.
    pub base_name: String,
    pub raster: RgbImage,
}

/// File stem of `path`, or `"image"` when it has none.
pub fn base_name(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| "image".to_string())
}

/// Locate and decode the photo chosen by `source`.
pub fn load_source(source: &dyn InputSource) -> Result<SourceImage, InputError> {
    let path = source.locate()?;
    let raster = load_rgb(&path).map_err(|source| InputError::Decode {
        path: path.clone(),
        source,
    })?;
    Ok(SourceImage {
        base_name: base_name(&path),
        path,
        raster,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::write_test_png;
    use std::fs::File;
    use std::time::Duration;
    use tempfile::TempDir;

    fn set_age(path: &Path, seconds_ago: u64) {
        let when = SystemTime::now() - Duration::from_secs(seconds_ago);
        File::options()
            .write(true)
            .open(path)
            .unwrap()
            .set_modified(when)
            .unwrap();
    }

    // =========================================================================
    // LatestInDirectory tests
    // =========================================================================

    #[test]
    fn latest_picks_most_recent_supported_file() {
        let tmp = TempDir::new().unwrap();
        let old = write_test_png(tmp.path(), "old.png", 4, 8);
        let new = write_test_png(tmp.path(), "new.png", 4, 8);
        set_age(&old, 600);
        set_age(&new, 60);

        let chosen = LatestInDirectory::new(tmp.path()).locate().unwrap();
        assert_eq!(chosen, new);
    }

    #[test]
    fn latest_ignores_unsupported_extensions() {
        let tmp = TempDir::new().unwrap();
        let photo = write_test_png(tmp.path(), "photo.png", 4, 8);
        set_age(&photo, 600);
        fs::write(tmp.path().join("notes.txt"), "newer").unwrap();
        fs::write(tmp.path().join("scan.tiff"), "newer").unwrap();

        let chosen = LatestInDirectory::new(tmp.path()).locate().unwrap();
        assert_eq!(chosen, photo);
    }

    #[test]
    fn latest_accepts_uppercase_extension() {
        let tmp = TempDir::new().unwrap();
        let photo = write_test_png(tmp.path(), "IMG_0001.PNG", 4, 8);

        let chosen = LatestInDirectory::new(tmp.path()).locate().unwrap();
        assert_eq!(chosen, photo);
    }

    #[test]
    fn latest_ignores_directories_with_photo_names() {
        let tmp = TempDir::new().unwrap();
        fs::create_dir(tmp.path().join("album.jpg")).unwrap();

        let result = LatestInDirectory::new(tmp.path()).locate();
        assert!(matches!(result, Err(InputError::NoEligibleInput(_))));
    }

    #[test]
    fn latest_missing_directory_names_it() {
        let tmp = TempDir::new().unwrap();
        let dir = tmp.path().join("input");
        let err = LatestInDirectory::new(&dir).locate().unwrap_err();
        assert!(matches!(err, InputError::DirectoryNotFound(_)));
        assert!(err.to_string().contains("input"));
    }

    #[test]
    fn latest_empty_directory_names_it() {
        let tmp = TempDir::new().unwrap();
        let dir = tmp.path().join("input");
        fs::create_dir(&dir).unwrap();
        let err = LatestInDirectory::new(&dir).locate().unwrap_err();
        assert!(matches!(err, InputError::NoEligibleInput(_)));
        assert!(err.to_string().contains("input"));
    }

    // =========================================================================
    // NamedFile tests
    // =========================================================================

    #[test]
    fn named_file_resolves_existing_path() {
        let tmp = TempDir::new().unwrap();
        let photo = write_test_png(tmp.path(), "photo.png", 4, 8);
        assert_eq!(NamedFile::new(&photo).locate().unwrap(), photo);
    }

    #[test]
    fn named_file_missing_is_error() {
        let result = NamedFile::new("/nonexistent/photo.jpg").locate();
        assert!(matches!(result, Err(InputError::FileNotFound(_))));
    }

    // =========================================================================
    // load_source tests
    // =========================================================================

    #[test]
    fn load_source_decodes_and_names() {
        let tmp = TempDir::new().unwrap();
        let photo = write_test_png(tmp.path(), "sunset.final.png", 12, 20);

        let source = load_source(&NamedFile::new(&photo)).unwrap();
        assert_eq!(source.path, photo);
        assert_eq!(source.base_name, "sunset.final");
        assert_eq!(source.raster.dimensions(), (12, 20));
    }

    #[test]
    fn load_source_corrupt_file_is_decode_error() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("broken.jpg");
        fs::write(&path, b"not a jpeg").unwrap();

        let result = load_source(&NamedFile::new(&path));
        assert!(matches!(result, Err(InputError::Decode { .. })));
    }

    #[test]
    fn base_name_is_file_stem() {
        assert_eq!(base_name(Path::new("input/photo.webp")), "photo");
        assert_eq!(base_name(Path::new("input/.jpg")), ".jpg");
    }
}
