//! Shared test utilities for the print-prep test suite.
//!
//! Provides synthetic image builders, on-disk fixture writers, TIFF and JPEG
//! readers so tests can check the outputs without a viewer, and a log
//! capture for asserting on warnings.
//!
//! # Usage
//!
//! ```ignore
//! use crate::test_helpers::*;
//!
//! let tmp = tempfile::TempDir::new().unwrap();
//! let path = write_test_png(tmp.path(), "photo.png", 50, 80);
//! let tags = read_tiff_print_tags(&some_tiff);
//! assert_eq!(tags.x_resolution, (360, 1));
//! ```

use image::{ImageDecoder, Rgb, RgbImage};
use std::fs::File;
use std::io::{BufReader, Write};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

// =========================================================================
// Synthetic rasters
// =========================================================================

/// A raster whose pixels encode their own coordinates, so crops are traceable.
pub fn gradient_image(width: u32, height: u32) -> RgbImage {
    RgbImage::from_fn(width, height, |x, y| {
        Rgb([(x % 256) as u8, (y % 256) as u8, ((x + y) % 256) as u8])
    })
}

/// Write a gradient PNG into `dir` and return its path.
pub fn write_test_png(dir: &Path, name: &str, width: u32, height: u32) -> PathBuf {
    let path = dir.join(name);
    gradient_image(width, height).save(&path).unwrap();
    path
}

// =========================================================================
// TIFF inspection
// =========================================================================

/// The print-relevant tags of a TIFF file.
#[derive(Debug)]
pub struct TiffPrintTags {
    pub dimensions: (u32, u32),
    pub x_resolution: (u32, u32),
    pub y_resolution: (u32, u32),
    pub icc: Option<Vec<u8>>,
}

/// Read dimensions, X/Y resolution rationals, and the embedded ICC profile.
pub fn read_tiff_print_tags(path: &Path) -> TiffPrintTags {
    use tiff::decoder::Decoder;
    use tiff::decoder::ifd::Value;
    use tiff::tags::Tag;

    let mut decoder = Decoder::new(BufReader::new(File::open(path).unwrap())).unwrap();
    let dimensions = decoder.dimensions().unwrap();

    let mut rational = |tag: Tag| match decoder.get_tag(tag).unwrap() {
        Value::Rational(n, d) => (n, d),
        other => panic!("{tag:?} is not a rational: {other:?}"),
    };
    let x_resolution = rational(Tag::XResolution);
    let y_resolution = rational(Tag::YResolution);

    let mut tiff = image::codecs::tiff::TiffDecoder::new(BufReader::new(File::open(path).unwrap()))
        .unwrap();
    let icc = tiff.icc_profile().unwrap();

    TiffPrintTags {
        dimensions,
        x_resolution,
        y_resolution,
        icc,
    }
}

// =========================================================================
// JPEG inspection
// =========================================================================

/// Luminance table from ITU-T T.81 Annex K, natural order.
pub const ANNEX_K_LUMA: [u16; 64] = [
    16, 11, 10, 16, 24, 40, 51, 61, 12, 12, 14, 19, 26, 58, 60, 55, 14, 13, 16, 24, 40, 57, 69,
    56, 14, 17, 22, 29, 51, 87, 80, 62, 18, 22, 37, 56, 68, 109, 103, 77, 24, 35, 55, 64, 81, 104,
    113, 92, 49, 64, 78, 87, 103, 121, 120, 101, 72, 92, 95, 98, 112, 100, 103, 99,
];

/// Annex K luminance table scaled to `quality` the IJG way, sorted ascending.
pub fn expected_luma_table(quality: u32) -> Vec<u16> {
    let scale = if quality < 50 {
        5000 / quality
    } else {
        200 - quality * 2
    };
    let mut table: Vec<u16> = ANNEX_K_LUMA
        .iter()
        .map(|&v| ((u32::from(v) * scale + 50) / 100).clamp(1, 255) as u16)
        .collect();
    table.sort_unstable();
    table
}

/// The quantization table with id 0 (luminance) from a JPEG file, sorted
/// ascending so zigzag order does not matter.
pub fn read_jpeg_luma_table(path: &Path) -> Vec<u16> {
    let bytes = std::fs::read(path).unwrap();
    assert_eq!(&bytes[..2], &[0xFF, 0xD8], "missing SOI");

    let mut pos = 2;
    while pos + 4 <= bytes.len() {
        assert_eq!(bytes[pos], 0xFF, "lost marker sync at {pos}");
        let marker = bytes[pos + 1];
        let len = usize::from(u16::from_be_bytes([bytes[pos + 2], bytes[pos + 3]]));
        let segment = &bytes[pos + 4..pos + 2 + len];

        if marker == 0xDB {
            let mut i = 0;
            while i < segment.len() {
                let precision = segment[i] >> 4;
                let id = segment[i] & 0x0F;
                let width = if precision == 0 { 1 } else { 2 };
                let values = &segment[i + 1..i + 1 + 64 * width];
                if id == 0 {
                    let mut table: Vec<u16> = if width == 1 {
                        values.iter().map(|&v| u16::from(v)).collect()
                    } else {
                        values
                            .chunks(2)
                            .map(|c| u16::from_be_bytes([c[0], c[1]]))
                            .collect()
                    };
                    table.sort_unstable();
                    return table;
                }
                i += 1 + 64 * width;
            }
        }
        // Start of scan: no tables after this point
        assert_ne!(marker, 0xDA, "no luminance table before SOS");
        pos += 2 + len;
    }
    panic!("no luminance quantization table in {}", path.display());
}

// =========================================================================
// Log capture
// =========================================================================

/// In-memory sink for a test-local `tracing` subscriber.
#[derive(Clone, Default)]
pub struct LogBuffer(Arc<Mutex<Vec<u8>>>);

impl Write for LogBuffer {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

/// Run `f` with a thread-local subscriber and return its result plus every
/// log line it emitted (debug and up, no ANSI colors).
pub fn capture_logs<R>(f: impl FnOnce() -> R) -> (R, String) {
    let buffer = LogBuffer::default();
    let writer = buffer.clone();
    let subscriber = tracing_subscriber::fmt()
        .with_writer(move || writer.clone())
        .with_ansi(false)
        .with_max_level(tracing::Level::DEBUG)
        .finish();

    let result = tracing::subscriber::with_default(subscriber, f);
    let logs = String::from_utf8(buffer.0.lock().unwrap().clone()).unwrap();
    (result, logs)
}
