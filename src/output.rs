//! CLI output formatting for a finished run.
//!
//! # Output Format
//!
//! ```text
//! DONE
//!     Input file:    input/dusk.jpg
//!     Input size:    5000 x 8000
//!     Cropped size:  4000 x 8000 (1:2)
//!     AI used:       no
//!     Final TIFF:    output/dusk_600x1200mm_360dpi.tiff
//!     Final pixels:  8504 x 17008 @ 360 DPI
//!     Preview:       output/preview.jpg (2126 x 4252)
//! ```
//!
//! # Architecture
//!
//! Each view has a `format_*` function (returns `Vec<String>`) for testability
//! and a `print_*` wrapper that writes to stdout. Format functions are pure:
//! no I/O, no side effects.

use crate::pipeline::{RunSummary, Size};

// ============================================================================
// Shared helpers
// ============================================================================

/// Format a pixel size as `W x H`.
pub fn format_size(size: Size) -> String {
    format!("{} x {}", size.width, size.height)
}

/// Indented `Label: value` line with aligned values.
fn field(label: &str, value: impl std::fmt::Display) -> String {
    format!("    {:<15}{}", format!("{label}:"), value)
}

/// Whether the width is exactly half the height (floor), i.e. a clean 1:2 crop.
fn is_half_width(size: Size) -> bool {
    size.width == size.height / 2
}

// ============================================================================
// Run summary
// ============================================================================

/// Format the summary printed after a successful run.
pub fn format_summary(summary: &RunSummary) -> Vec<String> {
    let cropped = if is_half_width(summary.cropped_size) {
        format!("{} (1:2)", format_size(summary.cropped_size))
    } else {
        format!("{} (not 1:2, source too narrow)", format_size(summary.cropped_size))
    };

    vec![
        "DONE".to_string(),
        field("Input file", summary.input_path.display()),
        field("Input size", format_size(summary.input_size)),
        field("Cropped size", cropped),
        field("AI used", if summary.used_ai { "yes" } else { "no" }),
        field("Final TIFF", summary.tiff_path.display()),
        field(
            "Final pixels",
            format!("{} @ {} DPI", format_size(summary.final_size), summary.dpi),
        ),
        field(
            "Preview",
            format!(
                "{} ({})",
                summary.preview_path.display(),
                format_size(summary.preview_size)
            ),
        ),
    ]
}

pub fn print_summary(summary: &RunSummary) {
    for line in format_summary(summary) {
        println!("{line}");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn reference_summary() -> RunSummary {
        RunSummary {
            input_path: PathBuf::from("input/dusk.jpg"),
            input_size: Size::from((5000, 8000)),
            cropped_size: Size::from((4000, 8000)),
            used_ai: false,
            tiff_path: PathBuf::from("output/dusk_600x1200mm_360dpi.tiff"),
            final_size: Size::from((8504, 17008)),
            dpi: 360,
            preview_path: PathBuf::from("output/preview.jpg"),
            preview_size: Size::from((2126, 4252)),
        }
    }

    #[test]
    fn format_size_uses_spaced_x() {
        assert_eq!(format_size(Size::from((8504, 17008))), "8504 x 17008");
    }

    #[test]
    fn summary_lists_every_field() {
        let lines = format_summary(&reference_summary());
        assert_eq!(
            lines,
            vec![
                "DONE",
                "    Input file:    input/dusk.jpg",
                "    Input size:    5000 x 8000",
                "    Cropped size:  4000 x 8000 (1:2)",
                "    AI used:       no",
                "    Final TIFF:    output/dusk_600x1200mm_360dpi.tiff",
                "    Final pixels:  8504 x 17008 @ 360 DPI",
                "    Preview:       output/preview.jpg (2126 x 4252)",
            ]
        );
    }

    #[test]
    fn summary_reports_ai_upscale() {
        let summary = RunSummary {
            used_ai: true,
            ..reference_summary()
        };
        let lines = format_summary(&summary);
        assert!(lines.contains(&"    AI used:       yes".to_string()));
    }

    #[test]
    fn summary_flags_too_narrow_source() {
        let summary = RunSummary {
            cropped_size: Size::from((10, 1)),
            ..reference_summary()
        };
        let lines = format_summary(&summary);
        assert!(lines[3].contains("not 1:2"));
    }
}
