//! CLI output formatting for the inspection commands.
//!
//! # Output Format
//!
//! ## Table of contents
//!
//! ```text
//! Gear → #gear
//!     Lenses → #lenses
//! Settings → #settings
//!
//! 3 headings
//! ```
//!
//! ## Reading time
//!
//! ```text
//! 5 min read
//!     Words: 912
//! ```
//!
//! ## EXIF
//!
//! ```text
//! photos/dune.jpg
//!     Camera: FUJIFILM X100V
//!     Aperture: f/2.8
//!     Exposure: 1/250s
//! ```
//!
//! # Architecture
//!
//! Each command has a `format_*` function (returns `Vec<String>`) for
//! testability and a `print_*` wrapper that writes to stdout. Format functions
//! are pure: no I/O, no side effects. `--json` output bypasses these and
//! serializes the underlying value directly.

use crate::exif::ExifData;
use crate::reading_time::{Language, ReadingTime};
use crate::toc::TableOfContents;

/// Return indentation string: 4 spaces per depth level.
fn indent(depth: usize) -> String {
    "    ".repeat(depth)
}

fn plural(n: usize, one: &str, many: &str) -> String {
    if n == 1 {
        format!("{n} {one}")
    } else {
        format!("{n} {many}")
    }
}

// ============================================================================
// Table of contents
// ============================================================================

/// One line per entry, `###` entries indented under their `##`.
pub fn format_toc(toc: &TableOfContents) -> Vec<String> {
    if toc.is_empty() {
        return vec!["No headings".to_string()];
    }
    let mut lines: Vec<String> = toc
        .entries
        .iter()
        .map(|entry| {
            let depth = usize::from(entry.level.saturating_sub(2));
            format!("{}{} → #{}", indent(depth), entry.text, entry.id)
        })
        .collect();
    lines.push(String::new());
    lines.push(plural(toc.entries.len(), "heading", "headings"));
    lines
}

pub fn print_toc(toc: &TableOfContents) {
    for line in format_toc(toc) {
        println!("{}", line);
    }
}

// ============================================================================
// Reading time
// ============================================================================

pub fn format_reading_time(reading_time: &ReadingTime, language: Language) -> Vec<String> {
    vec![
        reading_time.label(language),
        format!("{}Words: {}", indent(1), reading_time.words),
    ]
}

pub fn print_reading_time(reading_time: &ReadingTime, language: Language) {
    for line in format_reading_time(reading_time, language) {
        println!("{}", line);
    }
}

// ============================================================================
// EXIF
// ============================================================================

/// Image name, then one indented `Label: value` line per known field.
pub fn format_exif(image: &str, exif: Option<&ExifData>) -> Vec<String> {
    let mut lines = vec![image.to_string()];
    match exif {
        Some(exif) => {
            for (label, value) in exif.rows() {
                lines.push(format!("{}{}: {}", indent(1), label, value));
            }
        }
        None => lines.push(format!("{}No EXIF data", indent(1))),
    }
    lines
}

pub fn print_exif(image: &str, exif: Option<&ExifData>) {
    for line in format_exif(image, exif) {
        println!("{}", line);
    }
}
