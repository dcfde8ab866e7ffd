//! Output file naming: `{name}_{timestamp}_output.{ext}`.

use chrono::{DateTime, TimeZone};
use std::path::{Path, PathBuf};

/// Extension of the populated, not yet converted document.
pub const INTERMEDIATE_EXTENSION: &str = "pptx";

/// Extension of the converted document.
pub const CONVERTED_EXTENSION: &str = "pdf";

/// Timestamp layout, second granularity.
pub const TIMESTAMP_FORMAT: &str = "%Y%m%d%H%M%S";

/// Characters that cannot appear in a file name on common filesystems.
const RESERVED_CHARS: &[char] = &['<', '>', ':', '"', '/', '\\', '|', '?', '*'];

/// The two files produced for one row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputPaths {
    pub intermediate: PathBuf,
    pub converted: PathBuf,
}

/// Format a wall-clock time for use in a file name.
pub fn timestamp<Tz: TimeZone>(now: &DateTime<Tz>) -> String
where
    Tz::Offset: std::fmt::Display,
{
    now.format(TIMESTAMP_FORMAT).to_string()
}

/// Make a row's `name` value safe to use as part of a file name.
///
/// An empty result falls back to `row{line}`.
pub fn file_stem_for(name: &str, line: usize) -> String {
    let cleaned: String = name
        .chars()
        .map(|c| {
            if RESERVED_CHARS.contains(&c) || c.is_control() {
                '_'
            } else {
                c
            }
        })
        .collect();
    let cleaned = cleaned.trim().trim_end_matches('.');

    if cleaned.is_empty() {
        format!("row{}", line)
    } else {
        cleaned.to_string()
    }
}

/// Pick the output paths for a row.
///
/// Neither file of the pair may already exist: a second run inside the
/// same second, or two rows with the same name, get a numeric suffix
/// instead of overwriting earlier output.
pub fn output_paths(dir: &Path, name: &str, line: usize, timestamp: &str) -> OutputPaths {
    let stem = file_stem_for(name, line);
    let mut n = 0usize;
    loop {
        let base = if n == 0 {
            format!("{}_{}_output", stem, timestamp)
        } else {
            format!("{}_{}_{}_output", stem, timestamp, n)
        };
        let paths = OutputPaths {
            intermediate: dir.join(format!("{}.{}", base, INTERMEDIATE_EXTENSION)),
            converted: dir.join(format!("{}.{}", base, CONVERTED_EXTENSION)),
        };
        if !paths.intermediate.exists() && !paths.converted.exists() {
            return paths;
        }
        n += 1;
    }
}
