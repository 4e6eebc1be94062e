//! Output path helpers

use std::path::Path;

use chrono::{DateTime, TimeZone};

/// Append `_{YYYYMMDD_HHMMSS}` to the stem of `base`, keeping its extension
pub fn timestamped_file_name<Tz>(base: &str, at: &DateTime<Tz>) -> String
where
    Tz: TimeZone,
    Tz::Offset: std::fmt::Display,
{
    let path = Path::new(base);
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let stamp = at.format("%Y%m%d_%H%M%S");

    match path.extension() {
        Some(ext) => format!("{}_{}.{}", stem, stamp, ext.to_string_lossy()),
        None => format!("{}_{}", stem, stamp),
    }
}
