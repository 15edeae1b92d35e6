//! Export discovery and CSV loading.
//!
//! Locates `ViewingActivity.csv` inside a downloaded export and decodes its
//! rows into [`RawEntry`] values.

use std::io::Read;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};
use viewing_core::error::{Result, ViewingError};
use viewing_core::models::{RawEntry, EXPORT_COLUMNS};

/// File name of the viewing-activity table inside an export.
pub const EXPORT_FILE_NAME: &str = "ViewingActivity.csv";

// ── Public API ────────────────────────────────────────────────────────────────

/// Resolve `path` to the viewing-activity CSV.
///
/// A file path is returned as-is. A directory is searched recursively for
/// `ViewingActivity.csv` (case-insensitive); the first match in path order wins.
pub fn find_export_file(path: &Path) -> Result<PathBuf> {
    if path.is_file() {
        return Ok(path.to_path_buf());
    }
    if !path.exists() {
        warn!("Export path does not exist: {}", path.display());
        return Err(ViewingError::ExportNotFound(path.to_path_buf()));
    }

    let mut candidates: Vec<PathBuf> = walkdir::WalkDir::new(path)
        .follow_links(true)
        .into_iter()
        .filter_map(|entry| entry.ok())
        .filter(|entry| {
            entry.file_type().is_file()
                && entry
                    .file_name()
                    .to_string_lossy()
                    .eq_ignore_ascii_case(EXPORT_FILE_NAME)
        })
        .map(|entry| entry.into_path())
        .collect();

    candidates.sort();
    if candidates.len() > 1 {
        debug!(
            "Found {} export files under {}, using {}",
            candidates.len(),
            path.display(),
            candidates[0].display()
        );
    }
    candidates
        .into_iter()
        .next()
        .ok_or_else(|| ViewingError::ExportNotFound(path.to_path_buf()))
}

/// Read every row of the export at `path`.
pub fn read_raw_entries(path: &Path) -> Result<Vec<RawEntry>> {
    let file = std::fs::File::open(path).map_err(|source| ViewingError::FileRead {
        path: path.to_path_buf(),
        source,
    })?;
    let entries = read_raw_entries_from(file)?;
    debug!("Read {} rows from {}", entries.len(), path.display());
    Ok(entries)
}

/// Decode export rows from any reader, checking the header set first.
pub fn read_raw_entries_from<R: Read>(reader: R) -> Result<Vec<RawEntry>> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::Headers)
        .from_reader(reader);

    let headers = csv_reader.headers()?.clone();
    if let Some(missing) = EXPORT_COLUMNS
        .iter()
        .find(|column| !headers.iter().any(|h| h == **column))
    {
        return Err(ViewingError::MissingColumn(missing.to_string()));
    }

    let entries = csv_reader
        .deserialize::<RawEntry>()
        .collect::<std::result::Result<Vec<_>, csv::Error>>()?;
    Ok(entries)
}

// ── Tests ─────────────────────────────────────────────────────────────────────
