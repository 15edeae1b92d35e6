//! Main analysis pipeline.
//!
//! Locates the export, reads it and normalizes every row, returning an
//! [`AnalysisResult`] for the aggregation and presentation layers.

use std::path::Path;
use std::time::Instant;

use chrono::Utc;
use tracing::info;
use viewing_core::config::PipelineConfig;
use viewing_core::error::Result;
use viewing_core::models::NormalizedRecord;

use crate::normalizer::normalize_with_report;
use crate::reader::{find_export_file, read_raw_entries};

// ── Public types ──────────────────────────────────────────────────────────────

/// Metadata produced alongside the analysis result.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct AnalysisMetadata {
    /// RFC 3339 timestamp when this result was generated.
    pub generated_at: String,
    /// The CSV file that was read.
    pub source: String,
    /// Timezone the records were localized into.
    pub timezone: String,
    pub rows_read: usize,
    pub supplemental_dropped: usize,
    pub short_dropped: usize,
    pub records_kept: usize,
    /// Wall-clock seconds spent locating and reading the CSV.
    pub load_time_seconds: f64,
    /// Wall-clock seconds spent normalizing rows.
    pub normalize_time_seconds: f64,
}

/// The complete output of [`analyze_export`].
#[derive(Debug, Clone)]
pub struct AnalysisResult {
    pub records: Vec<NormalizedRecord>,
    /// Sorted profile roster of the export, including profiles with no
    /// records left after filtering.
    pub profiles: Vec<String>,
    pub metadata: AnalysisMetadata,
}

// ── Public function ───────────────────────────────────────────────────────────

/// Run the load and normalize stages over the export at `path`.
///
/// `path` may be the CSV itself or a directory containing it.
pub fn analyze_export(path: &Path, config: &PipelineConfig) -> Result<AnalysisResult> {
    config.validate()?;

    // ── Step 1: Load rows ─────────────────────────────────────────────────────
    let load_start = Instant::now();
    let source = find_export_file(path)?;
    let raw = read_raw_entries(&source)?;
    let load_time = load_start.elapsed().as_secs_f64();

    // ── Step 2: Normalize ─────────────────────────────────────────────────────
    let normalize_start = Instant::now();
    let (records, report) = normalize_with_report(&raw, config)?;
    let normalize_time = normalize_start.elapsed().as_secs_f64();

    let metadata = AnalysisMetadata {
        generated_at: Utc::now().to_rfc3339(),
        source: source.display().to_string(),
        timezone: config.timezone.name().to_string(),
        rows_read: report.rows_read,
        supplemental_dropped: report.supplemental_dropped,
        short_dropped: report.short_dropped,
        records_kept: report.records_kept,
        load_time_seconds: load_time,
        normalize_time_seconds: normalize_time,
    };

    info!(
        "Analyzed {} ({} of {} rows kept) in {:.3}s",
        metadata.source,
        metadata.records_kept,
        metadata.rows_read,
        load_time + normalize_time
    );

    Ok(AnalysisResult {
        records,
        profiles: report.profiles.into_iter().collect(),
        metadata,
    })
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reader::EXPORT_FILE_NAME;
    use tempfile::TempDir;
    use viewing_core::error::ViewingError;

    const EXPORT: &str = "\
Profile Name,Start Time,Duration,Attributes,Title,Supplemental Video Type,Device Type,Bookmark,Latest Bookmark,Country
Dana,2023-07-14 20:05:00,00:45:00,,The Crown: Season 4: Fagan,,Samsung 2015 Tizen TV,00:45:00,00:45:00,IL (Israel)
Dana,2023-07-14 19:58:00,00:01:30,,Trailer: Dark,TRAILER,Samsung 2015 Tizen TV,00:01:30,00:01:30,IL (Israel)
Guest,2023-07-15 08:00:00,00:00:40,,Roma,,Apple iPhone 12,00:00:40,00:00:40,US (United States)
";

    #[test]
    fn test_analyze_export_from_directory() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join(EXPORT_FILE_NAME), EXPORT).unwrap();

        let result = analyze_export(dir.path(), &PipelineConfig::default()).unwrap();
        assert_eq!(result.records.len(), 1);
        assert_eq!(result.profiles, vec!["Dana".to_string(), "Guest".to_string()]);

        let meta = &result.metadata;
        assert_eq!(meta.rows_read, 3);
        assert_eq!(meta.supplemental_dropped, 1);
        assert_eq!(meta.short_dropped, 1);
        assert_eq!(meta.records_kept, 1);
        assert_eq!(meta.timezone, "Asia/Jerusalem");
        assert!(meta.source.ends_with(EXPORT_FILE_NAME));
        assert!(meta.load_time_seconds >= 0.0);
    }

    #[test]
    fn test_analyze_export_rejects_invalid_config() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join(EXPORT_FILE_NAME), EXPORT).unwrap();
        let config = PipelineConfig {
            short_minutes: 60,
            medium_minutes: 30,
            ..PipelineConfig::default()
        };
        assert!(matches!(
            analyze_export(dir.path(), &config),
            Err(ViewingError::Config(_))
        ));
    }

    #[test]
    fn test_analyze_export_missing() {
        let dir = TempDir::new().unwrap();
        assert!(matches!(
            analyze_export(dir.path(), &PipelineConfig::default()),
            Err(ViewingError::ExportNotFound(_))
        ));
    }
}
