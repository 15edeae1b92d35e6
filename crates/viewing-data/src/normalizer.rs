//! Cleans raw export rows into [`NormalizedRecord`]s.
//!
//! Steps run in a fixed order: trailer exclusion, projection, temporal
//! parsing, minimum-duration filter, then the derived columns (end time,
//! duration category, title name, device category, weekday, hour).

use std::collections::BTreeSet;

use chrono::{DateTime, Datelike, TimeDelta, Timelike};
use chrono_tz::Tz;
use tracing::{debug, info};
use viewing_core::config::PipelineConfig;
use viewing_core::devices::categorize_device;
use viewing_core::error::{Result, ViewingError};
use viewing_core::models::{NormalizedRecord, RawEntry};
use viewing_core::time_utils::{parse_duration, TimezoneHandler};
use viewing_core::titles::extract_title;

/// Counts gathered while normalizing, plus the profile roster of the export.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NormalizeReport {
    pub rows_read: usize,
    pub supplemental_dropped: usize,
    pub short_dropped: usize,
    pub records_kept: usize,
    /// Every non-empty profile name present in the export, including profiles
    /// whose rows were all filtered out.
    pub profiles: BTreeSet<String>,
}

/// The retained columns of a row, before typing.
struct Projected<'a> {
    row: usize,
    profile_name: &'a str,
    start_time: &'a str,
    duration: &'a str,
    title: &'a str,
    device_type: &'a str,
    country: &'a str,
}

/// Normalize `raw` rows, discarding the report.
pub fn normalize(raw: &[RawEntry], config: &PipelineConfig) -> Result<Vec<NormalizedRecord>> {
    normalize_with_report(raw, config).map(|(records, _)| records)
}

/// Normalize `raw` rows.
///
/// Fails on the first malformed timestamp or duration; the error carries the
/// 1-based data row index and the offending value.
pub fn normalize_with_report(
    raw: &[RawEntry],
    config: &PipelineConfig,
) -> Result<(Vec<NormalizedRecord>, NormalizeReport)> {
    let handler = config.timezone_handler();
    let mut report = NormalizeReport {
        rows_read: raw.len(),
        ..NormalizeReport::default()
    };
    let mut records = Vec::with_capacity(raw.len());

    for (idx, entry) in raw.iter().enumerate() {
        let profile = entry.profile_name.trim();
        if !profile.is_empty() {
            report.profiles.insert(profile.to_string());
        }

        if entry.is_supplemental() {
            report.supplemental_dropped += 1;
            continue;
        }

        let projected = project(idx + 1, entry);
        let (start_time, duration) = parse_temporal(&projected, &handler)?;

        if duration <= config.min_duration {
            report.short_dropped += 1;
            continue;
        }

        records.push(build_record(&projected, start_time, duration, config)?);
    }

    report.records_kept = records.len();
    debug!(
        "Normalizer: {} rows, {} supplemental dropped, {} too short",
        report.rows_read, report.supplemental_dropped, report.short_dropped
    );
    info!(
        "Normalized {} viewing records across {} profiles",
        report.records_kept,
        report.profiles.len()
    );

    Ok((records, report))
}

fn project(row: usize, entry: &RawEntry) -> Projected<'_> {
    Projected {
        row,
        profile_name: entry.profile_name.trim(),
        start_time: &entry.start_time,
        duration: &entry.duration,
        title: &entry.title,
        device_type: &entry.device_type,
        country: &entry.country,
    }
}

fn parse_temporal(
    row: &Projected<'_>,
    handler: &TimezoneHandler,
) -> Result<(DateTime<Tz>, TimeDelta)> {
    let start_time =
        handler
            .parse_local(row.start_time)
            .ok_or_else(|| ViewingError::TimestampParse {
                row: row.row,
                value: row.start_time.to_string(),
            })?;
    let duration = parse_duration(row.duration).ok_or_else(|| ViewingError::DurationParse {
        row: row.row,
        value: row.duration.to_string(),
    })?;
    Ok((start_time, duration))
}

fn build_record(
    row: &Projected<'_>,
    start_time: DateTime<Tz>,
    duration: TimeDelta,
    config: &PipelineConfig,
) -> Result<NormalizedRecord> {
    if row.profile_name.is_empty() {
        return Err(ViewingError::EmptyProfile { row: row.row });
    }
    let end_time =
        start_time
            .checked_add_signed(duration)
            .ok_or_else(|| ViewingError::DurationParse {
                row: row.row,
                value: row.duration.to_string(),
            })?;
    let category = config.categorize(duration);

    Ok(NormalizedRecord {
        profile_name: row.profile_name.to_string(),
        start_time,
        duration,
        end_time,
        duration_category: category,
        duration_label: config.category_label(category),
        weekday: start_time.weekday(),
        hour: start_time.hour(),
        title_name: extract_title(row.title),
        title: row.title.to_string(),
        device_type: row.device_type.to_string(),
        device_category: categorize_device(row.device_type),
        country: row.country.to_string(),
    })
}

// ── Tests ─────────────────────────────────────────────────────────────────────
