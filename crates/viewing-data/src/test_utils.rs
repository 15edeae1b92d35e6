//! Shared fixtures for unit tests.

use chrono::TimeDelta;
use viewing_core::config::PipelineConfig;
use viewing_core::models::{NormalizedRecord, RawEntry};

use crate::normalizer::normalize;

/// A non-supplemental export row watched on a TV in Israel.
pub fn raw_entry(profile: &str, start: &str, duration: &str, title: &str) -> RawEntry {
    RawEntry {
        profile_name: profile.to_string(),
        start_time: start.to_string(),
        duration: duration.to_string(),
        attributes: None,
        title: title.to_string(),
        supplemental_video_type: None,
        device_type: "Samsung 2015 Tizen TV".to_string(),
        bookmark: None,
        latest_bookmark: None,
        country: "IL (Israel)".to_string(),
    }
}

/// Format a duration as an export `HH:MM:SS` duration.
pub fn hms(duration: TimeDelta) -> String {
    let secs = duration.num_seconds();
    format!("{:02}:{:02}:{:02}", secs / 3600, (secs % 3600) / 60, secs % 60)
}

/// Normalize a single row with the default config.
pub fn record(profile: &str, start: &str, minutes: i64, title: &str) -> NormalizedRecord {
    record_with(profile, start, TimeDelta::minutes(minutes), title, &PipelineConfig::default())
}

pub fn record_with(
    profile: &str,
    start: &str,
    duration: TimeDelta,
    title: &str,
    config: &PipelineConfig,
) -> NormalizedRecord {
    let raw = raw_entry(profile, start, &hms(duration), title);
    normalize(&[raw], config)
        .expect("fixture normalizes")
        .pop()
        .expect("fixture is above the minimum duration")
}
