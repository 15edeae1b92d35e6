use chrono::{DateTime, TimeDelta, Weekday};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize, Serializer};

use crate::devices::DeviceCategory;
use crate::time_utils::{minutes_of, weekday_name};

/// Fixed column headers of the viewing-activity export.
pub const EXPORT_COLUMNS: [&str; 10] = [
    "Profile Name",
    "Start Time",
    "Duration",
    "Attributes",
    "Title",
    "Supplemental Video Type",
    "Device Type",
    "Bookmark",
    "Latest Bookmark",
    "Country",
];

/// One row of the viewing-activity export, exactly as read.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawEntry {
    #[serde(rename = "Profile Name")]
    pub profile_name: String,
    /// UTC start timestamp, e.g. `"2023-07-14 20:05:31"`.
    #[serde(rename = "Start Time")]
    pub start_time: String,
    /// Watched span as `HH:MM:SS`.
    #[serde(rename = "Duration")]
    pub duration: String,
    #[serde(rename = "Attributes", default)]
    pub attributes: Option<String>,
    #[serde(rename = "Title")]
    pub title: String,
    /// Set for trailers, recaps and other non-feature plays.
    #[serde(rename = "Supplemental Video Type", default)]
    pub supplemental_video_type: Option<String>,
    #[serde(rename = "Device Type")]
    pub device_type: String,
    #[serde(rename = "Bookmark", default)]
    pub bookmark: Option<String>,
    #[serde(rename = "Latest Bookmark", default)]
    pub latest_bookmark: Option<String>,
    #[serde(rename = "Country")]
    pub country: String,
}

impl RawEntry {
    /// `true` when the row is a trailer, recap or similar supplemental play.
    pub fn is_supplemental(&self) -> bool {
        self.supplemental_video_type
            .as_deref()
            .is_some_and(|kind| !kind.trim().is_empty())
    }
}

/// Coarse length bucket of a single viewing record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DurationCategory {
    Short,
    Medium,
    Long,
}

/// A cleaned, typed viewing-history row.
///
/// Invariant: `duration` is above the configured minimum and
/// `end_time == start_time + duration`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NormalizedRecord {
    pub profile_name: String,
    pub start_time: DateTime<Tz>,
    #[serde(serialize_with = "serialize_minutes", rename = "duration_minutes")]
    pub duration: TimeDelta,
    pub end_time: DateTime<Tz>,
    #[serde(skip)]
    pub duration_category: DurationCategory,
    /// Threshold label of `duration_category`, e.g. `"31–60 mins"`.
    #[serde(rename = "duration_category")]
    pub duration_label: String,
    #[serde(serialize_with = "serialize_weekday")]
    pub weekday: Weekday,
    pub hour: u32,
    pub title_name: String,
    pub title: String,
    pub device_type: String,
    pub device_category: DeviceCategory,
    pub country: String,
}

impl NormalizedRecord {
    /// Calendar month of the local start time, formatted `YYYY-MM`.
    pub fn month_key(&self) -> String {
        self.start_time.format("%Y-%m").to_string()
    }
}

fn serialize_minutes<S: Serializer>(duration: &TimeDelta, s: S) -> Result<S::Ok, S::Error> {
    s.serialize_f64(minutes_of(*duration))
}

fn serialize_weekday<S: Serializer>(day: &Weekday, s: S) -> Result<S::Ok, S::Error> {
    s.serialize_str(weekday_name(*day))
}

/// A maximal run of temporally contiguous viewing records.
#[derive(Debug, Clone, Serialize)]
pub struct Session {
    pub start_time: DateTime<Tz>,
    pub end_time: DateTime<Tz>,
    pub records: Vec<NormalizedRecord>,
}

impl Session {
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Sum of the member records' durations.
    pub fn watched(&self) -> TimeDelta {
        self.records
            .iter()
            .fold(TimeDelta::zero(), |acc, r| acc + r.duration)
    }

    /// Calendar month of the session start, formatted `YYYY-MM`.
    pub fn month_key(&self) -> String {
        self.start_time.format("%Y-%m").to_string()
    }
}

/// One row of a duration aggregation: a group key and the hours watched.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SummaryRow {
    pub key: String,
    pub hours: f64,
}

/// Number of viewing records (or sessions) started in a calendar month.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MonthlyCount {
    /// `YYYY-MM`.
    pub month: String,
    pub count: usize,
    /// First four characters of `month`.
    pub year: String,
}

impl MonthlyCount {
    pub fn new(month: String, count: usize) -> Self {
        let year = month.chars().take(4).collect();
        Self { month, count, year }
    }

    /// Month number 1–12, if the key is well formed.
    pub fn month_number(&self) -> Option<u32> {
        self.month.get(5..7)?.parse().ok()
    }
}

/// One year of a year × month count grid. Index 0 is January.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MatrixRow {
    pub year: String,
    pub counts: [Option<usize>; 12],
}
