//! Grouped duration sums and monthly counts over normalized records.

use std::collections::BTreeMap;
use std::str::FromStr;

use chrono::TimeDelta;
use viewing_core::config::PipelineConfig;
use viewing_core::error::{Result, ViewingError};
use viewing_core::models::{MatrixRow, MonthlyCount, NormalizedRecord, SummaryRow};
use viewing_core::time_utils::{hours_of, weekday_name};

// ── GroupKey ──────────────────────────────────────────────────────────────────

/// Dimension along which durations are summed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GroupKey {
    TitleName,
    ProfileName,
    DurationCategory,
    Country,
    DeviceType,
    DeviceCategory,
    Weekday,
    Hour,
}

impl GroupKey {
    pub const ALL: [GroupKey; 8] = [
        Self::TitleName,
        Self::ProfileName,
        Self::DurationCategory,
        Self::Country,
        Self::DeviceType,
        Self::DeviceCategory,
        Self::Weekday,
        Self::Hour,
    ];

    /// Column name of the key, e.g. `"title_name"`.
    pub fn name(&self) -> &'static str {
        match self {
            Self::TitleName => "title_name",
            Self::ProfileName => "profile_name",
            Self::DurationCategory => "duration_category",
            Self::Country => "country",
            Self::DeviceType => "device_type",
            Self::DeviceCategory => "device_category",
            Self::Weekday => "weekday",
            Self::Hour => "hour",
        }
    }

    /// Human-readable axis label.
    pub fn label(&self) -> &'static str {
        match self {
            Self::TitleName => "Title",
            Self::ProfileName => "Profile Name",
            Self::DurationCategory => "Duration Category",
            Self::Country => "Country",
            Self::DeviceType => "Device Type",
            Self::DeviceCategory => "Device Category",
            Self::Weekday => "Weekday",
            Self::Hour => "Hour",
        }
    }

    /// Sort position and display value of `record` under this key.
    ///
    /// Text keys share rank 0 and order lexically; ordinal keys order by rank.
    fn group_value(&self, record: &NormalizedRecord, config: &PipelineConfig) -> (u32, String) {
        match self {
            Self::TitleName => (0, record.title_name.clone()),
            Self::ProfileName => (0, record.profile_name.clone()),
            Self::Country => (0, record.country.clone()),
            Self::DeviceType => (0, record.device_type.clone()),
            Self::DeviceCategory => (0, record.device_category.label().to_string()),
            Self::DurationCategory => (
                record.duration_category as u32,
                record.duration_label.clone(),
            ),
            Self::Weekday => (
                config.weekday_rank(record.weekday),
                weekday_name(record.weekday).to_string(),
            ),
            Self::Hour => (record.hour, record.hour.to_string()),
        }
    }
}

impl FromStr for GroupKey {
    type Err = ViewingError;

    fn from_str(s: &str) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|key| key.name() == s)
            .ok_or_else(|| ViewingError::InvalidGroupKey(s.to_string()))
    }
}

// ── ViewingAggregator ─────────────────────────────────────────────────────────

/// Stateless helper that groups viewing records.
pub struct ViewingAggregator;

impl ViewingAggregator {
    /// Sum watched hours per `key`, sorted ascending by the key's natural order.
    ///
    /// `profile` restricts the input to one profile; validate it against the
    /// export roster with [`ViewingAggregator::validate_profile`] first.
    pub fn aggregate(
        records: &[NormalizedRecord],
        key: GroupKey,
        profile: Option<&str>,
        config: &PipelineConfig,
    ) -> Vec<SummaryRow> {
        let mut groups: BTreeMap<(u32, String), TimeDelta> = BTreeMap::new();

        for record in Self::filter_by_profile(records, profile) {
            *groups
                .entry(key.group_value(record, config))
                .or_insert_with(TimeDelta::zero) += record.duration;
        }

        groups
            .into_iter()
            .map(|((_, key), total)| SummaryRow {
                key,
                hours: hours_of(total),
            })
            .collect()
    }

    /// Count records per `YYYY-MM` of their local start time.
    pub fn monthly_view_count(
        records: &[NormalizedRecord],
        profile: Option<&str>,
    ) -> Vec<MonthlyCount> {
        Self::count_by_month(
            Self::filter_by_profile(records, profile).map(NormalizedRecord::month_key),
        )
    }

    /// Pivot monthly counts into one row per year with twelve month cells.
    pub fn monthly_matrix(counts: &[MonthlyCount]) -> Vec<MatrixRow> {
        let mut years: BTreeMap<String, [Option<usize>; 12]> = BTreeMap::new();

        for count in counts {
            let Some(month) = count.month_number().filter(|m| (1..=12).contains(m)) else {
                continue;
            };
            let row = years.entry(count.year.clone()).or_insert([None; 12]);
            let cell = &mut row[(month - 1) as usize];
            *cell = Some(cell.unwrap_or(0) + count.count);
        }

        years
            .into_iter()
            .map(|(year, counts)| MatrixRow { year, counts })
            .collect()
    }

    /// Keep the first `n` rows. `n` must be positive.
    pub fn top_n<T>(rows: Vec<T>, n: i64) -> Result<Vec<T>> {
        Self::validate_top_n(n)?;
        Ok(rows.into_iter().take(n as usize).collect())
    }

    pub fn validate_top_n(n: i64) -> Result<()> {
        if n < 1 {
            return Err(ViewingError::InvalidTopN(n));
        }
        Ok(())
    }

    /// Sum of the hours across `rows`.
    pub fn total_hours(rows: &[SummaryRow]) -> f64 {
        rows.iter().map(|r| r.hours).sum()
    }

    /// Total watched duration of `records`.
    pub fn total_duration(records: &[NormalizedRecord]) -> TimeDelta {
        records
            .iter()
            .fold(TimeDelta::zero(), |acc, r| acc + r.duration)
    }

    /// Fail with [`ViewingError::UnknownProfile`] unless `name` is in `known`.
    pub fn validate_profile<S: AsRef<str>>(known: &[S], name: &str) -> Result<()> {
        if known.iter().any(|p| p.as_ref() == name) {
            return Ok(());
        }
        Err(ViewingError::UnknownProfile {
            name: name.to_string(),
            available: known.iter().map(|p| p.as_ref().to_string()).collect(),
        })
    }

    // ── Private ───────────────────────────────────────────────────────────────

    fn filter_by_profile<'a>(
        records: &'a [NormalizedRecord],
        profile: Option<&'a str>,
    ) -> impl Iterator<Item = &'a NormalizedRecord> + 'a {
        records
            .iter()
            .filter(move |r| profile.map_or(true, |p| r.profile_name == p))
    }

    pub(crate) fn count_by_month(months: impl Iterator<Item = String>) -> Vec<MonthlyCount> {
        let mut map: BTreeMap<String, usize> = BTreeMap::new();
        for month in months {
            *map.entry(month).or_insert(0) += 1;
        }
        map.into_iter()
            .map(|(month, count)| MonthlyCount::new(month, count))
            .collect()
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
