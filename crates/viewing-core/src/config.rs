//! Explicit configuration for the normalization and aggregation pipeline.

use chrono::{TimeDelta, Weekday};
use chrono_tz::Tz;

use crate::error::{Result, ViewingError};
use crate::models::DurationCategory;
use crate::time_utils::{minutes_of, week_position, TimezoneHandler};

pub const DEFAULT_TIMEZONE: &str = "Asia/Jerusalem";
pub const DEFAULT_MIN_DURATION_MINUTES: u32 = 1;
pub const DEFAULT_SHORT_MINUTES: u32 = 30;
pub const DEFAULT_MEDIUM_MINUTES: u32 = 60;
pub const DEFAULT_SESSION_GAP_MINUTES: u32 = 10;

/// Every tunable the pipeline consults. Passed into each operation.
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineConfig {
    /// Zone the UTC export timestamps are converted into.
    pub timezone: Tz,
    /// Records at or below this span are dropped.
    pub min_duration: TimeDelta,
    /// Upper (exclusive) bound of the short category, in minutes.
    pub short_minutes: u32,
    /// Upper (inclusive) bound of the medium category, in minutes.
    pub medium_minutes: u32,
    /// Largest start-after-end gap that still continues a session.
    pub session_gap: TimeDelta,
    /// First day of the week for weekday ordering.
    pub week_start: Weekday,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            timezone: Tz::Asia__Jerusalem,
            min_duration: TimeDelta::minutes(DEFAULT_MIN_DURATION_MINUTES as i64),
            short_minutes: DEFAULT_SHORT_MINUTES,
            medium_minutes: DEFAULT_MEDIUM_MINUTES,
            session_gap: TimeDelta::minutes(DEFAULT_SESSION_GAP_MINUTES as i64),
            week_start: Weekday::Sun,
        }
    }
}

impl PipelineConfig {
    /// Check cross-field constraints.
    pub fn validate(&self) -> Result<()> {
        if self.short_minutes == 0 {
            return Err(ViewingError::Config(
                "short duration threshold must be greater than 0".to_string(),
            ));
        }
        if self.short_minutes >= self.medium_minutes {
            return Err(ViewingError::Config(format!(
                "short threshold ({}) must be below medium threshold ({})",
                self.short_minutes, self.medium_minutes
            )));
        }
        if self.min_duration < TimeDelta::zero() || self.session_gap < TimeDelta::zero() {
            return Err(ViewingError::Config(
                "durations must not be negative".to_string(),
            ));
        }
        Ok(())
    }

    pub fn timezone_handler(&self) -> TimezoneHandler {
        TimezoneHandler::new(self.timezone)
    }

    /// Bucket a duration: `< short` is short, `short..=medium` is medium,
    /// anything longer is long.
    pub fn categorize(&self, duration: TimeDelta) -> DurationCategory {
        let minutes = minutes_of(duration);
        if minutes < f64::from(self.short_minutes) {
            DurationCategory::Short
        } else if minutes <= f64::from(self.medium_minutes) {
            DurationCategory::Medium
        } else {
            DurationCategory::Long
        }
    }

    /// Human-readable label embedding the thresholds.
    pub fn category_label(&self, category: DurationCategory) -> String {
        match category {
            DurationCategory::Short => format!("less than {} mins", self.short_minutes),
            DurationCategory::Medium => {
                format!("{}–{} mins", self.short_minutes + 1, self.medium_minutes)
            }
            DurationCategory::Long => format!("more than {} mins", self.medium_minutes),
        }
    }

    /// Position of `day` in the configured week, starting at 0.
    pub fn weekday_rank(&self, day: Weekday) -> u32 {
        week_position(day, self.week_start)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = PipelineConfig::default();
        assert_eq!(config.timezone, Tz::Asia__Jerusalem);
        assert_eq!(config.min_duration, TimeDelta::minutes(1));
        assert_eq!(config.session_gap, TimeDelta::minutes(10));
        assert_eq!(config.week_start, Weekday::Sun);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_categorize_boundaries() {
        let config = PipelineConfig::default();
        assert_eq!(config.categorize(TimeDelta::minutes(29)), DurationCategory::Short);
        assert_eq!(config.categorize(TimeDelta::minutes(30)), DurationCategory::Medium);
        assert_eq!(config.categorize(TimeDelta::minutes(60)), DurationCategory::Medium);
        assert_eq!(config.categorize(TimeDelta::minutes(61)), DurationCategory::Long);
        assert_eq!(
            config.categorize(TimeDelta::seconds(60 * 60 + 1)),
            DurationCategory::Long
        );
    }

    #[test]
    fn test_category_labels_embed_thresholds() {
        let config = PipelineConfig::default();
        let label_for = |m: i64| config.category_label(config.categorize(TimeDelta::minutes(m)));
        assert_eq!(label_for(29), "less than 30 mins");
        assert_eq!(label_for(30), "31–60 mins");
        assert_eq!(label_for(60), "31–60 mins");
        assert_eq!(label_for(61), "more than 60 mins");
    }

    #[test]
    fn test_custom_thresholds() {
        let config = PipelineConfig {
            short_minutes: 20,
            medium_minutes: 45,
            ..PipelineConfig::default()
        };
        assert_eq!(config.categorize(TimeDelta::minutes(25)), DurationCategory::Medium);
        assert_eq!(config.category_label(DurationCategory::Long), "more than 45 mins");
        assert_eq!(config.category_label(DurationCategory::Medium), "21–45 mins");
    }

    #[test]
    fn test_validate_rejects_inverted_thresholds() {
        let config = PipelineConfig {
            short_minutes: 60,
            medium_minutes: 30,
            ..PipelineConfig::default()
        };
        assert!(matches!(config.validate(), Err(ViewingError::Config(_))));
    }

    #[test]
    fn test_validate_rejects_zero_short() {
        let config = PipelineConfig {
            short_minutes: 0,
            ..PipelineConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_weekday_rank_follows_week_start() {
        let sunday_first = PipelineConfig::default();
        assert_eq!(sunday_first.weekday_rank(Weekday::Sun), 0);
        assert_eq!(sunday_first.weekday_rank(Weekday::Sat), 6);

        let monday_first = PipelineConfig {
            week_start: Weekday::Mon,
            ..PipelineConfig::default()
        };
        assert_eq!(monday_first.weekday_rank(Weekday::Sun), 6);
    }
}
