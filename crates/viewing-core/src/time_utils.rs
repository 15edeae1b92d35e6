use std::sync::OnceLock;

use chrono::{DateTime, NaiveDateTime, TimeDelta, TimeZone as _, Utc, Weekday};
use chrono_tz::Tz;
use regex::Regex;
use tracing::warn;

use crate::error::{Result, ViewingError};

// ── System timezone detection ─────────────────────────────────────────────────

/// Detect the IANA timezone name of the running system.
///
/// Falls back to `"UTC"` if detection fails.
pub fn get_system_timezone() -> String {
    iana_time_zone::get_timezone().unwrap_or_else(|_| "UTC".to_string())
}

/// Resolve a configured timezone name into a [`Tz`].
///
/// `"auto"` resolves to the system timezone; anything else must be a valid
/// IANA identifier such as `"Asia/Jerusalem"`.
pub fn resolve_timezone(name: &str) -> Result<Tz> {
    let name = if name.eq_ignore_ascii_case("auto") {
        get_system_timezone()
    } else {
        name.to_string()
    };
    name.parse::<Tz>()
        .map_err(|_| ViewingError::InvalidTimezone(name.clone()))
}

// ── TimezoneHandler ───────────────────────────────────────────────────────────

/// Parses export timestamps (always UTC) and converts them to the target zone.
#[derive(Debug, Clone, Copy)]
pub struct TimezoneHandler {
    target_tz: Tz,
}

impl TimezoneHandler {
    pub fn new(target_tz: Tz) -> Self {
        Self { target_tz }
    }

    /// Parse a UTC timestamp string.
    ///
    /// Accepts the export's `YYYY-MM-DD HH:MM:SS` form (optionally with
    /// fractional seconds or a `T` separator) and RFC 3339 strings carrying an
    /// explicit offset. Returns `None` for empty or unrecognised input.
    pub fn parse_utc(&self, s: &str) -> Option<DateTime<Utc>> {
        let s = s.trim();
        if s.is_empty() {
            return None;
        }

        let normalised = if let Some(stripped) = s.strip_suffix('Z') {
            format!("{}+00:00", stripped)
        } else {
            s.to_string()
        };
        if let Ok(dt) = DateTime::parse_from_rfc3339(&normalised) {
            return Some(dt.with_timezone(&Utc));
        }

        const FMTS: &[&str] = &[
            "%Y-%m-%d %H:%M:%S%.f",
            "%Y-%m-%d %H:%M:%S",
            "%Y-%m-%dT%H:%M:%S%.f",
            "%Y-%m-%dT%H:%M:%S",
            "%Y-%m-%d %H:%M",
        ];
        FMTS.iter()
            .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
            .map(|naive| Utc.from_utc_datetime(&naive))
    }

    /// Parse a UTC timestamp and convert it to the target timezone.
    pub fn parse_local(&self, s: &str) -> Option<DateTime<Tz>> {
        self.parse_utc(s).map(|dt| self.to_local(dt))
    }

    /// Convert a UTC instant to the target timezone.
    pub fn to_local(&self, dt: DateTime<Utc>) -> DateTime<Tz> {
        dt.with_timezone(&self.target_tz)
    }
}

// ── Durations ─────────────────────────────────────────────────────────────────

fn duration_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^(?:(\d+)\s+days?\s+)?(\d+):([0-5]\d):([0-5]\d)(?:\.(\d{1,9}))?$")
            .expect("regex is valid")
    })
}

/// Parse an `HH:MM:SS` duration string into a [`TimeDelta`].
///
/// Hours may exceed 23, an optional `N days` prefix and fractional seconds are
/// accepted.
pub fn parse_duration(s: &str) -> Option<TimeDelta> {
    let caps = duration_regex().captures(s.trim())?;

    let number = |idx: usize| -> Option<i64> {
        caps.get(idx)
            .map(|m| m.as_str().parse::<i64>().ok())
            .unwrap_or(Some(0))
    };
    let days = number(1)?;
    let hours = number(2)?;
    let minutes = number(3)?;
    let seconds = number(4)?;
    let nanos = match caps.get(5) {
        Some(frac) => {
            let digits = frac.as_str();
            let padded = format!("{:0<9}", digits);
            padded.parse::<i64>().ok()?
        }
        None => 0,
    };

    let total_secs = days
        .checked_mul(86_400)?
        .checked_add(hours.checked_mul(3_600)?)?
        .checked_add(minutes * 60 + seconds)?;
    TimeDelta::try_seconds(total_secs)?.checked_add(&TimeDelta::nanoseconds(nanos))
}

/// Length of a [`TimeDelta`] in fractional minutes.
pub fn minutes_of(duration: TimeDelta) -> f64 {
    duration.num_milliseconds() as f64 / 60_000.0
}

/// Length of a [`TimeDelta`] in fractional hours.
pub fn hours_of(duration: TimeDelta) -> f64 {
    duration.num_milliseconds() as f64 / 3_600_000.0
}

// ── Weekdays ──────────────────────────────────────────────────────────────────

/// Full English weekday name, e.g. `"Sunday"`.
pub fn weekday_name(day: Weekday) -> &'static str {
    match day {
        Weekday::Mon => "Monday",
        Weekday::Tue => "Tuesday",
        Weekday::Wed => "Wednesday",
        Weekday::Thu => "Thursday",
        Weekday::Fri => "Friday",
        Weekday::Sat => "Saturday",
        Weekday::Sun => "Sunday",
    }
}

/// Parse a weekday name (full or three-letter, case-insensitive).
pub fn parse_weekday(s: &str) -> Option<Weekday> {
    let lower = s.trim().to_lowercase();
    let day = match lower.get(..3)? {
        "mon" => Weekday::Mon,
        "tue" => Weekday::Tue,
        "wed" => Weekday::Wed,
        "thu" => Weekday::Thu,
        "fri" => Weekday::Fri,
        "sat" => Weekday::Sat,
        "sun" => Weekday::Sun,
        _ => return None,
    };
    if lower.len() == 3 || lower == weekday_name(day).to_lowercase() {
        Some(day)
    } else {
        warn!("parse_weekday: unrecognised weekday \"{}\"", s);
        None
    }
}

/// Zero-based position of `day` in a week that begins on `week_start`.
pub fn week_position(day: Weekday, week_start: Weekday) -> u32 {
    (day.num_days_from_sunday() + 7 - week_start.num_days_from_sunday()) % 7
}

// ── Tests ──────────────────────────────────────────────────────────────────────
