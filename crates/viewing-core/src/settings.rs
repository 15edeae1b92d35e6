use chrono::TimeDelta;
use clap::{CommandFactory, FromArgMatches, Parser};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::warn;

use crate::config::{
    PipelineConfig, DEFAULT_MEDIUM_MINUTES, DEFAULT_MIN_DURATION_MINUTES,
    DEFAULT_SESSION_GAP_MINUTES, DEFAULT_SHORT_MINUTES, DEFAULT_TIMEZONE,
};
use crate::error::{Result, ViewingError};
use crate::time_utils::{parse_weekday, resolve_timezone};

// ── Settings (CLI) ─────────────────────────────────────────────────────────────

/// Summarise a streaming-service viewing-history export
#[derive(Parser, Debug, Clone)]
#[command(
    name = "viewing-history",
    about = "Summarise a streaming-service viewing-history export",
    version
)]
pub struct Settings {
    /// ViewingActivity.csv, or the export directory containing it
    pub export: Option<PathBuf>,

    /// Summary to produce
    #[arg(long, default_value = "titles", value_parser = [
        "titles", "profiles", "duration", "countries", "devices", "device-categories",
        "weekday", "hour", "monthly", "monthly-matrix", "sessions",
    ])]
    pub view: String,

    /// Restrict the summary to one profile
    #[arg(long)]
    pub profile: Option<String>,

    /// Keep only the first N rows of the summary
    #[arg(long, allow_negative_numbers = true)]
    pub top: Option<i64>,

    /// Output format
    #[arg(long, default_value = "table", value_parser = ["table", "json"])]
    pub format: String,

    /// Target timezone for local times ("auto" uses the system zone)
    #[arg(long, default_value = DEFAULT_TIMEZONE)]
    pub timezone: String,

    /// Records at or below this many minutes are ignored
    #[arg(long, default_value_t = DEFAULT_MIN_DURATION_MINUTES)]
    pub min_duration: u32,

    /// Upper bound (exclusive) of the short duration category, in minutes
    #[arg(long, default_value_t = DEFAULT_SHORT_MINUTES)]
    pub short: u32,

    /// Upper bound (inclusive) of the medium duration category, in minutes
    #[arg(long, default_value_t = DEFAULT_MEDIUM_MINUTES)]
    pub medium: u32,

    /// Largest gap in minutes that still continues a viewing session
    #[arg(long, default_value_t = DEFAULT_SESSION_GAP_MINUTES)]
    pub session_gap: u32,

    /// First day of the week
    #[arg(long, default_value = "sunday")]
    pub week_start: String,

    /// JSON config file (defaults to ~/.viewing-history/config.json)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Write the effective pipeline settings to the config file
    #[arg(long)]
    pub save_config: bool,

    /// Logging level
    #[arg(long, default_value = "INFO", value_parser = ["DEBUG", "INFO", "WARNING", "ERROR"])]
    pub log_level: String,

    /// Enable debug logging
    #[arg(long)]
    pub debug: bool,
}

// ── ConfigFile ─────────────────────────────────────────────────────────────────

/// Optional overrides read from `~/.viewing-history/config.json`.
#[derive(Debug, Serialize, Deserialize, Default, Clone, PartialEq)]
pub struct ConfigFile {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub export: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timezone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_duration_minutes: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub short_minutes: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub medium_minutes: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub session_gap_minutes: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub week_start: Option<String>,
}

impl ConfigFile {
    /// `~/.viewing-history/config.json`.
    pub fn default_path() -> PathBuf {
        Self::config_path_in(&dirs::home_dir().unwrap_or_else(|| PathBuf::from(".")))
    }

    /// The config path rooted at `base_dir`.
    pub fn config_path_in(base_dir: &Path) -> PathBuf {
        base_dir.join(".viewing-history").join("config.json")
    }

    /// Load from an explicit path; a missing or malformed file is an error.
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|source| ViewingError::FileRead {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(serde_json::from_str(&content)?)
    }

    /// Load from the default location. Absent files yield defaults; unreadable
    /// ones are logged and ignored.
    pub fn load_or_default(path: &Path) -> Self {
        if !path.exists() {
            return Self::default();
        }
        Self::load_from(path).unwrap_or_else(|e| {
            warn!("Ignoring config file {}: {}", path.display(), e);
            Self::default()
        })
    }

    /// Atomically write the config, creating parent directories if needed.
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let json = serde_json::to_string_pretty(self)?;

        let tmp = path.with_extension("json.tmp");
        std::fs::write(&tmp, &json)?;
        std::fs::rename(&tmp, path)?;

        Ok(())
    }
}

// ── Settings impl ──────────────────────────────────────────────────────────────

impl Settings {
    /// Parse process arguments and layer the config file underneath them.
    pub fn load() -> Result<Self> {
        Self::load_from_args(std::env::args_os().collect(), &ConfigFile::default_path())
    }

    /// Parse `args`, then fill every value not given on the command line from
    /// the config file (`--config`, or `default_config` when absent).
    pub fn load_from_args(args: Vec<std::ffi::OsString>, default_config: &Path) -> Result<Self> {
        let matches = Settings::command().get_matches_from(args);
        let mut settings = Settings::from_arg_matches(&matches)
            .map_err(|e| ViewingError::Config(e.to_string()))?;

        let file = match &settings.config {
            Some(path) => ConfigFile::load_from(path)?,
            None => ConfigFile::load_or_default(default_config),
        };
        settings.merge(file, &matches);

        if settings.save_config {
            let path = settings
                .config
                .clone()
                .unwrap_or_else(|| default_config.to_path_buf());
            ConfigFile::from(&settings).save_to(&path)?;
        }

        if settings.debug {
            settings.log_level = "DEBUG".to_string();
        }

        Ok(settings)
    }

    /// Take config-file values for arguments left at their defaults.
    fn merge(&mut self, file: ConfigFile, matches: &clap::ArgMatches) {
        if self.export.is_none() {
            self.export = file.export;
        }
        if !is_arg_explicitly_set(matches, "timezone") {
            if let Some(v) = file.timezone {
                self.timezone = v;
            }
        }
        if !is_arg_explicitly_set(matches, "min_duration") {
            if let Some(v) = file.min_duration_minutes {
                self.min_duration = v;
            }
        }
        if !is_arg_explicitly_set(matches, "short") {
            if let Some(v) = file.short_minutes {
                self.short = v;
            }
        }
        if !is_arg_explicitly_set(matches, "medium") {
            if let Some(v) = file.medium_minutes {
                self.medium = v;
            }
        }
        if !is_arg_explicitly_set(matches, "session_gap") {
            if let Some(v) = file.session_gap_minutes {
                self.session_gap = v;
            }
        }
        if !is_arg_explicitly_set(matches, "week_start") {
            if let Some(v) = file.week_start {
                self.week_start = v;
            }
        }
    }

    /// Build and validate the pipeline configuration.
    pub fn pipeline_config(&self) -> Result<PipelineConfig> {
        let week_start = parse_weekday(&self.week_start).ok_or_else(|| {
            ViewingError::Config(format!("invalid week start: {}", self.week_start))
        })?;

        let config = PipelineConfig {
            timezone: resolve_timezone(&self.timezone)?,
            min_duration: TimeDelta::minutes(i64::from(self.min_duration)),
            short_minutes: self.short,
            medium_minutes: self.medium,
            session_gap: TimeDelta::minutes(i64::from(self.session_gap)),
            week_start,
        };
        config.validate()?;
        Ok(config)
    }
}

// ── Conversion ─────────────────────────────────────────────────────────────────

impl From<&Settings> for ConfigFile {
    fn from(s: &Settings) -> Self {
        ConfigFile {
            export: s.export.clone(),
            timezone: Some(s.timezone.clone()),
            min_duration_minutes: Some(s.min_duration),
            short_minutes: Some(s.short),
            medium_minutes: Some(s.medium),
            session_gap_minutes: Some(s.session_gap),
            week_start: Some(s.week_start.clone()),
        }
    }
}

/// Returns `true` when `name` was supplied explicitly on the command line.
fn is_arg_explicitly_set(matches: &clap::ArgMatches, name: &str) -> bool {
    matches.value_source(name) == Some(clap::parser::ValueSource::CommandLine)
}

// ── Tests ──────────────────────────────────────────────────────────────────────
