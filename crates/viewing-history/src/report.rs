//! Turns an analysis result into the summary selected with `--view`.

use std::str::FromStr;

use serde::Serialize;
use viewing_core::config::PipelineConfig;
use viewing_core::error::{Result, ViewingError};
use viewing_core::formatting::{format_hours, profile_label};
use viewing_core::models::{MatrixRow, MonthlyCount, SummaryRow};
use viewing_core::time_utils::minutes_of;
use viewing_data::aggregator::{GroupKey, ViewingAggregator};
use viewing_data::analysis::{AnalysisMetadata, AnalysisResult};
use viewing_data::sessions::SessionReconstructor;

// ── View ──────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum View {
    Titles,
    Profiles,
    Duration,
    Countries,
    Devices,
    DeviceCategories,
    Weekday,
    Hour,
    Monthly,
    MonthlyMatrix,
    Sessions,
}

impl View {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Titles => "titles",
            Self::Profiles => "profiles",
            Self::Duration => "duration",
            Self::Countries => "countries",
            Self::Devices => "devices",
            Self::DeviceCategories => "device-categories",
            Self::Weekday => "weekday",
            Self::Hour => "hour",
            Self::Monthly => "monthly",
            Self::MonthlyMatrix => "monthly-matrix",
            Self::Sessions => "sessions",
        }
    }

    /// Dimension summed by duration views; `None` for count views.
    pub fn group_key(&self) -> Option<GroupKey> {
        match self {
            Self::Titles => Some(GroupKey::TitleName),
            Self::Profiles => Some(GroupKey::ProfileName),
            Self::Duration => Some(GroupKey::DurationCategory),
            Self::Countries => Some(GroupKey::Country),
            Self::Devices => Some(GroupKey::DeviceType),
            Self::DeviceCategories => Some(GroupKey::DeviceCategory),
            Self::Weekday => Some(GroupKey::Weekday),
            Self::Hour => Some(GroupKey::Hour),
            Self::Monthly | Self::MonthlyMatrix | Self::Sessions => None,
        }
    }

    /// Row limit applied when `--top` is not given.
    pub fn default_top(&self) -> Option<i64> {
        match self {
            Self::Titles | Self::Countries => Some(10),
            Self::Devices => Some(5),
            _ => None,
        }
    }
}

impl FromStr for View {
    type Err = ViewingError;

    fn from_str(s: &str) -> Result<Self> {
        let view = match s {
            "titles" => Self::Titles,
            "profiles" => Self::Profiles,
            "duration" => Self::Duration,
            "countries" => Self::Countries,
            "devices" => Self::Devices,
            "device-categories" => Self::DeviceCategories,
            "weekday" => Self::Weekday,
            "hour" => Self::Hour,
            "monthly" => Self::Monthly,
            "monthly-matrix" => Self::MonthlyMatrix,
            "sessions" => Self::Sessions,
            other => return Err(ViewingError::Config(format!("unknown view: {other}"))),
        };
        Ok(view)
    }
}

// ── Report ────────────────────────────────────────────────────────────────────

/// Rows of a report, shaped by the kind of view.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ReportBody {
    Hours {
        group_key: &'static str,
        label: &'static str,
        rows: Vec<SummaryRow>,
        total_hours: f64,
    },
    Monthly {
        rows: Vec<MonthlyCount>,
    },
    Matrix {
        rows: Vec<MatrixRow>,
    },
    Sessions {
        session_count: usize,
        /// Mean watched time per session, in minutes.
        average_minutes: f64,
        rows: Vec<MonthlyCount>,
    },
}

#[derive(Debug, Clone, Serialize)]
pub struct Report {
    pub view: &'static str,
    pub title: String,
    pub profile: Option<String>,
    pub body: ReportBody,
    pub metadata: AnalysisMetadata,
}

/// Build the report for `view`.
///
/// Fails with `UnknownProfile` when `profile` is not in the export's roster,
/// and with `InvalidTopN` when the row limit is not positive.
pub fn build_report(
    view: View,
    analysis: &AnalysisResult,
    profile: Option<&str>,
    top: Option<i64>,
    config: &PipelineConfig,
) -> Result<Report> {
    if let Some(name) = profile {
        ViewingAggregator::validate_profile(&analysis.profiles, name)?;
    }
    // The profile view always compares every profile.
    let profile = if view == View::Profiles { None } else { profile };
    let records = &analysis.records;
    let limit = top.or(view.default_top());

    let body = match view.group_key() {
        Some(key) => {
            let mut rows = ViewingAggregator::aggregate(records, key, profile, config);
            // Totals cover every group, not just the rows kept by the limit.
            let total_hours = ViewingAggregator::total_hours(&rows);
            if let Some(n) = limit {
                rows = ViewingAggregator::top_n(rows, n)?;
            }
            ReportBody::Hours {
                group_key: key.name(),
                label: key.label(),
                rows,
                total_hours,
            }
        }
        None => {
            // Count views are never truncated, but a bad limit is still an error.
            if let Some(n) = limit {
                ViewingAggregator::validate_top_n(n)?;
            }
            match view {
                View::MonthlyMatrix => ReportBody::Matrix {
                    rows: ViewingAggregator::monthly_matrix(
                        &ViewingAggregator::monthly_view_count(records, profile),
                    ),
                },
                View::Sessions => {
                    let sessions =
                        SessionReconstructor::from_config(config).sessions(records, profile);
                    let watched: f64 = sessions.iter().map(|s| minutes_of(s.watched())).sum();
                    ReportBody::Sessions {
                        session_count: sessions.len(),
                        average_minutes: if sessions.is_empty() {
                            0.0
                        } else {
                            watched / sessions.len() as f64
                        },
                        rows: SessionReconstructor::monthly_session_count(&sessions),
                    }
                }
                _ => ReportBody::Monthly {
                    rows: ViewingAggregator::monthly_view_count(records, profile),
                },
            }
        }
    };

    Ok(Report {
        view: view.name(),
        title: title_for(view, profile, &body),
        profile: profile.map(str::to_string),
        body,
        metadata: analysis.metadata.clone(),
    })
}

fn title_for(view: View, profile: Option<&str>, body: &ReportBody) -> String {
    let scope = profile_label(profile);
    match (view, body) {
        (View::Profiles, ReportBody::Hours { total_hours, .. }) => format!(
            "Total Duration for Each Profile (Total Duration for All Profiles: {} Hours)",
            format_hours(*total_hours)
        ),
        (View::Duration, _) => format!("Duration Frequency {scope}"),
        (View::Devices, _) => format!("Total Duration by Device {scope}"),
        (View::DeviceCategories, _) => format!("Total Duration by Device Category {scope}"),
        (View::Monthly, _) => format!("Viewing Frequency {scope}"),
        (View::MonthlyMatrix, _) => format!("Viewing Frequency by Month {scope}"),
        (View::Sessions, _) => format!("Viewing Sessions by Month {scope}"),
        (_, ReportBody::Hours { label, .. }) => format!("Total Duration by {label} {scope}"),
        _ => format!("Viewing History {scope}"),
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
