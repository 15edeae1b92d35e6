//! Viewing-session reconstruction.
//!
//! A session is a maximal run of records where each record starts no later
//! than `gap` after the running session's end.

use chrono::TimeDelta;
use tracing::debug;
use viewing_core::config::PipelineConfig;
use viewing_core::models::{MonthlyCount, NormalizedRecord, Session};

use crate::aggregator::ViewingAggregator;

// ── SessionReconstructor ──────────────────────────────────────────────────────

/// Groups normalized records into contiguous viewing sessions.
pub struct SessionReconstructor {
    /// Largest idle time that still continues a session.
    gap: TimeDelta,
}

impl SessionReconstructor {
    pub fn new(gap: TimeDelta) -> Self {
        Self { gap }
    }

    pub fn from_config(config: &PipelineConfig) -> Self {
        Self::new(config.session_gap)
    }

    pub fn gap(&self) -> TimeDelta {
        self.gap
    }

    // ── Public methods ────────────────────────────────────────────────────────

    /// Build sessions from `records`, optionally restricted to one profile.
    ///
    /// Input order does not matter; records are stably sorted by start time
    /// first. Every selected record lands in exactly one session, and sessions
    /// come back in ascending start order without overlapping.
    pub fn sessions(&self, records: &[NormalizedRecord], profile: Option<&str>) -> Vec<Session> {
        let mut selected: Vec<&NormalizedRecord> = records
            .iter()
            .filter(|r| profile.map_or(true, |p| r.profile_name == p))
            .collect();
        selected.sort_by_key(|r| r.start_time);

        let mut sessions: Vec<Session> = Vec::new();
        let mut current: Option<Session> = None;

        for record in selected {
            match current.as_mut() {
                Some(session) if self.continues(session, record) => {
                    session.end_time = session.end_time.max(record.end_time);
                    session.records.push(record.clone());
                }
                _ => sessions.extend(current.replace(Self::open(record))),
            }
        }
        sessions.extend(current);

        debug!(
            "SessionReconstructor: built {} sessions from {} records (gap {}m)",
            sessions.len(),
            sessions.iter().map(Session::len).sum::<usize>(),
            self.gap.num_minutes()
        );
        sessions
    }

    /// Count sessions per `YYYY-MM` of their start.
    pub fn monthly_session_count(sessions: &[Session]) -> Vec<MonthlyCount> {
        ViewingAggregator::count_by_month(sessions.iter().map(Session::month_key))
    }

    // ── Private helpers ───────────────────────────────────────────────────────

    fn continues(&self, session: &Session, record: &NormalizedRecord) -> bool {
        record.start_time - session.end_time <= self.gap
    }

    fn open(record: &NormalizedRecord) -> Session {
        Session {
            start_time: record.start_time,
            end_time: record.end_time,
            records: vec![record.clone()],
        }
    }
}

impl Default for SessionReconstructor {
    fn default() -> Self {
        Self::from_config(&PipelineConfig::default())
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
