use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::config::PomodoroConfig;
use super::state::TimerState;

/// Persisted shape of a pomodoro session.
///
/// `started_at` is the effective start of the current phase: it is moved
/// forward on resume so that `phase_secs - (now - started_at)` always
/// yields the remaining time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionRecord {
    pub id: Uuid,
    pub user_id: String,
    pub study_session_id: Option<String>,
    pub state: TimerState,
    /// Duration of the current phase as it was entered, in seconds.
    pub phase_secs: u64,
    pub config: PomodoroConfig,
    pub current_cycle: u32,
    pub cycles_completed: u32,
    pub is_active: bool,
    pub started_at: Option<DateTime<Utc>>,
    pub paused_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
    pub updated_at: DateTime<Utc>,
}

impl SessionRecord {
    /// Remaining seconds as seen at `now`, clamped to `0..=phase_secs`.
    ///
    /// A paused record is frozen at `paused_at`.
    pub fn remaining_secs(&self, now: DateTime<Utc>) -> u64 {
        let reference = match self.state {
            TimerState::Paused(_) => self.paused_at.unwrap_or(now),
            _ => now,
        };
        let elapsed_secs = self
            .started_at
            .map(|start| (reference - start).num_milliseconds().max(0) as u64 / 1000)
            .unwrap_or(0);
        self.phase_secs.saturating_sub(elapsed_secs)
    }
}
