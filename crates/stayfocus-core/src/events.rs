use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::timer::{Phase, PomodoroConfig};

/// Every timer transition produces an Event.
/// The service turns them into persistence commands; UIs may log them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Event {
    /// A new session left idle and entered its first focus phase.
    SessionStarted {
        session_id: Uuid,
        duration_secs: u64,
        at: DateTime<Utc>,
    },
    TimerPaused {
        phase: Phase,
        time_left: u64,
        at: DateTime<Utc>,
    },
    /// `break_abandoned` is set when a paused break was resumed into focus.
    TimerResumed {
        from: Phase,
        into: Phase,
        time_left: u64,
        break_abandoned: bool,
        at: DateTime<Utc>,
    },
    /// A countdown reached zero and the next phase began.
    PhaseCompleted {
        completed: Phase,
        next: Phase,
        cycles_completed: u32,
        current_cycle: u32,
        duration_secs: u64,
        at: DateTime<Utc>,
    },
    TimerReset {
        session_id: Option<Uuid>,
        at: DateTime<Utc>,
    },
    ConfigAdjusted {
        config: PomodoroConfig,
        at: DateTime<Utc>,
    },
}

impl Event {
    pub fn at(&self) -> DateTime<Utc> {
        match self {
            Event::SessionStarted { at, .. }
            | Event::TimerPaused { at, .. }
            | Event::TimerResumed { at, .. }
            | Event::PhaseCompleted { at, .. }
            | Event::TimerReset { at, .. }
            | Event::ConfigAdjusted { at, .. } => *at,
        }
    }
}
