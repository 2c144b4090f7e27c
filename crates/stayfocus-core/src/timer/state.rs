use serde::{Deserialize, Serialize};

/// A phase that counts down.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Phase {
    Focus,
    Break,
    LongBreak,
}

impl Phase {
    pub fn as_str(&self) -> &'static str {
        match self {
            Phase::Focus => "focus",
            Phase::Break => "break",
            Phase::LongBreak => "long-break",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "focus" => Some(Phase::Focus),
            "break" => Some(Phase::Break),
            "long-break" => Some(Phase::LongBreak),
            _ => None,
        }
    }

    pub fn is_break(&self) -> bool {
        matches!(self, Phase::Break | Phase::LongBreak)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TimerState {
    Idle,
    Focus,
    Break,
    LongBreak,
    /// Suspended; remembers which phase it interrupted.
    Paused(Phase),
}

impl TimerState {
    /// The phase currently counting down, if any.
    pub fn running_phase(&self) -> Option<Phase> {
        match self {
            TimerState::Focus => Some(Phase::Focus),
            TimerState::Break => Some(Phase::Break),
            TimerState::LongBreak => Some(Phase::LongBreak),
            TimerState::Idle | TimerState::Paused(_) => None,
        }
    }

    /// The phase this state belongs to, running or paused.
    pub fn phase(&self) -> Option<Phase> {
        match self {
            TimerState::Paused(p) => Some(*p),
            other => other.running_phase(),
        }
    }

    pub fn is_running(&self) -> bool {
        self.running_phase().is_some()
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TimerState::Idle => "idle",
            TimerState::Focus => "focus",
            TimerState::Break => "break",
            TimerState::LongBreak => "long-break",
            TimerState::Paused(_) => "paused",
        }
    }

    /// Rebuild from the stored `phase` / `paused_from` column pair.
    pub fn from_parts(state: &str, paused_from: Option<&str>) -> Option<Self> {
        match state {
            "idle" => Some(TimerState::Idle),
            "paused" => paused_from.and_then(Phase::parse).map(TimerState::Paused),
            other => Phase::parse(other).map(TimerState::from),
        }
    }
}

impl From<Phase> for TimerState {
    fn from(phase: Phase) -> Self {
        match phase {
            Phase::Focus => TimerState::Focus,
            Phase::Break => TimerState::Break,
            Phase::LongBreak => TimerState::LongBreak,
        }
    }
}
