use serde::{Deserialize, Serialize};
use tracing::warn;

use super::state::Phase;
use crate::error::ValidationError;

/// Upper bound for any phase duration, in minutes.
pub const MAX_DURATION_MIN: u32 = 24 * 60;
/// Upper bound for the long-break interval.
pub const MAX_CYCLES_UNTIL_LONG_BREAK: u32 = 100;

/// Durations (minutes) and long-break interval for a pomodoro session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PomodoroConfig {
    pub focus_duration: u32,
    pub break_duration: u32,
    pub long_break_duration: u32,
    pub cycles_until_long_break: u32,
}

impl Default for PomodoroConfig {
    fn default() -> Self {
        Self {
            focus_duration: 25,
            break_duration: 5,
            long_break_duration: 15,
            cycles_until_long_break: 4,
        }
    }
}

impl PomodoroConfig {
    /// Build a config, rejecting zero values.
    ///
    /// Values above the upper bounds are clamped rather than rejected.
    pub fn new(
        focus_duration: u32,
        break_duration: u32,
        long_break_duration: u32,
        cycles_until_long_break: u32,
    ) -> Result<Self, ValidationError> {
        let fields = [
            ("focus_duration", focus_duration),
            ("break_duration", break_duration),
            ("long_break_duration", long_break_duration),
            ("cycles_until_long_break", cycles_until_long_break),
        ];
        for (field, value) in fields {
            if value == 0 {
                return Err(ValidationError::InvalidValue {
                    field: field.to_string(),
                    message: "must be at least 1".to_string(),
                });
            }
        }
        Ok(Self {
            focus_duration,
            break_duration,
            long_break_duration,
            cycles_until_long_break,
        }
        .sanitized())
    }

    /// Clamp every field into its valid range.
    pub fn sanitized(self) -> Self {
        Self {
            focus_duration: self.focus_duration.clamp(1, MAX_DURATION_MIN),
            break_duration: self.break_duration.clamp(1, MAX_DURATION_MIN),
            long_break_duration: self.long_break_duration.clamp(1, MAX_DURATION_MIN),
            cycles_until_long_break: self
                .cycles_until_long_break
                .clamp(1, MAX_CYCLES_UNTIL_LONG_BREAK),
        }
    }

    /// Duration of `phase` in seconds.
    pub fn phase_secs(&self, phase: Phase) -> u64 {
        let minutes = match phase {
            Phase::Focus => self.focus_duration,
            Phase::Break => self.break_duration,
            Phase::LongBreak => self.long_break_duration,
        };
        u64::from(minutes).saturating_mul(60)
    }

    /// Merge `patch` into this config. Returns true if anything changed.
    ///
    /// Fields below 1 are ignored with a warning; fields above the upper
    /// bound are clamped.
    pub fn apply(&mut self, patch: &ConfigPatch) -> bool {
        let before = *self;
        merge_field(
            &mut self.focus_duration,
            patch.focus_duration,
            "focus_duration",
            MAX_DURATION_MIN,
        );
        merge_field(
            &mut self.break_duration,
            patch.break_duration,
            "break_duration",
            MAX_DURATION_MIN,
        );
        merge_field(
            &mut self.long_break_duration,
            patch.long_break_duration,
            "long_break_duration",
            MAX_DURATION_MIN,
        );
        merge_field(
            &mut self.cycles_until_long_break,
            patch.cycles_until_long_break,
            "cycles_until_long_break",
            MAX_CYCLES_UNTIL_LONG_BREAK,
        );
        *self != before
    }
}

fn merge_field(slot: &mut u32, value: Option<i64>, field: &str, max: u32) {
    let Some(value) = value else { return };
    if value < 1 {
        warn!(field, value, "ignoring non-positive timer setting");
        return;
    }
    *slot = value.min(i64::from(max)) as u32;
}

/// Partial update for [`PomodoroConfig`].
///
/// Fields are signed so that out-of-range user input reaches the merge
/// and is ignored there instead of failing to parse.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfigPatch {
    #[serde(default)]
    pub focus_duration: Option<i64>,
    #[serde(default)]
    pub break_duration: Option<i64>,
    #[serde(default)]
    pub long_break_duration: Option<i64>,
    #[serde(default)]
    pub cycles_until_long_break: Option<i64>,
}

impl ConfigPatch {
    pub fn is_empty(&self) -> bool {
        self.focus_duration.is_none()
            && self.break_duration.is_none()
            && self.long_break_duration.is_none()
            && self.cycles_until_long_break.is_none()
    }
}

/// Which phase `start()` re-enters after a pause.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ResumePolicy {
    /// Always resume into focus. A paused break is abandoned: the next
    /// focus cycle begins with its full duration and `current_cycle`
    /// advances. The break's remaining time is discarded.
    #[default]
    AlwaysFocus,
    /// Resume into whichever phase was paused, with its remaining time.
    PriorPhase,
}

impl ResumePolicy {
    pub fn as_str(&self) -> &'static str {
        match self {
            ResumePolicy::AlwaysFocus => "always-focus",
            ResumePolicy::PriorPhase => "prior-phase",
        }
    }
}
