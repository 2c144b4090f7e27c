//! Pomodoro state machine.
//!
//! The engine is a plain value: it owns no clock and no thread. The caller
//! drives countdown with `tick(dt_secs)` and applies transitions through the
//! command methods. Every command returns the [`Event`] it produced, or
//! `None` when it was a no-op in the current state.
//!
//! ## State Transitions
//!
//! ```text
//! Idle --start--> Focus --0--> Break | LongBreak --0--> Focus ...
//! Focus | Break | LongBreak --pause--> Paused(phase) --start--> (see ResumePolicy)
//! any --reset--> Idle
//! ```
//!
//! Commands come in two flavours: `start()` uses the current wall clock,
//! `start_at(now)` takes it explicitly so tests and recovery stay
//! deterministic.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};
use uuid::Uuid;

use super::config::{ConfigPatch, PomodoroConfig, ResumePolicy};
use super::format::format_time;
use super::record::SessionRecord;
use super::state::{Phase, TimerState};
use crate::events::Event;

/// Read-only view handed to UI observers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimerView {
    pub state: TimerState,
    pub time_left: u64,
    pub formatted: String,
    pub current_cycle: u32,
    pub cycles_completed: u32,
    pub config: PomodoroConfig,
    pub is_active: bool,
    pub session_id: Option<Uuid>,
    pub study_session_id: Option<String>,
}

#[derive(Debug, Clone)]
pub struct PomodoroTimer {
    config: PomodoroConfig,
    resume_policy: ResumePolicy,
    state: TimerState,
    /// Remaining whole seconds in the current phase.
    time_left: u64,
    /// Duration of the current phase as entered.
    phase_secs: u64,
    current_cycle: u32,
    cycles_completed: u32,
    session_id: Option<Uuid>,
    study_session_id: Option<String>,
    started_at: Option<DateTime<Utc>>,
    paused_at: Option<DateTime<Utc>>,
    completed_at: Option<DateTime<Utc>>,
}

impl PomodoroTimer {
    /// Create an idle timer with `config`.
    pub fn new(config: PomodoroConfig) -> Self {
        let config = config.sanitized();
        let focus_secs = config.phase_secs(Phase::Focus);
        Self {
            config,
            resume_policy: ResumePolicy::default(),
            state: TimerState::Idle,
            time_left: focus_secs,
            phase_secs: focus_secs,
            current_cycle: 1,
            cycles_completed: 0,
            session_id: None,
            study_session_id: None,
            started_at: None,
            paused_at: None,
            completed_at: None,
        }
    }

    pub fn with_resume_policy(mut self, policy: ResumePolicy) -> Self {
        self.resume_policy = policy;
        self
    }

    /// Rebuild a timer from a persisted record.
    ///
    /// Remaining time is recomputed from the record's timestamps as seen at
    /// `now`. An expired phase comes back with `time_left == 0`; the next
    /// `tick` completes it.
    pub fn restore(record: &SessionRecord, now: DateTime<Utc>) -> Self {
        let config = record.config.sanitized();
        let mut timer = Self::new(config);
        if record.state == TimerState::Idle {
            return timer;
        }

        timer.state = record.state;
        timer.phase_secs = record.phase_secs;
        timer.time_left = record.remaining_secs(now);
        timer.current_cycle = record.current_cycle.max(1);
        timer.cycles_completed = record.cycles_completed;
        timer.session_id = Some(record.id);
        timer.study_session_id = record.study_session_id.clone();
        timer.started_at = record.started_at;
        timer.paused_at = record.paused_at;
        timer.completed_at = record.completed_at;

        info!(
            session_id = %record.id,
            state = timer.state.as_str(),
            time_left = timer.time_left,
            "restored pomodoro session"
        );
        timer
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn state(&self) -> TimerState {
        self.state
    }

    pub fn time_left(&self) -> u64 {
        self.time_left
    }

    pub fn phase_secs(&self) -> u64 {
        self.phase_secs
    }

    pub fn current_cycle(&self) -> u32 {
        self.current_cycle
    }

    pub fn cycles_completed(&self) -> u32 {
        self.cycles_completed
    }

    pub fn config(&self) -> &PomodoroConfig {
        &self.config
    }

    pub fn resume_policy(&self) -> ResumePolicy {
        self.resume_policy
    }

    /// True while a phase is counting down.
    pub fn is_active(&self) -> bool {
        self.state.is_running()
    }

    pub fn session_id(&self) -> Option<Uuid> {
        self.session_id
    }

    pub fn study_session_id(&self) -> Option<&str> {
        self.study_session_id.as_deref()
    }

    pub fn started_at(&self) -> Option<DateTime<Utc>> {
        self.started_at
    }

    pub fn paused_at(&self) -> Option<DateTime<Utc>> {
        self.paused_at
    }

    pub fn completed_at(&self) -> Option<DateTime<Utc>> {
        self.completed_at
    }

    pub fn view(&self) -> TimerView {
        TimerView {
            state: self.state,
            time_left: self.time_left,
            formatted: format_time(self.time_left),
            current_cycle: self.current_cycle,
            cycles_completed: self.cycles_completed,
            config: self.config,
            is_active: self.is_active(),
            session_id: self.session_id,
            study_session_id: self.study_session_id.clone(),
        }
    }

    /// Persistable snapshot of the current session, if one exists.
    pub fn to_record(&self, user_id: &str, now: DateTime<Utc>) -> Option<SessionRecord> {
        let id = self.session_id?;
        Some(SessionRecord {
            id,
            user_id: user_id.to_string(),
            study_session_id: self.study_session_id.clone(),
            state: self.state,
            phase_secs: self.phase_secs,
            config: self.config,
            current_cycle: self.current_cycle,
            cycles_completed: self.cycles_completed,
            is_active: self.state != TimerState::Idle,
            started_at: self.started_at,
            paused_at: self.paused_at,
            completed_at: self.completed_at,
            updated_at: now,
        })
    }

    // ── Commands ─────────────────────────────────────────────────────

    pub fn start(&mut self) -> Option<Event> {
        self.start_at(Utc::now())
    }

    pub fn start_at(&mut self, now: DateTime<Utc>) -> Option<Event> {
        match self.state {
            TimerState::Idle => {
                let session_id = Uuid::new_v4();
                self.session_id = Some(session_id);
                self.current_cycle = 1;
                self.cycles_completed = 0;
                self.paused_at = None;
                self.completed_at = None;
                self.enter(Phase::Focus, now);
                info!(%session_id, duration_secs = self.time_left, "pomodoro session started");
                Some(Event::SessionStarted {
                    session_id,
                    duration_secs: self.time_left,
                    at: now,
                })
            }
            TimerState::Paused(from) => Some(self.resume(from, now)),
            // Already counting down.
            TimerState::Focus | TimerState::Break | TimerState::LongBreak => None,
        }
    }

    pub fn pause(&mut self) -> Option<Event> {
        self.pause_at(Utc::now())
    }

    pub fn pause_at(&mut self, now: DateTime<Utc>) -> Option<Event> {
        let phase = self.state.running_phase()?;
        self.state = TimerState::Paused(phase);
        self.paused_at = Some(now);
        self.rebase_start(now);
        info!(phase = phase.as_str(), time_left = self.time_left, "timer paused");
        Some(Event::TimerPaused {
            phase,
            time_left: self.time_left,
            at: now,
        })
    }

    pub fn reset(&mut self) -> Option<Event> {
        self.reset_at(Utc::now())
    }

    /// Return to idle from any state. The session, if any, is marked completed.
    pub fn reset_at(&mut self, now: DateTime<Utc>) -> Option<Event> {
        let session_id = self.session_id.take();
        self.state = TimerState::Idle;
        self.phase_secs = self.config.phase_secs(Phase::Focus);
        self.time_left = self.phase_secs;
        self.current_cycle = 1;
        self.cycles_completed = 0;
        self.started_at = None;
        self.paused_at = None;
        self.completed_at = session_id.map(|_| now);
        self.study_session_id = None;
        if let Some(id) = session_id {
            info!(session_id = %id, "pomodoro session reset");
        }
        Some(Event::TimerReset {
            session_id,
            at: now,
        })
    }

    /// Link the session to an external study-session record.
    pub fn link_study_session(&mut self, study_session_id: Option<String>) {
        self.study_session_id = study_session_id;
    }

    pub fn adjust_config(&mut self, patch: &ConfigPatch) -> Option<Event> {
        self.adjust_config_at(patch, Utc::now())
    }

    /// Merge `patch` into the config.
    ///
    /// The running countdown is never touched; new durations apply from the
    /// next phase. While idle the displayed time follows the new focus
    /// duration.
    pub fn adjust_config_at(&mut self, patch: &ConfigPatch, now: DateTime<Utc>) -> Option<Event> {
        if !self.config.apply(patch) {
            return None;
        }
        if self.state == TimerState::Idle {
            self.phase_secs = self.config.phase_secs(Phase::Focus);
            self.time_left = self.phase_secs;
        }
        debug!(config = ?self.config, "timer config adjusted");
        Some(Event::ConfigAdjusted {
            config: self.config,
            at: now,
        })
    }

    pub fn tick(&mut self, dt_secs: u64) -> Option<Event> {
        self.tick_at(dt_secs, Utc::now())
    }

    /// Count down by `dt_secs`. Returns `Some(Event::PhaseCompleted)` when
    /// the phase reached zero and the next one began.
    ///
    /// Overshoot is discarded: at most one transition per call.
    pub fn tick_at(&mut self, dt_secs: u64, now: DateTime<Utc>) -> Option<Event> {
        let phase = self.state.running_phase()?;
        self.time_left = self.time_left.saturating_sub(dt_secs);
        if self.time_left > 0 {
            return None;
        }
        Some(self.complete(phase, now))
    }

    // ── Internal ─────────────────────────────────────────────────────

    fn enter(&mut self, phase: Phase, now: DateTime<Utc>) {
        self.state = phase.into();
        self.phase_secs = self.config.phase_secs(phase);
        self.time_left = self.phase_secs;
        self.started_at = Some(now);
    }

    /// Align `started_at` with the countdown as seen at `reference`.
    fn rebase_start(&mut self, reference: DateTime<Utc>) {
        let elapsed = self.phase_secs.saturating_sub(self.time_left);
        self.started_at = Some(reference - Duration::seconds(elapsed as i64));
    }

    fn complete(&mut self, phase: Phase, now: DateTime<Utc>) -> Event {
        let next = match phase {
            Phase::Focus => {
                self.cycles_completed += 1;
                if self.cycles_completed % self.config.cycles_until_long_break.max(1) == 0 {
                    Phase::LongBreak
                } else {
                    Phase::Break
                }
            }
            Phase::Break | Phase::LongBreak => {
                self.current_cycle += 1;
                Phase::Focus
            }
        };
        self.enter(next, now);
        info!(
            completed = phase.as_str(),
            next = next.as_str(),
            cycles_completed = self.cycles_completed,
            "phase completed"
        );
        Event::PhaseCompleted {
            completed: phase,
            next,
            cycles_completed: self.cycles_completed,
            current_cycle: self.current_cycle,
            duration_secs: self.time_left,
            at: now,
        }
    }

    /// Leave `Paused(from)`. Under [`ResumePolicy::AlwaysFocus`] a paused
    /// break is abandoned rather than resumed, so `time_left` and
    /// `current_cycle` move on to the next focus cycle.
    fn resume(&mut self, from: Phase, now: DateTime<Utc>) -> Event {
        let into = match self.resume_policy {
            ResumePolicy::AlwaysFocus => Phase::Focus,
            ResumePolicy::PriorPhase => from,
        };
        let break_abandoned = from.is_break() && into == Phase::Focus;
        self.paused_at = None;

        if break_abandoned {
            warn!(
                paused = from.as_str(),
                time_left = self.time_left,
                "resuming into focus; remainder of paused break abandoned"
            );
            self.current_cycle += 1;
            self.enter(Phase::Focus, now);
        } else {
            self.state = into.into();
            // Shift the phase start so the record's wall-clock math skips the pause.
            self.rebase_start(now);
            info!(phase = into.as_str(), time_left = self.time_left, "timer resumed");
        }

        Event::TimerResumed {
            from,
            into,
            time_left: self.time_left,
            break_abandoned,
            at: now,
        }
    }
}

impl Default for PomodoroTimer {
    fn default() -> Self {
        Self::new(PomodoroConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn t0() -> DateTime<Utc> {
        DateTime::parse_from_rfc3339("2026-03-02T09:00:00Z")
            .unwrap()
            .with_timezone(&Utc)
    }

    /// Drive the current phase to zero with one oversized tick.
    fn finish_phase(timer: &mut PomodoroTimer) -> Option<Event> {
        let left = timer.time_left();
        timer.tick_at(left, t0())
    }

    #[test]
    fn new_timer_is_idle_with_focus_time() {
        let timer = PomodoroTimer::default();
        assert_eq!(timer.state(), TimerState::Idle);
        assert_eq!(timer.time_left(), 1500);
        assert_eq!(timer.current_cycle(), 1);
        assert_eq!(timer.cycles_completed(), 0);
        assert!(!timer.is_active());
    }

    #[test]
    fn start_enters_focus() {
        let mut timer = PomodoroTimer::default();
        let event = timer.start_at(t0()).unwrap();
        assert!(matches!(event, Event::SessionStarted { duration_secs: 1500, .. }));
        assert_eq!(timer.state(), TimerState::Focus);
        assert_eq!(timer.started_at(), Some(t0()));
        assert!(timer.session_id().is_some());
        assert!(timer.is_active());
    }

    #[test]
    fn start_while_running_is_noop() {
        let mut timer = PomodoroTimer::default();
        timer.start_at(t0());
        let id = timer.session_id();
        assert!(timer.start_at(t0()).is_none());
        assert_eq!(timer.session_id(), id);
    }

    #[test]
    fn pause_outside_active_phase_is_noop() {
        let mut timer = PomodoroTimer::default();
        assert!(timer.pause_at(t0()).is_none());
        timer.start_at(t0());
        timer.pause_at(t0());
        assert!(timer.pause_at(t0()).is_none());
    }

    #[test]
    fn pause_then_start_resumes_focus_unchanged() {
        let mut timer = PomodoroTimer::default();
        timer.start_at(t0());
        timer.tick_at(300, t0());
        assert_eq!(timer.time_left(), 1200);

        timer.pause_at(t0());
        assert_eq!(timer.state(), TimerState::Paused(Phase::Focus));
        // Ticks are ignored while paused.
        assert!(timer.tick_at(60, t0()).is_none());
        assert_eq!(timer.time_left(), 1200);

        let event = timer.start_at(t0() + Duration::minutes(10)).unwrap();
        assert!(matches!(
            event,
            Event::TimerResumed { from: Phase::Focus, into: Phase::Focus, break_abandoned: false, .. }
        ));
        assert_eq!(timer.state(), TimerState::Focus);
        assert_eq!(timer.time_left(), 1200);
        assert!(timer.paused_at().is_none());
    }

    #[test]
    fn resume_rebases_phase_start() {
        let mut timer = PomodoroTimer::default();
        timer.start_at(t0());
        timer.tick_at(300, t0());
        timer.pause_at(t0());
        let resumed = t0() + Duration::hours(2);
        timer.start_at(resumed);
        assert_eq!(timer.started_at(), Some(resumed - Duration::seconds(300)));
    }

    #[test]
    fn paused_break_is_abandoned_by_default() {
        let mut timer = PomodoroTimer::default();
        timer.start_at(t0());
        finish_phase(&mut timer);
        assert_eq!(timer.state(), TimerState::Break);
        timer.tick_at(100, t0());
        timer.pause_at(t0());
        assert_eq!(timer.time_left(), 200);
        assert_eq!(timer.current_cycle(), 1);

        let event = timer.start_at(t0()).unwrap();
        assert!(matches!(
            event,
            Event::TimerResumed { from: Phase::Break, into: Phase::Focus, break_abandoned: true, .. }
        ));
        assert_eq!(timer.state(), TimerState::Focus);
        assert_eq!(timer.time_left(), 1500);
        assert_eq!(timer.current_cycle(), 2);
        assert_eq!(timer.cycles_completed(), 1);
    }

    #[test]
    fn prior_phase_policy_resumes_break() {
        let mut timer =
            PomodoroTimer::default().with_resume_policy(ResumePolicy::PriorPhase);
        timer.start_at(t0());
        finish_phase(&mut timer);
        timer.tick_at(100, t0());
        timer.pause_at(t0());

        timer.start_at(t0());
        assert_eq!(timer.state(), TimerState::Break);
        assert_eq!(timer.time_left(), 200);
        assert_eq!(timer.current_cycle(), 1);
    }

    #[test]
    fn focus_completion_enters_break() {
        let mut timer = PomodoroTimer::default();
        timer.start_at(t0());
        let event = finish_phase(&mut timer).unwrap();
        assert!(matches!(
            event,
            Event::PhaseCompleted { completed: Phase::Focus, next: Phase::Break, cycles_completed: 1, .. }
        ));
        assert_eq!(timer.time_left(), 300);
    }

    #[test]
    fn break_completion_advances_cycle() {
        let mut timer = PomodoroTimer::default();
        timer.start_at(t0());
        finish_phase(&mut timer);
        finish_phase(&mut timer);
        assert_eq!(timer.state(), TimerState::Focus);
        assert_eq!(timer.current_cycle(), 2);
        assert_eq!(timer.time_left(), 1500);
    }

    #[test]
    fn fourth_focus_completion_is_long_break() {
        let mut timer = PomodoroTimer::new(PomodoroConfig::new(25, 5, 15, 4).unwrap());
        timer.start_at(t0());
        for cycle in 1..=4 {
            finish_phase(&mut timer);
            if cycle < 4 {
                assert_eq!(timer.state(), TimerState::Break);
                finish_phase(&mut timer);
            }
        }
        assert_eq!(timer.state(), TimerState::LongBreak);
        assert_eq!(timer.time_left(), 900);
        assert_eq!(timer.cycles_completed(), 4);
    }

    #[test]
    fn tick_by_one_second_fires_once_at_zero() {
        let mut timer = PomodoroTimer::new(PomodoroConfig::new(1, 1, 1, 4).unwrap());
        timer.start_at(t0());
        let mut completions = 0;
        for _ in 0..60 {
            if timer.tick_at(1, t0()).is_some() {
                completions += 1;
            }
        }
        assert_eq!(completions, 1);
        assert_eq!(timer.state(), TimerState::Break);
        assert_eq!(timer.time_left(), 60);
    }

    #[test]
    fn tick_zero_completes_expired_phase() {
        let mut timer = PomodoroTimer::default();
        timer.start_at(t0());
        timer.tick_at(1499, t0());
        assert!(timer.tick_at(0, t0()).is_none());
        timer.tick_at(1, t0());
        assert_eq!(timer.state(), TimerState::Break);
    }

    #[test]
    fn reset_from_any_state_returns_to_idle() {
        let mut timer = PomodoroTimer::default();
        timer.start_at(t0());
        finish_phase(&mut timer);
        finish_phase(&mut timer);
        timer.pause_at(t0());

        let event = timer.reset_at(t0()).unwrap();
        assert!(matches!(event, Event::TimerReset { session_id: Some(_), .. }));
        assert_eq!(timer.state(), TimerState::Idle);
        assert_eq!(timer.cycles_completed(), 0);
        assert_eq!(timer.current_cycle(), 1);
        assert_eq!(timer.time_left(), 1500);
        assert_eq!(timer.completed_at(), Some(t0()));
        assert!(timer.session_id().is_none());
    }

    #[test]
    fn reset_during_break_returns_to_idle() {
        let mut timer = PomodoroTimer::default();
        timer.start_at(t0());
        finish_phase(&mut timer);
        timer.tick_at(10, t0());
        assert_eq!(timer.state(), TimerState::Break);

        timer.reset_at(t0()).unwrap();
        assert_eq!(timer.state(), TimerState::Idle);
        assert_eq!(timer.time_left(), 1500);
        assert_eq!(timer.cycles_completed(), 0);
        assert_eq!(timer.current_cycle(), 1);
    }

    #[test]
    fn reset_during_long_break_returns_to_idle() {
        let mut timer = PomodoroTimer::new(PomodoroConfig::new(25, 5, 15, 1).unwrap());
        timer.start_at(t0());
        finish_phase(&mut timer);
        assert_eq!(timer.state(), TimerState::LongBreak);

        let event = timer.reset_at(t0()).unwrap();
        assert!(matches!(event, Event::TimerReset { session_id: Some(_), .. }));
        assert_eq!(timer.state(), TimerState::Idle);
        assert_eq!(timer.time_left(), 1500);
        assert_eq!(timer.cycles_completed(), 0);
        assert_eq!(timer.current_cycle(), 1);
    }

    #[test]
    fn reset_when_idle_has_no_session() {
        let mut timer = PomodoroTimer::default();
        let event = timer.reset_at(t0()).unwrap();
        assert!(matches!(event, Event::TimerReset { session_id: None, .. }));
        assert!(timer.completed_at().is_none());
    }

    #[test]
    fn adjust_config_while_idle_updates_time_left() {
        let mut timer = PomodoroTimer::default();
        let patch = ConfigPatch {
            focus_duration: Some(50),
            ..Default::default()
        };
        assert!(timer.adjust_config_at(&patch, t0()).is_some());
        assert_eq!(timer.time_left(), 3000);
    }

    #[test]
    fn adjust_config_while_focused_keeps_countdown() {
        let mut timer = PomodoroTimer::default();
        timer.start_at(t0());
        timer.tick_at(100, t0());
        let patch = ConfigPatch {
            focus_duration: Some(10),
            break_duration: Some(2),
            ..Default::default()
        };
        timer.adjust_config_at(&patch, t0());
        assert_eq!(timer.time_left(), 1400);
        assert_eq!(timer.phase_secs(), 1500);

        finish_phase(&mut timer);
        assert_eq!(timer.time_left(), 120);
    }

    #[test]
    fn adjust_config_with_invalid_values_is_noop() {
        let mut timer = PomodoroTimer::default();
        let patch = ConfigPatch {
            focus_duration: Some(0),
            ..Default::default()
        };
        assert!(timer.adjust_config_at(&patch, t0()).is_none());
        assert_eq!(timer.time_left(), 1500);
    }

    #[test]
    fn record_roundtrip_reconstructs_time_left() {
        let mut timer = PomodoroTimer::default();
        timer.start_at(t0());
        timer.tick_at(600, t0() + Duration::seconds(600));
        let saved_at = t0() + Duration::seconds(600);
        let record = timer.to_record("user-1", saved_at).unwrap();

        // Ten more seconds pass while the process is gone.
        let restored = PomodoroTimer::restore(&record, saved_at + Duration::seconds(10));
        assert_eq!(restored.state(), TimerState::Focus);
        assert_eq!(restored.session_id(), timer.session_id());
        assert!(restored.time_left().abs_diff(timer.time_left() - 10) <= 1);
    }

    #[test]
    fn restore_paused_record_keeps_remaining() {
        let mut timer = PomodoroTimer::default();
        timer.start_at(t0());
        timer.tick_at(200, t0());
        timer.pause_at(t0() + Duration::seconds(200));
        let record = timer.to_record("user-1", t0()).unwrap();

        let restored = PomodoroTimer::restore(&record, t0() + Duration::days(1));
        assert_eq!(restored.state(), TimerState::Paused(Phase::Focus));
        assert_eq!(restored.time_left(), 1300);
    }

    #[test]
    fn to_record_requires_session() {
        let timer = PomodoroTimer::default();
        assert!(timer.to_record("user-1", t0()).is_none());
    }

    proptest! {
        #[test]
        fn start_sets_full_focus(focus in 1u32..=240, brk in 1u32..=60, long in 1u32..=90, cycles in 1u32..=8) {
            let mut timer = PomodoroTimer::new(PomodoroConfig::new(focus, brk, long, cycles).unwrap());
            timer.start_at(t0());
            prop_assert_eq!(timer.time_left(), u64::from(focus) * 60);
        }

        #[test]
        fn long_break_iff_multiple(n in 1u32..=24, cycles in 1u32..=6) {
            let mut timer = PomodoroTimer::new(PomodoroConfig::new(25, 5, 15, cycles).unwrap());
            timer.start_at(t0());
            for i in 1..=n {
                finish_phase(&mut timer);
                if i < n {
                    finish_phase(&mut timer);
                }
            }
            prop_assert_eq!(timer.cycles_completed(), n);
            let expected = if n % cycles == 0 { TimerState::LongBreak } else { TimerState::Break };
            prop_assert_eq!(timer.state(), expected);
        }

        #[test]
        fn reset_after_any_commands_is_idle(
            commands in proptest::collection::vec((0u8..3, 0u64..2000), 0..30),
            cycles in 1u32..=4,
        ) {
            let mut timer = PomodoroTimer::new(PomodoroConfig::new(25, 5, 15, cycles).unwrap());
            for (command, dt) in commands {
                match command {
                    0 => { timer.start_at(t0()); }
                    1 => { timer.pause_at(t0()); }
                    _ => { timer.tick_at(dt, t0()); }
                }
            }
            timer.reset_at(t0());
            prop_assert_eq!(timer.state(), TimerState::Idle);
            prop_assert_eq!(timer.time_left(), 1500);
            prop_assert_eq!(timer.cycles_completed(), 0);
            prop_assert_eq!(timer.current_cycle(), 1);
            prop_assert!(timer.session_id().is_none());
        }

        #[test]
        fn ticks_stay_within_phase(steps in proptest::collection::vec(0u64..2000, 1..40)) {
            let mut timer = PomodoroTimer::default();
            timer.start_at(t0());
            for dt in steps {
                timer.tick_at(dt, t0());
                prop_assert!(timer.time_left() <= timer.phase_secs());
                prop_assert!(timer.time_left() > 0);
            }
        }
    }
}
