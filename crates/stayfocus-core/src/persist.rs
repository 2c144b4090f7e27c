//! Best-effort session persistence.
//!
//! The timer never talks to storage directly. Transitions are turned into
//! [`PersistCommand`]s and pushed onto an unbounded queue; a single worker
//! task owns the [`SessionStore`] and applies them in order. A failed write
//! is logged and dropped: in-memory state stays authoritative.

use std::sync::Mutex;

use chrono::{DateTime, Utc};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, error, warn};
use uuid::Uuid;

use crate::error::Result;
use crate::events::Event;
use crate::timer::{Phase, PomodoroTimer, SessionRecord};

/// Storage collaborator for pomodoro sessions.
pub trait SessionStore: Send {
    /// Most recent active, non-completed session for `user_id`.
    fn fetch_active(&self, user_id: &str) -> Result<Option<SessionRecord>>;

    /// Insert or replace the session row keyed by `record.id`.
    fn upsert(&mut self, record: &SessionRecord) -> Result<()>;

    /// Mark a session completed and inactive.
    fn complete(&mut self, session_id: Uuid, completed_at: DateTime<Utc>) -> Result<()>;

    /// Bump the cycle count of a linked study session.
    ///
    /// Returns `false` if no such study session exists.
    fn record_study_cycle(&mut self, study_session_id: &str) -> Result<bool>;
}

#[derive(Debug, Clone, PartialEq)]
pub enum PersistCommand {
    Upsert(SessionRecord),
    Complete {
        session_id: Uuid,
        completed_at: DateTime<Utc>,
    },
    RecordStudyCycle {
        study_session_id: String,
    },
}

/// Map a transition to the writes it requires.
///
/// `timer` is the state after the transition.
pub fn commands_for(event: &Event, timer: &PomodoroTimer, user_id: &str) -> Vec<PersistCommand> {
    let upsert = || {
        timer
            .to_record(user_id, event.at())
            .map(PersistCommand::Upsert)
    };
    match event {
        Event::SessionStarted { .. }
        | Event::TimerPaused { .. }
        | Event::TimerResumed { .. }
        | Event::ConfigAdjusted { .. } => upsert().into_iter().collect(),
        Event::PhaseCompleted { completed, .. } => {
            let mut commands: Vec<_> = upsert().into_iter().collect();
            if *completed == Phase::Focus {
                if let Some(study) = timer.study_session_id() {
                    commands.push(PersistCommand::RecordStudyCycle {
                        study_session_id: study.to_string(),
                    });
                }
            }
            commands
        }
        Event::TimerReset { session_id, at } => session_id
            .map(|session_id| PersistCommand::Complete {
                session_id,
                completed_at: *at,
            })
            .into_iter()
            .collect(),
    }
}

/// Sending half of the persistence queue.
///
/// `close` drops the sender even while other owners still hold the queue,
/// which lets the worker drain and exit.
#[derive(Debug)]
pub struct PersistQueue {
    tx: Mutex<Option<mpsc::UnboundedSender<PersistCommand>>>,
}

impl PersistQueue {
    pub fn send(&self, command: PersistCommand) {
        let guard = match self.tx.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        match guard.as_ref() {
            Some(tx) => {
                if tx.send(command).is_err() {
                    warn!("persistence worker has stopped; dropping write");
                }
            }
            None => debug!("persistence queue closed; dropping write"),
        }
    }

    pub fn close(&self) {
        let mut guard = match self.tx.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        guard.take();
    }
}

/// Spawn the worker that owns `store`. It hands the store back once the
/// queue is closed and drained.
///
/// Must be called from within a tokio runtime.
pub fn spawn_worker<S>(store: S) -> (PersistQueue, JoinHandle<S>)
where
    S: SessionStore + 'static,
{
    let (tx, rx) = mpsc::unbounded_channel();
    let handle = tokio::spawn(run_worker(store, rx));
    (
        PersistQueue {
            tx: Mutex::new(Some(tx)),
        },
        handle,
    )
}

async fn run_worker<S: SessionStore>(
    mut store: S,
    mut rx: mpsc::UnboundedReceiver<PersistCommand>,
) -> S {
    while let Some(command) = rx.recv().await {
        apply(&mut store, command);
    }
    debug!("persistence queue drained");
    store
}

fn apply<S: SessionStore>(store: &mut S, command: PersistCommand) {
    match command {
        PersistCommand::Upsert(record) => {
            if let Err(e) = store.upsert(&record) {
                warn!(session_id = %record.id, error = %e, "failed to persist session; timer continues");
            } else {
                debug!(session_id = %record.id, state = record.state.as_str(), "session persisted");
            }
        }
        PersistCommand::Complete {
            session_id,
            completed_at,
        } => {
            if let Err(e) = store.complete(session_id, completed_at) {
                error!(%session_id, error = %e, "failed to mark session completed");
            }
        }
        PersistCommand::RecordStudyCycle { study_session_id } => {
            match store.record_study_cycle(&study_session_id) {
                Ok(true) => debug!(%study_session_id, "study session cycle recorded"),
                Ok(false) => {
                    debug!(%study_session_id, "linked study session not found; skipping")
                }
                Err(e) => warn!(%study_session_id, error = %e, "failed to update study session"),
            }
        }
    }
}
