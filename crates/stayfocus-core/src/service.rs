//! Async driver around [`PomodoroTimer`].
//!
//! `TimerService` owns three things:
//! - the timer itself, behind a mutex that is never held across an await,
//! - at most one tick task, armed when a phase starts counting down and
//!   aborted on pause or reset,
//! - the persistence worker, fed through [`PersistQueue`].
//!
//! Observers subscribe to a `watch` channel of [`TimerView`]s.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use chrono::Utc;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};
use tracing::{debug, info, warn};

use crate::error::{CoreError, Result};
use crate::events::Event;
use crate::persist::{commands_for, spawn_worker, PersistCommand, PersistQueue, SessionStore};
use crate::timer::{ConfigPatch, PomodoroConfig, PomodoroTimer, ResumePolicy, TimerView};

/// Countdown granularity.
pub const TICK: Duration = Duration::from_secs(1);

#[derive(Debug, Clone)]
pub struct ServiceOptions {
    pub user_id: String,
    /// Durations for a fresh session; a recovered session keeps its own.
    pub config: PomodoroConfig,
    pub resume_policy: ResumePolicy,
}

impl Default for ServiceOptions {
    fn default() -> Self {
        Self {
            user_id: "local".into(),
            config: PomodoroConfig::default(),
            resume_policy: ResumePolicy::default(),
        }
    }
}

struct Shared {
    timer: Mutex<PomodoroTimer>,
    user_id: String,
    queue: PersistQueue,
    view_tx: watch::Sender<TimerView>,
    /// Bumped whenever a tick task is armed or cancelled. A task only
    /// ticks while it holds the current generation.
    generation: AtomicU64,
}

impl Shared {
    fn lock(&self) -> MutexGuard<'_, PomodoroTimer> {
        match self.timer.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    /// Publish the view and queue writes for `event`.
    fn dispatch(&self, timer: &PomodoroTimer, event: Option<&Event>) {
        if let Some(event) = event {
            for command in commands_for(event, timer, &self.user_id) {
                self.queue.send(command);
            }
        }
        self.view_tx.send_replace(timer.view());
    }

    fn next_generation(&self) -> u64 {
        self.generation.fetch_add(1, Ordering::SeqCst) + 1
    }

    /// One countdown step. Returns false once the timer stopped running
    /// or the calling task was superseded.
    fn tick(&self, generation: u64) -> bool {
        let mut timer = self.lock();
        // An aborted task can still be parked on the lock.
        if self.generation.load(Ordering::SeqCst) != generation || !timer.is_active() {
            return false;
        }
        let event = timer.tick(TICK.as_secs());
        if event.is_none() {
            debug!(time_left = timer.time_left(), "tick");
        }
        self.dispatch(&timer, event.as_ref());
        true
    }
}

pub struct TimerService<S: SessionStore + 'static> {
    shared: Arc<Shared>,
    ticker: Option<JoinHandle<()>>,
    worker: Option<JoinHandle<S>>,
}

impl<S: SessionStore + 'static> TimerService<S> {
    /// Recover the user's active session from `store` (or start idle) and
    /// spawn the persistence worker.
    ///
    /// Must be called from within a tokio runtime. A recovered phase that
    /// expired while nobody was running is completed immediately.
    pub fn new(store: S, options: ServiceOptions) -> Self {
        let now = Utc::now();
        let recovered = match store.fetch_active(&options.user_id) {
            Ok(record) => record,
            Err(e) => {
                warn!(error = %e, "could not load active session; starting fresh");
                None
            }
        };

        let mut timer = match &recovered {
            Some(record) => PomodoroTimer::restore(record, now),
            None => PomodoroTimer::new(options.config),
        }
        .with_resume_policy(options.resume_policy);
        let settled = timer.tick_at(0, now);

        let (queue, worker) = spawn_worker(store);
        let (view_tx, _) = watch::channel(timer.view());
        let shared = Arc::new(Shared {
            timer: Mutex::new(timer),
            user_id: options.user_id,
            queue,
            view_tx,
            generation: AtomicU64::new(0),
        });

        if let Some(event) = settled {
            info!("recovered phase had already expired");
            let timer = shared.lock();
            shared.dispatch(&timer, Some(&event));
        }

        let mut service = Self {
            shared,
            ticker: None,
            worker: Some(worker),
        };
        service.sync_ticker();
        service
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn view(&self) -> TimerView {
        self.shared.lock().view()
    }

    pub fn subscribe(&self) -> watch::Receiver<TimerView> {
        self.shared.view_tx.subscribe()
    }

    /// True while the tick task is armed.
    pub fn is_ticking(&self) -> bool {
        self.ticker.as_ref().is_some_and(|t| !t.is_finished())
    }

    // ── Commands ─────────────────────────────────────────────────────

    pub fn start(&mut self) -> Option<Event> {
        self.apply(|timer| timer.start())
    }

    pub fn pause(&mut self) -> Option<Event> {
        self.apply(|timer| timer.pause())
    }

    pub fn reset(&mut self) -> Option<Event> {
        self.apply(|timer| timer.reset())
    }

    pub fn adjust_config(&mut self, patch: &ConfigPatch) -> Option<Event> {
        self.apply(|timer| timer.adjust_config(patch))
    }

    /// Link (or unlink) the current session to a study session.
    pub fn link_study_session(&mut self, study_session_id: Option<String>) {
        let mut timer = self.shared.lock();
        timer.link_study_session(study_session_id);
        let upsert = timer
            .to_record(&self.shared.user_id, Utc::now())
            .map(PersistCommand::Upsert);
        if let Some(command) = upsert {
            self.shared.queue.send(command);
        }
        self.shared.view_tx.send_replace(timer.view());
    }

    /// Stop ticking, flush pending writes and hand the store back.
    pub async fn shutdown(mut self) -> Result<S> {
        if let Some(ticker) = self.ticker.take() {
            self.shared.next_generation();
            ticker.abort();
            let _ = ticker.await;
        }
        self.shared.queue.close();
        let worker = self
            .worker
            .take()
            .ok_or_else(|| CoreError::Custom("persistence worker already joined".into()))?;
        worker
            .await
            .map_err(|e| CoreError::Custom(format!("persistence worker failed: {e}")))
    }

    // ── Internal ─────────────────────────────────────────────────────

    fn apply<F>(&mut self, command: F) -> Option<Event>
    where
        F: FnOnce(&mut PomodoroTimer) -> Option<Event>,
    {
        let event = {
            let mut timer = self.shared.lock();
            let event = command(&mut timer);
            if event.is_some() {
                self.shared.dispatch(&timer, event.as_ref());
            }
            event
        };
        self.sync_ticker();
        event
    }

    /// Arm or cancel the tick task to match the timer state.
    fn sync_ticker(&mut self) {
        let running = self.shared.lock().is_active();
        match (running, self.is_ticking()) {
            (true, false) => self.arm(),
            (false, _) => {
                if let Some(ticker) = self.ticker.take() {
                    self.shared.next_generation();
                    ticker.abort();
                    debug!("tick task cancelled");
                }
            }
            (true, true) => {}
        }
    }

    fn arm(&mut self) {
        let shared = Arc::clone(&self.shared);
        let generation = shared.next_generation();
        self.ticker = Some(tokio::spawn(async move {
            let mut interval = tokio::time::interval_at(Instant::now() + TICK, TICK);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                interval.tick().await;
                if !shared.tick(generation) {
                    break;
                }
            }
        }));
        debug!("tick task armed");
    }
}

impl<S: SessionStore + 'static> Drop for TimerService<S> {
    fn drop(&mut self) {
        if let Some(ticker) = self.ticker.take() {
            self.shared.next_generation();
            ticker.abort();
        }
        self.shared.queue.close();
    }
}
