//! # StayFocus Core Library
//!
//! This library provides the pomodoro session timer behind StayFocus. The
//! timer is framework-free: a UI drives it through a handful of commands and
//! observes it through a `watch` channel, while persistence happens in the
//! background and never blocks a transition.
//!
//! ## Architecture
//!
//! - **Timer Engine**: a plain state machine with an explicit `tick(dt)`
//! - **Service**: owns the tick task and the persistence worker
//! - **Persistence**: a `SessionStore` trait fed through a command queue
//! - **Storage**: SQLite session storage and TOML-based configuration
//!
//! ## Key Components
//!
//! - [`PomodoroTimer`]: Core timer state machine
//! - [`TimerService`]: Tick/persistence driver for UIs
//! - [`Database`]: SQLite-backed [`SessionStore`]
//! - [`Config`]: Application configuration management

pub mod error;
pub mod events;
pub mod persist;
pub mod service;
pub mod storage;
pub mod timer;

pub use error::{ConfigError, CoreError, DatabaseError, ValidationError};
pub use events::Event;
pub use persist::{PersistCommand, SessionStore};
pub use service::{ServiceOptions, TimerService};
pub use storage::{Config, Database, MemorySessionStore};
pub use timer::{
    format_time, ConfigPatch, Phase, PomodoroConfig, PomodoroTimer, ResumePolicy, SessionRecord,
    TimerState, TimerView,
};
