mod config;
mod engine;
mod format;
mod record;
mod state;

pub use config::{
    ConfigPatch, PomodoroConfig, ResumePolicy, MAX_CYCLES_UNTIL_LONG_BREAK, MAX_DURATION_MIN,
};
pub use engine::{PomodoroTimer, TimerView};
pub use format::format_time;
pub use record::SessionRecord;
pub use state::{Phase, TimerState};
