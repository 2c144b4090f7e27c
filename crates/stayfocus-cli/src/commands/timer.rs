use clap::Subcommand;
use stayfocus_core::{
    Config, ConfigPatch, Database, ServiceOptions, SessionStore, TimerService, TimerState,
    TimerView,
};

#[derive(Subcommand)]
pub enum TimerAction {
    /// Start a new session, or resume a paused one
    Start {
        /// Count completed focus cycles against this study session
        #[arg(long)]
        study: Option<String>,
    },
    /// Pause the running phase
    Pause,
    /// Abandon the session and return to idle
    Reset,
    /// Print current timer state as JSON
    Status,
    /// Change durations (minutes); the running phase keeps its countdown
    Adjust {
        #[arg(long, allow_negative_numbers = true)]
        focus: Option<i64>,
        #[arg(long = "break", allow_negative_numbers = true)]
        short_break: Option<i64>,
        #[arg(long, allow_negative_numbers = true)]
        long_break: Option<i64>,
        /// Focus cycles before a long break
        #[arg(long, allow_negative_numbers = true)]
        cycles: Option<i64>,
    },
    /// Count down in the foreground until Ctrl-C or the timer stops
    Watch,
}

fn print_view(view: &TimerView) -> Result<(), Box<dyn std::error::Error>> {
    println!("{}", serde_json::to_string_pretty(view)?);
    Ok(())
}

fn status_line(view: &TimerView) -> String {
    let label = match view.state {
        TimerState::Paused(phase) => format!("paused ({})", phase.as_str()),
        other => other.as_str().to_string(),
    };
    format!(
        "{} {} cycle {} ({} completed)",
        view.formatted, label, view.current_cycle, view.cycles_completed
    )
}

pub fn run(action: TimerAction) -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::load()?;
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;
    runtime.block_on(run_async(action, config))
}

async fn run_async(
    action: TimerAction,
    mut config: Config,
) -> Result<(), Box<dyn std::error::Error>> {
    let db = Database::open()?;

    if let TimerAction::Start { study: Some(id) } = &action {
        if db.study_session(id)?.is_none() {
            tracing::warn!(study_session_id = %id, "unknown study session; cycles will not be counted");
        }
    }

    let options = ServiceOptions {
        user_id: config.user.user_id.clone(),
        config: config.pomodoro_config(),
        resume_policy: config.timer.resume_policy,
    };
    let mut service = TimerService::new(db, options);
    let outcome = execute(&mut service, action, &mut config).await;
    finish(service, outcome).await
}

/// Flush pending writes whether or not the command succeeded.
async fn finish<S: SessionStore + 'static>(
    service: TimerService<S>,
    outcome: Result<(), Box<dyn std::error::Error>>,
) -> Result<(), Box<dyn std::error::Error>> {
    let flushed = service.shutdown().await;
    outcome?;
    flushed?;
    Ok(())
}

async fn execute(
    service: &mut TimerService<Database>,
    action: TimerAction,
    config: &mut Config,
) -> Result<(), Box<dyn std::error::Error>> {
    match action {
        TimerAction::Start { study } => {
            if study.is_some() {
                service.link_study_session(study);
            }
            if service.start().is_none() {
                eprintln!("timer is already running");
            }
            print_view(&service.view())?;
        }
        TimerAction::Pause => {
            if service.pause().is_none() {
                eprintln!("timer is not running");
            }
            print_view(&service.view())?;
        }
        TimerAction::Reset => {
            service.reset();
            print_view(&service.view())?;
        }
        TimerAction::Status => {
            print_view(&service.view())?;
        }
        TimerAction::Adjust {
            focus,
            short_break,
            long_break,
            cycles,
        } => {
            let patch = ConfigPatch {
                focus_duration: focus,
                break_duration: short_break,
                long_break_duration: long_break,
                cycles_until_long_break: cycles,
            };
            if patch.is_empty() {
                return Err("nothing to adjust; pass --focus, --break, --long-break or --cycles".into());
            }
            service.adjust_config(&patch);

            // Adjusted durations also become the defaults for new sessions.
            let adjusted = service.view().config;
            config.timer.focus_duration = adjusted.focus_duration;
            config.timer.break_duration = adjusted.break_duration;
            config.timer.long_break_duration = adjusted.long_break_duration;
            config.timer.cycles_until_long_break = adjusted.cycles_until_long_break;
            config.save()?;
            print_view(&service.view())?;
        }
        TimerAction::Watch => {
            watch(service).await?;
        }
    }
    Ok(())
}

async fn watch(service: &TimerService<Database>) -> Result<(), Box<dyn std::error::Error>> {
    let mut rx = service.subscribe();
    let first = rx.borrow_and_update().clone();
    println!("{}", status_line(&first));
    if !first.is_active {
        eprintln!("timer is not running; use `stayfocus timer start`");
        return Ok(());
    }

    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => break,
            changed = rx.changed() => {
                if changed.is_err() {
                    break;
                }
                let view = rx.borrow_and_update().clone();
                println!("{}", status_line(&view));
                if !view.is_active {
                    break;
                }
            }
        }
    }
    Ok(())
}
