use clap::Subcommand;
use stayfocus_core::{Config, Database};

#[derive(Subcommand)]
pub enum StatsAction {
    /// Session and cycle totals
    Summary,
    /// Most recent sessions, newest first
    History {
        #[arg(long, default_value_t = 10)]
        limit: usize,
    },
}

pub fn run(action: StatsAction) -> Result<(), Box<dyn std::error::Error>> {
    let db = Database::open()?;
    let user_id = Config::load()?.user.user_id;

    match action {
        StatsAction::Summary => {
            let stats = db.stats(&user_id)?;
            println!("{}", serde_json::to_string_pretty(&stats)?);
        }
        StatsAction::History { limit } => {
            let sessions = db.list_sessions(&user_id, limit)?;
            println!("{}", serde_json::to_string_pretty(&sessions)?);
        }
    }
    Ok(())
}
