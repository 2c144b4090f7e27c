use clap::Subcommand;
use stayfocus_core::{Config, Database};

#[derive(Subcommand)]
pub enum StudyAction {
    /// Create a study session and print its id
    Add {
        /// What is being studied
        title: String,
    },
    /// Show a study session as JSON
    Show {
        id: String,
    },
}

pub fn run(action: StudyAction) -> Result<(), Box<dyn std::error::Error>> {
    let db = Database::open()?;

    match action {
        StudyAction::Add { title } => {
            let user_id = Config::load()?.user.user_id;
            let id = db.create_study_session(&user_id, &title)?;
            println!("{id}");
        }
        StudyAction::Show { id } => match db.study_session(&id)? {
            Some(study) => println!("{}", serde_json::to_string_pretty(&study)?),
            None => return Err(format!("study session not found: {id}").into()),
        },
    }
    Ok(())
}
