//! Mistake book commands for CLI.

use chrono::Utc;
use clap::Subcommand;
use lexiloop_core::{Config, Database, MistakeStatus, NewMistake};

#[derive(Subcommand)]
pub enum MistakeAction {
    /// Record a mistake
    Add {
        /// The question that was answered wrongly
        question: String,
        /// The answer that was given
        #[arg(long, default_value = "")]
        answer: String,
        /// The expected answer
        #[arg(long)]
        correct: String,
        #[arg(long, default_value = "")]
        explanation: String,
        #[arg(long, default_value = "vocabulary")]
        subject: String,
        #[arg(long)]
        language: Option<String>,
        #[arg(long)]
        level: Option<String>,
        /// Identifier of the source question, if any
        #[arg(long)]
        question_id: Option<String>,
    },
    /// List mistakes
    List {
        /// Filter by status: pending or reviewed
        #[arg(long)]
        status: Option<MistakeStatus>,
    },
    /// Mark a mistake as reviewed
    Resolve { id: i64 },
}

pub fn run(action: MistakeAction) -> Result<(), Box<dyn std::error::Error>> {
    let db = Database::open()?;

    match action {
        MistakeAction::Add {
            question,
            answer,
            correct,
            explanation,
            subject,
            language,
            level,
            question_id,
        } => {
            let defaults = Config::load_or_default().vocabulary;
            let mistake = db.add_mistake(
                NewMistake {
                    question_id,
                    subject,
                    language: language.unwrap_or(defaults.default_language),
                    level: level.unwrap_or(defaults.default_level),
                    question,
                    user_answer: answer,
                    correct_answer: correct,
                    explanation,
                },
                Utc::now(),
            )?;
            super::print_json(&mistake)?;
        }
        MistakeAction::List { status } => {
            let mistakes = db.list_mistakes(status)?;
            super::print_json(&mistakes)?;
        }
        MistakeAction::Resolve { id } => {
            db.set_mistake_status(id, MistakeStatus::Reviewed)?;
            println!("mistake {id} marked reviewed");
        }
    }
    Ok(())
}
