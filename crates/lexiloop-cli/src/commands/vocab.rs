//! Vocabulary bank commands for CLI.

use std::fs::File;
use std::io::BufReader;
use std::path::PathBuf;

use chrono::Utc;
use clap::Subcommand;
use lexiloop_core::vocabulary::transfer::{export_csv, import_csv, write_template};
use lexiloop_core::{Config, Database, ItemId, NewVocabulary, VocabularyFilter};

#[derive(Subcommand)]
pub enum VocabAction {
    /// Add a vocabulary item
    Add {
        /// The word or phrase to learn
        word: String,
        #[arg(long, default_value = "")]
        translation: String,
        #[arg(long, default_value = "")]
        example: String,
        #[arg(long, default_value = "")]
        pronunciation: String,
        #[arg(long, default_value = "")]
        notes: String,
        /// Language (default: vocabulary.default_language)
        #[arg(long)]
        language: Option<String>,
        /// Level such as A1 or N5 (default: vocabulary.default_level)
        #[arg(long)]
        level: Option<String>,
    },
    /// List vocabulary items
    List {
        #[arg(long)]
        language: Option<String>,
        #[arg(long)]
        level: Option<String>,
    },
    /// Show one item
    Show { id: i64 },
    /// Delete one item
    Delete { id: i64 },
    /// Import a CSV sheet with a header row
    Import {
        file: PathBuf,
        #[arg(long)]
        language: Option<String>,
        #[arg(long)]
        level: Option<String>,
    },
    /// Export items with review progress to CSV
    Export {
        file: PathBuf,
        #[arg(long)]
        language: Option<String>,
        #[arg(long)]
        level: Option<String>,
    },
    /// Write a sample import sheet
    Template {
        file: PathBuf,
        /// english, japanese or spanish
        #[arg(long, default_value = "english")]
        language: String,
    },
}

pub fn run(action: VocabAction) -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::load_or_default();
    let defaults = &config.vocabulary;
    let now = Utc::now();

    match action {
        VocabAction::Add {
            word,
            translation,
            example,
            pronunciation,
            notes,
            language,
            level,
        } => {
            let db = Database::open()?;
            let entry = NewVocabulary::new(
                word,
                language.unwrap_or_else(|| defaults.default_language.clone()),
                level.unwrap_or_else(|| defaults.default_level.clone()),
            )
            .translation(translation)
            .example(example)
            .pronunciation(pronunciation)
            .notes(notes);
            let item = db.add_vocabulary(entry, now)?;
            super::print_json(&item)?;
        }
        VocabAction::List { language, level } => {
            let db = Database::open()?;
            let items = db.list_vocabulary(&VocabularyFilter { language, level })?;
            super::print_json(&items)?;
        }
        VocabAction::Show { id } => {
            let db = Database::open()?;
            match db.get_vocabulary(ItemId(id))? {
                Some(item) => super::print_json(&item)?,
                None => return Err(format!("vocabulary item {id} not found").into()),
            }
        }
        VocabAction::Delete { id } => {
            let db = Database::open()?;
            if !db.delete_vocabulary(ItemId(id))? {
                return Err(format!("vocabulary item {id} not found").into());
            }
            println!("deleted {id}");
        }
        VocabAction::Import {
            file,
            language,
            level,
        } => {
            let language = language.unwrap_or_else(|| defaults.default_language.clone());
            let level = level.unwrap_or_else(|| defaults.default_level.clone());
            let reader = BufReader::new(File::open(&file)?);
            let report = import_csv(reader, &language, &level)?;

            let mut db = Database::open()?;
            let ids = db.import_vocabulary(&report.entries, now)?;
            super::print_json(&serde_json::json!({
                "imported": ids.len(),
                "ids": ids,
                "failed": report.failed,
                "blank_rows": report.blank_rows,
                "mapping": report.mapping,
            }))?;
        }
        VocabAction::Export {
            file,
            language,
            level,
        } => {
            let db = Database::open()?;
            let items = db.list_vocabulary(&VocabularyFilter { language, level })?;
            let count = export_csv(File::create(&file)?, &items)?;
            println!("exported {count} items to {}", file.display());
        }
        VocabAction::Template { file, language } => {
            write_template(File::create(&file)?, &language)?;
            println!("template written to {}", file.display());
        }
    }
    Ok(())
}
