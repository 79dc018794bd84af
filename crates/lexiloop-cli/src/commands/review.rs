//! Review commands for CLI.
//!
//! `review run` drives one session from stdin: each line answers the item
//! shown on stderr (`y`/`n`), `q` aborts. Events are printed to stdout as
//! JSON lines.

use std::io::{self, BufRead, Write};

use clap::Subcommand;
use lexiloop_core::stats::StudyActivity;
use lexiloop_core::{
    Clock, Config, Database, Event, RepositoryError, ReviewEngine, ReviewOutcome, SessionState,
    SessionSummary, SystemClock, VocabularyItem,
};

const LAST_SESSION_KEY: &str = "review.last_session";

#[derive(Subcommand)]
pub enum ReviewAction {
    /// List items due for review now
    Due {
        #[arg(long)]
        language: Option<String>,
        /// Print only the due count
        #[arg(long)]
        count: bool,
    },
    /// Run a review session reading answers from stdin
    Run {
        #[arg(long)]
        language: Option<String>,
        /// Maximum items for this session (default: review.max_session_items)
        #[arg(long)]
        limit: Option<usize>,
    },
    /// Show the due count and the last completed session
    Status,
}

pub fn run(action: ReviewAction) -> Result<(), Box<dyn std::error::Error>> {
    let clock = SystemClock;
    let mut db = Database::open()?;

    match action {
        ReviewAction::Due { language, count } => {
            let items = due_for(&db, clock.now(), language.as_deref())?;
            if count {
                println!("{}", items.len());
            } else {
                super::print_json(&items)?;
            }
        }
        ReviewAction::Run { language, limit } => {
            let config = Config::load_or_default();
            let stdin = io::stdin();
            run_session(
                &mut db,
                &clock,
                &config,
                language.as_deref(),
                limit,
                stdin.lock(),
            )?;
        }
        ReviewAction::Status => {
            let now = clock.now();
            let due_count = db.due_vocabulary(now)?.len();
            let snapshot = Event::StateSnapshot {
                state: SessionState::Idle,
                due_count,
                at: now,
            };
            let last: Option<SessionSummary> = match db.kv_get(LAST_SESSION_KEY)? {
                Some(raw) => Some(serde_json::from_str(&raw)?),
                None => None,
            };
            super::print_json(&serde_json::json!({
                "snapshot": snapshot,
                "last_session": last,
            }))?;
        }
    }
    Ok(())
}

fn due_for(
    db: &Database,
    now: chrono::DateTime<chrono::Utc>,
    language: Option<&str>,
) -> Result<Vec<VocabularyItem>, Box<dyn std::error::Error>> {
    let mut items = db.due_vocabulary(now)?;
    if let Some(language) = language {
        items.retain(|item| item.language == language);
    }
    Ok(items)
}

fn emit(event: &Event) -> Result<(), Box<dyn std::error::Error>> {
    let mut out = io::stdout().lock();
    writeln!(out, "{}", serde_json::to_string(event)?)?;
    out.flush()?;
    Ok(())
}

/// Describe the item awaiting an answer. A missing item is skipped by any
/// answer; a failed read is retried by the next answer.
fn prompt(
    out: &mut impl Write,
    current: &Result<VocabularyItem, RepositoryError>,
    show_answer_first: bool,
) -> io::Result<()> {
    match current {
        Ok(item) => {
            let (front, back) = if show_answer_first {
                (&item.translation, &item.word)
            } else {
                (&item.word, &item.translation)
            };
            writeln!(out, "[{}] {front}", item.mastery_level)?;
            if !back.is_empty() {
                writeln!(out, "    answer: {back}")?;
            }
            write!(out, "correct? [y/n/q] ")?;
        }
        Err(RepositoryError::NotFound(id)) => {
            writeln!(out, "item {id} was removed; any answer skips it")?;
            write!(out, "continue? [y/n/q] ")?;
        }
        Err(e) => {
            writeln!(out, "could not load the next item: {e}")?;
            write!(out, "answer to retry, q to stop [y/n/q] ")?;
        }
    }
    out.flush()
}

fn run_session(
    db: &mut Database,
    clock: &impl Clock,
    config: &Config,
    language: Option<&str>,
    limit: Option<usize>,
    mut input: impl BufRead,
) -> Result<(), Box<dyn std::error::Error>> {
    let now = clock.now();
    let due = due_for(db, now, language)?;
    if due.is_empty() {
        return emit(&Event::StateSnapshot {
            state: SessionState::Idle,
            due_count: 0,
            at: now,
        });
    }

    let max_items = limit.unwrap_or(config.review.max_session_items);
    tracing::debug!(due = due.len(), max_items, "starting review from stdin");
    let mut engine = ReviewEngine::new(&mut *db).with_max_items(max_items);
    emit(&engine.start_session(&due, now)?)?;

    let mut line = String::new();
    while let Some(current) = engine.current_item() {
        prompt(&mut io::stderr(), &current, config.review.show_answer_first)?;

        line.clear();
        if input.read_line(&mut line)? == 0 {
            emit(&engine.abort(clock.now())?)?;
            return Ok(());
        }
        let answer = line.trim();
        if answer.eq_ignore_ascii_case("q") {
            emit(&engine.abort(clock.now())?)?;
            return Ok(());
        }
        let outcome: ReviewOutcome = match answer.parse() {
            Ok(outcome) => outcome,
            Err(e) => {
                eprintln!("{e}");
                continue;
            }
        };

        match engine.submit_outcome(outcome, clock.now()) {
            Ok(events) => {
                for event in &events {
                    emit(event)?;
                }
            }
            Err(e) if e.is_retryable() => {
                eprintln!("{e}; answer again to retry");
            }
            Err(e) => return Err(e.into()),
        }
    }

    if let Some(summary) = engine.summary().cloned() {
        let ended_at = clock.now();
        let activity =
            StudyActivity::from_review(&summary, language.unwrap_or("mixed"), ended_at);
        drop(engine);
        db.record_activity(&activity, ended_at)?;
        db.kv_set(LAST_SESSION_KEY, &serde_json::to_string(&summary)?)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use lexiloop_core::{ItemId, NewVocabulary};

    fn rendered(current: Result<VocabularyItem, RepositoryError>, show_answer_first: bool) -> String {
        let mut out = Vec::new();
        prompt(&mut out, &current, show_answer_first).unwrap();
        String::from_utf8(out).unwrap()
    }

    fn item() -> VocabularyItem {
        let now = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        NewVocabulary::new("perro", "spanish", "A1")
            .translation("dog")
            .into_item(ItemId(7), now)
    }

    #[test]
    fn prompt_shows_word_then_answer() {
        let text = rendered(Ok(item()), false);
        assert!(text.starts_with("[1/5] perro\n"));
        assert!(text.contains("answer: dog"));
    }

    #[test]
    fn prompt_can_lead_with_translation() {
        let text = rendered(Ok(item()), true);
        assert!(text.starts_with("[1/5] dog\n"));
        assert!(text.contains("answer: perro"));
    }

    #[test]
    fn prompt_reports_unreadable_item() {
        let text = rendered(Err(RepositoryError::Persistence("database is locked".into())), false);
        assert!(text.contains("could not load the next item"));
        assert!(text.contains("database is locked"));

        let text = rendered(Err(RepositoryError::NotFound(ItemId(7))), false);
        assert!(text.contains("item 7 was removed"));
    }
}
