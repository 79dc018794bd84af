use chrono::Utc;
use clap::Subcommand;
use lexiloop_core::{Config, Database};

#[derive(Subcommand)]
pub enum StatsAction {
    /// Study statistics over a recent window
    Show {
        /// Window in days (default: stats.window_days)
        #[arg(long)]
        days: Option<u32>,
    },
    /// Raw study log entries over a recent window
    Log {
        /// Window in days (default: stats.window_days)
        #[arg(long)]
        days: Option<u32>,
    },
}

pub fn run(action: StatsAction) -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::load_or_default();
    let db = Database::open()?;
    let now = Utc::now();

    match action {
        StatsAction::Show { days } => {
            let days = days.unwrap_or(config.stats.window_days).max(1);
            let stats = db.study_stats(now, days)?;
            super::print_json(&stats)?;
        }
        StatsAction::Log { days } => {
            let days = days.unwrap_or(config.stats.window_days).max(1);
            let since = now
                .checked_sub_signed(chrono::Duration::days(i64::from(days)))
                .unwrap_or(chrono::DateTime::<Utc>::MIN_UTC);
            let logs = db.study_logs_since(since)?;
            super::print_json(&logs)?;
        }
    }
    Ok(())
}
