use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod commands;

#[derive(Parser)]
#[command(name = "lexiloop", version, about = "Lexiloop vocabulary trainer CLI")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Vocabulary bank management
    Vocab {
        #[command(subcommand)]
        action: commands::vocab::VocabAction,
    },
    /// Spaced-repetition review
    Review {
        #[command(subcommand)]
        action: commands::review::ReviewAction,
    },
    /// Study statistics
    Stats {
        #[command(subcommand)]
        action: commands::stats::StatsAction,
    },
    /// Mistake book
    Mistake {
        #[command(subcommand)]
        action: commands::mistake::MistakeAction,
    },
    /// Configuration management
    Config {
        #[command(subcommand)]
        action: commands::config::ConfigAction,
    },
}

fn init_tracing() {
    let filter = EnvFilter::try_from_env("LEXILOOP_LOG").unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() {
    init_tracing();
    let cli = Cli::parse();
    let result = match cli.command {
        Commands::Vocab { action } => commands::vocab::run(action),
        Commands::Review { action } => commands::review::run(action),
        Commands::Stats { action } => commands::stats::run(action),
        Commands::Mistake { action } => commands::mistake::run(action),
        Commands::Config { action } => commands::config::run(action),
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}
