use clap::{Args, Parser, Subcommand};
use pomo_core::storage::{open_repository, Backend};
use pomo_core::{IntervalConfig, Settings};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

mod commands;

#[derive(Parser)]
#[command(name = "pomo", version, about = "Pomodoro interval timer")]
struct Cli {
    #[command(flatten)]
    overrides: Overrides,

    /// Log filter used when RUST_LOG is unset
    #[arg(long, global = true, default_value = "warn")]
    log_level: String,

    #[command(subcommand)]
    command: Commands,
}

/// Per-invocation overrides of the settings file.
#[derive(Args, Debug, Default, Clone)]
pub struct Overrides {
    /// Pomodoro duration in minutes
    #[arg(long, short = 'p', global = true)]
    pomodoro: Option<u32>,
    /// Short break duration in minutes
    #[arg(long, short = 's', global = true)]
    short: Option<u32>,
    /// Long break duration in minutes
    #[arg(long, short = 'l', global = true)]
    long: Option<u32>,
    /// Storage backend (sqlite, memory)
    #[arg(long, global = true)]
    backend: Option<Backend>,
    /// SQLite database file
    #[arg(long, global = true)]
    db: Option<PathBuf>,
}

impl Overrides {
    pub fn apply(&self, settings: &mut Settings) {
        if let Some(m) = self.pomodoro {
            settings.durations.pomodoro = m;
        }
        if let Some(m) = self.short {
            settings.durations.short_break = m;
        }
        if let Some(m) = self.long {
            settings.durations.long_break = m;
        }
        if let Some(b) = self.backend {
            settings.storage.backend = b;
        }
        if let Some(path) = &self.db {
            settings.storage.path = Some(path.clone());
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Run the next intervals
    Run(commands::run::RunArgs),
    /// Show the next interval without starting it
    Next,
    /// Duration summaries
    Summary {
        #[command(subcommand)]
        action: commands::summary::SummaryAction,
    },
    /// Settings file management
    Config {
        #[command(subcommand)]
        action: commands::config::ConfigAction,
    },
}

fn load_config(overrides: &Overrides) -> Result<IntervalConfig, Box<dyn std::error::Error>> {
    let mut settings = Settings::load()?;
    overrides.apply(&mut settings);
    let repo = open_repository(&settings)?;
    Ok(IntervalConfig::from_settings(repo, &settings))
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&cli.log_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    let result = match cli.command {
        Commands::Run(args) => match load_config(&cli.overrides) {
            Ok(config) => commands::run::run(args, &config).await,
            Err(e) => Err(e),
        },
        Commands::Next => load_config(&cli.overrides).and_then(|c| commands::next::run(&c)),
        Commands::Summary { action } => {
            load_config(&cli.overrides).and_then(|c| commands::summary::run(action, &c))
        }
        Commands::Config { action } => commands::config::run(action),
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}
