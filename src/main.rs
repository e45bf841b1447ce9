mod commands;
mod date_range;
mod render;

use anyhow::Result;
use calseries_core::SeriesService;
use calseries_core::config::SeriesConfig;
use calseries_core::store::JsonFileStore;
use clap::{Args, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use crate::date_range::DateRange;

#[derive(Parser)]
#[command(name = "calseries")]
#[command(about = "Manage calendar events and recurring series")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

/// Recurrence options shared by `new` and `update`.
#[derive(Args)]
pub struct RepeatArgs {
    /// Repeat the event: none, daily, weekly, monthly or yearly
    #[arg(long)]
    pub repeat: Option<String>,

    /// Repeat every N days/weeks/months/years
    #[arg(long)]
    pub every: Option<u16>,

    /// Last possible start of an occurrence (e.g. "2025-06-30")
    #[arg(long)]
    pub until: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Create an event or recurring series
    New {
        title: String,

        /// Start date/time (e.g., "2025-03-20T15:00")
        #[arg(short, long)]
        start: String,

        /// End date/time
        #[arg(short, long, conflicts_with = "duration")]
        end: Option<String>,

        /// Duration instead of an end time (e.g. "30m", "1h 30m")
        #[arg(short, long)]
        duration: Option<String>,

        #[arg(long)]
        description: Option<String>,

        #[arg(short, long)]
        location: Option<String>,

        /// Display color as #rrggbb
        #[arg(long)]
        color: Option<String>,

        #[command(flatten)]
        repeat: RepeatArgs,
    },
    /// Change an event; changing a series root rebuilds its occurrences
    Update {
        id: String,

        #[arg(long)]
        title: Option<String>,

        #[arg(short, long)]
        start: Option<String>,

        #[arg(short, long)]
        end: Option<String>,

        #[arg(long)]
        description: Option<String>,

        #[arg(short, long)]
        location: Option<String>,

        #[arg(long)]
        color: Option<String>,

        #[command(flatten)]
        repeat: RepeatArgs,

        /// Stop repeating; removes generated occurrences
        #[arg(long, conflicts_with_all = ["repeat", "every", "until"])]
        no_repeat: bool,
    },
    /// Print a stored event as JSON
    Show { id: String },
    /// Delete an event (and its occurrences when it is a series root)
    Delete { id: String },
    /// List events in a date range with recurring series expanded
    Events {
        /// Show events from this date (YYYY-MM-DD or date/time)
        #[arg(long)]
        from: Option<String>,

        /// Show events until this date (YYYY-MM-DD or date/time)
        #[arg(long)]
        to: Option<String>,

        /// Print JSON instead of a listing
        #[arg(long)]
        json: bool,
    },
    /// Check whether a time slot collides with stored events
    Overlap {
        #[arg(short, long)]
        start: String,

        #[arg(short, long)]
        end: String,

        /// Ignore this event (e.g. the one being rescheduled)
        #[arg(long)]
        exclude: Option<String>,

        #[arg(long)]
        json: bool,
    },
    /// Write events in a date range as an .ics calendar
    Export {
        #[arg(long)]
        from: Option<String>,

        #[arg(long)]
        to: Option<String>,

        /// Output file (stdout if omitted)
        #[arg(short, long)]
        output: Option<std::path::PathBuf>,
    },
    /// Show configuration paths and values
    Config,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = SeriesConfig::load()?;
    init_logging(&config);

    match cli.command {
        Commands::Config => commands::config::run(&config),
        command => dispatch(command, &config),
    }
}

fn dispatch(command: Commands, config: &SeriesConfig) -> Result<()> {
    let store = JsonFileStore::open(config.store_path())?;
    tracing::debug!(path = %store.path().display(), "Using event store");
    let mut service = SeriesService::new(store);

    match command {
        Commands::New {
            title,
            start,
            end,
            duration,
            description,
            location,
            color,
            repeat,
        } => commands::new::run(
            &mut service,
            commands::new::NewArgs {
                title,
                start,
                end,
                duration,
                description,
                location,
                color,
                repeat,
            },
        ),
        Commands::Update {
            id,
            title,
            start,
            end,
            description,
            location,
            color,
            repeat,
            no_repeat,
        } => commands::update::run(
            &mut service,
            &id,
            commands::update::UpdateArgs {
                title,
                start,
                end,
                description,
                location,
                color,
                repeat,
                no_repeat,
            },
        ),
        Commands::Show { id } => commands::show::run(&service, &id),
        Commands::Delete { id } => commands::delete::run(&mut service, &id),
        Commands::Events { from, to, json } => {
            let range = DateRange::from_args(from.as_deref(), to.as_deref(), config.default_range_days)?;
            commands::events::run(&service, range, json)
        }
        Commands::Overlap {
            start,
            end,
            exclude,
            json,
        } => commands::overlap::run(&service, &start, &end, exclude.as_deref(), json),
        Commands::Export { from, to, output } => {
            let range = DateRange::from_args(from.as_deref(), to.as_deref(), config.default_range_days)?;
            commands::export::run(&service, range, output.as_deref())
        }
        Commands::Config => commands::config::run(config),
    }
}

/// Log to stderr so command output on stdout stays clean.
/// RUST_LOG wins over the config file's `log_level`.
fn init_logging(config: &SeriesConfig) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.as_deref().unwrap_or("warn")))
        .unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
