mod commands;
mod render;

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use eventica_core::EventInput;
use eventica_core::config::EventicaConfig;
use eventica_core::service::EventService;
use eventica_core::store::AnyStore;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "eventica")]
#[command(about = "Manage the Eventica event listing from the command line")]
struct Cli {
    /// Use this config file instead of ~/.config/eventica/config.toml
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List events, newest first
    List {
        /// Show upcoming events first, then past ones
        #[arg(short, long)]
        upcoming: bool,

        /// Only events whose title or description contains this text
        #[arg(short, long)]
        search: Option<String>,
    },
    /// Show a single event
    Show { id: String },
    /// Create an event
    Add(EventArgs),
    /// Replace an event's fields
    Update {
        id: String,

        #[command(flatten)]
        event: EventArgs,
    },
    /// Delete an event
    Delete { id: String },
    /// Replace the stored events with those in a JSON file
    Migrate {
        /// JSON array of events, or an object with an `events` array
        file: PathBuf,
    },
    /// Check a JSON file of events for problems before migrating it
    Audit { file: PathBuf },
    /// Show config path and effective settings
    Config,
}

#[derive(Args)]
struct EventArgs {
    #[arg(short, long)]
    title: Option<String>,

    #[arg(long)]
    description: Option<String>,

    /// Date (e.g. "2025-03-20" or "20-03-2025")
    #[arg(short, long)]
    date: Option<String>,

    /// Start time, 24-hour "HH:MM"
    #[arg(long)]
    time: Option<String>,

    /// End time, 24-hour "HH:MM"
    #[arg(long)]
    end_time: Option<String>,

    #[arg(short, long)]
    location: Option<String>,

    /// Image URL
    #[arg(long)]
    image: Option<String>,

    /// Website URL
    #[arg(long)]
    website: Option<String>,
}

impl From<EventArgs> for EventInput {
    fn from(args: EventArgs) -> Self {
        EventInput {
            title: args.title,
            description: args.description,
            date: args.date,
            time: args.time,
            end_time: args.end_time,
            location: args.location,
            image: args.image,
            website: args.website,
        }
    }
}

fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();
    let config = load_config(cli.config.as_deref())?;

    match cli.command {
        Commands::List { upcoming, search } => with_service(&config, |service| {
            commands::list::run(service, upcoming, search.as_deref())
        }),
        Commands::Show { id } => with_service(&config, |service| commands::show::run(service, &id)),
        Commands::Add(args) => {
            let input: EventInput = args.into();
            with_service(&config, |service| commands::add::run(service, &input))
        }
        Commands::Update { id, event } => {
            let input: EventInput = event.into();
            with_service(&config, |service| commands::update::run(service, &id, &input))
        }
        Commands::Delete { id } => {
            with_service(&config, |service| commands::delete::run(service, &id))
        }
        Commands::Migrate { file } => {
            with_service(&config, |service| commands::migrate::run(service, &file))
        }
        Commands::Audit { file } => commands::audit::run(&file),
        Commands::Config => commands::config::run(&config, cli.config.as_deref()),
    }
}

/// Open the configured store for one command and close it afterwards.
fn with_service<F>(config: &EventicaConfig, f: F) -> Result<()>
where
    F: FnOnce(&EventService<AnyStore>) -> Result<()>,
{
    let store = AnyStore::open(config).context("Failed to open event store")?;
    let service = EventService::new(store, config)?;

    let result = f(&service);
    service.into_store().close()?;
    result
}

fn load_config(path: Option<&Path>) -> Result<EventicaConfig> {
    let config = match path {
        Some(path) => EventicaConfig::load_from(path),
        None => EventicaConfig::load(),
    };
    config.context("Failed to load configuration")
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
