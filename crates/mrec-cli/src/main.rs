//! mrec - Minimal CSV-backed measurement record keeper
//!
//! Without a subcommand mrec runs the interactive menu; subcommands perform
//! a single operation against the data file.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use mrec_core::{Config, LoadPolicy};
use std::path::{Path, PathBuf};

mod commands;
mod menu;

#[derive(Parser)]
#[command(name = "mrec")]
#[command(about = "Minimal CSV-backed measurement record keeper")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// CSV data file (overrides config)
    #[arg(long, global = true, env = "MREC_DATA")]
    data: Option<PathBuf>,

    /// Config file path
    #[arg(long, global = true, env = "MREC_CONFIG")]
    config: Option<PathBuf>,

    /// How to treat unparseable fields when loading (zero_fill, skip, reject)
    #[arg(long, global = true)]
    load_policy: Option<LoadPolicy>,

    /// Output as JSON
    #[arg(long, global = true)]
    json: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the interactive menu (default)
    Menu,

    /// Create a new record
    Create {
        /// Measurement source
        source: String,

        /// Measured value
        #[arg(allow_negative_numbers = true)]
        measurement: f64,

        /// Event label
        event: String,
    },

    /// List all records
    List,

    /// Show one record
    Show {
        /// Record ID
        id: u64,
    },

    /// Update a record
    Update {
        /// Record ID
        id: u64,

        /// New source
        source: String,

        /// New measured value
        #[arg(allow_negative_numbers = true)]
        measurement: f64,

        /// New event label
        event: String,
    },

    /// Delete a record
    Delete {
        /// Record ID
        id: u64,
    },

    /// Delete every record and restart numbering
    DeleteAll {
        /// Skip confirmation
        #[arg(long)]
        force: bool,
    },

    /// Show or create configuration
    Config {
        #[command(subcommand)]
        command: Option<ConfigCommands>,
    },
}

#[derive(Subcommand)]
enum ConfigCommands {
    /// Show effective configuration
    Show,
    /// Print the config file path
    Path,
    /// Write a commented default config file
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

fn init_tracing() {
    let filter = std::env::var("RUST_LOG").unwrap_or_else(|_| "warn".to_string());
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

/// Load the config file, or defaults when there is no path to load from
fn load_config(path: Option<&Path>) -> Result<Config> {
    match path {
        Some(path) => Config::load(path)
            .with_context(|| format!("Failed to load config from {}", path.display())),
        None => {
            tracing::debug!("no config directory, using default config");
            Ok(Config::default())
        }
    }
}

fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();

    let config_path = cli.config.or_else(Config::default_path);
    let mut config = load_config(config_path.as_deref())?;
    if let Some(policy) = cli.load_policy {
        config.load_policy = policy;
    }
    if !config.display.colors {
        colored::control::set_override(false);
    }

    let ctx = commands::Context {
        data_file: cli.data.unwrap_or_else(|| config.data_file.clone()),
        config,
        config_path,
        json: cli.json,
    };
    tracing::debug!(data_file = %ctx.data_file.display(), "resolved data file");

    match cli.command {
        None | Some(Commands::Menu) => {
            let stdin = std::io::stdin();
            menu::interactive(&ctx, stdin.lock(), std::io::stdout())
        }
        Some(Commands::Create {
            source,
            measurement,
            event,
        }) => commands::create(&ctx, source, measurement, event),
        Some(Commands::List) => commands::list(&ctx),
        Some(Commands::Show { id }) => commands::show(&ctx, id),
        Some(Commands::Update {
            id,
            source,
            measurement,
            event,
        }) => commands::update(&ctx, id, source, measurement, event),
        Some(Commands::Delete { id }) => commands::delete(&ctx, id),
        Some(Commands::DeleteAll { force }) => commands::delete_all(&ctx, force),
        Some(Commands::Config { command }) => match command {
            Some(ConfigCommands::Show) | None => commands::config_show(&ctx),
            Some(ConfigCommands::Path) => commands::config_path(&ctx),
            Some(ConfigCommands::Init { force }) => commands::config_init(&ctx, force),
        },
    }
}
