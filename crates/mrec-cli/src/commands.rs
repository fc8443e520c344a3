//! CLI command implementations

use anyhow::{Result, bail};
use colored::Colorize;
use mrec_core::{Config, Record, Store, config::DisplayConfig};
use std::fmt::Write as _;
use std::path::{Path, PathBuf};
use tabled::settings::Style;
use tabled::{Table, Tabled};

/// Resolved settings shared by every command
pub struct Context {
    pub config: Config,
    /// `None` when no `--config` was given and the platform has no config dir
    pub config_path: Option<PathBuf>,
    pub data_file: PathBuf,
    pub json: bool,
}

impl Context {
    fn require_config_path(&self) -> Result<&Path> {
        self.config_path
            .as_deref()
            .ok_or_else(|| anyhow::anyhow!("Could not determine config directory; pass --config"))
    }

    pub fn open_store(&self) -> Result<Store> {
        Ok(Store::open(&self.data_file, self.config.load_policy)?)
    }
}

#[derive(Tabled)]
struct RecordRow {
    #[tabled(rename = "ID")]
    id: u64,
    #[tabled(rename = "Timestamp")]
    timestamp: String,
    #[tabled(rename = "Source")]
    source: String,
    #[tabled(rename = "Measurement")]
    measurement: f64,
    #[tabled(rename = "Event")]
    event: String,
}

/// Format a timestamp, falling back to RFC 3339 when the configured
/// strftime pattern is invalid
pub fn format_timestamp(record: &Record, display: &DisplayConfig) -> String {
    let mut out = String::new();
    if write!(out, "{}", record.timestamp.format(&display.date_format)).is_err() {
        return record.timestamp.to_rfc3339();
    }
    out
}

/// Render records as a table in store order
pub fn render_table(records: &[Record], display: &DisplayConfig) -> String {
    let rows: Vec<RecordRow> = records
        .iter()
        .map(|r| RecordRow {
            id: r.id,
            timestamp: format_timestamp(r, display),
            source: r.source.clone(),
            measurement: r.measurement,
            event: r.event.clone(),
        })
        .collect();
    let mut table = Table::new(rows);
    table.with(Style::rounded());
    table.to_string()
}

pub fn create(ctx: &Context, source: String, measurement: f64, event: String) -> Result<()> {
    let mut store = ctx.open_store()?;
    let record = store.create(source, measurement, event).clone();
    store.save(&ctx.data_file)?;

    if ctx.json {
        println!("{}", serde_json::to_string(&record)?);
    } else {
        println!("{} Created record {}", "✓".green(), record.id);
    }
    Ok(())
}

pub fn list(ctx: &Context) -> Result<()> {
    let store = ctx.open_store()?;

    if ctx.json {
        println!("{}", serde_json::to_string(store.list())?);
    } else if store.is_empty() {
        println!("No records found");
    } else {
        println!("{}", render_table(store.list(), &ctx.config.display));
        println!("{} record(s)", store.len());
    }
    Ok(())
}

pub fn show(ctx: &Context, id: u64) -> Result<()> {
    let store = ctx.open_store()?;
    let record = store
        .get(id)
        .ok_or(mrec_core::Error::NotFound(id))?;

    if ctx.json {
        println!("{}", serde_json::to_string_pretty(record)?);
    } else {
        println!("{} {}", format!("#{}", record.id).cyan().bold(), record.source.bold());
        println!();
        println!("Created:     {}", format_timestamp(record, &ctx.config.display));
        println!("Measurement: {}", record.measurement);
        println!("Event:       {}", record.event);
    }
    Ok(())
}

pub fn update(
    ctx: &Context,
    id: u64,
    source: String,
    measurement: f64,
    event: String,
) -> Result<()> {
    let mut store = ctx.open_store()?;
    let record = store.update(id, source, measurement, event)?.clone();
    store.save(&ctx.data_file)?;

    if ctx.json {
        println!("{}", serde_json::to_string(&record)?);
    } else {
        println!("{} Updated record {}", "✓".green(), id);
    }
    Ok(())
}

pub fn delete(ctx: &Context, id: u64) -> Result<()> {
    let mut store = ctx.open_store()?;
    store.delete(id)?;
    store.save(&ctx.data_file)?;
    println!("{} Deleted record {}", "✓".green(), id);
    Ok(())
}

pub fn delete_all(ctx: &Context, force: bool) -> Result<()> {
    let mut store = ctx.open_store()?;

    if !force {
        println!(
            "{}",
            format!("This will delete all {} records.", store.len()).red()
        );
        print!("Continue? [y/N] ");
        std::io::Write::flush(&mut std::io::stdout())?;

        let mut input = String::new();
        std::io::stdin().read_line(&mut input)?;

        if !input.trim().eq_ignore_ascii_case("y") {
            println!("Aborted");
            return Ok(());
        }
    }

    store.delete_all();
    store.save(&ctx.data_file)?;
    println!("{} All records deleted", "✓".green());
    Ok(())
}

/// Show effective configuration
pub fn config_show(ctx: &Context) -> Result<()> {
    let config = &ctx.config;

    if ctx.json {
        println!("{}", serde_json::to_string_pretty(config)?);
    } else {
        println!("{}", "Current configuration:".bold());
        println!();
        println!("data_file = \"{}\"", config.data_file.display());
        println!("load_policy = \"{}\"", config.load_policy);
        println!();
        println!("[display]");
        println!("colors = {}", config.display.colors);
        println!("date_format = \"{}\"", config.display.date_format);
        println!();
        println!("# effective data file: {}", ctx.data_file.display());
    }
    Ok(())
}

pub fn config_path(ctx: &Context) -> Result<()> {
    println!("{}", ctx.require_config_path()?.display());
    Ok(())
}

/// Write the commented default config
pub fn config_init(ctx: &Context, force: bool) -> Result<()> {
    let path = ctx.require_config_path()?;
    if path.exists() && !force {
        bail!(
            "Config already exists at {} (use --force to overwrite)",
            path.display()
        );
    }
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, Config::default_with_comments())?;
    println!("{} Wrote {}", "✓".green(), path.display());
    Ok(())
}
