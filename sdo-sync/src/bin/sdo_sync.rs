use std::path::PathBuf;
use std::time::{Duration, SystemTime};

use anyhow::Result;
use chrono::{Local, NaiveDate};
use clap::{Args, Parser, Subcommand, ValueEnum};
use sdo_sync::config::{
    dedup_channels, parse_base_url, retention_from_hours, DEFAULT_BASE_URL, DEFAULT_EXTENSION,
    DEFAULT_RETENTION_HOURS, DEFAULT_TIMEOUT_SECS,
};
use sdo_sync::{
    channel_inventory, run, save_report, Channel, FileTransfer, HttpListing, HttpTransfer,
    SyncConfig, WgetTransfer, CHANNELS,
};

/// How frames are downloaded
#[derive(Debug, Clone, Copy, ValueEnum)]
#[clap(rename_all = "lowercase")]
enum TransferKind {
    /// Shell out to wget
    Wget,
    /// Download in-process
    Http,
}

/// Keep a rolling local cache of today's SDO/AIA frames
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None, args_conflicts_with_subcommands = true)]
struct Cli {
    #[command(flatten)]
    sync: SyncArgs,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Prune stale frames and download new ones (the default)
    Sync(SyncArgs),
    /// Show what is cached per channel
    Status(StatusArgs),
}

#[derive(Args, Debug)]
struct SyncArgs {
    /// Archive root; dated directories are looked up below it
    #[arg(long, default_value = DEFAULT_BASE_URL)]
    base_url: String,

    /// Directory holding one sub-directory per channel
    #[arg(long, default_value = ".")]
    data_dir: PathBuf,

    /// Only sync these channels (repeatable); all six by default
    #[arg(long = "channel", value_parser = parse_channel)]
    channels: Vec<Channel>,

    /// File suffix to pick from listing pages
    #[arg(long, default_value = DEFAULT_EXTENSION)]
    extension: String,

    /// Frames at least this many hours old are deleted
    #[arg(long, default_value_t = DEFAULT_RETENTION_HOURS)]
    retention_hours: u64,

    /// Sync this date (YYYY-MM-DD) instead of today
    #[arg(long, value_parser = parse_date)]
    date: Option<NaiveDate>,

    #[arg(long, value_enum, default_value_t = TransferKind::Wget)]
    transfer: TransferKind,

    /// wget executable to run for --transfer wget
    #[arg(long, default_value = "wget")]
    wget_program: String,

    /// HTTP request timeout in seconds
    #[arg(long, default_value_t = DEFAULT_TIMEOUT_SECS)]
    timeout_secs: u64,

    /// Log what would be downloaded and pruned without touching anything
    #[arg(long)]
    dry_run: bool,

    /// Write a JSON report of the run to this file
    #[arg(long)]
    report: Option<PathBuf>,
}

#[derive(Args, Debug)]
struct StatusArgs {
    #[arg(long, default_value = ".")]
    data_dir: PathBuf,

    #[arg(long = "channel", value_parser = parse_channel)]
    channels: Vec<Channel>,

    #[arg(long, default_value = DEFAULT_EXTENSION)]
    extension: String,

    /// Print JSON instead of a table
    #[arg(long)]
    json: bool,
}

fn parse_channel(s: &str) -> Result<Channel, String> {
    s.parse::<Channel>().map_err(|e| e.to_string())
}

fn parse_date(s: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").map_err(|e| format!("{} (expected YYYY-MM-DD)", e))
}

fn selected_channels(channels: Vec<Channel>) -> Vec<Channel> {
    if channels.is_empty() {
        CHANNELS.to_vec()
    } else {
        dedup_channels(channels)
    }
}

impl SyncArgs {
    fn to_config(&self) -> Result<SyncConfig> {
        Ok(SyncConfig {
            base_url: parse_base_url(&self.base_url)?,
            data_dir: self.data_dir.clone(),
            channels: selected_channels(self.channels.clone()),
            extension: self.extension.clone(),
            retention: retention_from_hours(self.retention_hours)?,
            date: self.date,
            dry_run: self.dry_run,
            timeout: Duration::from_secs(self.timeout_secs),
        })
    }
}

fn sync(args: SyncArgs) -> Result<()> {
    let config = args.to_config()?;
    log::debug!("Running with {:?}", config);

    let listing = HttpListing::new(config.timeout)?;
    let transfer: Box<dyn FileTransfer> = match args.transfer {
        TransferKind::Wget => Box::new(WgetTransfer::new(args.wget_program.clone())),
        TransferKind::Http => Box::new(HttpTransfer::new(config.timeout)?),
    };

    let report = run(
        &config,
        &listing,
        transfer.as_ref(),
        Local::now().date_naive(),
        SystemTime::now(),
    )?;
    report.print_summary();

    if let Some(path) = &args.report {
        save_report(&report, path)?;
        println!("\nReport saved to {}", path.display());
    }

    if !report.is_clean() {
        std::process::exit(1);
    }

    Ok(())
}

fn status(args: StatusArgs) -> Result<()> {
    let mut inventories = Vec::new();
    for channel in selected_channels(args.channels) {
        let dir = args.data_dir.join(channel.id());
        inventories.push(channel_inventory(&dir, channel, &args.extension)?);
    }

    if args.json {
        println!("{}", serde_json::to_string_pretty(&inventories)?);
        return Ok(());
    }

    for inventory in &inventories {
        let span = match (&inventory.earliest, &inventory.latest) {
            (Some(first), Some(last)) => format!(
                "{} {} .. {} {}",
                first.date, first.time, last.date, last.time
            ),
            _ => "-".to_string(),
        };
        println!("{:>4}: {:>5} frames  {}", inventory.channel, inventory.files, span);
        if !inventory.unrecognized.is_empty() {
            println!("      {} unrecognized file names", inventory.unrecognized.len());
        }
        for name in &inventory.misplaced {
            println!("      wrong channel: {}", name);
        }
    }

    Ok(())
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    match cli.command {
        Some(Commands::Sync(args)) => sync(args),
        Some(Commands::Status(args)) => status(args),
        None => sync(cli.sync),
    }
}
