use std::env;
use std::fs;
use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use reqwest::Url;
use sdo_sync::config::{DEFAULT_EXTENSION, DEFAULT_TIMEOUT_SECS};
use sdo_sync::{parse_listing, HttpListing, ListingSource};

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args: Vec<String> = env::args().collect();

    if args.len() < 3 {
        eprintln!("Please provide a listing URL and a fixture name");
        eprintln!("Usage: cargo run --bin save_listing <URL> <fixture_name>");
        std::process::exit(1);
    }

    let url = Url::parse(&args[1]).with_context(|| format!("Invalid URL: {}", args[1]))?;
    let fixture_name = &args[2];

    log::info!("Fetching listing from {}...", url);
    let listing = HttpListing::new(Duration::from_secs(DEFAULT_TIMEOUT_SECS))?;
    let html = listing.fetch_listing(&url)?;

    let fixtures_dir = Path::new("src/tests/fixtures");
    fs::create_dir_all(fixtures_dir).context("Failed to create fixtures directory")?;

    let file_path = fixtures_dir.join(format!("{}.html", fixture_name));
    fs::write(&file_path, &html).context("Failed to write HTML file")?;
    println!("Saved listing to {}", file_path.display());

    let files = parse_listing(&html, &url, DEFAULT_EXTENSION);
    println!("Links matching .{}: {}", DEFAULT_EXTENSION, files.len());
    for file in files.iter().take(5) {
        println!("  {}", file);
    }
    if files.len() > 5 {
        println!("  ... and {} more", files.len() - 5);
    }

    Ok(())
}
