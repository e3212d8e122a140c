use clap::Parser;
use log::{info, warn};
use pokedex::core::config::{self, CliOverrides};
use pokedex::core::{FileSnapshotStore, SnapshotStore};
use pokedex::tui;
use simplelog::{ConfigBuilder, LevelFilter, WriteLogger};
use std::fs::File;

#[derive(Parser)]
#[command(name = "pokedex", about = "Browse the Pokédex from your terminal")]
struct Args {
    /// Catalog API base URL
    #[arg(long)]
    base_url: Option<String>,

    /// Entries fetched per page
    #[arg(long)]
    page_size: Option<u32>,

    /// Discard the saved list state before starting
    #[arg(long)]
    reset: bool,
}

#[tokio::main]
async fn main() -> std::io::Result<()> {
    let args = Args::parse();
    dotenv::dotenv().ok();

    let (file_config, config_error) = match config::load_config() {
        Ok(c) => (c, None),
        Err(e) => (config::PokedexConfig::default(), Some(e)),
    };
    let resolved = config::resolve(
        &file_config,
        &CliOverrides {
            base_url: args.base_url,
            page_size: args.page_size,
        },
    );

    // Initialize file logger; the terminal belongs to the UI
    let log_config = ConfigBuilder::new()
        .set_time_format_rfc3339()
        .build();
    let level = resolved
        .log_level
        .parse::<LevelFilter>()
        .unwrap_or(LevelFilter::Debug);

    if let Ok(log_file) = File::create(&resolved.log_file) {
        let _ = WriteLogger::init(level, log_config, log_file);
    }

    if let Some(e) = config_error {
        warn!("Ignoring config file: {}", e);
    }
    info!(
        "Pokedex starting up: base_url={}, page_size={}, snapshots={}",
        resolved.base_url,
        resolved.page_size,
        resolved.snapshot_dir.display()
    );

    if args.reset {
        let store = FileSnapshotStore::new(resolved.snapshot_dir.clone());
        match store.discard(tui::LIST_SNAPSHOT_KEY) {
            Ok(()) => info!("Discarded saved list state"),
            Err(e) => warn!("Failed to discard saved list state: {}", e),
        }
    }

    tui::run(resolved)
}
