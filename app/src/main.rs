// In app/src/main.rs

use anyhow::{Context, Result};
use api_client::YahooClient;
use app_config::Settings;
use chrono::{NaiveDate, Utc};
use clap::{Parser, Subcommand};
use core_types::Symbol;
use engine::{BatchControl, HistoryWindow, RunAll, ScanRequest, Scanner};
use state_store::{CooldownAction, CooldownEntry, StateStore, StateStores};
use std::io::IsTerminal;
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::prelude::*;

mod prompt;
mod render;

use crate::prompt::InteractivePrompt;
use crate::render::{ConsoleRenderer, JsonExportRenderer, RendererSet, print_scan_report};

// --- Command-Line Interface Definition ---

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about,
    long_about = "Scans stocks for recent golden and death crosses between two simple moving averages."
)]
struct Cli {
    /// Log at DEBUG instead of the configured level.
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Scans one symbol, or the trending set, for recent crossovers.
    Scan {
        /// Scan only this symbol (e.g., "AAPL") instead of the trending set.
        #[arg(short, long)]
        symbol: Option<String>,

        /// Start of the price history in YYYY-MM-DD format.
        #[arg(long, value_parser = parse_cli_date, conflicts_with = "all_history")]
        start: Option<NaiveDate>,

        /// End of the price history (exclusive) in YYYY-MM-DD format.
        #[arg(long, value_parser = parse_cli_date, requires = "start")]
        end: Option<NaiveDate>,

        /// Fetch the full available history.
        #[arg(long)]
        all_history: bool,

        /// Run every batch without asking.
        #[arg(short, long)]
        yes: bool,

        /// Scan the requested symbol even if it is skip-listed or cooling down.
        #[arg(long, requires = "symbol")]
        force: bool,

        /// Also write each signalling symbol's analysis as JSON into this directory.
        #[arg(long)]
        export_dir: Option<PathBuf>,
    },

    /// Shows the trending symbol set, refreshing it when stale.
    Trending {
        /// Ignore the cache and run discovery now.
        #[arg(long)]
        refresh: bool,
    },

    /// Records that a symbol was sold, excluding it from scans for a while.
    Sold {
        symbol: String,

        /// Length of the cooldown in days (1 to 3650); defaults to `state.sold_cooldown_days`.
        #[arg(long, value_parser = clap::value_parser!(u32).range(1..=i64::from(app_config::MAX_COOLDOWN_DAYS)))]
        days: Option<u32>,
    },

    /// Clears the trending cache and the skip-list.
    Reset,

    /// Shows how many symbols each store currently holds.
    Status,
}

fn parse_cli_date(raw: &str) -> std::result::Result<NaiveDate, String> {
    core_types::parse_date(raw).map_err(|e| e.to_string())
}

// --- Main Application Entry Point ---

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables from a .env file, if it exists.
    dotenvy::dotenv().ok();

    // Parse command-line arguments.
    let cli = Cli::parse();

    let settings = app_config::load_settings().context("Failed to load configuration")?;
    init_tracing(&settings, cli.verbose);

    tracing::info!(environment = %settings.app.environment, "Starting crossover scanner");

    // Match on the parsed command and call the appropriate handler.
    match cli.command {
        Commands::Scan {
            symbol,
            start,
            end,
            all_history,
            yes,
            force,
            export_dir,
        } => {
            let window = match (all_history, start) {
                (true, _) => HistoryWindow::AllHistory,
                (false, Some(start)) => HistoryWindow::Explicit { start, end },
                (false, None) => HistoryWindow::Lookback,
            };
            handle_scan(&settings, symbol, window, yes, force, export_dir).await?;
        }
        Commands::Trending { refresh } => handle_trending(&settings, refresh).await?,
        Commands::Sold { symbol, days } => handle_sold(&settings, &symbol, days)?,
        Commands::Reset => handle_reset(&settings)?,
        Commands::Status => handle_status(&settings),
    }

    Ok(())
}

fn init_tracing(settings: &Settings, verbose: bool) {
    let default_level = if verbose {
        tracing::Level::DEBUG
    } else {
        settings
            .app
            .log_level
            .parse()
            .unwrap_or(tracing::Level::INFO)
    };

    let fmt_layer = tracing_subscriber::fmt::layer().with_filter(
        tracing_subscriber::filter::Targets::new()
            .with_target("reqwest", tracing::Level::WARN)
            .with_target("hyper", tracing::Level::WARN)
            .with_target("hyper_util", tracing::Level::WARN)
            .with_default(default_level),
    );
    tracing_subscriber::registry().with(fmt_layer).init();
}

fn build_scanner(settings: &Settings) -> Result<Scanner> {
    let client = Arc::new(YahooClient::new(&settings.provider)?);
    let scanner = Scanner::new(
        client.clone(),
        client,
        settings.scan.clone(),
        settings.indicators.clone(),
    )?;
    Ok(scanner)
}

// --- Subcommand Logic ---

async fn handle_scan(
    settings: &Settings,
    symbol: Option<String>,
    window: HistoryWindow,
    yes: bool,
    force: bool,
    export_dir: Option<PathBuf>,
) -> Result<()> {
    let now = Utc::now();
    let symbol = symbol.as_deref().map(Symbol::new).transpose()?;

    let scanner = build_scanner(settings)?;
    let mut stores = StateStores::open(&settings.state, now);

    let mut renderer = RendererSet::default().with(ConsoleRenderer);
    if let Some(dir) = export_dir {
        renderer = renderer.with(JsonExportRenderer::new(dir)?);
    }

    let mut control: Box<dyn BatchControl> = if yes || !std::io::stdin().is_terminal() {
        Box::new(RunAll)
    } else {
        Box::new(InteractivePrompt::new(std::io::stdin().lock()))
    };

    let request = ScanRequest {
        symbol,
        window,
        force,
        as_of: now,
    };
    let report = scanner
        .run(&request, &mut stores, control.as_mut(), &mut renderer)
        .await?;

    print_scan_report(&report);
    Ok(())
}

async fn handle_trending(settings: &Settings, refresh: bool) -> Result<()> {
    let now = Utc::now();
    let scanner = build_scanner(settings)?;
    let mut stores = StateStores::open(&settings.state, now);

    let symbols = scanner.trending(&mut stores, now, refresh).await?;
    if let Some(snapshot) = stores.trending.snapshot() {
        println!("Trending symbols (fetched {}):", snapshot.fetched_at.format("%Y-%m-%d %H:%M UTC"));
    }
    for chunk in symbols.chunks(10) {
        let line: Vec<&str> = chunk.iter().map(Symbol::as_str).collect();
        println!("  {}", line.join(" "));
    }
    Ok(())
}

fn handle_sold(settings: &Settings, symbol: &str, days: Option<u32>) -> Result<()> {
    let now = Utc::now();
    let symbol = Symbol::new(symbol)?;
    let days = days.unwrap_or(settings.state.sold_cooldown_days);

    let mut stores = StateStores::open(&settings.state, now);
    stores
        .cooldown
        .record_outcome(&symbol, now, CooldownAction::Sold { days });
    stores.flush()?;

    if let Some(expires_at) = stores.cooldown.entry(&symbol).and_then(CooldownEntry::expires_at) {
        println!(
            "{} is cooling down until {}.",
            symbol,
            expires_at.format("%Y-%m-%d %H:%M UTC")
        );
    }
    Ok(())
}

fn handle_reset(settings: &Settings) -> Result<()> {
    let mut stores = StateStores::open(&settings.state, Utc::now());
    stores.reset();
    stores.flush()?;
    tracing::info!("Cleared trending cache and skip-list.");
    println!("Trending cache and skip-list cleared.");
    Ok(())
}

fn handle_status(settings: &Settings) {
    let now = Utc::now();
    let stores = StateStores::open(&settings.state, now);

    println!("State directory: {}", settings.state.state_dir.display());
    println!("Skip-listed symbols: {}", stores.skip_list.active_count(now));
    println!("Symbols cooling down: {}", stores.cooldown.active_count(now));
    match stores.trending.snapshot() {
        Some(snapshot) => println!(
            "Trending cache: {} symbols, fetched {} ({})",
            snapshot.symbols.len(),
            snapshot.fetched_at.format("%Y-%m-%d %H:%M UTC"),
            if stores.trending.is_active(&(), now) { "fresh" } else { "stale" }
        ),
        None => println!("Trending cache: empty"),
    }
}
