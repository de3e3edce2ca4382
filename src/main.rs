use analytics::AnalyticsEngine;
use anyhow::Context;
use api_client::YahooChartClient;
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use configuration::{init_tracing, load_config, load_config_from, Config};
use core_types::{Allocation, Interval, PortfolioInput, Ticker};
use indicatif::{ProgressBar, ProgressStyle};
use portfolio_backtester::{PortfolioManager, RunSettings};
use rust_decimal::Decimal;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

/// The main entry point for the Pulse portfolio tracker.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // A missing .env file is fine; everything has a default.
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    let mut config = match &cli.config {
        Some(path) => load_config_from(path)?,
        None => load_config()?,
    };
    let _guard = init_tracing(&config.logging)?;

    match cli.command {
        Commands::Serve(args) => {
            if let Some(port) = args.port {
                config.server.port = port;
            }
            web_server::run_server(config).await
        }
        Commands::Backtest(args) => handle_backtest(args, &config).await,
        Commands::Update(args) => handle_update(args, &config).await,
        Commands::Risk(args) => handle_risk(args),
    }
}

// ==============================================================================
// CLI Structure
// ==============================================================================

/// Backtests stock portfolios and keeps their performance history up to date.
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path of the TOML configuration file (defaults to ./config.toml).
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the HTTP API.
    Serve(ServeArgs),
    /// Value a fresh portfolio over its full price history and print the result as JSON.
    Backtest(BacktestArgs),
    /// Extend the history stored in a portfolio file and print the new points as JSON.
    Update(UpdateArgs),
    /// Print the risk metrics of the history stored in a portfolio file.
    Risk(RiskArgs),
}

#[derive(Parser)]
struct ServeArgs {
    /// Overrides `server.port`.
    #[arg(long)]
    port: Option<u16>,
}

#[derive(Parser)]
struct BacktestArgs {
    /// An investment as TICKER=AMOUNT, e.g. AAPL=3000. Repeat for each asset.
    #[arg(long = "asset", required = true, value_parser = parse_allocation)]
    assets: Vec<Allocation>,

    /// Bar interval (e.g., "1d", "15m"). Overrides `price_source.backtest_interval`.
    #[arg(long)]
    interval: Option<Interval>,

    /// First date to fetch (format: YYYY-MM-DD). Overrides `price_source.backtest_start`.
    #[arg(long)]
    from: Option<NaiveDate>,
}

#[derive(Parser)]
struct UpdateArgs {
    /// A JSON file holding `{"data": [...], "history": [...]}`.
    #[arg(long)]
    file: PathBuf,

    /// Append the new points and the refreshed positions to the file.
    #[arg(long)]
    write: bool,
}

#[derive(Parser)]
struct RiskArgs {
    /// A JSON file holding `{"data": [...], "history": [...]}`.
    #[arg(long)]
    file: PathBuf,

    /// The initial investment. Defaults to the sum of the positions' start values.
    #[arg(long)]
    start_value: Option<Decimal>,
}

fn parse_allocation(raw: &str) -> Result<Allocation, String> {
    let (ticker, value) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected TICKER=AMOUNT, got '{raw}'"))?;
    let ticker = Ticker::new(ticker);
    if ticker.as_str().is_empty() {
        return Err(format!("missing ticker in '{raw}'"));
    }
    let value: f64 = value
        .trim()
        .parse()
        .map_err(|_| format!("invalid amount in '{raw}'"))?;
    Ok(Allocation { ticker, value })
}

// ==============================================================================
// Command Logic
// ==============================================================================

fn manager(config: &Config, settings: RunSettings) -> anyhow::Result<PortfolioManager> {
    let source = YahooChartClient::new(&config.price_source)?;
    Ok(PortfolioManager::new(Arc::new(source), settings))
}

fn spinner(message: &str) -> anyhow::Result<ProgressBar> {
    let spinner = ProgressBar::new_spinner();
    spinner.set_style(ProgressStyle::default_spinner().template("{spinner:.green} [{elapsed_precise}] {msg}")?);
    spinner.set_message(message.to_string());
    spinner.enable_steady_tick(Duration::from_millis(120));
    Ok(spinner)
}

fn read_portfolio(path: &Path) -> anyhow::Result<PortfolioInput> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    serde_json::from_str(&raw).with_context(|| format!("Failed to parse {}", path.display()))
}

async fn handle_backtest(args: BacktestArgs, config: &Config) -> anyhow::Result<()> {
    let mut settings = RunSettings::from(config);
    if let Some(interval) = args.interval {
        settings.backtest_interval = interval;
    }
    if let Some(from) = args.from {
        settings.backtest_start = from;
    }

    let manager = manager(config, settings)?;
    let progress = spinner(&format!("Backtesting {} assets...", args.assets.len()))?;
    let outcome = manager.backtest(&args.assets).await;
    progress.finish_and_clear();

    println!("{}", serde_json::to_string_pretty(&outcome?)?);
    Ok(())
}

async fn handle_update(args: UpdateArgs, config: &Config) -> anyhow::Result<()> {
    let input = read_portfolio(&args.file)?;

    let manager = manager(config, RunSettings::from(config))?;
    let progress = spinner("Fetching new prices...")?;
    let update = manager.update(&input).await;
    progress.finish_and_clear();
    let update = update?;

    if args.write {
        let mut history = input.history;
        history.extend(update.history.iter().cloned());
        let stored = PortfolioInput {
            data: update.data.clone(),
            history,
        };
        std::fs::write(&args.file, serde_json::to_string_pretty(&stored)?)
            .with_context(|| format!("Failed to write {}", args.file.display()))?;
        tracing::info!(
            file = %args.file.display(),
            added = update.history.len(),
            "Portfolio file updated."
        );
    }

    println!("{}", serde_json::to_string_pretty(&update)?);
    Ok(())
}

fn handle_risk(args: RiskArgs) -> anyhow::Result<()> {
    let input = read_portfolio(&args.file)?;
    let start_value = match args.start_value {
        Some(value) => value,
        None => {
            let total: f64 = input.data.iter().map(|p| p.startvalue).sum();
            Decimal::try_from(total).context("Start values do not add up to a finite amount")?
        }
    };

    let report = AnalyticsEngine::new().calculate(&input.history, start_value)?;
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}
