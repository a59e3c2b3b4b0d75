use analytics::PerformanceReport;
use anyhow::Context;
use backtester::{BacktestResult, Backtester, InMemoryMarketData};
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use comfy_table::Table;
use configuration::{Config, LogLevel, init_tracing, load_config, load_config_from};
use core_types::{Position, Trade};
use engine::{ExecutionMode, PollingDriver, StrategyOrchestrator};
use rust_decimal::Decimal;
use signals::DayClassifier;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::watch;

/// The main entry point for the Confluence trading application.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut config = load(cli.config.as_deref())?;
    if let Some(level) = cli.log_level {
        config.logging.level = level;
    }
    let _guard = init_tracing(&config.logging)?;

    match cli.command {
        Commands::Run(args) => handle_run(args, config).await,
        Commands::Backtest(args) => handle_backtest(args, config).await,
        Commands::Classify(args) => handle_classify(args, &config),
    }
}

/// An explicit path must exist; otherwise `config.toml` is used when present and the
/// built-in defaults when not.
fn load(path: Option<&Path>) -> anyhow::Result<Config> {
    match path {
        Some(path) => load_config_from(path)
            .with_context(|| format!("loading configuration from {}", path.display())),
        None if Path::new("config.toml").exists() => {
            load_config().context("loading configuration from config.toml")
        }
        None => Ok(Config::default()),
    }
}

// ==============================================================================
// CLI Structure
// ==============================================================================

/// Intraday index-options decision engine.
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Configuration file (TOML). Defaults to ./config.toml when present.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Overrides `logging.level` (RUST_LOG still wins).
    #[arg(long, global = true, value_enum)]
    log_level: Option<LogLevel>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Poll a market-data feed during market hours and trade until Ctrl-C.
    Run(RunArgs),
    /// Replay recorded candles and an option-chain snapshot through the engine.
    Backtest(BacktestArgs),
    /// Print the day type for an opening price, a hunter zone and a PCR.
    Classify(ClassifyArgs),
}

#[derive(Parser)]
struct RunArgs {
    /// JSON object mapping instrument keys to candle arrays, served as the candle feed.
    #[arg(long)]
    candles: PathBuf,

    /// JSON array of option-chain snapshots, one per underlying.
    #[arg(long)]
    option_chain: PathBuf,
}

#[derive(Parser)]
struct BacktestArgs {
    /// JSON object mapping instrument keys to candle arrays.
    #[arg(long)]
    candles: PathBuf,

    /// JSON array of option-chain snapshots, one per underlying.
    #[arg(long)]
    option_chain: PathBuf,

    /// First session to replay (format: YYYY-MM-DD).
    #[arg(long)]
    from: NaiveDate,

    /// Last session to replay (format: YYYY-MM-DD).
    #[arg(long)]
    to: NaiveDate,
}

#[derive(Parser)]
struct ClassifyArgs {
    #[arg(long)]
    open: Decimal,

    /// Hunter zone high.
    #[arg(long)]
    high: Decimal,

    /// Hunter zone low.
    #[arg(long)]
    low: Decimal,

    #[arg(long)]
    pcr: Decimal,
}

// ==============================================================================
// Command Logic
// ==============================================================================

/// Orders go to the paper mirror when `execution.paper_trading` is set. This build links
/// no broker transport, so live mode stops with a configuration error.
async fn handle_run(args: RunArgs, config: Config) -> anyhow::Result<()> {
    let execution = ExecutionMode::from_config(&config.execution, None)
        .context("selecting the order gateway")?;
    let feed = InMemoryMarketData::load(&args.candles, &args.option_chain)
        .context("loading the market-data feed")?;
    let orchestrator = StrategyOrchestrator::new(config, Arc::new(feed), execution.gateway())?;

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let driver =
        PollingDriver::new(orchestrator, shutdown_rx)?.with_paper_mirror(execution.paper_mirror());
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::info!("Ctrl-C received. Shutting down...");
            let _ = shutdown_tx.send(true);
        }
    });

    let orchestrator = driver.run().await;
    let (open_positions, trades) = orchestrator.into_ledger().into_parts();
    if !trades.is_empty() {
        println!("{}", trades_table(&trades));
    }
    print_open_positions(&open_positions);
    Ok(())
}

async fn handle_backtest(args: BacktestArgs, config: Config) -> anyhow::Result<()> {
    tracing::info!(from = %args.from, to = %args.to, "Starting backtest");

    let data = InMemoryMarketData::load(&args.candles, &args.option_chain)
        .context("loading backtest data")?;
    let result = Backtester::new(config, data)
        .with_progress(true)
        .run(args.from, args.to)
        .await?;

    print_result(&result);
    Ok(())
}

fn handle_classify(args: ClassifyArgs, config: &Config) -> anyhow::Result<()> {
    if args.high < args.low {
        anyhow::bail!("zone high {} is below zone low {}", args.high, args.low);
    }
    let day_type = DayClassifier::new(config.day_classifier.clone())
        .classify(args.open, args.high, args.low, args.pcr);
    println!("{day_type}");
    Ok(())
}

fn optional(value: Option<Decimal>) -> String {
    value.map_or_else(|| "-".to_string(), |v| v.round_dp(2).to_string())
}

fn report_table(report: &PerformanceReport) -> Table {
    let mut table = Table::new();
    table.set_header(vec!["Metric", "Value"]);
    let rows = [
        ("Total trades", report.total_trades.to_string()),
        ("Winning trades", report.winning_trades.to_string()),
        ("Losing trades", report.losing_trades.to_string()),
        ("Win rate %", optional(report.win_rate_pct)),
        ("Total PnL", report.total_pnl.round_dp(2).to_string()),
        ("Gross profit", report.gross_profit.round_dp(2).to_string()),
        ("Gross loss", report.gross_loss.round_dp(2).to_string()),
        ("Profit factor", optional(report.profit_factor)),
        ("Average win", report.average_win.round_dp(2).to_string()),
        ("Average loss", report.average_loss.round_dp(2).to_string()),
        ("Payoff ratio", optional(report.payoff_ratio)),
        ("Max drawdown", report.max_drawdown.round_dp(2).to_string()),
        (
            "Avg holding period",
            humantime::format_duration(report.average_holding_period).to_string(),
        ),
    ];
    for (metric, value) in rows {
        table.add_row(vec![metric.to_string(), value]);
    }
    table
}

fn trades_table(trades: &[Trade]) -> Table {
    let mut table = Table::new();
    table.set_header(vec![
        "Instrument", "Option", "Template", "Direction", "Entry time", "Entry", "Exit", "PnL",
    ]);
    for trade in trades {
        table.add_row(vec![
            trade.underlying_instrument.clone(),
            trade.traded_instrument.clone(),
            trade.template.to_string(),
            trade.direction.to_string(),
            trade.entry_time.format("%Y-%m-%d %H:%M").to_string(),
            trade.entry_price.to_string(),
            trade.exit_price.to_string(),
            trade.pnl.to_string(),
        ]);
    }
    table
}

fn print_open_positions(positions: &[Position]) {
    for position in positions {
        println!(
            "Still open: {} {} {} from {} (stop {})",
            position.underlying_instrument,
            position.direction,
            position.traded_instrument,
            position.entry_price,
            position.stop_loss_price
        );
    }
}

fn print_result(result: &BacktestResult) {
    println!("{}", report_table(&result.report));
    if !result.trades.is_empty() {
        println!("{}", trades_table(&result.trades));
    }
    print_open_positions(&result.open_positions);
    for discrepancy in &result.discrepancies {
        println!("Reconciliation: {discrepancy:?}");
    }
}
