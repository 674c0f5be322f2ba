//! CLI definition and dispatch.

use chrono::{Local, NaiveDate};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use crate::adapters::asset_csv_adapter::AssetCsvAdapter;
use crate::adapters::csv_adapter::CsvAdapter;
use crate::adapters::earnings_csv_adapter::EarningsCsvAdapter;
use crate::adapters::file_config_adapter::FileConfigAdapter;
use crate::adapters::ledger_csv_adapter::LedgerCsvAdapter;
use crate::adapters::report_adapter::FileReportAdapter;
use crate::domain::backtest::{self as backtest_engine, BacktestConfig};
use crate::domain::config_validation::{parse_date, validate_config};
use crate::domain::error::SwingscanError;
use crate::domain::ledger::{DEFAULT_BASE_CAPITAL, capital_from_ledger};
use crate::domain::metrics::Summary;
use crate::domain::pivot::PivotConfig;
use crate::domain::risk::RiskConfig;
use crate::domain::scanner::{self, ScanReport};
use crate::domain::signal::StrategyConfig;
use crate::ports::asset_port::AssetPort;
use crate::ports::config_port::ConfigPort;
use crate::ports::earnings_port::{EarningsPort, NoEarnings};
use crate::ports::ledger_port::LedgerPort;
use crate::ports::notify_port::{LogNotifier, NotifyPort};
use crate::ports::report_port::ReportPort;

pub const DEFAULT_WEBHOOK_TIMEOUT_SECS: i64 = 10;

#[derive(Parser, Debug)]
#[command(name = "swingscan", about = "Swing-trade signal scanner and backtester")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run a walk-forward backtest over the asset list
    Backtest {
        #[arg(short, long)]
        config: PathBuf,
        /// Directory for the trades CSV, equity CSV and equity chart
        #[arg(short, long)]
        output_dir: Option<PathBuf>,
    },
    /// Evaluate today's bars and send signals
    Scan {
        #[arg(short, long)]
        config: PathBuf,
        /// Capital to size positions with instead of the ledger value
        #[arg(long)]
        capital: Option<f64>,
        /// Log signals instead of posting them
        #[arg(long)]
        dry_run: bool,
    },
    /// Recompute capital from the operations ledger
    Capital {
        #[arg(short, long)]
        config: PathBuf,
    },
    /// Validate a configuration file
    Validate {
        #[arg(short, long)]
        config: PathBuf,
    },
}

pub fn run(cli: Cli) -> ExitCode {
    let result = match cli.command {
        Command::Backtest { config, output_dir } => run_backtest(&config, output_dir.as_deref()),
        Command::Scan {
            config,
            capital,
            dry_run,
        } => run_scan(&config, capital, dry_run),
        Command::Capital { config } => run_capital(&config),
        Command::Validate { config } => run_validate(&config),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            (&e).into()
        }
    }
}

pub fn load_config(path: &Path) -> Result<FileConfigAdapter, SwingscanError> {
    eprintln!("Loading config from {}", path.display());
    let adapter = FileConfigAdapter::from_file(path)?;
    validate_config(&adapter)?;
    Ok(adapter)
}

fn get_usize(
    config: &dyn ConfigPort,
    section: &str,
    key: &str,
    default: usize,
) -> Result<usize, SwingscanError> {
    let value = config.get_int(section, key, default as i64);
    usize::try_from(value).map_err(|_| SwingscanError::ConfigInvalid {
        section: section.to_string(),
        key: key.to_string(),
        reason: format!("{} must be non-negative", key),
    })
}

fn required_path(config: &dyn ConfigPort, section: &str, key: &str) -> Result<PathBuf, SwingscanError> {
    config
        .get_non_blank(section, key)
        .map(PathBuf::from)
        .ok_or_else(|| SwingscanError::ConfigMissing {
            section: section.to_string(),
            key: key.to_string(),
        })
}

fn optional_path(config: &dyn ConfigPort, section: &str, key: &str) -> Option<PathBuf> {
    config.get_non_blank(section, key).map(PathBuf::from)
}

pub fn build_strategy_config(config: &dyn ConfigPort) -> Result<StrategyConfig, SwingscanError> {
    let d = StrategyConfig::default();
    let dp = PivotConfig::default();
    let dr = RiskConfig::default();

    Ok(StrategyConfig {
        rsi_lower: config.get_double("strategy", "rsi_lower", d.rsi_lower),
        rsi_upper: config.get_double("strategy", "rsi_upper", d.rsi_upper),
        rsi_strong: config.get_double("strategy", "rsi_strong", d.rsi_strong),
        min_risk_reward: config.get_double("strategy", "min_risk_reward", d.min_risk_reward),
        target_rr: config.get_double("strategy", "target_rr", d.target_rr),
        pivot_buffer: config.get_double("strategy", "pivot_buffer", d.pivot_buffer),
        earnings_window_days: config.get_int(
            "strategy",
            "earnings_window_days",
            d.earnings_window_days,
        ),
        risk: RiskConfig {
            risk_pct: config.get_double("strategy", "risk_pct", dr.risk_pct),
            min_investment: config.get_double("strategy", "min_investment", dr.min_investment),
            min_net_profit: config.get_double("strategy", "min_net_profit", dr.min_net_profit),
            commission: config.get_double("strategy", "commission", dr.commission),
        },
        pivot: PivotConfig {
            lookback: get_usize(config, "pivot", "lookback", dp.lookback)?,
            left: get_usize(config, "pivot", "left", dp.left)?,
            right: get_usize(config, "pivot", "right", dp.right)?,
        },
    })
}

pub fn build_backtest_config(config: &dyn ConfigPort) -> Result<BacktestConfig, SwingscanError> {
    let d = BacktestConfig::default();

    let start_date = config
        .get_non_blank("backtest", "start_date")
        .map(|s| parse_date(&s, "backtest", "start_date"))
        .transpose()?;

    Ok(BacktestConfig {
        initial_capital: config.get_double("backtest", "initial_capital", d.initial_capital),
        start_date,
        history_days: config.get_int("backtest", "history_days", d.history_days),
        lookahead_bars: get_usize(config, "backtest", "lookahead_bars", d.lookahead_bars)?,
        min_enriched_bars: get_usize(config, "backtest", "min_enriched_bars", d.min_enriched_bars)?,
        book_stops_as_losses: config.get_bool(
            "backtest",
            "book_stops_as_losses",
            d.book_stops_as_losses,
        ),
    })
}

fn build_earnings(config: &dyn ConfigPort) -> Result<Box<dyn EarningsPort>, SwingscanError> {
    match optional_path(config, "data", "earnings_file") {
        Some(path) => Ok(Box::new(EarningsCsvAdapter::from_file(path)?)),
        None => {
            log::warn!("no earnings calendar configured; earnings filter disabled");
            Ok(Box::new(NoEarnings))
        }
    }
}

fn build_ledger(config: &dyn ConfigPort) -> Result<LedgerCsvAdapter, SwingscanError> {
    Ok(LedgerCsvAdapter::new(
        required_path(config, "ledger", "file")?,
        optional_path(config, "ledger", "capital_file").unwrap_or_else(|| PathBuf::from("capital.txt")),
        optional_path(config, "ledger", "history_file")
            .unwrap_or_else(|| PathBuf::from("capital_history.csv")),
    ))
}

fn today() -> NaiveDate {
    Local::now().date_naive()
}

fn run_backtest(config_path: &Path, output_dir: Option<&Path>) -> Result<(), SwingscanError> {
    let config = load_config(config_path)?;
    let strategy = build_strategy_config(&config)?;
    let bt_config = build_backtest_config(&config)?;

    let assets = AssetCsvAdapter::new(required_path(&config, "data", "assets_file")?).list_assets()?;
    let data = CsvAdapter::new(required_path(&config, "data", "prices_dir")?);
    let earnings = build_earnings(&config)?;

    let today = today();
    eprintln!(
        "Running backtest: {} assets from {}",
        assets.len(),
        bt_config.history_start(today)
    );

    let state =
        backtest_engine::run_backtest(&assets, &data, earnings.as_ref(), &strategy, &bt_config, today);
    let summary = Summary::compute(&state, bt_config.initial_capital);
    print_summary(&summary);

    let report = match output_dir {
        Some(dir) => FileReportAdapter::in_dir(dir),
        None => FileReportAdapter::new(
            optional_path(&config, "output", "trades_csv")
                .unwrap_or_else(|| PathBuf::from("backtest_trades.csv")),
            optional_path(&config, "output", "equity_csv")
                .unwrap_or_else(|| PathBuf::from("equity_curve.csv")),
            optional_path(&config, "output", "equity_svg")
                .unwrap_or_else(|| PathBuf::from("equity_curve.svg")),
        ),
    };
    report.write(&state, bt_config.initial_capital)
}

pub fn print_summary(summary: &Summary) {
    eprintln!("\n=== Backtest Results ===");
    eprintln!("Final Capital:    ${:.2}", summary.final_capital);
    eprintln!("Total Return:     {:.2}%", summary.total_return * 100.0);
    eprintln!("Total Trades:     {}", summary.total_trades);
    eprintln!(
        "Wins / Losses:    {} / {} ({} expired)",
        summary.wins, summary.losses, summary.expired
    );
    eprintln!("Win Rate:         {:.1}%", summary.win_rate * 100.0);
    eprintln!("Average Profit:   ${:.2}", summary.avg_profit);
    eprintln!("Max Drawdown:     ${:.2}", summary.max_drawdown);
    if let Some(best) = &summary.best_trade {
        eprintln!(
            "Largest Win:      ${:.2} ({} {})",
            best.profit, best.ticker, best.entry_date
        );
    }
    if let Some(worst) = &summary.worst_trade {
        eprintln!(
            "Largest Loss:     ${:.2} ({} {})",
            worst.profit, worst.ticker, worst.entry_date
        );
    }
}

/// Current capital from the ledger, persisted to the capital files.
fn refresh_capital(config: &dyn ConfigPort) -> Result<f64, SwingscanError> {
    let base = config.get_double("ledger", "base_capital", DEFAULT_BASE_CAPITAL);
    let ledger = build_ledger(config)?;
    let capital = capital_from_ledger(base, &ledger.closed_operations()?);
    ledger.record_capital(Local::now().naive_local(), capital)?;
    Ok(capital)
}

#[cfg(feature = "webhook")]
fn build_notifier(config: &dyn ConfigPort) -> Result<Box<dyn NotifyPort>, SwingscanError> {
    use crate::adapters::webhook_adapter::WebhookAdapter;

    let url = config
        .get_non_blank("webhook", "url")
        .ok_or_else(|| SwingscanError::ConfigMissing {
            section: "webhook".into(),
            key: "url".into(),
        })?;
    let timeout = config.get_int("webhook", "timeout_secs", DEFAULT_WEBHOOK_TIMEOUT_SECS);
    let timeout = std::time::Duration::from_secs(timeout.max(1) as u64);
    Ok(Box::new(WebhookAdapter::new(&url, timeout)?))
}

#[cfg(not(feature = "webhook"))]
fn build_notifier(_config: &dyn ConfigPort) -> Result<Box<dyn NotifyPort>, SwingscanError> {
    Err(SwingscanError::Notify {
        reason: "webhook feature is required to send signals; use --dry-run".into(),
    })
}

fn run_scan(config_path: &Path, capital: Option<f64>, dry_run: bool) -> Result<(), SwingscanError> {
    let config = load_config(config_path)?;
    let strategy = build_strategy_config(&config)?;

    let capital = match capital {
        Some(c) => c,
        None if optional_path(&config, "ledger", "file").is_some() => refresh_capital(&config)?,
        None => config.get_double("ledger", "base_capital", DEFAULT_BASE_CAPITAL),
    };
    eprintln!("Capital: ${:.2}", capital);

    let notifier: Box<dyn NotifyPort> = if dry_run {
        Box::new(LogNotifier)
    } else {
        build_notifier(&config)?
    };

    let assets = AssetCsvAdapter::new(required_path(&config, "data", "assets_file")?).list_assets()?;
    let data = CsvAdapter::new(required_path(&config, "data", "prices_dir")?);
    let earnings = build_earnings(&config)?;

    let report = scanner::scan(
        &assets,
        &data,
        earnings.as_ref(),
        notifier.as_ref(),
        &strategy,
        capital,
    );
    print_scan_report(&report);
    Ok(())
}

pub fn print_scan_report(report: &ScanReport) {
    eprintln!("\n=== Scan Results ===");
    eprintln!("Evaluated:        {}", report.evaluated);
    eprintln!("Skipped:          {}", report.skipped);
    eprintln!("Signals:          {}", report.signals);
    eprintln!("Sent:             {}", report.sent);
    eprintln!("Sector blocked:   {}", report.blocked_by_sector);
    eprintln!("Failed delivery:  {}", report.failed_deliveries);
    for ticker in &report.delivered {
        println!("{}", ticker);
    }
}

fn run_capital(config_path: &Path) -> Result<(), SwingscanError> {
    let config = load_config(config_path)?;
    let capital = refresh_capital(&config)?;
    println!("{:.2}", capital);
    eprintln!("Capital updated: ${:.2}", capital);
    Ok(())
}

fn run_validate(config_path: &Path) -> Result<(), SwingscanError> {
    let config = load_config(config_path)?;
    let strategy = build_strategy_config(&config)?;
    let bt_config = build_backtest_config(&config)?;

    eprintln!("\nStrategy:");
    eprintln!(
        "  risk {:.2}% per trade, commission ${:.2}, min investment ${:.2}, min net profit ${:.2}",
        strategy.risk.risk_pct,
        strategy.risk.commission,
        strategy.risk.min_investment,
        strategy.risk.min_net_profit
    );
    eprintln!(
        "  RSI {}..{}, min R/R {:.2}, fallback target {:.2}R, pivot buffer {}",
        strategy.rsi_lower,
        strategy.rsi_upper,
        strategy.min_risk_reward,
        strategy.target_rr,
        strategy.pivot_buffer
    );
    eprintln!(
        "  pivots: last {} bars, {} left / {} right",
        strategy.pivot.lookback, strategy.pivot.left, strategy.pivot.right
    );

    eprintln!("\nBacktest:");
    eprintln!(
        "  initial capital ${:.2}, history from {}, {} bar lookahead, {} bars before first signal",
        bt_config.initial_capital,
        bt_config.history_start(today()),
        bt_config.lookahead_bars,
        bt_config.min_enriched_bars
    );

    eprintln!("\nConfiguration is valid");
    Ok(())
}
