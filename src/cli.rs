//! CLI definition and dispatch.

use clap::{Parser, Subcommand};
use std::fmt::Write as _;
use std::path::PathBuf;
use std::process::ExitCode;

use crate::adapters::file_config_adapter::FileConfigAdapter;
use crate::adapters::{market_data_from_config, watchlist_store_from_config};
use crate::domain::config_validation::{provider_kind, store_kind, validate_config};
use crate::domain::error::ScreenerError;
use crate::domain::format::{fmt_opt, fmt_pct};
use crate::domain::screen::{screen_all, screen_ticker, ScreenReport, ScreenResult};
use crate::domain::swing::SwingThresholds;
use crate::domain::ticker::{parse_tickers, Ticker};
use crate::domain::watchlist::Watchlist;
use crate::ports::config_port::ConfigPort;
use crate::ports::report_port::ScanView;
use crate::ports::watchlist_port::WatchlistStore;

#[derive(Parser, Debug)]
#[command(name = "qvmscreen", about = "Quality/value/momentum stock screener")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Score a single ticker
    Score {
        ticker: String,
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
    /// Screen the watchlist (or the given tickers)
    Scan {
        #[arg(short, long)]
        config: Option<PathBuf>,
        /// Write an HTML report to this path
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// cards or ranking
        #[arg(long, default_value = "cards")]
        view: String,
        /// Comma-separated tickers instead of the watchlist
        #[arg(long)]
        tickers: Option<String>,
    },
    /// Show or edit the watchlist
    Watchlist {
        #[arg(short, long, global = true)]
        config: Option<PathBuf>,
        #[command(subcommand)]
        action: WatchlistAction,
    },
    /// Start the web dashboard
    Serve {
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
    /// Check a configuration file and exit
    ValidateConfig {
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum WatchlistAction {
    List,
    Add { ticker: String },
    Remove { ticker: String },
}

pub fn run(cli: Cli) -> ExitCode {
    match cli.command {
        Command::Score { ticker, config } => run_score(&ticker, config.as_ref()),
        Command::Scan {
            config,
            output,
            view,
            tickers,
        } => run_scan(config.as_ref(), output.as_ref(), &view, tickers.as_deref()),
        Command::Watchlist { config, action } => run_watchlist(config.as_ref(), &action),
        Command::Serve { config } => run_serve(config.as_ref()),
        Command::ValidateConfig { config } => run_validate_config(config.as_ref()),
    }
}

/// Load and validate the configuration, falling back to the built-in
/// defaults when no file is given.
pub fn load_config(path: Option<&PathBuf>) -> Result<FileConfigAdapter, ExitCode> {
    let adapter = match path {
        Some(path) => {
            eprintln!("Loading config from {}", path.display());
            FileConfigAdapter::from_file(path).map_err(|e| fail(&e))?
        }
        None => FileConfigAdapter::defaults(),
    };
    validate_config(&adapter).map_err(|e| fail(&e))?;
    init_logging(&adapter);
    Ok(adapter)
}

fn fail(err: &ScreenerError) -> ExitCode {
    eprintln!("error: {err}");
    err.into()
}

fn finish(result: Result<(), ScreenerError>) -> ExitCode {
    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => fail(&e),
    }
}

/// `RUST_LOG` wins over `[logging] level`. Events go to stderr so stdout
/// stays clean for results.
fn init_logging(config: &dyn ConfigPort) {
    let level = config
        .get_non_empty("logging", "level")
        .unwrap_or_else(|| "info".to_string());
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

fn runtime() -> Result<tokio::runtime::Runtime, ScreenerError> {
    Ok(tokio::runtime::Runtime::new()?)
}

pub fn build_thresholds(config: &dyn ConfigPort) -> SwingThresholds {
    let defaults = SwingThresholds::default();
    SwingThresholds {
        volume_multiplier: config.get_double(
            "screen",
            "volume_multiplier",
            defaults.volume_multiplier,
        ),
        atr_threshold: config.get_double("screen", "atr_threshold", defaults.atr_threshold),
    }
}

/// The persisted watchlist, or the stock list when nothing is saved yet.
pub fn load_watchlist(store: &dyn WatchlistStore) -> Result<Watchlist, ScreenerError> {
    match store.load()? {
        Some(list) => Ok(list),
        None => Watchlist::with_defaults(chrono::Local::now().date_naive()),
    }
}

/// Plain-text score card.
pub fn format_result(result: &ScreenResult) -> String {
    let f = &result.fundamentals;
    let s = &result.indicators;
    let mut out = String::new();

    let name = f.name.as_deref().unwrap_or("");
    let _ = writeln!(out, "{} {}", result.ticker, name);
    let _ = writeln!(
        out,
        "  QVM {:.0}  (quality {:.0}, value {:.0}, momentum {:.0})",
        result.score.composite, result.score.quality, result.score.value, result.score.momentum
    );
    let _ = writeln!(
        out,
        "  P/E {}  P/B {}  yield {}  ROE {}  margin {}  growth {}",
        fmt_opt(f.pe_ratio, 1),
        fmt_opt(f.pb_ratio, 1),
        fmt_opt(f.dividend_yield, 2),
        fmt_opt(f.roe, 1),
        fmt_opt(f.operating_margin, 1),
        fmt_opt(f.revenue_growth, 1),
    );
    let _ = writeln!(
        out,
        "  price {}  SMA50 {}  SMA200 {}  RSI {}  1m {}  3m {}  6m {}",
        fmt_opt(s.price, 2),
        fmt_opt(s.sma50, 2),
        fmt_opt(s.sma200, 2),
        fmt_opt(s.rsi, 1),
        fmt_pct(s.perf_1m),
        fmt_pct(s.perf_3m),
        fmt_pct(s.perf_6m),
    );
    let checks: Vec<String> = result
        .swing
        .labelled()
        .iter()
        .map(|(label, passed)| format!("{}{}", label, if *passed { "+" } else { "-" }))
        .collect();
    let _ = writeln!(
        out,
        "  swing {}/4: {}",
        result.swing.passed(),
        checks.join(" ")
    );
    let missing = s.missing();
    if !missing.is_empty() {
        let _ = writeln!(out, "  not enough history for {}", missing.join(", "));
    }
    out
}

/// One line per ticker, best composite first.
pub fn format_ranking(report: &ScreenReport) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "{:>3}  {:<6} {:>5} {:>5} {:>5} {:>5} {:>10} {:>7} {:>6}",
        "#", "TICKER", "QVM", "Q", "V", "M", "PRICE", "1M", "SWING"
    );
    for (i, r) in report.ranked().iter().enumerate() {
        let _ = writeln!(
            out,
            "{:>3}  {:<6} {:>5.0} {:>5.0} {:>5.0} {:>5.0} {:>10} {:>7} {:>4}/4",
            i + 1,
            r.ticker.as_str(),
            r.score.composite,
            r.score.quality,
            r.score.value,
            r.score.momentum,
            fmt_opt(r.indicators.price, 2),
            fmt_pct(r.indicators.perf_1m),
            r.swing.passed(),
        );
    }
    out
}

/// Tickers passing all four swing checks, best composite first.
pub fn format_swing_candidates(report: &ScreenReport) -> String {
    let tickers: Vec<&str> = report
        .swing_candidates()
        .iter()
        .map(|r| r.ticker.as_str())
        .collect();
    if tickers.is_empty() {
        "Swing candidates: none".to_string()
    } else {
        format!("Swing candidates: {}", tickers.join(", "))
    }
}

fn run_score(ticker: &str, config_path: Option<&PathBuf>) -> ExitCode {
    let config = match load_config(config_path) {
        Ok(c) => c,
        Err(code) => return code,
    };
    finish(score_one(ticker, &config))
}

fn score_one(ticker: &str, config: &dyn ConfigPort) -> Result<(), ScreenerError> {
    let ticker = Ticker::parse(ticker)?;
    let port = market_data_from_config(config)?;
    let thresholds = build_thresholds(config);

    eprintln!("Fetching {} from {}", ticker, port.name());
    let result = runtime()?.block_on(screen_ticker(port.as_ref(), &ticker, &thresholds))?;
    print!("{}", format_result(&result));
    Ok(())
}

fn run_scan(
    config_path: Option<&PathBuf>,
    output: Option<&PathBuf>,
    view: &str,
    tickers: Option<&str>,
) -> ExitCode {
    let view: ScanView = match view.parse() {
        Ok(v) => v,
        Err(reason) => {
            eprintln!("error: {reason}");
            return ExitCode::from(2);
        }
    };
    let config = match load_config(config_path) {
        Ok(c) => c,
        Err(code) => return code,
    };
    finish(scan(&config, output, view, tickers))
}

fn scan(
    config: &dyn ConfigPort,
    output: Option<&PathBuf>,
    view: ScanView,
    tickers: Option<&str>,
) -> Result<(), ScreenerError> {
    let tickers = match tickers {
        Some(raw) => parse_tickers(raw)?,
        None => {
            let store = watchlist_store_from_config(config)?;
            load_watchlist(store.as_ref())?.tickers()
        }
    };
    let port = market_data_from_config(config)?;
    let thresholds = build_thresholds(config);

    eprintln!("Screening {} tickers via {}", tickers.len(), port.name());
    let report = runtime()?.block_on(screen_all(port.as_ref(), &tickers, &thresholds));

    match view {
        ScanView::Ranking => print!("{}", format_ranking(&report)),
        ScanView::Cards => {
            for result in report.ranked() {
                println!("{}", format_result(result));
            }
        }
    }
    if !report.results.is_empty() {
        println!("{}", format_swing_candidates(&report));
    }
    for failure in &report.failures {
        eprintln!("skipped {}: {}", failure.ticker, failure.message);
    }
    if let Some(leaders) = report.leaders() {
        eprintln!(
            "Average QVM {:.1}; best quality {}, best value {}, best momentum {}",
            leaders.average_composite,
            leaders.best_quality.ticker,
            leaders.best_value.ticker,
            leaders.best_momentum.ticker
        );
    }

    if let Some(path) = output {
        write_report(&report, view, port.name(), path)?;
        eprintln!("Report written to {}", path.display());
    }
    Ok(())
}

#[cfg(feature = "web")]
fn write_report(
    report: &ScreenReport,
    view: ScanView,
    provider: &str,
    path: &std::path::Path,
) -> Result<(), ScreenerError> {
    use crate::adapters::html_report_adapter::HtmlReportAdapter;
    use crate::ports::report_port::{ReportMeta, ReportPort};

    let meta = ReportMeta {
        provider,
        generated: chrono::Local::now().naive_local(),
    };
    HtmlReportAdapter::new().write(report, view, &meta, path)
}

#[cfg(not(feature = "web"))]
fn write_report(
    _report: &ScreenReport,
    _view: ScanView,
    _provider: &str,
    _path: &std::path::Path,
) -> Result<(), ScreenerError> {
    Err(ScreenerError::ConfigInvalid {
        section: "scan".into(),
        key: "output".into(),
        reason: "HTML reports need the web feature".into(),
    })
}

fn run_watchlist(config_path: Option<&PathBuf>, action: &WatchlistAction) -> ExitCode {
    let config = match load_config(config_path) {
        Ok(c) => c,
        Err(code) => return code,
    };
    let result = watchlist_store_from_config(&config)
        .and_then(|store| apply_watchlist_action(store.as_ref(), action));
    match result {
        Ok(lines) => {
            for line in lines {
                println!("{line}");
            }
            ExitCode::SUCCESS
        }
        Err(e) => fail(&e),
    }
}

/// Run one watchlist command against a store, saving only when the set
/// changed. Returns the lines to print.
pub fn apply_watchlist_action(
    store: &dyn WatchlistStore,
    action: &WatchlistAction,
) -> Result<Vec<String>, ScreenerError> {
    let mut list = load_watchlist(store)?;
    match action {
        WatchlistAction::List => Ok(list
            .list()
            .iter()
            .map(|e| format!("{:<6} {}", e.ticker.as_str(), e.added.format("%Y-%m-%d")))
            .collect()),
        WatchlistAction::Add { ticker } => {
            let ticker = Ticker::parse(ticker)?;
            if list.add(ticker.clone(), chrono::Local::now().date_naive()) {
                store.save(&list)?;
                tracing::info!(ticker = %ticker, "added to watchlist");
                Ok(vec![format!("Added {ticker}")])
            } else {
                Ok(vec![format!("{ticker} is already on the watchlist")])
            }
        }
        WatchlistAction::Remove { ticker } => {
            let ticker = Ticker::parse(ticker)?;
            if list.remove(&ticker) {
                store.save(&list)?;
                tracing::info!(ticker = %ticker, "removed from watchlist");
                Ok(vec![format!("Removed {ticker}")])
            } else {
                Ok(vec![format!("{ticker} was not on the watchlist")])
            }
        }
    }
}

fn run_validate_config(config_path: Option<&PathBuf>) -> ExitCode {
    let config = match load_config(config_path) {
        Ok(c) => c,
        Err(code) => return code,
    };
    eprintln!(
        "Configuration is valid: provider {}, watchlist store {}",
        provider_kind(&config),
        store_kind(&config)
    );
    ExitCode::SUCCESS
}

fn run_serve(config_path: Option<&PathBuf>) -> ExitCode {
    #[cfg(feature = "web")]
    {
        let config = match load_config(config_path) {
            Ok(c) => c,
            Err(code) => return code,
        };
        finish(serve(&config))
    }

    #[cfg(not(feature = "web"))]
    {
        let _ = config_path;
        eprintln!("error: web feature is required for serve");
        ExitCode::from(1)
    }
}

#[cfg(feature = "web")]
fn serve(config: &dyn ConfigPort) -> Result<(), ScreenerError> {
    use crate::adapters::web::{build_router, AppState};
    use std::net::SocketAddr;

    let market_data = market_data_from_config(config)?;
    let store = watchlist_store_from_config(config)?;
    let watchlist = load_watchlist(store.as_ref())?;
    let thresholds = build_thresholds(config);

    let listen = config
        .get_non_empty("web", "listen")
        .unwrap_or_else(|| "127.0.0.1:3000".to_string());
    let addr: SocketAddr = listen.parse().map_err(|_| ScreenerError::ConfigInvalid {
        section: "web".into(),
        key: "listen".into(),
        reason: format!("not a socket address: {listen}"),
    })?;

    tracing::info!(
        provider = market_data.name(),
        tickers = watchlist.len(),
        "loaded watchlist"
    );
    let router = build_router(AppState::new(market_data, store, watchlist, thresholds));

    eprintln!("Starting web server on http://{}", addr);
    runtime()?.block_on(async {
        let listener = tokio::net::TcpListener::bind(addr).await?;
        axum::serve(listener, router)
            .with_graceful_shutdown(async {
                let _ = tokio::signal::ctrl_c().await;
            })
            .await?;
        Ok::<(), ScreenerError>(())
    })
}
