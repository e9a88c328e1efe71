//! Horizon CLI: config check, CSV replay, and synthetic simulation commands.
//!
//! Commands:
//! - `check`: validate a TOML config and print per-horizon warm-start needs
//! - `replay`: drive the trader from a CSV of prices and recorded probabilities
//! - `simulate`: drive the trader from a seeded random walk and the momentum oracle
//!
//! Both drivers trade against the in-memory paper exchange. Log verbosity is
//! controlled with `RUST_LOG` (default `info`).

use anyhow::{bail, Context, Result};
use chrono::{DateTime, Duration, Utc};
use clap::{Parser, Subcommand};
use horizon_core::collaborators::{Exchange, HistoricalPrice, Oracle};
use horizon_core::config::TraderConfig;
use horizon_core::engine::{fetch_length, required_history, valid_start_index};
use horizon_core::paper::{
    MomentumOracle, PaperExchange, RandomWalk, RecordedOracle, VecHistoryStore,
};
use horizon_core::trader::{TickReport, Trader, WarmStartReport};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

#[derive(Parser)]
#[command(
    name = "horizon",
    about = "Horizon: multi-horizon signal aggregation and order reconciliation"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate a config and print each horizon's warm-start requirement.
    Check {
        /// Path to a TOML config file.
        #[arg(long)]
        config: PathBuf,
    },
    /// Replay recorded ticks against the paper exchange.
    Replay {
        /// Path to a TOML config file.
        #[arg(long)]
        config: PathBuf,

        /// Tick CSV: `price`, optional `p_up`, optional one column per horizon name.
        #[arg(long)]
        ticks: PathBuf,

        /// History CSV for warm-start: `price`, optional RFC 3339 `timestamp`.
        #[arg(long)]
        history: Option<PathBuf>,

        /// Starting held exposure in native units.
        #[arg(long, default_value_t = 0.0)]
        position: f64,
    },
    /// Simulate a seeded random walk with the momentum oracle.
    Simulate {
        /// Path to a TOML config file.
        #[arg(long)]
        config: PathBuf,

        /// Number of live ticks.
        #[arg(long, default_value_t = 1_000)]
        ticks: usize,

        /// Master seed for the price paths.
        #[arg(long, default_value_t = 42)]
        seed: u64,

        /// Starting price.
        #[arg(long, default_value_t = 100.0)]
        start: f64,

        /// Per-tick volatility of the walk.
        #[arg(long, default_value_t = 0.002)]
        volatility: f64,

        /// Logistic gain of the momentum oracle.
        #[arg(long, default_value_t = 1.0)]
        gain: f64,

        /// Start cold instead of warm-starting from a synthetic history.
        #[arg(long, default_value_t = false)]
        cold: bool,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Check { config } => run_check(&config),
        Commands::Replay {
            config,
            ticks,
            history,
            position,
        } => run_replay(&config, &ticks, history.as_deref(), position),
        Commands::Simulate {
            config,
            ticks,
            seed,
            start,
            volatility,
            gain,
            cold,
        } => run_simulate(&config, ticks, seed, start, volatility, gain, cold),
    }
}

fn load_config(path: &Path) -> Result<TraderConfig> {
    TraderConfig::from_file(path).with_context(|| format!("loading config {}", path.display()))
}

fn run_check(path: &Path) -> Result<()> {
    let config = load_config(path)?;

    println!("Config OK: {}", path.display());
    println!(
        "  unit_size={}  min_order_size={}  parallel_engines={}",
        config.unit_size,
        config
            .min_order_size
            .map_or_else(|| "none".to_string(), |m| m.to_string()),
        config.parallel_engines
    );
    println!();
    println!(
        "  {:<12} {:>6} {:>6} {:>8} {:>8} {:>6} {:>9}  {}",
        "horizon", "k", "p", "rikaku", "sonkiri", "skip", "required", "fingerprint"
    );
    for h in &config.horizons {
        println!(
            "  {:<12} {:>6} {:>6} {:>8} {:>8} {:>6} {:>9}  {}",
            h.name,
            h.k,
            h.p,
            h.rikaku,
            h.sonkiri,
            valid_start_index(h),
            required_history(h),
            h.fingerprint().short()
        );
    }
    println!();
    println!(
        "  history query size: {} (margin {})",
        fetch_length(&config.horizons, config.history_margin),
        config.history_margin
    );
    Ok(())
}

// ── Replay ───────────────────────────────────────────────────────────

/// One tick read from the replay CSV.
struct TickRow {
    price: f64,
    oracle: RecordedOracle,
}

fn read_ticks(path: &Path, config: &TraderConfig) -> Result<Vec<TickRow>> {
    let mut reader =
        csv::Reader::from_path(path).with_context(|| format!("opening {}", path.display()))?;
    let headers = reader.headers()?.clone();

    let column = |name: &str| headers.iter().position(|h| h.trim() == name);
    let Some(price_col) = column("price") else {
        bail!("{}: missing 'price' column", path.display());
    };
    let shared_col = column("p_up");
    let horizon_cols: Vec<(String, usize)> = config
        .horizons
        .iter()
        .filter_map(|h| column(&h.name).map(|i| (h.name.clone(), i)))
        .collect();
    if shared_col.is_none() && horizon_cols.is_empty() {
        bail!(
            "{}: need a 'p_up' column or a column named after a horizon",
            path.display()
        );
    }

    let parse = |record: &csv::StringRecord, col: usize, line: usize| -> Result<Option<f64>> {
        match record.get(col).map(str::trim) {
            None | Some("") => Ok(None),
            Some(raw) => raw
                .parse::<f64>()
                .map(Some)
                .with_context(|| format!("{}:{line}: bad number '{raw}'", path.display())),
        }
    };

    let mut rows = Vec::new();
    for (i, record) in reader.records().enumerate() {
        let record = record?;
        let line = i + 2;
        let Some(price) = parse(&record, price_col, line)? else {
            bail!("{}:{line}: empty price", path.display());
        };
        let shared = match shared_col {
            Some(col) => parse(&record, col, line)?,
            None => None,
        };
        let mut oracle = RecordedOracle::empty().with_shared(shared);
        for (name, col) in &horizon_cols {
            if let Some(p) = parse(&record, *col, line)? {
                oracle = oracle.with_horizon(name.clone(), p);
            }
        }
        rows.push(TickRow { price, oracle });
    }
    Ok(rows)
}

fn read_history(path: &Path) -> Result<VecHistoryStore> {
    let mut reader =
        csv::Reader::from_path(path).with_context(|| format!("opening {}", path.display()))?;
    let headers = reader.headers()?.clone();
    let Some(price_col) = headers.iter().position(|h| h.trim() == "price") else {
        bail!("{}: missing 'price' column", path.display());
    };
    let ts_col = headers.iter().position(|h| h.trim() == "timestamp");

    let mut prices = Vec::new();
    let mut samples = Vec::new();
    for (i, record) in reader.records().enumerate() {
        let record = record?;
        let line = i + 2;
        let raw = record.get(price_col).unwrap_or("").trim();
        let price: f64 = raw
            .parse()
            .with_context(|| format!("{}:{line}: bad price '{raw}'", path.display()))?;
        match ts_col.and_then(|c| record.get(c)) {
            Some(ts) => {
                let timestamp = DateTime::parse_from_rfc3339(ts.trim())
                    .with_context(|| format!("{}:{line}: bad timestamp '{ts}'", path.display()))?
                    .with_timezone(&Utc);
                samples.push(HistoricalPrice { timestamp, price });
            }
            None => prices.push(price),
        }
    }

    if ts_col.is_some() {
        Ok(VecHistoryStore::new(samples))
    } else {
        Ok(VecHistoryStore::from_prices(
            &prices,
            Utc::now(),
            Duration::minutes(1),
        ))
    }
}

fn run_replay(
    config_path: &Path,
    ticks_path: &Path,
    history_path: Option<&Path>,
    position: f64,
) -> Result<()> {
    let config = load_config(config_path)?;
    let rows = read_ticks(ticks_path, &config)?;
    let mut trader = Trader::new(config)?;

    if let Some(path) = history_path {
        let store = read_history(path)?;
        print_warm_start(&trader.warm_start(&store));
    }

    let mut exchange = PaperExchange::new().with_position(position);
    let mut stats = RunStats::default();
    for row in &rows {
        exchange.push_price(row.price);
        run_one(&mut trader, &mut exchange, &row.oracle, &mut stats);
    }

    print_summary(&trader, &exchange, &stats);
    Ok(())
}

// ── Simulate ─────────────────────────────────────────────────────────

#[allow(clippy::too_many_arguments)]
fn run_simulate(
    config_path: &Path,
    ticks: usize,
    seed: u64,
    start: f64,
    volatility: f64,
    gain: f64,
    cold: bool,
) -> Result<()> {
    if !(start > 0.0) {
        bail!("--start must be positive");
    }
    if !(volatility >= 0.0 && volatility < 1.0) {
        bail!("--volatility must be within [0, 1)");
    }

    let config = load_config(config_path)?;
    let history_len = fetch_length(&config.horizons, config.history_margin);
    let mut trader = Trader::new(config)?;
    let oracle = MomentumOracle::new(gain);

    let mut live_start = start;
    if !cold {
        let history: Vec<f64> = RandomWalk::labelled(seed, "history", start, volatility)
            .take(history_len)
            .collect();
        live_start = history.last().copied().unwrap_or(start);
        let store = VecHistoryStore::from_prices(&history, Utc::now(), Duration::minutes(1));
        print_warm_start(&trader.warm_start(&store));
    }

    info!(ticks, seed, start = live_start, volatility, gain, "simulating");
    let mut exchange = PaperExchange::with_prices(
        RandomWalk::labelled(seed, "live", live_start, volatility).take(ticks),
    );
    let mut stats = RunStats::default();
    while exchange.remaining_prices() > 0 {
        run_one(&mut trader, &mut exchange, &oracle, &mut stats);
    }

    print_summary(&trader, &exchange, &stats);
    Ok(())
}

// ── Shared driver ────────────────────────────────────────────────────

#[derive(Default)]
struct RunStats {
    ticks: usize,
    orders: usize,
    engine_errors: usize,
    tick_errors: usize,
    max_abs_lots: i64,
}

impl RunStats {
    fn record(&mut self, report: &TickReport) {
        self.ticks += 1;
        self.engine_errors += report.outcome.errors().count();
        self.max_abs_lots = self.max_abs_lots.max(report.outcome.net_lots.abs());
        if report.order.is_some() {
            self.orders += 1;
        }
    }
}

fn run_one(
    trader: &mut Trader,
    exchange: &mut PaperExchange,
    oracle: &dyn Oracle,
    stats: &mut RunStats,
) {
    if let Err(err) = exchange.cancel_all() {
        warn!(error = %err, "cancel_all failed");
    }
    match trader.run_tick(exchange, oracle) {
        Ok(report) => stats.record(&report),
        Err(err) => {
            stats.ticks += 1;
            stats.tick_errors += 1;
            warn!(error = %err, "tick failed");
        }
    }
}

fn print_warm_start(report: &WarmStartReport) {
    println!(
        "Warm start: requested {} samples, received {}",
        report.requested, report.received
    );
    if let Some(err) = &report.store_error {
        println!("  store error: {err}");
    }
    if let Some(quality) = &report.quality {
        for issue in &quality.issues {
            println!("  quality: {issue}");
        }
    }
    for (name, result) in &report.engines {
        match result {
            Ok(()) => println!("  {name:<12} warmed"),
            Err(err) => println!("  {name:<12} cold ({err})"),
        }
    }
    println!();
}

fn print_summary(trader: &Trader, exchange: &PaperExchange, stats: &RunStats) {
    println!("=== Run Summary ===");
    println!("Ticks:          {}", stats.ticks);
    println!("Tick errors:    {}", stats.tick_errors);
    println!("Engine errors:  {}", stats.engine_errors);
    println!("Orders placed:  {}", stats.orders);
    println!("Traded volume:  {:.6}", exchange.traded_volume());
    println!("Max |net lots|: {}", stats.max_abs_lots);
    println!("Final net lots: {}", trader.net_lots());
    println!("Final position: {:.6}", exchange.held());
    if let Some(price) = exchange.last_price() {
        println!("Last price:     {price:.4}");
    }
    println!();
    for engine in trader.engines() {
        let position = match engine.position().side() {
            Some(side) => side.to_string(),
            None => "FLAT".to_string(),
        };
        println!(
            "  {:<12} {:<6} signal={:>2}  ready={}",
            engine.name(),
            position,
            engine.signal(),
            engine.is_ready()
        );
    }
}
