//! CLI definition and dispatch.

use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::adapters::csv_adapter::CsvAdapter;
use crate::adapters::file_config_adapter::FileConfigAdapter;
use crate::adapters::synthetic_adapter::SyntheticAdapter;
use crate::adapters::text_report_adapter::TextReportAdapter;
use crate::domain::config_validation::{
    DATA_SECTION, DEFAULT_START_PRICE, DEFAULT_TICKS, DEFAULT_VOLATILITY, GENERATOR_SECTION,
    INDICATORS_SECTION, REPORT_SECTION, SIMULATOR_SECTION, validate_generator_config,
    validate_report_config, validate_simulator_config,
};
use crate::domain::error::SimtraderError;
use crate::domain::indicator::BreakoutMode;
use crate::domain::simulator::{Simulator, SimulatorConfig};
use crate::domain::statistics::Statistics;
use crate::ports::config_port::ConfigPort;
use crate::ports::data_port::DataPort;
use crate::ports::report_port::ReportPort;

#[derive(Parser, Debug)]
#[command(name = "simtrader", about = "Indicator strategy backtester")]
pub struct Cli {
    /// Log at debug level
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run a backtest over synthetic or CSV bars
    Run {
        #[arg(short, long)]
        config: Option<PathBuf>,
        /// Replay bars from a CSV file instead of generating them
        #[arg(long)]
        csv: Option<PathBuf>,
        #[arg(long)]
        seed: Option<u64>,
        #[arg(long)]
        ticks: Option<usize>,
        #[arg(short, long)]
        output: Option<PathBuf>,
        #[arg(long)]
        dry_run: bool,
    },
    /// Validate a configuration file
    Validate {
        #[arg(short, long)]
        config: PathBuf,
    },
}

/// Bar source selected for a run.
pub enum BarSource {
    Csv(CsvAdapter),
    Synthetic(SyntheticAdapter),
}

impl BarSource {
    pub fn as_port(&self) -> &dyn DataPort {
        match self {
            BarSource::Csv(adapter) => adapter,
            BarSource::Synthetic(adapter) => adapter,
        }
    }

    pub fn describe(&self) -> String {
        match self {
            BarSource::Csv(adapter) => format!("CSV {}", adapter.path().display()),
            BarSource::Synthetic(adapter) => match adapter.seed() {
                Some(seed) => format!("{} synthetic bars (seed {})", adapter.ticks(), seed),
                None => format!("{} synthetic bars (unseeded)", adapter.ticks()),
            },
        }
    }
}

pub fn init_logging(verbose: bool) {
    let default_level = if verbose {
        "simtrader=debug"
    } else {
        "simtrader=info"
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

pub fn run(cli: Cli) -> ExitCode {
    let result = match cli.command {
        Command::Run {
            config,
            csv,
            seed,
            ticks,
            output,
            dry_run,
        } => {
            let overrides = RunOverrides { csv, seed, ticks };
            if dry_run {
                run_dry_run(config.as_deref(), &overrides)
            } else {
                run_backtest(config.as_deref(), &overrides, output)
            }
        }
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

/// Command-line values that take precedence over the config file.
#[derive(Debug, Clone, Default)]
pub struct RunOverrides {
    pub csv: Option<PathBuf>,
    pub seed: Option<u64>,
    pub ticks: Option<usize>,
}

pub fn load_config(path: Option<&Path>) -> Result<FileConfigAdapter, SimtraderError> {
    match path {
        Some(p) => {
            info!("Loading config from {}", p.display());
            FileConfigAdapter::from_file(p)
        }
        None => Ok(FileConfigAdapter::empty()),
    }
}

pub fn build_simulator_config(adapter: &dyn ConfigPort) -> Result<SimulatorConfig, SimtraderError> {
    validate_simulator_config(adapter)?;
    let defaults = SimulatorConfig::default();

    let breakout_mode = match adapter
        .get_string(INDICATORS_SECTION, "breakout_mode")
        .filter(|m| !m.trim().is_empty())
    {
        Some(s) => BreakoutMode::parse(&s).ok_or_else(|| {
            SimtraderError::invalid(INDICATORS_SECTION, "breakout_mode", "unknown mode")
        })?,
        None => defaults.breakout_mode,
    };

    Ok(SimulatorConfig {
        initial_cash: adapter.get_double(SIMULATOR_SECTION, "initial_cash", defaults.initial_cash),
        risk_per_trade: adapter.get_double(
            SIMULATOR_SECTION,
            "risk_per_trade",
            defaults.risk_per_trade,
        ),
        max_trades: adapter.get_int(SIMULATOR_SECTION, "max_trades", defaults.max_trades as i64)
            as usize,
        stop_loss_pct: adapter.get_double(
            SIMULATOR_SECTION,
            "stop_loss_pct",
            defaults.stop_loss_pct,
        ),
        short_window: get_window(adapter, "short_window", defaults.short_window),
        long_window: get_window(adapter, "long_window", defaults.long_window),
        rsi_period: get_window(adapter, "rsi_period", defaults.rsi_period),
        vol_window: get_window(adapter, "vol_window", defaults.vol_window),
        breakout_pct: adapter.get_double(INDICATORS_SECTION, "breakout_pct", defaults.breakout_pct),
        breakout_mode,
    })
}

fn get_window(adapter: &dyn ConfigPort, key: &str, default: usize) -> usize {
    adapter.get_int(INDICATORS_SECTION, key, default as i64) as usize
}

/// CSV path from the command line, else from `[data] csv_path`.
pub fn resolve_csv_path(override_path: Option<&Path>, config: &dyn ConfigPort) -> Option<PathBuf> {
    if let Some(p) = override_path {
        return Some(p.to_path_buf());
    }
    config
        .get_string(DATA_SECTION, "csv_path")
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .map(PathBuf::from)
}

pub fn build_bar_source(
    config: &dyn ConfigPort,
    overrides: &RunOverrides,
) -> Result<BarSource, SimtraderError> {
    if let Some(path) = resolve_csv_path(overrides.csv.as_deref(), config) {
        return Ok(BarSource::Csv(CsvAdapter::new(path)));
    }

    validate_generator_config(config)?;
    let start_price = config.get_double(GENERATOR_SECTION, "start_price", DEFAULT_START_PRICE);
    let volatility = config.get_double(GENERATOR_SECTION, "volatility", DEFAULT_VOLATILITY);
    let ticks = overrides
        .ticks
        .unwrap_or_else(|| config.get_int(GENERATOR_SECTION, "ticks", DEFAULT_TICKS) as usize);
    let seed = overrides.seed.or_else(|| {
        config
            .has_key(GENERATOR_SECTION, "seed")
            .then(|| config.get_int(GENERATOR_SECTION, "seed", 0) as u64)
    });

    Ok(BarSource::Synthetic(SyntheticAdapter::new(
        start_price,
        volatility,
        ticks,
        seed,
    )?))
}

/// Feeds every bar from `data_port` through a fresh simulator.
pub fn run_simulation(
    data_port: &dyn DataPort,
    config: SimulatorConfig,
) -> Result<Simulator, SimtraderError> {
    let mut simulator = Simulator::new(config);
    simulator.try_run(data_port.open_stream()?)?;
    Ok(simulator)
}

fn run_backtest(
    config_path: Option<&Path>,
    overrides: &RunOverrides,
    output: Option<PathBuf>,
) -> Result<(), SimtraderError> {
    let adapter = load_config(config_path)?;
    let sim_config = build_simulator_config(&adapter)?;
    let source = build_bar_source(&adapter, overrides)?;
    validate_report_config(&adapter)?;
    let show_trade_log = adapter.get_bool(REPORT_SECTION, "show_trade_log", true);

    info!("Running backtest over {}", source.describe());
    let simulator = run_simulation(source.as_port(), sim_config)?;
    info!(
        "Processed {} ticks, {} trade events",
        simulator.tick_count(),
        simulator.trade_log().len()
    );

    let statistics = Statistics::compute(&simulator);
    let report = TextReportAdapter::new(output.clone(), show_trade_log);
    report.write(&simulator, &statistics)?;

    if let Some(path) = output {
        info!("Report written to: {}", path.display());
    }
    Ok(())
}

fn run_dry_run(config_path: Option<&Path>, overrides: &RunOverrides) -> Result<(), SimtraderError> {
    let adapter = load_config(config_path)?;
    let c = build_simulator_config(&adapter)?;
    let source = build_bar_source(&adapter, overrides)?;
    validate_report_config(&adapter)?;

    eprintln!("Simulator:");
    eprintln!("  initial_cash:   {:.2}", c.initial_cash);
    eprintln!("  risk_per_trade: {}", c.risk_per_trade);
    eprintln!("  max_trades:     {}", c.max_trades);
    eprintln!("  stop_loss_pct:  {}", c.stop_loss_pct);
    eprintln!("\nIndicators:");
    eprintln!("  SMA({}) / SMA({})", c.short_window, c.long_window);
    eprintln!("  RSI({})", c.rsi_period);
    eprintln!("  volatility({})", c.vol_window);
    eprintln!("  breakout({}, {}%, {})", c.vol_window, c.breakout_pct, c.breakout_mode);
    eprintln!("\nBars: {}", source.describe());
    eprintln!("\nDry run complete: configuration is valid");
    Ok(())
}

fn run_validate(config_path: &Path) -> Result<(), SimtraderError> {
    eprintln!("Validating config: {}", config_path.display());
    let adapter = FileConfigAdapter::from_file(config_path)?;
    validate_simulator_config(&adapter)?;
    validate_report_config(&adapter)?;
    if resolve_csv_path(None, &adapter).is_none() {
        validate_generator_config(&adapter)?;
    }
    eprintln!("Configuration is valid.");
    Ok(())
}
