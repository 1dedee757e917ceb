//! CLI definition and dispatch.

use clap::{Args, Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use crate::adapters::csv_adapter::CsvAdapter;
use crate::adapters::delimited_report_adapter::DelimitedReportAdapter;
use crate::adapters::file_config_adapter::FileConfigAdapter;
use crate::domain::backtest::{BacktestConfig, BacktestResult};
use crate::domain::composite::CompositeConfig;
use crate::domain::config_validation::validate_run_config;
use crate::domain::error::LwtrendError;
use crate::domain::indicator::regime::RegimeConfig;
use crate::domain::indicator::trend_momentum::TrendMomentumConfig;
use crate::domain::indicator::vwap_band::VwapBandConfig;
use crate::domain::pipeline::{RunConfig, run_pipeline};
use crate::ports::config_port::ConfigPort;
use crate::ports::data_port::DataPort;
use crate::ports::report_port::ReportPort;

#[derive(Parser, Debug)]
#[command(
    name = "lwtrend",
    about = "Liquidity-weighted trend research and backtesting"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run indicators, strategy and backtest over a CSV of bars
    Backtest {
        #[arg(short, long)]
        config: Option<PathBuf>,
        #[arg(short, long)]
        input: Option<PathBuf>,
        /// Per-bar signals CSV (`-` for stdout)
        #[arg(long)]
        export_signals: Option<String>,
        /// Summary report (`-` for stdout)
        #[arg(long)]
        report: Option<String>,
        /// Trade log CSV (`-` for stdout)
        #[arg(long)]
        export_trades: Option<String>,
        #[command(flatten)]
        overrides: Overrides,
    },
    /// Validate a configuration file and print its sanitized values
    Validate {
        #[arg(short, long)]
        config: PathBuf,
    },
    /// Show bar count and timestamp range of a CSV file
    Info {
        #[arg(short, long)]
        input: PathBuf,
    },
}

/// Command-line values that take precedence over the config file.
#[derive(Args, Debug, Clone, Default, PartialEq)]
pub struct Overrides {
    #[arg(long)]
    pub trend_period: Option<usize>,
    #[arg(long)]
    pub momentum_lookback: Option<usize>,
    #[arg(long)]
    pub volatility_window: Option<usize>,
    #[arg(long, allow_negative_numbers = true, value_parser = parse_finite)]
    pub threshold: Option<f64>,
    #[arg(long, allow_negative_numbers = true, value_parser = parse_finite)]
    pub volume_floor: Option<f64>,
    #[arg(long)]
    pub vwap_window: Option<usize>,
    #[arg(long, allow_negative_numbers = true, value_parser = parse_finite)]
    pub vwap_band_dev: Option<f64>,
    #[arg(long)]
    pub regime_window: Option<usize>,
    #[arg(long, allow_negative_numbers = true, value_parser = parse_finite)]
    pub high_vol_threshold: Option<f64>,
    #[arg(long, allow_negative_numbers = true, value_parser = parse_finite)]
    pub lwti_weight: Option<f64>,
    #[arg(long, allow_negative_numbers = true, value_parser = parse_finite)]
    pub vwap_weight: Option<f64>,
    #[arg(long, allow_negative_numbers = true, value_parser = parse_finite)]
    pub max_position: Option<f64>,
    #[arg(long, allow_negative_numbers = true, value_parser = parse_finite)]
    pub starting_equity: Option<f64>,
    #[arg(long, allow_negative_numbers = true, value_parser = parse_finite)]
    pub risk_per_trade: Option<f64>,
    #[arg(long, allow_negative_numbers = true, value_parser = parse_finite)]
    pub fee_bps: Option<f64>,
    #[arg(long, allow_negative_numbers = true, value_parser = parse_finite)]
    pub slippage_bps: Option<f64>,
}

fn parse_finite(s: &str) -> Result<f64, String> {
    let value: f64 = s.parse().map_err(|e| format!("{e}"))?;
    if value.is_finite() {
        Ok(value)
    } else {
        Err(format!("`{s}` is not a finite number"))
    }
}

impl Overrides {
    pub fn apply(&self, config: &mut RunConfig) {
        fn set<T: Copy>(target: &mut T, value: Option<T>) {
            if let Some(v) = value {
                *target = v;
            }
        }

        set(&mut config.lwti.trend_period, self.trend_period);
        set(&mut config.lwti.momentum_lookback, self.momentum_lookback);
        set(&mut config.lwti.volatility_window, self.volatility_window);
        set(&mut config.lwti.threshold, self.threshold);
        set(&mut config.lwti.volume_floor, self.volume_floor);
        set(&mut config.vwap.window, self.vwap_window);
        set(&mut config.vwap.band_deviation, self.vwap_band_dev);
        set(&mut config.regime.window, self.regime_window);
        set(&mut config.regime.high_vol_threshold, self.high_vol_threshold);
        set(&mut config.strategy.lwti_weight, self.lwti_weight);
        set(&mut config.strategy.vwap_weight, self.vwap_weight);
        set(&mut config.strategy.max_position, self.max_position);
        set(&mut config.backtest.starting_equity, self.starting_equity);
        set(&mut config.backtest.risk_per_trade, self.risk_per_trade);
        set(&mut config.backtest.fee_bps, self.fee_bps);
        set(&mut config.backtest.slippage_bps, self.slippage_bps);
    }
}

/// Destinations for the optional run outputs.
#[derive(Debug, Clone, Default)]
pub struct OutputPaths {
    pub signals: Option<String>,
    pub report: Option<String>,
    pub trades: Option<String>,
}

pub fn run(cli: Cli) -> ExitCode {
    match cli.command {
        Command::Backtest {
            config,
            input,
            export_signals,
            report,
            export_trades,
            overrides,
        } => {
            let outputs = OutputPaths {
                signals: export_signals,
                report,
                trades: export_trades,
            };
            run_backtest(config.as_deref(), input.as_deref(), &overrides, &outputs)
        }
        Command::Validate { config } => run_validate(&config),
        Command::Info { input } => run_info(&input),
    }
}

fn fail(err: &LwtrendError) -> ExitCode {
    eprintln!("error: {err}");
    ExitCode::from(err)
}

pub fn load_config(path: &Path) -> Result<FileConfigAdapter, LwtrendError> {
    FileConfigAdapter::from_file(path).map_err(|e| LwtrendError::ConfigParse {
        file: path.display().to_string(),
        reason: e.to_string(),
    })
}

/// Reads every section into a `RunConfig`, falling back to component
/// defaults for absent keys. Values are not sanitized here.
pub fn build_run_config(adapter: &dyn ConfigPort) -> RunConfig {
    let lwti = TrendMomentumConfig::default();
    let vwap = VwapBandConfig::default();
    let regime = RegimeConfig::default();
    let strategy = CompositeConfig::default();
    let backtest = BacktestConfig::default();

    RunConfig {
        input_path: adapter
            .get_string("data", "input_path")
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty()),
        lwti: TrendMomentumConfig {
            trend_period: adapter.get_usize("lwti", "trend_period", lwti.trend_period),
            momentum_lookback: adapter.get_usize(
                "lwti",
                "momentum_lookback",
                lwti.momentum_lookback,
            ),
            volatility_window: adapter.get_usize(
                "lwti",
                "volatility_window",
                lwti.volatility_window,
            ),
            threshold: adapter.get_double("lwti", "threshold", lwti.threshold),
            volume_floor: adapter.get_double("lwti", "volume_floor", lwti.volume_floor),
        },
        vwap: VwapBandConfig {
            window: adapter.get_usize("vwap", "window", vwap.window),
            band_deviation: adapter.get_double("vwap", "band_deviation", vwap.band_deviation),
        },
        regime: RegimeConfig {
            window: adapter.get_usize("regime", "window", regime.window),
            high_vol_threshold: adapter.get_double(
                "regime",
                "high_vol_threshold",
                regime.high_vol_threshold,
            ),
        },
        strategy: CompositeConfig {
            lwti_weight: adapter.get_double("strategy", "lwti_weight", strategy.lwti_weight),
            vwap_weight: adapter.get_double("strategy", "vwap_weight", strategy.vwap_weight),
            max_position: adapter.get_double("strategy", "max_position", strategy.max_position),
        },
        backtest: BacktestConfig {
            starting_equity: adapter.get_double(
                "backtest",
                "starting_equity",
                backtest.starting_equity,
            ),
            risk_per_trade: adapter.get_double(
                "backtest",
                "risk_per_trade",
                backtest.risk_per_trade,
            ),
            fee_bps: adapter.get_double("backtest", "fee_bps", backtest.fee_bps),
            slippage_bps: adapter.get_double("backtest", "slippage_bps", backtest.slippage_bps),
        },
    }
}

/// Config file (or defaults), then command-line overrides, then sanitization.
pub fn resolve_run_config(
    config_path: Option<&Path>,
    input: Option<&Path>,
    overrides: &Overrides,
) -> Result<RunConfig, LwtrendError> {
    let mut run_config = match config_path {
        Some(path) => {
            eprintln!("Loading config from {}", path.display());
            let adapter = load_config(path)?;
            validate_run_config(&adapter)?;
            build_run_config(&adapter)
        }
        None => RunConfig::default(),
    };

    overrides.apply(&mut run_config);
    if let Some(path) = input {
        run_config.input_path = Some(path.display().to_string());
    }
    Ok(run_config.sanitized())
}

fn run_backtest(
    config_path: Option<&Path>,
    input: Option<&Path>,
    overrides: &Overrides,
    outputs: &OutputPaths,
) -> ExitCode {
    let run_config = match resolve_run_config(config_path, input, overrides) {
        Ok(c) => c,
        Err(e) => return fail(&e),
    };

    let input_path = match run_config.input_path.as_deref() {
        Some(p) => p,
        None => {
            return fail(&LwtrendError::ConfigMissing {
                section: "data".into(),
                key: "input_path".into(),
            });
        }
    };

    eprintln!("Loading bars from {input_path}");
    let data_port = CsvAdapter::new(input_path);
    let report_port = DelimitedReportAdapter::new();

    match run_backtest_pipeline(&data_port, input_path, &run_config, outputs, &report_port) {
        Ok(_) => ExitCode::SUCCESS,
        Err(e) => fail(&e),
    }
}

/// Loads bars, runs the full pipeline, prints the console summary and
/// writes every requested output.
pub fn run_backtest_pipeline(
    data_port: &dyn DataPort,
    source: &str,
    run_config: &RunConfig,
    outputs: &OutputPaths,
    report_port: &dyn ReportPort,
) -> Result<BacktestResult, LwtrendError> {
    let bars = data_port.fetch_bars()?;
    if bars.is_empty() {
        return Err(LwtrendError::NoData {
            path: source.to_string(),
        });
    }

    eprintln!("Running backtest over {} bars", bars.len());
    let output = run_pipeline(&bars, run_config);
    print_summary(&output.result);

    if let Some(path) = outputs.signals.as_deref() {
        report_port.write_signals(&bars, &output, path)?;
        eprintln!("Signals written to: {path}");
    }
    if let Some(path) = outputs.report.as_deref() {
        report_port.write_summary(&output.result, path)?;
        eprintln!("Report written to: {path}");
    }
    if let Some(path) = outputs.trades.as_deref() {
        report_port.write_trades(&output.result.trade_log, path)?;
        eprintln!("Trades written to: {path}");
    }

    Ok(output.result)
}

fn print_summary(result: &BacktestResult) {
    eprintln!("\n=== Backtest Results ===");
    eprintln!("Starting Equity:  {:.2}", result.starting_equity);
    eprintln!("Ending Equity:    {:.2}", result.ending_equity);
    eprintln!("Total Return:     {:.2}%", result.total_return() * 100.0);
    eprintln!("Max Drawdown:     -{:.1}%", result.max_drawdown * 100.0);
    eprintln!("Total Trades:     {}", result.trades);
    eprintln!("Win Rate:         {:.1}%", result.win_rate * 100.0);
}

/// INI rendering of a run configuration, readable back by `load_config`.
pub fn render_run_config(config: &RunConfig) -> String {
    let RunConfig {
        input_path,
        lwti,
        vwap,
        regime,
        strategy,
        backtest,
    } = config;
    format!(
        "[data]\n\
         input_path = {input}\n\
         \n\
         [lwti]\n\
         trend_period = {}\n\
         momentum_lookback = {}\n\
         volatility_window = {}\n\
         threshold = {}\n\
         volume_floor = {}\n\
         \n\
         [vwap]\n\
         window = {}\n\
         band_deviation = {}\n\
         \n\
         [regime]\n\
         window = {}\n\
         high_vol_threshold = {}\n\
         \n\
         [strategy]\n\
         lwti_weight = {}\n\
         vwap_weight = {}\n\
         max_position = {}\n\
         \n\
         [backtest]\n\
         starting_equity = {}\n\
         risk_per_trade = {}\n\
         fee_bps = {}\n\
         slippage_bps = {}\n",
        lwti.trend_period,
        lwti.momentum_lookback,
        lwti.volatility_window,
        lwti.threshold,
        lwti.volume_floor,
        vwap.window,
        vwap.band_deviation,
        regime.window,
        regime.high_vol_threshold,
        strategy.lwti_weight,
        strategy.vwap_weight,
        strategy.max_position,
        backtest.starting_equity,
        backtest.risk_per_trade,
        backtest.fee_bps,
        backtest.slippage_bps,
        input = input_path.as_deref().unwrap_or_default(),
    )
}

pub fn run_validate(config_path: &Path) -> ExitCode {
    eprintln!("Validating config: {}", config_path.display());
    let adapter = match load_config(config_path) {
        Ok(a) => a,
        Err(e) => return fail(&e),
    };

    if let Err(e) = validate_run_config(&adapter) {
        return fail(&e);
    }

    let run_config = build_run_config(&adapter).sanitized();
    print!("{}", render_run_config(&run_config));
    eprintln!("\nConfiguration is valid.");
    ExitCode::SUCCESS
}

pub fn run_info(input: &Path) -> ExitCode {
    let adapter = CsvAdapter::new(input);
    match adapter.data_range() {
        Ok(Some((first, last, count))) => {
            println!("{}: {} bars, {} to {}", input.display(), count, first, last);
            ExitCode::SUCCESS
        }
        Ok(None) => fail(&LwtrendError::NoData {
            path: input.display().to_string(),
        }),
        Err(e) => fail(&e),
    }
}
