//! CLI definition and dispatch.

use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use crate::adapters::console_ui::ConsoleUi;
use crate::adapters::csv_history_adapter::CsvHistoryAdapter;
use crate::adapters::file_config_adapter::FileConfigAdapter;
use crate::adapters::memory_line_surface::MemoryLineSurface;
use crate::adapters::paper_gateway::PaperGateway;
use crate::adapters::scripted_events::ScriptedEvents;
use crate::adapters::static_market::StaticMarket;
use crate::domain::config_validation::{optional_number, validate_autolot_config};
use crate::domain::error::AutolotError;
use crate::domain::line_plan::DistanceConfig;
use crate::domain::risk_sizer::{calculate, CalculationResult, RiskConfig};
use crate::domain::trade_stats::{StatsSnapshot, TradeRecord};
use crate::ports::config_port::ConfigPort;
use crate::ports::history_port::HistoryPort;
use crate::session::{Ports, Session, SessionSettings};

#[derive(Parser, Debug)]
#[command(name = "autolot", about = "Risk-based lot sizing for chart-drawn trade levels")]
pub struct Cli {
    /// Log level (trace, debug, info, warn, error)
    #[arg(long, global = true, default_value = "info")]
    pub log_level: String,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Size a trade from a stop loss and optional entry / take profit
    Size {
        #[arg(short, long)]
        config: PathBuf,
        #[arg(long)]
        sl: f64,
        /// Defaults to the configured bid
        #[arg(long)]
        entry: Option<f64>,
        #[arg(long)]
        tp: Option<f64>,
    },
    /// Win rate and expected value of closed trades
    Stats {
        #[arg(short, long)]
        config: PathBuf,
        #[arg(long)]
        history: PathBuf,
    },
    /// Drive a session over a scripted event stream with paper execution
    Replay {
        #[arg(short, long)]
        config: PathBuf,
        #[arg(short, long)]
        script: PathBuf,
        #[arg(long)]
        history: Option<PathBuf>,
    },
    /// Validate a configuration file
    Validate {
        #[arg(short, long)]
        config: PathBuf,
    },
}

pub fn run(cli: Cli) -> ExitCode {
    match cli.command {
        Command::Size { config, sl, entry, tp } => run_size(&config, sl, entry, tp),
        Command::Stats { config, history } => run_stats(&config, &history),
        Command::Replay {
            config,
            script,
            history,
        } => run_replay(&config, &script, history.as_deref()),
        Command::Validate { config } => run_validate(&config),
    }
}

fn fail(err: &AutolotError) -> ExitCode {
    eprintln!("error: {err}");
    ExitCode::from(err)
}

pub fn load_config(path: &Path) -> Result<FileConfigAdapter, ExitCode> {
    let adapter = FileConfigAdapter::from_file(path).map_err(|e| fail(&e))?;
    validate_autolot_config(&adapter).map_err(|e| fail(&e))?;
    Ok(adapter)
}

pub fn build_risk_config(config: &dyn ConfigPort) -> Result<RiskConfig, AutolotError> {
    let pct = optional_number(config, "risk", "risk_percentage")?.unwrap_or(1.0);
    RiskConfig::new(pct)
}

pub fn build_distance_config(config: &dyn ConfigPort) -> Result<DistanceConfig, AutolotError> {
    let defaults = DistanceConfig::default();
    Ok(DistanceConfig {
        use_volatility: config.get_bool("lines", "use_volatility", defaults.use_volatility),
        volatility_multiplier: optional_number(config, "lines", "volatility_multiplier")?
            .unwrap_or(defaults.volatility_multiplier),
        fixed_distance_pips: optional_number(config, "lines", "fixed_distance_pips")?
            .unwrap_or(defaults.fixed_distance_pips),
        min_distance_pips: optional_number(config, "lines", "min_distance_pips")?
            .unwrap_or(defaults.min_distance_pips),
        max_distance_pips: optional_number(config, "lines", "max_distance_pips")?,
    })
}

pub fn build_session_settings(config: &dyn ConfigPort) -> Result<SessionSettings, AutolotError> {
    let defaults = SessionSettings::default();
    let slippage = optional_number(config, "risk", "slippage_pips")?;
    Ok(SessionSettings {
        label: config.get_text("risk", "label").unwrap_or(defaults.label),
        slippage_pips: slippage.or(defaults.slippage_pips),
        distance: build_distance_config(config)?,
    })
}

/// Size a trade against the configured account and symbol.
pub fn size_trade(
    config: &dyn ConfigPort,
    sl: f64,
    entry: Option<f64>,
    tp: Option<f64>,
) -> Result<CalculationResult, AutolotError> {
    let market = StaticMarket::from_config(config)?;
    let risk = build_risk_config(config)?;

    let entry = match entry {
        Some(price) => price,
        None if market.quote.bid > 0.0 => market.quote.bid,
        None => {
            return Err(AutolotError::ConfigMissing {
                section: "market".into(),
                key: "bid".into(),
            })
        }
    };

    let risk_amount = risk.risk_amount(market.account.balance);
    let result = calculate(entry, sl, tp, risk_amount, &market.symbol);
    if result.volume_units <= 0.0 {
        return Err(AutolotError::ZeroOrSubMinimumVolume {
            volume: 0.0,
            minimum: market.symbol.volume_min,
        });
    }
    Ok(result)
}

fn run_size(config_path: &Path, sl: f64, entry: Option<f64>, tp: Option<f64>) -> ExitCode {
    let adapter = match load_config(config_path) {
        Ok(a) => a,
        Err(code) => return code,
    };

    let result = match size_trade(&adapter, sl, entry, tp) {
        Ok(r) => r,
        Err(e) => {
            eprintln!("error: {}", e.user_message());
            return ExitCode::from(&e);
        }
    };

    eprintln!("Side:        {}", result.side);
    eprintln!("Risk:        {:.2}", result.risk_amount);
    eprintln!("SL distance: {:.1} pips", result.sl_pips);
    eprintln!("Lot:         {}", result.lot);
    match result.rr_ratio {
        Some(rr) => eprintln!("RR:          1:{rr:.2}"),
        None => eprintln!("RR:          -"),
    }
    eprintln!(
        "Presets:     full {} / half {} / third {}",
        result.presets.full, result.presets.half, result.presets.third
    );

    match serde_json::to_string_pretty(&result) {
        Ok(json) => {
            println!("{json}");
            ExitCode::SUCCESS
        }
        Err(e) => fail(&AutolotError::Io(std::io::Error::other(e))),
    }
}

/// Stats for the configured symbol and label over a CSV history.
pub fn history_stats(
    config: &dyn ConfigPort,
    history: &dyn HistoryPort,
) -> Result<StatsSnapshot, AutolotError> {
    let settings = build_session_settings(config)?;
    let symbol = config
        .get_text("symbol", "name")
        .ok_or_else(|| AutolotError::ConfigMissing {
            section: "symbol".into(),
            key: "name".into(),
        })?;
    let trades = history.closed_trades()?;
    Ok(StatsSnapshot::compute(&trades, &symbol, &settings.label))
}

fn run_stats(config_path: &Path, history_path: &Path) -> ExitCode {
    let adapter = match load_config(config_path) {
        Ok(a) => a,
        Err(code) => return code,
    };
    let history = CsvHistoryAdapter::new(history_path.to_path_buf());

    let stats = match history_stats(&adapter, &history) {
        Ok(s) => s,
        Err(e) => return fail(&e),
    };

    eprintln!("Trades:       {}", stats.total_trades);
    eprintln!("Win Rate:     {:.1}%", stats.win_rate);
    eprintln!("Avg Win:      {:.2}", stats.avg_win);
    eprintln!("Avg Loss:     {:.2}", stats.avg_loss);
    eprintln!("Expectancy:   {:.2}", stats.expected_value);

    match serde_json::to_string_pretty(&stats) {
        Ok(json) => {
            println!("{json}");
            ExitCode::SUCCESS
        }
        Err(e) => fail(&AutolotError::Io(std::io::Error::other(e))),
    }
}

/// Wire a session over paper execution and an in-memory line surface.
pub fn build_replay(
    config: &dyn ConfigPort,
    script_path: &Path,
    history_path: Option<&Path>,
) -> Result<(SessionSettings, RiskConfig, Ports), AutolotError> {
    let settings = build_session_settings(config)?;
    let risk = build_risk_config(config)?;
    let market = StaticMarket::from_config(config)?;
    let events = ScriptedEvents::from_file(script_path)?;
    let history: Box<dyn HistoryPort> = match history_path {
        Some(path) => Box::new(CsvHistoryAdapter::new(path.to_path_buf())),
        None => Box::new(Vec::<TradeRecord>::new()),
    };
    let execution = PaperGateway::new(&market.symbol.name);

    let ports = Ports {
        market: Box::new(market),
        lines: Box::new(MemoryLineSurface::new()),
        execution: Box::new(execution),
        history,
        ui: Box::new(ConsoleUi::stdout()),
        events: Box::new(events),
    };
    Ok((settings, risk, ports))
}

fn run_replay(config_path: &Path, script_path: &Path, history_path: Option<&Path>) -> ExitCode {
    let adapter = match load_config(config_path) {
        Ok(a) => a,
        Err(code) => return code,
    };

    let prepared = build_replay(&adapter, script_path, history_path);
    let (settings, risk, ports) = match prepared {
        Ok(p) => p,
        Err(e) => return fail(&e),
    };

    eprintln!("Replaying {}", script_path.display());
    let mut session = match Session::start(settings, risk, ports) {
        Ok(s) => s,
        Err(e) => return fail(&e),
    };
    let handled = session.run();

    let state = session.state();
    eprintln!("\n=== Replay Summary ===");
    eprintln!("Events:       {handled}");
    eprintln!("Mode:         {}", state.mode);
    eprintln!("Split:        {}", state.split_active());
    for kind in state.lines.kinds() {
        if let Some(price) = state.lines.price(kind) {
            eprintln!("  {:<12} {price}", kind.to_string());
        }
    }
    if let Some(result) = &state.last_result {
        eprintln!("Lot:          {}", result.lot);
    }
    let stats = session.stats();
    eprintln!(
        "Stats:        {} trades, {:.1}% win rate, EV {:.2}",
        stats.total_trades, stats.win_rate, stats.expected_value
    );

    session.stop();
    ExitCode::SUCCESS
}

fn build_all(
    config: &dyn ConfigPort,
) -> Result<(SessionSettings, RiskConfig, StaticMarket), AutolotError> {
    Ok((
        build_session_settings(config)?,
        build_risk_config(config)?,
        StaticMarket::from_config(config)?,
    ))
}

fn run_validate(config_path: &Path) -> ExitCode {
    eprintln!("Validating config: {}", config_path.display());
    let adapter = match load_config(config_path) {
        Ok(a) => a,
        Err(code) => return code,
    };

    match build_all(&adapter) {
        Ok((settings, risk, market)) => {
            eprintln!("  symbol:  {}", market.symbol.name);
            eprintln!("  label:   {}", settings.label);
            eprintln!("  risk:    {}%", risk.risk_percentage());
            eprintln!(
                "  balance: {} {}",
                market.account.balance, market.account.asset
            );
            eprintln!("\nConfiguration is valid.");
            ExitCode::SUCCESS
        }
        Err(e) => fail(&e),
    }
}
