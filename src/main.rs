//! Bumperbar: host simulation entry point.
//!
//! Wires the game core to in-memory GPIO and replays a sequence of bumper
//! hits through the same interrupt path the cabinet uses.
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                     Adapters (outer ring)                    │
//! │                                                              │
//! │  SimBus / SimLine   LogEventSink   JsonFileConfig  HostClock │
//! │  (InputPin+Output)  (EventSink)    (ConfigPort)    (Clock)   │
//! │                                                              │
//! │  ──────────────── Port Trait Boundary ───────────────────    │
//! │                                                              │
//! │  ┌────────────────────────────────────────────────────────┐  │
//! │  │            GameService (pure logic)                    │  │
//! │  │  Decoder · Registry · Pumps · Drinks · Timers          │  │
//! │  └────────────────────────────────────────────────────────┘  │
//! │                                                              │
//! │  LocalExecutor: interrupt task · timer task · round task     │
//! └──────────────────────────────────────────────────────────────┘
//! ```
#![deny(unused_must_use)]

use std::collections::HashMap;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result, bail};
use clap::Parser;
use log::info;

use bumperbar::adapters::config_file::JsonFileConfig;
use bumperbar::adapters::log_sink::LogEventSink;
use bumperbar::adapters::sim_gpio::{SimBus, SimLine};
use bumperbar::adapters::time::{HostClock, ReactorSleep};
use bumperbar::app::ports::{Clock, ConfigPort, SleepPort};
use bumperbar::app::service::GameService;
use bumperbar::config::MachineConfig;
use bumperbar::input::interrupt::InterruptSignal;
use bumperbar::runtime::{self, Station};

/// Interrupt line edge notification.  The platform ISR would call
/// `INTERRUPT.notify()`; the simulated player does it here.
static INTERRUPT: InterruptSignal = InterruptSignal::new();

/// Simulate the bumper drink machine on the host.
#[derive(Parser)]
struct Cli {
    /// JSON machine configuration (defaults are used if the file is missing)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Element codes to strike, in order (comma separated)
    #[arg(long, value_delimiter = ',', default_values_t = [1u32, 2, 1, 1, 4])]
    hits: Vec<u32>,

    /// Pause between hits in milliseconds
    #[arg(long, default_value_t = 100)]
    hit_interval_ms: u64,

    /// How long each bumper stays pressed in milliseconds
    #[arg(long, default_value_t = 20)]
    press_ms: u64,

    /// Override the round length; without one, a single round ends after the last hit
    #[arg(long)]
    round_ms: Option<u64>,

    /// Print the effective configuration as JSON and exit
    #[arg(long)]
    dump_config: bool,
}

fn load_config(cli: &Cli) -> Result<MachineConfig> {
    let mut config = match &cli.config {
        Some(path) => JsonFileConfig::new(path)
            .load()
            .with_context(|| format!("loading {}", path.display()))?,
        None => MachineConfig::default(),
    };
    if let Some(ms) = cli.round_ms {
        config.round.length_ms = Some(ms);
    }
    config.validate().context("validating configuration")?;
    Ok(config)
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let cli = Cli::parse();

    let config = load_config(&cli)?;
    if cli.dump_config {
        println!("{}", serde_json::to_string_pretty(&config)?);
        return Ok(());
    }

    info!("Bumperbar v{}", env!("CARGO_PKG_VERSION"));

    // ── Simulated wiring ─────────────────────────────────────
    let mut board: HashMap<u8, SimLine> = HashMap::new();
    let bus = SimBus::from_lines(
        config
            .code_lines
            .iter()
            .map(|n| board.entry(*n).or_default().clone())
            .collect(),
    );
    for line in config
        .pumps
        .iter()
        .map(|p| p.actuator)
        .chain(config.master_enable_line)
    {
        board.entry(line).or_default();
    }

    let mut service =
        GameService::from_config(&config, |n| board[&n].clone(), |n| board[&n].clone())
            .context("wiring the machine")?;
    for code in &cli.hits {
        if *code > service.max_code() {
            bail!("code {} needs more than {} code lines", code, config.code_lines.len());
        }
    }

    let mut sink = LogEventSink::new();
    service.start(&mut sink)?;
    let round_length = service.round_length();
    let station = Station::new(service, sink).shared();

    // ── Tasks ────────────────────────────────────────────────
    let clock = HostClock::new();
    let executor: edge_executor::LocalExecutor<'_, 8> = edge_executor::LocalExecutor::new();

    executor
        .spawn(runtime::interrupt_loop(station.clone(), &INTERRUPT, clock, ReactorSleep))
        .detach();
    executor
        .spawn(runtime::timer_loop(station.clone(), clock, ReactorSleep))
        .detach();
    if let Some(length) = round_length {
        executor
            .spawn(runtime::round_loop(station.clone(), length, clock, ReactorSleep))
            .detach();
    }

    let press = Duration::from_millis(cli.press_ms);
    let gap = Duration::from_millis(cli.hit_interval_ms);
    let player = async {
        for code in &cli.hits {
            bus.drive(*code);
            INTERRUPT.notify();
            ReactorSleep.sleep(press).await;
            bus.release();
            INTERRUPT.notify();
            ReactorSleep.sleep(gap).await;
        }
        match round_length {
            // Let the round task close the round in progress.
            Some(length) => ReactorSleep.sleep(length).await,
            None => station.borrow_mut().end_round(clock.now()),
        }
        runtime::wait_idle(&station, &ReactorSleep).await;
    };

    futures_lite::future::block_on(executor.run(player));

    let st = station.borrow();
    info!(
        "Done: {} edges, {} unrecognised codes",
        INTERRUPT.edge_count(),
        st.service.unrecognised_count()
    );
    for pump in st.service.pumps().iter() {
        info!("  pump '{}': {} runs", pump.name(), pump.runs());
    }
    Ok(())
}
