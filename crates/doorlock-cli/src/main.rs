//! Door locker node runner.
//!
//! # Usage
//!
//! ```bash
//! # Both nodes in one process, keypad on stdin ("12345=" types a credential)
//! doorlock simulate --store eeprom.bin
//!
//! # One node per machine over a UART (feature `hardware-serial`)
//! doorlock access --port /dev/ttyUSB0 --store eeprom.bin
//! doorlock interface --port /dev/ttyUSB1
//! ```

mod console;

use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::{Parser, Subcommand};
use doorlock_controller::{
    AccessController, AccessPeripherals, ControllerError, InterfaceController,
    InterfacePeripherals, NodeConfig,
};
use doorlock_hardware::devices::{AnyLink, AnyStore};
use doorlock_hardware::mock::{MemoryStore, MockBuzzer, MockKeypad, MockLink, MockMotor};
use doorlock_hardware::store::FileStore;
use doorlock_hardware::tick::{TickCounter, TickSource};
use doorlock_hardware::HardwareError;
use doorlock_hardware::mock::store::DEFAULT_CAPACITY;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use crate::console::{ConsoleDisplay, spawn_stdin_keys};

/// Two-node door locker controller
#[derive(Parser, Debug)]
#[command(name = "doorlock")]
#[command(about = "Door locker Interface and Access node runner")]
#[command(version)]
struct Args {
    /// Log level (trace, debug, info, warn, error), overridden by RUST_LOG
    #[arg(long, default_value = "info", global = true)]
    log_level: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run both nodes in one process over an in-memory link
    Simulate {
        /// JSON node configuration
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// EEPROM image file; volatile when absent
        #[arg(short, long)]
        store: Option<PathBuf>,
    },

    /// Run the Access node over a serial port
    #[cfg(feature = "hardware-serial")]
    Access {
        /// Serial device path
        #[arg(short, long)]
        port: String,

        /// JSON node configuration
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// EEPROM image file; volatile when absent
        #[arg(short, long)]
        store: Option<PathBuf>,
    },

    /// Run the Interface node over a serial port
    #[cfg(feature = "hardware-serial")]
    Interface {
        /// Serial device path
        #[arg(short, long)]
        port: String,

        /// JSON node configuration
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&args.log_level));
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();

    match args.command {
        Command::Simulate { config, store } => simulate(config.as_deref(), store.as_deref()).await,
        #[cfg(feature = "hardware-serial")]
        Command::Access {
            port,
            config,
            store,
        } => serial::access(&port, config.as_deref(), store.as_deref()).await,
        #[cfg(feature = "hardware-serial")]
        Command::Interface { port, config } => serial::interface(&port, config.as_deref()).await,
    }
}

async fn load_config(path: Option<&Path>) -> anyhow::Result<NodeConfig> {
    match path {
        Some(path) => NodeConfig::load(path)
            .await
            .with_context(|| format!("loading {}", path.display())),
        None => Ok(NodeConfig::default()),
    }
}

async fn open_store(path: Option<&Path>) -> anyhow::Result<AnyStore> {
    match path {
        Some(path) => {
            let store = FileStore::open(path, DEFAULT_CAPACITY)
                .await
                .with_context(|| format!("opening store {}", path.display()))?;
            info!(path = %path.display(), "using EEPROM image");
            Ok(AnyStore::File(store))
        }
        None => {
            let (store, _) = MemoryStore::new();
            warn!("no store file given, credential is lost on exit");
            Ok(AnyStore::Memory(store))
        }
    }
}

fn start_clock(config: &NodeConfig) -> TickCounter {
    let clock = TickCounter::new();
    TickSource::new(clock.clone(), config.timing.tick_period()).spawn();
    clock
}

/// Ends a node loop. Closed keypad input is a normal shutdown.
fn finish(node: &str, result: doorlock_controller::Result<()>) -> anyhow::Result<()> {
    match result {
        Ok(()) => Ok(()),
        Err(ControllerError::Hardware(HardwareError::Disconnected { .. })) => {
            info!(node, "input closed, shutting down");
            Ok(())
        }
        Err(err) => Err(anyhow::Error::new(err).context(format!("{node} node stopped"))),
    }
}

async fn simulate(config: Option<&Path>, store: Option<&Path>) -> anyhow::Result<()> {
    let config = load_config(config).await?;
    let store = open_store(store).await?;

    let (interface_end, access_end) = MockLink::pair();
    let (keypad, keys) = MockKeypad::new();
    let (motor, _) = MockMotor::new();
    let (buzzer, _) = MockBuzzer::new();
    spawn_stdin_keys(keys);

    let mut interface = InterfaceController::new(
        InterfacePeripherals {
            link: AnyLink::Mock(interface_end),
            keypad,
            display: ConsoleDisplay::new(),
            clock: start_clock(&config),
        },
        config.clone(),
    );
    let mut access = AccessController::new(
        AccessPeripherals {
            link: AnyLink::Mock(access_end),
            store,
            motor,
            buzzer,
            clock: start_clock(&config),
        },
        config,
    );

    info!("simulation started; type keys and press return");
    tokio::select! {
        result = interface.run() => finish("interface", result),
        result = access.run() => finish("access", result),
        _ = tokio::signal::ctrl_c() => {
            info!("interrupted");
            Ok(())
        }
    }
}

#[cfg(feature = "hardware-serial")]
mod serial {
    use doorlock_hardware::LinkSettings;
    use doorlock_hardware::serial::SerialPortLink;

    use super::*;

    fn open_link(port: &str) -> anyhow::Result<AnyLink> {
        let link = SerialPortLink::open(port, LinkSettings::default())
            .with_context(|| format!("opening {port}"))?;
        Ok(AnyLink::Serial(link))
    }

    pub async fn access(
        port: &str,
        config: Option<&Path>,
        store: Option<&Path>,
    ) -> anyhow::Result<()> {
        let config = load_config(config).await?;
        let store = open_store(store).await?;
        let link = open_link(port)?;
        let (motor, _) = MockMotor::new();
        let (buzzer, _) = MockBuzzer::new();

        let mut access = AccessController::new(
            AccessPeripherals {
                link,
                store,
                motor,
                buzzer,
                clock: start_clock(&config),
            },
            config,
        );

        info!(port, "access node started");
        tokio::select! {
            result = access.run() => finish("access", result),
            _ = tokio::signal::ctrl_c() => Ok(()),
        }
    }

    pub async fn interface(port: &str, config: Option<&Path>) -> anyhow::Result<()> {
        let config = load_config(config).await?;
        let link = open_link(port)?;
        let (keypad, keys) = MockKeypad::new();
        spawn_stdin_keys(keys);

        let mut interface = InterfaceController::new(
            InterfacePeripherals {
                link,
                keypad,
                display: ConsoleDisplay::new(),
                clock: start_clock(&config),
            },
            config,
        );

        info!(port, "interface node started");
        tokio::select! {
            result = interface.run() => finish("interface", result),
            _ = tokio::signal::ctrl_c() => Ok(()),
        }
    }
}
