use clap::{Parser, Subcommand};
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::{error, info};

use crate::env::Env;
use crate::replay::ReplaySession;
use st0x_broker::{AlpacaAuthEnv, AlpacaBroker, OpenOrderSource};

#[derive(Debug, Parser)]
#[command(name = "st0x-trade-sync")]
#[command(about = "Deduplicates and reconciles Alpaca trade updates")]
#[command(version)]
pub struct Cli {
    #[clap(flatten)]
    pub env: Env,
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Replay a recorded JSON-lines trade update stream and print the
    /// normalized order events
    Replay {
        /// Path to the JSON-lines file
        #[arg(short = 'f', long = "file")]
        file: PathBuf,
    },
    /// List orders currently open at Alpaca
    OpenOrders {
        #[clap(flatten)]
        alpaca_auth: AlpacaAuthEnv,
    },
}

pub async fn run_command(command: Commands) -> anyhow::Result<()> {
    run_command_with_writers(command, &mut std::io::stdout()).await
}

async fn run_command_with_writers<W: Write>(
    command: Commands,
    stdout: &mut W,
) -> anyhow::Result<()> {
    match command {
        Commands::Replay { file } => replay_with_writers(&file, stdout).await,
        Commands::OpenOrders { alpaca_auth } => {
            let broker = AlpacaBroker::try_from_auth(&alpaca_auth)?;
            list_open_orders_with_writers(&broker, stdout).await
        }
    }
}

async fn replay_with_writers<W: Write>(file: &Path, stdout: &mut W) -> anyhow::Result<()> {
    info!("Replaying trade updates from {}", file.display());

    let session = ReplaySession::new();
    let summary = session.run_file(file).await.inspect_err(|e| {
        error!("Replay of {} failed: {e}", file.display());
    })?;

    for event in session.take_events() {
        writeln!(stdout, "{}", serde_json::to_string(&event)?)?;
    }

    writeln!(
        stdout,
        "Replayed {} records ({} lines skipped): {} events emitted, {} orders still tracked",
        summary.records_read, summary.lines_skipped, summary.events_emitted, summary.orders_tracked
    )?;

    Ok(())
}

async fn list_open_orders_with_writers<B: OpenOrderSource, W: Write>(
    broker: &B,
    stdout: &mut W,
) -> anyhow::Result<()> {
    let open_orders = broker.get_open_orders().await.inspect_err(|e| {
        error!("Failed to fetch open orders: {e}");
    })?;

    if open_orders.is_empty() {
        writeln!(stdout, "No open orders at {}", broker.to_supported_broker())?;
        return Ok(());
    }

    writeln!(
        stdout,
        "{} open orders at {}:",
        open_orders.len(),
        broker.to_supported_broker()
    )?;
    for order in &open_orders {
        writeln!(
            stdout,
            "   {} {} {} (filled {})",
            order.order_id, order.direction, order.symbol, order.filled_quantity
        )?;
    }

    Ok(())
}
