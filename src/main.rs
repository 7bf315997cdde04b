use clap::Parser;
use st0x_trade_sync::cli::{Cli, run_command};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv_override().ok();

    let cli = Cli::parse();
    let _telemetry_guard = cli.env.init_logging();

    run_command(cli.command).await
}
