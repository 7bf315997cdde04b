use clap::Parser;
use tracing::Level;

use crate::telemetry::{TelemetryGuard, setup_telemetry};

#[derive(clap::ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

impl From<LogLevel> for Level {
    fn from(log_level: LogLevel) -> Self {
        match log_level {
            LogLevel::Trace => Self::TRACE,
            LogLevel::Debug => Self::DEBUG,
            LogLevel::Info => Self::INFO,
            LogLevel::Warn => Self::WARN,
            LogLevel::Error => Self::ERROR,
        }
    }
}

impl From<&LogLevel> for Level {
    fn from(log_level: &LogLevel) -> Self {
        (*log_level).into()
    }
}

#[derive(Parser, Debug, Clone)]
pub struct Env {
    #[clap(long, env, default_value = "info")]
    pub log_level: LogLevel,
    /// HyperDX API key for telemetry export (optional)
    #[clap(long, env)]
    pub hyperdx_api_key: Option<String>,
    /// Service name for HyperDX identification
    #[clap(long, env, default_value = "st0x-trade-sync")]
    pub hyperdx_service_name: String,
}

impl Env {
    /// Installs the global subscriber. Exports spans to HyperDX when an API
    /// key is configured, otherwise logs to the console only. The returned
    /// guard flushes pending spans on drop and must be held until exit.
    pub fn init_logging(&self) -> Option<TelemetryGuard> {
        let level: Level = self.log_level.into();

        if let Some(api_key) = &self.hyperdx_api_key {
            match setup_telemetry(api_key.clone(), &self.hyperdx_service_name, level) {
                Ok(guard) => return Some(guard),
                Err(e) => {
                    eprintln!("Failed to set up telemetry: {e}, falling back to console logging");
                }
            }
        }

        setup_tracing(&self.log_level);
        if self.hyperdx_api_key.is_none() {
            tracing::warn!("No HYPERDX_API_KEY configured - running with console logging only");
        }
        None
    }
}

pub(crate) fn default_filter(level: Level) -> String {
    format!("st0x_trade_sync={level},st0x_broker={level}")
}

pub fn setup_tracing(log_level: &LogLevel) {
    let level: Level = log_level.into();
    let default_filter = default_filter(level);

    if let Err(e) = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .compact()
        .try_init()
    {
        eprintln!("Failed to initialize console logging: {e}");
    }
}
