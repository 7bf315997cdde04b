use apca::ApiInfo;
use clap::Parser;

use crate::BrokerError;

/// Alpaca API authentication environment configuration
#[derive(Parser, Debug, Clone)]
pub struct AlpacaAuthEnv {
    /// Alpaca API key ID
    #[clap(long, env = "APCA_API_KEY_ID")]
    pub api_key_id: String,

    /// Alpaca API secret key
    #[clap(long, env = "APCA_API_SECRET_KEY")]
    pub api_secret_key: String,

    /// Alpaca API base URL (paper trading vs live)
    /// Paper: https://paper-api.alpaca.markets
    /// Live: https://api.alpaca.markets
    #[clap(
        long,
        env = "APCA_BASE_URL",
        default_value = "https://paper-api.alpaca.markets"
    )]
    pub base_url: String,
}

impl AlpacaAuthEnv {
    /// Returns true if this configuration is for paper trading
    pub fn is_paper_trading(&self) -> bool {
        self.base_url.contains("paper-api")
    }

    pub fn api_info(&self) -> Result<ApiInfo, BrokerError> {
        ApiInfo::from_parts(&self.base_url, &self.api_key_id, &self.api_secret_key)
            .map_err(|e| BrokerError::AlpacaConfig(e.to_string()))
    }
}
