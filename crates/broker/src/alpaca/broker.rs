use apca::Client;
use async_trait::async_trait;
use tracing::info;

use super::AlpacaAuthEnv;
use super::open_orders::fetch_open_orders;
use crate::{BrokerError, OpenOrder, OpenOrderSource, SupportedBroker};

/// Alpaca REST access used for open-order discovery.
pub struct AlpacaBroker {
    client: Client,
}

impl AlpacaBroker {
    pub fn try_from_auth(auth: &AlpacaAuthEnv) -> Result<Self, BrokerError> {
        let api_info = auth.api_info()?;

        info!(
            "Connecting to Alpaca ({})",
            if auth.is_paper_trading() {
                "paper"
            } else {
                "live"
            }
        );

        Ok(Self {
            client: Client::new(api_info),
        })
    }
}

impl std::fmt::Debug for AlpacaBroker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AlpacaBroker").finish_non_exhaustive()
    }
}

#[async_trait]
impl OpenOrderSource for AlpacaBroker {
    async fn get_open_orders(&self) -> Result<Vec<OpenOrder>, BrokerError> {
        fetch_open_orders(&self.client).await
    }

    fn to_supported_broker(&self) -> SupportedBroker {
        SupportedBroker::Alpaca
    }
}
