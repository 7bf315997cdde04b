/// Errors raised while talking to a brokerage.
#[derive(Debug, thiserror::Error)]
pub enum BrokerError {
    #[error("Alpaca request failed: {0}")]
    AlpacaRequest(String),

    #[error("Invalid Alpaca API configuration: {0}")]
    AlpacaConfig(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Invalid order {order_id}: {reason}")]
    InvalidOrder { order_id: String, reason: String },
}
