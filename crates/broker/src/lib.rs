use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt::Display;
use uuid::Uuid;

pub mod alpaca;
pub mod error;
pub mod order;
pub mod trade_update;

pub use alpaca::{AlpacaAuthEnv, AlpacaBroker};
pub use error::BrokerError;
pub use order::{OpenOrder, OrderStatus};
pub use test::TestBroker;
pub use trade_update::{TradeEvent, TradeUpdate};

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Symbol(pub String);

impl Display for Symbol {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for Symbol {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

/// Identifier the brokerage assigns to one order submission. A replace
/// produces a new one for the same logical order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BrokerOrderId(pub Uuid);

impl BrokerOrderId {
    pub fn new_v4() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Display for BrokerOrderId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<Uuid> for BrokerOrderId {
    fn from(value: Uuid) -> Self {
        Self(value)
    }
}

impl std::str::FromStr for BrokerOrderId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s).map(Self)
    }
}

/// Identifier the brokerage assigns to one fill, cancel or replace event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ExecutionId(pub Uuid);

impl ExecutionId {
    pub fn new_v4() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Display for ExecutionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<Uuid> for ExecutionId {
    fn from(value: Uuid) -> Self {
        Self(value)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Direction {
    Buy,
    Sell,
}

impl Direction {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Buy => "BUY",
            Self::Sell => "SELL",
        }
    }
}

impl Display for Direction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SupportedBroker {
    Alpaca,
    Test,
}

impl std::fmt::Display for SupportedBroker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Alpaca => write!(f, "alpaca"),
            Self::Test => write!(f, "test"),
        }
    }
}

/// Discovery of orders that are already working at the brokerage, used to
/// seed reconciliation state when a process starts mid-session.
#[async_trait]
pub trait OpenOrderSource: Send + Sync + 'static {
    async fn get_open_orders(&self) -> Result<Vec<OpenOrder>, BrokerError>;

    fn to_supported_broker(&self) -> SupportedBroker;
}
