use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt::Display;

use st0x_broker::{BrokerOrderId, Direction, OrderStatus, Symbol};

/// Engine-side identifier of a logical order. Survives broker-side replaces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OrderId(pub u64);

impl Display for OrderId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The engine's view of an order, resolved from a broker order id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderHandle {
    pub order_id: OrderId,
    pub symbol: Symbol,
    pub direction: Direction,
    pub quantity: Decimal,
}

/// Order status change reported to the engine after reconciliation.
///
/// `fill_quantity` is the quantity executed by this event alone, never the
/// cumulative amount.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NormalizedOrderEvent {
    pub order_id: OrderId,
    pub broker_order_id: BrokerOrderId,
    pub symbol: Symbol,
    pub direction: Direction,
    pub status: OrderStatus,
    pub fill_quantity: Decimal,
    pub fill_price: Option<Decimal>,
    pub timestamp: DateTime<Utc>,
}
