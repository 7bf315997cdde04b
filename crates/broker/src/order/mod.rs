use rust_decimal::Decimal;

pub mod status;

pub use status::OrderStatus;

use crate::{BrokerOrderId, Direction, Symbol};

/// An order the brokerage reports as still working.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OpenOrder {
    pub order_id: BrokerOrderId,
    pub symbol: Symbol,
    pub direction: Direction,
    /// Quantity already executed before discovery.
    pub filled_quantity: Decimal,
}
