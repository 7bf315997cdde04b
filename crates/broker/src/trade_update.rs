//! Brokerage trade-update events as consumed by reconciliation.
//!
//! A trade update reports one lifecycle transition of one order submission.
//! The brokerage may deliver the same update more than once, so every update
//! that represents an execution carries an [`ExecutionId`] that identifies it.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::{BrokerOrderId, ExecutionId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TradeEvent {
    PendingNew,
    New,
    PartialFill,
    Fill,
    PendingCancel,
    Canceled,
    Replaced,
    Rejected,
    Expired,
}

impl TradeEvent {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::PendingNew => "pending_new",
            Self::New => "new",
            Self::PartialFill => "partial_fill",
            Self::Fill => "fill",
            Self::PendingCancel => "pending_cancel",
            Self::Canceled => "canceled",
            Self::Replaced => "replaced",
            Self::Rejected => "rejected",
            Self::Expired => "expired",
        }
    }

    /// Events that end the order. `Replaced` is not one of them: the order
    /// lives on under its replacement id.
    pub const fn is_terminal(self) -> bool {
        matches!(
            self,
            Self::Fill | Self::Canceled | Self::Rejected | Self::Expired
        )
    }
}

impl std::fmt::Display for TradeEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TradeUpdate {
    pub event: TradeEvent,
    pub order_id: BrokerOrderId,
    #[serde(default)]
    pub execution_id: Option<ExecutionId>,
    /// Cumulative quantity filled on this order id, as reported by the event.
    #[serde(default)]
    pub filled_quantity: Decimal,
    #[serde(default)]
    pub price: Option<Decimal>,
    #[serde(default)]
    pub timestamp: Option<DateTime<Utc>>,
    /// Only set on `replaced`: the order id that takes over.
    #[serde(default)]
    pub replaced_by: Option<BrokerOrderId>,
}

impl TradeUpdate {
    pub fn new(
        event: TradeEvent,
        order_id: BrokerOrderId,
        execution_id: Option<ExecutionId>,
        filled_quantity: Decimal,
    ) -> Self {
        Self {
            event,
            order_id,
            execution_id,
            filled_quantity,
            price: None,
            timestamp: None,
            replaced_by: None,
        }
    }

    #[must_use]
    pub fn with_price(mut self, price: Decimal) -> Self {
        self.price = Some(price);
        self
    }

    #[must_use]
    pub fn with_timestamp(mut self, timestamp: DateTime<Utc>) -> Self {
        self.timestamp = Some(timestamp);
        self
    }

    #[must_use]
    pub fn with_replaced_by(mut self, replaced_by: BrokerOrderId) -> Self {
        self.replaced_by = Some(replaced_by);
        self
    }
}
