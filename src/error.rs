//! Error types for reconciliation and replay.
//!
//! None of these stop the trade-update path: the reconciler logs them and
//! moves on to the next event.

use st0x_broker::{BrokerOrderId, ExecutionId, TradeEvent};

/// Reasons a trade update produced no state change.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ReconcileError {
    #[error("No registered order for broker order {order_id} ({event} event)")]
    UnknownOrder {
        order_id: BrokerOrderId,
        event: TradeEvent,
    },
    #[error("Broker order {order_id} is not tracked, dropping stale {event} event")]
    StaleOrder {
        order_id: BrokerOrderId,
        event: TradeEvent,
    },
    /// Expected when the brokerage redelivers an update. Not a failure.
    #[error("Execution {execution_id} already applied to broker order {order_id} ({event} event)")]
    DuplicateExecution {
        order_id: BrokerOrderId,
        execution_id: ExecutionId,
        event: TradeEvent,
    },
    #[error("Malformed {event} event for broker order {order_id}: {reason}")]
    MalformedEvent {
        order_id: BrokerOrderId,
        event: TradeEvent,
        reason: &'static str,
    },
}

#[derive(Debug, thiserror::Error)]
pub enum ReplayError {
    #[error("Failed to read trade update stream: {0}")]
    Io(#[from] std::io::Error),
}
