use tracing::{error, info};

use crate::reconciler::TradeUpdateReconciler;
use crate::registry::OrderRegistry;
use crate::sink::OrderEventSink;
use st0x_broker::{BrokerError, OpenOrder, OpenOrderSource};

/// Fetches the orders still working at the brokerage and starts tracking
/// them, so updates for orders placed before this process started are not
/// dropped as stale. Returns the open orders reported by the broker.
pub async fn seed_from_broker<B, R, S>(
    broker: &B,
    reconciler: &TradeUpdateReconciler<R, S>,
) -> Result<Vec<OpenOrder>, BrokerError>
where
    B: OpenOrderSource + ?Sized,
    R: OrderRegistry,
    S: OrderEventSink,
{
    let open_orders = broker.get_open_orders().await.inspect_err(|e| {
        error!(
            broker = %broker.to_supported_broker(),
            "Failed to fetch open orders: {e}"
        );
    })?;

    let added = reconciler.seed_open_orders(&open_orders);

    info!(
        broker = %broker.to_supported_broker(),
        open_orders = open_orders.len(),
        added,
        "Seeded reconciler with open orders"
    );

    Ok(open_orders)
}
