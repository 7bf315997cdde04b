use apca::Client;
use apca::api::v2::{order, orders};
use backon::{ExponentialBuilder, Retryable};
use rust_decimal::Decimal;
use std::time::Duration;
use tracing::{debug, warn};

use crate::{BrokerError, BrokerOrderId, Direction, OpenOrder, Symbol};

const OPEN_ORDERS_MAX_RETRIES: usize = 3;

pub(super) async fn fetch_open_orders(client: &Client) -> Result<Vec<OpenOrder>, BrokerError> {
    debug!("Fetching open orders from Alpaca");

    let request = orders::ListReq {
        status: orders::Status::Open,
        ..Default::default()
    };

    let alpaca_orders = (|| async { client.issue::<orders::List>(&request).await })
        .retry(
            ExponentialBuilder::new()
                .with_min_delay(Duration::from_millis(100))
                .with_max_times(OPEN_ORDERS_MAX_RETRIES),
        )
        .notify(|e, delay| warn!("Listing open orders failed, retrying in {delay:?}: {e}"))
        .await
        .map_err(|e| BrokerError::AlpacaRequest(format!("Listing open orders failed: {e}")))?;

    debug!("Alpaca reported {} open orders", alpaca_orders.len());

    alpaca_orders.iter().map(to_open_order).collect()
}

fn to_open_order(alpaca_order: &order::Order) -> Result<OpenOrder, BrokerError> {
    let order_id_str = alpaca_order.id.to_string();

    let order_id =
        order_id_str
            .parse::<BrokerOrderId>()
            .map_err(|e| BrokerError::InvalidOrder {
                order_id: order_id_str.clone(),
                reason: format!("order id is not a UUID: {e}"),
            })?;

    let direction = match alpaca_order.side {
        order::Side::Buy => Direction::Buy,
        order::Side::Sell => Direction::Sell,
    };

    let filled_quantity = alpaca_order
        .filled_quantity
        .to_string()
        .parse::<Decimal>()
        .map_err(|e| BrokerError::InvalidOrder {
            order_id: order_id_str,
            reason: format!("unreadable filled quantity: {e}"),
        })?;

    Ok(OpenOrder {
        order_id,
        symbol: Symbol(alpaca_order.symbol.clone()),
        direction,
        filled_quantity,
    })
}
