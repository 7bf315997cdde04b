use proptest::prelude::*;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde_json::json;
use std::sync::Arc;

use st0x_broker::{
    BrokerOrderId, Direction, ExecutionId, OpenOrder, OrderStatus, Symbol, TestBroker, TradeEvent,
    TradeUpdate,
};
use st0x_trade_sync::{
    ChannelSink, InMemoryOrderRegistry, OrderHandle, OrderId, OrderRegistry, RecordingSink,
    ReplaySession, TradeUpdateReconciler, seed_from_broker,
};

fn handle(order_id: u64, quantity: Decimal) -> OrderHandle {
    OrderHandle {
        order_id: OrderId(order_id),
        symbol: Symbol::from("AAPL"),
        direction: Direction::Buy,
        quantity,
    }
}

#[tokio::test]
async fn test_channel_sink_feeds_async_consumer() {
    let registry = Arc::new(InMemoryOrderRegistry::new());
    let (sink, mut receiver) = ChannelSink::new();
    let reconciler = TradeUpdateReconciler::new(Arc::clone(&registry), sink);

    let broker_order_id = BrokerOrderId::new_v4();
    registry.register(broker_order_id, handle(1, dec!(10)));
    reconciler.track(broker_order_id);

    let consumer = tokio::spawn(async move {
        let mut filled = Decimal::ZERO;
        while let Some(event) = receiver.recv().await {
            filled += event.fill_quantity;
            if event.status == OrderStatus::Filled {
                break;
            }
        }
        filled
    });

    let partial = TradeUpdate::new(
        TradeEvent::PartialFill,
        broker_order_id,
        Some(ExecutionId::new_v4()),
        dec!(4),
    );
    let fill = TradeUpdate::new(
        TradeEvent::Fill,
        broker_order_id,
        Some(ExecutionId::new_v4()),
        dec!(10),
    );
    for update in [&partial, &partial, &fill, &partial, &fill] {
        reconciler.handle(update);
    }

    assert_eq!(consumer.await.unwrap(), dec!(10));
    assert_eq!(reconciler.tracked_order_count(), 0);
}

#[tokio::test]
async fn test_restart_seeds_partially_filled_order() {
    let registry = InMemoryOrderRegistry::new();
    let broker_order_id = BrokerOrderId::new_v4();
    registry.register(broker_order_id, handle(9, dec!(5)));

    let broker = TestBroker::with_open_orders(vec![OpenOrder {
        order_id: broker_order_id,
        symbol: Symbol::from("AAPL"),
        direction: Direction::Buy,
        filled_quantity: dec!(3),
    }]);
    let reconciler = TradeUpdateReconciler::new(registry, RecordingSink::new());

    seed_from_broker(&broker, &reconciler).await.unwrap();

    let filled = reconciler
        .handle(&TradeUpdate::new(
            TradeEvent::Fill,
            broker_order_id,
            Some(ExecutionId::new_v4()),
            dec!(5),
        ))
        .unwrap();

    assert_eq!(filled.order_id, OrderId(9));
    assert_eq!(filled.fill_quantity, dec!(2));
    assert_eq!(reconciler.sink().len(), 1);
}

#[tokio::test]
async fn test_replay_file_follows_replace_chain() {
    let first = BrokerOrderId::new_v4();
    let second = BrokerOrderId::new_v4();
    let third = BrokerOrderId::new_v4();
    let fill_execution = ExecutionId::new_v4();

    let replaced = |old: BrokerOrderId, new: BrokerOrderId| {
        json!({
            "type": "trade_update",
            "event": "replaced",
            "order_id": old,
            "execution_id": ExecutionId::new_v4(),
            "replaced_by": new
        })
    };

    let lines = vec![
        json!({
            "type": "order",
            "broker_order_id": first,
            "order_id": 3,
            "symbol": "NVDA",
            "direction": "SELL",
            "quantity": "4"
        }),
        json!({"type": "trade_update", "event": "new", "order_id": first}),
        replaced(first, second),
        replaced(second, third),
        json!({
            "type": "trade_update",
            "event": "fill",
            "order_id": third,
            "execution_id": fill_execution,
            "filled_quantity": "4",
            "price": "101.5",
            "timestamp": "2030-03-01T15:00:00Z"
        }),
    ];
    let contents: String = lines
        .iter()
        .map(|line| format!("{line}\n"))
        .collect();

    let file = tempfile::NamedTempFile::new().unwrap();
    std::fs::write(file.path(), contents).unwrap();

    let session = ReplaySession::new();
    let summary = session.run_file(file.path()).await.unwrap();

    assert_eq!(summary.records_read, 5);
    assert_eq!(summary.events_emitted, 2);
    assert_eq!(summary.orders_tracked, 0);

    let events = session.take_events();
    let filled = &events[1];
    assert_eq!(filled.status, OrderStatus::Filled);
    assert_eq!(filled.order_id, OrderId(3));
    assert_eq!(filled.broker_order_id, third);
    assert_eq!(filled.symbol, Symbol::from("NVDA"));
    assert_eq!(filled.fill_quantity, dec!(4));
    assert_eq!(filled.fill_price, Some(dec!(101.5)));

    assert!(session.registry().lookup(&first).is_none());
    assert!(session.registry().lookup(&second).is_none());
    assert!(session.registry().lookup(&third).is_none());
    assert!(session.registry().is_empty());
}

proptest! {
    #[test]
    fn redelivered_fills_sum_to_cumulative_quantity(
        deltas in prop::collection::vec(1_u32..100, 1..10),
        repeats in prop::collection::vec(1_usize..4, 10),
    ) {
        let registry = InMemoryOrderRegistry::new();
        let broker_order_id = BrokerOrderId::new_v4();
        registry.register(broker_order_id, handle(1, dec!(1000)));
        let reconciler = TradeUpdateReconciler::new(registry, RecordingSink::new());
        reconciler.track(broker_order_id);

        let mut cumulative = Decimal::ZERO;
        for (index, delta) in deltas.iter().enumerate() {
            cumulative += Decimal::from(*delta);
            let event = if index + 1 == deltas.len() {
                TradeEvent::Fill
            } else {
                TradeEvent::PartialFill
            };
            let update = TradeUpdate::new(
                event,
                broker_order_id,
                Some(ExecutionId::new_v4()),
                cumulative,
            );

            for _ in 0..repeats[index] {
                reconciler.handle(&update);
            }
        }

        let events = reconciler.sink().events();
        let reported: Decimal = events.iter().map(|event| event.fill_quantity).sum();

        prop_assert_eq!(reported, cumulative);
        prop_assert_eq!(events.len(), deltas.len());
        prop_assert_eq!(
            events
                .iter()
                .filter(|event| event.status == OrderStatus::Filled)
                .count(),
            1
        );
        prop_assert!(!reconciler.is_tracked(&broker_order_id));
    }
}
