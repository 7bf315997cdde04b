//! Offline replay of recorded trade update streams.
//!
//! A replay file is JSON lines. Each line is either an `order` record, which
//! registers and tracks an order as placement would, or a `trade_update`
//! record carrying a brokerage update. Lines that do not parse are counted and
//! skipped so one bad record does not abort the replay.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::Arc;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader};
use tracing::{info, warn};

use crate::error::ReplayError;
use crate::order::{NormalizedOrderEvent, OrderHandle, OrderId};
use crate::reconciler::TradeUpdateReconciler;
use crate::registry::InMemoryOrderRegistry;
use crate::sink::RecordingSink;
use st0x_broker::{BrokerOrderId, Direction, Symbol, TradeUpdate};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ReplayRecord {
    Order {
        broker_order_id: BrokerOrderId,
        order_id: OrderId,
        symbol: Symbol,
        direction: Direction,
        quantity: Decimal,
    },
    TradeUpdate(TradeUpdate),
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ReplaySummary {
    pub records_read: usize,
    pub lines_skipped: usize,
    pub events_emitted: usize,
    pub orders_tracked: usize,
}

type ReplayReconciler = TradeUpdateReconciler<Arc<InMemoryOrderRegistry>, Arc<RecordingSink>>;

pub struct ReplaySession {
    registry: Arc<InMemoryOrderRegistry>,
    sink: Arc<RecordingSink>,
    reconciler: ReplayReconciler,
}

impl Default for ReplaySession {
    fn default() -> Self {
        Self::new()
    }
}

impl ReplaySession {
    pub fn new() -> Self {
        let registry = Arc::new(InMemoryOrderRegistry::new());
        let sink = Arc::new(RecordingSink::new());
        let reconciler = TradeUpdateReconciler::new(Arc::clone(&registry), Arc::clone(&sink));

        Self {
            registry,
            sink,
            reconciler,
        }
    }

    pub fn reconciler(&self) -> &ReplayReconciler {
        &self.reconciler
    }

    pub fn registry(&self) -> &InMemoryOrderRegistry {
        &self.registry
    }

    /// Drains the events emitted so far.
    pub fn take_events(&self) -> Vec<NormalizedOrderEvent> {
        self.sink.take()
    }

    pub fn apply(&self, record: ReplayRecord) -> Option<NormalizedOrderEvent> {
        match record {
            ReplayRecord::Order {
                broker_order_id,
                order_id,
                symbol,
                direction,
                quantity,
            } => {
                self.registry.register(
                    broker_order_id,
                    OrderHandle {
                        order_id,
                        symbol,
                        direction,
                        quantity,
                    },
                );
                self.reconciler.track(broker_order_id);
                None
            }
            ReplayRecord::TradeUpdate(update) => self.reconciler.handle(&update),
        }
    }

    pub async fn run<Rd: AsyncBufRead + Unpin>(
        &self,
        reader: Rd,
    ) -> Result<ReplaySummary, ReplayError> {
        let mut lines = reader.lines();
        let mut summary = ReplaySummary::default();
        let mut line_number = 0_usize;

        while let Some(line) = lines.next_line().await? {
            line_number += 1;

            let line = line.trim();
            if line.is_empty() {
                continue;
            }

            match serde_json::from_str::<ReplayRecord>(line) {
                Ok(record) => {
                    summary.records_read += 1;
                    if self.apply(record).is_some() {
                        summary.events_emitted += 1;
                    }
                }
                Err(e) => {
                    warn!(line_number, "Skipping malformed replay record: {e}");
                    summary.lines_skipped += 1;
                }
            }
        }

        summary.orders_tracked = self.reconciler.tracked_order_count();

        info!(
            records_read = summary.records_read,
            lines_skipped = summary.lines_skipped,
            events_emitted = summary.events_emitted,
            orders_tracked = summary.orders_tracked,
            "Replay complete"
        );

        Ok(summary)
    }

    pub async fn run_file(&self, path: &Path) -> Result<ReplaySummary, ReplayError> {
        let file = tokio::fs::File::open(path).await?;
        self.run(BufReader::new(file)).await
    }
}
