//! Trade-update reconciliation.
//!
//! The brokerage streams trade updates asynchronously and may deliver any of
//! them more than once. [`TradeUpdateReconciler`] keeps, per broker order id,
//! the set of execution ids already applied and the cumulative quantity
//! already reported, so that every execution reaches the engine exactly once
//! and fills are reported as increments.
//!
//! Tracking for an order id starts when the order is placed ([`track`]),
//! discovered open at startup ([`seed_open_orders`]) or acknowledged by a
//! `pending_new`/`new` update. It ends at a terminal update, or moves to the
//! replacement id on `replaced`. Ended ids are retired: redeliveries for them
//! are dropped as stale and terminal ids are released from the registry.
//!
//! [`track`]: TradeUpdateReconciler::track
//! [`seed_open_orders`]: TradeUpdateReconciler::seed_open_orders

use chrono::Utc;
use rust_decimal::Decimal;
use std::sync::{Mutex, MutexGuard};
use tracing::{debug, error, info, warn};

mod tracked;

use tracked::{ReconcileState, TrackedOrder};

use crate::error::ReconcileError;
use crate::order::{NormalizedOrderEvent, OrderHandle};
use crate::registry::OrderRegistry;
use crate::sink::OrderEventSink;
use st0x_broker::{BrokerOrderId, ExecutionId, OpenOrder, OrderStatus, TradeEvent, TradeUpdate};

pub struct TradeUpdateReconciler<R, S> {
    registry: R,
    sink: S,
    state: Mutex<ReconcileState>,
}

impl<R: OrderRegistry, S: OrderEventSink> TradeUpdateReconciler<R, S> {
    pub fn new(registry: R, sink: S) -> Self {
        Self {
            registry,
            sink,
            state: Mutex::new(ReconcileState::default()),
        }
    }

    pub fn registry(&self) -> &R {
        &self.registry
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    /// Applies one trade update. Returns the normalized event that was
    /// emitted to the sink, if any.
    ///
    /// Never fails: unknown, stale, duplicate and malformed updates are logged
    /// and dropped so the update stream keeps flowing.
    pub fn handle(&self, update: &TradeUpdate) -> Option<NormalizedOrderEvent> {
        let mut state = self.lock_state();

        let emitted = match self.apply(&mut state, update) {
            Ok(Some(event)) => {
                self.sink.emit(event.clone());
                Some(event)
            }
            Ok(None) => None,
            Err(dropped) => {
                match &dropped {
                    ReconcileError::DuplicateExecution { .. } | ReconcileError::StaleOrder { .. } => {
                        debug!("{dropped}");
                    }
                    ReconcileError::UnknownOrder { .. } => warn!("{dropped}"),
                    ReconcileError::MalformedEvent { .. } => error!("{dropped}"),
                }
                None
            }
        };

        // held through the emit so events leave in processing order
        drop(state);
        emitted
    }

    /// Starts tracking a freshly placed order. Idempotent.
    pub fn track(&self, broker_order_id: BrokerOrderId) {
        if self
            .lock_state()
            .insert_new(broker_order_id, TrackedOrder::default())
        {
            debug!(broker_order_id = %broker_order_id, "Tracking placed order");
        }
    }

    /// Starts tracking orders discovered open at the brokerage, keeping their
    /// filled quantity so later fills are reported as increments. Orders that
    /// are already tracked keep their state and retired ids are skipped.
    /// Returns how many were added.
    pub fn seed_open_orders(&self, open_orders: &[OpenOrder]) -> usize {
        let mut state = self.lock_state();
        let mut added = 0;

        for open_order in open_orders {
            let order = TrackedOrder::with_filled_quantity(open_order.filled_quantity);
            if !state.insert_new(open_order.order_id, order) {
                continue;
            }

            debug!(
                broker_order_id = %open_order.order_id,
                symbol = %open_order.symbol,
                filled_quantity = %open_order.filled_quantity,
                "Tracking open order"
            );
            added += 1;
        }

        drop(state);
        added
    }

    pub fn tracked_order_count(&self) -> usize {
        self.lock_state().len()
    }

    pub fn is_tracked(&self, broker_order_id: &BrokerOrderId) -> bool {
        self.lock_state().contains(broker_order_id)
    }

    /// Number of executions recorded for a tracked order.
    pub fn execution_count(&self, broker_order_id: &BrokerOrderId) -> Option<usize> {
        self.lock_state()
            .get(broker_order_id)
            .map(TrackedOrder::execution_count)
    }

    fn lock_state(&self) -> MutexGuard<'_, ReconcileState> {
        self.state.lock().unwrap_or_else(|poisoned| {
            warn!("Reconcile state lock was poisoned, continuing with last state");
            poisoned.into_inner()
        })
    }

    fn apply(
        &self,
        state: &mut ReconcileState,
        update: &TradeUpdate,
    ) -> Result<Option<NormalizedOrderEvent>, ReconcileError> {
        if state.is_retired(&update.order_id) {
            return Err(stale(update));
        }

        let handle =
            self.registry
                .lookup(&update.order_id)
                .ok_or(ReconcileError::UnknownOrder {
                    order_id: update.order_id,
                    event: update.event,
                })?;

        let emitted = match update.event {
            TradeEvent::PendingNew | TradeEvent::New => {
                state.open(update.order_id);
                debug!(
                    broker_order_id = %update.order_id,
                    order_id = %handle.order_id,
                    event = %update.event,
                    "Order acknowledged"
                );
                Some(normalize(
                    &handle,
                    update,
                    OrderStatus::Submitted,
                    Decimal::ZERO,
                ))
            }
            TradeEvent::PartialFill | TradeEvent::Fill => apply_fill(state, &handle, update)?,
            TradeEvent::PendingCancel => {
                record_execution(state, update)?;
                debug!(broker_order_id = %update.order_id, "Cancel pending");
                None
            }
            TradeEvent::Canceled | TradeEvent::Expired => {
                Some(apply_closed(state, &handle, update, OrderStatus::Canceled)?)
            }
            TradeEvent::Rejected => Some(apply_closed(state, &handle, update, OrderStatus::Invalid)?),
            TradeEvent::Replaced => {
                self.apply_replace(state, &handle, update)?;
                None
            }
        };

        if update.event.is_terminal() {
            state.retire(update.order_id);
            self.registry.release(&update.order_id);
        }

        Ok(emitted)
    }

    fn apply_replace(
        &self,
        state: &mut ReconcileState,
        handle: &OrderHandle,
        update: &TradeUpdate,
    ) -> Result<(), ReconcileError> {
        let replaced_by = update
            .replaced_by
            .ok_or_else(|| malformed(update, "missing replacement order id"))?;

        if replaced_by == update.order_id {
            return Err(malformed(update, "order replaced by itself"));
        }

        let execution_id = require_execution_id(update)?;

        if let Some(order) = state.get_mut(&update.order_id) {
            if !order.record(execution_id) {
                return Err(duplicate(update, execution_id));
            }
        } else {
            // Registries may keep old ids resolving after a rebind. If the
            // replacement already resolves to this order, the replace was
            // applied before.
            let already_rebound = self
                .registry
                .lookup(&replaced_by)
                .is_some_and(|rebound| rebound.order_id == handle.order_id);
            if already_rebound {
                return Err(stale(update));
            }

            info!(
                broker_order_id = %update.order_id,
                order_id = %handle.order_id,
                "Replace for untracked order, treating as acknowledged"
            );
        }

        state.retire(update.order_id);
        state.open(replaced_by);
        self.registry.rebind(&update.order_id, &replaced_by);

        info!(
            old_broker_order_id = %update.order_id,
            new_broker_order_id = %replaced_by,
            order_id = %handle.order_id,
            "Order replaced"
        );

        Ok(())
    }
}

/// Records the fill's execution and reports the quantity it added.
///
/// A `fill` always reports `Filled`, with zero quantity if nothing was left
/// to add. A `partial_fill` whose cumulative quantity did not advance reports
/// nothing: a zero-quantity partial fill carries no news for the engine. Its
/// execution id is still recorded so a redelivery stays deduplicated.
///
/// Fills beyond the order quantity are reported as the brokerage sent them
/// and logged.
fn apply_fill(
    state: &mut ReconcileState,
    handle: &OrderHandle,
    update: &TradeUpdate,
) -> Result<Option<NormalizedOrderEvent>, ReconcileError> {
    let order = record_execution(state, update)?;
    let fill_quantity = order.advance_fill(update.filled_quantity);

    if update.filled_quantity > handle.quantity {
        warn!(
            broker_order_id = %update.order_id,
            order_id = %handle.order_id,
            filled_quantity = %update.filled_quantity,
            order_quantity = %handle.quantity,
            "Filled quantity exceeds order quantity"
        );
    }

    if update.event == TradeEvent::Fill {
        info!(
            broker_order_id = %update.order_id,
            order_id = %handle.order_id,
            fill_quantity = %fill_quantity,
            "Order filled"
        );

        return Ok(Some(normalize(
            handle,
            update,
            OrderStatus::Filled,
            fill_quantity,
        )));
    }

    if fill_quantity.is_zero() {
        warn!(
            broker_order_id = %update.order_id,
            filled_quantity = %update.filled_quantity,
            "Partial fill did not advance filled quantity"
        );
        return Ok(None);
    }

    info!(
        broker_order_id = %update.order_id,
        order_id = %handle.order_id,
        fill_quantity = %fill_quantity,
        filled_quantity = %update.filled_quantity,
        "Order partially filled"
    );

    Ok(Some(normalize(
        handle,
        update,
        OrderStatus::PartiallyFilled,
        fill_quantity,
    )))
}

/// Terminal updates without a fill: canceled, expired, rejected.
fn apply_closed(
    state: &mut ReconcileState,
    handle: &OrderHandle,
    update: &TradeUpdate,
    status: OrderStatus,
) -> Result<NormalizedOrderEvent, ReconcileError> {
    record_execution(state, update)?;

    info!(
        broker_order_id = %update.order_id,
        order_id = %handle.order_id,
        event = %update.event,
        "Order closed"
    );

    Ok(normalize(handle, update, status, Decimal::ZERO))
}

/// Check-and-insert of the update's execution id on its tracked order.
fn record_execution<'a>(
    state: &'a mut ReconcileState,
    update: &TradeUpdate,
) -> Result<&'a mut TrackedOrder, ReconcileError> {
    let execution_id = require_execution_id(update)?;

    let order = state
        .get_mut(&update.order_id)
        .ok_or_else(|| stale(update))?;

    if !order.record(execution_id) {
        return Err(duplicate(update, execution_id));
    }

    Ok(order)
}

fn require_execution_id(update: &TradeUpdate) -> Result<ExecutionId, ReconcileError> {
    update
        .execution_id
        .ok_or_else(|| malformed(update, "missing execution id"))
}

fn stale(update: &TradeUpdate) -> ReconcileError {
    ReconcileError::StaleOrder {
        order_id: update.order_id,
        event: update.event,
    }
}

fn malformed(update: &TradeUpdate, reason: &'static str) -> ReconcileError {
    ReconcileError::MalformedEvent {
        order_id: update.order_id,
        event: update.event,
        reason,
    }
}

fn duplicate(update: &TradeUpdate, execution_id: ExecutionId) -> ReconcileError {
    ReconcileError::DuplicateExecution {
        order_id: update.order_id,
        execution_id,
        event: update.event,
    }
}

fn normalize(
    handle: &OrderHandle,
    update: &TradeUpdate,
    status: OrderStatus,
    fill_quantity: Decimal,
) -> NormalizedOrderEvent {
    NormalizedOrderEvent {
        order_id: handle.order_id,
        broker_order_id: update.order_id,
        symbol: handle.symbol.clone(),
        direction: handle.direction,
        status,
        fill_quantity,
        fill_price: if fill_quantity.is_zero() {
            None
        } else {
            update.price
        },
        timestamp: update.timestamp.unwrap_or_else(Utc::now),
    }
}
