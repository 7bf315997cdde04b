use rust_decimal::Decimal;
use std::collections::{HashMap, HashSet};

use st0x_broker::{BrokerOrderId, ExecutionId};

/// Reconciliation state for one broker order id.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(super) struct TrackedOrder {
    executions: HashSet<ExecutionId>,
    filled_quantity: Decimal,
}

impl TrackedOrder {
    pub(super) fn with_filled_quantity(filled_quantity: Decimal) -> Self {
        Self {
            executions: HashSet::new(),
            filled_quantity,
        }
    }

    /// Returns false when the execution was already recorded.
    pub(super) fn record(&mut self, execution_id: ExecutionId) -> bool {
        self.executions.insert(execution_id)
    }

    pub(super) fn execution_count(&self) -> usize {
        self.executions.len()
    }

    /// Advances the cumulative filled quantity and returns the quantity
    /// executed since the previous fill. A cumulative value at or below the
    /// recorded one yields zero and leaves the record unchanged.
    pub(super) fn advance_fill(&mut self, cumulative: Decimal) -> Decimal {
        if cumulative <= self.filled_quantity {
            return Decimal::ZERO;
        }

        let delta = cumulative - self.filled_quantity;
        self.filled_quantity = cumulative;
        delta
    }
}

/// Tracked orders plus the broker order ids whose tracking has ended.
///
/// An id is retired once it reaches a terminal update or is replaced. Any
/// later update for it is a redelivery, whatever the registry still resolves.
#[derive(Debug, Default)]
pub(super) struct ReconcileState {
    orders: HashMap<BrokerOrderId, TrackedOrder>,
    retired: HashSet<BrokerOrderId>,
}

impl ReconcileState {
    pub(super) fn get(&self, broker_order_id: &BrokerOrderId) -> Option<&TrackedOrder> {
        self.orders.get(broker_order_id)
    }

    pub(super) fn get_mut(&mut self, broker_order_id: &BrokerOrderId) -> Option<&mut TrackedOrder> {
        self.orders.get_mut(broker_order_id)
    }

    pub(super) fn contains(&self, broker_order_id: &BrokerOrderId) -> bool {
        self.orders.contains_key(broker_order_id)
    }

    pub(super) fn len(&self) -> usize {
        self.orders.len()
    }

    pub(super) fn is_retired(&self, broker_order_id: &BrokerOrderId) -> bool {
        self.retired.contains(broker_order_id)
    }

    /// Get-or-create with an empty execution set.
    pub(super) fn open(&mut self, broker_order_id: BrokerOrderId) -> &mut TrackedOrder {
        self.orders.entry(broker_order_id).or_default()
    }

    /// Inserts unless the id is already tracked or retired. Returns whether
    /// it was inserted.
    pub(super) fn insert_new(&mut self, broker_order_id: BrokerOrderId, order: TrackedOrder) -> bool {
        if self.contains(&broker_order_id) || self.is_retired(&broker_order_id) {
            return false;
        }

        self.orders.insert(broker_order_id, order);
        true
    }

    pub(super) fn retire(&mut self, broker_order_id: BrokerOrderId) {
        self.orders.remove(&broker_order_id);
        self.retired.insert(broker_order_id);
    }
}
