use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};
use tracing::{debug, warn};

use crate::order::OrderHandle;
use st0x_broker::BrokerOrderId;

/// Resolves broker order ids to orders the engine already knows about.
///
/// The registry only answers "which engine order is this?". Reconciliation
/// state lives in the reconciler.
pub trait OrderRegistry: Send + Sync {
    fn lookup(&self, broker_order_id: &BrokerOrderId) -> Option<OrderHandle>;

    /// Moves the logical order behind `old` to `new` after a replace. `old`
    /// stops resolving.
    fn rebind(&self, old: &BrokerOrderId, new: &BrokerOrderId);

    /// Called once the order behind `broker_order_id` reached a terminal
    /// state. Registries that keep history may ignore it.
    fn release(&self, broker_order_id: &BrokerOrderId);
}

impl<T: OrderRegistry + ?Sized> OrderRegistry for Arc<T> {
    fn lookup(&self, broker_order_id: &BrokerOrderId) -> Option<OrderHandle> {
        (**self).lookup(broker_order_id)
    }

    fn rebind(&self, old: &BrokerOrderId, new: &BrokerOrderId) {
        (**self).rebind(old, new);
    }

    fn release(&self, broker_order_id: &BrokerOrderId) {
        (**self).release(broker_order_id);
    }
}

#[derive(Debug, Default)]
pub struct InMemoryOrderRegistry {
    orders: RwLock<HashMap<BrokerOrderId, OrderHandle>>,
}

impl InMemoryOrderRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&self, broker_order_id: BrokerOrderId, handle: OrderHandle) {
        debug!(
            broker_order_id = %broker_order_id,
            order_id = %handle.order_id,
            "Registering order"
        );

        self.orders
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(broker_order_id, handle);
    }

    pub fn len(&self) -> usize {
        self.orders
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl OrderRegistry for InMemoryOrderRegistry {
    fn lookup(&self, broker_order_id: &BrokerOrderId) -> Option<OrderHandle> {
        self.orders
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(broker_order_id)
            .cloned()
    }

    fn rebind(&self, old: &BrokerOrderId, new: &BrokerOrderId) {
        let mut orders = self.orders.write().unwrap_or_else(PoisonError::into_inner);

        let Some(handle) = orders.remove(old) else {
            warn!(
                old_broker_order_id = %old,
                new_broker_order_id = %new,
                "Cannot rebind unregistered order"
            );
            return;
        };

        debug!(
            old_broker_order_id = %old,
            new_broker_order_id = %new,
            order_id = %handle.order_id,
            "Rebinding order after replace"
        );
        orders.insert(*new, handle);
    }

    fn release(&self, broker_order_id: &BrokerOrderId) {
        let released = self
            .orders
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(broker_order_id);

        if let Some(handle) = released {
            debug!(
                broker_order_id = %broker_order_id,
                order_id = %handle.order_id,
                "Released order"
            );
        }
    }
}
