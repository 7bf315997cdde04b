use std::sync::{Arc, Mutex, PoisonError};
use tokio::sync::mpsc;
use tracing::warn;

use crate::order::NormalizedOrderEvent;

/// Receives normalized order events. Implementations must not block: the
/// reconciler emits while holding its state lock.
pub trait OrderEventSink: Send + Sync {
    fn emit(&self, event: NormalizedOrderEvent);
}

impl<T: OrderEventSink + ?Sized> OrderEventSink for Arc<T> {
    fn emit(&self, event: NormalizedOrderEvent) {
        (**self).emit(event);
    }
}

/// Forwards events to an async consumer over an unbounded channel.
#[derive(Debug, Clone)]
pub struct ChannelSink {
    sender: mpsc::UnboundedSender<NormalizedOrderEvent>,
}

impl ChannelSink {
    pub fn new() -> (Self, mpsc::UnboundedReceiver<NormalizedOrderEvent>) {
        let (sender, receiver) = mpsc::unbounded_channel();
        (Self { sender }, receiver)
    }
}

impl OrderEventSink for ChannelSink {
    fn emit(&self, event: NormalizedOrderEvent) {
        if let Err(mpsc::error::SendError(event)) = self.sender.send(event) {
            warn!(
                order_id = %event.order_id,
                broker_order_id = %event.broker_order_id,
                status = %event.status,
                "Order event receiver dropped, discarding event"
            );
        }
    }
}

/// Keeps every emitted event in memory.
#[derive(Debug, Default)]
pub struct RecordingSink {
    events: Mutex<Vec<NormalizedOrderEvent>>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<NormalizedOrderEvent> {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn take(&self) -> Vec<NormalizedOrderEvent> {
        std::mem::take(&mut *self.events.lock().unwrap_or_else(PoisonError::into_inner))
    }

    pub fn len(&self) -> usize {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl OrderEventSink for RecordingSink {
    fn emit(&self, event: NormalizedOrderEvent) {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(event);
    }
}
