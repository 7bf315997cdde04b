//! Deduplication and reconciliation of Alpaca trade updates.
//!
//! Raw brokerage updates go into a [`TradeUpdateReconciler`], which resolves
//! them against an [`OrderRegistry`], drops redelivered executions and emits
//! [`NormalizedOrderEvent`]s with incremental fill quantities to an
//! [`OrderEventSink`].

pub mod cli;
pub mod env;
mod error;
mod open_orders;
mod order;
mod reconciler;
mod registry;
pub mod replay;
mod sink;
pub mod telemetry;

pub use env::{Env, LogLevel};
pub use error::{ReconcileError, ReplayError};
pub use open_orders::seed_from_broker;
pub use order::{NormalizedOrderEvent, OrderHandle, OrderId};
pub use reconciler::TradeUpdateReconciler;
pub use registry::{InMemoryOrderRegistry, OrderRegistry};
pub use replay::{ReplayRecord, ReplaySession, ReplaySummary};
pub use sink::{ChannelSink, OrderEventSink, RecordingSink};
