//! # Loader Trait
//!
//! This module defines the [`Loader`] trait for components at the writing
//! end of a flow. Loaders consume records during the walk and commit them in
//! `flush`, which the engine calls exactly once per flow run.
//!
//! ## Deferred flush
//!
//! `flush` distinguishes two call sites by its argument:
//!
//! - **`None`** — the loader itself decided to drain its buffer mid-flow
//!   (a batch-insert threshold was reached).
//! - **`Some(status)`** — the engine's final flush after the outer loop
//!   ends. The buffer must be fully drained; the loader inspects the status
//!   and commits leftovers (`Clean` / `Dirty`) or discards them
//!   (`Exception`).
//!
//! Loaders inside branch flows are flushed when the root flow flushes,
//! unless the branch was embedded with forced flushing.

use crate::error::NodeError;
use crate::interrupt::Step;
use crate::record::Record;
use crate::status::FlowStatus;
use async_trait::async_trait;

/// Trait for components that consume records and eventually commit them.
///
/// Loaders are non-returning by default: the record seen by downstream
/// nodes is the one the loader received. A loader marked returning may
/// replace it through `Step::Value` — the way a database writer propagates
/// generated primary keys — and may emit directives like any other node.
#[async_trait]
pub trait Loader: Send {
  /// Consumes one record.
  async fn exec(&mut self, record: Record) -> Result<Step, NodeError>;

  /// Drains buffered records.
  ///
  /// See the module docs for the meaning of `status`.
  async fn flush(&mut self, status: Option<FlowStatus>) -> Result<(), NodeError>;
}
