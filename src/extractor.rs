//! # Extractor Traits
//!
//! This module defines the [`Extractor`] trait for components that produce
//! record batches at the head of a flow, and the [`JoinableExtractor`]
//! extension for sources that can be consulted by a join node.
//!
//! ## Overview
//!
//! Extractors pull records in batches — the shape of a paginated database
//! read or a chunked file scan:
//!
//! - **`extract`**: fetch the next batch, returning `true` iff records were
//!   obtained
//! - **`traversable`**: a lazy stream draining the most recent batch one
//!   record at a time
//!
//! The flow driver alternates the two until `extract` reports the source is
//! drained, then moves on to the next extractor in the from-chain.

use crate::error::NodeError;
use crate::record::Record;
use async_trait::async_trait;
use futures::Stream;
use std::pin::Pin;

/// A lazy sequence of records drained from an extractor's current batch.
pub type RecordStream = Pin<Box<dyn Stream<Item = Record> + Send>>;

/// Trait for components that produce record batches.
///
/// Extractors are the starting point of a flow. Implementations own their
/// resources (file handles, cursors) and are responsible for scoped
/// acquisition and release; the engine never manages them.
///
/// # Example
///
/// ```rust
/// use recordflow::extractors::VecExtractor;
/// use serde_json::json;
///
/// let extractor = VecExtractor::new(vec![json!(1), json!(2), json!(3)]);
/// ```
#[async_trait]
pub trait Extractor: Send {
  /// Fetches the next batch of records.
  ///
  /// `param` is the value the flow was executed with, threaded through so
  /// parameterized sources (keyed queries, seeded cursors) can use it.
  ///
  /// # Returns
  ///
  /// `Ok(true)` iff records were obtained; `Ok(false)` when the source is
  /// drained.
  async fn extract(&mut self, param: Option<&Record>) -> Result<bool, NodeError>;

  /// Returns a stream draining the most recent batch.
  ///
  /// The stream owns the batch; records are yielded in extraction order and
  /// each record of a batch is yielded exactly once.
  fn traversable(&mut self) -> RecordStream;
}

/// An extractor that a join node can consult for keyed batches.
///
/// The engine asks for the next batch when a join-key value misses its
/// index; how the batch is filtered or widened around the requested key is
/// the implementation's choice and opaque to the engine.
#[async_trait]
pub trait JoinableExtractor: Extractor {
  /// Fetches the next batch, given the join-key value that missed.
  ///
  /// The composite extraction query behind this call may use several
  /// columns; only the single-field join key of the registered
  /// [`JoinClause`](crate::join::JoinClause) is used for index lookup
  /// afterwards.
  async fn extract_keyed(&mut self, key: &Record) -> Result<bool, NodeError>;
}
