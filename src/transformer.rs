//! # Transformer Trait
//!
//! This module defines the [`Transformer`] trait for components that map one
//! record to another inside a flow's inner walk.
//!
//! ## Overview
//!
//! A transformer receives the current record and returns a [`Step`]:
//! usually `Step::Value(new_record)`, which replaces the current record for
//! downstream nodes (transformers are returning nodes by default), but any
//! directive of the interrupt protocol is equally valid — a transformer can
//! skip a record or break the flow.

use crate::error::NodeError;
use crate::interrupt::Step;
use crate::record::Record;
use async_trait::async_trait;

/// Trait for components that reshape records.
///
/// # Example
///
/// ```rust
/// use recordflow::transformers::MapTransformer;
/// use serde_json::json;
///
/// let transformer = MapTransformer::new(|r| json!(r.as_i64().unwrap_or(0) * 2));
/// ```
#[async_trait]
pub trait Transformer: Send {
  /// Executes the transformation for one record.
  async fn exec(&mut self, record: Record) -> Result<Step, NodeError>;
}
