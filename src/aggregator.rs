//! # Aggregator Trait
//!
//! Aggregators absorb records one at a time and emit an aggregate once
//! enough have accumulated. An absorbed record is skipped for the rest of
//! the walk; an emitted aggregate replaces the current record downstream.

use crate::error::NodeError;
use crate::record::Record;
use async_trait::async_trait;

/// Trait for nodes that fold many records into fewer.
#[async_trait]
pub trait Aggregator: Send {
  /// Offers one record to the aggregate.
  ///
  /// # Returns
  ///
  /// `None` absorbs the record (the walk skips to the next record);
  /// `Some(aggregate)` sends the aggregate downstream as the current record.
  async fn aggregate(&mut self, record: Record) -> Result<Option<Record>, NodeError>;

  /// Drains any partially accumulated aggregate.
  ///
  /// Called once by the engine when the outer loop ends, before loaders are
  /// flushed. A returned record walks the nodes after the aggregator.
  async fn finalize(&mut self) -> Result<Option<Record>, NodeError> {
    Ok(None)
  }
}
