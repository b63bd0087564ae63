//! Fixed-size batch aggregator.
//!
//! Absorbs records until `size` have accumulated, then emits them as one
//! JSON array record. Leftovers are emitted by `finalize` when the flow's
//! outer loop ends.

use crate::aggregator::Aggregator;
use crate::error::NodeError;
use crate::record::Record;
use async_trait::async_trait;
use serde_json::Value;

/// Aggregator grouping records into arrays of `size`.
pub struct BatchAggregator {
  size: usize,
  buffer: Vec<Record>,
}

impl BatchAggregator {
  pub fn new(size: usize) -> Self {
    Self {
      size: size.max(1),
      buffer: Vec::new(),
    }
  }
}

#[async_trait]
impl Aggregator for BatchAggregator {
  async fn aggregate(&mut self, record: Record) -> Result<Option<Record>, NodeError> {
    self.buffer.push(record);
    if self.buffer.len() >= self.size {
      Ok(Some(Value::Array(std::mem::take(&mut self.buffer))))
    } else {
      Ok(None)
    }
  }

  async fn finalize(&mut self) -> Result<Option<Record>, NodeError> {
    if self.buffer.is_empty() {
      Ok(None)
    } else {
      Ok(Some(Value::Array(std::mem::take(&mut self.buffer))))
    }
  }
}
