//! In-memory vector extractor.
//!
//! Yields a fixed set of records in batches, the shape of a paginated read.
//! Mostly useful for tests and for feeding precomputed data into a flow.

use crate::error::NodeError;
use crate::extractor::{Extractor, RecordStream};
use crate::record::Record;
use async_trait::async_trait;
use futures::stream;

const DEFAULT_BATCH_SIZE: usize = 100;

/// Extractor over an in-memory `Vec<Record>`.
pub struct VecExtractor {
  records: Vec<Record>,
  cursor: usize,
  batch: Vec<Record>,
  batch_size: usize,
}

impl VecExtractor {
  pub fn new(records: Vec<Record>) -> Self {
    Self {
      records,
      cursor: 0,
      batch: Vec::new(),
      batch_size: DEFAULT_BATCH_SIZE,
    }
  }

  /// Sets how many records each `extract` call yields.
  #[must_use]
  pub fn with_batch_size(mut self, batch_size: usize) -> Self {
    self.batch_size = batch_size.max(1);
    self
  }
}

#[async_trait]
impl Extractor for VecExtractor {
  async fn extract(&mut self, _param: Option<&Record>) -> Result<bool, NodeError> {
    if self.cursor >= self.records.len() {
      return Ok(false);
    }
    let end = (self.cursor + self.batch_size).min(self.records.len());
    self.batch = self.records[self.cursor..end].to_vec();
    self.cursor = end;
    Ok(true)
  }

  fn traversable(&mut self) -> RecordStream {
    Box::pin(stream::iter(std::mem::take(&mut self.batch)))
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use futures::StreamExt;
  use serde_json::json;

  #[tokio::test]
  async fn test_batched_extraction() {
    let mut extractor =
      VecExtractor::new(vec![json!(1), json!(2), json!(3)]).with_batch_size(2);

    assert!(extractor.extract(None).await.expect("extract"));
    let first: Vec<_> = extractor.traversable().collect().await;
    assert_eq!(first, vec![json!(1), json!(2)]);

    assert!(extractor.extract(None).await.expect("extract"));
    let second: Vec<_> = extractor.traversable().collect().await;
    assert_eq!(second, vec![json!(3)]);

    assert!(!extractor.extract(None).await.expect("extract"));
  }

  #[tokio::test]
  async fn test_empty_source() {
    let mut extractor = VecExtractor::new(vec![]);
    assert!(!extractor.extract(None).await.expect("extract"));
  }
}
