//! In-memory joinable extractor.
//!
//! The whole record set is served as a single batch on the first keyed
//! request — the widening end of the filter-or-widen latitude joinable
//! extractors have. Subsequent requests report the source drained, so keys
//! that were never present stay misses.

use crate::error::NodeError;
use crate::extractor::{Extractor, JoinableExtractor, RecordStream};
use crate::record::Record;
use async_trait::async_trait;
use futures::stream;

/// Joinable extractor over an in-memory `Vec<Record>`.
pub struct KeyedVecExtractor {
  records: Vec<Record>,
  loaded: bool,
  batch: Vec<Record>,
}

impl KeyedVecExtractor {
  pub fn new(records: Vec<Record>) -> Self {
    Self {
      records,
      loaded: false,
      batch: Vec::new(),
    }
  }

  fn load(&mut self) -> bool {
    if self.loaded {
      return false;
    }
    self.loaded = true;
    self.batch = self.records.clone();
    true
  }
}

#[async_trait]
impl Extractor for KeyedVecExtractor {
  async fn extract(&mut self, _param: Option<&Record>) -> Result<bool, NodeError> {
    Ok(self.load())
  }

  fn traversable(&mut self) -> RecordStream {
    Box::pin(stream::iter(std::mem::take(&mut self.batch)))
  }
}

#[async_trait]
impl JoinableExtractor for KeyedVecExtractor {
  async fn extract_keyed(&mut self, _key: &Record) -> Result<bool, NodeError> {
    Ok(self.load())
  }
}
