//! JSON Lines file extractor.
//!
//! One JSON record per line, read in batches through tokio's async file IO.

use crate::error::NodeError;
use crate::extractor::{Extractor, RecordStream};
use crate::record::Record;
use async_trait::async_trait;
use futures::{stream, StreamExt};
use std::path::PathBuf;
use tokio::fs::File;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio_stream::wrappers::LinesStream;

const DEFAULT_BATCH_SIZE: usize = 500;

/// Extractor reading JSON Lines files.
pub struct JsonLinesExtractor {
  path: PathBuf,
  batch_size: usize,
  lines: Option<LinesStream<BufReader<File>>>,
  batch: Vec<Record>,
}

impl JsonLinesExtractor {
  pub fn new(path: impl Into<PathBuf>) -> Self {
    Self {
      path: path.into(),
      batch_size: DEFAULT_BATCH_SIZE,
      lines: None,
      batch: Vec::new(),
    }
  }

  /// Sets how many lines each `extract` call reads.
  #[must_use]
  pub fn with_batch_size(mut self, batch_size: usize) -> Self {
    self.batch_size = batch_size.max(1);
    self
  }
}

#[async_trait]
impl Extractor for JsonLinesExtractor {
  async fn extract(&mut self, _param: Option<&Record>) -> Result<bool, NodeError> {
    if self.lines.is_none() {
      let file = File::open(&self.path).await?;
      self.lines = Some(LinesStream::new(BufReader::new(file).lines()));
    }
    let mut batch = Vec::with_capacity(self.batch_size);
    if let Some(lines) = self.lines.as_mut() {
      while batch.len() < self.batch_size {
        match lines.next().await {
          Some(Ok(line)) if line.trim().is_empty() => continue,
          Some(Ok(line)) => batch.push(serde_json::from_str(&line)?),
          Some(Err(err)) => return Err(err.into()),
          None => break,
        }
      }
    }
    self.batch = batch;
    Ok(!self.batch.is_empty())
  }

  fn traversable(&mut self) -> RecordStream {
    Box::pin(stream::iter(std::mem::take(&mut self.batch)))
  }
}
