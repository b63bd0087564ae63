//! Buffered vector loader.
//!
//! Buffers records and commits them on flush, the way a bulk database
//! writer batches inserts. An optional threshold triggers loader-initiated
//! mid-flow flushes (`flush(None)`); the engine's final flush commits
//! leftovers on `Clean`/`Dirty` and discards them on `Exception`. Every
//! flush call is recorded so tests can assert the flush contract.

use crate::error::NodeError;
use crate::interrupt::Step;
use crate::loader::Loader;
use crate::record::Record;
use crate::status::FlowStatus;
use async_trait::async_trait;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

fn lock<T>(shared: &Arc<Mutex<T>>) -> MutexGuard<'_, T> {
  shared.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Loader buffering records until flush.
#[derive(Default)]
pub struct BufferedVecLoader {
  buffer: Vec<Record>,
  threshold: Option<usize>,
  committed: Arc<Mutex<Vec<Record>>>,
  flush_calls: Arc<Mutex<Vec<Option<FlowStatus>>>>,
}

impl BufferedVecLoader {
  pub fn new() -> Self {
    Self::default()
  }

  /// Flushes the buffer mid-flow whenever it reaches `threshold` records.
  #[must_use]
  pub fn with_threshold(mut self, threshold: usize) -> Self {
    self.threshold = Some(threshold.max(1));
    self
  }

  /// A handle for inspecting commits and flush calls after the flow has
  /// taken ownership of the loader.
  pub fn handle(&self) -> BufferedVecLoaderHandle {
    BufferedVecLoaderHandle {
      committed: Arc::clone(&self.committed),
      flush_calls: Arc::clone(&self.flush_calls),
    }
  }
}

#[async_trait]
impl Loader for BufferedVecLoader {
  async fn exec(&mut self, record: Record) -> Result<Step, NodeError> {
    self.buffer.push(record);
    if let Some(threshold) = self.threshold {
      if self.buffer.len() >= threshold {
        self.flush(None).await?;
      }
    }
    Ok(Step::Pass)
  }

  async fn flush(&mut self, status: Option<FlowStatus>) -> Result<(), NodeError> {
    lock(&self.flush_calls).push(status);
    match status {
      Some(FlowStatus::Exception) => self.buffer.clear(),
      _ => lock(&self.committed).append(&mut self.buffer),
    }
    Ok(())
  }
}

/// Read handle onto a [`BufferedVecLoader`]'s commits and flush history.
#[derive(Clone)]
pub struct BufferedVecLoaderHandle {
  committed: Arc<Mutex<Vec<Record>>>,
  flush_calls: Arc<Mutex<Vec<Option<FlowStatus>>>>,
}

impl BufferedVecLoaderHandle {
  /// Snapshot of the committed records.
  pub fn records(&self) -> Vec<Record> {
    lock(&self.committed).clone()
  }

  /// Every `flush` argument observed, in call order.
  pub fn flush_calls(&self) -> Vec<Option<FlowStatus>> {
    lock(&self.flush_calls).clone()
  }
}
