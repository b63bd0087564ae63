//! Unbuffered vector loader.
//!
//! Collects every record into a shared `Vec` as it arrives. There is no
//! buffer to commit or discard, so `flush` is a no-op; the
//! [`BufferedVecLoader`](crate::loaders::BufferedVecLoader) is the variant
//! exercising the deferred-flush contract.

use crate::error::NodeError;
use crate::interrupt::Step;
use crate::loader::Loader;
use crate::record::Record;
use crate::status::FlowStatus;
use async_trait::async_trait;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

type Shared = Arc<Mutex<Vec<Record>>>;

fn lock(shared: &Shared) -> MutexGuard<'_, Vec<Record>> {
  shared.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Loader appending records to a shared vector.
#[derive(Default)]
pub struct VecLoader {
  shared: Shared,
}

impl VecLoader {
  pub fn new() -> Self {
    Self::default()
  }

  /// A handle for reading the collected records after the flow has taken
  /// ownership of the loader.
  pub fn handle(&self) -> VecLoaderHandle {
    VecLoaderHandle {
      shared: Arc::clone(&self.shared),
    }
  }
}

#[async_trait]
impl Loader for VecLoader {
  async fn exec(&mut self, record: Record) -> Result<Step, NodeError> {
    lock(&self.shared).push(record);
    Ok(Step::Pass)
  }

  async fn flush(&mut self, _status: Option<FlowStatus>) -> Result<(), NodeError> {
    Ok(())
  }
}

/// Read handle onto a [`VecLoader`]'s collected records.
#[derive(Clone)]
pub struct VecLoaderHandle {
  shared: Shared,
}

impl VecLoaderHandle {
  /// Snapshot of the records collected so far.
  pub fn records(&self) -> Vec<Record> {
    lock(&self.shared).clone()
  }

  pub fn len(&self) -> usize {
    lock(&self.shared).len()
  }

  pub fn is_empty(&self) -> bool {
    lock(&self.shared).is_empty()
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use serde_json::json;

  #[tokio::test]
  async fn test_collects_records() {
    let mut loader = VecLoader::new();
    let handle = loader.handle();
    loader.exec(json!(1)).await.expect("exec");
    loader.exec(json!(2)).await.expect("exec");
    loader.flush(Some(FlowStatus::Clean)).await.expect("flush");
    assert_eq!(handle.records(), vec![json!(1), json!(2)]);
    assert_eq!(handle.len(), 2);
  }
}
