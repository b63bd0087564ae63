//! Closure-backed transformer.

use crate::error::NodeError;
use crate::interrupt::Step;
use crate::record::Record;
use crate::transformer::Transformer;
use async_trait::async_trait;

/// Transformer wrapping a `Record -> Record` closure.
///
/// # Example
///
/// ```rust
/// use recordflow::transformers::MapTransformer;
/// use serde_json::json;
///
/// let doubler = MapTransformer::new(|r| json!(r.as_i64().unwrap_or(0) * 2));
/// ```
pub struct MapTransformer {
  map: Box<dyn Fn(Record) -> Record + Send + Sync>,
}

impl MapTransformer {
  pub fn new<F>(map: F) -> Self
  where
    F: Fn(Record) -> Record + Send + Sync + 'static,
  {
    Self { map: Box::new(map) }
  }
}

#[async_trait]
impl Transformer for MapTransformer {
  async fn exec(&mut self, record: Record) -> Result<Step, NodeError> {
    Ok(Step::Value((self.map)(record)))
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use serde_json::json;

  #[tokio::test]
  async fn test_maps_record() {
    let mut transformer = MapTransformer::new(|r| json!(r.as_i64().unwrap_or(0) + 1));
    let step = transformer.exec(json!(41)).await.expect("exec");
    assert!(matches!(step, Step::Value(v) if v == json!(42)));
  }
}
