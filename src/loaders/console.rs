//! Console loader for debugging flows.

use crate::error::NodeError;
use crate::interrupt::Step;
use crate::loader::Loader;
use crate::record::Record;
use crate::status::FlowStatus;
use async_trait::async_trait;

/// Loader printing each record to stdout as one JSON line.
#[derive(Default)]
pub struct ConsoleLoader {
  prefix: Option<String>,
}

impl ConsoleLoader {
  pub fn new() -> Self {
    Self::default()
  }

  /// Prefixes each printed line, to tell loaders apart in mixed output.
  #[must_use]
  pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
    self.prefix = Some(prefix.into());
    self
  }
}

#[async_trait]
impl Loader for ConsoleLoader {
  async fn exec(&mut self, record: Record) -> Result<Step, NodeError> {
    let line = serde_json::to_string(&record)?;
    match &self.prefix {
      Some(prefix) => println!("[{}] {}", prefix, line),
      None => println!("{}", line),
    }
    Ok(Step::Pass)
  }

  async fn flush(&mut self, _status: Option<FlowStatus>) -> Result<(), NodeError> {
    Ok(())
  }
}
