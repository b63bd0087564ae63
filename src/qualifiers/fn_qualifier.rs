//! Closure-backed qualifier.

use crate::error::NodeError;
use crate::interrupt::Verdict;
use crate::qualifier::Qualifier;
use crate::record::Record;
use async_trait::async_trait;

/// Qualifier wrapping a `&Record -> bool` predicate.
///
/// # Example
///
/// ```rust
/// use recordflow::qualifiers::FnQualifier;
/// use recordflow::record;
///
/// let adults = FnQualifier::new(|r| {
///   record::field(r, "age").and_then(|v| v.as_i64()).unwrap_or(0) >= 18
/// });
/// ```
pub struct FnQualifier {
  predicate: Box<dyn Fn(&Record) -> bool + Send + Sync>,
}

impl FnQualifier {
  pub fn new<F>(predicate: F) -> Self
  where
    F: Fn(&Record) -> bool + Send + Sync + 'static,
  {
    Self {
      predicate: Box::new(predicate),
    }
  }
}

#[async_trait]
impl Qualifier for FnQualifier {
  async fn qualify(&mut self, record: &Record) -> Result<Verdict, NodeError> {
    Ok(Verdict::from_bool((self.predicate)(record)))
  }
}
