use serde::Serialize;
use std::fmt;

/// Terminal disposition of a flow run.
///
/// A flow that drains all of its extractors without incident finishes
/// `Clean`. A break directive honored inside the flow marks it `Dirty`.
/// A node error marks it `Exception`; loaders receive that status in their
/// final flush so buffered records can be discarded instead of committed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FlowStatus {
  /// All extractors were drained; every record traversed normally or was
  /// skipped by a continue directive.
  Clean,
  /// The flow was broken from inside by a break directive.
  Dirty,
  /// A node raised an unrecoverable error during traversal.
  Exception,
}

impl FlowStatus {
  /// Returns true if the flow finished without breaks or errors.
  pub fn is_clean(&self) -> bool {
    matches!(self, FlowStatus::Clean)
  }

  /// Returns true if the flow was broken from inside.
  pub fn is_dirty(&self) -> bool {
    matches!(self, FlowStatus::Dirty)
  }

  /// Returns true if the flow terminated on a node error.
  pub fn is_exception(&self) -> bool {
    matches!(self, FlowStatus::Exception)
  }
}

impl fmt::Display for FlowStatus {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      FlowStatus::Clean => write!(f, "clean"),
      FlowStatus::Dirty => write!(f, "dirty"),
      FlowStatus::Exception => write!(f, "exception"),
    }
  }
}
