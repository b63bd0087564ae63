use crate::flow::FlowId;
use crate::node::NodeId;
use std::error::Error;
use std::fmt;

/// Error type produced by node implementations.
///
/// Nodes report failures as boxed errors; the flow driver wraps them with
/// component context ([`NodeInfo`]) before surfacing them as
/// [`FlowError::Node`].
pub type NodeError = Box<dyn Error + Send + Sync>;

/// Context identifying the node where a runtime error occurred.
#[derive(Debug)]
pub struct NodeInfo {
  /// Process-unique id of the failing node.
  pub id: NodeId,
  /// The node's display label (its configured name, or its type name).
  pub label: String,
  /// Full type name of the node implementation.
  pub type_name: String,
  /// When the failure was observed.
  pub timestamp: chrono::DateTime<chrono::Utc>,
}

impl NodeInfo {
  pub(crate) fn new(id: NodeId, label: String, type_name: &'static str) -> Self {
    Self {
      id,
      label,
      type_name: type_name.to_string(),
      timestamp: chrono::Utc::now(),
    }
  }
}

/// Errors raised by the flow engine.
#[derive(Debug)]
pub enum FlowError {
  /// Misuse of the flow builder or of `send_to`, detected synchronously.
  Composition(String),
  /// A directive named a target that matched no flow on the ancestor path.
  UnknownTarget {
    node: Option<NodeId>,
    flow: Option<FlowId>,
  },
  /// `exec` was entered while a run was already in progress.
  Reentrant { flow: String },
  /// Two records of one join batch carried the same join-key value.
  DuplicateJoinKey { node: NodeId, key: String },
  /// A record was missing the field a join needed to read its key from.
  MissingJoinKey { node: NodeId, field: String },
  /// A node failed at runtime; the flow finished with status `exception`.
  Node { node: NodeInfo, source: NodeError },
}

impl FlowError {
  pub(crate) fn node(
    id: NodeId,
    label: String,
    type_name: &'static str,
    source: NodeError,
  ) -> Self {
    FlowError::Node {
      node: NodeInfo::new(id, label, type_name),
      source,
    }
  }
}

impl fmt::Display for FlowError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      FlowError::Composition(msg) => write!(f, "composition error: {}", msg),
      FlowError::UnknownTarget { node, flow } => {
        write!(f, "directive target not found on any ancestor flow (")?;
        match (node, flow) {
          (Some(n), Some(fl)) => write!(f, "node {}, flow {}", n, fl)?,
          (Some(n), None) => write!(f, "node {}", n)?,
          (None, Some(fl)) => write!(f, "flow {}", fl)?,
          (None, None) => write!(f, "no target")?,
        }
        write!(f, ")")
      }
      FlowError::Reentrant { flow } => {
        write!(f, "flow '{}' exec entered while already running", flow)
      }
      FlowError::DuplicateJoinKey { node, key } => {
        write!(f, "duplicate join key {} in batch of {}", key, node)
      }
      FlowError::MissingJoinKey { node, field } => {
        write!(
          f,
          "record has no join-key field '{}' required by {}",
          field, node
        )
      }
      FlowError::Node { node, source } => {
        write!(f, "error in {} ({}): {}", node.label, node.type_name, source)
      }
    }
  }
}

impl Error for FlowError {
  fn source(&self) -> Option<&(dyn Error + 'static)> {
    match self {
      FlowError::Node { source, .. } => Some(source.as_ref()),
      _ => None,
    }
  }
}
