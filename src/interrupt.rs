//! Directives that alter traversal, and the uniform node result types.
//!
//! Nodes never manipulate the walk directly. They return a [`Step`] (or a
//! [`Verdict`] for qualifiers), and the flow driver routes any embedded
//! [`Interrupter`]: a continue skips the rest of the walk for the current
//! record, a break terminates the carrier flow, and either may name a target
//! node — possibly one in an ancestor flow — to redirect control.

use crate::flow::FlowId;
use crate::node::NodeId;
use crate::record::Record;

/// What an [`Interrupter`] asks the flow driver to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InterruptKind {
  /// Abort the inner walk for the current record only.
  Continue,
  /// Abort the inner walk and the outer extractor loop of the carrier flow.
  Break,
}

/// A directive emitted by a node that alters traversal.
///
/// Without targets, the directive is confined to the carrier flow. A target
/// node in an ancestor flow makes the directive propagate upward: each flow
/// on the path either consumes it (the target is one of its nodes) or
/// re-raises it to its parent. A target that matches no ancestor is a
/// composition error at the moment it would be honored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Interrupter {
  kind: InterruptKind,
  target_node: Option<NodeId>,
  target_flow: Option<FlowId>,
}

impl Interrupter {
  /// Creates a directive of the given kind with no targets.
  pub fn new(kind: InterruptKind) -> Self {
    Self {
      kind,
      target_node: None,
      target_flow: None,
    }
  }

  /// A continue directive confined to the carrier flow: the current record
  /// is dropped and the outer loop moves on to the next one.
  pub fn skip_record() -> Self {
    Self::new(InterruptKind::Continue)
  }

  /// A break directive confined to the carrier flow: the flow stops pulling
  /// records and finishes `dirty`.
  pub fn break_flow() -> Self {
    Self::new(InterruptKind::Break)
  }

  /// Targets the directive at a node. For a continue, traversal resumes at
  /// that node; for a break, the flow owning that node is the one broken.
  #[must_use]
  pub fn with_target_node(mut self, node: NodeId) -> Self {
    self.target_node = Some(node);
    self
  }

  /// Targets the directive at a specific flow by id.
  #[must_use]
  pub fn with_target_flow(mut self, flow: FlowId) -> Self {
    self.target_flow = Some(flow);
    self
  }

  pub fn kind(&self) -> InterruptKind {
    self.kind
  }

  pub fn target_node(&self) -> Option<NodeId> {
    self.target_node
  }

  pub fn target_flow(&self) -> Option<FlowId> {
    self.target_flow
  }
}

/// Uniform result of executing one node against one record.
///
/// Keeping the record inside the `Value` variant makes directive routing a
/// match in the flow driver instead of a special-cased identity check.
#[derive(Debug)]
pub enum Step {
  /// The node produced a record. It replaces the current record downstream
  /// when the node is marked returning; otherwise it is discarded.
  Value(Record),
  /// The node produced nothing; the current record passes unchanged.
  Pass,
  /// The node emitted a traversal directive.
  Interrupt(Interrupter),
}

/// Result of a qualifier's predicate.
#[derive(Debug)]
pub enum Verdict {
  /// Continue with the record unchanged.
  Accept,
  /// Skip the remainder of the current record in the carrier flow only.
  Reject,
  /// A full directive, routed like any other interrupter.
  Interrupt(Interrupter),
}

impl Verdict {
  /// Maps a plain boolean predicate onto the qualifier convention.
  pub fn from_bool(accept: bool) -> Self {
    if accept {
      Verdict::Accept
    } else {
      Verdict::Reject
    }
  }
}
