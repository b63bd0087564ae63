//! # Node Model
//!
//! A [`Node`] is one pipeline participant: an id, a returning-value flag,
//! an optional display name, and the behavior variant the flow driver
//! dispatches on. The heterogeneous node kinds are modeled as a tagged
//! enum so the inner walk is a single match instead of downcasts.

use crate::aggregator::Aggregator;
use crate::extractor::{Extractor, JoinableExtractor};
use crate::flow::Flow;
use crate::join::{JoinClause, JoinIndex};
use crate::loader::Loader;
use crate::qualifier::Qualifier;
use crate::transformer::Transformer;
use serde::Serialize;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

static NEXT_NODE_ID: AtomicU64 = AtomicU64::new(1);

/// Process-unique identifier of a node, assigned at construction.
///
/// Directives target nodes by id; [`Flow::last_added`](crate::flow::Flow::last_added)
/// exposes the id of the most recently composed node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct NodeId(u64);

impl NodeId {
  pub(crate) fn next() -> Self {
    NodeId(NEXT_NODE_ID.fetch_add(1, Ordering::Relaxed))
  }

  /// The raw numeric id.
  pub fn value(&self) -> u64 {
    self.0
  }
}

impl fmt::Display for NodeId {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "node#{}", self.0)
  }
}

/// Behavior variants the flow driver dispatches on.
pub(crate) enum NodeKind {
  /// A from-chain source; acts only in the outer loop.
  Extract(Box<dyn Extractor>),
  /// A joinable source consulted per record during the walk.
  Join {
    extractor: Box<dyn JoinableExtractor>,
    clause: JoinClause,
    index: JoinIndex,
  },
  Transform(Box<dyn Transformer>),
  Load(Box<dyn Loader>),
  Qualify(Box<dyn Qualifier>),
  Aggregate(Box<dyn Aggregator>),
  /// A flow embedded as a node, executed once per upstream record.
  Branch { flow: Box<Flow>, force_flush: bool },
}

/// One pipeline participant inside a [`Flow`](crate::flow::Flow).
pub struct Node {
  pub(crate) id: NodeId,
  pub(crate) name: Option<String>,
  pub(crate) type_name: &'static str,
  /// Whether a `Step::Value` from this node replaces the current record.
  pub(crate) returns_value: bool,
  pub(crate) kind: NodeKind,
}

impl Node {
  fn new(type_name: &'static str, returns_value: bool, kind: NodeKind) -> Self {
    Self {
      id: NodeId::next(),
      name: None,
      type_name,
      returns_value,
      kind,
    }
  }

  pub(crate) fn extract<E: Extractor + 'static>(extractor: E) -> Self {
    Self::new(
      std::any::type_name::<E>(),
      false,
      NodeKind::Extract(Box::new(extractor)),
    )
  }

  pub(crate) fn join<E: JoinableExtractor + 'static>(extractor: E, clause: JoinClause) -> Self {
    Self::new(
      std::any::type_name::<E>(),
      true,
      NodeKind::Join {
        extractor: Box::new(extractor),
        clause,
        index: JoinIndex::default(),
      },
    )
  }

  pub(crate) fn transform<T: Transformer + 'static>(transformer: T) -> Self {
    Self::new(
      std::any::type_name::<T>(),
      true,
      NodeKind::Transform(Box::new(transformer)),
    )
  }

  pub(crate) fn load<L: Loader + 'static>(loader: L) -> Self {
    Self::new(
      std::any::type_name::<L>(),
      false,
      NodeKind::Load(Box::new(loader)),
    )
  }

  pub(crate) fn qualify<Q: Qualifier + 'static>(qualifier: Q) -> Self {
    Self::new(
      std::any::type_name::<Q>(),
      false,
      NodeKind::Qualify(Box::new(qualifier)),
    )
  }

  pub(crate) fn aggregate<A: Aggregator + 'static>(aggregator: A) -> Self {
    Self::new(
      std::any::type_name::<A>(),
      true,
      NodeKind::Aggregate(Box::new(aggregator)),
    )
  }

  pub(crate) fn branch(flow: Flow, force_flush: bool) -> Self {
    Self::new(
      std::any::type_name::<Flow>(),
      false,
      NodeKind::Branch {
        flow: Box::new(flow),
        force_flush,
      },
    )
  }

  /// The node's process-unique id.
  pub fn id(&self) -> NodeId {
    self.id
  }

  /// Display label: the configured name, or the implementation type name.
  pub(crate) fn label(&self) -> String {
    self
      .name
      .clone()
      .unwrap_or_else(|| self.type_name.to_string())
  }

  pub(crate) fn is_extractor(&self) -> bool {
    matches!(self.kind, NodeKind::Extract(_))
  }
}
