//! # Flow Statistics and Observers
//!
//! The engine counts, per node, the records it processed and the directives
//! it emitted, and stamps each run with start/finish times and the terminal
//! status. [`FlowObserver`]s are passive callbacks invoked at the lifecycle
//! points of a run; they can read but never alter control flow.

use crate::error::FlowError;
use crate::node::NodeId;
use crate::status::FlowStatus;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fmt::Write as _;

/// Counters for one node across the current run.
#[derive(Debug, Clone, Serialize)]
pub struct NodeStats {
  pub id: NodeId,
  pub label: String,
  /// Times this node processed a record during the walk.
  pub records: u64,
  /// Continue directives emitted by this node.
  pub continues: u64,
  /// Break directives emitted by this node.
  pub breaks: u64,
}

/// Bookkeeping for one flow, reset at the start of each run.
#[derive(Debug, Clone, Default, Serialize)]
pub struct FlowStats {
  pub flow: String,
  pub started_at: Option<DateTime<Utc>>,
  pub finished_at: Option<DateTime<Utc>>,
  /// Records yielded by from-chain extractors.
  pub records_extracted: u64,
  /// Terminal status of the last run, if any run finished.
  pub status: Option<FlowStatus>,
  nodes: Vec<NodeStats>,
}

impl FlowStats {
  pub(crate) fn new(flow: String) -> Self {
    Self {
      flow,
      ..Default::default()
    }
  }

  pub(crate) fn register_node(&mut self, id: NodeId, label: String) {
    self.nodes.push(NodeStats {
      id,
      label,
      records: 0,
      continues: 0,
      breaks: 0,
    });
  }

  pub(crate) fn relabel(&mut self, id: NodeId, label: String) {
    if let Some(stats) = self.nodes.iter_mut().find(|n| n.id == id) {
      stats.label = label;
    }
  }

  pub(crate) fn begin(&mut self) {
    self.started_at = Some(Utc::now());
    self.finished_at = None;
    self.records_extracted = 0;
    self.status = None;
    for node in &mut self.nodes {
      node.records = 0;
      node.continues = 0;
      node.breaks = 0;
    }
  }

  pub(crate) fn finish(&mut self, status: FlowStatus) {
    self.finished_at = Some(Utc::now());
    self.status = Some(status);
  }

  pub(crate) fn record_visit(&mut self, id: NodeId) {
    if let Some(stats) = self.nodes.iter_mut().find(|n| n.id == id) {
      stats.records += 1;
    }
  }

  pub(crate) fn record_continue(&mut self, id: NodeId) {
    if let Some(stats) = self.nodes.iter_mut().find(|n| n.id == id) {
      stats.continues += 1;
    }
  }

  pub(crate) fn record_break(&mut self, id: NodeId) {
    if let Some(stats) = self.nodes.iter_mut().find(|n| n.id == id) {
      stats.breaks += 1;
    }
  }

  /// Per-node counters in composition order.
  pub fn nodes(&self) -> &[NodeStats] {
    &self.nodes
  }

  /// Counters for one node.
  pub fn node(&self, id: NodeId) -> Option<&NodeStats> {
    self.nodes.iter().find(|n| n.id == id)
  }

  /// Human-readable summary of the last run.
  pub fn report(&self) -> String {
    let mut out = String::new();
    let status = self
      .status
      .map(|s| s.to_string())
      .unwrap_or_else(|| "not run".to_string());
    let _ = write!(
      out,
      "flow '{}': status={}, extracted={}",
      self.flow, status, self.records_extracted
    );
    if let (Some(started), Some(finished)) = (self.started_at, self.finished_at) {
      let elapsed = finished.signed_duration_since(started);
      let _ = write!(out, ", took={}ms", elapsed.num_milliseconds());
    }
    for node in &self.nodes {
      let _ = write!(
        out,
        "\n  {} {}: records={} continues={} breaks={}",
        node.id, node.label, node.records, node.continues, node.breaks
      );
    }
    out
  }
}

/// Passive observer of a flow's lifecycle.
///
/// Observers receive references only; they cannot mutate records or alter
/// control flow.
pub trait FlowObserver: Send {
  /// Invoked when a run begins.
  fn on_start(&mut self, _flow: &str) {}

  /// Invoked after each extracted record finishes its walk.
  fn on_progress(&mut self, _flow: &str, _records_extracted: u64) {}

  /// Invoked after a successful run, once loaders are flushed.
  fn on_success(&mut self, _flow: &str, _stats: &FlowStats) {}

  /// Invoked when a run fails, after the best-effort exception flush.
  fn on_fail(&mut self, _flow: &str, _error: &FlowError) {}
}
