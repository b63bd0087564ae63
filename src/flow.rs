//! # Flow Driver
//!
//! A [`Flow`] owns a strictly ordered list of nodes and drives records
//! through them. Two shapes are supported:
//!
//! 1. **Zero extractors** — the flow is a single-pass linear chain:
//!    `exec(param)` walks all nodes once with `param` threaded through the
//!    returning nodes and yields the final value.
//! 2. **One or more extractors** — extractor-driven mode: the from-chain is
//!    drained in registration order, each extracted record walking the
//!    nodes after its producing extractor.
//!
//! ## Directive routing
//!
//! Nodes influence traversal only through their [`Step`] results. The
//! driver routes directives: untargeted continues skip the current record,
//! untargeted breaks terminate the carrier flow (`dirty`), and targeted
//! directives unwind to the named node — propagating through branch
//! boundaries until the flow owning the target consumes them.
//!
//! ## Flush orchestration
//!
//! After the outer loop, every loader's `flush(Some(status))` is called in
//! composition order, recursing into branch flows whose flush was deferred.
//! On a node error the flow finishes `exception`, all loaders get a
//! best-effort `flush(Some(Exception))`, and the original error is
//! returned.

use crate::aggregator::Aggregator;
use crate::error::FlowError;
use crate::extractor::{Extractor, JoinableExtractor};
use crate::interrupt::{InterruptKind, Interrupter, Step, Verdict};
use crate::join::JoinClause;
use crate::loader::Loader;
use crate::node::{Node, NodeId, NodeKind};
use crate::qualifier::Qualifier;
use crate::record::{self, Record};
use crate::stats::{FlowObserver, FlowStats};
use crate::status::FlowStatus;
use crate::transformer::Transformer;
use futures::StreamExt;
use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::{debug, trace, warn};

static NEXT_FLOW_ID: AtomicU64 = AtomicU64::new(1);

/// Process-unique identifier of a flow.
///
/// Directives may target a flow by id to reach a specific ancestor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FlowId(u64);

impl FlowId {
  fn next() -> Self {
    FlowId(NEXT_FLOW_ID.fetch_add(1, Ordering::Relaxed))
  }

  /// The raw numeric id.
  pub fn value(&self) -> u64 {
    self.0
  }
}

impl fmt::Display for FlowId {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "flow#{}", self.0)
  }
}

/// Outcome of a completed flow run.
#[derive(Debug, Clone, PartialEq)]
pub struct FlowResult {
  /// Terminal status of the run.
  pub status: FlowStatus,
  /// Final record value of a linear (extractor-less) run.
  pub value: Option<Record>,
}

/// Internal outcome of one `exec`, before root-level directive resolution.
enum ExecOutcome {
  Finished(FlowResult),
  /// A directive targeted at an ancestor escaped this flow.
  Propagate(Interrupter),
}

/// Outcome of walking one record through the nodes after its source.
enum WalkOutcome {
  /// The record reached the end of the node list.
  Completed(Record),
  /// A continue directive dropped the record in this flow.
  Skipped,
  /// A break directive terminated this flow.
  Broke,
  /// A directive targeted at an ancestor must travel upward.
  Propagate(Interrupter),
}

/// Where a directive emitted inside this flow is resolved to.
enum Routing {
  /// Targeted continue: resume the walk at this node index.
  Resume(usize),
  /// Untargeted continue: drop the current record.
  Skip,
  /// Break this flow.
  Break,
  /// Not addressed to this flow; hand it to the parent.
  Propagate(Interrupter),
}

/// Outcome of draining aggregators after the outer loop.
enum DrainOutcome {
  Done,
  Broke,
  Propagate(Interrupter),
}

/// Ordered, executable pipeline of nodes.
///
/// Composition methods consume and return the flow for chaining; node
/// instances are moved in, so one instance can never be added twice. Use
/// [`last_added`](Flow::last_added) to capture a node's id for directive
/// targets, join upstreams, or [`send_to`](Flow::send_to).
pub struct Flow {
  id: FlowId,
  name: String,
  nodes: Vec<Node>,
  from_chain: Vec<NodeId>,
  observers: Vec<Box<dyn FlowObserver>>,
  stats: FlowStats,
  running: bool,
}

impl Flow {
  /// Creates an empty flow.
  pub fn new(name: impl Into<String>) -> Self {
    let name = name.into();
    Self {
      id: FlowId::next(),
      name: name.clone(),
      nodes: Vec::new(),
      from_chain: Vec::new(),
      observers: Vec::new(),
      stats: FlowStats::new(name),
      running: false,
    }
  }

  /// The flow's process-unique id.
  pub fn id(&self) -> FlowId {
    self.id
  }

  /// The flow's display name.
  pub fn name(&self) -> &str {
    &self.name
  }

  /// Statistics of the most recent run.
  pub fn stats(&self) -> &FlowStats {
    &self.stats
  }

  /// Id of the most recently added node.
  pub fn last_added(&self) -> Option<NodeId> {
    self.nodes.last().map(|n| n.id)
  }

  fn push(&mut self, node: Node) -> NodeId {
    let id = node.id;
    self.stats.register_node(id, node.label());
    self.nodes.push(node);
    id
  }

  /// Registers an extractor at the end of the from-chain.
  ///
  /// The first registered extractor is the root source; each further one
  /// takes over when the previous drains.
  #[must_use]
  pub fn from<E: Extractor + 'static>(mut self, extractor: E) -> Self {
    let id = self.push(Node::extract(extractor));
    self.from_chain.push(id);
    self
  }

  /// Registers a continuation extractor used once `upstream` drains.
  ///
  /// # Errors
  ///
  /// `FlowError::Composition` when `upstream` is not a from-chain
  /// extractor of this flow.
  pub fn from_after<E: Extractor + 'static>(
    mut self,
    extractor: E,
    upstream: NodeId,
  ) -> Result<Self, FlowError> {
    let Some(pos) = self.from_chain.iter().position(|id| *id == upstream) else {
      return Err(FlowError::Composition(format!(
        "from_after upstream {} is not a from-chain extractor of flow '{}'",
        upstream, self.name
      )));
    };
    let id = self.push(Node::extract(extractor));
    self.from_chain.insert(pos + 1, id);
    Ok(self)
  }

  /// Appends a transformer.
  #[must_use]
  pub fn transform<T: Transformer + 'static>(mut self, transformer: T) -> Self {
    self.push(Node::transform(transformer));
    self
  }

  /// Appends a loader.
  #[must_use]
  pub fn to<L: Loader + 'static>(mut self, loader: L) -> Self {
    self.push(Node::load(loader));
    self
  }

  /// Appends a join against `extractor`, subordinate to the `upstream`
  /// extractor (see [`JoinClause`] for the per-record semantics).
  ///
  /// # Errors
  ///
  /// `FlowError::Composition` when `upstream` does not name an extractor
  /// already registered in this flow.
  pub fn join<E: JoinableExtractor + 'static>(
    mut self,
    extractor: E,
    upstream: NodeId,
    clause: JoinClause,
  ) -> Result<Self, FlowError> {
    let upstream_ok = self
      .nodes
      .iter()
      .any(|n| n.id == upstream && n.is_extractor());
    if !upstream_ok {
      return Err(FlowError::Composition(format!(
        "join upstream {} is not a registered extractor of flow '{}'",
        upstream, self.name
      )));
    }
    self.push(Node::join(extractor, clause));
    Ok(self)
  }

  /// Appends a qualifier.
  #[must_use]
  pub fn qualify<Q: Qualifier + 'static>(mut self, qualifier: Q) -> Self {
    self.push(Node::qualify(qualifier));
    self
  }

  /// Appends an aggregator.
  #[must_use]
  pub fn aggregate<A: Aggregator + 'static>(mut self, aggregator: A) -> Self {
    self.push(Node::aggregate(aggregator));
    self
  }

  /// Embeds a sub-flow as a node, executed once per upstream record. The
  /// sub-flow's final flush is deferred to the root flow's flush.
  #[must_use]
  pub fn branch(mut self, sub_flow: Flow) -> Self {
    self.push(Node::branch(sub_flow, false));
    self
  }

  /// Embeds a sub-flow that flushes its own loaders at the end of each
  /// branch execution instead of deferring to the root flush.
  #[must_use]
  pub fn branch_force_flush(mut self, sub_flow: Flow) -> Self {
    self.push(Node::branch(sub_flow, true));
    self
  }

  /// Names the most recently added node (used in logs and stats).
  #[must_use]
  pub fn named(mut self, name: impl Into<String>) -> Self {
    if let Some(node) = self.nodes.last_mut() {
      let name = name.into();
      node.name = Some(name.clone());
      self.stats.relabel(node.id, name);
    }
    self
  }

  /// Overrides the returning-value flag of the most recently added node.
  ///
  /// Marking a loader returning lets its `Step::Value` replace the current
  /// record (generated primary keys flowing downstream).
  #[must_use]
  pub fn returning(mut self, returns_value: bool) -> Self {
    if let Some(node) = self.nodes.last_mut() {
      node.returns_value = returns_value;
    }
    self
  }

  /// Registers a lifecycle observer.
  #[must_use]
  pub fn observe<O: FlowObserver + 'static>(mut self, observer: O) -> Self {
    self.observers.push(Box::new(observer));
    self
  }

  /// Executes the flow.
  ///
  /// With extractors, drains the from-chain and returns the terminal
  /// [`FlowStatus`] in the result; without, walks all nodes once with
  /// `param` and returns the final value.
  ///
  /// # Errors
  ///
  /// Any node error (the flow finishes `exception`, loaders are flushed
  /// best-effort with that status first), a directive whose target exists
  /// on no ancestor, or reentrant invocation.
  pub async fn exec(&mut self, param: Option<Record>) -> Result<FlowResult, FlowError> {
    match self.exec_impl(param, false).await? {
      ExecOutcome::Finished(result) => Ok(result),
      // exec_impl resolves root-level propagation into an error
      ExecOutcome::Propagate(intr) => Err(FlowError::UnknownTarget {
        node: intr.target_node(),
        flow: intr.target_flow(),
      }),
    }
  }

  /// Injects a record at the node with the given id, walking the flow from
  /// that node onward. No flush happens; counters do accumulate.
  ///
  /// # Errors
  ///
  /// `FlowError::Composition` for an unknown id, `FlowError::UnknownTarget`
  /// if the walk emits a directive addressed outside this flow, or any
  /// node error.
  pub async fn send_to(
    &mut self,
    target: NodeId,
    record: Record,
  ) -> Result<Option<Record>, FlowError> {
    if self.running {
      return Err(FlowError::Reentrant {
        flow: self.name.clone(),
      });
    }
    let Some(idx) = self.position(target) else {
      return Err(FlowError::Composition(format!(
        "send_to target {} is not a node of flow '{}'",
        target, self.name
      )));
    };
    self.running = true;
    let outcome = self.walk_record(idx, record).await;
    self.running = false;
    match outcome? {
      WalkOutcome::Completed(value) => Ok(Some(value)),
      WalkOutcome::Skipped | WalkOutcome::Broke => Ok(None),
      WalkOutcome::Propagate(intr) => Err(FlowError::UnknownTarget {
        node: intr.target_node(),
        flow: intr.target_flow(),
      }),
    }
  }

  /// Boxed recursion point: branches execute their sub-flow through this.
  fn exec_embedded<'a>(
    &'a mut self,
    param: Option<Record>,
  ) -> Pin<Box<dyn Future<Output = Result<ExecOutcome, FlowError>> + Send + 'a>> {
    Box::pin(self.exec_impl(param, true))
  }

  async fn exec_impl(
    &mut self,
    param: Option<Record>,
    embedded: bool,
  ) -> Result<ExecOutcome, FlowError> {
    if self.running {
      return Err(FlowError::Reentrant {
        flow: self.name.clone(),
      });
    }
    self.running = true;
    self.stats.begin();
    self.notify_start();
    debug!(flow = %self.name, id = %self.id, embedded, "flow started");

    let outcome = self.run(param).await;
    self.running = false;

    match outcome {
      Ok(ExecOutcome::Finished(result)) => {
        if !embedded {
          if let Err(flush_err) = self.final_flush(result.status).await {
            self.stats.finish(FlowStatus::Exception);
            self.notify_fail(&flush_err);
            return Err(flush_err);
          }
        }
        self.stats.finish(result.status);
        self.notify_success();
        debug!(flow = %self.name, status = %result.status, "flow finished");
        Ok(ExecOutcome::Finished(result))
      }
      Ok(ExecOutcome::Propagate(intr)) => {
        if embedded {
          // parent consumes or re-raises; this flow's loop is abandoned
          let status = match intr.kind() {
            InterruptKind::Break => FlowStatus::Dirty,
            InterruptKind::Continue => FlowStatus::Clean,
          };
          self.stats.finish(status);
          Ok(ExecOutcome::Propagate(intr))
        } else {
          let err = FlowError::UnknownTarget {
            node: intr.target_node(),
            flow: intr.target_flow(),
          };
          self.flush_after_failure().await;
          self.stats.finish(FlowStatus::Exception);
          self.notify_fail(&err);
          Err(err)
        }
      }
      Err(err) => {
        if !embedded {
          self.flush_after_failure().await;
        }
        self.stats.finish(FlowStatus::Exception);
        self.notify_fail(&err);
        Err(err)
      }
    }
  }

  async fn run(&mut self, param: Option<Record>) -> Result<ExecOutcome, FlowError> {
    if self.from_chain.is_empty() {
      // linear shape: one pass with the seed parameter
      let seed = param.unwrap_or(Record::Null);
      return Ok(match self.walk_record(0, seed).await? {
        WalkOutcome::Completed(value) => ExecOutcome::Finished(FlowResult {
          status: FlowStatus::Clean,
          value: Some(value),
        }),
        WalkOutcome::Skipped => ExecOutcome::Finished(FlowResult {
          status: FlowStatus::Clean,
          value: None,
        }),
        WalkOutcome::Broke => ExecOutcome::Finished(FlowResult {
          status: FlowStatus::Dirty,
          value: None,
        }),
        WalkOutcome::Propagate(intr) => ExecOutcome::Propagate(intr),
      });
    }

    let mut status = FlowStatus::Clean;
    let chain = self.from_chain.clone();
    'chain: for ext_id in chain {
      let Some(ext_idx) = self.position(ext_id) else {
        return Err(FlowError::Composition(format!(
          "from-chain entry {} is not a node of flow '{}'",
          ext_id, self.name
        )));
      };
      while let Some(batch) = self.next_batch(ext_idx, param.as_ref()).await? {
        debug!(flow = %self.name, extractor = %ext_id, records = batch.len(), "batch extracted");
        for rec in batch {
          self.stats.records_extracted += 1;
          match self.walk_record(ext_idx + 1, rec).await? {
            WalkOutcome::Completed(_) | WalkOutcome::Skipped => {}
            WalkOutcome::Broke => {
              status = FlowStatus::Dirty;
              break 'chain;
            }
            WalkOutcome::Propagate(intr) => return Ok(ExecOutcome::Propagate(intr)),
          }
          self.notify_progress();
        }
      }
    }

    if status.is_clean() {
      match self.drain_aggregators().await? {
        DrainOutcome::Done => {}
        DrainOutcome::Broke => status = FlowStatus::Dirty,
        DrainOutcome::Propagate(intr) => return Ok(ExecOutcome::Propagate(intr)),
      }
    }

    Ok(ExecOutcome::Finished(FlowResult { status, value: None }))
  }

  /// Pulls one batch from the extractor node at `ext_idx`.
  ///
  /// Returns `None` when the extractor is drained.
  async fn next_batch(
    &mut self,
    ext_idx: usize,
    param: Option<&Record>,
  ) -> Result<Option<Vec<Record>>, FlowError> {
    let (node_id, label, type_name) = {
      let node = &self.nodes[ext_idx];
      (node.id, node.label(), node.type_name)
    };
    let node = &mut self.nodes[ext_idx];
    let NodeKind::Extract(extractor) = &mut node.kind else {
      return Err(FlowError::Composition(format!(
        "from-chain entry {} is not an extractor",
        node_id
      )));
    };
    let produced = extractor
      .extract(param)
      .await
      .map_err(|source| FlowError::node(node_id, label, type_name, source))?;
    if !produced {
      return Ok(None);
    }
    let batch: Vec<Record> = extractor.traversable().collect().await;
    Ok(Some(batch))
  }

  /// Walks one record through the nodes starting at index `start`.
  async fn walk_record(&mut self, start: usize, mut record: Record) -> Result<WalkOutcome, FlowError> {
    let mut idx = start;
    while idx < self.nodes.len() {
      let (node_id, label, type_name, returns_value, is_source) = {
        let node = &self.nodes[idx];
        (
          node.id,
          node.label(),
          node.type_name,
          node.returns_value,
          node.is_extractor(),
        )
      };

      let step = {
        let node = &mut self.nodes[idx];
        match &mut node.kind {
          // from-chain sources act only in the outer loop
          NodeKind::Extract(_) => Step::Pass,
          NodeKind::Join {
            extractor,
            clause,
            index,
          } => {
            let Some(key) = record::field(&record, clause.from_key()).cloned() else {
              return Err(FlowError::MissingJoinKey {
                node: node_id,
                field: clause.from_key().to_string(),
              });
            };
            let key_text = record::key_repr(&key);
            if index.lookup(&key_text).is_none() {
              let fetched = extractor
                .extract_keyed(&key)
                .await
                .map_err(|source| FlowError::node(node_id, label.clone(), type_name, source))?;
              if fetched {
                let batch = extractor.traversable();
                index.rebuild(node_id, clause.join_key(), batch).await?;
              }
            }
            match index.lookup(&key_text) {
              Some(joined) => Step::Value(clause.merge_records(&record, joined)),
              None => match clause.default_record() {
                Some(default) => Step::Value(clause.merge_records(&record, default)),
                None => Step::Interrupt(Interrupter::skip_record()),
              },
            }
          }
          NodeKind::Transform(transformer) => transformer
            .exec(record.clone())
            .await
            .map_err(|source| FlowError::node(node_id, label.clone(), type_name, source))?,
          NodeKind::Load(loader) => loader
            .exec(record.clone())
            .await
            .map_err(|source| FlowError::node(node_id, label.clone(), type_name, source))?,
          NodeKind::Qualify(qualifier) => {
            match qualifier
              .qualify(&record)
              .await
              .map_err(|source| FlowError::node(node_id, label.clone(), type_name, source))?
            {
              Verdict::Accept => Step::Pass,
              Verdict::Reject => Step::Interrupt(Interrupter::skip_record()),
              Verdict::Interrupt(intr) => Step::Interrupt(intr),
            }
          }
          NodeKind::Aggregate(aggregator) => {
            match aggregator
              .aggregate(record.clone())
              .await
              .map_err(|source| FlowError::node(node_id, label.clone(), type_name, source))?
            {
              Some(aggregate) => Step::Value(aggregate),
              None => Step::Interrupt(Interrupter::skip_record()),
            }
          }
          NodeKind::Branch { flow, force_flush } => {
            match flow.exec_embedded(Some(record.clone())).await? {
              ExecOutcome::Finished(result) => {
                if *force_flush {
                  flow.final_flush_boxed(result.status).await?;
                }
                match result.value {
                  Some(value) => Step::Value(value),
                  None => Step::Pass,
                }
              }
              ExecOutcome::Propagate(intr) => {
                // an escaping directive still ends this branch execution,
                // so a forced branch flushes here too
                if *force_flush {
                  let status = match intr.kind() {
                    InterruptKind::Break => FlowStatus::Dirty,
                    InterruptKind::Continue => FlowStatus::Clean,
                  };
                  flow.final_flush_boxed(status).await?;
                }
                Step::Interrupt(intr)
              }
            }
          }
        }
      };

      if !is_source {
        self.stats.record_visit(node_id);
      }

      match step {
        Step::Value(value) => {
          if returns_value {
            record = value;
          }
          idx += 1;
        }
        Step::Pass => {
          idx += 1;
        }
        Step::Interrupt(intr) => {
          trace!(flow = %self.name, node = %node_id, kind = ?intr.kind(), "directive emitted");
          match self.route(node_id, intr)? {
            Routing::Resume(at) => idx = at,
            Routing::Skip => return Ok(WalkOutcome::Skipped),
            Routing::Break => return Ok(WalkOutcome::Broke),
            Routing::Propagate(intr) => return Ok(WalkOutcome::Propagate(intr)),
          }
        }
      }
    }
    Ok(WalkOutcome::Completed(record))
  }

  /// Resolves a directive emitted by (or re-raised through) `emitter`.
  fn route(&mut self, emitter: NodeId, intr: Interrupter) -> Result<Routing, FlowError> {
    match intr.kind() {
      InterruptKind::Continue => self.stats.record_continue(emitter),
      InterruptKind::Break => self.stats.record_break(emitter),
    }

    let targets_here = match (intr.target_flow(), intr.target_node()) {
      (Some(flow_id), _) => flow_id == self.id,
      (None, Some(node_id)) => self.position(node_id).is_some(),
      (None, None) => true,
    };
    if !targets_here {
      return Ok(Routing::Propagate(intr));
    }

    match intr.kind() {
      InterruptKind::Break => Ok(Routing::Break),
      InterruptKind::Continue => match intr.target_node() {
        None => Ok(Routing::Skip),
        Some(node_id) => match self.position(node_id) {
          Some(at) => Ok(Routing::Resume(at)),
          None => Err(FlowError::UnknownTarget {
            node: Some(node_id),
            flow: intr.target_flow(),
          }),
        },
      },
    }
  }

  /// Offers leftover aggregates a final walk after the outer loop ends.
  async fn drain_aggregators(&mut self) -> Result<DrainOutcome, FlowError> {
    let aggregate_indexes: Vec<usize> = self
      .nodes
      .iter()
      .enumerate()
      .filter(|(_, n)| matches!(n.kind, NodeKind::Aggregate(_)))
      .map(|(i, _)| i)
      .collect();

    for idx in aggregate_indexes {
      let (node_id, label, type_name) = {
        let node = &self.nodes[idx];
        (node.id, node.label(), node.type_name)
      };
      let leftover = {
        let node = &mut self.nodes[idx];
        let NodeKind::Aggregate(aggregator) = &mut node.kind else {
          continue;
        };
        aggregator
          .finalize()
          .await
          .map_err(|source| FlowError::node(node_id, label, type_name, source))?
      };
      if let Some(aggregate) = leftover {
        match self.walk_record(idx + 1, aggregate).await? {
          WalkOutcome::Completed(_) | WalkOutcome::Skipped => {}
          WalkOutcome::Broke => return Ok(DrainOutcome::Broke),
          WalkOutcome::Propagate(intr) => return Ok(DrainOutcome::Propagate(intr)),
        }
      }
    }
    Ok(DrainOutcome::Done)
  }

  /// Boxed recursion point for branch flush.
  fn final_flush_boxed<'a>(
    &'a mut self,
    status: FlowStatus,
  ) -> Pin<Box<dyn Future<Output = Result<(), FlowError>> + Send + 'a>> {
    Box::pin(self.final_flush(status))
  }

  /// Flushes every loader once, in composition order, recursing into
  /// deferred branches. After a flush failure the remaining loaders are
  /// still flushed, with `Exception`; the first failure is returned.
  async fn final_flush(&mut self, status: FlowStatus) -> Result<(), FlowError> {
    let mut first_err: Option<FlowError> = None;
    for idx in 0..self.nodes.len() {
      let (node_id, label, type_name) = {
        let node = &self.nodes[idx];
        (node.id, node.label(), node.type_name)
      };
      let effective = if first_err.is_some() {
        FlowStatus::Exception
      } else {
        status
      };
      let result: Result<(), FlowError> = {
        let node = &mut self.nodes[idx];
        match &mut node.kind {
          NodeKind::Load(loader) => {
            trace!(flow = %self.name, node = %node_id, status = %effective, "flushing loader");
            loader
              .flush(Some(effective))
              .await
              .map_err(|source| FlowError::node(node_id, label, type_name, source))
          }
          NodeKind::Branch { flow, force_flush } if !*force_flush => {
            flow.final_flush_boxed(effective).await
          }
          _ => Ok(()),
        }
      };
      if let Err(err) = result {
        if first_err.is_none() {
          first_err = Some(err);
        } else {
          warn!(flow = %self.name, node = %node_id, error = %err, "secondary flush failure");
        }
      }
    }
    match first_err {
      None => Ok(()),
      Some(err) => Err(err),
    }
  }

  /// Best-effort exception flush on the error path; failures are logged.
  async fn flush_after_failure(&mut self) {
    if let Err(err) = self.final_flush(FlowStatus::Exception).await {
      warn!(flow = %self.name, error = %err, "flush after failure also failed");
    }
  }

  fn position(&self, id: NodeId) -> Option<usize> {
    self.nodes.iter().position(|n| n.id == id)
  }

  fn notify_start(&mut self) {
    let name = &self.name;
    for observer in self.observers.iter_mut() {
      observer.on_start(name);
    }
  }

  fn notify_progress(&mut self) {
    let name = &self.name;
    let extracted = self.stats.records_extracted;
    for observer in self.observers.iter_mut() {
      observer.on_progress(name, extracted);
    }
  }

  fn notify_success(&mut self) {
    let name = &self.name;
    let stats = &self.stats;
    for observer in self.observers.iter_mut() {
      observer.on_success(name, stats);
    }
  }

  fn notify_fail(&mut self, error: &FlowError) {
    let name = &self.name;
    for observer in self.observers.iter_mut() {
      observer.on_fail(name, error);
    }
  }
}

impl fmt::Debug for Flow {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("Flow")
      .field("id", &self.id)
      .field("name", &self.name)
      .field("nodes", &self.nodes.len())
      .field("extractors", &self.from_chain.len())
      .finish()
  }
}
