use crate::error::{FlowError, NodeError};
use crate::extractors::VecExtractor;
use crate::flow::Flow;
use crate::interrupt::{Interrupter, Step};
use crate::loader::Loader;
use crate::loaders::{BufferedVecLoader, VecLoader};
use crate::qualifiers::FnQualifier;
use crate::record::{self, Record};
use crate::stats::{FlowObserver, FlowStats};
use crate::status::FlowStatus;
use crate::transformers::MapTransformer;
use async_trait::async_trait;
use proptest::prelude::*;
use serde_json::json;
use std::sync::{Arc, Mutex};

fn lvl(record: &Record) -> i64 {
  record::field(record, "lvl").and_then(|v| v.as_i64()).unwrap_or(0)
}

/// Loader that fails on the nth record it sees (1-based).
struct FailingLoader {
  fail_on: usize,
  seen: usize,
  flush_calls: Arc<Mutex<Vec<Option<FlowStatus>>>>,
}

impl FailingLoader {
  fn new(fail_on: usize) -> Self {
    Self {
      fail_on,
      seen: 0,
      flush_calls: Arc::new(Mutex::new(Vec::new())),
    }
  }

  fn flush_handle(&self) -> Arc<Mutex<Vec<Option<FlowStatus>>>> {
    Arc::clone(&self.flush_calls)
  }
}

#[async_trait]
impl Loader for FailingLoader {
  async fn exec(&mut self, _record: Record) -> Result<Step, NodeError> {
    self.seen += 1;
    if self.seen == self.fail_on {
      return Err(format!("record {} rejected by sink", self.seen).into());
    }
    Ok(Step::Pass)
  }

  async fn flush(&mut self, status: Option<FlowStatus>) -> Result<(), NodeError> {
    self.flush_calls.lock().expect("lock").push(status);
    Ok(())
  }
}

/// Loader that emits a fixed directive on every record, tracking flushes.
struct BreakingLoader {
  directive: Interrupter,
  flush_calls: Arc<Mutex<Vec<Option<FlowStatus>>>>,
}

impl BreakingLoader {
  fn new(directive: Interrupter) -> Self {
    Self {
      directive,
      flush_calls: Arc::new(Mutex::new(Vec::new())),
    }
  }

  fn flush_handle(&self) -> Arc<Mutex<Vec<Option<FlowStatus>>>> {
    Arc::clone(&self.flush_calls)
  }
}

#[async_trait]
impl Loader for BreakingLoader {
  async fn exec(&mut self, _record: Record) -> Result<Step, NodeError> {
    Ok(Step::Interrupt(self.directive))
  }

  async fn flush(&mut self, status: Option<FlowStatus>) -> Result<(), NodeError> {
    self.flush_calls.lock().expect("lock").push(status);
    Ok(())
  }
}

struct EventObserver {
  events: Arc<Mutex<Vec<String>>>,
}

impl FlowObserver for EventObserver {
  fn on_start(&mut self, flow: &str) {
    self.events.lock().expect("lock").push(format!("start:{}", flow));
  }

  fn on_progress(&mut self, _flow: &str, records_extracted: u64) {
    self
      .events
      .lock()
      .expect("lock")
      .push(format!("progress:{}", records_extracted));
  }

  fn on_success(&mut self, flow: &str, stats: &FlowStats) {
    self
      .events
      .lock()
      .expect("lock")
      .push(format!("success:{}:{}", flow, stats.records_extracted));
  }

  fn on_fail(&mut self, flow: &str, _error: &FlowError) {
    self.events.lock().expect("lock").push(format!("fail:{}", flow));
  }
}

#[tokio::test]
async fn test_identity_flow() {
  let sink = BufferedVecLoader::new();
  let collected = sink.handle();

  let mut flow = Flow::new("identity")
    .from(VecExtractor::new(vec![json!(1), json!(2), json!(3)]))
    .transform(MapTransformer::new(|r| json!(r.as_i64().unwrap_or(0) * 2)))
    .to(sink);

  let result = flow.exec(None).await.expect("exec");
  assert!(result.status.is_clean());
  assert_eq!(collected.records(), vec![json!(2), json!(4), json!(6)]);
  assert_eq!(collected.flush_calls(), vec![Some(FlowStatus::Clean)]);
}

#[tokio::test]
async fn test_linear_flow_returns_final_value() {
  let mut flow = Flow::new("linear")
    .transform(MapTransformer::new(|r| json!(r.as_i64().unwrap_or(0) + 1)))
    .transform(MapTransformer::new(|r| json!(r.as_i64().unwrap_or(0) * 10)));

  let result = flow.exec(Some(json!(4))).await.expect("exec");
  assert!(result.status.is_clean());
  assert_eq!(result.value, Some(json!(50)));
}

#[tokio::test]
async fn test_linear_flow_flushes_loaders_once() {
  let sink = BufferedVecLoader::new();
  let collected = sink.handle();

  let mut flow = Flow::new("linear-load").to(sink);
  flow.exec(Some(json!({ "id": 1 }))).await.expect("exec");

  assert_eq!(collected.records(), vec![json!({ "id": 1 })]);
  assert_eq!(collected.flush_calls(), vec![Some(FlowStatus::Clean)]);
}

#[tokio::test]
async fn test_from_chain_continuation() {
  let sink = VecLoader::new();
  let collected = sink.handle();

  let mut flow = Flow::new("multi-source")
    .from(VecExtractor::new(vec![json!(1), json!(2)]).with_batch_size(1))
    .from(VecExtractor::new(vec![json!(3)]))
    .to(sink);

  let result = flow.exec(None).await.expect("exec");
  assert!(result.status.is_clean());
  assert_eq!(collected.records(), vec![json!(1), json!(2), json!(3)]);
}

#[tokio::test]
async fn test_from_after_orders_continuations() {
  let sink = VecLoader::new();
  let collected = sink.handle();

  let flow = Flow::new("ordered").from(VecExtractor::new(vec![json!(1)]));
  let root = flow.last_added().expect("root extractor");
  let flow = flow.from(VecExtractor::new(vec![json!(3)]));
  let mut flow = flow
    .from_after(VecExtractor::new(vec![json!(2)]), root)
    .expect("from_after");
  flow = flow.to(sink);

  flow.exec(None).await.expect("exec");
  assert_eq!(collected.records(), vec![json!(1), json!(2), json!(3)]);
}

#[tokio::test]
async fn test_from_after_unknown_upstream_is_composition_error() {
  let foreign = Flow::new("other").transform(MapTransformer::new(|r| r));
  let bogus = foreign.last_added().expect("node");

  let err = Flow::new("broken")
    .from(VecExtractor::new(vec![]))
    .from_after(VecExtractor::new(vec![]), bogus)
    .expect_err("unknown upstream must fail");
  assert!(matches!(err, FlowError::Composition(_)));
}

#[tokio::test]
async fn test_qualified_branch() {
  let branch_sink = BufferedVecLoader::new();
  let branch_records = branch_sink.handle();
  let main_sink = VecLoader::new();
  let main_records = main_sink.handle();

  let sub = Flow::new("high-levels")
    .qualify(FnQualifier::new(|r| lvl(r) > 9))
    .to(branch_sink);

  let mut flow = Flow::new("main")
    .from(VecExtractor::new(vec![
      json!({ "lvl": 3 }),
      json!({ "lvl": 10 }),
      json!({ "lvl": 7 }),
      json!({ "lvl": 12 }),
    ]))
    .branch(sub)
    .to(main_sink);

  let result = flow.exec(None).await.expect("exec");
  assert!(result.status.is_clean());
  assert_eq!(main_records.len(), 4);
  assert_eq!(
    branch_records.records(),
    vec![json!({ "lvl": 10 }), json!({ "lvl": 12 })]
  );
  // deferred: exactly one flush, at the root flush, with the root status
  assert_eq!(branch_records.flush_calls(), vec![Some(FlowStatus::Clean)]);
}

#[tokio::test]
async fn test_forced_flush_branch_flushes_per_execution() {
  let branch_sink = BufferedVecLoader::new();
  let branch_records = branch_sink.handle();

  let sub = Flow::new("eager").to(branch_sink);
  let mut flow = Flow::new("main")
    .from(VecExtractor::new(vec![json!(1), json!(2)]))
    .branch_force_flush(sub);

  flow.exec(None).await.expect("exec");
  // one flush per branch execution, skipped by the root flush
  assert_eq!(
    branch_records.flush_calls(),
    vec![Some(FlowStatus::Clean), Some(FlowStatus::Clean)]
  );
  assert_eq!(branch_records.records(), vec![json!(1), json!(2)]);
}

#[tokio::test]
async fn test_forced_flush_branch_flushes_when_directive_escapes() {
  let parent_shell = Flow::new("main");
  let parent_id = parent_shell.id();

  let breaker = BreakingLoader::new(Interrupter::break_flow().with_target_flow(parent_id));
  let flushes = breaker.flush_handle();
  let sub = Flow::new("eager").to(breaker);

  let mut flow = parent_shell
    .from(VecExtractor::new(vec![json!(1), json!(2)]))
    .branch_force_flush(sub);

  let result = flow.exec(None).await.expect("exec");
  assert!(result.status.is_dirty());
  // the escaping break still ended the branch execution: one flush, dirty
  assert_eq!(
    flushes.lock().expect("lock").clone(),
    vec![Some(FlowStatus::Dirty)]
  );
}

#[tokio::test]
async fn test_break_with_target_in_ancestor() {
  let flow = Flow::new("a")
    .from(VecExtractor::new(vec![json!(1), json!(2), json!(3)]))
    .transform(MapTransformer::new(|r| r))
    .named("t1");
  let t1 = flow.last_added().expect("t1");

  let breaker = BreakingLoader::new(Interrupter::break_flow().with_target_node(t1));
  let flushes = breaker.flush_handle();
  let sub = Flow::new("b").to(breaker);

  let mut flow = flow.branch(sub);
  let result = flow.exec(None).await.expect("exec");

  assert!(result.status.is_dirty());
  // the outer loop stopped on the record that triggered the break
  assert_eq!(flow.stats().records_extracted, 1);
  assert_eq!(
    flushes.lock().expect("lock").clone(),
    vec![Some(FlowStatus::Dirty)]
  );
}

#[tokio::test]
async fn test_flush_on_exception() {
  let buffered = BufferedVecLoader::new();
  let buffered_handle = buffered.handle();
  let failing = FailingLoader::new(3);
  let failing_flushes = failing.flush_handle();

  let mut flow = Flow::new("fragile")
    .from(VecExtractor::new(vec![
      json!(1),
      json!(2),
      json!(3),
      json!(4),
    ]))
    .to(buffered)
    .to(failing);

  let err = flow.exec(None).await.expect_err("third record must fail");
  assert!(matches!(err, FlowError::Node { .. }));
  assert_eq!(flow.stats().status, Some(FlowStatus::Exception));
  // both loaders flushed once with the exception status; buffer discarded
  assert_eq!(
    buffered_handle.flush_calls(),
    vec![Some(FlowStatus::Exception)]
  );
  assert!(buffered_handle.records().is_empty());
  assert_eq!(
    failing_flushes.lock().expect("lock").clone(),
    vec![Some(FlowStatus::Exception)]
  );
}

#[tokio::test]
async fn test_aggregator_batches_and_finalizes() {
  let sink = VecLoader::new();
  let collected = sink.handle();

  let mut flow = Flow::new("batching")
    .from(VecExtractor::new(vec![
      json!(1),
      json!(2),
      json!(3),
      json!(4),
      json!(5),
    ]))
    .aggregate(crate::aggregators::BatchAggregator::new(2))
    .to(sink);

  let result = flow.exec(None).await.expect("exec");
  assert!(result.status.is_clean());
  assert_eq!(
    collected.records(),
    vec![json!([1, 2]), json!([3, 4]), json!([5])]
  );
}

/// Loader that assigns a primary key and returns the updated record.
struct KeyAssignLoader {
  next_key: i64,
}

#[async_trait]
impl Loader for KeyAssignLoader {
  async fn exec(&mut self, record: Record) -> Result<Step, NodeError> {
    let mut object = record
      .as_object()
      .cloned()
      .ok_or("KeyAssignLoader requires object records")?;
    object.insert("pk".to_string(), json!(self.next_key));
    self.next_key += 1;
    Ok(Step::Value(serde_json::Value::Object(object)))
  }

  async fn flush(&mut self, _status: Option<FlowStatus>) -> Result<(), NodeError> {
    Ok(())
  }
}

#[tokio::test]
async fn test_returning_loader_propagates_generated_keys() {
  let sink = VecLoader::new();
  let collected = sink.handle();

  let mut flow = Flow::new("keyed-writes")
    .from(VecExtractor::new(vec![
      json!({ "name": "alice" }),
      json!({ "name": "bob" }),
    ]))
    .to(KeyAssignLoader { next_key: 1 })
    .returning(true)
    .to(sink);

  flow.exec(None).await.expect("exec");
  assert_eq!(
    collected.records(),
    vec![
      json!({ "name": "alice", "pk": 1 }),
      json!({ "name": "bob", "pk": 2 }),
    ]
  );
}

#[tokio::test]
async fn test_returning_branch_replaces_record() {
  let sink = VecLoader::new();
  let collected = sink.handle();

  let sub =
    Flow::new("doubler").transform(MapTransformer::new(|r| json!(r.as_i64().unwrap_or(0) * 2)));

  let mut flow = Flow::new("main")
    .from(VecExtractor::new(vec![json!(1), json!(2)]))
    .branch(sub)
    .returning(true)
    .to(sink);

  flow.exec(None).await.expect("exec");
  assert_eq!(collected.records(), vec![json!(2), json!(4)]);
}

#[tokio::test]
async fn test_send_to_injects_at_node() {
  let sink = VecLoader::new();
  let collected = sink.handle();

  let flow = Flow::new("inject")
    .from(VecExtractor::new(vec![]))
    .transform(MapTransformer::new(|r| json!(r.as_i64().unwrap_or(0) * 2)));
  let doubler = flow.last_added().expect("doubler");
  let mut flow = flow.to(sink);

  let out = flow.send_to(doubler, json!(21)).await.expect("send_to");
  assert_eq!(out, Some(json!(42)));
  assert_eq!(collected.records(), vec![json!(42)]);

  let err = {
    let foreign = Flow::new("other").transform(MapTransformer::new(|r| r));
    let bogus = foreign.last_added().expect("node");
    flow.send_to(bogus, json!(1)).await.expect_err("unknown id")
  };
  assert!(matches!(err, FlowError::Composition(_)));
}

#[tokio::test]
async fn test_observer_callbacks() {
  let events = Arc::new(Mutex::new(Vec::new()));
  let sink = VecLoader::new();

  let mut flow = Flow::new("observed")
    .from(VecExtractor::new(vec![json!(1), json!(2)]))
    .to(sink)
    .observe(EventObserver {
      events: Arc::clone(&events),
    });

  flow.exec(None).await.expect("exec");
  let events = events.lock().expect("lock").clone();
  assert_eq!(
    events,
    vec![
      "start:observed".to_string(),
      "progress:1".to_string(),
      "progress:2".to_string(),
      "success:observed:2".to_string(),
    ]
  );
}

#[tokio::test]
async fn test_stats_report() {
  let sink = VecLoader::new();
  let mut flow = Flow::new("reported")
    .from(VecExtractor::new(vec![json!(1), json!(2), json!(3)]))
    .transform(MapTransformer::new(|r| r))
    .named("noop")
    .to(sink)
    .named("sink");

  flow.exec(None).await.expect("exec");
  let stats = flow.stats();
  assert_eq!(stats.records_extracted, 3);
  assert_eq!(stats.status, Some(FlowStatus::Clean));
  let sink_stats = stats
    .nodes()
    .iter()
    .find(|n| n.label == "sink")
    .expect("sink node");
  assert_eq!(sink_stats.records, 3);

  let report = stats.report();
  assert!(report.contains("flow 'reported'"));
  assert!(report.contains("status=clean"));
  assert!(report.contains("noop"));
}

#[tokio::test]
async fn test_rerun_resets_stats() {
  let sink = VecLoader::new();
  let collected = sink.handle();
  let mut flow = Flow::new("rerun")
    .from(VecExtractor::new(vec![json!(1), json!(2)]))
    .to(sink);

  flow.exec(None).await.expect("first run");
  assert_eq!(flow.stats().records_extracted, 2);

  // source is drained; the second run extracts nothing but still succeeds
  let result = flow.exec(None).await.expect("second run");
  assert!(result.status.is_clean());
  assert_eq!(flow.stats().records_extracted, 0);
  assert_eq!(collected.len(), 2);
}

proptest! {
  // ordering is preserved end-to-end through batched extraction
  #[test]
  fn prop_ordering_preserved(values in prop::collection::vec(-1000i64..1000, 0..60)) {
    let runtime = tokio::runtime::Builder::new_current_thread().build().expect("runtime");
    runtime.block_on(async {
      let sink = VecLoader::new();
      let collected = sink.handle();
      let records: Vec<Record> = values.iter().map(|v| json!(v)).collect();

      let mut flow = Flow::new("prop-order")
        .from(VecExtractor::new(records).with_batch_size(7))
        .transform(MapTransformer::new(|r| json!(r.as_i64().unwrap_or(0) * 2)))
        .to(sink);

      let result = flow.exec(None).await.expect("exec");
      prop_assert!(result.status.is_clean());
      let expected: Vec<Record> = values.iter().map(|v| json!(v * 2)).collect();
      prop_assert_eq!(collected.records(), expected);
      Ok(())
    })?;
  }

  // loader count equals extracted count minus upstream continue-skips
  #[test]
  fn prop_count_conservation(
    values in prop::collection::vec(0i64..100, 0..60),
    threshold in 0i64..100,
  ) {
    let runtime = tokio::runtime::Builder::new_current_thread().build().expect("runtime");
    runtime.block_on(async {
      let sink = VecLoader::new();
      let collected = sink.handle();
      let records: Vec<Record> = values.iter().map(|v| json!(v)).collect();

      let mut flow = Flow::new("prop-count")
        .from(VecExtractor::new(records).with_batch_size(5))
        .qualify(FnQualifier::new(move |r| r.as_i64().unwrap_or(0) >= threshold))
        .to(sink);

      flow.exec(None).await.expect("exec");
      let kept = values.iter().filter(|v| **v >= threshold).count();
      prop_assert_eq!(flow.stats().records_extracted, values.len() as u64);
      prop_assert_eq!(collected.len(), kept);
      Ok(())
    })?;
  }
}
