//! # Join Support
//!
//! A join enriches records from a secondary, keyed extractor. This module
//! holds the [`JoinClause`] describing one join (key field names, merge
//! function, optional left-join default) and the per-join [`JoinIndex`]
//! mapping join-key values to the records of the joinable extractor's
//! current batch.
//!
//! ## Semantics
//!
//! For each upstream record reaching the join node, the driver reads the
//! key from the clause's `from_key` field and looks it up in the index. On
//! a miss it asks the joinable extractor for its next batch and rebuilds
//! the index before looking again:
//!
//! - **hit** — the merge function combines upstream and joined record; the
//!   result becomes the current record
//! - **miss, no default** — inner join: the record is dropped with a
//!   carrier-confined continue
//! - **miss, default present** — left join: the merge function combines the
//!   upstream record with the default

use crate::error::FlowError;
use crate::extractor::RecordStream;
use crate::node::NodeId;
use crate::record::{self, Record};
use futures::StreamExt;
use std::collections::HashMap;
use std::fmt;

/// Function merging an upstream record with a joined (or default) record.
pub type MergeFn = Box<dyn Fn(&Record, &Record) -> Record + Send + Sync>;

/// Describes one join: where to read keys on both sides, how to merge, and
/// whether misses fall back to a default record (left join) or drop the
/// record (inner join).
pub struct JoinClause {
  from_key: String,
  join_key: String,
  merge: MergeFn,
  default: Option<Record>,
}

impl JoinClause {
  /// Creates an inner-join clause.
  ///
  /// # Arguments
  ///
  /// * `from_key` - field holding the key in the upstream record
  /// * `join_key` - field holding the key in the joined record
  /// * `merge` - combines `(upstream, joined)` into the new current record
  pub fn new<F>(from_key: impl Into<String>, join_key: impl Into<String>, merge: F) -> Self
  where
    F: Fn(&Record, &Record) -> Record + Send + Sync + 'static,
  {
    Self {
      from_key: from_key.into(),
      join_key: join_key.into(),
      merge: Box::new(merge),
      default: None,
    }
  }

  /// Turns the join into a left join: misses merge with `default` instead
  /// of dropping the record.
  #[must_use]
  pub fn with_default(mut self, default: Record) -> Self {
    self.default = Some(default);
    self
  }

  pub fn from_key(&self) -> &str {
    &self.from_key
  }

  pub fn join_key(&self) -> &str {
    &self.join_key
  }

  pub(crate) fn merge_records(&self, upstream: &Record, joined: &Record) -> Record {
    (self.merge)(upstream, joined)
  }

  pub(crate) fn default_record(&self) -> Option<&Record> {
    self.default.as_ref()
  }
}

impl fmt::Debug for JoinClause {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("JoinClause")
      .field("from_key", &self.from_key)
      .field("join_key", &self.join_key)
      .field("left", &self.default.is_some())
      .finish()
  }
}

/// Key index over a joinable extractor's current batch.
///
/// Rebuilt (and therefore cleared) whenever the extractor advances to a new
/// batch; every record of the batch appears exactly once under its key.
#[derive(Debug, Default)]
pub(crate) struct JoinIndex {
  entries: HashMap<String, Record>,
}

impl JoinIndex {
  pub(crate) fn lookup(&self, key: &str) -> Option<&Record> {
    self.entries.get(key)
  }

  /// Replaces the index contents with the given batch, keyed by `join_key`.
  ///
  /// A record without the key field or a key seen twice in the batch is a
  /// runtime error attributed to `node`.
  pub(crate) async fn rebuild(
    &mut self,
    node: NodeId,
    join_key: &str,
    mut batch: RecordStream,
  ) -> Result<(), FlowError> {
    self.entries.clear();
    while let Some(joined) = batch.next().await {
      let key = record::field(&joined, join_key).ok_or_else(|| FlowError::MissingJoinKey {
        node,
        field: join_key.to_string(),
      })?;
      let key = record::key_repr(key);
      if self.entries.insert(key.clone(), joined).is_some() {
        return Err(FlowError::DuplicateJoinKey { node, key });
      }
    }
    Ok(())
  }
}
