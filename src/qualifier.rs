//! # Qualifier Trait
//!
//! Qualifiers decide whether a record proceeds through the rest of the
//! carrier flow. A rejection is confined: parent flows keep seeing their
//! other records unaffected.

use crate::error::NodeError;
use crate::interrupt::Verdict;
use crate::record::Record;
use async_trait::async_trait;

/// Trait for predicate nodes.
///
/// The verdict convention: `Accept` continues with the record unchanged,
/// `Reject` skips the remainder of the current record in the carrier flow
/// only, and `Interrupt` carries a full directive with its own routing.
#[async_trait]
pub trait Qualifier: Send {
  /// Judges one record.
  async fn qualify(&mut self, record: &Record) -> Result<Verdict, NodeError>;
}
