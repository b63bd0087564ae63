//! The record type and helpers for field access and merging.
//!
//! Records are `serde_json::Value`s. Row-shaped data travels as JSON
//! objects; scalar records are equally valid and pass through pipelines
//! unchanged.

use serde_json::Value;

/// A single unit of data traveling through a flow.
pub type Record = Value;

/// Reads a named field from an object record.
///
/// Returns `None` when the record is not an object or the field is absent.
pub fn field<'a>(record: &'a Record, name: &str) -> Option<&'a Record> {
  record.as_object().and_then(|map| map.get(name))
}

/// Shallow union of two object records; fields of `overlay` win.
///
/// When either side is not an object, `overlay` is returned as-is: a
/// replacing node that produced a scalar replaces the record outright.
pub fn merge_shallow(base: &Record, overlay: &Record) -> Record {
  match (base.as_object(), overlay.as_object()) {
    (Some(base_map), Some(overlay_map)) => {
      let mut merged = base_map.clone();
      for (key, value) in overlay_map {
        merged.insert(key.clone(), value.clone());
      }
      Value::Object(merged)
    }
    _ => overlay.clone(),
  }
}

/// Canonical text form of a join-key value.
///
/// `Value` is neither `Hash` nor `Ord`, so key indexes are keyed by the
/// value's JSON text. Strings keep their quotes, which keeps `"1"` and `1`
/// distinct.
pub fn key_repr(value: &Record) -> String {
  value.to_string()
}
