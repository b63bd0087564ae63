//! Object-record reshaping transformers: set, rename, and drop fields.
//!
//! All three require object records; a scalar or array record is a runtime
//! error, since silently passing it through would hide a wiring mistake.

use crate::error::NodeError;
use crate::interrupt::Step;
use crate::record::Record;
use crate::transformer::Transformer;
use async_trait::async_trait;
use serde_json::{Map, Value};

fn into_object(record: Record, node: &str) -> Result<Map<String, Value>, NodeError> {
  match record {
    Value::Object(map) => Ok(map),
    other => Err(format!("{} requires an object record, got: {}", node, other).into()),
  }
}

/// Sets one field to a fixed value, overwriting any existing value.
pub struct SetFieldTransformer {
  field: String,
  value: Record,
}

impl SetFieldTransformer {
  pub fn new(field: impl Into<String>, value: Record) -> Self {
    Self {
      field: field.into(),
      value,
    }
  }
}

#[async_trait]
impl Transformer for SetFieldTransformer {
  async fn exec(&mut self, record: Record) -> Result<Step, NodeError> {
    let mut object = into_object(record, "SetFieldTransformer")?;
    object.insert(self.field.clone(), self.value.clone());
    Ok(Step::Value(Value::Object(object)))
  }
}

/// Moves a field to a new name; records without the field pass unchanged.
pub struct RenameFieldTransformer {
  from: String,
  to: String,
}

impl RenameFieldTransformer {
  pub fn new(from: impl Into<String>, to: impl Into<String>) -> Self {
    Self {
      from: from.into(),
      to: to.into(),
    }
  }
}

#[async_trait]
impl Transformer for RenameFieldTransformer {
  async fn exec(&mut self, record: Record) -> Result<Step, NodeError> {
    let mut object = into_object(record, "RenameFieldTransformer")?;
    if let Some(value) = object.remove(&self.from) {
      object.insert(self.to.clone(), value);
    }
    Ok(Step::Value(Value::Object(object)))
  }
}

/// Removes the named fields; absent fields are ignored.
pub struct DropFieldsTransformer {
  fields: Vec<String>,
}

impl DropFieldsTransformer {
  pub fn new(fields: impl IntoIterator<Item = impl Into<String>>) -> Self {
    Self {
      fields: fields.into_iter().map(Into::into).collect(),
    }
  }
}

#[async_trait]
impl Transformer for DropFieldsTransformer {
  async fn exec(&mut self, record: Record) -> Result<Step, NodeError> {
    let mut object = into_object(record, "DropFieldsTransformer")?;
    for field in &self.fields {
      object.remove(field);
    }
    Ok(Step::Value(Value::Object(object)))
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use serde_json::json;

  #[tokio::test]
  async fn test_set_field() {
    let mut transformer = SetFieldTransformer::new("source", json!("import"));
    let step = transformer.exec(json!({ "id": 1 })).await.expect("exec");
    assert!(matches!(step, Step::Value(v) if v == json!({ "id": 1, "source": "import" })));
  }

  #[tokio::test]
  async fn test_rename_field() {
    let mut transformer = RenameFieldTransformer::new("nm", "name");
    let step = transformer
      .exec(json!({ "nm": "alice" }))
      .await
      .expect("exec");
    assert!(matches!(step, Step::Value(v) if v == json!({ "name": "alice" })));

    let step = transformer.exec(json!({ "id": 2 })).await.expect("exec");
    assert!(matches!(step, Step::Value(v) if v == json!({ "id": 2 })));
  }

  #[tokio::test]
  async fn test_drop_fields() {
    let mut transformer = DropFieldsTransformer::new(["a", "b"]);
    let step = transformer
      .exec(json!({ "a": 1, "b": 2, "c": 3 }))
      .await
      .expect("exec");
    assert!(matches!(step, Step::Value(v) if v == json!({ "c": 3 })));
  }

  #[tokio::test]
  async fn test_non_object_record_fails() {
    let mut transformer = SetFieldTransformer::new("x", json!(1));
    assert!(transformer.exec(json!(5)).await.is_err());
  }
}
