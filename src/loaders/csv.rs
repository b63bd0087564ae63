//! CSV file loader.
//!
//! Buffers object records and writes them as one CSV file on the engine's
//! final flush. Header columns come from the first buffered record; values
//! are stringified (`null` becomes the empty field). An `Exception` status
//! discards the buffer and leaves the target file untouched.

use crate::error::NodeError;
use crate::interrupt::Step;
use crate::loader::Loader;
use crate::record::Record;
use crate::status::FlowStatus;
use async_trait::async_trait;
use serde_json::Value;
use std::path::PathBuf;

/// Loader writing records to a CSV file on final flush.
pub struct CsvLoader {
  path: PathBuf,
  delimiter: u8,
  rows: Vec<Record>,
}

impl CsvLoader {
  pub fn new(path: impl Into<PathBuf>) -> Self {
    Self {
      path: path.into(),
      delimiter: b',',
      rows: Vec::new(),
    }
  }

  /// Sets the delimiter character.
  #[must_use]
  pub fn with_delimiter(mut self, delimiter: u8) -> Self {
    self.delimiter = delimiter;
    self
  }

  fn field_text(value: &Value) -> String {
    match value {
      Value::Null => String::new(),
      Value::String(text) => text.clone(),
      other => other.to_string(),
    }
  }

  fn write_file(&mut self) -> Result<(), NodeError> {
    if self.rows.is_empty() {
      return Ok(());
    }
    let mut writer = csv::WriterBuilder::new()
      .delimiter(self.delimiter)
      .from_path(&self.path)?;

    let headers: Vec<String> = match self.rows[0].as_object() {
      Some(object) => object.keys().cloned().collect(),
      None => {
        return Err(format!("CsvLoader requires object records, got: {}", self.rows[0]).into())
      }
    };
    writer.write_record(&headers)?;

    for row in &self.rows {
      let Some(object) = row.as_object() else {
        return Err(format!("CsvLoader requires object records, got: {}", row).into());
      };
      let fields: Vec<String> = headers
        .iter()
        .map(|h| object.get(h).map(Self::field_text).unwrap_or_default())
        .collect();
      writer.write_record(&fields)?;
    }
    writer.flush()?;
    self.rows.clear();
    Ok(())
  }
}

#[async_trait]
impl Loader for CsvLoader {
  async fn exec(&mut self, record: Record) -> Result<Step, NodeError> {
    self.rows.push(record);
    Ok(Step::Pass)
  }

  async fn flush(&mut self, status: Option<FlowStatus>) -> Result<(), NodeError> {
    match status {
      Some(FlowStatus::Exception) => {
        self.rows.clear();
        Ok(())
      }
      Some(_) => self.write_file(),
      // nothing useful to do mid-flow without append support
      None => Ok(()),
    }
  }
}
