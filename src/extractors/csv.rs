//! CSV file extractor.
//!
//! Reads a CSV file in batches through the `csv` crate. With a header row,
//! each record becomes a JSON object keyed by the headers; without, a JSON
//! array of strings per row. Character-encoding and BOM concerns are the
//! caller's: the file is read as UTF-8.

use crate::error::NodeError;
use crate::extractor::{Extractor, RecordStream};
use crate::record::Record;
use async_trait::async_trait;
use futures::stream;
use serde_json::{Map, Value};
use std::fs::File;
use std::path::PathBuf;

const DEFAULT_BATCH_SIZE: usize = 500;

/// Extractor reading rows from a CSV file.
pub struct CsvExtractor {
  path: PathBuf,
  delimiter: u8,
  has_headers: bool,
  batch_size: usize,
  reader: Option<csv::Reader<File>>,
  headers: Vec<String>,
  batch: Vec<Record>,
}

impl CsvExtractor {
  pub fn new(path: impl Into<PathBuf>) -> Self {
    Self {
      path: path.into(),
      delimiter: b',',
      has_headers: true,
      batch_size: DEFAULT_BATCH_SIZE,
      reader: None,
      headers: Vec::new(),
      batch: Vec::new(),
    }
  }

  /// Sets the delimiter character.
  #[must_use]
  pub fn with_delimiter(mut self, delimiter: u8) -> Self {
    self.delimiter = delimiter;
    self
  }

  /// Sets whether the file has a header row.
  #[must_use]
  pub fn with_headers(mut self, has_headers: bool) -> Self {
    self.has_headers = has_headers;
    self
  }

  /// Sets how many rows each `extract` call reads.
  #[must_use]
  pub fn with_batch_size(mut self, batch_size: usize) -> Self {
    self.batch_size = batch_size.max(1);
    self
  }

  fn open(&mut self) -> Result<(), NodeError> {
    let mut reader = csv::ReaderBuilder::new()
      .delimiter(self.delimiter)
      .has_headers(self.has_headers)
      .from_path(&self.path)?;
    if self.has_headers {
      self.headers = reader.headers()?.iter().map(str::to_string).collect();
    }
    self.reader = Some(reader);
    Ok(())
  }

  fn row_to_record(&self, row: &csv::StringRecord) -> Record {
    if self.has_headers {
      let mut object = Map::new();
      for (header, value) in self.headers.iter().zip(row.iter()) {
        object.insert(header.clone(), Value::String(value.to_string()));
      }
      Value::Object(object)
    } else {
      Value::Array(row.iter().map(|v| Value::String(v.to_string())).collect())
    }
  }
}

#[async_trait]
impl Extractor for CsvExtractor {
  async fn extract(&mut self, _param: Option<&Record>) -> Result<bool, NodeError> {
    if self.reader.is_none() {
      self.open()?;
    }
    let mut batch = Vec::with_capacity(self.batch_size);
    if let Some(reader) = self.reader.as_mut() {
      let mut row = csv::StringRecord::new();
      while batch.len() < self.batch_size && reader.read_record(&mut row)? {
        batch.push(row.clone());
      }
    }
    self.batch = batch.iter().map(|row| self.row_to_record(row)).collect();
    Ok(!self.batch.is_empty())
  }

  fn traversable(&mut self) -> RecordStream {
    Box::pin(stream::iter(std::mem::take(&mut self.batch)))
  }
}
