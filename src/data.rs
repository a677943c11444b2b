use serde::Serialize;
use serde_json::{Map, Value};
use std::path::Path;
use tokio::fs;
use tracing::debug;

use crate::{Error, Result};

/// Parsed data file: a mapping from string keys to arbitrary nested values.
///
/// Values are kept as a JSON-compatible tree, so YAML-only constructs such as
/// anchors are resolved at load time and non-string scalars become strings,
/// numbers or booleans.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct DataDocument {
    fields: Map<String, Value>,
}

impl DataDocument {
    /// Reads and parses the data file at `path`.
    ///
    /// The file is read in one go and its handle is released before parsing
    /// starts, so a parse failure never leaves it open.
    pub async fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path).await.map_err(|e| Error::DataRead {
            path: path.to_path_buf(),
            source: e,
        })?;

        let document = Self::parse(&text).map_err(|message| Error::DataParse {
            path: path.to_path_buf(),
            message,
        })?;

        debug!("Loaded {} top-level keys from {}", document.len(), path.display());
        Ok(document)
    }

    /// Parses YAML (or JSON) text. An empty document is an empty mapping.
    pub fn parse(text: &str) -> std::result::Result<Self, String> {
        if text.trim().is_empty() {
            return Ok(Self::default());
        }

        match serde_yaml::from_str::<Value>(text).map_err(|e| e.to_string())? {
            Value::Object(fields) => Ok(Self { fields }),
            Value::Null => Ok(Self::default()),
            other => Err(format!(
                "expected a mapping at the top level, found {}",
                kind_of(&other)
            )),
        }
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "a sequence",
        Value::Object(_) => "a mapping",
    }
}
