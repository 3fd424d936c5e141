use std::fs;
use std::path::PathBuf;

use chrono::Utc;
use serde::Serialize;
use serde_json::Value;
use uuid::Uuid;

use crate::error::StoreError;

/// Append-only JSON array log. Each append reads the whole file (or
/// defaults to an empty array), pushes an enveloped record, and rewrites
/// the file in full. Acceptable only at low volume.
pub struct LogStore {
    path: PathBuf,
}

impl LogStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Read every record. A missing or corrupt file reads as an empty log,
    /// never an error.
    pub fn read_all(&self) -> Vec<Value> {
        let text = match fs::read_to_string(&self.path) {
            Ok(text) => text,
            Err(_) => return Vec::new(),
        };
        match serde_json::from_str::<Vec<Value>>(&text) {
            Ok(records) => records,
            Err(e) => {
                tracing::warn!(
                    "log file {} is corrupt ({e}), treating as empty",
                    self.path.display()
                );
                Vec::new()
            }
        }
    }

    /// Append one record, stamping it with a record id and log timestamp.
    pub fn append<T: Serialize>(&self, entry: &T) -> Result<(), StoreError> {
        let mut records = self.read_all();

        let mut value = serde_json::to_value(entry)?;
        if let Value::Object(ref mut map) = value {
            map.insert("record_id".to_string(), Value::String(Uuid::new_v4().to_string()));
            map.insert(
                "logged_at_utc".to_string(),
                Value::String(Utc::now().to_rfc3339()),
            );
        }
        records.push(value);

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        fs::write(&self.path, serde_json::to_string_pretty(&records)?)?;
        Ok(())
    }
}
