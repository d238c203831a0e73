use std::fs;
use std::path::Path;

use serde_json::Value;
use tracing::debug;

use crate::error::{EditorError, Result};
use crate::models::Record;
use crate::models::lenient;

/// Parse uploaded text into a record list.
/// Accepts a single record object (wrapped into a one-element list) or an array of records.
pub fn parse_records(text: &str) -> Result<Vec<Record>> {
    let json: Value =
        serde_json::from_str(text).map_err(|e| EditorError::InvalidUpload(e.to_string()))?;

    let records = match json {
        Value::Array(items) => items
            .into_iter()
            .enumerate()
            .map(|(index, item)| record_from_value(item, Some(index)))
            .collect::<Result<Vec<_>>>()?,
        Value::Object(_) => vec![record_from_value(json, None)?],
        other => {
            return Err(EditorError::InvalidUpload(format!(
                "expected a record object or an array of records, found {}",
                lenient::kind(&other)
            )));
        }
    };

    debug!(records = records.len(), "parsed upload");
    Ok(records)
}

/// Serialize the list as indented JSON text.
pub fn to_pretty_json(records: &[Record]) -> Result<String> {
    Ok(serde_json::to_string_pretty(records)?)
}

/// Load a record list from a JSON file.
pub fn read_records(path: &Path) -> Result<Vec<Record>> {
    let contents = fs::read_to_string(path)?;
    parse_records(&contents)
}

/// Write a record list as indented JSON, creating parent directories.
pub fn write_records(path: &Path, records: &[Record]) -> Result<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, to_pretty_json(records)?)?;
    Ok(())
}

fn record_from_value(value: Value, index: Option<usize>) -> Result<Record> {
    if !value.is_object() {
        let at = index.map(|i| format!(" at index {i}")).unwrap_or_default();
        return Err(EditorError::InvalidUpload(format!(
            "expected a record object{at}, found {}",
            lenient::kind(&value)
        )));
    }
    Record::try_from(value)
}
