//! JSON and YAML documents.
//!
//! Text formats hold no array data: arrays are written as their markers and
//! the loss is logged once per array.

use std::fs;
use std::path::Path;

use serde_json::Value as JsonValue;
use simstore_model::{Address, Value, text};

use crate::atomic;
use crate::error::{Result, StoreError};
use crate::format::FileFormat;

/// Write `root` as JSON (with `indent`) or YAML.
pub(crate) fn write_text(root: &Value, path: &Path, format: FileFormat, indent: usize) -> Result<()> {
    for (address, array) in root.arrays(&Address::root()) {
        tracing::warn!(
            address = %address,
            kind = array.kind(),
            path = %path.display(),
            "array data is not stored in {format} documents; writing its marker only"
        );
    }

    let json = text::to_json_value(root);
    let rendered = match format {
        FileFormat::Yaml => serde_yaml::to_string(&json).map_err(|source| StoreError::Yaml {
            path: path.to_path_buf(),
            source,
        })?,
        _ => text::render_json(&json, indent),
    };
    atomic::write_atomically(path, rendered.as_bytes())
}

/// Read and parse a JSON or YAML document.
pub(crate) fn read_text(path: &Path, format: FileFormat) -> Result<JsonValue> {
    let contents = fs::read_to_string(path).map_err(|e| StoreError::io("read", path, e))?;
    match format {
        FileFormat::Yaml => serde_yaml::from_str(&contents).map_err(|source| StoreError::Yaml {
            path: path.to_path_buf(),
            source,
        }),
        _ => serde_json::from_str(&contents).map_err(|source| StoreError::Json {
            path: path.to_path_buf(),
            source,
        }),
    }
}
