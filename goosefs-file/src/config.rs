//! Configuration for the JSON-file backend.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Where and how collection files are written.
///
/// Deserializes from a partial table, filling in defaults for missing keys:
///
/// ```ignore
/// let config: JsonFileStoreConfig = serde_json::from_str(r#"{ "data_dir": "/var/lib/app" }"#)?;
/// assert!(!config.pretty);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct JsonFileStoreConfig {
    /// Directory holding the collection files. Created on demand.
    pub data_dir: PathBuf,
    /// Write indented JSON instead of a single line.
    pub pretty: bool,
}

impl Default for JsonFileStoreConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("./data"),
            pretty: false,
        }
    }
}
