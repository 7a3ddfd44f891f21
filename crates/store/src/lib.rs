//! JSON persistence for the stacking game.
//!
//! - [`JsonFileStore`]: the high score / high combo pair as a small JSON file
//! - [`load_config`]: a [`StackConfig`] read from JSON and validated
//!
//! Record files are versioned; unknown or missing fields fall back to zero.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use anyhow::Context;
use serde::{Deserialize, Serialize};

use stack_tower_core::config::StackConfig;
use stack_tower_core::records::{RecordStore, Records, StoreError};

/// On-disk layout of the records file.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
struct RecordsFile {
    #[serde(default = "default_version")]
    version: u32,
    #[serde(flatten)]
    records: Records,
}

fn default_version() -> u32 {
    1
}

#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// `STACK_RECORDS_PATH`, else `$XDG_CONFIG_HOME/stack-tower/records.json`,
    /// else `~/.config/stack-tower/records.json`.
    pub fn from_env() -> Self {
        if let Some(explicit) = std::env::var_os("STACK_RECORDS_PATH") {
            return Self::new(explicit);
        }

        let base = std::env::var_os("XDG_CONFIG_HOME")
            .map(PathBuf::from)
            .or_else(|| {
                std::env::var_os("HOME").map(|home| {
                    let mut p = PathBuf::from(home);
                    p.push(".config");
                    p
                })
            })
            .unwrap_or_else(|| PathBuf::from("."));

        let mut path = base;
        path.push("stack-tower");
        path.push("records.json");
        Self { path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl RecordStore for JsonFileStore {
    fn load(&mut self) -> Result<Records, StoreError> {
        let bytes = match fs::read(&self.path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Records::default()),
            Err(e) => return Err(e.into()),
        };
        let file: RecordsFile =
            serde_json::from_slice(&bytes).map_err(|e| StoreError::Corrupt(e.to_string()))?;
        log::debug!("loaded records from {}", self.path.display());
        Ok(file.records)
    }

    fn save(&mut self, records: &Records) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        let file = RecordsFile {
            version: default_version(),
            records: *records,
        };
        let text = serde_json::to_string_pretty(&file)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
        fs::write(&self.path, text)?;
        log::debug!("saved records to {}", self.path.display());
        Ok(())
    }
}

/// Read a JSON config file. Missing fields keep their defaults.
pub fn load_config(path: impl AsRef<Path>) -> anyhow::Result<StackConfig> {
    let path = path.as_ref();
    let text = fs::read_to_string(path)
        .with_context(|| format!("failed to read config {}", path.display()))?;
    parse_config(&text).with_context(|| format!("invalid config {}", path.display()))
}

/// Parse and validate a JSON config.
pub fn parse_config(text: &str) -> anyhow::Result<StackConfig> {
    let config: StackConfig = serde_json::from_str(text)?;
    config.validate()?;
    Ok(config)
}
