//! High-water marks and where they are kept between runs.
//!
//! The core only knows the [`RecordStore`] trait; the on-disk format belongs
//! to the store crate.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// The two integers that survive a process restart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Records {
    pub high_score: u32,
    pub high_combo: u32,
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("record store I/O failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("record store is corrupt: {0}")]
    Corrupt(String),
}

pub trait RecordStore {
    fn load(&mut self) -> Result<Records, StoreError>;
    fn save(&mut self, records: &Records) -> Result<(), StoreError>;
}

/// In-process store; what it holds is lost with the process.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    records: Records,
    saves: u32,
}

impl MemoryStore {
    pub fn new(records: Records) -> Self {
        Self { records, saves: 0 }
    }

    pub fn records(&self) -> Records {
        self.records
    }

    /// Number of successful saves.
    pub fn saves(&self) -> u32 {
        self.saves
    }
}

impl RecordStore for MemoryStore {
    fn load(&mut self) -> Result<Records, StoreError> {
        Ok(self.records)
    }

    fn save(&mut self, records: &Records) -> Result<(), StoreError> {
        self.records = *records;
        self.saves += 1;
        Ok(())
    }
}
