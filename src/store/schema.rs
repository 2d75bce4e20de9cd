use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::session::drill::DrillProgress;
use crate::session::result::DrillResult;

const SCHEMA_VERSION: u32 = 1;

fn schema_version() -> u32 {
    SCHEMA_VERSION
}

/// Saved progress for one curriculum.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ProgressData {
    #[serde(default = "schema_version")]
    pub schema_version: u32,
    #[serde(flatten)]
    pub progress: DrillProgress,
    /// Set once a pass finished without any mistake words.
    #[serde(default)]
    pub completed: bool,
    #[serde(default)]
    pub saved_at: Option<DateTime<Utc>>,
}

impl Default for ProgressData {
    fn default() -> Self {
        Self {
            schema_version: SCHEMA_VERSION,
            progress: DrillProgress::default(),
            completed: false,
            saved_at: None,
        }
    }
}

impl ProgressData {
    pub fn new(progress: DrillProgress, completed: bool) -> Self {
        Self {
            progress,
            completed,
            saved_at: Some(Utc::now()),
            ..Self::default()
        }
    }

    /// Check if loaded data has a stale schema version and needs reset.
    pub fn needs_reset(&self) -> bool {
        self.schema_version != SCHEMA_VERSION
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct HistoryData {
    pub schema_version: u32,
    pub drills: Vec<DrillResult>,
}

impl Default for HistoryData {
    fn default() -> Self {
        Self {
            schema_version: SCHEMA_VERSION,
            drills: Vec::new(),
        }
    }
}
