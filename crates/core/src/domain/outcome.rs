// Supervisor Result Types
// Callers branch on these instead of catching errors (start/stop never fail with Err)

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Result of `Supervisor::start`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum StartOutcome {
    Started {
        pid: u32,
        port: u16,
        project_file: PathBuf,
    },
    AlreadyRunning {
        pid: u32,
        port: u16,
    },
    Failed {
        error: String,
    },
}

impl StartOutcome {
    pub fn failed(error: impl ToString) -> Self {
        StartOutcome::Failed {
            error: error.to_string(),
        }
    }

    pub fn pid(&self) -> Option<u32> {
        match self {
            StartOutcome::Started { pid, .. } | StartOutcome::AlreadyRunning { pid, .. } => {
                Some(*pid)
            }
            StartOutcome::Failed { .. } => None,
        }
    }
}

/// Result of `Supervisor::stop`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum StopOutcome {
    Stopped,
    NotRunning,
    Error { error: String },
}

impl StopOutcome {
    pub fn error(error: impl ToString) -> Self {
        StopOutcome::Error {
            error: error.to_string(),
        }
    }
}

/// Result of `Supervisor::get_status`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum StatusReport {
    Running {
        pid: u32,
    },
    Stopped {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        return_code: Option<i32>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        signal: Option<i32>,
    },
}

impl StatusReport {
    /// Nothing tracked
    pub fn stopped() -> Self {
        StatusReport::Stopped {
            return_code: None,
            signal: None,
        }
    }

    pub fn is_running(&self) -> bool {
        matches!(self, StatusReport::Running { .. })
    }
}
