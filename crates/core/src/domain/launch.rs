// Launch Domain Model
// What gets spawned, where its output goes, and how it ended

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

/// Destination for the child's stdout/stderr
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutputCapture {
    /// Pipes drained by background tasks; stderr tail kept in memory
    Piped,
    /// Both streams appended to a log file (survives the supervisor exiting)
    LogFile(PathBuf),
}

/// Fully resolved command line for the external application
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LaunchSpec {
    pub program: PathBuf,
    pub args: Vec<String>,
    pub output: OutputCapture,
}

impl LaunchSpec {
    /// Render as a single shell-like line (for logs only, not for execution)
    pub fn display_command(&self) -> String {
        let mut line = self.program.display().to_string();
        for arg in &self.args {
            line.push(' ');
            line.push_str(arg);
        }
        line
    }
}

/// Signals the supervisor sends to the child's process group
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProcessSignal {
    /// Cooperative shutdown (SIGTERM)
    Terminate,
    /// Forced shutdown (SIGKILL)
    Kill,
}

impl fmt::Display for ProcessSignal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProcessSignal::Terminate => write!(f, "SIGTERM"),
            ProcessSignal::Kill => write!(f, "SIGKILL"),
        }
    }
}

/// How a child process ended
///
/// `code` is `None` when the process was killed by a signal, or when the
/// process was adopted from a previous session and its status is unknowable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ExitState {
    pub code: Option<i32>,
    pub signal: Option<i32>,
}

impl ExitState {
    pub fn with_code(code: i32) -> Self {
        Self {
            code: Some(code),
            signal: None,
        }
    }

    pub fn with_signal(signal: i32) -> Self {
        Self {
            code: None,
            signal: Some(signal),
        }
    }

    /// Exit state of a process we did not spawn (no wait status available)
    pub fn unknown() -> Self {
        Self::default()
    }
}
