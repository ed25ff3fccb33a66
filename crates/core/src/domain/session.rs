// Session Record
// Persisted after a successful start so a later CLI invocation can find the child

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionRecord {
    pub pid: u32,
    pub port: u16,
    pub project_file: PathBuf,
    pub started_at_ms: i64, // epoch ms
}
