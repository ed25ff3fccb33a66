// Session File Store
// `<project_dir>/burp-headless.session.json`, shared between CLI invocations

use crate::atomic_file::write_json_atomic;
use burp_headless_core::domain::SessionRecord;
use burp_headless_core::port::SessionStore;
use burp_headless_core::{AppError, Result};
use std::io::ErrorKind;
use std::path::PathBuf;
use tracing::debug;

#[derive(Debug, Clone)]
pub struct JsonSessionStore {
    path: PathBuf,
}

impl JsonSessionStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &PathBuf {
        &self.path
    }
}

impl SessionStore for JsonSessionStore {
    fn load(&self) -> Result<Option<SessionRecord>> {
        let bytes = match std::fs::read(&self.path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };

        serde_json::from_slice(&bytes).map(Some).map_err(|e| {
            AppError::Session(format!("corrupt session file {}: {}", self.path.display(), e))
        })
    }

    fn save(&self, record: &SessionRecord) -> Result<()> {
        write_json_atomic(&self.path, record)?;
        debug!(path = %self.path.display(), pid = %record.pid, "Session record saved");
        Ok(())
    }

    fn clear(&self) -> Result<()> {
        match std::fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}
