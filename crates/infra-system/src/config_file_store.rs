// Config File Store
// JSON persistence for the Burp configuration document

use crate::atomic_file::write_json_atomic;
use burp_headless_core::domain::ScanConfig;
use burp_headless_core::port::ConfigStore;
use burp_headless_core::Result;
use std::path::Path;
use tracing::debug;

/// Writes configuration documents as indented JSON, atomically
#[derive(Debug, Default, Clone, Copy)]
pub struct JsonConfigStore;

impl JsonConfigStore {
    pub fn new() -> Self {
        Self
    }
}

impl ConfigStore for JsonConfigStore {
    fn write(&self, path: &Path, config: &ScanConfig) -> Result<()> {
        write_json_atomic(path, config)?;
        debug!(path = %path.display(), "Config document written");
        Ok(())
    }

    fn read(&self, path: &Path) -> Result<ScanConfig> {
        let bytes = std::fs::read(path)?;
        Ok(serde_json::from_slice(&bytes)?)
    }
}
