// Config Store Port
// Persistence of the Burp configuration document

use crate::domain::ScanConfig;
use crate::error::Result;
use std::path::Path;

/// Config store interface
///
/// Implementations must write the whole document or nothing: a reader never
/// observes a partially written file.
pub trait ConfigStore: Send + Sync {
    /// Write `config` to `path`, replacing any existing file
    fn write(&self, path: &Path, config: &ScanConfig) -> Result<()>;

    /// Read a document previously written to `path`
    fn read(&self, path: &Path) -> Result<ScanConfig>;
}

// ============================================================================
// Mock Implementations for Testing
// ============================================================================

pub mod mocks {
    use super::*;
    use crate::error::AppError;
    use std::collections::HashMap;
    use std::path::PathBuf;
    use std::sync::Mutex;

    /// In-memory config store keyed by path
    #[derive(Default)]
    pub struct InMemoryConfigStore {
        documents: Mutex<HashMap<PathBuf, ScanConfig>>,
    }

    impl InMemoryConfigStore {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn get(&self, path: &Path) -> Option<ScanConfig> {
            self.documents.lock().unwrap().get(path).cloned()
        }
    }

    impl ConfigStore for InMemoryConfigStore {
        fn write(&self, path: &Path, config: &ScanConfig) -> Result<()> {
            self.documents
                .lock()
                .unwrap()
                .insert(path.to_path_buf(), config.clone());
            Ok(())
        }

        fn read(&self, path: &Path) -> Result<ScanConfig> {
            self.get(path)
                .ok_or_else(|| AppError::Config(format!("no document at {}", path.display())))
        }
    }
}
