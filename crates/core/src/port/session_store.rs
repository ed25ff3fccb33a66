// Session Store Port
// Lets a later invocation find the process an earlier `start` launched

use crate::domain::SessionRecord;
use crate::error::Result;

pub trait SessionStore: Send + Sync {
    fn load(&self) -> Result<Option<SessionRecord>>;

    fn save(&self, record: &SessionRecord) -> Result<()>;

    /// Remove the record; succeeds when none exists
    fn clear(&self) -> Result<()>;
}

// ============================================================================
// Mock Implementations for Testing
// ============================================================================

pub mod mocks {
    use super::*;
    use crate::error::AppError;
    use std::sync::Mutex;

    #[derive(Default)]
    pub struct InMemorySessionStore {
        record: Mutex<Option<SessionRecord>>,
        corrupt: Mutex<bool>,
    }

    impl InMemorySessionStore {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn with_record(record: SessionRecord) -> Self {
            Self {
                record: Mutex::new(Some(record)),
                corrupt: Mutex::new(false),
            }
        }

        /// Store whose record cannot be parsed until it is cleared
        pub fn corrupted() -> Self {
            Self {
                record: Mutex::new(None),
                corrupt: Mutex::new(true),
            }
        }

        pub fn is_corrupt(&self) -> bool {
            *self.corrupt.lock().unwrap()
        }

        pub fn current(&self) -> Option<SessionRecord> {
            self.record.lock().unwrap().clone()
        }
    }

    impl SessionStore for InMemorySessionStore {
        fn load(&self) -> Result<Option<SessionRecord>> {
            if self.is_corrupt() {
                return Err(AppError::Session("expected value at line 1 column 1".to_string()));
            }
            Ok(self.current())
        }

        fn save(&self, record: &SessionRecord) -> Result<()> {
            *self.record.lock().unwrap() = Some(record.clone());
            Ok(())
        }

        fn clear(&self) -> Result<()> {
            *self.record.lock().unwrap() = None;
            *self.corrupt.lock().unwrap() = false;
            Ok(())
        }
    }
}
