// Time Provider Port (for testability)

use async_trait::async_trait;
use std::time::Duration;

/// Time provider interface (allows mocking in tests)
///
/// Every wait the supervisor performs goes through `sleep`, so tests can run
/// the settle and shutdown windows on a virtual clock.
#[async_trait]
pub trait TimeProvider: Send + Sync {
    /// Get current time in milliseconds since epoch
    fn now_millis(&self) -> i64;

    /// Suspend the caller for `duration`
    async fn sleep(&self, duration: Duration);
}

/// System time provider (production)
pub struct SystemTimeProvider;

#[async_trait]
impl TimeProvider for SystemTimeProvider {
    fn now_millis(&self) -> i64 {
        chrono::Utc::now().timestamp_millis()
    }

    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}

// ============================================================================
// Mock Implementations for Testing
// ============================================================================

pub mod mocks {
    use super::*;
    use std::sync::Mutex;

    /// Virtual clock: `sleep` returns immediately and advances `now_millis`
    pub struct MockTimeProvider {
        now_ms: Mutex<i64>,
        sleeps: Mutex<Vec<Duration>>,
    }

    impl MockTimeProvider {
        pub fn new(start_ms: i64) -> Self {
            Self {
                now_ms: Mutex::new(start_ms),
                sleeps: Mutex::new(Vec::new()),
            }
        }

        /// Every duration passed to `sleep`, in call order
        pub fn sleeps(&self) -> Vec<Duration> {
            self.sleeps.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl TimeProvider for MockTimeProvider {
        fn now_millis(&self) -> i64 {
            *self.now_ms.lock().unwrap()
        }

        async fn sleep(&self, duration: Duration) {
            self.sleeps.lock().unwrap().push(duration);
            *self.now_ms.lock().unwrap() += duration.as_millis() as i64;
        }
    }
}
