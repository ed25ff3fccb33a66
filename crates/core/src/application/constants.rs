// Supervisor constants (ADR: No magic values)
use std::time::Duration;

/// Default runtime executable (never read from the environment)
pub const DEFAULT_JAVA_PATH: &str = "/usr/bin/java";

/// Default JVM heap size (-Xmx) in MiB
pub const DEFAULT_HEAP_SIZE_MB: u32 = 2048;

/// Default project directory for the CLI
pub const DEFAULT_PROJECT_DIR: &str = "./burpsuite";

/// Default project name (project file is `<name>.burp`)
pub const DEFAULT_PROJECT_NAME: &str = "default";

/// Default proxy listener port
pub const DEFAULT_PROXY_PORT: u16 = 8080;

/// Default spider and scanner thread count
pub const DEFAULT_SCAN_THREADS: u32 = 10;

/// Fixed spider link depth written into every config document
pub const MAX_LINK_DEPTH: u32 = 5;

pub const PROJECT_FILE_EXTENSION: &str = "burp";
pub const LOG_FILE_EXTENSION: &str = "log";
pub const GENERATED_CONFIG_SUFFIX: &str = ".config.json";
pub const SESSION_FILE_NAME: &str = "burp-headless.session.json";

/// Wait after spawn before checking the child is still alive (2s)
pub const START_SETTLE_DURATION: Duration = Duration::from_secs(2);

/// Liveness checks after SIGTERM before escalating to SIGKILL
pub const GRACEFUL_SHUTDOWN_POLL_ATTEMPTS: usize = 10;

/// Interval between liveness checks after SIGTERM (1s)
pub const GRACEFUL_SHUTDOWN_POLL_INTERVAL: Duration = Duration::from_secs(1);

/// Lines of child stderr kept for failure reports
pub const CAPTURED_OUTPUT_MAX_LINES: usize = 200;
