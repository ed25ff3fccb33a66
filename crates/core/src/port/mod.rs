// Port Layer - Interfaces for external dependencies

pub mod config_store;
pub mod process_launcher; // ADR-002
pub mod session_store;
pub mod time_provider;

// Re-exports
pub use config_store::ConfigStore;
pub use process_launcher::{ChildProcess, ProcessError, ProcessLauncher};
pub use session_store::SessionStore;
pub use time_provider::TimeProvider;
