// Burp Headless Infrastructure - System Adapters
// Implements: ProcessLauncher, ConfigStore, SessionStore (ADR-002)

mod atomic_file;
pub mod config_file_store;
pub mod session_file_store;
pub mod subprocess_launcher;

pub use config_file_store::JsonConfigStore;
pub use session_file_store::JsonSessionStore;
pub use subprocess_launcher::SubprocessLauncher;
