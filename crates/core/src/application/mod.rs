// Application Layer - Use Cases and Business Logic

pub mod constants;
pub mod supervisor;

// Re-exports
pub use supervisor::{write_config, Supervisor};
