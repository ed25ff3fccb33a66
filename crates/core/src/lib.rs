// Burp Headless Core - Domain Logic, Ports & Supervisor Service
// NO infrastructure dependencies (ADR-001: Hexagonal Architecture)

pub mod application;
pub mod domain;
pub mod error;
pub mod port;

pub use application::Supervisor;
pub use error::{AppError, Result};
