// Central Error Type for the Application

use std::path::PathBuf;
use thiserror::Error;

/// Application-level error type
///
/// Only setup and persistence failures surface as `AppError`. Start and stop
/// failures are reported as data through `StartOutcome` / `StopOutcome`.
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Domain error: {0}")]
    Domain(#[from] crate::domain::DomainError),

    #[error("Burp Suite JAR not found: {}", .0.display())]
    ExecutableNotFound(PathBuf),

    #[error("Project directory {} is not usable: {source}", .path.display())]
    ProjectDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Session store error: {0}")]
    Session(String),

    #[error("Process error: {0}")]
    Process(#[from] crate::port::ProcessError),
}

/// Result type alias using AppError
pub type Result<T> = std::result::Result<T, AppError>;
