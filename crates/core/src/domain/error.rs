// Domain Error Types

use thiserror::Error;

#[derive(Error, Debug)]
pub enum DomainError {
    #[error("Invalid port: {0}")]
    InvalidPort(u16),

    #[error("Invalid thread count for {section}: {count}")]
    InvalidThreadCount { section: &'static str, count: u32 },

    #[error("Invalid project name: {0:?}")]
    InvalidProjectName(String),
}

pub type Result<T> = std::result::Result<T, DomainError>;
