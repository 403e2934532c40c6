// Central Error Type for the Application

use thiserror::Error;

/// Application-level error type
#[derive(Error, Debug)]
pub enum AppError {
    #[error("{0}")]
    Domain(#[from] crate::domain::DomainError),

    #[error("{0}")]
    Validation(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to get profile: {0}")]
    Fetch(#[from] crate::port::FetchError),

    #[error("{0}")]
    Execution(#[from] crate::port::ExecutionError),
}

impl AppError {
    /// Whether the error was caused by the caller's input rather than the server
    pub fn is_caller_error(&self) -> bool {
        matches!(self, AppError::Domain(_) | AppError::Validation(_))
    }
}

/// Result type alias using AppError
pub type Result<T> = std::result::Result<T, AppError>;
