// Central Error Type for the Application

use thiserror::Error;

/// Application-level error type
///
/// Every variant is converted into an `INTERNAL_ERROR` outcome at the
/// planner boundary; nothing of this type escapes `PattyPlanner::solve`.
#[derive(Error, Debug)]
pub enum AppError {
    #[error("{0}")]
    Domain(#[from] crate::domain::DomainError),

    #[error("{0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to read plan artifact {}: {source}", path.display())]
    Artifact {
        path: std::path::PathBuf,
        source: std::io::Error,
    },

    #[error("{0}")]
    Execution(#[from] crate::port::ExecutionError),

    #[error("{0}")]
    Collaborator(#[from] crate::port::CollaboratorError),
}

/// Result type alias using AppError
pub type Result<T> = std::result::Result<T, AppError>;
