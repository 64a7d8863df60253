// Domain Error Types

use thiserror::Error;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum DomainError {
    #[error("Malformed plan artifact at line {line}: expected '<index>: <action>', got {content:?}")]
    MalformedArtifactLine { line: usize, content: String },

    #[error("Malformed action {0:?}")]
    MalformedAction(String),
}

pub type Result<T> = std::result::Result<T, DomainError>;
