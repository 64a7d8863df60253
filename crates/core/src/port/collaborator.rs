// Errors raised by the external problem/plan collaborators

use thiserror::Error;

#[derive(Error, Debug)]
pub enum CollaboratorError {
    #[error("Problem writer failed: {0}")]
    Writer(String),

    #[error("Plan parser failed: {0}")]
    Parser(String),

    #[error("Plan validator failed: {0}")]
    Validator(String),

    #[error("{0}")]
    Io(#[from] std::io::Error),
}
