// Problem Writer Port
// Serializes the caller's problem into the solver's domain/problem files

use super::collaborator::CollaboratorError;
use std::path::Path;

/// Writes the two solver input files for a problem of type `P`
pub trait ProblemWriter<P>: Send + Sync {
    fn write_domain(&self, problem: &P, path: &Path) -> Result<(), CollaboratorError>;

    fn write_problem(&self, problem: &P, path: &Path) -> Result<(), CollaboratorError>;
}

// ============================================================================
// Mock Implementations for Testing
// ============================================================================

pub mod mocks {
    use super::*;

    /// Writes fixed placeholder files, or fails on demand
    pub struct MockProblemWriter {
        failure: Option<String>,
    }

    impl MockProblemWriter {
        pub fn new() -> Self {
            Self { failure: None }
        }

        pub fn new_failing(message: impl Into<String>) -> Self {
            Self {
                failure: Some(message.into()),
            }
        }
    }

    impl Default for MockProblemWriter {
        fn default() -> Self {
            Self::new()
        }
    }

    impl<P> ProblemWriter<P> for MockProblemWriter {
        fn write_domain(&self, _problem: &P, path: &Path) -> Result<(), CollaboratorError> {
            if let Some(message) = &self.failure {
                return Err(CollaboratorError::Writer(message.clone()));
            }
            std::fs::write(path, "(define (domain mock))")?;
            Ok(())
        }

        fn write_problem(&self, _problem: &P, path: &Path) -> Result<(), CollaboratorError> {
            if let Some(message) = &self.failure {
                return Err(CollaboratorError::Writer(message.clone()));
            }
            std::fs::write(path, "(define (problem mock) (:domain mock))")?;
            Ok(())
        }
    }
}
