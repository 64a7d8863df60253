// Solver Process Port
// Abstraction for running the external solver to completion (or deadline)

use crate::domain::{ExitStatusCode, InvocationSpec};
use async_trait::async_trait;
use std::time::Duration;
use thiserror::Error;

/// How the solver process ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProcessCompletion {
    /// Exited (or was killed by a signal) before the deadline
    Exited(ExitStatusCode),
    /// Deadline elapsed; the process was killed
    TimedOut,
}

/// Result of one solver run
#[derive(Debug, Clone)]
pub struct ProcessReport {
    pub completion: ProcessCompletion,
    pub pid: Option<u32>,
    pub duration_ms: i64,
}

/// Execution errors
#[derive(Error, Debug)]
pub enum ExecutionError {
    #[error("Failed to launch solver '{program}': {reason}")]
    SpawnFailed { program: String, reason: String },

    #[error("Failed to wait for solver: {0}")]
    WaitFailed(String),

    #[error("Failed to kill solver: {0}")]
    KillFailed(String),
}

/// Solver Process trait
///
/// Implementations:
/// - SubprocessSolver: spawns the solver and streams its output
/// - MockSolverProcess: scripted behavior for tests
#[async_trait]
pub trait SolverProcess: Send + Sync {
    /// Run the solver described by `spec`, waiting at most `timeout`
    ///
    /// # Errors
    /// - ExecutionError::SpawnFailed if the process cannot be started
    /// - ExecutionError::WaitFailed / KillFailed on OS-level failures
    ///
    /// A timeout is not an error; it is reported as
    /// `ProcessCompletion::TimedOut`.
    async fn run(
        &self,
        spec: &InvocationSpec,
        timeout: Option<Duration>,
    ) -> Result<ProcessReport, ExecutionError>;
}

// ============================================================================
// Mock Implementations for Testing
// ============================================================================

pub mod mocks {
    use super::*;
    use std::sync::{Arc, Mutex};

    /// Mock solver behavior
    #[derive(Debug, Clone)]
    pub enum MockBehavior {
        /// Exit with code, optionally writing the artifact first
        Exit {
            code: i32,
            artifact: Option<String>,
        },
        /// Killed by the given signal
        Signal(i32),
        /// Deadline elapsed
        Timeout,
        /// Process could not be launched
        SpawnFail(String),
    }

    /// Mock Solver Process for testing
    pub struct MockSolverProcess {
        behavior: Arc<Mutex<MockBehavior>>,
        invocations: Arc<Mutex<Vec<InvocationSpec>>>,
    }

    impl MockSolverProcess {
        pub fn new(behavior: MockBehavior) -> Self {
            Self {
                behavior: Arc::new(Mutex::new(behavior)),
                invocations: Arc::new(Mutex::new(Vec::new())),
            }
        }

        pub fn new_solved(artifact: impl Into<String>) -> Self {
            Self::new(MockBehavior::Exit {
                code: 0,
                artifact: Some(artifact.into()),
            })
        }

        pub fn new_exit(code: i32) -> Self {
            Self::new(MockBehavior::Exit {
                code,
                artifact: None,
            })
        }

        pub fn call_count(&self) -> usize {
            self.invocations.lock().unwrap().len()
        }

        pub fn invocations(&self) -> Vec<InvocationSpec> {
            self.invocations.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl SolverProcess for MockSolverProcess {
        async fn run(
            &self,
            spec: &InvocationSpec,
            _timeout: Option<Duration>,
        ) -> Result<ProcessReport, ExecutionError> {
            self.invocations.lock().unwrap().push(spec.clone());

            let behavior = self.behavior.lock().unwrap().clone();

            let completion = match behavior {
                MockBehavior::Exit { code, artifact } => {
                    if let Some(content) = artifact {
                        std::fs::write(&spec.artifact_path, content)
                            .map_err(|e| ExecutionError::WaitFailed(e.to_string()))?;
                    }
                    ProcessCompletion::Exited(ExitStatusCode::from_code(code))
                }
                MockBehavior::Signal(signal) => {
                    ProcessCompletion::Exited(ExitStatusCode::from_signal(signal))
                }
                MockBehavior::Timeout => ProcessCompletion::TimedOut,
                MockBehavior::SpawnFail(reason) => {
                    return Err(ExecutionError::SpawnFailed {
                        program: spec.program().to_string_lossy().into_owned(),
                        reason,
                    })
                }
            };

            Ok(ProcessReport {
                completion,
                pid: None,
                duration_ms: 10,
            })
        }
    }
}
