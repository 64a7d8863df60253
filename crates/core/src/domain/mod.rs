// Domain Layer - Invocation, plan and outcome model

pub mod credits;
pub mod error;
pub mod exit_status;
pub mod invocation;
pub mod outcome;
pub mod plan;
pub mod verdict;

// Re-exports
pub use credits::{EngineCredits, PATTY_CREDITS};
pub use error::DomainError;
pub use exit_status::{abnormal_exit_message, ExitStatusCode};
pub use invocation::{InvocationSpec, SolverCommand, SolverOptions, SAVE_PLAN_FLAG};
pub use outcome::{
    LogLevel, LogMessage, PlanGenerationStatus, PlanOutcome, TIMEOUT_MESSAGE,
    VALIDATION_FAILED_MESSAGE,
};
pub use plan::{action_block, extract_action_texts, ActionInstance, SequentialPlan};
pub use verdict::{ValidationStatus, ValidationVerdict};
