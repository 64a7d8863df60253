// Port Layer - Interfaces for external dependencies

pub mod collaborator;
pub mod id_provider; // For deterministic testing
pub mod plan_parser;
pub mod plan_validator;
pub mod problem_writer;
pub mod solver_process;
pub mod time_provider;

// Re-exports
pub use collaborator::CollaboratorError;
pub use id_provider::IdProvider;
pub use plan_parser::PlanParser;
pub use plan_validator::PlanValidator;
pub use problem_writer::ProblemWriter;
pub use solver_process::{ExecutionError, ProcessCompletion, ProcessReport, SolverProcess};
pub use time_provider::TimeProvider;
