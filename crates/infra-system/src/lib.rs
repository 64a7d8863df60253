// Patty Infrastructure - System Adapters
// Implements: SolverProcess, ProblemWriter, PlanParser, PlanValidator

pub mod action_parser;
pub mod command_validator;
pub mod output_streamer;
pub mod pddl;
pub mod subprocess_solver;

pub use action_parser::ActionPlanParser;
pub use command_validator::CommandPlanValidator;
pub use output_streamer::{stream_output, LineSink, MemorySink, StdoutSink};
pub use pddl::{PddlFileWriter, PddlTask};
pub use subprocess_solver::{ProcessRunner, SolverHandle, SubprocessSolver};
