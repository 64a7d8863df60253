// Application Layer - Solver invocation use case

pub mod constants;
pub mod planner;

// Re-exports
pub use planner::PattyPlanner;
