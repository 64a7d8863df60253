// Planner constants (No magic values)
use std::time::Duration;

/// Engine name reported on every outcome
pub const ENGINE_NAME: &str = "patty";

/// Prefix of the invocation-scoped scratch directory
pub const WORKDIR_PREFIX: &str = "patty-";

/// Generated domain file inside the scratch directory
pub const DOMAIN_FILE_NAME: &str = "domain.pddl";

/// Generated problem file inside the scratch directory
pub const PROBLEM_FILE_NAME: &str = "problem.pddl";

/// Artifact file used when the caller does not pass `--save-plan`
pub const DEFAULT_ARTIFACT_NAME: &str = "plan.dump";

/// Prefix prepended to every echoed stderr line of the solver
pub const ERROR_STREAM_PREFIX: &str = "ERROR: ";

/// Bounded wait for the output drainers after the solver finished (1s)
pub const STREAM_JOIN_GRACE: Duration = Duration::from_secs(1);
