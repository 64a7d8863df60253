// Patty planner - one-shot solve use case
//
// Running -> {Completed, TimedOut} -> {Solved, InternalError}

use super::constants::*;
use crate::domain::{
    abnormal_exit_message, action_block, EngineCredits, InvocationSpec, PlanOutcome,
    SequentialPlan, SolverCommand, SolverOptions, PATTY_CREDITS,
};
use crate::error::{AppError, Result};
use crate::port::id_provider::UuidProvider;
use crate::port::time_provider::SystemTimeProvider;
use crate::port::{
    IdProvider, PlanParser, PlanValidator, ProblemWriter, ProcessCompletion, SolverProcess,
    TimeProvider,
};
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info, info_span, warn, Instrument};

/// One-shot planner wrapping the external Patty solver
///
/// Every call to [`PattyPlanner::solve`] produces exactly one
/// [`PlanOutcome`]; failures of the solver or of any collaborator are
/// folded into an `INTERNAL_ERROR` outcome instead of being returned.
pub struct PattyPlanner<P: Sync> {
    solver: SolverCommand,
    options: SolverOptions,
    process: Arc<dyn SolverProcess>,
    writer: Arc<dyn ProblemWriter<P>>,
    parser: Arc<dyn PlanParser<P>>,
    validator: Arc<dyn PlanValidator<P>>,
    time_provider: Arc<dyn TimeProvider>,
    id_provider: Arc<dyn IdProvider>,
}

impl<P: Send + Sync> PattyPlanner<P> {
    /// Create a new planner
    ///
    /// # Arguments
    /// * `solver` - How to launch the solver binary
    /// * `options` - Extra solver flags; `--save-plan` selects the artifact path
    /// * `process` - Runs the solver process
    /// * `writer` / `parser` / `validator` - Problem collaborators
    pub fn new(
        solver: SolverCommand,
        options: SolverOptions,
        process: Arc<dyn SolverProcess>,
        writer: Arc<dyn ProblemWriter<P>>,
        parser: Arc<dyn PlanParser<P>>,
        validator: Arc<dyn PlanValidator<P>>,
    ) -> Self {
        Self {
            solver,
            options,
            process,
            writer,
            parser,
            validator,
            time_provider: Arc::new(SystemTimeProvider),
            id_provider: Arc::new(UuidProvider),
        }
    }

    pub fn with_time_provider(mut self, time_provider: Arc<dyn TimeProvider>) -> Self {
        self.time_provider = time_provider;
        self
    }

    pub fn with_id_provider(mut self, id_provider: Arc<dyn IdProvider>) -> Self {
        self.id_provider = id_provider;
        self
    }

    pub fn name(&self) -> &'static str {
        ENGINE_NAME
    }

    pub fn credits(&self) -> &'static EngineCredits {
        &PATTY_CREDITS
    }

    pub fn options(&self) -> &SolverOptions {
        &self.options
    }

    /// Solve `problem`, killing the solver if it runs longer than `timeout`
    pub async fn solve(&self, problem: &P, timeout: Option<Duration>) -> PlanOutcome {
        let invocation_id = self.id_provider.generate_id();
        let span = info_span!("solve", invocation_id = %invocation_id, engine = ENGINE_NAME);

        async move {
            let start = self.time_provider.now_millis();
            let outcome = match self.try_solve(problem, timeout).await {
                Ok(outcome) => outcome,
                Err(e) => {
                    error!(error = %e, "An error occurred");
                    PlanOutcome::internal_error(ENGINE_NAME, e.to_string())
                }
            };

            info!(
                status = %outcome.status,
                actions = ?outcome.plan.as_ref().map(SequentialPlan::len),
                duration_ms = self.time_provider.now_millis() - start,
                "Solver invocation finished"
            );
            outcome
        }
        .instrument(span)
        .await
    }

    /// Fallible body of `solve`; the scratch directory lives exactly as long
    /// as this call
    async fn try_solve(&self, problem: &P, timeout: Option<Duration>) -> Result<PlanOutcome> {
        let workdir = tempfile::Builder::new().prefix(WORKDIR_PREFIX).tempdir()?;

        let domain_file = workdir.path().join(DOMAIN_FILE_NAME);
        let problem_file = workdir.path().join(PROBLEM_FILE_NAME);
        self.writer.write_domain(problem, &domain_file)?;
        self.writer.write_problem(problem, &problem_file)?;

        let spec = InvocationSpec::new(
            &self.solver,
            domain_file,
            problem_file,
            &self.options,
            &workdir.path().join(DEFAULT_ARTIFACT_NAME),
        );

        info!(command = ?spec.command_line(), timeout = ?timeout, "Launching solver");
        let report = self.process.run(&spec, timeout).await?;

        let exit_code = match report.completion {
            ProcessCompletion::TimedOut => {
                warn!(pid = ?report.pid, duration_ms = report.duration_ms, "Planner timed out.");
                return Ok(PlanOutcome::timed_out(ENGINE_NAME));
            }
            ProcessCompletion::Exited(code) => code,
        };

        if !exit_code.is_success() {
            let message = abnormal_exit_message(exit_code);
            error!(exit_code = exit_code.raw(), pid = ?report.pid, "{}", message);
            return Ok(PlanOutcome::internal_error(ENGINE_NAME, message));
        }

        let plan = self.read_plan(problem, &spec.artifact_path).await?;
        let plan_is_valid = self.validate_plan(problem, &plan).await;

        Ok(PlanOutcome::solved(ENGINE_NAME, plan).apply_validation(plan_is_valid))
    }

    /// Read the artifact and hand its action texts to the plan parser
    async fn read_plan(&self, problem: &P, artifact_path: &Path) -> Result<SequentialPlan> {
        let artifact = tokio::fs::read_to_string(artifact_path)
            .await
            .map_err(|source| AppError::Artifact {
                path: artifact_path.to_path_buf(),
                source,
            })?;

        let actions = action_block(&artifact)?;
        Ok(self.parser.parse_plan(problem, &actions)?)
    }

    /// Any validator failure counts as an invalid plan
    async fn validate_plan(&self, problem: &P, plan: &SequentialPlan) -> bool {
        match self.validator.validate(problem, plan).await {
            Ok(verdict) if verdict.is_valid() => {
                info!(
                    actions = plan.len(),
                    "Plan validation: VALID. The plan is correct and executable."
                );
                true
            }
            Ok(verdict) => {
                warn!(status = %verdict.status, "Plan validation: {}", verdict.status);
                if verdict.log_messages.is_empty() {
                    warn!("No detailed validation messages available.");
                }
                for log_msg in &verdict.log_messages {
                    warn!(level = %log_msg.level, "Validation message: {}", log_msg.message);
                }
                false
            }
            Err(e) => {
                warn!(error = %e, "Plan validation failed with error");
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{
        ActionInstance, LogLevel, LogMessage, PlanGenerationStatus, ValidationVerdict,
        SAVE_PLAN_FLAG, TIMEOUT_MESSAGE, VALIDATION_FAILED_MESSAGE,
    };
    use crate::port::id_provider::SequentialIdProvider;
    use crate::port::plan_parser::mocks::MockPlanParser;
    use crate::port::plan_validator::mocks::{MockPlanValidator, MockVerdict};
    use crate::port::problem_writer::mocks::MockProblemWriter;
    use crate::port::solver_process::mocks::{MockBehavior, MockSolverProcess};
    use crate::port::time_provider::FixedTimeProvider;

    struct TestProblem;

    const SCENARIO_ARTIFACT: &str = "0: (move a b)\n1: (move b c)";

    fn planner_with(
        process: Arc<MockSolverProcess>,
        validator: Arc<MockPlanValidator>,
        options: SolverOptions,
    ) -> PattyPlanner<TestProblem> {
        PattyPlanner::new(
            SolverCommand::new("/opt/patty/main.py").with_interpreter("python"),
            options,
            process,
            Arc::new(MockProblemWriter::new()),
            Arc::new(MockPlanParser),
            validator,
        )
        .with_time_provider(Arc::new(FixedTimeProvider(1_000)))
        .with_id_provider(Arc::new(SequentialIdProvider::new("test")))
    }

    fn scenario_plan() -> SequentialPlan {
        SequentialPlan::new(vec![
            ActionInstance::new("move", ["a", "b"]),
            ActionInstance::new("move", ["b", "c"]),
        ])
    }

    #[tokio::test]
    async fn test_solved_with_valid_plan() {
        let process = Arc::new(MockSolverProcess::new_solved(SCENARIO_ARTIFACT));
        let validator = Arc::new(MockPlanValidator::new_valid());
        let planner = planner_with(process, validator.clone(), SolverOptions::new());

        let outcome = planner.solve(&TestProblem, Some(Duration::from_secs(5))).await;

        assert_eq!(outcome.status, PlanGenerationStatus::SolvedSatisficing);
        assert_eq!(outcome.plan, Some(scenario_plan()));
        assert!(outcome.log_messages.is_empty());
        assert_eq!(outcome.engine_name, "patty");
        assert_eq!(validator.seen_plans(), vec![scenario_plan()]);
    }

    #[tokio::test]
    async fn test_invalid_plan_is_replaced_by_empty_plan() {
        let process = Arc::new(MockSolverProcess::new_solved(SCENARIO_ARTIFACT));
        let validator = Arc::new(MockPlanValidator::new(MockVerdict::Verdict(
            ValidationVerdict::invalid(vec![LogMessage::error("precondition violated")]),
        )));
        let planner = planner_with(process, validator, SolverOptions::new());

        let outcome = planner.solve(&TestProblem, None).await;

        assert_eq!(outcome.status, PlanGenerationStatus::SolvedSatisficing);
        assert_eq!(outcome.plan, Some(SequentialPlan::empty()));
        assert_eq!(
            outcome.log_messages,
            vec![LogMessage::warning(VALIDATION_FAILED_MESSAGE)]
        );
    }

    #[tokio::test]
    async fn test_validator_failure_is_soft() {
        let process = Arc::new(MockSolverProcess::new_solved(SCENARIO_ARTIFACT));
        let validator = Arc::new(MockPlanValidator::new_failing("validator not installed"));
        let planner = planner_with(process, validator, SolverOptions::new());

        let outcome = planner.solve(&TestProblem, None).await;

        assert!(outcome.is_solved());
        assert_eq!(outcome.plan, Some(SequentialPlan::empty()));
        assert_eq!(outcome.log_messages.len(), 1);
        assert_eq!(outcome.log_messages[0].level, LogLevel::Warning);
    }

    #[tokio::test]
    async fn test_non_zero_exit_is_internal_error() {
        for code in [1, 2, 3, 137] {
            let process = Arc::new(MockSolverProcess::new_exit(code));
            let validator = Arc::new(MockPlanValidator::new_valid());
            let planner = planner_with(process, validator.clone(), SolverOptions::new());

            let outcome = planner.solve(&TestProblem, None).await;

            assert_eq!(outcome.status, PlanGenerationStatus::InternalError);
            assert!(outcome.plan.is_none());
            assert_eq!(outcome.log_messages.len(), 1);
            assert_eq!(outcome.log_messages[0].level, LogLevel::Error);
            assert!(outcome.log_messages[0].message.contains(&code.to_string()));
            assert!(!outcome.log_messages[0].message.contains("SIGSEGV"));
            assert!(validator.seen_plans().is_empty());
        }
    }

    #[tokio::test]
    async fn test_segfault_is_annotated() {
        let process = Arc::new(MockSolverProcess::new(MockBehavior::Signal(11)));
        let planner = planner_with(
            process,
            Arc::new(MockPlanValidator::new_valid()),
            SolverOptions::new(),
        );

        let outcome = planner.solve(&TestProblem, None).await;

        assert_eq!(outcome.status, PlanGenerationStatus::InternalError);
        let message = &outcome.log_messages[0].message;
        assert!(message.contains("-11"));
        assert!(message.contains("segmentation fault (SIGSEGV)"));
    }

    #[tokio::test]
    async fn test_timeout_outcome() {
        let process = Arc::new(MockSolverProcess::new(MockBehavior::Timeout));
        let planner = planner_with(
            process,
            Arc::new(MockPlanValidator::new_valid()),
            SolverOptions::new(),
        );

        let outcome = planner
            .solve(&TestProblem, Some(Duration::from_millis(50)))
            .await;

        assert_eq!(outcome.status, PlanGenerationStatus::Timeout);
        assert!(outcome.plan.is_none());
        assert_eq!(outcome.log_messages, vec![LogMessage::info(TIMEOUT_MESSAGE)]);
    }

    #[tokio::test]
    async fn test_launch_failure_is_internal_error() {
        let process = Arc::new(MockSolverProcess::new(MockBehavior::SpawnFail(
            "No such file or directory".to_string(),
        )));
        let planner = planner_with(
            process,
            Arc::new(MockPlanValidator::new_valid()),
            SolverOptions::new(),
        );

        let outcome = planner.solve(&TestProblem, None).await;

        assert_eq!(outcome.status, PlanGenerationStatus::InternalError);
        assert!(outcome.log_messages[0]
            .message
            .contains("No such file or directory"));
    }

    #[tokio::test]
    async fn test_writer_failure_skips_solver() {
        let process = Arc::new(MockSolverProcess::new_solved(SCENARIO_ARTIFACT));
        let planner: PattyPlanner<TestProblem> = PattyPlanner::new(
            SolverCommand::default(),
            SolverOptions::new(),
            process.clone(),
            Arc::new(MockProblemWriter::new_failing("unsupported fluent")),
            Arc::new(MockPlanParser),
            Arc::new(MockPlanValidator::new_valid()),
        );

        let outcome = planner.solve(&TestProblem, None).await;

        assert_eq!(outcome.status, PlanGenerationStatus::InternalError);
        assert!(outcome.log_messages[0].message.contains("unsupported fluent"));
        assert_eq!(process.call_count(), 0);
    }

    #[tokio::test]
    async fn test_missing_artifact_is_internal_error() {
        let process = Arc::new(MockSolverProcess::new_exit(0));
        let planner = planner_with(
            process,
            Arc::new(MockPlanValidator::new_valid()),
            SolverOptions::new(),
        );

        let outcome = planner.solve(&TestProblem, None).await;

        assert_eq!(outcome.status, PlanGenerationStatus::InternalError);
        assert!(outcome.log_messages[0]
            .message
            .contains("Failed to read plan artifact"));
    }

    #[tokio::test]
    async fn test_malformed_artifact_is_internal_error() {
        let process = Arc::new(MockSolverProcess::new_solved("(move a b)\n"));
        let planner = planner_with(
            process,
            Arc::new(MockPlanValidator::new_valid()),
            SolverOptions::new(),
        );

        let outcome = planner.solve(&TestProblem, None).await;

        assert_eq!(outcome.status, PlanGenerationStatus::InternalError);
        assert!(outcome.log_messages[0].message.contains("line 1"));
    }

    #[tokio::test]
    async fn test_unparseable_action_is_internal_error() {
        let process = Arc::new(MockSolverProcess::new_solved("0: (move a b\n"));
        let planner = planner_with(
            process,
            Arc::new(MockPlanValidator::new_valid()),
            SolverOptions::new(),
        );

        let outcome = planner.solve(&TestProblem, None).await;

        assert_eq!(outcome.status, PlanGenerationStatus::InternalError);
        assert!(outcome.log_messages[0].message.starts_with("Plan parser failed"));
    }

    #[tokio::test]
    async fn test_save_plan_option_is_honoured_on_every_call() {
        let out_dir = tempfile::tempdir().unwrap();
        let artifact = out_dir.path().join("kept.plan");
        let options = SolverOptions::new()
            .with("--solver", "z3")
            .with(SAVE_PLAN_FLAG, artifact.to_string_lossy());

        let process = Arc::new(MockSolverProcess::new_solved(SCENARIO_ARTIFACT));
        let planner = planner_with(
            process.clone(),
            Arc::new(MockPlanValidator::new_valid()),
            options,
        );

        for _ in 0..2 {
            let outcome = planner.solve(&TestProblem, None).await;
            assert!(outcome.is_solved());
        }

        for spec in process.invocations() {
            assert_eq!(spec.artifact_path, artifact);
            assert_eq!(
                spec.extra_flags,
                vec![("--solver".to_string(), "z3".to_string())]
            );
        }
        // caller-chosen artifacts outlive the invocation
        assert!(artifact.exists());
    }

    #[tokio::test]
    async fn test_scratch_directory_removed_on_every_path() {
        let behaviors = [
            MockBehavior::Exit {
                code: 0,
                artifact: Some(SCENARIO_ARTIFACT.to_string()),
            },
            MockBehavior::Exit {
                code: 1,
                artifact: None,
            },
            MockBehavior::Timeout,
        ];

        for behavior in behaviors {
            let process = Arc::new(MockSolverProcess::new(behavior));
            let planner = planner_with(
                process.clone(),
                Arc::new(MockPlanValidator::new_valid()),
                SolverOptions::new(),
            );
            planner.solve(&TestProblem, None).await;

            let spec = &process.invocations()[0];
            let workdir = spec.domain_file.parent().unwrap();
            assert!(!workdir.exists(), "{} was not cleaned up", workdir.display());
        }
    }

    #[test]
    fn test_engine_identity() {
        let planner = planner_with(
            Arc::new(MockSolverProcess::new_exit(0)),
            Arc::new(MockPlanValidator::new_valid()),
            SolverOptions::new(),
        );
        assert_eq!(planner.name(), "patty");
        assert_eq!(planner.credits().license, "MIT");
    }
}
