// External plan validator (VAL `Validate` or compatible)
//
// Invoked as `<program> [args...] <domain> <problem> <plan>`.

use async_trait::async_trait;
use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command;
use tracing::{debug, info};

use patty_core::domain::{LogMessage, SequentialPlan, ValidationStatus, ValidationVerdict};
use patty_core::port::{CollaboratorError, PlanValidator};

use crate::pddl::PddlTask;

/// Marker printed by VAL for an executable, goal-reaching plan
const PLAN_VALID_MARKER: &str = "Plan valid";

/// Markers printed by VAL for a rejected plan
const PLAN_INVALID_MARKERS: [&str; 3] = ["Plan failed", "Plan invalid", "Bad plan"];

pub struct CommandPlanValidator {
    program: String,
    args: Vec<String>,
    timeout: Duration,
}

impl CommandPlanValidator {
    pub fn new(program: impl Into<String>, args: Vec<String>, timeout: Duration) -> Self {
        Self {
            program: program.into(),
            args,
            timeout,
        }
    }

    fn verdict_from(success: bool, stdout: &str, stderr: &str) -> ValidationVerdict {
        let status = if success && stdout.contains(PLAN_VALID_MARKER) {
            ValidationStatus::Valid
        } else if PLAN_INVALID_MARKERS
            .iter()
            .any(|marker| stdout.contains(marker) || stderr.contains(marker))
        {
            ValidationStatus::Invalid
        } else {
            ValidationStatus::Unknown
        };

        let log_messages = stdout
            .lines()
            .map(|line| (line.trim(), false))
            .chain(stderr.lines().map(|line| (line.trim(), true)))
            .filter(|(line, _)| !line.is_empty())
            .map(|(line, from_stderr)| {
                if from_stderr {
                    LogMessage::warning(line)
                } else {
                    LogMessage::info(line)
                }
            })
            .collect();

        ValidationVerdict::new(status, log_messages)
    }
}

#[async_trait]
impl PlanValidator<PddlTask> for CommandPlanValidator {
    async fn validate(
        &self,
        problem: &PddlTask,
        plan: &SequentialPlan,
    ) -> Result<ValidationVerdict, CollaboratorError> {
        let workdir = tempfile::Builder::new().prefix("patty-val-").tempdir()?;
        let domain_file = workdir.path().join("domain.pddl");
        let problem_file = workdir.path().join("problem.pddl");
        let plan_file = workdir.path().join("plan.txt");

        let plan_text: String = plan
            .actions()
            .iter()
            .map(|action| format!("{}\n", action))
            .collect();
        tokio::fs::write(&domain_file, problem.domain()).await?;
        tokio::fs::write(&problem_file, problem.problem()).await?;
        tokio::fs::write(&plan_file, plan_text).await?;

        debug!(program = %self.program, actions = plan.len(), "Running plan validator");

        let output = Command::new(&self.program)
            .args(&self.args)
            .arg(&domain_file)
            .arg(&problem_file)
            .arg(&plan_file)
            .stdin(Stdio::null())
            .kill_on_drop(true)
            .output();

        let output = tokio::time::timeout(self.timeout, output)
            .await
            .map_err(|_| {
                CollaboratorError::Validator(format!(
                    "'{}' timed out after {}ms",
                    self.program,
                    self.timeout.as_millis()
                ))
            })?
            .map_err(|e| {
                CollaboratorError::Validator(format!("failed to run '{}': {}", self.program, e))
            })?;

        let stdout = String::from_utf8_lossy(&output.stdout);
        let stderr = String::from_utf8_lossy(&output.stderr);
        let verdict = Self::verdict_from(output.status.success(), &stdout, &stderr);

        info!(
            program = %self.program,
            exit_code = ?output.status.code(),
            status = %verdict.status,
            "Plan validator finished"
        );

        Ok(verdict)
    }
}
