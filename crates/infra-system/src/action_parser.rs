// Plan parser bound to a PDDL task

use patty_core::domain::{ActionInstance, SequentialPlan};
use patty_core::port::{CollaboratorError, PlanParser};

use crate::pddl::PddlTask;

/// Parses `(name arg...)` lines and checks each name against the domain
///
/// PDDL names are case-insensitive, so actions are normalized to
/// lowercase. A domain that declares no actions disables the check.
#[derive(Default)]
pub struct ActionPlanParser;

impl PlanParser<PddlTask> for ActionPlanParser {
    fn parse_plan(
        &self,
        problem: &PddlTask,
        actions: &str,
    ) -> Result<SequentialPlan, CollaboratorError> {
        let declared = problem.declared_actions();

        actions
            .lines()
            .filter(|line| !line.trim().is_empty())
            .map(|line| {
                let parsed = ActionInstance::parse(line)
                    .map_err(|e| CollaboratorError::Parser(e.to_string()))?;
                let action = ActionInstance::new(
                    parsed.name.to_lowercase(),
                    parsed.parameters.iter().map(|p| p.to_lowercase()),
                );
                if !declared.is_empty() && !declared.contains(&action.name) {
                    return Err(CollaboratorError::Parser(format!(
                        "action '{}' is not declared in the domain",
                        action.name
                    )));
                }
                Ok(action)
            })
            .collect::<Result<Vec<_>, _>>()
            .map(SequentialPlan::new)
    }
}
