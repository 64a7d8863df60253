// Plan Parser Port
// Binds newline-separated action texts to the original problem

use super::collaborator::CollaboratorError;
use crate::domain::SequentialPlan;

pub trait PlanParser<P>: Send + Sync {
    /// Parse one action per line of `actions` against `problem`
    fn parse_plan(&self, problem: &P, actions: &str) -> Result<SequentialPlan, CollaboratorError>;
}

// ============================================================================
// Mock Implementations for Testing
// ============================================================================

pub mod mocks {
    use super::*;
    use crate::domain::ActionInstance;

    /// Parses each line with `ActionInstance::parse`, ignoring the problem
    #[derive(Default)]
    pub struct MockPlanParser;

    impl<P> PlanParser<P> for MockPlanParser {
        fn parse_plan(
            &self,
            _problem: &P,
            actions: &str,
        ) -> Result<SequentialPlan, CollaboratorError> {
            actions
                .lines()
                .map(|line| {
                    ActionInstance::parse(line)
                        .map_err(|e| CollaboratorError::Parser(e.to_string()))
                })
                .collect::<Result<Vec<_>, _>>()
                .map(SequentialPlan::new)
        }
    }
}
