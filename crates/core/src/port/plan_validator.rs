// Plan Validator Port
// Opaque external judge of plan correctness

use super::collaborator::CollaboratorError;
use crate::domain::{SequentialPlan, ValidationVerdict};
use async_trait::async_trait;

#[async_trait]
pub trait PlanValidator<P: Sync>: Send + Sync {
    /// Check `plan` against the original (non-grounded) `problem`
    ///
    /// # Errors
    /// CollaboratorError::Validator if the validator itself could not run.
    /// An incorrect plan is a verdict, not an error.
    async fn validate(
        &self,
        problem: &P,
        plan: &SequentialPlan,
    ) -> Result<ValidationVerdict, CollaboratorError>;
}

// ============================================================================
// Mock Implementations for Testing
// ============================================================================

pub mod mocks {
    use super::*;
    use std::sync::{Arc, Mutex};

    #[derive(Debug, Clone)]
    pub enum MockVerdict {
        Verdict(ValidationVerdict),
        Fail(String),
    }

    /// Returns a scripted verdict and records the plans it saw
    pub struct MockPlanValidator {
        verdict: MockVerdict,
        seen: Arc<Mutex<Vec<SequentialPlan>>>,
    }

    impl MockPlanValidator {
        pub fn new(verdict: MockVerdict) -> Self {
            Self {
                verdict,
                seen: Arc::new(Mutex::new(Vec::new())),
            }
        }

        pub fn new_valid() -> Self {
            Self::new(MockVerdict::Verdict(ValidationVerdict::valid()))
        }

        pub fn new_failing(message: impl Into<String>) -> Self {
            Self::new(MockVerdict::Fail(message.into()))
        }

        pub fn seen_plans(&self) -> Vec<SequentialPlan> {
            self.seen.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl<P: Sync> PlanValidator<P> for MockPlanValidator {
        async fn validate(
            &self,
            _problem: &P,
            plan: &SequentialPlan,
        ) -> Result<ValidationVerdict, CollaboratorError> {
            self.seen.lock().unwrap().push(plan.clone());
            match &self.verdict {
                MockVerdict::Verdict(verdict) => Ok(verdict.clone()),
                MockVerdict::Fail(message) => Err(CollaboratorError::Validator(message.clone())),
            }
        }
    }
}
