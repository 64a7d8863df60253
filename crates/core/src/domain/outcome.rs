// Plan generation outcome (the single value returned per invocation)

use super::plan::SequentialPlan;
use serde::{Deserialize, Serialize};

/// Log message attached to the outcome when the solver times out
pub const TIMEOUT_MESSAGE: &str = "Planner timed out.";

/// Warning attached when a nominally solved plan fails validation
pub const VALIDATION_FAILED_MESSAGE: &str = "Plan validation failed - the plan may not be correct";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LogLevel {
    Debug,
    Info,
    Warning,
    Error,
}

impl std::fmt::Display for LogLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LogLevel::Debug => write!(f, "DEBUG"),
            LogLevel::Info => write!(f, "INFO"),
            LogLevel::Warning => write!(f, "WARNING"),
            LogLevel::Error => write!(f, "ERROR"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogMessage {
    pub level: LogLevel,
    pub message: String,
}

impl LogMessage {
    pub fn new(level: LogLevel, message: impl Into<String>) -> Self {
        Self {
            level,
            message: message.into(),
        }
    }

    pub fn info(message: impl Into<String>) -> Self {
        Self::new(LogLevel::Info, message)
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Self::new(LogLevel::Warning, message)
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self::new(LogLevel::Error, message)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PlanGenerationStatus {
    SolvedSatisficing,
    Timeout,
    InternalError,
}

impl std::fmt::Display for PlanGenerationStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PlanGenerationStatus::SolvedSatisficing => write!(f, "SOLVED_SATISFICING"),
            PlanGenerationStatus::Timeout => write!(f, "TIMEOUT"),
            PlanGenerationStatus::InternalError => write!(f, "INTERNAL_ERROR"),
        }
    }
}

/// Outcome of one solver invocation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlanOutcome {
    pub status: PlanGenerationStatus,
    pub plan: Option<SequentialPlan>,
    pub engine_name: String,
    pub log_messages: Vec<LogMessage>,
}

impl PlanOutcome {
    pub fn solved(engine_name: impl Into<String>, plan: SequentialPlan) -> Self {
        Self {
            status: PlanGenerationStatus::SolvedSatisficing,
            plan: Some(plan),
            engine_name: engine_name.into(),
            log_messages: Vec::new(),
        }
    }

    pub fn timed_out(engine_name: impl Into<String>) -> Self {
        Self {
            status: PlanGenerationStatus::Timeout,
            plan: None,
            engine_name: engine_name.into(),
            log_messages: vec![LogMessage::info(TIMEOUT_MESSAGE)],
        }
    }

    pub fn internal_error(engine_name: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            status: PlanGenerationStatus::InternalError,
            plan: None,
            engine_name: engine_name.into(),
            log_messages: vec![LogMessage::error(message)],
        }
    }

    /// Fold the validation result into a solved outcome
    ///
    /// An invalid plan keeps the status but is replaced by an empty plan
    /// plus one warning.
    pub fn apply_validation(mut self, plan_is_valid: bool) -> Self {
        if !plan_is_valid {
            self.plan = Some(SequentialPlan::empty());
            self.log_messages
                .push(LogMessage::warning(VALIDATION_FAILED_MESSAGE));
        }
        self
    }

    pub fn is_solved(&self) -> bool {
        self.status == PlanGenerationStatus::SolvedSatisficing
    }
}
