// Plan validation verdict

use super::outcome::LogMessage;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ValidationStatus {
    Valid,
    Invalid,
    Unknown,
}

impl std::fmt::Display for ValidationStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ValidationStatus::Valid => write!(f, "VALID"),
            ValidationStatus::Invalid => write!(f, "INVALID"),
            ValidationStatus::Unknown => write!(f, "UNKNOWN"),
        }
    }
}

/// Result reported by the external plan validator
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationVerdict {
    pub status: ValidationStatus,
    pub log_messages: Vec<LogMessage>,
}

impl ValidationVerdict {
    pub fn new(status: ValidationStatus, log_messages: Vec<LogMessage>) -> Self {
        Self {
            status,
            log_messages,
        }
    }

    pub fn valid() -> Self {
        Self::new(ValidationStatus::Valid, Vec::new())
    }

    pub fn invalid(log_messages: Vec<LogMessage>) -> Self {
        Self::new(ValidationStatus::Invalid, log_messages)
    }

    pub fn is_valid(&self) -> bool {
        self.status == ValidationStatus::Valid
    }
}
