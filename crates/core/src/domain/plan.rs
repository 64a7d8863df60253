// Plan Domain Model

use super::error::{DomainError, Result};
use serde::{Deserialize, Serialize};

/// Separator between the ordinal and the action text in the plan artifact
pub const ACTION_SEPARATOR: &str = ": ";

/// One ground action application, e.g. `(move a b)`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionInstance {
    pub name: String,
    pub parameters: Vec<String>,
}

impl ActionInstance {
    pub fn new<I, S>(name: impl Into<String>, parameters: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            name: name.into(),
            parameters: parameters.into_iter().map(Into::into).collect(),
        }
    }

    /// Parse `(name arg1 arg2 ...)`; the surrounding parentheses are optional
    pub fn parse(text: &str) -> Result<Self> {
        let trimmed = text.trim();
        let inner = match (trimmed.strip_prefix('('), trimmed.strip_suffix(')')) {
            (Some(_), Some(_)) => &trimmed[1..trimmed.len() - 1],
            (None, None) => trimmed,
            _ => return Err(DomainError::MalformedAction(text.to_string())),
        };
        if inner.contains(['(', ')']) {
            return Err(DomainError::MalformedAction(text.to_string()));
        }

        let mut tokens = inner.split_whitespace();
        let name = tokens
            .next()
            .ok_or_else(|| DomainError::MalformedAction(text.to_string()))?;
        Ok(Self::new(name, tokens))
    }
}

impl std::fmt::Display for ActionInstance {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}", self.name)?;
        for parameter in &self.parameters {
            write!(f, " {}", parameter)?;
        }
        write!(f, ")")
    }
}

/// Totally ordered sequence of actions
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SequentialPlan {
    actions: Vec<ActionInstance>,
}

impl SequentialPlan {
    pub fn new(actions: Vec<ActionInstance>) -> Self {
        Self { actions }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn actions(&self) -> &[ActionInstance] {
        &self.actions
    }

    pub fn len(&self) -> usize {
        self.actions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }
}

/// Extract the action texts from a plan artifact, in file order
///
/// Each line is trimmed and split on the first `": "`; only the text after
/// it is kept. Blank lines are skipped. A line without the separator is a
/// malformed artifact.
pub fn extract_action_texts(artifact: &str) -> Result<Vec<String>> {
    artifact
        .lines()
        .enumerate()
        .map(|(index, line)| (index + 1, line.trim()))
        .filter(|(_, line)| !line.is_empty())
        .map(|(line_no, line)| {
            line.split_once(ACTION_SEPARATOR)
                .map(|(_, action)| action.to_string())
                .ok_or_else(|| DomainError::MalformedArtifactLine {
                    line: line_no,
                    content: line.to_string(),
                })
        })
        .collect()
}

/// Newline-joined action texts, as handed to the plan parser
pub fn action_block(artifact: &str) -> Result<String> {
    Ok(extract_action_texts(artifact)?.join("\n"))
}
