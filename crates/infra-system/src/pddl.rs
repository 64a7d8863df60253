// PDDL problem handle and file writer
//
// The adapter never builds PDDL itself; a PddlTask carries domain and
// problem text produced elsewhere.

use std::path::Path;

use patty_core::port::{CollaboratorError, ProblemWriter};

const ACTION_KEYWORD: &str = "(:action";

/// Domain and problem text of one planning task
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PddlTask {
    domain: String,
    problem: String,
}

impl PddlTask {
    pub fn new(domain: impl Into<String>, problem: impl Into<String>) -> Self {
        Self {
            domain: domain.into(),
            problem: problem.into(),
        }
    }

    pub fn from_files(domain: &Path, problem: &Path) -> std::io::Result<Self> {
        Ok(Self::new(
            std::fs::read_to_string(domain)?,
            std::fs::read_to_string(problem)?,
        ))
    }

    pub fn domain(&self) -> &str {
        &self.domain
    }

    pub fn problem(&self) -> &str {
        &self.problem
    }

    /// Lowercased names of the `(:action ...)` schemas in the domain
    pub fn declared_actions(&self) -> Vec<String> {
        let lower = self.domain.to_lowercase();
        lower
            .match_indices(ACTION_KEYWORD)
            .filter_map(|(start, _)| {
                let rest = &lower[start + ACTION_KEYWORD.len()..];
                // `(:action-costs` and friends are not schemas
                if !rest.starts_with(char::is_whitespace) {
                    return None;
                }
                rest.split(|c: char| c.is_whitespace() || c == '(' || c == ')')
                    .find(|token| !token.is_empty())
                    .map(str::to_string)
            })
            .collect()
    }
}

/// Writes the task's text verbatim to the solver input files
#[derive(Default)]
pub struct PddlFileWriter;

impl PddlFileWriter {
    fn write(path: &Path, contents: &str) -> Result<(), CollaboratorError> {
        std::fs::write(path, contents)
            .map_err(|e| CollaboratorError::Writer(format!("{}: {}", path.display(), e)))
    }
}

impl ProblemWriter<PddlTask> for PddlFileWriter {
    fn write_domain(&self, problem: &PddlTask, path: &Path) -> Result<(), CollaboratorError> {
        Self::write(path, problem.domain())
    }

    fn write_problem(&self, problem: &PddlTask, path: &Path) -> Result<(), CollaboratorError> {
        Self::write(path, problem.problem())
    }
}
