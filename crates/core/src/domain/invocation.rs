// Solver invocation model
//
// Caller options are resolved once per invocation into an immutable
// InvocationSpec; the options themselves are never mutated.

use serde::{Deserialize, Serialize};
use std::ffi::OsString;
use std::path::{Path, PathBuf};

/// Flag naming the plan artifact path on the solver command line
pub const SAVE_PLAN_FLAG: &str = "--save-plan";

/// How to launch the solver binary
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SolverCommand {
    /// Optional program placed before the executable (e.g. `python`)
    pub interpreter: Option<String>,
    pub executable: PathBuf,
}

impl SolverCommand {
    pub fn new(executable: impl Into<PathBuf>) -> Self {
        Self {
            interpreter: None,
            executable: executable.into(),
        }
    }

    pub fn with_interpreter(mut self, interpreter: impl Into<String>) -> Self {
        self.interpreter = Some(interpreter.into());
        self
    }
}

impl Default for SolverCommand {
    fn default() -> Self {
        Self::new("patty/main.py").with_interpreter("python")
    }
}

/// Caller-supplied solver flags, kept in insertion order
///
/// Behaves like an ordered map: setting an existing flag replaces its
/// value without moving it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SolverOptions(Vec<(String, String)>);

impl SolverOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        pairs
            .into_iter()
            .fold(Self::new(), |options, (flag, value)| options.with(flag, value))
    }

    pub fn with(mut self, flag: impl Into<String>, value: impl Into<String>) -> Self {
        self.set(flag, value);
        self
    }

    pub fn set(&mut self, flag: impl Into<String>, value: impl Into<String>) {
        let flag = flag.into();
        let value = value.into();
        match self.0.iter_mut().find(|(existing, _)| *existing == flag) {
            Some(entry) => entry.1 = value,
            None => self.0.push((flag, value)),
        }
    }

    pub fn get(&self, flag: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(existing, _)| existing == flag)
            .map(|(_, value)| value.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Split into the artifact path and the flags forwarded verbatim
    ///
    /// A caller-supplied `--save-plan` wins over `default_artifact` and is
    /// removed from the forwarded flags.
    pub fn resolve(&self, default_artifact: &Path) -> (PathBuf, Vec<(String, String)>) {
        let artifact = self
            .get(SAVE_PLAN_FLAG)
            .map(PathBuf::from)
            .unwrap_or_else(|| default_artifact.to_path_buf());

        let extra_flags = self
            .0
            .iter()
            .filter(|(flag, _)| flag != SAVE_PLAN_FLAG)
            .cloned()
            .collect();

        (artifact, extra_flags)
    }
}

/// Fully resolved command line for one solver run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvocationSpec {
    pub interpreter: Option<String>,
    pub executable: PathBuf,
    pub domain_file: PathBuf,
    pub problem_file: PathBuf,
    pub artifact_path: PathBuf,
    /// Never contains `--save-plan`
    pub extra_flags: Vec<(String, String)>,
}

impl InvocationSpec {
    pub fn new(
        solver: &SolverCommand,
        domain_file: impl Into<PathBuf>,
        problem_file: impl Into<PathBuf>,
        options: &SolverOptions,
        default_artifact: &Path,
    ) -> Self {
        let (artifact_path, extra_flags) = options.resolve(default_artifact);
        Self {
            interpreter: solver.interpreter.clone(),
            executable: solver.executable.clone(),
            domain_file: domain_file.into(),
            problem_file: problem_file.into(),
            artifact_path,
            extra_flags,
        }
    }

    /// Program handed to the OS: the interpreter when set, else the executable
    pub fn program(&self) -> OsString {
        match &self.interpreter {
            Some(interpreter) => OsString::from(interpreter),
            None => self.executable.clone().into_os_string(),
        }
    }

    /// `[<executable>] -o <domain> -f <problem> --save-plan <artifact> [<flag> <value>]...`
    pub fn args(&self) -> Vec<OsString> {
        let mut args = Vec::with_capacity(7 + self.extra_flags.len() * 2);
        if self.interpreter.is_some() {
            args.push(self.executable.clone().into_os_string());
        }
        args.push("-o".into());
        args.push(self.domain_file.clone().into_os_string());
        args.push("-f".into());
        args.push(self.problem_file.clone().into_os_string());
        args.push(SAVE_PLAN_FLAG.into());
        args.push(self.artifact_path.clone().into_os_string());
        for (flag, value) in &self.extra_flags {
            args.push(flag.into());
            args.push(value.into());
        }
        args
    }

    /// Full command line rendered for logs
    pub fn command_line(&self) -> Vec<String> {
        std::iter::once(self.program())
            .chain(self.args())
            .map(|part| part.to_string_lossy().into_owned())
            .collect()
    }
}
