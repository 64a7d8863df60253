// Settings for patty-solve
//
// Precedence (lowest first): built-in defaults, config file, PATTY_* env.
// Command-line flags are applied on top by main.

use anyhow::{bail, Context, Result};
use config::{Config, Environment, File};
use directories::ProjectDirs;
use patty_core::domain::{SolverCommand, SolverOptions};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

const ENV_PREFIX: &str = "PATTY";
const CONFIG_FILE_NAME: &str = "config.toml";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlannerSettings {
    pub solver: SolverSettings,
    pub validator: ValidatorSettings,
    /// Solver deadline in seconds; unset waits indefinitely
    pub timeout_secs: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SolverSettings {
    pub interpreter: Option<String>,
    pub executable: PathBuf,
    /// Flags passed to every run, in order
    pub args: Vec<SolverArg>,
}

impl Default for SolverSettings {
    fn default() -> Self {
        let command = SolverCommand::default();
        Self {
            interpreter: command.interpreter,
            executable: command.executable,
            args: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SolverArg {
    pub flag: String,
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ValidatorSettings {
    pub program: String,
    pub args: Vec<String>,
    pub timeout_secs: u64,
}

impl Default for ValidatorSettings {
    fn default() -> Self {
        Self {
            program: "Validate".to_string(),
            args: vec!["-v".to_string()],
            timeout_secs: 60,
        }
    }
}

impl PlannerSettings {
    pub fn solver_command(&self) -> SolverCommand {
        SolverCommand {
            interpreter: self.solver.interpreter.clone(),
            executable: self.solver.executable.clone(),
        }
    }

    /// Configured solver flags followed by `overrides`
    ///
    /// An override naming an already configured flag replaces its value.
    pub fn solver_options(&self, overrides: &[(String, String)]) -> SolverOptions {
        let configured = self
            .solver
            .args
            .iter()
            .map(|arg| (arg.flag.clone(), arg.value.clone()));

        SolverOptions::from_pairs(configured.chain(overrides.iter().cloned()))
    }

    /// Solver deadline, rejecting non-positive or unrepresentable values
    pub fn timeout(&self) -> Result<Option<Duration>> {
        self.timeout_secs.map(timeout_from_secs).transpose()
    }

    pub fn validator_timeout(&self) -> Duration {
        Duration::from_secs(self.validator.timeout_secs)
    }
}

/// Positive, finite seconds that fit in a `Duration`
pub fn timeout_from_secs(secs: f64) -> Result<Duration> {
    if secs <= 0.0 {
        bail!("timeout must be a positive number of seconds, got {}", secs);
    }
    Duration::try_from_secs_f64(secs)
        .with_context(|| format!("timeout of {} seconds is out of range", secs))
}

/// `<config dir>/patty/config.toml`, if the platform has a config dir
pub fn default_config_path() -> Option<PathBuf> {
    ProjectDirs::from("", "", "patty").map(|dirs| dirs.config_dir().join(CONFIG_FILE_NAME))
}

/// Load settings
///
/// An explicit file must exist; the default file is optional.
/// `solver.args` is a list of tables and can only be set from a file.
pub fn load_settings(explicit: Option<&Path>) -> Result<PlannerSettings> {
    let mut builder = Config::builder();

    match explicit {
        Some(path) => {
            builder = builder.add_source(File::from(path).required(true));
        }
        None => {
            if let Some(path) = default_config_path() {
                builder = builder.add_source(File::from(path).required(false));
            }
        }
    }

    let settings: PlannerSettings = builder
        .add_source(
            Environment::with_prefix(ENV_PREFIX)
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        )
        .build()
        .context("Failed to load settings")?
        .try_deserialize()
        .context("Invalid settings")?;

    settings.timeout().context("Invalid settings")?;
    Ok(settings)
}
