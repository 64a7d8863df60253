//! patty-solve - run the Patty numeric planner on a PDDL task

mod settings;

use anyhow::{Context, Result};
use clap::Parser;
use colored::Colorize;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use tabled::{Table, Tabled};
use tracing::info;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use patty_core::application::PattyPlanner;
use patty_core::domain::{LogLevel, PlanGenerationStatus, PlanOutcome, SAVE_PLAN_FLAG};
use patty_infra_system::{
    ActionPlanParser, CommandPlanValidator, PddlFileWriter, PddlTask, SubprocessSolver,
};

use settings::{load_settings, timeout_from_secs, PlannerSettings};

const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Exit status for a timed-out run (solved is 0, internal error is 1)
const TIMEOUT_EXIT_CODE: u8 = 2;

#[derive(Parser)]
#[command(name = "patty-solve")]
#[command(about = "Solve a numeric PDDL task with the Patty planner", long_about = None)]
#[command(version)]
struct Cli {
    /// PDDL domain file
    domain: PathBuf,

    /// PDDL problem file
    problem: PathBuf,

    /// Kill the solver after this many seconds
    #[arg(short, long, value_parser = parse_timeout)]
    timeout: Option<f64>,

    /// Keep the raw plan artifact at this path
    #[arg(long)]
    save_plan: Option<PathBuf>,

    /// Extra solver flag as FLAG=VALUE (repeatable)
    #[arg(long = "arg", value_name = "FLAG=VALUE", value_parser = parse_solver_arg, allow_hyphen_values = true)]
    args: Vec<(String, String)>,

    /// Settings file (default: <config dir>/patty/config.toml)
    #[arg(long, env = "PATTY_CONFIG")]
    config: Option<PathBuf>,

    /// Print the outcome as JSON
    #[arg(long)]
    json: bool,
}

fn parse_timeout(s: &str) -> Result<f64, String> {
    let secs: f64 = s.parse().map_err(|_| format!("'{}' is not a number", s))?;
    timeout_from_secs(secs).map_err(|e| e.to_string())?;
    Ok(secs)
}

fn parse_solver_arg(s: &str) -> Result<(String, String), String> {
    match s.split_once('=') {
        Some((flag, value)) if !flag.is_empty() => Ok((flag.to_string(), value.to_string())),
        _ => Err(format!("expected FLAG=VALUE, got '{}'", s)),
    }
}

/// Logs go to stderr; stdout carries the solver echo and the report
fn init_logging() -> Result<()> {
    let log_format = std::env::var("PATTY_LOG_FORMAT").unwrap_or_else(|_| "pretty".to_string());

    let env_filter =
        EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new("patty=info"))?;

    match log_format.as_str() {
        "json" => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(fmt::layer().json().with_writer(std::io::stderr))
                .try_init()?;
        }
        _ => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(fmt::layer().pretty().with_writer(std::io::stderr))
                .try_init()?;
        }
    }

    Ok(())
}

/// Merge command-line flags over the loaded settings
fn apply_cli(mut settings: PlannerSettings, cli: &Cli) -> (PlannerSettings, Vec<(String, String)>) {
    if let Some(timeout) = cli.timeout {
        settings.timeout_secs = Some(timeout);
    }

    let mut overrides = cli.args.clone();
    if let Some(path) = &cli.save_plan {
        overrides.push((SAVE_PLAN_FLAG.to_string(), path.display().to_string()));
    }

    (settings, overrides)
}

fn build_planner(
    settings: &PlannerSettings,
    overrides: &[(String, String)],
) -> PattyPlanner<PddlTask> {
    let validator = CommandPlanValidator::new(
        settings.validator.program.clone(),
        settings.validator.args.clone(),
        settings.validator_timeout(),
    );

    PattyPlanner::new(
        settings.solver_command(),
        settings.solver_options(overrides),
        Arc::new(SubprocessSolver::with_stdout()),
        Arc::new(PddlFileWriter),
        Arc::new(ActionPlanParser),
        Arc::new(validator),
    )
}

fn exit_status(status: PlanGenerationStatus) -> u8 {
    match status {
        PlanGenerationStatus::SolvedSatisficing => 0,
        PlanGenerationStatus::Timeout => TIMEOUT_EXIT_CODE,
        PlanGenerationStatus::InternalError => 1,
    }
}

#[derive(Tabled)]
struct ActionRow {
    step: usize,
    action: String,
}

fn render_report(outcome: &PlanOutcome) {
    let status = outcome.status.to_string();
    let status = match outcome.status {
        PlanGenerationStatus::SolvedSatisficing => status.green().bold(),
        PlanGenerationStatus::Timeout => status.yellow().bold(),
        PlanGenerationStatus::InternalError => status.red().bold(),
    };

    println!();
    println!("{} {} ({})", "Outcome:".cyan().bold(), status, outcome.engine_name);

    if let Some(plan) = &outcome.plan {
        if plan.is_empty() {
            println!("{}", "Empty plan".yellow());
        } else {
            let rows: Vec<ActionRow> = plan
                .actions()
                .iter()
                .enumerate()
                .map(|(i, action)| ActionRow {
                    step: i,
                    action: action.to_string(),
                })
                .collect();
            println!("{}", Table::new(rows));
        }
    }

    for log_msg in &outcome.log_messages {
        let level = log_msg.level.to_string();
        let level = match log_msg.level {
            LogLevel::Debug | LogLevel::Info => level.normal(),
            LogLevel::Warning => level.yellow(),
            LogLevel::Error => level.red(),
        };
        println!("[{}] {}", level, log_msg.message);
    }
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let cli = Cli::parse();
    init_logging()?;

    info!("patty-solve v{} (patty-core v{})", VERSION, patty_core::VERSION);

    let settings = load_settings(cli.config.as_deref())?;
    let (settings, overrides) = apply_cli(settings, &cli);

    let task = PddlTask::from_files(&cli.domain, &cli.problem).with_context(|| {
        format!(
            "Failed to read PDDL task from {} and {}",
            cli.domain.display(),
            cli.problem.display()
        )
    })?;

    let planner = build_planner(&settings, &overrides);
    let outcome = planner.solve(&task, settings.timeout()?).await;

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&outcome)?);
    } else {
        render_report(&outcome);
    }

    Ok(ExitCode::from(exit_status(outcome.status)))
}
