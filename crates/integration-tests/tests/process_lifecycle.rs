//! Solver process lifecycle: deadlines, crashes, launch failures and
//! concurrent invocations through the real subprocess adapter.

#![cfg(unix)]

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};

use nix::sys::signal::{kill, Signal};
use nix::unistd::Pid;
use patty_core::application::PattyPlanner;
use patty_core::domain::{
    LogLevel, PlanGenerationStatus, SolverCommand, SolverOptions, TIMEOUT_MESSAGE,
};
use patty_core::port::plan_validator::mocks::MockPlanValidator;
use patty_core::port::time_provider::SystemTimeProvider;
use patty_infra_system::{
    ActionPlanParser, MemorySink, PddlFileWriter, PddlTask, SubprocessSolver,
};
use tempfile::TempDir;

fn task() -> PddlTask {
    PddlTask::new(
        "(define (domain d) (:action step :parameters (?n)))",
        "(define (problem p) (:domain d))",
    )
}

fn write_script(dir: &TempDir, body: &str) -> PathBuf {
    let script = dir.path().join("solver.sh");
    std::fs::write(&script, body).unwrap();
    script
}

fn planner(script: &Path, options: SolverOptions, sink: &MemorySink) -> PattyPlanner<PddlTask> {
    PattyPlanner::new(
        SolverCommand::new(script).with_interpreter("sh"),
        options,
        Arc::new(SubprocessSolver::new(
            Arc::new(sink.clone()),
            Arc::new(SystemTimeProvider),
        )),
        Arc::new(PddlFileWriter),
        Arc::new(ActionPlanParser),
        Arc::new(MockPlanValidator::new_valid()),
    )
}

fn is_alive(pid: i32) -> bool {
    kill(Pid::from_raw(pid), None::<Signal>).is_ok()
}

#[tokio::test]
async fn test_deadline_kills_solver_and_reports_timeout() {
    let dir = tempfile::tempdir().unwrap();
    let pid_file = dir.path().join("solver.pid");
    // $7/$8 carry the --pid-file flag
    let script = write_script(&dir, "echo $$ > \"$8\"\necho started\nexec sleep 30\n");
    let sink = MemorySink::new();
    let planner = planner(
        &script,
        SolverOptions::new().with("--pid-file", pid_file.display().to_string()),
        &sink,
    );

    let start = Instant::now();
    let outcome = planner
        .solve(&task(), Some(Duration::from_millis(300)))
        .await;

    assert!(start.elapsed() < Duration::from_secs(10));
    assert_eq!(outcome.status, PlanGenerationStatus::Timeout);
    assert!(outcome.plan.is_none());
    assert_eq!(outcome.log_messages.len(), 1);
    assert_eq!(outcome.log_messages[0].level, LogLevel::Info);
    assert_eq!(outcome.log_messages[0].message, TIMEOUT_MESSAGE);
    assert_eq!(sink.lines(), vec!["started"]);

    let pid: i32 = std::fs::read_to_string(&pid_file)
        .unwrap()
        .trim()
        .parse()
        .unwrap();
    assert!(!is_alive(pid), "solver {} survived its deadline", pid);
}

#[tokio::test]
async fn test_fast_solver_beats_generous_deadline() {
    let dir = tempfile::tempdir().unwrap();
    let script = write_script(&dir, "printf '0: (step one)\\n' > \"$6\"\n");
    let sink = MemorySink::new();
    let planner = planner(&script, SolverOptions::new(), &sink);

    let outcome = planner.solve(&task(), Some(Duration::from_secs(30))).await;

    assert_eq!(outcome.status, PlanGenerationStatus::SolvedSatisficing);
    assert_eq!(outcome.plan.map(|plan| plan.len()), Some(1));
}

#[tokio::test]
async fn test_inherited_pipes_do_not_hold_back_result() {
    let dir = tempfile::tempdir().unwrap();
    let pid_file = dir.path().join("background.pid");
    // The background sleep inherits stdout and stderr and outlives the solver
    let script = write_script(
        &dir,
        "sleep 20 &\necho $! > \"$8\"\necho done\nprintf '0: (step one)\\n' > \"$6\"\n",
    );
    let sink = MemorySink::new();
    let planner = planner(
        &script,
        SolverOptions::new().with("--pid-file", pid_file.display().to_string()),
        &sink,
    );

    let start = Instant::now();
    let outcome = planner.solve(&task(), Some(Duration::from_secs(30))).await;
    let elapsed = start.elapsed();

    let background: i32 = std::fs::read_to_string(&pid_file)
        .unwrap()
        .trim()
        .parse()
        .unwrap();
    let _ = kill(Pid::from_raw(background), Signal::SIGKILL);

    assert!(elapsed < Duration::from_secs(10), "took {:?}", elapsed);
    assert_eq!(outcome.status, PlanGenerationStatus::SolvedSatisficing);
    assert_eq!(outcome.plan.map(|plan| plan.len()), Some(1));
    assert_eq!(sink.lines(), vec!["done"]);
}

#[tokio::test]
async fn test_segfault_is_diagnosed() {
    let dir = tempfile::tempdir().unwrap();
    let script = write_script(&dir, "echo 'about to crash' >&2\nkill -s SEGV $$\n");
    let sink = MemorySink::new();
    let planner = planner(&script, SolverOptions::new(), &sink);

    let outcome = planner.solve(&task(), None).await;

    assert_eq!(outcome.status, PlanGenerationStatus::InternalError);
    assert_eq!(
        outcome.log_messages[0].message,
        "The planner failed with return code -11. - The error might be a segmentation fault (SIGSEGV)."
    );
    assert_eq!(sink.lines(), vec!["ERROR: about to crash"]);
}

#[tokio::test]
async fn test_nonzero_exit_is_reported_with_code() {
    let dir = tempfile::tempdir().unwrap();
    let script = write_script(&dir, "echo 'unsupported requirement' >&2\nexit 4\n");
    let sink = MemorySink::new();
    let planner = planner(&script, SolverOptions::new(), &sink);

    let outcome = planner.solve(&task(), None).await;

    assert_eq!(outcome.status, PlanGenerationStatus::InternalError);
    assert_eq!(
        outcome.log_messages[0].message,
        "The planner failed with return code 4."
    );
}

#[tokio::test]
async fn test_missing_interpreter_is_internal_error() {
    let dir = tempfile::tempdir().unwrap();
    let script = write_script(&dir, "exit 0\n");
    let sink = MemorySink::new();
    let planner = PattyPlanner::new(
        SolverCommand::new(&script).with_interpreter("/nonexistent/python"),
        SolverOptions::new(),
        Arc::new(SubprocessSolver::new(
            Arc::new(sink.clone()),
            Arc::new(SystemTimeProvider),
        )),
        Arc::new(PddlFileWriter),
        Arc::new(ActionPlanParser),
        Arc::new(MockPlanValidator::new_valid()),
    );

    let outcome = planner.solve(&task(), None).await;

    assert_eq!(outcome.status, PlanGenerationStatus::InternalError);
    assert!(outcome.log_messages[0].message.contains("/nonexistent/python"));
    assert!(sink.is_empty());
}

#[tokio::test]
async fn test_concurrent_solves_use_separate_scratch_dirs() {
    let dir = tempfile::tempdir().unwrap();
    // Echo the scratch directory so the runs can be told apart
    let script = write_script(
        &dir,
        "sleep 0.2\ndirname \"$6\"\nprintf '0: (step one)\\n1: (step two)\\n' > \"$6\"\n",
    );
    let sink = MemorySink::new();
    let planner = planner(&script, SolverOptions::new(), &sink);
    let task = task();

    let (a, b, c) = tokio::join!(
        planner.solve(&task, None),
        planner.solve(&task, None),
        planner.solve(&task, None),
    );

    for outcome in [a, b, c] {
        assert!(outcome.is_solved());
        assert_eq!(outcome.plan.map(|plan| plan.len()), Some(2));
    }

    let mut workdirs = sink.lines();
    workdirs.sort();
    workdirs.dedup();
    assert_eq!(workdirs.len(), 3);
    for workdir in workdirs {
        assert!(!Path::new(&workdir).exists(), "{} was not removed", workdir);
    }
}
