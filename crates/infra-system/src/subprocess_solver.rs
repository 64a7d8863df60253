// Subprocess solver implementation
// reason: async-trait, tokio for async process management
use async_trait::async_trait;
use std::process::{ExitStatus, Stdio};
use std::sync::Arc;
use std::time::Duration;
use tokio::io::AsyncRead;
use tokio::process::{Child, Command};
use tokio::task::JoinHandle;
use tokio::time::timeout;
use tracing::{debug, info, warn};

use patty_core::application::constants::{ERROR_STREAM_PREFIX, STREAM_JOIN_GRACE};
use patty_core::domain::{ExitStatusCode, InvocationSpec};
use patty_core::port::time_provider::SystemTimeProvider;
use patty_core::port::{
    ExecutionError, ProcessCompletion, ProcessReport, SolverProcess, TimeProvider,
};

use crate::output_streamer::{stream_output, LineSink, StdoutSink};

/// Prefix for echoed stdout lines
const STDOUT_PREFIX: &str = "";

/// Launches solver processes and wires their pipes to output drainers
pub struct ProcessRunner {
    sink: Arc<dyn LineSink>,
    time_provider: Arc<dyn TimeProvider>,
}

impl ProcessRunner {
    pub fn new(sink: Arc<dyn LineSink>, time_provider: Arc<dyn TimeProvider>) -> Self {
        Self {
            sink,
            time_provider,
        }
    }

    /// Start the solver and both drainers; does not wait for completion
    ///
    /// # Errors
    /// ExecutionError::SpawnFailed if the program cannot be started
    pub fn launch(&self, spec: &InvocationSpec) -> Result<SolverHandle, ExecutionError> {
        let program = spec.program();

        let mut child = Command::new(&program)
            .args(spec.args())
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| ExecutionError::SpawnFailed {
                program: program.to_string_lossy().into_owned(),
                reason: e.to_string(),
            })?;

        let pid = child.id();
        let stdout_drain = child
            .stdout
            .take()
            .map(|pipe| spawn_drain(pipe, STDOUT_PREFIX, Arc::clone(&self.sink)));
        let stderr_drain = child
            .stderr
            .take()
            .map(|pipe| spawn_drain(pipe, ERROR_STREAM_PREFIX, Arc::clone(&self.sink)));

        info!(pid = ?pid, program = %program.to_string_lossy(), "Solver process started");

        Ok(SolverHandle {
            child,
            pid,
            stdout_drain,
            stderr_drain,
            started_at: self.time_provider.now_millis(),
            time_provider: Arc::clone(&self.time_provider),
        })
    }
}

fn spawn_drain<R>(pipe: R, prefix: &'static str, sink: Arc<dyn LineSink>) -> JoinHandle<usize>
where
    R: AsyncRead + Unpin + Send + 'static,
{
    tokio::spawn(async move { stream_output(pipe, prefix, sink.as_ref()).await })
}

/// Live solver process plus its two output drainers
///
/// Dropping the handle kills the child.
pub struct SolverHandle {
    child: Child,
    pid: Option<u32>,
    stdout_drain: Option<JoinHandle<usize>>,
    stderr_drain: Option<JoinHandle<usize>>,
    started_at: i64,
    time_provider: Arc<dyn TimeProvider>,
}

impl SolverHandle {
    pub fn pid(&self) -> Option<u32> {
        self.pid
    }

    /// Wait for exit, killing the child once `limit` elapses
    ///
    /// Drainers get `STREAM_JOIN_GRACE` to finish after the child is gone and
    /// are abandoned past that.
    pub async fn wait(mut self, limit: Option<Duration>) -> Result<ProcessReport, ExecutionError> {
        let waited = match limit {
            Some(limit) => timeout(limit, self.child.wait()).await.ok(),
            None => Some(self.child.wait().await),
        };

        let completion = match waited {
            Some(status) => {
                let status = status.map_err(|e| ExecutionError::WaitFailed(e.to_string()))?;
                ProcessCompletion::Exited(exit_status_code(&status))
            }
            None => {
                self.kill().await?;
                ProcessCompletion::TimedOut
            }
        };

        let (stdout_lines, stderr_lines) = tokio::join!(
            join_drain(self.stdout_drain.take(), "stdout"),
            join_drain(self.stderr_drain.take(), "stderr"),
        );

        let duration_ms = self.time_provider.now_millis() - self.started_at;
        debug!(
            pid = ?self.pid,
            stdout_lines = ?stdout_lines,
            stderr_lines = ?stderr_lines,
            "Solver output drained"
        );

        if let ProcessCompletion::Exited(code) = completion {
            if let Some(signal) = code.signal() {
                warn!(
                    pid = ?self.pid,
                    signal = %signal_name(signal),
                    "Solver terminated by signal"
                );
            }
        }

        Ok(ProcessReport {
            completion,
            pid: self.pid,
            duration_ms,
        })
    }

    /// SIGKILL and reap the child
    async fn kill(&mut self) -> Result<(), ExecutionError> {
        warn!(pid = ?self.pid, "Deadline elapsed, killing solver");
        if let Err(e) = self.child.kill().await {
            // Exited between the deadline and the kill
            if !matches!(self.child.try_wait(), Ok(Some(_))) {
                return Err(ExecutionError::KillFailed(e.to_string()));
            }
        }
        Ok(())
    }
}

/// Bounded join of one drainer; `None` if it was abandoned
async fn join_drain(drain: Option<JoinHandle<usize>>, channel: &str) -> Option<usize> {
    let mut drain = drain?;
    match timeout(STREAM_JOIN_GRACE, &mut drain).await {
        Ok(Ok(lines)) => Some(lines),
        Ok(Err(e)) => {
            warn!(channel = %channel, error = %e, "Output drain task failed");
            None
        }
        Err(_) => {
            warn!(channel = %channel, "Output drain still running after grace period, abandoning");
            drain.abort();
            None
        }
    }
}

/// Exit code, or the negated signal number when killed by a signal
fn exit_status_code(status: &ExitStatus) -> ExitStatusCode {
    if let Some(code) = status.code() {
        return ExitStatusCode::from_code(code);
    }

    #[cfg(unix)]
    {
        use std::os::unix::process::ExitStatusExt;
        if let Some(signal) = status.signal() {
            return ExitStatusCode::from_signal(signal);
        }
    }

    ExitStatusCode::from_code(-1)
}

fn signal_name(signal: i32) -> String {
    #[cfg(unix)]
    {
        use nix::sys::signal::Signal;
        if let Ok(sig) = Signal::try_from(signal) {
            return sig.as_str().to_string();
        }
    }

    signal.to_string()
}

/// Subprocess solver
/// Runs the Patty solver as a child process, echoing its output live
pub struct SubprocessSolver {
    runner: ProcessRunner,
}

impl SubprocessSolver {
    /// Create a new subprocess solver
    ///
    /// # Arguments
    /// * `sink` - Where echoed solver output goes
    /// * `time_provider` - Time provider for duration tracking
    ///
    /// # Example
    /// ```ignore
    /// let solver = SubprocessSolver::new(Arc::new(StdoutSink), Arc::new(SystemTimeProvider));
    /// ```
    pub fn new(sink: Arc<dyn LineSink>, time_provider: Arc<dyn TimeProvider>) -> Self {
        Self {
            runner: ProcessRunner::new(sink, time_provider),
        }
    }

    /// Echo to stdout, wall-clock durations
    pub fn with_stdout() -> Self {
        Self::new(Arc::new(StdoutSink), Arc::new(SystemTimeProvider))
    }
}

#[async_trait]
impl SolverProcess for SubprocessSolver {
    async fn run(
        &self,
        spec: &InvocationSpec,
        limit: Option<Duration>,
    ) -> Result<ProcessReport, ExecutionError> {
        info!(
            command = ?spec.command_line(),
            timeout_ms = ?limit.map(|l| l.as_millis()),
            "Starting solver subprocess"
        );

        let handle = self.runner.launch(spec)?;
        let report = handle.wait(limit).await?;

        info!(
            pid = ?report.pid,
            duration_ms = %report.duration_ms,
            completion = ?report.completion,
            "Solver subprocess finished"
        );

        Ok(report)
    }
}
