// Output streamer - drains one child output pipe line by line
//
// Each pipe gets its own task so the child never blocks on a full pipe
// buffer while the caller waits for it to exit.

use std::io::Write;
use std::sync::{Arc, Mutex};
use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tracing::debug;

/// Destination for echoed solver output
///
/// `emit` receives one complete, already-prefixed line at a time, so
/// lines from the two pipes may interleave but never mix.
pub trait LineSink: Send + Sync {
    fn emit(&self, line: &str);
}

/// Echo to the caller's stdout, flushed per line
pub struct StdoutSink;

impl LineSink for StdoutSink {
    fn emit(&self, line: &str) {
        let mut stdout = std::io::stdout().lock();
        // A closed stdout must not stop the drain
        let _ = writeln!(stdout, "{}", line);
        let _ = stdout.flush();
    }
}

/// Collects lines in memory (tests, embedding)
#[derive(Clone, Default)]
pub struct MemorySink {
    lines: Arc<Mutex<Vec<String>>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn lines(&self) -> Vec<String> {
        self.lines.lock().map(|l| l.clone()).unwrap_or_default()
    }

    pub fn len(&self) -> usize {
        self.lines.lock().map(|l| l.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl LineSink for MemorySink {
    fn emit(&self, line: &str) {
        if let Ok(mut lines) = self.lines.lock() {
            lines.push(line.to_string());
        }
    }
}

/// Drain `reader` until EOF, emitting each non-empty line with `prefix`
///
/// Invalid UTF-8 is replaced rather than rejected. A read error ends the
/// drain quietly. The reader is dropped (closing the pipe) on return.
/// Returns the number of lines emitted.
pub async fn stream_output<R>(reader: R, prefix: &str, sink: &dyn LineSink) -> usize
where
    R: AsyncRead + Unpin,
{
    let mut reader = BufReader::new(reader);
    let mut buf = Vec::new();
    let mut emitted = 0;

    loop {
        buf.clear();
        match reader.read_until(b'\n', &mut buf).await {
            Ok(0) => break,
            Ok(_) => {
                let decoded = String::from_utf8_lossy(&buf);
                let line = decoded.trim_end();
                if !line.is_empty() {
                    sink.emit(&format!("{}{}", prefix, line));
                    emitted += 1;
                }
            }
            Err(e) => {
                debug!(error = %e, prefix = %prefix, "Output pipe read failed, stopping drain");
                break;
            }
        }
    }

    emitted
}
