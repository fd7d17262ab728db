//! Helpers for running converter processes with an optional timeout and bounded output.

use std::io::{self, Read};
use std::process::{Child, Command, ExitStatus, Stdio};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError};
use std::thread;
use std::time::{Duration, Instant};

use anyhow::{Context, Result, anyhow};
use tracing::{debug, instrument, warn};
use wait_timeout::ChildExt;

/// How long to keep reading captured output after a timed-out child is killed.
///
/// Processes the converter started itself may still hold the pipes open; their
/// output is abandoned once this elapses.
pub const KILL_DRAIN_GRACE: Duration = Duration::from_millis(500);

/// Where the child's stdout/stderr go.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputMode {
    /// Child writes straight to this process's stdout/stderr.
    Inherit,
    /// Child output is captured, keeping at most `limit_bytes` per stream.
    Capture { limit_bytes: usize },
}

/// Finished child process.
#[derive(Debug)]
pub struct CommandOutput {
    pub status: ExitStatus,
    /// Empty unless output was captured.
    pub stdout: Vec<u8>,
    /// Empty unless output was captured.
    pub stderr: Vec<u8>,
    pub stdout_truncated: usize,
    pub stderr_truncated: usize,
    pub timed_out: bool,
}

impl CommandOutput {
    /// Last `max_bytes` of captured stderr, lossily decoded and trimmed.
    pub fn stderr_tail(&self, max_bytes: usize) -> String {
        let start = self.stderr.len().saturating_sub(max_bytes);
        String::from_utf8_lossy(&self.stderr[start..])
            .trim()
            .to_string()
    }
}

/// Spawn `cmd` with stdin closed and stdout/stderr wired per `output`.
///
/// Returns the raw spawn error so callers can tell "could not start" apart
/// from failures while waiting.
pub fn spawn(mut cmd: Command, output: OutputMode) -> io::Result<Child> {
    cmd.stdin(Stdio::null());
    match output {
        OutputMode::Inherit => {
            cmd.stdout(Stdio::inherit()).stderr(Stdio::inherit());
        }
        OutputMode::Capture { .. } => {
            cmd.stdout(Stdio::piped()).stderr(Stdio::piped());
        }
    }
    debug!(program = ?cmd.get_program(), "spawning child process");
    cmd.spawn()
}

/// Wait for a child spawned by [`spawn`], killing it if `timeout` elapses.
///
/// Captured output is read concurrently while the child runs so full pipes
/// cannot deadlock it. Bytes beyond the capture limit are drained and counted.
/// After a timeout kill, readers get [`KILL_DRAIN_GRACE`] to finish; readers
/// still blocked on pipes held by the converter's own children are detached.
#[instrument(skip_all, fields(timeout_secs = timeout.map(|t| t.as_secs()), ?output))]
pub fn wait(
    mut child: Child,
    timeout: Option<Duration>,
    output: OutputMode,
) -> Result<CommandOutput> {
    let limit = match output {
        OutputMode::Inherit => 0,
        OutputMode::Capture { limit_bytes } => limit_bytes,
    };
    let stdout_reader = child.stdout.take().map(|stdout| spawn_reader(stdout, limit));
    let stderr_reader = child.stderr.take().map(|stderr| spawn_reader(stderr, limit));

    let mut timed_out = false;
    let status = match timeout {
        Some(timeout) => match child.wait_timeout(timeout).context("wait for command")? {
            Some(status) => status,
            None => {
                warn!(
                    timeout_secs = timeout.as_secs(),
                    "command timed out, killing"
                );
                timed_out = true;
                child.kill().context("kill command")?;
                child.wait().context("wait command after kill")?
            }
        },
        None => child.wait().context("wait for command")?,
    };

    let deadline = timed_out.then(|| Instant::now() + KILL_DRAIN_GRACE);
    let (stdout, stdout_truncated) = join_output(stdout_reader, deadline).context("join stdout")?;
    let (stderr, stderr_truncated) = join_output(stderr_reader, deadline).context("join stderr")?;

    if stdout_truncated > 0 || stderr_truncated > 0 {
        warn!(stdout_truncated, stderr_truncated, "output truncated");
    }

    debug!(exit_code = ?status.code(), timed_out, "command finished");
    Ok(CommandOutput {
        status,
        stdout,
        stderr,
        stdout_truncated,
        stderr_truncated,
        timed_out,
    })
}

type ReaderResult = Result<(Vec<u8>, usize)>;

fn spawn_reader<R: Read + Send + 'static>(reader: R, limit: usize) -> Receiver<ReaderResult> {
    let (tx, rx) = mpsc::channel();
    thread::spawn(move || {
        // Receiver is gone once the reader has been detached.
        let _ = tx.send(read_stream_limited(reader, limit));
    });
    rx
}

/// Collect a reader's output, waiting no later than `deadline` when one is set.
fn join_output(reader: Option<Receiver<ReaderResult>>, deadline: Option<Instant>) -> ReaderResult {
    let Some(reader) = reader else {
        return Ok((Vec::new(), 0));
    };
    let Some(deadline) = deadline else {
        return reader
            .recv()
            .map_err(|_| anyhow!("output reader thread panicked"))?;
    };
    match reader.recv_timeout(deadline.saturating_duration_since(Instant::now())) {
        Ok(result) => result,
        Err(RecvTimeoutError::Timeout) => {
            warn!("output pipe still held open after kill, abandoning output");
            Ok((Vec::new(), 0))
        }
        Err(RecvTimeoutError::Disconnected) => Err(anyhow!("output reader thread panicked")),
    }
}

fn read_stream_limited<R: Read>(mut reader: R, limit: usize) -> Result<(Vec<u8>, usize)> {
    let mut buf = Vec::new();
    let mut truncated = 0usize;
    let mut chunk = [0u8; 8192];

    loop {
        let n = reader.read(&mut chunk).context("read output")?;
        if n == 0 {
            break;
        }
        let remaining = limit.saturating_sub(buf.len());
        if remaining > 0 {
            let keep = n.min(remaining);
            buf.extend_from_slice(&chunk[..keep]);
            truncated += n.saturating_sub(keep);
        } else {
            truncated += n;
        }
    }

    Ok((buf, truncated))
}
