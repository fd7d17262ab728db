use std::fmt;
use std::path::PathBuf;

/// Result of running the converter once.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InvocationOutcome {
    /// Converter exited with status 0.
    Succeeded,
    /// Converter exited non-zero. `code` is `None` when killed by a signal.
    Failed { code: Option<i32> },
    /// Converter exceeded the configured timeout and was killed.
    TimedOut,
    /// Converter could not be started (e.g. not on `PATH`).
    SpawnFailed { reason: String },
    /// Invocation was printed, not executed.
    DryRun,
}

impl InvocationOutcome {
    /// Whether strict mode treats this outcome as a failure.
    pub fn is_failure(&self) -> bool {
        matches!(
            self,
            InvocationOutcome::Failed { .. }
                | InvocationOutcome::TimedOut
                | InvocationOutcome::SpawnFailed { .. }
        )
    }
}

impl fmt::Display for InvocationOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InvocationOutcome::Succeeded => f.write_str("succeeded"),
            InvocationOutcome::Failed { code: Some(code) } => write!(f, "exited with code {code}"),
            InvocationOutcome::Failed { code: None } => f.write_str("terminated by signal"),
            InvocationOutcome::TimedOut => f.write_str("timed out"),
            InvocationOutcome::SpawnFailed { reason } => write!(f, "failed to start: {reason}"),
            InvocationOutcome::DryRun => f.write_str("dry run"),
        }
    }
}

/// A matching file whose conversion did not succeed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileFailure {
    pub input: PathBuf,
    pub outcome: InvocationOutcome,
    /// Tail of captured stderr, when output capture is enabled.
    pub stderr_tail: Option<String>,
}

impl fmt::Display for FileFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.input.display(), self.outcome)?;
        if let Some(tail) = self.stderr_tail.as_deref().filter(|t| !t.is_empty()) {
            write!(f, "\n{tail}")?;
        }
        Ok(())
    }
}

/// Tally of one conversion run. Informational only; never persisted.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConversionReport {
    /// Files yielded by the walk.
    pub files_seen: usize,
    /// Files with the target extension (one invocation each).
    pub matched: usize,
    /// Files without the target extension.
    pub skipped: usize,
    pub succeeded: usize,
    pub failures: Vec<FileFailure>,
}

impl ConversionReport {
    pub fn has_failures(&self) -> bool {
        !self.failures.is_empty()
    }
}
