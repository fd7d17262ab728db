//! Converter abstraction for per-file invocations.
//!
//! The [`Converter`] trait decouples the walk from the external tool
//! (`jupyter nbconvert` by default). Tests use a recording converter that
//! returns scripted outcomes without spawning processes.

use std::io::Write;
use std::time::Duration;

use anyhow::{Context, Result};
use tracing::{debug, instrument};

use crate::core::invocation::Invocation;
use crate::core::types::InvocationOutcome;
use crate::io::process::{self, OutputMode};

/// Bytes of captured stderr kept for failure reports.
pub const STDERR_TAIL_BYTES: usize = 2_000;

/// What one converter call produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Conversion {
    pub outcome: InvocationOutcome,
    /// Tail of captured stderr; `None` unless output capture is enabled.
    pub stderr_tail: Option<String>,
}

impl Conversion {
    pub fn new(outcome: InvocationOutcome) -> Self {
        Self {
            outcome,
            stderr_tail: None,
        }
    }
}

/// Abstraction over converter backends.
pub trait Converter {
    /// Run one invocation to completion.
    ///
    /// A converter that runs and fails is an `Ok` with a failing outcome;
    /// `Err` is reserved for problems managing the process itself.
    fn convert(&self, invocation: &Invocation) -> Result<Conversion>;
}

/// Converter that spawns the invocation as a child process and waits for it.
#[derive(Debug, Clone)]
pub struct ProcessConverter {
    pub timeout: Option<Duration>,
    pub output: OutputMode,
}

impl Converter for ProcessConverter {
    #[instrument(skip_all, fields(input = %invocation.input.display()))]
    fn convert(&self, invocation: &Invocation) -> Result<Conversion> {
        let child = match process::spawn(invocation.to_command(), self.output) {
            Ok(child) => child,
            Err(err) => {
                debug!(err = %err, program = ?invocation.program, "converter failed to start");
                return Ok(Conversion::new(InvocationOutcome::SpawnFailed {
                    reason: err.to_string(),
                }));
            }
        };

        let output = process::wait(child, self.timeout, self.output)
            .with_context(|| format!("run converter for {}", invocation.input.display()))?;

        if !output.stdout.is_empty() {
            debug!(stdout = %String::from_utf8_lossy(&output.stdout), "converter stdout");
        }
        let stderr_tail = match self.output {
            OutputMode::Inherit => None,
            OutputMode::Capture { .. } => Some(output.stderr_tail(STDERR_TAIL_BYTES)),
        };

        let outcome = if output.timed_out {
            InvocationOutcome::TimedOut
        } else if output.status.success() {
            InvocationOutcome::Succeeded
        } else {
            InvocationOutcome::Failed {
                code: output.status.code(),
            }
        };
        Ok(Conversion {
            outcome,
            stderr_tail,
        })
    }
}

/// Converter that prints each invocation to stdout instead of running it.
pub struct DryRunConverter;

impl Converter for DryRunConverter {
    fn convert(&self, invocation: &Invocation) -> Result<Conversion> {
        let mut stdout = std::io::stdout().lock();
        writeln!(stdout, "{invocation}").context("write dry-run invocation")?;
        Ok(Conversion::new(InvocationOutcome::DryRun))
    }
}
