//! Test-only helpers: scratch notebook trees and a recording converter.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tempfile::TempDir;

use crate::core::invocation::Invocation;
use crate::core::types::InvocationOutcome;
use crate::io::converter::{Conversion, Converter};

/// Scratch directory tree removed on drop.
pub struct TempTree {
    dir: TempDir,
}

impl TempTree {
    pub fn new() -> Result<Self> {
        Ok(Self {
            dir: tempfile::tempdir().context("create temp dir")?,
        })
    }

    pub fn root(&self) -> &Path {
        self.dir.path()
    }

    /// Create `relative` (and its parents) with placeholder notebook content.
    pub fn touch(&self, relative: &str) -> Result<PathBuf> {
        let path = self.root().join(relative);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("create dir {}", parent.display()))?;
        }
        fs::write(&path, "{\"cells\": []}")
            .with_context(|| format!("write {}", path.display()))?;
        Ok(path)
    }
}

/// Converter that records invocations and replays scripted outcomes.
///
/// Once the script is exhausted every call succeeds.
#[derive(Default)]
pub struct RecordingConverter {
    invocations: RefCell<Vec<Invocation>>,
    outcomes: RefCell<VecDeque<InvocationOutcome>>,
}

impl RecordingConverter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_outcomes(outcomes: Vec<InvocationOutcome>) -> Self {
        Self {
            invocations: RefCell::new(Vec::new()),
            outcomes: RefCell::new(outcomes.into()),
        }
    }

    pub fn invocations(&self) -> Vec<Invocation> {
        self.invocations.borrow().clone()
    }

    /// Input paths in invocation order.
    pub fn inputs(&self) -> Vec<PathBuf> {
        self.invocations
            .borrow()
            .iter()
            .map(|invocation| invocation.input.clone())
            .collect()
    }
}

impl Converter for RecordingConverter {
    fn convert(&self, invocation: &Invocation) -> Result<Conversion> {
        self.invocations.borrow_mut().push(invocation.clone());
        let outcome = self
            .outcomes
            .borrow_mut()
            .pop_front()
            .unwrap_or(InvocationOutcome::Succeeded);
        Ok(Conversion::new(outcome))
    }
}
