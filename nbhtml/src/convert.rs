//! Walk-filter-invoke loop behind the `nbhtml` command.

use std::path::PathBuf;

use anyhow::{Context, Result};
use tracing::{debug, error, info, instrument, trace};

use crate::core::types::{ConversionReport, FileFailure, InvocationOutcome};
use crate::io::config::ConvertConfig;
use crate::io::converter::{Conversion, Converter};
use crate::io::walker::walk_files;

/// Convert every matching file under `config.root`, one invocation at a time.
///
/// Fails before any invocation if the root is missing. Converter failures
/// never abort the walk: they are tallied in the report, logged at `info` by
/// default and at `error` in strict mode.
#[instrument(skip_all, fields(root = %config.root.display(), strict = config.strict))]
pub fn run_conversion<C: Converter>(
    config: &ConvertConfig,
    converter: &C,
) -> Result<ConversionReport> {
    let template = config.template()?;
    let filter = config.filter();
    let files = walk_files(&config.root)?;
    info!(
        output_dir = %config.output_dir.display(),
        extension = filter.extension(),
        "converting notebooks"
    );

    let mut report = ConversionReport::default();
    for file in files {
        report.files_seen += 1;
        if !filter.matches(&file.file_name) {
            report.skipped += 1;
            trace!(path = %file.path().display(), "skipping");
            continue;
        }

        report.matched += 1;
        let input = file.path();
        let invocation = template.render(&input, &config.output_dir);
        debug!(%invocation, "invoking converter");
        let conversion = converter
            .convert(&invocation)
            .with_context(|| format!("convert {}", input.display()))?;
        record(&mut report, config.strict, input, conversion);
    }

    info!(
        files_seen = report.files_seen,
        matched = report.matched,
        skipped = report.skipped,
        succeeded = report.succeeded,
        failed = report.failures.len(),
        "conversion finished"
    );
    Ok(report)
}

fn record(report: &mut ConversionReport, strict: bool, input: PathBuf, conversion: Conversion) {
    match conversion.outcome {
        InvocationOutcome::Succeeded => {
            debug!(input = %input.display(), "converted");
            report.succeeded += 1;
        }
        InvocationOutcome::DryRun => {}
        outcome => {
            let failure = FileFailure {
                input,
                outcome,
                stderr_tail: conversion.stderr_tail,
            };
            if strict {
                error!(%failure, "conversion failed");
            } else {
                info!(%failure, "conversion failed, ignoring");
            }
            report.failures.push(failure);
        }
    }
}
