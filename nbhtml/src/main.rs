//! Convert every notebook under a directory tree to HTML.
//!
//! Walks the configured root, and for each file with the target extension
//! runs the converter command (`jupyter nbconvert ... --to html` by default).
//! Converter failures are ignored unless `--strict` is given.

use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use nbhtml::convert::run_conversion;
use nbhtml::exit_codes;
use nbhtml::io::config::{ConfigOverrides, DEFAULT_CONFIG_FILE, apply_overrides, load_config};
use nbhtml::io::converter::{DryRunConverter, ProcessConverter};
use nbhtml::io::process::OutputMode;
use nbhtml::logging;

#[derive(Parser, Debug)]
#[command(
    name = "nbhtml",
    version,
    about = "Convert every notebook under a directory tree to HTML"
)]
struct Cli {
    /// Config file; defaults apply when it does not exist.
    #[arg(long, default_value = DEFAULT_CONFIG_FILE)]
    config: PathBuf,

    /// Directory tree to walk.
    #[arg(long)]
    root: Option<PathBuf>,

    /// Output directory passed to the converter.
    #[arg(long)]
    output_dir: Option<PathBuf>,

    /// Target file extension (with or without the leading dot).
    #[arg(long)]
    extension: Option<String>,

    /// Report failed conversions and exit non-zero if any failed.
    #[arg(long)]
    strict: bool,

    /// Print each converter invocation instead of running it.
    #[arg(long)]
    dry_run: bool,

    /// Kill a converter that runs longer than this many seconds.
    #[arg(long)]
    timeout_secs: Option<u64>,

    /// Capture converter output (up to this many bytes per stream) instead of
    /// passing it through.
    #[arg(long, value_name = "BYTES")]
    capture_output: Option<usize>,

    /// Converter command template; `{input}` and `{output_dir}` are substituted.
    #[arg(last = true, value_name = "COMMAND")]
    command: Vec<String>,
}

impl Cli {
    fn overrides(&self) -> ConfigOverrides {
        ConfigOverrides {
            root: self.root.clone(),
            output_dir: self.output_dir.clone(),
            extension: self.extension.clone(),
            command: (!self.command.is_empty()).then(|| self.command.clone()),
            strict: self.strict,
            timeout_secs: self.timeout_secs,
            capture_output_limit_bytes: self.capture_output,
        }
    }
}

fn main() {
    logging::init();
    match run(Cli::parse()) {
        Ok(code) => std::process::exit(code),
        Err(err) => {
            eprintln!("{:#}", err);
            std::process::exit(exit_codes::INVALID);
        }
    }
}

fn run(cli: Cli) -> Result<i32> {
    let config = apply_overrides(load_config(&cli.config)?, &cli.overrides())?;

    let report = if cli.dry_run {
        run_conversion(&config, &DryRunConverter)?
    } else {
        let output = match config.capture_output_limit_bytes {
            Some(limit_bytes) => OutputMode::Capture { limit_bytes },
            None => OutputMode::Inherit,
        };
        let converter = ProcessConverter {
            timeout: config.timeout(),
            output,
        };
        run_conversion(&config, &converter)?
    };

    if config.strict && report.has_failures() {
        for failure in &report.failures {
            eprintln!("error: {failure}");
        }
        eprintln!(
            "{} of {} conversions failed",
            report.failures.len(),
            report.matched
        );
        return Ok(exit_codes::FAILED);
    }
    Ok(exit_codes::OK)
}
