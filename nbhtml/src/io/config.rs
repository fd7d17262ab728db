//! Conversion configuration stored in `nbhtml.toml`.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result, anyhow};
use serde::{Deserialize, Serialize};

use crate::core::filter::{ExtensionFilter, normalize_extension};
use crate::core::invocation::{CommandTemplate, default_command};

/// Default config file name, looked up in the current directory.
pub const DEFAULT_CONFIG_FILE: &str = "nbhtml.toml";

/// Conversion configuration (TOML).
///
/// Missing fields fall back to the layout the tool was written for:
/// notebooks under `learning/`, HTML into `learning-html/` via
/// `jupyter nbconvert`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct ConvertConfig {
    /// Directory tree to walk.
    pub root: PathBuf,

    /// Output directory passed to the converter as `{output_dir}`.
    pub output_dir: PathBuf,

    /// Target extension, with or without the leading dot.
    pub extension: String,

    /// Converter command template; first element is the program.
    pub command: Vec<String>,

    /// Report non-successful conversions and exit non-zero.
    pub strict: bool,

    /// Kill a converter running longer than this.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timeout_secs: Option<u64>,

    /// Capture converter stdout/stderr up to this many bytes each instead of
    /// letting the child write to the terminal.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub capture_output_limit_bytes: Option<usize>,
}

impl Default for ConvertConfig {
    fn default() -> Self {
        Self {
            root: PathBuf::from("learning"),
            output_dir: PathBuf::from("learning-html"),
            extension: "ipynb".to_string(),
            command: default_command(),
            strict: false,
            timeout_secs: None,
            capture_output_limit_bytes: None,
        }
    }
}

impl ConvertConfig {
    pub fn validate(&self) -> Result<()> {
        if self.root.as_os_str().is_empty() {
            return Err(anyhow!("root must not be empty"));
        }
        if self.output_dir.as_os_str().is_empty() {
            return Err(anyhow!("output_dir must not be empty"));
        }
        let extension = normalize_extension(&self.extension);
        if extension.trim().is_empty() {
            return Err(anyhow!("extension must not be empty"));
        }
        if extension.contains(['/', '\\', '.']) {
            return Err(anyhow!(
                "extension must be a single suffix without separators, got {:?}",
                self.extension
            ));
        }
        if self.timeout_secs == Some(0) {
            return Err(anyhow!("timeout_secs must be > 0"));
        }
        if self.capture_output_limit_bytes == Some(0) {
            return Err(anyhow!("capture_output_limit_bytes must be > 0"));
        }
        self.template().context("invalid command")?;
        Ok(())
    }

    pub fn template(&self) -> Result<CommandTemplate> {
        CommandTemplate::new(self.command.clone())
    }

    pub fn filter(&self) -> ExtensionFilter {
        ExtensionFilter::new(&self.extension)
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_secs.map(Duration::from_secs)
    }
}

/// Values supplied on the command line. `None`/`false` leaves the config value alone.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConfigOverrides {
    pub root: Option<PathBuf>,
    pub output_dir: Option<PathBuf>,
    pub extension: Option<String>,
    pub command: Option<Vec<String>>,
    pub strict: bool,
    pub timeout_secs: Option<u64>,
    pub capture_output_limit_bytes: Option<usize>,
}

/// Apply command-line overrides on top of a loaded config, then validate the result.
pub fn apply_overrides(
    mut base: ConvertConfig,
    overrides: &ConfigOverrides,
) -> Result<ConvertConfig> {
    if let Some(root) = &overrides.root {
        base.root = root.clone();
    }
    if let Some(output_dir) = &overrides.output_dir {
        base.output_dir = output_dir.clone();
    }
    if let Some(extension) = &overrides.extension {
        base.extension = extension.clone();
    }
    if let Some(command) = &overrides.command {
        base.command = command.clone();
    }
    if overrides.strict {
        base.strict = true;
    }
    if let Some(timeout_secs) = overrides.timeout_secs {
        base.timeout_secs = Some(timeout_secs);
    }
    if let Some(limit) = overrides.capture_output_limit_bytes {
        base.capture_output_limit_bytes = Some(limit);
    }
    base.validate()?;
    Ok(base)
}

/// Load config from a TOML file.
///
/// If the file is missing, returns `ConvertConfig::default()`. Values are not
/// validated here: command-line overrides may still replace them, so
/// [`apply_overrides`] validates the merged config.
pub fn load_config(path: &Path) -> Result<ConvertConfig> {
    if !path.exists() {
        return Ok(ConvertConfig::default());
    }
    let contents = fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
    let cfg: ConvertConfig =
        toml::from_str(&contents).with_context(|| format!("parse {}", path.display()))?;
    Ok(cfg)
}
