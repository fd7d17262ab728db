//! Converter command templates and the per-file invocations rendered from them.
//!
//! A template is an argument list, not a shell string. Placeholders are
//! substituted inside individual arguments, so a path containing spaces or
//! shell metacharacters always reaches the converter as exactly one argument.

use std::ffi::{OsStr, OsString};
use std::fmt;
use std::path::{Path, PathBuf};
use std::process::Command;
use std::sync::LazyLock;

use anyhow::{Result, bail};

static PLACEHOLDER_RE: LazyLock<regex::Regex> =
    LazyLock::new(|| regex::Regex::new(r"\{[A-Za-z_][A-Za-z0-9_]*\}").unwrap());

/// Placeholders understood by [`CommandTemplate`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Placeholder {
    /// Full path of the matching input file.
    Input,
    /// Configured output directory.
    OutputDir,
}

impl Placeholder {
    pub const ALL: [Placeholder; 2] = [Placeholder::Input, Placeholder::OutputDir];

    pub fn token(self) -> &'static str {
        match self {
            Placeholder::Input => "{input}",
            Placeholder::OutputDir => "{output_dir}",
        }
    }

    fn from_token(token: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|p| p.token() == token)
    }
}

/// Validated converter command template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandTemplate {
    parts: Vec<String>,
}

impl CommandTemplate {
    /// Validate `parts` as a template: a non-blank program followed by
    /// arguments, known placeholders only, and `{input}` used at least once.
    pub fn new(parts: Vec<String>) -> Result<Self> {
        let Some(program) = parts.first() else {
            bail!("command template must be a non-empty array");
        };
        if program.trim().is_empty() {
            bail!("command template program must not be blank");
        }

        let mut references_input = false;
        for part in &parts {
            for found in PLACEHOLDER_RE.find_iter(part) {
                match Placeholder::from_token(found.as_str()) {
                    Some(Placeholder::Input) => references_input = true,
                    Some(Placeholder::OutputDir) => {}
                    None => bail!(
                        "unknown placeholder {} in command template argument {:?} (expected {} or {})",
                        found.as_str(),
                        part,
                        Placeholder::Input.token(),
                        Placeholder::OutputDir.token()
                    ),
                }
            }
        }
        if !references_input {
            bail!(
                "command template must reference {} in at least one argument",
                Placeholder::Input.token()
            );
        }

        Ok(Self { parts })
    }

    /// `jupyter nbconvert {input} --to html --output-dir {output_dir}`
    pub fn nbconvert_html() -> Self {
        Self {
            parts: default_command(),
        }
    }

    pub fn parts(&self) -> &[String] {
        &self.parts
    }

    /// Render the invocation for one input file.
    pub fn render(&self, input: &Path, output_dir: &Path) -> Invocation {
        let mut rendered = self
            .parts
            .iter()
            .map(|part| substitute(part, input, output_dir));
        let program = rendered.next().unwrap_or_default();
        Invocation {
            input: input.to_path_buf(),
            program,
            args: rendered.collect(),
        }
    }
}

/// Default template parts, shared with config defaults.
pub fn default_command() -> Vec<String> {
    [
        "jupyter",
        "nbconvert",
        Placeholder::Input.token(),
        "--to",
        "html",
        "--output-dir",
        Placeholder::OutputDir.token(),
    ]
    .into_iter()
    .map(str::to_string)
    .collect()
}

fn substitute(part: &str, input: &Path, output_dir: &Path) -> OsString {
    let mut out = OsString::with_capacity(part.len());
    let mut last = 0;
    for found in PLACEHOLDER_RE.find_iter(part) {
        out.push(&part[last..found.start()]);
        match Placeholder::from_token(found.as_str()) {
            Some(Placeholder::Input) => out.push(input.as_os_str()),
            Some(Placeholder::OutputDir) => out.push(output_dir.as_os_str()),
            None => out.push(found.as_str()),
        }
        last = found.end();
    }
    out.push(&part[last..]);
    out
}

/// One fully rendered converter call for a single input file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    /// Input file this invocation converts.
    pub input: PathBuf,
    pub program: OsString,
    pub args: Vec<OsString>,
}

impl Invocation {
    /// Build a [`Command`] with the program and argument list. No shell is involved.
    pub fn to_command(&self) -> Command {
        let mut cmd = Command::new(&self.program);
        cmd.args(&self.args);
        cmd
    }
}

impl fmt::Display for Invocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_word(f, &self.program)?;
        for arg in &self.args {
            f.write_str(" ")?;
            write_word(f, arg)?;
        }
        Ok(())
    }
}

// Display only: quote words that would otherwise read as several.
fn write_word(f: &mut fmt::Formatter<'_>, word: &OsStr) -> fmt::Result {
    let word = word.to_string_lossy();
    if word.is_empty() || word.chars().any(char::is_whitespace) {
        write!(f, "\"{word}\"")
    } else {
        f.write_str(&word)
    }
}
