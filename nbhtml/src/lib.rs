//! Batch notebook-to-HTML conversion driven by an external converter.
//!
//! The crate walks a directory tree, selects files by extension, and invokes a
//! converter tool (`jupyter nbconvert` by default) once per matching file.
//! The layout follows a strict separation:
//!
//! - **[`core`]**: Pure logic (extension filter, command templates, outcome types).
//!   No I/O, fully testable in isolation.
//! - **[`io`]**: Side-effecting operations (config files, directory walks,
//!   process execution). Isolated behind the [`io::converter::Converter`] trait
//!   so tests can record invocations instead of spawning processes.
//!
//! [`convert`] coordinates the two to implement the CLI.

pub mod convert;
pub mod core;
pub mod exit_codes;
pub mod io;
pub mod logging;
#[cfg(any(test, feature = "test-support"))]
pub mod test_support;
