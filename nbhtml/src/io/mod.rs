//! I/O helpers for conversion runs.

pub mod config;
pub mod converter;
pub mod process;
pub mod walker;
