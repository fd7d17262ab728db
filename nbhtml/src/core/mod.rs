//! Pure conversion logic: no filesystem or process access.

pub mod filter;
pub mod invocation;
pub mod types;
