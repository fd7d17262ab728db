//! Stable exit codes for the nbhtml CLI.

/// Run finished. In permissive mode this is returned whatever the converter did.
pub const OK: i32 = 0;
/// Run could not start: invalid config, missing root, or other setup errors.
pub const INVALID: i32 = 1;
/// Strict mode only: at least one conversion did not succeed.
pub const FAILED: i32 = 2;
