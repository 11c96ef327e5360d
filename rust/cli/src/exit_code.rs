//! Process exit codes returned by [`crate::run`].

/// Success exit code (standard Unix convention).
pub const SUCCESS: i32 = 0;

/// General error exit code.
pub const ERROR: i32 = 2;

/// Session cut short (closed input) exit code.
pub const INTERRUPTED: i32 = 130;
