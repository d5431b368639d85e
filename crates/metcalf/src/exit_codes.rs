//! Exit codes for the CLI

/// Success, including runs where some jobs failed
pub const SUCCESS: i32 = 0;

/// General error
pub const ERROR: i32 = 1;

/// Configuration error; nothing was run
pub const CONFIG_ERROR: i32 = 1;
