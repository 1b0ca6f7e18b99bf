//! Standard exit codes for CLI operations
//!
//! These exit codes follow Unix conventions and sysexits.h where applicable.

/// Success - comparison completed, with or without changes
pub const SUCCESS: u8 = 0;

/// General error - unspecified failure
pub const ERROR: u8 = 1;

/// Load error - unreadable source, malformed document or invalid CRD
pub const LOAD_ERROR: u8 = 2;

/// Compare error - the comparison of two CRDs failed
pub const COMPARE_ERROR: u8 = 3;

/// Usage error - invalid arguments or options (following sysexits.h convention)
pub const USAGE_ERROR: u8 = 64;
