//! Exit codes for the global-authorizer CLI.
//! Part of the public contract; scripts branch on them.

pub const SUCCESS: i32 = 0;
pub const VALIDATION_FAILED: i32 = 1; // Schema violations (validate, --strict)
pub const CONFIG_ERROR: i32 = 2; // Unreadable description or failed pass
