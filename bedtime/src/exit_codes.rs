//! Stable exit codes for the `bedtime` binary.

/// Session completed and a story was shown.
pub const OK: i32 = 0;
/// Session aborted: invalid config, missing credential, model failure, or a
/// refused revision.
pub const FAILED: i32 = 1;
