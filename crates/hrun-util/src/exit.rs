//! Exit status conventions
//!
//! A child's own exit code is passed through unchanged. Everything else the
//! supervisor reports uses the values below:
//!
//! - a child killed by signal `N` maps to `128 + N`, the shell convention
//! - the supervisor itself stopped by a forwarded signal exits with
//!   [`FORWARDED_SIGNAL_EXIT`]
//! - supervisor failures use the `sysexits.h` range

/// Offset added to a signal number when a child was killed by that signal
pub const SIGNAL_EXIT_BASE: i32 = 128;

/// Exit status of the supervisor after it forwarded a termination signal to
/// its process group
pub const FORWARDED_SIGNAL_EXIT: i32 = 125;

/// No version matched the specifier (`EX_UNAVAILABLE`)
pub const EXIT_NOT_FOUND: i32 = 69;

/// Internal error (`EX_SOFTWARE`)
pub const EXIT_INTERNAL: i32 = 70;

/// Inventory I/O failure (`EX_IOERR`)
pub const EXIT_INVENTORY: i32 = 74;

/// Required configuration is missing (`EX_CONFIG`)
pub const EXIT_CONFIG: i32 = 78;

/// The child could not be started, matching the shell's "command not found"
pub const EXIT_SPAWN: i32 = 127;

/// Encode "terminated by signal `signal`" as a process exit status
pub fn signal_exit_code(signal: i32) -> i32 {
    SIGNAL_EXIT_BASE + signal
}

/// Clamp an exit status into the range a process can actually return
pub fn to_process_code(code: i32) -> u8 {
    u8::try_from(code).unwrap_or(EXIT_INTERNAL as u8)
}
