//! Process exit codes.

use crate::run::CommandError;

/// Exit codes for the chime-stats binary.
pub mod codes {
    /// Run completed.
    pub const SUCCESS: i32 = 0;

    /// Invalid command-line arguments.
    pub const INVALID_ARGS: i32 = 1;

    /// Filesystem operation failed.
    pub const IO_ERROR: i32 = 2;

    /// Stream configuration rejected.
    pub const CONFIG_ERROR: i32 = 3;

    /// Interrupted by SIGINT.
    pub const SIGINT: i32 = 130;
}

/// Map a command error to its exit code.
pub fn exit_code(error: &CommandError) -> i32 {
    match error {
        CommandError::InvalidArgument(_) => codes::INVALID_ARGS,
        CommandError::Filesystem(_) => codes::IO_ERROR,
        CommandError::Registry(_) => codes::CONFIG_ERROR,
    }
}
