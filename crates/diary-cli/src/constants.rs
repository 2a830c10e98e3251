//! Constants used throughout the CLI.

/// Exit codes for the CLI.
///
/// These follow common Unix conventions:
/// - 0: Success
/// - 1: General error (used by anyhow for unhandled errors)
/// - 2: Misuse of shell command (reserved by shells, used by clap)
/// - 3+: Application-specific errors
pub mod exit_codes {
    /// Resource not found (user, diary, task).
    pub const NOT_FOUND: i32 = 3;

    /// Invalid user input or arguments.
    pub const INVALID_INPUT: i32 = 4;

    /// Authentication failed (unknown user or wrong password).
    pub const AUTH_FAILED: i32 = 5;

    /// Key derivation or cipher failure.
    pub const CRYPTO_FAILED: i32 = 6;
}

/// Environment variable holding the account password.
pub const PASSWORD_ENV: &str = "DIARY_PASSWORD";

/// Environment variable holding a tracing filter directive.
pub const LOG_ENV: &str = "DIARY_LOG";
