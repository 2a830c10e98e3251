//! Exit code mapping for errors surfaced by command handlers.

use diary_core::DiaryError;

use crate::constants::exit_codes;

/// Pick the process exit code for an error returned by a handler.
///
/// Core errors are found anywhere in the chain; everything else is a
/// general failure.
pub fn exit_code(err: &anyhow::Error) -> i32 {
    match err.chain().find_map(|cause| cause.downcast_ref::<DiaryError>()) {
        Some(core) => core_exit_code(core),
        None => 1,
    }
}

fn core_exit_code(err: &DiaryError) -> i32 {
    if err.is_not_found() {
        return exit_codes::NOT_FOUND;
    }
    if err.is_crypto() {
        return exit_codes::CRYPTO_FAILED;
    }
    match err {
        DiaryError::AuthenticationFailed => exit_codes::AUTH_FAILED,
        DiaryError::InvalidInput(_) | DiaryError::Validation(_) | DiaryError::Conflict(_) => {
            exit_codes::INVALID_INPUT
        }
        _ => 1,
    }
}

/// A short hint for errors a user can act on.
pub fn hint(err: &anyhow::Error) -> Option<&'static str> {
    match err.chain().find_map(|cause| cause.downcast_ref::<DiaryError>())? {
        DiaryError::AuthenticationFailed => {
            Some("Hint: check --user / DIARY_USER and the password.")
        }
        DiaryError::KeyDerivation(_) => Some(
            "Hint: the account salt or the configured PBKDF2 iterations do not match the stored data.",
        ),
        DiaryError::Decryption(_) => {
            Some("Hint: the entry cannot be opened with this account's key.")
        }
        _ => None,
    }
}
