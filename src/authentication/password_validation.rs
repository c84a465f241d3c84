use secrecy::{ExposeSecret, Secret};

/// Minimum password length
pub const MIN_PASSWORD_LENGTH: usize = 8;

/// Maximum password length
pub const MAX_PASSWORD_LENGTH: usize = 128;

#[derive(Debug, PartialEq, thiserror::Error)]
pub enum PasswordValidationError {
    #[error("Password must be at least {MIN_PASSWORD_LENGTH} characters long")]
    TooShort,
    #[error("Password must be at most {MAX_PASSWORD_LENGTH} characters long")]
    TooLong,
}

/// Checks the password length in characters, spaces included.
pub fn validate_password_length(password: &Secret<String>) -> Result<(), PasswordValidationError> {
    let length = password.expose_secret().chars().count();

    if length < MIN_PASSWORD_LENGTH {
        return Err(PasswordValidationError::TooShort);
    }
    if length > MAX_PASSWORD_LENGTH {
        return Err(PasswordValidationError::TooLong);
    }

    Ok(())
}
