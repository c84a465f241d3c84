mod middleware;
mod password;
mod password_validation;
mod token;

pub use middleware::{AuthenticatedUser, require_admin};
pub use password::{AuthError, Credentials, compute_password_hash, hash_password, validate_credentials};
pub use password_validation::{
    MAX_PASSWORD_LENGTH, MIN_PASSWORD_LENGTH, PasswordValidationError, validate_password_length,
};
pub use token::{Claims, TokenError, TokenService};
