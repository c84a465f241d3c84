//! Messages shared across route handlers

/// Generic error message for internal server errors
pub const ERROR_SOMETHING_WENT_WRONG: &str = "Something went wrong";

/// Error message for missing authentication
pub const ERROR_AUTHENTICATION_REQUIRED: &str = "Authentication required";

/// Error message for failed sign-in, whichever half of the credentials was wrong
pub const ERROR_INVALID_CREDENTIALS: &str = "Invalid email or password";

pub const ERROR_ADMIN_REQUIRED: &str = "Admin access required";

pub const ERROR_ALREADY_SUBSCRIBED: &str = "Email is already subscribed";

pub const ERROR_USER_EXISTS: &str = "User with this email already exists";

pub const MESSAGE_SUBSCRIBED: &str = "Successfully subscribed to the newsletter";

/// Largest accepted image upload
pub const MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

pub fn duplicate_slug_message(slug: &str) -> String {
    format!("A newsletter with slug '{}' already exists", slug)
}
