use validator::ValidateEmail;

/// An email address, trimmed and lowercased before validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmailAddress(String);

impl EmailAddress {
    pub fn parse(s: String) -> Result<EmailAddress, String> {
        let normalized = s.trim().to_lowercase();
        if normalized.is_empty() {
            return Err("Email is required".to_string());
        }
        if normalized.validate_email() {
            Ok(Self(normalized))
        } else {
            Err(format!("{} is not a valid email address", s.trim()))
        }
    }
}

impl AsRef<str> for EmailAddress {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for EmailAddress {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}
